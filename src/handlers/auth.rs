// src/handlers/auth.rs

use axum::{extract::State, Json};
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::{auth::SesionAutenticada, capacidades::{CapRegistrarUsuarios, RequiereCapacidad}},
    models::auth::{LoginPayload, RegistroPayload, RespuestaAuth, Sesion},
};

// POST /api/auth/login
#[utoipa::path(
    post,
    path = "/api/auth/login",
    tag = "Auth",
    request_body = LoginPayload,
    responses(
        (status = 200, description = "Token emitido", body = RespuestaAuth),
        (status = 401, description = "Email o contraseña incorrectos"),
        (status = 429, description = "Demasiados intentos")
    )
)]
pub async fn login(
    State(app_state): State<AppState>,
    Json(payload): Json<LoginPayload>,
) -> Result<Json<RespuestaAuth>, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let token = app_state.auth.login(&payload.email, &payload.password).await?;

    Ok(Json(RespuestaAuth { token }))
}

// POST /api/auth/register — solo administradores crean cuentas
#[utoipa::path(
    post,
    path = "/api/auth/register",
    tag = "Auth",
    request_body = RegistroPayload,
    responses(
        (status = 200, description = "Usuario creado, token emitido", body = RespuestaAuth),
        (status = 403, description = "Capacidad faltante"),
        (status = 409, description = "El email ya está registrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn register(
    State(app_state): State<AppState>,
    _cap: RequiereCapacidad<CapRegistrarUsuarios>,
    Json(payload): Json<RegistroPayload>,
) -> Result<Json<RespuestaAuth>, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let token = app_state
        .auth
        .registrar(&payload.email, &payload.password, payload.rol)
        .await?;

    Ok(Json(RespuestaAuth { token }))
}

// GET /api/auth/me
#[utoipa::path(
    get,
    path = "/api/auth/me",
    tag = "Auth",
    responses(
        (status = 200, description = "Sesión vigente", body = Sesion),
        (status = 401, description = "Token inválido")
    ),
    security(("api_jwt" = []))
)]
pub async fn me(SesionAutenticada(sesion): SesionAutenticada) -> Json<Sesion> {
    Json(sesion)
}
