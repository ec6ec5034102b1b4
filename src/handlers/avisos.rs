// src/handlers/avisos.rs

use axum::{
    extract::{Path, State},
    Json,
};
use serde_json::json;
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::capacidades::{CapGestionarAvisos, RequiereCapacidad},
    models::aviso::{
        Aviso, ImportarAvisosPayload, PrevisualizacionAvisos, ResultadoImportacion,
    },
    services::avisos,
};

// GET /api/avisos
#[utoipa::path(
    get,
    path = "/api/avisos",
    tag = "Avisos",
    responses(
        (status = 200, description = "Avisos cargados, ordenados por número", body = Vec<Aviso>)
    ),
    security(("api_jwt" = []))
)]
pub async fn listar(State(app_state): State<AppState>) -> Result<Json<Vec<Aviso>>, AppError> {
    Ok(Json(app_state.avisos.listar().await?))
}

// POST /api/avisos/previsualizar — parsea el CSV sin escribir nada
#[utoipa::path(
    post,
    path = "/api/avisos/previsualizar",
    tag = "Avisos",
    request_body = ImportarAvisosPayload,
    responses(
        (status = 200, description = "Vista previa del CSV", body = PrevisualizacionAvisos),
        (status = 400, description = "CSV sin las columnas requeridas")
    ),
    security(("api_jwt" = []))
)]
pub async fn previsualizar(
    Json(payload): Json<ImportarAvisosPayload>,
) -> Result<Json<PrevisualizacionAvisos>, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let registros = avisos::parsear_csv(&payload.contenido)?;
    Ok(Json(avisos::previsualizar(&registros)))
}

// POST /api/avisos/importar
#[utoipa::path(
    post,
    path = "/api/avisos/importar",
    tag = "Avisos",
    request_body = ImportarAvisosPayload,
    responses(
        (status = 200, description = "Resultado de la carga", body = ResultadoImportacion),
        (status = 400, description = "CSV sin las columnas requeridas"),
        (status = 403, description = "Capacidad faltante")
    ),
    security(("api_jwt" = []))
)]
pub async fn importar(
    State(app_state): State<AppState>,
    _cap: RequiereCapacidad<CapGestionarAvisos>,
    Json(payload): Json<ImportarAvisosPayload>,
) -> Result<Json<ResultadoImportacion>, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let registros = avisos::parsear_csv(&payload.contenido)?;
    Ok(Json(app_state.avisos.importar(registros).await))
}

// DELETE /api/avisos/{numero}
#[utoipa::path(
    delete,
    path = "/api/avisos/{numero}",
    tag = "Avisos",
    params(("numero" = String, Path, description = "Número de cliente normalizado")),
    responses(
        (status = 200, description = "Aviso eliminado"),
        (status = 404, description = "Aviso no encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn eliminar(
    State(app_state): State<AppState>,
    _cap: RequiereCapacidad<CapGestionarAvisos>,
    Path(numero): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    app_state.avisos.eliminar(&numero).await?;
    Ok(Json(json!({ "mensaje": "Aviso eliminado" })))
}

// DELETE /api/avisos — limpia toda la colección antes de una recarga
#[utoipa::path(
    delete,
    path = "/api/avisos",
    tag = "Avisos",
    responses(
        (status = 200, description = "Resultado de la limpieza", body = ResultadoImportacion),
        (status = 403, description = "Capacidad faltante")
    ),
    security(("api_jwt" = []))
)]
pub async fn eliminar_todos(
    State(app_state): State<AppState>,
    _cap: RequiereCapacidad<CapGestionarAvisos>,
) -> Result<Json<ResultadoImportacion>, AppError> {
    Ok(Json(app_state.avisos.eliminar_todos().await?))
}
