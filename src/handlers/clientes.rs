// src/handlers/clientes.rs

use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use serde_json::json;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::capacidades::{CapEliminarClientes, RequiereCapacidad},
    models::cliente::Cliente,
    services::export,
};

// GET /api/clientes
#[utoipa::path(
    get,
    path = "/api/clientes",
    tag = "Clientes",
    responses(
        (status = 200, description = "Lista proyectada de clientes", body = Vec<Cliente>)
    ),
    security(("api_jwt" = []))
)]
pub async fn listar(State(app_state): State<AppState>) -> Json<Vec<Cliente>> {
    let lista = app_state.clientes.listar().await;
    Json(lista.as_ref().clone())
}

// GET /api/clientes/{id}
#[utoipa::path(
    get,
    path = "/api/clientes/{id}",
    tag = "Clientes",
    params(("id" = String, Path, description = "Id del documento")),
    responses(
        (status = 200, description = "Detalle del cliente", body = Cliente),
        (status = 404, description = "Cliente no encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn detalle(
    State(app_state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Cliente>, AppError> {
    Ok(Json(app_state.clientes.por_id(&id).await?))
}

// DELETE /api/clientes/{id} — borrado en cascada (fotos, base, espejo)
#[utoipa::path(
    delete,
    path = "/api/clientes/{id}",
    tag = "Clientes",
    params(("id" = String, Path, description = "Id del documento")),
    responses(
        (status = 200, description = "Cliente eliminado"),
        (status = 403, description = "Capacidad faltante"),
        (status = 404, description = "Cliente no encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn eliminar(
    State(app_state): State<AppState>,
    _cap: RequiereCapacidad<CapEliminarClientes>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    app_state.clientes.eliminar(&id).await?;
    Ok(Json(json!({ "mensaje": "Cliente eliminado" })))
}

// GET /api/clientes/exportar — descarga xlsx de la lista vigente
#[utoipa::path(
    get,
    path = "/api/clientes/exportar",
    tag = "Clientes",
    responses(
        (status = 200, description = "Libro Excel con la lista de clientes")
    ),
    security(("api_jwt" = []))
)]
pub async fn exportar(State(app_state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let lista = app_state.clientes.listar().await;
    let buffer = export::exportar_clientes_xlsx(&lista)?;
    let nombre = export::nombre_archivo();

    Ok((
        StatusCode::OK,
        [
            (
                header::CONTENT_TYPE,
                "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet".to_string(),
            ),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{nombre}\""),
            ),
        ],
        buffer,
    ))
}

// POST /api/clientes/refrescar — trae solo lo nuevo desde la marca
#[utoipa::path(
    post,
    path = "/api/clientes/refrescar",
    tag = "Clientes",
    responses(
        (status = 200, description = "Refresco incremental aplicado")
    ),
    security(("api_jwt" = []))
)]
pub async fn refrescar(State(app_state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    app_state.sincronizador.refrescar().await?;
    let total = app_state.sincronizador.lista().await.len();
    Ok(Json(json!({ "mensaje": "Refresco aplicado", "total": total })))
}

// POST /api/clientes/sincronizar — descarga completa forzada
#[utoipa::path(
    post,
    path = "/api/clientes/sincronizar",
    tag = "Clientes",
    responses(
        (status = 200, description = "Sincronización completa aplicada")
    ),
    security(("api_jwt" = []))
)]
pub async fn sincronizar(
    State(app_state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    app_state.sincronizador.sincronizar_completo().await?;
    let total = app_state.sincronizador.lista().await.len();
    Ok(Json(json!({ "mensaje": "Sincronización completa", "total": total })))
}
