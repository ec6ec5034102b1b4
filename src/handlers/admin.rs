// src/handlers/admin.rs

use axum::{extract::State, Json};

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::capacidades::{CapAdministrarEspejo, RequiereCapacidad},
    services::espejo::ResultadoMigracion,
};

// POST /api/admin/migrar-espejo — copia masiva de clientes y avisos al
// espejo de tiempo real; los datos de origen no se tocan
#[utoipa::path(
    post,
    path = "/api/admin/migrar-espejo",
    tag = "Admin",
    responses(
        (status = 200, description = "Conteo de registros migrados", body = ResultadoMigracion),
        (status = 403, description = "Capacidad faltante")
    ),
    security(("api_jwt" = []))
)]
pub async fn migrar_espejo(
    State(app_state): State<AppState>,
    _cap: RequiereCapacidad<CapAdministrarEspejo>,
) -> Result<Json<ResultadoMigracion>, AppError> {
    let clientes = app_state.cliente_repo.todos().await?;
    let avisos = app_state.avisos.listar().await?;

    let resultado = app_state.espejo.migrar(&clientes, &avisos).await;
    tracing::info!(
        "🚀 Migración al espejo: {} clientes, {} avisos, {} errores",
        resultado.clientes,
        resultado.avisos,
        resultado.errores
    );

    Ok(Json(resultado))
}
