// src/handlers/dashboard.rs

use axum::{extract::State, Json};
use chrono::Utc;
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    common::fechas::{self, EstadisticasFechas},
    config::AppState,
    services::zonal::{self, ClaseMarcador, Cobertura},
};

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RespuestaEstadisticas {
    pub registros: EstadisticasFechas,
    pub avisos: usize,
    pub cobertura_zonal: f64,
}

// GET /api/dashboard/estadisticas
#[utoipa::path(
    get,
    path = "/api/dashboard/estadisticas",
    tag = "Dashboard",
    responses(
        (status = 200, description = "Conteos de hoy, semana y total", body = RespuestaEstadisticas)
    ),
    security(("api_jwt" = []))
)]
pub async fn estadisticas(State(app_state): State<AppState>) -> Json<RespuestaEstadisticas> {
    let lista = app_state.clientes.listar().await;
    let ahora = Utc::now();

    let registros =
        fechas::estadisticas_fechas(lista.iter().map(|c| c.fecha_registro.as_ref()), &ahora);
    let con_aviso = lista.iter().filter(|c| !c.aviso.is_empty()).count();
    let cobertura = zonal::cobertura(&lista);

    Json(RespuestaEstadisticas {
        registros,
        avisos: con_aviso,
        cobertura_zonal: cobertura.porcentaje,
    })
}

/// Marcador listo para pintar: registro con coordenada válida más su
/// clase visual.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MarcadorMapa {
    pub id: String,
    pub numero_cliente: String,
    pub nombre: String,
    pub direccion: String,
    pub latitud: f64,
    pub longitud: f64,
    pub clase: ClaseMarcador,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RespuestaMapa {
    pub marcadores: Vec<MarcadorMapa>,
    pub cobertura: Cobertura,
}

// GET /api/dashboard/mapa — registros geodatados más los objetivos
// zonales pendientes (estos últimos viajan dentro de `cobertura`)
#[utoipa::path(
    get,
    path = "/api/dashboard/mapa",
    tag = "Dashboard",
    responses(
        (status = 200, description = "Marcadores y avance zonal", body = RespuestaMapa)
    ),
    security(("api_jwt" = []))
)]
pub async fn mapa(State(app_state): State<AppState>) -> Json<RespuestaMapa> {
    let lista = app_state.clientes.listar().await;

    let marcadores: Vec<MarcadorMapa> = lista
        .iter()
        .filter_map(|cliente| {
            let (latitud, longitud) =
                zonal::coordenadas_validas(cliente.latitud, cliente.longitud)?;
            Some(MarcadorMapa {
                id: cliente.id.clone(),
                numero_cliente: cliente.numero_cliente.clone(),
                nombre: cliente.nombre.clone(),
                direccion: cliente.direccion.clone(),
                latitud,
                longitud,
                clase: zonal::clase_de_cliente(cliente),
            })
        })
        .collect();

    let cobertura = zonal::cobertura(&lista);

    Json(RespuestaMapa { marcadores, cobertura })
}
