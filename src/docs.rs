// src/docs.rs

use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use utoipa::OpenApi;

use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Auth ---
        handlers::auth::login,
        handlers::auth::register,
        handlers::auth::me,

        // --- Clientes ---
        handlers::clientes::listar,
        handlers::clientes::detalle,
        handlers::clientes::eliminar,
        handlers::clientes::exportar,
        handlers::clientes::refrescar,
        handlers::clientes::sincronizar,

        // --- Avisos ---
        handlers::avisos::listar,
        handlers::avisos::previsualizar,
        handlers::avisos::importar,
        handlers::avisos::eliminar,
        handlers::avisos::eliminar_todos,

        // --- Dashboard ---
        handlers::dashboard::estadisticas,
        handlers::dashboard::mapa,

        // --- Admin ---
        handlers::admin::migrar_espejo,
    ),
    components(
        schemas(
            // --- Auth ---
            models::auth::Rol,
            models::auth::Sesion,
            models::auth::LoginPayload,
            models::auth::RegistroPayload,
            models::auth::RespuestaAuth,

            // --- Clientes ---
            models::cliente::Cliente,

            // --- Avisos ---
            models::aviso::Aviso,
            models::aviso::RegistroAviso,
            models::aviso::ImportarAvisosPayload,
            models::aviso::PrevisualizacionAvisos,
            models::aviso::ResultadoImportacion,

            // --- Dashboard ---
            crate::common::fechas::EstadisticasFechas,
            crate::services::zonal::ObjetivoZonal,
            crate::services::zonal::ClaseMarcador,
            crate::services::zonal::Cobertura,
            handlers::dashboard::RespuestaEstadisticas,
            handlers::dashboard::MarcadorMapa,
            handlers::dashboard::RespuestaMapa,

            // --- Admin ---
            crate::services::espejo::ResultadoMigracion,
        )
    ),
    tags(
        (name = "Auth", description = "Autenticación y registro de usuarios"),
        (name = "Clientes", description = "Lista sincronizada, detalle y exportación"),
        (name = "Avisos", description = "Carga y gestión de avisos operativos"),
        (name = "Dashboard", description = "Indicadores, mapa y avance zonal"),
        (name = "Admin", description = "Mantenciones del espejo de tiempo real")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "api_jwt",
            SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
        );
    }
}
