//src/main.rs

use axum::{
    middleware as axum_middleware,
    routing::{delete, get, post},
    Router,
};
use tokio::net::TcpListener;
use utoipa_swagger_ui::SwaggerUi;

// Declaración de nuestros módulos
mod common;
mod config;
mod db;
mod docs;
mod handlers;
mod middleware;
mod models;
mod services;

use crate::config::AppState;
use crate::docs::ApiDoc;
use crate::middleware::auth::auth_guard;
use utoipa::OpenApi;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt().with_target(false).compact().init();

    // .expect() está bien acá: si la configuración falla, la
    // aplicación no debe partir.
    let app_state = AppState::new()
        .await
        .expect("Falla al inicializar el estado de la aplicación.");

    sqlx::migrate!()
        .run(&app_state.db_pool)
        .await
        .expect("Falla al correr las migraciones de la base de datos.");

    tracing::info!("✅ Migraciones de la base de datos ejecutadas");

    // El montaje inicial corre de fondo: si el almacén no responde el
    // servidor igual parte y sirve la instantánea local.
    let sincronizador = app_state.sincronizador.clone();
    tokio::spawn(async move {
        if let Err(e) = sincronizador.montar().await {
            tracing::error!("[SYNC] Falla en el montaje inicial: {e}");
        }
    });

    // Login público; el registro y /me van detrás del guardián (el
    // registro exige además la capacidad de registrar usuarios)
    let auth_routes = Router::new()
        .route("/login", post(handlers::auth::login))
        .merge(
            Router::new()
                .route("/register", post(handlers::auth::register))
                .route("/me", get(handlers::auth::me))
                .layer(axum_middleware::from_fn_with_state(
                    app_state.clone(),
                    auth_guard,
                )),
        );

    let cliente_routes = Router::new()
        .route("/", get(handlers::clientes::listar))
        .route("/exportar", get(handlers::clientes::exportar))
        .route("/refrescar", post(handlers::clientes::refrescar))
        .route("/sincronizar", post(handlers::clientes::sincronizar))
        .route(
            "/{id}",
            get(handlers::clientes::detalle).delete(handlers::clientes::eliminar),
        )
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    let aviso_routes = Router::new()
        .route(
            "/",
            get(handlers::avisos::listar).delete(handlers::avisos::eliminar_todos),
        )
        .route("/previsualizar", post(handlers::avisos::previsualizar))
        .route("/importar", post(handlers::avisos::importar))
        .route("/{numero}", delete(handlers::avisos::eliminar))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    let dashboard_routes = Router::new()
        .route("/estadisticas", get(handlers::dashboard::estadisticas))
        .route("/mapa", get(handlers::dashboard::mapa))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    let admin_routes = Router::new()
        .route("/migrar-espejo", post(handlers::admin::migrar_espejo))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    let puerto = app_state.puerto;

    // Combina todo en el router principal
    let app = Router::new()
        .route("/api/health", get(|| async { "OK" }))
        .nest("/api/auth", auth_routes)
        .nest("/api/clientes", cliente_routes)
        .nest("/api/avisos", aviso_routes)
        .nest("/api/dashboard", dashboard_routes)
        .nest("/api/admin", admin_routes)
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .with_state(app_state);

    let addr = format!("0.0.0.0:{puerto}");
    let listener = TcpListener::bind(&addr)
        .await
        .expect("Falla al iniciar el listener TCP");
    tracing::info!("🚀 Servidor escuchando en {}", listener.local_addr().unwrap());
    axum::serve(listener, app)
        .await
        .expect("Error en el servidor Axum");
}
