// src/config.rs

use std::{env, path::Path, sync::Arc, time::Duration};

use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::{
    db::{AvisoRepository, CacheArchivo, ClienteRepository, EstadoArchivo, FuenteBaseDatos, UsuarioRepository},
    services::{
        auth::AuthService,
        avisos::AvisoService,
        clientes::ClienteService,
        espejo::{EspejoHttp, EspejoMemoria, EspejoService, EspejoTiempoReal},
        fotos::{AlmacenHttp, AlmacenNulo, AlmacenObjetos},
        sync::Sincronizador,
    },
};

#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub puerto: u16,
    pub auth: Arc<AuthService>,
    pub sincronizador: Arc<Sincronizador>,
    pub clientes: Arc<ClienteService>,
    pub avisos: AvisoService,
    pub espejo: EspejoService,
    pub cliente_repo: ClienteRepository,
}

impl AppState {
    pub async fn new() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let database_url = env::var("DATABASE_URL").expect("DATABASE_URL debe estar definida");
        let jwt_secret = env::var("JWT_SECRET").expect("JWT_SECRET debe estar definido");
        let cache_dir = env::var("CACHE_DIR").unwrap_or_else(|_| "datos_cache".to_string());
        let puerto = env::var("PUERTO")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(3000);

        let db_pool = PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&database_url)
            .await?;

        tracing::info!("✅ Conexión con la base de datos establecida");

        // --- Monta el grafo de dependencias ---
        let cliente_repo = ClienteRepository::new(db_pool.clone());
        let aviso_repo = AvisoRepository::new(db_pool.clone());
        let usuario_repo = UsuarioRepository::new(db_pool.clone());

        // Espejo de tiempo real: HTTP si hay URL, memoria si no
        let espejo_backend: Arc<dyn EspejoTiempoReal> = match env::var("ESPEJO_URL") {
            Ok(url) if !url.is_empty() => {
                tracing::info!("🔁 Espejo de tiempo real apuntando a {url}");
                Arc::new(EspejoHttp::new(url))
            }
            _ => {
                tracing::warn!("🔁 Sin ESPEJO_URL, el espejo vive en memoria");
                Arc::new(EspejoMemoria::default())
            }
        };
        let espejo = EspejoService::new(espejo_backend);

        // Bucket de fotos: igual que el espejo, opcional por entorno
        let almacen: Arc<dyn AlmacenObjetos> = match env::var("ALMACEN_URL") {
            Ok(url) if !url.is_empty() => Arc::new(AlmacenHttp::new(url)),
            _ => Arc::new(AlmacenNulo),
        };

        let cache_path = Path::new(&cache_dir);
        let sincronizador = Arc::new(Sincronizador::new(
            Arc::new(FuenteBaseDatos::new(cliente_repo.clone(), aviso_repo.clone())),
            Arc::new(CacheArchivo::new(cache_path)),
            Arc::new(EstadoArchivo::new(cache_path)),
        ));

        let auth = Arc::new(AuthService::new(usuario_repo, jwt_secret));
        let avisos = AvisoService::new(Arc::new(aviso_repo), espejo.clone());
        let clientes = Arc::new(ClienteService::new(
            cliente_repo.clone(),
            sincronizador.clone(),
            espejo.clone(),
            almacen,
        ));

        Ok(Self {
            db_pool,
            puerto,
            auth,
            sincronizador,
            clientes,
            avisos,
            espejo,
            cliente_repo,
        })
    }
}
