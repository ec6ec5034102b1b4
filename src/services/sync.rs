// src/services/sync.rs

//! El sincronizador de clientes: carga una instantánea local para
//! render inmediato, hace una sincronización completa contra el almacén
//! remoto, y soporta refrescos incrementales "desde la última sync".
//!
//! Las tres dependencias (fuente remota, caché local, estado de sync)
//! entran como traits inyectables para poder sustituirlas en tests.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::{
    common::error::AppError,
    common::numero::normalizar_numero_cliente,
    models::aviso::Aviso,
    models::cliente::{Cliente, DocCliente},
};

/// Versión del esquema de sincronización. Si el estado persistido trae
/// otra versión, la marca de última sync se descarta y se fuerza una
/// resincronización completa.
pub const VERSION_SYNC: u32 = 3;

/// Margen de seguridad del refresco incremental: tolera latencia de
/// escritura y desfase de reloj entre quien registró y este proceso.
const MARGEN_REFRESCO_SEGUNDOS: i64 = 5 * 60;

/// Almacén remoto autoritativo, en contratos estrechos. Las dos
/// consultas "desde" existen porque `fechaRegistro` quedó almacenada en
/// dos representaciones distintas; el sincronizador corre ambas y une.
#[async_trait]
pub trait FuenteRemota: Send + Sync {
    async fn clientes(&self) -> Result<Vec<DocCliente>, AppError>;
    async fn clientes_desde_marca(&self, corte: DateTime<Utc>) -> Result<Vec<DocCliente>, AppError>;
    async fn clientes_desde_iso(&self, corte: DateTime<Utc>) -> Result<Vec<DocCliente>, AppError>;
    async fn avisos(&self) -> Result<Vec<Aviso>, AppError>;
}

/// Instantánea local de ambas colecciones.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Instantanea {
    pub clientes: Vec<DocCliente>,
    pub avisos: Vec<Aviso>,
}

#[async_trait]
pub trait CacheLocal: Send + Sync {
    async fn leer(&self) -> Result<Option<Instantanea>, AppError>;
    async fn guardar(&self, instantanea: &Instantanea) -> Result<(), AppError>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetaSync {
    pub version: u32,
    pub ultima_sync: DateTime<Utc>,
}

/// Estado de sincronización persistido, con get/set/clear explícitos.
#[async_trait]
pub trait EstadoSync: Send + Sync {
    async fn leer(&self) -> Result<Option<MetaSync>, AppError>;
    async fn guardar(&self, meta: &MetaSync) -> Result<(), AppError>;
    async fn limpiar(&self) -> Result<(), AppError>;
}

pub struct Sincronizador {
    fuente: Arc<dyn FuenteRemota>,
    cache: Arc<dyn CacheLocal>,
    estado: Arc<dyn EstadoSync>,
    // Conjunto de trabajo, por id del almacén. Solo el propio
    // sincronizador lo muta.
    conjunto: RwLock<HashMap<String, DocCliente>>,
    avisos: RwLock<Vec<Aviso>>,
    proyeccion: RwLock<Arc<Vec<Cliente>>>,
}

impl Sincronizador {
    pub fn new(
        fuente: Arc<dyn FuenteRemota>,
        cache: Arc<dyn CacheLocal>,
        estado: Arc<dyn EstadoSync>,
    ) -> Self {
        Self {
            fuente,
            cache,
            estado,
            conjunto: RwLock::new(HashMap::new()),
            avisos: RwLock::new(Vec::new()),
            proyeccion: RwLock::new(Arc::new(Vec::new())),
        }
    }

    /// Montaje: valida la versión del estado, publica la instantánea
    /// local si existe (camino rápido sin costo de red) y luego hace
    /// siempre una sincronización completa contra el almacén.
    pub async fn montar(&self) -> Result<(), AppError> {
        self.validar_version().await;

        if self.cargar_desde_cache().await {
            let total = self.proyeccion.read().await.len();
            tracing::info!("Instantánea local publicada: {total} clientes (sin costo de red)");
        }

        self.sincronizar_completo().await
    }

    async fn validar_version(&self) {
        match self.estado.leer().await {
            Ok(Some(meta)) if meta.version != VERSION_SYNC => {
                tracing::info!(
                    "Estado de sync con versión {} (actual {VERSION_SYNC}): se descarta la última marca",
                    meta.version
                );
                if let Err(e) = self.estado.limpiar().await {
                    tracing::warn!("No se pudo limpiar el estado de sync: {e}");
                }
            }
            Ok(_) => {}
            // Estado ilegible equivale a no tener estado.
            Err(e) => tracing::debug!("Estado de sync ilegible: {e}"),
        }
    }

    /// Camino optimista: si la caché local trae al menos un cliente,
    /// se proyecta y publica de inmediato. Fallas de lectura se tragan
    /// y se tratan como caché vacía.
    async fn cargar_desde_cache(&self) -> bool {
        let instantanea = match self.cache.leer().await {
            Ok(Some(i)) if !i.clientes.is_empty() => i,
            Ok(_) => return false,
            Err(e) => {
                tracing::debug!("Caché local ilegible, se trata como miss: {e}");
                return false;
            }
        };

        {
            let mut conjunto = self.conjunto.write().await;
            *conjunto = instantanea
                .clientes
                .into_iter()
                .map(|doc| (doc.id.clone(), doc))
                .collect();
            *self.avisos.write().await = instantanea.avisos;
        }

        self.proyectar().await;
        true
    }

    /// Reemplazo total del conjunto de trabajo desde el almacén remoto.
    pub async fn sincronizar_completo(&self) -> Result<(), AppError> {
        let (clientes, avisos) =
            tokio::try_join!(self.fuente.clientes(), self.fuente.avisos())?;

        tracing::info!(
            "Sincronización completa: {} clientes, {} avisos",
            clientes.len(),
            avisos.len()
        );

        {
            let mut conjunto = self.conjunto.write().await;
            *conjunto = clientes.into_iter().map(|doc| (doc.id.clone(), doc)).collect();
            *self.avisos.write().await = avisos;
        }

        self.proyectar().await;
        self.marcar_sincronizado().await;
        self.guardar_cache().await;
        Ok(())
    }

    /// Refresco incremental: consulta solo registros posteriores a la
    /// última sync menos el margen de seguridad, en las dos
    /// representaciones de fecha en paralelo, y une por id. Los avisos
    /// se refrescan desde la caché local, no del servidor. Cualquier
    /// falla de las consultas cae automáticamente a sync completa.
    pub async fn refrescar(&self) -> Result<(), AppError> {
        let meta = match self.estado.leer().await {
            Ok(meta) => meta,
            Err(e) => {
                tracing::debug!("Estado de sync ilegible: {e}");
                None
            }
        };

        let Some(meta) = meta else {
            return self.sincronizar_completo().await;
        };

        let corte = meta.ultima_sync - Duration::seconds(MARGEN_REFRESCO_SEGUNDOS);

        let (por_marca, por_iso) = tokio::join!(
            self.fuente.clientes_desde_marca(corte),
            self.fuente.clientes_desde_iso(corte),
        );

        let (por_marca, por_iso) = match (por_marca, por_iso) {
            (Ok(a), Ok(b)) => (a, b),
            (resultado_a, resultado_b) => {
                let error = resultado_a.err().or(resultado_b.err());
                tracing::warn!(
                    "Refresco incremental falló ({error:?}): cayendo a sincronización completa"
                );
                return self.sincronizar_completo().await;
            }
        };

        // Unión por id: un registro puede aparecer en ambas consultas.
        let mut nuevos: HashMap<String, DocCliente> = HashMap::new();
        for doc in por_marca.into_iter().chain(por_iso) {
            nuevos.insert(doc.id.clone(), doc);
        }

        if let Ok(Some(instantanea)) = self.cache.leer().await {
            *self.avisos.write().await = instantanea.avisos;
        }

        let hay_nuevos = !nuevos.is_empty();
        if hay_nuevos {
            tracing::info!("Refresco incremental: {} registros nuevos/actualizados", nuevos.len());
            let mut conjunto = self.conjunto.write().await;
            for (id, doc) in nuevos {
                conjunto.insert(id, doc);
            }
        }

        // Siempre se reproyecta, para recoger cambios puramente locales.
        self.proyectar().await;

        if hay_nuevos {
            self.marcar_sincronizado().await;
            self.guardar_cache().await;
        }

        Ok(())
    }

    /// Saca un documento del conjunto de trabajo (tras una eliminación
    /// confirmada en el almacén) y reproyecta.
    pub async fn eliminar_local(&self, id: &str) {
        self.conjunto.write().await.remove(id);
        self.proyectar().await;
        self.guardar_cache().await;
    }

    /// Lista proyectada vigente (compartida, barata de clonar).
    pub async fn lista(&self) -> Arc<Vec<Cliente>> {
        self.proyeccion.read().await.clone()
    }

    pub async fn por_id(&self, id: &str) -> Option<Cliente> {
        self.proyeccion.read().await.iter().find(|c| c.id == id).cloned()
    }

    /// Proyección compartida por todos los caminos: aviso efectivo,
    /// orden descendente por fecha (sin fecha al final, orden estable),
    /// deduplicación por llave normalizada conservando la primera
    /// aparición post-orden (= la más reciente).
    async fn proyectar(&self) {
        let conjunto = self.conjunto.read().await;
        let avisos = self.avisos.read().await;

        let mapa_avisos: HashMap<String, &str> = avisos
            .iter()
            .map(|a| (normalizar_numero_cliente(&a.numero_cliente), a.aviso.as_str()))
            .collect();

        let mut lista: Vec<Cliente> = conjunto
            .values()
            .map(|doc| {
                let llave = doc.datos.numero_normalizado();
                let aviso = if llave.is_empty() {
                    None
                } else {
                    mapa_avisos.get(&llave).map(|texto| texto.to_string())
                }
                .or_else(|| doc.datos.aviso.clone())
                .unwrap_or_default();
                Cliente::desde_documento(doc, aviso)
            })
            .collect();

        // Orden base determinista por id; luego orden estable por fecha.
        lista.sort_by(|a, b| a.id.cmp(&b.id));
        lista.sort_by(|a, b| match (&a.fecha_registro, &b.fecha_registro) {
            (None, None) => std::cmp::Ordering::Equal,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (Some(_), None) => std::cmp::Ordering::Less,
            (Some(fa), Some(fb)) => fb.cmp(fa),
        });

        let mut vistas = HashSet::new();
        lista.retain(|cliente| {
            let llave = cliente.numero_normalizado();
            if llave.is_empty() {
                // Sin llave no hay deduplicación: cada registro queda
                // bajo su propio id del almacén.
                return true;
            }
            vistas.insert(llave)
        });

        *self.proyeccion.write().await = Arc::new(lista);
    }

    async fn marcar_sincronizado(&self) {
        let meta = MetaSync { version: VERSION_SYNC, ultima_sync: Utc::now() };
        if let Err(e) = self.estado.guardar(&meta).await {
            // Peor caso: una resincronización completa redundante.
            tracing::warn!("No se pudo persistir la marca de sync: {e}");
        }
    }

    async fn guardar_cache(&self) {
        let instantanea = {
            let conjunto = self.conjunto.read().await;
            let avisos = self.avisos.read().await;
            Instantanea {
                clientes: conjunto.values().cloned().collect(),
                avisos: avisos.clone(),
            }
        };
        if let Err(e) = self.cache.guardar(&instantanea).await {
            tracing::warn!("No se pudo escribir la instantánea local: {e}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    fn doc(id: &str, numero: Option<&str>, fecha_iso: Option<&str>) -> DocCliente {
        let mut cuerpo = json!({});
        if let Some(n) = numero {
            cuerpo["numeroCliente"] = json!(n);
        }
        if let Some(f) = fecha_iso {
            cuerpo["fechaRegistro"] = json!(f);
        }
        DocCliente { id: id.into(), datos: serde_json::from_value(cuerpo).unwrap() }
    }

    fn aviso(numero: &str, texto: &str) -> Aviso {
        Aviso {
            numero_cliente: numero.into(),
            aviso: texto.into(),
            fecha_carga: "2026-01-01T00:00:00Z".into(),
        }
    }

    #[derive(Default)]
    struct FuenteFalsa {
        clientes: Mutex<Vec<DocCliente>>,
        avisos: Mutex<Vec<Aviso>>,
        incrementales_marca: Mutex<Vec<DocCliente>>,
        incrementales_iso: Mutex<Vec<DocCliente>>,
        fallar_todo: AtomicBool,
        fallar_incremental: AtomicBool,
        lecturas_completas: AtomicUsize,
        cortes: Mutex<Vec<DateTime<Utc>>>,
    }

    #[async_trait]
    impl FuenteRemota for FuenteFalsa {
        async fn clientes(&self) -> Result<Vec<DocCliente>, AppError> {
            if self.fallar_todo.load(Ordering::SeqCst) {
                return Err(AppError::InternalServerError(anyhow::anyhow!("sin red")));
            }
            self.lecturas_completas.fetch_add(1, Ordering::SeqCst);
            Ok(self.clientes.lock().unwrap().clone())
        }

        async fn clientes_desde_marca(
            &self,
            corte: DateTime<Utc>,
        ) -> Result<Vec<DocCliente>, AppError> {
            self.cortes.lock().unwrap().push(corte);
            if self.fallar_incremental.load(Ordering::SeqCst) {
                return Err(AppError::InternalServerError(anyhow::anyhow!("consulta rechazada")));
            }
            Ok(self.incrementales_marca.lock().unwrap().clone())
        }

        async fn clientes_desde_iso(
            &self,
            corte: DateTime<Utc>,
        ) -> Result<Vec<DocCliente>, AppError> {
            self.cortes.lock().unwrap().push(corte);
            if self.fallar_incremental.load(Ordering::SeqCst) {
                return Err(AppError::InternalServerError(anyhow::anyhow!("consulta rechazada")));
            }
            Ok(self.incrementales_iso.lock().unwrap().clone())
        }

        async fn avisos(&self) -> Result<Vec<Aviso>, AppError> {
            if self.fallar_todo.load(Ordering::SeqCst) {
                return Err(AppError::InternalServerError(anyhow::anyhow!("sin red")));
            }
            Ok(self.avisos.lock().unwrap().clone())
        }
    }

    #[derive(Default)]
    struct CacheMemoria {
        contenido: Mutex<Option<Instantanea>>,
        fallar_lectura: AtomicBool,
    }

    #[async_trait]
    impl CacheLocal for CacheMemoria {
        async fn leer(&self) -> Result<Option<Instantanea>, AppError> {
            if self.fallar_lectura.load(Ordering::SeqCst) {
                return Err(AppError::InternalServerError(anyhow::anyhow!("caché corrupta")));
            }
            Ok(self.contenido.lock().unwrap().clone())
        }

        async fn guardar(&self, instantanea: &Instantanea) -> Result<(), AppError> {
            *self.contenido.lock().unwrap() = Some(instantanea.clone());
            Ok(())
        }
    }

    #[derive(Default)]
    struct EstadoMemoria {
        meta: Mutex<Option<MetaSync>>,
    }

    #[async_trait]
    impl EstadoSync for EstadoMemoria {
        async fn leer(&self) -> Result<Option<MetaSync>, AppError> {
            Ok(self.meta.lock().unwrap().clone())
        }

        async fn guardar(&self, meta: &MetaSync) -> Result<(), AppError> {
            *self.meta.lock().unwrap() = Some(meta.clone());
            Ok(())
        }

        async fn limpiar(&self) -> Result<(), AppError> {
            *self.meta.lock().unwrap() = None;
            Ok(())
        }
    }

    fn armar(
        fuente: Arc<FuenteFalsa>,
        cache: Arc<CacheMemoria>,
        estado: Arc<EstadoMemoria>,
    ) -> Sincronizador {
        Sincronizador::new(fuente, cache, estado)
    }

    #[tokio::test]
    async fn proyeccion_deduplica_por_llave_conservando_el_mas_reciente() {
        let fuente = Arc::new(FuenteFalsa::default());
        *fuente.clientes.lock().unwrap() = vec![
            doc("a", Some("123"), Some("2026-01-01T00:00:00Z")),
            doc("b", Some("000123"), Some("2026-02-01T00:00:00Z")),
            doc("c", Some("999"), Some("2026-01-15T00:00:00Z")),
        ];
        let sync = armar(fuente, Arc::default(), Arc::default());

        sync.sincronizar_completo().await.unwrap();
        let lista = sync.lista().await;

        assert_eq!(lista.len(), 2);
        // Ambas variantes crudas ("123" y "000123") son el mismo cliente
        // lógico; sobrevive el del 1 de febrero.
        assert_eq!(lista[0].id, "b");
        let llaves: Vec<String> = lista.iter().map(|c| c.numero_normalizado()).collect();
        let unicas: HashSet<&String> = llaves.iter().collect();
        assert_eq!(llaves.len(), unicas.len());
    }

    #[tokio::test]
    async fn el_aviso_de_la_coleccion_tiene_prioridad_sobre_el_embebido() {
        let fuente = Arc::new(FuenteFalsa::default());
        let mut con_embebido = doc("a", Some("123"), None);
        con_embebido.datos.aviso = Some("aviso viejo".into());
        let sin_aviso = doc("b", Some("456"), None);
        *fuente.clientes.lock().unwrap() = vec![con_embebido, sin_aviso.clone()];
        *fuente.avisos.lock().unwrap() = vec![aviso("000000000123", "aviso importado")];

        let sync = armar(fuente, Arc::default(), Arc::default());
        sync.sincronizar_completo().await.unwrap();

        let lista = sync.lista().await;
        let por_numero = |n: &str| lista.iter().find(|c| c.numero_cliente == n).unwrap();
        assert_eq!(por_numero("123").aviso, "aviso importado");
        assert_eq!(por_numero("456").aviso, "");
    }

    #[tokio::test]
    async fn orden_descendente_y_sin_fecha_al_final() {
        let fuente = Arc::new(FuenteFalsa::default());
        *fuente.clientes.lock().unwrap() = vec![
            doc("viejo", Some("1"), Some("2025-06-01T00:00:00Z")),
            doc("sin_fecha_b", Some("2"), None),
            doc("nuevo", Some("3"), Some("2026-02-01T00:00:00Z")),
            doc("sin_fecha_a", Some("4"), None),
        ];
        let sync = armar(fuente, Arc::default(), Arc::default());
        sync.sincronizar_completo().await.unwrap();

        let lista = sync.lista().await;
        let ids: Vec<&str> = lista.iter().map(|c| c.id.as_str()).collect();
        // Con fecha primero (descendente); los sin fecha al final en su
        // orden base estable.
        assert_eq!(ids, vec!["nuevo", "viejo", "sin_fecha_a", "sin_fecha_b"]);
    }

    #[tokio::test]
    async fn registros_sin_llave_nunca_se_deduplican_entre_si() {
        let fuente = Arc::new(FuenteFalsa::default());
        *fuente.clientes.lock().unwrap() =
            vec![doc("x", None, None), doc("y", None, None), doc("z", Some(""), None)];
        let sync = armar(fuente, Arc::default(), Arc::default());
        sync.sincronizar_completo().await.unwrap();

        assert_eq!(sync.lista().await.len(), 3);
    }

    #[tokio::test]
    async fn montar_publica_la_cache_y_luego_reemplaza_con_el_servidor() {
        let cache = Arc::new(CacheMemoria::default());
        *cache.contenido.lock().unwrap() = Some(Instantanea {
            clientes: vec![doc("solo_cache", Some("111"), None)],
            avisos: vec![],
        });

        let fuente = Arc::new(FuenteFalsa::default());
        *fuente.clientes.lock().unwrap() = vec![doc("remoto", Some("222"), None)];

        let sync = armar(fuente, cache.clone(), Arc::default());
        sync.montar().await.unwrap();

        // Reemplazo total: el registro que solo existía en la caché no
        // sobrevive a la sincronización completa.
        let lista = sync.lista().await;
        assert_eq!(lista.len(), 1);
        assert_eq!(lista[0].id, "remoto");

        // Y la caché quedó reescrita con el estado del servidor.
        let instantanea = cache.contenido.lock().unwrap().clone().unwrap();
        assert_eq!(instantanea.clientes.len(), 1);
        assert_eq!(instantanea.clientes[0].id, "remoto");
    }

    #[tokio::test]
    async fn falla_de_lectura_de_cache_se_trata_como_miss() {
        let cache = Arc::new(CacheMemoria::default());
        cache.fallar_lectura.store(true, Ordering::SeqCst);

        let fuente = Arc::new(FuenteFalsa::default());
        *fuente.clientes.lock().unwrap() = vec![doc("remoto", Some("1"), None)];

        let sync = armar(fuente, cache, Arc::default());
        sync.montar().await.unwrap();
        assert_eq!(sync.lista().await.len(), 1);
    }

    #[tokio::test]
    async fn version_distinta_descarta_la_marca_de_sync() {
        let estado = Arc::new(EstadoMemoria::default());
        *estado.meta.lock().unwrap() =
            Some(MetaSync { version: VERSION_SYNC - 1, ultima_sync: Utc::now() });

        let fuente = Arc::new(FuenteFalsa::default());
        fuente.fallar_todo.store(true, Ordering::SeqCst);

        let sync = armar(fuente, Arc::default(), estado.clone());
        // La sync completa falla, pero la marca vieja ya fue descartada.
        assert!(sync.montar().await.is_err());
        assert!(estado.meta.lock().unwrap().is_none());
    }

    #[tokio::test]
    async fn refrescar_sin_marca_hace_sincronizacion_completa() {
        let fuente = Arc::new(FuenteFalsa::default());
        let sync = armar(fuente.clone(), Arc::default(), Arc::default());

        sync.refrescar().await.unwrap();
        assert_eq!(fuente.lecturas_completas.load(Ordering::SeqCst), 1);
        assert!(fuente.cortes.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn refrescar_usa_el_corte_con_margen_de_cinco_minutos() {
        let ultima = Utc::now();
        let estado = Arc::new(EstadoMemoria::default());
        *estado.meta.lock().unwrap() =
            Some(MetaSync { version: VERSION_SYNC, ultima_sync: ultima });

        let fuente = Arc::new(FuenteFalsa::default());
        let sync = armar(fuente.clone(), Arc::default(), estado);
        sync.refrescar().await.unwrap();

        let cortes = fuente.cortes.lock().unwrap();
        assert_eq!(cortes.len(), 2); // una por representación
        for corte in cortes.iter() {
            assert_eq!(*corte, ultima - Duration::seconds(MARGEN_REFRESCO_SEGUNDOS));
        }
    }

    #[tokio::test]
    async fn refrescar_une_ambas_consultas_por_id_y_mergea_el_conjunto() {
        let estado = Arc::new(EstadoMemoria::default());
        *estado.meta.lock().unwrap() =
            Some(MetaSync { version: VERSION_SYNC, ultima_sync: Utc::now() });

        let fuente = Arc::new(FuenteFalsa::default());
        *fuente.clientes.lock().unwrap() = vec![doc("a", Some("1"), Some("2026-01-01T00:00:00Z"))];
        let sync = armar(fuente.clone(), Arc::default(), estado);
        sync.sincronizar_completo().await.unwrap();

        // El mismo id aparece por ambas representaciones, más uno nuevo.
        *fuente.incrementales_marca.lock().unwrap() =
            vec![doc("b", Some("2"), Some("2026-02-01T00:00:00Z"))];
        *fuente.incrementales_iso.lock().unwrap() = vec![
            doc("b", Some("2"), Some("2026-02-01T00:00:00Z")),
            doc("c", Some("3"), Some("2026-02-02T00:00:00Z")),
        ];

        sync.refrescar().await.unwrap();
        let lista = sync.lista().await;
        assert_eq!(lista.len(), 3);
        assert_eq!(lista[0].id, "c"); // el más reciente primero
    }

    #[tokio::test]
    async fn refrescar_cae_a_sync_completa_si_la_consulta_incremental_falla() {
        let estado = Arc::new(EstadoMemoria::default());
        *estado.meta.lock().unwrap() =
            Some(MetaSync { version: VERSION_SYNC, ultima_sync: Utc::now() });

        let fuente = Arc::new(FuenteFalsa::default());
        *fuente.clientes.lock().unwrap() = vec![
            doc("a", Some("1"), Some("2026-01-01T00:00:00Z")),
            doc("b", Some("2"), Some("2026-01-02T00:00:00Z")),
        ];
        fuente.fallar_incremental.store(true, Ordering::SeqCst);

        let sync = armar(fuente.clone(), Arc::default(), estado);
        sync.refrescar().await.unwrap();

        // El resultado es idéntico al de una sync completa del mismo
        // estado remoto.
        assert_eq!(fuente.lecturas_completas.load(Ordering::SeqCst), 1);
        let lista = sync.lista().await;
        let ids: Vec<&str> = lista.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "a"]);
    }

    #[tokio::test]
    async fn refrescar_sin_resultados_no_actualiza_la_marca() {
        let antigua = Utc::now() - Duration::hours(2);
        let estado = Arc::new(EstadoMemoria::default());
        *estado.meta.lock().unwrap() =
            Some(MetaSync { version: VERSION_SYNC, ultima_sync: antigua });

        let fuente = Arc::new(FuenteFalsa::default());
        let sync = armar(fuente, Arc::default(), estado.clone());
        sync.refrescar().await.unwrap();

        let meta = estado.meta.lock().unwrap().clone().unwrap();
        assert_eq!(meta.ultima_sync, antigua);
    }

    #[tokio::test]
    async fn eliminar_local_saca_el_registro_y_reproyecta() {
        let fuente = Arc::new(FuenteFalsa::default());
        *fuente.clientes.lock().unwrap() =
            vec![doc("a", Some("1"), None), doc("b", Some("2"), None)];
        let sync = armar(fuente, Arc::default(), Arc::default());
        sync.sincronizar_completo().await.unwrap();

        sync.eliminar_local("a").await;
        let lista = sync.lista().await;
        assert_eq!(lista.len(), 1);
        assert_eq!(lista[0].id, "b");
    }
}
