// src/db/cache_local.rs

//! Persistencia local simple en archivos JSON: la instantánea de ambas
//! colecciones y el estado de sincronización. Sin locking: procesos
//! concurrentes pueden pisarse, y el peor caso aceptado es una
//! resincronización completa redundante.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use anyhow::Context;

use crate::{
    common::error::AppError,
    services::sync::{CacheLocal, EstadoSync, Instantanea, MetaSync},
};

const ARCHIVO_INSTANTANEA: &str = "instantanea.json";
const ARCHIVO_ESTADO: &str = "estado_sync.json";

#[derive(Clone)]
pub struct CacheArchivo {
    ruta: PathBuf,
}

impl CacheArchivo {
    pub fn new(directorio: &Path) -> Self {
        Self { ruta: directorio.join(ARCHIVO_INSTANTANEA) }
    }
}

#[async_trait]
impl CacheLocal for CacheArchivo {
    async fn leer(&self) -> Result<Option<Instantanea>, AppError> {
        let crudo = match tokio::fs::read(&self.ruta).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(anyhow::Error::new(e).context("leyendo la instantánea").into()),
        };

        let instantanea =
            serde_json::from_slice(&crudo).context("instantánea local corrupta")?;
        Ok(Some(instantanea))
    }

    async fn guardar(&self, instantanea: &Instantanea) -> Result<(), AppError> {
        if let Some(padre) = self.ruta.parent() {
            tokio::fs::create_dir_all(padre)
                .await
                .context("creando el directorio de caché")?;
        }
        let cuerpo = serde_json::to_vec(instantanea).context("serializando la instantánea")?;
        tokio::fs::write(&self.ruta, cuerpo)
            .await
            .context("escribiendo la instantánea")?;
        Ok(())
    }
}

#[derive(Clone)]
pub struct EstadoArchivo {
    ruta: PathBuf,
}

impl EstadoArchivo {
    pub fn new(directorio: &Path) -> Self {
        Self { ruta: directorio.join(ARCHIVO_ESTADO) }
    }
}

#[async_trait]
impl EstadoSync for EstadoArchivo {
    async fn leer(&self) -> Result<Option<MetaSync>, AppError> {
        let crudo = match tokio::fs::read(&self.ruta).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(anyhow::Error::new(e).context("leyendo el estado de sync").into()),
        };

        let meta = serde_json::from_slice(&crudo).context("estado de sync corrupto")?;
        Ok(Some(meta))
    }

    async fn guardar(&self, meta: &MetaSync) -> Result<(), AppError> {
        if let Some(padre) = self.ruta.parent() {
            tokio::fs::create_dir_all(padre)
                .await
                .context("creando el directorio de caché")?;
        }
        let cuerpo = serde_json::to_vec(meta).context("serializando el estado de sync")?;
        tokio::fs::write(&self.ruta, cuerpo)
            .await
            .context("escribiendo el estado de sync")?;
        Ok(())
    }

    async fn limpiar(&self) -> Result<(), AppError> {
        match tokio::fs::remove_file(&self.ruta).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(anyhow::Error::new(e).context("limpiando el estado de sync").into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use crate::services::sync::VERSION_SYNC;

    fn directorio_temporal(nombre: &str) -> PathBuf {
        let ruta = std::env::temp_dir().join(format!("catastro_test_{nombre}_{}", uuid::Uuid::new_v4()));
        ruta
    }

    #[tokio::test]
    async fn instantanea_va_y_vuelve() {
        let dir = directorio_temporal("cache");
        let cache = CacheArchivo::new(&dir);

        assert!(cache.leer().await.unwrap().is_none());

        let instantanea = Instantanea::default();
        cache.guardar(&instantanea).await.unwrap();
        assert!(cache.leer().await.unwrap().is_some());

        let _ = tokio::fs::remove_dir_all(&dir).await;
    }

    #[tokio::test]
    async fn estado_se_guarda_y_se_limpia() {
        let dir = directorio_temporal("estado");
        let estado = EstadoArchivo::new(&dir);

        let meta = MetaSync { version: VERSION_SYNC, ultima_sync: Utc::now() };
        estado.guardar(&meta).await.unwrap();
        assert_eq!(estado.leer().await.unwrap(), Some(meta));

        estado.limpiar().await.unwrap();
        assert!(estado.leer().await.unwrap().is_none());
        // limpiar dos veces no es error
        estado.limpiar().await.unwrap();

        let _ = tokio::fs::remove_dir_all(&dir).await;
    }

    #[tokio::test]
    async fn archivo_corrupto_es_error_legible() {
        let dir = directorio_temporal("corrupto");
        tokio::fs::create_dir_all(&dir).await.unwrap();
        tokio::fs::write(dir.join(ARCHIVO_INSTANTANEA), b"{no es json")
            .await
            .unwrap();

        let cache = CacheArchivo::new(&dir);
        // El sincronizador traga este error y lo trata como miss.
        assert!(cache.leer().await.is_err());

        let _ = tokio::fs::remove_dir_all(&dir).await;
    }
}
