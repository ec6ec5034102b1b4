// src/services/clientes.rs

//! Ciclo de vida de los registros de cliente. Las lecturas salen de la
//! proyección en memoria del sincronizador; el borrado es en cascada:
//! fotos del bucket, documento en la base, espejo y copia local.

use std::sync::Arc;

use crate::{
    common::error::AppError,
    db::ClienteRepository,
    models::cliente::Cliente,
    services::{
        espejo::EspejoService,
        fotos::{self, AlmacenCompartido},
        sync::Sincronizador,
    },
};

pub struct ClienteService {
    repo: ClienteRepository,
    sincronizador: Arc<Sincronizador>,
    espejo: EspejoService,
    almacen: AlmacenCompartido,
}

impl ClienteService {
    pub fn new(
        repo: ClienteRepository,
        sincronizador: Arc<Sincronizador>,
        espejo: EspejoService,
        almacen: AlmacenCompartido,
    ) -> Self {
        Self { repo, sincronizador, espejo, almacen }
    }

    /// Lista proyectada vigente (ordenada y deduplicada).
    pub async fn listar(&self) -> Arc<Vec<Cliente>> {
        self.sincronizador.lista().await
    }

    pub async fn por_id(&self, id: &str) -> Result<Cliente, AppError> {
        self.sincronizador
            .por_id(id)
            .await
            .ok_or(AppError::ClienteNoEncontrado)
    }

    /// Borrado en cascada. Las fotos que no se pueden borrar se
    /// registran y no detienen la eliminación del registro.
    pub async fn eliminar(&self, id: &str) -> Result<(), AppError> {
        let doc = self.repo.por_id(id).await?.ok_or(AppError::ClienteNoEncontrado)?;

        for url in fotos::fotos_de_documento(&doc.datos) {
            let Some(ruta) = fotos::extraer_ruta_objeto(&url) else {
                tracing::warn!("📷 URL de foto sin ruta reconocible, se omite: {url}");
                continue;
            };
            if let Err(e) = self.almacen.eliminar_objeto(&ruta).await {
                tracing::warn!("📷 No se pudo borrar la foto {ruta}: {e}");
            }
        }

        self.repo.eliminar(id).await?;
        self.espejo.cliente_eliminado(id).await;
        self.sincronizador.eliminar_local(id).await;

        tracing::info!("✅ Cliente {id} eliminado con sus fotos");
        Ok(())
    }
}
