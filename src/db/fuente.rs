// src/db/fuente.rs

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::{
    common::error::AppError,
    db::{AvisoRepository, ClienteRepository},
    models::{aviso::Aviso, cliente::DocCliente},
    services::{avisos::AlmacenAvisos, sync::FuenteRemota},
};

/// Fuente remota del sincronizador respaldada por los repositorios del
/// almacén autoritativo.
#[derive(Clone)]
pub struct FuenteBaseDatos {
    clientes: ClienteRepository,
    avisos: AvisoRepository,
}

impl FuenteBaseDatos {
    pub fn new(clientes: ClienteRepository, avisos: AvisoRepository) -> Self {
        Self { clientes, avisos }
    }
}

#[async_trait]
impl FuenteRemota for FuenteBaseDatos {
    async fn clientes(&self) -> Result<Vec<DocCliente>, AppError> {
        self.clientes.todos().await
    }

    async fn clientes_desde_marca(&self, corte: DateTime<Utc>) -> Result<Vec<DocCliente>, AppError> {
        self.clientes.desde_marca(corte).await
    }

    async fn clientes_desde_iso(&self, corte: DateTime<Utc>) -> Result<Vec<DocCliente>, AppError> {
        self.clientes.desde_iso(corte).await
    }

    async fn avisos(&self) -> Result<Vec<Aviso>, AppError> {
        self.avisos.listar().await
    }
}
