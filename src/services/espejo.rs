// src/services/espejo.rs

//! Espejo llave-valor de lectura barata. Cada escritura o eliminación
//! de documentos dentro del proceso se propaga bajo la misma llave
//! (`clientes/{id}`, `avisos/{numero}`).
//!
//! El espejo no acepta valores nulos, y las marcas de tiempo nativas
//! viajan como strings ISO.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat};
use serde::Serialize;
use serde_json::Value;
use tokio::sync::RwLock;
use utoipa::ToSchema;

use crate::{common::error::AppError, models::aviso::Aviso};

#[async_trait]
pub trait EspejoTiempoReal: Send + Sync {
    async fn escribir(&self, ruta: &str, valor: &Value) -> Result<(), AppError>;
    async fn eliminar(&self, ruta: &str) -> Result<(), AppError>;
}

/// ¿Es este objeto una marca de tiempo nativa `{seconds, nanoseconds}`?
fn como_marca(objeto: &serde_json::Map<String, Value>) -> Option<String> {
    let seconds = objeto
        .get("seconds")
        .or_else(|| objeto.get("_seconds"))?
        .as_i64()?;
    let nanoseconds = objeto
        .get("nanoseconds")
        .or_else(|| objeto.get("_nanoseconds"))
        .and_then(Value::as_i64)
        .unwrap_or(0) as u32;

    let reconocidas = ["seconds", "nanoseconds", "_seconds", "_nanoseconds"];
    if !objeto.keys().all(|k| reconocidas.contains(&k.as_str())) {
        return None;
    }

    DateTime::from_timestamp(seconds, nanoseconds)
        .map(|fecha| fecha.to_rfc3339_opts(SecondsFormat::Millis, true))
}

/// Limpia un valor para el espejo: descarta nulos recursivamente y
/// convierte marcas de tiempo nativas a string ISO. `None` significa
/// "no escribir este campo".
pub fn limpiar_para_espejo(valor: &Value) -> Option<Value> {
    match valor {
        Value::Null => None,
        Value::Object(objeto) => {
            if let Some(iso) = como_marca(objeto) {
                return Some(Value::String(iso));
            }
            let limpio: serde_json::Map<String, Value> = objeto
                .iter()
                .filter_map(|(llave, v)| limpiar_para_espejo(v).map(|v| (llave.clone(), v)))
                .collect();
            Some(Value::Object(limpio))
        }
        otro => Some(otro.clone()),
    }
}

/// Resultado de la migración masiva al espejo.
#[derive(Debug, Default, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ResultadoMigracion {
    pub clientes: usize,
    pub avisos: usize,
    pub errores: usize,
}

#[derive(Clone)]
pub struct EspejoService {
    espejo: Arc<dyn EspejoTiempoReal>,
}

impl EspejoService {
    pub fn new(espejo: Arc<dyn EspejoTiempoReal>) -> Self {
        Self { espejo }
    }

    async fn propagar(&self, ruta: String, valor: &impl Serialize) {
        let crudo = match serde_json::to_value(valor) {
            Ok(v) => v,
            Err(e) => {
                tracing::error!("[SYNC] No se pudo serializar {ruta}: {e}");
                return;
            }
        };
        let limpio = limpiar_para_espejo(&crudo).unwrap_or(Value::Object(Default::default()));

        if let Err(e) = self.espejo.escribir(&ruta, &limpio).await {
            // El trigger nunca falla a quien escribió el documento.
            tracing::error!("[SYNC] Error sincronizando {ruta} al espejo: {e}");
        } else {
            tracing::debug!("[SYNC] {ruta} sincronizado al espejo");
        }
    }

    async fn retirar(&self, ruta: String) {
        if let Err(e) = self.espejo.eliminar(&ruta).await {
            tracing::error!("[SYNC] Error eliminando {ruta} del espejo: {e}");
        }
    }

    pub async fn cliente_eliminado(&self, id: &str) {
        self.retirar(format!("clientes/{id}")).await;
    }

    pub async fn aviso_escrito(&self, aviso: &Aviso) {
        self.propagar(format!("avisos/{}", aviso.numero_cliente), aviso).await;
    }

    pub async fn aviso_eliminado(&self, numero_cliente: &str) {
        self.retirar(format!("avisos/{numero_cliente}")).await;
    }

    /// Copia masiva de ambas colecciones al espejo (los datos de origen
    /// no se tocan). Las fallas por registro se cuentan y se sigue.
    pub async fn migrar(
        &self,
        clientes: &[crate::models::cliente::DocCliente],
        avisos: &[Aviso],
    ) -> ResultadoMigracion {
        let mut resultado = ResultadoMigracion::default();

        for doc in clientes {
            let crudo = match serde_json::to_value(&doc.datos) {
                Ok(v) => v,
                Err(_) => {
                    resultado.errores += 1;
                    continue;
                }
            };
            let limpio = limpiar_para_espejo(&crudo).unwrap_or(Value::Object(Default::default()));
            match self.espejo.escribir(&format!("clientes/{}", doc.id), &limpio).await {
                Ok(()) => resultado.clientes += 1,
                Err(e) => {
                    tracing::error!("[SYNC] Migración de cliente {} falló: {e}", doc.id);
                    resultado.errores += 1;
                }
            }
        }

        for aviso in avisos {
            let crudo = serde_json::to_value(aviso).unwrap_or(Value::Null);
            let limpio = limpiar_para_espejo(&crudo).unwrap_or(Value::Object(Default::default()));
            match self
                .espejo
                .escribir(&format!("avisos/{}", aviso.numero_cliente), &limpio)
                .await
            {
                Ok(()) => resultado.avisos += 1,
                Err(e) => {
                    tracing::error!(
                        "[SYNC] Migración de aviso {} falló: {e}",
                        aviso.numero_cliente
                    );
                    resultado.errores += 1;
                }
            }
        }

        tracing::info!(
            "Migración al espejo: {} clientes, {} avisos, {} errores",
            resultado.clientes,
            resultado.avisos,
            resultado.errores
        );
        resultado
    }
}

/// Espejo en memoria: el valor por defecto cuando no hay un endpoint
/// configurado, y el doble de pruebas.
#[derive(Default)]
pub struct EspejoMemoria {
    arbol: RwLock<HashMap<String, Value>>,
}

impl EspejoMemoria {
    pub async fn valor(&self, ruta: &str) -> Option<Value> {
        self.arbol.read().await.get(ruta).cloned()
    }
}

#[async_trait]
impl EspejoTiempoReal for EspejoMemoria {
    async fn escribir(&self, ruta: &str, valor: &Value) -> Result<(), AppError> {
        self.arbol.write().await.insert(ruta.to_string(), valor.clone());
        Ok(())
    }

    async fn eliminar(&self, ruta: &str) -> Result<(), AppError> {
        self.arbol.write().await.remove(ruta);
        Ok(())
    }
}

/// Espejo contra un endpoint REST estilo RTDB: `PUT {base}/{ruta}.json`
/// escribe el valor completo bajo la llave, `DELETE` la retira.
pub struct EspejoHttp {
    cliente: reqwest::Client,
    base: String,
}

impl EspejoHttp {
    pub fn new(base: String) -> Self {
        Self { cliente: reqwest::Client::new(), base: base.trim_end_matches('/').to_string() }
    }

    fn url(&self, ruta: &str) -> String {
        format!("{}/{ruta}.json", self.base)
    }
}

#[async_trait]
impl EspejoTiempoReal for EspejoHttp {
    async fn escribir(&self, ruta: &str, valor: &Value) -> Result<(), AppError> {
        let respuesta = self
            .cliente
            .put(self.url(ruta))
            .json(valor)
            .send()
            .await
            .map_err(anyhow::Error::new)?;

        respuesta.error_for_status().map_err(anyhow::Error::new)?;
        Ok(())
    }

    async fn eliminar(&self, ruta: &str) -> Result<(), AppError> {
        let respuesta = self
            .cliente
            .delete(self.url(ruta))
            .send()
            .await
            .map_err(anyhow::Error::new)?;

        respuesta.error_for_status().map_err(anyhow::Error::new)?;
        Ok(())
    }
}
