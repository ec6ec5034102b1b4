// src/services/avisos.rs

//! Importador de avisos: parsea el CSV exportado desde SAP, muestra una
//! vista previa y hace la carga fila por fila. La carga es mejor
//! esfuerzo: cada fila es una escritura independiente, sin transacción
//! ni rollback, y el resultado reporta éxitos y errores por separado.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};

use crate::{
    common::error::AppError,
    common::numero::normalizar_numero_cliente,
    models::aviso::{Aviso, PrevisualizacionAvisos, RegistroAviso, ResultadoImportacion},
    services::espejo::EspejoService,
};

const FILAS_VISTA_PREVIA: usize = 10;

/// Almacén de avisos, como trait para sustituirlo en tests.
#[async_trait]
pub trait AlmacenAvisos: Send + Sync {
    async fn upsert(&self, aviso: &Aviso) -> Result<(), AppError>;
    async fn listar(&self) -> Result<Vec<Aviso>, AppError>;
    async fn eliminar(&self, numero_cliente: &str) -> Result<(), AppError>;
}

fn celdas(linea: &str) -> Vec<String> {
    linea
        .split([',', ';'])
        .map(|celda| celda.trim().trim_matches('"').trim().to_string())
        .collect()
}

/// Parsea un CSV/TXT delimitado por coma o punto y coma, con encabezado
/// obligatorio. Filas sin llave o sin texto de aviso se descartan en
/// silencio; un encabezado sin las columnas esperadas es error de
/// validación.
pub fn parsear_csv(texto: &str) -> Result<Vec<RegistroAviso>, AppError> {
    let lineas: Vec<&str> = texto.trim().lines().collect();
    if lineas.len() < 2 {
        return Ok(Vec::new());
    }

    let encabezados: Vec<String> =
        celdas(lineas[0]).into_iter().map(|c| c.to_lowercase()).collect();

    let indice_numero = encabezados
        .iter()
        .position(|c| c.contains("cliente") || c.contains("numero"));
    let indice_aviso = encabezados.iter().position(|c| c.contains("aviso"));

    let (Some(indice_numero), Some(indice_aviso)) = (indice_numero, indice_aviso) else {
        return Err(AppError::CsvInvalido(
            "El CSV debe tener columnas: numeroCliente, aviso".into(),
        ));
    };

    let mut registros = Vec::new();
    for linea in &lineas[1..] {
        let valores = celdas(linea);
        let numero_cliente = valores
            .get(indice_numero)
            .map(|v| normalizar_numero_cliente(v))
            .unwrap_or_default();
        let aviso = valores.get(indice_aviso).map(|v| v.trim().to_string()).unwrap_or_default();

        if !numero_cliente.is_empty() && !aviso.is_empty() {
            registros.push(RegistroAviso { numero_cliente, aviso });
        }
    }

    Ok(registros)
}

/// Vista previa para el operador: primeras filas más el "... y N más".
pub fn previsualizar(registros: &[RegistroAviso]) -> PrevisualizacionAvisos {
    PrevisualizacionAvisos {
        total: registros.len(),
        muestra: registros.iter().take(FILAS_VISTA_PREVIA).cloned().collect(),
        restantes: registros.len().saturating_sub(FILAS_VISTA_PREVIA),
    }
}

#[derive(Clone)]
pub struct AvisoService {
    almacen: Arc<dyn AlmacenAvisos>,
    espejo: EspejoService,
}

impl AvisoService {
    pub fn new(almacen: Arc<dyn AlmacenAvisos>, espejo: EspejoService) -> Self {
        Self { almacen, espejo }
    }

    /// Carga cada registro con una escritura individual (última gana
    /// por llave). El progreso parcial se conserva: las fallas se
    /// cuentan, se informan y no se reintentan.
    pub async fn importar(&self, registros: Vec<RegistroAviso>) -> ResultadoImportacion {
        let mut exitosos = 0usize;
        let mut errores = 0usize;
        let fecha_carga = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);

        for registro in registros {
            let aviso = Aviso {
                numero_cliente: registro.numero_cliente,
                aviso: registro.aviso,
                fecha_carga: fecha_carga.clone(),
            };
            match self.almacen.upsert(&aviso).await {
                Ok(()) => {
                    exitosos += 1;
                    self.espejo.aviso_escrito(&aviso).await;
                }
                Err(e) => {
                    tracing::error!("Error guardando aviso {}: {e}", aviso.numero_cliente);
                    errores += 1;
                }
            }
        }

        let mensaje = if errores > 0 {
            format!("{exitosos} avisos cargados correctamente, {errores} errores")
        } else {
            format!("{exitosos} avisos cargados correctamente")
        };

        ResultadoImportacion { exitosos, errores, mensaje }
    }

    pub async fn listar(&self) -> Result<Vec<Aviso>, AppError> {
        self.almacen.listar().await
    }

    pub async fn eliminar(&self, numero_cliente: &str) -> Result<(), AppError> {
        self.almacen.eliminar(numero_cliente).await?;
        self.espejo.aviso_eliminado(numero_cliente).await;
        Ok(())
    }

    /// Elimina todos los avisos, una llamada por registro, secuencial.
    /// Irreversible una vez confirmada; sin dry-run.
    pub async fn eliminar_todos(&self) -> Result<ResultadoImportacion, AppError> {
        let avisos = self.almacen.listar().await?;
        let mut exitosos = 0usize;
        let mut errores = 0usize;

        for aviso in avisos {
            match self.almacen.eliminar(&aviso.numero_cliente).await {
                Ok(()) => {
                    exitosos += 1;
                    self.espejo.aviso_eliminado(&aviso.numero_cliente).await;
                }
                Err(e) => {
                    tracing::error!("Error eliminando aviso {}: {e}", aviso.numero_cliente);
                    errores += 1;
                }
            }
        }

        let mensaje = if errores > 0 {
            format!("{exitosos} avisos eliminados, {errores} errores")
        } else {
            "Todos los avisos eliminados".to_string()
        };

        Ok(ResultadoImportacion { exitosos, errores, mensaje })
    }
}
