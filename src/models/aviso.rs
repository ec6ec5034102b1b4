// src/models/aviso.rs

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

// Un aviso operacional importado desde SAP, con el número de cliente
// normalizado como llave del documento.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Aviso {
    pub numero_cliente: String,
    pub aviso: String,
    /// Fecha de carga como string ISO-8601.
    pub fecha_carga: String,
}

/// Una fila (llave, texto) salida del parser de CSV, previa al commit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegistroAviso {
    pub numero_cliente: String,
    pub aviso: String,
}

// Cuerpo para previsualizar o importar un CSV de avisos.
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ImportarAvisosPayload {
    #[validate(length(min = 1, message = "El contenido del archivo no puede estar vacío"))]
    #[schema(example = "numeroCliente;aviso\n000123;Revisar medidor")]
    pub contenido: String,
}

/// Vista previa mostrada al operador antes de confirmar la carga.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PrevisualizacionAvisos {
    pub total: usize,
    /// Primeras 10 filas.
    pub muestra: Vec<RegistroAviso>,
    /// "... y N más".
    pub restantes: usize,
}

/// Resultado de la carga por filas: éxito parcial aceptado, sin rollback.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ResultadoImportacion {
    pub exitosos: usize,
    pub errores: usize,
    pub mensaje: String,
}
