// src/models/cliente.rs

//! El documento de cliente tal como vive en el almacén (forma suelta,
//! campos heterogéneos) y el registro proyectado que consume la UI.
//!
//! La coerción de formas ocurre una sola vez, aquí en la frontera del
//! almacén: fechas en tres representaciones, coordenadas como número o
//! texto, y el número de cliente como string o entero.

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

use crate::common::numero::normalizar_numero_cliente;

/// Un campo que el levantamiento en terreno guarda a veces como string
/// y a veces como número.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TextoONumero {
    Numero(i64),
    Texto(String),
}

impl TextoONumero {
    pub fn como_texto(&self) -> String {
        match self {
            TextoONumero::Numero(n) => n.to_string(),
            TextoONumero::Texto(s) => s.clone(),
        }
    }
}

/// Coordenada geográfica, número o texto según el origen del registro.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Coordenada {
    Numero(f64),
    Texto(String),
}

impl Coordenada {
    pub fn valor(&self) -> Option<f64> {
        match self {
            Coordenada::Numero(n) if n.is_finite() => Some(*n),
            Coordenada::Numero(_) => None,
            Coordenada::Texto(s) => s.trim().parse::<f64>().ok().filter(|v| v.is_finite()),
        }
    }
}

/// `fechaRegistro` se almacenó de forma inconsistente a lo largo de la
/// vida del sistema: marca nativa `{seconds, nanoseconds}`, string ISO,
/// o epoch en milisegundos. Las tres formas se aceptan y se convierten
/// a `DateTime<Utc>`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FechaFlexible {
    Marca {
        #[serde(alias = "_seconds")]
        seconds: i64,
        #[serde(default, alias = "_nanoseconds")]
        nanoseconds: u32,
    },
    EpochMilis(i64),
    Iso(String),
}

impl FechaFlexible {
    pub fn a_fecha(&self) -> Option<DateTime<Utc>> {
        match self {
            FechaFlexible::Marca { seconds, nanoseconds } => {
                DateTime::from_timestamp(*seconds, *nanoseconds)
            }
            FechaFlexible::EpochMilis(ms) => DateTime::from_timestamp_millis(*ms),
            FechaFlexible::Iso(texto) => parsear_iso(texto),
        }
    }
}

fn parsear_iso(texto: &str) -> Option<DateTime<Utc>> {
    let texto = texto.trim();
    if let Ok(fecha) = DateTime::parse_from_rfc3339(texto) {
        return Some(fecha.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(texto, "%Y-%m-%d %H:%M:%S") {
        return Some(Utc.from_utc_datetime(&naive));
    }
    if let Ok(dia) = NaiveDate::parse_from_str(texto, "%Y-%m-%d") {
        return Some(Utc.from_utc_datetime(&dia.and_hms_opt(0, 0, 0)?));
    }
    None
}

/// Documento de cliente con forma suelta. Todos los campos son
/// opcionales: el proceso de levantamiento externo no garantiza ninguno.
/// Los campos que no modelamos se conservan en `extra` para que la
/// instantánea local y el espejo no pierdan información.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClienteDoc {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub numero_cliente: Option<TextoONumero>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nombre: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rut: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub direccion: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub correo: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub telefono: Option<TextoONumero>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub telefono2: Option<TextoONumero>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub marca: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modelo: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub medidor_instalado: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub medidor_retirado: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub poste: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latitud: Option<Coordenada>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub longitud: Option<Coordenada>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fecha_registro: Option<FechaFlexible>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub solicitante: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub origen_datos: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub relacion: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comentarios: Option<String>,
    /// Aviso embebido en el registro, superado por la colección de
    /// avisos cuando existe una entrada para la misma llave.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aviso: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub foto_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub foto_urls: Option<Vec<String>>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

impl ClienteDoc {
    /// Llave de reconciliación: número de cliente normalizado a 12
    /// dígitos, o string vacío si el documento no trae número.
    pub fn numero_normalizado(&self) -> String {
        match &self.numero_cliente {
            Some(valor) => normalizar_numero_cliente(&valor.como_texto()),
            None => String::new(),
        }
    }

    pub fn fecha(&self) -> Option<DateTime<Utc>> {
        self.fecha_registro.as_ref().and_then(FechaFlexible::a_fecha)
    }
}

/// Documento con su id asignado por el almacén.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocCliente {
    pub id: String,
    pub datos: ClienteDoc,
}

/// Registro proyectado para la UI: fechas coercionadas, aviso efectivo
/// resuelto y fotos deduplicadas.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Cliente {
    pub id: String,
    pub numero_cliente: String,
    pub nombre: String,
    pub rut: String,
    pub direccion: String,
    pub correo: String,
    pub telefono: String,
    pub telefono2: String,
    pub marca: String,
    pub modelo: String,
    pub medidor_instalado: String,
    pub medidor_retirado: String,
    pub poste: String,
    pub aviso: String,
    pub comentarios: String,
    pub latitud: Option<f64>,
    pub longitud: Option<f64>,
    #[schema(value_type = Option<String>, format = DateTime)]
    pub fecha_registro: Option<DateTime<Utc>>,
    pub solicitante: String,
    pub origen_datos: String,
    pub relacion: String,
    pub fotos: Vec<String>,
}

impl Cliente {
    /// Proyección de un documento. El aviso efectivo lo resuelve el
    /// sincronizador (colección de avisos > campo embebido > vacío).
    pub fn desde_documento(doc: &DocCliente, aviso_efectivo: String) -> Self {
        let d = &doc.datos;
        let texto = |campo: &Option<String>| campo.clone().unwrap_or_default();
        let numero = |campo: &Option<TextoONumero>| {
            campo.as_ref().map(TextoONumero::como_texto).unwrap_or_default()
        };

        Cliente {
            id: doc.id.clone(),
            numero_cliente: numero(&d.numero_cliente),
            nombre: texto(&d.nombre),
            rut: texto(&d.rut),
            direccion: texto(&d.direccion),
            correo: texto(&d.correo),
            telefono: numero(&d.telefono),
            telefono2: numero(&d.telefono2),
            marca: texto(&d.marca),
            modelo: texto(&d.modelo),
            medidor_instalado: texto(&d.medidor_instalado),
            medidor_retirado: texto(&d.medidor_retirado),
            poste: texto(&d.poste),
            aviso: aviso_efectivo,
            comentarios: texto(&d.comentarios),
            latitud: d.latitud.as_ref().and_then(Coordenada::valor),
            longitud: d.longitud.as_ref().and_then(Coordenada::valor),
            fecha_registro: doc.datos.fecha(),
            solicitante: texto(&d.solicitante),
            origen_datos: texto(&d.origen_datos),
            relacion: texto(&d.relacion),
            fotos: crate::services::fotos::fotos_de_documento(d),
        }
    }

    /// Llave de reconciliación del registro proyectado.
    pub fn numero_normalizado(&self) -> String {
        normalizar_numero_cliente(&self.numero_cliente)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc_desde_json(valor: Value) -> ClienteDoc {
        serde_json::from_value(valor).expect("documento válido")
    }

    #[test]
    fn acepta_fecha_como_marca_nativa() {
        let doc = doc_desde_json(json!({
            "numeroCliente": "123",
            "fechaRegistro": { "seconds": 1767225600, "nanoseconds": 0 }
        }));
        let fecha = doc.fecha().expect("fecha coercionada");
        assert_eq!(fecha.timestamp(), 1767225600);
    }

    #[test]
    fn acepta_fecha_como_string_iso() {
        let doc = doc_desde_json(json!({ "fechaRegistro": "2026-01-15T10:30:00Z" }));
        assert_eq!(doc.fecha().unwrap().to_rfc3339(), "2026-01-15T10:30:00+00:00");

        let solo_dia = doc_desde_json(json!({ "fechaRegistro": "2026-01-15" }));
        assert!(solo_dia.fecha().is_some());
    }

    #[test]
    fn acepta_fecha_como_epoch_en_milisegundos() {
        let doc = doc_desde_json(json!({ "fechaRegistro": 1767225600000i64 }));
        assert_eq!(doc.fecha().unwrap().timestamp(), 1767225600);
    }

    #[test]
    fn fecha_ilegible_queda_sin_fecha() {
        let doc = doc_desde_json(json!({ "fechaRegistro": "no es una fecha" }));
        assert!(doc.fecha().is_none());
    }

    #[test]
    fn numero_cliente_como_string_o_entero() {
        let texto = doc_desde_json(json!({ "numeroCliente": "000123" }));
        let entero = doc_desde_json(json!({ "numeroCliente": 123 }));
        assert_eq!(texto.numero_normalizado(), "000000000123");
        assert_eq!(entero.numero_normalizado(), "000000000123");
    }

    #[test]
    fn coordenadas_como_numero_o_texto() {
        let doc = doc_desde_json(json!({ "latitud": -33.4, "longitud": "-70.6" }));
        assert_eq!(doc.latitud.unwrap().valor(), Some(-33.4));
        assert_eq!(doc.longitud.unwrap().valor(), Some(-70.6));

        let invalida = doc_desde_json(json!({ "latitud": "s/n" }));
        assert_eq!(invalida.latitud.unwrap().valor(), None);
    }

    #[test]
    fn campos_desconocidos_se_conservan_en_extra() {
        let doc = doc_desde_json(json!({ "nombre": "Ana", "campoLibre": 7 }));
        assert_eq!(doc.extra.get("campoLibre"), Some(&json!(7)));

        let de_vuelta = serde_json::to_value(&doc).unwrap();
        assert_eq!(de_vuelta.get("campoLibre"), Some(&json!(7)));
    }
}
