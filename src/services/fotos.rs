// src/services/fotos.rs

//! Fotos de cada cliente: unificación de los dos campos históricos del
//! documento y borrado de los objetos remotos al eliminar un registro.

use std::sync::Arc;

use async_trait::async_trait;
use percent_encoding::{percent_decode_str, utf8_percent_encode, NON_ALPHANUMERIC};
use url::Url;

use crate::{common::error::AppError, models::cliente::ClienteDoc};

/// Tope de fotos por cliente; los registros viejos traen URLs repetidas
/// entre `fotoUrl` y `fotoUrls`.
pub const MAX_FOTOS: usize = 3;

/// Lista efectiva de fotos: `fotoUrl` primero, después `fotoUrls`,
/// deduplicada conservando el orden y acotada a [`MAX_FOTOS`].
pub fn fotos_de_documento(datos: &ClienteDoc) -> Vec<String> {
    let mut fotos: Vec<String> = Vec::new();

    let mut agregar = |url: &str| {
        let url = url.trim();
        if !url.is_empty() && !fotos.iter().any(|f| f == url) && fotos.len() < MAX_FOTOS {
            fotos.push(url.to_string());
        }
    };

    if let Some(url) = &datos.foto_url {
        agregar(url);
    }
    if let Some(urls) = &datos.foto_urls {
        for url in urls {
            agregar(url);
        }
    }

    fotos
}

/// Ruta del objeto dentro del bucket a partir de su URL de descarga:
/// el segmento codificado que sigue a `/o/`, ya percent-decodificado.
/// `None` si la URL no tiene esa forma.
pub fn extraer_ruta_objeto(url: &str) -> Option<String> {
    let parseada = Url::parse(url).ok()?;
    let mut segmentos = parseada.path_segments()?;

    segmentos.find(|s| *s == "o")?;
    let codificado = segmentos.next().filter(|s| !s.is_empty())?;

    let ruta = percent_decode_str(codificado).decode_utf8().ok()?;
    Some(ruta.into_owned())
}

/// Nombre para mostrar de una foto: último componente de la ruta del
/// objeto, o `foto.jpg` si la URL no se puede interpretar.
pub fn nombre_archivo_desde_url(url: &str) -> String {
    extraer_ruta_objeto(url)
        .and_then(|ruta| ruta.rsplit('/').next().map(str::to_string))
        .filter(|nombre| !nombre.is_empty())
        .unwrap_or_else(|| "foto.jpg".to_string())
}

/// Backend de objetos binarios. El borrado de un cliente elimina sus
/// fotos a través de esta costura.
#[async_trait]
pub trait AlmacenObjetos: Send + Sync {
    async fn eliminar_objeto(&self, ruta: &str) -> Result<(), AppError>;
}

/// Bucket real detrás de una API HTTP estilo `{base}/o/{ruta codificada}`.
pub struct AlmacenHttp {
    base: String,
    http: reqwest::Client,
}

impl AlmacenHttp {
    pub fn new(base: String) -> Self {
        Self { base: base.trim_end_matches('/').to_string(), http: reqwest::Client::new() }
    }
}

#[async_trait]
impl AlmacenObjetos for AlmacenHttp {
    async fn eliminar_objeto(&self, ruta: &str) -> Result<(), AppError> {
        let codificada = utf8_percent_encode(ruta, NON_ALPHANUMERIC).to_string();
        let url = format!("{}/o/{}", self.base, codificada);

        self.http
            .delete(&url)
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(|e| AppError::InternalServerError(e.into()))?;

        Ok(())
    }
}

/// Sin bucket configurado: registra y sigue. Útil en desarrollo y en
/// los tests de borrado en cascada.
#[derive(Default)]
pub struct AlmacenNulo;

#[async_trait]
impl AlmacenObjetos for AlmacenNulo {
    async fn eliminar_objeto(&self, ruta: &str) -> Result<(), AppError> {
        tracing::debug!("🗑️ Sin almacén de objetos configurado, se omite: {ruta}");
        Ok(())
    }
}

pub type AlmacenCompartido = Arc<dyn AlmacenObjetos>;

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(valor: serde_json::Value) -> ClienteDoc {
        serde_json::from_value(valor).unwrap()
    }

    const URL_A: &str = "https://objetos.ejemplo.com/v0/b/catastro/o/fotos%2Fcliente1%2Fa.jpg?alt=media&token=abc";
    const URL_B: &str = "https://objetos.ejemplo.com/v0/b/catastro/o/fotos%2Fcliente1%2Fb.jpg?alt=media";

    #[test]
    fn une_ambos_campos_sin_duplicados() {
        let datos = doc(json!({
            "fotoUrl": URL_A,
            "fotoUrls": [URL_A, URL_B],
        }));
        assert_eq!(fotos_de_documento(&datos), vec![URL_A.to_string(), URL_B.to_string()]);
    }

    #[test]
    fn respeta_el_tope_de_fotos() {
        let datos = doc(json!({
            "fotoUrls": ["https://x/o/1.jpg", "https://x/o/2.jpg", "https://x/o/3.jpg", "https://x/o/4.jpg"],
        }));
        assert_eq!(fotos_de_documento(&datos).len(), MAX_FOTOS);
    }

    #[test]
    fn documento_sin_fotos_da_lista_vacia() {
        assert!(fotos_de_documento(&doc(json!({}))).is_empty());
        assert!(fotos_de_documento(&doc(json!({ "fotoUrl": "  " }))).is_empty());
    }

    #[test]
    fn extrae_la_ruta_decodificada() {
        assert_eq!(
            extraer_ruta_objeto(URL_A).as_deref(),
            Some("fotos/cliente1/a.jpg")
        );
        assert_eq!(extraer_ruta_objeto("https://ejemplo.com/sin/segmento"), None);
        assert_eq!(extraer_ruta_objeto("no es una url"), None);
    }

    #[test]
    fn nombre_visible_con_reserva() {
        assert_eq!(nombre_archivo_desde_url(URL_A), "a.jpg");
        assert_eq!(nombre_archivo_desde_url("zzz"), "foto.jpg");
    }
}
