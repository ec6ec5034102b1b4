// src/common/error.rs

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

// Nuestro tipo de error, con `thiserror` para mejor ergonomía.
// Nada aquí es fatal para el proceso: todo degrada a una respuesta
// JSON con el código HTTP que corresponda.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Error de validación")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("Archivo CSV inválido: {0}")]
    CsvInvalido(String),

    #[error("El e-mail ya existe")]
    EmailYaExiste,

    #[error("Credenciales inválidas")]
    CredencialesInvalidas,

    #[error("Demasiados intentos de acceso")]
    DemasiadosIntentos,

    #[error("Token inválido")]
    TokenInvalido,

    #[error("Capacidad requerida: {0}")]
    CapacidadFaltante(&'static str),

    #[error("Usuario no encontrado")]
    UsuarioNoEncontrado,

    #[error("Cliente no encontrado")]
    ClienteNoEncontrado,

    #[error("Aviso no encontrado")]
    AvisoNoEncontrado,

    #[error("Error generando la planilla: {0}")]
    XlsxError(String),

    // Errores de base de datos (sqlx)
    #[error("Error de base de datos")]
    DatabaseError(#[from] sqlx::Error),

    // Variante genérica para cualquier otro error inesperado.
    #[error("Error interno del servidor")]
    InternalServerError(#[from] anyhow::Error),

    #[error("Error de Bcrypt: {0}")]
    BcryptError(#[from] bcrypt::BcryptError),

    #[error("Error de JWT: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            // Devolvemos el detalle completo de la validación.
            AppError::ValidationError(errors) => {
                let mut details = std::collections::HashMap::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages: Vec<String> = field_errors
                        .iter()
                        .filter_map(|e| e.message.as_ref().map(|m| m.to_string()))
                        .collect();
                    details.insert(field.to_string(), messages);
                }
                let body = Json(json!({
                    "error": "Uno o más campos son inválidos.",
                    "details": details,
                }));
                return (StatusCode::BAD_REQUEST, body).into_response();
            }
            AppError::CsvInvalido(detalle) => {
                let body = Json(json!({ "error": detalle }));
                return (StatusCode::BAD_REQUEST, body).into_response();
            }
            AppError::CapacidadFaltante(capacidad) => {
                let body = Json(json!({
                    "error": format!("Necesitas la capacidad '{capacidad}' para realizar esta acción.")
                }));
                return (StatusCode::FORBIDDEN, body).into_response();
            }
            AppError::EmailYaExiste => (StatusCode::CONFLICT, "Este e-mail ya está en uso."),
            AppError::CredencialesInvalidas => {
                (StatusCode::UNAUTHORIZED, "Email o contraseña incorrectos")
            }
            AppError::DemasiadosIntentos => {
                (StatusCode::TOO_MANY_REQUESTS, "Demasiados intentos. Intenta más tarde")
            }
            AppError::TokenInvalido => {
                (StatusCode::UNAUTHORIZED, "Token de autenticación inválido o ausente.")
            }
            AppError::UsuarioNoEncontrado => (StatusCode::NOT_FOUND, "Usuario no encontrado."),
            AppError::ClienteNoEncontrado => (StatusCode::NOT_FOUND, "Cliente no encontrado."),
            AppError::AvisoNoEncontrado => (StatusCode::NOT_FOUND, "Aviso no encontrado."),

            // Todo lo demás (DatabaseError, XlsxError, InternalServerError...)
            // se convierte en 500. `tracing` registra el detalle; al usuario
            // solo llega un mensaje genérico.
            ref e => {
                tracing::error!("Error interno del servidor: {e}");
                (StatusCode::INTERNAL_SERVER_ERROR, "Ocurrió un error inesperado.")
            }
        };

        // Respuesta estándar para errores simples con un solo mensaje.
        let body = Json(json!({ "error": error_message }));
        (status, body).into_response()
    }
}
