// src/middleware/auth.rs

use axum::{
    extract::{FromRequestParts, State},
    http::request::Parts,
    middleware::Next,
    response::Response,
};

use crate::{common::error::AppError, config::AppState, models::auth::Sesion};

// El middleware en sí: valida el Bearer token y deja la sesión en las
// extensiones del request para los extractores de más abajo.
pub async fn auth_guard(
    State(app_state): State<AppState>,
    mut request: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Result<Response, AppError> {
    let auth_header = request
        .headers()
        .get("Authorization")
        .and_then(|value| value.to_str().ok());

    if let Some(auth_header) = auth_header {
        if let Some(token) = auth_header.strip_prefix("Bearer ") {
            let sesion = app_state.auth.sesion_desde_token(token)?;
            request.extensions_mut().insert(sesion);
            return Ok(next.run(request).await);
        }
    }

    Err(AppError::TokenInvalido)
}

// Extractor para obtener la sesión directamente en los handlers
pub struct SesionAutenticada(pub Sesion);

impl<S> FromRequestParts<S> for SesionAutenticada
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Sesion>()
            .cloned()
            .map(SesionAutenticada)
            .ok_or(AppError::TokenInvalido)
    }
}
