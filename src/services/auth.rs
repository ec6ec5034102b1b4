// src/services/auth.rs

use std::{
    collections::HashMap,
    sync::Mutex,
    time::{Duration, Instant},
};

use bcrypt::{hash, verify};
use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};

use crate::{
    common::error::AppError,
    db::UsuarioRepository,
    models::auth::{Claims, Rol, Sesion, Usuario},
};

const MAX_INTENTOS: usize = 5;
const VENTANA_INTENTOS: Duration = Duration::from_secs(15 * 60);

/// Contador de intentos fallidos por email con ventana deslizante.
/// Vive en memoria del proceso; un reinicio limpia los contadores.
#[derive(Default)]
pub struct RegistroIntentos {
    fallidos: Mutex<HashMap<String, Vec<Instant>>>,
}

impl RegistroIntentos {
    /// `Err(DemasiadosIntentos)` cuando el email agotó su cuota.
    pub fn verificar(&self, email: &str) -> Result<(), AppError> {
        let mut fallidos = self.fallidos.lock().unwrap_or_else(|e| e.into_inner());
        let ahora = Instant::now();

        if let Some(marcas) = fallidos.get_mut(email) {
            marcas.retain(|m| ahora.duration_since(*m) < VENTANA_INTENTOS);
            if marcas.len() >= MAX_INTENTOS {
                return Err(AppError::DemasiadosIntentos);
            }
        }
        Ok(())
    }

    pub fn registrar_fallo(&self, email: &str) {
        let mut fallidos = self.fallidos.lock().unwrap_or_else(|e| e.into_inner());
        fallidos.entry(email.to_string()).or_default().push(Instant::now());
    }

    pub fn limpiar(&self, email: &str) {
        let mut fallidos = self.fallidos.lock().unwrap_or_else(|e| e.into_inner());
        fallidos.remove(email);
    }
}

pub struct AuthService {
    usuario_repo: UsuarioRepository,
    jwt_secret: String,
    intentos: RegistroIntentos,
}

impl AuthService {
    pub fn new(usuario_repo: UsuarioRepository, jwt_secret: String) -> Self {
        Self { usuario_repo, jwt_secret, intentos: RegistroIntentos::default() }
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<String, AppError> {
        self.intentos.verificar(email)?;

        let usuario = self
            .usuario_repo
            .buscar_por_email(email)
            .await?
            .ok_or_else(|| {
                self.intentos.registrar_fallo(email);
                AppError::CredencialesInvalidas
            })?;

        let password = password.to_owned();
        let hash_guardado = usuario.password_hash.clone();

        // bcrypt es intencionalmente lento; fuera del runtime
        let valida = tokio::task::spawn_blocking(move || verify(&password, &hash_guardado))
            .await
            .map_err(|e| anyhow::anyhow!("Falla en la tarea de verificación: {e}"))??;

        if !valida {
            self.intentos.registrar_fallo(email);
            return Err(AppError::CredencialesInvalidas);
        }

        self.intentos.limpiar(email);
        self.crear_token(&usuario)
    }

    pub async fn registrar(
        &self,
        email: &str,
        password: &str,
        rol: Rol,
    ) -> Result<String, AppError> {
        let password = password.to_owned();
        let password_hash = tokio::task::spawn_blocking(move || {
            hash(&password, bcrypt::DEFAULT_COST)
        })
        .await
        .map_err(|e| anyhow::anyhow!("Falla en la tarea de hashing: {e}"))??;

        let usuario = self.usuario_repo.crear(email, &password_hash, rol).await?;
        tracing::info!("✅ Usuario registrado: {} ({:?})", usuario.email, usuario.rol);

        self.crear_token(&usuario)
    }

    /// Decodifica y valida un token, devolviendo la sesión que viaja
    /// en las extensiones del request.
    pub fn sesion_desde_token(&self, token: &str) -> Result<Sesion, AppError> {
        let datos = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.jwt_secret.as_ref()),
            &Validation::default(),
        )
        .map_err(|_| AppError::TokenInvalido)?;

        Ok(Sesion {
            id: datos.claims.sub,
            email: datos.claims.email,
            rol: datos.claims.rol,
        })
    }

    fn crear_token(&self, usuario: &Usuario) -> Result<String, AppError> {
        let ahora = Utc::now();
        let expira = ahora + chrono::Duration::days(7);

        let claims = Claims {
            sub: usuario.id,
            email: usuario.email.clone(),
            rol: usuario.rol,
            exp: expira.timestamp() as usize,
            iat: ahora.timestamp() as usize,
        };

        Ok(encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_ref()),
        )?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn token_ida_y_vuelta_conserva_la_sesion() {
        let claims = Claims {
            sub: Uuid::new_v4(),
            email: "operador@catastro.cl".into(),
            rol: Rol::Operador,
            exp: (Utc::now() + chrono::Duration::hours(1)).timestamp() as usize,
            iat: Utc::now().timestamp() as usize,
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(b"secreto-de-prueba"),
        )
        .unwrap();

        let datos = decode::<Claims>(
            &token,
            &DecodingKey::from_secret(b"secreto-de-prueba"),
            &Validation::default(),
        )
        .unwrap();

        assert_eq!(datos.claims.sub, claims.sub);
        assert_eq!(datos.claims.email, claims.email);
        assert_eq!(datos.claims.rol, Rol::Operador);
    }

    #[test]
    fn token_expirado_se_rechaza() {
        let claims = Claims {
            sub: Uuid::new_v4(),
            email: "x@catastro.cl".into(),
            rol: Rol::Operador,
            exp: (Utc::now() - chrono::Duration::hours(1)).timestamp() as usize,
            iat: (Utc::now() - chrono::Duration::hours(2)).timestamp() as usize,
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(b"secreto-de-prueba"),
        )
        .unwrap();

        let resultado = decode::<Claims>(
            &token,
            &DecodingKey::from_secret(b"secreto-de-prueba"),
            &Validation::default(),
        );
        assert!(resultado.is_err());
    }

    #[test]
    fn la_cuota_de_intentos_se_agota_y_se_limpia() {
        let intentos = RegistroIntentos::default();

        for _ in 0..MAX_INTENTOS {
            assert!(intentos.verificar("a@b.cl").is_ok());
            intentos.registrar_fallo("a@b.cl");
        }
        assert!(matches!(
            intentos.verificar("a@b.cl"),
            Err(AppError::DemasiadosIntentos)
        ));
        // otro email no comparte la cuota
        assert!(intentos.verificar("otro@b.cl").is_ok());

        intentos.limpiar("a@b.cl");
        assert!(intentos.verificar("a@b.cl").is_ok());
    }
}
