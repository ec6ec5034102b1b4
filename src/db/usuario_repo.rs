// src/db/usuario_repo.rs

use sqlx::PgPool;

use crate::{
    common::error::AppError,
    models::auth::{Rol, Usuario},
};

// El repositorio de usuarios, responsable de toda interacción con la
// tabla 'usuarios'.
#[derive(Clone)]
pub struct UsuarioRepository {
    pool: PgPool,
}

impl UsuarioRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // Busca un usuario por su e-mail
    pub async fn buscar_por_email(&self, email: &str) -> Result<Option<Usuario>, AppError> {
        let usuario = sqlx::query_as::<_, Usuario>(
            "SELECT id, email, password_hash, rol, created_at, updated_at
             FROM usuarios WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(usuario)
    }

    // Crea un nuevo usuario en la base de datos
    pub async fn crear(
        &self,
        email: &str,
        password_hash: &str,
        rol: Rol,
    ) -> Result<Usuario, AppError> {
        sqlx::query_as::<_, Usuario>(
            "INSERT INTO usuarios (email, password_hash, rol)
             VALUES ($1, $2, $3)
             RETURNING id, email, password_hash, rol, created_at, updated_at",
        )
        .bind(email)
        .bind(password_hash)
        .bind(rol)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            // Convierte la violación de llave única en un error amigable
            if let Some(db_err) = e.as_database_error() {
                if db_err.is_unique_violation() {
                    return AppError::EmailYaExiste;
                }
            }
            e.into()
        })
    }
}
