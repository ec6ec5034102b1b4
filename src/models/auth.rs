// src/models/auth.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

// Rol del usuario. Vive como enum de Postgres y como claim del JWT:
// reemplaza al viejo e-mail de administrador codificado a mano.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "rol_usuario", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Rol {
    Administrador,
    Operador,
}

// Representa un usuario que viene de la base de datos
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Usuario {
    pub id: Uuid,
    pub email: String,

    #[serde(skip_serializing)] // IMPORTANTE para seguridad
    pub password_hash: String,

    pub rol: Rol,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Sesión reconstruida desde los claims del token, sin tocar la base.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Sesion {
    pub id: Uuid,
    pub email: String,
    pub rol: Rol,
}

/// Interfaz de capacidades sobre la sesión autenticada. Las pantallas
/// destructivas consultan esto, nunca comparan contra un literal.
pub trait Capacidades {
    fn puede_gestionar_avisos(&self) -> bool;
    fn puede_eliminar_clientes(&self) -> bool;
    fn puede_administrar_espejo(&self) -> bool;
    fn puede_registrar_usuarios(&self) -> bool;
}

impl Capacidades for Sesion {
    fn puede_gestionar_avisos(&self) -> bool {
        self.rol == Rol::Administrador
    }

    fn puede_eliminar_clientes(&self) -> bool {
        self.rol == Rol::Administrador
    }

    fn puede_administrar_espejo(&self) -> bool {
        self.rol == Rol::Administrador
    }

    fn puede_registrar_usuarios(&self) -> bool {
        self.rol == Rol::Administrador
    }
}

// Datos para login
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginPayload {
    #[validate(email(message = "El e-mail ingresado es inválido."))]
    #[schema(example = "operador@catastro.cl")]
    pub email: String,
    #[validate(length(min = 6, message = "La contraseña debe tener al menos 6 caracteres."))]
    pub password: String,
}

// Datos para registrar un nuevo operador (solo administradores)
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RegistroPayload {
    #[validate(email(message = "El e-mail ingresado es inválido."))]
    pub email: String,
    #[validate(length(min = 6, message = "La contraseña debe tener al menos 6 caracteres."))]
    pub password: String,
    pub rol: Rol,
}

// Respuesta de autenticación con el token
#[derive(Debug, Serialize, ToSchema)]
pub struct RespuestaAuth {
    pub token: String,
}

// Estructura de datos ("claims") dentro del JWT
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,    // ID del usuario
    pub email: String,
    pub rol: Rol,     // el claim que gatilla las capacidades
    pub exp: usize,   // cuándo expira el token
    pub iat: usize,   // cuándo fue emitido
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sesion(rol: Rol) -> Sesion {
        Sesion { id: Uuid::new_v4(), email: "x@catastro.cl".into(), rol }
    }

    #[test]
    fn el_administrador_tiene_todas_las_capacidades() {
        let admin = sesion(Rol::Administrador);
        assert!(admin.puede_gestionar_avisos());
        assert!(admin.puede_eliminar_clientes());
        assert!(admin.puede_administrar_espejo());
        assert!(admin.puede_registrar_usuarios());
    }

    #[test]
    fn el_operador_no_accede_a_superficies_destructivas() {
        let operador = sesion(Rol::Operador);
        assert!(!operador.puede_gestionar_avisos());
        assert!(!operador.puede_eliminar_clientes());
        assert!(!operador.puede_administrar_espejo());
    }
}
