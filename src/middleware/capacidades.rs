// src/middleware/capacidades.rs

use axum::{extract::FromRequestParts, http::request::Parts};
use std::marker::PhantomData;

use crate::{
    common::error::AppError,
    models::auth::{Capacidades, Sesion},
};

/// 1. El trait que define una capacidad exigible en una ruta
pub trait CapacidadDef: Send + Sync + 'static {
    fn slug() -> &'static str;
    fn la_tiene(sesion: &Sesion) -> bool;
}

/// 2. El extractor (guardián): ponerlo como argumento del handler
/// exige la capacidad antes de ejecutar nada.
pub struct RequiereCapacidad<T>(pub PhantomData<T>);

impl<T, S> FromRequestParts<S> for RequiereCapacidad<T>
where
    T: CapacidadDef,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let sesion = parts
            .extensions
            .get::<Sesion>()
            .ok_or(AppError::TokenInvalido)?;

        if !T::la_tiene(sesion) {
            return Err(AppError::CapacidadFaltante(T::slug()));
        }

        Ok(RequiereCapacidad(PhantomData))
    }
}

// ---
// DEFINICIÓN DE LAS CAPACIDADES (TIPOS)
// ---

pub struct CapGestionarAvisos;
impl CapacidadDef for CapGestionarAvisos {
    fn slug() -> &'static str {
        "avisos:gestionar"
    }
    fn la_tiene(sesion: &Sesion) -> bool {
        sesion.puede_gestionar_avisos()
    }
}

pub struct CapEliminarClientes;
impl CapacidadDef for CapEliminarClientes {
    fn slug() -> &'static str {
        "clientes:eliminar"
    }
    fn la_tiene(sesion: &Sesion) -> bool {
        sesion.puede_eliminar_clientes()
    }
}

pub struct CapAdministrarEspejo;
impl CapacidadDef for CapAdministrarEspejo {
    fn slug() -> &'static str {
        "espejo:administrar"
    }
    fn la_tiene(sesion: &Sesion) -> bool {
        sesion.puede_administrar_espejo()
    }
}

pub struct CapRegistrarUsuarios;
impl CapacidadDef for CapRegistrarUsuarios {
    fn slug() -> &'static str {
        "usuarios:registrar"
    }
    fn la_tiene(sesion: &Sesion) -> bool {
        sesion.puede_registrar_usuarios()
    }
}
