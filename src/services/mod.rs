// src/services/mod.rs

pub mod auth;
pub mod avisos;
pub mod clientes;
pub mod espejo;
pub mod export;
pub mod fotos;
pub mod sync;
pub mod zonal;
