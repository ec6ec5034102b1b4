// src/handlers/mod.rs

pub mod admin;
pub mod auth;
pub mod avisos;
pub mod clientes;
pub mod dashboard;
