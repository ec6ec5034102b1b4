pub mod auth;
pub mod aviso;
pub mod cliente;
