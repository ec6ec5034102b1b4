pub mod error;
pub mod fechas;
pub mod numero;
