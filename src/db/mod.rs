pub mod aviso_repo;
pub use aviso_repo::AvisoRepository;
pub mod cliente_repo;
pub use cliente_repo::ClienteRepository;
pub mod usuario_repo;
pub use usuario_repo::UsuarioRepository;
pub mod cache_local;
pub use cache_local::{CacheArchivo, EstadoArchivo};
pub mod fuente;
pub use fuente::FuenteBaseDatos;
