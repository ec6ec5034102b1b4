// src/db/aviso_repo.rs

use async_trait::async_trait;
use sqlx::PgPool;

use crate::{
    common::error::AppError,
    models::aviso::Aviso,
    services::avisos::AlmacenAvisos,
};

#[derive(Clone)]
pub struct AvisoRepository {
    pool: PgPool,
}

impl AvisoRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AlmacenAvisos for AvisoRepository {
    // Última escritura gana por llave: el importador pisa el aviso
    // completo en cada carga.
    async fn upsert(&self, aviso: &Aviso) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO avisos (numero_cliente, aviso, fecha_carga)
            VALUES ($1, $2, $3)
            ON CONFLICT (numero_cliente)
            DO UPDATE SET aviso = EXCLUDED.aviso, fecha_carga = EXCLUDED.fecha_carga
            "#,
        )
        .bind(&aviso.numero_cliente)
        .bind(&aviso.aviso)
        .bind(&aviso.fecha_carga)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn listar(&self) -> Result<Vec<Aviso>, AppError> {
        let avisos = sqlx::query_as::<_, Aviso>(
            "SELECT numero_cliente, aviso, fecha_carga FROM avisos ORDER BY numero_cliente",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(avisos)
    }

    async fn eliminar(&self, numero_cliente: &str) -> Result<(), AppError> {
        let resultado = sqlx::query("DELETE FROM avisos WHERE numero_cliente = $1")
            .bind(numero_cliente)
            .execute(&self.pool)
            .await?;

        if resultado.rows_affected() == 0 {
            return Err(AppError::AvisoNoEncontrado);
        }

        Ok(())
    }
}
