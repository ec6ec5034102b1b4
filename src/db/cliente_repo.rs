// src/db/cliente_repo.rs

use chrono::{DateTime, SecondsFormat, Utc};
use sqlx::PgPool;

use crate::{
    common::error::AppError,
    models::cliente::{ClienteDoc, DocCliente},
};

// Fila cruda de la colección de clientes: id asignado por el almacén
// más el documento JSONB completo.
#[derive(sqlx::FromRow)]
struct FilaDocumento {
    id: String,
    data: sqlx::types::Json<ClienteDoc>,
}

impl From<FilaDocumento> for DocCliente {
    fn from(fila: FilaDocumento) -> Self {
        DocCliente { id: fila.id, datos: fila.data.0 }
    }
}

/// Repositorio de la colección `clientes`. Este sistema solo lee y
/// elimina: los documentos los crea el proceso de levantamiento en
/// terreno, externo a esta aplicación.
#[derive(Clone)]
pub struct ClienteRepository {
    pool: PgPool,
}

impl ClienteRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Lectura total de la colección (sincronización completa).
    pub async fn todos(&self) -> Result<Vec<DocCliente>, AppError> {
        let filas = sqlx::query_as::<_, FilaDocumento>("SELECT id, data FROM clientes")
            .fetch_all(&self.pool)
            .await?;

        Ok(filas.into_iter().map(DocCliente::from).collect())
    }

    pub async fn por_id(&self, id: &str) -> Result<Option<DocCliente>, AppError> {
        let fila =
            sqlx::query_as::<_, FilaDocumento>("SELECT id, data FROM clientes WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(fila.map(DocCliente::from))
    }

    /// Registros cuya `fechaRegistro` (marca nativa `{seconds, ...}`)
    /// es posterior al corte. Una de las dos consultas del refresco
    /// incremental: las fechas quedaron almacenadas en dos
    /// representaciones y hay que cubrir ambas.
    pub async fn desde_marca(&self, corte: DateTime<Utc>) -> Result<Vec<DocCliente>, AppError> {
        let filas = sqlx::query_as::<_, FilaDocumento>(
            r#"
            SELECT id, data FROM clientes
            WHERE jsonb_typeof(data -> 'fechaRegistro') = 'object'
              AND COALESCE(
                    data -> 'fechaRegistro' ->> 'seconds',
                    data -> 'fechaRegistro' ->> '_seconds'
                  )::bigint > $1
            "#,
        )
        .bind(corte.timestamp())
        .fetch_all(&self.pool)
        .await?;

        Ok(filas.into_iter().map(DocCliente::from).collect())
    }

    /// La consulta hermana de [`Self::desde_marca`], contra la
    /// representación string ISO. La comparación lexicográfica sobre
    /// ISO-8601 preserva el orden temporal.
    pub async fn desde_iso(&self, corte: DateTime<Utc>) -> Result<Vec<DocCliente>, AppError> {
        let corte_iso = corte.to_rfc3339_opts(SecondsFormat::Millis, true);

        let filas = sqlx::query_as::<_, FilaDocumento>(
            r#"
            SELECT id, data FROM clientes
            WHERE jsonb_typeof(data -> 'fechaRegistro') = 'string'
              AND data ->> 'fechaRegistro' > $1
            "#,
        )
        .bind(corte_iso)
        .fetch_all(&self.pool)
        .await?;

        Ok(filas.into_iter().map(DocCliente::from).collect())
    }

    pub async fn eliminar(&self, id: &str) -> Result<(), AppError> {
        let resultado = sqlx::query("DELETE FROM clientes WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if resultado.rows_affected() == 0 {
            return Err(AppError::ClienteNoEncontrado);
        }

        Ok(())
    }
}
