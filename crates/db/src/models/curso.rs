use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};
use ts_rs::TS;
use uuid::Uuid;

#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
pub struct Curso {
    pub id: Uuid,
    pub nome: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct CreateCurso {
    pub nome: String,
}

impl Curso {
    pub async fn find_all(pool: &SqlitePool) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Curso>("SELECT id, nome, created_at FROM cursos ORDER BY nome")
            .fetch_all(pool)
            .await
    }

    pub async fn find_by_id(pool: &SqlitePool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Curso>("SELECT id, nome, created_at FROM cursos WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Substring lookup via LIKE (case-insensitive for ASCII only; accented
    /// characters must match case), used by the PDF import to map an
    /// extracted course name onto a registered course.
    pub async fn find_by_nome_like(
        pool: &SqlitePool,
        nome: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Curso>(
            "SELECT id, nome, created_at FROM cursos WHERE nome LIKE $1 LIMIT 1",
        )
        .bind(format!("%{nome}%"))
        .fetch_optional(pool)
        .await
    }

    pub async fn find_first(pool: &SqlitePool) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Curso>("SELECT id, nome, created_at FROM cursos ORDER BY nome LIMIT 1")
            .fetch_optional(pool)
            .await
    }

    pub async fn create(
        pool: &SqlitePool,
        id: Uuid,
        data: &CreateCurso,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Curso>(
            "INSERT INTO cursos (id, nome) VALUES ($1, $2) RETURNING id, nome, created_at",
        )
        .bind(id)
        .bind(&data.nome)
        .fetch_one(pool)
        .await
    }

    pub async fn update(
        pool: &SqlitePool,
        id: Uuid,
        data: &CreateCurso,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Curso>(
            "UPDATE cursos SET nome = $2 WHERE id = $1 RETURNING id, nome, created_at",
        )
        .bind(id)
        .bind(&data.nome)
        .fetch_optional(pool)
        .await
    }

    pub async fn delete(pool: &SqlitePool, id: Uuid) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM cursos WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }
}
