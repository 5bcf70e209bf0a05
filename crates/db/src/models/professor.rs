use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};
use ts_rs::TS;
use uuid::Uuid;

#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
pub struct Professor {
    pub id: Uuid,
    pub nome: String,
    pub email: String,
    pub admin: bool,
    pub matricula_siape: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct CreateProfessor {
    pub nome: String,
    pub email: String,
    #[serde(default)]
    pub admin: bool,
    #[serde(default)]
    pub matricula_siape: String,
}

/// Partial update for the account-details and admin user-management forms.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct UpdateProfessor {
    pub nome: Option<String>,
    pub email: Option<String>,
    pub admin: Option<bool>,
    pub matricula_siape: Option<String>,
}

const COLUMNS: &str = "id, nome, email, admin, matricula_siape, created_at";

impl Professor {
    pub async fn find_all(pool: &SqlitePool) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Professor>(&format!(
            "SELECT {COLUMNS} FROM professores ORDER BY nome"
        ))
        .fetch_all(pool)
        .await
    }

    pub async fn find_by_id(pool: &SqlitePool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Professor>(&format!(
            "SELECT {COLUMNS} FROM professores WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    pub async fn create(
        pool: &SqlitePool,
        id: Uuid,
        data: &CreateProfessor,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Professor>(&format!(
            "INSERT INTO professores (id, nome, email, admin, matricula_siape)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {COLUMNS}"
        ))
        .bind(id)
        .bind(&data.nome)
        .bind(&data.email)
        .bind(data.admin)
        .bind(&data.matricula_siape)
        .fetch_one(pool)
        .await
    }

    pub async fn update(
        pool: &SqlitePool,
        id: Uuid,
        data: &UpdateProfessor,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Professor>(&format!(
            "UPDATE professores
             SET nome            = COALESCE($2, nome),
                 email           = COALESCE($3, email),
                 admin           = COALESCE($4, admin),
                 matricula_siape = COALESCE($5, matricula_siape)
             WHERE id = $1
             RETURNING {COLUMNS}"
        ))
        .bind(id)
        .bind(&data.nome)
        .bind(&data.email)
        .bind(data.admin)
        .bind(&data.matricula_siape)
        .fetch_optional(pool)
        .await
    }

    pub async fn delete(pool: &SqlitePool, id: Uuid) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM professores WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }
}
