use axum::{
    Router,
    extract::{DefaultBodyLimit, Multipart, Path, Query, State},
    http::header,
    response::{IntoResponse, Json as ResponseJson, Response},
    routing::{get, post},
};
use db::models::{
    curso::Curso,
    plano::{PlanoDetalhe, PlanoEnsino, PlanoPayload, PlanoResumo, PlanoStatus},
    professor::Professor,
};
use serde::Deserialize;
use services::services::{export, import::PlanoImporter};
use ts_rs::TS;
use utils::response::ApiResponse;
use uuid::Uuid;

use crate::{AppState, error::ApiError};

/// Dashboard filters; all optional, combined with AND. `busca` matches
/// titulo or disciplina, case-insensitive.
#[derive(Debug, Default, Deserialize, TS)]
pub struct PlanoFiltro {
    pub curso_id: Option<Uuid>,
    pub periodo: Option<String>,
    pub status: Option<PlanoStatus>,
    pub busca: Option<String>,
}

impl PlanoFiltro {
    fn aceita(&self, plano: &PlanoEnsino) -> bool {
        if self.curso_id.is_some_and(|id| id != plano.curso_id) {
            return false;
        }
        if self
            .periodo
            .as_ref()
            .is_some_and(|periodo| *periodo != plano.periodo)
        {
            return false;
        }
        if self.status.is_some_and(|status| status != plano.status) {
            return false;
        }
        if let Some(busca) = self.busca.as_ref().filter(|b| !b.is_empty()) {
            let busca = busca.to_lowercase();
            return plano.titulo.to_lowercase().contains(&busca)
                || plano.disciplina.to_lowercase().contains(&busca);
        }
        true
    }
}

/// GET /api/planos
pub async fn list_planos(
    State(state): State<AppState>,
    Query(filtro): Query<PlanoFiltro>,
) -> Result<ResponseJson<ApiResponse<Vec<PlanoDetalhe>>>, ApiError> {
    let planos = PlanoEnsino::find_all(&state.db().pool)
        .await?
        .into_iter()
        .filter(|plano| filtro.aceita(plano))
        .map(PlanoEnsino::into_detalhe)
        .collect();
    Ok(ResponseJson(ApiResponse::success(planos)))
}

/// POST /api/planos
pub async fn create_plano(
    State(state): State<AppState>,
    ResponseJson(payload): ResponseJson<PlanoPayload>,
) -> Result<ResponseJson<ApiResponse<PlanoDetalhe>>, ApiError> {
    let plano = PlanoEnsino::create(&state.db().pool, Uuid::new_v4(), &payload).await?;
    Ok(ResponseJson(ApiResponse::success(plano.into_detalhe())))
}

/// GET /api/planos/{id}
pub async fn get_plano(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<ResponseJson<ApiResponse<PlanoDetalhe>>, ApiError> {
    let plano = PlanoEnsino::find_by_id(&state.db().pool, id)
        .await?
        .ok_or(ApiError::NotFound)?;
    Ok(ResponseJson(ApiResponse::success(plano.into_detalhe())))
}

/// PUT /api/planos/{id}
/// Replaces the whole record; the client sends the complete next state
/// every time.
pub async fn update_plano(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    ResponseJson(payload): ResponseJson<PlanoPayload>,
) -> Result<ResponseJson<ApiResponse<PlanoDetalhe>>, ApiError> {
    let plano = PlanoEnsino::update(&state.db().pool, id, &payload)
        .await?
        .ok_or(ApiError::NotFound)?;
    Ok(ResponseJson(ApiResponse::success(plano.into_detalhe())))
}

/// DELETE /api/planos/{id}
pub async fn delete_plano(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<ResponseJson<ApiResponse<()>>, ApiError> {
    let removed = PlanoEnsino::delete(&state.db().pool, id).await?;
    if removed == 0 {
        return Err(ApiError::NotFound);
    }
    Ok(ResponseJson(ApiResponse::success(())))
}

/// GET /api/planos/resumo
/// Finalized-plan counts per course and period.
pub async fn resumo_planos(
    State(state): State<AppState>,
) -> Result<ResponseJson<ApiResponse<Vec<PlanoResumo>>>, ApiError> {
    let resumo = PlanoEnsino::resumo(&state.db().pool).await?;
    Ok(ResponseJson(ApiResponse::success(resumo)))
}

/// GET /api/planos/{id}/pdf
/// Exports a finalized plan as a PDF download.
pub async fn exportar_pdf(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Response, ApiError> {
    let pool = &state.db().pool;
    let plano = PlanoEnsino::find_by_id(pool, id)
        .await?
        .ok_or(ApiError::NotFound)?;
    let curso_nome = Curso::find_by_id(pool, plano.curso_id)
        .await?
        .map(|curso| curso.nome)
        .unwrap_or_default();
    let professor_nome = Professor::find_by_id(pool, plano.professor_id)
        .await?
        .map(|professor| professor.nome)
        .unwrap_or_default();

    let titulo = plano.titulo.clone();
    let bytes = export::gerar_pdf(&plano.into_detalhe(), &curso_nome, &professor_nome)?;

    Ok((
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"PlanoEnsino_{titulo}.pdf\""),
            ),
        ],
        bytes,
    )
        .into_response())
}

#[derive(Debug, Deserialize)]
pub struct ImportQuery {
    pub professor_id: Uuid,
}

/// POST /api/planos/importar?professor_id=
/// Multipart upload with an `arquivo` PDF field. The result is always a
/// draft for review.
pub async fn importar_plano(
    State(state): State<AppState>,
    Query(query): Query<ImportQuery>,
    mut multipart: Multipart,
) -> Result<ResponseJson<ApiResponse<PlanoDetalhe>>, ApiError> {
    let mut arquivo: Option<(String, Vec<u8>)> = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(e.to_string()))?
    {
        if field.name() == Some("arquivo") {
            let filename = field.file_name().unwrap_or("plano.pdf").to_string();
            let bytes = field
                .bytes()
                .await
                .map_err(|e| ApiError::BadRequest(e.to_string()))?;
            arquivo = Some((filename, bytes.to_vec()));
        }
    }
    let (filename, bytes) =
        arquivo.ok_or_else(|| ApiError::BadRequest("campo 'arquivo' ausente".into()))?;

    let importer = PlanoImporter::new(state.db().pool.clone());
    let plano = importer
        .importar(&filename, &bytes, query.professor_id)
        .await?;
    Ok(ResponseJson(ApiResponse::success(plano.into_detalhe())))
}

pub fn router() -> Router<AppState> {
    Router::new().nest(
        "/planos",
        Router::new()
            .route("/", get(list_planos).post(create_plano))
            .route("/resumo", get(resumo_planos))
            .route(
                "/importar",
                post(importar_plano).layer(DefaultBodyLimit::max(20 * 1024 * 1024)),
            )
            .route(
                "/{id}",
                get(get_plano).put(update_plano).delete(delete_plano),
            )
            .route("/{id}/pdf", get(exportar_pdf)),
    )
}
