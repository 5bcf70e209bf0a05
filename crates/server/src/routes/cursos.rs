use axum::{
    Router,
    extract::{Path, State},
    response::Json as ResponseJson,
    routing::get,
};
use db::models::curso::{CreateCurso, Curso};
use utils::response::ApiResponse;
use uuid::Uuid;

use crate::{AppState, error::ApiError};

pub async fn list_cursos(
    State(state): State<AppState>,
) -> Result<ResponseJson<ApiResponse<Vec<Curso>>>, ApiError> {
    let cursos = Curso::find_all(&state.db().pool).await?;
    Ok(ResponseJson(ApiResponse::success(cursos)))
}

pub async fn get_curso(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<ResponseJson<ApiResponse<Curso>>, ApiError> {
    let curso = Curso::find_by_id(&state.db().pool, id)
        .await?
        .ok_or(ApiError::NotFound)?;
    Ok(ResponseJson(ApiResponse::success(curso)))
}

pub async fn create_curso(
    State(state): State<AppState>,
    ResponseJson(payload): ResponseJson<CreateCurso>,
) -> Result<ResponseJson<ApiResponse<Curso>>, ApiError> {
    let curso = Curso::create(&state.db().pool, Uuid::new_v4(), &payload).await?;
    Ok(ResponseJson(ApiResponse::success(curso)))
}

pub async fn update_curso(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    ResponseJson(payload): ResponseJson<CreateCurso>,
) -> Result<ResponseJson<ApiResponse<Curso>>, ApiError> {
    let curso = Curso::update(&state.db().pool, id, &payload)
        .await?
        .ok_or(ApiError::NotFound)?;
    Ok(ResponseJson(ApiResponse::success(curso)))
}

pub async fn delete_curso(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<ResponseJson<ApiResponse<()>>, ApiError> {
    let removed = Curso::delete(&state.db().pool, id).await?;
    if removed == 0 {
        return Err(ApiError::NotFound);
    }
    Ok(ResponseJson(ApiResponse::success(())))
}

pub fn router() -> Router<AppState> {
    Router::new().nest(
        "/cursos",
        Router::new()
            .route("/", get(list_cursos).post(create_curso))
            .route(
                "/{id}",
                get(get_curso).put(update_curso).delete(delete_curso),
            ),
    )
}
