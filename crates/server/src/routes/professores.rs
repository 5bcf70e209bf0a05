use axum::{
    Router,
    extract::{Path, State},
    response::Json as ResponseJson,
    routing::get,
};
use db::models::professor::{CreateProfessor, Professor, UpdateProfessor};
use utils::response::ApiResponse;
use uuid::Uuid;

use crate::{AppState, error::ApiError};

pub async fn list_professores(
    State(state): State<AppState>,
) -> Result<ResponseJson<ApiResponse<Vec<Professor>>>, ApiError> {
    let professores = Professor::find_all(&state.db().pool).await?;
    Ok(ResponseJson(ApiResponse::success(professores)))
}

pub async fn get_professor(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<ResponseJson<ApiResponse<Professor>>, ApiError> {
    let professor = Professor::find_by_id(&state.db().pool, id)
        .await?
        .ok_or(ApiError::NotFound)?;
    Ok(ResponseJson(ApiResponse::success(professor)))
}

pub async fn create_professor(
    State(state): State<AppState>,
    ResponseJson(payload): ResponseJson<CreateProfessor>,
) -> Result<ResponseJson<ApiResponse<Professor>>, ApiError> {
    let professor = Professor::create(&state.db().pool, Uuid::new_v4(), &payload).await?;
    Ok(ResponseJson(ApiResponse::success(professor)))
}

pub async fn update_professor(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    ResponseJson(payload): ResponseJson<UpdateProfessor>,
) -> Result<ResponseJson<ApiResponse<Professor>>, ApiError> {
    let professor = Professor::update(&state.db().pool, id, &payload)
        .await?
        .ok_or(ApiError::NotFound)?;
    Ok(ResponseJson(ApiResponse::success(professor)))
}

pub async fn delete_professor(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<ResponseJson<ApiResponse<()>>, ApiError> {
    let removed = Professor::delete(&state.db().pool, id).await?;
    if removed == 0 {
        return Err(ApiError::NotFound);
    }
    Ok(ResponseJson(ApiResponse::success(())))
}

pub fn router() -> Router<AppState> {
    Router::new().nest(
        "/professores",
        Router::new()
            .route("/", get(list_professores).post(create_professor))
            .route(
                "/{id}",
                get(get_professor)
                    .put(update_professor)
                    .delete(delete_professor),
            ),
    )
}
