pub mod error;
pub mod routes;

use axum::Router;
use db::DBService;
use tower_http::trace::TraceLayer;

#[derive(Clone)]
pub struct AppState {
    db: DBService,
}

impl AppState {
    pub fn new(db: DBService) -> Self {
        Self { db }
    }

    pub fn db(&self) -> &DBService {
        &self.db
    }
}

pub fn app(state: AppState) -> Router {
    Router::new()
        .nest(
            "/api",
            Router::new()
                .merge(routes::planos::router())
                .merge(routes::cursos::router())
                .merge(routes::professores::router()),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
