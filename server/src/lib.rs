use anyhow::Result;
use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use probsearch_core::{load_problems, search, Problem, VectorIndex};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// The whole index bundle: corpus plus everything derived from it. Built
/// once before the listener comes up and published behind a single Arc, so
/// no request can observe a partially built index and handlers never need
/// a lock.
pub struct SearchIndex {
    pub problems: Vec<Problem>,
    pub index: VectorIndex,
}

#[derive(Clone)]
pub struct AppState {
    pub search_index: Arc<SearchIndex>,
}

#[derive(Serialize)]
pub struct SearchResponse {
    pub results: Vec<SearchResult>,
}

/// A ranked problem with its derived platform label.
#[derive(Serialize)]
pub struct SearchResult {
    #[serde(flatten)]
    pub problem: Problem,
    pub platform: &'static str,
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

pub fn build_app(corpus_path: &str) -> Result<Router> {
    // Corpus load or parse failure is fatal: the error propagates out of
    // startup before any route is installed.
    let problems = load_problems(corpus_path)?;
    let index = VectorIndex::build(&problems);
    tracing::info!(
        num_docs = index.num_docs(),
        num_terms = index.num_terms(),
        "corpus indexed"
    );
    let state = AppState {
        search_index: Arc::new(SearchIndex { problems, index }),
    };

    // CORS: read CORS_ALLOW_ORIGIN (comma-separated) or allow Any by default
    let cors = match std::env::var("CORS_ALLOW_ORIGIN") {
        Ok(val) => {
            let origins: Vec<_> = val
                .split(',')
                .filter_map(|s| s.trim().parse().ok())
                .collect();
            if origins.is_empty() {
                CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any)
            } else {
                CorsLayer::new()
                    .allow_origin(AllowOrigin::list(origins))
                    .allow_methods(Any)
                    .allow_headers(Any)
            }
        }
        Err(_) => CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any),
    };

    let app = Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/search", post(search_handler))
        .with_state(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http());
    Ok(app)
}

pub async fn search_handler(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> Result<Json<SearchResponse>, (StatusCode, Json<ErrorResponse>)> {
    let raw_query = match body.get("query").and_then(Value::as_str) {
        Some(q) => q,
        None => {
            return Err((
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse {
                    error: "missing or invalid 'query'".into(),
                }),
            ))
        }
    };

    let hits = search(&state.search_index.index, raw_query);
    tracing::debug!(query = raw_query, hits = hits.len(), "search served");

    let results = hits
        .into_iter()
        .map(|hit| {
            let problem = state.search_index.problems[hit.doc_id].clone();
            SearchResult {
                platform: problem.platform(),
                problem,
            }
        })
        .collect();
    Ok(Json(SearchResponse { results }))
}
