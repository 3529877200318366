use crate::infra::{parse_date, parse_query, parse_source, AppState};
use axum::extract::{Path, Query, State};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Extension, Json, Router};
use chrono::Local;
use econ_mood::data::DataStatusReport;
use econ_mood::error::AppError;
use econ_mood::feedback::{feedback_router, FeedbackClient};
use econ_mood::questions::{self, Question};
use econ_mood::scoring::{Demographics, MoodService, ScoreReport};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;

/// Query string shared by the score endpoints. Values stay raw so malformed
/// input is reported as a 400 with a readable message.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ScoreQuery {
    #[serde(default, alias = "as_of")]
    pub(crate) as_of: Option<String>,
    #[serde(default, alias = "data_source")]
    pub(crate) data_source: Option<String>,
    #[serde(default, alias = "age_group")]
    pub(crate) age_group: Option<String>,
    #[serde(default, alias = "household_income")]
    pub(crate) household_income: Option<String>,
    #[serde(default)]
    pub(crate) geography: Option<String>,
    #[serde(default, alias = "household_size")]
    pub(crate) household_size: Option<String>,
}

impl ScoreQuery {
    fn demographics(&self) -> Result<Demographics, AppError> {
        let household_size = parse_query(self.household_size.as_deref(), |raw| {
            raw.parse::<u8>()
                .map_err(|_| format!("'{raw}' is not a valid household size"))
        })?;
        Ok(Demographics {
            age_group: non_blank(&self.age_group),
            household_income: non_blank(&self.household_income),
            geography: non_blank(&self.geography),
            household_size,
        })
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SourceQuery {
    #[serde(default, alias = "data_source")]
    pub(crate) data_source: Option<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct QuestionsResponse {
    pub(crate) questions: &'static [Question],
}

#[derive(Debug, Serialize)]
pub(crate) struct ScoresResponse {
    pub(crate) scores: Vec<ScoreReport>,
}

/// Mood scoring, dataset management, feedback intake, and health checks.
pub(crate) fn with_routes(service: Arc<MoodService>, feedback: Arc<FeedbackClient>) -> Router {
    let mood = Router::new()
        .route("/api/v1/questions", get(questions_endpoint))
        .route("/api/v1/questions/:id/score", get(score_endpoint))
        .route("/api/v1/scores", get(scores_endpoint))
        .route("/api/v1/data/status", get(data_status_endpoint))
        .route("/api/v1/data/reload", post(data_reload_endpoint))
        .with_state(service);

    feedback_router(feedback)
        .merge(mood)
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

pub(crate) async fn questions_endpoint() -> Json<QuestionsResponse> {
    Json(QuestionsResponse {
        questions: questions::catalog(),
    })
}

pub(crate) async fn score_endpoint(
    State(service): State<Arc<MoodService>>,
    Path(question_id): Path<String>,
    Query(query): Query<ScoreQuery>,
) -> Result<Json<ScoreReport>, AppError> {
    let as_of = parse_query(query.as_of.as_deref(), parse_date)?;
    let source = parse_query(query.data_source.as_deref(), parse_source)?;
    let demographics = query.demographics()?;

    let report = service
        .score_question(&question_id, as_of, source, Some(demographics))
        .await?;
    Ok(Json(report))
}

pub(crate) async fn scores_endpoint(
    State(service): State<Arc<MoodService>>,
    Query(query): Query<ScoreQuery>,
) -> Result<Json<ScoresResponse>, AppError> {
    let as_of = parse_query(query.as_of.as_deref(), parse_date)?;
    let source = parse_query(query.data_source.as_deref(), parse_source)?;

    let scores = service.score_all(as_of, source).await?;
    Ok(Json(ScoresResponse { scores }))
}

pub(crate) async fn data_status_endpoint(
    State(service): State<Arc<MoodService>>,
    Query(query): Query<SourceQuery>,
) -> Result<Json<DataStatusReport>, AppError> {
    let source = parse_query(query.data_source.as_deref(), parse_source)?;
    let report = service
        .data_status(source, false, Local::now().date_naive())
        .await?;
    Ok(Json(report))
}

pub(crate) async fn data_reload_endpoint(
    State(service): State<Arc<MoodService>>,
    Query(query): Query<SourceQuery>,
) -> Result<Json<DataStatusReport>, AppError> {
    let source = parse_query(query.data_source.as_deref(), parse_source)?;
    let report = service
        .data_status(source, true, Local::now().date_naive())
        .await?;
    Ok(Json(report))
}

fn non_blank(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use econ_mood::config::{DataConfig, DataLocation, FeedbackConfig};
    use econ_mood::data::{DataProvider, DataSourceKind};
    use econ_mood::metadata::SchemaLoader;
    use serde_json::Value;
    use std::path::PathBuf;
    use tower::ServiceExt;

    fn mock_router() -> Router {
        let config = DataConfig {
            default_source: DataSourceKind::Mock,
            ..DataConfig::default()
        };
        router_with(config)
    }

    fn router_with(config: DataConfig) -> Router {
        let provider = Arc::new(DataProvider::from_config(config).expect("provider builds"));
        let service = Arc::new(MoodService::new(provider, Arc::new(SchemaLoader::bundled())));
        let feedback = Arc::new(FeedbackClient::new(&FeedbackConfig::default(), None));
        with_routes(service, feedback)
    }

    async fn get_json(router: Router, uri: &str) -> (StatusCode, Value) {
        let response = router
            .oneshot(Request::get(uri).body(Body::empty()).expect("request"))
            .await
            .expect("response");
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body");
        (status, serde_json::from_slice(&bytes).expect("json body"))
    }

    #[tokio::test]
    async fn questions_lists_the_catalog() {
        let (status, body) = get_json(mock_router(), "/api/v1/questions").await;
        assert_eq!(status, StatusCode::OK);
        let listed = body["questions"].as_array().expect("array");
        assert_eq!(listed.len(), questions::catalog().len());
        assert_eq!(listed[0]["id"], "home-hunt");
    }

    #[tokio::test]
    async fn score_endpoint_scores_mock_data() {
        let (status, body) = get_json(
            mock_router(),
            "/api/v1/questions/home-hunt/score?geography=Texas",
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["question_id"], "home-hunt");
        assert_eq!(body["served_source"], "mock");
        assert_eq!(body["fell_back"], false);
        assert_eq!(body["demographics"]["geography"], "Texas");
        let score = body["score"].as_f64().expect("numeric score");
        assert!((-1.0..=1.0).contains(&score));
        assert_eq!(body["indicators"].as_array().expect("array").len(), 6);
    }

    #[tokio::test]
    async fn unknown_question_is_not_found() {
        let (status, body) = get_json(mock_router(), "/api/v1/questions/nope/score").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body["error"].as_str().expect("message").contains("nope"));
    }

    #[tokio::test]
    async fn malformed_query_values_are_bad_requests() {
        for uri in [
            "/api/v1/questions/home-hunt/score?asOf=yesterday",
            "/api/v1/questions/home-hunt/score?dataSource=live",
            "/api/v1/questions/home-hunt/score?householdSize=many",
            "/api/v1/scores?as_of=2024-13-40",
        ] {
            let (status, _) = get_json(mock_router(), uri).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
        }
    }

    #[tokio::test]
    async fn scores_cover_every_question() {
        let (status, body) = get_json(mock_router(), "/api/v1/scores?as_of=2024-12-31").await;
        assert_eq!(status, StatusCode::OK);
        let scores = body["scores"].as_array().expect("array");
        assert_eq!(scores.len(), questions::catalog().len());
        assert!(scores.iter().all(|score| score["as_of"] == "2024-12-31"));
    }

    #[tokio::test]
    async fn missing_real_data_falls_back_to_mock() {
        let config = DataConfig {
            location: DataLocation::Path(PathBuf::from("/nonexistent/econ-mood/indicators.csv")),
            ..DataConfig::default()
        };
        let (status, body) = get_json(router_with(config), "/api/v1/data/status").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["requested_source"], "real");
        assert_eq!(body["served_source"], "mock");
        assert_eq!(body["fell_back"], true);
        assert_eq!(body["validation"]["valid"], true);
        assert_eq!(body["info"]["is_loaded"], true);
    }

    #[tokio::test]
    async fn missing_real_data_without_fallback_is_unavailable() {
        let config = DataConfig {
            location: DataLocation::Path(PathBuf::from("/nonexistent/econ-mood/indicators.csv")),
            fallback_to_mock: false,
            ..DataConfig::default()
        };
        let (status, _) = get_json(router_with(config), "/api/v1/scores").await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn status_for_mock_reports_mock_coverage_when_real_is_broken() {
        let config = DataConfig {
            location: DataLocation::Path(PathBuf::from("/nonexistent/econ-mood/indicators.csv")),
            fallback_to_mock: false,
            ..DataConfig::default()
        };
        let (status, body) =
            get_json(router_with(config), "/api/v1/data/status?data_source=mock").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["served_source"], "mock");
        assert_eq!(body["validation"]["valid"], true);
        assert_eq!(
            body["validation"]["missing"].as_array().expect("array").len(),
            0
        );
        assert_eq!(body["info"]["configured"], "mock");
        assert_eq!(body["info"]["is_loaded"], true);
        assert_eq!(body["extra_series"].as_array().expect("array").len(), 0);
        assert_eq!(body["date_range"]["end"], "2024-12-01");
    }

    #[tokio::test]
    async fn reload_reports_fresh_status() {
        let response = mock_router()
            .oneshot(
                Request::post("/api/v1/data/reload")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn disabled_feedback_is_service_unavailable() {
        let response = mock_router()
            .oneshot(
                Request::post("/api/v1/subscribe")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(r#"{"email":"reader@example.com"}"#))
                    .expect("request"),
            )
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn healthcheck_reports_ok() {
        let Json(body) = healthcheck().await;
        assert_eq!(body["status"], "ok");
    }
}
