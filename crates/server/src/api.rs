//! JSON API for the tariff configurator.
//!
//! Endpoints:
//! - `GET  /api/catalog`    current rate card snapshot
//! - `POST /api/recommend`  price a selection and search for a cheaper bundle
//! - `POST /api/leads`      capture a contact request for a priced selection

use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tarifa_core::{
    recommend, ApplicationError, CatalogSnapshot, DomainError, FiberTierId, GbAllowance,
    InterfaceError, Language, Lead, LeadSubmission, Recommendation, TariffSelection,
};
use tarifa_db::{DbPool, RepositoryError, SqlCatalogRepository, SqlLeadRepository};
use tracing::{info, warn};
use uuid::Uuid;

#[derive(Clone)]
pub struct ApiState {
    db_pool: DbPool,
    notification_email: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RecommendRequest {
    pub fiber_id: String,
    #[serde(default)]
    pub lines: Vec<i64>,
    pub lang: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LeadRequest {
    pub name: String,
    pub phone: String,
    pub email: String,
    #[serde(default)]
    pub address: String,
    pub comments: Option<String>,
    #[serde(default)]
    pub summary: Vec<String>,
    pub total_price: Decimal,
}

#[derive(Debug, Serialize)]
pub struct LeadResponse {
    pub id: String,
    pub status: &'static str,
    pub duplicate: bool,
}

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: String,
    pub correlation_id: String,
}

pub fn router(db_pool: DbPool, notification_email: Option<String>) -> Router {
    Router::new()
        .route("/api/catalog", get(get_catalog))
        .route("/api/recommend", post(post_recommend))
        .route("/api/leads", post(post_lead))
        .with_state(ApiState { db_pool, notification_email })
}

async fn get_catalog(
    State(state): State<ApiState>,
) -> Result<Json<CatalogSnapshot>, (StatusCode, Json<ApiError>)> {
    let snapshot = SqlCatalogRepository::new(state.db_pool.clone())
        .load_snapshot()
        .await
        .map_err(|error| error_response(repository_error(error)))?;
    Ok(Json(snapshot))
}

async fn post_recommend(
    State(state): State<ApiState>,
    Json(body): Json<RecommendRequest>,
) -> Result<Json<Recommendation>, (StatusCode, Json<ApiError>)> {
    let language = parse_language(body.lang.as_deref())
        .map_err(|error| error_response(ApplicationError::Domain(error)))?;

    let mut selection = TariffSelection::new(FiberTierId(body.fiber_id));
    for gb in &body.lines {
        let gb = GbAllowance::new(*gb)
            .map_err(|error| error_response(ApplicationError::Domain(error)))?;
        selection.add_line(gb);
    }

    let snapshot = SqlCatalogRepository::new(state.db_pool.clone())
        .load_snapshot()
        .await
        .map_err(|error| error_response(repository_error(error)))?;

    let recommendation = recommend(&snapshot, &selection, language)
        .map_err(|error| error_response(ApplicationError::Domain(error)))?;
    Ok(Json(recommendation))
}

async fn post_lead(
    State(state): State<ApiState>,
    Json(body): Json<LeadRequest>,
) -> Result<(StatusCode, Json<LeadResponse>), (StatusCode, Json<ApiError>)> {
    let submission = LeadSubmission {
        name: body.name,
        phone: body.phone,
        email: body.email,
        address: body.address,
        comments: body.comments,
        summary: body.summary,
        total_price: body.total_price,
    };

    let repository = SqlLeadRepository::new(state.db_pool.clone());
    let previous = repository
        .find_by_fingerprint(&submission.fingerprint())
        .await
        .map_err(|error| error_response(repository_error(error)))?;
    let duplicate = previous.is_some();

    let lead = Lead::from_submission(submission)
        .map_err(|error| error_response(ApplicationError::Domain(error)))?;
    repository.insert(&lead).await.map_err(|error| error_response(repository_error(error)))?;

    if let Some(earlier) = previous {
        warn!(
            event_name = "lead.repeat_submission",
            lead_id = %lead.id.0,
            earlier_lead_id = %earlier.id.0,
            "repeat submission from a known contact"
        );
    }

    // Dispatch is handled out-of-band; the notification event carries
    // everything the mail relay needs.
    info!(
        event_name = "lead.notification",
        lead_id = %lead.id.0,
        fingerprint = %lead.fingerprint,
        notify = state.notification_email.as_deref().unwrap_or("(unset)"),
        total_price = %lead.total_price,
        "new lead captured"
    );

    Ok((StatusCode::CREATED, Json(LeadResponse { id: lead.id.0.to_string(), status: "NEW", duplicate })))
}

fn parse_language(raw: Option<&str>) -> Result<Language, DomainError> {
    match raw {
        Some(code) => code.parse(),
        None => Ok(Language::Ca),
    }
}

fn repository_error(error: RepositoryError) -> ApplicationError {
    match error {
        RepositoryError::Invalid(domain) => ApplicationError::Domain(domain),
        other => ApplicationError::Persistence(other.to_string()),
    }
}

fn error_response(error: ApplicationError) -> (StatusCode, Json<ApiError>) {
    let correlation_id = Uuid::new_v4().simple().to_string();
    let interface = error.into_interface(correlation_id.clone());
    let status = match &interface {
        InterfaceError::BadRequest { .. } => StatusCode::BAD_REQUEST,
        InterfaceError::ServiceUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
        InterfaceError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
    };

    warn!(
        event_name = "api.request.failed",
        correlation_id = %correlation_id,
        error = %interface,
        "request rejected"
    );

    (status, Json(ApiError { error: interface.user_message().to_owned(), correlation_id }))
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use axum::Router;
    use serde_json::{json, Value};
    use tarifa_core::config::DatabaseConfig;
    use tarifa_db::{connect, migrations, RateCardSeed};
    use tower::ServiceExt;

    use super::router;

    async fn seeded_router() -> Router {
        let pool =
            connect(&DatabaseConfig::single_connection("sqlite::memory:")).await.expect("connect");
        migrations::run_pending(&pool).await.expect("migrations");
        RateCardSeed::load(&pool).await.expect("seed");
        router(pool, Some("ventas@tarifa.example".to_owned()))
    }

    async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let request = match body {
            Some(payload) => Request::builder()
                .method(method)
                .uri(uri)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(payload.to_string()))
                .expect("request"),
            None => Request::builder().method(method).uri(uri).body(Body::empty()).expect("request"),
        };

        let response = app.clone().oneshot(request).await.expect("response");
        let status = response.status();
        let bytes =
            axum::body::to_bytes(response.into_body(), usize::MAX).await.expect("body bytes");
        let payload = serde_json::from_slice(&bytes).expect("json body");
        (status, payload)
    }

    #[tokio::test]
    async fn catalog_endpoint_serves_the_seeded_rate_card() {
        let app = seeded_router().await;

        let (status, payload) = send(&app, "GET", "/api/catalog", None).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(payload["fiber_tiers"].as_array().expect("fiber tiers").len(), 7);
        assert_eq!(payload["mobile_tiers"].as_array().expect("mobile tiers").len(), 5);
        assert_eq!(payload["bundles"].as_array().expect("bundles").len(), 6);
    }

    #[tokio::test]
    async fn recommend_endpoint_finds_the_unlimited_bundle() {
        let app = seeded_router().await;

        let (status, payload) = send(
            &app,
            "POST",
            "/api/recommend",
            Some(json!({ "fiber_id": "f2", "lines": [-1], "lang": "ca" })),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(payload["recommended_name"], "Paquet Extraordinària");
        assert_eq!(payload["is_savings"], true);
        assert_eq!(payload["custom_price"], "50.90");
        assert_eq!(payload["recommended_price"], "32.90");
        assert_eq!(payload["savings_amount"], "18.00");
    }

    #[tokio::test]
    async fn recommend_endpoint_rejects_an_unknown_fiber_tier() {
        let app = seeded_router().await;

        let (status, payload) = send(
            &app,
            "POST",
            "/api/recommend",
            Some(json!({ "fiber_id": "f9", "lines": [] })),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            payload["error"],
            "The request could not be processed. Check inputs and try again."
        );
        assert!(!payload["correlation_id"].as_str().expect("correlation id").is_empty());
    }

    #[tokio::test]
    async fn recommend_endpoint_rejects_a_malformed_allowance() {
        let app = seeded_router().await;

        let (status, _payload) = send(
            &app,
            "POST",
            "/api/recommend",
            Some(json!({ "fiber_id": "f2", "lines": [-2] })),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn lead_endpoint_persists_and_flags_repeat_submissions() {
        let app = seeded_router().await;
        let body = json!({
            "name": "Anna M.",
            "phone": "977353735",
            "email": "anna@example.com",
            "address": "L'Aldea",
            "summary": ["Fibra 300Mb + GB Il·limitats"],
            "total_price": "32.90"
        });

        let (status, payload) = send(&app, "POST", "/api/leads", Some(body.clone())).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(payload["status"], "NEW");
        assert_eq!(payload["duplicate"], false);

        let (status, payload) = send(&app, "POST", "/api/leads", Some(body)).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(payload["duplicate"], true);
    }

    #[tokio::test]
    async fn lead_endpoint_rejects_a_blank_name() {
        let app = seeded_router().await;

        let (status, payload) = send(
            &app,
            "POST",
            "/api/leads",
            Some(json!({
                "name": "  ",
                "phone": "977353735",
                "email": "anna@example.com",
                "total_price": "32.90"
            })),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            payload["error"],
            "The request could not be processed. Check inputs and try again."
        );
    }
}
