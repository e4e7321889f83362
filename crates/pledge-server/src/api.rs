use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, Method},
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;
use uuid::Uuid;

use pledge_store::{Database, PledgeWithUser, Solution};

use pledge_shared::{CompanyStatus, SolutionStatus};

use crate::activity::{self, ActivityItem};
use crate::aggregate::{self, Summary};
use crate::auth;
use crate::cache::TtlCache;
use crate::config::ServerConfig;
use crate::error::ApiError;
use crate::limits::{self, CapCheck};
use crate::scoring::{self, ReviewOutcome};
use crate::timeseries::{self, DayBucket};

/// Pledge-listing pagination bound.
const MAX_PLEDGE_PAGE_SIZE: u32 = 100;
const DEFAULT_PLEDGE_PAGE_SIZE: u32 = 20;
const DEFAULT_TIMESERIES_DAYS: u32 = 30;
const DEFAULT_ACTIVITY_LIMIT: u32 = 50;

#[derive(Clone)]
pub struct AppState {
    pub db: Arc<Mutex<Database>>,
    /// Best-effort summary cache keyed by scope; dropped on writes.
    pub summary_cache: TtlCache<String, Summary>,
    pub config: Arc<ServerConfig>,
}

impl AppState {
    pub fn new(db: Database, config: ServerConfig) -> Self {
        let ttl = Duration::from_secs(config.dashboard_cache_ttl_secs);
        Self {
            db: Arc::new(Mutex::new(db)),
            summary_cache: TtlCache::new(ttl),
            config: Arc::new(config),
        }
    }
}

pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health_check))
        .route("/auth/sessions", post(create_user_session))
        .route("/admin-analytics/global/summary", get(global_summary))
        .route("/admin-analytics/global/timeseries", get(global_timeseries))
        .route(
            "/admin-analytics/campaign/:id/summary",
            get(campaign_summary),
        )
        .route(
            "/admin-analytics/campaign/:id/timeseries",
            get(campaign_timeseries),
        )
        .route(
            "/admin-analytics/campaign/:id/pledges",
            get(campaign_pledges),
        )
        .route("/admin-analytics/recent-activity", get(recent_activity))
        .route("/solutions", post(create_solution))
        .route("/pledges", post(create_pledge))
        .route(
            "/peace-seal/companies/:id/score",
            post(score_peace_seal_company),
        )
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// ---------------------------------------------------------------------------
// Health
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

// ---------------------------------------------------------------------------
// Sessions
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateSessionRequest {
    user_id: Uuid,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SessionResponse {
    token: String,
    expires_at: DateTime<Utc>,
}

/// Mint a bearer session for a user.  Only the trusted auth frontend may
/// call this, authenticating with the admin token after finishing its own
/// sign-in flow; the session lifetime comes from `SESSION_TTL_HOURS`.
async fn create_user_session(
    headers: HeaderMap,
    State(state): State<AppState>,
    Json(req): Json<CreateSessionRequest>,
) -> Result<Json<SessionResponse>, ApiError> {
    auth::require_admin_token(&headers, &state)?;

    let ttl = chrono::Duration::hours(state.config.session_ttl_hours as i64);
    let token = Uuid::new_v4().simple().to_string();

    let db = state.db.lock().await;
    db.get_user(req.user_id)?;
    let expires_at = db.create_session(req.user_id, &token, ttl)?;

    info!(user = %req.user_id, %expires_at, "Session created");

    Ok(Json(SessionResponse { token, expires_at }))
}

// ---------------------------------------------------------------------------
// Admin analytics
// ---------------------------------------------------------------------------

fn summary_cache_key(campaign_id: Option<&str>) -> String {
    match campaign_id {
        Some(id) => format!("campaign:{id}"),
        None => "global".to_string(),
    }
}

async fn summarize_cached(
    state: &AppState,
    campaign_id: Option<&str>,
) -> Result<Summary, ApiError> {
    let key = summary_cache_key(campaign_id);
    if let Some(cached) = state.summary_cache.get(&key).await {
        return Ok(cached);
    }

    let summary = {
        let db = state.db.lock().await;
        aggregate::summarize(&db, campaign_id)?
    };
    state.summary_cache.put(key, summary.clone()).await;
    Ok(summary)
}

async fn global_summary(
    headers: HeaderMap,
    State(state): State<AppState>,
) -> Result<Json<Summary>, ApiError> {
    auth::require_analytics_role(&headers, &state).await?;
    Ok(Json(summarize_cached(&state, None).await?))
}

async fn campaign_summary(
    headers: HeaderMap,
    State(state): State<AppState>,
    Path(campaign_id): Path<String>,
) -> Result<Json<Summary>, ApiError> {
    auth::require_analytics_role(&headers, &state).await?;
    Ok(Json(summarize_cached(&state, Some(&campaign_id)).await?))
}

#[derive(Deserialize)]
struct TimeseriesQuery {
    days: Option<u32>,
}

#[derive(Serialize)]
struct TimeseriesResponse {
    days: u32,
    buckets: Vec<DayBucket>,
}

async fn run_timeseries(
    state: &AppState,
    campaign_id: Option<&str>,
    days: Option<u32>,
) -> Result<TimeseriesResponse, ApiError> {
    let days = days
        .unwrap_or(DEFAULT_TIMESERIES_DAYS)
        .clamp(timeseries::MIN_DAYS, timeseries::MAX_DAYS);
    let db = state.db.lock().await;
    let buckets = timeseries::timeseries(&db, campaign_id, days, Utc::now())?;
    Ok(TimeseriesResponse { days, buckets })
}

async fn global_timeseries(
    headers: HeaderMap,
    State(state): State<AppState>,
    Query(query): Query<TimeseriesQuery>,
) -> Result<Json<TimeseriesResponse>, ApiError> {
    auth::require_analytics_role(&headers, &state).await?;
    Ok(Json(run_timeseries(&state, None, query.days).await?))
}

async fn campaign_timeseries(
    headers: HeaderMap,
    State(state): State<AppState>,
    Path(campaign_id): Path<String>,
    Query(query): Query<TimeseriesQuery>,
) -> Result<Json<TimeseriesResponse>, ApiError> {
    auth::require_analytics_role(&headers, &state).await?;
    Ok(Json(
        run_timeseries(&state, Some(&campaign_id), query.days).await?,
    ))
}

#[derive(Deserialize)]
struct PledgesQuery {
    page: Option<u32>,
    limit: Option<u32>,
    q: Option<String>,
}

#[derive(Serialize)]
struct PledgesResponse {
    pledges: Vec<PledgeWithUser>,
    total: u32,
    page: u32,
    limit: u32,
}

async fn campaign_pledges(
    headers: HeaderMap,
    State(state): State<AppState>,
    Path(campaign_id): Path<String>,
    Query(query): Query<PledgesQuery>,
) -> Result<Json<PledgesResponse>, ApiError> {
    auth::require_analytics_role(&headers, &state).await?;

    let page = query.page.unwrap_or(1).max(1);
    let limit = query
        .limit
        .unwrap_or(DEFAULT_PLEDGE_PAGE_SIZE)
        .clamp(1, MAX_PLEDGE_PAGE_SIZE);

    let db = state.db.lock().await;
    let (pledges, total) =
        db.search_pledges(&campaign_id, query.q.as_deref(), page, limit)?;

    Ok(Json(PledgesResponse {
        pledges,
        total,
        page,
        limit,
    }))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ActivityQuery {
    campaign_id: Option<String>,
    since: Option<DateTime<Utc>>,
    limit: Option<u32>,
}

#[derive(Serialize)]
struct ActivityResponse {
    items: Vec<ActivityItem>,
}

async fn recent_activity(
    headers: HeaderMap,
    State(state): State<AppState>,
    Query(query): Query<ActivityQuery>,
) -> Result<Json<ActivityResponse>, ApiError> {
    auth::require_analytics_role(&headers, &state).await?;

    let limit = query.limit.unwrap_or(DEFAULT_ACTIVITY_LIMIT);
    let db = state.db.lock().await;
    let items = activity::recent_activity(
        &db,
        query.campaign_id.as_deref(),
        query.since,
        limit,
    )?;

    Ok(Json(ActivityResponse { items }))
}

// ---------------------------------------------------------------------------
// Solutions
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateSolutionRequest {
    campaign_id: String,
    party_id: String,
    title: String,
    description: String,
    /// Defaults to draft; moderation publishes later.
    status: Option<SolutionStatus>,
    /// CMS-configured per-party caps for the campaign.  Empty or missing
    /// means the campaign is unconfigured and default caps apply.
    #[serde(default)]
    party_limits: HashMap<String, u32>,
}

async fn create_solution(
    headers: HeaderMap,
    State(state): State<AppState>,
    Json(req): Json<CreateSolutionRequest>,
) -> Result<Json<Solution>, ApiError> {
    let user = auth::require_session_user(&headers, &state).await?;

    if req.title.trim().is_empty() {
        return Err(ApiError::BadRequest("title must not be empty".into()));
    }

    let db = state.db.lock().await;

    // Read-then-insert without a transaction: an accepted race (two
    // concurrent submissions may jointly exceed a cap by one).
    match limits::check_solution_cap(&db, &req.campaign_id, &req.party_id, &req.party_limits)? {
        CapCheck::Allowed => {}
        CapCheck::Rejected { reason } => return Err(ApiError::LimitReached(reason)),
    }

    let now = Utc::now();
    let solution = Solution {
        id: Uuid::new_v4(),
        campaign_id: req.campaign_id.clone(),
        user_id: user.id,
        party_id: req.party_id,
        title: req.title,
        description: req.description,
        status: req.status.unwrap_or(SolutionStatus::Draft),
        metadata: None,
        created_at: now,
        updated_at: now,
    };
    db.insert_solution(&solution)?;
    drop(db);

    info!(
        solution = %solution.id,
        campaign = %solution.campaign_id,
        party = %solution.party_id,
        "Solution created"
    );

    state
        .summary_cache
        .invalidate(&summary_cache_key(Some(&req.campaign_id)))
        .await;
    state
        .summary_cache
        .invalidate(&summary_cache_key(None))
        .await;

    Ok(Json(solution))
}

// ---------------------------------------------------------------------------
// Pledges
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreatePledgeRequest {
    campaign_id: String,
    agree_to_terms: bool,
    #[serde(default)]
    subscribe_to_updates: bool,
}

async fn create_pledge(
    headers: HeaderMap,
    State(state): State<AppState>,
    Json(req): Json<CreatePledgeRequest>,
) -> Result<Json<pledge_store::Pledge>, ApiError> {
    let user = auth::require_session_user(&headers, &state).await?;

    if !req.agree_to_terms {
        return Err(ApiError::BadRequest(
            "you must agree to the terms to pledge".into(),
        ));
    }

    let pledge = {
        let db = state.db.lock().await;
        db.add_pledge(
            &req.campaign_id,
            user.id,
            req.agree_to_terms,
            req.subscribe_to_updates,
        )?
    };

    info!(campaign = %pledge.campaign_id, user = %pledge.user_id, "Pledge recorded");

    state
        .summary_cache
        .invalidate(&summary_cache_key(Some(&req.campaign_id)))
        .await;
    state
        .summary_cache
        .invalidate(&summary_cache_key(None))
        .await;

    Ok(Json(pledge))
}

// ---------------------------------------------------------------------------
// Peace Seal scoring
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ScoreRequest {
    score: f64,
    /// Advisor-chosen lifecycle status (verified / conditional / did_not_pass).
    status: CompanyStatus,
    notes: Option<String>,
}

async fn score_peace_seal_company(
    headers: HeaderMap,
    State(state): State<AppState>,
    Path(company_id): Path<Uuid>,
    Json(req): Json<ScoreRequest>,
) -> Result<Json<ReviewOutcome>, ApiError> {
    let ctx = auth::require_analytics_role(&headers, &state).await?;
    let reviewer = ctx.user.ok_or_else(|| {
        ApiError::Forbidden("Scoring must be attributed to a user session".into())
    })?;

    let db = state.db.lock().await;
    let outcome = scoring::score_company(
        &db,
        company_id,
        req.score,
        req.status,
        reviewer.id,
        req.notes.as_deref(),
    )?;

    Ok(Json(outcome))
}

// ---------------------------------------------------------------------------
// Server entry
// ---------------------------------------------------------------------------

pub async fn serve(state: AppState, addr: std::net::SocketAddr) -> anyhow::Result<()> {
    let app = build_router(state);

    info!(addr = %addr, "Starting HTTP API server");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use chrono::Duration as ChronoDuration;
    use tower::ServiceExt;

    use pledge_shared::{
        required_section_ids, CompanySizeTier, PaymentStatus, Role,
    };
    use pledge_store::{Company, User};

    const ADMIN_TOKEN: &str = "test-admin-token";

    fn test_state() -> AppState {
        let db = Database::open_in_memory().unwrap();
        let config = ServerConfig {
            admin_token: Some(ADMIN_TOKEN.to_string()),
            ..ServerConfig::default()
        };
        AppState::new(db, config)
    }

    async fn seed_session(state: &AppState, role: Role, token: &str) -> Uuid {
        let db = state.db.lock().await;
        let user = User {
            id: Uuid::new_v4(),
            name: "tester".to_string(),
            email: format!("{}@example.org", Uuid::new_v4()),
            image: None,
            role,
            created_at: Utc::now(),
        };
        db.insert_user(&user).unwrap();
        db.create_session(user.id, token, ChronoDuration::hours(1))
            .unwrap();
        user.id
    }

    fn get(uri: &str, token: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().uri(uri);
        if let Some(token) = token {
            builder = builder.header("authorization", format!("Bearer {token}"));
        }
        builder.body(Body::empty()).unwrap()
    }

    fn post_json(uri: &str, token: &str, body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("authorization", format!("Bearer {token}"))
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn analytics_requires_auth() {
        let app = build_router(test_state());
        let response = app
            .oneshot(get("/admin-analytics/global/summary", None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn plain_users_cannot_read_analytics() {
        let state = test_state();
        seed_session(&state, Role::User, "user-token").await;
        let app = build_router(state);

        let response = app
            .oneshot(get("/admin-analytics/global/summary", Some("user-token")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn admin_token_reads_summary() {
        let app = build_router(test_state());
        let response = app
            .oneshot(get("/admin-analytics/global/summary", Some(ADMIN_TOKEN)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json = body_json(response).await;
        assert_eq!(json["solutionsPublished"], 0);
        assert_eq!(json["interactions"]["likes"], 0);
    }

    #[tokio::test]
    async fn moderator_session_reads_timeseries() {
        let state = test_state();
        seed_session(&state, Role::Moderator, "mod-token").await;
        let app = build_router(state);

        let response = app
            .oneshot(get(
                "/admin-analytics/global/timeseries?days=7",
                Some("mod-token"),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json = body_json(response).await;
        assert_eq!(json["days"], 7);
        assert_eq!(json["buckets"].as_array().unwrap().len(), 7);
    }

    #[tokio::test]
    async fn timeseries_days_clamped() {
        let app = build_router(test_state());
        let response = app
            .oneshot(get(
                "/admin-analytics/global/timeseries?days=0",
                Some(ADMIN_TOKEN),
            ))
            .await
            .unwrap();
        let json = body_json(response).await;
        assert_eq!(json["days"], 1);
        assert_eq!(json["buckets"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn solution_create_enforces_caps() {
        let state = test_state();
        seed_session(&state, Role::User, "author-token").await;
        let app = build_router(state);

        let body = serde_json::json!({
            "campaignId": "gaza",
            "partyId": "c",
            "title": "Open the crossing",
            "description": "details",
            "partyLimits": {"a": 2, "b": 3},
        });
        let response = app
            .oneshot(post_json("/solutions", "author-token", body))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CONFLICT);

        let json = body_json(response).await;
        assert!(json["error"].as_str().unwrap().contains("invalid party"));
    }

    #[tokio::test]
    async fn solution_create_defaults_to_draft() {
        let state = test_state();
        seed_session(&state, Role::User, "author-token").await;
        let app = build_router(state.clone());

        let body = serde_json::json!({
            "campaignId": "gaza",
            "partyId": "a",
            "title": "Open the crossing",
            "description": "details",
            "partyLimits": {"a": 2, "b": 3},
        });
        let response = app
            .oneshot(post_json("/solutions", "author-token", body))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json = body_json(response).await;
        assert_eq!(json["status"], "draft");

        let db = state.db.lock().await;
        // Drafts do not count toward the published cap.
        assert_eq!(db.count_published_solutions("gaza", None).unwrap(), 0);
    }

    #[tokio::test]
    async fn pledge_requires_terms() {
        let state = test_state();
        seed_session(&state, Role::User, "pledger-token").await;
        let app = build_router(state);

        let body = serde_json::json!({
            "campaignId": "gaza",
            "agreeToTerms": false,
        });
        let response = app
            .oneshot(post_json("/pledges", "pledger-token", body))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn scoring_flow_end_to_end() {
        let state = test_state();
        let _advisor = seed_session(&state, Role::Admin, "advisor-token").await;

        let company_id = {
            let db = state.db.lock().await;
            let now = Utc::now();
            let company = Company {
                id: Uuid::new_v4(),
                slug: "acme".to_string(),
                name: "Acme".to_string(),
                status: CompanyStatus::UnderReview,
                score: None,
                payment_status: PaymentStatus::Paid,
                employee_count: 10,
                advisor_user_id: None,
                review_notes: None,
                reviewed_by: None,
                created_at: now,
                updated_at: now,
            };
            db.insert_company(&company).unwrap();
            for section in required_section_ids(CompanySizeTier::Small) {
                db.upsert_questionnaire_answer(company.id, section, &serde_json::json!({}))
                    .unwrap();
            }
            company.id
        };

        let app = build_router(state);
        let body = serde_json::json!({
            "score": 91.0,
            "status": "verified",
            "notes": "well documented",
        });
        let response = app
            .oneshot(post_json(
                &format!("/peace-seal/companies/{company_id}/score"),
                "advisor-token",
                body,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json = body_json(response).await;
        assert_eq!(json["badge"], "silver");
        assert_eq!(json["status"], "verified");
    }

    #[tokio::test]
    async fn scoring_rejects_admin_token_without_session() {
        let state = test_state();
        let company_id = Uuid::new_v4();
        let app = build_router(state);

        let body = serde_json::json!({"score": 80.0, "status": "verified"});
        let response = app
            .oneshot(post_json(
                &format!("/peace-seal/companies/{company_id}/score"),
                ADMIN_TOKEN,
                body,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn pledge_listing_paginates_and_searches() {
        let state = test_state();
        let pledger = seed_session(&state, Role::User, "p1").await;
        {
            let db = state.db.lock().await;
            db.add_pledge("gaza", pledger, true, false).unwrap();
        }
        let app = build_router(state);

        let response = app
            .oneshot(get(
                "/admin-analytics/campaign/gaza/pledges?page=1&limit=10&q=tester",
                Some(ADMIN_TOKEN),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json = body_json(response).await;
        assert_eq!(json["total"], 1);
        assert_eq!(json["pledges"][0]["userName"], "tester");
    }

    #[tokio::test]
    async fn pledge_listing_survives_extreme_page_number() {
        let state = test_state();
        let pledger = seed_session(&state, Role::User, "p1").await;
        {
            let db = state.db.lock().await;
            db.add_pledge("gaza", pledger, true, false).unwrap();
        }
        let app = build_router(state);

        let response = app
            .oneshot(get(
                "/admin-analytics/campaign/gaza/pledges?page=4294967295&limit=100",
                Some(ADMIN_TOKEN),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json = body_json(response).await;
        assert_eq!(json["total"], 1);
        assert_eq!(json["pledges"].as_array().unwrap().len(), 0);
    }

    #[tokio::test]
    async fn minted_session_authenticates() {
        let state = test_state();
        let user_id = seed_session(&state, Role::User, "unused").await;
        let app = build_router(state);

        let response = app
            .clone()
            .oneshot(post_json(
                "/auth/sessions",
                ADMIN_TOKEN,
                serde_json::json!({"userId": user_id}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json = body_json(response).await;
        let token = json["token"].as_str().unwrap().to_string();
        assert!(json["expiresAt"].is_string());

        let body = serde_json::json!({"campaignId": "gaza", "agreeToTerms": true});
        let response = app
            .oneshot(post_json("/pledges", &token, body))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn session_minting_rejects_session_tokens() {
        let state = test_state();
        let user_id = seed_session(&state, Role::Admin, "admin-session").await;
        let app = build_router(state);

        let response = app
            .oneshot(post_json(
                "/auth/sessions",
                "admin-session",
                serde_json::json!({"userId": user_id}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn configured_ttl_bounds_minted_sessions() {
        let db = Database::open_in_memory().unwrap();
        let config = ServerConfig {
            admin_token: Some(ADMIN_TOKEN.to_string()),
            session_ttl_hours: 0,
            ..ServerConfig::default()
        };
        let state = AppState::new(db, config);
        let user_id = seed_session(&state, Role::User, "unused").await;
        let app = build_router(state);

        let response = app
            .clone()
            .oneshot(post_json(
                "/auth/sessions",
                ADMIN_TOKEN,
                serde_json::json!({"userId": user_id}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        let token = json["token"].as_str().unwrap().to_string();

        // A zero-hour TTL expires immediately.
        let body = serde_json::json!({"campaignId": "gaza", "agreeToTerms": true});
        let response = app
            .oneshot(post_json("/pledges", &token, body))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }
}
