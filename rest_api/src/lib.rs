// rest_api/src/lib.rs
//
// HTTP surface over the hostel core. Every handler returns a tagged result;
// errors are converted into JSON {status, message} bodies with the status
// code implied by the error taxonomy, and nothing here can take the process
// down.

use axum::{
    Json, Router,
    body::Bytes,
    extract::{DefaultBodyLimit, Path, Query, State},
    http::{HeaderMap, Method, StatusCode, header},
    response::{IntoResponse, Response},
    routing::{delete, get, post, put},
};
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::net::SocketAddr;
use std::sync::Arc;
use thiserror::Error;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

use lib::gateway::HostelGateway;
use lib::occupancy::OccupancyManager;
use lib::reminders::{self, TextGenerator};
use lib::stats::compute_stats;
use models::errors::HostelError;
use models::{
    FeedbackStatus, Id, MealPlan, NewCot, NewExpense, NewFeedback, NewNotice, NewPayment,
    NewResident, NewRoom, PaymentStatus, Resident, ResidentStatus,
};
use security::{AdminLogin, Claims, ResidentLogin};

pub mod config;
pub use config::{HostelConfig, load_hostel_config};

// Logo uploads are capped at 5 MiB by validation; leave headroom above the
// default axum body limit.
const BODY_LIMIT_BYTES: usize = 6 * 1024 * 1024;

#[derive(Debug, Error)]
pub enum RestApiError {
    #[error(transparent)]
    Hostel(#[from] HostelError),
    #[error("unauthorized: {0}")]
    Unauthorized(String),
    #[error("forbidden: {0}")]
    Forbidden(String),
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

impl IntoResponse for RestApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            RestApiError::Hostel(err) => {
                let status = match err {
                    HostelError::Validation(_) => StatusCode::BAD_REQUEST,
                    HostelError::Auth(_) => StatusCode::UNAUTHORIZED,
                    HostelError::NotFound(_) => StatusCode::NOT_FOUND,
                    HostelError::Conflict(_) => StatusCode::CONFLICT,
                    HostelError::Generation(_) | HostelError::Gateway(_) => {
                        StatusCode::BAD_GATEWAY
                    }
                    _ => StatusCode::INTERNAL_SERVER_ERROR,
                };
                (status, err.to_string())
            }
            RestApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg.clone()),
            RestApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg.clone()),
            RestApiError::InvalidInput(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
        };

        let body = Json(json!({
            "status": "error",
            "message": message,
        }));
        (status, body).into_response()
    }
}

// Shared state for the axum application.
#[derive(Clone)]
pub struct AppState {
    pub gateway: Arc<dyn HostelGateway>,
    pub occupancy: Arc<OccupancyManager>,
    pub generator: Arc<dyn TextGenerator>,
    pub config: Arc<HostelConfig>,
}

impl AppState {
    pub fn new(
        gateway: Arc<dyn HostelGateway>,
        generator: Arc<dyn TextGenerator>,
        config: HostelConfig,
    ) -> Self {
        AppState {
            occupancy: Arc::new(OccupancyManager::new(gateway.clone())),
            gateway,
            generator,
            config: Arc::new(config),
        }
    }
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
}

/// Any valid session, admin or resident.
fn require_session(state: &AppState, headers: &HeaderMap) -> Result<Claims, RestApiError> {
    let token = bearer_token(headers)
        .ok_or_else(|| RestApiError::Unauthorized("missing bearer token".to_string()))?;
    security::validate_token(token, state.config.jwt_secret.as_bytes())
        .map_err(|e| RestApiError::Unauthorized(e.to_string()))
}

/// Admin sessions only.
fn require_admin(state: &AppState, headers: &HeaderMap) -> Result<Claims, RestApiError> {
    let claims = require_session(state, headers)?;
    if claims.role != "admin" {
        return Err(RestApiError::Forbidden(
            "administrator session required".to_string(),
        ));
    }
    Ok(claims)
}

/// Admin sessions pass; a resident session must be the subject of resident
/// `resident_id` (matched by the token's email).
async fn require_self_or_admin(
    state: &AppState,
    claims: &Claims,
    resident_id: Id,
) -> Result<(), RestApiError> {
    if claims.role == "admin" {
        return Ok(());
    }
    let owns = state
        .gateway
        .list_residents()
        .await?
        .iter()
        .any(|r| r.id == resident_id && r.email == claims.sub);
    if owns {
        Ok(())
    } else {
        Err(RestApiError::Forbidden(
            "resident sessions may only access their own records".to_string(),
        ))
    }
}

fn today() -> NaiveDate {
    Utc::now().date_naive()
}

// --------- Request/response bodies ---------

#[derive(Debug, Serialize)]
pub struct AdminLoginResponse {
    pub token: String,
}

#[derive(Debug, Serialize)]
pub struct ResidentLoginResponse {
    pub token: String,
    pub resident: Resident,
}

#[derive(Debug, Deserialize)]
struct ResidentStatusRequest {
    status: ResidentStatus,
}

#[derive(Debug, Deserialize)]
struct PaymentStatusRequest {
    status: PaymentStatus,
}

#[derive(Debug, Deserialize)]
struct FeedbackStatusRequest {
    status: FeedbackStatus,
}

#[derive(Debug, Deserialize)]
struct NoticeGenerateRequest {
    keywords: String,
}

#[derive(Debug, Serialize)]
pub struct ReminderResponse {
    pub message: String,
    /// True when the deterministic template was used because generation
    /// failed.
    pub fallback: bool,
}

#[derive(Debug, Deserialize)]
struct StatsQuery {
    /// Reference month as `YYYY-MM`; defaults to the current month.
    month: Option<String>,
}

// --------- Handlers ---------

async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok", "message": "hostel REST API is healthy" }))
}

async fn admin_login(
    State(state): State<AppState>,
    Json(login): Json<AdminLogin>,
) -> Result<Json<AdminLoginResponse>, RestApiError> {
    let token =
        security::login_admin(state.gateway.as_ref(), &login, state.config.jwt_secret.as_bytes())
            .await?;
    Ok(Json(AdminLoginResponse { token }))
}

async fn resident_login(
    State(state): State<AppState>,
    Json(login): Json<ResidentLogin>,
) -> Result<Json<ResidentLoginResponse>, RestApiError> {
    let resident = security::login_resident(state.gateway.as_ref(), &login).await?;
    let token = security::issue_session_token(
        &resident.email,
        "resident",
        state.config.jwt_secret.as_bytes(),
    )?;
    Ok(Json(ResidentLoginResponse { token, resident }))
}

async fn list_residents(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Vec<Resident>>, RestApiError> {
    require_admin(&state, &headers)?;
    Ok(Json(state.gateway.list_residents().await?))
}

async fn get_resident(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<Id>,
) -> Result<Json<Resident>, RestApiError> {
    let claims = require_session(&state, &headers)?;
    require_self_or_admin(&state, &claims, id).await?;
    let resident = state
        .gateway
        .get_resident(id)
        .await?
        .ok_or_else(|| HostelError::NotFound(format!("resident {}", id)))?;
    Ok(Json(resident))
}

async fn create_resident(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<NewResident>,
) -> Result<(StatusCode, Json<Resident>), RestApiError> {
    require_admin(&state, &headers)?;
    let resident = state
        .occupancy
        .assign_or_update_resident(None, body, today())
        .await?;
    Ok((StatusCode::CREATED, Json(resident)))
}

async fn update_resident(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<Id>,
    Json(body): Json<NewResident>,
) -> Result<Json<Resident>, RestApiError> {
    require_admin(&state, &headers)?;
    let resident = state
        .occupancy
        .assign_or_update_resident(Some(id), body, today())
        .await?;
    Ok(Json(resident))
}

async fn change_resident_status(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<Id>,
    Json(body): Json<ResidentStatusRequest>,
) -> Result<Json<Resident>, RestApiError> {
    require_admin(&state, &headers)?;
    let resident = state
        .occupancy
        .change_resident_status(id, body.status, today())
        .await?;
    Ok(Json(resident))
}

async fn restore_resident(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<Id>,
) -> Result<Json<Resident>, RestApiError> {
    require_admin(&state, &headers)?;
    let resident = state.occupancy.restore_resident(id, today()).await?;
    Ok(Json(resident))
}

async fn update_meal_plan(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<Id>,
    Json(meal_plan): Json<MealPlan>,
) -> Result<Json<Resident>, RestApiError> {
    let claims = require_session(&state, &headers)?;
    require_self_or_admin(&state, &claims, id).await?;
    let mut resident = state
        .gateway
        .get_resident(id)
        .await?
        .ok_or_else(|| HostelError::NotFound(format!("resident {}", id)))?;
    resident.meal_plan = meal_plan;
    Ok(Json(state.gateway.update_resident(resident).await?))
}

async fn list_rooms(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Vec<models::Room>>, RestApiError> {
    require_session(&state, &headers)?;
    Ok(Json(state.gateway.list_rooms().await?))
}

async fn create_room(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<NewRoom>,
) -> Result<(StatusCode, Json<models::Room>), RestApiError> {
    require_admin(&state, &headers)?;
    let room = state.occupancy.add_room(body).await?;
    Ok((StatusCode::CREATED, Json(room)))
}

async fn delete_room(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<Id>,
) -> Result<StatusCode, RestApiError> {
    require_admin(&state, &headers)?;
    state.occupancy.delete_room(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn list_cots(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Vec<models::Cot>>, RestApiError> {
    require_session(&state, &headers)?;
    Ok(Json(state.gateway.list_cots().await?))
}

async fn create_cot(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<NewCot>,
) -> Result<(StatusCode, Json<models::Cot>), RestApiError> {
    require_admin(&state, &headers)?;
    let cot = state.occupancy.add_cot(body).await?;
    Ok((StatusCode::CREATED, Json(cot)))
}

async fn delete_cot(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<Id>,
) -> Result<StatusCode, RestApiError> {
    require_admin(&state, &headers)?;
    state.occupancy.delete_cot(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn list_payments(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Vec<models::Payment>>, RestApiError> {
    require_session(&state, &headers)?;
    // A stored Due whose date has passed is presented as Overdue; the stored
    // status only changes on explicit confirmation.
    let now = today();
    let payments = state
        .gateway
        .list_payments()
        .await?
        .into_iter()
        .map(|mut p| {
            p.status = p.effective_status(now);
            p
        })
        .collect();
    Ok(Json(payments))
}

async fn create_payment(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<NewPayment>,
) -> Result<(StatusCode, Json<models::Payment>), RestApiError> {
    require_admin(&state, &headers)?;
    let payment = state.gateway.insert_payment(body, today()).await?;
    Ok((StatusCode::CREATED, Json(payment)))
}

async fn update_payment_status(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<Id>,
    Json(body): Json<PaymentStatusRequest>,
) -> Result<Json<models::Payment>, RestApiError> {
    // Residents may confirm their own payments, nobody else's.
    let claims = require_session(&state, &headers)?;
    let payment = state
        .gateway
        .get_payment(id)
        .await?
        .ok_or_else(|| HostelError::NotFound(format!("payment {}", id)))?;
    require_self_or_admin(&state, &claims, payment.resident_id).await?;
    Ok(Json(
        state.gateway.update_payment_status(id, body.status).await?,
    ))
}

async fn list_expenses(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Vec<models::Expense>>, RestApiError> {
    require_admin(&state, &headers)?;
    Ok(Json(state.gateway.list_expenses().await?))
}

async fn create_expense(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<NewExpense>,
) -> Result<(StatusCode, Json<models::Expense>), RestApiError> {
    require_admin(&state, &headers)?;
    let expense = state.gateway.insert_expense(body).await?;
    Ok((StatusCode::CREATED, Json(expense)))
}

async fn list_feedback(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Vec<models::Feedback>>, RestApiError> {
    require_session(&state, &headers)?;
    Ok(Json(state.gateway.list_feedback().await?))
}

async fn create_feedback(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<NewFeedback>,
) -> Result<(StatusCode, Json<models::Feedback>), RestApiError> {
    require_session(&state, &headers)?;
    let entry = state.gateway.insert_feedback(body).await?;
    Ok((StatusCode::CREATED, Json(entry)))
}

async fn update_feedback_status(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<Id>,
    Json(body): Json<FeedbackStatusRequest>,
) -> Result<Json<models::Feedback>, RestApiError> {
    require_admin(&state, &headers)?;
    Ok(Json(
        state.gateway.update_feedback_status(id, body.status).await?,
    ))
}

async fn list_notices(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Vec<models::Notice>>, RestApiError> {
    require_session(&state, &headers)?;
    Ok(Json(state.gateway.list_notices().await?))
}

async fn create_notice(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<NewNotice>,
) -> Result<(StatusCode, Json<models::Notice>), RestApiError> {
    require_admin(&state, &headers)?;
    let notice = state.gateway.insert_notice(body).await?;
    Ok((StatusCode::CREATED, Json(notice)))
}

async fn delete_notice(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<Id>,
) -> Result<StatusCode, RestApiError> {
    require_admin(&state, &headers)?;
    state.gateway.delete_notice(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Drafts notice-board text from keywords. No fallback: a generation
/// failure aborts the action and is reported.
async fn generate_notice_text(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<NoticeGenerateRequest>,
) -> Result<Json<serde_json::Value>, RestApiError> {
    require_admin(&state, &headers)?;
    let text = reminders::generate_notice(
        state.generator.as_ref(),
        &state.config.hostel_name,
        &body.keywords,
    )
    .await?;
    Ok(Json(json!({ "text": text })))
}

async fn list_room_history(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Vec<models::RoomHistory>>, RestApiError> {
    require_admin(&state, &headers)?;
    Ok(Json(state.gateway.list_room_history().await?))
}

async fn stats(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<StatsQuery>,
) -> Result<Json<models::Stats>, RestApiError> {
    require_admin(&state, &headers)?;

    let reference = match &query.month {
        Some(raw) => parse_month(raw)
            .ok_or_else(|| RestApiError::InvalidInput(format!("invalid month: {}", raw)))?,
        None => today(),
    };

    let residents = state.gateway.list_residents().await?;
    let cots = state.gateway.list_cots().await?;
    let payments = state.gateway.list_payments().await?;
    Ok(Json(compute_stats(&residents, &cots, &payments, reference)))
}

/// `YYYY-MM` to the first day of that month.
fn parse_month(raw: &str) -> Option<NaiveDate> {
    let (year, month) = raw.split_once('-')?;
    NaiveDate::from_ymd_opt(year.parse().ok()?, month.parse().ok()?, 1)
}

async fn payment_reminder(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(payment_id): Path<Id>,
) -> Result<Json<ReminderResponse>, RestApiError> {
    require_admin(&state, &headers)?;
    let payment = state
        .gateway
        .get_payment(payment_id)
        .await?
        .ok_or_else(|| HostelError::NotFound(format!("payment {}", payment_id)))?;
    let resident = state
        .gateway
        .get_resident(payment.resident_id)
        .await?
        .ok_or_else(|| HostelError::NotFound(format!("resident {}", payment.resident_id)))?;

    let (message, fallback) = reminders::payment_reminder(
        state.generator.as_ref(),
        &state.config.hostel_name,
        &resident,
        &payment,
    )
    .await;
    Ok(Json(ReminderResponse { message, fallback }))
}

async fn get_logo(State(state): State<AppState>) -> Result<Response, RestApiError> {
    // Publicly readable, like the hosted asset it replaces.
    let bytes = state
        .gateway
        .get_logo()
        .await?
        .ok_or_else(|| HostelError::NotFound("logo".to_string()))?;
    let content_type = if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
        "image/jpeg"
    } else {
        "image/png"
    };
    Ok(([(header::CONTENT_TYPE, content_type)], bytes).into_response())
}

async fn put_logo(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<StatusCode, RestApiError> {
    require_admin(&state, &headers)?;
    state.gateway.put_logo(body.to_vec()).await?;
    Ok(StatusCode::NO_CONTENT)
}

// --------- Router / server ---------

pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_origin(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/v1/health", get(health))
        .route("/api/v1/auth/admin/login", post(admin_login))
        .route("/api/v1/auth/resident/login", post(resident_login))
        .route("/api/v1/residents", get(list_residents).post(create_resident))
        .route("/api/v1/residents/:id", get(get_resident).put(update_resident))
        .route("/api/v1/residents/:id/status", post(change_resident_status))
        .route("/api/v1/residents/:id/restore", post(restore_resident))
        .route("/api/v1/residents/:id/meal-plan", put(update_meal_plan))
        .route("/api/v1/rooms", get(list_rooms).post(create_room))
        .route("/api/v1/rooms/:id", delete(delete_room))
        .route("/api/v1/cots", get(list_cots).post(create_cot))
        .route("/api/v1/cots/:id", delete(delete_cot))
        .route("/api/v1/payments", get(list_payments).post(create_payment))
        .route("/api/v1/payments/:id/status", post(update_payment_status))
        .route("/api/v1/expenses", get(list_expenses).post(create_expense))
        .route("/api/v1/feedback", get(list_feedback).post(create_feedback))
        .route("/api/v1/feedback/:id/status", post(update_feedback_status))
        .route("/api/v1/notices", get(list_notices).post(create_notice))
        .route("/api/v1/notices/:id", delete(delete_notice))
        .route("/api/v1/notices/generate", post(generate_notice_text))
        .route("/api/v1/room-history", get(list_room_history))
        .route("/api/v1/stats", get(stats))
        .route("/api/v1/reminders/payment/:id", post(payment_reminder))
        .route("/api/v1/assets/logo", get(get_logo).put(put_logo))
        .layer(DefaultBodyLimit::max(BODY_LIMIT_BYTES))
        .layer(cors)
        .with_state(state)
}

/// Binds and serves until ctrl-c.
pub async fn run_rest_api_server(state: AppState, addr: SocketAddr) -> anyhow::Result<()> {
    let router = build_router(state);
    let listener = TcpListener::bind(addr).await?;
    info!(%addr, "hostel REST API listening");
    axum::serve(listener, router)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("shutdown signal received");
        })
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use models::errors::{AuthFailure, ValidationError};

    fn status_of(err: RestApiError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn should_map_error_taxonomy_to_status_codes() {
        assert_eq!(
            status_of(HostelError::from(ValidationError::MissingField("name")).into()),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(HostelError::Conflict("room has occupied cots".to_string()).into()),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status_of(HostelError::NotFound("resident 1".to_string()).into()),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_of(HostelError::from(AuthFailure::DuplicateAccount).into()),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            status_of(HostelError::Gateway("boom".to_string()).into()),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            status_of(HostelError::Generation("quota".to_string()).into()),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            status_of(RestApiError::Forbidden("admin only".to_string())),
            StatusCode::FORBIDDEN
        );
    }

    #[test]
    fn should_parse_reference_month() {
        assert_eq!(
            parse_month("2024-03"),
            NaiveDate::from_ymd_opt(2024, 3, 1)
        );
        assert_eq!(parse_month("2024-13"), None);
        assert_eq!(parse_month("march"), None);
    }

    use lib::gateway::MemoryGateway;
    use lib::reminders::HttpTextGenerator;
    use models::{MealPlan, NewResident, ResidentRole, ResidentType};

    fn new_resident(name: &str, email: &str) -> NewResident {
        NewResident {
            account_id: None,
            role: ResidentRole::Resident,
            name: name.to_string(),
            date_of_birth: None,
            resident_type: ResidentType::Student,
            phone: Some("9000000001".to_string()),
            email: email.to_string(),
            guardian_name: None,
            guardian_phone: None,
            national_id: None,
            cot_id: None,
            rent: 8000,
            deposit_amount: 5000,
            meal_plan: MealPlan::default(),
        }
    }

    fn test_state() -> AppState {
        let config = HostelConfig::default();
        AppState::new(
            Arc::new(MemoryGateway::new()),
            Arc::new(HttpTextGenerator::new(
                "http://localhost:0".to_string(),
                String::new(),
                "test".to_string(),
            )),
            config,
        )
    }

    fn resident_headers(state: &AppState, email: &str) -> HeaderMap {
        let token = security::issue_session_token(
            email,
            "resident",
            state.config.jwt_secret.as_bytes(),
        )
        .unwrap();
        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            format!("Bearer {}", token).parse().unwrap(),
        );
        headers
    }

    #[tokio::test]
    async fn should_refuse_resident_touching_another_residents_payment() {
        let state = test_state();
        let alice = state
            .gateway
            .insert_resident(new_resident("Alice", "alice@example.com"))
            .await
            .unwrap();
        state
            .gateway
            .insert_resident(new_resident("Mallory", "mallory@example.com"))
            .await
            .unwrap();
        let payment = state
            .gateway
            .insert_payment(
                NewPayment {
                    resident_id: alice.id,
                    amount: 8000,
                    date: "2999-01-01".parse().unwrap(),
                    description: "rent".to_string(),
                },
                today(),
            )
            .await
            .unwrap();

        let err = update_payment_status(
            State(state.clone()),
            resident_headers(&state, "mallory@example.com"),
            Path(payment.id),
            Json(PaymentStatusRequest {
                status: PaymentStatus::Paid,
            }),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, RestApiError::Forbidden(_)));
        let stored = state.gateway.get_payment(payment.id).await.unwrap().unwrap();
        assert_eq!(stored.status, PaymentStatus::Due);

        // The subject herself may confirm it.
        update_payment_status(
            State(state.clone()),
            resident_headers(&state, "alice@example.com"),
            Path(payment.id),
            Json(PaymentStatusRequest {
                status: PaymentStatus::Paid,
            }),
        )
        .await
        .unwrap();
        let stored = state.gateway.get_payment(payment.id).await.unwrap().unwrap();
        assert_eq!(stored.status, PaymentStatus::Paid);
    }

    #[tokio::test]
    async fn should_scope_resident_reads_and_meal_plan_to_their_own_row() {
        let state = test_state();
        let alice = state
            .gateway
            .insert_resident(new_resident("Alice", "alice@example.com"))
            .await
            .unwrap();
        state
            .gateway
            .insert_resident(new_resident("Mallory", "mallory@example.com"))
            .await
            .unwrap();
        let mallory_headers = resident_headers(&state, "mallory@example.com");

        let err = get_resident(State(state.clone()), mallory_headers.clone(), Path(alice.id))
            .await
            .unwrap_err();
        assert!(matches!(err, RestApiError::Forbidden(_)));

        let err = update_meal_plan(
            State(state.clone()),
            mallory_headers,
            Path(alice.id),
            Json(MealPlan {
                breakfast: true,
                lunch: true,
                dinner: true,
            }),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, RestApiError::Forbidden(_)));
        let stored = state.gateway.get_resident(alice.id).await.unwrap().unwrap();
        assert_eq!(stored.meal_plan, MealPlan::default());

        // Her own row stays reachable.
        let own = get_resident(
            State(state.clone()),
            resident_headers(&state, "alice@example.com"),
            Path(alice.id),
        )
        .await
        .unwrap();
        assert_eq!(own.0.id, alice.id);
    }
}
