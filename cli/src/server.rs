use std::sync::{Arc, Mutex, MutexGuard};

use anyhow::Context;
use axum::{
    Json, Router,
    extract::{Path, Query, Request, State},
    http::{HeaderValue, StatusCode, header},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{delete, get, post, put},
};
use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use tower_http::limit::RequestBodyLimitLayer;

use fit28_core::bmi::{self, BmiReport};
use fit28_core::coach::{Exchange, Topic};
use fit28_core::food::{DailyLog, NewFoodEntry};
use fit28_core::gallery::GalleryFilter;
use fit28_core::goals::{self, GoalInput};
use fit28_core::grid::{CellKey, Week, WeekGrid};
use fit28_core::models::{
    ActivityRecord, EnergyLevel, ExportData, FoodEntry, GalleryItem, GoalRecord, ImportSummary,
    Theme, validate_meal_type,
};
use fit28_core::photo::validate_data_url;
use fit28_core::service::{ActivityDraft, Session, Tracker, validate_export};

const BODY_LIMIT: usize = 25 * 1024 * 1024; // 25 MB, photos travel as data URLs

#[derive(Clone)]
struct AppState {
    tracker: Arc<Mutex<Tracker>>,
    api_key: Option<String>,
}

impl AppState {
    fn tracker(&self) -> MutexGuard<'_, Tracker> {
        self.tracker
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

// --- Request / Response types ---

/// UI state the front end sends along with mutations.
#[derive(Deserialize, Default)]
struct SessionQuery {
    week: Option<String>,
    energy: Option<u8>,
}

impl SessionQuery {
    fn session(&self, fallback: Week) -> Result<Session, ApiError> {
        let week = match self.week.as_deref() {
            Some(w) => w.parse().map_err(bad_request)?,
            None => fallback,
        };
        let energy = match self.energy {
            Some(e) => EnergyLevel::new(e).map_err(bad_request)?,
            None => EnergyLevel::default(),
        };
        Ok(Session { week, energy })
    }
}

#[derive(Deserialize, Serialize)]
struct ThemeBody {
    theme: Theme,
}

#[derive(Deserialize)]
struct BmiRequest {
    height: Option<f64>,
    weight: Option<f64>,
    photo: Option<String>,
}

#[derive(Deserialize)]
struct GoalRequest {
    specific: String,
    #[serde(default)]
    measurable: String,
    #[serde(default)]
    achievable: String,
    #[serde(default)]
    relevant: String,
    frequency: Option<String>,
    #[serde(default)]
    intensity: String,
    #[serde(default)]
    time: String,
    #[serde(default, alias = "type")]
    exercise_types: Vec<String>,
}

impl From<GoalRequest> for GoalInput {
    fn from(req: GoalRequest) -> Self {
        Self {
            specific: req.specific,
            measurable: req.measurable,
            achievable: req.achievable,
            relevant: req.relevant,
            frequency: req.frequency,
            intensity: req.intensity,
            time: req.time,
            exercise_types: req.exercise_types,
        }
    }
}

#[derive(Deserialize)]
struct ActivityRequest {
    key: CellKey,
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    details: String,
    photo: Option<String>,
}

#[derive(Deserialize)]
struct FoodRequest {
    name: String,
    #[serde(default)]
    quantity: String,
    #[serde(default)]
    protein: f64,
    #[serde(default)]
    carbs: f64,
    #[serde(default)]
    fat: f64,
    #[serde(default)]
    calories: f64,
    photo: Option<String>,
}

impl From<FoodRequest> for NewFoodEntry {
    fn from(req: FoodRequest) -> Self {
        Self {
            name: req.name,
            quantity: req.quantity,
            protein: req.protein,
            carbs: req.carbs,
            fat: req.fat,
            calories: req.calories,
            photo: req.photo,
        }
    }
}

#[derive(Deserialize)]
struct GalleryQuery {
    #[serde(rename = "type", default)]
    kind: String,
    #[serde(default)]
    week: String,
}

#[derive(Deserialize)]
struct ImportQuery {
    #[serde(default)]
    replace: bool,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

// --- Error handling ---

enum ApiError {
    NotFound(String),
    BadRequest(String),
    Internal(anyhow::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            Self::Internal(err) => {
                tracing::error!("internal server error: {err:#}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };
        (status, Json(ErrorResponse { error: message })).into_response()
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err)
    }
}

#[allow(clippy::needless_pass_by_value)]
fn bad_request(err: anyhow::Error) -> ApiError {
    ApiError::BadRequest(format!("{err:#}"))
}

fn parse_date(s: &str) -> Result<NaiveDate, ApiError> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|_| ApiError::BadRequest(format!("Invalid date '{s}'. Use YYYY-MM-DD")))
}

fn check_photo(photo: Option<&str>) -> Result<(), ApiError> {
    photo.map(validate_data_url).transpose().map_err(bad_request)?;
    Ok(())
}

// --- Middleware ---

async fn require_auth(State(state): State<AppState>, request: Request, next: Next) -> Response {
    if let Some(ref expected_key) = state.api_key {
        let authorized = request
            .headers()
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .is_some_and(|token| token == expected_key);

        if !authorized {
            tracing::warn!(path = %request.uri().path(), "rejected request without valid API key");
            return (
                StatusCode::UNAUTHORIZED,
                Json(ErrorResponse {
                    error: "Invalid or missing API key".to_string(),
                }),
            )
                .into_response();
        }
    }
    next.run(request).await
}

async fn security_headers(request: Request, next: Next) -> Response {
    let mut response = next.run(request).await;
    let headers = response.headers_mut();
    headers.insert(
        "x-content-type-options",
        HeaderValue::from_static("nosniff"),
    );
    headers.insert("x-frame-options", HeaderValue::from_static("DENY"));
    headers.insert(
        "content-security-policy",
        HeaderValue::from_static("default-src 'none'"),
    );
    response
}

// --- Handlers ---

async fn get_theme(State(state): State<AppState>) -> Result<Json<ThemeBody>, ApiError> {
    let theme = state.tracker().theme().context("failed to read theme")?;
    Ok(Json(ThemeBody { theme }))
}

async fn set_theme(
    State(state): State<AppState>,
    Json(req): Json<ThemeBody>,
) -> Result<Json<ThemeBody>, ApiError> {
    let theme = state
        .tracker()
        .set_theme(req.theme)
        .context("failed to save theme")?;
    Ok(Json(ThemeBody { theme }))
}

async fn toggle_theme(State(state): State<AppState>) -> Result<Json<ThemeBody>, ApiError> {
    let theme = state
        .tracker()
        .toggle_theme()
        .context("failed to toggle theme")?;
    Ok(Json(ThemeBody { theme }))
}

async fn get_bmi(State(state): State<AppState>) -> Result<Json<BmiReport>, ApiError> {
    state
        .tracker()
        .bmi()
        .context("failed to read BMI")?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound("No BMI measurement recorded".to_string()))
}

async fn record_bmi(
    State(state): State<AppState>,
    Query(session): Query<SessionQuery>,
    Json(req): Json<BmiRequest>,
) -> Result<(StatusCode, Json<BmiReport>), ApiError> {
    bmi::calculate(req.height, req.weight).map_err(bad_request)?;
    check_photo(req.photo.as_deref())?;
    let session = session.session(Week::default())?;

    let tracker = state.tracker();
    let mut report = tracker
        .record_bmi(req.height, req.weight)
        .context("failed to save BMI")?;
    if let Some(photo) = req.photo {
        report = tracker
            .attach_bmi_photo(&session, photo)
            .context("failed to attach BMI photo")?;
    }
    Ok((StatusCode::CREATED, Json(report)))
}

async fn get_goals(State(state): State<AppState>) -> Result<Json<GoalRecord>, ApiError> {
    state
        .tracker()
        .goals()
        .context("failed to read goals")?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound("No goals saved".to_string()))
}

async fn save_goals(
    State(state): State<AppState>,
    Json(req): Json<GoalRequest>,
) -> Result<Json<GoalRecord>, ApiError> {
    let record = goals::build_record(req.into()).map_err(bad_request)?;
    state
        .tracker()
        .replace_goals(&record)
        .context("failed to save goals")?;
    Ok(Json(record))
}

async fn get_week_grid(
    State(state): State<AppState>,
    Path(week): Path<String>,
) -> Result<Json<WeekGrid>, ApiError> {
    let week: Week = week.parse().map_err(bad_request)?;
    let grid = state
        .tracker()
        .week_grid(week)
        .context("failed to load activities")?;
    Ok(Json(grid))
}

async fn shift_week_grid(
    State(state): State<AppState>,
    Path((week, step)): Path<(String, String)>,
) -> Result<Json<WeekGrid>, ApiError> {
    let week: Week = week.parse().map_err(bad_request)?;
    let week = week.shift(Week::parse_step(&step).map_err(bad_request)?);
    let grid = state
        .tracker()
        .week_grid(week)
        .context("failed to load activities")?;
    Ok(Json(grid))
}

async fn log_activity(
    State(state): State<AppState>,
    Query(session): Query<SessionQuery>,
    Json(req): Json<ActivityRequest>,
) -> Result<Json<ActivityRecord>, ApiError> {
    if req.kind.trim().is_empty() {
        return Err(ApiError::BadRequest(
            "Activity type must not be empty".to_string(),
        ));
    }
    check_photo(req.photo.as_deref())?;
    let fallback = Week::containing(req.key.date).unwrap_or_default();
    let session = session.session(fallback)?;

    let record = state
        .tracker()
        .log_activity(
            &session,
            req.key,
            ActivityDraft {
                kind: req.kind,
                details: req.details,
                photo: req.photo,
            },
        )
        .context("failed to save activity")?;
    Ok(Json(record))
}

async fn get_daily_log(
    State(state): State<AppState>,
    Path(date): Path<String>,
) -> Result<Json<DailyLog>, ApiError> {
    let date = parse_date(&date)?;
    let daily = state
        .tracker()
        .daily_log(date)
        .context("failed to load food log")?;
    Ok(Json(daily))
}

async fn add_food(
    State(state): State<AppState>,
    Path((date, meal)): Path<(String, String)>,
    Query(session): Query<SessionQuery>,
    Json(req): Json<FoodRequest>,
) -> Result<(StatusCode, Json<DailyLog>), ApiError> {
    let date = parse_date(&date)?;
    let meal = validate_meal_type(&meal).map_err(bad_request)?;
    let entry = NewFoodEntry::from(req);
    entry.validate().map_err(bad_request)?;
    check_photo(entry.photo.as_deref())?;
    let session = session.session(Week::containing(date).unwrap_or_default())?;

    let daily = state
        .tracker()
        .add_food(&session, date, &meal, entry)
        .context("failed to save food entry")?;
    Ok((StatusCode::CREATED, Json(daily)))
}

async fn remove_food(
    State(state): State<AppState>,
    Path((date, meal, index)): Path<(String, String, usize)>,
) -> Result<Json<FoodEntry>, ApiError> {
    let date = parse_date(&date)?;
    let meal = validate_meal_type(&meal).map_err(bad_request)?;

    let tracker = state.tracker();
    let log = tracker.food_log().context("failed to load food log")?;
    let exists = log
        .get(&date)
        .and_then(|day| day.get(&meal))
        .is_some_and(|entries| index < entries.len());
    if !exists {
        return Err(ApiError::NotFound(format!(
            "No {meal} entry {index} on {date}"
        )));
    }
    let removed = tracker
        .remove_food(date, &meal, index)
        .context("failed to remove food entry")?;
    Ok(Json(removed))
}

async fn get_gallery(
    State(state): State<AppState>,
    Query(query): Query<GalleryQuery>,
) -> Result<Json<Vec<GalleryItem>>, ApiError> {
    let filter = GalleryFilter::parse(&query.kind, &query.week).map_err(bad_request)?;
    let items = state
        .tracker()
        .gallery(&filter)
        .context("failed to load gallery")?;
    Ok(Json(items))
}

async fn coach_greeting(State(state): State<AppState>) -> Result<Json<Exchange>, ApiError> {
    let reply = state
        .tracker()
        .suggest(None, Local::now().date_naive())
        .context("failed to build suggestion")?;
    Ok(Json(reply))
}

async fn coach_topic(
    State(state): State<AppState>,
    Path(topic): Path<String>,
) -> Result<Json<Exchange>, ApiError> {
    let topic: Topic = topic.parse().map_err(bad_request)?;
    let reply = state
        .tracker()
        .suggest(Some(topic), Local::now().date_naive())
        .context("failed to build suggestion")?;
    Ok(Json(reply))
}

async fn export_data(State(state): State<AppState>) -> Result<Json<ExportData>, ApiError> {
    let data = state
        .tracker()
        .export_all()
        .context("failed to export data")?;
    Ok(Json(data))
}

async fn import_data(
    State(state): State<AppState>,
    Query(query): Query<ImportQuery>,
    Json(data): Json<ExportData>,
) -> Result<Json<ImportSummary>, ApiError> {
    validate_export(&data).map_err(bad_request)?;

    let tracker = state.tracker();
    if query.replace {
        tracker.reset().context("failed to clear data")?;
    }
    let summary = tracker.import_all(&data).context("failed to import data")?;
    Ok(Json(summary))
}

fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/api/theme", get(get_theme).put(set_theme))
        .route("/api/theme/toggle", post(toggle_theme))
        .route("/api/bmi", get(get_bmi).post(record_bmi))
        .route("/api/goals", get(get_goals).put(save_goals))
        .route("/api/activities", put(log_activity))
        .route("/api/activities/week/{week}", get(get_week_grid))
        .route("/api/activities/week/{week}/shift/{step}", get(shift_week_grid))
        .route("/api/food/{date}", get(get_daily_log))
        .route("/api/food/{date}/{meal}", post(add_food))
        .route("/api/food/{date}/{meal}/{index}", delete(remove_food))
        .route("/api/gallery", get(get_gallery))
        .route("/api/coach", get(coach_greeting))
        .route("/api/coach/{topic}", get(coach_topic))
        .route("/api/export", get(export_data))
        .route("/api/import", post(import_data))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth))
        .layer(RequestBodyLimitLayer::new(BODY_LIMIT))
        .layer(middleware::from_fn(security_headers))
        .with_state(state)
}

// --- Server startup ---

/// First and last four characters of the key, or a mask for short keys.
fn key_hint(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    if chars.len() < 8 {
        return "****".to_string();
    }
    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{head}...{tail}")
}

pub async fn start_server(
    tracker: Tracker,
    port: u16,
    bind: &str,
    api_key: Option<String>,
) -> anyhow::Result<()> {
    let state = AppState {
        tracker: Arc::new(Mutex::new(tracker)),
        api_key: api_key.clone(),
    };

    let app = build_router(state);

    if let Some(ref key) = api_key {
        eprintln!(
            "API key: {} (see api_key file in data directory)",
            key_hint(key)
        );
    } else {
        eprintln!("Warning: Authentication disabled (--no-auth). API is open to anyone.");
    }

    if bind != "127.0.0.1" && bind != "localhost" && api_key.is_none() {
        eprintln!(
            "Warning: Listening on {bind} with no authentication. Any device on your network can access this API."
        );
    }

    let listener = tokio::net::TcpListener::bind(format!("{bind}:{port}"))
        .await
        .with_context(|| format!("failed to bind {bind}:{port}"))?;
    tracing::info!(%bind, port, "server started");
    eprintln!("Listening on http://{bind}:{port}");
    axum::serve(listener, app).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use fit28_core::store::StoreKey;
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    const PHOTO: &str = "data:image/jpeg;base64,aGk=";

    fn test_state(api_key: Option<String>) -> AppState {
        AppState {
            tracker: Arc::new(Mutex::new(Tracker::new_in_memory().unwrap())),
            api_key,
        }
    }

    fn test_app(api_key: Option<String>) -> Router {
        build_router(test_state(api_key))
    }

    async fn send(app: Router, request: axum::http::Request<Body>) -> (StatusCode, serde_json::Value) {
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let body = response.into_body().collect().await.unwrap().to_bytes();
        let json = if body.is_empty() {
            serde_json::Value::Null
        } else {
            serde_json::from_slice(&body).unwrap()
        };
        (status, json)
    }

    fn get(uri: &str) -> axum::http::Request<Body> {
        axum::http::Request::get(uri).body(Body::empty()).unwrap()
    }

    fn with_json(
        builder: axum::http::request::Builder,
        body: &serde_json::Value,
    ) -> axum::http::Request<Body> {
        builder
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_string(body).unwrap()))
            .unwrap()
    }

    #[test]
    fn key_hint_handles_short_and_unicode_keys() {
        assert_eq!(key_hint("abcdef0123456789"), "abcd...6789");
        assert_eq!(key_hint("abc"), "****");
        assert_eq!(key_hint(""), "****");
        assert_eq!(key_hint("ключ-секрет"), "ключ...крет");
    }

    #[tokio::test]
    async fn auth_missing_key_returns_401() {
        let app = test_app(Some("test-key-abc123".to_string()));
        let (status, json) = send(app, get("/api/theme")).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(json["error"], "Invalid or missing API key");
    }

    #[tokio::test]
    async fn auth_wrong_key_returns_401() {
        let app = test_app(Some("test-key-abc123".to_string()));
        let request = axum::http::Request::get("/api/theme")
            .header("Authorization", "Bearer wrong-key")
            .body(Body::empty())
            .unwrap();
        let (status, _) = send(app, request).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn auth_correct_key_succeeds() {
        let app = test_app(Some("test-key-abc123".to_string()));
        let request = axum::http::Request::get("/api/theme")
            .header("Authorization", "Bearer test-key-abc123")
            .body(Body::empty())
            .unwrap();
        let (status, json) = send(app, request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["theme"], "light");
    }

    #[tokio::test]
    async fn security_headers_present() {
        let app = test_app(Some("secret".to_string()));
        let response = app.oneshot(get("/api/theme")).await.unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            response.headers().get("x-content-type-options").unwrap(),
            "nosniff"
        );
        assert_eq!(response.headers().get("x-frame-options").unwrap(), "DENY");
        assert_eq!(
            response.headers().get("content-security-policy").unwrap(),
            "default-src 'none'"
        );
    }

    #[tokio::test]
    async fn body_limit_rejects_oversized_request() {
        let app = test_app(None);
        let response = app
            .oneshot(
                axum::http::Request::post("/api/import")
                    .header("content-type", "application/json")
                    .body(Body::from(vec![0u8; BODY_LIMIT + 1]))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[tokio::test]
    async fn internal_error_does_not_leak_details() {
        let error = ApiError::Internal(anyhow::anyhow!("secret path /home/user/.local/share/fit28"));
        let response = error.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = response.into_body().collect().await.unwrap().to_bytes();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["error"], "Internal server error");
    }

    #[tokio::test]
    async fn theme_put_then_get() {
        let state = test_state(None);
        let body = serde_json::json!({ "theme": "dark" });
        let (status, _) = send(
            build_router(state.clone()),
            with_json(axum::http::Request::put("/api/theme"), &body),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (_, json) = send(build_router(state.clone()), get("/api/theme")).await;
        assert_eq!(json["theme"], "dark");

        let request = axum::http::Request::post("/api/theme/toggle")
            .body(Body::empty())
            .unwrap();
        let (_, json) = send(build_router(state), request).await;
        assert_eq!(json["theme"], "light");
    }

    #[tokio::test]
    async fn bmi_missing_weight_is_bad_request() {
        let body = serde_json::json!({ "height": 175.0 });
        let (status, json) = send(
            test_app(None),
            with_json(axum::http::Request::post("/api/bmi"), &body),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"], "Please enter both height and weight.");
    }

    #[tokio::test]
    async fn bmi_with_photo_lands_in_gallery() {
        let state = test_state(None);
        let body = serde_json::json!({ "height": 180.0, "weight": 81.0, "photo": PHOTO });
        let (status, json) = send(
            build_router(state.clone()),
            with_json(axum::http::Request::post("/api/bmi?week=2"), &body),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(json["display"], "25.0");
        assert_eq!(json["record"]["category"], "Overweight");

        let (_, json) = send(build_router(state), get("/api/gallery?type=bmi&week=2")).await;
        assert_eq!(json.as_array().unwrap().len(), 1);
        assert_eq!(json[0]["description"], "BMI Measurement");
    }

    #[tokio::test]
    async fn missing_records_are_404() {
        let (status, _) = send(test_app(None), get("/api/bmi")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        let (status, _) = send(test_app(None), get("/api/goals")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn goals_drop_types_outside_preset() {
        let body = serde_json::json!({
            "specific": "build muscle",
            "achievable": "4",
            "type": ["Strength Training", "Yoga", "HIIT"]
        });
        let (status, json) = send(
            test_app(None),
            with_json(axum::http::Request::put("/api/goals"), &body),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["fitt"]["frequency"], "4 days/week");
        assert_eq!(
            json["fitt"]["type"],
            serde_json::json!(["Strength Training", "HIIT"])
        );
    }

    #[tokio::test]
    async fn activity_shows_in_its_week_only() {
        let state = test_state(None);
        let body = serde_json::json!({
            "key": "2024-10-29-6PM-7PM",
            "type": "cardio",
            "details": "intervals"
        });
        let (status, json) = send(
            build_router(state.clone()),
            with_json(axum::http::Request::put("/api/activities?energy=4"), &body),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["energy"], 4);

        let (_, grid) = send(build_router(state.clone()), get("/api/activities/week/2")).await;
        assert_eq!(grid["label"], "Week 2: Oct 27 - Nov 2");
        let filled: usize = grid["rows"]
            .as_array()
            .unwrap()
            .iter()
            .flat_map(|r| r["cells"].as_array().unwrap())
            .filter(|c| !c["activity"].is_null())
            .count();
        assert_eq!(filled, 1);

        let (_, grid) = send(build_router(state), get("/api/activities/week/1")).await;
        let filled = grid["rows"]
            .as_array()
            .unwrap()
            .iter()
            .flat_map(|r| r["cells"].as_array().unwrap())
            .filter(|c| !c["activity"].is_null())
            .count();
        assert_eq!(filled, 0);
    }

    #[tokio::test]
    async fn invalid_week_is_bad_request() {
        let (status, _) = send(test_app(None), get("/api/activities/week/9")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn week_shift_clamps_at_both_ends() {
        for (uri, expected) in [
            ("/api/activities/week/1/shift/prev", 1),
            ("/api/activities/week/1/shift/next", 2),
            ("/api/activities/week/3/shift/prev", 2),
            ("/api/activities/week/4/shift/next", 4),
            ("/api/activities/week/2/shift/10", 4),
            ("/api/activities/week/3/shift/-10", 1),
        ] {
            let (status, grid) = send(test_app(None), get(uri)).await;
            assert_eq!(status, StatusCode::OK, "{uri}");
            assert_eq!(grid["week"], expected, "{uri}");
        }

        let (status, _) = send(test_app(None), get("/api/activities/week/2/shift/up")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let (status, _) = send(test_app(None), get("/api/activities/week/7/shift/prev")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn food_add_sums_day() {
        let state = test_state(None);
        for (name, protein) in [("Chicken", 31.0), ("Rice", 4.5)] {
            let body = serde_json::json!({
                "name": name, "quantity": "1 cup", "protein": protein, "calories": 200.0
            });
            let (status, _) = send(
                build_router(state.clone()),
                with_json(axum::http::Request::post("/api/food/2024-10-21/lunch"), &body),
            )
            .await;
            assert_eq!(status, StatusCode::CREATED);
        }

        let (_, json) = send(build_router(state), get("/api/food/2024-10-21")).await;
        assert_eq!(json["meals"][0]["entries"].as_array().unwrap().len(), 2);
        assert_eq!(json["totals"]["protein"], 35.5);
        assert_eq!(json["totals"]["calories"], 400.0);
    }

    #[tokio::test]
    async fn food_rejects_bad_input() {
        let body = serde_json::json!({ "name": "Tea" });
        let (status, _) = send(
            test_app(None),
            with_json(axum::http::Request::post("/api/food/2024-10-21/elevenses"), &body),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let body = serde_json::json!({ "name": "Tea", "fat": -2.0 });
        let (status, _) = send(
            test_app(None),
            with_json(axum::http::Request::post("/api/food/2024-10-21/snack"), &body),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = send(test_app(None), get("/api/food/yesterday")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn food_remove_missing_entry_is_404() {
        let request = axum::http::Request::delete("/api/food/2024-10-21/lunch/0")
            .body(Body::empty())
            .unwrap();
        let (status, _) = send(test_app(None), request).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn coach_reports_protein() {
        let (status, json) = send(test_app(None), get("/api/coach/protein")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["question"], "How am I doing on protein today?");
        assert!(json["answer"].as_str().unwrap().contains("(0% of target)"));

        let (_, json) = send(test_app(None), get("/api/coach")).await;
        assert!(json["answer"].as_str().unwrap().starts_with("I'm here to help"));

        let (status, _) = send(test_app(None), get("/api/coach/sleep")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn export_then_import_into_fresh_server() {
        let source = test_state(None);
        {
            let tracker = source.tracker();
            tracker.set_theme(Theme::Dark).unwrap();
            tracker.record_bmi(Some(170.0), Some(70.0)).unwrap();
        }
        let (status, export) = send(build_router(source), get("/api/export")).await;
        assert_eq!(status, StatusCode::OK);
        assert!(export["goals"].is_null());

        let target = test_state(None);
        let (status, summary) = send(
            build_router(target.clone()),
            with_json(axum::http::Request::post("/api/import"), &export),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(summary["theme"], true);
        assert_eq!(summary["bmi"], true);
        assert_eq!(summary["goals"], false);
        assert_eq!(target.tracker().theme().unwrap(), Theme::Dark);
    }

    #[tokio::test]
    async fn corrupted_store_is_internal_error() {
        let state = test_state(None);
        state
            .tracker()
            .store()
            .set_raw(StoreKey::Gallery, "{not json")
            .unwrap();
        let (status, json) = send(build_router(state), get("/api/gallery")).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json["error"], "Internal server error");
    }
}
