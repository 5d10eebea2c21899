//! Axum route handlers for the persona survey server.
//!
//! # Routes
//!
//! - `GET    /`                         — Survey page (tera template)
//! - `GET    /health`                   — Returns `{"status": "ok", "version": ..., "service": ...}`
//! - `POST   /start_survey`             — Existing profile, or a fresh set of animals to rate
//! - `POST   /submit_survey`            — Validate, persist, and chart a completed survey
//! - `POST   /generate_chart`           — Live preview chart, nothing persisted
//! - `POST   /load_profile`             — Stored profile plus a freshly rendered chart
//! - `GET    /profiles`                 — Summaries of every stored profile
//! - `GET    /profiles/:name/chart.png` — Last stored chart snapshot
//! - `DELETE /profiles/:name`           — Remove a profile and its snapshot

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::header,
    response::{Html, IntoResponse},
    routing::{delete, get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tera::Tera;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use super::error::ApiError;
use crate::chart::{encode_base64, render_base64, render_png, ChartOptions, RadarGeometry};
use crate::config::AppConfig;
use crate::error::{ProfileError, StoreError};
use crate::persona::{
    random_animals, storage_key, InterestRating, Profile, ProfileStore, SkillRating, ANIMALS,
};

const INDEX_TEMPLATE: &str = include_str!("../../templates/index.html");

/// Shared application state for the HTTP server.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub store: ProfileStore,
    pub templates: Arc<Tera>,
}

impl AppState {
    /// Build state from `config`, compiling the page template.
    pub fn new(config: AppConfig) -> Result<Self, tera::Error> {
        let mut templates = Tera::default();
        templates.add_raw_template("index.html", INDEX_TEMPLATE)?;
        Ok(Self {
            store: ProfileStore::new(config.data_dir.clone()),
            config: Arc::new(config),
            templates: Arc::new(templates),
        })
    }
}

/// Build the axum router with all routes.
pub fn app_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index_handler))
        .route("/health", get(health_handler))
        .route("/start_survey", post(start_survey_handler))
        .route("/submit_survey", post(submit_survey_handler))
        .route("/generate_chart", post(generate_chart_handler))
        .route("/load_profile", post(load_profile_handler))
        .route("/profiles", get(list_profiles_handler))
        .route("/profiles/:name", delete(delete_profile_handler))
        .route("/profiles/:name/chart.png", get(chart_png_handler))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

// ---------------------------------------------------------------------------
// Request bodies
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
struct NameRequest {
    #[serde(default)]
    name: String,
}

#[derive(Debug, Default, Deserialize)]
struct SubmitRequest {
    #[serde(default)]
    name: String,
    #[serde(default)]
    skills: Vec<SkillRating>,
    #[serde(default)]
    interests: Vec<InterestRating>,
    #[serde(default)]
    tags: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
struct ChartRequest {
    #[serde(default)]
    skills: Vec<SkillRating>,
    #[serde(default)]
    interests: Vec<InterestRating>,
}

/// Run blocking file or raster work off the async executor.
async fn blocking<T, F>(work: F) -> Result<T, ApiError>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T, ApiError> + Send + 'static,
{
    tokio::task::spawn_blocking(work).await?
}

/// Geometry and base64 PNG for a pair of rating lists.
fn render_chart(
    skills: &[SkillRating],
    interests: &[InterestRating],
    interest_max: u8,
    options: ChartOptions,
) -> Result<(RadarGeometry, String), ApiError> {
    let geometry = RadarGeometry::from_ratings(skills, interests, interest_max)?;
    let encoded = render_base64(&geometry, options)?;
    Ok((geometry, encoded))
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET / — the survey page.
async fn index_handler(State(state): State<AppState>) -> Result<Html<String>, ApiError> {
    let store = state.store.clone();
    let profiles = blocking(move || Ok(store.list()?)).await?;

    let mut context = tera::Context::new();
    context.insert("service", env!("CARGO_PKG_NAME"));
    context.insert("animals", &ANIMALS);
    context.insert("survey_size", &state.config.survey_size);
    context.insert("interest_max", &state.config.interest_max);
    context.insert("profiles", &profiles);
    Ok(Html(state.templates.render("index.html", &context)?))
}

/// GET /health — liveness probe.
async fn health_handler() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "version": crate::VERSION,
        "service": env!("CARGO_PKG_NAME"),
    }))
}

/// POST /start_survey — look up an existing profile or pick animals to rate.
///
/// Request: `{ "name": "Jane Doe" }`
async fn start_survey_handler(
    State(state): State<AppState>,
    payload: Result<Json<NameRequest>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let Json(request) = payload?;
    let name = request.name.trim().to_string();
    if name.is_empty() {
        return Err(ApiError::BadRequest("Name is required".into()));
    }
    storage_key(&name)?;

    let store = state.store.clone();
    let lookup = name.clone();
    let existing = blocking(move || Ok(store.load(&lookup)?)).await?;

    if let Some(profile) = existing {
        tracing::info!(name = %name, "found existing profile");
        return Ok(Json(json!({
            "has_existing": true,
            "message": format!("Found existing profile for {}!", name),
            "existing_data": profile,
        })));
    }

    let animals = random_animals(state.config.survey_size);
    tracing::info!(name = %name, animals = ?animals, "starting new survey");
    Ok(Json(json!({
        "has_existing": false,
        "animals": animals,
    })))
}

/// POST /submit_survey — persist a completed survey and chart it.
///
/// Request: `{ "name": ..., "skills": [...], "interests": [...], "tags": [...] }`
async fn submit_survey_handler(
    State(state): State<AppState>,
    payload: Result<Json<SubmitRequest>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let Json(request) = payload?;
    let mut profile = Profile::new(request.name.trim(), request.skills, request.interests)
        .with_tags(request.tags);
    profile.validate(state.config.interest_max)?;

    let store = state.store.clone();
    let interest_max = state.config.interest_max;
    let options = state.config.chart;
    let (profile, geometry, encoded) = blocking(move || {
        let path = store.save(&mut profile)?;
        tracing::info!(name = %profile.name, path = %path.display(), "profile saved");

        let geometry =
            RadarGeometry::from_ratings(&profile.skills, &profile.interests, interest_max)?;
        let png = render_png(&geometry, options)?;
        store.save_chart(&profile.name, &png)?;
        Ok((profile, geometry, encode_base64(&png)))
    })
    .await?;

    Ok(Json(json!({
        "success": true,
        "chart_data": encoded,
        "axes": geometry.axes(),
        "key": profile.key()?,
        "message": format!("Profile saved for {}!", profile.name),
    })))
}

/// POST /generate_chart — live preview; nothing is stored.
///
/// Request: `{ "skills": [...], "interests": [...] }`
async fn generate_chart_handler(
    State(state): State<AppState>,
    payload: Result<Json<ChartRequest>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let Json(request) = payload?;
    if request.skills.is_empty() || request.interests.is_empty() {
        return Err(ApiError::BadRequest("Missing data".into()));
    }
    let preview = Profile::new("Live Preview", request.skills, request.interests);
    preview.validate(state.config.interest_max)?;

    let interest_max = state.config.interest_max;
    let options = state.config.chart;
    let (geometry, encoded) = blocking(move || {
        render_chart(&preview.skills, &preview.interests, interest_max, options)
    })
    .await?;

    Ok(Json(json!({
        "success": true,
        "chart_data": encoded,
        "axes": geometry.axes(),
    })))
}

/// POST /load_profile — stored ratings plus a freshly rendered chart.
///
/// Request: `{ "name": "Jane Doe" }`
async fn load_profile_handler(
    State(state): State<AppState>,
    payload: Result<Json<NameRequest>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let Json(request) = payload?;
    let name = request.name.trim().to_string();
    if name.is_empty() {
        return Err(ApiError::BadRequest("Name is required".into()));
    }

    let store = state.store.clone();
    let interest_max = state.config.interest_max;
    let options = state.config.chart;
    let (profile, geometry, encoded) = blocking(move || {
        let profile =
            found(store.load(&name), || ApiError::NotFound("Profile not found".into()))?;
        let (geometry, encoded) =
            render_chart(&profile.skills, &profile.interests, interest_max, options)?;
        Ok((profile, geometry, encoded))
    })
    .await?;

    Ok(Json(json!({
        "success": true,
        "chart_data": encoded,
        "axes": geometry.axes(),
        "name": profile.name,
        "skills": profile.skills,
        "interests": profile.interests,
        "tags": profile.tags,
        "updated_at": profile.updated_at,
    })))
}

/// GET /profiles — summaries of stored profiles.
async fn list_profiles_handler(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let store = state.store.clone();
    let profiles = blocking(move || Ok(store.list()?)).await?;
    Ok(Json(json!({ "profiles": profiles })))
}

/// GET /profiles/:name/chart.png — the snapshot written by the last submit.
async fn chart_png_handler(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let store = state.store.clone();
    let png = blocking(move || {
        found(store.load_chart(&name), || {
            ApiError::NotFound(format!("No chart stored for '{}'", name))
        })
    })
    .await?;
    Ok(([(header::CONTENT_TYPE, "image/png")], png))
}

/// DELETE /profiles/:name — remove a profile and its snapshot.
async fn delete_profile_handler(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let store = state.store.clone();
    let key =
        storage_key(&name).map_err(|_| ApiError::NotFound("Profile not found".into()))?;
    let deleted = blocking(move || Ok(store.delete(&name)?)).await?;
    if !deleted {
        return Err(ApiError::NotFound("Profile not found".into()));
    }
    tracing::info!(key = %key, "profile deleted");
    Ok(Json(json!({ "success": true, "deleted": key })))
}

/// Resolve a store lookup by name. A name that cannot be a storage key can
/// never have been saved, so it is reported as missing rather than invalid.
fn found<T>(
    lookup: Result<Option<T>, StoreError>,
    missing: impl FnOnce() -> ApiError,
) -> Result<T, ApiError> {
    match lookup {
        Ok(Some(value)) => Ok(value),
        Ok(None) | Err(StoreError::Profile(ProfileError::InvalidName(_))) => Err(missing()),
        Err(e) => Err(e.into()),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    fn test_state(dir: &std::path::Path) -> AppState {
        let config = AppConfig {
            data_dir: dir.to_path_buf(),
            chart: ChartOptions { size: 200 },
            ..AppConfig::default()
        };
        AppState::new(config).unwrap()
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("Content-Type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), 4 * 1024 * 1024)
            .await
            .unwrap();
        let json = serde_json::from_slice(&body).unwrap_or(Value::Null);
        (status, json)
    }

    fn survey_body(name: &str) -> Value {
        json!({
            "name": name,
            "skills": [
                {"animal": "Lion", "skill": 5},
                {"animal": "Owl", "skill": 2},
                {"animal": "Fox", "skill": 3},
            ],
            "interests": [
                {"animal": "Lion", "interest": 1},
                {"animal": "Owl", "interest": 3},
                {"animal": "Fox", "interest": 2},
            ],
            "tags": ["night-shift"],
        })
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let dir = tempfile::tempdir().unwrap();
        let app = app_router(test_state(dir.path()));

        let request = Request::builder().uri("/health").body(Body::empty()).unwrap();
        let (status, json) = send(app, request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["status"], "ok");
        assert_eq!(json["version"], crate::VERSION);
        assert_eq!(json["service"], "persona-radar");
    }

    #[tokio::test]
    async fn test_index_page_renders() {
        let dir = tempfile::tempdir().unwrap();
        let app = app_router(test_state(dir.path()));

        let request = Request::builder().uri("/").body(Body::empty()).unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = axum::body::to_bytes(response.into_body(), 1024 * 1024)
            .await
            .unwrap();
        let html = String::from_utf8(body.to_vec()).unwrap();
        assert!(html.contains("Skills vs Interests"));
        assert!(html.contains("Penguin"));
    }

    #[tokio::test]
    async fn test_start_survey_requires_name() {
        let dir = tempfile::tempdir().unwrap();
        let app = app_router(test_state(dir.path()));

        let (status, json) = send(app, post_json("/start_survey", json!({"name": "  "}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"], "Name is required");
    }

    #[tokio::test]
    async fn test_start_survey_new_user_gets_animals() {
        let dir = tempfile::tempdir().unwrap();
        let app = app_router(test_state(dir.path()));

        let (status, json) = send(app, post_json("/start_survey", json!({"name": "Ann"}))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["has_existing"], false);
        let animals = json["animals"].as_array().unwrap();
        assert_eq!(animals.len(), 5);
        assert!(animals
            .iter()
            .all(|a| ANIMALS.contains(&a.as_str().unwrap())));
    }

    #[tokio::test]
    async fn test_submit_then_start_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(dir.path());

        let (status, json) = send(
            app_router(state.clone()),
            post_json("/submit_survey", survey_body("Jane Doe!!")),
        )
        .await;
        assert_eq!(status, StatusCode::OK, "{}", json);
        assert_eq!(json["success"], true);
        assert_eq!(json["key"], "jane_doe");
        assert_eq!(json["message"], "Profile saved for Jane Doe!!!");
        assert!(json["chart_data"].as_str().unwrap().starts_with("iVBORw0KGgo"));
        assert_eq!(json["axes"].as_array().unwrap().len(), 3);
        assert!(dir.path().join("jane_doe_persona.json").exists());
        assert!(dir.path().join("jane_doe_persona_radar.png").exists());

        let (status, json) = send(
            app_router(state.clone()),
            post_json("/start_survey", json!({"name": "jane doe"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["has_existing"], true);
        assert_eq!(json["existing_data"]["skills"][0]["animal"], "Lion");

        let (status, json) = send(
            app_router(state),
            post_json("/load_profile", json!({"name": "Jane Doe"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let submitted = survey_body("Jane Doe!!");
        assert_eq!(json["skills"], submitted["skills"]);
        assert_eq!(json["interests"], submitted["interests"]);
        assert_eq!(json["tags"], submitted["tags"]);
        assert!(json["chart_data"].as_str().is_some());
    }

    #[tokio::test]
    async fn test_submit_rejects_missing_and_malformed() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(dir.path());

        let (status, _) = send(
            app_router(state.clone()),
            post_json("/submit_survey", json!({"name": "Ann", "skills": []})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let mut body = survey_body("Ann");
        body["interests"][0]["interest"] = json!(5);
        let (status, json) =
            send(app_router(state.clone()), post_json("/submit_survey", body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(json["error"].as_str().unwrap().contains("interest"));

        let mut body = survey_body("Ann");
        body["skills"][0]["skill"] = json!("high");
        let (status, _) = send(app_router(state.clone()), post_json("/submit_survey", body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let request = Request::builder()
            .method("POST")
            .uri("/submit_survey")
            .header("Content-Type", "application/json")
            .body(Body::from("{not json"))
            .unwrap();
        let (status, _) = send(app_router(state), request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(!dir.path().join("ann_persona.json").exists());
    }

    #[tokio::test]
    async fn test_submit_mismatched_series_is_server_error() {
        let dir = tempfile::tempdir().unwrap();
        let app = app_router(test_state(dir.path()));

        let mut body = survey_body("Ann");
        body["interests"][0]["animal"] = json!("Bear");
        let (status, json) = send(app, post_json("/submit_survey", body)).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(json["error"].as_str().unwrap().contains("Chart rendering failed"));
    }

    #[tokio::test]
    async fn test_generate_chart_preview() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(dir.path());

        let body = survey_body("ignored");
        let (status, json) = send(
            app_router(state.clone()),
            post_json(
                "/generate_chart",
                json!({"skills": body["skills"], "interests": body["interests"]}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["success"], true);
        assert_eq!(json["axes"][0]["category"], "Lion");
        assert_eq!(json["axes"][0]["angle"], 0.0);
        assert!(state.store.list().unwrap().is_empty());

        let (status, json) = send(
            app_router(state),
            post_json("/generate_chart", json!({"skills": body["skills"]})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"], "Missing data");
    }

    #[tokio::test]
    async fn test_load_missing_profile_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let app = app_router(test_state(dir.path()));

        let (status, json) =
            send(app, post_json("/load_profile", json!({"name": "Nobody"}))).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json["error"], "Profile not found");
    }

    #[tokio::test]
    async fn test_lookup_with_unusable_name_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(dir.path());

        let (status, json) = send(
            app_router(state.clone()),
            post_json("/load_profile", json!({"name": "!!!"})),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json["error"], "Profile not found");

        for (method, uri) in [
            ("GET", "/profiles/%21%21%21/chart.png"),
            ("DELETE", "/profiles/%21%21%21"),
        ] {
            let request = Request::builder()
                .method(method)
                .uri(uri)
                .body(Body::empty())
                .unwrap();
            let (status, _) = send(app_router(state.clone()), request).await;
            assert_eq!(status, StatusCode::NOT_FOUND, "{} {}", method, uri);
        }

        // Starting a survey still requires a usable name.
        let (status, _) = send(
            app_router(state),
            post_json("/start_survey", json!({"name": "!!!"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_non_ascii_name_survey_flow() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(dir.path());

        let (status, json) = send(
            app_router(state.clone()),
            post_json("/start_survey", json!({"name": "李雷"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["has_existing"], false);

        let (status, _) = send(
            app_router(state.clone()),
            post_json("/submit_survey", survey_body("李雷")),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (status, json) = send(
            app_router(state.clone()),
            post_json("/load_profile", json!({"name": "李雷"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["name"], "李雷");

        let request = Request::builder()
            .uri("/profiles/%E6%9D%8E%E9%9B%B7/chart.png")
            .body(Body::empty())
            .unwrap();
        let response = app_router(state).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_profiles_listing_chart_and_delete() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(dir.path());

        let (status, _) = send(
            app_router(state.clone()),
            post_json("/submit_survey", survey_body("Bob")),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let request = Request::builder().uri("/profiles").body(Body::empty()).unwrap();
        let (status, json) = send(app_router(state.clone()), request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["profiles"][0]["key"], "bob");
        assert_eq!(json["profiles"][0]["has_chart"], true);

        let request = Request::builder()
            .uri("/profiles/bob/chart.png")
            .body(Body::empty())
            .unwrap();
        let response = app_router(state.clone()).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "image/png");
        let png = axum::body::to_bytes(response.into_body(), 4 * 1024 * 1024)
            .await
            .unwrap();
        assert_eq!(&png[..4], b"\x89PNG");

        let request = Request::builder()
            .method("DELETE")
            .uri("/profiles/Bob")
            .body(Body::empty())
            .unwrap();
        let (status, json) = send(app_router(state.clone()), request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["deleted"], "bob");

        let request = Request::builder()
            .method("DELETE")
            .uri("/profiles/bob")
            .body(Body::empty())
            .unwrap();
        let (status, _) = send(app_router(state.clone()), request).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let request = Request::builder()
            .uri("/profiles/bob/chart.png")
            .body(Body::empty())
            .unwrap();
        let (status, _) = send(app_router(state), request).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
