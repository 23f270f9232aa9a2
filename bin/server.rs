// Car Inventory - Web Server
// JSON API over the same add / delete / list commands as the terminal form

use axum::{
    extract::{rejection::PathRejection, Path, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use car_inventory::{
    init_logging, submit_add, submit_delete, Car, CarError, CarInput, CarResult, CarStore,
    Config, Rejection,
};
use log::{error, info};
use serde::{Deserialize, Deserializer, Serialize};
use tower_http::cors::CorsLayer;

/// Shared application state
#[derive(Clone)]
struct AppState {
    store: CarStore,
}

/// API Response wrapper
#[derive(Serialize)]
struct ApiResponse<T> {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }
}

impl ApiResponse<()> {
    fn failure(message: String) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message),
        }
    }
}

/// Add request. Fields are taken as raw text; JSON numbers are accepted too.
#[derive(Deserialize)]
struct AddCarRequest {
    #[serde(default, deserialize_with = "raw_text")]
    brand: String,
    #[serde(default, deserialize_with = "raw_text")]
    model: String,
    #[serde(default, deserialize_with = "raw_text")]
    year: String,
    #[serde(default, deserialize_with = "raw_text")]
    price: String,
}

impl From<AddCarRequest> for CarInput {
    fn from(req: AddCarRequest) -> Self {
        CarInput::new(req.brand, req.model, req.year, req.price)
    }
}

fn raw_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => s,
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    })
}

#[derive(Serialize)]
struct AddedResponse {
    id: i64,
}

#[derive(Serialize)]
struct DeletedResponse {
    deleted: usize,
}

// ============================================================================
// Error mapping
// ============================================================================

fn status_for(err: &CarError) -> StatusCode {
    match err {
        CarError::Rejected(Rejection::Duplicate) => StatusCode::CONFLICT,
        CarError::Rejected(Rejection::NoSelection) => StatusCode::BAD_REQUEST,
        CarError::Rejected(_) => StatusCode::UNPROCESSABLE_ENTITY,
        CarError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn error_response(err: CarError) -> Response {
    if !err.is_rejection() {
        error!("event=api_request module=server status=error error={}", err);
    }
    (status_for(&err), Json(ApiResponse::<()>::failure(err.to_string()))).into_response()
}

/// Run a blocking store call off the async runtime.
async fn blocking<T, F>(f: F) -> Result<T, Response>
where
    T: Send + 'static,
    F: FnOnce() -> CarResult<T> + Send + 'static,
{
    match tokio::task::spawn_blocking(f).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(err)) => Err(error_response(err)),
        Err(join_err) => {
            error!("event=api_request module=server status=error error={}", join_err);
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::<()>::failure("internal error".to_string())),
            )
                .into_response())
        }
    }
}

// ============================================================================
// API Handlers
// ============================================================================

/// GET /api/health - Health check
async fn health_check() -> impl IntoResponse {
    Json(ApiResponse::ok("OK"))
}

/// GET /api/cars - List all cars
async fn list_cars(State(state): State<AppState>) -> Response {
    match blocking(move || state.store.list_all()).await {
        Ok(cars) => (StatusCode::OK, Json(ApiResponse::<Vec<Car>>::ok(cars))).into_response(),
        Err(response) => response,
    }
}

/// POST /api/cars - Validate and add a car
async fn add_car(State(state): State<AppState>, Json(req): Json<AddCarRequest>) -> Response {
    let input = CarInput::from(req);
    match blocking(move || submit_add(&state.store, &input)).await {
        Ok(id) => (StatusCode::CREATED, Json(ApiResponse::ok(AddedResponse { id }))).into_response(),
        Err(response) => response,
    }
}

/// DELETE /api/cars/:id - Delete one car
async fn delete_car(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> Response {
    let id = match id {
        Ok(Path(id)) => id,
        Err(rejection) => {
            return (
                rejection.status(),
                Json(ApiResponse::<()>::failure(rejection.body_text())),
            )
                .into_response();
        }
    };

    match blocking(move || submit_delete(&state.store, Some(id))).await {
        Ok(deleted) => (StatusCode::OK, Json(ApiResponse::ok(DeletedResponse { deleted }))).into_response(),
        Err(response) => response,
    }
}

/// DELETE /api/cars - No car selected
async fn delete_without_selection(State(state): State<AppState>) -> Response {
    match blocking(move || submit_delete(&state.store, None)).await {
        Ok(deleted) => (StatusCode::OK, Json(ApiResponse::ok(DeletedResponse { deleted }))).into_response(),
        Err(response) => response,
    }
}

fn router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/health", get(health_check))
        .route(
            "/cars",
            get(list_cars).post(add_car).delete(delete_without_selection),
        )
        .route("/cars/:id", axum::routing::delete(delete_car))
        .with_state(state);

    Router::new()
        .nest("/api", api_routes)
        .layer(CorsLayer::permissive())
}

// ============================================================================
// Main Server
// ============================================================================

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env();
    init_logging(&config.log_level, &config.log_dir, true)?;

    println!("🌐 Car Inventory - Web Server");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    let store = CarStore::open(&config.db_path)?;
    println!("✓ Database opened: {:?}", config.db_path);

    let app = router(AppState { store });

    let listener = tokio::net::TcpListener::bind(config.server_addr.as_str()).await?;
    info!(
        "event=server_start module=server status=ok addr={}",
        config.server_addr
    );

    println!("\n🚀 Server running on http://{}", config.server_addr);
    println!("   API: http://{}/api/cars", config.server_addr);
    println!("\n   Press Ctrl+C to stop\n");

    axum::serve(listener, app).await?;
    Ok(())
}
