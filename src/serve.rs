//! HTTP API over the attendance store.
//!
//! Every JSON response is either `{success: true, data}` or `{error}`.
//! Validation failures, including unreadable request bodies, answer 400 with
//! their own message; store failures answer 500 with a fixed message per
//! endpoint.

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use log::{error, warn};
use serde::Deserialize;
use sqlx::SqlitePool;
use std::sync::Arc as StdArc;
use tower_http::cors::{Any, CorsLayer};

use crate::config::ServiceConfig;
use crate::db;
use crate::enrichment;
use crate::error::AppError;
use crate::filter_options::load_filter_options;
use crate::models::AttendancePatch;
use crate::monitor::{build_report, MonitorQuery};
use crate::recording::{self, BulkAttendanceRequest, NewAttendance};
use crate::roster::{load_roster, RosterQuery};
use crate::schedule::{end_of_day, parse_day, start_of_day};

/// Shared state for API handlers; read-only after startup
pub struct AppState {
    pub pool: SqlitePool,
    pub config: ServiceConfig,
}

/// Start the API server and block until it exits
pub fn serve_api(config: ServiceConfig) -> Result<(), Box<dyn std::error::Error>> {
    let addr = format!("{}:{}", config.bind_address, config.api_port);

    println!("Starting attendance API server");
    println!("Database: {}", config.database_path.display());
    println!("Listening on: http://{}", addr);
    println!("Endpoints:");
    println!("  POST /attendance  - Save attendance records");
    println!("  GET /attendance?lecture=&student=&date=  - Raw attendance records");
    println!("  POST /attendance/bulk  - Record a lecture register");
    println!("  POST /attendance/single  - Record one student");
    println!("  GET /attendance/records  - Enriched attendance records");
    println!("  GET|PATCH|DELETE /attendance/:id  - One attendance record");
    println!("  GET /lectures/:id/status  - Presentees and absentees of a lecture");
    println!("  GET /attendance-monitor  - Attendance summary per student");
    println!("  GET /attendance-monitor/filters  - Dashboard filter options");
    println!("  GET /students?division=&sem=&batch=&type=&department=  - Attendance roster");

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async {
        let pool = db::open_database_pool(&config.database_path).await?;
        db::init_database_schema(&pool).await?;

        let app = build_router(StdArc::new(AppState { pool, config }));

        let listener = tokio::net::TcpListener::bind(&addr)
            .await
            .map_err(|e| format!("Failed to bind to {}: {}", addr, e))?;
        axum::serve(listener, app)
            .await
            .map_err(|e| format!("Server error: {}", e))?;

        Ok::<(), Box<dyn std::error::Error>>(())
    })
}

/// Router with every API route; used by `serve_api` and by tests
pub fn build_router(app_state: StdArc<AppState>) -> Router {
    let cors = if app_state.config.cors_allow_any {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        CorsLayer::new()
    };

    Router::new()
        .route("/health", get(health_handler))
        .route(
            "/attendance",
            get(attendance_query_handler).post(save_attendance_handler),
        )
        .route("/attendance/bulk", post(bulk_attendance_handler))
        .route("/attendance/single", post(single_attendance_handler))
        .route("/attendance/records", get(enriched_attendance_handler))
        .route(
            "/attendance/{id}",
            get(attendance_by_id_handler)
                .patch(update_attendance_handler)
                .delete(delete_attendance_handler),
        )
        .route("/lectures/{id}/status", get(lecture_status_handler))
        .route("/attendance-monitor", get(monitor_handler))
        .route("/attendance-monitor/filters", get(filter_options_handler))
        .route("/students", get(students_handler))
        .layer(cors)
        .with_state(app_state)
}

/// Validation errors carry their own message; anything else is logged and
/// replaced by `failure`.
fn error_response(err: AppError, failure: &str) -> Response {
    match err {
        AppError::Validation(message) => {
            warn!("Rejected request: {}", message);
            (
                StatusCode::BAD_REQUEST,
                axum::Json(serde_json::json!({"error": message})),
            )
                .into_response()
        }
        other => {
            error!("{}: {}", failure, other);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                axum::Json(serde_json::json!({"error": failure})),
            )
                .into_response()
        }
    }
}

/// An unreadable or mistyped JSON body is the caller's mistake, not ours
fn invalid_body(rejection: JsonRejection, failure: &str) -> Response {
    error_response(
        AppError::validation(format!("Invalid request body: {}", rejection.body_text())),
        failure,
    )
}

fn success<T: serde::Serialize>(data: T) -> Response {
    (
        StatusCode::OK,
        axum::Json(serde_json::json!({"success": true, "data": data})),
    )
        .into_response()
}

async fn health_handler() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

async fn save_attendance_handler(
    State(state): State<StdArc<AppState>>,
    body: Result<axum::Json<serde_json::Value>, JsonRejection>,
) -> impl IntoResponse {
    const FAILURE: &str = "Failed to save attendance records";

    let axum::Json(body) = match body {
        Ok(body) => body,
        Err(rejection) => return invalid_body(rejection, FAILURE),
    };

    let rows = match body.get("attendanceRecords") {
        Some(value) if value.is_array() => {
            serde_json::from_value::<Vec<NewAttendance>>(value.clone()).ok()
        }
        _ => None,
    };
    let Some(rows) = rows else {
        return error_response(
            AppError::validation("Invalid attendance records format"),
            FAILURE,
        );
    };

    match recording::save_records(&state.pool, &rows).await {
        Ok(records) => (
            StatusCode::OK,
            axum::Json(serde_json::json!({
                "success": true,
                "message": format!("{} attendance records saved successfully", records.len()),
                "data": records,
            })),
        )
            .into_response(),
        Err(e) => error_response(e, FAILURE),
    }
}

#[derive(Debug, Deserialize)]
struct AttendanceQuery {
    lecture: Option<String>,
    student: Option<String>,
    date: Option<String>,
}

async fn attendance_query_handler(
    State(state): State<StdArc<AppState>>,
    Query(query): Query<AttendanceQuery>,
) -> impl IntoResponse {
    const FAILURE: &str = "Failed to fetch attendance records";

    let day_range = match query.date.as_deref().filter(|d| !d.trim().is_empty()) {
        Some(raw) => match parse_day(raw) {
            Ok(day) => Some((start_of_day(day), end_of_day(day))),
            Err(e) => return error_response(AppError::validation(e), FAILURE),
        },
        None => None,
    };

    let lecture = query.lecture.as_deref().filter(|v| !v.is_empty());
    let student = query.student.as_deref().filter(|v| !v.is_empty());
    match db::fetch_attendance_filtered(&state.pool, lecture, student, day_range).await {
        Ok(records) => success(records),
        Err(e) => error_response(e, FAILURE),
    }
}

async fn bulk_attendance_handler(
    State(state): State<StdArc<AppState>>,
    request: Result<axum::Json<BulkAttendanceRequest>, JsonRejection>,
) -> impl IntoResponse {
    const FAILURE: &str = "Failed to save attendance records";

    let axum::Json(request) = match request {
        Ok(request) => request,
        Err(rejection) => return invalid_body(rejection, FAILURE),
    };
    match recording::bulk_record(&state.pool, &request).await {
        Ok(records) => success(records),
        Err(e) => error_response(e, FAILURE),
    }
}

async fn single_attendance_handler(
    State(state): State<StdArc<AppState>>,
    new: Result<axum::Json<NewAttendance>, JsonRejection>,
) -> impl IntoResponse {
    const FAILURE: &str = "Failed to save attendance record";

    let axum::Json(new) = match new {
        Ok(new) => new,
        Err(rejection) => return invalid_body(rejection, FAILURE),
    };
    match recording::insert_attendance(&state.pool, &new).await {
        Ok(record) => success(record),
        Err(e) => error_response(e, FAILURE),
    }
}

async fn enriched_attendance_handler(State(state): State<StdArc<AppState>>) -> impl IntoResponse {
    match enrichment::fetch_all(&state.pool).await {
        Ok(rows) => success(rows),
        Err(e) => error_response(e, "Failed to fetch attendance records"),
    }
}

async fn attendance_by_id_handler(
    State(state): State<StdArc<AppState>>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    match enrichment::fetch_by_id(&state.pool, &id).await {
        Ok(row) => success(row),
        Err(e) => error_response(e, "Failed to fetch attendance record"),
    }
}

async fn update_attendance_handler(
    State(state): State<StdArc<AppState>>,
    Path(id): Path<String>,
    patch: Result<axum::Json<AttendancePatch>, JsonRejection>,
) -> impl IntoResponse {
    const FAILURE: &str = "Failed to update attendance record";

    let axum::Json(patch) = match patch {
        Ok(patch) => patch,
        Err(rejection) => return invalid_body(rejection, FAILURE),
    };
    match db::update_attendance(&state.pool, &id, &patch).await {
        Ok(rows) => success(rows),
        Err(e) => error_response(e, FAILURE),
    }
}

async fn delete_attendance_handler(
    State(state): State<StdArc<AppState>>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    match db::delete_attendance(&state.pool, &id).await {
        Ok(rows) => success(rows),
        Err(e) => error_response(e, "Failed to delete attendance record"),
    }
}

async fn lecture_status_handler(
    State(state): State<StdArc<AppState>>,
    Path(lecture_id): Path<String>,
) -> impl IntoResponse {
    match enrichment::status_for_lecture(&state.pool, &lecture_id).await {
        Ok(status) => success(status),
        Err(e) => error_response(e, "Failed to fetch lecture status"),
    }
}

async fn monitor_handler(
    State(state): State<StdArc<AppState>>,
    Query(query): Query<MonitorQuery>,
) -> impl IntoResponse {
    const FAILURE: &str = "Failed to fetch attendance data";

    if let Some(student_id) = query.student_id() {
        return match enrichment::fetch_by_student(&state.pool, student_id).await {
            Ok(rows) => success(rows),
            Err(e) => error_response(e, FAILURE),
        };
    }

    let filters = match query.to_filters() {
        Ok(filters) => filters,
        Err(e) => return error_response(e, FAILURE),
    };
    match build_report(&state.pool, &filters).await {
        Ok(report) => success(report),
        Err(e) => error_response(e, FAILURE),
    }
}

async fn filter_options_handler(State(state): State<StdArc<AppState>>) -> impl IntoResponse {
    match load_filter_options(&state.pool).await {
        Ok(options) => success(options),
        Err(e) => error_response(e, "Failed to fetch filter options"),
    }
}

async fn students_handler(
    State(state): State<StdArc<AppState>>,
    Query(query): Query<RosterQuery>,
) -> impl IntoResponse {
    const FAILURE: &str = "Failed to fetch students";

    let selection = match query.to_selection() {
        Ok(selection) => selection,
        Err(e) => return error_response(e, FAILURE),
    };
    match load_roster(&state.pool, &selection, &state.config.default_photo).await {
        Ok(students) => success(serde_json::json!({ "students": students })),
        Err(e) => error_response(e, FAILURE),
    }
}
