//! # Attendance API Tests
//!
//! Runs the real router against a seeded temporary database and checks the
//! JSON contract of the monitor, filter, roster and recording endpoints.
//!
//! ## Running the Tests
//!
//! ```bash
//! cargo test --test monitor_api_test
//! ```

use std::sync::Arc;

use attendance_monitor::config::ServiceConfig;
use attendance_monitor::db;
use attendance_monitor::seed::seed_demo_data;
use attendance_monitor::serve::{build_router, AppState};
use chrono::NaiveDate;
use serde_json::{json, Value};
use tokio::net::TcpListener;

/// Helper to seed a database and start the API on a random port
async fn start_test_api_server() -> (String, tempfile::TempDir, tokio::task::JoinHandle<()>) {
    let (pool, guard) = db::create_test_connection_in_temporary_file()
        .await
        .unwrap();
    db::init_database_schema(&pool).await.unwrap();
    seed_demo_data(&pool, NaiveDate::from_ymd_opt(2025, 3, 3).unwrap())
        .await
        .unwrap();

    let config = ServiceConfig::with_database(guard.path().join("attendance_test.sqlite"));
    let app = build_router(Arc::new(AppState { pool, config }));

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let url = format!("http://{}", addr);

    let handle = tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    // Give server time to start
    tokio::time::sleep(tokio::time::Duration::from_millis(50)).await;

    (url, guard, handle)
}

async fn get_json(url: &str) -> (u16, Value) {
    let response = reqwest::get(url).await.unwrap();
    let status = response.status().as_u16();
    (status, response.json().await.unwrap())
}

async fn post_json(url: &str, body: Value) -> (u16, Value) {
    let response = reqwest::Client::new()
        .post(url)
        .json(&body)
        .send()
        .await
        .unwrap();
    let status = response.status().as_u16();
    (status, response.json().await.unwrap())
}

// ============================================================================
// Tests
// ============================================================================

#[tokio::test]
async fn test_health() {
    let (url, _guard, _handle) = start_test_api_server().await;
    let response = reqwest::get(format!("{}/health", url)).await.unwrap();
    assert_eq!(response.status(), 200);
    assert_eq!(response.text().await.unwrap(), "OK");
}

#[tokio::test]
async fn test_monitor_summary_over_all_students() {
    let (url, _guard, _handle) = start_test_api_server().await;

    let (status, body) = get_json(&format!("{}/attendance-monitor", url)).await;
    assert_eq!(status, 200);
    assert_eq!(body["success"], true);

    let summary = &body["data"]["summary"];
    assert_eq!(summary["totalStudents"], 16);
    assert_eq!(summary["excellentCount"], 4);
    assert_eq!(summary["goodCount"], 4);
    assert_eq!(summary["warningCount"], 4);
    assert_eq!(summary["criticalCount"], 4);
    assert_eq!(summary["averageAttendance"], 75);

    let students = body["data"]["students"].as_array().unwrap();
    let first = students
        .iter()
        .find(|s| s["rollNo"] == "22DCE001")
        .unwrap();
    assert_eq!(first["department"], "Computer Engineering");
    assert_eq!(first["totalSessions"], 10);
    assert_eq!(first["sessionsAttended"], 5);
    assert_eq!(first["status"], "Critical");
    assert_eq!(first["recentAttendance"].as_array().unwrap().len(), 10);
}

#[tokio::test]
async fn test_monitor_department_and_date_filters() {
    let (url, _guard, _handle) = start_test_api_server().await;

    let (_, body) = get_json(&format!(
        "{}/attendance-monitor?department=Computer%20Engineering",
        url
    ))
    .await;
    let students = body["data"]["students"].as_array().unwrap();
    assert_eq!(students.len(), 8);
    assert!(students.iter().all(|s| s["department"] == "Computer Engineering"));

    // The first day everyone was present
    let (_, body) = get_json(&format!("{}/attendance-monitor?date=03/03/2025", url)).await;
    let summary = &body["data"]["summary"];
    assert_eq!(summary["excellentCount"], 16);
    assert_eq!(body["data"]["attendanceRecords"].as_array().unwrap().len(), 16);

    let (status, body) = get_json(&format!("{}/attendance-monitor?dateFrom=someday", url)).await;
    assert_eq!(status, 400);
    assert!(body["error"].as_str().unwrap().contains("dateFrom"));
}

#[tokio::test]
async fn test_monitor_student_shortcut_returns_rows() {
    let (url, _guard, _handle) = start_test_api_server().await;

    let (status, body) =
        get_json(&format!("{}/attendance-monitor?studentId=stu-22dit002", url)).await;
    assert_eq!(status, 200);
    let rows = body["data"].as_array().unwrap();
    assert_eq!(rows.len(), 10);
    assert_eq!(rows[0]["subjectCode"], "IT201");
}

#[tokio::test]
async fn test_filter_options() {
    let (url, _guard, _handle) = start_test_api_server().await;

    let (status, body) = get_json(&format!("{}/attendance-monitor/filters", url)).await;
    assert_eq!(status, 200);
    let data = &body["data"];
    assert_eq!(data["divisions"], json!([1, 2]));
    assert_eq!(data["semesters"], json!([5]));
    assert_eq!(data["batches"], json!(["A1", "A2"]));
    assert_eq!(data["studentIdRanges"]["DCE"], "22DCE001 to 22DCE008");
    assert_eq!(data["subjects"].as_array().unwrap().len(), 3);
    assert_eq!(data["faculty"].as_array().unwrap().len(), 3);
    assert_eq!(data["departments"][0]["name"], "DCE");
}

#[tokio::test]
async fn test_students_roster() {
    let (url, _guard, _handle) = start_test_api_server().await;

    let (status, body) = get_json(&format!("{}/students?division=1&sem=5", url)).await;
    assert_eq!(status, 200);
    let students = body["data"]["students"].as_array().unwrap();
    assert_eq!(students.len(), 8);
    assert!(students.iter().all(|s| s["present"] == true));
    assert_eq!(students[0]["photo"], "/student1.png");

    let (_, body) = get_json(&format!(
        "{}/students?division=1&sem=5&type=lab&batch=A1",
        url
    ))
    .await;
    assert_eq!(body["data"]["students"].as_array().unwrap().len(), 4);

    let (_, body) = get_json(&format!("{}/students?department=DIT&sem=5", url)).await;
    assert_eq!(body["data"]["students"].as_array().unwrap().len(), 8);

    let (status, _) = get_json(&format!("{}/students?sem=5", url)).await;
    assert_eq!(status, 400);
    let (status, body) = get_json(&format!("{}/students?division=x&sem=5", url)).await;
    assert_eq!(status, 400);
    assert_eq!(body["error"], "Division and semester must be valid numbers");
}

#[tokio::test]
async fn test_save_attendance_contract() {
    let (url, _guard, _handle) = start_test_api_server().await;

    let (status, body) = post_json(
        &format!("{}/attendance", url),
        json!({"attendanceRecords": "not an array"}),
    )
    .await;
    assert_eq!(status, 400);
    assert_eq!(body["error"], "Invalid attendance records format");

    let (status, body) = post_json(
        &format!("{}/attendance", url),
        json!({"attendanceRecords": [
            {"lectureId": "lec-cs301-d1", "studentId": "stu-22dce001", "isPresent": true,
             "date": "2025-04-01T09:00:00Z"},
            {"lectureId": "lec-cs301-d1", "studentId": "stu-22dce002", "isPresent": false,
             "date": "2025-04-01T09:00:00Z"}
        ]}),
    )
    .await;
    assert_eq!(status, 200);
    assert_eq!(body["message"], "2 attendance records saved successfully");

    let (status, body) = get_json(&format!(
        "{}/attendance?lecture=lec-cs301-d1&date=2025-04-01",
        url
    ))
    .await;
    assert_eq!(status, 200);
    assert_eq!(body["data"].as_array().unwrap().len(), 2);

    let (status, body) = post_json(
        &format!("{}/attendance", url),
        json!({"attendanceRecords": [
            {"lectureId": "lec-cs301-d1", "studentId": "nobody", "isPresent": true}
        ]}),
    )
    .await;
    assert_eq!(status, 500);
    assert_eq!(body["error"], "Failed to save attendance records");
}

#[tokio::test]
async fn test_bulk_and_single_recording() {
    let (url, _guard, _handle) = start_test_api_server().await;

    let (status, body) = post_json(
        &format!("{}/attendance/bulk", url),
        json!({"lectureId": "lec-it201-d1", "presentIds": [], "absentIds": [null, ""]}),
    )
    .await;
    assert_eq!(status, 400);
    assert_eq!(body["error"], "No present or absent student IDs provided");

    let (status, body) = post_json(
        &format!("{}/attendance/bulk", url),
        json!({
            "lectureId": "lec-it201-d1",
            "presentIds": ["stu-22dit001", "stu-22dit002"],
            "absentIds": ["stu-22dit003"],
            "facultyId": "fac-rao"
        }),
    )
    .await;
    assert_eq!(status, 200);
    assert_eq!(body["data"].as_array().unwrap().len(), 3);

    // Bare days are read as midnight UTC, as on the query endpoints
    let (status, body) = post_json(
        &format!("{}/attendance/bulk", url),
        json!({"lectureId": "lec-it201-d1", "presentIds": ["stu-22dit001"], "date": "2025-03-05"}),
    )
    .await;
    assert_eq!(status, 200);
    assert!(body["data"][0]["date"]
        .as_str()
        .unwrap()
        .starts_with("2025-03-05T00:00:00"));

    let (status, body) = post_json(
        &format!("{}/attendance/bulk", url),
        json!({"lectureId": "lec-it201-d1", "presentIds": ["stu-22dit001"], "date": "someday"}),
    )
    .await;
    assert_eq!(status, 400);
    assert!(body["error"].as_str().unwrap().starts_with("Invalid request body"));

    let (status, body) = post_json(
        &format!("{}/attendance/single", url),
        json!({"lectureId": "lec-it201-d1", "studentId": "stu-22dit004", "isPresent": "yes"}),
    )
    .await;
    assert_eq!(status, 400);
    assert!(body["error"].as_str().unwrap().contains("isPresent"));

    let (status, body) = post_json(
        &format!("{}/attendance/single", url),
        json!({"studentId": "stu-22dit004", "facultyId": "unknown"}),
    )
    .await;
    assert_eq!(status, 400);
    assert_eq!(body["error"], "Lecture ID is required");

    let (status, body) = post_json(
        &format!("{}/attendance/single", url),
        json!({"lectureId": "lec-it201-d1", "studentId": "stu-22dit004", "facultyId": "unknown"}),
    )
    .await;
    assert_eq!(status, 200);
    assert!(body["data"].get("facultyId").is_none());
    assert_eq!(body["data"]["isPresent"], false);

    let id = body["data"]["id"].as_str().unwrap().to_string();
    let (status, body) = get_json(&format!("{}/attendance/{}", url, id)).await;
    assert_eq!(status, 200);
    assert_eq!(body["data"]["studentFirstName"], "Kavya");
    assert_eq!(body["data"]["subjectName"], "Web Technologies");

    let (status, body) = get_json(&format!("{}/attendance/no-such-id", url)).await;
    assert_eq!(status, 200);
    assert!(body["data"].is_null());
}

#[tokio::test]
async fn test_update_delete_and_lecture_status() {
    let (url, _guard, _handle) = start_test_api_server().await;
    let client = reqwest::Client::new();

    let (_, body) = get_json(&format!("{}/lectures/lec-cs301-d1/status", url)).await;
    assert_eq!(body["data"]["presentees"].as_array().unwrap().len(), 30);
    assert_eq!(body["data"]["absentees"].as_array().unwrap().len(), 10);

    let (_, body) = get_json(&format!("{}/attendance?lecture=lec-cs301-d1", url)).await;
    let absent = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .find(|r| r["isPresent"] == false)
        .unwrap()
        .clone();
    let id = absent["id"].as_str().unwrap();

    let response = client
        .patch(format!("{}/attendance/{}", url, id))
        .json(&json!({"isPresent": true, "remark": "Medical certificate"}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["data"][0]["isPresent"], true);
    assert_eq!(body["data"][0]["remark"], "Medical certificate");

    let (_, body) = get_json(&format!("{}/lectures/lec-cs301-d1/status", url)).await;
    assert_eq!(body["data"]["presentees"].as_array().unwrap().len(), 31);

    let response = client
        .patch(format!("{}/attendance/{}", url, id))
        .header("content-type", "application/json")
        .body("{\"isPresent\": ")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 400);
    let body: Value = response.json().await.unwrap();
    assert!(body["error"].as_str().unwrap().starts_with("Invalid request body"));

    let response = client
        .delete(format!("{}/attendance/{}", url, id))
        .send()
        .await
        .unwrap();
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["data"].as_array().unwrap().len(), 1);

    let (_, body) = get_json(&format!("{}/attendance/records", url)).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 159);
}
