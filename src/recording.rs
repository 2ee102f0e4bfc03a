//! Writing attendance: the bulk path used when a lecture's register is
//! submitted and the single-record path used for corrections.

use chrono::{DateTime, Utc};
use log::info;
use serde::Deserialize;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::db;
use crate::error::{AppError, AppResult};
use crate::models::AttendanceRecord;

/// Placeholder some clients send when no faculty is signed in
const UNKNOWN_FACULTY: &str = "unknown";

/// One submitted register for a lecture session
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkAttendanceRequest {
    #[serde(default)]
    pub lecture_id: String,
    #[serde(default)]
    pub present_ids: Vec<Option<String>>,
    #[serde(default)]
    pub absent_ids: Vec<Option<String>>,
    #[serde(default, deserialize_with = "crate::schedule::deserialize_optional_timestamp")]
    pub date: Option<DateTime<Utc>>,
    pub faculty_id: Option<String>,
    pub remark: Option<String>,
}

/// A single attendance row as submitted by a client
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAttendance {
    #[serde(default, alias = "lecture")]
    pub lecture_id: Option<String>,
    #[serde(default)]
    pub student_id: Option<String>,
    pub is_present: Option<bool>,
    #[serde(default, deserialize_with = "crate::schedule::deserialize_optional_timestamp")]
    pub date: Option<DateTime<Utc>>,
    pub faculty_id: Option<String>,
    pub remark: Option<String>,
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

fn present_ids(ids: &[Option<String>]) -> Vec<String> {
    ids.iter()
        .filter_map(|id| non_blank(id.as_deref()))
        .collect()
}

/// Build the rows for a bulk submission without touching the store.
///
/// Present ids come first, then absent ids, each in submitted order.
pub fn build_bulk_records(
    request: &BulkAttendanceRequest,
    now: DateTime<Utc>,
) -> AppResult<Vec<AttendanceRecord>> {
    let present = present_ids(&request.present_ids);
    let absent = present_ids(&request.absent_ids);
    if present.is_empty() && absent.is_empty() {
        return Err(AppError::validation(
            "No present or absent student IDs provided",
        ));
    }

    let lecture_id = non_blank(Some(request.lecture_id.as_str()))
        .ok_or_else(|| AppError::validation("Lecture ID is required"))?;

    let date = request.date.unwrap_or(now);
    let faculty_id = non_blank(request.faculty_id.as_deref());
    let remark = non_blank(request.remark.as_deref());

    let marked = present
        .into_iter()
        .map(|id| (id, true))
        .chain(absent.into_iter().map(|id| (id, false)));

    Ok(marked
        .map(|(student_id, is_present)| AttendanceRecord {
            id: Uuid::new_v4().to_string(),
            lecture_id: lecture_id.clone(),
            student_id,
            is_present,
            date: Some(date),
            faculty_id: faculty_id.clone(),
            remark: remark.clone(),
        })
        .collect())
}

fn validate_row(
    new: &NewAttendance,
    now: DateTime<Utc>,
    drop_placeholder_faculty: bool,
) -> AppResult<AttendanceRecord> {
    let student_id = non_blank(new.student_id.as_deref())
        .ok_or_else(|| AppError::validation("Student ID is required"))?;
    let lecture_id = non_blank(new.lecture_id.as_deref())
        .ok_or_else(|| AppError::validation("Lecture ID is required"))?;

    let faculty_id = non_blank(new.faculty_id.as_deref())
        .filter(|id| !(drop_placeholder_faculty && id.as_str() == UNKNOWN_FACULTY));

    Ok(AttendanceRecord {
        id: Uuid::new_v4().to_string(),
        lecture_id,
        student_id,
        is_present: new.is_present.unwrap_or(false),
        date: Some(new.date.unwrap_or(now)),
        faculty_id,
        remark: non_blank(new.remark.as_deref()),
    })
}

/// Validate a single submitted row and give it an id
pub fn build_single_record(new: &NewAttendance, now: DateTime<Utc>) -> AppResult<AttendanceRecord> {
    validate_row(new, now, true)
}

/// Persist a whole register in one write and return the stored rows
pub async fn bulk_record(
    pool: &SqlitePool,
    request: &BulkAttendanceRequest,
) -> AppResult<Vec<AttendanceRecord>> {
    let records = build_bulk_records(request, Utc::now())?;
    db::insert_attendance_records(pool, &records).await?;

    let present = records.iter().filter(|r| r.is_present).count();
    info!(
        "Recorded attendance for lecture {}: {} present, {} absent",
        records[0].lecture_id,
        present,
        records.len() - present
    );
    Ok(records)
}

pub async fn insert_attendance(pool: &SqlitePool, new: &NewAttendance) -> AppResult<AttendanceRecord> {
    let record = build_single_record(new, Utc::now())?;
    db::insert_attendance_records(pool, std::slice::from_ref(&record)).await?;
    Ok(record)
}

/// Store externally built rows (the `POST /attendance` body) as one batch.
///
/// Every row is validated before anything is written.
pub async fn save_records(
    pool: &SqlitePool,
    rows: &[NewAttendance],
) -> AppResult<Vec<AttendanceRecord>> {
    let now = Utc::now();
    let records = rows
        .iter()
        .map(|row| validate_row(row, now, false))
        .collect::<AppResult<Vec<_>>>()?;
    db::insert_attendance_records(pool, &records).await?;
    Ok(records)
}
