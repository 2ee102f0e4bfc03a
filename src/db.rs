use log::warn;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteRow};
use sqlx::{Row, SqlitePool};
use std::path::Path;

use crate::enrichment::{JoinedAttendanceRow, JoinedStudent};
use crate::error::{AppError, AppResult};
use crate::models::{
    AttendancePatch, AttendanceRecord, Department, FacultyMember, Lecture, LectureDetails, Student,
    Subject, TimetableEntry,
};
use crate::queries::{attendance, ddl, students, timetable};
use crate::schedule::parse_timestamp;

type DynError = Box<dyn std::error::Error + Send + Sync>;

/// Which attendance rows an enriched fetch returns
#[derive(Debug, Clone, Copy)]
pub enum AttendanceScope<'a> {
    All,
    Id(&'a str),
    Student(&'a str),
    Lecture(&'a str),
}

/// Open a file-based database pool for production use
/// Enables WAL mode and foreign keys, creating the file if needed
pub async fn open_database_pool(db_path: impl AsRef<Path>) -> AppResult<SqlitePool> {
    let options = SqliteConnectOptions::new()
        .filename(db_path.as_ref())
        .create_if_missing(true)
        .foreign_keys(true)
        .journal_mode(SqliteJournalMode::Wal);

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await?;
    Ok(pool)
}

/// Create a database in a temporary directory for testing.
/// The returned guard deletes the directory when dropped.
pub async fn create_test_connection_in_temporary_file(
) -> Result<(SqlitePool, tempfile::TempDir), DynError> {
    let dir = tempfile::tempdir()?;
    let pool = open_database_pool(dir.path().join("attendance_test.sqlite")).await?;
    Ok((pool, dir))
}

/// Create all tables and indexes if they do not exist
pub async fn init_database_schema(pool: &SqlitePool) -> AppResult<()> {
    for sql in ddl::all_statements() {
        sqlx::query(&sql).execute(pool).await?;
    }
    Ok(())
}

// ============================================================================
// Row decoding
// ============================================================================

fn decode_record(row: &SqliteRow) -> Result<AttendanceRecord, sqlx::Error> {
    let date: Option<String> = row.try_get("date")?;
    let date = date.and_then(|raw| match parse_timestamp(&raw) {
        Ok(ts) => Some(ts),
        Err(e) => {
            warn!("Ignoring unparseable attendance date '{}': {}", raw, e);
            None
        }
    });

    Ok(AttendanceRecord {
        id: row.try_get("id")?,
        lecture_id: row.try_get("lecture_id")?,
        student_id: row.try_get("student_id")?,
        is_present: row.try_get("is_present")?,
        date,
        faculty_id: row.try_get("faculty_id")?,
        remark: row.try_get("remark")?,
    })
}

fn decode_joined(row: &SqliteRow, with_student: bool) -> Result<JoinedAttendanceRow, sqlx::Error> {
    let student = if with_student {
        Some(JoinedStudent {
            id: row.try_get("joined_student_id")?,
            name: row.try_get("student_name")?,
            email: row.try_get("student_email")?,
            roll_no: row.try_get("student_roll_no")?,
            department: row.try_get("student_department")?,
        })
    } else {
        None
    };

    Ok(JoinedAttendanceRow {
        record: decode_record(row)?,
        lecture: LectureDetails {
            subject_code: row.try_get("subject_code")?,
            subject_name: row.try_get("subject_name")?,
            faculty_name: row.try_get("faculty_name")?,
            department_name: row.try_get("department_name")?,
            time_from: row.try_get("time_from")?,
            time_to: row.try_get("time_to")?,
        },
        student,
    })
}

fn decode_student(row: &SqliteRow) -> Result<Student, sqlx::Error> {
    Ok(Student {
        id: row.try_get("id")?,
        roll_no: row.try_get("roll_no")?,
        name: row.try_get("name")?,
        guardian_email: row.try_get("guardian_email")?,
        department: row.try_get("department")?,
        division: row.try_get("division")?,
        batch: row.try_get("batch")?,
        semester: row.try_get("semester")?,
        counselor: row.try_get("counselor")?,
    })
}

fn decode_timetable(row: &SqliteRow) -> Result<TimetableEntry, sqlx::Error> {
    Ok(TimetableEntry {
        lecture: Lecture {
            id: row.try_get("id")?,
            subject_id: row.try_get("subject_id")?,
            faculty_id: row.try_get("faculty_id")?,
            department_id: row.try_get("department_id")?,
            time_from: row.try_get("time_from")?,
            time_to: row.try_get("time_to")?,
            division: row.try_get("division")?,
            semester: row.try_get("semester")?,
            batch: row.try_get("batch")?,
            lecture_type: row.try_get("lecture_type")?,
        },
        subject_code: row.try_get("subject_code")?,
        subject_name: row.try_get("subject_name")?,
        subject_semester: row.try_get("subject_semester")?,
        department_name: row.try_get("department_name")?,
        faculty_name: row.try_get("faculty_name")?,
        faculty_email: row.try_get("faculty_email")?,
    })
}

// ============================================================================
// Attendance
// ============================================================================

/// Insert a batch of attendance rows as one statement; all or nothing
pub async fn insert_attendance_records(
    pool: &SqlitePool,
    records: &[AttendanceRecord],
) -> AppResult<()> {
    if records.is_empty() {
        return Ok(());
    }
    let sql = attendance::insert_many(records);
    sqlx::query(&sql).execute(pool).await?;
    Ok(())
}

/// Plain attendance row by id
pub async fn fetch_attendance_by_id(
    pool: &SqlitePool,
    id: &str,
) -> AppResult<Option<AttendanceRecord>> {
    let sql = attendance::select_by_id(id);
    let row = sqlx::query(&sql).fetch_optional(pool).await?;
    Ok(row.as_ref().map(decode_record).transpose()?)
}

/// Plain attendance rows filtered by lecture, student and/or calendar day bounds
pub async fn fetch_attendance_filtered(
    pool: &SqlitePool,
    lecture_id: Option<&str>,
    student_id: Option<&str>,
    day_range: Option<(chrono::DateTime<chrono::Utc>, chrono::DateTime<chrono::Utc>)>,
) -> AppResult<Vec<AttendanceRecord>> {
    let sql = attendance::select_filtered(lecture_id, student_id, day_range);
    let rows = sqlx::query(&sql).fetch_all(pool).await?;
    Ok(rows.iter().map(decode_record).collect::<Result<Vec<_>, _>>()?)
}

/// Attendance rows joined with their display fields
pub async fn fetch_joined_attendance(
    pool: &SqlitePool,
    scope: AttendanceScope<'_>,
) -> AppResult<Vec<JoinedAttendanceRow>> {
    let (sql, with_student) = match scope {
        AttendanceScope::All => (attendance::select_all_enriched(), true),
        AttendanceScope::Id(id) => (attendance::select_enriched_by_id(id), true),
        AttendanceScope::Student(student_id) => {
            (attendance::select_enriched_by_student(student_id), false)
        }
        AttendanceScope::Lecture(lecture_id) => {
            (attendance::select_enriched_by_lecture(lecture_id), true)
        }
    };
    let rows = sqlx::query(&sql).fetch_all(pool).await?;
    Ok(rows
        .iter()
        .map(|row| decode_joined(row, with_student))
        .collect::<Result<Vec<_>, _>>()?)
}

/// Apply a patch and return the updated rows (empty when the id is unknown)
pub async fn update_attendance(
    pool: &SqlitePool,
    id: &str,
    patch: &AttendancePatch,
) -> AppResult<Vec<AttendanceRecord>> {
    if let Some(sql) = attendance::update(id, patch) {
        sqlx::query(&sql).execute(pool).await?;
    }
    Ok(fetch_attendance_by_id(pool, id).await?.into_iter().collect())
}

/// Delete by id and return the deleted rows (empty when the id is unknown)
pub async fn delete_attendance(pool: &SqlitePool, id: &str) -> AppResult<Vec<AttendanceRecord>> {
    let mut tx = pool.begin().await?;

    let sql = attendance::select_by_id(id);
    let existing = sqlx::query(&sql)
        .fetch_optional(&mut *tx)
        .await?
        .as_ref()
        .map(decode_record)
        .transpose()?;

    let sql = attendance::delete(id);
    sqlx::query(&sql).execute(&mut *tx).await?;
    tx.commit().await?;

    Ok(existing.into_iter().collect())
}

// ============================================================================
// Students
// ============================================================================

pub async fn fetch_students(pool: &SqlitePool) -> AppResult<Vec<Student>> {
    let sql = students::select_all();
    let rows = sqlx::query(&sql).fetch_all(pool).await?;
    Ok(rows.iter().map(decode_student).collect::<Result<Vec<_>, _>>()?)
}

/// Students whose stored department (abbreviation) matches exactly
pub async fn fetch_students_by_department(
    pool: &SqlitePool,
    department: &str,
) -> AppResult<Vec<Student>> {
    let sql = students::select_by_department(department);
    let rows = sqlx::query(&sql).fetch_all(pool).await?;
    Ok(rows.iter().map(decode_student).collect::<Result<Vec<_>, _>>()?)
}

pub async fn fetch_roster_students(
    pool: &SqlitePool,
    semester: i64,
    division: Option<i64>,
    department: Option<&str>,
    batch: Option<&str>,
) -> AppResult<Vec<Student>> {
    let sql = students::select_roster(semester, division, department, batch);
    let rows = sqlx::query(&sql).fetch_all(pool).await?;
    Ok(rows.iter().map(decode_student).collect::<Result<Vec<_>, _>>()?)
}

pub async fn upsert_student(pool: &SqlitePool, student: &Student) -> AppResult<()> {
    if student.id.trim().is_empty() {
        return Err(AppError::validation("Student id is required"));
    }
    let sql = students::upsert(student);
    sqlx::query(&sql).execute(pool).await?;
    Ok(())
}

// ============================================================================
// Timetable and lookups
// ============================================================================

pub async fn fetch_timetable(pool: &SqlitePool) -> AppResult<Vec<TimetableEntry>> {
    let sql = timetable::select_all_enriched();
    let rows = sqlx::query(&sql).fetch_all(pool).await?;
    Ok(rows.iter().map(decode_timetable).collect::<Result<Vec<_>, _>>()?)
}

pub async fn insert_lecture(pool: &SqlitePool, lecture: &Lecture) -> AppResult<()> {
    let sql = timetable::insert_lecture(lecture);
    sqlx::query(&sql).execute(pool).await?;
    Ok(())
}

pub async fn insert_department(pool: &SqlitePool, department: &Department) -> AppResult<()> {
    let sql = timetable::insert_department(department);
    sqlx::query(&sql).execute(pool).await?;
    Ok(())
}

pub async fn insert_subject(pool: &SqlitePool, subject: &Subject) -> AppResult<()> {
    let sql = timetable::insert_subject(subject);
    sqlx::query(&sql).execute(pool).await?;
    Ok(())
}

pub async fn insert_faculty(pool: &SqlitePool, member: &FacultyMember) -> AppResult<()> {
    let sql = timetable::insert_faculty(member);
    sqlx::query(&sql).execute(pool).await?;
    Ok(())
}
