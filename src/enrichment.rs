//! Attendance rows joined with lecture, subject, faculty, department and
//! student display fields.
//!
//! The join result is decoded into [`JoinedAttendanceRow`], where every
//! field reached through a relation is optional. The conversions below fix
//! what an absent relation turns into: enriched rows get empty first/last
//! names, lecture status entries keep the field absent.

use sqlx::SqlitePool;

use crate::db;
use crate::error::AppResult;
use crate::models::{
    AttendanceRecord, EnrichedAttendance, LectureDetails, LectureStatus, LectureStatusEntry,
    StudentDetails,
};

/// Student columns of the join; `id` is None when the student row is missing
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JoinedStudent {
    pub id: Option<String>,
    pub name: Option<String>,
    pub email: Option<String>,
    pub roll_no: Option<String>,
    pub department: Option<String>,
}

/// One row of the attendance join
#[derive(Debug, Clone, PartialEq)]
pub struct JoinedAttendanceRow {
    pub record: AttendanceRecord,
    pub lecture: LectureDetails,
    /// None when the query did not join students at all
    pub student: Option<JoinedStudent>,
}

/// Split a full name into (first token, remaining tokens joined by a space)
pub fn split_full_name(full_name: Option<&str>) -> (String, String) {
    let Some(full_name) = full_name else {
        return (String::new(), String::new());
    };
    let mut parts = full_name.split_whitespace();
    let first = parts.next().unwrap_or_default().to_string();
    let rest = parts.collect::<Vec<_>>().join(" ");
    (first, rest)
}

impl JoinedAttendanceRow {
    pub fn into_enriched(self) -> EnrichedAttendance {
        let student = self.student.map(|student| {
            let (first, last) = split_full_name(student.name.as_deref());
            StudentDetails {
                student_first_name: first,
                student_last_name: last,
                student_email: student.email,
                student_roll_no: student.roll_no,
                student_department: student.department,
            }
        });
        EnrichedAttendance {
            record: self.record,
            lecture: self.lecture,
            student,
        }
    }

    pub fn to_status_entry(&self) -> LectureStatusEntry {
        let found = self
            .student
            .as_ref()
            .filter(|student| student.id.is_some());
        let (first, last) = match found {
            Some(student) => {
                let (first, last) = split_full_name(student.name.as_deref());
                (Some(first), Some(last))
            }
            None => (None, None),
        };
        LectureStatusEntry {
            student_first_name: first,
            student_last_name: last,
            student_email: found.and_then(|student| student.email.clone()),
            subject_name: self.lecture.subject_name.clone(),
            subject_code: self.lecture.subject_code.clone(),
            faculty_name: self.lecture.faculty_name.clone(),
        }
    }
}

/// Stable partition on `is_present`; each side keeps the join order
pub fn split_by_presence(rows: &[JoinedAttendanceRow]) -> LectureStatus {
    let (present, absent): (Vec<_>, Vec<_>) = rows.iter().partition(|row| row.record.is_present);
    LectureStatus {
        presentees: present.into_iter().map(JoinedAttendanceRow::to_status_entry).collect(),
        absentees: absent.into_iter().map(JoinedAttendanceRow::to_status_entry).collect(),
    }
}

/// Every attendance row with lecture and student display fields; empty when none
pub async fn fetch_all(pool: &SqlitePool) -> AppResult<Vec<EnrichedAttendance>> {
    let rows = db::fetch_joined_attendance(pool, db::AttendanceScope::All).await?;
    Ok(rows.into_iter().map(JoinedAttendanceRow::into_enriched).collect())
}

/// One enriched attendance row, or None when the id does not exist
pub async fn fetch_by_id(pool: &SqlitePool, id: &str) -> AppResult<Option<EnrichedAttendance>> {
    let rows = db::fetch_joined_attendance(pool, db::AttendanceScope::Id(id)).await?;
    Ok(rows.into_iter().next().map(JoinedAttendanceRow::into_enriched))
}

/// A student's attendance rows with lecture display fields; empty when none
pub async fn fetch_by_student(
    pool: &SqlitePool,
    student_id: &str,
) -> AppResult<Vec<EnrichedAttendance>> {
    let rows = db::fetch_joined_attendance(pool, db::AttendanceScope::Student(student_id)).await?;
    Ok(rows.into_iter().map(JoinedAttendanceRow::into_enriched).collect())
}

/// Presentees and absentees of one lecture session
pub async fn status_for_lecture(pool: &SqlitePool, lecture_id: &str) -> AppResult<LectureStatus> {
    let rows = db::fetch_joined_attendance(pool, db::AttendanceScope::Lecture(lecture_id)).await?;
    Ok(split_by_presence(&rows))
}
