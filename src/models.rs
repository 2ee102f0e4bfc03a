use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One attendance row: a single student in a single lecture session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceRecord {
    pub id: String,
    pub lecture_id: String,
    pub student_id: String,
    pub is_present: bool,
    pub date: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub faculty_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remark: Option<String>,
}

/// Display fields pulled from the lecture -> subject -> department chain
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LectureDetails {
    pub subject_code: Option<String>,
    pub subject_name: Option<String>,
    pub faculty_name: Option<String>,
    pub department_name: Option<String>,
    pub time_from: Option<String>,
    pub time_to: Option<String>,
}

/// Display fields pulled from the student registry.
///
/// First and last name are always present; a missing student yields empty strings.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentDetails {
    pub student_first_name: String,
    pub student_last_name: String,
    pub student_email: Option<String>,
    pub student_roll_no: Option<String>,
    pub student_department: Option<String>,
}

/// Attendance row joined with its denormalized display fields
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnrichedAttendance {
    #[serde(flatten)]
    pub record: AttendanceRecord,
    #[serde(flatten)]
    pub lecture: LectureDetails,
    #[serde(flatten)]
    pub student: Option<StudentDetails>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    pub id: String,
    pub roll_no: String,
    pub name: Option<String>,
    pub guardian_email: Option<String>,
    /// Stored as the department abbreviation (e.g. "DCE")
    pub department: Option<String>,
    pub division: Option<i64>,
    pub batch: Option<String>,
    pub semester: Option<i64>,
    #[serde(alias = "Counsellor", alias = "counsellor")]
    pub counselor: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Department {
    pub id: String,
    pub name: String,
    pub abbreviation: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subject {
    pub id: String,
    pub code: String,
    pub name: String,
    pub department_id: Option<String>,
    pub semester: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FacultyMember {
    pub id: String,
    pub name: String,
    pub email: Option<String>,
}

/// A scheduled lecture or lab
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Lecture {
    pub id: String,
    pub subject_id: Option<String>,
    pub faculty_id: Option<String>,
    pub department_id: Option<String>,
    pub time_from: Option<String>,
    pub time_to: Option<String>,
    pub division: Option<i64>,
    pub semester: Option<i64>,
    pub batch: Option<String>,
    pub lecture_type: Option<String>,
}

/// Timetable row joined with subject, faculty and department names
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimetableEntry {
    pub lecture: Lecture,
    pub subject_code: Option<String>,
    pub subject_name: Option<String>,
    pub subject_semester: Option<i64>,
    pub department_name: Option<String>,
    pub faculty_name: Option<String>,
    pub faculty_email: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DepartmentOption {
    pub id: String,
    pub name: String,
    pub abbreviation: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubjectOption {
    pub id: Option<String>,
    pub code: String,
    pub name: String,
    pub department: Option<String>,
    pub semester: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FacultyOption {
    pub id: String,
    pub name: String,
    pub email: String,
}

/// Choices for the dashboard filter controls, derived fresh per request
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterOptions {
    pub departments: Vec<DepartmentOption>,
    pub subjects: Vec<SubjectOption>,
    pub faculty: Vec<FacultyOption>,
    pub divisions: Vec<i64>,
    pub batches: Vec<String>,
    pub semesters: Vec<i64>,
    pub student_id_ranges: BTreeMap<String, String>,
}

/// Attendance tier, ordered from worst to best
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum AttendanceStatus {
    Critical,
    Warning,
    Good,
    Excellent,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentAttendanceSummary {
    pub student_id: String,
    pub roll_no: String,
    pub name: String,
    pub email: Option<String>,
    pub division: Option<i64>,
    pub batch: Option<String>,
    pub semester: Option<i64>,
    pub department: String,
    pub counselor: Option<String>,
    pub attendance_percentage: u32,
    pub status: AttendanceStatus,
    pub sessions_attended: usize,
    pub total_sessions: usize,
    pub recent_attendance: Vec<EnrichedAttendance>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonitorSummary {
    pub total_students: usize,
    pub excellent_count: usize,
    pub good_count: usize,
    pub warning_count: usize,
    pub critical_count: usize,
    pub average_attendance: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonitorReport {
    pub students: Vec<StudentAttendanceSummary>,
    pub attendance_records: Vec<EnrichedAttendance>,
    pub summary: MonitorSummary,
}

/// One side of a lecture's present/absent split; every field may be missing
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LectureStatusEntry {
    pub student_first_name: Option<String>,
    pub student_last_name: Option<String>,
    pub student_email: Option<String>,
    pub subject_name: Option<String>,
    pub subject_code: Option<String>,
    pub faculty_name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LectureStatus {
    pub presentees: Vec<LectureStatusEntry>,
    pub absentees: Vec<LectureStatusEntry>,
}

/// Student entry in an attendance-marking roster
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RosterEntry {
    pub id: String,
    pub roll_no: String,
    pub name: String,
    pub photo: String,
    pub counselor_name: String,
    pub present: bool,
    pub division: Option<i64>,
    pub batch: Option<String>,
    pub semester: Option<i64>,
    pub department: Option<String>,
}

/// Partial update for an attendance row; `None` fields are left untouched
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendancePatch {
    #[serde(alias = "lecture")]
    pub lecture_id: Option<String>,
    #[serde(alias = "student_id")]
    pub student_id: Option<String>,
    #[serde(alias = "is_present")]
    pub is_present: Option<bool>,
    #[serde(
        default,
        alias = "Date",
        deserialize_with = "crate::schedule::deserialize_optional_timestamp"
    )]
    pub date: Option<DateTime<Utc>>,
    #[serde(alias = "faculty_id")]
    pub faculty_id: Option<String>,
    #[serde(alias = "Remark")]
    pub remark: Option<String>,
}

impl AttendancePatch {
    pub fn is_empty(&self) -> bool {
        self.lecture_id.is_none()
            && self.student_id.is_none()
            && self.is_present.is_none()
            && self.date.is_none()
            && self.faculty_id.is_none()
            && self.remark.is_none()
    }
}
