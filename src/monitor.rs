//! Per-student attendance aggregation and status classification.
//!
//! [`classify`] is pure: it takes the student set, the enriched attendance
//! set and a [`MonitorFilters`] value and produces a [`MonitorReport`].
//! [`build_report`] loads both sets from the store and calls it.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use sqlx::SqlitePool;

use crate::constants::{
    selection, ALL_COUNSELORS, ALL_DEPARTMENTS, ALL_STUDENTS, ALL_SUBJECTS, ALL_TEACHERS,
    EXCELLENT_THRESHOLD, GOOD_THRESHOLD, RECENT_ATTENDANCE_LIMIT, UNKNOWN_STUDENT_NAME,
    WARNING_THRESHOLD,
};
use crate::departments::{to_abbreviation, to_full_name};
use crate::db;
use crate::enrichment;
use crate::error::{AppError, AppResult};
use crate::models::{
    AttendanceStatus, EnrichedAttendance, MonitorReport, MonitorSummary, Student,
    StudentAttendanceSummary,
};
use crate::schedule::{display_day, normalize_display_day, parse_timestamp};

/// Raw `GET /attendance-monitor` query parameters
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonitorQuery {
    pub department: Option<String>,
    pub subject: Option<String>,
    pub teacher: Option<String>,
    pub counselor: Option<String>,
    pub id_range: Option<String>,
    pub date: Option<String>,
    pub student_id: Option<String>,
    pub date_from: Option<String>,
    pub date_to: Option<String>,
}

/// Normalized filters; `None` means the dimension is not filtered
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MonitorFilters {
    /// Full name or abbreviation; compared against the stored abbreviation
    pub department: Option<String>,
    /// Subject code (exact) or a fragment of the subject name
    pub subject: Option<String>,
    /// Faculty id or faculty name, exact
    pub teacher: Option<String>,
    pub counselor: Option<String>,
    /// A roll-number range such as "22DCE001 to 22DCE060"; only its first token is used
    pub id_range: Option<String>,
    /// Exact day in DD/MM/YYYY form
    pub date: Option<String>,
    pub date_from: Option<DateTime<Utc>>,
    pub date_to: Option<DateTime<Utc>>,
}

impl MonitorQuery {
    /// Student-specific requests bypass aggregation entirely
    pub fn student_id(&self) -> Option<&str> {
        self.student_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
    }

    pub fn to_filters(&self) -> AppResult<MonitorFilters> {
        let bound = |value: &Option<String>, name: &str| -> AppResult<Option<DateTime<Utc>>> {
            match value.as_deref().map(str::trim).filter(|v| !v.is_empty()) {
                Some(raw) => parse_timestamp(raw)
                    .map(Some)
                    .map_err(|e| AppError::validation(format!("Invalid {}: {}", name, e))),
                None => Ok(None),
            }
        };

        Ok(MonitorFilters {
            department: selection(self.department.as_deref(), ALL_DEPARTMENTS),
            subject: selection(self.subject.as_deref(), ALL_SUBJECTS),
            teacher: selection(self.teacher.as_deref(), ALL_TEACHERS),
            counselor: selection(self.counselor.as_deref(), ALL_COUNSELORS),
            id_range: selection(self.id_range.as_deref(), ALL_STUDENTS),
            date: self
                .date
                .as_deref()
                .filter(|d| !d.trim().is_empty())
                .map(normalize_display_day),
            date_from: bound(&self.date_from, "dateFrom")?,
            date_to: bound(&self.date_to, "dateTo")?,
        })
    }
}

impl MonitorFilters {
    fn keeps_record(&self, row: &EnrichedAttendance) -> bool {
        if self.date_from.is_some() || self.date_to.is_some() {
            // Rows without a date pass range filters
            if let Some(date) = row.record.date {
                if self.date_from.is_some_and(|from| date < from) {
                    return false;
                }
                if self.date_to.is_some_and(|to| date > to) {
                    return false;
                }
            }
        }

        if let Some(day) = &self.date {
            match row.record.date {
                Some(date) if display_day(&date) == *day => {}
                _ => return false,
            }
        }

        if let Some(subject) = &self.subject {
            let code_match = row.lecture.subject_code.as_deref() == Some(subject.as_str());
            let name_match = row
                .lecture
                .subject_name
                .as_deref()
                .is_some_and(|name| name.contains(subject.as_str()));
            if !code_match && !name_match {
                return false;
            }
        }

        if let Some(teacher) = &self.teacher {
            let by_id = row.record.faculty_id.as_deref() == Some(teacher.as_str());
            let by_name = row.lecture.faculty_name.as_deref() == Some(teacher.as_str());
            if !by_id && !by_name {
                return false;
            }
        }

        true
    }

    fn keeps_student(&self, student: &Student) -> bool {
        if let Some(department) = &self.department {
            if student.department.as_deref() != Some(to_abbreviation(department)) {
                return false;
            }
        }

        if let Some(counselor) = &self.counselor {
            if student.counselor.as_deref() != Some(counselor.as_str()) {
                return false;
            }
        }

        if let Some(range) = &self.id_range {
            let token = range.split(' ').next().unwrap_or_default();
            if !student.roll_no.contains(token) && !student.id.contains(token) {
                return false;
            }
        }

        true
    }
}

/// round(attended / total * 100), half up; 0 when there are no sessions
pub fn attendance_percentage(attended: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    ((attended * 200 + total) / (total * 2)) as u32
}

pub fn status_for_percentage(percentage: u32) -> AttendanceStatus {
    if percentage >= EXCELLENT_THRESHOLD {
        AttendanceStatus::Excellent
    } else if percentage >= GOOD_THRESHOLD {
        AttendanceStatus::Good
    } else if percentage >= WARNING_THRESHOLD {
        AttendanceStatus::Warning
    } else {
        AttendanceStatus::Critical
    }
}

pub fn summarize(students: &[StudentAttendanceSummary]) -> MonitorSummary {
    let count = |status| students.iter().filter(|s| s.status == status).count();
    let total: usize = students
        .iter()
        .map(|s| s.attendance_percentage as usize)
        .sum();

    MonitorSummary {
        total_students: students.len(),
        excellent_count: count(AttendanceStatus::Excellent),
        good_count: count(AttendanceStatus::Good),
        warning_count: count(AttendanceStatus::Warning),
        critical_count: count(AttendanceStatus::Critical),
        average_attendance: attendance_percentage(total, students.len() * 100),
    }
}

fn summarize_student(student: &Student, rows: Vec<EnrichedAttendance>) -> StudentAttendanceSummary {
    let total_sessions = rows.len();
    let sessions_attended = rows.iter().filter(|r| r.record.is_present).count();
    let attendance_percentage = attendance_percentage(sessions_attended, total_sessions);

    let mut recent_attendance = rows;
    let skip = recent_attendance.len().saturating_sub(RECENT_ATTENDANCE_LIMIT);
    recent_attendance.drain(..skip);

    StudentAttendanceSummary {
        student_id: student.id.clone(),
        roll_no: student.roll_no.clone(),
        name: student
            .name
            .clone()
            .unwrap_or_else(|| UNKNOWN_STUDENT_NAME.to_string()),
        email: student.guardian_email.clone(),
        division: student.division,
        batch: student.batch.clone(),
        semester: student.semester,
        department: to_full_name(student.department.as_deref().unwrap_or_default()).to_string(),
        counselor: student.counselor.clone(),
        attendance_percentage,
        status: status_for_percentage(attendance_percentage),
        sessions_attended,
        total_sessions,
        recent_attendance,
    }
}

/// Filter both sets, then summarize every remaining student in input order
pub fn classify(
    students: &[Student],
    attendance: Vec<EnrichedAttendance>,
    filters: &MonitorFilters,
) -> MonitorReport {
    let attendance: Vec<EnrichedAttendance> = attendance
        .into_iter()
        .filter(|row| filters.keeps_record(row))
        .collect();

    let summaries: Vec<StudentAttendanceSummary> = students
        .iter()
        .filter(|student| filters.keeps_student(student))
        .map(|student| {
            let rows = attendance
                .iter()
                .filter(|row| row.record.student_id == student.id)
                .cloned()
                .collect();
            summarize_student(student, rows)
        })
        .collect();

    MonitorReport {
        summary: summarize(&summaries),
        students: summaries,
        attendance_records: attendance,
    }
}

/// Load students and enriched attendance concurrently and classify them
pub async fn build_report(pool: &SqlitePool, filters: &MonitorFilters) -> AppResult<MonitorReport> {
    let students = async {
        match &filters.department {
            Some(department) => {
                db::fetch_students_by_department(pool, to_abbreviation(department)).await
            }
            None => db::fetch_students(pool).await,
        }
    };
    let (students, attendance) = tokio::try_join!(students, enrichment::fetch_all(pool))
        .map_err(AppError::into_unavailable)?;

    Ok(classify(&students, attendance, filters))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AttendanceRecord, LectureDetails};
    use chrono::TimeZone;

    fn student(id: &str, department: &str) -> Student {
        Student {
            id: id.to_string(),
            roll_no: format!("22{}{}", department, id),
            name: Some(format!("Student {}", id)),
            guardian_email: None,
            department: Some(department.to_string()),
            division: Some(1),
            batch: Some("A1".to_string()),
            semester: Some(5),
            counselor: Some("Prof. Shah".to_string()),
        }
    }

    fn mark(student_id: &str, present: bool, day: Option<u32>) -> EnrichedAttendance {
        EnrichedAttendance {
            record: AttendanceRecord {
                id: format!("{}-{:?}-{}", student_id, day, present),
                lecture_id: "lec-1".to_string(),
                student_id: student_id.to_string(),
                is_present: present,
                date: day.map(|d| Utc.with_ymd_and_hms(2025, 3, d, 9, 0, 0).unwrap()),
                faculty_id: Some("fac-1".to_string()),
                remark: None,
            },
            lecture: LectureDetails {
                subject_code: Some("CS301".to_string()),
                subject_name: Some("Data Structures".to_string()),
                faculty_name: Some("Dr. Mehta".to_string()),
                ..Default::default()
            },
            student: None,
        }
    }

    fn marks(student_id: &str, present: usize, absent: usize) -> Vec<EnrichedAttendance> {
        (0..present)
            .map(|_| mark(student_id, true, Some(3)))
            .chain((0..absent).map(|_| mark(student_id, false, Some(3))))
            .collect()
    }

    #[test]
    fn student_without_sessions_is_critical() {
        let report = classify(&[student("s1", "DCE")], vec![], &MonitorFilters::default());
        let s = &report.students[0];
        assert_eq!(s.attendance_percentage, 0);
        assert_eq!(s.status, AttendanceStatus::Critical);
        assert_eq!(s.sessions_attended, 0);
        assert_eq!(s.total_sessions, 0);
    }

    #[test]
    fn seventeen_of_twenty_is_excellent() {
        let report = classify(
            &[student("s1", "DCE")],
            marks("s1", 17, 3),
            &MonitorFilters::default(),
        );
        let s = &report.students[0];
        assert_eq!(s.attendance_percentage, 85);
        assert_eq!(s.status, AttendanceStatus::Excellent);
        assert_eq!(s.recent_attendance.len(), 10);
    }

    #[test]
    fn percentage_rounds_half_up() {
        assert_eq!(attendance_percentage(1, 8), 13); // 12.5
        assert_eq!(attendance_percentage(2, 3), 67);
        assert_eq!(attendance_percentage(1, 3), 33);
        assert_eq!(attendance_percentage(0, 0), 0);
    }

    #[test]
    fn more_attendance_never_lowers_the_tier() {
        for total in 1..=40 {
            let mut last = (0, AttendanceStatus::Critical);
            for attended in 0..=total {
                let pct = attendance_percentage(attended, total);
                let status = status_for_percentage(pct);
                assert!(pct >= last.0);
                assert!(status >= last.1);
                last = (pct, status);
            }
        }
    }

    #[test]
    fn thresholds_are_inclusive() {
        assert_eq!(status_for_percentage(85), AttendanceStatus::Excellent);
        assert_eq!(status_for_percentage(84), AttendanceStatus::Good);
        assert_eq!(status_for_percentage(75), AttendanceStatus::Good);
        assert_eq!(status_for_percentage(65), AttendanceStatus::Warning);
        assert_eq!(status_for_percentage(64), AttendanceStatus::Critical);
    }

    #[test]
    fn average_over_empty_and_single() {
        assert_eq!(summarize(&[]).average_attendance, 0);

        let report = classify(
            &[student("s1", "DCE")],
            marks("s1", 2, 1),
            &MonitorFilters::default(),
        );
        assert_eq!(report.summary.average_attendance, 67);
        assert_eq!(report.summary.total_students, 1);
        assert_eq!(report.summary.warning_count, 1);
    }

    #[test]
    fn department_filter_accepts_full_name() {
        let students = [student("s1", "DCE"), student("s2", "DIT"), student("s3", "DCE")];
        let filters = MonitorFilters {
            department: Some("Computer Engineering".to_string()),
            ..Default::default()
        };
        let report = classify(&students, vec![], &filters);
        let ids: Vec<_> = report.students.iter().map(|s| s.student_id.as_str()).collect();
        assert_eq!(ids, vec!["s1", "s3"]);
        assert_eq!(report.students[0].department, "Computer Engineering");
    }

    #[test]
    fn undated_rows_pass_range_but_not_exact_day() {
        let rows = vec![mark("s1", true, None), mark("s1", true, Some(3)), mark("s1", false, Some(20))];
        let range = MonitorFilters {
            date_from: Some(Utc.with_ymd_and_hms(2025, 3, 1, 0, 0, 0).unwrap()),
            date_to: Some(Utc.with_ymd_and_hms(2025, 3, 10, 0, 0, 0).unwrap()),
            ..Default::default()
        };
        let report = classify(&[student("s1", "DCE")], rows.clone(), &range);
        assert_eq!(report.students[0].total_sessions, 2);
        assert_eq!(report.students[0].attendance_percentage, 100);

        let exact = MonitorFilters {
            date: Some("20/03/2025".to_string()),
            ..Default::default()
        };
        let report = classify(&[student("s1", "DCE")], rows, &exact);
        assert_eq!(report.students[0].total_sessions, 1);
        assert_eq!(report.attendance_records.len(), 1);
    }

    #[test]
    fn subject_matches_code_or_name_fragment() {
        let by_code = MonitorFilters {
            subject: Some("CS301".to_string()),
            ..Default::default()
        };
        let by_name = MonitorFilters {
            subject: Some("Structures".to_string()),
            ..Default::default()
        };
        let other = MonitorFilters {
            subject: Some("CS302".to_string()),
            ..Default::default()
        };
        let s = [student("s1", "DCE")];
        assert_eq!(classify(&s, marks("s1", 1, 1), &by_code).students[0].total_sessions, 2);
        assert_eq!(classify(&s, marks("s1", 1, 1), &by_name).students[0].total_sessions, 2);
        assert_eq!(classify(&s, marks("s1", 1, 1), &other).students[0].total_sessions, 0);
    }

    #[test]
    fn recent_attendance_is_a_positional_tail() {
        let rows: Vec<_> = (1..=12).map(|d| mark("s1", d % 2 == 0, Some(d))).collect();
        let report = classify(&[student("s1", "DCE")], rows, &MonitorFilters::default());
        let recent = &report.students[0].recent_attendance;
        assert_eq!(recent.len(), 10);
        assert_eq!(recent[0].record.date.map(|d| display_day(&d)).as_deref(), Some("03/03/2025"));
    }

    #[test]
    fn id_range_uses_leading_token() {
        let students = [student("001", "DCE"), student("002", "DCE")];
        let filters = MonitorFilters {
            id_range: Some("22DCE001 to 22DCE060".to_string()),
            ..Default::default()
        };
        let report = classify(&students, vec![], &filters);
        assert_eq!(report.students.len(), 1);
        assert_eq!(report.students[0].roll_no, "22DCE001");
    }

    #[test]
    fn counselor_filter_keeps_only_their_students() {
        let mut other = student("s2", "DCE");
        other.counselor = Some("Dr. Iyer".to_string());
        let mut unassigned = student("s3", "DCE");
        unassigned.counselor = None;
        let students = [student("s1", "DCE"), other, unassigned];

        let shah = MonitorFilters {
            counselor: Some("Prof. Shah".to_string()),
            ..Default::default()
        };
        let report = classify(&students, marks("s2", 1, 0), &shah);
        let ids: Vec<_> = report.students.iter().map(|s| s.student_id.as_str()).collect();
        assert_eq!(ids, vec!["s1"]);
        assert_eq!(report.summary.total_students, 1);

        let nobody = MonitorFilters {
            counselor: Some("Prof. Nobody".to_string()),
            ..Default::default()
        };
        assert!(classify(&students, vec![], &nobody).students.is_empty());
    }

    #[test]
    fn teacher_matches_faculty_id_or_name() {
        let mut by_other = mark("s1", false, Some(4));
        by_other.record.faculty_id = Some("fac-2".to_string());
        by_other.lecture.faculty_name = Some("Prof. Rao".to_string());
        let mut unsigned = mark("s1", true, Some(5));
        unsigned.record.faculty_id = None;
        let rows = vec![mark("s1", true, Some(3)), by_other, unsigned];
        let s = [student("s1", "DCE")];

        let by_id = MonitorFilters {
            teacher: Some("fac-1".to_string()),
            ..Default::default()
        };
        let report = classify(&s, rows.clone(), &by_id);
        assert_eq!(report.students[0].total_sessions, 1);
        assert_eq!(report.attendance_records[0].record.faculty_id.as_deref(), Some("fac-1"));

        // The unsigned row still carries the lecture's faculty name
        let by_name = MonitorFilters {
            teacher: Some("Dr. Mehta".to_string()),
            ..Default::default()
        };
        let report = classify(&s, rows.clone(), &by_name);
        assert_eq!(report.students[0].total_sessions, 2);
        assert_eq!(report.students[0].attendance_percentage, 100);

        let neither = MonitorFilters {
            teacher: Some("Dr. Kulkarni".to_string()),
            ..Default::default()
        };
        let report = classify(&s, rows, &neither);
        assert_eq!(report.students[0].total_sessions, 0);
        assert!(report.attendance_records.is_empty());
    }

    #[test]
    fn query_sentinels_become_no_filter() {
        let query = MonitorQuery {
            department: Some("All Departments".to_string()),
            subject: Some("All Subjects".to_string()),
            teacher: Some("All Teachers".to_string()),
            counselor: Some("All Counselors".to_string()),
            id_range: Some("All Students".to_string()),
            date: Some("2025-03-05".to_string()),
            ..Default::default()
        };
        let filters = query.to_filters().unwrap();
        assert_eq!(
            filters,
            MonitorFilters {
                date: Some("05/03/2025".to_string()),
                ..Default::default()
            }
        );

        let bad = MonitorQuery {
            date_from: Some("soon".to_string()),
            ..Default::default()
        };
        assert!(bad.to_filters().unwrap_err().is_validation());
    }
}
