use chrono::{DateTime, Utc};
use sea_query::{Alias, Expr, Query, SelectStatement, SimpleExpr, SqliteQueryBuilder};

use crate::models::{AttendancePatch, AttendanceRecord};
use crate::schedule::format_timestamp;
use crate::schema::{Attendance, Departments, Faculty, Students, Subjects, Timetable};

fn record_values(record: &AttendanceRecord) -> [SimpleExpr; 7] {
    [
        record.id.clone().into(),
        record.lecture_id.clone().into(),
        record.student_id.clone().into(),
        (record.is_present as i32).into(),
        record.date.as_ref().map(format_timestamp).into(),
        record.faculty_id.clone().into(),
        record.remark.clone().into(),
    ]
}

/// INSERT INTO attendance (id, lecture_id, student_id, is_present, date, faculty_id, remark)
/// VALUES (...), (...), ...
///
/// One statement for the whole batch. Callers must not pass an empty slice.
pub fn insert_many(records: &[AttendanceRecord]) -> String {
    let mut insert = Query::insert();
    insert.into_table(Attendance::Table).columns([
        Attendance::Id,
        Attendance::LectureId,
        Attendance::StudentId,
        Attendance::IsPresent,
        Attendance::Date,
        Attendance::FacultyId,
        Attendance::Remark,
    ]);
    for record in records {
        insert.values_panic(record_values(record));
    }
    insert.to_string(SqliteQueryBuilder)
}

/// SELECT id, lecture_id, student_id, is_present, date, faculty_id, remark FROM attendance
fn select_plain() -> SelectStatement {
    Query::select()
        .columns([
            (Attendance::Table, Attendance::Id),
            (Attendance::Table, Attendance::LectureId),
            (Attendance::Table, Attendance::StudentId),
            (Attendance::Table, Attendance::IsPresent),
            (Attendance::Table, Attendance::Date),
            (Attendance::Table, Attendance::FacultyId),
            (Attendance::Table, Attendance::Remark),
        ])
        .from(Attendance::Table)
        .to_owned()
}

/// SELECT ... FROM attendance WHERE id = ?
pub fn select_by_id(id: &str) -> String {
    select_plain()
        .and_where(Expr::col((Attendance::Table, Attendance::Id)).eq(id))
        .to_string(SqliteQueryBuilder)
}

/// SELECT ... FROM attendance
/// [WHERE lecture_id = ?] [AND student_id = ?] [AND date BETWEEN start AND end]
pub fn select_filtered(
    lecture_id: Option<&str>,
    student_id: Option<&str>,
    day_range: Option<(DateTime<Utc>, DateTime<Utc>)>,
) -> String {
    let mut query = select_plain();
    if let Some(lecture_id) = lecture_id {
        query.and_where(Expr::col((Attendance::Table, Attendance::LectureId)).eq(lecture_id));
    }
    if let Some(student_id) = student_id {
        query.and_where(Expr::col((Attendance::Table, Attendance::StudentId)).eq(student_id));
    }
    if let Some((start, end)) = day_range {
        query
            .and_where(Expr::col((Attendance::Table, Attendance::Date)).gte(format_timestamp(&start)))
            .and_where(Expr::col((Attendance::Table, Attendance::Date)).lte(format_timestamp(&end)));
    }
    query.to_string(SqliteQueryBuilder)
}

/// Attendance joined with lecture, subject, subject department, faculty and
/// (optionally) student. Every join is a LEFT JOIN so dangling references
/// still return the attendance row.
///
/// SELECT attendance.*, subjects.code AS subject_code, subjects.name AS subject_name,
///        faculty.name AS faculty_name, departments.name AS department_name,
///        timetable.time_from, timetable.time_to
///        [, students.id AS joined_student_id, students.name AS student_name, ...]
/// FROM attendance
/// LEFT JOIN timetable ON timetable.id = attendance.lecture_id
/// LEFT JOIN subjects ON subjects.id = timetable.subject_id
/// LEFT JOIN departments ON departments.id = subjects.department_id
/// LEFT JOIN faculty ON faculty.id = timetable.faculty_id
/// [LEFT JOIN students ON students.id = attendance.student_id]
fn select_enriched(with_student: bool) -> SelectStatement {
    let mut query = select_plain();
    query
        .expr_as(
            Expr::col((Subjects::Table, Subjects::Code)),
            Alias::new("subject_code"),
        )
        .expr_as(
            Expr::col((Subjects::Table, Subjects::Name)),
            Alias::new("subject_name"),
        )
        .expr_as(
            Expr::col((Faculty::Table, Faculty::Name)),
            Alias::new("faculty_name"),
        )
        .expr_as(
            Expr::col((Departments::Table, Departments::Name)),
            Alias::new("department_name"),
        )
        .expr_as(
            Expr::col((Timetable::Table, Timetable::TimeFrom)),
            Alias::new("time_from"),
        )
        .expr_as(
            Expr::col((Timetable::Table, Timetable::TimeTo)),
            Alias::new("time_to"),
        )
        .left_join(
            Timetable::Table,
            Expr::col((Timetable::Table, Timetable::Id))
                .equals((Attendance::Table, Attendance::LectureId)),
        )
        .left_join(
            Subjects::Table,
            Expr::col((Subjects::Table, Subjects::Id))
                .equals((Timetable::Table, Timetable::SubjectId)),
        )
        .left_join(
            Departments::Table,
            Expr::col((Departments::Table, Departments::Id))
                .equals((Subjects::Table, Subjects::DepartmentId)),
        )
        .left_join(
            Faculty::Table,
            Expr::col((Faculty::Table, Faculty::Id))
                .equals((Timetable::Table, Timetable::FacultyId)),
        );

    if with_student {
        query
            .expr_as(
                Expr::col((Students::Table, Students::Id)),
                Alias::new("joined_student_id"),
            )
            .expr_as(
                Expr::col((Students::Table, Students::Name)),
                Alias::new("student_name"),
            )
            .expr_as(
                Expr::col((Students::Table, Students::GuardianEmail)),
                Alias::new("student_email"),
            )
            .expr_as(
                Expr::col((Students::Table, Students::RollNo)),
                Alias::new("student_roll_no"),
            )
            .expr_as(
                Expr::col((Students::Table, Students::Department)),
                Alias::new("student_department"),
            )
            .left_join(
                Students::Table,
                Expr::col((Students::Table, Students::Id))
                    .equals((Attendance::Table, Attendance::StudentId)),
            );
    }

    query
}

/// Every attendance row with lecture and student display fields
pub fn select_all_enriched() -> String {
    select_enriched(true).to_string(SqliteQueryBuilder)
}

/// One attendance row with lecture and student display fields
pub fn select_enriched_by_id(id: &str) -> String {
    select_enriched(true)
        .and_where(Expr::col((Attendance::Table, Attendance::Id)).eq(id))
        .to_string(SqliteQueryBuilder)
}

/// A student's attendance rows with lecture display fields only
pub fn select_enriched_by_student(student_id: &str) -> String {
    select_enriched(false)
        .and_where(Expr::col((Attendance::Table, Attendance::StudentId)).eq(student_id))
        .to_string(SqliteQueryBuilder)
}

/// A lecture's attendance rows with lecture and student display fields
pub fn select_enriched_by_lecture(lecture_id: &str) -> String {
    select_enriched(true)
        .and_where(Expr::col((Attendance::Table, Attendance::LectureId)).eq(lecture_id))
        .to_string(SqliteQueryBuilder)
}

/// UPDATE attendance SET <patched columns> WHERE id = ?
///
/// Returns None when the patch carries no fields.
pub fn update(id: &str, patch: &AttendancePatch) -> Option<String> {
    if patch.is_empty() {
        return None;
    }

    let mut update = Query::update();
    update.table(Attendance::Table);
    if let Some(lecture_id) = &patch.lecture_id {
        update.value(Attendance::LectureId, lecture_id.clone());
    }
    if let Some(student_id) = &patch.student_id {
        update.value(Attendance::StudentId, student_id.clone());
    }
    if let Some(is_present) = patch.is_present {
        update.value(Attendance::IsPresent, is_present as i32);
    }
    if let Some(date) = &patch.date {
        update.value(Attendance::Date, format_timestamp(date));
    }
    if let Some(faculty_id) = &patch.faculty_id {
        update.value(Attendance::FacultyId, faculty_id.clone());
    }
    if let Some(remark) = &patch.remark {
        update.value(Attendance::Remark, remark.clone());
    }
    update.and_where(Expr::col(Attendance::Id).eq(id));
    Some(update.to_string(SqliteQueryBuilder))
}

/// DELETE FROM attendance WHERE id = ?
pub fn delete(id: &str) -> String {
    Query::delete()
        .from_table(Attendance::Table)
        .and_where(Expr::col(Attendance::Id).eq(id))
        .to_string(SqliteQueryBuilder)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn record(id: &str, present: bool) -> AttendanceRecord {
        AttendanceRecord {
            id: id.to_string(),
            lecture_id: "lec-1".to_string(),
            student_id: format!("stu-{}", id),
            is_present: present,
            date: Some(Utc.with_ymd_and_hms(2025, 3, 5, 9, 0, 0).unwrap()),
            faculty_id: None,
            remark: Some("Intro to graphs".to_string()),
        }
    }

    #[test]
    fn batch_insert_is_a_single_statement() {
        let sql = insert_many(&[record("a", true), record("b", false)]);
        assert_eq!(sql.matches("INSERT INTO").count(), 1);
        assert!(sql.contains("'2025-03-05T09:00:00.000Z'"));
        assert!(sql.contains("NULL"));
        assert!(sql.contains("'stu-a'"));
        assert!(sql.contains("'stu-b'"));
    }

    #[test]
    fn values_are_escaped() {
        let mut r = record("a", true);
        r.remark = Some("O'Brien's lab".to_string());
        let sql = insert_many(&[r]);
        assert!(sql.contains("'O''Brien''s lab'"));
    }

    #[test]
    fn day_filter_spans_whole_day() {
        let day = chrono::NaiveDate::from_ymd_opt(2025, 3, 5).unwrap();
        let range = (
            crate::schedule::start_of_day(day),
            crate::schedule::end_of_day(day),
        );
        let sql = select_filtered(Some("lec-1"), None, Some(range));
        assert!(sql.contains("'lec-1'"));
        assert!(sql.contains("'2025-03-05T00:00:00.000Z'"));
        assert!(sql.contains("'2025-03-05T23:59:59.999Z'"));
        assert!(!sql.contains("\"student_id\" ="));
    }

    #[test]
    fn student_variant_skips_student_join() {
        let sql = select_enriched_by_student("stu-1");
        assert!(!sql.contains("LEFT JOIN \"students\""));
        let sql = select_all_enriched();
        assert!(sql.contains("LEFT JOIN \"students\""));
        assert!(sql.contains("\"subject_code\""));
    }

    #[test]
    fn empty_patch_produces_no_statement() {
        assert!(update("att-1", &AttendancePatch::default()).is_none());

        let patch = AttendancePatch {
            is_present: Some(true),
            ..Default::default()
        };
        let sql = update("att-1", &patch).unwrap();
        assert!(sql.contains("\"is_present\" = 1"));
        assert!(!sql.contains("\"remark\""));
    }
}
