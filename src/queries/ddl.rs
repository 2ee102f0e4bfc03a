use sea_query::{ColumnDef, ForeignKey, ForeignKeyAction, Index, SqliteQueryBuilder, Table};

use crate::schema::{Attendance, Departments, Faculty, Students, Subjects, Timetable};

/// CREATE TABLE IF NOT EXISTS departments (id TEXT PRIMARY KEY, name TEXT NOT NULL, abbreviation TEXT)
pub fn create_departments_table() -> String {
    Table::create()
        .table(Departments::Table)
        .if_not_exists()
        .col(ColumnDef::new(Departments::Id).string().primary_key())
        .col(ColumnDef::new(Departments::Name).string().not_null())
        .col(ColumnDef::new(Departments::Abbreviation).string())
        .to_string(SqliteQueryBuilder)
}

/// CREATE TABLE IF NOT EXISTS subjects (
///     id TEXT PRIMARY KEY,
///     code TEXT NOT NULL,
///     name TEXT NOT NULL,
///     department_id TEXT REFERENCES departments(id) ON DELETE SET NULL,
///     semester INTEGER
/// )
pub fn create_subjects_table() -> String {
    Table::create()
        .table(Subjects::Table)
        .if_not_exists()
        .col(ColumnDef::new(Subjects::Id).string().primary_key())
        .col(ColumnDef::new(Subjects::Code).string().not_null())
        .col(ColumnDef::new(Subjects::Name).string().not_null())
        .col(ColumnDef::new(Subjects::DepartmentId).string())
        .col(ColumnDef::new(Subjects::Semester).integer())
        .foreign_key(
            ForeignKey::create()
                .from(Subjects::Table, Subjects::DepartmentId)
                .to(Departments::Table, Departments::Id)
                .on_delete(ForeignKeyAction::SetNull),
        )
        .to_string(SqliteQueryBuilder)
}

/// CREATE TABLE IF NOT EXISTS faculty (id TEXT PRIMARY KEY, name TEXT NOT NULL, email TEXT)
pub fn create_faculty_table() -> String {
    Table::create()
        .table(Faculty::Table)
        .if_not_exists()
        .col(ColumnDef::new(Faculty::Id).string().primary_key())
        .col(ColumnDef::new(Faculty::Name).string().not_null())
        .col(ColumnDef::new(Faculty::Email).string())
        .to_string(SqliteQueryBuilder)
}

/// CREATE TABLE IF NOT EXISTS students (
///     id TEXT PRIMARY KEY,
///     roll_no TEXT NOT NULL,
///     name TEXT,
///     guardian_email TEXT,
///     department TEXT,
///     division INTEGER,
///     batch TEXT,
///     semester INTEGER,
///     counselor TEXT
/// )
pub fn create_students_table() -> String {
    Table::create()
        .table(Students::Table)
        .if_not_exists()
        .col(ColumnDef::new(Students::Id).string().primary_key())
        .col(ColumnDef::new(Students::RollNo).string().not_null())
        .col(ColumnDef::new(Students::Name).string())
        .col(ColumnDef::new(Students::GuardianEmail).string())
        .col(ColumnDef::new(Students::Department).string())
        .col(ColumnDef::new(Students::Division).integer())
        .col(ColumnDef::new(Students::Batch).string())
        .col(ColumnDef::new(Students::Semester).integer())
        .col(ColumnDef::new(Students::Counselor).string())
        .to_string(SqliteQueryBuilder)
}

/// CREATE TABLE IF NOT EXISTS timetable (
///     id TEXT PRIMARY KEY,
///     subject_id TEXT REFERENCES subjects(id) ON DELETE SET NULL,
///     faculty_id TEXT REFERENCES faculty(id) ON DELETE SET NULL,
///     department_id TEXT REFERENCES departments(id) ON DELETE SET NULL,
///     time_from TEXT, time_to TEXT,
///     division INTEGER, semester INTEGER, batch TEXT, lecture_type TEXT
/// )
pub fn create_timetable_table() -> String {
    Table::create()
        .table(Timetable::Table)
        .if_not_exists()
        .col(ColumnDef::new(Timetable::Id).string().primary_key())
        .col(ColumnDef::new(Timetable::SubjectId).string())
        .col(ColumnDef::new(Timetable::FacultyId).string())
        .col(ColumnDef::new(Timetable::DepartmentId).string())
        .col(ColumnDef::new(Timetable::TimeFrom).string())
        .col(ColumnDef::new(Timetable::TimeTo).string())
        .col(ColumnDef::new(Timetable::Division).integer())
        .col(ColumnDef::new(Timetable::Semester).integer())
        .col(ColumnDef::new(Timetable::Batch).string())
        .col(ColumnDef::new(Timetable::LectureType).string())
        .foreign_key(
            ForeignKey::create()
                .from(Timetable::Table, Timetable::SubjectId)
                .to(Subjects::Table, Subjects::Id)
                .on_delete(ForeignKeyAction::SetNull),
        )
        .foreign_key(
            ForeignKey::create()
                .from(Timetable::Table, Timetable::FacultyId)
                .to(Faculty::Table, Faculty::Id)
                .on_delete(ForeignKeyAction::SetNull),
        )
        .foreign_key(
            ForeignKey::create()
                .from(Timetable::Table, Timetable::DepartmentId)
                .to(Departments::Table, Departments::Id)
                .on_delete(ForeignKeyAction::SetNull),
        )
        .to_string(SqliteQueryBuilder)
}

/// CREATE TABLE IF NOT EXISTS attendance (
///     id TEXT PRIMARY KEY,
///     lecture_id TEXT NOT NULL REFERENCES timetable(id) ON DELETE CASCADE,
///     student_id TEXT NOT NULL REFERENCES students(id) ON DELETE CASCADE,
///     is_present INTEGER NOT NULL DEFAULT 0,
///     date TEXT,
///     faculty_id TEXT,
///     remark TEXT
/// )
///
/// faculty_id carries no foreign key: marking clients may send placeholder values.
pub fn create_attendance_table() -> String {
    Table::create()
        .table(Attendance::Table)
        .if_not_exists()
        .col(ColumnDef::new(Attendance::Id).string().primary_key())
        .col(ColumnDef::new(Attendance::LectureId).string().not_null())
        .col(ColumnDef::new(Attendance::StudentId).string().not_null())
        .col(
            ColumnDef::new(Attendance::IsPresent)
                .integer()
                .not_null()
                .default(0),
        )
        .col(ColumnDef::new(Attendance::Date).string())
        .col(ColumnDef::new(Attendance::FacultyId).string())
        .col(ColumnDef::new(Attendance::Remark).string())
        .foreign_key(
            ForeignKey::create()
                .from(Attendance::Table, Attendance::LectureId)
                .to(Timetable::Table, Timetable::Id)
                .on_delete(ForeignKeyAction::Cascade),
        )
        .foreign_key(
            ForeignKey::create()
                .from(Attendance::Table, Attendance::StudentId)
                .to(Students::Table, Students::Id)
                .on_delete(ForeignKeyAction::Cascade),
        )
        .to_string(SqliteQueryBuilder)
}

/// CREATE INDEX IF NOT EXISTS idx_attendance_lecture ON attendance(lecture_id)
pub fn create_attendance_lecture_index() -> String {
    Index::create()
        .if_not_exists()
        .name("idx_attendance_lecture")
        .table(Attendance::Table)
        .col(Attendance::LectureId)
        .to_string(SqliteQueryBuilder)
}

/// CREATE INDEX IF NOT EXISTS idx_attendance_student ON attendance(student_id)
pub fn create_attendance_student_index() -> String {
    Index::create()
        .if_not_exists()
        .name("idx_attendance_student")
        .table(Attendance::Table)
        .col(Attendance::StudentId)
        .to_string(SqliteQueryBuilder)
}

/// CREATE INDEX IF NOT EXISTS idx_attendance_date ON attendance(date)
pub fn create_attendance_date_index() -> String {
    Index::create()
        .if_not_exists()
        .name("idx_attendance_date")
        .table(Attendance::Table)
        .col(Attendance::Date)
        .to_string(SqliteQueryBuilder)
}

/// CREATE INDEX IF NOT EXISTS idx_students_department ON students(department)
pub fn create_students_department_index() -> String {
    Index::create()
        .if_not_exists()
        .name("idx_students_department")
        .table(Students::Table)
        .col(Students::Department)
        .to_string(SqliteQueryBuilder)
}

/// All schema statements in dependency order
pub fn all_statements() -> Vec<String> {
    vec![
        create_departments_table(),
        create_subjects_table(),
        create_faculty_table(),
        create_students_table(),
        create_timetable_table(),
        create_attendance_table(),
        create_attendance_lecture_index(),
        create_attendance_student_index(),
        create_attendance_date_index(),
        create_students_department_index(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attendance_table_references_lecture_and_student() {
        let sql = create_attendance_table();
        assert!(sql.contains("CREATE TABLE IF NOT EXISTS \"attendance\""));
        assert!(sql.contains("REFERENCES \"timetable\""));
        assert!(sql.contains("REFERENCES \"students\""));
    }

    #[test]
    fn statements_create_parents_before_children() {
        let statements = all_statements();
        let position = |table: &str| {
            let prefix = format!("CREATE TABLE IF NOT EXISTS \"{}\"", table);
            statements
                .iter()
                .position(|s| s.starts_with(&prefix))
                .unwrap()
        };
        assert!(position("departments") < position("subjects"));
        assert!(position("students") < position("attendance"));
        assert!(position("timetable") < position("attendance"));
    }
}
