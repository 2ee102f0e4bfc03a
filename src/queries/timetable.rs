use sea_query::{Alias, Expr, OnConflict, Order, Query, SqliteQueryBuilder};

use crate::models::{Department, FacultyMember, Lecture, Subject};
use crate::schema::{Departments, Faculty, Subjects, Timetable};

/// SELECT timetable.*, subjects.code AS subject_code, subjects.name AS subject_name,
///        subjects.semester AS subject_semester, departments.name AS department_name,
///        faculty.name AS faculty_name, faculty.email AS faculty_email
/// FROM timetable
/// LEFT JOIN subjects ON subjects.id = timetable.subject_id
/// LEFT JOIN departments ON departments.id = timetable.department_id
/// LEFT JOIN faculty ON faculty.id = timetable.faculty_id
/// ORDER BY timetable.id
pub fn select_all_enriched() -> String {
    Query::select()
        .columns([
            (Timetable::Table, Timetable::Id),
            (Timetable::Table, Timetable::SubjectId),
            (Timetable::Table, Timetable::FacultyId),
            (Timetable::Table, Timetable::DepartmentId),
            (Timetable::Table, Timetable::TimeFrom),
            (Timetable::Table, Timetable::TimeTo),
            (Timetable::Table, Timetable::Division),
            (Timetable::Table, Timetable::Semester),
            (Timetable::Table, Timetable::Batch),
            (Timetable::Table, Timetable::LectureType),
        ])
        .expr_as(
            Expr::col((Subjects::Table, Subjects::Code)),
            Alias::new("subject_code"),
        )
        .expr_as(
            Expr::col((Subjects::Table, Subjects::Name)),
            Alias::new("subject_name"),
        )
        .expr_as(
            Expr::col((Subjects::Table, Subjects::Semester)),
            Alias::new("subject_semester"),
        )
        .expr_as(
            Expr::col((Departments::Table, Departments::Name)),
            Alias::new("department_name"),
        )
        .expr_as(
            Expr::col((Faculty::Table, Faculty::Name)),
            Alias::new("faculty_name"),
        )
        .expr_as(
            Expr::col((Faculty::Table, Faculty::Email)),
            Alias::new("faculty_email"),
        )
        .from(Timetable::Table)
        .left_join(
            Subjects::Table,
            Expr::col((Subjects::Table, Subjects::Id))
                .equals((Timetable::Table, Timetable::SubjectId)),
        )
        .left_join(
            Departments::Table,
            Expr::col((Departments::Table, Departments::Id))
                .equals((Timetable::Table, Timetable::DepartmentId)),
        )
        .left_join(
            Faculty::Table,
            Expr::col((Faculty::Table, Faculty::Id))
                .equals((Timetable::Table, Timetable::FacultyId)),
        )
        .order_by((Timetable::Table, Timetable::Id), Order::Asc)
        .to_string(SqliteQueryBuilder)
}

/// INSERT INTO timetable (...) VALUES (...) ON CONFLICT (id) DO NOTHING
pub fn insert_lecture(lecture: &Lecture) -> String {
    Query::insert()
        .into_table(Timetable::Table)
        .columns([
            Timetable::Id,
            Timetable::SubjectId,
            Timetable::FacultyId,
            Timetable::DepartmentId,
            Timetable::TimeFrom,
            Timetable::TimeTo,
            Timetable::Division,
            Timetable::Semester,
            Timetable::Batch,
            Timetable::LectureType,
        ])
        .values_panic([
            lecture.id.clone().into(),
            lecture.subject_id.clone().into(),
            lecture.faculty_id.clone().into(),
            lecture.department_id.clone().into(),
            lecture.time_from.clone().into(),
            lecture.time_to.clone().into(),
            lecture.division.into(),
            lecture.semester.into(),
            lecture.batch.clone().into(),
            lecture.lecture_type.clone().into(),
        ])
        .on_conflict(OnConflict::column(Timetable::Id).do_nothing().to_owned())
        .to_string(SqliteQueryBuilder)
}

/// INSERT INTO departments (id, name, abbreviation) VALUES (...) ON CONFLICT (id) DO NOTHING
pub fn insert_department(department: &Department) -> String {
    Query::insert()
        .into_table(Departments::Table)
        .columns([Departments::Id, Departments::Name, Departments::Abbreviation])
        .values_panic([
            department.id.clone().into(),
            department.name.clone().into(),
            department.abbreviation.clone().into(),
        ])
        .on_conflict(OnConflict::column(Departments::Id).do_nothing().to_owned())
        .to_string(SqliteQueryBuilder)
}

/// INSERT INTO subjects (id, code, name, department_id, semester) VALUES (...) ON CONFLICT (id) DO NOTHING
pub fn insert_subject(subject: &Subject) -> String {
    Query::insert()
        .into_table(Subjects::Table)
        .columns([
            Subjects::Id,
            Subjects::Code,
            Subjects::Name,
            Subjects::DepartmentId,
            Subjects::Semester,
        ])
        .values_panic([
            subject.id.clone().into(),
            subject.code.clone().into(),
            subject.name.clone().into(),
            subject.department_id.clone().into(),
            subject.semester.into(),
        ])
        .on_conflict(OnConflict::column(Subjects::Id).do_nothing().to_owned())
        .to_string(SqliteQueryBuilder)
}

/// INSERT INTO faculty (id, name, email) VALUES (...) ON CONFLICT (id) DO NOTHING
pub fn insert_faculty(member: &FacultyMember) -> String {
    Query::insert()
        .into_table(Faculty::Table)
        .columns([Faculty::Id, Faculty::Name, Faculty::Email])
        .values_panic([
            member.id.clone().into(),
            member.name.clone().into(),
            member.email.clone().into(),
        ])
        .on_conflict(OnConflict::column(Faculty::Id).do_nothing().to_owned())
        .to_string(SqliteQueryBuilder)
}
