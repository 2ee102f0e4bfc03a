use sea_query::{Expr, OnConflict, Order, Query, SelectStatement, SqliteQueryBuilder};

use crate::models::Student;
use crate::schema::Students;

fn select_columns() -> SelectStatement {
    Query::select()
        .columns([
            Students::Id,
            Students::RollNo,
            Students::Name,
            Students::GuardianEmail,
            Students::Department,
            Students::Division,
            Students::Batch,
            Students::Semester,
            Students::Counselor,
        ])
        .from(Students::Table)
        .to_owned()
}

/// SELECT ... FROM students ORDER BY roll_no
pub fn select_all() -> String {
    select_columns()
        .order_by(Students::RollNo, Order::Asc)
        .to_string(SqliteQueryBuilder)
}

/// SELECT ... FROM students WHERE department = ? ORDER BY roll_no
pub fn select_by_department(department: &str) -> String {
    select_columns()
        .and_where(Expr::col(Students::Department).eq(department))
        .order_by(Students::RollNo, Order::Asc)
        .to_string(SqliteQueryBuilder)
}

/// Students for an attendance-marking roster.
///
/// SELECT ... FROM students WHERE semester = ?
///   [AND division = ?] [AND department = ?] [AND batch = ?]
/// ORDER BY roll_no
pub fn select_roster(
    semester: i64,
    division: Option<i64>,
    department: Option<&str>,
    batch: Option<&str>,
) -> String {
    let mut query = select_columns();
    query.and_where(Expr::col(Students::Semester).eq(semester));
    if let Some(division) = division {
        query.and_where(Expr::col(Students::Division).eq(division));
    }
    if let Some(department) = department {
        query.and_where(Expr::col(Students::Department).eq(department));
    }
    if let Some(batch) = batch {
        query.and_where(Expr::col(Students::Batch).eq(batch));
    }
    query
        .order_by(Students::RollNo, Order::Asc)
        .to_string(SqliteQueryBuilder)
}

/// INSERT INTO students (...) VALUES (...) ON CONFLICT (id) DO UPDATE SET ...
pub fn upsert(student: &Student) -> String {
    Query::insert()
        .into_table(Students::Table)
        .columns([
            Students::Id,
            Students::RollNo,
            Students::Name,
            Students::GuardianEmail,
            Students::Department,
            Students::Division,
            Students::Batch,
            Students::Semester,
            Students::Counselor,
        ])
        .values_panic([
            student.id.clone().into(),
            student.roll_no.clone().into(),
            student.name.clone().into(),
            student.guardian_email.clone().into(),
            student.department.clone().into(),
            student.division.into(),
            student.batch.clone().into(),
            student.semester.into(),
            student.counselor.clone().into(),
        ])
        .on_conflict(
            OnConflict::column(Students::Id)
                .update_columns([
                    Students::RollNo,
                    Students::Name,
                    Students::GuardianEmail,
                    Students::Department,
                    Students::Division,
                    Students::Batch,
                    Students::Semester,
                    Students::Counselor,
                ])
                .to_owned(),
        )
        .to_string(SqliteQueryBuilder)
}
