//! Choices offered by the dashboard's filter dropdowns, derived from the
//! student list and the timetable.

use std::collections::{BTreeMap, BTreeSet, HashSet};

use sqlx::SqlitePool;

use crate::constants::UNKNOWN_DEPARTMENT;
use crate::db;
use crate::departments::to_abbreviation;
use crate::error::{AppError, AppResult};
use crate::models::{
    DepartmentOption, FacultyOption, FilterOptions, Student, SubjectOption, TimetableEntry,
};

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

fn departments(students: &[Student]) -> Vec<DepartmentOption> {
    let names: BTreeSet<&str> = students
        .iter()
        .filter_map(|s| non_empty(s.department.as_deref()))
        .collect();
    names
        .into_iter()
        .map(|name| DepartmentOption {
            id: name.to_string(),
            name: name.to_string(),
            abbreviation: to_abbreviation(name).to_string(),
        })
        .collect()
}

/// First lecture seen for a subject code wins; its semester falls back to the subject's
fn subjects(timetable: &[TimetableEntry]) -> Vec<SubjectOption> {
    let mut seen = HashSet::new();
    let mut subjects: Vec<SubjectOption> = timetable
        .iter()
        .filter_map(|entry| {
            let code = non_empty(entry.subject_code.as_deref())?;
            seen.insert(code).then(|| SubjectOption {
                id: entry.lecture.subject_id.clone(),
                code: code.to_string(),
                name: entry.subject_name.clone().unwrap_or_default(),
                department: entry.department_name.clone(),
                semester: entry.lecture.semester.or(entry.subject_semester),
            })
        })
        .collect();
    subjects.sort_by(|a, b| a.name.cmp(&b.name));
    subjects
}

fn faculty(timetable: &[TimetableEntry]) -> Vec<FacultyOption> {
    let mut seen = HashSet::new();
    let mut faculty: Vec<FacultyOption> = timetable
        .iter()
        .filter_map(|entry| {
            let id = non_empty(entry.lecture.faculty_id.as_deref())?;
            seen.insert(id).then(|| FacultyOption {
                id: id.to_string(),
                name: entry.faculty_name.clone().unwrap_or_default(),
                email: entry.faculty_email.clone().unwrap_or_default(),
            })
        })
        .collect();
    faculty.sort_by(|a, b| a.name.cmp(&b.name));
    faculty
}

/// "{first} to {last}" per department, after a plain string sort of roll numbers
fn roll_number_ranges(students: &[Student]) -> BTreeMap<String, String> {
    let mut grouped: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
    for student in students {
        let department = non_empty(student.department.as_deref()).unwrap_or(UNKNOWN_DEPARTMENT);
        grouped
            .entry(department)
            .or_default()
            .push(student.roll_no.as_str());
    }

    grouped
        .into_iter()
        .filter_map(|(department, mut rolls)| {
            rolls.sort_unstable();
            let first = rolls.first()?;
            let last = rolls.last()?;
            Some((department.to_string(), format!("{} to {}", first, last)))
        })
        .collect()
}

/// Derive every dashboard filter choice from the current students and timetable
pub fn compute_filter_options(
    students: &[Student],
    timetable: &[TimetableEntry],
) -> FilterOptions {
    let divisions: BTreeSet<i64> = students
        .iter()
        .filter_map(|s| s.division)
        .filter(|d| *d != 0)
        .collect();
    let batches: BTreeSet<&str> = students
        .iter()
        .filter_map(|s| non_empty(s.batch.as_deref()))
        .collect();
    let semesters: BTreeSet<i64> = students
        .iter()
        .filter_map(|s| s.semester)
        .filter(|s| *s != 0)
        .collect();

    FilterOptions {
        departments: departments(students),
        subjects: subjects(timetable),
        faculty: faculty(timetable),
        divisions: divisions.into_iter().collect(),
        batches: batches.into_iter().map(str::to_string).collect(),
        semesters: semesters.into_iter().collect(),
        student_id_ranges: roll_number_ranges(students),
    }
}

/// Read students and timetable concurrently; either failing fails the whole call
pub async fn load_filter_options(pool: &SqlitePool) -> AppResult<FilterOptions> {
    let (students, timetable) =
        tokio::try_join!(db::fetch_students(pool), db::fetch_timetable(pool))
            .map_err(AppError::into_unavailable)?;
    Ok(compute_filter_options(&students, &timetable))
}
