//! The class list a faculty member marks attendance against: one division or
//! department in a semester, narrowed to a batch for labs.

use serde::Deserialize;
use sqlx::SqlitePool;

use crate::constants::{UNASSIGNED_COUNSELOR, UNNAMED_ROSTER_STUDENT};
use crate::db;
use crate::departments::to_abbreviation;
use crate::error::{AppError, AppResult};
use crate::models::{RosterEntry, Student};

/// Raw `GET /students` query parameters
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RosterQuery {
    pub division: Option<String>,
    pub sem: Option<String>,
    pub batch: Option<String>,
    /// "lecture" or "lab"
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub department: Option<String>,
}

/// Validated roster selection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RosterSelection {
    pub semester: i64,
    pub division: Option<i64>,
    /// Stored abbreviation
    pub department: Option<String>,
    /// Only set for labs
    pub batch: Option<String>,
}

fn given(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

impl RosterQuery {
    pub fn to_selection(&self) -> AppResult<RosterSelection> {
        let sem = given(&self.sem);
        let division = given(&self.division);
        let department = given(&self.department);

        let sem = match (sem, division, department) {
            (Some(sem), Some(_), _) | (Some(sem), None, Some(_)) => sem,
            _ => {
                return Err(AppError::validation(
                    "Semester and either division or department are required",
                ))
            }
        };

        let invalid = || AppError::validation("Division and semester must be valid numbers");
        let semester = sem.parse::<i64>().map_err(|_| invalid())?;
        let division = division
            .map(|d| d.parse::<i64>().map_err(|_| invalid()))
            .transpose()?;

        let batch = match given(&self.kind) {
            Some("lab") => given(&self.batch).map(str::to_string),
            _ => None,
        };

        Ok(RosterSelection {
            semester,
            division,
            department: department.map(|d| to_abbreviation(d).to_string()),
            batch,
        })
    }
}

/// Every student starts marked present
pub fn to_roster_entry(student: Student, photo: &str) -> RosterEntry {
    let roll_no = if student.roll_no.trim().is_empty() {
        student.id.clone()
    } else {
        student.roll_no
    };
    RosterEntry {
        id: student.id,
        roll_no,
        name: student.name.unwrap_or_else(|| UNNAMED_ROSTER_STUDENT.to_string()),
        photo: photo.to_string(),
        counselor_name: student
            .counselor
            .unwrap_or_else(|| UNASSIGNED_COUNSELOR.to_string()),
        present: true,
        division: student.division,
        batch: student.batch,
        semester: student.semester,
        department: student.department,
    }
}

pub async fn load_roster(
    pool: &SqlitePool,
    selection: &RosterSelection,
    photo: &str,
) -> AppResult<Vec<RosterEntry>> {
    let students = db::fetch_roster_students(
        pool,
        selection.semester,
        selection.division,
        selection.department.as_deref(),
        selection.batch.as_deref(),
    )
    .await?;
    Ok(students
        .into_iter()
        .map(|student| to_roster_entry(student, photo))
        .collect())
}
