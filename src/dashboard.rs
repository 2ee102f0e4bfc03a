//! Selection state of the attendance dashboard.
//!
//! [`DashboardFilters`] is an immutable value; every transition returns a new
//! one. [`FetchGate`] remembers the last query actually sent so that a
//! transition that does not change the query does not cause a re-fetch.

use chrono::NaiveDate;

use crate::constants::{ALL_COUNSELORS, ALL_DEPARTMENTS, ALL_STUDENTS, ALL_SUBJECTS, ALL_TEACHERS};
use crate::departments::to_full_name;
use crate::models::FilterOptions;

/// Query parameter pairs for `GET /attendance-monitor`
pub type MonitorQueryPairs = Vec<(&'static str, String)>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardFilters {
    pub department: String,
    pub subject: String,
    pub teacher: String,
    pub counselor: String,
    pub id_range: String,
    /// DD/MM/YYYY; empty means every day
    pub date: String,
}

impl Default for DashboardFilters {
    fn default() -> Self {
        Self {
            department: ALL_DEPARTMENTS.to_string(),
            subject: ALL_SUBJECTS.to_string(),
            teacher: ALL_TEACHERS.to_string(),
            counselor: ALL_COUNSELORS.to_string(),
            id_range: ALL_STUDENTS.to_string(),
            date: String::new(),
        }
    }
}

impl DashboardFilters {
    /// Initial state: everything unfiltered except the day, which starts at `today`
    pub fn for_day(today: NaiveDate) -> Self {
        Self {
            date: today.format("%d/%m/%Y").to_string(),
            ..Self::default()
        }
    }

    /// Switch department; a selected subject that does not belong to it is cleared.
    ///
    /// Until filter options have loaded the subject is kept as-is.
    pub fn with_department(&self, department: &str, options: Option<&FilterOptions>) -> Self {
        let mut next = Self {
            department: department.to_string(),
            ..self.clone()
        };

        if let Some(options) = options {
            if department != ALL_DEPARTMENTS && next.subject != ALL_SUBJECTS {
                let full_name = to_full_name(department);
                let belongs = options.subjects.iter().any(|subject| {
                    subject.code == next.subject
                        && subject
                            .department
                            .as_deref()
                            .is_some_and(|d| d == department || d == full_name)
                });
                if !belongs {
                    next.subject = ALL_SUBJECTS.to_string();
                }
            }
        }
        next
    }

    pub fn with_subject(&self, subject: &str) -> Self {
        Self {
            subject: subject.to_string(),
            ..self.clone()
        }
    }

    pub fn with_teacher(&self, teacher: &str) -> Self {
        Self {
            teacher: teacher.to_string(),
            ..self.clone()
        }
    }

    pub fn with_counselor(&self, counselor: &str) -> Self {
        Self {
            counselor: counselor.to_string(),
            ..self.clone()
        }
    }

    pub fn with_id_range(&self, id_range: &str) -> Self {
        Self {
            id_range: id_range.to_string(),
            ..self.clone()
        }
    }

    pub fn with_date(&self, date: &str) -> Self {
        Self {
            date: date.trim().to_string(),
            ..self.clone()
        }
    }

    /// Query parameters in a fixed order, sentinels and empty values left out
    pub fn to_query(&self) -> MonitorQueryPairs {
        let selections = [
            ("department", &self.department, ALL_DEPARTMENTS),
            ("subject", &self.subject, ALL_SUBJECTS),
            ("teacher", &self.teacher, ALL_TEACHERS),
            ("counselor", &self.counselor, ALL_COUNSELORS),
            ("idRange", &self.id_range, ALL_STUDENTS),
            ("date", &self.date, ""),
        ];
        selections
            .into_iter()
            .filter(|(_, value, sentinel)| !value.is_empty() && value.as_str() != *sentinel)
            .map(|(key, value, _)| (key, value.clone()))
            .collect()
    }
}

/// Tracks the last query sent to the monitor endpoint
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FetchGate {
    last_sent: Option<MonitorQueryPairs>,
}

impl FetchGate {
    pub fn needs_fetch(&self, filters: &DashboardFilters) -> bool {
        self.last_sent.as_ref() != Some(&filters.to_query())
    }

    /// Gate state after the query for `filters` has been sent
    pub fn sent(&self, filters: &DashboardFilters) -> Self {
        Self {
            last_sent: Some(filters.to_query()),
        }
    }

    /// Forget the last query so the next check always fetches (manual refresh)
    pub fn reset(&self) -> Self {
        Self::default()
    }
}
