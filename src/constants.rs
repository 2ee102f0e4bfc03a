/// Dashboard selections that mean "no filter"
pub const ALL_DEPARTMENTS: &str = "All Departments";
pub const ALL_SUBJECTS: &str = "All Subjects";
pub const ALL_TEACHERS: &str = "All Teachers";
pub const ALL_COUNSELORS: &str = "All Counselors";
pub const ALL_STUDENTS: &str = "All Students";

/// Percentage thresholds, checked from the top down
pub const EXCELLENT_THRESHOLD: u32 = 85;
pub const GOOD_THRESHOLD: u32 = 75;
pub const WARNING_THRESHOLD: u32 = 65;

/// How many of a student's rows are echoed back as recent attendance
pub const RECENT_ATTENDANCE_LIMIT: usize = 10;

pub const DEFAULT_PHOTO: &str = "/student1.png";
pub const UNKNOWN_STUDENT_NAME: &str = "Unknown Student";
/// Roster name for a student without one
pub const UNNAMED_ROSTER_STUDENT: &str = "Unknown";
pub const UNASSIGNED_COUNSELOR: &str = "Not Assigned";

/// Key used in roll-number ranges for students without a department
pub const UNKNOWN_DEPARTMENT: &str = "Unknown";

/// Drop the "All ..." sentinel and blank selections
pub fn selection(value: Option<&str>, sentinel: &str) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty() && *v != sentinel)
        .map(str::to_string)
}
