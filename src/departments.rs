//! Fixed translation between full department names and the abbreviations
//! stored on student rows. Unmapped values pass through unchanged.

const DEPARTMENT_MAPPING: &[(&str, &str)] = &[
    ("Computer Engineering", "DCE"),
    ("Computer Science and Engineering", "DCSE"),
    ("Information Technology", "DIT"),
    ("Artificial Intelligence and Machine Learning", "AI-ML"),
    ("Civil Engineering", "CE"),
    ("Mechanical Engineering", "ME"),
    ("Electrical Engineering", "EE"),
    ("Electronics and Communication Engineering", "ECE"),
];

/// "Computer Engineering" -> "DCE"
pub fn to_abbreviation(name: &str) -> &str {
    DEPARTMENT_MAPPING
        .iter()
        .find(|(full, _)| *full == name)
        .map(|(_, abbrev)| *abbrev)
        .unwrap_or(name)
}

/// "DCE" -> "Computer Engineering"
pub fn to_full_name(abbreviation: &str) -> &str {
    DEPARTMENT_MAPPING
        .iter()
        .find(|(_, abbrev)| *abbrev == abbreviation)
        .map(|(full, _)| *full)
        .unwrap_or(abbreviation)
}
