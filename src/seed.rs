//! Demo data for a fresh database: two departments, a handful of subjects,
//! faculty, students and lectures, and ten consecutive days of attendance.

use chrono::{Duration, NaiveDate, NaiveTime, TimeZone, Utc};
use log::info;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::db;
use crate::error::AppResult;
use crate::models::{AttendanceRecord, Department, FacultyMember, Lecture, Student, Subject};

/// Counts of what [`seed_demo_data`] wrote
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedSummary {
    pub departments: usize,
    pub subjects: usize,
    pub faculty: usize,
    pub students: usize,
    pub lectures: usize,
    pub attendance: usize,
}

const SCHOOL_DAYS: i64 = 10;

fn departments() -> Vec<Department> {
    [
        ("dep-dce", "Computer Engineering", "DCE"),
        ("dep-dit", "Information Technology", "DIT"),
    ]
    .into_iter()
    .map(|(id, name, abbreviation)| Department {
        id: id.to_string(),
        name: name.to_string(),
        abbreviation: Some(abbreviation.to_string()),
    })
    .collect()
}

fn subjects() -> Vec<Subject> {
    [
        ("sub-cs301", "CS301", "Data Structures", "dep-dce"),
        ("sub-cs302", "CS302", "Operating Systems", "dep-dce"),
        ("sub-it201", "IT201", "Web Technologies", "dep-dit"),
    ]
    .into_iter()
    .map(|(id, code, name, department)| Subject {
        id: id.to_string(),
        code: code.to_string(),
        name: name.to_string(),
        department_id: Some(department.to_string()),
        semester: Some(5),
    })
    .collect()
}

fn faculty() -> Vec<FacultyMember> {
    [
        ("fac-mehta", "Dr. Anil Mehta"),
        ("fac-rao", "Prof. Kavita Rao"),
        ("fac-shah", "Prof. Nirav Shah"),
    ]
    .into_iter()
    .map(|(id, name)| FacultyMember {
        id: id.to_string(),
        name: name.to_string(),
        email: Some(format!("{}@college.example", id.trim_start_matches("fac-"))),
    })
    .collect()
}

fn students() -> Vec<Student> {
    let names = [
        "Aarav Patel",
        "Diya Shah",
        "Ishaan Joshi",
        "Kavya Desai",
        "Rohan Mehta",
        "Sneha Iyer",
        "Vivaan Rao",
        "Anaya Kulkarni",
    ];
    let mut students = Vec::new();
    for (department, counselor) in [("DCE", "Prof. Nirav Shah"), ("DIT", "Prof. Kavita Rao")] {
        for (i, name) in names.iter().enumerate() {
            let roll_no = format!("22{}{:03}", department, i + 1);
            students.push(Student {
                id: format!("stu-{}", roll_no.to_lowercase()),
                guardian_email: Some(format!("guardian.{}@mail.example", roll_no.to_lowercase())),
                roll_no,
                name: Some(name.to_string()),
                department: Some(department.to_string()),
                division: Some(if i < 4 { 1 } else { 2 }),
                batch: Some(format!("A{}", i % 2 + 1)),
                semester: Some(5),
                counselor: Some(counselor.to_string()),
            });
        }
    }
    students
}

fn lectures() -> Vec<Lecture> {
    [
        ("lec-cs301-d1", "sub-cs301", "fac-mehta", "dep-dce", "09:00", "10:00", 1, "lecture"),
        ("lec-cs302-d2", "sub-cs302", "fac-shah", "dep-dce", "10:00", "11:00", 2, "lecture"),
        ("lec-it201-d1", "sub-it201", "fac-rao", "dep-dit", "11:15", "12:15", 1, "lecture"),
        ("lec-it201-d2", "sub-it201", "fac-rao", "dep-dit", "13:00", "15:00", 2, "lab"),
    ]
    .into_iter()
    .map(
        |(id, subject, faculty, department, from, to, division, kind)| Lecture {
            id: id.to_string(),
            subject_id: Some(subject.to_string()),
            faculty_id: Some(faculty.to_string()),
            department_id: Some(department.to_string()),
            time_from: Some(from.to_string()),
            time_to: Some(to.to_string()),
            division: Some(division),
            semester: Some(5),
            batch: None,
            lecture_type: Some(kind.to_string()),
        },
    )
    .collect()
}

/// How often the n-th student of a class misses a session: 50%, 70%, 80% and 100% attendance
const MISS_EVERY: [i64; 4] = [2, 3, 5, SCHOOL_DAYS + 1];

fn attendance(
    students: &[Student],
    lectures: &[Lecture],
    first_day: NaiveDate,
) -> Vec<AttendanceRecord> {
    let mut records = Vec::new();
    for lecture in lectures {
        let department = match lecture.department_id.as_deref() {
            Some("dep-dit") => "DIT",
            _ => "DCE",
        };
        let class: Vec<&Student> = students
            .iter()
            .filter(|s| s.department.as_deref() == Some(department) && s.division == lecture.division)
            .collect();

        for day in 0..SCHOOL_DAYS {
            let start = lecture
                .time_from
                .as_deref()
                .and_then(|t| NaiveTime::parse_from_str(t, "%H:%M").ok())
                .unwrap_or(NaiveTime::MIN);
            let date = Utc.from_utc_datetime(&(first_day + Duration::days(day)).and_time(start));

            for (n, student) in class.iter().enumerate() {
                let every = MISS_EVERY[n % MISS_EVERY.len()];
                records.push(AttendanceRecord {
                    id: Uuid::new_v4().to_string(),
                    lecture_id: lecture.id.clone(),
                    student_id: student.id.clone(),
                    is_present: (day + 1) % every != 0,
                    date: Some(date),
                    faculty_id: lecture.faculty_id.clone(),
                    remark: None,
                });
            }
        }
    }
    records
}

/// Insert the demo data set. Reference rows are idempotent; attendance is always appended.
pub async fn seed_demo_data(pool: &SqlitePool, first_day: NaiveDate) -> AppResult<SeedSummary> {
    let departments = departments();
    let subjects = subjects();
    let faculty = faculty();
    let students = students();
    let lectures = lectures();

    for department in &departments {
        db::insert_department(pool, department).await?;
    }
    for subject in &subjects {
        db::insert_subject(pool, subject).await?;
    }
    for member in &faculty {
        db::insert_faculty(pool, member).await?;
    }
    for student in &students {
        db::upsert_student(pool, student).await?;
    }
    for lecture in &lectures {
        db::insert_lecture(pool, lecture).await?;
    }

    let records = attendance(&students, &lectures, first_day);
    db::insert_attendance_records(pool, &records).await?;

    let summary = SeedSummary {
        departments: departments.len(),
        subjects: subjects.len(),
        faculty: faculty.len(),
        students: students.len(),
        lectures: lectures.len(),
        attendance: records.len(),
    };
    info!("Seeded demo data: {:?}", summary);
    Ok(summary)
}
