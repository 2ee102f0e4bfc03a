use sea_query::Iden;

/// Departments table - lookup for subject ownership and display names
#[derive(Iden)]
pub enum Departments {
    Table,
    Id,
    Name,
    Abbreviation,
}

/// Subjects table - taught subjects, tagged with department and semester
#[derive(Iden)]
pub enum Subjects {
    Table,
    Id,
    Code,
    Name,
    DepartmentId,
    Semester,
}

/// Faculty table - teaching staff
#[derive(Iden)]
pub enum Faculty {
    Table,
    Id,
    Name,
    Email,
}

/// Students table - student registry (department stored as abbreviation)
#[derive(Iden)]
pub enum Students {
    Table,
    Id,
    RollNo,
    Name,
    GuardianEmail,
    Department,
    Division,
    Batch,
    Semester,
    Counselor,
}

/// Timetable table - one row per scheduled lecture/lab
#[derive(Iden)]
pub enum Timetable {
    Table,
    Id,
    SubjectId,
    FacultyId,
    DepartmentId,
    TimeFrom,
    TimeTo,
    Division,
    Semester,
    Batch,
    LectureType,
}

/// Attendance table - one row per student per lecture session
#[derive(Iden)]
pub enum Attendance {
    Table,
    Id,
    LectureId,
    StudentId,
    IsPresent,
    Date,
    FacultyId,
    Remark,
}
