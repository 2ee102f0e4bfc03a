//! SQL text builders. Each function renders one statement with sea-query;
//! execution lives in `db.rs`.

pub mod attendance;
pub mod ddl;
pub mod students;
pub mod timetable;
