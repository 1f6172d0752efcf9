//! Row-oriented access to the hosted backend.
//!
//! The studio's catalog lives in six tables on a Supabase project. This crate
//! reads them with plain "select all columns" queries through the PostgREST
//! endpoint ([`RestClient`]), or from in-memory JSON ([`MemorySource`]) for
//! tests and offline snapshots. Both implement [`TableSource`].

mod memory;
mod rest;

use std::fmt;
use std::future::Future;

use serde::de::DeserializeOwned;
use tracing::{info, instrument};
use yanaflow_shared::{RawTables, Result};

pub use memory::MemorySource;
pub use rest::{RestClient, RestOptions};

// ---------------------------------------------------------------------------
// Table
// ---------------------------------------------------------------------------

/// The backend tables the catalog is built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Table {
    Teachers,
    Courses,
    CourseTeacher,
    CourseSchedule,
    Events,
    EventsTeachers,
}

impl Table {
    /// Tables in the order a full fetch requests them.
    pub const FETCH_ORDER: [Table; 6] = [
        Table::Courses,
        Table::Teachers,
        Table::CourseTeacher,
        Table::CourseSchedule,
        Table::Events,
        Table::EventsTeachers,
    ];

    /// Table name as known to the backend.
    pub fn as_str(self) -> &'static str {
        match self {
            Table::Teachers => "teachers",
            Table::Courses => "courses",
            Table::CourseTeacher => "course_teacher",
            Table::CourseSchedule => "course_schedule",
            Table::Events => "events",
            Table::EventsTeachers => "events_teachers",
        }
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// TableSource
// ---------------------------------------------------------------------------

/// Anything that can answer a "select all columns" query on a table.
///
/// An error from the backend must surface as `Err`; an empty or `null`
/// result is `Ok(vec![])`.
pub trait TableSource {
    /// Fetch every row of `table`, decoded as `T`.
    fn select_all<T>(&self, table: Table) -> impl Future<Output = Result<Vec<T>>> + Send
    where
        T: DeserializeOwned + Send;
}

/// Fetch all six tables, one after another.
///
/// The first failing table aborts the whole fetch.
#[instrument(skip_all)]
pub async fn fetch_all_tables<S>(source: &S) -> Result<RawTables>
where
    S: TableSource + Sync,
{
    info!("fetching all tables");

    let courses = source.select_all(Table::Courses).await?;
    let teachers = source.select_all(Table::Teachers).await?;
    let course_teacher = source.select_all(Table::CourseTeacher).await?;
    let course_schedule = source.select_all(Table::CourseSchedule).await?;
    let events = source.select_all(Table::Events).await?;
    let events_teachers = source.select_all(Table::EventsTeachers).await?;

    let tables = RawTables {
        teachers,
        courses,
        course_teacher,
        course_schedule,
        events,
        events_teachers,
    };

    info!(
        teachers = tables.teachers.len(),
        courses = tables.courses.len(),
        course_teacher = tables.course_teacher.len(),
        course_schedule = tables.course_schedule.len(),
        events = tables.events.len(),
        events_teachers = tables.events_teachers.len(),
        "all tables fetched"
    );

    Ok(tables)
}
