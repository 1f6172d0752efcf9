//! Core domain types: raw backend rows and the enriched catalog model.
//!
//! Rows mirror the backend tables column for column. The enriched types carry
//! the derived `path`, normalized equipment and resolved relations; they are
//! what the session store hands to the presentation layer.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

/// Primary key type shared by every table.
pub type RowId = i64;

// ---------------------------------------------------------------------------
// Raw rows
// ---------------------------------------------------------------------------

/// Equipment column as stored: either a text array or one comma-joined string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawEquipment {
    List(Vec<String>),
    Joined(String),
}

/// A row of the `teachers` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeacherRow {
    pub id: RowId,
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub origin_country: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub insta_tag: Option<String>,
    #[serde(default)]
    pub quote: Option<String>,
    #[serde(default)]
    pub featured_in: Option<Vec<String>>,
}

/// A row of the `courses` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CourseRow {
    pub id: RowId,
    pub title: String,
    #[serde(default)]
    pub short_description: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub level: Option<String>,
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub end_date: Option<String>,
    #[serde(default)]
    pub trending: Option<bool>,
    #[serde(default)]
    pub equipment: Option<RawEquipment>,
    #[serde(default)]
    pub focus: Option<String>,
    #[serde(default)]
    pub style: Option<String>,
}

/// A row of the `course_schedule` table. Kept as-is in the enriched model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseSchedule {
    pub id: RowId,
    pub course_id: RowId,
    #[serde(default)]
    pub weekday: Option<String>,
    /// Wall-clock time with offset suffix, e.g. `09:00:00+00`.
    #[serde(default)]
    pub start_time: Option<String>,
    #[serde(default)]
    pub end_time: Option<String>,
}

/// A row of the `events` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventRow {
    pub id: RowId,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub short_description: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub starts_at: Option<String>,
    #[serde(default)]
    pub ends_at: Option<String>,
    #[serde(default)]
    pub style: Option<String>,
    #[serde(default)]
    pub focus: Option<String>,
    #[serde(default)]
    pub equipment: Option<RawEquipment>,
    #[serde(default)]
    pub most_liked: Option<bool>,
}

/// A row of the `course_teacher` link table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseTeacher {
    pub course_id: RowId,
    pub teacher_id: RowId,
}

/// A row of the `events_teachers` link table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventTeacher {
    pub event_id: RowId,
    pub teacher_id: RowId,
}

/// All six tables, as fetched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawTables {
    pub teachers: Vec<TeacherRow>,
    pub courses: Vec<CourseRow>,
    pub course_teacher: Vec<CourseTeacher>,
    pub course_schedule: Vec<CourseSchedule>,
    pub events: Vec<EventRow>,
    pub events_teachers: Vec<EventTeacher>,
}

// ---------------------------------------------------------------------------
// Enriched model
// ---------------------------------------------------------------------------

/// Unit of [`Course::course_duration`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DurationUnit {
    Days,
    Weeks,
}

/// A teacher with its URL path and, at the top level of the catalog, its
/// resolved courses/events and filled-in profile copy.
///
/// Teachers nested inside a course or event are base entries: pathed, with
/// the profile fields exactly as stored and no relations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Teacher {
    pub id: RowId,
    pub first_name: String,
    pub last_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin_country: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub insta_tag: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quote: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub featured_in: Option<Vec<String>>,
    /// URL slug, `first-last`.
    pub path: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub courses: Vec<Course>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub events: Vec<Event>,
}

/// A course with its path, normalized equipment, computed duration and
/// resolved teachers/schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Course {
    pub id: RowId,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub short_description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trending: Option<bool>,
    #[serde(default)]
    pub equipment: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub focus: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<String>,
    /// URL slug of the title.
    pub path: String,
    #[serde(
        rename = "courseDuration",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub course_duration: Option<u32>,
    #[serde(
        rename = "courseDurationUnit",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub course_duration_unit: Option<DurationUnit>,
    /// Length of a single class in minutes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class_length: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class_length_formatted: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub teachers: Vec<Teacher>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub schedule: Vec<CourseSchedule>,
}

/// An event with its path, normalized equipment and resolved teachers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: RowId,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub short_description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub starts_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ends_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub focus: Option<String>,
    #[serde(default)]
    pub equipment: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub most_liked: Option<bool>,
    /// URL slug of the title.
    pub path: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub teachers: Vec<Teacher>,
}

impl Event {
    /// Parsed `starts_at`, if present and well-formed.
    pub fn start_time(&self) -> Option<DateTime<Utc>> {
        self.starts_at.as_deref().and_then(parse_timestamp)
    }
}

/// The three enriched collections produced by one join.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    pub teachers: Vec<Teacher>,
    pub courses: Vec<Course>,
    pub events: Vec<Event>,
}

// ---------------------------------------------------------------------------
// Value parsing
// ---------------------------------------------------------------------------

/// Parse a backend timestamp.
///
/// Accepts RFC 3339, Postgres `timestamptz` text (`2024-05-01 10:00:00+00`),
/// and zone-less timestamps, which are read as UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    for fmt in ["%Y-%m-%d %H:%M:%S%.f%#z", "%Y-%m-%dT%H:%M:%S%.f%#z"] {
        if let Ok(ts) = DateTime::parse_from_str(raw, fmt) {
            return Some(ts.with_timezone(&Utc));
        }
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(ts) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(ts.and_utc());
        }
    }
    None
}

/// Parse a calendar date (`YYYY-MM-DD`), also accepting a full timestamp.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .or_else(|| parse_timestamp(raw).map(|ts| ts.date_naive()))
}
