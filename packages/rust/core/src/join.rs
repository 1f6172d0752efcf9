//! Relation joiner: flat backend rows → the enriched catalog.
//!
//! The steps run in a fixed order because later ones read fields written by
//! earlier ones (paths before relations, course relations before the teacher
//! bio that lists course titles).

use std::collections::HashMap;

use rand::Rng;
use tracing::{debug, instrument};

use yanaflow_shared::{
    Catalog, Course, CourseRow, Event, EventRow, RawTables, RowId, Teacher, TeacherRow,
};

use crate::derive::{
    apply_course_timing, fill_teacher_profile, normalize_equipment, placeholder_cover_image,
    tidy_equipment,
};
use crate::slug::{slugify, teacher_path};

/// Knobs for [`build_catalog`].
#[derive(Debug, Clone, Default)]
pub struct JoinOptions {
    /// Give courses and events without an `image_url` a random cover.
    pub fill_cover_images: bool,
}

/// Join the six tables into teachers, courses and events.
///
/// Dangling relation rows are dropped. `rng` only feeds decorative
/// placeholders; with a seeded generator the output is fully reproducible.
#[instrument(skip_all, fields(
    teachers = tables.teachers.len(),
    courses = tables.courses.len(),
    events = tables.events.len(),
))]
pub fn build_catalog<R: Rng>(tables: RawTables, opts: &JoinOptions, rng: &mut R) -> Catalog {
    let RawTables {
        mut teachers,
        mut courses,
        course_teacher,
        course_schedule,
        events,
        events_teachers,
    } = tables;

    // --- Step 1: sort base rows ---
    teachers.sort_by_key(|t| t.id);
    courses.sort_by_key(|c| c.id);

    // --- Steps 2-3: paths and equipment ---
    let teachers: Vec<Teacher> = teachers.into_iter().map(base_teacher).collect();
    let mut courses: Vec<Course> = courses.into_iter().map(base_course).collect();
    let mut events: Vec<Event> = events.into_iter().map(base_event).collect();
    sort_chronologically(&mut events);

    if opts.fill_cover_images {
        for course in courses.iter_mut().filter(|c| c.image_url.is_none()) {
            course.image_url = Some(placeholder_cover_image(rng));
        }
        for event in events.iter_mut().filter(|e| e.image_url.is_none()) {
            event.image_url = Some(placeholder_cover_image(rng));
        }
    }

    let teacher_index = index_by_id(&teachers, |t| t.id);
    let course_index = index_by_id(&courses, |c| c.id);
    let event_index = index_by_id(&events, |e| e.id);

    // --- Steps 4-5: teachers with their courses, events and profile copy ---
    let mut dropped = 0usize;
    let enriched_teachers: Vec<Teacher> = teachers
        .iter()
        .map(|base| {
            let mut teacher = base.clone();

            teacher.courses = course_teacher
                .iter()
                .filter(|link| link.teacher_id == base.id)
                .filter_map(|link| {
                    let found = course_index.get(&link.course_id).map(|c| (*c).clone());
                    dropped += usize::from(found.is_none());
                    found
                })
                .collect();

            teacher.events = events_teachers
                .iter()
                .filter(|link| link.teacher_id == base.id)
                .filter_map(|link| {
                    let found = event_index.get(&link.event_id).map(|e| (*e).clone());
                    dropped += usize::from(found.is_none());
                    found
                })
                .collect();
            sort_chronologically(&mut teacher.events);

            fill_teacher_profile(&mut teacher, rng);
            teacher
        })
        .collect();

    // --- Steps 6-7: courses with teachers, schedule and timing ---
    let enriched_courses: Vec<Course> = courses
        .iter()
        .map(|base| {
            let mut course = base.clone();

            course.teachers = course_teacher
                .iter()
                .filter(|link| link.course_id == base.id)
                .filter_map(|link| {
                    let found = teacher_index.get(&link.teacher_id).map(|t| (*t).clone());
                    dropped += usize::from(found.is_none());
                    found
                })
                .collect();

            course.schedule = course_schedule
                .iter()
                .filter(|slot| slot.course_id == base.id)
                .cloned()
                .collect();

            apply_course_timing(&mut course);
            course
        })
        .collect();

    // --- Step 8: events with teachers ---
    let enriched_events: Vec<Event> = events
        .iter()
        .map(|base| {
            let mut event = base.clone();

            event.teachers = events_teachers
                .iter()
                .filter(|link| link.event_id == base.id)
                .filter_map(|link| {
                    let found = teacher_index.get(&link.teacher_id).map(|t| (*t).clone());
                    dropped += usize::from(found.is_none());
                    found
                })
                .collect();

            event.equipment = tidy_equipment(std::mem::take(&mut event.equipment));
            event
        })
        .collect();

    if dropped > 0 {
        debug!(dropped, "ignored relation rows pointing at missing records");
    }

    Catalog {
        teachers: enriched_teachers,
        courses: enriched_courses,
        events: enriched_events,
    }
}

// ---------------------------------------------------------------------------
// Ordering
// ---------------------------------------------------------------------------

/// Order events by start time, comparing by id whenever either side has no
/// (parseable) start time.
///
/// Timed events are ordered by `(start, id)` and untimed ones by id; each
/// untimed event is then slotted in front of the first timed event with a
/// larger id. The result is a total order that agrees with the id fallback
/// for every timed/untimed pair it can.
pub fn sort_chronologically(events: &mut Vec<Event>) {
    let (mut timed, mut untimed): (Vec<_>, Vec<_>) = std::mem::take(events)
        .into_iter()
        .map(|event| (event.start_time(), event))
        .partition(|(start, _)| start.is_some());

    timed.sort_by_key(|(start, event)| (*start, event.id));
    untimed.sort_by_key(|(_, event)| event.id);

    let mut untimed = untimed.into_iter().map(|(_, event)| event).peekable();
    for (_, event) in timed {
        while let Some(earlier) = untimed.next_if(|u| u.id < event.id) {
            events.push(earlier);
        }
        events.push(event);
    }
    events.extend(untimed);
}

// ---------------------------------------------------------------------------
// Base records
// ---------------------------------------------------------------------------

fn base_teacher(row: TeacherRow) -> Teacher {
    Teacher {
        path: teacher_path(&row.first_name, &row.last_name),
        id: row.id,
        first_name: row.first_name,
        last_name: row.last_name,
        origin_country: row.origin_country,
        image_url: row.image_url,
        bio: row.bio,
        insta_tag: row.insta_tag,
        quote: row.quote,
        featured_in: row.featured_in,
        courses: Vec::new(),
        events: Vec::new(),
    }
}

fn base_course(row: CourseRow) -> Course {
    Course {
        path: slugify(&row.title),
        id: row.id,
        title: row.title,
        short_description: row.short_description,
        description: row.description,
        image_url: row.image_url,
        level: row.level,
        start_date: row.start_date,
        end_date: row.end_date,
        trending: row.trending,
        equipment: normalize_equipment(row.equipment),
        focus: row.focus,
        style: row.style,
        course_duration: None,
        course_duration_unit: None,
        class_length: None,
        class_length_formatted: None,
        teachers: Vec::new(),
        schedule: Vec::new(),
    }
}

fn base_event(row: EventRow) -> Event {
    Event {
        path: slugify(&row.title),
        id: row.id,
        title: row.title,
        description: row.description,
        short_description: row.short_description,
        date: row.date,
        location: row.location,
        image_url: row.image_url,
        starts_at: row.starts_at,
        ends_at: row.ends_at,
        style: row.style,
        focus: row.focus,
        equipment: normalize_equipment(row.equipment),
        most_liked: row.most_liked,
        teachers: Vec::new(),
    }
}

/// Id lookup; the first record wins when ids repeat.
fn index_by_id<T>(items: &[T], id: impl Fn(&T) -> RowId) -> HashMap<RowId, &T> {
    let mut index = HashMap::with_capacity(items.len());
    for item in items {
        index.entry(id(item)).or_insert(item);
    }
    index
}
