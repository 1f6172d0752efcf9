//! Derived and fallback fields: course duration, class length, equipment
//! lists, and the placeholder copy shown for incomplete teacher profiles.

use std::sync::LazyLock;

use chrono::{NaiveDate, NaiveTime, Timelike};
use rand::Rng;
use regex::Regex;

use yanaflow_shared::{Course, CourseSchedule, DurationUnit, RawEquipment, Teacher, parse_date};

/// Number of cover images shipped under `/images/covers/`.
pub const COVER_IMAGE_COUNT: u32 = 22;

/// Shown for teachers who have not written their own quote.
pub const DEFAULT_QUOTE: &str = "I believe movement is a celebration, not a performance. \
Every breath you take on the mat is a reminder that you're alive, worthy, and already enough. \
My hope is that each class gives you space to explore, express, and come home to yourself - \
no pressure, just presence.";

/// `HH:MM[:SS[.fff]]` followed by an optional UTC offset (`Z`, `+00`, `+05:30`, `-0800`).
static WALL_CLOCK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d{1,2}:\d{2}(?::\d{2}(?:\.\d+)?)?)\s*(Z|[+-]\d{2}(?::?\d{2})?)?$")
        .expect("wall clock regex")
});

// ---------------------------------------------------------------------------
// Equipment
// ---------------------------------------------------------------------------

/// Turn a stored equipment value into a list of trimmed item names.
///
/// A comma-joined string is split and each piece trimmed, so `"a,,b"` keeps
/// its empty middle item. A missing value or an empty string yields an empty
/// list.
pub fn normalize_equipment(raw: Option<RawEquipment>) -> Vec<String> {
    match raw {
        None => Vec::new(),
        Some(RawEquipment::Joined(joined)) if joined.is_empty() => Vec::new(),
        Some(RawEquipment::Joined(joined)) => tidy_equipment(joined.split(',')),
        Some(RawEquipment::List(items)) => tidy_equipment(items),
    }
}

/// Trim every item. Idempotent.
pub fn tidy_equipment<I, S>(items: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    items
        .into_iter()
        .map(|item| item.as_ref().trim().to_string())
        .collect()
}

// ---------------------------------------------------------------------------
// Course duration and class length
// ---------------------------------------------------------------------------

/// Overall course length.
///
/// Counts calendar days from `start_date` to `end_date` inclusive; seven or
/// more days are expressed in (rounded up) weeks. A course without schedule
/// entries or without both dates is `0` days.
pub fn course_duration(course: &Course) -> (u32, DurationUnit) {
    let Some((start, end)) = scheduled_dates(course) else {
        return (0, DurationUnit::Days);
    };

    let days = if end < start {
        0
    } else {
        u32::try_from((end - start).num_days() + 1).unwrap_or(u32::MAX)
    };

    if days >= 7 {
        (days.div_ceil(7), DurationUnit::Weeks)
    } else {
        (days, DurationUnit::Days)
    }
}

/// Start and end date of a course that has schedule entries and both dates.
fn scheduled_dates(course: &Course) -> Option<(NaiveDate, NaiveDate)> {
    if course.schedule.is_empty() {
        return None;
    }
    let start = course.start_date.as_deref().and_then(parse_date)?;
    let end = course.end_date.as_deref().and_then(parse_date)?;
    Some((start, end))
}

/// Minutes between start and end of the first schedule entry whose times
/// both parse. A class ending before it starts gives a negative length.
pub fn class_length(schedule: &[CourseSchedule]) -> Option<i64> {
    schedule.iter().find_map(|entry| {
        let start = wall_clock_utc_seconds(entry.start_time.as_deref()?)?;
        let end = wall_clock_utc_seconds(entry.end_time.as_deref()?)?;
        Some(((end - start) as f64 / 60.0).round() as i64)
    })
}

/// Fill the duration and class-length fields of a fully resolved course.
///
/// Class length is only set for a course with a schedule and both dates;
/// any other course gets `0 days` and no class length.
pub fn apply_course_timing(course: &mut Course) {
    let (duration, unit) = course_duration(course);
    course.course_duration = Some(duration);
    course.course_duration_unit = Some(unit);

    let length = scheduled_dates(course).and_then(|_| class_length(&course.schedule));
    match length {
        Some(minutes) => {
            course.class_length = Some(minutes);
            course.class_length_formatted = Some(format!("{minutes} min"));
        }
        None => {
            course.class_length = None;
            course.class_length_formatted = None;
        }
    }
}

/// Seconds since UTC midnight for a wall-clock string with optional offset.
fn wall_clock_utc_seconds(raw: &str) -> Option<i64> {
    let caps = WALL_CLOCK_RE.captures(raw.trim())?;
    let time_part = caps.get(1)?.as_str();

    let time = NaiveTime::parse_from_str(time_part, "%H:%M:%S%.f")
        .or_else(|_| NaiveTime::parse_from_str(time_part, "%H:%M"))
        .ok()?;
    let local = i64::from(time.num_seconds_from_midnight());

    let offset = match caps.get(2).map(|m| m.as_str()) {
        None | Some("Z") => 0,
        Some(offset) => offset_seconds(offset)?,
    };

    Some(local - offset)
}

/// `+HH`, `+HH:MM` or `+HHMM` (and the `-` forms) in seconds east of UTC.
fn offset_seconds(raw: &str) -> Option<i64> {
    let (sign, rest) = match raw.split_at(1) {
        ("+", rest) => (1, rest),
        ("-", rest) => (-1, rest),
        _ => return None,
    };
    let digits: String = rest.chars().filter(|c| c.is_ascii_digit()).collect();
    let hours: i64 = digits.get(0..2)?.parse().ok()?;
    let minutes: i64 = match digits.get(2..4) {
        Some(m) => m.parse().ok()?,
        None => 0,
    };
    Some(sign * (hours * 3600 + minutes * 60))
}

// ---------------------------------------------------------------------------
// Teacher profile fallbacks
// ---------------------------------------------------------------------------

/// Fill bio, social tag, quote and "featured in" for a teacher whose own
/// values are missing. Expects `teacher.courses` to be resolved already,
/// since the bio mentions them.
pub fn fill_teacher_profile<R: Rng>(teacher: &mut Teacher, rng: &mut R) {
    if teacher.bio.as_deref().is_none_or(str::is_empty) {
        teacher.bio = Some(placeholder_bio(teacher));
    }

    if teacher.insta_tag.as_deref().is_none_or(str::is_empty) {
        teacher.insta_tag = Some(format!(
            "@{}.{}.yoga",
            teacher.first_name.to_lowercase(),
            teacher.last_name.to_lowercase()
        ));
    }

    if teacher.quote.as_deref().is_none_or(str::is_empty) {
        teacher.quote = Some(DEFAULT_QUOTE.to_string());
    }

    if teacher.featured_in.is_none() {
        teacher.featured_in = Some(placeholder_featured_in(rng));
    }
}

/// Generic bio built from name, origin and course titles.
pub fn placeholder_bio(teacher: &Teacher) -> String {
    let first = &teacher.first_name;
    let origin = match teacher.origin_country.as_deref() {
        Some(country) if !country.is_empty() => format!(" from {country}"),
        _ => String::new(),
    };
    let specialties = if teacher.courses.is_empty() {
        "various yoga styles".to_string()
    } else {
        teacher
            .courses
            .iter()
            .map(|c| c.title.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    };

    format!(
        "{first} {last} is a certified yoga instructor{origin}. With a passion for teaching \
         and helping others discover the benefits of yoga, {first} specializes in \
         {specialties}. Join {first}'s classes to experience a transformative practice \
         that nurtures both body and mind.",
        last = teacher.last_name,
    )
}

/// Decorative counters for the "featured in" strip.
pub fn placeholder_featured_in<R: Rng>(rng: &mut R) -> Vec<String> {
    vec![
        format!("{} Classes", rng.random_range(50..150)),
        format!("{} Events", rng.random_range(5..35)),
        format!("{} Retreats", rng.random_range(1..16)),
        format!("{} Articles", rng.random_range(5..25)),
    ]
}

/// A random cover from `/images/covers/`.
pub fn placeholder_cover_image<R: Rng>(rng: &mut R) -> String {
    let n = rng.random_range(1..=COVER_IMAGE_COUNT);
    format!("/images/covers/cover_{n}.jpg")
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn course(start: Option<&str>, end: Option<&str>, schedule: Vec<CourseSchedule>) -> Course {
        Course {
            id: 1,
            title: "Vinyasa Flow".into(),
            short_description: None,
            description: None,
            image_url: None,
            level: None,
            start_date: start.map(String::from),
            end_date: end.map(String::from),
            trending: None,
            equipment: vec![],
            focus: None,
            style: None,
            path: "vinyasa-flow".into(),
            course_duration: None,
            course_duration_unit: None,
            class_length: None,
            class_length_formatted: None,
            teachers: vec![],
            schedule,
        }
    }

    fn slot(id: i64, start: Option<&str>, end: Option<&str>) -> CourseSchedule {
        CourseSchedule {
            id,
            course_id: 1,
            weekday: Some("Monday".into()),
            start_time: start.map(String::from),
            end_time: end.map(String::from),
        }
    }

    fn teacher(first: &str, last: &str) -> Teacher {
        Teacher {
            id: 1,
            first_name: first.into(),
            last_name: last.into(),
            origin_country: Some("Portugal".into()),
            image_url: None,
            bio: None,
            insta_tag: None,
            quote: None,
            featured_in: None,
            path: format!("{}-{}", first.to_lowercase(), last.to_lowercase()),
            courses: vec![],
            events: vec![],
        }
    }

    // -----------------------------------------------------------------------
    // Equipment
    // -----------------------------------------------------------------------

    #[test]
    fn equipment_from_joined_string() {
        let raw = Some(RawEquipment::Joined(" mat, block ,strap".into()));
        assert_eq!(normalize_equipment(raw), ["mat", "block", "strap"]);
    }

    #[test]
    fn equipment_empty_or_missing() {
        assert!(normalize_equipment(None).is_empty());
        assert!(normalize_equipment(Some(RawEquipment::Joined(String::new()))).is_empty());
    }

    #[test]
    fn equipment_keeps_blank_items() {
        let raw = Some(RawEquipment::Joined("mat,,block".into()));
        assert_eq!(normalize_equipment(raw), ["mat", "", "block"]);

        let raw = Some(RawEquipment::Joined(" , ".into()));
        assert_eq!(normalize_equipment(raw), ["", ""]);
    }

    #[test]
    fn equipment_list_is_trimmed() {
        let raw = Some(RawEquipment::List(vec![" mat ".into(), "bolster ".into()]));
        assert_eq!(normalize_equipment(raw), ["mat", "bolster"]);
    }

    #[test]
    fn tidy_is_idempotent() {
        let once = tidy_equipment(["  mat", "block  "]);
        assert_eq!(tidy_equipment(once.clone()), once);
    }

    // -----------------------------------------------------------------------
    // Duration
    // -----------------------------------------------------------------------

    #[test]
    fn ten_days_is_two_weeks() {
        let c = course(
            Some("2024-01-01"),
            Some("2024-01-10"),
            vec![slot(1, Some("09:00:00+00"), Some("10:00:00+00"))],
        );
        assert_eq!(course_duration(&c), (2, DurationUnit::Weeks));
    }

    #[test]
    fn exactly_one_week() {
        let c = course(Some("2024-01-01"), Some("2024-01-07"), vec![slot(1, None, None)]);
        assert_eq!(course_duration(&c), (1, DurationUnit::Weeks));
    }

    #[test]
    fn short_course_in_days() {
        let c = course(Some("2024-03-04"), Some("2024-03-08"), vec![slot(1, None, None)]);
        assert_eq!(course_duration(&c), (5, DurationUnit::Days));

        let single = course(Some("2024-03-04"), Some("2024-03-04"), vec![slot(1, None, None)]);
        assert_eq!(course_duration(&single), (1, DurationUnit::Days));
    }

    #[test]
    fn no_schedule_or_dates_is_zero_days() {
        let c = course(Some("2024-01-01"), Some("2024-01-10"), vec![]);
        assert_eq!(course_duration(&c), (0, DurationUnit::Days));

        let c = course(None, Some("2024-01-10"), vec![slot(1, None, None)]);
        assert_eq!(course_duration(&c), (0, DurationUnit::Days));

        let c = course(Some("soon"), Some("2024-01-10"), vec![slot(1, None, None)]);
        assert_eq!(course_duration(&c), (0, DurationUnit::Days));
    }

    #[test]
    fn end_before_start_is_zero_days() {
        let c = course(Some("2024-01-10"), Some("2024-01-01"), vec![slot(1, None, None)]);
        assert_eq!(course_duration(&c), (0, DurationUnit::Days));
    }

    // -----------------------------------------------------------------------
    // Class length
    // -----------------------------------------------------------------------

    #[test]
    fn class_length_from_first_complete_entry() {
        let schedule = vec![
            slot(1, Some("08:00:00+00"), None),
            slot(2, Some("09:00:00+00"), Some("10:15:00+00")),
            slot(3, Some("18:00:00+00"), Some("19:00:00+00")),
        ];
        assert_eq!(class_length(&schedule), Some(75));
    }

    #[test]
    fn class_length_handles_offsets_and_short_times() {
        let schedule = vec![slot(1, Some("09:00+02:00"), Some("08:30:00Z"))];
        assert_eq!(class_length(&schedule), Some(90));

        let schedule = vec![slot(1, Some("07:00"), Some("07:45"))];
        assert_eq!(class_length(&schedule), Some(45));
    }

    #[test]
    fn class_length_end_before_start_is_negative() {
        let schedule = vec![slot(1, Some("23:30:00+00"), Some("00:30:00+00"))];
        assert_eq!(class_length(&schedule), Some(-1380));
    }

    #[test]
    fn class_length_missing() {
        assert_eq!(class_length(&[]), None);
        assert_eq!(class_length(&[slot(1, Some("noon"), Some("13:00"))]), None);
    }

    #[test]
    fn apply_course_timing_sets_all_fields() {
        let mut c = course(
            Some("2024-01-01"),
            Some("2024-01-10"),
            vec![slot(1, Some("09:00:00+00"), Some("10:00:00+00"))],
        );
        apply_course_timing(&mut c);
        assert_eq!(c.course_duration, Some(2));
        assert_eq!(c.course_duration_unit, Some(DurationUnit::Weeks));
        assert_eq!(c.class_length, Some(60));
        assert_eq!(c.class_length_formatted.as_deref(), Some("60 min"));

        let mut bare = course(None, None, vec![]);
        apply_course_timing(&mut bare);
        assert_eq!(bare.course_duration, Some(0));
        assert_eq!(bare.course_duration_unit, Some(DurationUnit::Days));
        assert!(bare.class_length.is_none());
        assert!(bare.class_length_formatted.is_none());
    }

    #[test]
    fn undated_course_has_no_class_length() {
        let mut c = course(
            None,
            None,
            vec![slot(1, Some("09:00:00+00"), Some("10:00:00+00"))],
        );
        apply_course_timing(&mut c);
        assert_eq!(c.course_duration, Some(0));
        assert_eq!(c.course_duration_unit, Some(DurationUnit::Days));
        assert!(c.class_length.is_none());
        assert!(c.class_length_formatted.is_none());

        let mut half = course(
            Some("2024-01-01"),
            Some("not a date"),
            vec![slot(1, Some("09:00:00+00"), Some("10:00:00+00"))],
        );
        apply_course_timing(&mut half);
        assert!(half.class_length.is_none());
    }

    // -----------------------------------------------------------------------
    // Teacher profile
    // -----------------------------------------------------------------------

    #[test]
    fn fills_missing_profile_fields() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut t = teacher("Ana", "Lee");
        t.courses = vec![course(None, None, vec![])];
        fill_teacher_profile(&mut t, &mut rng);

        let bio = t.bio.expect("bio");
        assert!(bio.starts_with("Ana Lee is a certified yoga instructor from Portugal."));
        assert!(bio.contains("specializes in Vinyasa Flow."));
        assert_eq!(t.insta_tag.as_deref(), Some("@ana.lee.yoga"));
        assert_eq!(t.quote.as_deref(), Some(DEFAULT_QUOTE));
        assert_eq!(t.featured_in.map(|f| f.len()), Some(4));
    }

    #[test]
    fn keeps_existing_profile_fields() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut t = teacher("Mara", "Costa");
        t.bio = Some("Teaches Ashtanga.".into());
        t.insta_tag = Some("@mara.moves".into());
        t.quote = Some("Breathe first.".into());
        t.featured_in = Some(vec![]);
        fill_teacher_profile(&mut t, &mut rng);

        assert_eq!(t.bio.as_deref(), Some("Teaches Ashtanga."));
        assert_eq!(t.insta_tag.as_deref(), Some("@mara.moves"));
        assert_eq!(t.quote.as_deref(), Some("Breathe first."));
        assert_eq!(t.featured_in, Some(vec![]));
    }

    #[test]
    fn bio_without_courses_or_origin() {
        let mut t = teacher("Jonas", "Van Dijk");
        t.origin_country = None;
        let bio = placeholder_bio(&t);
        assert!(bio.starts_with("Jonas Van Dijk is a certified yoga instructor. "));
        assert!(bio.contains("specializes in various yoga styles."));
        assert!(bio.contains("Join Jonas's classes"));
    }

    #[test]
    fn featured_in_ranges() {
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..50 {
            let featured = placeholder_featured_in(&mut rng);
            let count = |i: usize| -> u32 {
                featured[i]
                    .split_whitespace()
                    .next()
                    .and_then(|n| n.parse().ok())
                    .expect("leading number")
            };
            assert!((50..150).contains(&count(0)));
            assert!(featured[0].ends_with(" Classes"));
            assert!((5..35).contains(&count(1)));
            assert!((1..16).contains(&count(2)));
            assert!((5..25).contains(&count(3)));
            assert!(featured[3].ends_with(" Articles"));
        }
    }

    #[test]
    fn featured_in_is_seed_stable() {
        let a = placeholder_featured_in(&mut StdRng::seed_from_u64(3));
        let b = placeholder_featured_in(&mut StdRng::seed_from_u64(3));
        assert_eq!(a, b);
    }

    #[test]
    fn cover_images_in_range() {
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..100 {
            let cover = placeholder_cover_image(&mut rng);
            let n: u32 = cover
                .trim_start_matches("/images/covers/cover_")
                .trim_end_matches(".jpg")
                .parse()
                .expect("cover number");
            assert!((1..=COVER_IMAGE_COUNT).contains(&n));
        }
    }
}
