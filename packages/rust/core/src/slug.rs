//! URL path slugs for teachers, courses and events.

use std::sync::LazyLock;

use regex::Regex;

/// Any run of whitespace.
static WHITESPACE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("whitespace regex"));

/// Lowercase `text` and replace every whitespace run with a single `-`.
///
/// No other characters are touched, and two inputs may map to the same slug.
pub fn slugify(text: &str) -> String {
    WHITESPACE_RE
        .replace_all(&text.to_lowercase(), "-")
        .into_owned()
}

/// Path of a teacher's page: `first-last`.
pub fn teacher_path(first_name: &str, last_name: &str) -> String {
    format!("{}-{}", slugify(first_name), slugify(last_name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lowercases_and_hyphenates() {
        assert_eq!(slugify("Vinyasa Flow"), "vinyasa-flow");
        assert_eq!(slugify("Summer Solstice Retreat"), "summer-solstice-retreat");
    }

    #[test]
    fn collapses_whitespace_runs() {
        assert_eq!(slugify("Yin  and\tRestore"), "yin-and-restore");
        assert_eq!(slugify(" Open House "), "-open-house-");
    }

    #[test]
    fn keeps_punctuation() {
        assert_eq!(slugify("Hatha & Tea!"), "hatha-&-tea!");
    }

    #[test]
    fn teacher_paths() {
        assert_eq!(teacher_path("Ana", "Lee"), "ana-lee");
        assert_eq!(teacher_path("Jonas", "Van Dijk"), "jonas-van-dijk");
    }

    #[test]
    fn same_title_same_slug() {
        assert_eq!(slugify("Morning Flow"), slugify("morning  flow"));
    }
}
