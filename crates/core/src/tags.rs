//! Tag normalisation.

use notes_types::NonEmptyText;
use std::collections::HashSet;

/// Trims every tag, drops blanks, and removes duplicates keeping the first occurrence.
///
/// Comparison is case-sensitive: `"Work"` and `"work"` are distinct tags. Order follows the
/// input, it is not sorted.
pub fn normalize_tags<I, S>(tags: I) -> Vec<NonEmptyText>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen = HashSet::new();
    tags.into_iter()
        .filter_map(|t| NonEmptyText::new(t).ok())
        .filter(|t| seen.insert(t.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(tags: &[NonEmptyText]) -> Vec<&str> {
        tags.iter().map(NonEmptyText::as_str).collect()
    }

    #[test]
    fn test_trims_and_drops_blanks() {
        let tags = normalize_tags(["  work ", "", "   ", "home"]);
        assert_eq!(strings(&tags), vec!["work", "home"]);
    }

    #[test]
    fn test_dedup_keeps_first_occurrence_order() {
        let tags = normalize_tags(["b", "a", " b", "c", "a"]);
        assert_eq!(strings(&tags), vec!["b", "a", "c"]);
    }

    #[test]
    fn test_case_sensitive() {
        let tags = normalize_tags(["Work", "work"]);
        assert_eq!(strings(&tags), vec!["Work", "work"]);
    }

    #[test]
    fn test_idempotent() {
        let input = ["x", " x ", "", "y"];
        let once = normalize_tags(input);
        let twice = normalize_tags(strings(&once));
        assert_eq!(once, twice);
    }

    #[test]
    fn test_empty_input() {
        let tags = normalize_tags(Vec::<String>::new());
        assert!(tags.is_empty());
    }
}
