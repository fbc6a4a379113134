//! Display header composition.
//!
//! Rubric text sometimes already carries the section name ("Leaders: ...",
//! "China | The party line"). Naive concatenation would print the section
//! twice, so the header is picked by an ordered rule set.

/// Separator between section and rubric in a composed header.
pub const HEADER_SEPARATOR: &str = " | ";

/// Compose the display header for an article.
///
/// Both inputs are expected pre-trimmed. Rules, in order:
/// 1. empty rubric: the section
/// 2. rubric equals the section (ignoring case): the section
/// 3. rubric's `|`-delimited prefix equals the section: the rubric
/// 4. rubric starts with the section (ignoring case): the rubric
/// 5. otherwise `section | rubric`
pub fn compose_header(section: &str, rubric: &str) -> String {
    if rubric.is_empty() {
        return section.to_string();
    }

    let section_lower = section.to_lowercase();
    let rubric_lower = rubric.to_lowercase();

    if rubric_lower == section_lower {
        return section.to_string();
    }

    if let Some((prefix, _)) = rubric.split_once('|')
        && prefix.trim().to_lowercase() == section_lower
    {
        return rubric.to_string();
    }

    if rubric_lower.starts_with(&section_lower) {
        return rubric.to_string();
    }

    format!("{}{}{}", section, HEADER_SEPARATOR, rubric)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::empty_rubric("Leaders", "", "Leaders")]
    #[case::equal("Leaders", "Leaders", "Leaders")]
    #[case::equal_ignoring_case("Leaders", "LEADERS", "Leaders")]
    #[case::pipe_prefix("China", "china | The party line", "china | The party line")]
    #[case::starts_with("Leaders", "Leaders: the age of a treacherous border", "Leaders: the age of a treacherous border")]
    #[case::starts_with_ignoring_case("Britain", "britain's housing crunch", "britain's housing crunch")]
    #[case::distinct("Business", "Greenback danger", "Business | Greenback danger")]
    #[case::pipe_with_other_prefix("Asia", "Banyan | Regional rivalry", "Asia | Banyan | Regional rivalry")]
    fn test_compose_header(#[case] section: &str, #[case] rubric: &str, #[case] expected: &str) {
        assert_eq!(compose_header(section, rubric), expected);
    }

    #[test]
    fn test_starts_with_rule_keeps_rubric_not_section() {
        let header = compose_header("China", "China: a special report");
        assert_ne!(header, "China");
        assert_eq!(header, "China: a special report");
    }
}
