//! Pull highlighted medicine names out of assistant text so the UI can turn
//! them into search triggers.

use std::sync::LazyLock;

use regex::Regex;

static BOLD_SPAN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*\*([^*\n]+?)\*\*").expect("valid bold span regex"));

/// Return the trimmed contents of every `**bold**` span, in order of
/// appearance. Duplicates are kept; callers cap how many they display.
#[must_use]
pub fn extract_highlighted(text: &str) -> Vec<String> {
    BOLD_SPAN
        .captures_iter(text)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str().trim())
        .filter(|s| !s.is_empty())
        .map(ToOwned::to_owned)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_in_order() {
        let text = "For a headache try **Paracetamol** or **Ibuprofen**.";
        assert_eq!(extract_highlighted(text), ["Paracetamol", "Ibuprofen"]);
    }

    #[test]
    fn keeps_duplicates() {
        let text = "**Cetirizine** works well; ask for **Cetirizine** 10mg.";
        assert_eq!(extract_highlighted(text), ["Cetirizine", "Cetirizine"]);
    }

    #[test]
    fn trims_and_skips_blank_spans() {
        let text = "** Amoxicillin ** and **   ** nothing";
        assert_eq!(extract_highlighted(text), ["Amoxicillin"]);
    }

    #[test]
    fn plain_text_yields_nothing() {
        assert!(extract_highlighted("drink water and rest").is_empty());
        assert!(extract_highlighted("a single *emphasis* only").is_empty());
    }

    #[test]
    fn spans_do_not_cross_lines() {
        let text = "**Aspirin\nis** fine";
        assert!(extract_highlighted(text).is_empty());
    }
}
