use anyhow::Result;
use regex::Regex;

/// Text sanitizer for retrieved product fields.
///
/// Precompiles its patterns once; `clean` is then cheap enough to run per
/// field per record.
pub struct Cleanser {
    emoji: Regex,
}

impl Cleanser {
    pub fn new() -> Result<Cleanser> {
        // Emoji, pictographs, dingbats and related symbol blocks that show up
        // in crowd-sourced product data
        let emoji = Regex::new(
            "[\u{1F600}-\u{1F64F}\
\u{1F300}-\u{1F5FF}\
\u{1F680}-\u{1F6FF}\
\u{1F1E0}-\u{1F1FF}\
\u{2702}-\u{27B0}\
\u{24C2}-\u{1F251}\
\u{1F900}-\u{1F9FF}\
\u{1FA00}-\u{1FA6F}\
\u{1FA70}-\u{1FAFF}\
\u{2600}-\u{26FF}]+",
        )?;

        Ok(Cleanser { emoji })
    }

    /// Make a raw field safe for the semicolon-delimited flat file: semicolons
    /// become commas, line breaks become spaces, emoji are stripped, and
    /// whitespace is collapsed.
    pub fn clean(&self, text: &str) -> String {
        let text = text.replace(';', ",").replace(['\n', '\r'], " ");
        let text = self.emoji.replace_all(&text, "");
        text.split_whitespace().collect::<Vec<_>>().join(" ")
    }

    /// Reduce a field to lowercase letters, spaces and commas, with whitespace
    /// collapsed. This is the normalized form stored in the `ingredients` and
    /// `allergensraw` dataset columns.
    pub fn letters_only(&self, text: &str) -> String {
        let lowered = text.to_lowercase();
        let kept: String = lowered
            .chars()
            .map(|c| {
                if c.is_ascii_alphabetic() || c == ',' {
                    c
                } else {
                    ' '
                }
            })
            .collect();
        kept.split_whitespace().collect::<Vec<_>>().join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cleanser() -> Cleanser {
        Cleanser::new().unwrap()
    }

    #[test]
    fn test_clean_delimiters() {
        let c = cleanser();
        assert_eq!(c.clean("salt; sugar;\npepper"), "salt, sugar, pepper");
    }

    #[test]
    fn test_clean_strips_emoji() {
        let c = cleanser();
        assert_eq!(c.clean("organic \u{1F34E} apples \u{2728}"), "organic apples");
    }

    #[test]
    fn test_clean_collapses_whitespace() {
        let c = cleanser();
        assert_eq!(c.clean("  too   many\t spaces "), "too many spaces");
    }

    #[test]
    fn test_letters_only() {
        let c = cleanser();
        assert_eq!(
            c.letters_only("Wheat Flour (50%), Milk*, E322!"),
            "wheat flour , milk , e"
        );
    }

    #[test]
    fn test_letters_only_empty() {
        let c = cleanser();
        assert_eq!(c.letters_only("123 !?"), "");
    }
}
