//! Text normalization for Persian/Arabic mixed text.
//!
//! Normalization never sees formula content; digits are only folded to
//! ASCII inside formulas (see [`normalize_formula_digits`]).

use regex::Regex;
use unicode_normalization::UnicodeNormalization;

use crate::render::RenderConfig;

/// Zero width non-joiner, the Persian half-space.
pub const HALF_SPACE: char = '\u{200C}';

/// Canonicalizes letter variants, whitespace, punctuation spacing and
/// prefix half-spaces.
#[derive(Debug, Clone)]
pub struct TextNormalizer {
    fold_hamza_carrier: bool,
    prefix_words: Vec<String>,
    whitespace_regex: Regex,
    space_before_close_regex: Regex,
    space_after_open_regex: Regex,
}

impl TextNormalizer {
    /// Create a normalizer for the given configuration.
    pub fn new(config: &RenderConfig) -> Self {
        Self {
            fold_hamza_carrier: config.fold_hamza_carrier,
            prefix_words: config.prefix_words.clone(),
            whitespace_regex: Regex::new(r"\s+").expect("whitespace regex"),
            space_before_close_regex: Regex::new(r" ([.,;:!?،؛؟»”)\]])")
                .expect("closing punctuation regex"),
            space_after_open_regex: Regex::new(r"([«“(\[]) ").expect("opening punctuation regex"),
        }
    }

    /// Normalize a complete text span and trim its ends.
    ///
    /// Empty input yields an empty string. `normalize(normalize(x)) ==
    /// normalize(x)` for every input.
    pub fn normalize(&self, text: &str) -> String {
        self.normalize_span(text).trim().to_string()
    }

    /// Normalize without trimming, for text that sits between inline
    /// formulas.
    pub fn normalize_span(&self, text: &str) -> String {
        if text.is_empty() {
            return String::new();
        }

        let composed: String = text.nfc().collect();
        let folded: String = composed
            .chars()
            .map(|c| fold_char(c, self.fold_hamza_carrier))
            .collect();

        let collapsed = self.whitespace_regex.replace_all(&folded, " ");
        let closed = self.space_before_close_regex.replace_all(&collapsed, "$1");
        let opened = self.space_after_open_regex.replace_all(&closed, "$1");

        self.join_prefixes(&opened)
    }

    /// Replace the space after a whole-token prefix word with a half-space.
    fn join_prefixes(&self, text: &str) -> String {
        if self.prefix_words.is_empty() || !text.contains(' ') {
            return text.to_string();
        }

        let tokens: Vec<&str> = text.split(' ').collect();
        let mut out = String::with_capacity(text.len());
        for (i, token) in tokens.iter().enumerate() {
            out.push_str(token);
            if let Some(next) = tokens.get(i + 1) {
                let is_prefix = self.prefix_words.iter().any(|w| w == token);
                if is_prefix && !next.is_empty() {
                    out.push(HALF_SPACE);
                } else {
                    out.push(' ');
                }
            }
        }
        out
    }
}

/// Map historical letter forms to the modern Persian code points.
pub fn fold_char(c: char, fold_hamza_carrier: bool) -> char {
    match c {
        // Arabic yeh and alef maksura -> Farsi yeh
        '\u{064A}' | '\u{0649}' => '\u{06CC}',
        // Arabic kaf -> keheh
        '\u{0643}' => '\u{06A9}',
        // Alef with hamza above -> alef
        '\u{0623}' if fold_hamza_carrier => '\u{0627}',
        _ => c,
    }
}

/// Convert Persian and Arabic-Indic digits to ASCII digits.
pub fn normalize_formula_digits(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            '\u{06F0}'..='\u{06F9}' => char::from(b'0' + (c as u32 - 0x06F0) as u8),
            '\u{0660}'..='\u{0669}' => char::from(b'0' + (c as u32 - 0x0660) as u8),
            _ => c,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn normalizer() -> TextNormalizer {
        TextNormalizer::new(&RenderConfig::default())
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(normalizer().normalize(""), "");
        assert_eq!(normalizer().normalize("   "), "");
    }

    #[test]
    fn test_letter_folding() {
        let n = normalizer();
        assert_eq!(n.normalize("علي"), "علی");
        assert_eq!(n.normalize("كتاب"), "کتاب");
        assert_eq!(n.normalize("موسى"), "موسی");
        // hamza carrier folding is off by default
        assert_eq!(n.normalize("أمید"), "أمید");

        let folding = TextNormalizer::new(&RenderConfig::default().with_hamza_folding(true));
        assert_eq!(folding.normalize("أمید"), "امید");
    }

    #[test]
    fn test_whitespace_collapse() {
        assert_eq!(normalizer().normalize("a   b\t\tc"), "a b c");
    }

    #[test]
    fn test_punctuation_spacing() {
        let n = normalizer();
        assert_eq!(n.normalize("سلام ، دنیا !"), "سلام، دنیا!");
        assert_eq!(n.normalize("( متن )"), "(متن)");
        assert_eq!(n.normalize("« نقل » قول"), "«نقل» قول");
        assert_eq!(n.normalize("Hello , world ."), "Hello, world.");
    }

    #[test]
    fn test_prefix_half_space() {
        let n = normalizer();
        assert_eq!(n.normalize("می رود"), "می\u{200C}رود");
        assert_eq!(n.normalize("او نمی داند"), "او نمی\u{200C}داند");
        // only whole tokens
        assert_eq!(n.normalize("میز بزرگ"), "میز بزرگ");
        // nothing to join at the end
        assert_eq!(n.normalize("می"), "می");
    }

    #[test]
    fn test_span_keeps_edges() {
        let n = normalizer();
        assert_eq!(n.normalize_span("  x  "), " x ");
        assert_eq!(n.normalize_span("می "), "می ");
    }

    #[test]
    fn test_idempotent() {
        let n = normalizer();
        let samples = [
            "بی می رود",
            "  سلام ،   دنیا ( test ) !  ",
            "علي و كتاب ها",
            "a **b** c",
            "« نقل »",
            "",
        ];
        for sample in samples {
            let once = n.normalize(sample);
            assert_eq!(n.normalize(&once), once, "not idempotent for {:?}", sample);
        }
    }

    #[test]
    fn test_formula_digits() {
        assert_eq!(normalize_formula_digits("۱۲۳ + ٤٥"), "123 + 45");
        assert_eq!(normalize_formula_digits("x2"), "x2");
    }
}
