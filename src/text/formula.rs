//! Formula detection and formatting.
//!
//! Formulas are written with `$…$` or `$$…$$` delimiters and a small subset
//! of LaTeX commands. Known commands are substituted by glyphs; structural
//! macros become Unicode fractions and super/subscripts where a direct
//! mapping exists. Anything unknown is kept as literal text.

use regex::{Captures, Regex};

use super::normalize::normalize_formula_digits;

/// Command name to glyph substitution table.
const COMMANDS: &[(&str, &str)] = &[
    ("alpha", "α"),
    ("beta", "β"),
    ("gamma", "γ"),
    ("delta", "δ"),
    ("epsilon", "ε"),
    ("varepsilon", "ε"),
    ("zeta", "ζ"),
    ("eta", "η"),
    ("theta", "θ"),
    ("kappa", "κ"),
    ("lambda", "λ"),
    ("mu", "μ"),
    ("nu", "ν"),
    ("xi", "ξ"),
    ("pi", "π"),
    ("rho", "ρ"),
    ("sigma", "σ"),
    ("tau", "τ"),
    ("phi", "φ"),
    ("varphi", "φ"),
    ("chi", "χ"),
    ("psi", "ψ"),
    ("omega", "ω"),
    ("Gamma", "Γ"),
    ("Delta", "Δ"),
    ("Theta", "Θ"),
    ("Lambda", "Λ"),
    ("Pi", "Π"),
    ("Sigma", "Σ"),
    ("Phi", "Φ"),
    ("Psi", "Ψ"),
    ("Omega", "Ω"),
    ("times", "×"),
    ("div", "÷"),
    ("pm", "±"),
    ("mp", "∓"),
    ("cdot", "·"),
    ("leq", "≤"),
    ("le", "≤"),
    ("geq", "≥"),
    ("ge", "≥"),
    ("neq", "≠"),
    ("ne", "≠"),
    ("approx", "≈"),
    ("equiv", "≡"),
    ("infty", "∞"),
    ("sum", "∑"),
    ("prod", "∏"),
    ("int", "∫"),
    ("oint", "∮"),
    ("sqrt", "√"),
    ("partial", "∂"),
    ("nabla", "∇"),
    ("in", "∈"),
    ("notin", "∉"),
    ("subset", "⊂"),
    ("cup", "∪"),
    ("cap", "∩"),
    ("forall", "∀"),
    ("exists", "∃"),
    ("to", "→"),
    ("rightarrow", "→"),
    ("leftarrow", "←"),
    ("Rightarrow", "⇒"),
    ("Leftrightarrow", "⇔"),
    ("degree", "°"),
    ("left", ""),
    ("right", ""),
];

/// Glyphs that mark a line as mathematical.
const MATH_GLYPHS: &[char] = &[
    '∑', '∏', '∫', '∮', '√', '≤', '≥', '≠', '≈', '≡', '±', '∓', '×', '÷', '∞', '∂', '∇', '∈',
    '∉', '⊂', '∪', '∩', '∀', '∃', '⇒', '⇔',
];

const VULGAR_FRACTIONS: &[(&str, &str, &str)] = &[
    ("1", "2", "½"),
    ("1", "3", "⅓"),
    ("2", "3", "⅔"),
    ("1", "4", "¼"),
    ("3", "4", "¾"),
    ("1", "5", "⅕"),
    ("2", "5", "⅖"),
    ("3", "5", "⅗"),
    ("4", "5", "⅘"),
    ("1", "6", "⅙"),
    ("5", "6", "⅚"),
    ("1", "7", "⅐"),
    ("1", "8", "⅛"),
    ("3", "8", "⅜"),
    ("5", "8", "⅝"),
    ("7", "8", "⅞"),
    ("1", "9", "⅑"),
    ("1", "10", "⅒"),
];

/// A piece of a line split at inline formula delimiters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InlinePiece<'a> {
    /// Ordinary text
    Text(&'a str),
    /// Formula source without its delimiters
    Math(&'a str),
}

/// Split a line at `$…$` / `$$…$$` spans.
///
/// Returns `None` when an opening delimiter has no matching close; the
/// caller then treats the whole line as plain text. A `$` preceded by a
/// backslash is literal.
pub fn split_inline(line: &str) -> Option<Vec<InlinePiece<'_>>> {
    let bytes = line.as_bytes();
    let mut pieces = Vec::new();
    let mut text_start = 0;
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] != b'$' || (i > 0 && bytes[i - 1] == b'\\') {
            i += 1;
            continue;
        }

        let delimiter = if line[i..].starts_with("$$") { "$$" } else { "$" };
        let content_start = i + delimiter.len();
        let close = find_delimiter(line, content_start, delimiter)?;
        if close == content_start {
            // `$$` with nothing inside is not a formula
            i = content_start;
            continue;
        }

        if text_start < i {
            pieces.push(InlinePiece::Text(&line[text_start..i]));
        }
        pieces.push(InlinePiece::Math(&line[content_start..close]));
        i = close + delimiter.len();
        text_start = i;
    }

    if text_start < line.len() {
        pieces.push(InlinePiece::Text(&line[text_start..]));
    }
    Some(pieces)
}

fn find_delimiter(line: &str, from: usize, delimiter: &str) -> Option<usize> {
    let mut search = from;
    while let Some(offset) = line[search..].find(delimiter) {
        let at = search + offset;
        if at > 0 && line.as_bytes()[at - 1] == b'\\' {
            search = at + 1;
            continue;
        }
        return Some(at);
    }
    None
}

/// Check for a backslash command or a math glyph.
pub fn has_math_tokens(text: &str) -> bool {
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\\' && chars.peek().is_some_and(|n| n.is_ascii_alphabetic()) {
            return true;
        }
        if MATH_GLYPHS.contains(&c) || ('\u{0391}'..='\u{03C9}').contains(&c) {
            return true;
        }
    }
    false
}

/// Look up a command glyph.
pub fn command_glyph(name: &str) -> Option<&'static str> {
    COMMANDS
        .iter()
        .find(|(command, _)| *command == name)
        .map(|(_, glyph)| *glyph)
}

/// Map every character to its superscript form, or `None` if one has no
/// superscript counterpart.
pub fn to_superscript(text: &str) -> Option<String> {
    text.chars().map(superscript_char).collect()
}

/// Map every character to its subscript form, or `None` if one has no
/// subscript counterpart.
pub fn to_subscript(text: &str) -> Option<String> {
    text.chars().map(subscript_char).collect()
}

fn superscript_char(c: char) -> Option<char> {
    Some(match c {
        '0' => '⁰',
        '1' => '¹',
        '2' => '²',
        '3' => '³',
        '4' => '⁴',
        '5' => '⁵',
        '6' => '⁶',
        '7' => '⁷',
        '8' => '⁸',
        '9' => '⁹',
        '+' => '⁺',
        '-' | '−' => '⁻',
        '=' => '⁼',
        '(' => '⁽',
        ')' => '⁾',
        'n' => 'ⁿ',
        'i' => 'ⁱ',
        _ => return None,
    })
}

fn subscript_char(c: char) -> Option<char> {
    Some(match c {
        '0' => '₀',
        '1' => '₁',
        '2' => '₂',
        '3' => '₃',
        '4' => '₄',
        '5' => '₅',
        '6' => '₆',
        '7' => '₇',
        '8' => '₈',
        '9' => '₉',
        '+' => '₊',
        '-' | '−' => '₋',
        '=' => '₌',
        '(' => '₍',
        ')' => '₎',
        _ => return None,
    })
}

/// Rewrites formula source into display text.
#[derive(Debug, Clone)]
pub struct FormulaFormatter {
    frac_regex: Regex,
    command_regex: Regex,
    script_regex: Regex,
    space_regex: Regex,
}

impl FormulaFormatter {
    /// Create a new formatter.
    pub fn new() -> Self {
        Self {
            frac_regex: Regex::new(r"\\frac\{([^{}]*)\}\{([^{}]*)\}").expect("frac regex"),
            command_regex: Regex::new(r"\\([A-Za-z]+)").expect("command regex"),
            script_regex: Regex::new(r"([\^_])(?:\{([^{}]*)\}|([0-9A-Za-z+\-=()]))")
                .expect("script regex"),
            space_regex: Regex::new(r"\s+").expect("space regex"),
        }
    }

    /// Format formula source (without delimiters).
    pub fn format(&self, source: &str) -> String {
        let digits = normalize_formula_digits(source);

        let fractions = self.frac_regex.replace_all(&digits, |caps: &Captures| {
            let numerator = caps[1].trim();
            let denominator = caps[2].trim();
            VULGAR_FRACTIONS
                .iter()
                .find(|(n, d, _)| *n == numerator && *d == denominator)
                .map(|(_, _, glyph)| glyph.to_string())
                .unwrap_or_else(|| caps[0].to_string())
        });

        let commands = self.command_regex.replace_all(&fractions, |caps: &Captures| {
            command_glyph(&caps[1])
                .map(str::to_string)
                .unwrap_or_else(|| caps[0].to_string())
        });

        let scripted = self.script_regex.replace_all(&commands, |caps: &Captures| {
            let body = caps
                .get(2)
                .or_else(|| caps.get(3))
                .map(|m| m.as_str())
                .unwrap_or_default();
            let mapped = if &caps[1] == "^" {
                to_superscript(body)
            } else {
                to_subscript(body)
            };
            match mapped {
                Some(text) if !text.is_empty() => text,
                _ => caps[0].to_string(),
            }
        });

        self.space_regex
            .replace_all(&scripted, " ")
            .trim()
            .to_string()
    }
}

impl Default for FormulaFormatter {
    fn default() -> Self {
        Self::new()
    }
}
