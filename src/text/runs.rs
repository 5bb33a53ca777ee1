//! Run building: inline formulas, emphasis, vertical positioning and
//! script splitting.

use regex::{Captures, Regex};

use super::formula::{split_inline, to_subscript, to_superscript, FormulaFormatter, InlinePiece};
use super::normalize::TextNormalizer;
use super::script::split_by_script;
use crate::model::{Emphasis, Run, RunKind, RunStyle, Script, VerticalPosition};
use crate::render::{FontSpec, FontTable, RenderConfig};

/// Stands in for an inline formula while emphasis is resolved.
const FORMULA_SLOT: char = '\u{E000}';

/// The structural role of the text being built; selects fonts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextRole {
    /// Body paragraph
    Body,
    /// Heading of the given level
    Heading(u8),
    /// Figure or table caption
    Caption,
    /// Table header cell
    TableHeader,
    /// Table body cell
    TableBody,
}

/// Turns a line of marked-up text into styled runs.
#[derive(Debug, Clone)]
pub struct RunBuilder {
    normalizer: TextNormalizer,
    formatter: FormulaFormatter,
    fonts: FontTable,
    base_rtl: bool,
    native_vertical: bool,
    emphasis_regex: Regex,
    vertical_regex: Regex,
}

impl RunBuilder {
    /// Create a run builder for the given configuration.
    pub fn new(config: &RenderConfig) -> Self {
        let emphasis = if config.italic_markers {
            r"\*\*(.+?)\*\*|~~(.+?)~~|\*(.+?)\*"
        } else {
            r"\*\*(.+?)\*\*|~~(.+?)~~"
        };

        Self {
            normalizer: TextNormalizer::new(config),
            formatter: FormulaFormatter::new(),
            fonts: config.fonts.clone(),
            base_rtl: config.base_direction.is_rtl(),
            native_vertical: config.native_vertical_position,
            emphasis_regex: Regex::new(emphasis).expect("emphasis regex"),
            vertical_regex: Regex::new(r"\^\{([^{}]*)\}|_\{([^{}]*)\}|\^(\d+)|_(\d+)")
                .expect("vertical regex"),
        }
    }

    /// The normalizer used for text spans.
    pub fn normalizer(&self) -> &TextNormalizer {
        &self.normalizer
    }

    /// Build runs for a text line with full markup handling.
    pub fn build_text(&self, text: &str, role: TextRole) -> Vec<Run> {
        self.build(text, role, true)
    }

    /// Build runs with emphasis markers removed but not applied.
    pub fn build_plain(&self, text: &str, role: TextRole) -> Vec<Run> {
        self.build(text, role, false)
    }

    /// Build runs with no markup interpretation at all.
    pub fn build_literal(&self, text: &str, role: TextRole) -> Vec<Run> {
        let normalized = self.normalizer.normalize(text);
        self.script_runs(&normalized, role, Emphasis::default(), RunKind::Normal)
    }

    /// Build the single run of a display formula.
    pub fn build_formula(&self, source: &str) -> Vec<Run> {
        let formatted = self.formatter.format(source);
        if formatted.is_empty() {
            return Vec::new();
        }
        vec![Run::formula(formatted).with_style(self.formula_style())]
    }

    fn build(&self, text: &str, role: TextRole, emphasis: bool) -> Vec<Run> {
        let pieces = split_inline(text).unwrap_or_else(|| vec![InlinePiece::Text(text)]);
        let last = pieces.len().saturating_sub(1);

        // Formulas are held out of normalization and emphasis; each one
        // leaves a slot in the line so emphasis markers can span it.
        let mut line = String::with_capacity(text.len());
        let mut formulas = Vec::new();

        for (i, piece) in pieces.into_iter().enumerate() {
            match piece {
                InlinePiece::Math(source) => {
                    line.push(FORMULA_SLOT);
                    formulas.push(self.build_formula(source));
                }
                InlinePiece::Text(span) => {
                    let unescaped = span.replace(FORMULA_SLOT, "").replace("\\$", "$");
                    let normalized = self.normalizer.normalize_span(&unescaped);
                    let mut span = normalized.as_str();
                    if i == 0 {
                        span = span.trim_start();
                    }
                    if i == last {
                        span = span.trim_end();
                    }
                    line.push_str(span);
                }
            }
        }

        let mut formulas = formulas.into_iter();
        let mut runs = Vec::new();
        self.emphasis_runs(&line, role, emphasis, &mut formulas, &mut runs);
        runs
    }

    fn emphasis_runs(
        &self,
        text: &str,
        role: TextRole,
        apply: bool,
        formulas: &mut impl Iterator<Item = Vec<Run>>,
        out: &mut Vec<Run>,
    ) {
        let mut last = 0;
        for caps in self.emphasis_regex.captures_iter(text) {
            let (Some(whole), Some((flags, inner))) = (caps.get(0), emphasis_of(&caps)) else {
                continue;
            };
            if whole.start() > last {
                let before = &text[last..whole.start()];
                self.slotted_runs(before, role, Emphasis::default(), formulas, out);
            }
            let flags = if apply { flags } else { Emphasis::default() };
            self.slotted_runs(inner, role, flags, formulas, out);
            last = whole.end();
        }
        if last < text.len() {
            self.slotted_runs(&text[last..], role, Emphasis::default(), formulas, out);
        }
    }

    /// Emit text around formula slots; formula runs keep their own style.
    fn slotted_runs(
        &self,
        text: &str,
        role: TextRole,
        emphasis: Emphasis,
        formulas: &mut impl Iterator<Item = Vec<Run>>,
        out: &mut Vec<Run>,
    ) {
        for (i, part) in text.split(FORMULA_SLOT).enumerate() {
            if i > 0 {
                out.extend(formulas.next().unwrap_or_default());
            }
            if !part.is_empty() {
                self.vertical_runs(part, role, emphasis, out);
            }
        }
    }

    fn vertical_runs(&self, text: &str, role: TextRole, emphasis: Emphasis, out: &mut Vec<Run>) {
        let mut pending = String::new();
        let mut last = 0;

        for caps in self.vertical_regex.captures_iter(text) {
            let Some(whole) = caps.get(0) else { continue };
            let (position, content) = vertical_of(&caps);

            pending.push_str(&text[last..whole.start()]);
            last = whole.end();

            if content.is_empty() {
                pending.push_str(whole.as_str());
                continue;
            }

            if self.native_vertical {
                out.extend(self.script_runs(&pending, role, emphasis, RunKind::Normal));
                pending.clear();
                out.extend(self.script_runs(
                    content,
                    role,
                    emphasis,
                    RunKind::Vertical { position },
                ));
            } else {
                let mapped = match position {
                    VerticalPosition::Superscript => to_superscript(content),
                    VerticalPosition::Subscript => to_subscript(content),
                };
                pending.push_str(mapped.as_deref().unwrap_or(whole.as_str()));
            }
        }

        pending.push_str(&text[last..]);
        out.extend(self.script_runs(&pending, role, emphasis, RunKind::Normal));
    }

    fn script_runs(&self, text: &str, role: TextRole, emphasis: Emphasis, kind: RunKind) -> Vec<Run> {
        split_by_script(text)
            .into_iter()
            .map(|(script, piece)| {
                let style = self.style_for(role, script).with_emphasis(emphasis);
                Run::new(piece, script).with_kind(kind).with_style(style)
            })
            .collect()
    }

    /// Resolve the base style of a run from its role and script.
    pub fn style_for(&self, role: TextRole, script: Script) -> RunStyle {
        let rtl = match script {
            Script::Primary => true,
            Script::Secondary => false,
            Script::Neutral => self.base_rtl,
        };
        let latin = script == Script::Secondary || (script == Script::Neutral && !rtl);

        let (font, bold) = match role {
            TextRole::Body if latin => (self.fonts.secondary.clone(), false),
            TextRole::Body => (self.fonts.primary.clone(), false),
            TextRole::Heading(level) => {
                let family = if latin {
                    self.fonts.secondary.family.clone()
                } else {
                    self.fonts.heading_family.clone()
                };
                (FontSpec::new(family, self.fonts.heading_size(level)), true)
            }
            TextRole::Caption => (self.role_font(&self.fonts.caption, latin), false),
            TextRole::TableHeader => (self.role_font(&self.fonts.table_header, latin), true),
            TextRole::TableBody => (self.role_font(&self.fonts.table_body, latin), false),
        };

        RunStyle {
            bold,
            font_name: font.family,
            font_size: font.size,
            rtl,
            ..Default::default()
        }
    }

    fn role_font(&self, spec: &FontSpec, latin: bool) -> FontSpec {
        if latin {
            FontSpec::new(self.fonts.secondary.family.clone(), spec.size)
        } else {
            spec.clone()
        }
    }

    fn formula_style(&self) -> RunStyle {
        RunStyle {
            font_name: self.fonts.formula.family.clone(),
            font_size: self.fonts.formula.size,
            rtl: false,
            ..Default::default()
        }
    }
}

fn emphasis_of<'t>(caps: &Captures<'t>) -> Option<(Emphasis, &'t str)> {
    if let Some(m) = caps.get(1) {
        Some((Emphasis::bold(), m.as_str()))
    } else if let Some(m) = caps.get(2) {
        Some((Emphasis::strike(), m.as_str()))
    } else {
        caps.get(3).map(|m| (Emphasis::italic(), m.as_str()))
    }
}

fn vertical_of<'t>(caps: &Captures<'t>) -> (VerticalPosition, &'t str) {
    if let Some(m) = caps.get(1).or_else(|| caps.get(3)) {
        (VerticalPosition::Superscript, m.as_str())
    } else {
        let content = caps.get(2).or_else(|| caps.get(4)).map(|m| m.as_str());
        (VerticalPosition::Subscript, content.unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn builder() -> RunBuilder {
        RunBuilder::new(&RenderConfig::default())
    }

    fn texts(runs: &[Run]) -> Vec<&str> {
        runs.iter().map(|r| r.text.as_str()).collect()
    }

    #[test]
    fn test_bold_splits_three_runs() {
        let runs = builder().build_text("a **b** c", TextRole::Body);
        assert_eq!(texts(&runs), vec!["a ", "b", " c"]);
        assert!(!runs[0].style.bold);
        assert!(runs[1].style.bold);
        assert!(!runs[2].style.bold);
    }

    #[test]
    fn test_italic_and_strike() {
        let runs = builder().build_text("*x* and ~~y~~", TextRole::Body);
        assert_eq!(texts(&runs), vec!["x", " and ", "y"]);
        assert!(runs[0].style.italic);
        assert!(runs[2].style.strike);

        let config = RenderConfig::default().with_italic_markers(false);
        let runs = RunBuilder::new(&config).build_text("*x*", TextRole::Body);
        assert_eq!(texts(&runs), vec!["*x*"]);
    }

    #[test]
    fn test_script_runs_and_fonts() {
        let runs = builder().build_text("سلام world", TextRole::Body);
        assert_eq!(texts(&runs), vec!["سلام", " ", "world"]);
        assert_eq!(runs[0].script, Script::Primary);
        assert!(runs[0].style.rtl);
        assert_eq!(runs[0].style.font_name, "B Nazanin");
        // the space between scripts follows the base direction
        assert_eq!(runs[1].script, Script::Neutral);
        assert!(runs[1].style.rtl);
        assert_eq!(runs[2].script, Script::Secondary);
        assert!(!runs[2].style.rtl);
        assert_eq!(runs[2].style.font_name, "Times New Roman");
    }

    #[test]
    fn test_inline_formula_run() {
        let runs = builder().build_text("مقدار $\\alpha$ است", TextRole::Body);
        assert_eq!(texts(&runs), vec!["مقدار ", "α", " است"]);
        assert!(runs[1].is_formula());
        assert_eq!(runs[1].style.font_name, "Cambria Math");
        assert!(!runs[1].style.rtl);
    }

    #[test]
    fn test_formula_content_not_emphasized() {
        let runs = builder().build_text("**bold** $a*b*c$", TextRole::Body);
        let formula = runs.iter().find(|r| r.is_formula()).unwrap();
        assert_eq!(formula.text, "a*b*c");
        assert!(!formula.style.italic);
    }

    #[test]
    fn test_unmatched_dollar_literal() {
        let runs = builder().build_text("price $5", TextRole::Body);
        assert_eq!(texts(&runs).concat(), "price $5");
        assert!(runs.iter().all(|r| !r.is_formula()));
    }

    #[test]
    fn test_vertical_native() {
        let runs = builder().build_text("x^2 و H_{2}O", TextRole::Body);
        let raised: Vec<_> = runs.iter().filter(|r| r.vertical_position().is_some()).collect();
        assert_eq!(raised.len(), 2);
        assert_eq!(raised[0].text, "2");
        assert_eq!(raised[0].vertical_position(), Some(VerticalPosition::Superscript));
        assert_eq!(raised[1].vertical_position(), Some(VerticalPosition::Subscript));
    }

    #[test]
    fn test_vertical_unicode_fallback() {
        let config = RenderConfig::default().with_native_vertical_position(false);
        let runs = RunBuilder::new(&config).build_text("x^2 + y^{ab}", TextRole::Body);
        assert_eq!(texts(&runs).concat(), "x² + y^{ab}");
    }

    #[test]
    fn test_plain_strips_markers() {
        let runs = builder().build_plain("**عنوان** اصلی", TextRole::Heading(1));
        assert_eq!(texts(&runs).concat(), "عنوان اصلی");
        // headings are bold through their role, not through markup
        assert!(runs.iter().all(|r| r.style.bold));
        assert_eq!(runs[0].style.font_name, "B Titr");
        assert_eq!(runs[0].style.font_size, 18.0);
    }

    #[test]
    fn test_literal_keeps_markup() {
        let runs = builder().build_literal("| a | **b** |", TextRole::Body);
        assert_eq!(texts(&runs).concat(), "| a | **b** |");
    }

    #[test]
    fn test_runs_concatenate_to_normalized_text() {
        let b = builder();
        let input = "  این   یک متن mixed است ،  با **تاکید**  ";
        let runs = b.build_text(input, TextRole::Body);
        let joined: String = texts(&runs).concat();
        let expected = b.normalizer().normalize(input).replace("**", "");
        assert_eq!(joined, expected);
    }

    #[test]
    fn test_emphasis_spans_inline_formula() {
        let runs = builder().build_text("**مقدار $x$ است**", TextRole::Body);
        assert_eq!(texts(&runs), vec!["مقدار ", "x", " است"]);
        assert!(runs[0].style.bold);
        assert!(runs[1].is_formula());
        assert!(!runs[1].style.bold);
        assert!(runs[2].style.bold);
    }

    #[test]
    fn test_escaped_dollar() {
        let runs = builder().build_text("price \\$5 and $y$", TextRole::Body);
        assert_eq!(texts(&runs), vec!["price $5 and ", "y"]);
        assert!(runs[1].is_formula());
    }

    #[test]
    fn test_empty_input() {
        assert!(builder().build_text("", TextRole::Body).is_empty());
        assert!(builder().build_formula("  ").is_empty());
    }
}
