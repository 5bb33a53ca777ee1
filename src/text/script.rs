//! Script classification and script-run splitting.

use unicode_bidi::{bidi_class, BidiClass};

use crate::model::{Direction, Run, RunKind, Script};

/// Classify a character into the primary (right-to-left) script, the
/// secondary (Latin) script, or neutral.
///
/// Digits inside the Arabic block are neutral so that numbers inherit the
/// direction of the text around them.
pub fn classify(c: char) -> Script {
    match c {
        '\u{0600}'..='\u{06FF}' | '\u{FB50}'..='\u{FDFF}' | '\u{FE70}'..='\u{FEFF}' => {
            if c.is_numeric() || c == '\u{FEFF}' {
                Script::Neutral
            } else {
                Script::Primary
            }
        }
        'A'..='Z' | 'a'..='z' => Script::Secondary,
        '\u{00C0}'..='\u{00FF}' if c.is_alphabetic() => Script::Secondary,
        _ => Script::Neutral,
    }
}

/// Strong bidirectional direction of a character, if it has one.
pub fn direction_of(c: char) -> Option<Direction> {
    match bidi_class(c) {
        BidiClass::L => Some(Direction::Ltr),
        BidiClass::R | BidiClass::AL => Some(Direction::Rtl),
        _ => None,
    }
}

/// Check if the text contains any primary-script character.
pub fn has_primary(text: &str) -> bool {
    text.chars().any(|c| classify(c) == Script::Primary)
}

/// Strong direction of a run, used for majority votes.
///
/// Formula runs never vote. Neutral runs vote with their first strongly
/// directional character (Greek, Hebrew, ...), if any.
pub fn run_direction(run: &Run) -> Option<Direction> {
    if matches!(run.kind, RunKind::Formula) {
        return None;
    }
    match run.script {
        Script::Primary => Some(Direction::Rtl),
        Script::Secondary => Some(Direction::Ltr),
        Script::Neutral => run.text.chars().find_map(direction_of),
    }
}

/// Split text into maximal same-script stretches.
///
/// Neutral characters join the run before them; leading neutrals join the
/// first strong run. A neutral stretch sitting between two different strong
/// scripts becomes its own neutral piece. Text with no strong character is
/// returned as one neutral piece. The pieces always concatenate back to the
/// input.
pub fn split_by_script(text: &str) -> Vec<(Script, String)> {
    let mut pieces: Vec<(Script, String)> = Vec::new();
    let mut pending = String::new();
    let mut current: Option<Script> = None;

    for c in text.chars() {
        let script = classify(c);
        if script == Script::Neutral {
            pending.push(c);
            continue;
        }

        match current {
            Some(active) if active == script => {
                if let Some((_, buf)) = pieces.last_mut() {
                    buf.push_str(&pending);
                    buf.push(c);
                }
                pending.clear();
            }
            Some(_) => {
                if !pending.is_empty() {
                    pieces.push((Script::Neutral, std::mem::take(&mut pending)));
                }
                pieces.push((script, c.to_string()));
            }
            None => {
                let mut buf = std::mem::take(&mut pending);
                buf.push(c);
                pieces.push((script, buf));
            }
        }
        current = Some(script);
    }

    if !pending.is_empty() {
        match pieces.last_mut() {
            Some((_, buf)) => buf.push_str(&pending),
            None => pieces.push((Script::Neutral, pending)),
        }
    }

    pieces
}
