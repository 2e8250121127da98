//! Emphasis and line-break markers inside prose spans.
//!
//! Prose segments carry `**bold**`, `*italic*` and `\n` markers. Resolution
//! happens here, at render time, so segmentation stays independently
//! testable. Markers do not nest and never cross a line break; a marker
//! with no close on its line stays literal. At any position `**` is tried
//! before `*`.

/// One styled run of a prose span.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TextRun {
    Plain(String),
    Bold(String),
    Italic(String),
    /// Explicit line break from a `\n` in the source.
    Break,
}

/// Splits a prose span into styled runs, left to right.
pub fn parse_runs(text: &str) -> Vec<TextRun> {
    let mut runs = Vec::new();
    let mut plain = String::new();
    let mut i = 0;

    while i < text.len() {
        let rest = &text[i..];
        if rest.starts_with('\n') {
            flush_plain(&mut runs, &mut plain);
            runs.push(TextRun::Break);
            i += 1;
        } else if let Some(tail) = rest.strip_prefix("**") {
            match find_on_line(tail, "**") {
                Some(len) => {
                    flush_plain(&mut runs, &mut plain);
                    runs.push(TextRun::Bold(tail[..len].to_string()));
                    i += 2 + len + 2;
                }
                None => {
                    plain.push_str("**");
                    i += 2;
                }
            }
        } else if let Some(tail) = rest.strip_prefix('*') {
            match find_on_line(tail, "*") {
                Some(len) => {
                    flush_plain(&mut runs, &mut plain);
                    runs.push(TextRun::Italic(tail[..len].to_string()));
                    i += 1 + len + 1;
                }
                None => {
                    plain.push('*');
                    i += 1;
                }
            }
        } else {
            let ch = rest.chars().next().unwrap_or_default();
            plain.push(ch);
            i += ch.len_utf8();
        }
    }

    flush_plain(&mut runs, &mut plain);
    runs
}

fn flush_plain(runs: &mut Vec<TextRun>, plain: &mut String) {
    if !plain.is_empty() {
        runs.push(TextRun::Plain(std::mem::take(plain)));
    }
}

/// Position of `needle` in `hay`, searching only up to the first newline.
fn find_on_line(hay: &str, needle: &str) -> Option<usize> {
    let limit = hay.find('\n').unwrap_or(hay.len());
    hay[..limit].find(needle)
}
