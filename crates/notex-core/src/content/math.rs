//! Lightweight math-notation sanity check.
//!
//! Not a LaTeX parser; typesetting is someone else's job. This catches the
//! structural damage that makes a span untypesettable so the renderer can
//! swap in a flagged placeholder for just that span: unbalanced `{}` groups
//! outside escapes, and a span ending in a bare `\`.

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MathError {
    /// More `{` than `}` by the end of the span.
    UnclosedGroup { open: usize },
    /// A `}` with no matching `{`, at this byte offset.
    UnmatchedClose { at: usize },
    /// The span ends in a bare `\`.
    TrailingEscape,
}

impl fmt::Display for MathError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MathError::UnclosedGroup { open } => write!(f, "{open} unclosed group(s)"),
            MathError::UnmatchedClose { at } => write!(f, "unmatched close at byte {at}"),
            MathError::TrailingEscape => write!(f, "dangling escape at end of span"),
        }
    }
}

impl std::error::Error for MathError {}

/// Checks one math span for structural damage.
///
/// `\{` and `\}` are escaped braces and do not count toward grouping; any
/// other `\x` pair is skipped as a command head or escape.
pub fn check(raw: &str) -> Result<(), MathError> {
    let mut depth: usize = 0;
    let mut chars = raw.char_indices();

    while let Some((at, ch)) = chars.next() {
        match ch {
            '\\' => {
                if chars.next().is_none() {
                    return Err(MathError::TrailingEscape);
                }
            }
            '{' => depth += 1,
            '}' => {
                if depth == 0 {
                    return Err(MathError::UnmatchedClose { at });
                }
                depth -= 1;
            }
            _ => {}
        }
    }

    if depth > 0 {
        return Err(MathError::UnclosedGroup { open: depth });
    }
    Ok(())
}
