//! Mixed-content segmentation.
//!
//! Generated study text interleaves three sub-languages: display math in
//! `\[ ... \]`, inline math in `\( ... \)`, and lightly marked-up prose.
//! Segmentation runs two passes: display spans are cut first over the whole
//! input, then inline spans are cut inside each remaining stretch of text.
//!
//! Example:
//! ```text
//! The formula is \(v=u+at\) and also \[ s = ut + \frac{1}{2}at^2 \]
//! ```
//! splits into `Text`, `InlineMath("v=u+at")`, `Text`, and
//! `DisplayMath(" s = ut + \frac{1}{2}at^2 ")`.
//!
//! Delimiters do not nest. A span closes at the first close token after its
//! open; an open token with another same-kind open before any close, or with
//! no close at all, is not math and stays literal text. Malformed input
//! therefore degrades to prose instead of failing the whole document.

const DISPLAY_OPEN: &str = "\\[";
const DISPLAY_CLOSE: &str = "\\]";
const INLINE_OPEN: &str = "\\(";
const INLINE_CLOSE: &str = "\\)";

/// One classified span of a notes document.
///
/// `raw` holds the exact source bytes of the span, with math delimiters
/// stripped. [`reconstruct`] puts the delimiters back, so a segment run
/// always concatenates to the exact input it was cut from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// Block math between `\[` and `\]`.
    DisplayMath { raw: String },
    /// Inline math between `\(` and `\)`.
    InlineMath { raw: String },
    /// Prose; may carry `**bold**`, `*italic*` and newline markers, which
    /// are resolved at render time, not here.
    Text { raw: String },
}

impl Segment {
    pub fn raw(&self) -> &str {
        match self {
            Segment::DisplayMath { raw }
            | Segment::InlineMath { raw }
            | Segment::Text { raw } => raw,
        }
    }
}

/// Splits `input` into an ordered run of segments.
///
/// Total: never fails, never drops bytes. Empty spans (`\[\]`, `\(\)`) are
/// valid zero-length math; adjacent spans stay separate; no empty `Text`
/// segments are emitted.
pub fn segment(input: &str) -> Vec<Segment> {
    let mut out = Vec::new();
    for piece in scan_pairs(input, DISPLAY_OPEN, DISPLAY_CLOSE) {
        match piece {
            Scan::Inside(raw) => out.push(Segment::DisplayMath {
                raw: raw.to_string(),
            }),
            Scan::Outside(residue) => segment_inline(residue, &mut out),
        }
    }
    out
}

/// Rebuilds the exact source string for a run of segments.
pub fn reconstruct(segments: &[Segment]) -> String {
    let mut out = String::new();
    for seg in segments {
        match seg {
            Segment::DisplayMath { raw } => {
                out.push_str(DISPLAY_OPEN);
                out.push_str(raw);
                out.push_str(DISPLAY_CLOSE);
            }
            Segment::InlineMath { raw } => {
                out.push_str(INLINE_OPEN);
                out.push_str(raw);
                out.push_str(INLINE_CLOSE);
            }
            Segment::Text { raw } => out.push_str(raw),
        }
    }
    out
}

fn segment_inline(residue: &str, out: &mut Vec<Segment>) {
    for piece in scan_pairs(residue, INLINE_OPEN, INLINE_CLOSE) {
        match piece {
            Scan::Inside(raw) => out.push(Segment::InlineMath {
                raw: raw.to_string(),
            }),
            Scan::Outside(text) => out.push(Segment::Text {
                raw: text.to_string(),
            }),
        }
    }
}

/// A stretch of input relative to one delimiter pair.
enum Scan<'a> {
    /// Between an open and its close, delimiters excluded.
    Inside(&'a str),
    /// Everything else, open tokens of unterminated spans included.
    Outside(&'a str),
}

/// Cuts `input` at `open`/`close` pairs, left to right.
///
/// A span closes at the first `close` after its `open`. If another `open`
/// shows up first, or the input ends, the open token is literal: scanning
/// resumes right after it and the skipped bytes stay in the surrounding
/// `Outside` piece. Close tokens without a preceding open are literal too.
fn scan_pairs<'a>(input: &'a str, open: &str, close: &str) -> Vec<Scan<'a>> {
    let mut pieces = Vec::new();
    let mut outside_start = 0;
    let mut cursor = 0;

    while let Some(found) = input[cursor..].find(open) {
        let open_at = cursor + found;
        let content_at = open_at + open.len();
        let close_rel = input[content_at..].find(close);
        let next_open_rel = input[content_at..].find(open);

        let terminated = match (close_rel, next_open_rel) {
            (Some(c), Some(o)) => c < o,
            (Some(_), None) => true,
            (None, _) => false,
        };

        if terminated {
            let close_at = content_at + close_rel.unwrap_or_default();
            if outside_start < open_at {
                pieces.push(Scan::Outside(&input[outside_start..open_at]));
            }
            pieces.push(Scan::Inside(&input[content_at..close_at]));
            cursor = close_at + close.len();
            outside_start = cursor;
        } else {
            cursor = content_at;
        }
    }

    if outside_start < input.len() {
        pieces.push(Scan::Outside(&input[outside_start..]));
    }
    pieces
}
