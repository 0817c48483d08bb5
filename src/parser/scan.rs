//! Comment- and string-aware scanning primitives.
//!
//! Block extraction works on masked copies of the source. A mask has the same
//! byte length and the same line breaks as the original, with comment text
//! (and optionally string interiors) replaced by spaces. Offsets found in a
//! mask can therefore be used directly against the original content.
//!
//! Heredocs (`<<EOF` and `<<-EOF`) are string literals: their body is kept
//! or blanked like a quoted string, up to the line whose trimmed text is the
//! closing marker. Nested quotes inside `${...}` interpolations are not
//! understood; a quoted string simply ends at the next unescaped `"` or
//! newline.

use regex::Regex;
use std::sync::LazyLock;

// Capture groups: 1=closing marker. The opener must end its line.
static HEREDOC_START: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^<<-?([A-Za-z_][A-Za-z0-9_-]*)[ \t]*\r?\n").expect("Invalid regex")
});

/// What a mask blanks out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaskMode {
    /// Blank `#`, `//` and `/* */` comments only.
    Comments,
    /// Blank comments and the interior of string literals (quotes are kept).
    CommentsAndStrings,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Code,
    LineComment,
    BlockComment,
    Str,
}

/// Produce a masked copy of `content`.
#[must_use]
pub fn mask(content: &str, mode: MaskMode) -> String {
    let mut out = String::with_capacity(content.len());
    let mut state = State::Code;
    let mut chars = content.char_indices().peekable();

    while let Some((offset, c)) = chars.next() {
        match state {
            State::Code => match c {
                '<' if chars.peek().map(|&(_, next)| next) == Some('<') => {
                    let Some(opener) = HEREDOC_START.captures(&content[offset..]) else {
                        out.push(c);
                        continue;
                    };
                    let body_start = offset + opener[0].len();
                    let body_end = heredoc_close(content, body_start, &opener[1]);

                    // The opener line is code; the body is string content.
                    out.push_str(&content[offset..body_start]);
                    for ch in content[body_start..body_end].chars() {
                        string_char(&mut out, ch, mode);
                    }
                    while chars.next_if(|&(i, _)| i < body_end).is_some() {}
                }
                '#' => {
                    state = State::LineComment;
                    blank(&mut out, c);
                }
                '/' if chars.peek().map(|&(_, next)| next) == Some('/') => {
                    state = State::LineComment;
                    blank(&mut out, c);
                }
                '/' if chars.peek().map(|&(_, next)| next) == Some('*') => {
                    state = State::BlockComment;
                    blank(&mut out, c);
                    if let Some((_, star)) = chars.next() {
                        blank(&mut out, star);
                    }
                }
                '"' => {
                    state = State::Str;
                    out.push(c);
                }
                _ => out.push(c),
            },
            State::LineComment => {
                if c == '\n' {
                    state = State::Code;
                }
                blank(&mut out, c);
            }
            State::BlockComment => {
                if c == '*' && chars.peek().map(|&(_, next)| next) == Some('/') {
                    blank(&mut out, c);
                    if let Some((_, slash)) = chars.next() {
                        blank(&mut out, slash);
                    }
                    state = State::Code;
                } else {
                    blank(&mut out, c);
                }
            }
            State::Str => match c {
                '"' => {
                    state = State::Code;
                    out.push(c);
                }
                '\n' => {
                    state = State::Code;
                    out.push(c);
                }
                '\\' => {
                    string_char(&mut out, c, mode);
                    if let Some((_, escaped)) = chars.next() {
                        if escaped == '\n' {
                            state = State::Code;
                        }
                        string_char(&mut out, escaped, mode);
                    }
                }
                _ => string_char(&mut out, c, mode),
            },
        }
    }

    out
}

/// Byte offset where the heredoc body starting at `body_start` ends: the
/// start of its closing-marker line, or the end of `content` if the marker
/// never appears.
fn heredoc_close(content: &str, body_start: usize, marker: &str) -> usize {
    let mut line_start = body_start;
    for line in content[body_start..].split_inclusive('\n') {
        if line.trim() == marker {
            return line_start;
        }
        line_start += line.len();
    }
    content.len()
}

/// Replace `c` with spaces of the same UTF-8 width, keeping line breaks.
fn blank(out: &mut String, c: char) {
    if c == '\n' {
        out.push('\n');
    } else {
        out.extend(std::iter::repeat(' ').take(c.len_utf8()));
    }
}

fn string_char(out: &mut String, c: char, mode: MaskMode) {
    match mode {
        MaskMode::Comments => out.push(c),
        MaskMode::CommentsAndStrings => blank(out, c),
    }
}

/// Find the `}` matching the `{` at byte offset `open`.
///
/// `masked` must be a [`MaskMode::CommentsAndStrings`] mask. Returns `None`
/// when `open` is not a `{` or the block is never closed.
#[must_use]
pub fn find_matching_brace(masked: &str, open: usize) -> Option<usize> {
    let bytes = masked.as_bytes();
    if bytes.get(open) != Some(&b'{') {
        return None;
    }

    let mut depth = 0usize;
    for (offset, byte) in bytes[open..].iter().enumerate() {
        match byte {
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(open + offset);
                }
            }
            _ => {}
        }
    }

    None
}

/// 1-based line number of byte offset `offset`.
#[must_use]
pub fn line_number_at(content: &str, offset: usize) -> usize {
    let end = offset.min(content.len());
    content.as_bytes()[..end].iter().filter(|b| **b == b'\n').count() + 1
}

/// A source file together with its masks.
///
/// Built once per file and shared by every block lookup in that file.
#[derive(Debug, Clone)]
pub struct MaskedSource<'a> {
    /// The original text.
    pub raw: &'a str,
    /// Comments blanked; string literals intact.
    pub code: String,
    /// Comments and string interiors blanked.
    pub structure: String,
}

impl<'a> MaskedSource<'a> {
    /// Mask `raw` in both modes.
    #[must_use]
    pub fn new(raw: &'a str) -> Self {
        Self {
            raw,
            code: mask(raw, MaskMode::Comments),
            structure: mask(raw, MaskMode::CommentsAndStrings),
        }
    }

    /// 1-based line number of a byte offset.
    #[must_use]
    pub fn line_at(&self, offset: usize) -> usize {
        line_number_at(self.raw, offset)
    }

    /// Locate the first structural `{` at or after `from` and its matching `}`.
    ///
    /// Returns `(open, close)` offsets, or `None` if there is no opening brace
    /// or it is never closed.
    #[must_use]
    pub fn block_from(&self, from: usize) -> Option<(usize, usize)> {
        let open = from + self.structure.get(from..)?.find('{')?;
        let close = find_matching_brace(&self.structure, open)?;
        Some((open, close))
    }
}
