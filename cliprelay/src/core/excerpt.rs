//! Selection of the part of a file copied to the clipboard.

use std::fmt;

/// How much of a file `write_file_to_clipboard` copies.
///
/// Limits are mutually exclusive with a fixed precedence: a character limit
/// wins over a line limit, and with neither the whole file is copied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ExcerptLimit {
    pub max_chars: Option<usize>,
    pub max_lines: Option<usize>,
}

impl ExcerptLimit {
    pub fn whole() -> Self {
        Self::default()
    }

    /// Return the prefix of `contents` selected by this limit.
    ///
    /// `max_chars` counts Unicode scalar values. `max_lines` keeps each line's
    /// terminator exactly as it appears in `contents`.
    pub fn apply<'a>(&self, contents: &'a str) -> &'a str {
        if let Some(max_chars) = self.max_chars {
            return match contents.char_indices().nth(max_chars) {
                Some((end, _)) => &contents[..end],
                None => contents,
            };
        }
        if let Some(max_lines) = self.max_lines {
            let end: usize = contents
                .split_inclusive('\n')
                .take(max_lines)
                .map(str::len)
                .sum();
            return &contents[..end];
        }
        contents
    }
}

impl fmt::Display for ExcerptLimit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.max_chars, self.max_lines) {
            (Some(chars), _) => write!(f, "first {chars} chars"),
            (None, Some(lines)) => write!(f, "first {lines} lines"),
            (None, None) => f.write_str("whole file"),
        }
    }
}
