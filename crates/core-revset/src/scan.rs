//! Quote-aware scanners over revset text.
//!
//! Only ASCII delimiters are inspected, so every index returned is a valid
//! char boundary of the input.

/// Tracks whether the scanner is inside a quoted literal.
#[derive(Default)]
struct Quotes {
    open: Option<u8>,
    escaped: bool,
}

impl Quotes {
    /// Feed one byte; returns true when the byte is part of a literal (or
    /// opens one) and must not be treated as structure.
    fn consume(&mut self, byte: u8) -> bool {
        if let Some(quote) = self.open {
            if self.escaped {
                self.escaped = false;
            } else if byte == b'\\' {
                self.escaped = true;
            } else if byte == quote {
                self.open = None;
            }
            return true;
        }
        if byte == b'\'' || byte == b'"' {
            self.open = Some(byte);
            return true;
        }
        false
    }
}

/// Index of the `)` matching the `(` at `open`.
pub fn find_matching_paren(s: &str, open: usize) -> Option<usize> {
    let bytes = s.as_bytes();
    if bytes.get(open) != Some(&b'(') {
        return None;
    }
    let mut depth = 0usize;
    let mut quotes = Quotes::default();
    for (idx, &byte) in bytes.iter().enumerate().skip(open) {
        if quotes.consume(byte) {
            continue;
        }
        match byte {
            b'(' => depth += 1,
            b')' => {
                depth -= 1;
                if depth == 0 {
                    return Some(idx);
                }
            }
            _ => {}
        }
    }
    None
}

/// Index of the first comma outside parentheses and quotes.
pub fn first_top_level_comma(args: &str) -> Option<usize> {
    let mut depth = 0usize;
    let mut quotes = Quotes::default();
    for (idx, &byte) in args.as_bytes().iter().enumerate() {
        if quotes.consume(byte) {
            continue;
        }
        match byte {
            b'(' => depth += 1,
            b')' => depth = depth.saturating_sub(1),
            b',' if depth == 0 => return Some(idx),
            _ => {}
        }
    }
    None
}

/// Shrink `start..end` past surrounding spaces, tabs and line breaks.
pub fn trim_range(s: &str, mut start: usize, mut end: usize) -> (usize, usize) {
    let blank = |b: u8| matches!(b, b' ' | b'\t' | b'\n' | b'\r');
    let bytes = s.as_bytes();
    while start < end && blank(bytes[start]) {
        start += 1;
    }
    while start < end && blank(bytes[end - 1]) {
        end -= 1;
    }
    (start, end)
}
