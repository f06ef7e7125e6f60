//! Minimal parser for `jj log` output produced with `LOG_TEMPLATE`.
//!
//! The template prefixes each revision's fields with a record separator
//! (U+001E) and separates fields with a unit separator (U+001F). Anything
//! before the record separator on that line is graph gutter. Lines without a
//! record separator are connector lines and belong to the preceding row.

use std::io::{self, BufRead};

use core_model::{Commit, GraphRowLine, LineFlags, Row, Segment, SegmentRole};

const RECORD: char = '\u{1e}';
const FIELD: char = '\u{1f}';

pub const LOG_TEMPLATE: &str = concat!(
    "\"\u{1e}\" ++ change_id.short() ++ \"\u{1f}\" ++ commit_id.short() ++ \"\u{1f}\" ++ ",
    "if(current_working_copy, \"@\") ++ \"\u{1f}\" ++ if(immutable, \"immutable\") ++ \"\u{1f}\" ++ ",
    "bookmarks.join(\" \") ++ \"\u{1f}\" ++ author.email() ++ \"\u{1f}\" ++ ",
    "description.first_line() ++ \"\\n\""
);

const EMPTY_DESCRIPTION: &str = "(no description set)";

/// Pull-based row reader. A row is complete once the next revision line (or
/// end of input) has been seen, so the parser holds one row in reserve.
pub struct RowParser<R> {
    reader: R,
    pending: Option<Row>,
    line: String,
    eof: bool,
}

impl<R: BufRead> RowParser<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            pending: None,
            line: String::new(),
            eof: false,
        }
    }

    pub fn next_row(&mut self) -> io::Result<Option<Row>> {
        loop {
            if self.eof {
                return Ok(self.pending.take());
            }
            self.line.clear();
            if self.reader.read_line(&mut self.line)? == 0 {
                self.eof = true;
                continue;
            }
            match parse_line(self.line.trim_end_matches(['\n', '\r'])) {
                Parsed::Revision(row) => {
                    if let Some(done) = self.pending.replace(row) {
                        return Ok(Some(done));
                    }
                }
                // Output before the first revision has no owner.
                Parsed::Connector(line) => {
                    if let Some(row) = self.pending.as_mut() {
                        row.lines.push(line);
                    }
                }
            }
        }
    }
}

/// Parse a complete log output.
pub fn parse_rows<R: BufRead>(reader: R) -> io::Result<Vec<Row>> {
    let mut parser = RowParser::new(reader);
    let mut rows = Vec::new();
    while let Some(row) = parser.next_row()? {
        rows.push(row);
    }
    Ok(rows)
}

enum Parsed {
    Revision(Row),
    Connector(GraphRowLine),
}

fn parse_line(line: &str) -> Parsed {
    let Some((gutter, record)) = line.split_once(RECORD) else {
        let flags = if line.trim() == "~" {
            LineFlags::ELIDED
        } else {
            LineFlags::CONNECTOR
        };
        return Parsed::Connector(GraphRowLine {
            gutter: vec![Segment::new(line)],
            segments: Vec::new(),
            flags,
        });
    };

    let fields: Vec<&str> = record.split(FIELD).collect();
    let field = |idx: usize| fields.get(idx).copied().unwrap_or("").trim();

    let commit = Commit {
        change_id: field(0).to_string(),
        commit_id: field(1).to_string(),
        is_working_copy: field(2) == "@",
        immutable: field(3) == "immutable",
        bookmarks: field(4).split_whitespace().map(str::to_string).collect(),
        author: field(5).to_string(),
        description: field(6).to_string(),
    };

    let mut segments = vec![
        Segment::with_role(&commit.change_id, SegmentRole::ChangeId),
        Segment::with_role(&commit.commit_id, SegmentRole::CommitId),
    ];
    if !commit.bookmarks.is_empty() {
        segments.push(Segment::with_role(
            commit.bookmarks.join(" "),
            SegmentRole::Bookmark,
        ));
    }
    if !commit.author.is_empty() {
        segments.push(Segment::with_role(&commit.author, SegmentRole::Author));
    }
    let description = if commit.description.is_empty() {
        EMPTY_DESCRIPTION
    } else {
        commit.description.as_str()
    };
    segments.push(Segment::with_role(description, SegmentRole::Description));

    let line = GraphRowLine {
        gutter: vec![Segment::new(gutter)],
        segments,
        flags: LineFlags::REVISION,
    };
    Parsed::Revision(Row::new(commit, vec![line]))
}
