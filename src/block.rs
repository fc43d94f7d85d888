//! Readers for logical blocks of lines.
//!
//! A block starts at the current line of a [`LineReader`] and ends at the
//! last line for which [`join_line()`](LineReader::join_line) holds. After
//! a block was read the reader is positioned at its last line, the caller
//! advances with `read_line()`.

use std::io;

use crate::error::Result;
use crate::line::LineReader;
use crate::policy::BufPolicy;
use crate::session::ParseSession;
use crate::validation::Origin;

/// How the lines of a multi-line block are joined
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Concatenate {
    /// Shrunk lines joined by a single space
    Space,
    /// Shrunk lines joined without separator
    NoSpace,
    /// Lines joined by `\n`, internal whitespace kept
    Break,
}

/// Content of a block together with the physical lines it spans
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Block {
    pub tag: String,
    pub text: String,
    pub first_line: u64,
    pub last_line: u64,
}

impl Block {
    /// Diagnostic origin covering the block. `line_offset` is added to the
    /// physical line numbers.
    pub fn origin(&self, file_id: Option<&str>, line_offset: u64) -> Origin {
        Origin::new(
            file_id.map(|s| s.to_string()),
            self.first_line + line_offset,
            self.last_line + line_offset,
        )
    }
}

/// Reads the content of the current line only.
pub fn read_single_line<R, P>(reader: &LineReader<R, P>) -> Block
where
    R: io::Read,
    P: BufPolicy,
{
    let line = reader.current_line_number();
    Block {
        tag: reader.current_tag().unwrap_or("").to_string(),
        text: shrink(reader.current_content()),
        first_line: line,
        last_line: line,
    }
}

/// Reads the current line and all following lines that belong to the same
/// block.
pub fn read_multi_line<R, P>(
    reader: &mut LineReader<R, P>,
    session: &mut ParseSession,
    concat: Concatenate,
) -> Result<Block>
where
    R: io::Read,
    P: BufPolicy,
{
    let mut block = Block {
        tag: reader.current_tag().unwrap_or("").to_string(),
        text: String::new(),
        first_line: reader.current_line_number(),
        last_line: reader.current_line_number(),
    };
    append(&mut block.text, reader.current_content(), concat, true);

    while reader.join_line() {
        reader.read_line(session)?;
        block.last_line = reader.current_line_number();
        append(&mut block.text, reader.current_content(), concat, false);
    }

    if concat == Concatenate::Break {
        while block.text.ends_with('\n') {
            block.text.pop();
        }
    }
    Ok(block)
}

fn append(text: &mut String, content: &str, concat: Concatenate, first: bool) {
    match concat {
        Concatenate::Space => {
            let s = shrink(content);
            if s.is_empty() {
                return;
            }
            if !text.is_empty() {
                text.push(' ');
            }
            text.push_str(&s);
        }
        Concatenate::NoSpace => text.push_str(&shrink(content)),
        Concatenate::Break => {
            if !first {
                text.push('\n');
            }
            text.push_str(content.trim_end());
        }
    }
}

/// Trims the text and collapses internal whitespace runs to a single space.
pub fn shrink(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for word in text.split_whitespace() {
        if !out.is_empty() {
            out.push(' ');
        }
        out.push_str(word);
    }
    out
}
