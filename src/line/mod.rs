//! Tag aware line reading.
//!
//! [`LineReader`] sits on top of a [`LineSource`] and classifies each
//! physical line by its leading tag. It keeps one line of lookahead, which
//! the block readers use to decide whether the following line continues the
//! current block ([`join_line`](LineReader::join_line)).
//!
//! ```
//! use embl_io::line::{LineReader, TagLayout};
//! use embl_io::session::ParseSession;
//!
//! let input = b"DE   Trifolium repens mRNA\nDE   for non-cyanogenic protein\n\nXX\n";
//! let mut session = ParseSession::new();
//! let mut reader = LineReader::new(&input[..], TagLayout::EMBL);
//!
//! assert!(reader.read_line(&mut session).unwrap());
//! assert_eq!(reader.current_tag(), Some("DE"));
//! assert_eq!(reader.current_content(), "Trifolium repens mRNA");
//! assert!(reader.join_line());
//!
//! reader.read_line(&mut session).unwrap();
//! // the blank line is skipped
//! assert_eq!(reader.next_tag(), Some("XX"));
//! assert!(!reader.join_line());
//! assert_eq!(session.tag_count("DE"), 2);
//! ```

use std::fs::File;
use std::io;
use std::path::Path;

use crate::error::Result;
use crate::policy::{BufPolicy, StdPolicy};
use crate::session::ParseSession;

pub mod source;

pub use self::source::{LineSource, Position, BUFSIZE};

/// Column layout of a flat file format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TagLayout {
    /// Number of leading columns that may hold the tag
    pub tag_width: usize,
    /// Column (0-based) at which the content of a line starts
    pub content_offset: usize,
}

impl TagLayout {
    /// `ID   X56734;`
    pub const EMBL: TagLayout = TagLayout {
        tag_width: 2,
        content_offset: 5,
    };

    /// `LOCUS       X56734`
    pub const GENBANK: TagLayout = TagLayout {
        tag_width: 12,
        content_offset: 12,
    };

    /// Creates a layout with the tag in the first `tag_width` columns and
    /// the content starting at `content_offset`.
    ///
    /// # Panics
    ///
    /// Panics if `content_offset` is smaller than `tag_width`.
    pub fn new(tag_width: usize, content_offset: usize) -> Self {
        assert!(content_offset >= tag_width);
        TagLayout {
            tag_width,
            content_offset,
        }
    }
}

impl Default for TagLayout {
    fn default() -> Self {
        TagLayout::EMBL
    }
}

#[derive(Debug, Clone, Default)]
struct Line {
    text: String,
    // byte offset of the end of the tag, 0 for untagged lines
    tag_end: usize,
    tag_start: usize,
    number: u64,
}

impl Line {
    #[inline]
    fn tag(&self) -> Option<&str> {
        if self.tag_end > self.tag_start {
            Some(&self.text[self.tag_start..self.tag_end])
        } else {
            None
        }
    }
}

/// Reads tagged lines with one line of lookahead.
pub struct LineReader<R, P = StdPolicy>
where
    R: io::Read,
{
    source: LineSource<R, P>,
    layout: TagLayout,
    current: Option<Line>,
    next: Option<Line>,
    active_tag: Option<String>,
    buf: Vec<u8>,
    started: bool,
}

impl LineReader<File> {
    #[inline]
    pub fn from_path<F: AsRef<Path>>(path: F, layout: TagLayout) -> io::Result<LineReader<File>> {
        LineSource::from_path(path).map(|s| LineReader::from_source(s, layout))
    }
}

impl<R> LineReader<R>
where
    R: io::Read,
{
    #[inline]
    pub fn new(reader: R, layout: TagLayout) -> Self {
        Self::from_source(LineSource::new(reader), layout)
    }

    #[inline]
    pub fn with_capacity(reader: R, capacity: usize, layout: TagLayout) -> Self {
        Self::from_source(LineSource::with_capacity(reader, capacity), layout)
    }
}

impl<R, P> LineReader<R, P>
where
    R: io::Read,
    P: BufPolicy,
{
    pub fn from_source(source: LineSource<R, P>, layout: TagLayout) -> Self {
        LineReader {
            source,
            layout,
            current: None,
            next: None,
            active_tag: None,
            buf: vec![],
            started: false,
        }
    }

    /// Returns a reader with the given buffer policy applied
    #[inline]
    pub fn set_policy<T: BufPolicy>(self, policy: T) -> LineReader<R, T> {
        LineReader {
            source: self.source.set_policy(policy),
            layout: self.layout,
            current: self.current,
            next: self.next,
            active_tag: self.active_tag,
            buf: self.buf,
            started: self.started,
        }
    }

    #[inline]
    pub fn policy(&self) -> &P {
        self.source.policy()
    }

    #[inline]
    pub fn layout(&self) -> TagLayout {
        self.layout
    }

    /// Advances to the next non-blank line. Returns `false` if the input is
    /// exhausted. The tag of the new current line is counted in `session`.
    pub fn read_line(&mut self, session: &mut ParseSession) -> Result<bool> {
        if !self.started {
            self.started = true;
            self.next = self.fetch()?;
        }
        self.current = self.next.take();
        if self.current.is_some() {
            self.next = self.fetch()?;
        }
        if let Some(tag) = self.current.as_ref().and_then(|l| l.tag()) {
            session.count_tag(tag);
            if self.active_tag.as_deref() != Some(tag) {
                self.active_tag = Some(tag.to_string());
            }
        }
        Ok(self.current.is_some())
    }

    // reads the next non-blank physical line
    fn fetch(&mut self) -> Result<Option<Line>> {
        loop {
            let number = self.source.next_position().line();
            self.buf.clear();
            if !self.source.read_line(&mut self.buf)? {
                return Ok(None);
            }
            for b in self.buf.iter_mut() {
                if *b < b' ' || *b == 0x7f {
                    *b = b' ';
                }
            }
            if self.buf.iter().all(|&b| b == b' ') {
                continue;
            }
            let text = String::from_utf8_lossy(&self.buf).into_owned();
            let (tag_start, tag_end) = locate_tag(&text, self.layout.tag_width);
            return Ok(Some(Line {
                text,
                tag_start,
                tag_end,
                number,
            }));
        }
    }

    /// `true` once `read_line()` returned `false`
    #[inline]
    pub fn is_eof(&self) -> bool {
        self.started && self.current.is_none()
    }

    /// Current line with control characters replaced by spaces
    #[inline]
    pub fn current_line(&self) -> Option<&str> {
        self.current.as_ref().map(|l| l.text.as_str())
    }

    #[inline]
    pub fn next_line(&self) -> Option<&str> {
        self.next.as_ref().map(|l| l.text.as_str())
    }

    #[inline]
    pub fn current_tag(&self) -> Option<&str> {
        self.current.as_ref().and_then(|l| l.tag())
    }

    #[inline]
    pub fn next_tag(&self) -> Option<&str> {
        self.next.as_ref().and_then(|l| l.tag())
    }

    #[inline]
    pub fn is_current_tag(&self, tag: &str) -> bool {
        self.current_tag() == Some(tag)
    }

    #[inline]
    pub fn is_next_tag(&self, tag: &str) -> bool {
        self.next_tag() == Some(tag)
    }

    /// The last tag seen on any line. Lines without a tag (e.g. sequence
    /// lines) belong to this tag's block.
    #[inline]
    pub fn active_tag(&self) -> Option<&str> {
        self.active_tag.as_deref()
    }

    /// Physical line number of the current line (1-based)
    #[inline]
    pub fn current_line_number(&self) -> u64 {
        self.current.as_ref().map(|l| l.number).unwrap_or(0)
    }

    #[inline]
    pub fn next_line_number(&self) -> u64 {
        self.next.as_ref().map(|l| l.number).unwrap_or(0)
    }

    /// `true` if the next line continues the block of the current line:
    /// it either has the same tag or no tag at all.
    pub fn join_line(&self) -> bool {
        let (current, next) = match (self.current.as_ref(), self.next.as_ref()) {
            (Some(c), Some(n)) => (c, n),
            _ => return false,
        };
        match next.tag() {
            None => true,
            Some(t) => current.tag() == Some(t),
        }
    }

    /// Content of the current line, starting at the content column. Empty if
    /// the line is shorter.
    #[inline]
    pub fn current_content(&self) -> &str {
        self.current
            .as_ref()
            .map(|l| content_at(&l.text, self.layout.content_offset))
            .unwrap_or("")
    }

    #[inline]
    pub fn next_content(&self) -> &str {
        self.next
            .as_ref()
            .map(|l| content_at(&l.text, self.layout.content_offset))
            .unwrap_or("")
    }

    /// Current line with the tag columns blanked, so that columns of the
    /// content stay where they are in the file.
    pub fn current_masked_line(&self) -> String {
        self.current
            .as_ref()
            .map(|l| mask(&l.text, self.layout.tag_width))
            .unwrap_or_default()
    }

    #[inline]
    pub fn next_masked_line(&self) -> String {
        self.next
            .as_ref()
            .map(|l| mask(&l.text, self.layout.tag_width))
            .unwrap_or_default()
    }
}

// Returns the byte range of the tag within the first `width` columns.
fn locate_tag(text: &str, width: usize) -> (usize, usize) {
    let end = text
        .char_indices()
        .nth(width)
        .map(|(i, _)| i)
        .unwrap_or(text.len());
    let head = &text[..end];
    let start = head.len() - head.trim_start().len();
    let stop = head.trim_end().len();
    if start >= stop {
        return (0, 0);
    }
    (start, stop)
}

#[inline]
fn content_at(text: &str, column: usize) -> &str {
    text.char_indices()
        .nth(column)
        .map(|(i, _)| &text[i..])
        .unwrap_or("")
}

fn mask(text: &str, width: usize) -> String {
    text.chars()
        .enumerate()
        .map(|(i, c)| if i < width { ' ' } else { c })
        .collect()
}
