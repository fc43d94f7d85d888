use std::fs::File;
use std::io::{self, BufRead, Seek};
use std::path::Path;

use memchr::memchr;

use crate::error::{Error, Result};
use crate::policy::{BufPolicy, StdPolicy};

/// The default initial buffer size for line sources.
pub const BUFSIZE: usize = 64 * 1024;

/// Holds line number and byte offset of a physical line
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Hash, Serialize, Deserialize)]
pub struct Position {
    line: u64,
    byte: u64,
}

impl Position {
    pub fn new(line: u64, byte: u64) -> Position {
        Position { line, byte }
    }

    /// Line number (starting with 1)
    #[inline]
    pub fn line(&self) -> u64 {
        self.line
    }

    /// Byte offset within the input
    #[inline]
    pub fn byte(&self) -> u64 {
        self.byte
    }
}

/// Sequential supply of physical lines.
///
/// Wraps `buffer_redux::BufReader`, searches line ends with `memchr` and
/// manages buffer growth based on a [`BufPolicy`](crate::policy::BufPolicy).
/// Knows nothing about tags or coordinates. UNIX (LF) and Windows (CRLF)
/// line endings are accepted, the line terminator is never part of the
/// returned line.
pub struct LineSource<R, P = StdPolicy>
where
    R: io::Read,
{
    buf_reader: buffer_redux::BufReader<R>,
    buf_policy: P,
    // position of the next line to be returned
    next_pos: Position,
    eof: bool,
}

impl LineSource<File> {
    /// Creates a line source from a file path. The file handle is owned by
    /// the source and closed when it is dropped, including on early return
    /// after a parse failure.
    #[inline]
    pub fn from_path<F: AsRef<Path>>(path: F) -> io::Result<LineSource<File>> {
        File::open(path).map(LineSource::new)
    }
}

impl<R> LineSource<R>
where
    R: io::Read,
{
    #[inline]
    pub fn new(reader: R) -> Self {
        Self::with_capacity(reader, BUFSIZE)
    }

    /// Creates a new source with a given buffer capacity. The minimum allowed
    /// capacity is 3.
    #[inline]
    pub fn with_capacity(reader: R, capacity: usize) -> Self {
        assert!(capacity >= 3);
        LineSource {
            buf_reader: buffer_redux::BufReader::with_capacity(capacity, reader),
            buf_policy: StdPolicy,
            next_pos: Position::new(1, 0),
            eof: false,
        }
    }
}

impl<R, P> LineSource<R, P>
where
    R: io::Read,
    P: BufPolicy,
{
    /// Returns a source with the given buffer policy applied
    #[inline]
    pub fn set_policy<T: BufPolicy>(self, buf_policy: T) -> LineSource<R, T> {
        LineSource {
            buf_reader: self.buf_reader,
            buf_policy,
            next_pos: self.next_pos,
            eof: self.eof,
        }
    }

    #[inline]
    pub fn policy(&self) -> &P {
        &self.buf_policy
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.buf_reader.capacity()
    }

    /// Position of the line that will be returned by the next call to
    /// `read_line()`.
    #[inline]
    pub fn next_position(&self) -> Position {
        self.next_pos
    }

    /// Appends the next physical line (without line terminator) to `line`.
    /// Returns `false` if the input is exhausted.
    pub fn read_line(&mut self, line: &mut Vec<u8>) -> Result<bool> {
        loop {
            let buf = self.buf_reader.buffer();
            if let Some(end) = memchr(b'\n', buf) {
                line.extend_from_slice(trim_cr(&buf[..end]));
                self.advance(end + 1);
                return Ok(true);
            }

            if self.eof {
                if buf.is_empty() {
                    return Ok(false);
                }
                // last line without terminator
                let n = buf.len();
                line.extend_from_slice(trim_cr(buf));
                self.advance(n);
                return Ok(true);
            }

            if buf.len() == self.buf_reader.capacity() {
                self.grow()?;
            } else {
                self.buf_reader.make_room();
            }

            if self.fill_buf()? == 0 {
                self.eof = true;
            }
        }
    }

    #[inline]
    fn advance(&mut self, n: usize) {
        self.buf_reader.consume(n);
        self.next_pos.line += 1;
        self.next_pos.byte += n as u64;
    }

    // grow buffer based on policy
    fn grow(&mut self) -> Result<()> {
        let cap = self.buf_reader.capacity();
        let new_size = self
            .buf_policy
            .grow_to(cap)
            .ok_or(Error::BufferLimit {
                line: self.next_pos.line,
            })?;
        let additional = new_size.saturating_sub(cap);
        if additional == 0 {
            return Err(Error::BufferLimit {
                line: self.next_pos.line,
            });
        }
        self.buf_reader.reserve(additional);
        Ok(())
    }

    /// Makes sure the buffer is full after this call (unless EOF reached)
    /// code adapted from `io::Read::read_exact`
    fn fill_buf(&mut self) -> io::Result<usize> {
        let initial_size = self.buf_reader.buffer().len();
        let mut num_read = 0;
        while initial_size + num_read < self.buf_reader.capacity() {
            match self.buf_reader.read_into_buf() {
                Ok(0) => break,
                Ok(n) => num_read += n,
                Err(ref e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) => return Err(e),
            }
        }
        Ok(num_read)
    }
}

impl<R, P> LineSource<R, P>
where
    R: io::Read + Seek,
    P: BufPolicy,
{
    /// Seeks to a position previously obtained from `next_position()`.
    /// The buffer is discarded.
    pub fn seek(&mut self, pos: &Position) -> io::Result<()> {
        self.buf_reader.seek(io::SeekFrom::Start(pos.byte()))?;
        self.next_pos = *pos;
        self.eof = false;
        Ok(())
    }
}

/// Remove a final '\r' from a byte slice
#[inline]
pub(crate) fn trim_cr(line: &[u8]) -> &[u8] {
    if let Some((&b'\r', remaining)) = line.split_last() {
        remaining
    } else {
        line
    }
}
