use std::fs::File;
use std::io;
use std::path::Path;

use log::{debug, trace};

use super::{ParsedEntry, ReaderOptions, TERMINATOR};
use crate::block::{self, Block, Concatenate};
use crate::entry::Entry;
use crate::error::Result;
use crate::line::{LineReader, LineSource, TagLayout};
use crate::location::LocationParser;
use crate::policy::{BufPolicy, StdPolicy};
use crate::session::{ParseSession, SharedTaxonomy};
use crate::validation::{codes, Origin, ValidationResult};

/// Tags with a registered block reader
const KNOWN_TAGS: &[&str] = &[
    "ID", "AC", "PR", "DT", "DE", "KW", "OS", "OC", "OG", "RN", "RC", "RP", "RX", "RG", "RA", "RT",
    "RL", "DR", "CC", "AH", "AS", "FH", "FT", "XX", "SQ", "CO",
];

/// Blocks that may occur only once per entry
const ONCE_PER_ENTRY: &[&str] = &["ID", "AC", "PR", "DE", "KW", "SQ", "CO"];

const REFERENCE_TAGS: &[&str] = &["RN", "RC", "RP", "RX", "RG", "RA", "RT", "RL"];

/// EMBL reader.
///
/// Every call to [`next()`](Reader::next) reads one record. The reader keeps
/// one line of lookahead and never reads further than the line following the
/// record terminator.
pub struct Reader<R: io::Read, P = StdPolicy> {
    pub(super) lines: LineReader<R, P>,
    pub(super) session: ParseSession,
    pub(super) options: ReaderOptions,
    pub(super) locations: LocationParser,
    finished: bool,
}

/// The entry under construction
pub(super) struct EntryState {
    pub entry: Entry,
    pub validation: ValidationResult,
    pub first_line: u64,
    pub last_line: u64,
}

impl EntryState {
    fn new(first_line: u64) -> Self {
        EntryState {
            entry: Entry::new(),
            validation: ValidationResult::new(),
            first_line,
            last_line: first_line,
        }
    }
}

impl Reader<File> {
    /// Creates a reader from a file path. The file is closed when the reader
    /// is dropped.
    ///
    /// # Example:
    ///
    /// ```no_run
    /// use embl_io::embl::Reader;
    ///
    /// let mut reader = Reader::from_path("entries.embl").unwrap();
    ///
    /// // (... do something with the reader)
    /// ```
    #[inline]
    pub fn from_path<T: AsRef<Path>>(path: T) -> io::Result<Reader<File>> {
        LineSource::from_path(path).map(Reader::from_source)
    }
}

impl<R> Reader<R>
where
    R: io::Read,
{
    /// Creates a new reader with the default buffer size of 64 KiB
    ///
    /// # Example:
    ///
    /// ```
    /// use embl_io::embl::Reader;
    ///
    /// let input = b"ID   X56734; SV 1; linear; mRNA; STD; PLN; 0 BP.\n//\n";
    /// let mut reader = Reader::new(&input[..]);
    ///
    /// let parsed = reader.next().unwrap().unwrap();
    /// assert_eq!(parsed.entry.primary_accession.as_deref(), Some("X56734"));
    /// ```
    #[inline]
    pub fn new(reader: R) -> Reader<R> {
        Self::from_source(LineSource::new(reader))
    }

    /// Creates a new reader with a given buffer capacity. The minimum allowed
    /// capacity is 3.
    #[inline]
    pub fn with_capacity(reader: R, capacity: usize) -> Reader<R> {
        Self::from_source(LineSource::with_capacity(reader, capacity))
    }
}

impl<R, P> Reader<R, P>
where
    R: io::Read,
    P: BufPolicy,
{
    fn from_source(source: LineSource<R, P>) -> Self {
        Reader {
            lines: LineReader::from_source(source, TagLayout::EMBL),
            session: ParseSession::new(),
            options: ReaderOptions::default(),
            locations: LocationParser::new(),
            finished: false,
        }
    }

    /// Returns a reader with the given buffer policy applied
    #[inline]
    pub fn set_policy<T: BufPolicy>(self, policy: T) -> Reader<R, T> {
        Reader {
            lines: self.lines.set_policy(policy),
            session: self.session,
            options: self.options,
            locations: self.locations,
            finished: self.finished,
        }
    }

    /// Returns the `BufPolicy` of the reader
    #[inline]
    pub fn policy(&self) -> &P {
        self.lines.policy()
    }

    /// Applies reader options
    ///
    /// ```
    /// use embl_io::embl::{Reader, ReaderOptions};
    ///
    /// let input = b"ID   X56734;\nFT   CDS             join(1..>10,<20..30)\n//\n";
    /// let options = ReaderOptions {
    ///     lenient_locations: true,
    ///     file_id: Some("x.embl".to_string()),
    ///     ..Default::default()
    /// };
    /// let mut reader = Reader::new(&input[..]).set_options(options);
    /// let parsed = reader.next().unwrap().unwrap();
    /// assert_eq!(parsed.entry.features[0].location.len(), 2);
    /// assert!(!parsed.validation.contains("FT.8"));
    /// ```
    pub fn set_options(mut self, options: ReaderOptions) -> Self {
        self.locations = LocationParser::new().lenient(options.lenient_locations);
        self.options = options;
        self
    }

    #[inline]
    pub fn options(&self) -> &ReaderOptions {
        &self.options
    }

    /// Sets the organism lookup consulted for `/organism` values that were
    /// not declared on `OS` lines of the same record.
    #[inline]
    pub fn set_taxonomy(mut self, taxonomy: SharedTaxonomy) -> Self {
        self.session.set_taxonomy(Some(taxonomy));
        self
    }

    /// The state of the record that is read. Between records, this only
    /// holds the taxonomy lookup.
    #[inline]
    pub fn session(&self) -> &ParseSession {
        &self.session
    }

    /// Reads the next record. Returns `None` if the input is exhausted.
    pub fn next(&mut self) -> Option<Result<ParsedEntry>> {
        if self.finished {
            return None;
        }
        self.session.reset();

        if !try_opt!(self.lines.read_line(&mut self.session)) {
            self.finished = true;
            return None;
        }

        let mut st = EntryState::new(self.lines.current_line_number());
        loop {
            st.last_line = self.lines.current_line_number();
            if self.is_terminator() {
                return Some(Ok(self.finish(st)));
            }

            try_opt!(self.dispatch(&mut st));
            st.last_line = self.lines.current_line_number();

            if !try_opt!(self.lines.read_line(&mut self.session)) {
                self.finished = true;
                let origin = self.origin(st.last_line, st.last_line);
                st.validation.warning(codes::MISSING_TERMINATOR, Some(origin));
                return Some(Ok(self.finish(st)));
            }
        }
    }

    /// Returns a borrowed iterator over all entries.
    ///
    /// ```
    /// use embl_io::embl::Reader;
    ///
    /// let input = b"ID   A1;\n//\nID   A2;\n//\n";
    /// let accessions: Vec<_> = Reader::new(&input[..])
    ///     .entries()
    ///     .map(|e| e.unwrap().entry.primary_accession.unwrap())
    ///     .collect();
    /// assert_eq!(accessions, vec!["A1", "A2"]);
    /// ```
    pub fn entries(&mut self) -> EntriesIter<R, P> {
        EntriesIter { rdr: self }
    }

    /// Returns an iterator over all entries like `Reader::entries()`,
    /// but with the difference that it owns the underlying reader.
    pub fn into_entries(self) -> EntriesIntoIter<R, P> {
        EntriesIntoIter { rdr: self }
    }

    fn is_terminator(&self) -> bool {
        let tag = self.lines.current_tag();
        if tag == Some(TERMINATOR) {
            return true;
        }
        if self.options.extra_terminators.is_empty() {
            return false;
        }
        let line = self.lines.current_line().unwrap_or("").trim();
        self.options
            .extra_terminators
            .iter()
            .any(|t| tag == Some(t.as_str()) || line == t)
    }

    // Reads the block starting at the current line. The reader is left at
    // the last line of the block.
    fn dispatch(&mut self, st: &mut EntryState) -> Result<()> {
        let tag = match self.lines.current_tag() {
            Some(t) => t.to_string(),
            None => {
                // content lines outside of a block
                let block = block::read_multi_line(&mut self.lines, &mut self.session, Concatenate::Space)?;
                let origin = self.block_origin(&block);
                st.validation
                    .error(codes::LINE_FORMAT, Some(origin))
                    .param(&block.text);
                return Ok(());
            }
        };
        trace!("{} block at line {}", tag, self.lines.current_line_number());

        if !REFERENCE_TAGS.contains(&tag.as_str()) {
            self.flush_reference(st);
        }

        if !KNOWN_TAGS.contains(&tag.as_str()) {
            // the whole block is skipped at once
            let block = block::read_multi_line(&mut self.lines, &mut self.session, Concatenate::Space)?;
            self.session.count_skipped(&tag);
            let origin = self.block_origin(&block);
            st.validation.error(codes::UNKNOWN_TAG, Some(origin)).param(&tag);
            return Ok(());
        }

        let n = self.session.count_block(&tag);
        if n > 1 && ONCE_PER_ENTRY.contains(&tag.as_str()) {
            let block = block::read_multi_line(&mut self.lines, &mut self.session, Concatenate::Space)?;
            let origin = self.block_origin(&block);
            st.validation.error(codes::REPEATED_BLOCK, Some(origin)).param(&tag);
            return Ok(());
        }

        match tag.as_str() {
            "ID" => self.read_id(st),
            "AC" => self.read_accessions(st)?,
            "PR" => self.read_projects(st)?,
            "DT" => self.read_date(st),
            "DE" => self.read_description(st)?,
            "KW" => self.read_keywords(st)?,
            "OS" => self.read_species(st)?,
            "OC" => self.read_classification()?,
            "OG" => self.read_organelle(),
            "RN" => self.read_reference_number(st),
            "DR" => self.read_xref(st),
            "CC" => self.read_comment(st)?,
            "AS" => self.read_assembly(st),
            "FT" => self.read_features(st)?,
            "SQ" => self.read_sequence(st)?,
            "CO" => self.read_contig(st)?,
            "AH" | "FH" | "XX" => {
                block::read_multi_line(&mut self.lines, &mut self.session, Concatenate::Space)?;
            }
            // remaining reference lines
            _ => self.read_reference_line(&tag, st)?,
        }
        Ok(())
    }

    pub(super) fn flush_reference(&mut self, st: &mut EntryState) {
        if let Some(r) = self.session.take_reference() {
            st.entry.references.push(r);
        }
    }

    fn finish(&mut self, mut st: EntryState) -> ParsedEntry {
        self.flush_reference(&mut st);
        // no organism or reference data may leak into the next record
        self.session.reset_reference_cache();
        self.session.reset_organism_cache();

        debug!(
            "entry {} (lines {}-{}): {} features, {} diagnostics",
            st.entry.primary_accession.as_deref().unwrap_or("<no accession>"),
            st.first_line,
            st.last_line,
            st.entry.features.len(),
            st.validation.len()
        );
        ParsedEntry {
            entry: st.entry,
            validation: st.validation,
            first_line: st.first_line,
            last_line: st.last_line,
        }
    }

    pub(super) fn origin(&self, first_line: u64, last_line: u64) -> Origin {
        Origin::new(
            self.options.file_id.clone(),
            first_line + self.options.line_offset,
            last_line + self.options.line_offset,
        )
    }

    #[inline]
    pub(super) fn line_origin(&self) -> Origin {
        let l = self.lines.current_line_number();
        self.origin(l, l)
    }

    #[inline]
    pub(super) fn block_origin(&self, block: &Block) -> Origin {
        block.origin(self.options.file_id.as_deref(), self.options.line_offset)
    }
}

/// Borrowed iterator of `ParsedEntry`
pub struct EntriesIter<'a, R, P = StdPolicy>
where
    P: 'a,
    R: io::Read + 'a,
{
    rdr: &'a mut Reader<R, P>,
}

impl<'a, R, P> Iterator for EntriesIter<'a, R, P>
where
    P: BufPolicy + 'a,
    R: io::Read + 'a,
{
    type Item = Result<ParsedEntry>;
    fn next(&mut self) -> Option<Self::Item> {
        self.rdr.next()
    }
}

/// Iterator of `ParsedEntry` that owns the underlying reader
pub struct EntriesIntoIter<R: io::Read, P = StdPolicy> {
    rdr: Reader<R, P>,
}

impl<R, P> Iterator for EntriesIntoIter<R, P>
where
    P: BufPolicy,
    R: io::Read,
{
    type Item = Result<ParsedEntry>;
    fn next(&mut self) -> Option<Self::Item> {
        self.rdr.next()
    }
}
