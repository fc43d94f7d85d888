//! Parallel parsing
//!
//! One background thread splits the input into the raw text of individual
//! records (at terminator lines), a pool of workers parses them. Each worker
//! uses its own reader and [`ParseSession`](crate::session::ParseSession),
//! no parse state is shared. Records are passed around in batches
//! (`EntryBatch`) because sending across channels has a performance impact.
//! Batches are returned to the main thread as they complete, so entries are
//! **not** necessarily delivered in input order.
//!
//! # Example
//!
//! ```no_run
//! use embl_io::embl::ReaderOptions;
//! use embl_io::parallel::parallel_entries;
//! use std::fs::File;
//!
//! let file = File::open("entries.embl").unwrap();
//! let mut n_diagnostics = 0;
//!
//! parallel_entries(file, ReaderOptions::default(), None, 4, 2, |parsed| {
//!     // runs in the main thread
//!     n_diagnostics += parsed.validation.len();
//!     // `false` stops the reader
//!     true
//! }).unwrap();
//! println!("{} diagnostics", n_diagnostics);
//! ```

use std::io;
use std::sync::mpsc;

use log::debug;

use crate::embl::{self, ParsedEntry, ReaderOptions, TERMINATOR};
use crate::error::{Error, Result};
use crate::line::LineSource;
use crate::policy::{BufPolicy, StdPolicy};
use crate::session::SharedTaxonomy;

/// Number of records per batch
pub const ENTRIES_PER_BATCH: usize = 64;

/// A source of data sets to be processed in parallel
pub trait BatchReader: Send {
    type DataSet: Default + Send;
    type Err: Send;
    fn fill_data(&mut self, data: &mut Self::DataSet) -> Option<std::result::Result<(), Self::Err>>;
}

/// Reads data sets in a background thread, processes them with `work` in a
/// pool of `n_threads` and makes the results available to `func`, which runs
/// in the calling thread. At most `queue_len` data sets are in circulation.
pub fn read_parallel<B, O, W, F, Out>(mut reader: B, n_threads: u32, queue_len: usize, work: W, func: F) -> Out
where
    B: BatchReader,
    O: Send,
    W: Send + Sync,
    W: Fn(&mut B::DataSet) -> O,
    F: FnOnce(&mut ParallelBatches<B::DataSet, B::Err, O>) -> Out,
{
    let queue_len = queue_len.max(1);
    // every data set, one error and the 'done' signal fit into the queue
    let (done_send, done_recv) = mpsc::sync_channel(queue_len + 2);
    let (empty_send, empty_recv) = mpsc::sync_channel::<Option<B::DataSet>>(queue_len);

    let result = crossbeam_utils::thread::scope(|scope| {
        scope.spawn(move |_| {
            let mut pool = scoped_threadpool::Pool::new(n_threads.max(1));

            pool.scoped(|pool_scope| {
                let work = &work;

                loop {
                    // recycle a data set sent back after use
                    let mut data = match empty_recv.recv() {
                        Ok(Some(d)) => d,
                        // stopped
                        _ => return,
                    };

                    let done_send = done_send.clone();

                    match reader.fill_data(&mut data) {
                        Some(Ok(())) => {
                            pool_scope.execute(move || {
                                let out = work(&mut data);
                                done_send.send(Some(Ok((data, out)))).ok();
                            });
                        }
                        Some(Err(e)) => {
                            done_send.send(Some(Err(e))).ok();
                            break;
                        }
                        None => break,
                    }
                }

                // the 'done' signal is only sent after all work is finished
                pool_scope.join_all();
                done_send.send(None).ok();
            });
        });

        for _ in 0..queue_len {
            empty_send.send(Some(B::DataSet::default())).ok();
        }

        let mut batches = ParallelBatches {
            empty_send,
            done_recv,
            current: B::DataSet::default(),
        };

        let out = func(&mut batches);
        batches.stop();
        out
    });

    match result {
        Ok(out) => out,
        Err(panic) => std::panic::resume_unwind(panic),
    }
}

/// Streaming access to processed data sets
pub struct ParallelBatches<D, E, O>
where
    D: Default + Send,
    E: Send,
    O: Send,
{
    empty_send: mpsc::SyncSender<Option<D>>,
    done_recv: mpsc::Receiver<Option<std::result::Result<(D, O), E>>>,
    current: D,
}

impl<D, E, O> ParallelBatches<D, E, O>
where
    D: Default + Send,
    E: Send,
    O: Send,
{
    /// Returns the next processed data set together with the output of the
    /// worker function.
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> Option<std::result::Result<(&D, O), E>> {
        match self.done_recv.recv() {
            Ok(Some(Ok((d, o)))) => {
                let previous = std::mem::replace(&mut self.current, d);
                // a closed channel is not a problem, happens after stop()
                self.empty_send.send(Some(previous)).ok();
                Some(Ok((&self.current, o)))
            }
            Ok(Some(Err(e))) => Some(Err(e)),
            // 'done' signal or reader thread gone
            _ => None,
        }
    }

    // Signals the reader thread to stop. Pending sends of the workers fail
    // once the receiver is dropped.
    fn stop(self) {
        self.empty_send.send(None).ok();
    }
}

/// The raw text of one record
#[derive(Debug, Clone, Default)]
pub struct RawEntry {
    pub text: Vec<u8>,
    /// Line number of the first line within the whole input
    pub first_line: u64,
}

/// A batch of raw records. The allocations are reused between batches.
#[derive(Debug, Default)]
pub struct EntryBatch {
    entries: Vec<RawEntry>,
    len: usize,
}

impl EntryBatch {
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub fn iter(&self) -> std::slice::Iter<RawEntry> {
        self.entries[..self.len].iter()
    }

    fn clear(&mut self) {
        self.len = 0;
    }

    fn next_slot(&mut self) -> &mut RawEntry {
        if self.entries.len() == self.len {
            self.entries.push(RawEntry::default());
        }
        &mut self.entries[self.len]
    }
}

/// Splits the input into raw records at terminator lines without parsing
/// them.
pub struct EntrySplitter<R: io::Read, P = StdPolicy> {
    source: LineSource<R, P>,
    extra_terminators: Vec<String>,
    batch_size: usize,
    line: Vec<u8>,
    finished: bool,
}

impl<R> EntrySplitter<R>
where
    R: io::Read,
{
    #[inline]
    pub fn new(reader: R) -> Self {
        Self::from_source(LineSource::new(reader))
    }
}

impl<R, P> EntrySplitter<R, P>
where
    R: io::Read,
    P: BufPolicy,
{
    pub fn from_source(source: LineSource<R, P>) -> Self {
        EntrySplitter {
            source,
            extra_terminators: vec![],
            batch_size: ENTRIES_PER_BATCH,
            line: vec![],
            finished: false,
        }
    }

    /// Tags or lines terminating a record in addition to `//`
    pub fn extra_terminators(mut self, terminators: Vec<String>) -> Self {
        self.extra_terminators = terminators;
        self
    }

    pub fn batch_size(mut self, size: usize) -> Self {
        self.batch_size = size.max(1);
        self
    }

    /// Reads the next record into `raw`. Returns `false` if there was no
    /// more (non-blank) input.
    pub fn read_raw_entry(&mut self, raw: &mut RawEntry) -> Result<bool> {
        raw.text.clear();
        raw.first_line = self.source.next_position().line();
        loop {
            self.line.clear();
            if !self.source.read_line(&mut self.line)? {
                return Ok(raw.text.iter().any(|b| !b.is_ascii_whitespace()));
            }
            raw.text.extend_from_slice(&self.line);
            raw.text.push(b'\n');
            if is_terminator_line(&self.line, &self.extra_terminators) {
                return Ok(true);
            }
        }
    }
}

impl<R, P> BatchReader for EntrySplitter<R, P>
where
    R: io::Read + Send,
    P: BufPolicy + Send,
{
    type DataSet = EntryBatch;
    type Err = Error;

    fn fill_data(&mut self, batch: &mut EntryBatch) -> Option<Result<()>> {
        if self.finished {
            return None;
        }
        batch.clear();
        while batch.len < self.batch_size {
            match self.read_raw_entry(batch.next_slot()) {
                Ok(true) => batch.len += 1,
                Ok(false) => {
                    self.finished = true;
                    break;
                }
                Err(e) => {
                    self.finished = true;
                    return Some(Err(e));
                }
            }
        }
        if batch.is_empty() {
            None
        } else {
            Some(Ok(()))
        }
    }
}

fn is_terminator_line(line: &[u8], extra: &[String]) -> bool {
    if line.starts_with(TERMINATOR.as_bytes()) {
        return true;
    }
    if extra.is_empty() {
        return false;
    }
    let text = String::from_utf8_lossy(line);
    let text = text.trim();
    let tag = text.get(..2).unwrap_or(text);
    extra.iter().any(|t| t == tag || t == text)
}

/// Parses all records of a batch. Diagnostic origins and line numbers refer
/// to the whole input.
pub fn parse_batch(
    batch: &EntryBatch,
    options: &ReaderOptions,
    taxonomy: Option<&SharedTaxonomy>,
) -> Vec<Result<ParsedEntry>> {
    let mut out = Vec::with_capacity(batch.len());
    for raw in batch.iter() {
        let offset = raw.first_line.saturating_sub(1);
        let mut opts = options.clone();
        opts.line_offset += offset;
        let capacity = (raw.text.len() + 1).max(3);
        let mut reader = embl::Reader::with_capacity(&raw.text[..], capacity).set_options(opts);
        if let Some(t) = taxonomy {
            reader = reader.set_taxonomy(t.clone());
        }
        for result in reader.entries() {
            out.push(result.map(|mut parsed| {
                parsed.first_line += offset;
                parsed.last_line += offset;
                parsed
            }));
        }
    }
    out
}

/// Parses EMBL records with `n_threads` worker threads and calls `func` for
/// every entry in the calling thread. `func` returns `false` to stop
/// reading. Hard errors (I/O, taxonomy lookup failures) abort the run.
pub fn parallel_entries<R, F>(
    input: R,
    options: ReaderOptions,
    taxonomy: Option<SharedTaxonomy>,
    n_threads: u32,
    queue_len: usize,
    func: F,
) -> Result<()>
where
    R: io::Read + Send,
    F: FnMut(ParsedEntry) -> bool,
{
    let splitter = EntrySplitter::new(input).extra_terminators(options.extra_terminators.clone());
    parallel_split_entries(splitter, options, taxonomy, n_threads, queue_len, func)
}

/// Like [`parallel_entries`], but with a configured splitter (buffer policy,
/// batch size).
pub fn parallel_split_entries<R, P, F>(
    splitter: EntrySplitter<R, P>,
    options: ReaderOptions,
    taxonomy: Option<SharedTaxonomy>,
    n_threads: u32,
    queue_len: usize,
    mut func: F,
) -> Result<()>
where
    R: io::Read + Send,
    P: BufPolicy + Send,
    F: FnMut(ParsedEntry) -> bool,
{
    debug!("parsing with {} threads, queue length {}", n_threads, queue_len);
    let options = &options;
    let taxonomy = taxonomy.as_ref();

    read_parallel(
        splitter,
        n_threads,
        queue_len,
        |batch| parse_batch(batch, options, taxonomy),
        |batches| {
            while let Some(result) = batches.next() {
                let (_, parsed) = result?;
                for entry in parsed {
                    if !func(entry?) {
                        return Ok(());
                    }
                }
            }
            Ok(())
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split() {
        let input = b"ID   A1;\nXX\n//\n\nID   A2;\n//\n\n";
        let mut splitter = EntrySplitter::new(&input[..]);
        let mut raw = RawEntry::default();
        assert!(splitter.read_raw_entry(&mut raw).unwrap());
        assert_eq!(raw.text, b"ID   A1;\nXX\n//\n".to_vec());
        assert_eq!(raw.first_line, 1);
        assert!(splitter.read_raw_entry(&mut raw).unwrap());
        assert_eq!(raw.text, b"\nID   A2;\n//\n".to_vec());
        assert_eq!(raw.first_line, 4);
        assert!(!splitter.read_raw_entry(&mut raw).unwrap());
    }

    #[test]
    fn terminators() {
        assert!(is_terminator_line(b"//", &[]));
        assert!(!is_terminator_line(b"XX", &[]));
        assert!(is_terminator_line(b"ZZ   end", &["ZZ".to_string()]));
        assert!(is_terminator_line(b"END", &["END".to_string()]));
    }

    #[test]
    fn batches() {
        let input = b"ID   A1;\n//\nID   A2;\n//\nID   A3;\n//\n";
        let mut splitter = EntrySplitter::new(&input[..]).batch_size(2);
        let mut batch = EntryBatch::default();
        assert!(splitter.fill_data(&mut batch).unwrap().is_ok());
        assert_eq!(batch.len(), 2);
        assert!(splitter.fill_data(&mut batch).unwrap().is_ok());
        assert_eq!(batch.len(), 1);
        let parsed = parse_batch(&batch, &ReaderOptions::default(), None);
        assert_eq!(parsed.len(), 1);
        let parsed = parsed.into_iter().next().unwrap().unwrap();
        assert_eq!(parsed.entry.primary_accession.as_deref(), Some("A3"));
        assert_eq!(parsed.first_line, 5);
        assert!(splitter.fill_data(&mut batch).is_none());
    }
}
