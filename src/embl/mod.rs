//! Reading and writing of EMBL flat files.
//!
//! # Reading
//!
//! [`Reader::next()`](Reader::next) returns one [`ParsedEntry`] per record
//! (the lines up to and including a `//` terminator). Problems with the
//! content of a record never abort reading: they are collected in
//! [`ParsedEntry::validation`] together with the lines they stem from, and
//! the entry is filled as far as possible. Only I/O errors, a line that
//! outgrows the buffer policy and a failing taxonomy lookup are returned as
//! [`Error`](crate::Error).
//!
//! ```
//! use embl_io::embl::Reader;
//! use embl_io::location::Coordinates;
//!
//! let input = b"ID   X56734; SV 1; linear; mRNA; STD; PLN; 10 BP.
//! XX
//! AC   X56734; S46826;
//! XX
//! FT   source          1..10
//! FT                   /organism=\"Trifolium repens\"
//! FT                   /mol_type=\"mRNA\"
//! XX
//! SQ   Sequence 10 BP; 6 A; 3 C; 1 G; 0 T; 0 other;
//!      aaacaaaccg                                                          10
//! //
//! ";
//!
//! let mut reader = Reader::new(&input[..]);
//! let parsed = reader.next().unwrap().unwrap();
//! assert!(parsed.validation.is_empty());
//!
//! let entry = parsed.entry;
//! assert_eq!(entry.primary_accession.as_deref(), Some("X56734"));
//! assert_eq!(entry.secondary_accessions, vec!["S46826"]);
//! assert_eq!(entry.sequence.residues, b"aaacaaaccg".to_vec());
//!
//! let source = entry.primary_source().unwrap();
//! assert_eq!(source.location.elements[0].coords, Coordinates::Range(1, 10));
//! let attrs = source.source.as_ref().unwrap();
//! assert_eq!(attrs.scientific_name.as_deref(), Some("Trifolium repens"));
//!
//! assert!(reader.next().is_none());
//! ```
//!
//! # Writing
//!
//! [`write_entry()`] renders an [`Entry`](crate::entry::Entry) back into the
//! flat file layout, using [`WrapWriter`](crate::wrap::WrapWriter) for all
//! multi-line fields.

mod feature;
mod header;
mod organism;
mod reader;
mod reference;
mod sequence;
mod write;

pub use self::reader::*;
pub use self::sequence::{decode_sequence_line, residue};
pub use self::write::*;

use crate::entry::Entry;
use crate::validation::ValidationResult;

/// The record terminator
pub const TERMINATOR: &str = "//";

/// Reader configuration
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ReaderOptions {
    /// Accept partiality markers on inner elements of compound locations
    pub lenient_locations: bool,
    /// Do not report source features without `/mol_type`
    pub skip_source_features: bool,
    /// Tags that terminate a record in addition to `//`
    pub extra_terminators: Vec<String>,
    /// File identifier used in diagnostic origins
    pub file_id: Option<String>,
    /// Added to all line numbers in diagnostic origins
    pub line_offset: u64,
}

/// An entry together with the diagnostics produced while reading it.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ParsedEntry {
    pub entry: Entry,
    pub validation: ValidationResult,
    /// First physical line of the record
    pub first_line: u64,
    /// Last physical line of the record (the terminator, if present)
    pub last_line: u64,
}
