//! This library reads and writes EMBL-style flat file sequence entries.
//!
//! An entry is a series of tagged lines (a two letter tag followed by the
//! content starting at column 6), terminated by `//`. The reader assembles
//! an owned [`Entry`](entry::Entry) from the lines and never stops at
//! malformed content: structural problems are reported as diagnostics
//! (a short code like `FT.4` together with the line numbers) in a
//! [`ValidationResult`](validation::ValidationResult) returned alongside the
//! entry. Only I/O errors and failures of the taxonomy collaborator are
//! returned as [`Error`].
//!
//! # More detailed documentation
//!
//! * [`embl module`](embl) and [`embl::Reader`](embl/struct.Reader.html) for
//!   reading, [`embl::write_entry()`](embl/fn.write_entry.html) for writing
//! * [`location`](location) for the feature location grammar
//! * [`wrap`](wrap) for the line wrapping rules used by the writers
//!
//! # Example
//!
//! This code prints the accession and the diagnostics of each entry.
//!
//! ```no_run
//! use embl_io::embl::Reader;
//!
//! let mut reader = Reader::from_path("entries.embl").unwrap();
//!
//! while let Some(result) = reader.next() {
//!     let parsed = result.expect("Error reading entry");
//!     println!("{:?}", parsed.entry.primary_accession);
//!     for msg in parsed.validation.messages() {
//!         println!("  {:?}", msg);
//!     }
//! }
//! ```
//!
//! # Organism lookup
//!
//! The lineage and common name of source features are taken from the `OS` /
//! `OC` lines of the entry. A taxonomy service can be plugged in, its
//! answers are cached per entry:
//!
//! ```
//! use std::sync::Arc;
//! use embl_io::embl::Reader;
//! use embl_io::session::Taxon;
//!
//! let lookup = |name: &str| {
//!     let mut t = Taxon::new(name);
//!     t.tax_id = Some(9606);
//!     Some(t)
//! };
//!
//! let input = b"ID   A1;
//! FT   source          1..4041
//! FT                   /organism=\"Homo sapiens\"
//! FT                   /mol_type=\"genomic DNA\"
//! //
//! ";
//! let mut reader = Reader::new(&input[..]).set_taxonomy(Arc::new(lookup));
//! let parsed = reader.next().unwrap().unwrap();
//! let source = parsed.entry.primary_source().unwrap();
//! assert_eq!(source.source.as_ref().unwrap().tax_id, Some(9606));
//! ```
//!
//! # Large entries
//!
//! Lines are read from a buffer of 64 KiB, which grows if a line does not
//! fit. How it grows can be configured by applying another policy using
//! `set_policy()`; see the [`policy`](policy) module docs.
//!
//! # Parallel processing
//! Functions for parallel processing can be found in the [`parallel`](parallel/index.html) module

#[macro_use]
extern crate serde_derive;

macro_rules! try_opt {
    ($expr: expr) => {
        match $expr {
            Ok(item) => item,
            Err(e) => return Some(Err(::std::convert::From::from(e))),
        }
    };
}

pub mod block;
pub mod embl;
pub mod entry;
pub mod error;
pub mod line;
pub mod location;
pub mod parallel;
pub mod policy;
pub mod prelude;
pub mod session;
pub mod validation;
pub mod wrap;

pub use crate::error::{Error, Result};
