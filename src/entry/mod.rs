//! Owned representation of a flat file entry.
//!
//! An [`Entry`] is filled incrementally by the reader and read by writers or
//! downstream validation. All fields are public; helper methods only exist
//! where a value is derived from several fields.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;

use crate::location::{CompoundLocation, Location};

mod feature;
mod sort;

pub use self::feature::*;
pub use self::sort::*;

/// A database entry (one record between two `//` terminators)
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Entry {
    pub primary_accession: Option<String>,
    pub secondary_accessions: Vec<String>,
    /// `PR` line project accessions (e.g. `PRJNA1`)
    pub project_accessions: Vec<String>,
    /// `STD`, `CON`, `WGS`...
    pub data_class: Option<String>,
    /// Taxonomic division, e.g. `PLN`
    pub division: Option<String>,
    pub description: Option<String>,
    pub keywords: Vec<String>,
    pub comment: Option<String>,
    pub first_public: Option<NaiveDate>,
    pub first_public_release: Option<u32>,
    pub last_updated: Option<NaiveDate>,
    pub last_updated_release: Option<u32>,
    pub entry_version: Option<u32>,
    pub references: Vec<Reference>,
    /// `DR` lines
    pub xrefs: Vec<XRef>,
    /// `AS` lines
    pub assembly: Vec<Assembly>,
    pub features: Vec<Feature>,
    pub sequence: Sequence,
}

impl Entry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The first source feature, if any
    pub fn primary_source(&self) -> Option<&Feature> {
        self.features.iter().find(|f| f.is_source())
    }

    pub fn primary_source_mut(&mut self) -> Option<&mut Feature> {
        self.features.iter_mut().find(|f| f.is_source())
    }

    /// Contig locations from the `CO` line (empty for non-CON entries)
    pub fn contigs(&self) -> &[Location] {
        self.sequence
            .contig
            .as_ref()
            .map(|c| c.elements.as_slice())
            .unwrap_or(&[])
    }

    /// Sorts the features in output order, see [`sort_features`]
    pub fn sort_features(&mut self) {
        sort_features(&mut self.features);
    }

    /// `true` if any sequence residues were read
    pub fn has_sequence(&self) -> bool {
        !self.sequence.residues.is_empty()
    }
}

/// Sequence data and the sequence related header fields.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Sequence {
    /// `SV` of the ID line
    pub version: Option<u32>,
    pub topology: Option<Topology>,
    /// e.g. `genomic DNA`, `mRNA`
    pub molecule_type: Option<String>,
    /// Declared length (ID line) until residues are decoded, then the number
    /// of residues.
    pub length: u64,
    /// Lowercase residues
    pub residues: Vec<u8>,
    /// Assembly of a CON entry
    pub contig: Option<CompoundLocation>,
}

impl Sequence {
    /// Number of occurrences of each residue (a, c, g, t, other)
    pub fn base_counts(&self) -> [u64; 5] {
        let mut counts = [0; 5];
        for b in &self.residues {
            let i = match *b {
                b'a' => 0,
                b'c' => 1,
                b'g' => 2,
                b't' => 3,
                _ => 4,
            };
            counts[i] += 1;
        }
        counts
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Topology {
    Linear,
    Circular,
}

impl Topology {
    pub fn as_str(&self) -> &'static str {
        match *self {
            Topology::Linear => "linear",
            Topology::Circular => "circular",
        }
    }
}

impl FromStr for Topology {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, ()> {
        if s.eq_ignore_ascii_case("linear") {
            Ok(Topology::Linear)
        } else if s.eq_ignore_ascii_case("circular") {
            Ok(Topology::Circular)
        } else {
            Err(())
        }
    }
}

impl fmt::Display for Topology {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Citation (`RN` ... `RL` lines)
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Reference {
    pub number: Option<u32>,
    pub comment: Option<String>,
    /// Sequence positions the citation refers to (`RP`)
    pub location: Option<CompoundLocation>,
    pub xrefs: Vec<XRef>,
    pub group: Option<String>,
    pub authors: Vec<String>,
    /// `None` if no RT line was present, empty for `RT   ;`
    pub title: Option<String>,
    /// Journal / submission text (`RL`)
    pub locator: Option<String>,
}

/// Database cross-reference, e.g. `DR   MD5; 1a2b.` or
/// `/db_xref="UniProtKB/Swiss-Prot:P12345"`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct XRef {
    pub database: String,
    pub primary: String,
    pub secondary: Option<String>,
}

impl XRef {
    pub fn new<D: Into<String>, P: Into<String>>(database: D, primary: P, secondary: Option<String>) -> Self {
        XRef {
            database: database.into(),
            primary: primary.into(),
            secondary,
        }
    }
}

/// One row of the assembly (`AS`) table of a TPA entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assembly {
    /// Span in this entry
    pub span: (u64, u64),
    pub primary_identifier: String,
    /// Span in the primary entry; `None` for `not_available`
    pub primary_span: Option<(u64, u64)>,
    pub complement: bool,
}
