//! Per-record parse state.
//!
//! A [`ParseSession`] holds everything the reader remembers between blocks of
//! the same entry: how often each tag and block occurred, the reference that
//! is currently being assembled and the organisms declared so far. It is
//! passed explicitly to the line reader and block readers and must be
//! [`reset`](ParseSession::reset) at record boundaries. Each reader (and each
//! worker thread in [`parallel`](crate::parallel)) owns its own session.

use std::collections::HashMap;
use std::error::Error as StdError;
use std::fmt;
use std::sync::Arc;

use crate::entry::Reference;
use crate::error::{Error, Result};

/// Organism data as known from `OS` / `OC` / `OG` lines or from a
/// [`TaxonomyLookup`].
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Taxon {
    pub scientific_name: String,
    pub common_name: Option<String>,
    pub tax_id: Option<u64>,
    pub lineage: Option<String>,
    pub organelle: Option<String>,
}

impl Taxon {
    pub fn new<S: Into<String>>(scientific_name: S) -> Self {
        Taxon {
            scientific_name: scientific_name.into(),
            ..Default::default()
        }
    }
}

/// Organism lookup supplied by the caller (e.g. backed by a taxonomy
/// database). Results are only cached for the duration of one record.
pub trait TaxonomyLookup {
    fn lookup(&self, scientific_name: &str) -> std::result::Result<Option<Taxon>, Box<dyn StdError + Send + Sync>>;
}

impl<F> TaxonomyLookup for F
where
    F: Fn(&str) -> Option<Taxon>,
{
    fn lookup(&self, scientific_name: &str) -> std::result::Result<Option<Taxon>, Box<dyn StdError + Send + Sync>> {
        Ok(self(scientific_name))
    }
}

pub type SharedTaxonomy = Arc<dyn TaxonomyLookup + Send + Sync>;

/// Mutable state of the record that is currently parsed.
#[derive(Default)]
pub struct ParseSession {
    tag_counts: HashMap<String, usize>,
    block_counts: HashMap<String, usize>,
    skip_tag_counts: HashMap<String, usize>,
    reference: Option<Reference>,
    organisms: HashMap<String, Taxon>,
    last_organism: Option<String>,
    /// Molecule type of the current record (ID line or first `/mol_type`)
    pub molecule_type: Option<String>,
    taxonomy: Option<SharedTaxonomy>,
}

impl ParseSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_taxonomy(taxonomy: SharedTaxonomy) -> Self {
        ParseSession {
            taxonomy: Some(taxonomy),
            ..Self::default()
        }
    }

    #[inline]
    pub fn set_taxonomy(&mut self, taxonomy: Option<SharedTaxonomy>) {
        self.taxonomy = taxonomy;
    }

    /// Clears all record scoped state. The taxonomy collaborator is kept.
    pub fn reset(&mut self) {
        self.tag_counts.clear();
        self.block_counts.clear();
        self.skip_tag_counts.clear();
        self.molecule_type = None;
        self.reset_reference_cache();
        self.reset_organism_cache();
    }

    // counters

    /// Called by the line reader for every physical line carrying a tag
    #[inline]
    pub fn count_tag(&mut self, tag: &str) {
        increment(&mut self.tag_counts, tag);
    }

    pub fn tag_count(&self, tag: &str) -> usize {
        self.tag_counts.get(tag).cloned().unwrap_or(0)
    }

    /// Registers a dispatched block and returns how often a block with this
    /// tag occurred in the current record (including this one).
    #[inline]
    pub fn count_block(&mut self, tag: &str) -> usize {
        increment(&mut self.block_counts, tag)
    }

    pub fn block_count(&self, tag: &str) -> usize {
        self.block_counts.get(tag).cloned().unwrap_or(0)
    }

    /// Registers a block that was skipped because its tag is unknown
    #[inline]
    pub fn count_skipped(&mut self, tag: &str) -> usize {
        increment(&mut self.skip_tag_counts, tag)
    }

    pub fn skipped_count(&self, tag: &str) -> usize {
        self.skip_tag_counts.get(tag).cloned().unwrap_or(0)
    }

    // reference skeleton

    #[inline]
    pub fn has_reference(&self) -> bool {
        self.reference.is_some()
    }

    /// The reference that is currently assembled, if an `RN` line started one
    #[inline]
    pub fn reference_mut(&mut self) -> Option<&mut Reference> {
        self.reference.as_mut()
    }

    /// Starts a new reference and returns the previous one (if any)
    pub fn start_reference(&mut self, number: Option<u32>) -> Option<Reference> {
        let previous = self.reference.take();
        self.reference = Some(Reference {
            number,
            ..Default::default()
        });
        previous
    }

    #[inline]
    pub fn take_reference(&mut self) -> Option<Reference> {
        self.reference.take()
    }

    #[inline]
    pub fn reset_reference_cache(&mut self) {
        self.reference = None;
    }

    // organism cache

    /// Caches an organism declared on an `OS` line. Subsequent `OC` / `OG`
    /// lines are attached to it.
    pub fn add_organism(&mut self, scientific_name: &str, common_name: Option<String>) {
        let taxon = self
            .organisms
            .entry(scientific_name.to_string())
            .or_insert_with(|| Taxon::new(scientific_name));
        if common_name.is_some() {
            taxon.common_name = common_name;
        }
        self.last_organism = Some(scientific_name.to_string());
    }

    /// The organism of the most recent `OS` line
    pub fn last_organism_mut(&mut self) -> Option<&mut Taxon> {
        let name = self.last_organism.as_ref()?;
        self.organisms.get_mut(name)
    }

    pub fn organism(&self, scientific_name: &str) -> Option<&Taxon> {
        self.organisms.get(scientific_name)
    }

    /// Returns the cached organism or asks the taxonomy collaborator. Answers
    /// of the collaborator (including "unknown") are cached until the next
    /// reset.
    pub fn lookup_organism(&mut self, scientific_name: &str) -> Result<Option<Taxon>> {
        if let Some(t) = self.organisms.get(scientific_name) {
            return Ok(Some(t.clone()));
        }
        let taxonomy = match self.taxonomy.as_ref() {
            Some(t) => t,
            None => return Ok(None),
        };
        let found = taxonomy.lookup(scientific_name).map_err(|e| Error::Lookup {
            name: scientific_name.to_string(),
            source: e,
        })?;
        let taxon = found.unwrap_or_else(|| Taxon::new(scientific_name));
        self.organisms
            .insert(scientific_name.to_string(), taxon.clone());
        Ok(Some(taxon))
    }

    pub fn reset_organism_cache(&mut self) {
        self.organisms.clear();
        self.last_organism = None;
    }
}

impl fmt::Debug for ParseSession {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("ParseSession")
            .field("tag_counts", &self.tag_counts)
            .field("block_counts", &self.block_counts)
            .field("skip_tag_counts", &self.skip_tag_counts)
            .field("reference", &self.reference)
            .field("organisms", &self.organisms)
            .field("molecule_type", &self.molecule_type)
            .field("taxonomy", &self.taxonomy.is_some())
            .finish()
    }
}

#[inline]
fn increment(map: &mut HashMap<String, usize>, key: &str) -> usize {
    if let Some(n) = map.get_mut(key) {
        *n += 1;
        return *n;
    }
    map.insert(key.to_string(), 1);
    1
}
