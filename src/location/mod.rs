//! Genomic locations of features and contigs.
//!
//! A [`CompoundLocation`] is what a feature (or a `CO` line) declares: one or
//! more [`Location`] elements combined with `join` or `order`, optionally
//! complemented as a whole, with partiality markers on the outermost ends.
//!
//! ```
//! use embl_io::location::{parse, CompoundKind, Coordinates};
//!
//! let loc = parse("complement(join(<1..210,493..>660))").unwrap();
//! assert!(loc.complement);
//! assert_eq!(loc.kind, CompoundKind::Join);
//! assert_eq!(loc.elements[1].coords, Coordinates::Range(493, 660));
//! assert!(loc.left_partial && loc.right_partial);
//! // the outer complement turns the '<' marker into a 3' partial end
//! assert!(loc.elements[0].three_prime_partial);
//! assert_eq!(loc.to_string(), "complement(join(<1..210,493..>660))");
//! ```

use std::fmt;

mod parse;
mod render;

pub use self::parse::*;
pub use self::render::*;

/// Coordinates of a single location element. All coordinates are 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Coordinates {
    /// `123`
    Base(u64),
    /// `123..456`
    Range(u64, u64),
    /// `123^124`
    Between(u64, u64),
    /// `gap(100)`, `gap(unk100)` or `gap()`; only occurs in contig (CO)
    /// locations.
    Gap { length: Option<u64>, unknown: bool },
}

impl Coordinates {
    #[inline]
    pub fn begin(&self) -> Option<u64> {
        match *self {
            Coordinates::Base(b) | Coordinates::Range(b, _) | Coordinates::Between(b, _) => Some(b),
            Coordinates::Gap { .. } => None,
        }
    }

    #[inline]
    pub fn end(&self) -> Option<u64> {
        match *self {
            Coordinates::Base(e) | Coordinates::Range(_, e) | Coordinates::Between(_, e) => Some(e),
            Coordinates::Gap { .. } => None,
        }
    }
}

/// Accession (and optional version) of another entry
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RemoteAccession {
    pub accession: String,
    pub version: Option<u32>,
}

impl RemoteAccession {
    pub fn new<S: Into<String>>(accession: S, version: Option<u32>) -> Self {
        RemoteAccession {
            accession: accession.into(),
            version,
        }
    }
}

impl fmt::Display for RemoteAccession {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.accession)?;
        if let Some(v) = self.version {
            write!(f, ".{}", v)?;
        }
        Ok(())
    }
}

/// A single location element.
///
/// Partiality is stored in biological terms (5' / 3' end). Which physical
/// marker (`<` on the begin, `>` on the end) corresponds to which end depends
/// on whether the element ends up on the complementary strand, see
/// [`partiality_from_markers`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Location {
    pub coords: Coordinates,
    /// Set for elements located on another entry
    pub remote: Option<RemoteAccession>,
    pub complement: bool,
    pub five_prime_partial: bool,
    pub three_prime_partial: bool,
}

impl Location {
    pub fn local(coords: Coordinates) -> Self {
        Location {
            coords,
            remote: None,
            complement: false,
            five_prime_partial: false,
            three_prime_partial: false,
        }
    }

    pub fn remote(remote: RemoteAccession, coords: Coordinates) -> Self {
        Location {
            remote: Some(remote),
            ..Self::local(coords)
        }
    }

    #[inline]
    pub fn base(pos: u64) -> Self {
        Self::local(Coordinates::Base(pos))
    }

    #[inline]
    pub fn range(begin: u64, end: u64) -> Self {
        Self::local(Coordinates::Range(begin, end))
    }

    #[inline]
    pub fn between(begin: u64, end: u64) -> Self {
        Self::local(Coordinates::Between(begin, end))
    }

    pub fn set_complement(mut self, complement: bool) -> Self {
        self.complement = complement;
        self
    }

    pub fn set_partial(mut self, five_prime: bool, three_prime: bool) -> Self {
        self.five_prime_partial = five_prime;
        self.three_prime_partial = three_prime;
        self
    }

    #[inline]
    pub fn is_remote(&self) -> bool {
        self.remote.is_some()
    }

    #[inline]
    pub fn is_gap(&self) -> bool {
        matches!(self.coords, Coordinates::Gap { .. })
    }

    #[inline]
    pub fn begin(&self) -> Option<u64> {
        self.coords.begin()
    }

    #[inline]
    pub fn end(&self) -> Option<u64> {
        self.coords.end()
    }

    /// Number of bases covered by the element. For remote elements this is
    /// the length on the remote entry.
    pub fn length(&self) -> u64 {
        match self.coords {
            Coordinates::Base(_) => 1,
            Coordinates::Range(b, e) => e.max(b) - e.min(b) + 1,
            Coordinates::Between(..) => 0,
            Coordinates::Gap { length, .. } => length.unwrap_or(0),
        }
    }

    /// True for a range whose begin lies after its end although neither end
    /// is partial.
    pub fn is_reversed(&self) -> bool {
        match self.coords {
            Coordinates::Range(b, e) => b > e && !self.five_prime_partial && !self.three_prime_partial,
            _ => false,
        }
    }
}

/// How the elements of a compound location are combined
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CompoundKind {
    Join,
    Order,
}

impl Default for CompoundKind {
    fn default() -> Self {
        CompoundKind::Join
    }
}

impl CompoundKind {
    pub fn as_str(&self) -> &'static str {
        match *self {
            CompoundKind::Join => "join",
            CompoundKind::Order => "order",
        }
    }
}

/// Location of a feature or of the contigs of an entry.
#[derive(Debug, Clone, PartialEq, Eq, Default, Hash, Serialize, Deserialize)]
pub struct CompoundLocation {
    pub elements: Vec<Location>,
    pub kind: CompoundKind,
    /// `complement(join(...))`
    pub complement: bool,
    /// `<` on the begin of the first element
    pub left_partial: bool,
    /// `>` on the end of the last element
    pub right_partial: bool,
    /// A single element written without `join(...)`
    pub simple_location: bool,
}

impl CompoundLocation {
    pub fn new(kind: CompoundKind) -> Self {
        CompoundLocation {
            kind,
            ..Default::default()
        }
    }

    /// A compound that is rendered as a bare element
    pub fn simple(location: Location) -> Self {
        let mut c = CompoundLocation {
            simple_location: true,
            ..Default::default()
        };
        c.push(location);
        c.update_partiality();
        c
    }

    pub fn push(&mut self, location: Location) {
        self.elements.push(location);
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// Recomputes `left_partial` / `right_partial` from the terminal elements
    pub fn update_partiality(&mut self) {
        self.left_partial = self
            .elements
            .first()
            .map(|l| markers_from_partiality(self.complement ^ l.complement, l.five_prime_partial, l.three_prime_partial).0)
            .unwrap_or(false);
        self.right_partial = self
            .elements
            .last()
            .map(|l| markers_from_partiality(self.complement ^ l.complement, l.five_prime_partial, l.three_prime_partial).1)
            .unwrap_or(false);
    }

    /// The compound as a whole lacks its 5' end
    pub fn is_five_prime_partial(&self) -> bool {
        self.terminal_partiality().0
    }

    /// The compound as a whole lacks its 3' end
    pub fn is_three_prime_partial(&self) -> bool {
        self.terminal_partiality().1
    }

    // The left marker belongs to the first element, the right marker to the
    // last one; each is interpreted in the orientation of its own element.
    fn terminal_partiality(&self) -> (bool, bool) {
        let first = self.elements.first().map(|l| l.complement).unwrap_or(false);
        let last = self.elements.last().map(|l| l.complement).unwrap_or(false);
        let (l5, l3) = partiality_from_markers(self.complement ^ first, self.left_partial, false);
        let (r5, r3) = partiality_from_markers(self.complement ^ last, false, self.right_partial);
        (l5 || r5, l3 || r3)
    }

    /// Smallest local coordinate, ignoring remote elements and gaps
    pub fn min_position(&self) -> Option<u64> {
        self.local_coords()
            .filter_map(|c| match (c.begin(), c.end()) {
                (Some(b), Some(e)) => Some(b.min(e)),
                _ => None,
            })
            .min()
    }

    /// Largest local coordinate, ignoring remote elements and gaps
    pub fn max_position(&self) -> Option<u64> {
        self.local_coords()
            .filter_map(|c| match (c.begin(), c.end()) {
                (Some(b), Some(e)) => Some(b.max(e)),
                _ => None,
            })
            .max()
    }

    /// Summed length of all elements
    pub fn length(&self) -> u64 {
        self.elements.iter().map(|l| l.length()).sum()
    }

    fn local_coords(&self) -> impl Iterator<Item = &Coordinates> {
        self.elements.iter().filter(|l| !l.is_remote()).map(|l| &l.coords)
    }
}

impl fmt::Display for CompoundLocation {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&render(self))
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut s = String::new();
        render_element(self, false, &mut s);
        f.write_str(&s)
    }
}

/// Maps the physical partiality markers of an element (`<` before the begin,
/// `>` before the end) to `(five_prime_partial, three_prime_partial)`.
///
/// On the forward strand the begin is the 5' end. If the element is read on
/// the complementary strand (`complement` is the effective orientation, i.e.
/// the element's own flag XOR the flag of an enclosing compound), the begin
/// is the 3' end and the markers swap.
#[inline]
pub fn partiality_from_markers(complement: bool, left: bool, right: bool) -> (bool, bool) {
    if complement {
        (right, left)
    } else {
        (left, right)
    }
}

/// Inverse of [`partiality_from_markers`]: returns `(left, right)` markers
/// for the given biological partiality.
#[inline]
pub fn markers_from_partiality(complement: bool, five_prime: bool, three_prime: bool) -> (bool, bool) {
    if complement {
        (three_prime, five_prime)
    } else {
        (five_prime, three_prime)
    }
}
