//! Diagnostics collected while parsing.
//!
//! The reader never formats human readable messages. Every structural
//! problem is recorded as a `(code, origin, params)` tuple which a message
//! catalog can render later. The codes used by this crate are listed in
//! [`codes`].

use std::fmt;

/// Message codes emitted by the reader.
pub mod codes {
    /// Line too short or malformed for its column layout
    pub const LINE_FORMAT: &str = "FF.1";
    /// Input ended before the entry terminator
    pub const MISSING_TERMINATOR: &str = "FF.2";
    /// Unrecognised tag
    pub const UNKNOWN_TAG: &str = "FF.6";
    /// A block allowed only once per entry occurred again
    pub const REPEATED_BLOCK: &str = "FF.7";
    /// Malformed ID line
    pub const ID_FORMAT: &str = "ID.1";
    /// Malformed DT line
    pub const DATE_FORMAT: &str = "DT.1";
    /// Reference line before any RN line
    pub const REFERENCE_MISSING_RN: &str = "RN.1";
    /// Malformed reference number or position
    pub const REFERENCE_FORMAT: &str = "RN.2";
    /// Feature header without key or location
    pub const FEATURE_HEADER: &str = "FT.1";
    /// Qualifier line not starting with '/'
    pub const QUALIFIER_FORMAT: &str = "FT.3";
    /// Location text does not match the grammar
    pub const LOCATION_FORMAT: &str = "FT.4";
    /// Unbalanced quotes in a qualifier value
    pub const QUALIFIER_QUOTES: &str = "FT.5";
    /// Range with begin > end
    pub const LOCATION_ORDER: &str = "FT.7";
    /// Partiality on an inner element of a compound location
    pub const INNER_PARTIALITY: &str = "FT.8";
    /// Source feature without /mol_type
    pub const MISSING_MOL_TYPE: &str = "FT.9";
    /// /mol_type disagrees with the molecule type seen before
    pub const MOL_TYPE_CONFLICT: &str = "FT.10";
    /// Malformed number inside a location
    pub const LOCATION_NUMBER: &str = "FT.11";
    /// `/db_xref="taxon:..."` without a numeric id
    pub const TAXON_FORMAT: &str = "FT.12";
    /// Invalid character in a sequence line
    pub const SEQUENCE_CHAR: &str = "SQ.1";
    /// Decoded sequence length differs from the declared one
    pub const SEQUENCE_LENGTH: &str = "SQ.2";
    /// Unparseable CO line
    pub const CONTIG_FORMAT: &str = "CO.1";
    /// Malformed AS line
    pub const ASSEMBLY_FORMAT: &str = "AS.1";
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Severity {
    Info,
    Warning,
    Error,
}

/// Where a message originates from: an optional file identifier and the
/// range of physical lines (1-based, inclusive) of the offending block.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Origin {
    pub file_id: Option<String>,
    pub first_line: u64,
    pub last_line: u64,
}

impl Origin {
    pub fn new(file_id: Option<String>, first_line: u64, last_line: u64) -> Self {
        Origin {
            file_id,
            first_line,
            last_line,
        }
    }

    /// Origin covering a single line
    pub fn line(file_id: Option<String>, line: u64) -> Self {
        Self::new(file_id, line, line)
    }
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if let Some(id) = self.file_id.as_ref() {
            write!(f, "{}:", id)?;
        }
        if self.first_line == self.last_line {
            write!(f, "{}", self.first_line)
        } else {
            write!(f, "{}-{}", self.first_line, self.last_line)
        }
    }
}

/// A single diagnostic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationMessage {
    pub code: String,
    pub severity: Severity,
    pub origin: Option<Origin>,
    /// Positional parameters for the message template
    pub params: Vec<String>,
}

impl ValidationMessage {
    pub fn new(code: &str, severity: Severity, origin: Option<Origin>) -> Self {
        ValidationMessage {
            code: code.to_string(),
            severity,
            origin,
            params: vec![],
        }
    }

    pub fn with_param<T: ToString>(mut self, param: T) -> Self {
        self.params.push(param.to_string());
        self
    }

    /// Adds a positional parameter in place (used through
    /// `ValidationResult::error()` / `warning()`).
    pub fn param<T: ToString>(&mut self, param: T) -> &mut Self {
        self.params.push(param.to_string());
        self
    }
}

impl fmt::Display for ValidationMessage {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:?} {}", self.severity, self.code)?;
        if let Some(o) = self.origin.as_ref() {
            write!(f, " at line {}", o)?;
        }
        if !self.params.is_empty() {
            write!(f, " [{}]", self.params.join(", "))?;
        }
        Ok(())
    }
}

/// Ordered collection of diagnostics for one entry.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ValidationResult {
    messages: Vec<ValidationMessage>,
}

impl ValidationResult {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn append(&mut self, message: ValidationMessage) {
        self.messages.push(message);
    }

    pub fn extend(&mut self, other: ValidationResult) {
        self.messages.extend(other.messages);
    }

    #[inline]
    pub fn error(&mut self, code: &str, origin: Option<Origin>) -> &mut ValidationMessage {
        self.push(code, Severity::Error, origin)
    }

    #[inline]
    pub fn warning(&mut self, code: &str, origin: Option<Origin>) -> &mut ValidationMessage {
        self.push(code, Severity::Warning, origin)
    }

    fn push(&mut self, code: &str, severity: Severity, origin: Option<Origin>) -> &mut ValidationMessage {
        self.messages.push(ValidationMessage::new(code, severity, origin));
        let last = self.messages.len() - 1;
        &mut self.messages[last]
    }

    pub fn messages(&self) -> &[ValidationMessage] {
        &self.messages
    }

    pub fn into_messages(self) -> Vec<ValidationMessage> {
        self.messages
    }

    /// True if no message has `Severity::Error`
    pub fn is_valid(&self) -> bool {
        !self.messages.iter().any(|m| m.severity == Severity::Error)
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Number of messages with the given code
    pub fn count(&self, code: &str) -> usize {
        self.messages.iter().filter(|m| m.code == code).count()
    }

    pub fn contains(&self, code: &str) -> bool {
        self.messages.iter().any(|m| m.code == code)
    }

    pub fn clear(&mut self) {
        self.messages.clear();
    }
}
