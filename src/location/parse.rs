use lazy_static::lazy_static;
use regex::Regex;
use thiserror::Error;

use super::*;
use crate::validation::codes;

lazy_static! {
    // 1: complement(  2: accession  3: version  4: '<'  5: begin
    // 6: operator  7: '>'  8: end  9: closing parentheses
    static ref ELEMENT: Regex = Regex::new(
        r"^(complement\()?(?:([A-Za-z][A-Za-z0-9_]*)(?:\.(\d+))?:)?(<)?(\d+)(?:(\.\.|\^)(>)?(\d+))?(\)*)$"
    ).expect("invalid element pattern");

    // 1: 'unk'  2: length
    static ref GAP: Regex = Regex::new(r"^gap\((?:(unk)?(\d+))?\)$").expect("invalid gap pattern");
}

/// Location parsing error
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LocationError {
    #[error("empty location")]
    Empty,
    /// The text does not match the location grammar
    #[error("invalid location: '{0}'")]
    Syntax(String),
    /// A partiality marker on an element that is neither the first nor the
    /// last one of a compound location
    #[error("partial location in inner element {index} of '{text}'")]
    InnerPartiality { index: usize, text: String },
    /// A coordinate or version that does not fit into an integer
    #[error("invalid number in location: '{0}'")]
    Number(String),
}

impl LocationError {
    /// Diagnostic code under which the error is reported
    pub fn code(&self) -> &'static str {
        match *self {
            LocationError::Empty | LocationError::Syntax(_) => codes::LOCATION_FORMAT,
            LocationError::InnerPartiality { .. } => codes::INNER_PARTIALITY,
            LocationError::Number(_) => codes::LOCATION_NUMBER,
        }
    }
}

/// Parses a location with default (strict) settings.
#[inline]
pub fn parse(text: &str) -> Result<CompoundLocation, LocationError> {
    LocationParser::new().parse(text)
}

/// Decoder for the location grammar:
///
/// ```text
/// compound  := complement? operator? '(' elements ')'  |  element
/// operator  := 'join' | 'order'
/// elements  := element (',' element)*
/// element   := complement? (accession ('.' version)? ':')? '<'? begin (op '>'? end)? ')'*
/// op        := '..' | '^'
/// ```
///
/// Whitespace anywhere in the text is ignored.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocationParser {
    lenient: bool,
}

impl LocationParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// In lenient mode, partiality markers on inner elements of a compound
    /// location are accepted and kept on the element.
    pub fn lenient(mut self, lenient: bool) -> Self {
        self.lenient = lenient;
        self
    }

    /// Parses a location. Any problem, including an element with an
    /// unparseable number, is an error.
    pub fn parse(&self, text: &str) -> Result<CompoundLocation, LocationError> {
        let mut dropped = vec![];
        let loc = self.parse_recovering(text, &mut dropped)?;
        match dropped.into_iter().next() {
            Some(e) => Err(e),
            None => Ok(loc),
        }
    }

    /// Parses a location, recovering from elements whose numbers cannot be
    /// parsed: such elements are left out of the result and the error is
    /// pushed to `dropped`. Grammar errors are still returned as `Err`.
    pub fn parse_recovering(
        &self,
        text: &str,
        dropped: &mut Vec<LocationError>,
    ) -> Result<CompoundLocation, LocationError> {
        let s: String = text.chars().filter(|c| !c.is_whitespace()).collect();
        if s.is_empty() {
            return Err(LocationError::Empty);
        }

        let mut compound = CompoundLocation::default();
        let mut inner = s.as_str();
        if let Some(body) = strip_wrapper(inner, "complement") {
            if body.starts_with("join(") || body.starts_with("order(") {
                compound.complement = true;
                inner = body;
            }
        }

        let body = if let Some(body) = strip_wrapper(inner, "join") {
            compound.kind = CompoundKind::Join;
            body
        } else if let Some(body) = strip_wrapper(inner, "order") {
            compound.kind = CompoundKind::Order;
            body
        } else {
            compound.simple_location = true;
            inner
        };

        let parts = if compound.simple_location {
            vec![body]
        } else {
            split_elements(body).ok_or_else(|| LocationError::Syntax(s.clone()))?
        };

        let last = parts.len() - 1;
        for (i, part) in parts.iter().enumerate() {
            let (mut location, left, right) = match self.parse_marked_element(part) {
                Ok(l) => l,
                Err(e @ LocationError::Number(_)) => {
                    dropped.push(e);
                    continue;
                }
                Err(e) => return Err(e),
            };
            if !self.lenient && ((left && i != 0) || (right && i != last)) {
                return Err(LocationError::InnerPartiality {
                    index: i + 1,
                    text: s.clone(),
                });
            }
            let (five, three) = partiality_from_markers(compound.complement ^ location.complement, left, right);
            location.five_prime_partial = five;
            location.three_prime_partial = three;
            if i == 0 {
                compound.left_partial = left;
            }
            if i == last {
                compound.right_partial = right;
            }
            compound.push(location);
        }

        if compound.is_empty() && dropped.is_empty() {
            return Err(LocationError::Syntax(s));
        }
        Ok(compound)
    }

    /// Parses a single element (such as `complement(A00001.1:<1..210)`).
    /// Partiality is interpreted in the element's own orientation.
    pub fn parse_element(&self, text: &str) -> Result<Location, LocationError> {
        let s: String = text.chars().filter(|c| !c.is_whitespace()).collect();
        let (mut location, left, right) = self.parse_marked_element(&s)?;
        let (five, three) = partiality_from_markers(location.complement, left, right);
        location.five_prime_partial = five;
        location.three_prime_partial = three;
        Ok(location)
    }

    // Returns the element together with the raw (left, right) markers.
    fn parse_marked_element(&self, text: &str) -> Result<(Location, bool, bool), LocationError> {
        if let Some(caps) = GAP.captures(text) {
            let length = caps.get(2).map(|m| parse_number(m.as_str())).transpose()?;
            let coords = Coordinates::Gap {
                length,
                unknown: caps.get(1).is_some(),
            };
            return Ok((Location::local(coords), false, false));
        }

        let caps = ELEMENT
            .captures(text)
            .ok_or_else(|| LocationError::Syntax(text.to_string()))?;

        let complement = caps.get(1).is_some();
        let closing = caps.get(9).map(|m| m.as_str().len()).unwrap_or(0);
        if closing != complement as usize {
            return Err(LocationError::Syntax(text.to_string()));
        }

        let begin = parse_number(&caps[5])?;
        let left = caps.get(4).is_some();
        let right = caps.get(7).is_some();
        let coords = match (caps.get(6).map(|m| m.as_str()), caps.get(8)) {
            (None, None) => Coordinates::Base(begin),
            (Some(".."), Some(end)) => Coordinates::Range(begin, parse_number(end.as_str())?),
            (Some("^"), Some(end)) => Coordinates::Between(begin, parse_number(end.as_str())?),
            _ => return Err(LocationError::Syntax(text.to_string())),
        };

        let remote = match caps.get(2) {
            Some(acc) => {
                let version = caps
                    .get(3)
                    .map(|v| {
                        v.as_str()
                            .parse::<u32>()
                            .map_err(|_| LocationError::Number(v.as_str().to_string()))
                    })
                    .transpose()?;
                Some(RemoteAccession::new(acc.as_str(), version))
            }
            None => None,
        };

        let location = Location {
            coords,
            remote,
            complement,
            five_prime_partial: false,
            three_prime_partial: false,
        };
        Ok((location, left, right))
    }
}

/// Strict base-10 parsing. The grammar only lets digits through, so the only
/// possible failure is overflow.
#[inline]
fn parse_number(s: &str) -> Result<u64, LocationError> {
    s.parse::<u64>()
        .map_err(|_| LocationError::Number(s.to_string()))
}

/// If `s` is `name(...)` with the parenthesis opened after `name` closing at
/// the very end, returns the enclosed text.
fn strip_wrapper<'a>(s: &'a str, name: &str) -> Option<&'a str> {
    let rest = s.strip_prefix(name)?.strip_prefix('(')?;
    let mut depth = 1usize;
    for (i, c) in rest.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth == 0 {
                    return if i == rest.len() - 1 {
                        Some(&rest[..i])
                    } else {
                        None
                    };
                }
            }
            _ => {}
        }
    }
    None
}

/// Splits at top level commas. Returns `None` for unbalanced parentheses or
/// empty elements.
fn split_elements(s: &str) -> Option<Vec<&str>> {
    let mut parts = vec![];
    let mut depth = 0i32;
    let mut start = 0;
    for (i, c) in s.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth < 0 {
                    return None;
                }
            }
            ',' if depth == 0 => {
                parts.push(&s[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    if depth != 0 {
        return None;
    }
    parts.push(&s[start..]);
    if parts.iter().any(|p| p.is_empty()) {
        return None;
    }
    Some(parts)
}
