//! Citation lines (RN, RC, RP, RX, RG, RA, RT, RL).
//!
//! An `RN` line starts a new reference in the session; the other lines fill
//! it in. The reference is attached to the entry once the next `RN` line or
//! any other block starts.

use std::io;

use lazy_static::lazy_static;
use regex::Regex;

use super::header::parse_xref;
use super::reader::{EntryState, Reader};
use crate::block::{self, Concatenate};
use crate::error::Result;
use crate::location::{CompoundKind, CompoundLocation, Location};
use crate::policy::BufPolicy;
use crate::validation::codes;

lazy_static! {
    static ref NUMBER: Regex = Regex::new(r"^\[(\d+)\]$").expect("invalid reference number pattern");
    static ref POSITION: Regex = Regex::new(r"^(\d+)\s*-\s*(\d+)$").expect("invalid reference position pattern");
}

impl<R, P> Reader<R, P>
where
    R: io::Read,
    P: BufPolicy,
{
    pub(super) fn read_reference_number(&mut self, st: &mut EntryState) {
        let block = block::read_single_line(&self.lines);
        let number = NUMBER
            .captures(&block.text)
            .and_then(|c| c[1].parse::<u32>().ok());
        if number.is_none() {
            let origin = self.block_origin(&block);
            st.validation.error(codes::REFERENCE_FORMAT, Some(origin)).param(&block.text);
        }
        if let Some(previous) = self.session.start_reference(number) {
            st.entry.references.push(previous);
        }
    }

    pub(super) fn read_reference_line(&mut self, tag: &str, st: &mut EntryState) -> Result<()> {
        // RX lines are read one by one, one cross-reference each
        let block = if tag == "RX" {
            block::read_single_line(&self.lines)
        } else {
            block::read_multi_line(&mut self.lines, &mut self.session, Concatenate::Space)?
        };
        let origin = self.block_origin(&block);

        let reference = match self.session.reference_mut() {
            Some(r) => r,
            None => {
                st.validation.error(codes::REFERENCE_MISSING_RN, Some(origin)).param(tag);
                return Ok(());
            }
        };

        let text = block.text;
        match tag {
            "RC" => reference.comment = Some(text),
            "RP" => match parse_positions(&text) {
                Some(loc) => reference.location = Some(loc),
                None => {
                    st.validation.error(codes::REFERENCE_FORMAT, Some(origin)).param(&text);
                }
            },
            "RX" => match parse_xref(&text) {
                Some(x) => reference.xrefs.push(x),
                None => {
                    st.validation.error(codes::REFERENCE_FORMAT, Some(origin)).param(&text);
                }
            },
            "RG" => reference.group = Some(text),
            "RA" => reference.authors = parse_authors(&text),
            "RT" => reference.title = Some(parse_title(&text)),
            "RL" => reference.locator = Some(text),
            _ => unreachable!(),
        }
        Ok(())
    }
}

/// Parses `1-1859, 1900-2000`
pub(super) fn parse_positions(text: &str) -> Option<CompoundLocation> {
    let mut ranges = vec![];
    for part in text.split(',') {
        let caps = POSITION.captures(part.trim())?;
        let begin = caps[1].parse().ok()?;
        let end = caps[2].parse().ok()?;
        ranges.push(Location::range(begin, end));
    }
    if ranges.len() == 1 {
        return ranges.pop().map(CompoundLocation::simple);
    }
    let mut loc = CompoundLocation::new(CompoundKind::Join);
    for r in ranges {
        loc.push(r);
    }
    Some(loc)
}

/// `Oxtoby E., Dunn M.A., Pancoro A., Hughes M.A.;`
pub(super) fn parse_authors(text: &str) -> Vec<String> {
    text.trim_end_matches(';')
        .split(',')
        .map(|a| a.trim())
        .filter(|a| !a.is_empty())
        .map(|a| a.to_string())
        .collect()
}

/// `"Nucleotide and derived amino acid sequence...";` or `;`
pub(super) fn parse_title(text: &str) -> String {
    let t = text.trim().trim_end_matches(';').trim();
    let t = t.strip_prefix('"').unwrap_or(t);
    let t = t.strip_suffix('"').unwrap_or(t);
    t.to_string()
}
