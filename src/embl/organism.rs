//! Organism lines (OS, OC, OG). These only fill the organism cache of the
//! session; the data ends up in the source features declaring the organism.

use std::io;

use lazy_static::lazy_static;
use regex::Regex;

use super::reader::{EntryState, Reader};
use crate::block::{self, Concatenate};
use crate::error::Result;
use crate::policy::BufPolicy;
use crate::validation::codes;

lazy_static! {
    // 1: scientific name  2: common name
    static ref SPECIES: Regex = Regex::new(r"^(.+?)\s*\(([^()]+)\)$").expect("invalid species pattern");
}

impl<R, P> Reader<R, P>
where
    R: io::Read,
    P: BufPolicy,
{
    pub(super) fn read_species(&mut self, st: &mut EntryState) -> Result<()> {
        let block = block::read_multi_line(&mut self.lines, &mut self.session, Concatenate::Space)?;
        match parse_species(&block.text) {
            Some((name, common)) => self.session.add_organism(name, common.map(|c| c.to_string())),
            None => {
                let origin = self.block_origin(&block);
                st.validation.error(codes::LINE_FORMAT, Some(origin)).param(&block.text);
            }
        }
        Ok(())
    }

    pub(super) fn read_classification(&mut self) -> Result<()> {
        let block = block::read_multi_line(&mut self.lines, &mut self.session, Concatenate::Space)?;
        let lineage = block.text.trim_end_matches('.').trim();
        if let Some(t) = self.session.last_organism_mut() {
            if !lineage.is_empty() {
                t.lineage = Some(lineage.to_string());
            }
        }
        Ok(())
    }

    pub(super) fn read_organelle(&mut self) {
        let block = block::read_single_line(&self.lines);
        if let Some(t) = self.session.last_organism_mut() {
            if !block.text.is_empty() {
                t.organelle = Some(block.text);
            }
        }
    }
}

/// Splits `Homo sapiens (human)` into scientific and common name
pub(super) fn parse_species(text: &str) -> Option<(&str, Option<&str>)> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    match SPECIES.captures(text) {
        Some(caps) => {
            let name = caps.get(1)?.as_str();
            let common = caps.get(2)?.as_str();
            Some((name, Some(common)))
        }
        None => Some((text, None)),
    }
}
