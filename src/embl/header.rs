//! Entry header lines: ID, AC, PR, DT, DE, KW, CC, DR, AS

use std::io;

use chrono::NaiveDate;
use lazy_static::lazy_static;
use regex::Regex;

use super::reader::{EntryState, Reader};
use crate::block::{self, Concatenate};
use crate::entry::{Assembly, Entry, Topology, XRef};
use crate::error::Result;
use crate::policy::BufPolicy;
use crate::validation::codes;

lazy_static! {
    // 1: date  2: release  3: 'Created'  4: version (last updated)
    static ref DATE: Regex = Regex::new(
        r"^(\d{1,2}-[A-Za-z]{3}-\d{4})\s*\(Rel\.\s*(\d+),\s*(?:(Created)|Last updated,\s*Version\s*(\d+))\)$"
    ).expect("invalid date pattern");

    // 1-2: local span  3: primary identifier  4-5: primary span  6: complement
    static ref ASSEMBLY: Regex = Regex::new(
        r"^(\d+)-(\d+)\s+(\S+)\s+(?:(\d+)-(\d+)|not_available)(?:\s+(c))?$"
    ).expect("invalid assembly pattern");
}

/// Placeholder for absent ID line fields
pub(super) const ABSENT: &str = "XXX";

impl<R, P> Reader<R, P>
where
    R: io::Read,
    P: BufPolicy,
{
    pub(super) fn read_id(&mut self, st: &mut EntryState) {
        let block = block::read_single_line(&self.lines);
        if !parse_id(&block.text, &mut st.entry) {
            let origin = self.block_origin(&block);
            st.validation.error(codes::ID_FORMAT, Some(origin)).param(&block.text);
        }
        if let Some(m) = st.entry.sequence.molecule_type.as_ref() {
            self.session.molecule_type = Some(m.clone());
        }
    }

    pub(super) fn read_accessions(&mut self, st: &mut EntryState) -> Result<()> {
        let block = block::read_multi_line(&mut self.lines, &mut self.session, Concatenate::Space)?;
        let mut accessions = split_list(&block.text).into_iter();
        if let Some(primary) = accessions.next() {
            if st.entry.primary_accession.is_none() {
                st.entry.primary_accession = Some(primary);
            }
        }
        st.entry.secondary_accessions.extend(accessions);
        Ok(())
    }

    pub(super) fn read_projects(&mut self, st: &mut EntryState) -> Result<()> {
        let block = block::read_multi_line(&mut self.lines, &mut self.session, Concatenate::Space)?;
        st.entry.project_accessions.extend(split_list(&block.text).into_iter().map(|p| {
            match p.strip_prefix("Project:") {
                Some(acc) => acc.to_string(),
                None => p,
            }
        }));
        Ok(())
    }

    pub(super) fn read_date(&mut self, st: &mut EntryState) {
        let block = block::read_single_line(&self.lines);
        if !parse_date(&block.text, &mut st.entry) {
            let origin = self.block_origin(&block);
            st.validation.error(codes::DATE_FORMAT, Some(origin)).param(&block.text);
        }
    }

    pub(super) fn read_description(&mut self, st: &mut EntryState) -> Result<()> {
        let block = block::read_multi_line(&mut self.lines, &mut self.session, Concatenate::Space)?;
        if !block.text.is_empty() {
            st.entry.description = Some(block.text);
        }
        Ok(())
    }

    pub(super) fn read_keywords(&mut self, st: &mut EntryState) -> Result<()> {
        let block = block::read_multi_line(&mut self.lines, &mut self.session, Concatenate::Space)?;
        st.entry.keywords.extend(split_list(&block.text));
        Ok(())
    }

    pub(super) fn read_comment(&mut self, st: &mut EntryState) -> Result<()> {
        let block = block::read_multi_line(&mut self.lines, &mut self.session, Concatenate::Break)?;
        match st.entry.comment.as_mut() {
            Some(c) => {
                c.push('\n');
                c.push_str(&block.text);
            }
            None => st.entry.comment = Some(block.text),
        }
        Ok(())
    }

    pub(super) fn read_xref(&mut self, st: &mut EntryState) {
        let block = block::read_single_line(&self.lines);
        match parse_xref(&block.text) {
            Some(x) => st.entry.xrefs.push(x),
            None => {
                let origin = self.block_origin(&block);
                st.validation.error(codes::LINE_FORMAT, Some(origin)).param(&block.text);
            }
        }
    }

    pub(super) fn read_assembly(&mut self, st: &mut EntryState) {
        let block = block::read_single_line(&self.lines);
        match parse_assembly(&block.text) {
            Some(a) => st.entry.assembly.push(a),
            None => {
                let origin = self.block_origin(&block);
                st.validation.error(codes::ASSEMBLY_FORMAT, Some(origin)).param(&block.text);
            }
        }
    }
}

#[inline]
fn field(s: &str) -> Option<String> {
    if s.is_empty() || s == ABSENT {
        None
    } else {
        Some(s.to_string())
    }
}

/// Parses `X56734; SV 1; linear; mRNA; STD; PLN; 1859 BP.` into `entry`.
/// Fields that can be read are set even if the line is malformed, in which
/// case `false` is returned.
pub(super) fn parse_id(text: &str, entry: &mut Entry) -> bool {
    let text = text.trim_end_matches('.');
    let fields: Vec<&str> = text.split(';').map(|f| f.trim()).collect();
    if fields[0].is_empty() {
        return false;
    }
    entry.primary_accession = field(fields[0]);
    if fields.len() != 7 {
        return false;
    }

    let mut ok = true;
    match fields[1].strip_prefix("SV") {
        Some(v) => match v.trim() {
            ABSENT => {}
            v => match v.parse() {
                Ok(v) => entry.sequence.version = Some(v),
                Err(_) => ok = false,
            },
        },
        None => ok = false,
    }

    if fields[2] != ABSENT {
        match fields[2].parse::<Topology>() {
            Ok(t) => entry.sequence.topology = Some(t),
            Err(_) => ok = false,
        }
    }

    entry.sequence.molecule_type = field(fields[3]);
    entry.data_class = field(fields[4]);
    entry.division = field(fields[5]);

    match fields[6].strip_suffix("BP") {
        Some(n) => match n.trim() {
            ABSENT => {}
            n => match n.parse() {
                Ok(n) => entry.sequence.length = n,
                Err(_) => ok = false,
            },
        },
        None => ok = false,
    }
    ok
}

/// Parses a `DT` line into the first public or last updated fields.
pub(super) fn parse_date(text: &str, entry: &mut Entry) -> bool {
    let caps = match DATE.captures(text) {
        Some(c) => c,
        None => return false,
    };
    let date = match NaiveDate::parse_from_str(&caps[1], "%d-%b-%Y") {
        Ok(d) => d,
        Err(_) => return false,
    };
    let release = match caps[2].parse() {
        Ok(r) => r,
        Err(_) => return false,
    };
    if caps.get(3).is_some() {
        entry.first_public = Some(date);
        entry.first_public_release = Some(release);
    } else {
        let version = match caps[4].parse() {
            Ok(v) => v,
            Err(_) => return false,
        };
        entry.last_updated = Some(date);
        entry.last_updated_release = Some(release);
        entry.entry_version = Some(version);
    }
    true
}

/// Splits `a; b; c.` into its items
pub(super) fn split_list(text: &str) -> Vec<String> {
    text.trim_end()
        .trim_end_matches('.')
        .split(';')
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
        .collect()
}

/// Parses `DB; primary; secondary.` (DR and RX lines)
pub(super) fn parse_xref(text: &str) -> Option<XRef> {
    let text = text.trim_end().trim_end_matches('.');
    let mut parts = text.splitn(3, ';').map(|s| s.trim());
    let database = parts.next().filter(|s| !s.is_empty())?;
    let primary = parts.next().filter(|s| !s.is_empty())?;
    let secondary = parts.next().filter(|s| !s.is_empty()).map(|s| s.to_string());
    Some(XRef::new(database, primary, secondary))
}

pub(super) fn parse_assembly(text: &str) -> Option<Assembly> {
    let caps = ASSEMBLY.captures(text)?;
    let num = |i: usize| caps.get(i).and_then(|m| m.as_str().parse::<u64>().ok());
    let span = (num(1)?, num(2)?);
    let primary_span = match caps.get(4) {
        Some(_) => Some((num(4)?, num(5)?)),
        None => None,
    };
    Some(Assembly {
        span,
        primary_identifier: caps[3].to_string(),
        primary_span,
        complement: caps.get(6).is_some(),
    })
}
