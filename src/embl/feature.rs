//! The feature table (FT lines).
//!
//! ```text
//! FT   CDS             join(<1..210,
//! FT                   493..660)
//! FT                   /product="non-cyanogenic ""beta""-glucosidase"
//! FT                   /codon_start=1
//! ```
//!
//! A feature starts with a line holding the key in the key column. Following
//! lines up to the first qualifier continue the location. A quoted qualifier
//! value continues until its quotes are balanced, so it may contain lines
//! that start with `/` or are empty.

use std::io;

use super::reader::{EntryState, Reader};
use crate::entry::{qualifiers, Feature, XRef};
use crate::error::Result;
use crate::location::CompoundLocation;
use crate::policy::BufPolicy;
use crate::validation::{codes, Origin};

const FEATURE_TAG: &str = "FT";

impl<R, P> Reader<R, P>
where
    R: io::Read,
    P: BufPolicy,
{
    /// Reads all consecutive FT lines.
    pub(super) fn read_features(&mut self, st: &mut EntryState) -> Result<()> {
        loop {
            let content = self.lines.current_content();
            if starts_key(content) {
                let header = content.to_string();
                self.read_feature(st, &header)?;
            } else if !content.trim().is_empty() {
                // qualifier or location line without a feature key
                let text = content.trim().to_string();
                let origin = self.line_origin();
                st.validation.error(codes::FEATURE_HEADER, Some(origin)).param(text);
            }
            if !self.lines.is_next_tag(FEATURE_TAG) {
                return Ok(());
            }
            self.lines.read_line(&mut self.session)?;
        }
    }

    fn read_feature(&mut self, st: &mut EntryState, header: &str) -> Result<()> {
        let first_line = self.lines.current_line_number();
        let mut words = header.trim().splitn(2, char::is_whitespace);
        let key = words.next().unwrap_or("").to_string();
        let mut location_text = words.next().unwrap_or("").trim().to_string();

        // location continuation lines
        while self.next_is_continuation() {
            let next = self.lines.next_content().trim();
            if next.starts_with('/') {
                break;
            }
            let next = next.to_string();
            self.lines.read_line(&mut self.session)?;
            location_text.push_str(&next);
        }
        let origin = self.origin(first_line, self.lines.current_line_number());

        let location = if location_text.is_empty() {
            st.validation
                .error(codes::FEATURE_HEADER, Some(origin.clone()))
                .param(&key);
            CompoundLocation::default()
        } else {
            self.parse_feature_location(&location_text, &origin, st)
        };

        let mut feature = Feature::new(key, location);
        while self.next_is_continuation() {
            self.lines.read_line(&mut self.session)?;
            if self.lines.current_content().trim().is_empty() {
                continue;
            }
            self.read_qualifier(&mut feature, st)?;
        }

        let origin = self.origin(first_line, self.lines.current_line_number());
        self.finish_feature(feature, st, origin)
    }

    // true if the next line is an FT line without a feature key
    #[inline]
    fn next_is_continuation(&self) -> bool {
        self.lines.is_next_tag(FEATURE_TAG) && !starts_key(self.lines.next_content())
    }

    fn parse_feature_location(&self, text: &str, origin: &Origin, st: &mut EntryState) -> CompoundLocation {
        let mut dropped = vec![];
        match self.locations.parse_recovering(text, &mut dropped) {
            Ok(location) => {
                for e in dropped {
                    st.validation
                        .error(e.code(), Some(origin.clone()))
                        .param(text);
                }
                for l in location.elements.iter().filter(|l| l.is_reversed()) {
                    st.validation
                        .warning(codes::LOCATION_ORDER, Some(origin.clone()))
                        .param(l);
                }
                location
            }
            Err(e) => {
                st.validation
                    .error(e.code(), Some(origin.clone()))
                    .param(text);
                CompoundLocation::default()
            }
        }
    }

    // The reader is positioned at the first line of the qualifier
    fn read_qualifier(&mut self, feature: &mut Feature, st: &mut EntryState) -> Result<()> {
        let first_line = self.lines.current_line_number();
        let text = self.lines.current_content().trim().to_string();
        let body = match text.strip_prefix('/') {
            Some(b) => b,
            None => {
                let origin = self.line_origin();
                st.validation.error(codes::QUALIFIER_FORMAT, Some(origin)).param(&text);
                return Ok(());
            }
        };
        let (name, value) = match body.find('=') {
            Some(i) => (body[..i].trim(), Some(body[i + 1..].trim())),
            None => (body.trim(), None),
        };
        if name.is_empty() {
            let origin = self.line_origin();
            st.validation.error(codes::QUALIFIER_FORMAT, Some(origin)).param(&text);
            return Ok(());
        }
        let name = name.to_string();

        let value = match value {
            Some(v) if v.starts_with('"') => {
                let mut v = v.to_string();
                let no_space = name == qualifiers::TRANSLATION;
                while is_open(&v) && self.next_is_continuation() {
                    self.lines.read_line(&mut self.session)?;
                    let line = self.lines.current_content().trim();
                    if line.is_empty() {
                        continue;
                    }
                    if !no_space {
                        v.push(' ');
                    }
                    v.push_str(line);
                }
                if is_open(&v) {
                    let origin = self.origin(first_line, self.lines.current_line_number());
                    st.validation
                        .error(codes::QUALIFIER_QUOTES, Some(origin))
                        .param(&name);
                    Some(unescape(&v[1..]))
                } else {
                    Some(unquote(&v))
                }
            }
            Some(v) => {
                // unquoted values continue without separator
                let mut v = v.to_string();
                while self.next_is_continuation() {
                    let next = self.lines.next_content().trim();
                    if next.is_empty() || next.starts_with('/') {
                        break;
                    }
                    let next = next.to_string();
                    self.lines.read_line(&mut self.session)?;
                    v.push_str(&next);
                }
                Some(v)
            }
            None => None,
        };
        feature.add_qualifier(name, value);
        Ok(())
    }

    fn finish_feature(&mut self, mut feature: Feature, st: &mut EntryState, origin: Origin) -> Result<()> {
        // db_xref
        let mut tax_id = None;
        for q in feature.qualifiers.iter().filter(|q| q.name == qualifiers::DB_XREF) {
            let v = match q.value.as_deref() {
                Some(v) => v,
                None => continue,
            };
            match v.split_once(':') {
                Some(("taxon", id)) => match id.trim().parse::<u64>() {
                    Ok(id) => tax_id = Some(id),
                    Err(_) => {
                        st.validation
                            .error(codes::TAXON_FORMAT, Some(origin.clone()))
                            .param(v);
                    }
                },
                Some((db, id)) => feature.xrefs.push(XRef::new(db.trim(), id.trim(), None)),
                None => {}
            }
        }

        // mol_type
        let mol_type = feature.qualifier_value(qualifiers::MOL_TYPE).map(|m| m.to_string());
        if let Some(m) = mol_type.as_ref() {
            match self.session.molecule_type.as_ref() {
                None => {
                    self.session.molecule_type = Some(m.clone());
                    if st.entry.sequence.molecule_type.is_none() {
                        st.entry.sequence.molecule_type = Some(m.clone());
                    }
                }
                Some(previous) if previous != m => {
                    let previous = previous.clone();
                    st.validation
                        .warning(codes::MOL_TYPE_CONFLICT, Some(origin.clone()))
                        .param(m)
                        .param(previous);
                }
                _ => {}
            }
        }

        if feature.is_source() {
            let organism = feature.qualifier_value(qualifiers::ORGANISM).map(|o| o.to_string());
            let organelle = feature.qualifier_value(qualifiers::ORGANELLE).map(|o| o.to_string());
            let taxon = match organism.as_ref() {
                Some(o) => self.session.lookup_organism(o)?,
                None => None,
            };
            if let Some(attrs) = feature.source.as_mut() {
                attrs.scientific_name = organism;
                attrs.molecule_type = mol_type.clone();
                attrs.tax_id = tax_id;
                attrs.organelle = organelle;
                if let Some(t) = taxon {
                    attrs.common_name = t.common_name;
                    attrs.lineage = t.lineage;
                    if attrs.tax_id.is_none() {
                        attrs.tax_id = t.tax_id;
                    }
                    if attrs.organelle.is_none() {
                        attrs.organelle = t.organelle;
                    }
                }
            }
            if mol_type.is_none() && !self.options.skip_source_features {
                st.validation.warning(codes::MISSING_MOL_TYPE, Some(origin));
            }
        }

        st.entry.features.push(feature);
        Ok(())
    }
}

// A feature key starts in the first content column
#[inline]
fn starts_key(content: &str) -> bool {
    content.chars().next().map(|c| !c.is_whitespace()).unwrap_or(false)
}

#[inline]
fn is_open(value: &str) -> bool {
    value.bytes().filter(|&b| b == b'"').count() % 2 == 1
}

/// Removes the enclosing quotes and unescapes `""`
fn unquote(value: &str) -> String {
    let inner = value.strip_prefix('"').unwrap_or(value);
    let inner = inner.strip_suffix('"').unwrap_or(inner);
    unescape(inner)
}

#[inline]
fn unescape(value: &str) -> String {
    value.replace("\"\"", "\"")
}
