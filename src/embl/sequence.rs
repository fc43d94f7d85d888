//! Sequence (SQ + untagged lines) and contig (CO) blocks.

use std::io;

use super::reader::{EntryState, Reader};
use crate::block::{self, Concatenate};
use crate::error::Result;
use crate::policy::BufPolicy;
use crate::validation::codes;

const INVALID: u8 = 0;
const SKIP: u8 = 1;

// Residue translation: letters are lowercased, digits (the running count)
// and spaces are skipped, everything else is invalid.
static RESIDUES: [u8; 256] = residue_table();

const fn residue_table() -> [u8; 256] {
    let mut table = [INVALID; 256];
    let mut i = 0;
    while i < 256 {
        let b = i as u8;
        table[i] = if b.is_ascii_lowercase() {
            b
        } else if b.is_ascii_uppercase() {
            b + (b'a' - b'A')
        } else if b.is_ascii_digit() || b == b' ' {
            SKIP
        } else {
            INVALID
        };
        i += 1;
    }
    table
}

/// Translates a residue character. Returns `None` for characters that are
/// not residues (including digits and spaces, which are ignored by the
/// decoder).
#[inline]
pub fn residue(b: u8) -> Option<u8> {
    match RESIDUES[b as usize] {
        INVALID | SKIP => None,
        r => Some(r),
    }
}

/// Appends the residues of a sequence line (without the tag columns) to
/// `out` and returns the invalid characters that were dropped.
pub fn decode_sequence_line(line: &[u8], out: &mut Vec<u8>) -> Vec<u8> {
    let mut invalid = vec![];
    for &b in line {
        match RESIDUES[b as usize] {
            SKIP => {}
            INVALID => invalid.push(b),
            r => out.push(r),
        }
    }
    invalid
}

impl<R, P> Reader<R, P>
where
    R: io::Read,
    P: BufPolicy,
{
    /// The `SQ` header line is followed by untagged sequence lines.
    pub(super) fn read_sequence(&mut self, st: &mut EntryState) -> Result<()> {
        let declared = st.entry.sequence.length;
        let first_line = self.lines.current_line_number();
        let mut residues = Vec::with_capacity(declared.min(1 << 28) as usize);

        while self.lines.join_line() {
            self.lines.read_line(&mut self.session)?;
            let invalid = decode_sequence_line(self.lines.current_content().as_bytes(), &mut residues);
            if !invalid.is_empty() {
                let chars = String::from_utf8_lossy(&invalid).into_owned();
                let origin = self.line_origin();
                st.validation.error(codes::SEQUENCE_CHAR, Some(origin)).param(chars);
            }
        }

        let length = residues.len() as u64;
        if declared != 0 && declared != length {
            let origin = self.origin(first_line, self.lines.current_line_number());
            st.validation
                .warning(codes::SEQUENCE_LENGTH, Some(origin))
                .param(declared)
                .param(length);
        }
        st.entry.sequence.residues = residues;
        st.entry.sequence.length = length;
        Ok(())
    }

    pub(super) fn read_contig(&mut self, st: &mut EntryState) -> Result<()> {
        let block = block::read_multi_line(&mut self.lines, &mut self.session, Concatenate::NoSpace)?;
        match self.locations.parse(&block.text) {
            Ok(contig) => st.entry.sequence.contig = Some(contig),
            Err(e) => {
                let origin = self.block_origin(&block);
                st.validation
                    .error(codes::CONTIG_FORMAT, Some(origin))
                    .param(&block.text)
                    .param(e);
            }
        }
        Ok(())
    }
}
