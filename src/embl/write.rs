//! Field writers.
//!
//! Each `write_*` function renders one block and returns the number of
//! lines written (0 if there was nothing to write). [`write_entry()`]
//! combines them and places `XX` separators after every block that produced
//! output.

use std::io;

use crate::entry::{qualifiers, Assembly, Entry, Feature, Qualifier, Reference, XRef};
use crate::location::{render, CompoundLocation, Coordinates};
use crate::wrap::{WrapChar, WrapType, WrapWriter, MAX_LINE_LENGTH};

use super::header::ABSENT;
use super::TERMINATOR;

/// Prefix of feature qualifier and location continuation lines
pub const QUALIFIER_PREFIX: &str = "FT                   ";

const SEPARATOR: &str = "XX";
const RESIDUES_PER_LINE: usize = 60;
const RESIDUES_PER_GROUP: usize = 10;

/// Qualifiers whose values are written without quotes
pub const UNQUOTED_QUALIFIERS: &[&str] = &[
    "codon_start",
    "transl_table",
    "citation",
    "number",
    "transl_except",
    "anticodon",
    "rpt_type",
    "estimated_length",
    "direction",
    "mod_base",
    "compare",
    "rpt_unit_range",
    "tag_peptide",
];

/// Writer configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WriterOptions {
    /// Maximum line length including the tag
    pub max_line_length: usize,
    pub wrap_type: WrapType,
    /// Write features in sorted order (see
    /// [`sort_features`](crate::entry::sort_features))
    pub sort_features: bool,
}

impl Default for WriterOptions {
    fn default() -> Self {
        WriterOptions {
            max_line_length: MAX_LINE_LENGTH,
            wrap_type: WrapType::FormatWrap,
            sort_features: false,
        }
    }
}

impl WriterOptions {
    /// A wrap writer with these options and the given wrap character
    #[inline]
    pub fn wrapper(&self, wrap_char: WrapChar) -> WrapWriter {
        WrapWriter::new()
            .wrap_char(wrap_char)
            .wrap_type(self.wrap_type)
            .max_line_length(self.max_line_length)
    }
}

/// Writes an entry with default options.
///
/// ```
/// use embl_io::embl::write_entry;
/// use embl_io::entry::Entry;
///
/// let mut entry = Entry::new();
/// entry.primary_accession = Some("X56734".to_string());
/// entry.description = Some("Trifolium repens mRNA".to_string());
///
/// let mut out = vec![];
/// write_entry(&mut out, &entry).unwrap();
/// assert_eq!(
///     &out[..],
///     &b"ID   X56734; SV XXX; XXX; XXX; XXX; XXX; 0 BP.
/// XX
/// AC   X56734;
/// XX
/// DE   Trifolium repens mRNA
/// XX
/// KW   .
/// XX
/// //
/// "[..]
/// );
/// ```
#[inline]
pub fn write_entry<W: io::Write>(writer: W, entry: &Entry) -> io::Result<()> {
    write_entry_with(writer, entry, &WriterOptions::default())
}

/// Writes an entry with the given options
pub fn write_entry_with<W: io::Write>(mut writer: W, entry: &Entry, options: &WriterOptions) -> io::Result<()> {
    let w = &mut writer;

    write_id(w, entry)?;
    separate(w, 1)?;
    let n = write_accessions(w, entry, options)?;
    separate(w, n)?;
    let n = write_projects(w, entry, options)?;
    separate(w, n)?;
    let n = write_dates(w, entry)?;
    separate(w, n)?;
    let n = write_description(w, entry, options)?;
    separate(w, n)?;
    let n = write_keywords(w, entry, options)?;
    separate(w, n)?;
    let n = write_organism(w, entry, options)?;
    separate(w, n)?;
    for (i, r) in entry.references.iter().enumerate() {
        let n = write_reference(w, r, i + 1, options)?;
        separate(w, n)?;
    }
    let n = write_xrefs(w, &entry.xrefs)?;
    separate(w, n)?;
    let n = write_comment(w, entry.comment.as_deref(), options)?;
    separate(w, n)?;
    let n = write_assembly(w, &entry.assembly)?;
    separate(w, n)?;

    if options.sort_features {
        let mut features = entry.features.clone();
        crate::entry::sort_features(&mut features);
        let n = write_feature_table(w, &features, options)?;
        separate(w, n)?;
    } else {
        let n = write_feature_table(w, &entry.features, options)?;
        separate(w, n)?;
    }

    if let Some(contig) = entry.sequence.contig.as_ref() {
        write_contig(w, contig, options)?;
    }
    if entry.has_sequence() {
        write_sequence(w, entry)?;
    }
    writeln!(w, "{}", TERMINATOR)
}

#[inline]
fn separate<W: io::Write>(writer: &mut W, lines: usize) -> io::Result<()> {
    if lines > 0 {
        writeln!(writer, "{}", SEPARATOR)?;
    }
    Ok(())
}

#[inline]
fn or_absent(value: Option<&str>) -> &str {
    value.unwrap_or(ABSENT)
}

/// `ID   X56734; SV 1; linear; mRNA; STD; PLN; 1859 BP.` Absent fields are
/// written as `XXX`.
pub fn write_id<W: io::Write>(writer: &mut W, entry: &Entry) -> io::Result<usize> {
    let seq = &entry.sequence;
    let version = seq.version.map(|v| v.to_string());
    let length = if entry.has_sequence() {
        seq.residues.len() as u64
    } else {
        seq.length
    };
    writeln!(
        writer,
        "ID   {}; SV {}; {}; {}; {}; {}; {} BP.",
        or_absent(entry.primary_accession.as_deref()),
        or_absent(version.as_deref()),
        or_absent(seq.topology.as_ref().map(|t| t.as_str())),
        or_absent(seq.molecule_type.as_deref()),
        or_absent(entry.data_class.as_deref()),
        or_absent(entry.division.as_deref()),
        length
    )?;
    Ok(1)
}

/// `AC   X56734; S46826;`
pub fn write_accessions<W: io::Write>(writer: &mut W, entry: &Entry, options: &WriterOptions) -> io::Result<usize> {
    let accessions: Vec<&str> = entry
        .primary_accession
        .iter()
        .chain(entry.secondary_accessions.iter())
        .map(|a| a.as_str())
        .collect();
    if accessions.is_empty() {
        return Ok(0);
    }
    options
        .wrapper(WrapChar::Semicolon)
        .write_block(writer, "AC   ", &terminated_list(&accessions))
}

/// `PR   Project:PRJNA1;`
pub fn write_projects<W: io::Write>(writer: &mut W, entry: &Entry, options: &WriterOptions) -> io::Result<usize> {
    if entry.project_accessions.is_empty() {
        return Ok(0);
    }
    let projects: Vec<String> = entry
        .project_accessions
        .iter()
        .map(|p| format!("Project:{}", p))
        .collect();
    let projects: Vec<&str> = projects.iter().map(|p| p.as_str()).collect();
    options
        .wrapper(WrapChar::Semicolon)
        .write_block(writer, "PR   ", &terminated_list(&projects))
}

/// `DT   12-SEP-1991 (Rel. 29, Created)` and
/// `DT   14-NOV-2006 (Rel. 89, Last updated, Version 3)`
pub fn write_dates<W: io::Write>(writer: &mut W, entry: &Entry) -> io::Result<usize> {
    let mut n = 0;
    if let Some(d) = entry.first_public {
        writeln!(
            writer,
            "DT   {} (Rel. {}, Created)",
            d.format("%d-%b-%Y").to_string().to_uppercase(),
            entry.first_public_release.unwrap_or(0)
        )?;
        n += 1;
    }
    if let Some(d) = entry.last_updated {
        writeln!(
            writer,
            "DT   {} (Rel. {}, Last updated, Version {})",
            d.format("%d-%b-%Y").to_string().to_uppercase(),
            entry.last_updated_release.unwrap_or(0),
            entry.entry_version.unwrap_or(0)
        )?;
        n += 1;
    }
    Ok(n)
}

pub fn write_description<W: io::Write>(writer: &mut W, entry: &Entry, options: &WriterOptions) -> io::Result<usize> {
    match entry.description.as_deref() {
        Some(d) => options.wrapper(WrapChar::Space).write_block(writer, "DE   ", d),
        None => Ok(0),
    }
}

/// `KW   beta-glucosidase; cyanogenesis.` An empty keyword list is written
/// as `KW   .`
pub fn write_keywords<W: io::Write>(writer: &mut W, entry: &Entry, options: &WriterOptions) -> io::Result<usize> {
    let text = format!("{}.", entry.keywords.join("; "));
    options.wrapper(WrapChar::Semicolon).write_block(writer, "KW   ", &text)
}

/// OS, OC and OG lines from the first source feature
pub fn write_organism<W: io::Write>(writer: &mut W, entry: &Entry, options: &WriterOptions) -> io::Result<usize> {
    let attrs = match entry.primary_source().and_then(|f| f.source.as_ref()) {
        Some(a) => a,
        None => return Ok(0),
    };
    let name = match attrs.scientific_name.as_deref() {
        Some(n) => n,
        None => return Ok(0),
    };
    let species = match attrs.common_name.as_deref() {
        Some(c) => format!("{} ({})", name, c),
        None => name.to_string(),
    };
    let mut n = options.wrapper(WrapChar::Space).write_block(writer, "OS   ", &species)?;
    if let Some(lineage) = attrs.lineage.as_deref() {
        let lineage = format!("{}.", lineage.trim_end_matches('.'));
        n += options.wrapper(WrapChar::Semicolon).write_block(writer, "OC   ", &lineage)?;
    }
    if let Some(organelle) = attrs.organelle.as_deref() {
        n += options.wrapper(WrapChar::Space).write_block(writer, "OG   ", organelle)?;
    }
    Ok(n)
}

/// Writes one citation. `index` is used as number if the reference has
/// none.
pub fn write_reference<W: io::Write>(
    writer: &mut W,
    reference: &Reference,
    index: usize,
    options: &WriterOptions,
) -> io::Result<usize> {
    let space = options.wrapper(WrapChar::Space);
    writeln!(writer, "RN   [{}]", reference.number.map(|n| n as usize).unwrap_or(index))?;
    let mut n = 1;
    if let Some(c) = reference.comment.as_deref() {
        n += space.write_block(writer, "RC   ", c)?;
    }
    if let Some(loc) = reference.location.as_ref() {
        n += space.write_block(writer, "RP   ", &positions(loc))?;
    }
    for x in &reference.xrefs {
        writeln!(writer, "RX   {}", xref_text(x))?;
        n += 1;
    }
    if let Some(g) = reference.group.as_deref() {
        n += space.write_block(writer, "RG   ", g)?;
    }
    n += space.write_block(writer, "RA   ", &format!("{};", reference.authors.join(", ")))?;
    match reference.title.as_deref() {
        Some("") => {
            writeln!(writer, "RT   ;")?;
            n += 1;
        }
        Some(t) => n += space.write_block(writer, "RT   ", &format!("\"{}\";", t))?,
        None => {}
    }
    if let Some(l) = reference.locator.as_deref() {
        n += space.write_block(writer, "RL   ", l)?;
    }
    Ok(n)
}

// `1-1859, 1900-2000`
fn positions(location: &CompoundLocation) -> String {
    location
        .elements
        .iter()
        .filter_map(|l| match l.coords {
            Coordinates::Range(b, e) => Some(format!("{}-{}", b, e)),
            Coordinates::Base(b) => Some(format!("{}-{}", b, b)),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join(", ")
}

fn xref_text(x: &XRef) -> String {
    match x.secondary.as_deref() {
        Some(s) => format!("{}; {}; {}.", x.database, x.primary, s),
        None => format!("{}; {}.", x.database, x.primary),
    }
}

/// `DR   MD5; 1e51ca3a5450c43524b9185c236cc5cc.`
pub fn write_xrefs<W: io::Write>(writer: &mut W, xrefs: &[XRef]) -> io::Result<usize> {
    for x in xrefs {
        writeln!(writer, "DR   {}", xref_text(x))?;
    }
    Ok(xrefs.len())
}

/// Comment lines are written as they are, lines exceeding the maximum
/// length are broken at the line width.
pub fn write_comment<W: io::Write>(writer: &mut W, comment: Option<&str>, options: &WriterOptions) -> io::Result<usize> {
    let comment = match comment {
        Some(c) => c,
        None => return Ok(0),
    };
    let wrapper = options.wrapper(WrapChar::SingleSpace).force_line_break(true);
    let mut n = 0;
    for line in comment.split('\n') {
        n += wrapper.write_block(writer, "CC   ", line)?;
    }
    Ok(n)
}

/// AH header and AS lines
pub fn write_assembly<W: io::Write>(writer: &mut W, assembly: &[Assembly]) -> io::Result<usize> {
    if assembly.is_empty() {
        return Ok(0);
    }
    writeln!(writer, "AH   LOCAL_SPAN     PRIMARY_IDENTIFIER     PRIMARY_SPAN     COMP")?;
    for a in assembly {
        let primary_span = match a.primary_span {
            Some((b, e)) => format!("{}-{}", b, e),
            None => "not_available".to_string(),
        };
        let line = format!(
            "AS   {:<15}{:<23}{:<17}{}",
            format!("{}-{}", a.span.0, a.span.1),
            a.primary_identifier,
            primary_span,
            if a.complement { "c" } else { "" }
        );
        writeln!(writer, "{}", line.trim_end())?;
    }
    Ok(assembly.len() + 1)
}

/// FH header lines followed by all features
pub fn write_feature_table<W: io::Write>(
    writer: &mut W,
    features: &[Feature],
    options: &WriterOptions,
) -> io::Result<usize> {
    if features.is_empty() {
        return Ok(0);
    }
    writeln!(writer, "FH   Key             Location/Qualifiers")?;
    writeln!(writer, "FH")?;
    let mut n = 2;
    for f in features {
        n += write_feature(writer, f, options)?;
    }
    Ok(n)
}

/// Writes the key and location line(s) and all qualifiers of a feature.
///
/// ```
/// use embl_io::embl::{write_feature, WriterOptions};
/// use embl_io::entry::Feature;
/// use embl_io::location::parse;
///
/// let mut f = Feature::new("CDS", parse("join(<1..210,493..660)").unwrap());
/// f.add_qualifier("codon_start", Some("1".to_string()));
/// f.add_qualifier("product", Some("\"beta\"-glucosidase".to_string()));
/// f.add_qualifier("pseudo", None);
///
/// let mut out = vec![];
/// write_feature(&mut out, &f, &WriterOptions::default()).unwrap();
/// assert_eq!(
///     String::from_utf8(out).unwrap(),
///     "FT   CDS             join(<1..210,493..660)
/// FT                   /codon_start=1
/// FT                   /product=\"\"\"beta\"\"-glucosidase\"
/// FT                   /pseudo
/// "
/// );
/// ```
pub fn write_feature<W: io::Write>(writer: &mut W, feature: &Feature, options: &WriterOptions) -> io::Result<usize> {
    let key_prefix = if feature.name.chars().count() < 16 {
        format!("FT   {:<16}", feature.name)
    } else {
        format!("FT   {} ", feature.name)
    };
    let mut n = options.wrapper(WrapChar::Comma).write_block_with(
        writer,
        &key_prefix,
        QUALIFIER_PREFIX,
        &render(&feature.location),
    )?;
    for q in &feature.qualifiers {
        n += write_qualifier(writer, q, options)?;
    }
    Ok(n)
}

/// `/name="value"`, `/name=value` or `/name`. Quotes within the value are
/// doubled, `/translation` is broken at the line width. Values are only
/// wrapped at single spaces, so repeated spaces survive reading them back.
pub fn write_qualifier<W: io::Write>(writer: &mut W, qualifier: &Qualifier, options: &WriterOptions) -> io::Result<usize> {
    let name = qualifier.name.as_str();
    let text = match qualifier.value.as_deref() {
        None => format!("/{}", name),
        Some(v) if UNQUOTED_QUALIFIERS.contains(&name) => format!("/{}={}", name, v),
        Some(v) => format!("/{}=\"{}\"", name, v.replace('"', "\"\"")),
    };
    options
        .wrapper(WrapChar::SingleSpace)
        .force_line_break(name == qualifiers::TRANSLATION)
        .write_block(writer, QUALIFIER_PREFIX, &text)
}

/// `CO   join(...)`
pub fn write_contig<W: io::Write>(writer: &mut W, contig: &CompoundLocation, options: &WriterOptions) -> io::Result<usize> {
    options
        .wrapper(WrapChar::Comma)
        .write_block(writer, "CO   ", &render(contig))
}

/// The SQ header line with base counts followed by the sequence in lines
/// of 60 residues (groups of 10) and the running count right aligned at
/// column 80.
pub fn write_sequence<W: io::Write>(writer: &mut W, entry: &Entry) -> io::Result<usize> {
    let seq = &entry.sequence.residues;
    let [a, c, g, t, other] = entry.sequence.base_counts();
    writeln!(
        writer,
        "SQ   Sequence {} BP; {} A; {} C; {} G; {} T; {} other;",
        seq.len(),
        a,
        c,
        g,
        t,
        other
    )?;

    let mut n = 1;
    let mut written = 0;
    let mut line = String::with_capacity(MAX_LINE_LENGTH);
    for chunk in seq.chunks(RESIDUES_PER_LINE) {
        line.clear();
        line.push_str("    ");
        for group in chunk.chunks(RESIDUES_PER_GROUP) {
            line.push(' ');
            line.push_str(&String::from_utf8_lossy(group));
        }
        written += chunk.len();
        writeln!(writer, "{:<70}{:>10}", line, written)?;
        n += 1;
    }
    Ok(n)
}

/// Concatenates `a; b; c;`
fn terminated_list(items: &[&str]) -> String {
    let mut s = String::new();
    for item in items {
        if !s.is_empty() {
            s.push(' ');
        }
        s.push_str(item);
        s.push(';');
    }
    s
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::Topology;

    fn to_string<F>(f: F) -> String
    where
        F: FnOnce(&mut Vec<u8>) -> io::Result<usize>,
    {
        let mut out = vec![];
        f(&mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn id_line() {
        let mut e = Entry::new();
        e.primary_accession = Some("X56734".to_string());
        e.sequence.version = Some(1);
        e.sequence.topology = Some(Topology::Linear);
        e.sequence.molecule_type = Some("mRNA".to_string());
        e.data_class = Some("STD".to_string());
        e.division = Some("PLN".to_string());
        e.sequence.length = 1859;
        assert_eq!(
            to_string(|w| write_id(w, &e)),
            "ID   X56734; SV 1; linear; mRNA; STD; PLN; 1859 BP.\n"
        );
    }

    #[test]
    fn sequence_lines() {
        let mut e = Entry::new();
        e.sequence.residues = b"acgt".repeat(17);
        let s = to_string(|w| write_sequence(w, &e));
        let lines: Vec<&str> = s.lines().collect();
        assert_eq!(lines[0], "SQ   Sequence 68 BP; 17 A; 17 C; 17 G; 17 T; 0 other;");
        assert_eq!(
            lines[1],
            "     acgtacgtac gtacgtacgt acgtacgtac gtacgtacgt acgtacgtac gtacgtacgt        60"
        );
        assert_eq!(lines[2], "     acgtacgt                                                                 68");
        assert!(lines.iter().skip(1).all(|l| l.len() == 80));
    }

    #[test]
    fn reference() {
        let r = Reference {
            number: Some(5),
            location: Some(CompoundLocation::simple(crate::location::Location::range(1, 1859))),
            xrefs: vec![XRef::new("PUBMED", "1907511", None)],
            authors: vec!["Oxtoby E.".to_string(), "Dunn M.A.".to_string()],
            title: Some(String::new()),
            locator: Some("Plant Mol. Biol. 17(2):209-219(1991).".to_string()),
            ..Default::default()
        };
        assert_eq!(
            to_string(|w| write_reference(w, &r, 1, &WriterOptions::default())),
            "RN   [5]\nRP   1-1859\nRX   PUBMED; 1907511.\nRA   Oxtoby E., Dunn M.A.;\nRT   ;\nRL   Plant Mol. Biol. 17(2):209-219(1991).\n"
        );
    }

    #[test]
    fn assembly_lines() {
        let a = vec![Assembly {
            span: (1, 426),
            primary_identifier: "AC004528.1".to_string(),
            primary_span: Some((18665, 19090)),
            complement: true,
        }];
        let s = to_string(|w| write_assembly(w, &a));
        assert_eq!(
            s.lines().nth(1),
            Some("AS   1-426          AC004528.1             18665-19090      c")
        );
    }

    #[test]
    fn translation_is_force_broken() {
        let q = Qualifier::new("translation", Some("M".repeat(100)));
        let s = to_string(|w| write_qualifier(w, &q, &WriterOptions::default()));
        let lines: Vec<&str> = s.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines.iter().all(|l| l.len() <= 80 && l.starts_with(QUALIFIER_PREFIX)));
        assert_eq!(lines[0].len(), 80);
    }

    #[test]
    fn keywords() {
        let mut e = Entry::new();
        assert_eq!(to_string(|w| write_keywords(w, &e, &WriterOptions::default())), "KW   .\n");
        e.keywords = vec!["a".to_string(), "b".to_string()];
        assert_eq!(to_string(|w| write_keywords(w, &e, &WriterOptions::default())), "KW   a; b.\n");
    }
}
