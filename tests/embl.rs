#[macro_use]
extern crate matches;
#[macro_use]
extern crate lazy_static;

#[macro_use]
mod common;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use chrono::NaiveDate;
use embl_io::embl::{Reader, ReaderOptions};
use embl_io::entry::Topology;
use embl_io::line::{LineReader, TagLayout};
use embl_io::location::{Coordinates, RemoteAccession};
use embl_io::session::{ParseSession, Taxon};
use embl_io::validation::{codes, Severity};
use embl_io::Error;

use common::*;

#[test]
fn full_entry() {
    test_reader!(X56734, reader, {
        let parsed = reader.next().unwrap().unwrap();
        assert!(reader.next().is_none());

        assert!(parsed.validation.is_empty(), "{:?}", parsed.validation);
        assert_eq!(parsed.first_line, 1);
        assert_eq!(parsed.last_line, 48);

        let e = &parsed.entry;
        assert_eq!(e.primary_accession.as_deref(), Some("X56734"));
        assert_eq!(e.secondary_accessions, vec!["S46826"]);
        assert_eq!(e.data_class.as_deref(), Some("STD"));
        assert_eq!(e.division.as_deref(), Some("PLN"));
        assert_eq!(e.sequence.version, Some(1));
        assert_eq!(e.sequence.topology, Some(Topology::Linear));
        assert_eq!(e.sequence.molecule_type.as_deref(), Some("mRNA"));
        assert_eq!(e.first_public, NaiveDate::from_ymd_opt(1991, 9, 12));
        assert_eq!(e.first_public_release, Some(29));
        assert_eq!(e.last_updated, NaiveDate::from_ymd_opt(2005, 11, 25));
        assert_eq!(e.last_updated_release, Some(85));
        assert_eq!(e.entry_version, Some(11));
        assert_eq!(
            e.description.as_deref(),
            Some("Trifolium repens mRNA for non-cyanogenic beta-glucosidase")
        );
        assert_eq!(e.keywords, vec!["beta-glucosidase"]);
        assert_eq!(e.comment.as_deref(), Some("first comment line\nsecond comment line"));
        assert_eq!(e.xrefs.len(), 1);
        assert_eq!(e.xrefs[0].database, "MD5");
        assert_eq!(e.xrefs[0].primary, "1e51ca3a5450c43524b9185c236cc5cc");

        // reference
        assert_eq!(e.references.len(), 1);
        let r = &e.references[0];
        assert_eq!(r.number, Some(5));
        assert_eq!(r.location.as_ref().unwrap().elements[0].coords, Coordinates::Range(1, 70));
        assert_eq!(r.xrefs.len(), 2);
        assert_eq!(r.xrefs[1].database, "PUBMED");
        assert_eq!(r.xrefs[1].primary, "1907511");
        assert_eq!(r.authors.len(), 4);
        assert_eq!(
            r.title.as_deref(),
            Some(
                "Nucleotide and derived amino acid sequence of the cyanogenic \
                 beta-glucosidase (linamarase) from white clover (Trifolium repens L.)"
            )
        );
        assert_eq!(r.locator.as_deref(), Some("Plant Mol. Biol. 17(2):209-219(1991)."));

        // source feature
        assert_eq!(e.features.len(), 2);
        let source = e.primary_source().unwrap();
        let attrs = source.source.as_ref().unwrap();
        assert_eq!(attrs.scientific_name.as_deref(), Some("Trifolium repens"));
        assert_eq!(attrs.common_name.as_deref(), Some("white clover"));
        assert_eq!(attrs.tax_id, Some(3899));
        assert_eq!(attrs.molecule_type.as_deref(), Some("mRNA"));
        let lineage = attrs.lineage.as_deref().unwrap();
        assert!(lineage.starts_with("Eukaryota; Viridiplantae;"));
        assert!(lineage.ends_with("Trifolieae; Trifolium"));
        assert_eq!(source.qualifier_value("clone_lib"), Some("lambda gt10"));

        // CDS
        let cds = &e.features[1];
        assert_eq!(cds.name, "CDS");
        assert!(cds.location.simple_location);
        assert_eq!(cds.location.elements[0].coords, Coordinates::Range(1, 70));
        assert!(cds.location.is_five_prime_partial());
        assert!(cds.location.is_three_prime_partial());
        assert_eq!(cds.qualifier_value("codon_start"), Some("1"));
        assert_eq!(
            cds.qualifier_value("product"),
            Some("non-cyanogenic \"beta\"-glucosidase")
        );
        assert_eq!(cds.qualifier_value("translation"), Some(X56734_TRANSLATION.as_str()));
        assert_eq!(cds.xrefs.len(), 1);
        assert_eq!(cds.xrefs[0].database, "UniProtKB/Swiss-Prot");
        assert_eq!(cds.xrefs[0].primary, "P26204");

        // sequence
        assert_eq!(e.sequence.length, 70);
        assert_eq!(e.sequence.residues.len(), 70);
        assert!(e.sequence.residues.starts_with(b"aaacaaacca"));
        assert!(e.sequence.residues.ends_with(b"cgaattaaac"));
    });
}

#[test]
fn empty() {
    test_reader!("", reader, {
        assert!(reader.next().is_none());
    });
    test_reader!("\n\n", reader, {
        assert!(reader.next().is_none());
    });
}

#[test]
fn source_feature_without_terminator() {
    let input = "FT   source          1..4041\nFT                   /organism=\"Homo sapiens\"";
    let parsed = read_one(input);
    let f = &parsed.entry.features[0];
    assert!(f.is_source());
    assert!(f.location.simple_location);
    assert_eq!(f.location.elements[0].coords, Coordinates::Range(1, 4041));
    let attrs = f.source.as_ref().unwrap();
    assert_eq!(attrs.scientific_name.as_deref(), Some("Homo sapiens"));

    assert!(parsed.validation.contains(codes::MISSING_TERMINATOR));
    assert!(parsed.validation.contains(codes::MISSING_MOL_TYPE));
    assert!(parsed.validation.is_valid());
}

#[test]
fn skip_source_features() {
    let input = "FT   source          1..10\nFT                   /organism=\"Homo sapiens\"\n//\n";
    let options = ReaderOptions {
        skip_source_features: true,
        ..Default::default()
    };
    let parsed = Reader::new(input.as_bytes()).set_options(options).next().unwrap().unwrap();
    assert!(parsed.validation.is_empty());
}

#[test]
fn contig_entry() {
    let parsed = read_one(CON_ENTRY);
    assert!(parsed.validation.is_empty(), "{:?}", parsed.validation);
    let e = &parsed.entry;
    assert_eq!(e.data_class.as_deref(), Some("CON"));
    assert!(!e.has_sequence());
    assert_eq!(e.sequence.length, 300);
    let contigs = e.contigs();
    assert_eq!(contigs.len(), 4);
    assert_eq!(contigs[0].remote, Some(RemoteAccession::new("A00001", Some(1))));
    assert_eq!(contigs[0].coords, Coordinates::Range(1, 210));
    assert_eq!(
        contigs[1].coords,
        Coordinates::Gap {
            length: Some(100),
            unknown: true
        }
    );
    assert!(contigs[3].complement);
}

#[test]
fn cache_isolation() {
    let entries = read_all(SHARED_ORGANISM);
    assert_eq!(entries.len(), 2);

    let first = entries[0].entry.primary_source().unwrap().source.as_ref().unwrap();
    assert_eq!(first.common_name.as_deref(), Some("human"));
    assert!(first.lineage.is_some());

    // the second record does not declare the organism on OS/OC lines
    let second = entries[1].entry.primary_source().unwrap().source.as_ref().unwrap();
    assert_eq!(second.scientific_name.as_deref(), Some("Homo sapiens"));
    assert_eq!(second.common_name, None);
    assert_eq!(second.lineage, None);
}

#[test]
fn taxonomy_lookup() {
    let calls = Arc::new(AtomicUsize::new(0));
    let c = calls.clone();
    let lookup = move |name: &str| {
        c.fetch_add(1, Ordering::SeqCst);
        let mut t = Taxon::new(name);
        t.tax_id = Some(9606);
        t.lineage = Some("Eukaryota; Metazoa".to_string());
        Some(t)
    };
    let entries: Vec<_> = Reader::new(SHARED_ORGANISM.as_bytes())
        .set_taxonomy(Arc::new(lookup))
        .into_entries()
        .map(|r| r.unwrap())
        .collect();

    // the first record declares the organism itself
    let first = entries[0].entry.primary_source().unwrap().source.as_ref().unwrap();
    assert_eq!(first.common_name.as_deref(), Some("human"));
    let second = entries[1].entry.primary_source().unwrap().source.as_ref().unwrap();
    assert_eq!(second.tax_id, Some(9606));
    assert_eq!(second.lineage.as_deref(), Some("Eukaryota; Metazoa"));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn taxonomy_failure() {
    let lookup: embl_io::session::SharedTaxonomy = Arc::new(FailingLookup);
    let mut reader = Reader::new(SHARED_ORGANISM.as_bytes()).set_taxonomy(lookup);
    assert!(reader.next().unwrap().is_ok());
    let err = reader.next().unwrap().unwrap_err();
    assert_matches!(err, Error::Lookup { .. });
}

struct FailingLookup;

impl embl_io::session::TaxonomyLookup for FailingLookup {
    fn lookup(&self, _: &str) -> Result<Option<Taxon>, Box<dyn std::error::Error + Send + Sync>> {
        Err("service unavailable".into())
    }
}

#[test]
fn unknown_tag_block() {
    let input = "\
ID   A1; SV 1; linear; genomic DNA; STD; HUM; 0 BP.
ZZ   first
ZZ   second
ZZ   third
DE   description
//
";
    let parsed = read_one(input);
    assert_eq!(parsed.validation.count(codes::UNKNOWN_TAG), 1);
    let msg = &parsed.validation.messages()[0];
    assert_eq!(msg.severity, Severity::Error);
    let origin = msg.origin.as_ref().unwrap();
    assert_eq!((origin.first_line, origin.last_line), (2, 4));
    assert_eq!(parsed.entry.description.as_deref(), Some("description"));
}

#[test]
fn repeated_block() {
    let input = "ID   A1;\nDE   first\nXX\nDE   second\n//\n";
    let parsed = read_one(input);
    assert!(parsed.validation.contains(codes::REPEATED_BLOCK));
    assert_eq!(parsed.entry.description.as_deref(), Some("first"));
}

#[test]
fn inner_partiality() {
    let input = "FT   CDS             join(1..>10,<20..30)\n//\n";
    let parsed = read_one(input);
    assert!(parsed.validation.contains(codes::INNER_PARTIALITY));
    let f = &parsed.entry.features[0];
    assert_eq!(f.name, "CDS");
    assert!(f.location.is_empty());

    let options = ReaderOptions {
        lenient_locations: true,
        ..Default::default()
    };
    let parsed = Reader::new(input.as_bytes()).set_options(options).next().unwrap().unwrap();
    assert!(parsed.validation.is_empty());
    assert_eq!(parsed.entry.features[0].location.len(), 2);
}

#[test]
fn invalid_location() {
    let input = "FT   CDS             join(1..10,,20..30)\nFT                   /gene=\"x\"\nFT   gene            1..30\n//\n";
    let parsed = read_one(input);
    assert_eq!(parsed.validation.count(codes::LOCATION_FORMAT), 1);
    // the record continues after the bad location
    assert_eq!(parsed.entry.features.len(), 2);
    assert_eq!(parsed.entry.features[0].qualifier_value("gene"), Some("x"));
}

#[test]
fn malformed_taxon() {
    let input = X56734.replace("taxon:3899", "taxon:abc");
    let parsed = read_one(&input);
    assert_eq!(parsed.validation.count(codes::TAXON_FORMAT), 1);
    let msg = &parsed.validation.messages()[0];
    assert_eq!(msg.severity, Severity::Error);
    assert_eq!(msg.params, vec!["taxon:abc"]);
    let attrs = parsed.entry.primary_source().unwrap().source.as_ref().unwrap();
    assert_eq!(attrs.tax_id, None);
    // the qualifier itself is kept
    assert_eq!(parsed.entry.features[0].qualifier_value("db_xref"), Some("taxon:abc"));
}

#[test]
fn mol_type_conflict() {
    let input = "\
ID   A1; SV 1; linear; mRNA; STD; PLN; 0 BP.
FT   source          1..10
FT                   /organism=\"Trifolium repens\"
FT                   /mol_type=\"genomic DNA\"
//
";
    let parsed = read_one(input);
    assert_eq!(parsed.validation.count(codes::MOL_TYPE_CONFLICT), 1);
    let msg = &parsed.validation.messages()[0];
    assert_eq!(msg.severity, Severity::Warning);
    assert_eq!(msg.params, vec!["genomic DNA", "mRNA"]);
    assert_eq!(parsed.entry.sequence.molecule_type.as_deref(), Some("mRNA"));
}

#[test]
fn sequence_problems() {
    let input = "\
ID   A1; SV 1; linear; genomic DNA; STD; HUM; 20 BP.
SQ   Sequence 20 BP;
     acgt-acgt*                                                         8
//
";
    let parsed = read_one(input);
    assert_eq!(parsed.validation.count(codes::SEQUENCE_CHAR), 1);
    assert_eq!(parsed.validation.count(codes::SEQUENCE_LENGTH), 1);
    assert_eq!(parsed.entry.sequence.residues, b"acgtacgt".to_vec());
    assert_eq!(parsed.entry.sequence.length, 8);
}

#[test]
fn reference_without_number() {
    let input = "ID   A1;\nRA   Doe J.;\nRL   Unpublished.\n//\n";
    let parsed = read_one(input);
    assert_eq!(parsed.validation.count(codes::REFERENCE_MISSING_RN), 2);
    assert!(parsed.entry.references.is_empty());
}

#[test]
fn untagged_line() {
    let input = "ID   A1;\n     stray content\n//\n";
    let parsed = read_one(input);
    assert!(parsed.validation.contains(codes::LINE_FORMAT));
}

#[test]
fn qualifier_quotes() {
    let input = "\
FT   gene            1..10
FT                   /note=\"first line

FT                   /still the note\"
FT                   /gene=\"abc
//
";
    let parsed = read_one(input);
    let f = &parsed.entry.features[0];
    assert_eq!(f.qualifier_value("note"), Some("first line /still the note"));
    assert_eq!(f.qualifier_value("gene"), Some("abc"));
    assert_eq!(parsed.validation.count(codes::QUALIFIER_QUOTES), 1);
}

#[test]
fn extra_terminators() {
    let input = "ID   A1;\nEN\nID   A2;\n//\n";
    let options = ReaderOptions {
        extra_terminators: vec!["EN".to_string()],
        ..Default::default()
    };
    let accessions: Vec<_> = Reader::new(input.as_bytes())
        .set_options(options)
        .into_entries()
        .map(|r| r.unwrap().entry.primary_accession.unwrap())
        .collect();
    assert_eq!(accessions, vec!["A1", "A2"]);
}

#[test]
fn origins() {
    let input = "ID   A1;\nXX\nZZ   unknown\n//\n";
    let options = ReaderOptions {
        file_id: Some("in.embl".to_string()),
        line_offset: 100,
        ..Default::default()
    };
    let parsed = Reader::new(input.as_bytes()).set_options(options).next().unwrap().unwrap();
    let msg = parsed
        .validation
        .messages()
        .iter()
        .find(|m| m.code == codes::UNKNOWN_TAG)
        .unwrap();
    let origin = msg.origin.as_ref().unwrap();
    assert_eq!(origin.file_id.as_deref(), Some("in.embl"));
    assert_eq!(origin.first_line, 103);
}

#[test]
fn multiple_records() {
    test_reader!(MULTI.as_str(), reader, {
        let mut n = 0;
        for result in reader.entries() {
            let parsed = result.unwrap();
            n += 1;
            assert_eq!(parsed.entry.primary_accession, Some(format!("E{}", n)));
            assert_eq!(parsed.entry.sequence.residues, b"acgtacgtac".to_vec());
            assert!(parsed.validation.is_empty(), "{:?}", parsed.validation);
        }
        assert_eq!(n, 25);
    });
}

#[test]
fn genbank_layout() {
    let input = "LOCUS       AB000001\nDEFINITION  Some\n            description.\n//\n";
    let mut session = ParseSession::new();
    let mut lines = LineReader::new(input.as_bytes(), TagLayout::GENBANK);
    assert!(lines.read_line(&mut session).unwrap());
    assert_eq!(lines.current_tag(), Some("LOCUS"));
    assert_eq!(lines.current_content(), "AB000001");
    assert!(lines.read_line(&mut session).unwrap());
    let block = embl_io::block::read_multi_line(&mut lines, &mut session, embl_io::block::Concatenate::Space).unwrap();
    assert_eq!(block.tag, "DEFINITION");
    assert_eq!(block.text, "Some description.");
}
