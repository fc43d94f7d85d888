#[macro_use]
extern crate lazy_static;

#[macro_use]
mod common;

use embl_io::embl::{write_entry, write_entry_with, WriterOptions};
use embl_io::entry::{Entry, Feature};
use embl_io::location::{parse, CompoundKind, CompoundLocation, Location};
use embl_io::wrap::{WrapType, MAX_LINE_LENGTH};

use common::*;

fn to_string(entry: &Entry, options: &WriterOptions) -> String {
    let mut out = vec![];
    write_entry_with(&mut out, entry, options).unwrap();
    String::from_utf8(out).unwrap()
}

#[test]
fn reproduces_input() {
    let parsed = read_one(X56734);
    let mut out = vec![];
    write_entry(&mut out, &parsed.entry).unwrap();
    assert_eq!(std::str::from_utf8(&out).unwrap(), X56734);
}

#[test]
fn round_trip() {
    for input in &[X56734, CON_ENTRY] {
        let first = read_one(input);
        let text = to_string(&first.entry, &WriterOptions::default());
        let second = read_one(&text);
        assert!(second.validation.is_empty(), "{:?}", second.validation);
        assert_eq!(second.entry, first.entry);
    }
}

#[test]
fn contig_on_one_line() {
    let parsed = read_one(CON_ENTRY);
    let text = to_string(&parsed.entry, &WriterOptions::default());
    assert!(text.contains(
        "\nCO   join(A00001.1:1..210,gap(unk100),gap(10),complement(A00002.1:1..80))\n//\n"
    ));
    assert!(!text.contains("\nSQ   "));
    assert!(text.starts_with("ID   AL954800; SV 2; linear; genomic DNA; CON; HUM; 300 BP.\n"));
}

#[test]
fn separators() {
    // an entry with nothing but an accession
    let mut entry = Entry::new();
    entry.primary_accession = Some("A1".to_string());
    let text = to_string(&entry, &WriterOptions::default());
    assert_eq!(
        text,
        "ID   A1; SV XXX; XXX; XXX; XXX; XXX; 0 BP.\nXX\nAC   A1;\nXX\nKW   .\nXX\n//\n"
    );

    // never two separators in a row
    let text = to_string(&read_one(X56734).entry, &WriterOptions::default());
    let lines: Vec<&str> = text.lines().collect();
    assert!(lines.windows(2).all(|w| w != ["XX", "XX"]));
    assert_eq!(lines.last(), Some(&"//"));
}

#[test]
fn line_length() {
    let mut parsed = read_one(X56734);
    let cds = &mut parsed.entry.features[1];
    cds.add_qualifier("note", Some("word ".repeat(60).trim_end().to_string()));
    parsed.entry.description = Some("description ".repeat(20).trim_end().to_string());

    let text = to_string(&parsed.entry, &WriterOptions::default());
    for line in text.lines() {
        assert!(line.len() <= MAX_LINE_LENGTH, "{:?}", line);
    }

    let options = WriterOptions {
        wrap_type: WrapType::None,
        ..WriterOptions::default()
    };
    let text = to_string(&parsed.entry, &options);
    assert_eq!(text.lines().filter(|l| l.starts_with("DE   ")).count(), 1);
    assert!(text.lines().any(|l| l.len() > MAX_LINE_LENGTH));

    // wrapping does not change the content
    let reread = read_one(&text);
    assert_eq!(reread.entry.description, parsed.entry.description);
    assert_eq!(
        reread.entry.features[1].qualifier_value("note"),
        parsed.entry.features[1].qualifier_value("note")
    );
}

#[test]
fn comment_layout() {
    let input = X56734.replace("CC   second comment line\n", "CC     indented   text\n");
    let parsed = read_one(&input);
    assert_eq!(parsed.entry.comment.as_deref(), Some("first comment line\n  indented   text"));

    let text = to_string(&parsed.entry, &WriterOptions::default());
    assert!(text.contains("\nCC   first comment line\nCC     indented   text\n"));
    assert_eq!(read_one(&text).entry, parsed.entry);

    // only lines that are too long are broken
    let mut entry = parsed.entry;
    entry.comment = Some("x".repeat(100));
    let text = to_string(&entry, &WriterOptions::default());
    let cc: Vec<_> = text.lines().filter(|l| l.starts_with("CC")).collect();
    assert_eq!(cc, vec![format!("CC   {}", "x".repeat(75)), format!("CC   {}", "x".repeat(25))]);
}

#[test]
fn qualifier_spaces() {
    let mut parsed = read_one(X56734);
    parsed.entry.features[1].add_qualifier("note", Some("a  b".to_string()));
    let long = (0..30).map(|i| format!("w{}  x{}", i, i)).collect::<Vec<_>>().join(" ");
    parsed.entry.features[1].add_qualifier("function", Some(long));

    let text = to_string(&parsed.entry, &WriterOptions::default());
    assert!(text.contains("\nFT                   /note=\"a  b\"\n"));
    assert!(text.lines().filter(|l| l.starts_with("FT")).count() > 3);
    for line in text.lines() {
        assert!(line.len() <= MAX_LINE_LENGTH, "{:?}", line);
    }

    let reread = read_one(&text);
    assert!(reread.validation.is_empty(), "{:?}", reread.validation);
    assert_eq!(reread.entry, parsed.entry);
}

#[test]
fn reference_positions() {
    let mut parsed = read_one(X56734);
    let mut location = CompoundLocation::new(CompoundKind::Join);
    for i in 0..12 {
        location.push(Location::range(i * 1000 + 1, i * 1000 + 500));
    }
    parsed.entry.references[0].location = Some(location);

    let text = to_string(&parsed.entry, &WriterOptions::default());
    let rp: Vec<_> = text.lines().filter(|l| l.starts_with("RP")).collect();
    assert!(rp.len() > 1);
    assert!(rp[0].starts_with("RP   1-500, 1001-1500, "));
    for line in &rp {
        assert!(!line.starts_with("RP    "), "{:?}", line);
        assert!(line.len() <= MAX_LINE_LENGTH);
    }
    assert_eq!(read_one(&text).entry, parsed.entry);
}

#[test]
fn sorted_features() {
    let mut entry = Entry::new();
    entry.primary_accession = Some("A1".to_string());
    for (key, loc) in &[
        ("gene", "500..600"),
        ("CDS", "complement(20..90)"),
        ("source", "1..1000"),
        ("misc_feature", "J00194.1:1..10"),
    ] {
        entry.features.push(Feature::new(*key, parse(loc).unwrap()));
    }

    let keys = |text: &str| -> Vec<String> {
        text.lines()
            .filter(|l| l.starts_with("FT   ") && !l.starts_with(QUALIFIER_LINE))
            .map(|l| l[5..21].trim_end().to_string())
            .collect()
    };

    let text = to_string(&entry, &WriterOptions::default());
    assert_eq!(keys(&text), vec!["gene", "CDS", "source", "misc_feature"]);

    let options = WriterOptions {
        sort_features: true,
        ..WriterOptions::default()
    };
    let text = to_string(&entry, &options);
    assert_eq!(keys(&text), vec!["source", "CDS", "gene", "misc_feature"]);
    // the entry itself is untouched
    assert_eq!(entry.features[0].name, "gene");
}

const QUALIFIER_LINE: &str = "FT                   ";
