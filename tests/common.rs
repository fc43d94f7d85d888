#![allow(dead_code)]

use embl_io::embl::{ParsedEntry, Reader};
use lazy_static::lazy_static;

/// A complete mRNA entry
pub const X56734: &str = "\
ID   X56734; SV 1; linear; mRNA; STD; PLN; 70 BP.
XX
AC   X56734; S46826;
XX
DT   12-SEP-1991 (Rel. 29, Created)
DT   25-NOV-2005 (Rel. 85, Last updated, Version 11)
XX
DE   Trifolium repens mRNA for non-cyanogenic beta-glucosidase
XX
KW   beta-glucosidase.
XX
OS   Trifolium repens (white clover)
OC   Eukaryota; Viridiplantae; Streptophyta; Embryophyta; Tracheophyta;
OC   Spermatophyta; Magnoliophyta; eudicotyledons; Gunneridae; Pentapetalae;
OC   rosids; fabids; Fabales; Fabaceae; Papilionoideae; Trifolieae; Trifolium.
XX
RN   [5]
RP   1-70
RX   DOI; 10.1007/BF00039495.
RX   PUBMED; 1907511.
RA   Oxtoby E., Dunn M.A., Pancoro A., Hughes M.A.;
RT   \"Nucleotide and derived amino acid sequence of the cyanogenic
RT   beta-glucosidase (linamarase) from white clover (Trifolium repens L.)\";
RL   Plant Mol. Biol. 17(2):209-219(1991).
XX
DR   MD5; 1e51ca3a5450c43524b9185c236cc5cc.
XX
CC   first comment line
CC   second comment line
XX
FH   Key             Location/Qualifiers
FH
FT   source          1..70
FT                   /organism=\"Trifolium repens\"
FT                   /mol_type=\"mRNA\"
FT                   /clone_lib=\"lambda gt10\"
FT                   /db_xref=\"taxon:3899\"
FT   CDS             <1..>70
FT                   /codon_start=1
FT                   /product=\"non-cyanogenic \"\"beta\"\"-glucosidase\"
FT                   /db_xref=\"UniProtKB/Swiss-Prot:P26204\"
FT                   /translation=\"MDFIVAIFALFVISSFTITSTNAVEASTLLDIGNLSRSSFPRGFI
FT                   FGAGSSAYQFEGA\"
XX
SQ   Sequence 70 BP; 22 A; 11 C; 10 G; 27 T; 0 other;
     aaacaaacca aatatggatt ttattgtagc catatttgct ctgtttgttg ttagctcatt        60
     cgaattaaac                                                               70
//
";

/// A CON entry without sequence
pub const CON_ENTRY: &str = "\
ID   AL954800; SV 2; linear; genomic DNA; CON; HUM; 300 BP.
XX
AC   AL954800;
XX
DE   Homo sapiens chromosome 1 contig
XX
KW   .
XX
FH   Key             Location/Qualifiers
FH
FT   source          1..300
FT                   /organism=\"Homo sapiens\"
FT                   /mol_type=\"genomic DNA\"
XX
CO   join(A00001.1:1..210,gap(unk100),gap(10),
CO   complement(A00002.1:1..80))
//
";

/// Two records declaring the same organism; only the first has OS/OC lines
pub const SHARED_ORGANISM: &str = "\
ID   A1; SV 1; linear; genomic DNA; STD; HUM; 0 BP.
OS   Homo sapiens (human)
OC   Eukaryota; Metazoa; Chordata; Mammalia; Primates; Hominidae; Homo.
FT   source          1..10
FT                   /organism=\"Homo sapiens\"
FT                   /mol_type=\"genomic DNA\"
//
ID   A2; SV 1; linear; genomic DNA; STD; HUM; 0 BP.
FT   source          1..10
FT                   /organism=\"Homo sapiens\"
FT                   /mol_type=\"genomic DNA\"
//
";

lazy_static! {
    /// Several records in one input
    pub static ref MULTI: String = {
        let mut s = String::new();
        for i in 1..=25 {
            s.push_str(&format!(
                "ID   E{}; SV 1; linear; genomic DNA; STD; HUM; 10 BP.\n\
                 XX\n\
                 FT   source          1..10\n\
                 FT                   /organism=\"Homo sapiens\"\n\
                 FT                   /mol_type=\"genomic DNA\"\n\
                 XX\n\
                 SQ   Sequence 10 BP;\n\
                 \x20    acgtacgtac                                                         10\n\
                 //\n",
                i
            ));
        }
        s
    };

    pub static ref X56734_TRANSLATION: String =
        "MDFIVAIFALFVISSFTITSTNAVEASTLLDIGNLSRSSFPRGFIFGAGSSAYQFEGA".to_string();
}

/// Reads all records of the input, panicking on hard errors
pub fn read_all(input: &str) -> Vec<ParsedEntry> {
    Reader::new(input.as_bytes())
        .into_entries()
        .map(|r| r.unwrap())
        .collect()
}

pub fn read_one(input: &str) -> ParsedEntry {
    let mut entries = read_all(input);
    assert_eq!(entries.len(), 1, "expected exactly one entry");
    entries.remove(0)
}

/// Runs `$body` with readers of different initial capacities to test the
/// buffer growing feature
#[macro_export]
macro_rules! test_reader {
    ($input:expr, $reader:ident, $body:block) => {
        for cap in 3..100 {
            let mut $reader = embl_io::embl::Reader::with_capacity($input.as_bytes(), cap);
            $body
        }
        let mut $reader = embl_io::embl::Reader::new($input.as_bytes());
        $body
    };
}
