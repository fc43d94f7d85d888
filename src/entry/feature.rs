use crate::entry::XRef;
use crate::location::CompoundLocation;

pub const SOURCE_FEATURE: &str = "source";

/// Qualifiers intercepted while reading a feature
pub mod qualifiers {
    pub const ORGANISM: &str = "organism";
    pub const MOL_TYPE: &str = "mol_type";
    pub const DB_XREF: &str = "db_xref";
    pub const ORGANELLE: &str = "organelle";
    pub const TRANSLATION: &str = "translation";
}

/// Feature table entry
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Feature {
    /// Feature key, e.g. `CDS`
    pub name: String,
    pub location: CompoundLocation,
    /// Qualifiers in input order
    pub qualifiers: Vec<Qualifier>,
    /// Parsed `/db_xref` values (except `taxon:`)
    pub xrefs: Vec<XRef>,
    /// Present for `source` features
    pub source: Option<SourceAttributes>,
}

impl Feature {
    pub fn new<S: Into<String>>(name: S, location: CompoundLocation) -> Self {
        let name = name.into();
        let source = if name == SOURCE_FEATURE {
            Some(SourceAttributes::default())
        } else {
            None
        };
        Feature {
            name,
            location,
            qualifiers: vec![],
            xrefs: vec![],
            source,
        }
    }

    #[inline]
    pub fn is_source(&self) -> bool {
        self.source.is_some()
    }

    pub fn add_qualifier<S: Into<String>>(&mut self, name: S, value: Option<String>) {
        self.qualifiers.push(Qualifier {
            name: name.into(),
            value,
        });
    }

    /// First qualifier with the given name
    pub fn qualifier(&self, name: &str) -> Option<&Qualifier> {
        self.qualifiers.iter().find(|q| q.name == name)
    }

    /// Value of the first qualifier with the given name
    pub fn qualifier_value(&self, name: &str) -> Option<&str> {
        self.qualifier(name).and_then(|q| q.value.as_deref())
    }

    pub fn qualifiers_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Qualifier> + 'a {
        self.qualifiers.iter().filter(move |q| q.name == name)
    }

    /// Sorts the qualifiers by name. The relative order of qualifiers with
    /// the same name is kept.
    pub fn sort_qualifiers(&mut self) {
        self.qualifiers.sort_by(|a, b| a.name.cmp(&b.name));
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Qualifier {
    pub name: String,
    pub value: Option<String>,
}

impl Qualifier {
    pub fn new<N: Into<String>>(name: N, value: Option<String>) -> Self {
        Qualifier {
            name: name.into(),
            value,
        }
    }
}

/// Organism related data of a source feature, filled from the
/// `/organism`, `/db_xref="taxon:..."` and `/mol_type` qualifiers and from
/// the organism cache (`OS` / `OC` / `OG` lines or the taxonomy lookup).
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SourceAttributes {
    pub scientific_name: Option<String>,
    pub common_name: Option<String>,
    pub tax_id: Option<u64>,
    /// Semicolon separated lineage
    pub lineage: Option<String>,
    pub organelle: Option<String>,
    pub molecule_type: Option<String>,
}
