use std::cmp::Ordering;

use crate::entry::Feature;

/// Sorts features in the conventional output order:
///
/// * source features first (keeping their relative order),
/// * then ascending by the smallest local coordinate of the location,
/// * consecutive runs of `intron` / `exon` features are then re-sorted by
///   their largest coordinate, leaving all other features in place.
///
/// The sort is stable, features with equal keys keep their input order.
pub fn sort_features(features: &mut [Feature]) {
    features.sort_by(compare_features);

    let mut i = 0;
    while i < features.len() {
        if !is_intron_or_exon(&features[i]) {
            i += 1;
            continue;
        }
        let start = i;
        while i < features.len() && is_intron_or_exon(&features[i]) {
            i += 1;
        }
        features[start..i].sort_by_key(|f| f.location.max_position().unwrap_or(0));
    }
}

fn compare_features(a: &Feature, b: &Feature) -> Ordering {
    match (a.is_source(), b.is_source()) {
        (true, false) => return Ordering::Less,
        (false, true) => return Ordering::Greater,
        (true, true) => return Ordering::Equal,
        _ => {}
    }
    // features without local coordinates go last
    let pos = |f: &Feature| f.location.min_position().unwrap_or(u64::max_value());
    pos(a).cmp(&pos(b))
}

#[inline]
fn is_intron_or_exon(f: &Feature) -> bool {
    f.name == "intron" || f.name == "exon"
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::location::parse;

    fn feature(name: &str, loc: &str) -> Feature {
        Feature::new(name, parse(loc).unwrap())
    }

    fn names(features: &[Feature]) -> Vec<String> {
        features
            .iter()
            .map(|f| format!("{} {}", f.name, f.location))
            .collect()
    }

    #[test]
    fn source_first_then_min_position() {
        let mut f = vec![
            feature("CDS", "50..100"),
            feature("gene", "10..100"),
            feature("source", "1..1000"),
            feature("misc_feature", "A00001.1:1..5"),
            feature("mRNA", "join(200..300,5..20)"),
        ];
        sort_features(&mut f);
        assert_eq!(
            names(&f),
            vec![
                "source 1..1000",
                "mRNA join(200..300,5..20)",
                "gene 10..100",
                "CDS 50..100",
                "misc_feature A00001.1:1..5",
            ]
        );
    }

    #[test]
    fn intron_exon_runs() {
        let mut f = vec![
            feature("gene", "10..500"),
            feature("exon", "10..200"),
            feature("intron", "10..100"),
            feature("exon", "101..150"),
            feature("CDS", "400..450"),
        ];
        sort_features(&mut f);
        assert_eq!(
            names(&f),
            vec![
                "gene 10..500",
                "intron 10..100",
                "exon 101..150",
                "exon 10..200",
                "CDS 400..450",
            ]
        );
    }
}
