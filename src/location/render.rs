use super::*;

/// Renders a compound location in flat file notation. This is the exact
/// inverse of [`LocationParser::parse`](super::LocationParser::parse) up to
/// whitespace: elements are separated by a comma without spaces.
pub fn render(location: &CompoundLocation) -> String {
    let mut out = String::with_capacity(location.len() * 16);
    if location.is_empty() {
        return out;
    }

    if location.simple_location && location.len() == 1 {
        if location.complement {
            out.push_str("complement(");
            render_element(&location.elements[0], true, &mut out);
            out.push(')');
        } else {
            render_element(&location.elements[0], false, &mut out);
        }
        return out;
    }

    if location.complement {
        out.push_str("complement(");
    }
    out.push_str(location.kind.as_str());
    out.push('(');
    for (i, element) in location.elements.iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        render_element(element, location.complement, &mut out);
    }
    out.push(')');
    if location.complement {
        out.push(')');
    }
    out
}

/// Appends a single element to `out`. `outer_complement` is the complement
/// flag of the enclosing compound; it decides together with the element's
/// own flag where the partiality markers go.
pub fn render_element(location: &Location, outer_complement: bool, out: &mut String) {
    use std::fmt::Write;

    let (left, right) = markers_from_partiality(
        outer_complement ^ location.complement,
        location.five_prime_partial,
        location.three_prime_partial,
    );

    if location.complement {
        out.push_str("complement(");
    }
    if let Some(remote) = location.remote.as_ref() {
        // writing to a String never fails
        let _ = write!(out, "{}:", remote);
    }
    let lmark = if left { "<" } else { "" };
    let rmark = if right { ">" } else { "" };
    let _ = match location.coords {
        Coordinates::Base(b) => write!(out, "{}{}", lmark, b),
        Coordinates::Range(b, e) => write!(out, "{}{}..{}{}", lmark, b, rmark, e),
        Coordinates::Between(b, e) => write!(out, "{}{}^{}{}", lmark, b, rmark, e),
        Coordinates::Gap { length: None, .. } => write!(out, "gap()"),
        Coordinates::Gap { length: Some(l), unknown } => {
            write!(out, "gap({}{})", if unknown { "unk" } else { "" }, l)
        }
    };
    if location.complement {
        out.push(')');
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roundtrip(s: &str) {
        let loc = parse(s).unwrap_or_else(|e| panic!("{}: {}", s, e));
        assert_eq!(render(&loc), s);
    }

    #[test]
    fn roundtrips() {
        for s in &[
            "1..4041",
            "467",
            "123^124",
            "<1..>6",
            "complement(<1..>6)",
            "complement(<1..6)",
            "complement(1..>6)",
            "join(1..210,493..660)",
            "order(1..210,493..660)",
            "join(<1..210,493..>660)",
            "complement(join(<1..210,493..>660))",
            "complement(join(1..210,493..>660))",
            "join(complement(4918..5163),complement(2691..4571))",
            "join(complement(<4918..5163),complement(2691..4571))",
            "join(A00001.1:1..210,gap(unk100),gap(100),A00001.1:1..210)",
            "join(J00194:100..202,1..88,gap())",
            "join(1)",
            "complement(J00194.2:23^24)",
        ] {
            roundtrip(s);
        }
    }

    #[test]
    fn whitespace_normalized() {
        let loc = parse("join( 1..210,\n   493..660 )").unwrap();
        assert_eq!(render(&loc), "join(1..210,493..660)");
    }

    #[test]
    fn complement_marker_swap() {
        // 5' partial on a complemented element is written as '>'
        let loc = CompoundLocation::simple(
            Location::range(1, 6).set_complement(true).set_partial(true, false),
        );
        assert_eq!(render(&loc), "complement(1..>6)");
        let loc = CompoundLocation::simple(Location::range(1, 6).set_partial(true, false));
        assert_eq!(render(&loc), "<1..6");
    }

    #[test]
    fn constructed_compound() {
        let mut loc = CompoundLocation::new(CompoundKind::Join);
        loc.complement = true;
        loc.push(Location::range(10, 20).set_partial(false, true));
        loc.push(Location::range(30, 40).set_partial(true, false));
        loc.update_partiality();
        assert!(loc.left_partial && loc.right_partial);
        assert_eq!(render(&loc), "complement(join(<10..20,30..>40))");
    }
}
