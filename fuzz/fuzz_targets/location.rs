#![no_main]
#[macro_use] extern crate libfuzzer_sys;
extern crate embl_io;

use embl_io::location::{parse, render, LocationParser};

fuzz_target!(|data: &[u8]| {
    let text = match std::str::from_utf8(data) {
        Ok(t) => t,
        Err(_) => return,
    };
    for lenient in &[false, true] {
        let parser = LocationParser::new().lenient(*lenient);
        if let Ok(loc) = parser.parse(text) {
            // rendered locations are canonical
            let rendered = render(&loc);
            let reparsed = parser.parse(&rendered).expect("rendered location does not parse");
            assert_eq!(render(&reparsed), rendered);
        }
        let mut dropped = vec![];
        let _ = parser.parse_recovering(text, &mut dropped);
    }
    let _ = parse(text);
});
