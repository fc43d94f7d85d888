#![no_main]
#[macro_use] extern crate libfuzzer_sys;
extern crate embl_io;
extern crate criterion;

use embl_io::embl::{write_entry, Reader};

fuzz_target!(|data: &[u8]| {
    let mut reader = Reader::with_capacity(data, 3);
    let mut count: usize = 0;

    while let Some(result) = reader.next() {
        match result {
            Ok(parsed) => {
                count += parsed.validation.len();
                let mut out = vec![];
                write_entry(&mut out, &parsed.entry).unwrap();
                count += out.len();
            }
            Err(_) => break,
        }
    }
    criterion::black_box(count);
});
