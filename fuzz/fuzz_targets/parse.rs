#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|text: &str| {
    // Parsing is total and the spans must tile the input exactly.
    let mut pos = 0;
    for (_, range) in e2_links::Parser::new(text).into_offset_iter() {
        assert_eq!(range.start, pos);
        assert!(range.end >= range.start);
        pos = range.end;
    }
    assert_eq!(pos, text.len());
});
