#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|text: &str| {
    let mut out = String::new();
    e2_links::html::push_html(&mut out, e2_links::Parser::new(text));
});
