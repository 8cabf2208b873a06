#![no_main]
use lenient_uri::Query;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &str| {
    let q = Query::parse(data);
    let s = q.to_string();
    assert_eq!(Query::parse(&s), q);
});
