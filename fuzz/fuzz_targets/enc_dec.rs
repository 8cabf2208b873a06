#![no_main]
use lenient_uri::pct_enc::{decode, decode_form, encode, table::UNRESERVED};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &str| {
    let encoded = encode(data, UNRESERVED);
    assert!(encoded.bytes().all(|x| x == b'%' || UNRESERVED.allows_ascii(x)));
    assert_eq!(decode(&encoded), data);
    assert_eq!(decode_form(&encoded), data);
});
