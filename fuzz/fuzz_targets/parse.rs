#![no_main]
use lenient_uri::Uri;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &str| {
    let u = Uri::parse(data);

    assert!(!u.scheme().bytes().any(|x| x.is_ascii_uppercase()));
    if u.host().is_empty() {
        assert!(u.authority().is_empty());
    }
    if u.username().is_none() {
        assert!(u.userinfo().is_empty());
    }

    let s = u.to_string();
    assert!(s.starts_with(u.scheme()));
    assert!(s.ends_with(u.fragment()));

    // The password survives being encoded into the userinfo.
    // Whitespace is excluded since a dropped empty query may move it.
    if !data.bytes().any(|x| x.is_ascii_whitespace())
        && !u.host().is_empty()
        && u.username().is_some()
        && u.password().is_some()
    {
        assert_eq!(Uri::parse(&s).password(), u.password());
    }
});
