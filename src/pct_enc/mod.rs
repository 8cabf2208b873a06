//! Percent-encoding utilities.
//!
//! Decoding is lenient: a `'%'` that does not start a valid
//! percent-encoded octet is kept as is, and decoded bytes that
//! do not form valid UTF-8 are replaced with
//! [`U+FFFD REPLACEMENT CHARACTER`][U+FFFD].
//!
//! [U+FFFD]: char::REPLACEMENT_CHARACTER

pub mod table;

pub use table::Table;

use std::{borrow::Cow, str};

const fn gen_octet_table(hi: bool) -> [u8; 256] {
    let mut out = [0xff; 256];
    let shift = if hi { 4 } else { 0 };

    let mut i = 0;
    while i < 10 {
        out[(i + b'0') as usize] = i << shift;
        i += 1;
    }
    while i < 16 {
        out[(i - 10 + b'A') as usize] = i << shift;
        out[(i - 10 + b'a') as usize] = i << shift;
        i += 1;
    }
    out
}

const OCTET_TABLE_HI: &[u8; 256] = &gen_octet_table(true);
const OCTET_TABLE_LO: &[u8; 256] = &gen_octet_table(false);

/// Decodes a percent-encoded octet, returning `None` if either byte is not hexadecimal.
fn decode_octet(hi: u8, lo: u8) -> Option<u8> {
    let (hi, lo) = (OCTET_TABLE_HI[hi as usize], OCTET_TABLE_LO[lo as usize]);
    (hi != 0xff && lo != 0xff).then(|| hi | lo)
}

pub(crate) fn encode_byte(x: u8) -> &'static str {
    const TABLE: &[u8; 256 * 3] = &{
        const HEX_DIGITS: &[u8; 16] = b"0123456789ABCDEF";

        let mut i = 0;
        let mut table = [0; 256 * 3];
        while i < 256 {
            table[i * 3] = b'%';
            table[i * 3 + 1] = HEX_DIGITS[i >> 4];
            table[i * 3 + 2] = HEX_DIGITS[i & 0b1111];
            i += 1;
        }
        table
    };

    const TABLE_STR: &str = match str::from_utf8(TABLE) {
        Ok(s) => s,
        Err(_) => unreachable!(),
    };

    &TABLE_STR[x as usize * 3..x as usize * 3 + 3]
}

fn decode_impl(s: &str, plus_as_space: bool) -> Cow<'_, str> {
    let bytes = s.as_bytes();
    let needs_work = bytes
        .iter()
        .any(|&x| x == b'%' || (plus_as_space && x == b'+'));
    if !needs_work {
        return Cow::Borrowed(s);
    }

    let mut buf = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        let x = bytes[i];
        match x {
            b'%' => {
                if let [hi, lo, ..] = bytes[i + 1..] {
                    if let Some(octet) = decode_octet(hi, lo) {
                        buf.push(octet);
                        i += 3;
                        continue;
                    }
                }
                buf.push(x);
            }
            b'+' if plus_as_space => buf.push(b' '),
            _ => buf.push(x),
        }
        i += 1;
    }

    match String::from_utf8(buf) {
        Ok(s) => Cow::Owned(s),
        Err(e) => Cow::Owned(String::from_utf8_lossy(e.as_bytes()).into_owned()),
    }
}

/// Decodes percent-encoded octets in a string.
///
/// `'+'` is left untouched. Use [`decode_form`] for `application/x-www-form-urlencoded`
/// data. This function allocates only when the string contains a `'%'`.
///
/// # Examples
///
/// ```
/// use lenient_uri::pct_enc::decode;
///
/// assert_eq!(decode("Ferris%20the%20crab"), "Ferris the crab");
/// assert_eq!(decode("1+1=2"), "1+1=2");
/// assert_eq!(decode("100%"), "100%");
/// assert_eq!(decode("%zz%4"), "%zz%4");
/// ```
#[must_use]
pub fn decode(s: &str) -> Cow<'_, str> {
    decode_impl(s, false)
}

/// Decodes form data, treating `'+'` as a space in addition to
/// decoding percent-encoded octets.
///
/// # Examples
///
/// ```
/// use lenient_uri::pct_enc::decode_form;
///
/// assert_eq!(decode_form("Ferris+the%20crab"), "Ferris the crab");
/// assert_eq!(decode_form("1%2B1"), "1+1");
/// ```
#[must_use]
pub fn decode_form(s: &str) -> Cow<'_, str> {
    decode_impl(s, true)
}

/// Percent-encodes a string with the given table, appending the result onto a buffer.
///
/// A byte is preserved if `table` [allows] it; it is percent-encoded otherwise.
///
/// [allows]: Table::allows_ascii
pub fn encode_to(s: &str, table: Table, buf: &mut String) {
    let mut rest = s;
    while !rest.is_empty() {
        let i = rest
            .bytes()
            .position(|x| !table.allows_ascii(x))
            .unwrap_or(rest.len());
        buf.push_str(&rest[..i]);

        let j = rest[i..]
            .bytes()
            .position(|x| table.allows_ascii(x))
            .map_or(rest.len(), |j| i + j);
        for &x in &rest.as_bytes()[i..j] {
            buf.push_str(encode_byte(x));
        }
        rest = &rest[j..];
    }
}

/// Percent-encodes a string with the given table.
///
/// This function allocates only when some byte needs encoding.
///
/// # Examples
///
/// ```
/// use lenient_uri::pct_enc::{encode, table::UNRESERVED};
///
/// assert_eq!(encode("key", UNRESERVED), "key");
/// assert_eq!(encode("a b&c", UNRESERVED), "a%20b%26c");
/// assert_eq!(encode("¡Olé!", UNRESERVED), "%C2%A1Ol%C3%A9%21");
/// ```
#[must_use]
pub fn encode(s: &str, table: Table) -> Cow<'_, str> {
    if s.bytes().all(|x| table.allows_ascii(x)) {
        return Cow::Borrowed(s);
    }
    let mut buf = String::with_capacity(s.len() * 3);
    encode_to(s, table, &mut buf);
    Cow::Owned(buf)
}
