//! An ordered query-string codec.
//!
//! [`Query`] maps decoded keys to [`QueryValue`]s in first-seen order.
//! Bracketed keys such as `a[b]=c` or `list[]=x` build nested maps, in the
//! manner of conventional form-encoded arrays.

use crate::pct_enc::{self, table::UNRESERVED};
use indexmap::{map, IndexMap};
use std::{borrow::Cow, fmt};

#[cfg(feature = "serde")]
use serde::{ser::SerializeMap, Serialize, Serializer};

/// A value stored in a [`Query`].
#[derive(Clone, PartialEq, Eq)]
pub enum QueryValue {
    /// A plain decoded string.
    Str(String),
    /// A nested map built from bracketed keys.
    Map(Query),
}

impl QueryValue {
    /// Returns the string value, or `None` if this is a nested map.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            QueryValue::Str(s) => Some(s),
            QueryValue::Map(_) => None,
        }
    }

    /// Returns the nested map, or `None` if this is a plain string.
    #[must_use]
    pub fn as_map(&self) -> Option<&Query> {
        match self {
            QueryValue::Str(_) => None,
            QueryValue::Map(map) => Some(map),
        }
    }

    /// Turns a string value into an empty map and returns the map.
    fn make_map(&mut self) -> &mut Query {
        match self {
            QueryValue::Map(map) => map,
            QueryValue::Str(_) => {
                *self = QueryValue::Map(Query::new());
                self.make_map()
            }
        }
    }
}

impl From<&str> for QueryValue {
    fn from(value: &str) -> Self {
        QueryValue::Str(value.to_owned())
    }
}

impl From<String> for QueryValue {
    fn from(value: String) -> Self {
        QueryValue::Str(value)
    }
}

impl From<Query> for QueryValue {
    fn from(value: Query) -> Self {
        QueryValue::Map(value)
    }
}

impl PartialEq<str> for QueryValue {
    fn eq(&self, other: &str) -> bool {
        self.as_str() == Some(other)
    }
}

impl PartialEq<&str> for QueryValue {
    fn eq(&self, other: &&str) -> bool {
        self.as_str() == Some(*other)
    }
}

/// An ordered map of decoded query parameters.
///
/// # Comparison
///
/// `Query`s are compared entry by entry in order, so two maps holding the
/// same parameters in a different order are not equal.
///
/// # Examples
///
/// ```
/// use lenient_uri::Query;
///
/// let query = Query::parse("name=Ferris+the%20crab&tags[]=rust&tags[]=crab");
/// assert_eq!(query.get_str("name"), Some("Ferris the crab"));
///
/// let tags = query.get("tags").and_then(|v| v.as_map()).unwrap();
/// assert_eq!(tags.get_str("0"), Some("rust"));
/// assert_eq!(tags.get_str("1"), Some("crab"));
///
/// assert_eq!(
///     query.to_string(),
///     "name=Ferris%20the%20crab&tags%5B0%5D=rust&tags%5B1%5D=crab"
/// );
/// ```
#[derive(Clone, Default)]
pub struct Query {
    params: IndexMap<String, QueryValue>,
}

impl Query {
    /// Creates an empty `Query`.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Decodes a raw query string.
    ///
    /// Pairs are separated by `'&'`, keys from values by the first `'='`.
    /// Both are form-decoded, so `'+'` becomes a space. A key without
    /// `'='` is stored with an empty value, and a repeated key overwrites
    /// the earlier value while keeping its position.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        let mut query = Query::new();
        for pair in raw.split('&').filter(|s| !s.is_empty()) {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            let key = pct_enc::decode_form(key);
            let value = pct_enc::decode_form(value);
            query.insert_path(&key, value.into_owned());
        }
        query
    }

    /// Sets the value of a key, keeping the position of an existing key.
    ///
    /// The key is taken literally; brackets in it are not interpreted.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<QueryValue>) {
        self.params.insert(key.into(), value.into());
    }

    /// Returns the value of a key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&QueryValue> {
        self.params.get(key)
    }

    /// Returns the value of a key if it is a plain string.
    #[must_use]
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(QueryValue::as_str)
    }

    /// Returns the number of top-level keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.params.len()
    }

    /// Checks whether the map is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// Returns an iterator over the top-level entries in order.
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            inner: self.params.iter(),
        }
    }

    fn insert_path(&mut self, key: &str, value: String) {
        let key = key.trim_start_matches(' ');
        let Some((base, subkeys)) = split_key(key) else {
            return;
        };

        let mut map = self;
        let mut key = Cow::Borrowed(base);
        for subkey in subkeys {
            map = map
                .params
                .entry(key.into_owned())
                .or_insert_with(|| QueryValue::Map(Query::new()))
                .make_map();
            key = match subkey {
                "" => Cow::Owned(map.next_index().to_string()),
                _ => Cow::Borrowed(subkey),
            };
        }
        map.params.insert(key.into_owned(), QueryValue::Str(value));
    }

    /// Returns the index used when appending with an empty bracket pair.
    fn next_index(&self) -> u64 {
        self.params
            .keys()
            .filter_map(|k| parse_index(k))
            .max()
            .map_or(0, |i| i.saturating_add(1))
    }

    pub(crate) fn encode_to(&self, buf: &mut String) {
        let mut first = true;
        self.encode_with_prefix(None, buf, &mut first);
    }

    fn encode_with_prefix(&self, prefix: Option<&str>, buf: &mut String, first: &mut bool) {
        for (key, value) in &self.params {
            let key = match prefix {
                Some(prefix) => Cow::Owned(format!("{prefix}[{key}]")),
                None => Cow::Borrowed(key.as_str()),
            };
            match value {
                QueryValue::Str(value) => {
                    if !*first {
                        buf.push('&');
                    }
                    *first = false;
                    pct_enc::encode_to(&key, UNRESERVED, buf);
                    buf.push('=');
                    pct_enc::encode_to(value, UNRESERVED, buf);
                }
                QueryValue::Map(map) => map.encode_with_prefix(Some(&key), buf, first),
            }
        }
    }
}

/// Splits a key into its base name and bracketed subkeys.
///
/// Returns `None` if the base name is empty. A key whose first `'['` has no
/// matching `']'` is taken literally. Anything after a closing `']'` that
/// does not open another subkey is dropped.
fn split_key(key: &str) -> Option<(&str, Vec<&str>)> {
    let mut subkeys = Vec::new();
    let base = match key.find('[') {
        Some(0) => return None,
        Some(i) if key[i..].contains(']') => {
            let mut rest = &key[i..];
            while let Some(inner) = rest.strip_prefix('[') {
                let Some(end) = inner.find(']') else {
                    break;
                };
                subkeys.push(&inner[..end]);
                rest = &inner[end + 1..];
            }
            &key[..i]
        }
        _ => key,
    };
    (!base.is_empty()).then_some((base, subkeys))
}

/// Parses a key in canonical decimal form as an array index.
fn parse_index(key: &str) -> Option<u64> {
    match key.as_bytes() {
        [b'0'] => Some(0),
        [b'1'..=b'9', rest @ ..] if rest.iter().all(u8::is_ascii_digit) => key.parse().ok(),
        _ => None,
    }
}

impl PartialEq for Query {
    fn eq(&self, other: &Self) -> bool {
        self.params.len() == other.params.len() && self.iter().eq(other.iter())
    }
}

impl Eq for Query {}

impl<K: Into<String>, V: Into<QueryValue>> FromIterator<(K, V)> for Query {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut query = Query::new();
        query.extend(iter);
        query
    }
}

impl<K: Into<String>, V: Into<QueryValue>> Extend<(K, V)> for Query {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (k, v) in iter {
            self.insert(k, v);
        }
    }
}

impl<'a> IntoIterator for &'a Query {
    type Item = (&'a str, &'a QueryValue);
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Iter<'a> {
        self.iter()
    }
}

/// An iterator over the entries of a [`Query`].
///
/// This struct is created by [`Query::iter`].
#[derive(Clone)]
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct Iter<'a> {
    inner: map::Iter<'a, String, QueryValue>,
}

impl<'a> Iterator for Iter<'a> {
    type Item = (&'a str, &'a QueryValue);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(k, v)| (k.as_str(), v))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl DoubleEndedIterator for Iter<'_> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back().map(|(k, v)| (k.as_str(), v))
    }
}

impl ExactSizeIterator for Iter<'_> {}

impl fmt::Debug for Iter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.clone()).finish()
    }
}

#[cfg(feature = "serde")]
impl Serialize for Query {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (k, v) in self {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

#[cfg(feature = "serde")]
impl Serialize for QueryValue {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            QueryValue::Str(s) => serializer.serialize_str(s),
            QueryValue::Map(map) => map.serialize(serializer),
        }
    }
}
