use crate::pct_enc::table::{Table, DIGIT, LABEL, WORD};

/// Raw component slices of a parsed input.
///
/// Absent string components are empty, except for the userinfo parts,
/// the query and the fragment whose absence is kept as `None`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct Components<'a> {
    pub scheme: &'a str,
    pub username: Option<&'a str>,
    pub password: Option<&'a str>,
    pub host: &'a str,
    pub port: Option<u16>,
    pub path: &'a str,
    pub query: Option<&'a str>,
    pub fragment: Option<&'a str>,
}

pub(crate) fn parse(s: &str) -> Components<'_> {
    let mut parser = Parser {
        reader: Reader::new(s),
        out: Components::default(),
    };
    parser.parse_from_scheme();
    parser.out
}

/// Permissive URI scanner.
///
/// # Invariants
///
/// `pos <= len`, `pos` is non-decreasing and on a character boundary.
///
/// Every step either consumes the component it is responsible for or
/// leaves `pos` untouched, so that the remaining input falls through
/// to the next component. Parsing never fails.
struct Parser<'a> {
    reader: Reader<'a>,
    out: Components<'a>,
}

struct Reader<'a> {
    s: &'a str,
    pos: usize,
}

impl<'a> Reader<'a> {
    fn new(s: &'a str) -> Self {
        Reader { s, pos: 0 }
    }

    fn remaining(&self) -> &'a str {
        &self.s[self.pos..]
    }

    fn peek(&self, i: usize) -> Option<u8> {
        self.s.as_bytes().get(self.pos + i).copied()
    }

    // Any call to this method must keep the invariants.
    fn skip(&mut self, n: usize) {
        self.pos += n;
        debug_assert!(self.s.is_char_boundary(self.pos));
    }

    /// Returns the length of the run of bytes allowed by `table`
    /// starting `offset` bytes ahead, without consuming it.
    fn scan(&self, offset: usize, table: Table) -> usize {
        self.remaining().as_bytes()[offset..]
            .iter()
            .position(|&x| !table.allows_ascii(x))
            .unwrap_or(self.remaining().len() - offset)
    }

    fn read(&mut self, n: usize) -> &'a str {
        let s = &self.remaining()[..n];
        self.skip(n);
        s
    }

    fn read_until(&mut self, pred: impl Fn(u8) -> bool) -> &'a str {
        let n = self
            .remaining()
            .bytes()
            .position(pred)
            .unwrap_or(self.remaining().len());
        self.read(n)
    }
}

impl<'a> Parser<'a> {
    fn parse_from_scheme(&mut self) {
        let n = self.reader.scan(0, WORD);
        if n > 0 && self.reader.remaining()[n..].starts_with("://") {
            self.out.scheme = self.reader.read(n);
            self.reader.skip(3);
        }
        self.parse_from_userinfo();
    }

    fn parse_from_userinfo(&mut self) {
        let rem = self.reader.remaining();
        let region_len = rem
            .bytes()
            .position(|x| x.is_ascii_whitespace())
            .unwrap_or(rem.len());
        let region = &rem[..region_len];

        let at = region.rfind('@');
        // The username is at least one character long, so a colon at index 0
        // cannot end it.
        let colon = region.bytes().skip(1).position(|x| x == b':').map(|i| i + 1);

        match (colon, at) {
            (Some(colon), Some(at)) if at > colon + 1 => {
                self.out.username = Some(&region[..colon]);
                self.out.password = Some(&region[colon + 1..at]);
                self.reader.skip(at + 1);
            }
            (_, Some(at)) if at > 0 => {
                self.out.username = Some(&region[..at]);
                self.reader.skip(at + 1);
            }
            _ => {}
        }
        self.parse_from_host();
    }

    fn parse_from_host(&mut self) {
        if is_drive_letter(self.reader.remaining()) {
            return self.parse_from_path();
        }

        let mut n = self.reader.scan(0, LABEL);
        if n > 0 {
            while self.reader.peek(n) == Some(b'.') {
                let label_len = self.reader.scan(n + 1, LABEL);
                if label_len == 0 {
                    break;
                }
                n += 1 + label_len;
            }
        }
        self.out.host = self.reader.read(n);
        self.parse_from_port();
    }

    fn parse_from_port(&mut self) {
        if self.reader.peek(0) == Some(b':') {
            let n = self.reader.scan(1, DIGIT);
            if n > 0 {
                // Digits that overflow a port number are left to the path.
                if let Ok(port) = self.reader.remaining()[1..1 + n].parse() {
                    self.out.port = Some(port);
                    self.reader.skip(1 + n);
                }
            }
        }
        self.parse_from_path();
    }

    fn parse_from_path(&mut self) {
        let path = self.reader.read_until(|x| x == b'?' || x == b'#');
        self.out.path = path.strip_prefix("//").unwrap_or(path);

        match self.reader.peek(0) {
            Some(b'?') => self.parse_from_query(),
            Some(b'#') => self.parse_from_fragment(),
            _ => {}
        }
    }

    fn parse_from_query(&mut self) {
        self.reader.skip(1);
        self.out.query = Some(self.reader.read_until(|x| x == b'#'));

        if self.reader.peek(0) == Some(b'#') {
            self.parse_from_fragment();
        }
    }

    fn parse_from_fragment(&mut self) {
        self.reader.skip(1);
        self.out.fragment = Some(self.reader.remaining());
        self.reader.skip(self.reader.remaining().len());
    }
}

/// Checks whether the string starts with a drive letter such as `C:`.
fn is_drive_letter(s: &str) -> bool {
    matches!(s.as_bytes(), [letter, b':', ..] if letter.is_ascii_alphabetic())
}
