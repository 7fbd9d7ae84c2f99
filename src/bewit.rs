use crate::b64;
use crate::error::{Error, Result};
use crate::mac::Mac;
use std::fmt;
use std::str::FromStr;

/// A bewit: a URL-embedded, time-bounded authenticator for a single GET or
/// HEAD request, standing in for an `Authorization` header.
///
/// On the wire a bewit is the url-safe, unpadded base64 encoding of
/// `id\exp\mac\ext` (literal backslashes).  It carries no nonce; a bewit is
/// single-use only if the host installs a nonce callback.
#[derive(Clone, Debug, PartialEq)]
pub struct Bewit {
    id: String,
    exp: i64,
    mac: String,
    ext: Option<String>,
}

impl Bewit {
    /// Create a bewit from its parts.  `exp` is seconds since the epoch.
    ///
    /// See `Client::get_bewit` for the usual way to make one.
    pub fn new(id: &str, exp: i64, mac: Mac, ext: Option<&str>) -> Bewit {
        Bewit {
            id: id.to_string(),
            exp,
            mac: mac.to_base64(),
            ext: ext.map(str::to_string),
        }
    }

    /// The client identifier.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The expiry time, in seconds since the epoch.
    pub fn exp(&self) -> i64 {
        self.exp
    }

    /// The MAC, in its base64 wire form.
    pub fn mac(&self) -> &str {
        &self.mac
    }

    pub fn ext(&self) -> Option<&str> {
        self.ext.as_deref()
    }
}

impl fmt::Display for Bewit {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let raw = format!(
            "{}\\{}\\{}\\{}",
            self.id,
            self.exp,
            self.mac,
            self.ext.as_deref().unwrap_or("")
        );
        write!(f, "{}", b64::bewit_encode(raw.as_bytes()))
    }
}

impl FromStr for Bewit {
    type Err = Error;

    /// Decode a bewit token, classifying each failure: undecodable base64,
    /// a part count other than four, and an empty (or non-numeric) id, exp,
    /// or mac each get their own kind.
    fn from_str(bewit: &str) -> Result<Bewit> {
        let decoded = b64::bewit_decode(bewit).map_err(|_| Error::InvalidBewitEncoding)?;
        let decoded = String::from_utf8(decoded).map_err(|_| Error::InvalidBewitEncoding)?;

        let parts: Vec<&str> = decoded.split('\\').collect();
        if parts.len() != 4 {
            return Err(Error::InvalidBewitStructure);
        }
        if parts[0].is_empty() || parts[1].is_empty() || parts[2].is_empty() {
            return Err(Error::MissingBewitAttributes);
        }
        let exp = parts[1]
            .parse::<i64>()
            .map_err(|_| Error::MissingBewitAttributes)?;

        Ok(Bewit {
            id: parts[0].to_string(),
            exp,
            mac: parts[2].to_string(),
            ext: match parts[3] {
                "" => None,
                ext => Some(ext.to_string()),
            },
        })
    }
}

/// Find a `bewit=` query parameter in a request-target.
///
/// The scan is byte-wise: the parameter starts at the first `bewit=` preceded
/// by `?` or `&`, and its value runs to the next `?`, `&`, or the end.
/// Returns the raw token (possibly empty) and the target with the parameter
/// and its separator removed; a following parameter inherits the separator.
pub(crate) fn extract(url: &str) -> Option<(String, String)> {
    const PREFIX: &str = "bewit=";

    let bytes = url.as_bytes();
    let mut search = 0;
    let at = loop {
        let found = url[search..].find(PREFIX)? + search;
        if found > 0 && (bytes[found - 1] == b'?' || bytes[found - 1] == b'&') {
            break found;
        }
        search = found + PREFIX.len();
    };

    let value_start = at + PREFIX.len();
    let value_end = url[value_start..]
        .find(|c| c == '&' || c == '?')
        .map(|i| value_start + i)
        .unwrap_or_else(|| url.len());
    let token = url[value_start..value_end].to_string();

    let mut stripped = url[..at - 1].to_string();
    let rest = &url[value_end..];
    if !rest.is_empty() {
        stripped.push(bytes[at - 1] as char);
        stripped.push_str(&rest[1..]);
    }

    Some((token, stripped))
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;

    const BEWIT_STR: &str =
        "MTIzNDU2XDEzNTY0MjA3MDdca3NjeHdOUjJ0SnBQMVQxekRMTlBiQjVVaUtJVTl0T1NKWFRVZEc3WDloOD1ceGFuZHlhbmR6";

    #[test]
    fn decodes_the_four_fields() {
        let bewit = Bewit::from_str(BEWIT_STR).unwrap();
        assert_eq!(bewit.id(), "123456");
        assert_eq!(bewit.exp(), 1356420707);
        assert_eq!(bewit.mac(), "kscxwNR2tJpP1T1zDLNPbB5UiKIU9tOSJXTUdG7X9h8=");
        assert_eq!(bewit.ext(), Some("xandyandz"));
    }

    #[test]
    fn display_round_trips() {
        let bewit = Bewit::from_str(BEWIT_STR).unwrap();
        assert_eq!(bewit.to_string(), BEWIT_STR);
    }

    #[test]
    fn missing_ext_is_none() {
        let token = b64::bewit_encode(b"me\\1353832834\\bWFj\\");
        let bewit = Bewit::from_str(&token).unwrap();
        assert_eq!(bewit.ext(), None);
        assert_eq!(bewit.to_string(), token);
    }

    #[test]
    fn undecodable_tokens_are_invalid_encoding() {
        assert!(matches!(
            Bewit::from_str("!/=="),
            Err(Error::InvalidBewitEncoding)
        ));
        // standard-alphabet padding is not valid in a bewit
        assert!(matches!(
            Bewit::from_str("YWJjZA=="),
            Err(Error::InvalidBewitEncoding)
        ));
    }

    #[test]
    fn wrong_part_count_is_invalid_structure() {
        let too_few = b64::bewit_encode(b"me\\1353832834\\bWFj");
        assert!(matches!(
            Bewit::from_str(&too_few),
            Err(Error::InvalidBewitStructure)
        ));
        let too_many = b64::bewit_encode(b"me\\1353832834\\bWFj\\ext\\spurious");
        assert!(matches!(
            Bewit::from_str(&too_many),
            Err(Error::InvalidBewitStructure)
        ));
    }

    #[test]
    fn empty_or_unparseable_required_fields_are_missing_attributes() {
        for raw in &[
            &b"\\1353832834\\bWFj\\ext"[..],
            &b"me\\\\bWFj\\ext"[..],
            &b"me\\1353832834\\\\ext"[..],
            &b"me\\soon\\bWFj\\ext"[..],
        ] {
            let token = b64::bewit_encode(raw);
            assert!(matches!(
                Bewit::from_str(&token),
                Err(Error::MissingBewitAttributes)
            ));
        }
    }

    #[test]
    fn extract_finds_a_lone_bewit() {
        let (token, stripped) = extract("/abc?bewit=XYZ").unwrap();
        assert_eq!(token, "XYZ");
        assert_eq!(stripped, "/abc");
    }

    #[test]
    fn extract_at_the_beginning_of_the_query() {
        let (token, stripped) = extract("/abc?bewit=XYZ&y=2").unwrap();
        assert_eq!(token, "XYZ");
        assert_eq!(stripped, "/abc?y=2");
    }

    #[test]
    fn extract_in_the_middle_of_the_query() {
        let (token, stripped) = extract("/abc?x=1&bewit=XYZ&y=2").unwrap();
        assert_eq!(token, "XYZ");
        assert_eq!(stripped, "/abc?x=1&y=2");
    }

    #[test]
    fn extract_at_the_end_of_the_query() {
        let (token, stripped) = extract("/abc?x=1&bewit=XYZ").unwrap();
        assert_eq!(token, "XYZ");
        assert_eq!(stripped, "/abc?x=1");
    }

    #[test]
    fn extract_yields_empty_tokens() {
        let (token, stripped) = extract("/abc?bewit=").unwrap();
        assert_eq!(token, "");
        assert_eq!(stripped, "/abc");
    }

    #[test]
    fn extract_requires_a_separator_before_the_parameter() {
        assert_eq!(extract("/abc"), None);
        assert_eq!(extract("/abc?x=1"), None);
        assert_eq!(extract("bewit=XYZ"), None);
        // `bewit=` buried in another value is not a parameter boundary
        assert_eq!(extract("/abc?x=bbewit=1"), None);
        let (token, stripped) = extract("/abc?x=bbewit=1&bewit=XYZ").unwrap();
        assert_eq!(token, "XYZ");
        assert_eq!(stripped, "/abc?x=bbewit=1");
    }
}
