use crate::error::{Error, Result};

/// The attribute keys a Hawk `Authorization` header may carry.
pub const DEFAULT_KEYS: &[&str] = &["id", "ts", "nonce", "hash", "ext", "mac", "app", "dlg"];

/// Keys a client accepts in a `WWW-Authenticate` challenge.
pub(crate) const WWW_AUTHENTICATE_KEYS: &[&str] = &["ts", "tsm", "error"];

/// Keys a client accepts in a `Server-Authorization` header.
pub(crate) const SERVER_AUTHORIZATION_KEYS: &[&str] = &["mac", "ext", "hash"];

const MAX_HEADER_LENGTH: usize = 4096;

/// A parsed `Hawk` attribute list, as carried by `Authorization`,
/// `Server-Authorization`, and `WWW-Authenticate` headers.
///
/// The parser is purely lexical: every attribute is optional here, and each
/// consumer decides which subset it requires.  Values are kept as the exact
/// strings from the wire; MACs and hashes stay base64-encoded.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Header {
    pub id: Option<String>,
    pub ts: Option<String>,
    pub nonce: Option<String>,
    pub mac: Option<String>,
    pub hash: Option<String>,
    pub ext: Option<String>,
    pub app: Option<String>,
    pub dlg: Option<String>,
    pub tsm: Option<String>,
    pub error: Option<String>,
}

impl Header {
    /// Parse a raw header value against an allowed attribute set.
    ///
    /// The grammar is `Hawk SP attr ("," SP attr)*` with each attribute a
    /// `key="value"` pair; whitespace around separators is tolerated, nothing
    /// else is.  Errors classify exactly: over-long input, an empty header,
    /// a bare or foreign scheme, unknown/duplicate attributes, characters
    /// outside the value alphabet, and structural faults each map to their
    /// own [`Error`] kind.
    pub fn parse(header: &str, keys: &[&str]) -> Result<Header> {
        if header.len() > MAX_HEADER_LENGTH {
            return Err(Error::HeaderLengthTooLong);
        }
        if header.is_empty() {
            return Err(Error::Unauthorized);
        }

        let scheme_end = header
            .find(|c: char| !is_word_char(c))
            .unwrap_or_else(|| header.len());
        if scheme_end == 0 {
            return Err(Error::InvalidHeaderSyntax);
        }
        let (scheme, rest) = header.split_at(scheme_end);
        if !rest.is_empty() && !rest.starts_with(char::is_whitespace) {
            return Err(Error::InvalidHeaderSyntax);
        }
        if !scheme.eq_ignore_ascii_case("hawk") {
            return Err(Error::Unauthorized);
        }
        let attributes = rest.trim_start();
        if attributes.is_empty() {
            return Err(Error::InvalidHeaderSyntax);
        }

        let mut parsed = Header::default();
        let mut remaining = attributes;
        loop {
            let key_end = remaining
                .find(|c: char| !is_word_char(c))
                .unwrap_or_else(|| remaining.len());
            if key_end == 0 {
                return Err(Error::BadHeaderFormat);
            }
            let key = &remaining[..key_end];
            remaining = remaining[key_end..]
                .strip_prefix('=')
                .and_then(|r| r.strip_prefix('"'))
                .ok_or(Error::BadHeaderFormat)?;
            let value_end = remaining.find('"').ok_or(Error::BadHeaderFormat)?;
            let value = &remaining[..value_end];
            remaining = &remaining[value_end + 1..];

            if !keys.contains(&key) {
                return Err(Error::UnknownAttribute(key.to_string()));
            }
            if value.is_empty() {
                // The closing quote is the first offending character.
                return Err(Error::BadAttributeValue('"'));
            }
            if let Some(bad) = value.chars().find(|c| !is_value_char(*c)) {
                return Err(Error::BadAttributeValue(bad));
            }
            // `keys` narrows the closed attribute set; anything outside it
            // has no slot either way.
            let slot = match parsed.slot(key) {
                Some(slot) => slot,
                None => return Err(Error::UnknownAttribute(key.to_string())),
            };
            if slot.is_some() {
                return Err(Error::DuplicateAttribute(key.to_string()));
            }
            *slot = Some(value.to_string());

            let after = remaining.trim_start();
            if after.is_empty() {
                break;
            }
            remaining = after
                .strip_prefix(',')
                .ok_or(Error::BadHeaderFormat)?
                .trim_start();
            if remaining.is_empty() {
                return Err(Error::BadHeaderFormat);
            }
        }

        Ok(parsed)
    }

    fn slot(&mut self, key: &str) -> Option<&mut Option<String>> {
        match key {
            "id" => Some(&mut self.id),
            "ts" => Some(&mut self.ts),
            "nonce" => Some(&mut self.nonce),
            "mac" => Some(&mut self.mac),
            "hash" => Some(&mut self.hash),
            "ext" => Some(&mut self.ext),
            "app" => Some(&mut self.app),
            "dlg" => Some(&mut self.dlg),
            "tsm" => Some(&mut self.tsm),
            "error" => Some(&mut self.error),
            _ => None,
        }
    }
}

fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

// The value alphabet: space, `\w`, and the printable specials minus `"` and `\`.
fn is_value_char(c: char) -> bool {
    c == ' '
        || c.is_ascii_alphanumeric()
        || c == '_'
        || matches!(
            c,
            '!' | '#'
                | '$'
                | '%'
                | '&'
                | '\''
                | '('
                | ')'
                | '*'
                | '+'
                | ','
                | '-'
                | '.'
                | '/'
                | ':'
                | ';'
                | '<'
                | '='
                | '>'
                | '?'
                | '@'
                | '['
                | ']'
                | '^'
                | '`'
                | '{'
                | '|'
                | '}'
                | '~'
        )
}
