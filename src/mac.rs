use crate::b64;
use crate::credentials::Key;
use crate::crypto;
use crate::error::Result;
use std::ops::Deref;

/// The kind of MAC calculation, corresponding to the first line of the
/// normalized string.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MacType {
    Header,
    Response,
    Bewit,
    Message,
}

impl MacType {
    fn preamble(self) -> &'static str {
        match self {
            MacType::Header => "hawk.1.header",
            MacType::Response => "hawk.1.response",
            MacType::Bewit => "hawk.1.bewit",
            MacType::Message => "hawk.1.message",
        }
    }
}

/// The fields that feed the MAC for one message.
///
/// Whatever is present when a MAC is computed must be present, and equal, when
/// it is verified; absent optional fields canonicalize to empty lines.  `ts`
/// is kept as the exact decimal string that travels on the wire so the
/// canonicalization is byte-faithful; skew and expiry checks parse it on
/// demand.
#[derive(Clone, Debug, PartialEq)]
pub struct Artifacts {
    pub ts: String,
    pub nonce: String,
    pub method: String,
    pub host: String,
    pub port: u16,
    pub resource: String,
    pub hash: Option<String>,
    pub ext: Option<String>,
    pub app: Option<String>,
    pub dlg: Option<String>,
}

/// The normalized string: the exclusive input to every MAC computation.
///
/// One line per field, `\n`-terminated, method uppercased, host lowercased,
/// absent hash as an empty line, ext escaped, and `app`/`dlg` lines only when
/// `app` is set.
fn normalized(mac_type: MacType, artifacts: &Artifacts) -> String {
    let mut buf = String::with_capacity(128);
    buf.push_str(mac_type.preamble());
    buf.push('\n');
    buf.push_str(&artifacts.ts);
    buf.push('\n');
    buf.push_str(&artifacts.nonce);
    buf.push('\n');
    buf.push_str(&artifacts.method.to_uppercase());
    buf.push('\n');
    buf.push_str(&artifacts.resource);
    buf.push('\n');
    buf.push_str(&artifacts.host.to_lowercase());
    buf.push('\n');
    buf.push_str(&artifacts.port.to_string());
    buf.push('\n');
    buf.push_str(artifacts.hash.as_deref().unwrap_or(""));
    buf.push('\n');
    if let Some(ref ext) = artifacts.ext {
        buf.push_str(&escape_ext(ext));
    }
    buf.push('\n');
    if let Some(ref app) = artifacts.app {
        buf.push_str(app);
        buf.push('\n');
        buf.push_str(artifacts.dlg.as_deref().unwrap_or(""));
        buf.push('\n');
    }
    buf
}

fn escape_ext(ext: &str) -> String {
    ext.replace('\\', "\\\\").replace('\n', "\\n")
}

/// A message authentication code: the keyed signature in a Hawk transaction.
///
/// Macs compare in constant time, preventing timing side-channel attacks.
#[derive(Debug, Clone)]
pub struct Mac(Vec<u8>);

impl Mac {
    pub fn new(mac_type: MacType, key: &Key, artifacts: &Artifacts) -> Result<Mac> {
        let input = normalized(mac_type, artifacts);
        Ok(Mac(key.sign(input.as_bytes())?))
    }

    /// The wire encoding: standard base64, padded.
    pub fn to_base64(&self) -> String {
        b64::encode(&self.0)
    }

    /// Constant-time check against a base64 value taken from the wire.
    pub(crate) fn matches_base64(&self, wire: &str) -> bool {
        crypto::constant_time_compare(self.to_base64().as_bytes(), wire.as_bytes())
    }
}

/// The MAC over a bare timestamp, sent with a stale-timestamp challenge so
/// the client can resynchronize its clock.  Returns the base64 encoding.
pub(crate) fn timestamp_mac(key: &Key, ts: &str) -> Result<String> {
    let input = format!("hawk.1.ts\n{}\n", ts);
    Ok(b64::encode(&key.sign(input.as_bytes())?))
}

impl From<Vec<u8>> for Mac {
    fn from(original: Vec<u8>) -> Self {
        Mac(original)
    }
}

impl AsRef<[u8]> for Mac {
    fn as_ref(&self) -> &[u8] {
        &self.0[..]
    }
}

impl Deref for Mac {
    type Target = Vec<u8>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl PartialEq for Mac {
    fn eq(&self, other: &Mac) -> bool {
        crypto::constant_time_compare(&self.0[..], &other.0[..])
    }
}

#[cfg(test)]
mod test {
    use super::{normalized, Artifacts, MacType};
    use pretty_assertions::assert_eq;

    fn artifacts() -> Artifacts {
        Artifacts {
            ts: "1353809207".to_string(),
            nonce: "Ygvqdz".to_string(),
            method: "POST".to_string(),
            host: "example.net".to_string(),
            port: 80,
            resource: "/somewhere/over/the/rainbow".to_string(),
            hash: Some("bsvY3IfUllw6V5rvk4tStEvpBhE=".to_string()),
            ext: Some("Bazinga!".to_string()),
            app: None,
            dlg: None,
        }
    }

    #[test]
    fn normalized_header_string() {
        assert_eq!(
            normalized(MacType::Header, &artifacts()),
            "hawk.1.header\n1353809207\nYgvqdz\nPOST\n/somewhere/over/the/rainbow\n\
             example.net\n80\nbsvY3IfUllw6V5rvk4tStEvpBhE=\nBazinga!\n"
        );
    }

    #[test]
    fn missing_hash_and_ext_leave_empty_lines() {
        let mut artifacts = artifacts();
        artifacts.hash = None;
        artifacts.ext = None;
        assert_eq!(
            normalized(MacType::Response, &artifacts),
            "hawk.1.response\n1353809207\nYgvqdz\nPOST\n/somewhere/over/the/rainbow\n\
             example.net\n80\n\n\n"
        );
    }

    #[test]
    fn method_and_host_are_case_folded() {
        let mut mixed = artifacts();
        mixed.method = "post".to_string();
        mixed.host = "EXAMPLE.net".to_string();
        assert_eq!(
            normalized(MacType::Header, &mixed),
            normalized(MacType::Header, &artifacts())
        );
    }

    #[test]
    fn ext_backslashes_and_newlines_are_escaped() {
        let mut artifacts = artifacts();
        artifacts.ext = Some("x\\y\nz".to_string());
        let s = normalized(MacType::Header, &artifacts);
        assert!(s.contains("\nx\\\\y\\nz\n"));
    }

    #[test]
    fn app_adds_two_lines_with_empty_dlg() {
        let mut artifacts = artifacts();
        artifacts.app = Some("my-app".to_string());
        let s = normalized(MacType::Header, &artifacts);
        assert!(s.ends_with("\nmy-app\n\n"));

        artifacts.dlg = Some("my-dlg".to_string());
        let s = normalized(MacType::Header, &artifacts);
        assert!(s.ends_with("\nmy-app\nmy-dlg\n"));
    }

    #[test]
    fn dlg_without_app_is_not_written() {
        let mut artifacts = artifacts();
        artifacts.dlg = Some("my-dlg".to_string());
        assert!(!normalized(MacType::Header, &artifacts).contains("my-dlg"));
    }
}
