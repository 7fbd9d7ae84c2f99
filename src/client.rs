//! Client-side Hawk: building request authorization, validating server
//! responses, issuing bewits, and signing out-of-band messages.

use crate::bewit::Bewit;
use crate::clock::{self, Clock, SystemClock};
use crate::credentials::Credentials;
use crate::crypto;
use crate::error::{Error, Result};
use crate::header::{Header, SERVER_AUTHORIZATION_KEYS, WWW_AUTHENTICATE_KEYS};
use crate::mac::{timestamp_mac, Artifacts, Mac, MacType};
use crate::payload::PayloadHasher;
use rand::distributions::Alphanumeric;
use rand::Rng;
use url::Url;

const NONCE_LENGTH: usize = 6;

/// Options for [`Client::header`].  Absent fields are generated (`ts`,
/// `nonce`) or omitted from the header.
#[derive(Clone, Copy, Debug, Default)]
pub struct HeaderOptions<'a> {
    /// Timestamp in seconds; generated from the clock when absent.
    pub ts: Option<i64>,
    /// Nonce; a random 6-character alphanumeric string when absent.
    pub nonce: Option<&'a str>,
    pub ext: Option<&'a str>,
    pub app: Option<&'a str>,
    pub dlg: Option<&'a str>,
    /// A precomputed payload hash, used verbatim.
    pub hash: Option<&'a str>,
    /// A payload to hash, when `hash` is absent.
    pub payload: Option<&'a [u8]>,
    pub content_type: Option<&'a str>,
    pub localtime_offset_msec: i64,
}

/// Options for [`Client::get_bewit`].
#[derive(Clone, Copy, Debug, Default)]
pub struct BewitOptions<'a> {
    pub ext: Option<&'a str>,
    pub localtime_offset_msec: i64,
}

/// Options for [`Client::message`].
#[derive(Clone, Copy, Debug, Default)]
pub struct MessageOptions<'a> {
    pub ts: Option<i64>,
    pub nonce: Option<&'a str>,
    pub localtime_offset_msec: i64,
}

/// Options for [`Client::authenticate`].
#[derive(Clone, Copy, Debug, Default)]
pub struct ResponseOptions<'a> {
    /// The response body; when non-empty, the `Server-Authorization` hash
    /// must be present and match.
    pub payload: Option<&'a [u8]>,
}

/// A generated `Authorization` header and the artifacts behind it.  Keep the
/// artifacts to validate the server's response.
#[derive(Clone, Debug)]
pub struct RequestAuthorization {
    pub header: String,
    pub artifacts: Artifacts,
}

/// A generated bewit and the artifacts behind it.
#[derive(Clone, Debug)]
pub struct BewitAuthorization {
    pub bewit: Bewit,
    pub artifacts: Artifacts,
}

/// The authorization fields accompanying a signed out-of-band message.
#[derive(Clone, Debug, PartialEq)]
pub struct MessageAuthorization {
    pub id: String,
    pub ts: String,
    pub nonce: String,
    pub hash: String,
    pub mac: String,
}

/// The parsed response headers returned by a successful
/// [`Client::authenticate`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ResponseAttributes {
    pub www_authenticate: Option<Header>,
    pub server_authorization: Option<Header>,
}

/// The client half of the protocol.  Stateless; the only injected
/// collaborator is the clock.
pub struct Client<'a> {
    clock: &'a dyn Clock,
}

impl Client<'static> {
    /// A client reading the operating system clock.
    pub fn new() -> Client<'static> {
        Client {
            clock: &SystemClock,
        }
    }
}

impl Default for Client<'static> {
    fn default() -> Self {
        Client::new()
    }
}

impl<'a> Client<'a> {
    pub fn with_clock(clock: &'a dyn Clock) -> Client<'a> {
        Client { clock }
    }

    /// Build the `Authorization` header for a request.
    ///
    /// A supplied `hash` wins over a supplied `payload`; with neither, the
    /// header carries no hash.  The returned artifacts are the input to
    /// [`Client::authenticate`] once the response arrives.
    pub fn header(
        &self,
        uri: &str,
        method: &str,
        credentials: &Credentials,
        options: &HeaderOptions,
    ) -> Result<RequestAuthorization> {
        check_component(&credentials.id)?;
        for optional in &[options.nonce, options.ext, options.app, options.dlg] {
            if let Some(value) = optional {
                check_component(value)?;
            }
        }

        let (host, port, resource) = split_uri(uri)?;
        let ts = options
            .ts
            .unwrap_or_else(|| clock::now_sec(self.clock, options.localtime_offset_msec));
        let nonce = match options.nonce {
            Some(nonce) => nonce.to_string(),
            None => random_nonce(),
        };
        let hash = match (options.hash, options.payload) {
            (Some(hash), _) => Some(hash.to_string()),
            (None, Some(payload)) => Some(PayloadHasher::hash_base64(
                options.content_type.unwrap_or("").as_bytes(),
                credentials.key.algorithm(),
                payload,
            )?),
            (None, None) => None,
        };

        let artifacts = Artifacts {
            ts: ts.to_string(),
            nonce,
            method: method.to_uppercase(),
            host,
            port,
            resource,
            hash,
            ext: options.ext.map(str::to_string),
            app: options.app.map(str::to_string),
            dlg: options.dlg.map(str::to_string),
        };
        let mac = Mac::new(MacType::Header, &credentials.key, &artifacts)?;

        let mut header = format!(
            "Hawk id=\"{}\", ts=\"{}\", nonce=\"{}\"",
            credentials.id, artifacts.ts, artifacts.nonce
        );
        if let Some(ref hash) = artifacts.hash {
            header.push_str(&format!(", hash=\"{}\"", hash));
        }
        if let Some(ref ext) = artifacts.ext {
            header.push_str(&format!(", ext=\"{}\"", ext));
        }
        header.push_str(&format!(", mac=\"{}\"", mac.to_base64()));
        if let Some(ref app) = artifacts.app {
            header.push_str(&format!(", app=\"{}\"", app));
            if let Some(ref dlg) = artifacts.dlg {
                header.push_str(&format!(", dlg=\"{}\"", dlg));
            }
        }

        Ok(RequestAuthorization { header, artifacts })
    }

    /// Validate a server response against the artifacts of the request it
    /// answers.
    ///
    /// Checks, in order and stopping at the first failure: the timestamp MAC
    /// of a `WWW-Authenticate` challenge, the `Server-Authorization` MAC
    /// (with the server's own `ext` and `hash` substituted into the request
    /// artifacts), and — when a response payload is supplied — the payload
    /// hash.
    pub fn authenticate(
        &self,
        response_headers: &[(&str, &str)],
        credentials: &Credentials,
        artifacts: &Artifacts,
        options: &ResponseOptions,
    ) -> Result<ResponseAttributes> {
        let www_authenticate = header_value(response_headers, "www-authenticate");
        let server_authorization = header_value(response_headers, "server-authorization");
        let content_type = header_value(response_headers, "content-type")
            .map(|value| value.split(';').next().unwrap_or("").trim().to_string())
            .unwrap_or_default();

        let mut attributes = ResponseAttributes::default();

        if let Some(raw) = www_authenticate {
            let parsed = Header::parse(raw, WWW_AUTHENTICATE_KEYS)
                .map_err(|_| Error::InvalidWwwAuthenticateHeader)?;
            if let (Some(ts), Some(tsm)) = (&parsed.ts, &parsed.tsm) {
                let expected = timestamp_mac(&credentials.key, ts)?;
                if !crypto::constant_time_compare(expected.as_bytes(), tsm.as_bytes()) {
                    return Err(Error::InvalidServerTimestampHash);
                }
            }
            attributes.www_authenticate = Some(parsed);
        }

        if let Some(raw) = server_authorization {
            let parsed = Header::parse(raw, SERVER_AUTHORIZATION_KEYS)
                .map_err(|_| Error::InvalidServerAuthorizationHeader)?;

            let mut response_artifacts = artifacts.clone();
            response_artifacts.ext = parsed.ext.clone();
            response_artifacts.hash = parsed.hash.clone();
            let mac = Mac::new(MacType::Response, &credentials.key, &response_artifacts)?;
            let mac_valid = match parsed.mac {
                Some(ref wire) => mac.matches_base64(wire),
                None => false,
            };
            if !mac_valid {
                return Err(Error::BadResponseMac);
            }

            if let Some(payload) = options.payload.filter(|p| !p.is_empty()) {
                let hash = parsed
                    .hash
                    .as_deref()
                    .ok_or(Error::MissingResponseHashAttribute)?;
                let computed = PayloadHasher::hash_base64(
                    content_type.as_bytes(),
                    credentials.key.algorithm(),
                    payload,
                )?;
                if !crypto::constant_time_compare(computed.as_bytes(), hash.as_bytes()) {
                    return Err(Error::BadResponsePayloadMac);
                }
            }

            attributes.server_authorization = Some(parsed);
        }

        Ok(attributes)
    }

    /// Issue a bewit granting GET access to `uri` for `ttl_sec` seconds from
    /// now.
    pub fn get_bewit(
        &self,
        uri: &str,
        credentials: &Credentials,
        ttl_sec: u64,
        options: &BewitOptions,
    ) -> Result<BewitAuthorization> {
        check_component(&credentials.id)?;
        if let Some(ext) = options.ext {
            check_component(ext)?;
        }

        let (host, port, resource) = split_uri(uri)?;
        let exp = clock::now_sec(self.clock, options.localtime_offset_msec) + ttl_sec as i64;
        let artifacts = Artifacts {
            ts: exp.to_string(),
            nonce: String::new(),
            method: "GET".to_string(),
            host,
            port,
            resource,
            hash: None,
            ext: options.ext.map(str::to_string),
            app: None,
            dlg: None,
        };
        let mac = Mac::new(MacType::Bewit, &credentials.key, &artifacts)?;
        let bewit = Bewit::new(&credentials.id, exp, mac, options.ext);

        Ok(BewitAuthorization { bewit, artifacts })
    }

    /// Sign an out-of-band message bound to a host and port.
    pub fn message(
        &self,
        host: &str,
        port: u16,
        message: &[u8],
        credentials: &Credentials,
        options: &MessageOptions,
    ) -> Result<MessageAuthorization> {
        let ts = options
            .ts
            .unwrap_or_else(|| clock::now_sec(self.clock, options.localtime_offset_msec));
        let nonce = match options.nonce {
            Some(nonce) => nonce.to_string(),
            None => random_nonce(),
        };
        let hash = PayloadHasher::hash_base64(b"", credentials.key.algorithm(), message)?;

        let artifacts = Artifacts {
            ts: ts.to_string(),
            nonce: nonce.clone(),
            method: String::new(),
            host: host.to_string(),
            port,
            resource: String::new(),
            hash: Some(hash.clone()),
            ext: None,
            app: None,
            dlg: None,
        };
        let mac = Mac::new(MacType::Message, &credentials.key, &artifacts)?;

        Ok(MessageAuthorization {
            id: credentials.id.clone(),
            ts: artifacts.ts,
            nonce,
            hash,
            mac: mac.to_base64(),
        })
    }
}

/// Split a URI into the (host, port, resource) triple that feeds the MAC.
fn split_uri(uri: &str) -> Result<(String, u16, String)> {
    let url = Url::parse(uri).map_err(|_| Error::InvalidUrl(uri.to_string()))?;
    let host = url
        .host_str()
        .ok_or_else(|| Error::InvalidUrl(uri.to_string()))?
        .to_string();
    let port = url
        .port_or_known_default()
        .ok_or_else(|| Error::InvalidUrl(uri.to_string()))?;
    let resource = match url.query() {
        Some(query) => format!("{}?{}", url.path(), query),
        None => url.path().to_string(),
    };
    Ok((host, port, resource))
}

// Quoted header values have no escaping; refuse components that could not
// survive the trip.
fn check_component(value: &str) -> Result<()> {
    if value.contains('"') || value.contains('\\') {
        return Err(Error::InvalidHeaderValue);
    }
    Ok(())
}

fn random_nonce() -> String {
    rand::thread_rng()
        .sample_iter(Alphanumeric)
        .take(NONCE_LENGTH)
        .collect()
}

fn header_value<'h>(headers: &[(&'h str, &'h str)], name: &str) -> Option<&'h str> {
    headers
        .iter()
        .find(|(key, _)| key.eq_ignore_ascii_case(name))
        .map(|(_, value)| *value)
}


#[cfg(all(test, any(feature = "use_ring", feature = "use_openssl")))]
mod crypto_test {
    use super::*;
    use crate::credentials::{Algorithm, Key};
    use pretty_assertions::assert_eq;

    fn credentials(algorithm: Algorithm) -> Credentials {
        Credentials {
            id: "123456".to_string(),
            key: Key::new("2983d45yun89q", algorithm).unwrap(),
        }
    }

    #[test]
    fn generated_nonces_are_six_alphanumerics() {
        let nonce = random_nonce();
        assert_eq!(nonce.len(), 6);
        assert!(nonce.chars().all(|c| c.is_ascii_alphanumeric()));
        assert_ne!(random_nonce(), random_nonce());
    }

    #[test]
    fn explicit_hash_wins_over_payload() {
        let client = Client::new();
        let options = HeaderOptions {
            ts: Some(1353809207),
            nonce: Some("Ygvqdz"),
            hash: Some("precomputed="),
            payload: Some(b"ignored"),
            ..HeaderOptions::default()
        };
        let authorization = client
            .header(
                "http://example.net/x",
                "POST",
                &credentials(Algorithm::Sha256),
                &options,
            )
            .unwrap();
        assert_eq!(authorization.artifacts.hash.as_deref(), Some("precomputed="));
    }

    #[test]
    fn header_omits_absent_fields() {
        let client = Client::new();
        let options = HeaderOptions {
            ts: Some(1353809207),
            nonce: Some("Ygvqdz"),
            ..HeaderOptions::default()
        };
        let authorization = client
            .header(
                "http://example.net/x",
                "GET",
                &credentials(Algorithm::Sha256),
                &options,
            )
            .unwrap();
        assert!(!authorization.header.contains("hash="));
        assert!(!authorization.header.contains("ext="));
        assert!(!authorization.header.contains("app="));
    }

    #[test]
    fn dlg_requires_app() {
        let client = Client::new();
        let options = HeaderOptions {
            ts: Some(1353809207),
            nonce: Some("Ygvqdz"),
            dlg: Some("delegated-by"),
            ..HeaderOptions::default()
        };
        let authorization = client
            .header(
                "http://example.net/x",
                "GET",
                &credentials(Algorithm::Sha256),
                &options,
            )
            .unwrap();
        assert!(!authorization.header.contains("dlg="));
    }

    #[test]
    fn quoted_characters_in_components_are_refused() {
        let client = Client::new();
        let options = HeaderOptions {
            ext: Some("bad\"ext"),
            ..HeaderOptions::default()
        };
        assert!(matches!(
            client.header(
                "http://example.net/x",
                "GET",
                &credentials(Algorithm::Sha256),
                &options,
            ),
            Err(Error::InvalidHeaderValue)
        ));
    }

    #[test]
    fn message_authorization_carries_all_five_fields() {
        let client = Client::new();
        let options = MessageOptions {
            ts: Some(1353809207),
            nonce: Some("abc123"),
            ..MessageOptions::default()
        };
        let authorization = client
            .message(
                "example.net",
                80,
                b"I am the boodle",
                &credentials(Algorithm::Sha256),
                &options,
            )
            .unwrap();
        assert_eq!(authorization.id, "123456");
        assert_eq!(authorization.ts, "1353809207");
        assert_eq!(authorization.nonce, "abc123");
        assert!(!authorization.hash.is_empty());
        assert!(!authorization.mac.is_empty());
    }
}
