//! Server-side Hawk: validating request authorization, building the
//! `Server-Authorization` reply, and authenticating bewits and out-of-band
//! messages.

use crate::bewit::{self, Bewit};
use crate::client::MessageAuthorization;
use crate::clock::{self, Clock, SystemClock};
use crate::credentials::Credentials;
use crate::crypto;
use crate::error::{Error, Result};
use crate::header::{Header, DEFAULT_KEYS};
use crate::mac::{timestamp_mac, Artifacts, Mac, MacType};
use crate::payload::PayloadHasher;
use crate::request::Request;
use log::debug;

const MAX_RESOURCE_LENGTH: usize = 4096;
const DEFAULT_TIMESTAMP_SKEW_SEC: u64 = 60;

/// Looks up the credentials registered for a key identifier.
///
/// Implementations must be safe for concurrent calls.  Any closure
/// `Fn(&str) -> Option<Credentials>` qualifies.
pub trait CredentialsResolver {
    /// `None` means the identifier is unknown.
    fn resolve(&self, id: &str) -> Option<Credentials>;
}

impl<F> CredentialsResolver for F
where
    F: Fn(&str) -> Option<Credentials>,
{
    fn resolve(&self, id: &str) -> Option<Credentials> {
        self(id)
    }
}

/// Replay protection.  The server hands every verified `(key, nonce, ts)`
/// triple to this callback; returning `false` rejects the request as a
/// replay.  The nonce store behind it is owned by the host and must be safe
/// for concurrent access.
pub trait NonceValidator {
    fn validate(&self, key: &[u8], nonce: &str, ts: &str) -> bool;
}

impl<F> NonceValidator for F
where
    F: Fn(&[u8], &str, &str) -> bool,
{
    fn validate(&self, key: &[u8], nonce: &str, ts: &str) -> bool {
        self(key, nonce, ts)
    }
}

/// Options for the server-side authenticate operations.
pub struct AuthenticateOptions<'a> {
    /// The request payload; supplying it makes the payload hash mandatory.
    pub payload: Option<&'a [u8]>,
    pub nonce_validator: Option<&'a dyn NonceValidator>,
    /// Symmetric tolerance around "now" for request timestamps, in seconds.
    pub timestamp_skew_sec: u64,
    pub localtime_offset_msec: i64,
}

impl<'a> Default for AuthenticateOptions<'a> {
    fn default() -> Self {
        AuthenticateOptions {
            payload: None,
            nonce_validator: None,
            timestamp_skew_sec: DEFAULT_TIMESTAMP_SKEW_SEC,
            localtime_offset_msec: 0,
        }
    }
}

/// Options for [`Server::header`].
#[derive(Clone, Copy, Debug, Default)]
pub struct ResponseHeaderOptions<'a> {
    pub ext: Option<&'a str>,
    /// A precomputed response payload hash, used verbatim.
    pub hash: Option<&'a str>,
    /// A response payload to hash, when `hash` is absent.
    pub payload: Option<&'a [u8]>,
    pub content_type: Option<&'a str>,
}

/// A successfully authenticated request: the resolved credentials and the
/// artifacts its MAC covered.
#[derive(Debug)]
pub struct Authenticated {
    pub credentials: Credentials,
    pub artifacts: Artifacts,
}

/// A successfully authenticated bewit request.
#[derive(Debug)]
pub struct BewitAuthenticated {
    pub credentials: Credentials,
    pub bewit: Bewit,
}

/// The server half of the protocol.  Stateless; the only injected
/// collaborator is the clock — credentials and nonces arrive per call.
pub struct Server<'a> {
    clock: &'a dyn Clock,
}

impl Server<'static> {
    /// A server reading the operating system clock.
    pub fn new() -> Server<'static> {
        Server {
            clock: &SystemClock,
        }
    }
}

impl Default for Server<'static> {
    fn default() -> Self {
        Server::new()
    }
}

impl<'a> Server<'a> {
    pub fn with_clock(clock: &'a dyn Clock) -> Server<'a> {
        Server { clock }
    }

    /// Authenticate a request carrying a Hawk `Authorization` header.
    ///
    /// The pipeline short-circuits on the first failure: header parse,
    /// attribute completeness, credential lookup, MAC comparison, optional
    /// payload hash, nonce callback, timestamp skew.  A stale timestamp
    /// produces a challenge carrying the server's clock reading and its MAC
    /// so the client can resynchronize.
    pub fn authenticate(
        &self,
        request: &Request,
        resolver: &dyn CredentialsResolver,
        options: &AuthenticateOptions,
    ) -> Result<Authenticated> {
        let authorization = request.authorization.as_deref().unwrap_or("");
        let header = Header::parse(authorization, DEFAULT_KEYS)?;
        let (id, ts, nonce, mac) = match (header.id, header.ts, header.nonce, header.mac) {
            (Some(id), Some(ts), Some(nonce), Some(mac)) => (id, ts, nonce, mac),
            _ => return Err(Error::MissingAttributes),
        };
        debug!("authenticating header for id={}", id);

        let credentials = resolve(resolver, &id)?;
        let artifacts = Artifacts {
            ts,
            nonce,
            method: request.method.clone(),
            host: request.host.clone(),
            port: request.port,
            resource: request.resource.clone(),
            hash: header.hash,
            ext: header.ext,
            app: header.app,
            dlg: header.dlg,
        };

        let computed = Mac::new(MacType::Header, &credentials.key, &artifacts)?;
        if !computed.matches_base64(&mac) {
            return Err(Error::BadMac);
        }

        if let Some(payload) = options.payload {
            let hash = artifacts
                .hash
                .as_deref()
                .ok_or(Error::MissingRequiredPayloadHash)?;
            let computed_hash =
                PayloadHasher::hash_base64(b"", credentials.key.algorithm(), payload)?;
            if !crypto::constant_time_compare(computed_hash.as_bytes(), hash.as_bytes()) {
                return Err(Error::BadPayloadHash);
            }
        }

        self.check_nonce(&credentials, &artifacts.nonce, &artifacts.ts, options)?;
        self.check_staleness(&artifacts.ts, &credentials, options)?;

        Ok(Authenticated {
            credentials,
            artifacts,
        })
    }

    /// Authenticate a GET or HEAD request authorized by a `bewit=` query
    /// parameter instead of a header.
    pub fn authenticate_bewit(
        &self,
        request: &Request,
        resolver: &dyn CredentialsResolver,
        options: &AuthenticateOptions,
    ) -> Result<BewitAuthenticated> {
        let now = clock::now_ms(self.clock, options.localtime_offset_msec);

        if request.resource.len() > MAX_RESOURCE_LENGTH {
            return Err(Error::ResourcePathExceedsMaxLength);
        }
        if request.method != "GET" && request.method != "HEAD" {
            return Err(Error::InvalidMethod);
        }
        let has_authorization = request
            .authorization
            .as_deref()
            .map_or(false, |value| !value.is_empty());
        if has_authorization {
            return Err(Error::MultipleAuthentications);
        }

        let (token, resource) =
            bewit::extract(&request.resource).ok_or(Error::Unauthorized)?;
        if token.is_empty() {
            return Err(Error::EmptyBewit);
        }
        let parsed: Bewit = token.parse()?;
        if i128::from(parsed.exp()) * 1000 <= i128::from(now) {
            return Err(Error::AccessExpired);
        }

        let credentials = resolve(resolver, parsed.id())?;
        let artifacts = Artifacts {
            ts: parsed.exp().to_string(),
            nonce: String::new(),
            method: "GET".to_string(),
            host: request.host.clone(),
            port: request.port,
            resource,
            hash: None,
            ext: parsed.ext().map(str::to_string),
            app: None,
            dlg: None,
        };
        let computed = Mac::new(MacType::Bewit, &credentials.key, &artifacts)?;
        if !computed.matches_base64(parsed.mac()) {
            return Err(Error::BadMac);
        }
        debug!("bewit authenticated for id={}", parsed.id());

        Ok(BewitAuthenticated {
            credentials,
            bewit: parsed,
        })
    }

    /// Authenticate a signed out-of-band message.
    pub fn authenticate_message(
        &self,
        host: &str,
        port: u16,
        message: &[u8],
        authorization: &MessageAuthorization,
        resolver: &dyn CredentialsResolver,
        options: &AuthenticateOptions,
    ) -> Result<Credentials> {
        if authorization.id.is_empty()
            || authorization.ts.is_empty()
            || authorization.nonce.is_empty()
            || authorization.hash.is_empty()
            || authorization.mac.is_empty()
        {
            return Err(Error::InvalidAuthorization);
        }

        let credentials = resolve(resolver, &authorization.id)?;
        let artifacts = Artifacts {
            ts: authorization.ts.clone(),
            nonce: authorization.nonce.clone(),
            method: String::new(),
            host: host.to_string(),
            port,
            resource: String::new(),
            hash: Some(authorization.hash.clone()),
            ext: None,
            app: None,
            dlg: None,
        };

        let computed = Mac::new(MacType::Message, &credentials.key, &artifacts)?;
        if !computed.matches_base64(&authorization.mac) {
            return Err(Error::BadMac);
        }

        let computed_hash = PayloadHasher::hash_base64(b"", credentials.key.algorithm(), message)?;
        let hash = artifacts.hash.as_deref().unwrap_or("");
        if !crypto::constant_time_compare(computed_hash.as_bytes(), hash.as_bytes()) {
            return Err(Error::BadMessageHash);
        }

        self.check_nonce(&credentials, &artifacts.nonce, &artifacts.ts, options)?;
        self.check_staleness(&artifacts.ts, &credentials, options)?;

        Ok(credentials)
    }

    /// Verify a request payload after the fact, for hosts that stream the
    /// body and authenticate the header first.
    pub fn authenticate_payload(
        &self,
        payload: &[u8],
        result: &Authenticated,
        content_type: &str,
    ) -> Result<()> {
        let computed = PayloadHasher::hash_base64(
            content_type.as_bytes(),
            result.credentials.key.algorithm(),
            payload,
        )?;
        self.authenticate_payload_hash(&computed, &result.artifacts)
    }

    /// Compare an already-computed payload hash against the authenticated
    /// artifacts.  No recomputation, constant-time comparison only.
    pub fn authenticate_payload_hash(&self, computed_hash: &str, artifacts: &Artifacts) -> Result<()> {
        let hash = artifacts.hash.as_deref().unwrap_or("");
        if !crypto::constant_time_compare(computed_hash.as_bytes(), hash.as_bytes()) {
            return Err(Error::BadPayloadHash);
        }
        Ok(())
    }

    /// Build the `Server-Authorization` header for a previously
    /// authenticated request.
    ///
    /// The request's `ext` and `hash` are discarded; the response's own
    /// values come from the options (an explicit hash wins over a payload).
    pub fn header(&self, result: &Authenticated, options: &ResponseHeaderOptions) -> Result<String> {
        let hash = match (options.hash, options.payload) {
            (Some(hash), _) => Some(hash.to_string()),
            (None, Some(payload)) => Some(PayloadHasher::hash_base64(
                options.content_type.unwrap_or("").as_bytes(),
                result.credentials.key.algorithm(),
                payload,
            )?),
            (None, None) => None,
        };

        let mut artifacts = result.artifacts.clone();
        artifacts.ext = options.ext.map(str::to_string);
        artifacts.hash = hash;
        let mac = Mac::new(MacType::Response, &result.credentials.key, &artifacts)?;

        let mut header = format!("Hawk mac=\"{}\"", mac.to_base64());
        if let Some(ref hash) = artifacts.hash {
            header.push_str(&format!(", hash=\"{}\"", hash));
        }
        if let Some(ref ext) = artifacts.ext {
            header.push_str(&format!(", ext=\"{}\"", escape_attribute(ext)));
        }
        Ok(header)
    }

    fn check_nonce(
        &self,
        credentials: &Credentials,
        nonce: &str,
        ts: &str,
        options: &AuthenticateOptions,
    ) -> Result<()> {
        if let Some(validator) = options.nonce_validator {
            if !validator.validate(credentials.key.raw(), nonce, ts) {
                return Err(Error::InvalidNonce);
            }
        }
        Ok(())
    }

    fn check_staleness(
        &self,
        ts: &str,
        credentials: &Credentials,
        options: &AuthenticateOptions,
    ) -> Result<()> {
        let now = clock::now_ms(self.clock, options.localtime_offset_msec);
        let skew_ms = i128::from(options.timestamp_skew_sec) * 1000;
        let fresh = match ts.parse::<i64>() {
            Ok(sec) => (i128::from(sec) * 1000 - i128::from(now)).abs() <= skew_ms,
            Err(_) => false,
        };
        if !fresh {
            let server_ts = now.div_euclid(1000);
            let tsm = timestamp_mac(&credentials.key, &server_ts.to_string())?;
            return Err(Error::StaleTimestamp { ts: server_ts, tsm });
        }
        Ok(())
    }
}

fn resolve(resolver: &dyn CredentialsResolver, id: &str) -> Result<Credentials> {
    let credentials = resolver.resolve(id).ok_or(Error::UnknownCredentials)?;
    if credentials.id.is_empty() {
        return Err(Error::InvalidCredentials);
    }
    Ok(credentials)
}

// Server-Authorization ext values escape `\` and `"`; this is the one place
// the wire format allows characters outside the attribute alphabet.
fn escape_attribute(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}
