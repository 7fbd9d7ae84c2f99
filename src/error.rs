//! Error taxonomy.
//!
//! Every fallible operation in this crate returns one of these kinds.  A kind
//! determines the HTTP status the host should answer with, and — for 401
//! kinds only — the `WWW-Authenticate` challenge value to attach.

use crate::crypto::CryptoError;
use failure::Fail;

pub type Result<T> = ::std::result::Result<T, Error>;

#[derive(Debug, Fail)]
pub enum Error {
    // Malformed input: 400, no challenge.
    #[fail(display = "Bad header format")]
    BadHeaderFormat,
    #[fail(display = "Header length too long")]
    HeaderLengthTooLong,
    #[fail(display = "Invalid header syntax")]
    InvalidHeaderSyntax,
    #[fail(display = "Missing attributes")]
    MissingAttributes,
    #[fail(display = "Duplicate attribute: {}", _0)]
    DuplicateAttribute(String),
    #[fail(display = "Unknown attribute: {}", _0)]
    UnknownAttribute(String),
    #[fail(display = "Bad attribute value: {}", _0)]
    BadAttributeValue(char),
    #[fail(display = "Invalid bewit encoding")]
    InvalidBewitEncoding,
    #[fail(display = "Invalid bewit structure")]
    InvalidBewitStructure,
    #[fail(display = "Missing bewit attributes")]
    MissingBewitAttributes,
    #[fail(display = "Multiple authentications")]
    MultipleAuthentications,
    #[fail(display = "Resource path exceeds max length")]
    ResourcePathExceedsMaxLength,
    #[fail(display = "Invalid authorization")]
    InvalidAuthorization,

    // Authentication failures: 401, challenge attached.
    #[fail(display = "Unauthorized")]
    Unauthorized,
    #[fail(display = "Unknown credentials")]
    UnknownCredentials,
    #[fail(display = "Bad mac")]
    BadMac,
    #[fail(display = "Bad payload hash")]
    BadPayloadHash,
    #[fail(display = "Bad message hash")]
    BadMessageHash,
    #[fail(display = "Missing required payload hash")]
    MissingRequiredPayloadHash,
    #[fail(display = "Invalid method")]
    InvalidMethod,
    #[fail(display = "Invalid nonce")]
    InvalidNonce,
    /// The request timestamp fell outside the skew window.  Carries the
    /// server's clock reading and its MAC so the client can resynchronize.
    #[fail(display = "Stale timestamp")]
    StaleTimestamp { ts: i64, tsm: String },
    #[fail(display = "Access expired")]
    AccessExpired,
    #[fail(display = "Empty bewit")]
    EmptyBewit,

    // Server-side faults: 500, no challenge.
    #[fail(display = "Invalid host header")]
    InvalidHostHeader,
    #[fail(display = "Invalid credentials")]
    InvalidCredentials,
    #[fail(display = "Unknown algorithm")]
    UnknownAlgorithm,
    #[fail(display = "Invalid server timestamp hash")]
    InvalidServerTimestampHash,
    #[fail(display = "Bad response mac")]
    BadResponseMac,
    #[fail(display = "Bad response payload mac")]
    BadResponsePayloadMac,
    #[fail(display = "Missing response hash attribute")]
    MissingResponseHashAttribute,
    #[fail(display = "Invalid WWW-Authenticate header")]
    InvalidWwwAuthenticateHeader,
    #[fail(display = "Invalid Server-Authorization header")]
    InvalidServerAuthorizationHeader,
    #[fail(display = "Unparseable URL: {}", _0)]
    InvalidUrl(String),
    #[fail(display = "Invalid header value")]
    InvalidHeaderValue,
    #[fail(display = "{}", _0)]
    Crypto(#[fail(cause)] CryptoError),
}

impl Error {
    /// The HTTP status a host should answer with for this kind.
    pub fn status(&self) -> u16 {
        use Error::*;
        match self {
            BadHeaderFormat | HeaderLengthTooLong | InvalidHeaderSyntax | MissingAttributes
            | DuplicateAttribute(_) | UnknownAttribute(_) | BadAttributeValue(_)
            | InvalidBewitEncoding | InvalidBewitStructure | MissingBewitAttributes
            | MultipleAuthentications | ResourcePathExceedsMaxLength | InvalidAuthorization => 400,
            Unauthorized | UnknownCredentials | BadMac | BadPayloadHash | BadMessageHash
            | MissingRequiredPayloadHash | InvalidMethod | InvalidNonce
            | StaleTimestamp { .. } | AccessExpired | EmptyBewit => 401,
            _ => 500,
        }
    }

    /// The `WWW-Authenticate` value to return alongside a 401; `None` for
    /// every other status.
    pub fn challenge(&self) -> Option<String> {
        match self {
            Error::Unauthorized => Some("Hawk".to_string()),
            Error::StaleTimestamp { ts, tsm } => Some(format!(
                "Hawk ts=\"{}\", tsm=\"{}\", error=\"Stale timestamp\"",
                ts, tsm
            )),
            other if other.status() == 401 => Some(format!("Hawk error=\"{}\"", other)),
            _ => None,
        }
    }
}

impl From<CryptoError> for Error {
    fn from(e: CryptoError) -> Self {
        Error::Crypto(e)
    }
}

#[cfg(test)]
mod test {
    use super::Error;

    #[test]
    fn statuses_follow_the_taxonomy() {
        assert_eq!(Error::DuplicateAttribute("id".to_string()).status(), 400);
        assert_eq!(Error::MultipleAuthentications.status(), 400);
        assert_eq!(Error::BadMac.status(), 401);
        assert_eq!(Error::AccessExpired.status(), 401);
        assert_eq!(Error::InvalidHostHeader.status(), 500);
        assert_eq!(Error::BadResponseMac.status(), 500);
    }

    #[test]
    fn only_401s_carry_a_challenge() {
        assert_eq!(Error::Unauthorized.challenge().unwrap(), "Hawk");
        assert_eq!(
            Error::BadMac.challenge().unwrap(),
            "Hawk error=\"Bad mac\""
        );
        assert_eq!(
            Error::InvalidMethod.challenge().unwrap(),
            "Hawk error=\"Invalid method\""
        );
        assert!(Error::BadHeaderFormat.challenge().is_none());
        assert!(Error::UnknownAlgorithm.challenge().is_none());
    }

    #[test]
    fn stale_timestamp_challenge_carries_server_time() {
        let err = Error::StaleTimestamp {
            ts: 1362337299,
            tsm: "abc123=".to_string(),
        };
        assert_eq!(err.status(), 401);
        assert_eq!(
            err.challenge().unwrap(),
            "Hawk ts=\"1362337299\", tsm=\"abc123=\", error=\"Stale timestamp\""
        );
    }

    #[test]
    fn messages_match_the_wire_wording() {
        assert_eq!(
            Error::UnknownAttribute("foo".to_string()).to_string(),
            "Unknown attribute: foo"
        );
        assert_eq!(Error::BadAttributeValue('"').to_string(), "Bad attribute value: \"");
        assert_eq!(Error::StaleTimestamp { ts: 0, tsm: String::new() }.to_string(), "Stale timestamp");
    }
}
