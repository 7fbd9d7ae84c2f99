//! The `hawkauth` crate implements both halves of the Hawk holder-of-key
//! authentication scheme for HTTP: a client that constructs `Authorization`
//! headers and validates `Server-Authorization` / `WWW-Authenticate`
//! responses, and a server that validates incoming headers, bewits
//! (URL-embedded credentials), and signed out-of-band messages.
//!
//! The crate is a low-level building block: it owns the canonicalization,
//! parsing, and verification rules of the protocol and nothing else.  HTTP
//! plumbing, credential storage, and nonce storage belong to the host, which
//! supplies them through three small collaborators: a [`Clock`], a
//! [`CredentialsResolver`], and a [`NonceValidator`].  Every operation is a
//! pure function of its arguments plus those collaborators, so values here
//! can be shared freely across threads.
//!
//! Cryptographic primitives come from a pluggable backend: *ring* with the
//! default `use_ring` feature, OpenSSL with `use_openssl`, or anything else
//! via [`crypto::set_cryptographer`].
//!
//! # Examples
//!
//! ## Client
//!
//! ```
//! use hawkauth::{Algorithm, Client, Credentials, HeaderOptions, Key};
//!
//! let credentials = Credentials {
//!     id: "dh37fgj492je".to_string(),
//!     key: Key::new("werxhqb98rpaxn39848xrunpaw3489ruxnpa98w4rxn", Algorithm::Sha256).unwrap(),
//! };
//!
//! let client = Client::new();
//! let authorization = client
//!     .header(
//!         "http://example.com:8000/resource/1?b=1&a=2",
//!         "GET",
//!         &credentials,
//!         &HeaderOptions {
//!             ext: Some("some-app-ext-data"),
//!             ..HeaderOptions::default()
//!         },
//!     )
//!     .unwrap();
//!
//! // the header goes on the outgoing request; the artifacts are kept to
//! // validate the server's response
//! assert!(authorization.header.starts_with("Hawk id=\"dh37fgj492je\""));
//! ```
//!
//! ## Server
//!
//! ```
//! use hawkauth::{
//!     Algorithm, AuthenticateOptions, Client, Credentials, HeaderOptions, Key, RawRequest,
//!     Request, RequestOptions, Server,
//! };
//!
//! fn lookup(id: &str) -> Option<Credentials> {
//!     if id == "dh37fgj492je" {
//!         Some(Credentials {
//!             id: id.to_string(),
//!             key: Key::new("werxhqb98rpaxn39848xrunpaw3489ruxnpa98w4rxn", Algorithm::Sha256)
//!                 .ok()?,
//!         })
//!     } else {
//!         None
//!     }
//! }
//!
//! // a client signs a request...
//! let client = Client::new();
//! let authorization = client
//!     .header(
//!         "http://example.com:8000/resource/1?b=1&a=2",
//!         "GET",
//!         &lookup("dh37fgj492je").unwrap(),
//!         &HeaderOptions::default(),
//!     )
//!     .unwrap();
//!
//! // ...and the server authenticates it from its own view of the request
//! let raw = RawRequest {
//!     method: "GET",
//!     url: "/resource/1?b=1&a=2",
//!     headers: &[
//!         ("host", "example.com:8000"),
//!         ("authorization", &authorization.header),
//!     ],
//!     ..RawRequest::default()
//! };
//! let request = Request::new(&raw, &RequestOptions::default()).unwrap();
//! let server = Server::new();
//! let authenticated = server
//!     .authenticate(&request, &lookup, &AuthenticateOptions::default())
//!     .unwrap();
//! assert_eq!(authenticated.credentials.id, "dh37fgj492je");
//! ```
//!
//! On failure every operation returns an [`Error`] whose [`Error::status`]
//! and [`Error::challenge`] tell the host what to answer with.

mod b64;
mod bewit;
mod client;
mod clock;
mod credentials;
pub mod crypto;
mod error;
mod header;
mod mac;
mod payload;
mod request;
mod server;

pub use crate::bewit::Bewit;
pub use crate::client::{
    BewitAuthorization, BewitOptions, Client, HeaderOptions, MessageAuthorization, MessageOptions,
    RequestAuthorization, ResponseAttributes, ResponseOptions,
};
pub use crate::clock::{Clock, FixedClock, SystemClock};
pub use crate::credentials::{Algorithm, Credentials, Key};
pub use crate::error::{Error, Result};
pub use crate::header::{Header, DEFAULT_KEYS};
pub use crate::mac::{Artifacts, Mac, MacType};
pub use crate::payload::PayloadHasher;
pub use crate::request::{RawRequest, Request, RequestOptions};
pub use crate::server::{
    AuthenticateOptions, Authenticated, BewitAuthenticated, CredentialsResolver, NonceValidator,
    ResponseHeaderOptions, Server,
};
