use crate::error::{Error, Result};

const MAX_HOST_HEADER_LENGTH: usize = 4096;

/// A neutral description of an incoming HTTP request, as the host framework
/// sees it: the method, the request-target (path plus optional `?query`),
/// transport-level host/port hints, and the raw header list.
#[derive(Clone, Copy, Debug, Default)]
pub struct RawRequest<'a> {
    pub method: &'a str,
    pub url: &'a str,
    pub host: Option<&'a str>,
    pub port: Option<u16>,
    pub headers: &'a [(&'a str, &'a str)],
}

/// Options for building a [`Request`] view.
#[derive(Clone, Debug, Default)]
pub struct RequestOptions {
    /// Read this header instead of `Host`.
    pub host_header_name: Option<String>,
    /// Use this host, ignoring the header.
    pub host: Option<String>,
    /// Use this port, ignoring the header.
    pub port: Option<u16>,
}

/// The normalized view of a request that feeds server-side authentication.
#[derive(Clone, Debug)]
pub struct Request {
    pub method: String,
    pub resource: String,
    pub host: String,
    pub port: u16,
    pub authorization: Option<String>,
    pub content_type: Option<String>,
}

impl Request {
    /// Normalize a raw request.
    ///
    /// The effective host and port come from, in order of preference: the
    /// options overrides, the `Host` header (or its configured replacement),
    /// and the transport hints.  A request that yields no host or no port
    /// from any source is rejected, as is a malformed header.
    pub fn new(raw: &RawRequest, options: &RequestOptions) -> Result<Request> {
        let authorization = header_value(raw.headers, "authorization").map(str::to_string);
        let content_type = header_value(raw.headers, "content-type").map(parse_content_type);

        let (header_host, header_port) =
            if options.host.is_some() && options.port.is_some() {
                (None, None)
            } else {
                let name = options.host_header_name.as_deref().unwrap_or("host");
                match header_value(raw.headers, name) {
                    Some(value) if !value.is_empty() => {
                        let (host, port) = parse_host(value)?;
                        (Some(host), port)
                    }
                    _ => (None, None),
                }
            };

        let host = options
            .host
            .clone()
            .or(header_host)
            .or_else(|| raw.host.map(str::to_string))
            .ok_or(Error::InvalidHostHeader)?;
        let port = options
            .port
            .or(header_port)
            .or(raw.port)
            .ok_or(Error::InvalidHostHeader)?;

        Ok(Request {
            method: raw.method.to_string(),
            resource: raw.url.to_string(),
            host,
            port,
            authorization,
            content_type,
        })
    }
}

/// Parse a `Host` header value into a host and optional port.
///
/// This is a character-class scan, not a URI parser: hostnames are letters,
/// digits, `.` and `-`; IPv6 literals are bracketed and may contain `:` only
/// inside the brackets; the port, when present, is a non-empty decimal no
/// greater than 65535.
fn parse_host(header: &str) -> Result<(String, Option<u16>)> {
    if header.len() > MAX_HOST_HEADER_LENGTH {
        return Err(Error::InvalidHostHeader);
    }

    let host_end = if header.starts_with('[') {
        match header.find(']') {
            Some(end) if end > 1 => end + 1,
            _ => return Err(Error::InvalidHostHeader),
        }
    } else {
        header
            .find(|c: char| !is_host_char(c))
            .unwrap_or_else(|| header.len())
    };
    if host_end == 0 {
        return Err(Error::InvalidHostHeader);
    }
    let host = &header[..host_end];

    let rest = &header[host_end..];
    let port = if rest.is_empty() {
        None
    } else if let Some(port_str) = rest.strip_prefix(':') {
        if port_str.is_empty() || !port_str.bytes().all(|b| b.is_ascii_digit()) {
            return Err(Error::InvalidHostHeader);
        }
        let port: u32 = port_str.parse().map_err(|_| Error::InvalidHostHeader)?;
        if port > 65535 {
            return Err(Error::InvalidHostHeader);
        }
        Some(port as u16)
    } else {
        return Err(Error::InvalidHostHeader);
    };

    Ok((host.to_string(), port))
}

fn is_host_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '.' || c == '-'
}

fn parse_content_type(header: &str) -> String {
    header.split(';').next().unwrap_or("").trim().to_string()
}

fn header_value<'a>(headers: &[(&'a str, &'a str)], name: &str) -> Option<&'a str> {
    headers
        .iter()
        .find(|(key, _)| key.eq_ignore_ascii_case(name))
        .map(|(_, value)| *value)
}
