//! Host endpoint descriptors.
//!
//! The host hands the runner the address it listens on. Neovim accepts both
//! filesystem socket paths and `host:port` pairs for `--listen`, so both
//! forms are parsed here alongside explicit `unix://` and `tcp://` URLs.

use std::fmt;
use std::str::FromStr;

use camino::{Utf8Path, Utf8PathBuf};
use thiserror::Error;
use url::Url;

/// Address of the host's RPC listener.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Endpoint {
    /// Unix domain socket endpoint.
    Unix {
        /// Filesystem path of the socket.
        path: Utf8PathBuf,
    },
    /// TCP socket endpoint.
    Tcp {
        /// Host name or IP address.
        host: String,
        /// TCP port.
        port: u16,
    },
}

impl Endpoint {
    /// Builds a Unix domain socket endpoint.
    #[must_use]
    pub fn unix(path: impl Into<Utf8PathBuf>) -> Self {
        Self::Unix { path: path.into() }
    }

    /// Builds a TCP socket endpoint.
    #[must_use]
    pub fn tcp(host: impl Into<String>, port: u16) -> Self {
        Self::Tcp {
            host: host.into(),
            port,
        }
    }

    /// Returns the Unix socket path when the endpoint uses the Unix transport.
    #[must_use]
    pub fn unix_path(&self) -> Option<&Utf8Path> {
        match self {
            Self::Unix { path } => Some(path.as_ref()),
            Self::Tcp { .. } => None,
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unix { path } => write!(formatter, "unix://{path}"),
            Self::Tcp { host, port } if host.contains(':') => {
                write!(formatter, "tcp://[{host}]:{port}")
            }
            Self::Tcp { host, port } => write!(formatter, "tcp://{host}:{port}"),
        }
    }
}

impl FromStr for Endpoint {
    type Err = EndpointParseError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(EndpointParseError::Empty);
        }
        if trimmed.contains("://") {
            return parse_url(trimmed);
        }
        if let Some((host, port)) = split_host_port(trimmed) {
            return Ok(Self::tcp(host, port));
        }
        Ok(Self::unix(trimmed))
    }
}

fn parse_url(input: &str) -> Result<Endpoint, EndpointParseError> {
    let url = Url::parse(input)?;
    match url.scheme() {
        "unix" => {
            let path = url.path();
            if path.is_empty() {
                return Err(EndpointParseError::MissingUnixPath(input.to_owned()));
            }
            Ok(Endpoint::unix(path))
        }
        "tcp" => {
            let host = url
                .host_str()
                .ok_or_else(|| EndpointParseError::MissingHost(input.to_owned()))?;
            let port = url
                .port()
                .ok_or_else(|| EndpointParseError::MissingPort(input.to_owned()))?;
            let host = host.trim_start_matches('[').trim_end_matches(']');
            Ok(Endpoint::tcp(host, port))
        }
        other => Err(EndpointParseError::UnsupportedScheme(other.to_owned())),
    }
}

/// Splits `host:port` (or `[v6]:port`) when the input cannot be a path.
fn split_host_port(input: &str) -> Option<(&str, u16)> {
    if input.contains('/') || input.contains('\\') {
        return None;
    }
    let (host, port) = input.rsplit_once(':')?;
    let port = port.parse::<u16>().ok()?;
    let host = host
        .strip_prefix('[')
        .and_then(|inner| inner.strip_suffix(']'))
        .unwrap_or(host);
    if host.is_empty() {
        return None;
    }
    Some((host, port))
}

/// Errors encountered while parsing an [`Endpoint`] from text.
#[derive(Debug, Error)]
pub enum EndpointParseError {
    /// No endpoint text was supplied.
    #[error("endpoint must not be empty")]
    Empty,
    /// Scheme was not recognised.
    #[error("unsupported endpoint scheme '{0}'")]
    UnsupportedScheme(String),
    /// TCP host name was missing.
    #[error("missing TCP host in '{0}'")]
    MissingHost(String),
    /// TCP port was missing from the address.
    #[error("missing TCP port in '{0}'")]
    MissingPort(String),
    /// Unix socket path was absent.
    #[error("missing Unix socket path in '{0}'")]
    MissingUnixPath(String),
    /// URL failed to parse.
    #[error(transparent)]
    Url(#[from] url::ParseError),
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("/run/user/1000/nvim.1234.0", Endpoint::unix("/run/user/1000/nvim.1234.0"))]
    #[case("unix:///tmp/nvim.sock", Endpoint::unix("/tmp/nvim.sock"))]
    #[case("127.0.0.1:6666", Endpoint::tcp("127.0.0.1", 6666))]
    #[case("localhost:7777", Endpoint::tcp("localhost", 7777))]
    #[case("[::1]:6666", Endpoint::tcp("::1", 6666))]
    #[case("tcp://127.0.0.1:9000", Endpoint::tcp("127.0.0.1", 9000))]
    #[case("nvim.sock", Endpoint::unix("nvim.sock"))]
    #[case("/tmp/odd:name", Endpoint::unix("/tmp/odd:name"))]
    fn parses_supported_forms(#[case] input: &str, #[case] expected: Endpoint) {
        let endpoint: Endpoint = input.parse().expect("endpoint should parse");
        assert_eq!(endpoint, expected);
    }

    #[rstest]
    fn rejects_empty_input() {
        let result = "   ".parse::<Endpoint>();
        assert!(matches!(result, Err(EndpointParseError::Empty)));
    }

    #[rstest]
    fn rejects_unknown_scheme() {
        let result = "http://localhost:80".parse::<Endpoint>();
        assert!(matches!(
            result,
            Err(EndpointParseError::UnsupportedScheme(scheme)) if scheme == "http"
        ));
    }

    #[rstest]
    fn rejects_tcp_url_without_port() {
        let result = "tcp://localhost".parse::<Endpoint>();
        assert!(matches!(result, Err(EndpointParseError::MissingPort(_))));
    }

    #[rstest]
    fn displays_url_forms() {
        assert_eq!(
            Endpoint::unix("/tmp/nvim.sock").to_string(),
            "unix:///tmp/nvim.sock"
        );
        assert_eq!(Endpoint::tcp("::1", 6666).to_string(), "tcp://[::1]:6666");
        assert_eq!(
            Endpoint::tcp("127.0.0.1", 6666).to_string(),
            "tcp://127.0.0.1:6666"
        );
    }
}
