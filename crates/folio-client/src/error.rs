use std::fmt;

use folio_core::FolioError;

/// Why a request produced no usable endpoint response.
#[derive(Debug)]
pub enum TransportError {
    /// Connection, timeout, HTTP status or body decoding failure.
    Request(reqwest::Error),
    /// A relative resource locator with no base URL to resolve it against.
    InvalidUrl(String),
    /// Transport unavailable for a reason outside reqwest (used by stand-ins).
    Unavailable(String),
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportError::Request(e) if e.is_timeout() => write!(f, "request timed out: {e}"),
            TransportError::Request(e) if e.is_decode() => {
                write!(f, "unreadable response body: {e}")
            }
            TransportError::Request(e) => write!(f, "request failed: {e}"),
            TransportError::InvalidUrl(url) => write!(f, "cannot resolve resource url {url:?}"),
            TransportError::Unavailable(msg) => write!(f, "transport unavailable: {msg}"),
        }
    }
}

impl std::error::Error for TransportError {}

impl From<reqwest::Error> for TransportError {
    fn from(e: reqwest::Error) -> Self {
        TransportError::Request(e)
    }
}

#[derive(Debug)]
pub enum ClientError {
    /// The form failed required-field validation; nothing was sent.
    InvalidForm(FolioError),
    /// The controller was disposed before or during the call.
    Disposed,
    /// HTTP client construction failed.
    Http(reqwest::Error),
    Config(String),
    Io(std::io::Error),
    Toml(toml::de::Error),
    TomlWrite(toml::ser::Error),
}

impl fmt::Display for ClientError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClientError::InvalidForm(e) => write!(f, "invalid form: {e}"),
            ClientError::Disposed => write!(f, "controller has been disposed"),
            ClientError::Http(e) => write!(f, "HTTP client error: {e}"),
            ClientError::Config(msg) => write!(f, "invalid config: {msg}"),
            ClientError::Io(e) => write!(f, "I/O error: {e}"),
            ClientError::Toml(e) => write!(f, "TOML parse error: {e}"),
            ClientError::TomlWrite(e) => write!(f, "TOML write error: {e}"),
        }
    }
}

impl std::error::Error for ClientError {}

impl From<FolioError> for ClientError {
    fn from(e: FolioError) -> Self {
        ClientError::InvalidForm(e)
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(e: reqwest::Error) -> Self {
        ClientError::Http(e)
    }
}

impl From<std::io::Error> for ClientError {
    fn from(e: std::io::Error) -> Self {
        ClientError::Io(e)
    }
}

impl From<toml::de::Error> for ClientError {
    fn from(e: toml::de::Error) -> Self {
        ClientError::Toml(e)
    }
}

impl From<toml::ser::Error> for ClientError {
    fn from(e: toml::ser::Error) -> Self {
        ClientError::TomlWrite(e)
    }
}

pub type Result<T> = std::result::Result<T, ClientError>;
