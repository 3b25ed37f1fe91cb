//! Request transport
//!
//! The client never talks HTTP directly: it hands a [`Request`] to a
//! [`Transport`] and inspects the returned status and body. [`HttpTransport`]
//! is the production implementation; tests substitute in-memory gateways.

pub mod http;

pub use http::HttpTransport;

use crate::common::{Error, Result, TransportError};
use std::fmt;
use std::io::{Read, Write};
use std::path::PathBuf;

const COPY_BUFFER_SIZE: usize = 64 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Put,
    Delete,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Method::Get => write!(f, "GET"),
            Method::Put => write!(f, "PUT"),
            Method::Delete => write!(f, "DELETE"),
        }
    }
}

/// Request body. Files are referenced by path so a transport can re-open
/// them when it has to re-send (redirects).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    Empty,
    File(PathBuf),
}

#[derive(Debug, Clone)]
pub struct Request {
    pub method: Method,
    pub url: String,
    pub payload: Payload,
}

impl Request {
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            payload: Payload::Empty,
        }
    }

    pub fn with_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.payload = Payload::File(path.into());
        self
    }
}

/// Status code plus a streaming body
pub struct Response {
    status: u16,
    body: Box<dyn Read>,
}

impl Response {
    pub fn new(status: u16, body: impl Read + 'static) -> Self {
        Self {
            status,
            body: Box::new(body),
        }
    }

    pub fn from_bytes(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self::new(status, std::io::Cursor::new(body.into()))
    }

    pub fn status(&self) -> u16 {
        self.status
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn is_not_found(&self) -> bool {
        self.status == 404
    }

    /// Drain the body into memory
    pub fn into_bytes(mut self, url: &str) -> std::result::Result<Vec<u8>, TransportError> {
        let mut buf = Vec::new();
        self.body
            .read_to_end(&mut buf)
            .map_err(|e| TransportError::Body {
                url: url.to_string(),
                reason: e.to_string(),
            })?;
        Ok(buf)
    }

    /// Stream the body into `writer`. Read failures are transport errors,
    /// write failures are local I/O errors.
    pub fn copy_to(mut self, url: &str, writer: &mut impl Write) -> Result<u64> {
        let mut buf = vec![0u8; COPY_BUFFER_SIZE];
        let mut total = 0u64;
        loop {
            let n = match self.body.read(&mut buf) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    return Err(Error::Transport(TransportError::Body {
                        url: url.to_string(),
                        reason: e.to_string(),
                    }))
                }
            };
            writer.write_all(&buf[..n])?;
            total += n as u64;
        }
        writer.flush()?;
        Ok(total)
    }
}

impl fmt::Debug for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Response")
            .field("status", &self.status)
            .finish_non_exhaustive()
    }
}

/// Sends one request and returns whatever the gateway answered.
///
/// A non-success status is still `Ok`: interpreting it is the caller's job.
/// `Err` means no answer was obtained at all.
pub trait Transport {
    fn send(&self, request: &Request) -> std::result::Result<Response, TransportError>;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn send(&self, request: &Request) -> std::result::Result<Response, TransportError> {
        (**self).send(request)
    }
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn send(&self, request: &Request) -> std::result::Result<Response, TransportError> {
        (**self).send(request)
    }
}
