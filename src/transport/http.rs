//! Blocking HTTP transport on reqwest

use crate::common::{Error, Result, TransportError};
use crate::transport::{Method, Payload, Request, Response, Transport};
use reqwest::blocking::{Body, Client, RequestBuilder};
use reqwest::header::{CONTENT_TYPE, LOCATION};
use std::fs::File;
use std::time::Duration;

/// WebHDFS answers CREATE and OPEN with a 307 to a datanode
const MAX_REDIRECTS: usize = 5;

pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .map_err(|e| Error::InvalidConfig(format!("cannot build HTTP client: {}", e)))?;
        Ok(Self { client })
    }

    fn builder(&self, method: Method, url: &str) -> RequestBuilder {
        match method {
            Method::Get => self.client.get(url),
            Method::Put => self.client.put(url),
            Method::Delete => self.client.delete(url),
        }
    }

    fn send_once(
        &self,
        method: Method,
        url: &str,
        payload: &Payload,
    ) -> std::result::Result<reqwest::blocking::Response, TransportError> {
        let mut builder = self.builder(method, url);
        if let Payload::File(path) = payload {
            let file = File::open(path).map_err(|e| TransportError::Request {
                url: url.to_string(),
                reason: format!("cannot open {}: {}", path.display(), e),
            })?;
            builder = builder
                .header(CONTENT_TYPE, "application/octet-stream")
                .body(Body::from(file));
        }
        builder.send().map_err(|e| TransportError::Request {
            url: url.to_string(),
            reason: e.to_string(),
        })
    }
}

impl Transport for HttpTransport {
    fn send(&self, request: &Request) -> std::result::Result<Response, TransportError> {
        let mut url = request.url.clone();
        for _ in 0..=MAX_REDIRECTS {
            let response = self.send_once(request.method, &url, &request.payload)?;
            let status = response.status();

            if status.is_redirection() {
                let location = response
                    .headers()
                    .get(LOCATION)
                    .and_then(|value| value.to_str().ok());
                if let Some(location) = location {
                    let next = response.url().join(location).map_err(|e| {
                        TransportError::Request {
                            url: url.clone(),
                            reason: format!("bad redirect target {:?}: {}", location, e),
                        }
                    })?;
                    tracing::debug!(from = %url, to = %next, "Following redirect");
                    url = next.to_string();
                    continue;
                }
            }

            return Ok(Response::new(status.as_u16(), response));
        }

        Err(TransportError::Redirects {
            url: request.url.clone(),
        })
    }
}
