use std::future::Future;
use std::time::Duration;

use folio_core::EndpointResponse;
use reqwest::header::ACCEPT;

use crate::error::{Result, TransportError};

/// Form-encoded body: `(key, value)` pairs in send order.
pub type FormBody = Vec<(&'static str, String)>;

/// One-shot delivery of a form body to the contact endpoint.
pub trait Transport {
    fn send(
        &self,
        body: FormBody,
    ) -> impl Future<Output = std::result::Result<EndpointResponse, TransportError>> + Send;
}

/// POSTs the form to a fixed URL and decodes the JSON answer.
///
/// The HTTP status is not inspected: the endpoint reports rejection through
/// `success: false` in the body, and any body that does not decode counts as
/// a transport failure.
#[derive(Clone, Debug)]
pub struct HttpTransport {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpTransport {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl Transport for HttpTransport {
    fn send(
        &self,
        body: FormBody,
    ) -> impl Future<Output = std::result::Result<EndpointResponse, TransportError>> + Send {
        let request = self
            .client
            .post(&self.endpoint)
            .header(ACCEPT, "application/json")
            .form(&body);
        let endpoint = self.endpoint.clone();
        async move {
            let response = request.send().await?;
            tracing::debug!(status = %response.status(), "{endpoint} responded");
            Ok(response.json::<EndpointResponse>().await?)
        }
    }
}
