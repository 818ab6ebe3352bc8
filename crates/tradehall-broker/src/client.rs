use std::sync::Arc;

use reqwest::{Client, Method, Request, Url};
use tracing::{debug, warn};

use tradehall_signer::{ParamValue, RequestSigner, SignError, SignableParams, SignatureResult};

use crate::error::BrokerError;
use crate::profile::{BrokerProfile, SignaturePlacement};

/// Characters that would change how a broker splits or decodes the query.
const QUERY_DELIMITERS: &[char] = &['&', '=', '+', '#', '%'];

/// Signs params and issues requests against one broker.
#[derive(Clone)]
pub struct BrokerClient {
    http: Client,
    profile: BrokerProfile,
    signer: Arc<dyn RequestSigner>,
}

impl BrokerClient {
    pub fn new(profile: BrokerProfile, signer: Arc<dyn RequestSigner>) -> Self {
        Self { http: Client::new(), profile, signer }
    }

    /// Share a connection pool with other clients.
    pub fn with_http(mut self, http: Client) -> Self {
        self.http = http;
        self
    }

    pub fn profile(&self) -> &BrokerProfile {
        &self.profile
    }

    pub fn signer(&self) -> &Arc<dyn RequestSigner> {
        &self.signer
    }

    /// Endpoint url whose query is the signed canonical string, followed by the
    /// signature when the profile places it in the query.
    ///
    /// The canonical string is sent verbatim so the broker sees the exact bytes
    /// that were signed; only the appended signature is form-encoded. Keys and
    /// text values containing `&`, `=`, `+`, `#` or `%` are rejected, since the
    /// broker would parse a different parameter set than the one signed.
    pub fn signed_url(
        &self,
        path: &str,
        params: &SignableParams,
    ) -> Result<(Url, SignatureResult), BrokerError> {
        check_query_safe(params)?;
        let signature = self.signer.sign(params)?;

        let mut url = self.profile.endpoint(path);
        if !signature.canonical.is_empty() {
            url.set_query(Some(signature.canonical.as_str()));
        }
        if let SignaturePlacement::Query { field } = &self.profile.placement {
            url.query_pairs_mut().append_pair(field, &signature.signature);
        }

        Ok((url, signature))
    }

    /// Build a signed request without sending it.
    pub fn build(
        &self,
        method: Method,
        path: &str,
        params: &SignableParams,
    ) -> Result<(Request, SignatureResult), BrokerError> {
        let (url, signature) = self.signed_url(path, params)?;

        let mut request = self.http.request(method, url);
        if let Some(api_key) = &self.profile.api_key {
            request = request.header(self.profile.api_key_header.as_str(), api_key.as_str());
        }
        if let SignaturePlacement::Header { name } = &self.profile.placement {
            request = request.header(name.as_str(), signature.signature.as_str());
        }

        Ok((request.build()?, signature))
    }

    /// Sign, send, and decode a JSON response. No retries.
    pub async fn send(
        &self,
        method: Method,
        path: &str,
        params: &SignableParams,
    ) -> Result<serde_json::Value, BrokerError> {
        let (request, signature) = self.build(method, path, params)?;

        debug!(
            broker = %self.profile.name,
            method = %request.method(),
            path = request.url().path(),
            scheme = %signature.scheme,
            "sending signed broker request",
        );

        let response = self.http.execute(request).await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(broker = %self.profile.name, status = status.as_u16(), "broker rejected request");
            return Err(BrokerError::Status { status: status.as_u16(), body });
        }

        Ok(response.json::<serde_json::Value>().await?)
    }
}

fn check_query_safe(params: &SignableParams) -> Result<(), SignError> {
    for (key, value) in params.iter() {
        let Some(value) = value else { continue };
        if key.contains(QUERY_DELIMITERS) {
            return Err(SignError::Validation {
                field: key.to_string(),
                reason: "key contains a query delimiter".into(),
            });
        }
        if let ParamValue::Text(text) = value {
            if text.contains(QUERY_DELIMITERS) {
                return Err(SignError::Validation {
                    field: key.to_string(),
                    reason: "value contains a query delimiter (& = + # %)".into(),
                });
            }
        }
    }
    Ok(())
}
