use reqwest::blocking::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;
use url::Url;

use crate::client::error::ClientError;
use crate::client::query::RecordPredicate;
use crate::domain::{FieldDataInput, FieldDataRecord, RecordId};

/// The five operations of the field-data adapter, as seen from a view.
pub trait FieldDataApi {
    fn list(&self) -> Result<Vec<FieldDataRecord>, ClientError>;
    fn get(&self, id: &RecordId) -> Result<FieldDataRecord, ClientError>;
    fn create(&self, input: &FieldDataInput) -> Result<FieldDataRecord, ClientError>;
    fn update(&self, id: &RecordId, input: &FieldDataInput)
        -> Result<FieldDataRecord, ClientError>;
    /// Returns the server's confirmation message.
    fn delete(&self, id: &RecordId) -> Result<String, ClientError>;

    /// Fetch the full collection and keep what `predicate` accepts, in server order.
    fn list_where<P>(&self, predicate: &P) -> Result<Vec<FieldDataRecord>, ClientError>
    where
        P: RecordPredicate + ?Sized,
        Self: Sized,
    {
        Ok(self
            .list()?
            .into_iter()
            .filter(|r| predicate.matches(r))
            .collect())
    }
}

#[derive(Deserialize)]
struct ErrorBody {
    error: String,
}

#[derive(Deserialize)]
struct Confirmation {
    message: String,
}

/// Blocking HTTP implementation of [`FieldDataApi`].
pub struct FieldDataClient {
    http: Client,
    base: Url,
}

impl FieldDataClient {
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        Self::with_timeout(base_url, Self::DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(base_url: &str, timeout: Duration) -> Result<Self, ClientError> {
        let mut base =
            Url::parse(base_url).map_err(|e| ClientError::InvalidUrl(format!("{base_url}: {e}")))?;
        if base.cannot_be_a_base() {
            return Err(ClientError::InvalidUrl(base_url.to_string()));
        }
        // join() would otherwise drop the last path segment
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }

        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ClientError::Network(e.to_string()))?;

        Ok(Self { http, base })
    }

    fn url(&self, path: &str) -> Result<Url, ClientError> {
        self.base
            .join(path)
            .map_err(|e| ClientError::InvalidUrl(format!("{path}: {e}")))
    }

    fn record_url(&self, id: &RecordId) -> Result<Url, ClientError> {
        self.url(&format!("api/field-data/{id}"))
    }

    fn send<T: DeserializeOwned>(&self, req: RequestBuilder) -> Result<T, ClientError> {
        let resp = req
            .send()
            .map_err(|e| ClientError::Network(e.to_string()))?;

        let status = resp.status();
        debug!(status = status.as_u16(), url = %resp.url(), "field data response");

        if !status.is_success() {
            let fallback = status.canonical_reason().unwrap_or("request failed").to_string();
            let message = resp
                .json::<ErrorBody>()
                .map(|b| b.error)
                .unwrap_or(fallback);
            return Err(ClientError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        resp.json::<T>()
            .map_err(|e| ClientError::Decode(e.to_string()))
    }
}

impl FieldDataApi for FieldDataClient {
    fn list(&self) -> Result<Vec<FieldDataRecord>, ClientError> {
        self.send(self.http.get(self.url("api/field-data")?))
    }

    fn get(&self, id: &RecordId) -> Result<FieldDataRecord, ClientError> {
        self.send(self.http.get(self.record_url(id)?))
    }

    fn create(&self, input: &FieldDataInput) -> Result<FieldDataRecord, ClientError> {
        self.send(self.http.post(self.url("api/field-data")?).json(input))
    }

    fn update(
        &self,
        id: &RecordId,
        input: &FieldDataInput,
    ) -> Result<FieldDataRecord, ClientError> {
        self.send(self.http.put(self.record_url(id)?).json(input))
    }

    fn delete(&self, id: &RecordId) -> Result<String, ClientError> {
        let confirmation: Confirmation = self.send(self.http.delete(self.record_url(id)?))?;
        Ok(confirmation.message)
    }
}
