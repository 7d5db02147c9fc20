//! Location service client using reqwest.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use tracing::{debug, instrument};

use equipstock_core::LocationId;
use equipstock_stock::LocationRef;

use super::{LocationError, LocationResolver};
use crate::config::LocationServiceConfig;

/// HTTP transport for the location service: `GET {base_url}/{id}`.
///
/// One request per call, no retries and no caching. A 404 is the only answer
/// treated as "does not exist"; everything else that is not a 2xx with a
/// decodable body is an outage.
#[derive(Debug, Clone)]
pub struct HttpLocationResolver {
    base_url: String,
    client: Client,
}

impl HttpLocationResolver {
    pub fn new(config: &LocationServiceConfig) -> Result<Self, LocationError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| LocationError::Unavailable(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    fn location_url(&self, id: LocationId) -> String {
        format!("{}/{}", self.base_url, id)
    }
}

#[async_trait]
impl LocationResolver for HttpLocationResolver {
    #[instrument(skip(self), fields(location_id = %id), err)]
    async fn resolve(&self, id: LocationId) -> Result<LocationRef, LocationError> {
        let url = self.location_url(id);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| LocationError::Unavailable(format!("request to {url} failed: {e}")))?;

        let status = response.status();
        debug!(%status, "location service answered");

        if status == StatusCode::NOT_FOUND {
            return Err(LocationError::NotFound(id));
        }
        if !status.is_success() {
            return Err(LocationError::Unavailable(format!(
                "location service returned {status} for location {id}"
            )));
        }

        let location: LocationRef = response.json().await.map_err(|e| {
            LocationError::Unavailable(format!("failed to parse location {id}: {e}"))
        })?;

        if location.id != id {
            return Err(LocationError::Unavailable(format!(
                "location service answered with location {} when asked for {id}",
                location.id
            )));
        }

        Ok(location)
    }
}
