//! A concrete `CloudAdapter` backed by a generic JSON/REST IaaS control
//! plane, reached over `reqwest`. Real deployments are expected to swap
//! this out per-provider; it exists so the daemon has at least one
//! non-mock adapter to select at startup.

use super::adapter::CloudAdapter;
use super::error::CloudError;
use super::types::{CloudHandle, PowerState};
use fleetward_core::config::RawConfig;
use serde::Deserialize;

/// Adapter for an IaaS control plane exposing:
/// - `GET  {base_url}/instances/{id}`            -> [`InstanceDoc`]
/// - `POST {base_url}/instances/{id}/reboot`
/// - `POST {base_url}/instances/{id}/terminate`  (body: `{"spot_request_id": ...}`)
/// - `GET  {base_url}/user-data`                 -> arbitrary TOML document
#[derive(Debug)]
pub struct HttpCloudAdapter {
    client: reqwest::Client,
    base_url: String,
}

impl HttpCloudAdapter {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }

    fn instance_url(&self, id: &str) -> String {
        format!("{}/instances/{id}", self.base_url)
    }
}

#[derive(Debug, Deserialize)]
struct InstanceDoc {
    id: String,
    state: String,
    #[serde(default)]
    spot_request_id: Option<String>,
}

impl CloudAdapter for HttpCloudAdapter {
    async fn resolve(&self, id: &str) -> Result<CloudHandle, CloudError> {
        let response = self
            .client
            .get(self.instance_url(id))
            .send()
            .await
            .map_err(|e| CloudError::Lookup {
                id: id.to_string(),
                message: e.to_string(),
            })?;

        if !response.status().is_success() {
            return Err(CloudError::Lookup {
                id: id.to_string(),
                message: format!("provider returned status {}", response.status()),
            });
        }

        let doc: InstanceDoc = response.json().await.map_err(|e| CloudError::Lookup {
            id: id.to_string(),
            message: e.to_string(),
        })?;

        let mut handle = CloudHandle::new(doc.id);
        if let Some(spot_request_id) = doc.spot_request_id {
            handle = handle.with_spot_request(spot_request_id);
        }
        Ok(handle)
    }

    async fn state_of(&self, handle: &CloudHandle) -> PowerState {
        match self
            .client
            .get(self.instance_url(&handle.id))
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
        {
            Ok(response) => match response.json::<InstanceDoc>().await {
                Ok(doc) => PowerState::parse(&doc.state),
                Err(e) => {
                    tracing::warn!(instance_id = %handle.id, error = %e, "failed to parse instance state response");
                    PowerState::Other("UNKNOWN".to_string())
                }
            },
            Err(e) => {
                tracing::warn!(instance_id = %handle.id, error = %e, "failed to fetch instance state");
                PowerState::Other("UNKNOWN".to_string())
            }
        }
    }

    async fn reboot(&self, handle: &CloudHandle) {
        let url = format!("{}/reboot", self.instance_url(&handle.id));
        if let Err(e) = self.client.post(url).send().await {
            tracing::warn!(instance_id = %handle.id, error = %e, "reboot request failed");
        }
    }

    async fn terminate(&self, id: &str, spot_request_id: Option<&str>) -> bool {
        let url = format!("{}/terminate", self.instance_url(id));
        let body = serde_json::json!({ "spot_request_id": spot_request_id });

        match self.client.post(url).json(&body).send().await {
            Ok(response) => response.status().is_success(),
            Err(e) => {
                tracing::warn!(instance_id = %id, error = %e, "terminate request failed");
                false
            }
        }
    }

    async fn user_data(&self) -> Result<RawConfig, CloudError> {
        let url = format!("{}/user-data", self.base_url);
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| CloudError::Lookup {
                id: "user-data".to_string(),
                message: e.to_string(),
            })?;

        let body = response.text().await.map_err(|e| CloudError::Lookup {
            id: "user-data".to_string(),
            message: e.to_string(),
        })?;

        RawConfig::from_toml_str(&body).map_err(|e| CloudError::Lookup {
            id: "user-data".to_string(),
            message: e.to_string(),
        })
    }

    fn provider_name(&self) -> &str {
        "HttpCloudAdapter"
    }
}
