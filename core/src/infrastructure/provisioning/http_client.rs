use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::domain::common::ProvisioningConfig;
use crate::domain::common::entities::app_errors::DaoError;
use crate::domain::provisioning::{Device, LineProvisioning, ProvisioningClient};

#[derive(Debug, Clone)]
pub struct HttpProvisioningClient {
    base_url: String,
    token: String,
    client: Client,
}

#[derive(Debug, Serialize, Deserialize)]
struct DevicePayload {
    id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    mac: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    vendor: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    version: Option<String>,
    #[serde(default)]
    configured: bool,
}

#[derive(Debug, Serialize)]
struct LinePayload {
    display_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    auth_username: Option<String>,
}

impl From<DevicePayload> for Device {
    fn from(payload: DevicePayload) -> Self {
        Device {
            id: payload.id,
            mac: payload.mac,
            vendor: payload.vendor,
            model: payload.model,
            version: payload.version,
            configured: payload.configured,
        }
    }
}

impl From<&Device> for DevicePayload {
    fn from(device: &Device) -> Self {
        DevicePayload {
            id: device.id.clone(),
            mac: device.mac.clone(),
            vendor: device.vendor.clone(),
            model: device.model.clone(),
            version: device.version.clone(),
            configured: device.configured,
        }
    }
}

impl From<&LineProvisioning> for LinePayload {
    fn from(line: &LineProvisioning) -> Self {
        LinePayload {
            display_name: line.display_name.clone(),
            number: line.number.clone(),
            auth_username: line.auth_username.clone(),
        }
    }
}

impl HttpProvisioningClient {
    pub fn new(config: &ProvisioningConfig) -> Self {
        Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            token: config.token.clone(),
            client: Client::new(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn check(&self, response: reqwest::Response) -> Result<reqwest::Response, DaoError> {
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            tracing::error!("provisioning request failed: {} - {}", status, body);
            return Err(DaoError::ExternalService(format!(
                "provisioning returned {status}: {body}"
            )));
        }
        Ok(response)
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<reqwest::Response, DaoError> {
        let response = request
            .header("X-Auth-Token", &self.token)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("provisioning request failed: {}", e);
                DaoError::ExternalService(format!("provisioning unreachable: {e}"))
            })?;
        self.check(response).await
    }
}

impl ProvisioningClient for HttpProvisioningClient {
    async fn get_device(&self, device_id: String) -> Result<Device, DaoError> {
        let url = self.url(&format!("/devices/{device_id}"));
        let response = self.send(self.client.get(&url)).await?;
        let payload: DevicePayload = response.json().await.map_err(|e| {
            tracing::error!("failed to parse device {}: {}", device_id, e);
            DaoError::ExternalService(format!("unreadable device payload: {e}"))
        })?;
        Ok(payload.into())
    }

    async fn update_device(&self, device: Device) -> Result<(), DaoError> {
        let url = self.url(&format!("/devices/{}", device.id));
        let payload = DevicePayload::from(&device);
        self.send(self.client.put(&url).json(&payload)).await?;
        Ok(())
    }

    async fn assign_line(&self, device_id: String, line: LineProvisioning) -> Result<(), DaoError> {
        let url = self.url(&format!("/devices/{}/lines/{}", device_id, line.position));
        let payload = LinePayload::from(&line);
        self.send(self.client.put(&url).json(&payload)).await?;
        Ok(())
    }

    async fn remove_line(&self, device_id: String, position: i32) -> Result<(), DaoError> {
        let url = self.url(&format!("/devices/{device_id}/lines/{position}"));
        self.send(self.client.delete(&url)).await?;
        Ok(())
    }

    async fn reset_to_autoprov(&self, device_id: String) -> Result<(), DaoError> {
        let url = self.url(&format!("/devices/{device_id}/autoprov"));
        self.send(self.client.post(&url)).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_line_payload_shape() {
        let line = LineProvisioning {
            position: 1,
            display_name: "John Doe".to_string(),
            number: Some("1000".to_string()),
            auth_username: None,
        };
        let payload = serde_json::to_value(LinePayload::from(&line)).unwrap();
        assert_eq!(
            payload,
            json!({"display_name": "John Doe", "number": "1000"})
        );
    }

    #[test]
    fn test_device_payload_round_trip() {
        let device = Device {
            id: "d1".to_string(),
            mac: Some("00:11:22:33:44:55".to_string()),
            vendor: None,
            model: None,
            version: None,
            configured: true,
        };
        let payload = serde_json::to_value(DevicePayload::from(&device)).unwrap();
        assert_eq!(
            payload,
            json!({"id": "d1", "mac": "00:11:22:33:44:55", "configured": true})
        );

        let parsed: DevicePayload = serde_json::from_value(payload).unwrap();
        assert_eq!(Device::from(parsed), device);
    }
}
