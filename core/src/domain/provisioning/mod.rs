//! Port to the external provisioning service that pushes configuration to
//! physical devices. This layer only shapes payloads; device templates and
//! firmware concerns stay on the provisioning side.

use serde::{Deserialize, Serialize};

use crate::domain::common::entities::app_errors::DaoError;

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Device {
    pub id: String,
    pub mac: Option<String>,
    pub vendor: Option<String>,
    pub model: Option<String>,
    pub version: Option<String>,
    pub configured: bool,
}

/// What a device needs to register one line key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineProvisioning {
    pub position: i32,
    pub display_name: String,
    pub number: Option<String>,
    pub auth_username: Option<String>,
}

#[cfg_attr(test, mockall::automock)]
pub trait ProvisioningClient: Send + Sync {
    fn get_device(&self, device_id: String) -> impl Future<Output = Result<Device, DaoError>> + Send;

    fn update_device(&self, device: Device) -> impl Future<Output = Result<(), DaoError>> + Send;

    fn assign_line(
        &self,
        device_id: String,
        line: LineProvisioning,
    ) -> impl Future<Output = Result<(), DaoError>> + Send;

    fn remove_line(
        &self,
        device_id: String,
        position: i32,
    ) -> impl Future<Output = Result<(), DaoError>> + Send;

    /// Wipe the device configuration and put it back in autoprov mode.
    fn reset_to_autoprov(&self, device_id: String)
    -> impl Future<Output = Result<(), DaoError>> + Send;
}
