use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::error::TransportError;

pub const SERVICE_UUID: &str = "0000ffe5-0000-1000-8000-00805f9a34fb";
/// read / notify
pub const NOTIFY_CHAR_UUID: &str = "0000ffe4-0000-1000-8000-00805f9a34fb";
pub const WRITE_CHAR_UUID: &str = "0000ffe9-0000-1000-8000-00805f9a34fb";

/// Notification payloads are pushed into this channel by the transport.
pub type NotifySink = mpsc::UnboundedSender<Vec<u8>>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceInfo {
    pub uuid: String,
    pub characteristics: Vec<String>,
}

impl ServiceInfo {
    pub fn has_characteristic(&self, uuid: &str) -> bool {
        self.characteristics
            .iter()
            .any(|c| c.eq_ignore_ascii_case(uuid))
    }
}

/// The radio link to one device. Scanning and pairing happen before a
/// transport is handed to a session.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn connect(&mut self) -> Result<(), TransportError>;

    async fn disconnect(&mut self) -> Result<(), TransportError>;

    async fn discover_services(&mut self) -> Result<Vec<ServiceInfo>, TransportError>;

    /// Start forwarding notifications from `characteristic` into `sink`.
    /// Chunks may be of any length, including zero.
    async fn subscribe_notify(
        &mut self,
        characteristic: &str,
        sink: NotifySink,
    ) -> Result<(), TransportError>;

    /// Stop notifications started by `subscribe_notify`. The sink is
    /// dropped.
    async fn unsubscribe_notify(&mut self, characteristic: &str) -> Result<(), TransportError>;

    /// Returns once the transport accepted the write. Says nothing about
    /// whether the device applied it.
    async fn write_characteristic(
        &mut self,
        characteristic: &str,
        data: &[u8],
    ) -> Result<(), TransportError>;

    fn is_connected(&self) -> bool;
}

/// Find the service by UUID, comparing case-insensitively.
pub fn find_service<'a>(services: &'a [ServiceInfo], uuid: &str) -> Option<&'a ServiceInfo> {
    services.iter().find(|s| s.uuid.eq_ignore_ascii_case(uuid))
}
