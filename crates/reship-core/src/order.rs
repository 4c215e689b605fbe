use serde::{Deserialize, Serialize};
use std::fmt;

/// One exchange shipment to process
///
/// Built from the day's source snapshot at run start and immutable
/// afterwards; `tracking_number` may still be empty if the carrier has not
/// assigned one by the time the batch is built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    /// Business order number, unique within a batch
    pub order_id: String,
    /// Carrier tracking code to submit; may be empty until assigned
    pub tracking_number: String,
    /// Channel discriminator (e.g. "29CM", "Zigzag")
    pub channel: String,
}

impl Order {
    pub fn has_tracking(&self) -> bool {
        !self.tracking_number.trim().is_empty()
    }
}

/// Status text read back from a remote admin for an order
///
/// Deliberately opaque: portals word their statuses differently and add new
/// ones without notice, so this is never a closed enum. Channels classify a
/// status against their allow-list instead.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RemoteStatus(String);

impl RemoteStatus {
    pub fn new(status: impl Into<String>) -> Self {
        Self(status.into().trim().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RemoteStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RemoteStatus {
    fn from(status: &str) -> Self {
        Self::new(status)
    }
}
