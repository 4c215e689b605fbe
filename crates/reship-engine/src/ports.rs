use crate::error::{AuthError, PortError};
use async_trait::async_trait;
use reship_core::order::{Order, RemoteStatus};

/// Opaque handle to an authenticated remote admin session
///
/// One session per run, exclusively owned by the run driver; never shared
/// across runs or orders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    id: String,
}

impl Session {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }

    pub fn id(&self) -> &str {
        &self.id
    }
}

/// Result of searching the remote admin for an order
///
/// NotFound is a value, not an error: a status row may legitimately not
/// exist yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LocateOutcome {
    Found(RemoteStatus),
    NotFound,
}

/// The status-specific action sequence to replay against the portal
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StageAction {
    /// Mark the customer's item as collected
    ConfirmPickup,
    /// Select the carrier and submit the replacement's tracking number
    SubmitTracking {
        carrier: String,
        tracking_number: String,
    },
}

/// Capability set the engine needs from a portal
///
/// This is the only surface the engine talks to. Implementations own every
/// portal-specific concern: login flow (including one-time-code challenges
/// and transient dialog dismissal), element location, and bounded waits.
/// The engine never sees any of it.
#[async_trait]
pub trait RemoteAdminPort {
    /// Perform the portal's full login flow
    async fn authenticate(&mut self) -> std::result::Result<Session, AuthError>;

    /// Search for an order and read its status
    async fn locate_order(
        &mut self,
        session: &Session,
        order_id: &str,
    ) -> std::result::Result<LocateOutcome, PortError>;

    /// Execute the action sequence for one order
    async fn apply_action(
        &mut self,
        session: &Session,
        order: &Order,
        action: &StageAction,
    ) -> std::result::Result<(), PortError>;
}
