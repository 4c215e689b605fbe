use anyhow::{Context, Result};
use async_trait::async_trait;
use reship_core::order::{Order, RemoteStatus};
use reship_engine::{AuthError, LocateOutcome, PortError, RemoteAdminPort, Session, StageAction};
use serde::Deserialize;
use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// On-disk shape of a remote state snapshot
#[derive(Debug, Deserialize)]
pub struct Snapshot {
    /// order id to current remote status
    pub orders: HashMap<String, String>,
    /// Status an order moves to once its pickup is confirmed, so a later
    /// tracking pass sees the portal's follow-up state
    #[serde(default)]
    pub after_pickup: Option<String>,
}

/// Remote admin backed by a JSON snapshot of portal state
///
/// Lets a run be exercised end to end without a browser: statuses come from
/// the snapshot, actions mutate it in memory, and every applied action is
/// kept for inspection. Real portal adapters implement the same trait out
/// of tree.
pub struct SnapshotPort {
    statuses: HashMap<String, RemoteStatus>,
    after_pickup: Option<RemoteStatus>,
    applied: Vec<(String, StageAction)>,
}

impl SnapshotPort {
    pub fn from_file(path: &Path) -> Result<Self> {
        tracing::debug!("Reading remote snapshot from: {}", path.display());

        let file = File::open(path)
            .with_context(|| format!("Failed to open remote snapshot: {}", path.display()))?;
        let snapshot: Snapshot = serde_json::from_reader(BufReader::new(file))
            .with_context(|| format!("Failed to parse remote snapshot: {}", path.display()))?;

        Ok(Self::from_snapshot(snapshot))
    }

    pub fn from_snapshot(snapshot: Snapshot) -> Self {
        Self {
            statuses: snapshot
                .orders
                .into_iter()
                .map(|(id, status)| (id, RemoteStatus::new(status)))
                .collect(),
            after_pickup: snapshot.after_pickup.map(RemoteStatus::new),
            applied: Vec::new(),
        }
    }

    /// Actions applied so far, in order
    pub fn applied(&self) -> &[(String, StageAction)] {
        &self.applied
    }
}

#[async_trait]
impl RemoteAdminPort for SnapshotPort {
    async fn authenticate(&mut self) -> std::result::Result<Session, AuthError> {
        Ok(Session::new("snapshot"))
    }

    async fn locate_order(
        &mut self,
        _session: &Session,
        order_id: &str,
    ) -> std::result::Result<LocateOutcome, PortError> {
        Ok(match self.statuses.get(order_id) {
            Some(status) => LocateOutcome::Found(status.clone()),
            None => LocateOutcome::NotFound,
        })
    }

    async fn apply_action(
        &mut self,
        _session: &Session,
        order: &Order,
        action: &StageAction,
    ) -> std::result::Result<(), PortError> {
        self.applied.push((order.order_id.clone(), action.clone()));

        if let (StageAction::ConfirmPickup, Some(next)) = (action, &self.after_pickup) {
            self.statuses.insert(order.order_id.clone(), next.clone());
        }

        Ok(())
    }
}
