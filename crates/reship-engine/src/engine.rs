use crate::error::{EngineError, Result};
use crate::ports::{LocateOutcome, RemoteAdminPort, Session, StageAction};
use reship_core::batch::OrderBatch;
use reship_core::channel::{ChannelProfile, StageKind, StageProfile};
use reship_core::order::Order;
use reship_core::report::{OutcomeRecord, ResultKind, RunReport};

/// Drives a remote admin through the state transition each order in a batch
/// needs, strictly one order at a time, recording every outcome
pub struct SyncEngine {
    channel: ChannelProfile,
}

impl SyncEngine {
    pub fn new(channel: ChannelProfile) -> Self {
        Self { channel }
    }

    pub fn channel(&self) -> &ChannelProfile {
        &self.channel
    }

    /// Run the requested stages over the batch
    ///
    /// Authenticates once, then makes one pass per stage in order. A later
    /// pass re-locates and re-classifies every order instead of reusing an
    /// earlier pass's reading, because earlier actions change remote state.
    /// Stage kinds the channel does not define are skipped.
    ///
    /// The report is owned by the caller so a fatal abort still leaves the
    /// outcomes recorded so far in the caller's hands; orders never reached
    /// stay absent from it.
    pub async fn run<P>(
        &self,
        port: &mut P,
        batch: &OrderBatch,
        stages: &[StageKind],
        report: &mut RunReport,
    ) -> Result<()>
    where
        P: RemoteAdminPort + ?Sized,
    {
        if batch.is_empty() {
            tracing::info!("Nothing to do for {}: batch is empty", self.channel.name);
            return Ok(());
        }

        let session = port.authenticate().await?;
        tracing::info!(
            "Authenticated against {} (session {})",
            self.channel.name,
            session.id()
        );

        for kind in stages {
            let Some(stage) = self.channel.stage(*kind) else {
                tracing::debug!(
                    "Channel {} has no {} stage, skipping pass",
                    self.channel.name,
                    kind
                );
                continue;
            };

            self.run_stage(port, &session, batch, stage, report).await?;
        }

        Ok(())
    }

    async fn run_stage<P>(
        &self,
        port: &mut P,
        session: &Session,
        batch: &OrderBatch,
        stage: &StageProfile,
        report: &mut RunReport,
    ) -> Result<()>
    where
        P: RemoteAdminPort + ?Sized,
    {
        tracing::info!("Stage {}: {} orders to process", stage.kind, batch.len());

        for (idx, order) in batch.iter().enumerate() {
            tracing::info!(
                "[{}/{}] {} order {}",
                idx + 1,
                batch.len(),
                stage.kind,
                order.order_id
            );
            self.process_order(port, session, order, stage, report)
                .await?;
        }

        Ok(())
    }

    /// Locate, classify, act, record
    ///
    /// Only fatal errors escape; everything else folds into an outcome so
    /// the loop moves on to the next order.
    async fn process_order<P>(
        &self,
        port: &mut P,
        session: &Session,
        order: &Order,
        stage: &StageProfile,
        report: &mut RunReport,
    ) -> Result<()>
    where
        P: RemoteAdminPort + ?Sized,
    {
        let status = match port.locate_order(session, &order.order_id).await {
            Ok(LocateOutcome::Found(status)) => status,
            Ok(LocateOutcome::NotFound) => {
                tracing::warn!("No remote record for {}, moving on", order.order_id);
                report.record(OutcomeRecord {
                    order_id: order.order_id.clone(),
                    stage: stage.kind,
                    kind: ResultKind::NotFound,
                    detail: "no matching remote record".to_string(),
                });
                return Ok(());
            }
            Err(err) if err.is_fatal() => return Err(EngineError::Fatal(err.to_string())),
            Err(err) => {
                report.record(OutcomeRecord {
                    order_id: order.order_id.clone(),
                    stage: stage.kind,
                    kind: ResultKind::Failed,
                    detail: err.to_string(),
                });
                return Ok(());
            }
        };

        if !stage.is_eligible(&status) {
            tracing::info!(
                "Status '{}' not actionable for {}, skipping {}",
                status,
                stage.kind,
                order.order_id
            );
            report.record(OutcomeRecord {
                order_id: order.order_id.clone(),
                stage: stage.kind,
                kind: ResultKind::Skipped,
                detail: status.to_string(),
            });
            return Ok(());
        }

        let action = match self.action_for(stage.kind, order) {
            Ok(action) => action,
            Err(reason) => {
                report.record(OutcomeRecord {
                    order_id: order.order_id.clone(),
                    stage: stage.kind,
                    kind: ResultKind::Failed,
                    detail: reason,
                });
                return Ok(());
            }
        };

        match port.apply_action(session, order, &action).await {
            Ok(()) => {
                tracing::info!("Order {} processed ({})", order.order_id, status);
                report.record(OutcomeRecord {
                    order_id: order.order_id.clone(),
                    stage: stage.kind,
                    kind: ResultKind::Processed,
                    detail: status.to_string(),
                });
            }
            Err(err) if err.is_fatal() => return Err(EngineError::Fatal(err.to_string())),
            Err(err) => {
                tracing::warn!("Action failed for {}: {}", order.order_id, err);
                report.record(OutcomeRecord {
                    order_id: order.order_id.clone(),
                    stage: stage.kind,
                    kind: ResultKind::Failed,
                    detail: err.to_string(),
                });
            }
        }

        Ok(())
    }

    fn action_for(
        &self,
        kind: StageKind,
        order: &Order,
    ) -> std::result::Result<StageAction, String> {
        match kind {
            StageKind::ConfirmPickup => Ok(StageAction::ConfirmPickup),
            StageKind::SubmitTracking => {
                if !order.has_tracking() {
                    return Err("no tracking number assigned".to_string());
                }
                Ok(StageAction::SubmitTracking {
                    carrier: self.channel.carrier.clone(),
                    tracking_number: order.tracking_number.trim().to_string(),
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{AuthError, PortError};
    use async_trait::async_trait;
    use reship_core::order::RemoteStatus;
    use reship_core::source::SourceRow;
    use std::collections::{HashMap, HashSet};

    /// Remote admin stand-in driven by a status table. ConfirmPickup moves
    /// an order to `after_pickup` so a later tracking pass sees the new
    /// state, like the real portals do.
    struct ScriptedPort {
        statuses: HashMap<String, RemoteStatus>,
        after_pickup: Option<RemoteStatus>,
        reject_actions_for: HashSet<String>,
        session_lost_on_locate: Option<String>,
        deny_auth: bool,
        auth_calls: u32,
        locate_calls: Vec<String>,
        action_calls: Vec<(String, StageAction)>,
    }

    impl ScriptedPort {
        fn new(statuses: &[(&str, &str)]) -> Self {
            Self {
                statuses: statuses
                    .iter()
                    .map(|(id, s)| (id.to_string(), RemoteStatus::new(*s)))
                    .collect(),
                after_pickup: None,
                reject_actions_for: HashSet::new(),
                session_lost_on_locate: None,
                deny_auth: false,
                auth_calls: 0,
                locate_calls: Vec::new(),
                action_calls: Vec::new(),
            }
        }
    }

    #[async_trait]
    impl RemoteAdminPort for ScriptedPort {
        async fn authenticate(&mut self) -> std::result::Result<Session, AuthError> {
            self.auth_calls += 1;
            if self.deny_auth {
                return Err(AuthError::Login("bad credentials".to_string()));
            }
            Ok(Session::new("scripted-1"))
        }

        async fn locate_order(
            &mut self,
            _session: &Session,
            order_id: &str,
        ) -> std::result::Result<LocateOutcome, PortError> {
            self.locate_calls.push(order_id.to_string());
            if self.session_lost_on_locate.as_deref() == Some(order_id) {
                return Err(PortError::SessionLost("portal logged us out".to_string()));
            }
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
            self.action_calls
                .push((order.order_id.clone(), action.clone()));
            if self.reject_actions_for.contains(&order.order_id) {
                return Err(PortError::Rejected("already shipped".to_string()));
            }
            if let (StageAction::ConfirmPickup, Some(next)) = (action, &self.after_pickup) {
                self.statuses.insert(order.order_id.clone(), next.clone());
            }
            Ok(())
        }
    }

    fn batch_of(ids: &[(&str, &str)]) -> OrderBatch {
        let rows: Vec<SourceRow> = ids
            .iter()
            .map(|(id, tracking)| SourceRow {
                ship_date: "2026-08-29".to_string(),
                order_id: id.to_string(),
                tracking_number: tracking.to_string(),
                exchange_type: "TestMall".to_string(),
            })
            .collect();
        OrderBatch::build(
            &rows,
            chrono::NaiveDate::from_ymd_opt(2026, 8, 29).unwrap(),
            "TestMall",
        )
    }

    fn single_stage_channel(eligible: &[&str]) -> ChannelProfile {
        ChannelProfile {
            name: "TestMall".to_string(),
            carrier: "CJ Logistics".to_string(),
            stages: vec![StageProfile {
                kind: StageKind::SubmitTracking,
                eligible_statuses: eligible.iter().map(|s| s.to_string()).collect(),
            }],
        }
    }

    fn two_stage_channel() -> ChannelProfile {
        ChannelProfile {
            name: "TestMall".to_string(),
            carrier: "CJ Logistics".to_string(),
            stages: vec![
                StageProfile {
                    kind: StageKind::ConfirmPickup,
                    eligible_statuses: vec!["picked up".to_string()],
                },
                StageProfile {
                    kind: StageKind::SubmitTracking,
                    eligible_statuses: vec!["ready to ship".to_string()],
                },
            ],
        }
    }

    #[tokio::test]
    async fn test_empty_batch_makes_no_port_calls() {
        let mut port = ScriptedPort::new(&[]);
        let engine = SyncEngine::new(single_stage_channel(&["ready"]));
        let mut report = RunReport::new();

        engine
            .run(
                &mut port,
                &batch_of(&[]),
                &[StageKind::SubmitTracking],
                &mut report,
            )
            .await
            .unwrap();

        assert_eq!(port.auth_calls, 0);
        assert!(port.locate_calls.is_empty());
        assert!(report.outcomes().is_empty());
    }

    #[tokio::test]
    async fn test_ready_skipped_and_missing_orders() {
        // O1 ready, O2 not ready, O3 has no remote record
        let mut port = ScriptedPort::new(&[("O1", "ready"), ("O2", "not ready")]);
        let engine = SyncEngine::new(single_stage_channel(&["ready"]));
        let mut report = RunReport::new();

        engine
            .run(
                &mut port,
                &batch_of(&[("O1", "T1"), ("O2", "T2"), ("O3", "T3")]),
                &[StageKind::SubmitTracking],
                &mut report,
            )
            .await
            .unwrap();

        let kinds: Vec<_> = report.outcomes().iter().map(|o| o.kind).collect();
        assert_eq!(
            kinds,
            vec![ResultKind::Processed, ResultKind::Skipped, ResultKind::NotFound]
        );

        // apply_action called exactly once, for O1
        assert_eq!(port.action_calls.len(), 1);
        assert_eq!(port.action_calls[0].0, "O1");
        assert_eq!(
            port.action_calls[0].1,
            StageAction::SubmitTracking {
                carrier: "CJ Logistics".to_string(),
                tracking_number: "T1".to_string(),
            }
        );
        assert_eq!(report.outcome_for("O2", StageKind::SubmitTracking).unwrap().detail, "not ready");
    }

    #[tokio::test]
    async fn test_unlisted_status_never_triggers_action() {
        let mut port = ScriptedPort::new(&[
            ("O1", "under inspection"),
            ("O2", "pickup requested"),
            ("O3", "withdrawn"),
        ]);
        let engine = SyncEngine::new(single_stage_channel(&["ready"]));
        let mut report = RunReport::new();

        engine
            .run(
                &mut port,
                &batch_of(&[("O1", "T1"), ("O2", "T2"), ("O3", "T3")]),
                &[StageKind::SubmitTracking],
                &mut report,
            )
            .await
            .unwrap();

        assert!(port.action_calls.is_empty());
        assert_eq!(report.count(ResultKind::Skipped), 3);
    }

    #[tokio::test]
    async fn test_action_failure_does_not_stop_the_batch() {
        let mut port = ScriptedPort::new(&[("O1", "ready"), ("O2", "ready")]);
        port.reject_actions_for.insert("O1".to_string());
        let engine = SyncEngine::new(single_stage_channel(&["ready"]));
        let mut report = RunReport::new();

        engine
            .run(
                &mut port,
                &batch_of(&[("O1", "T1"), ("O2", "T2")]),
                &[StageKind::SubmitTracking],
                &mut report,
            )
            .await
            .unwrap();

        let o1 = report.outcome_for("O1", StageKind::SubmitTracking).unwrap();
        assert_eq!(o1.kind, ResultKind::Failed);
        assert!(o1.detail.contains("already shipped"));

        let o2 = report.outcome_for("O2", StageKind::SubmitTracking).unwrap();
        assert_eq!(o2.kind, ResultKind::Processed);
    }

    #[tokio::test]
    async fn test_session_loss_aborts_and_leaves_rest_unrecorded() {
        let mut port =
            ScriptedPort::new(&[("O1", "ready"), ("O2", "ready"), ("O3", "ready")]);
        port.session_lost_on_locate = Some("O2".to_string());
        let engine = SyncEngine::new(single_stage_channel(&["ready"]));
        let mut report = RunReport::new();

        let result = engine
            .run(
                &mut port,
                &batch_of(&[("O1", "T1"), ("O2", "T2"), ("O3", "T3")]),
                &[StageKind::SubmitTracking],
                &mut report,
            )
            .await;

        assert!(matches!(result, Err(EngineError::Fatal(_))));

        // O1 recorded before the abort, O2 and O3 absent entirely
        assert_eq!(report.outcomes().len(), 1);
        assert_eq!(report.outcomes()[0].order_id, "O1");
        assert!(!port.locate_calls.contains(&"O3".to_string()));
    }

    #[tokio::test]
    async fn test_auth_failure_aborts_before_any_locate() {
        let mut port = ScriptedPort::new(&[("O1", "ready")]);
        port.deny_auth = true;
        let engine = SyncEngine::new(single_stage_channel(&["ready"]));
        let mut report = RunReport::new();

        let result = engine
            .run(
                &mut port,
                &batch_of(&[("O1", "T1")]),
                &[StageKind::SubmitTracking],
                &mut report,
            )
            .await;

        assert!(matches!(result, Err(EngineError::Auth(_))));
        assert!(port.locate_calls.is_empty());
        assert!(report.outcomes().is_empty());
    }

    #[tokio::test]
    async fn test_two_stage_run_relocates_between_passes() {
        let mut port = ScriptedPort::new(&[("O1", "picked up")]);
        port.after_pickup = Some(RemoteStatus::new("ready to ship"));
        let engine = SyncEngine::new(two_stage_channel());
        let mut report = RunReport::new();

        engine
            .run(
                &mut port,
                &batch_of(&[("O1", "T1")]),
                &[StageKind::ConfirmPickup, StageKind::SubmitTracking],
                &mut report,
            )
            .await
            .unwrap();

        // one locate per pass, one authenticate for the whole run
        assert_eq!(port.auth_calls, 1);
        assert_eq!(port.locate_calls, vec!["O1", "O1"]);
        assert_eq!(port.action_calls.len(), 2);
        assert_eq!(port.action_calls[0].1, StageAction::ConfirmPickup);

        // one record per (order, stage)
        assert_eq!(
            report.outcome_for("O1", StageKind::ConfirmPickup).unwrap().kind,
            ResultKind::Processed
        );
        assert_eq!(
            report.outcome_for("O1", StageKind::SubmitTracking).unwrap().kind,
            ResultKind::Processed
        );
    }

    #[tokio::test]
    async fn test_tracking_pass_without_pickup_side_effect_skips() {
        // Pickup succeeded but the portal has not moved the order on yet
        let mut port = ScriptedPort::new(&[("O1", "picked up")]);
        let engine = SyncEngine::new(two_stage_channel());
        let mut report = RunReport::new();

        engine
            .run(
                &mut port,
                &batch_of(&[("O1", "T1")]),
                &[StageKind::ConfirmPickup, StageKind::SubmitTracking],
                &mut report,
            )
            .await
            .unwrap();

        assert_eq!(
            report.outcome_for("O1", StageKind::SubmitTracking).unwrap().kind,
            ResultKind::Skipped
        );
    }

    #[tokio::test]
    async fn test_stage_the_channel_lacks_is_skipped() {
        let mut port = ScriptedPort::new(&[("O1", "ready")]);
        let engine = SyncEngine::new(single_stage_channel(&["ready"]));
        let mut report = RunReport::new();

        engine
            .run(
                &mut port,
                &batch_of(&[("O1", "T1")]),
                &[StageKind::ConfirmPickup],
                &mut report,
            )
            .await
            .unwrap();

        // authenticates, then finds no matching stage to run
        assert_eq!(port.auth_calls, 1);
        assert!(port.locate_calls.is_empty());
        assert!(report.outcomes().is_empty());
    }

    #[tokio::test]
    async fn test_missing_tracking_number_fails_without_action() {
        let mut port = ScriptedPort::new(&[("O1", "ready")]);
        let engine = SyncEngine::new(single_stage_channel(&["ready"]));
        let mut report = RunReport::new();

        engine
            .run(
                &mut port,
                &batch_of(&[("O1", "")]),
                &[StageKind::SubmitTracking],
                &mut report,
            )
            .await
            .unwrap();

        assert!(port.action_calls.is_empty());
        let o1 = report.outcome_for("O1", StageKind::SubmitTracking).unwrap();
        assert_eq!(o1.kind, ResultKind::Failed);
        assert!(o1.detail.contains("tracking number"));
    }

    #[tokio::test]
    async fn test_recoverable_locate_error_is_recorded_and_isolated() {
        struct FlakyPort {
            inner: ScriptedPort,
        }

        #[async_trait]
        impl RemoteAdminPort for FlakyPort {
            async fn authenticate(&mut self) -> std::result::Result<Session, AuthError> {
                self.inner.authenticate().await
            }

            async fn locate_order(
                &mut self,
                session: &Session,
                order_id: &str,
            ) -> std::result::Result<LocateOutcome, PortError> {
                if order_id == "O1" {
                    return Err(PortError::Timeout("status cell".to_string()));
                }
                self.inner.locate_order(session, order_id).await
            }

            async fn apply_action(
                &mut self,
                session: &Session,
                order: &Order,
                action: &StageAction,
            ) -> std::result::Result<(), PortError> {
                self.inner.apply_action(session, order, action).await
            }
        }

        let mut port = FlakyPort {
            inner: ScriptedPort::new(&[("O2", "ready")]),
        };
        let engine = SyncEngine::new(single_stage_channel(&["ready"]));
        let mut report = RunReport::new();

        engine
            .run(
                &mut port,
                &batch_of(&[("O1", "T1"), ("O2", "T2")]),
                &[StageKind::SubmitTracking],
                &mut report,
            )
            .await
            .unwrap();

        assert_eq!(
            report.outcome_for("O1", StageKind::SubmitTracking).unwrap().kind,
            ResultKind::Failed
        );
        assert_eq!(
            report.outcome_for("O2", StageKind::SubmitTracking).unwrap().kind,
            ResultKind::Processed
        );
    }
}
