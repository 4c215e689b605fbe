use crate::order::RemoteStatus;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// What an action stage does to an eligible order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageKind {
    /// Mark the customer's returned item as collected
    ConfirmPickup,
    /// Select a carrier and submit the replacement's tracking number
    SubmitTracking,
}

impl fmt::Display for StageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StageKind::ConfirmPickup => f.write_str("confirm-pickup"),
            StageKind::SubmitTracking => f.write_str("submit-tracking"),
        }
    }
}

/// One pass over the batch: which remote statuses are actionable, and what
/// action to take on them
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageProfile {
    pub kind: StageKind,
    /// Allow-list of remote statuses eligible for this stage's action.
    /// Anything else means "not yet ready", not an error.
    pub eligible_statuses: Vec<String>,
}

impl StageProfile {
    pub fn is_eligible(&self, status: &RemoteStatus) -> bool {
        self.eligible_statuses.iter().any(|s| s == status.as_str())
    }
}

/// Per-channel configuration: portals differ in which statuses are
/// actionable and in how many stages an exchange passes through, so both
/// are data here rather than code
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelProfile {
    pub name: String,
    /// Carrier preselected when submitting tracking numbers
    pub carrier: String,
    pub stages: Vec<StageProfile>,
}

impl ChannelProfile {
    pub fn stage(&self, kind: StageKind) -> Option<&StageProfile> {
        self.stages.iter().find(|s| s.kind == kind)
    }
}

/// Built-in profiles for the two portals this tool grew up on
///
/// 29CM runs one combined stage: pickup states and the inspected state all
/// feed straight into tracking submission. Zigzag splits the flow into a
/// pickup-confirm pass and a separate ready-to-ship pass.
pub fn builtin_channels() -> Vec<ChannelProfile> {
    vec![
        ChannelProfile {
            name: "29CM".to_string(),
            carrier: "CJ Logistics".to_string(),
            stages: vec![StageProfile {
                kind: StageKind::SubmitTracking,
                eligible_statuses: vec![
                    "exchange inspection complete".to_string(),
                    "exchange pickup complete".to_string(),
                    "exchange pickup in progress".to_string(),
                ],
            }],
        },
        ChannelProfile {
            name: "Zigzag".to_string(),
            carrier: "CJ Logistics".to_string(),
            stages: vec![
                StageProfile {
                    kind: StageKind::ConfirmPickup,
                    eligible_statuses: vec!["exchange pickup complete".to_string()],
                },
                StageProfile {
                    kind: StageKind::SubmitTracking,
                    eligible_statuses: vec!["exchange ready to ship".to_string()],
                },
            ],
        },
    ]
}

/// Load additional channel profiles from a JSON file
pub fn load_channels(path: &Path) -> Result<Vec<ChannelProfile>> {
    tracing::debug!("Loading channels file from: {}", path.display());

    let file = File::open(path)?;
    let channels: Vec<ChannelProfile> = serde_json::from_reader(BufReader::new(file))?;

    tracing::info!("Loaded {} channel profiles", channels.len());

    Ok(channels)
}

/// Resolve a channel by name, preferring file-supplied profiles over
/// built-ins so operators can override the defaults
pub fn resolve_channel(name: &str, extra: &[ChannelProfile]) -> Result<ChannelProfile> {
    extra
        .iter()
        .chain(builtin_channels().iter())
        .find(|c| c.name.eq_ignore_ascii_case(name))
        .cloned()
        .ok_or_else(|| Error::UnknownChannel(name.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_allow_list() {
        let stage = StageProfile {
            kind: StageKind::SubmitTracking,
            eligible_statuses: vec!["ready".to_string()],
        };

        assert!(stage.is_eligible(&RemoteStatus::new("ready")));
        assert!(!stage.is_eligible(&RemoteStatus::new("not ready")));
        assert!(!stage.is_eligible(&RemoteStatus::new("READY")));
    }

    #[test]
    fn test_builtin_29cm_is_single_stage() {
        let channel = resolve_channel("29CM", &[]).unwrap();
        assert_eq!(channel.stages.len(), 1);
        assert_eq!(channel.stages[0].kind, StageKind::SubmitTracking);
        assert_eq!(channel.stages[0].eligible_statuses.len(), 3);
    }

    #[test]
    fn test_builtin_zigzag_is_two_stage() {
        let channel = resolve_channel("zigzag", &[]).unwrap();
        assert_eq!(channel.stages.len(), 2);
        assert_eq!(channel.stages[0].kind, StageKind::ConfirmPickup);
        assert_eq!(channel.stages[1].kind, StageKind::SubmitTracking);
    }

    #[test]
    fn test_unknown_channel_is_an_error() {
        let result = resolve_channel("musinsa", &[]);
        assert!(matches!(result, Err(Error::UnknownChannel(_))));
    }

    #[test]
    fn test_file_profiles_override_builtins() {
        let extra = vec![ChannelProfile {
            name: "29CM".to_string(),
            carrier: "Hanjin".to_string(),
            stages: vec![],
        }];

        let channel = resolve_channel("29CM", &extra).unwrap();
        assert_eq!(channel.carrier, "Hanjin");
    }

    #[test]
    fn test_channel_profile_round_trips_through_json() {
        let json = r#"[{
            "name": "Ably",
            "carrier": "CJ Logistics",
            "stages": [
                {"kind": "confirm_pickup", "eligible_statuses": ["collected"]}
            ]
        }]"#;

        let channels: Vec<ChannelProfile> = serde_json::from_str(json).unwrap();
        assert_eq!(channels[0].name, "Ably");
        assert_eq!(channels[0].stages[0].kind, StageKind::ConfirmPickup);
    }
}
