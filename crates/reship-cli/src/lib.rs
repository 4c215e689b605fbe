use clap::ValueEnum;
use reship_core::channel::StageKind;

pub mod commands;
pub mod config;
pub mod snapshot;

/// Which passes a sync run executes
#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum StageArg {
    Pickup,
    Tracking,
    All,
}

impl StageArg {
    pub fn kinds(&self) -> Vec<StageKind> {
        match self {
            StageArg::Pickup => vec![StageKind::ConfirmPickup],
            StageArg::Tracking => vec![StageKind::SubmitTracking],
            StageArg::All => vec![StageKind::ConfirmPickup, StageKind::SubmitTracking],
        }
    }
}
