pub mod engine;
pub mod error;
pub mod ports;
pub mod verify;

pub use engine::SyncEngine;
pub use error::{AuthError, CodeError, EngineError, PortError, Result};
pub use ports::{LocateOutcome, RemoteAdminPort, Session, StageAction};
pub use verify::{VerificationCode, VerificationCodeSource};
