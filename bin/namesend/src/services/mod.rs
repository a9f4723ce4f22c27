pub mod session;
pub mod transfer_orchestrator;

pub use session::{RunGuard, Session, SessionError};
pub use transfer_orchestrator::{OrchestratorError, TransferOrchestrator};
