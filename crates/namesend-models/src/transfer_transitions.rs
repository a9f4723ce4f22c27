use crate::TransferState;
use snafu::{ensure, Snafu};

#[derive(Debug, Clone, PartialEq, Eq, Snafu)]
pub enum TransitionError {
    #[snafu(display("Invalid transfer state transition from {:?} to {:?}", from, to))]
    InvalidTransition {
        from: TransferState,
        to: TransferState,
    },
}

pub type TransitionResult = Result<(), TransitionError>;

impl TransferState {
    pub fn is_terminal(self) -> bool {
        matches!(self, TransferState::Succeeded | TransferState::Failed)
    }

    /// A run occupies the session from `Validating` through `Confirming`.
    pub fn is_in_flight(self) -> bool {
        !matches!(
            self,
            TransferState::Idle | TransferState::Succeeded | TransferState::Failed
        )
    }

    pub fn can_transition_to(self, next: TransferState) -> bool {
        use TransferState::*;
        match (self, next) {
            (Idle | Succeeded | Failed, Validating) => true,
            (Validating, Resolving) => true,
            // native transfers go straight to Submitting
            (Resolving, Simulating | Submitting) => true,
            (Simulating, Submitting) => true,
            (Submitting, Confirming) => true,
            (Confirming, Succeeded) => true,
            (Validating | Resolving | Simulating | Submitting | Confirming, Failed) => true,
            _ => false,
        }
    }

    pub fn transition(&mut self, next: TransferState) -> TransitionResult {
        ensure!(
            self.can_transition_to(next),
            InvalidTransitionSnafu {
                from: *self,
                to: next,
            }
        );
        *self = next;
        Ok(())
    }
}
