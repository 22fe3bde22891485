use std::fmt;

use alloy::primitives::{Address, B256, U256};

/// A write the user asked for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TxAction {
    CreateEvent,
    Mint { event_id: u64, price: U256 },
    Transfer { token_id: u64, to: Address },
    Validate { token_id: u64 },
}

impl fmt::Display for TxAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TxAction::CreateEvent => write!(f, "Create event"),
            TxAction::Mint { event_id, .. } => write!(f, "Mint ticket for event #{event_id}"),
            TxAction::Transfer { token_id, .. } => write!(f, "Transfer ticket #{token_id}"),
            TxAction::Validate { token_id } => write!(f, "Validate ticket #{token_id}"),
        }
    }
}

/// Lifecycle of a submitted transaction.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum TxPhase {
    #[default]
    Idle,
    /// Handed to the wallet, no hash yet.
    Submitted,
    Confirming(B256),
    Confirmed(B256),
    Failed(String),
}

impl TxPhase {
    pub fn is_pending(&self) -> bool {
        matches!(self, TxPhase::Submitted | TxPhase::Confirming(_))
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, TxPhase::Confirmed(_) | TxPhase::Failed(_))
    }

    pub fn can_transition_to(&self, next: &TxPhase) -> bool {
        match (self, next) {
            (TxPhase::Idle, TxPhase::Submitted) => true,
            (TxPhase::Submitted, TxPhase::Confirming(_) | TxPhase::Failed(_)) => true,
            (TxPhase::Confirming(_), TxPhase::Confirmed(_) | TxPhase::Failed(_)) => true,
            (current, TxPhase::Submitted) => current.is_terminal(),
            _ => false,
        }
    }

    pub fn hash(&self) -> Option<B256> {
        match self {
            TxPhase::Confirming(hash) | TxPhase::Confirmed(hash) => Some(*hash),
            _ => None,
        }
    }
}

impl fmt::Display for TxPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TxPhase::Idle => write!(f, "Idle"),
            TxPhase::Submitted => write!(f, "Waiting for wallet confirmation..."),
            TxPhase::Confirming(_) => write!(f, "Transaction pending..."),
            TxPhase::Confirmed(_) => write!(f, "Transaction confirmed"),
            TxPhase::Failed(reason) => write!(f, "Failed: {reason}"),
        }
    }
}

/// Pending-action state owned by the page that started the write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingAction {
    pub action: TxAction,
    pub phase: TxPhase,
}

impl PendingAction {
    pub fn new(action: TxAction) -> Self {
        Self {
            action,
            phase: TxPhase::Idle,
        }
    }

    /// Apply a lifecycle update. Out-of-order updates are dropped.
    pub fn advance(&mut self, next: TxPhase) -> bool {
        if self.phase.can_transition_to(&next) {
            self.phase = next;
            true
        } else {
            false
        }
    }
}
