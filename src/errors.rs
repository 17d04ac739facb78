//! Error types for the Nexuz game core
//!
//! One enum per concern, wrapped by [`NexuzError`] for callers that do not
//! care which layer failed.

use crate::games::types::GameKind;

/// Root error type for all Nexuz operations
#[derive(Debug, thiserror::Error)]
pub enum NexuzError {
    #[error("Game error: {0}")]
    Game(#[from] GameError),

    #[error("Gateway error: {0}")]
    Gateway(#[from] GatewayError),

    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),
}

/// Errors surfaced to the player as a blocking message
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GameError {
    #[error("Invalid bet: {reason}")]
    InvalidBet { reason: String },

    #[error("Insufficient funds: bet {bet} exceeds balance {balance}")]
    InsufficientFunds { bet: u64, balance: u64 },

    #[error("Not authenticated")]
    NotAuthenticated,

    #[error("Balance {operation} failed: {reason}")]
    GatewayWriteFailed {
        operation: BalanceOperation,
        reason: String,
    },

    #[error("Cannot apply {event} while round is {state}")]
    InvalidTransition {
        state: &'static str,
        event: &'static str,
    },

    #[error("Outcome for {outcome} does not belong to a {game} round")]
    OutcomeMismatch { game: GameKind, outcome: GameKind },

    #[error("Credit of {amount} is still outstanding")]
    CreditOutstanding { amount: u64 },
}

/// Which balance write failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BalanceOperation {
    Debit,
    Credit,
}

impl std::fmt::Display for BalanceOperation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BalanceOperation::Debit => write!(f, "debit"),
            BalanceOperation::Credit => write!(f, "credit"),
        }
    }
}

/// Failures reported by a balance or jackpot backend
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GatewayError {
    #[error("Backend unavailable: {0}")]
    Unavailable(String),

    #[error("Account not found: {0}")]
    AccountNotFound(String),

    #[error("Insufficient funds: requested {requested}, available {available}")]
    InsufficientFunds { requested: u64, available: u64 },
}

/// Configuration loading and validation errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigurationError {
    #[error("Validation failed: {0}")]
    ValidationFailed(String),

    #[error("Missing required field: {0}")]
    MissingRequired(String),

    #[error("Invalid value for {field}: '{value}' ({reason})")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Failed to load configuration: {0}")]
    LoadFailed(String),

    #[error("Failed to save configuration: {0}")]
    SaveFailed(String),
}

impl GameError {
    /// Wrap a gateway failure on the given balance operation.
    pub fn gateway(operation: BalanceOperation, err: GatewayError) -> Self {
        match err {
            GatewayError::InsufficientFunds {
                requested,
                available,
            } => GameError::InsufficientFunds {
                bet: requested,
                balance: available,
            },
            other => GameError::GatewayWriteFailed {
                operation,
                reason: other.to_string(),
            },
        }
    }

    pub fn invalid_bet(reason: impl Into<String>) -> Self {
        GameError::InvalidBet {
            reason: reason.into(),
        }
    }
}

// Convenience type alias for Results
pub type NexuzResult<T> = Result<T, NexuzError>;
