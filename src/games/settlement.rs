//! Settlement of balance debits and credits
//!
//! Wraps the gateway's debit/credit calls with logging and the configured
//! policy for failed winnings credits.

use crate::errors::{BalanceOperation, GameError};
use crate::gateway::BalanceGateway;
use crate::games::types::AccountId;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{error, info, warn};

/// What to do when the winnings credit of a resolved round fails
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "policy", rename_all = "snake_case")]
pub enum CreditFailurePolicy {
    /// Single attempt; the failure is logged and surfaced, play may continue
    Surface,
    /// Retry with backoff; a new round is refused until the credit lands
    RetryBeforeNextRound { max_attempts: u32, backoff_ms: u64 },
}

impl Default for CreditFailurePolicy {
    fn default() -> Self {
        CreditFailurePolicy::Surface
    }
}

impl CreditFailurePolicy {
    /// Whether an outstanding credit blocks resetting to Idle
    pub fn blocks_new_round(&self) -> bool {
        matches!(self, CreditFailurePolicy::RetryBeforeNextRound { .. })
    }

    fn attempts(&self) -> u32 {
        match self {
            CreditFailurePolicy::Surface => 1,
            CreditFailurePolicy::RetryBeforeNextRound { max_attempts, .. } => (*max_attempts).max(1),
        }
    }

    fn backoff(&self, attempt: u32) -> Duration {
        match self {
            CreditFailurePolicy::Surface => Duration::ZERO,
            // Linear backoff keeps the worst-case wait predictable for the UI.
            CreditFailurePolicy::RetryBeforeNextRound { backoff_ms, .. } => {
                Duration::from_millis(backoff_ms.saturating_mul(attempt as u64))
            }
        }
    }
}

/// Applies debits and credits for one account through a gateway
pub struct Settler<'a, G: BalanceGateway + ?Sized> {
    gateway: &'a G,
    policy: &'a CreditFailurePolicy,
}

impl<'a, G: BalanceGateway + ?Sized> Settler<'a, G> {
    pub fn new(gateway: &'a G, policy: &'a CreditFailurePolicy) -> Self {
        Self { gateway, policy }
    }

    /// Reserve a bet. Never retried.
    pub async fn debit(&self, account: &AccountId, amount: u64) -> Result<u64, GameError> {
        match self.gateway.debit(account, amount).await {
            Ok(balance) => {
                info!(account = %account, amount, balance, "bet debited");
                Ok(balance)
            }
            Err(e) => {
                warn!(account = %account, amount, error = %e, "bet debit failed");
                Err(GameError::gateway(BalanceOperation::Debit, e))
            }
        }
    }

    /// Pay out winnings, retrying as far as the policy allows.
    pub async fn credit(&self, account: &AccountId, amount: u64) -> Result<u64, GameError> {
        let attempts = self.policy.attempts();
        let mut last_error = None;

        for attempt in 1..=attempts {
            match self.gateway.credit(account, amount).await {
                Ok(balance) => {
                    info!(account = %account, amount, balance, attempt, "winnings credited");
                    return Ok(balance);
                }
                Err(e) => {
                    warn!(account = %account, amount, attempt, error = %e, "winnings credit attempt failed");
                    last_error = Some(e);
                    if attempt < attempts {
                        tokio::time::sleep(self.policy.backoff(attempt)).await;
                    }
                }
            }
        }

        let reason = last_error
            .map(|e| e.to_string())
            .unwrap_or_else(|| "no attempt made".to_string());
        error!(
            account = %account,
            amount,
            attempts,
            reason = %reason,
            "winnings credit failed; balance was not credited"
        );
        Err(GameError::GatewayWriteFailed {
            operation: BalanceOperation::Credit,
            reason,
        })
    }
}
