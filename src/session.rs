//! Player session handle
//!
//! Supplied by the auth provider and passed explicitly to the round runner.

use crate::errors::{GameError, NexuzResult};
use crate::gateway::BalanceGateway;
use crate::games::types::AccountId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    account_id: Option<AccountId>,
    /// Last balance seen from the gateway
    balance: u64,
}

impl Session {
    pub fn anonymous() -> Self {
        Self {
            account_id: None,
            balance: 0,
        }
    }

    pub fn authenticated(account_id: impl Into<AccountId>, balance: u64) -> Self {
        Self {
            account_id: Some(account_id.into()),
            balance,
        }
    }

    /// Build a session for `account_id` from the stored balance
    pub async fn sign_in<G: BalanceGateway + ?Sized>(
        gateway: &G,
        account_id: impl Into<AccountId>,
    ) -> NexuzResult<Self> {
        let account_id = account_id.into();
        let balance = gateway.read_balance(&account_id).await?;
        Ok(Self::authenticated(account_id, balance))
    }

    pub fn is_authenticated(&self) -> bool {
        self.account_id.is_some()
    }

    pub fn account_id(&self) -> Option<&AccountId> {
        self.account_id.as_ref()
    }

    pub fn require_account(&self) -> Result<&AccountId, GameError> {
        self.account_id.as_ref().ok_or(GameError::NotAuthenticated)
    }

    pub fn balance(&self) -> u64 {
        self.balance
    }

    pub(crate) fn set_balance(&mut self, balance: u64) {
        self.balance = balance;
    }

    /// Re-read the balance, e.g. after another tab played
    pub async fn refresh<G: BalanceGateway + ?Sized>(&mut self, gateway: &G) -> NexuzResult<u64> {
        let account = self.require_account()?.clone();
        self.balance = gateway.read_balance(&account).await?;
        Ok(self.balance)
    }
}

/// Parse a bet typed by the player
pub fn parse_bet(input: &str) -> Result<u64, GameError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(GameError::invalid_bet("amount is empty"));
    }
    match trimmed.parse::<i128>() {
        Ok(amount) if amount <= 0 => Err(GameError::invalid_bet(format!(
            "amount must be positive, got {}",
            amount
        ))),
        Ok(amount) => u64::try_from(amount)
            .map_err(|_| GameError::invalid_bet(format!("amount {} is too large", amount))),
        Err(_) => Err(GameError::invalid_bet(format!(
            "'{}' is not a whole number",
            trimmed
        ))),
    }
}
