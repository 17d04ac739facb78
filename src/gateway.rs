//! Balance and jackpot backends
//!
//! The hosted store only offers whole-value reads and writes. Debit and credit
//! are provided as read-then-write helpers so a backend with an atomic
//! increment can override them without touching game logic.

use crate::errors::GatewayError;
use crate::games::types::AccountId;
use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::{
    atomic::{AtomicU64, AtomicUsize, Ordering},
    Arc,
};
use tracing::debug;

/// Persistence boundary for a player's coin balance
#[async_trait]
pub trait BalanceGateway: Send + Sync {
    /// Read the stored balance
    async fn read_balance(&self, account: &AccountId) -> Result<u64, GatewayError>;

    /// Overwrite the stored balance; last write wins
    async fn write_balance(&self, account: &AccountId, balance: u64) -> Result<(), GatewayError>;

    /// Subtract `amount`, refusing to go below zero. Not atomic: a concurrent
    /// writer between the read and the write is lost.
    async fn debit(&self, account: &AccountId, amount: u64) -> Result<u64, GatewayError> {
        let available = self.read_balance(account).await?;
        if amount > available {
            return Err(GatewayError::InsufficientFunds {
                requested: amount,
                available,
            });
        }
        let balance = available - amount;
        self.write_balance(account, balance).await?;
        Ok(balance)
    }

    /// Add `amount`. Same read-modify-write caveat as [`BalanceGateway::debit`].
    async fn credit(&self, account: &AccountId, amount: u64) -> Result<u64, GatewayError> {
        let balance = self.read_balance(account).await?.saturating_add(amount);
        self.write_balance(account, balance).await?;
        Ok(balance)
    }
}

/// Read access to the progressive jackpot shown on the hub
#[async_trait]
pub trait JackpotSource: Send + Sync {
    async fn read_jackpot(&self) -> Result<u64, GatewayError>;
}

#[async_trait]
impl<T: BalanceGateway + ?Sized> BalanceGateway for Arc<T> {
    async fn read_balance(&self, account: &AccountId) -> Result<u64, GatewayError> {
        (**self).read_balance(account).await
    }

    async fn write_balance(&self, account: &AccountId, balance: u64) -> Result<(), GatewayError> {
        (**self).write_balance(account, balance).await
    }

    async fn debit(&self, account: &AccountId, amount: u64) -> Result<u64, GatewayError> {
        (**self).debit(account, amount).await
    }

    async fn credit(&self, account: &AccountId, amount: u64) -> Result<u64, GatewayError> {
        (**self).credit(account, amount).await
    }
}

/// In-process store used by the CLI and tests.
///
/// Counts every call and can be told to fail upcoming writes, which is how
/// tests exercise the gateway failure paths.
#[derive(Default)]
pub struct InMemoryGateway {
    balances: DashMap<AccountId, u64>,
    jackpot: AtomicU64,
    reads: AtomicUsize,
    writes: AtomicUsize,
    failing_writes: AtomicUsize,
}

impl InMemoryGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_account(self, account: impl Into<AccountId>, balance: u64) -> Self {
        self.balances.insert(account.into(), balance);
        self
    }

    pub fn with_jackpot(self, value: u64) -> Self {
        self.jackpot.store(value, Ordering::SeqCst);
        self
    }

    /// Stand-in for the scheduled job that grows the jackpot
    pub fn add_to_jackpot(&self, amount: u64) -> u64 {
        self.jackpot.fetch_add(amount, Ordering::SeqCst) + amount
    }

    /// Make the next `count` writes fail with `Unavailable`
    pub fn fail_next_writes(&self, count: usize) {
        self.failing_writes.store(count, Ordering::SeqCst);
    }

    pub fn balance_of(&self, account: &str) -> Option<u64> {
        self.balances.get(account).map(|b| *b)
    }

    pub fn read_count(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// Total gateway calls observed
    pub fn call_count(&self) -> usize {
        self.read_count() + self.write_count()
    }

    fn take_failure(&self) -> bool {
        self.failing_writes
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
    }
}

#[async_trait]
impl BalanceGateway for InMemoryGateway {
    async fn read_balance(&self, account: &AccountId) -> Result<u64, GatewayError> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        self.balances
            .get(account)
            .map(|b| *b)
            .ok_or_else(|| GatewayError::AccountNotFound(account.clone()))
    }

    async fn write_balance(&self, account: &AccountId, balance: u64) -> Result<(), GatewayError> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        if self.take_failure() {
            return Err(GatewayError::Unavailable("injected write failure".to_string()));
        }
        match self.balances.get_mut(account) {
            Some(mut entry) => {
                debug!(account = %account, from = *entry, to = balance, "balance written");
                *entry = balance;
                Ok(())
            }
            None => Err(GatewayError::AccountNotFound(account.clone())),
        }
    }
}

#[async_trait]
impl JackpotSource for InMemoryGateway {
    async fn read_jackpot(&self) -> Result<u64, GatewayError> {
        Ok(self.jackpot.load(Ordering::SeqCst))
    }
}
