//! External resources the listing strategies act on.
//!
//! Only strategy hooks talk to these; the machine never does.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use thiserror::Error;
use uuid::Uuid;

pub type CreditId = Uuid;
pub type ChargeId = Uuid;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum LedgerError {
    #[error("account '{account}' has {available} credits left")]
    Insufficient { account: String, available: u32 },

    #[error("credit '{0}' is unknown or already attached")]
    UnknownCredit(CreditId),

    #[error("ledger unavailable: {0}")]
    Unavailable(String),
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum PaymentError {
    #[error("declined: {0}")]
    Declined(String),

    #[error("payment gateway unavailable: {0}")]
    Unavailable(String),
}

/// Prepaid listing credits per account.
#[async_trait]
pub trait CreditLedger: Send + Sync {
    async fn balance(&self, account: &str) -> Result<u32, LedgerError>;

    /// Take one credit from `account`. The credit stays pending until it is
    /// attached to a listing.
    async fn debit(&self, account: &str) -> Result<CreditId, LedgerError>;

    /// Record that `credit` paid for `listing`.
    async fn attach(&self, credit: CreditId, listing: Uuid) -> Result<(), LedgerError>;

    async fn attached_to(&self, listing: Uuid) -> Result<Option<CreditId>, LedgerError>;

    /// Return the credit attached to `listing` to its account. Returns
    /// `false` when nothing was attached.
    async fn release(&self, listing: Uuid) -> Result<bool, LedgerError>;
}

/// Card payments against a stored billing reference.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn charge(&self, reference: &str, amount_cents: u64) -> Result<ChargeId, PaymentError>;

    async fn send_receipt(&self, charge: ChargeId, listing: Uuid) -> Result<(), PaymentError>;
}

#[derive(Default)]
struct LedgerState {
    balances: HashMap<String, u32>,
    pending: HashMap<CreditId, String>,
    attached: HashMap<Uuid, (CreditId, String)>,
}

/// In-memory [`CreditLedger`].
#[derive(Default)]
pub struct MemoryCreditLedger {
    state: Mutex<LedgerState>,
}

impl MemoryCreditLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `credits` to `account`.
    pub fn grant(&self, account: &str, credits: u32) {
        *self
            .state
            .lock()
            .balances
            .entry(account.to_string())
            .or_insert(0) += credits;
    }

    /// Credits debited but never attached to a listing.
    pub fn pending(&self) -> usize {
        self.state.lock().pending.len()
    }
}

#[async_trait]
impl CreditLedger for MemoryCreditLedger {
    async fn balance(&self, account: &str) -> Result<u32, LedgerError> {
        Ok(self.state.lock().balances.get(account).copied().unwrap_or(0))
    }

    async fn debit(&self, account: &str) -> Result<CreditId, LedgerError> {
        let mut state = self.state.lock();
        let balance = state.balances.entry(account.to_string()).or_insert(0);
        if *balance == 0 {
            return Err(LedgerError::Insufficient {
                account: account.to_string(),
                available: 0,
            });
        }
        *balance -= 1;
        let credit = Uuid::new_v4();
        state.pending.insert(credit, account.to_string());
        Ok(credit)
    }

    async fn attach(&self, credit: CreditId, listing: Uuid) -> Result<(), LedgerError> {
        let mut state = self.state.lock();
        let account = state
            .pending
            .remove(&credit)
            .ok_or(LedgerError::UnknownCredit(credit))?;
        state.attached.insert(listing, (credit, account));
        Ok(())
    }

    async fn attached_to(&self, listing: Uuid) -> Result<Option<CreditId>, LedgerError> {
        Ok(self
            .state
            .lock()
            .attached
            .get(&listing)
            .map(|(credit, _)| *credit))
    }

    async fn release(&self, listing: Uuid) -> Result<bool, LedgerError> {
        let mut state = self.state.lock();
        let released = state.attached.remove(&listing);
        match released {
            Some((_, account)) => {
                *state.balances.entry(account).or_insert(0) += 1;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

/// A charge accepted by [`MemoryPaymentGateway`].
#[derive(Debug, Clone, PartialEq)]
pub struct Charge {
    pub id: ChargeId,
    pub reference: String,
    pub amount_cents: u64,
}

#[derive(Default)]
struct GatewayState {
    declined: HashSet<String>,
    charges: Vec<Charge>,
    receipts: Vec<(ChargeId, Uuid)>,
    receipts_offline: bool,
}

/// In-memory [`PaymentGateway`].
#[derive(Default)]
pub struct MemoryPaymentGateway {
    state: Mutex<GatewayState>,
}

impl MemoryPaymentGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every future charge against `reference` fail.
    pub fn decline(&self, reference: &str) {
        self.state.lock().declined.insert(reference.to_string());
    }

    /// Keep accepting charges but fail every receipt.
    pub fn fail_receipts(&self, failing: bool) {
        self.state.lock().receipts_offline = failing;
    }

    pub fn charges(&self) -> Vec<Charge> {
        self.state.lock().charges.clone()
    }

    pub fn receipts(&self) -> Vec<(ChargeId, Uuid)> {
        self.state.lock().receipts.clone()
    }
}

#[async_trait]
impl PaymentGateway for MemoryPaymentGateway {
    async fn charge(&self, reference: &str, amount_cents: u64) -> Result<ChargeId, PaymentError> {
        let mut state = self.state.lock();
        if state.declined.contains(reference) {
            return Err(PaymentError::Declined(format!(
                "reference '{reference}' was declined"
            )));
        }
        let charge = Charge {
            id: Uuid::new_v4(),
            reference: reference.to_string(),
            amount_cents,
        };
        let id = charge.id;
        state.charges.push(charge);
        Ok(id)
    }

    async fn send_receipt(&self, charge: ChargeId, listing: Uuid) -> Result<(), PaymentError> {
        let mut state = self.state.lock();
        if state.receipts_offline {
            return Err(PaymentError::Unavailable("receipt service offline".into()));
        }
        state.receipts.push((charge, listing));
        Ok(())
    }
}
