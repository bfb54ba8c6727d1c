//! The listing variants: how a listing is paid for.

use super::collaborators::{
    ChargeId, CreditId, CreditLedger, LedgerError, PaymentError, PaymentGateway,
};
use super::{Listing, ListingStatus};
use crate::core::Entity;
use crate::strategy::{HookRejection, Strategy};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::Arc;

pub type HookResult = Result<(), HookRejection>;

/// Named hooks for every listing status a transition can land on.
///
/// Each hook defaults to a no-op. The blanket impl below maps them onto
/// [`Strategy<Listing>`] by destination status.
#[async_trait]
pub trait ListingStrategy: Send + Sync {
    async fn before_draft(&self) -> HookResult {
        Ok(())
    }

    async fn after_draft(&self) -> HookResult {
        Ok(())
    }

    async fn before_open(&self) -> HookResult {
        Ok(())
    }

    async fn after_open(&self) -> HookResult {
        Ok(())
    }

    async fn before_schedule(&self) -> HookResult {
        Ok(())
    }

    async fn after_schedule(&self) -> HookResult {
        Ok(())
    }

    async fn before_close(&self) -> HookResult {
        Ok(())
    }

    async fn after_close(&self) -> HookResult {
        Ok(())
    }

    /// The listing is switching away from this variant.
    async fn detach(&self) -> HookResult {
        Ok(())
    }

    /// The listing is switching to this variant.
    async fn attach(&self) -> HookResult {
        Ok(())
    }
}

#[async_trait]
impl<T: ListingStrategy> Strategy<Listing> for T {
    async fn before(&self, to: ListingStatus) -> HookResult {
        match to {
            ListingStatus::Draft => self.before_draft().await,
            ListingStatus::Open => self.before_open().await,
            ListingStatus::Scheduled => self.before_schedule().await,
            ListingStatus::Closed => self.before_close().await,
        }
    }

    async fn after(&self, to: ListingStatus) -> HookResult {
        match to {
            ListingStatus::Draft => self.after_draft().await,
            ListingStatus::Open => self.after_open().await,
            ListingStatus::Scheduled => self.after_schedule().await,
            ListingStatus::Closed => self.after_close().await,
        }
    }

    async fn on_detach(&self) -> HookResult {
        self.detach().await
    }

    async fn on_attach(&self) -> HookResult {
        self.attach().await
    }
}

fn ledger_rejection(err: LedgerError) -> HookRejection {
    match err {
        LedgerError::Insufficient { available, .. } => {
            HookRejection::InsufficientCredit { available }
        }
        other => HookRejection::External(other.to_string()),
    }
}

fn payment_rejection(err: PaymentError) -> HookRejection {
    match err {
        PaymentError::Declined(reason) => HookRejection::PaymentDeclined(reason),
        other => HookRejection::External(other.to_string()),
    }
}

/// Pays with one prepaid credit from the owner's account.
///
/// The credit is debited before the listing first leaves draft (scheduling
/// or opening) and attached to the listing afterwards. A listing that
/// already has a credit attached is not charged again.
pub struct CreditStrategy {
    listing: Listing,
    ledger: Arc<dyn CreditLedger>,
    debited: Mutex<Option<CreditId>>,
}

impl CreditStrategy {
    pub fn new(listing: &Listing, ledger: Arc<dyn CreditLedger>) -> Self {
        Self {
            listing: listing.clone(),
            ledger,
            debited: Mutex::new(None),
        }
    }

    async fn take_credit(&self) -> HookResult {
        let attached = self
            .ledger
            .attached_to(self.listing.id)
            .await
            .map_err(ledger_rejection)?;
        if attached.is_some() {
            return Ok(());
        }
        let credit = self
            .ledger
            .debit(&self.listing.owner)
            .await
            .map_err(ledger_rejection)?;
        *self.debited.lock() = Some(credit);
        Ok(())
    }

    async fn attach_credit(&self) -> HookResult {
        let debited = self.debited.lock().take();
        match debited {
            Some(credit) => self
                .ledger
                .attach(credit, self.listing.id)
                .await
                .map_err(ledger_rejection),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl ListingStrategy for CreditStrategy {
    async fn before_schedule(&self) -> HookResult {
        self.take_credit().await
    }

    async fn after_schedule(&self) -> HookResult {
        self.attach_credit().await
    }

    async fn before_open(&self) -> HookResult {
        self.take_credit().await
    }

    async fn after_open(&self) -> HookResult {
        self.attach_credit().await
    }

    /// Refund a credit that never went live.
    async fn detach(&self) -> HookResult {
        if matches!(
            self.listing.status(),
            ListingStatus::Draft | ListingStatus::Scheduled
        ) {
            self.ledger
                .release(self.listing.id)
                .await
                .map_err(ledger_rejection)?;
        }
        Ok(())
    }
}

/// Charges the listing price to the stored billing reference on open.
pub struct BillingStrategy {
    listing: Listing,
    gateway: Arc<dyn PaymentGateway>,
    charged: Mutex<Option<ChargeId>>,
}

impl BillingStrategy {
    pub fn new(listing: &Listing, gateway: Arc<dyn PaymentGateway>) -> Self {
        Self {
            listing: listing.clone(),
            gateway,
            charged: Mutex::new(None),
        }
    }

    fn reference(&self) -> Result<&str, HookRejection> {
        self.listing
            .billing_reference
            .as_deref()
            .ok_or_else(|| HookRejection::Precondition("listing has no billing reference".into()))
    }
}

#[async_trait]
impl ListingStrategy for BillingStrategy {
    async fn before_open(&self) -> HookResult {
        let reference = self.reference()?;
        let charge = self
            .gateway
            .charge(reference, self.listing.price_cents)
            .await
            .map_err(payment_rejection)?;
        *self.charged.lock() = Some(charge);
        Ok(())
    }

    async fn after_open(&self) -> HookResult {
        let charged = self.charged.lock().take();
        match charged {
            Some(charge) => self
                .gateway
                .send_receipt(charge, self.listing.id)
                .await
                .map_err(payment_rejection),
            None => Ok(()),
        }
    }

    async fn attach(&self) -> HookResult {
        self.reference().map(|_| ())
    }
}

/// Free listings: no hooks at all.
pub struct ComplimentaryStrategy;

impl ListingStrategy for ComplimentaryStrategy {}
