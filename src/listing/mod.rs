//! Marketplace listings: the reference entity class.
//!
//! A listing is paid for in one of three ways, named by its `kind` token.
//! The way it is paid for decides what happens when it is scheduled or
//! opened, but the lifecycle itself is the same for all of them:
//!
//! ```text
//! Draft     -> Open | Scheduled | Closed
//! Scheduled -> Open | Draft | Closed
//! Open      -> Closed
//! ```

pub mod collaborators;
pub mod strategies;

pub use collaborators::{
    Charge, ChargeId, CreditId, CreditLedger, LedgerError, MemoryCreditLedger,
    MemoryPaymentGateway, PaymentError, PaymentGateway,
};
pub use strategies::{
    BillingStrategy, ComplimentaryStrategy, CreditStrategy, HookResult, ListingStrategy,
};

use crate::builder::{BuildError, RegistryBuilder, TransitionTableBuilder};
use crate::core::{Discriminator, Entity, TransitionTable};
use crate::fixtures::Fixture;
use crate::status_enum;
use crate::strategy::StrategyRegistry;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

/// Registered `kind` tokens.
pub mod kinds {
    pub const CREDIT: &str = "credit";
    pub const BILLING: &str = "billing";
    pub const COMPLIMENTARY: &str = "complimentary";
}

status_enum! {
    pub enum ListingStatus {
        Draft,
        Open,
        Scheduled,
        Closed,
    }
    final: [Closed]
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Listing {
    pub id: Uuid,
    pub owner: String,
    pub title: String,
    pub status: ListingStatus,
    pub kind: Discriminator,
    pub billing_reference: Option<String>,
    pub price_cents: u64,
    pub created_at: DateTime<Utc>,
}

impl Listing {
    /// A new draft listing.
    pub fn new(
        owner: impl Into<String>,
        title: impl Into<String>,
        kind: impl Into<Discriminator>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            owner: owner.into(),
            title: title.into(),
            status: ListingStatus::Draft,
            kind: kind.into(),
            billing_reference: None,
            price_cents: 0,
            created_at: Utc::now(),
        }
    }

    pub fn with_billing_reference(mut self, reference: impl Into<String>) -> Self {
        self.billing_reference = Some(reference.into());
        self
    }

    pub fn with_price(mut self, price_cents: u64) -> Self {
        self.price_cents = price_cents;
        self
    }

    pub fn with_status(mut self, status: ListingStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_kind(mut self, kind: impl Into<Discriminator>) -> Self {
        self.kind = kind.into();
        self
    }
}

impl Entity for Listing {
    type Id = Uuid;
    type Status = ListingStatus;

    fn id(&self) -> &Uuid {
        &self.id
    }

    fn status(&self) -> ListingStatus {
        self.status
    }

    fn set_status(&mut self, status: ListingStatus) {
        self.status = status;
    }

    fn discriminator(&self) -> &Discriminator {
        &self.kind
    }

    fn set_discriminator(&mut self, discriminator: Discriminator) {
        self.kind = discriminator;
    }
}

/// The listing lifecycle.
pub fn listing_table() -> Result<TransitionTable<ListingStatus>, BuildError> {
    use ListingStatus::*;

    TransitionTableBuilder::new()
        .initial(Draft)
        .allow_many(Draft, &[Open, Scheduled, Closed])
        .allow_many(Scheduled, &[Open, Draft, Closed])
        .allow(Open, Closed)
        .build()
}

/// Every listing variant, wired to its collaborators.
pub fn listing_registry(
    ledger: Arc<dyn CreditLedger>,
    gateway: Arc<dyn PaymentGateway>,
) -> Result<StrategyRegistry<Listing>, BuildError> {
    RegistryBuilder::new()
        .register(kinds::CREDIT, move |listing: &Listing| {
            CreditStrategy::new(listing, ledger.clone())
        })
        .register(kinds::BILLING, move |listing: &Listing| {
            BillingStrategy::new(listing, gateway.clone())
        })
        .register(kinds::COMPLIMENTARY, |_: &Listing| ComplimentaryStrategy)
        .build()
}

/// Named listing states for tests and demos.
///
/// Overlays: `billed` (billing kind with a card reference), `complimentary`,
/// `priced` (1500 cents), `scheduled`, `open`, `closed`, and `unregistered`
/// (a kind token no registry knows).
pub fn fixture(owner: &str) -> Fixture<Listing> {
    Fixture::new(Listing::new(owner, "Two-room loft", kinds::CREDIT))
        .overlay("billed", |l: Listing| {
            l.with_kind(kinds::BILLING).with_billing_reference("card-4242")
        })
        .overlay("complimentary", |l: Listing| l.with_kind(kinds::COMPLIMENTARY))
        .overlay("priced", |l: Listing| l.with_price(1500))
        .overlay("scheduled", |l: Listing| l.with_status(ListingStatus::Scheduled))
        .overlay("open", |l: Listing| l.with_status(ListingStatus::Open))
        .overlay("closed", |l: Listing| l.with_status(ListingStatus::Closed))
        .overlay("unregistered", |l: Listing| l.with_kind("legacy-tier"))
}
