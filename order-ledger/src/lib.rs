//! Order Ledger
//!
//! The escrow/order-lifecycle engine for multi-party food delivery.
//! Funds are escrowed at order creation and released in a fixed split
//! only when delivery is mutually confirmed; a collateral pool gates
//! deliverer assignment and a reward ledger mints an incentive
//! proportional to order value.
//!
//! # Architecture
//!
//! - **Single writer**: one actor task owns all state; operations are
//!   applied in submission order with no partial mutation
//! - **Capability gating**: every privileged call checks the role
//!   registry before touching state
//! - **Pull payment**: released funds sit as pending balances until
//!   each payee withdraws; balances are zeroed before payout
//!
//! # Invariants
//!
//! - `total_escrowed == food_price + delivery_fee + platform_fee`
//! - Split shares always sum exactly to the released escrow
//! - Order states only ever advance forward in the fixed sequence

#![forbid(unsafe_code)]
#![warn(
    missing_docs,
    rust_2018_idioms,
    missing_debug_implementations,
    clippy::all
)]

pub mod actor;
pub mod config;
pub mod ledger;
pub mod metrics;
pub mod types;

// Re-exports
pub use actor::{spawn_ledger_actor, LedgerHandle};
pub use config::Config;
pub use escrow_core::{Error, Result};
pub use ledger::OrderLedger;
pub use metrics::Metrics;
pub use types::{Order, OrderState};
