//! Escrow Core
//!
//! Leaf components of the delivery escrow engine: the capability
//! registry, the reward-token ledger, the deliverer collateral pool,
//! the pull-payment splitter, and the shared event log.
//!
//! # Invariants
//!
//! - Money conservation: every split's shares sum exactly to its input
//! - Pull payment: balances are zeroed before funds leave a component
//! - Capability gating: privileged calls check the registry first
//! - Atomicity: errors abort with zero partial mutation

#![forbid(unsafe_code)]
#![warn(
    missing_docs,
    rust_2018_idioms,
    missing_debug_implementations,
    clippy::all
)]

pub mod config;
pub mod error;
pub mod events;
pub mod roles;
pub mod splitter;
pub mod staking;
pub mod token;
pub mod types;

// Re-exports
pub use config::{EscrowConfig, SlashDisposition};
pub use error::{Error, Result};
pub use events::{Event, EventLog, EventRecord};
pub use roles::RoleRegistry;
pub use splitter::{PaymentSplitter, SplitShares};
pub use staking::StakingPool;
pub use token::RewardToken;
pub use types::{share_of, Address, Amount, Role, BPS_DENOMINATOR, UNIT};
