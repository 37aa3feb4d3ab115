//! Core types for the escrow engine
//!
//! All types are designed for:
//! - Exact arithmetic (integer amounts in the smallest native unit)
//! - Deterministic serialization (serde)
//! - Closed enumerations for roles (no open strings)

use serde::{Deserialize, Serialize};
use std::fmt;

/// Monetary amount in the smallest native unit ("wei").
///
/// No floating point is used anywhere in the core; all shares and fees
/// are computed with truncating integer arithmetic.
pub type Amount = u128;

/// One whole native-currency unit.
pub const UNIT: Amount = 1_000_000_000_000_000_000;

/// Basis-point denominator for fee and share arithmetic.
pub const BPS_DENOMINATOR: u128 = 10_000;

/// Party address (client, restaurant, deliverer, platform, ...)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Address(String);

impl Address {
    /// Create new address
    pub fn new(addr: impl Into<String>) -> Self {
        Self(addr.into())
    }

    /// Get as string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Address {
    fn from(s: &str) -> Self {
        Address::new(s)
    }
}

/// Capability role checked before privileged operations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Role {
    /// May confirm preparation of its own orders
    Restaurant = 1,
    /// May confirm pickup of its assigned orders
    Deliverer = 2,
    /// May assign deliverers, slash stakes, collect forfeitures
    Platform = 3,
    /// May mint reward tokens (held by the ledger service itself)
    Minter = 4,
    /// May grant and revoke all roles
    Admin = 5,
}

impl Role {
    /// Stable symbolic identifier, exposed for external role-management tooling
    pub fn code(&self) -> &'static str {
        match self {
            Role::Restaurant => "RESTAURANT",
            Role::Deliverer => "DELIVERER",
            Role::Platform => "PLATFORM",
            Role::Minter => "MINTER",
            Role::Admin => "ADMIN",
        }
    }

    /// Parse from symbolic identifier
    pub fn from_code(s: &str) -> Option<Self> {
        match s {
            "RESTAURANT" => Some(Role::Restaurant),
            "DELIVERER" => Some(Role::Deliverer),
            "PLATFORM" => Some(Role::Platform),
            "MINTER" => Some(Role::Minter),
            "ADMIN" => Some(Role::Admin),
            _ => None,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Truncating basis-point share: `amount * bps / 10_000`.
///
/// Rejects amounts whose scaling would overflow `u128`; money
/// arithmetic never wraps.
pub fn share_of(amount: Amount, bps: u32) -> crate::Result<Amount> {
    amount
        .checked_mul(bps as u128)
        .map(|scaled| scaled / BPS_DENOMINATOR)
        .ok_or_else(|| {
            crate::Error::Value(format!(
                "Share computation overflows for amount {}",
                amount
            ))
        })
}
