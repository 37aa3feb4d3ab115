//! Configuration for the escrow engine

use crate::types::{Address, Amount, BPS_DENOMINATOR, UNIT};
use serde::{Deserialize, Serialize};

/// Disposition of slashed collateral.
///
/// The economic destination of forfeited stake is a policy decision,
/// so it is configured rather than hard-coded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "policy", rename_all = "snake_case")]
pub enum SlashDisposition {
    /// Forfeited funds accumulate in the pool reserve; PLATFORM drains
    /// them via `collect_forfeited` (pull-payment).
    Retain,
    /// Forfeited funds are destroyed; only a burn counter remains.
    Burn,
}

/// Escrow engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EscrowConfig {
    /// Minimum deliverer collateral to qualify for assignments (wei)
    pub min_deliverer_stake: Amount,

    /// Platform fee charged on top of food price (basis points)
    pub platform_fee_bps: u32,

    /// Restaurant share of the released escrow (basis points)
    pub restaurant_share_bps: u32,

    /// Deliverer share of the released escrow (basis points);
    /// the platform share is the remainder and absorbs all rounding
    pub deliverer_share_bps: u32,

    /// Reward = food price / divisor (truncating)
    pub reward_divisor: u128,

    /// Where slashed collateral goes
    pub slash_disposition: SlashDisposition,

    /// Root admin granted ADMIN at construction
    pub root_admin: Address,

    /// Payee of the platform share when escrow is released
    pub platform_treasury: Address,
}

impl Default for EscrowConfig {
    fn default() -> Self {
        Self {
            min_deliverer_stake: UNIT / 10, // 0.1 unit
            platform_fee_bps: 1000,         // 10% of food price
            restaurant_share_bps: 7000,     // 70%
            deliverer_share_bps: 2000,      // 20%
            reward_divisor: 10,
            slash_disposition: SlashDisposition::Retain,
            root_admin: Address::new("platform-admin"),
            platform_treasury: Address::new("platform-treasury"),
        }
    }
}

impl EscrowConfig {
    /// Load from file
    pub fn from_file(path: impl AsRef<std::path::Path>) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: EscrowConfig = toml::from_str(&content)
            .map_err(|e| crate::Error::Config(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load from environment variables
    pub fn from_env() -> crate::Result<Self> {
        let mut config = EscrowConfig::default();

        if let Ok(stake) = std::env::var("ESCROW_MIN_DELIVERER_STAKE") {
            config.min_deliverer_stake = stake
                .parse()
                .map_err(|e| crate::Error::Config(format!("Invalid minimum stake: {}", e)))?;
        }

        if let Ok(admin) = std::env::var("ESCROW_ROOT_ADMIN") {
            config.root_admin = Address::new(admin);
        }

        config.validate()?;
        Ok(config)
    }

    /// Validate configuration invariants
    pub fn validate(&self) -> crate::Result<()> {
        let shares = self.restaurant_share_bps as u128 + self.deliverer_share_bps as u128;
        if shares > BPS_DENOMINATOR {
            return Err(crate::Error::Config(format!(
                "Restaurant + deliverer shares ({} bps) exceed {} bps",
                shares, BPS_DENOMINATOR
            )));
        }
        if self.platform_fee_bps as u128 > BPS_DENOMINATOR {
            return Err(crate::Error::Config(format!(
                "Platform fee {} bps exceeds {} bps",
                self.platform_fee_bps, BPS_DENOMINATOR
            )));
        }
        if self.reward_divisor == 0 {
            return Err(crate::Error::Config(
                "Reward divisor must be nonzero".to_string(),
            ));
        }
        if self.min_deliverer_stake == 0 {
            return Err(crate::Error::Config(
                "Minimum deliverer stake must be nonzero".to_string(),
            ));
        }
        Ok(())
    }
}
