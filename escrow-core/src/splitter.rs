//! Pull-payment distributor
//!
//! Receives a released escrow lump sum and partitions it into per-party
//! pending balances. Shares are integer arithmetic with the platform
//! share absorbing the rounding remainder, so the three shares always
//! sum exactly to the input. Withdrawal zeroes the balance before the
//! amount leaves the splitter (checks-effects-interactions).

use crate::types::{share_of, Address, Amount};
use crate::{Error, Result};
use std::collections::HashMap;

/// Shares produced by one split
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SplitShares {
    /// Restaurant share (`amount * restaurant_bps / 10_000`)
    pub restaurant_share: Amount,
    /// Deliverer share (`amount * deliverer_bps / 10_000`)
    pub deliverer_share: Amount,
    /// Platform share (remainder; absorbs rounding)
    pub platform_share: Amount,
}

/// Pull-payment escrow balance distributor
#[derive(Debug)]
pub struct PaymentSplitter {
    restaurant_share_bps: u32,
    deliverer_share_bps: u32,

    balances: HashMap<Address, Amount>,

    /// Lifetime sum of all split amounts
    total_credited: Amount,

    /// Lifetime sum of all withdrawals
    total_withdrawn: Amount,
}

impl PaymentSplitter {
    /// Create splitter with the two explicit shares; the platform
    /// share is the remainder
    pub fn new(restaurant_share_bps: u32, deliverer_share_bps: u32) -> Self {
        Self {
            restaurant_share_bps,
            deliverer_share_bps,
            balances: HashMap::new(),
            total_credited: 0,
            total_withdrawn: 0,
        }
    }

    /// Partition `amount` into the three pending balances.
    ///
    /// Conservation: the three shares sum exactly to `amount`; no unit
    /// is ever lost to rounding.
    pub fn split_payment(
        &mut self,
        order_id: u64,
        restaurant: &Address,
        deliverer: &Address,
        platform: &Address,
        amount: Amount,
    ) -> Result<SplitShares> {
        if amount == 0 {
            return Err(Error::Value(format!(
                "Split for order {} requires a nonzero amount",
                order_id
            )));
        }

        let restaurant_share = share_of(amount, self.restaurant_share_bps)?;
        let deliverer_share = share_of(amount, self.deliverer_share_bps)?;
        let platform_share = amount - restaurant_share - deliverer_share;

        *self.balances.entry(restaurant.clone()).or_insert(0) += restaurant_share;
        *self.balances.entry(deliverer.clone()).or_insert(0) += deliverer_share;
        *self.balances.entry(platform.clone()).or_insert(0) += platform_share;
        self.total_credited += amount;

        tracing::info!(
            order_id,
            restaurant_share,
            deliverer_share,
            platform_share,
            "payment split"
        );

        Ok(SplitShares {
            restaurant_share,
            deliverer_share,
            platform_share,
        })
    }

    /// Zero the caller's pending balance and return the amount to pay
    /// out. The balance is zeroed before the amount leaves, so a
    /// reentrant second withdrawal finds nothing.
    pub fn withdraw(&mut self, caller: &Address) -> Result<Amount> {
        let amount = self.balance_of(caller);
        if amount == 0 {
            return Err(Error::InsufficientBalance(format!(
                "{} has no pending balance",
                caller
            )));
        }

        self.balances.insert(caller.clone(), 0);
        self.total_withdrawn += amount;
        tracing::info!(payee = %caller, amount, "balance withdrawn");
        Ok(amount)
    }

    /// Pure lookup
    pub fn balance_of(&self, addr: &Address) -> Amount {
        self.balances.get(addr).copied().unwrap_or(0)
    }

    /// Sum of all live pending balances
    pub fn total_pending(&self) -> Amount {
        self.balances.values().sum()
    }

    /// Lifetime credited amount
    pub fn total_credited(&self) -> Amount {
        self.total_credited
    }

    /// Lifetime withdrawn amount
    pub fn total_withdrawn(&self) -> Amount {
        self.total_withdrawn
    }
}
