//! Deliverer collateral pool
//!
//! Holding at least the minimum stake gates eligibility for delivery
//! assignment. The platform can slash collateral as a penalty;
//! unstaking returns the full remaining stake via pull-payment
//! ordering (the record is zeroed before the amount leaves the pool).

use crate::config::SlashDisposition;
use crate::roles::RoleRegistry;
use crate::types::{Address, Amount, Role};
use crate::{Error, Result};
use std::collections::HashMap;

/// Escrow of deliverer collateral
#[derive(Debug)]
pub struct StakingPool {
    min_stake: Amount,
    disposition: SlashDisposition,

    stakes: HashMap<Address, Amount>,

    /// In-flight deliveries per deliverer; unstake is blocked while nonzero
    active_assignments: HashMap<Address, u32>,

    /// Forfeited funds awaiting platform collection (Retain policy)
    forfeited_reserve: Amount,

    /// Forfeited funds destroyed (Burn policy)
    burned_total: Amount,
}

impl StakingPool {
    /// Create pool with the qualification minimum and slash policy
    pub fn new(min_stake: Amount, disposition: SlashDisposition) -> Self {
        Self {
            min_stake,
            disposition,
            stakes: HashMap::new(),
            active_assignments: HashMap::new(),
            forfeited_reserve: 0,
            burned_total: 0,
        }
    }

    /// Add `deposit` to the caller's stake.
    ///
    /// A first-time stake must reach the minimum in one deposit;
    /// top-ups of an existing stake always succeed.
    pub fn stake(&mut self, caller: &Address, deposit: Amount) -> Result<()> {
        let current = self.staked_amount(caller);
        let total = current.checked_add(deposit).ok_or_else(|| {
            Error::Value(format!("Stake deposit overflows for {}", caller))
        })?;
        if current == 0 && total < self.min_stake {
            return Err(Error::InsufficientStake(format!(
                "Initial stake {} below minimum {}",
                total, self.min_stake
            )));
        }
        self.stakes.insert(caller.clone(), total);
        tracing::info!(deliverer = %caller, deposit, total, "stake deposited");
        Ok(())
    }

    /// True iff staked amount is at or above the minimum
    pub fn is_staked(&self, addr: &Address) -> bool {
        self.staked_amount(addr) >= self.min_stake
    }

    /// Current staked amount (zero for unknown addresses)
    pub fn staked_amount(&self, addr: &Address) -> Amount {
        self.stakes.get(addr).copied().unwrap_or(0)
    }

    /// Fail unless `addr` qualifies for assignment
    pub fn require_staked(&self, addr: &Address) -> Result<()> {
        if !self.is_staked(addr) {
            return Err(Error::InsufficientStake(format!(
                "{} has stake {} below minimum {}",
                addr,
                self.staked_amount(addr),
                self.min_stake
            )));
        }
        Ok(())
    }

    /// Reduce `addr`'s stake by `amount`, clamped at zero.
    ///
    /// Restricted to PLATFORM. Over-slashing is not an error; the
    /// stake simply zeroes. Returns the amount actually removed.
    pub fn slash(
        &mut self,
        roles: &RoleRegistry,
        caller: &Address,
        addr: &Address,
        amount: Amount,
    ) -> Result<Amount> {
        roles.require_role(Role::Platform, caller)?;

        let current = self.staked_amount(addr);
        let removed = amount.min(current);
        self.stakes.insert(addr.clone(), current - removed);

        match self.disposition {
            SlashDisposition::Retain => self.forfeited_reserve += removed,
            SlashDisposition::Burn => self.burned_total += removed,
        }

        tracing::warn!(deliverer = %addr, requested = amount, removed, "stake slashed");
        Ok(removed)
    }

    /// Zero the caller's stake and return the amount to transfer back.
    ///
    /// The record is zeroed before the amount is handed out. Blocked
    /// while the caller has deliveries in flight.
    pub fn unstake(&mut self, caller: &Address) -> Result<Amount> {
        let in_flight = self.active_assignments.get(caller).copied().unwrap_or(0);
        if in_flight > 0 {
            return Err(Error::State(format!(
                "{} has {} active deliveries",
                caller, in_flight
            )));
        }

        let amount = self.staked_amount(caller);
        if amount == 0 {
            return Err(Error::InsufficientBalance(format!(
                "{} has no stake to withdraw",
                caller
            )));
        }

        self.stakes.insert(caller.clone(), 0);
        tracing::info!(deliverer = %caller, amount, "stake withdrawn");
        Ok(amount)
    }

    /// Record the start of a delivery assignment for `addr`
    pub fn begin_assignment(&mut self, addr: &Address) {
        *self.active_assignments.entry(addr.clone()).or_insert(0) += 1;
    }

    /// Record the end of a delivery assignment for `addr`
    pub fn end_assignment(&mut self, addr: &Address) {
        if let Some(count) = self.active_assignments.get_mut(addr) {
            *count = count.saturating_sub(1);
        }
    }

    /// In-flight assignment count for `addr`
    pub fn active_assignments(&self, addr: &Address) -> u32 {
        self.active_assignments.get(addr).copied().unwrap_or(0)
    }

    /// Drain the forfeiture reserve; restricted to PLATFORM.
    ///
    /// The reserve is zeroed before the amount is handed out.
    pub fn collect_forfeited(&mut self, roles: &RoleRegistry, caller: &Address) -> Result<Amount> {
        roles.require_role(Role::Platform, caller)?;

        if self.forfeited_reserve == 0 {
            return Err(Error::InsufficientBalance(
                "Forfeiture reserve is empty".to_string(),
            ));
        }

        let amount = self.forfeited_reserve;
        self.forfeited_reserve = 0;
        Ok(amount)
    }

    /// Forfeited funds awaiting collection
    pub fn forfeited_reserve(&self) -> Amount {
        self.forfeited_reserve
    }

    /// Forfeited funds destroyed under the Burn policy
    pub fn burned_total(&self) -> Amount {
        self.burned_total
    }

    /// Configured slash policy
    pub fn disposition(&self) -> SlashDisposition {
        self.disposition
    }

    /// Sum of all live stakes
    pub fn total_staked(&self) -> Amount {
        self.stakes.values().sum()
    }
}
