//! Reward token: mintable/burnable incentive ledger
//!
//! Minting is restricted to the single authorized minter (the order
//! ledger service); burning is self-service and caller-scoped.

use crate::types::{Address, Amount};
use crate::{Error, Result};
use std::collections::HashMap;

/// Reward token balance ledger
#[derive(Debug)]
pub struct RewardToken {
    /// Only address allowed to mint
    minter: Address,

    /// Reward = food price / divisor (truncating)
    reward_divisor: u128,

    balances: HashMap<Address, Amount>,
    total_supply: Amount,
}

impl RewardToken {
    /// Create ledger with the authorized minter
    pub fn new(minter: Address, reward_divisor: u128) -> Self {
        Self {
            minter,
            reward_divisor,
            balances: HashMap::new(),
            total_supply: 0,
        }
    }

    /// Mint `amount` to `to`; caller must be the authorized minter
    pub fn mint(&mut self, caller: &Address, to: &Address, amount: Amount) -> Result<()> {
        self.require_minter(caller)?;
        *self.balances.entry(to.clone()).or_insert(0) += amount;
        self.total_supply += amount;
        tracing::debug!(to = %to, amount, "reward minted");
        Ok(())
    }

    /// Burn `amount` from the caller's own balance.
    ///
    /// Validation happens before any mutation; a rejected burn leaves
    /// the ledger untouched.
    pub fn burn(&mut self, caller: &Address, amount: Amount) -> Result<()> {
        let balance = self.balance_of(caller);
        if amount > balance {
            return Err(Error::InsufficientBalance(format!(
                "Burn of {} exceeds balance {} of {}",
                amount, balance, caller
            )));
        }
        self.balances.insert(caller.clone(), balance - amount);
        self.total_supply -= amount;
        Ok(())
    }

    /// Reward owed for an order: `food_price / divisor`, truncating
    pub fn calculate_reward(&self, food_price: Amount) -> Amount {
        food_price / self.reward_divisor
    }

    /// Pure lookup
    pub fn balance_of(&self, addr: &Address) -> Amount {
        self.balances.get(addr).copied().unwrap_or(0)
    }

    /// Total minted minus total burned
    pub fn total_supply(&self) -> Amount {
        self.total_supply
    }

    /// Fail unless `caller` is the authorized minter
    pub fn require_minter(&self, caller: &Address) -> Result<()> {
        if *caller != self.minter {
            return Err(Error::Authorization(format!(
                "{} does not hold MINTER",
                caller
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::UNIT;

    fn token() -> (RewardToken, Address) {
        let minter = Address::new("ledger");
        (RewardToken::new(minter.clone(), 10), minter)
    }

    #[test]
    fn test_mint_by_minter() {
        let (mut token, minter) = token();
        let client = Address::new("client");

        token.mint(&minter, &client, 100).unwrap();
        assert_eq!(token.balance_of(&client), 100);
        assert_eq!(token.total_supply(), 100);
    }

    #[test]
    fn test_mint_by_other_rejected() {
        let (mut token, _) = token();
        let mallory = Address::new("mallory");

        let result = token.mint(&mallory.clone(), &mallory, 100);
        assert!(matches!(result, Err(Error::Authorization(_))));
        assert_eq!(token.total_supply(), 0);
    }

    #[test]
    fn test_burn_within_balance() {
        let (mut token, minter) = token();
        let client = Address::new("client");

        token.mint(&minter, &client, 100).unwrap();
        token.burn(&client, 40).unwrap();
        assert_eq!(token.balance_of(&client), 60);
        assert_eq!(token.total_supply(), 60);
    }

    #[test]
    fn test_burn_over_balance_rejected() {
        let (mut token, minter) = token();
        let client = Address::new("client");

        token.mint(&minter, &client, 10).unwrap();
        let result = token.burn(&client, 11);
        assert!(matches!(result, Err(Error::InsufficientBalance(_))));
        assert_eq!(token.balance_of(&client), 10);
    }

    #[test]
    fn test_burn_from_unknown_address_rejected() {
        let (mut token, minter) = token();
        let client = Address::new("client");
        let stranger = Address::new("stranger");

        token.mint(&minter, &client, 10).unwrap();
        let result = token.burn(&stranger, 1);
        assert!(matches!(result, Err(Error::InsufficientBalance(_))));

        // The rejected burn created no balance entry and touched no totals.
        assert_eq!(token.balance_of(&stranger), 0);
        assert_eq!(token.total_supply(), 10);
    }

    #[test]
    fn test_calculate_reward_truncates() {
        let (token, _) = token();
        assert_eq!(token.calculate_reward(0), 0);
        assert_eq!(token.calculate_reward(9), 0);
        assert_eq!(token.calculate_reward(10), 1);
        assert_eq!(token.calculate_reward(19), 1);
        assert_eq!(token.calculate_reward(UNIT), UNIT / 10);
    }
}
