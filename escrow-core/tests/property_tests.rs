//! Property-based tests for financial invariants
//!
//! These verify properties that must hold for all inputs, not just the
//! reference values: exact share conservation, truncating reward
//! arithmetic, and clamped slashing.

use escrow_core::{
    Address, PaymentSplitter, RewardToken, Role, RoleRegistry, SlashDisposition, StakingPool, UNIT,
};
use proptest::prelude::*;

fn parties() -> (Address, Address, Address) {
    (
        Address::new("resto"),
        Address::new("dave"),
        Address::new("platform"),
    )
}

fn platform_registry() -> (RoleRegistry, Address) {
    let admin = Address::new("admin");
    let platform = Address::new("platform");
    let mut registry = RoleRegistry::new(admin.clone());
    registry
        .grant_role(&admin, Role::Platform, platform.clone())
        .unwrap();
    (registry, platform)
}

proptest! {
    /// Property: the three shares always sum exactly to the input.
    #[test]
    fn split_conserves_amount(amount in 1u128..=1_000_000 * UNIT) {
        let mut splitter = PaymentSplitter::new(7000, 2000);
        let (resto, dave, platform) = parties();

        let shares = splitter
            .split_payment(1, &resto, &dave, &platform, amount)
            .unwrap();
        prop_assert_eq!(
            shares.restaurant_share + shares.deliverer_share + shares.platform_share,
            amount
        );
    }

    /// Property: explicit shares are truncating basis-point products.
    #[test]
    fn split_shares_are_floors(amount in 1u128..=1_000_000 * UNIT) {
        let mut splitter = PaymentSplitter::new(7000, 2000);
        let (resto, dave, platform) = parties();

        let shares = splitter
            .split_payment(1, &resto, &dave, &platform, amount)
            .unwrap();
        prop_assert_eq!(shares.restaurant_share, amount * 7000 / 10_000);
        prop_assert_eq!(shares.deliverer_share, amount * 2000 / 10_000);
        // Platform gets at least its floor share; it also absorbs the remainder.
        prop_assert!(shares.platform_share >= amount * 1000 / 10_000);
        prop_assert!(shares.platform_share < amount * 1000 / 10_000 + 2);
    }

    /// Property: pending balances equal credited minus withdrawn after
    /// any sequence of splits and withdrawals.
    #[test]
    fn splitter_conservation_under_withdrawals(
        amounts in prop::collection::vec(1u128..=1_000 * UNIT, 1..20),
        withdraw_resto in any::<bool>(),
        withdraw_dave in any::<bool>(),
    ) {
        let mut splitter = PaymentSplitter::new(7000, 2000);
        let (resto, dave, platform) = parties();

        for (i, amount) in amounts.iter().enumerate() {
            splitter
                .split_payment(i as u64, &resto, &dave, &platform, *amount)
                .unwrap();
        }
        if withdraw_resto {
            splitter.withdraw(&resto).unwrap();
        }
        if withdraw_dave {
            splitter.withdraw(&dave).unwrap();
        }

        prop_assert_eq!(
            splitter.total_pending(),
            splitter.total_credited() - splitter.total_withdrawn()
        );
    }

    /// Property: reward is the truncating tenth for all food prices.
    #[test]
    fn reward_is_floor_tenth(food_price in 0u128..=1_000_000 * UNIT) {
        let token = RewardToken::new(Address::new("ledger"), 10);
        prop_assert_eq!(token.calculate_reward(food_price), food_price / 10);
    }

    /// Property: slashing never drives a stake negative and removes
    /// exactly min(requested, stake).
    #[test]
    fn slash_clamps_at_zero(
        stake in (UNIT / 10)..=100 * UNIT,
        slash in 0u128..=200 * UNIT,
    ) {
        let mut pool = StakingPool::new(UNIT / 10, SlashDisposition::Retain);
        let (registry, platform) = platform_registry();
        let dave = Address::new("dave");

        pool.stake(&dave, stake).unwrap();
        let removed = pool.slash(&registry, &platform, &dave, slash).unwrap();

        prop_assert_eq!(removed, slash.min(stake));
        prop_assert_eq!(pool.staked_amount(&dave), stake - removed);
        prop_assert_eq!(pool.forfeited_reserve(), removed);
    }

    /// Property: qualification is exactly the minimum-stake threshold.
    #[test]
    fn staking_qualification_threshold(deposit in 0u128..=UNIT) {
        let min = UNIT / 10;
        let mut pool = StakingPool::new(min, SlashDisposition::Retain);
        let dave = Address::new("dave");

        let result = pool.stake(&dave, deposit);
        if deposit >= min {
            prop_assert!(result.is_ok());
            prop_assert!(pool.is_staked(&dave));
        } else {
            prop_assert!(result.is_err());
            prop_assert!(!pool.is_staked(&dave));
        }
    }

    /// Property: mint then burn round-trips balance and supply.
    #[test]
    fn mint_burn_round_trip(minted in 0u128..=1_000 * UNIT, burned in 0u128..=1_000 * UNIT) {
        let minter = Address::new("ledger");
        let client = Address::new("client");
        let mut token = RewardToken::new(minter.clone(), 10);

        token.mint(&minter, &client, minted).unwrap();
        let burn = token.burn(&client, burned);

        if burned <= minted {
            prop_assert!(burn.is_ok());
            prop_assert_eq!(token.balance_of(&client), minted - burned);
            prop_assert_eq!(token.total_supply(), minted - burned);
        } else {
            prop_assert!(burn.is_err());
            prop_assert_eq!(token.balance_of(&client), minted);
        }
    }
}
