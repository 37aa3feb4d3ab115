//! Order ledger orchestration layer
//!
//! The top-level state machine. It owns the capability registry, the
//! reward token, the staking pool, the payment splitter, the order
//! table, and the event log, and it holds every order's escrow between
//! creation and delivery confirmation.
//!
//! Every operation validates completely before its first mutation, so
//! a rejected call leaves escrow, stakes, balances, and token supply
//! exactly as they were.

use crate::{
    config::Config,
    metrics::Metrics,
    types::{Order, OrderState},
};
use chrono::Utc;
use escrow_core::{
    share_of, Address, Amount, Error, Event, EventLog, EventRecord, PaymentSplitter, Result,
    RewardToken, Role, RoleRegistry, StakingPool,
};
use std::collections::BTreeMap;
use tokio::sync::broadcast;

/// The escrow/order-lifecycle engine
pub struct OrderLedger {
    /// Capability table consulted before every privileged call
    roles: RoleRegistry,

    /// Reward-token ledger; this service is the sole minter
    token: RewardToken,

    /// Deliverer collateral pool
    pool: StakingPool,

    /// Pull-payment distributor for released escrow
    splitter: PaymentSplitter,

    /// Order table, keyed by monotonically increasing id
    orders: BTreeMap<u64, Order>,

    /// Next order id to allocate
    next_order_id: u64,

    /// Escrow currently held across all open orders
    escrow_held: Amount,

    /// Append-only notification log
    events: EventLog,

    /// Prometheus metrics
    metrics: Metrics,

    /// Configuration
    config: Config,
}

impl OrderLedger {
    /// Build the engine from configuration.
    ///
    /// Wiring acts as the root admin once, to grant MINTER to the
    /// service's own address; afterwards all grants go through
    /// `grant_role`.
    pub fn new(config: Config) -> Result<Self> {
        config.escrow.validate()?;

        let mut roles = RoleRegistry::new(config.escrow.root_admin.clone());
        roles.grant_role(
            &config.escrow.root_admin,
            Role::Minter,
            config.service_address.clone(),
        )?;

        let token = RewardToken::new(config.service_address.clone(), config.escrow.reward_divisor);
        let pool = StakingPool::new(
            config.escrow.min_deliverer_stake,
            config.escrow.slash_disposition,
        );
        let splitter = PaymentSplitter::new(
            config.escrow.restaurant_share_bps,
            config.escrow.deliverer_share_bps,
        );
        let metrics = Metrics::new()
            .map_err(|e| Error::Config(format!("Failed to create metrics: {}", e)))?;

        Ok(Self {
            roles,
            token,
            pool,
            splitter,
            orders: BTreeMap::new(),
            next_order_id: 1,
            escrow_held: 0,
            events: EventLog::new(),
            metrics,
            config,
        })
    }

    // ------------------------------------------------------------------
    // Order lifecycle
    // ------------------------------------------------------------------

    /// Escrow a new order.
    ///
    /// The platform fee is derived from the food price; the attached
    /// value must equal food + delivery + platform fee exactly.
    pub fn create_order(
        &mut self,
        client: &Address,
        restaurant: &Address,
        food_price: Amount,
        delivery_fee: Amount,
        metadata_uri: String,
        attached_value: Amount,
    ) -> Result<u64> {
        let platform_fee = share_of(food_price, self.config.escrow.platform_fee_bps)?;
        let total = food_price
            .checked_add(delivery_fee)
            .and_then(|t| t.checked_add(platform_fee))
            .ok_or_else(|| Error::Value("Order total overflows".to_string()))?;

        if total == 0 {
            return Err(Error::Value("Order total must be nonzero".to_string()));
        }
        if attached_value != total {
            return Err(Error::Value(format!(
                "Attached value {} does not match required total {} (food {} + delivery {} + platform {})",
                attached_value, total, food_price, delivery_fee, platform_fee
            )));
        }

        let id = self.next_order_id;
        self.next_order_id += 1;

        let order = Order {
            id,
            client: client.clone(),
            restaurant: restaurant.clone(),
            deliverer: None,
            food_price,
            delivery_fee,
            platform_fee,
            total_escrowed: total,
            metadata_uri,
            state: OrderState::Created,
            delivered: false,
            created_at: Utc::now(),
            completed_at: None,
        };
        self.orders.insert(id, order);
        self.escrow_held += total;

        self.events.append(Event::OrderCreated {
            order_id: id,
            client: client.clone(),
            restaurant: restaurant.clone(),
            total_escrowed: total,
        });
        self.metrics.record_order_created(self.escrow_held);
        tracing::info!(order_id = id, client = %client, total, "order escrowed");

        Ok(id)
    }

    /// Restaurant confirms it is preparing the order
    pub fn confirm_preparation(&mut self, caller: &Address, id: u64) -> Result<()> {
        let order = self.order(id)?;
        Self::require_state(order, OrderState::Created, "confirm_preparation")?;
        self.roles.require_role(Role::Restaurant, caller)?;
        if *caller != order.restaurant {
            return Err(Error::Authorization(format!(
                "{} is not the restaurant for order {}",
                caller, id
            )));
        }

        self.transition(id, OrderState::Preparing)
    }

    /// Platform assigns a collateralized deliverer
    pub fn assign_deliverer(
        &mut self,
        caller: &Address,
        id: u64,
        deliverer: &Address,
    ) -> Result<()> {
        let order = self.order(id)?;
        Self::require_state(order, OrderState::Preparing, "assign_deliverer")?;
        self.roles.require_role(Role::Platform, caller)?;
        self.pool.require_staked(deliverer)?;

        self.pool.begin_assignment(deliverer);
        if let Some(order) = self.orders.get_mut(&id) {
            order.deliverer = Some(deliverer.clone());
        }

        self.transition(id, OrderState::Assigned)
    }

    /// Assigned deliverer confirms pickup at the restaurant
    pub fn confirm_pickup(&mut self, caller: &Address, id: u64) -> Result<()> {
        let order = self.order(id)?;
        Self::require_state(order, OrderState::Assigned, "confirm_pickup")?;
        self.roles.require_role(Role::Deliverer, caller)?;
        if order.deliverer.as_ref() != Some(caller) {
            return Err(Error::Authorization(format!(
                "{} is not the assigned deliverer for order {}",
                caller, id
            )));
        }

        self.transition(id, OrderState::PickedUp)
    }

    /// Client confirms delivery: releases the escrow through the
    /// splitter and mints the client's reward.
    ///
    /// All checks (state, caller, minter capability) precede the first
    /// mutation; neither the split (total is nonzero by creation) nor
    /// the mint (capability pre-checked) can fail afterwards, so the
    /// call commits as a whole.
    pub fn confirm_delivery(&mut self, caller: &Address, id: u64) -> Result<()> {
        let order = self.order(id)?;
        Self::require_state(order, OrderState::PickedUp, "confirm_delivery")?;
        if *caller != order.client {
            return Err(Error::Authorization(format!(
                "{} is not the client for order {}",
                caller, id
            )));
        }
        let deliverer = order.deliverer.clone().ok_or_else(|| {
            Error::State(format!("Order {} has no assigned deliverer", id))
        })?;
        let service = self.config.service_address.clone();
        self.token.require_minter(&service)?;
        self.roles.require_role(Role::Minter, &service)?;

        let restaurant = order.restaurant.clone();
        let client = order.client.clone();
        let platform = self.config.escrow.platform_treasury.clone();
        let total = order.total_escrowed;
        let food_price = order.food_price;

        let shares = self
            .splitter
            .split_payment(id, &restaurant, &deliverer, &platform, total)?;
        self.events.append(Event::PaymentSplit {
            order_id: id,
            restaurant,
            deliverer: deliverer.clone(),
            platform,
            restaurant_share: shares.restaurant_share,
            deliverer_share: shares.deliverer_share,
            platform_share: shares.platform_share,
        });

        let reward = self.token.calculate_reward(food_price);
        self.token.mint(&service, &client, reward)?;
        self.events.append(Event::RewardMinted {
            to: client,
            amount: reward,
        });

        self.pool.end_assignment(&deliverer);
        self.escrow_held -= total;

        if let Some(order) = self.orders.get_mut(&id) {
            order.delivered = true;
            order.completed_at = Some(Utc::now());
        }
        self.transition(id, OrderState::Delivered)?;
        self.metrics.record_order_delivered(self.escrow_held);

        Ok(())
    }

    /// Client cancels an order the restaurant has not yet confirmed.
    ///
    /// The escrow record is zeroed before the refund amount is handed
    /// back. Later states are not refundable.
    pub fn cancel_order(&mut self, caller: &Address, id: u64) -> Result<Amount> {
        let order = self.order(id)?;
        Self::require_state(order, OrderState::Created, "cancel_order")?;
        if *caller != order.client {
            return Err(Error::Authorization(format!(
                "{} is not the client for order {}",
                caller, id
            )));
        }

        let refund = order.total_escrowed;
        let client = order.client.clone();

        self.escrow_held -= refund;
        self.transition(id, OrderState::Cancelled)?;
        self.events.append(Event::OrderCancelled {
            order_id: id,
            client,
            refund,
        });
        self.metrics.record_order_cancelled(self.escrow_held);

        Ok(refund)
    }

    /// Pure read of an order
    pub fn get_order(&self, id: u64) -> Result<Order> {
        self.order(id).cloned()
    }

    // ------------------------------------------------------------------
    // Staking
    // ------------------------------------------------------------------

    /// Deposit deliverer collateral
    pub fn stake(&mut self, caller: &Address, deposit: Amount) -> Result<()> {
        self.pool.stake(caller, deposit)?;
        self.metrics.update_total_staked(self.pool.total_staked());
        Ok(())
    }

    /// True iff `addr` qualifies for delivery assignment
    pub fn is_staked(&self, addr: &Address) -> bool {
        self.pool.is_staked(addr)
    }

    /// Current staked amount
    pub fn staked_amount(&self, addr: &Address) -> Amount {
        self.pool.staked_amount(addr)
    }

    /// Platform slashes a deliverer's collateral
    pub fn slash(&mut self, caller: &Address, addr: &Address, amount: Amount) -> Result<Amount> {
        let removed = self.pool.slash(&self.roles, caller, addr, amount)?;
        self.events.append(Event::Slashed {
            deliverer: addr.clone(),
            amount: removed,
            disposition: self.pool.disposition(),
        });
        self.metrics.record_slash();
        self.metrics.update_total_staked(self.pool.total_staked());
        Ok(removed)
    }

    /// Return the caller's full stake (blocked while assigned)
    pub fn unstake(&mut self, caller: &Address) -> Result<Amount> {
        let amount = self.pool.unstake(caller)?;
        self.events.append(Event::Unstaked {
            deliverer: caller.clone(),
            amount,
        });
        self.metrics.update_total_staked(self.pool.total_staked());
        Ok(amount)
    }

    /// Platform drains the forfeiture reserve
    pub fn collect_forfeited(&mut self, caller: &Address) -> Result<Amount> {
        let amount = self.pool.collect_forfeited(&self.roles, caller)?;
        self.events.append(Event::ForfeitureCollected {
            platform: caller.clone(),
            amount,
        });
        Ok(amount)
    }

    // ------------------------------------------------------------------
    // Payments and rewards
    // ------------------------------------------------------------------

    /// Withdraw the caller's pending balance (pull payment)
    pub fn withdraw(&mut self, caller: &Address) -> Result<Amount> {
        let amount = self.splitter.withdraw(caller)?;
        self.events.append(Event::Withdrawal {
            payee: caller.clone(),
            amount,
        });
        Ok(amount)
    }

    /// Pending splitter balance
    pub fn splitter_balance(&self, addr: &Address) -> Amount {
        self.splitter.balance_of(addr)
    }

    /// Burn reward tokens from the caller's own balance
    pub fn burn(&mut self, caller: &Address, amount: Amount) -> Result<()> {
        self.token.burn(caller, amount)
    }

    /// Reward-token balance
    pub fn token_balance(&self, addr: &Address) -> Amount {
        self.token.balance_of(addr)
    }

    /// Reward-token total supply
    pub fn token_supply(&self) -> Amount {
        self.token.total_supply()
    }

    // ------------------------------------------------------------------
    // Roles
    // ------------------------------------------------------------------

    /// Grant a role (ADMIN-gated)
    pub fn grant_role(&mut self, caller: &Address, role: Role, addr: Address) -> Result<()> {
        self.roles.grant_role(caller, role, addr)
    }

    /// Revoke a role (ADMIN-gated)
    pub fn revoke_role(&mut self, caller: &Address, role: Role, addr: &Address) -> Result<()> {
        self.roles.revoke_role(caller, role, addr)
    }

    /// Pure capability lookup
    pub fn has_role(&self, role: Role, addr: &Address) -> bool {
        self.roles.has_role(role, addr)
    }

    // ------------------------------------------------------------------
    // Observability
    // ------------------------------------------------------------------

    /// Events at or after `seq` (polling interface)
    pub fn events_since(&self, seq: u64) -> Vec<EventRecord> {
        self.events.events_since(seq).to_vec()
    }

    /// Subscribe to future events
    pub fn subscribe_events(&self) -> broadcast::Receiver<EventRecord> {
        self.events.subscribe()
    }

    /// Number of events appended
    pub fn event_count(&self) -> usize {
        self.events.len()
    }

    /// Escrow currently held across all open orders
    pub fn escrow_held(&self) -> Amount {
        self.escrow_held
    }

    /// Metrics collector
    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    fn order(&self, id: u64) -> Result<&Order> {
        self.orders
            .get(&id)
            .ok_or_else(|| Error::NotFound(format!("Order {}", id)))
    }

    fn require_state(order: &Order, expected: OrderState, op: &str) -> Result<()> {
        if order.state != expected {
            return Err(Error::State(format!(
                "{} requires order {} in {}, found {}",
                op, order.id, expected, order.state
            )));
        }
        Ok(())
    }

    /// Advance an order one state, enforcing adjacency, and emit the
    /// transition marker.
    fn transition(&mut self, id: u64, to: OrderState) -> Result<()> {
        let order = self
            .orders
            .get_mut(&id)
            .ok_or_else(|| Error::NotFound(format!("Order {}", id)))?;
        if !order.state.can_advance_to(to) {
            return Err(Error::State(format!(
                "Order {} cannot advance from {} to {}",
                id, order.state, to
            )));
        }
        let from = order.state;
        order.state = to;
        tracing::info!(order_id = id, from = %from, to = %to, "order transition");
        self.events.append(Event::OrderTransition {
            order_id: id,
            from: from.code().to_string(),
            to: to.code().to_string(),
        });
        Ok(())
    }
}
