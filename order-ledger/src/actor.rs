//! Actor-based concurrency for the order ledger
//!
//! Implements the single-writer pattern with a Tokio actor: one task
//! owns the entire engine state and drains a bounded mailbox, so
//! mutating operations are applied one at a time in submission order.
//! No other locking is needed; `LedgerHandle` is the only way in.

use crate::{
    config::Config,
    ledger::OrderLedger,
    types::Order,
};
use escrow_core::{Address, Amount, Error, EventRecord, Result, Role};
use tokio::sync::{broadcast, mpsc, oneshot};

/// Message sent to the ledger actor
pub enum LedgerMessage {
    /// Escrow a new order
    CreateOrder {
        /// Paying client
        client: Address,
        /// Receiving restaurant
        restaurant: Address,
        /// Food price (wei)
        food_price: Amount,
        /// Delivery fee (wei)
        delivery_fee: Amount,
        /// Opaque metadata reference
        metadata_uri: String,
        /// Value attached by the client
        attached_value: Amount,
        /// Reply channel
        response: oneshot::Sender<Result<u64>>,
    },

    /// Restaurant confirms preparation
    ConfirmPreparation {
        /// Calling address
        caller: Address,
        /// Order id
        id: u64,
        /// Reply channel
        response: oneshot::Sender<Result<()>>,
    },

    /// Platform assigns a deliverer
    AssignDeliverer {
        /// Calling address
        caller: Address,
        /// Order id
        id: u64,
        /// Deliverer to assign
        deliverer: Address,
        /// Reply channel
        response: oneshot::Sender<Result<()>>,
    },

    /// Deliverer confirms pickup
    ConfirmPickup {
        /// Calling address
        caller: Address,
        /// Order id
        id: u64,
        /// Reply channel
        response: oneshot::Sender<Result<()>>,
    },

    /// Client confirms delivery
    ConfirmDelivery {
        /// Calling address
        caller: Address,
        /// Order id
        id: u64,
        /// Reply channel
        response: oneshot::Sender<Result<()>>,
    },

    /// Client cancels an unprepared order
    CancelOrder {
        /// Calling address
        caller: Address,
        /// Order id
        id: u64,
        /// Reply channel carrying the refund
        response: oneshot::Sender<Result<Amount>>,
    },

    /// Read an order
    GetOrder {
        /// Order id
        id: u64,
        /// Reply channel
        response: oneshot::Sender<Result<Order>>,
    },

    /// Deposit deliverer collateral
    Stake {
        /// Calling address
        caller: Address,
        /// Deposit (wei)
        deposit: Amount,
        /// Reply channel
        response: oneshot::Sender<Result<()>>,
    },

    /// Withdraw the caller's full stake
    Unstake {
        /// Calling address
        caller: Address,
        /// Reply channel carrying the returned stake
        response: oneshot::Sender<Result<Amount>>,
    },

    /// Platform slashes collateral
    Slash {
        /// Calling address
        caller: Address,
        /// Penalized deliverer
        addr: Address,
        /// Requested slash amount
        amount: Amount,
        /// Reply channel carrying the amount removed
        response: oneshot::Sender<Result<Amount>>,
    },

    /// Platform drains the forfeiture reserve
    CollectForfeited {
        /// Calling address
        caller: Address,
        /// Reply channel carrying the collected amount
        response: oneshot::Sender<Result<Amount>>,
    },

    /// Qualification lookup
    IsStaked {
        /// Address to check
        addr: Address,
        /// Reply channel
        response: oneshot::Sender<bool>,
    },

    /// Stake lookup
    StakedAmount {
        /// Address to check
        addr: Address,
        /// Reply channel
        response: oneshot::Sender<Amount>,
    },

    /// Withdraw the caller's pending balance
    Withdraw {
        /// Calling address
        caller: Address,
        /// Reply channel carrying the paid amount
        response: oneshot::Sender<Result<Amount>>,
    },

    /// Pending balance lookup
    SplitterBalance {
        /// Address to check
        addr: Address,
        /// Reply channel
        response: oneshot::Sender<Amount>,
    },

    /// Burn reward tokens from the caller's balance
    Burn {
        /// Calling address
        caller: Address,
        /// Amount to burn
        amount: Amount,
        /// Reply channel
        response: oneshot::Sender<Result<()>>,
    },

    /// Reward-token balance lookup
    TokenBalance {
        /// Address to check
        addr: Address,
        /// Reply channel
        response: oneshot::Sender<Amount>,
    },

    /// Grant a role
    GrantRole {
        /// Calling address (must hold ADMIN)
        caller: Address,
        /// Role to grant
        role: Role,
        /// Grantee
        addr: Address,
        /// Reply channel
        response: oneshot::Sender<Result<()>>,
    },

    /// Revoke a role
    RevokeRole {
        /// Calling address (must hold ADMIN)
        caller: Address,
        /// Role to revoke
        role: Role,
        /// Holder
        addr: Address,
        /// Reply channel
        response: oneshot::Sender<Result<()>>,
    },

    /// Capability lookup
    HasRole {
        /// Role to check
        role: Role,
        /// Address to check
        addr: Address,
        /// Reply channel
        response: oneshot::Sender<bool>,
    },

    /// Poll the event log
    EventsSince {
        /// Starting sequence number
        seq: u64,
        /// Reply channel
        response: oneshot::Sender<Vec<EventRecord>>,
    },

    /// Subscribe to future events
    SubscribeEvents {
        /// Reply channel carrying the broadcast receiver
        response: oneshot::Sender<broadcast::Receiver<EventRecord>>,
    },

    /// Escrow held lookup
    EscrowHeld {
        /// Reply channel
        response: oneshot::Sender<Amount>,
    },

    /// Shutdown actor
    Shutdown,
}

/// Actor that owns the engine and processes messages sequentially
pub struct OrderLedgerActor {
    ledger: OrderLedger,
    mailbox: mpsc::Receiver<LedgerMessage>,
}

impl OrderLedgerActor {
    /// Create new actor
    pub fn new(ledger: OrderLedger, mailbox: mpsc::Receiver<LedgerMessage>) -> Self {
        Self { ledger, mailbox }
    }

    /// Run the actor event loop
    pub async fn run(mut self) {
        while let Some(msg) = self.mailbox.recv().await {
            if matches!(msg, LedgerMessage::Shutdown) {
                break;
            }
            self.handle_message(msg);
        }
        tracing::info!("order ledger actor stopped");
    }

    /// Handle a single message; each arm runs to completion before the
    /// next message is taken, which gives the total operation order.
    fn handle_message(&mut self, msg: LedgerMessage) {
        match msg {
            LedgerMessage::CreateOrder {
                client,
                restaurant,
                food_price,
                delivery_fee,
                metadata_uri,
                attached_value,
                response,
            } => {
                let result = self.ledger.create_order(
                    &client,
                    &restaurant,
                    food_price,
                    delivery_fee,
                    metadata_uri,
                    attached_value,
                );
                let _ = response.send(result);
            }

            LedgerMessage::ConfirmPreparation { caller, id, response } => {
                let _ = response.send(self.ledger.confirm_preparation(&caller, id));
            }

            LedgerMessage::AssignDeliverer {
                caller,
                id,
                deliverer,
                response,
            } => {
                let _ = response.send(self.ledger.assign_deliverer(&caller, id, &deliverer));
            }

            LedgerMessage::ConfirmPickup { caller, id, response } => {
                let _ = response.send(self.ledger.confirm_pickup(&caller, id));
            }

            LedgerMessage::ConfirmDelivery { caller, id, response } => {
                let _ = response.send(self.ledger.confirm_delivery(&caller, id));
            }

            LedgerMessage::CancelOrder { caller, id, response } => {
                let _ = response.send(self.ledger.cancel_order(&caller, id));
            }

            LedgerMessage::GetOrder { id, response } => {
                let _ = response.send(self.ledger.get_order(id));
            }

            LedgerMessage::Stake {
                caller,
                deposit,
                response,
            } => {
                let _ = response.send(self.ledger.stake(&caller, deposit));
            }

            LedgerMessage::Unstake { caller, response } => {
                let _ = response.send(self.ledger.unstake(&caller));
            }

            LedgerMessage::Slash {
                caller,
                addr,
                amount,
                response,
            } => {
                let _ = response.send(self.ledger.slash(&caller, &addr, amount));
            }

            LedgerMessage::CollectForfeited { caller, response } => {
                let _ = response.send(self.ledger.collect_forfeited(&caller));
            }

            LedgerMessage::IsStaked { addr, response } => {
                let _ = response.send(self.ledger.is_staked(&addr));
            }

            LedgerMessage::StakedAmount { addr, response } => {
                let _ = response.send(self.ledger.staked_amount(&addr));
            }

            LedgerMessage::Withdraw { caller, response } => {
                let _ = response.send(self.ledger.withdraw(&caller));
            }

            LedgerMessage::SplitterBalance { addr, response } => {
                let _ = response.send(self.ledger.splitter_balance(&addr));
            }

            LedgerMessage::Burn {
                caller,
                amount,
                response,
            } => {
                let _ = response.send(self.ledger.burn(&caller, amount));
            }

            LedgerMessage::TokenBalance { addr, response } => {
                let _ = response.send(self.ledger.token_balance(&addr));
            }

            LedgerMessage::GrantRole {
                caller,
                role,
                addr,
                response,
            } => {
                let _ = response.send(self.ledger.grant_role(&caller, role, addr));
            }

            LedgerMessage::RevokeRole {
                caller,
                role,
                addr,
                response,
            } => {
                let _ = response.send(self.ledger.revoke_role(&caller, role, &addr));
            }

            LedgerMessage::HasRole { role, addr, response } => {
                let _ = response.send(self.ledger.has_role(role, &addr));
            }

            LedgerMessage::EventsSince { seq, response } => {
                let _ = response.send(self.ledger.events_since(seq));
            }

            LedgerMessage::SubscribeEvents { response } => {
                let _ = response.send(self.ledger.subscribe_events());
            }

            LedgerMessage::EscrowHeld { response } => {
                let _ = response.send(self.ledger.escrow_held());
            }

            LedgerMessage::Shutdown => {
                // Handled in main loop
            }
        }
    }
}

/// Handle for sending operations to the actor
#[derive(Clone)]
pub struct LedgerHandle {
    sender: mpsc::Sender<LedgerMessage>,
}

/// Spawn the actor, returning its handle
pub fn spawn_ledger_actor(config: Config) -> Result<LedgerHandle> {
    let mailbox_depth = config.mailbox_depth;
    let ledger = OrderLedger::new(config)?;
    let (sender, receiver) = mpsc::channel(mailbox_depth);
    let actor = OrderLedgerActor::new(ledger, receiver);
    tokio::spawn(actor.run());
    Ok(LedgerHandle { sender })
}

impl LedgerHandle {
    async fn send_recv<T>(
        &self,
        msg: LedgerMessage,
        rx: oneshot::Receiver<T>,
    ) -> Result<T> {
        self.sender
            .send(msg)
            .await
            .map_err(|_| Error::Concurrency("Actor mailbox closed".to_string()))?;
        rx.await
            .map_err(|_| Error::Concurrency("Response channel closed".to_string()))
    }

    /// Escrow a new order
    #[allow(clippy::too_many_arguments)]
    pub async fn create_order(
        &self,
        client: Address,
        restaurant: Address,
        food_price: Amount,
        delivery_fee: Amount,
        metadata_uri: String,
        attached_value: Amount,
    ) -> Result<u64> {
        let (tx, rx) = oneshot::channel();
        self.send_recv(
            LedgerMessage::CreateOrder {
                client,
                restaurant,
                food_price,
                delivery_fee,
                metadata_uri,
                attached_value,
                response: tx,
            },
            rx,
        )
        .await?
    }

    /// Restaurant confirms preparation
    pub async fn confirm_preparation(&self, caller: Address, id: u64) -> Result<()> {
        let (tx, rx) = oneshot::channel();
        self.send_recv(LedgerMessage::ConfirmPreparation { caller, id, response: tx }, rx)
            .await?
    }

    /// Platform assigns a deliverer
    pub async fn assign_deliverer(
        &self,
        caller: Address,
        id: u64,
        deliverer: Address,
    ) -> Result<()> {
        let (tx, rx) = oneshot::channel();
        self.send_recv(
            LedgerMessage::AssignDeliverer {
                caller,
                id,
                deliverer,
                response: tx,
            },
            rx,
        )
        .await?
    }

    /// Deliverer confirms pickup
    pub async fn confirm_pickup(&self, caller: Address, id: u64) -> Result<()> {
        let (tx, rx) = oneshot::channel();
        self.send_recv(LedgerMessage::ConfirmPickup { caller, id, response: tx }, rx)
            .await?
    }

    /// Client confirms delivery
    pub async fn confirm_delivery(&self, caller: Address, id: u64) -> Result<()> {
        let (tx, rx) = oneshot::channel();
        self.send_recv(LedgerMessage::ConfirmDelivery { caller, id, response: tx }, rx)
            .await?
    }

    /// Client cancels an unprepared order; returns the refund
    pub async fn cancel_order(&self, caller: Address, id: u64) -> Result<Amount> {
        let (tx, rx) = oneshot::channel();
        self.send_recv(LedgerMessage::CancelOrder { caller, id, response: tx }, rx)
            .await?
    }

    /// Read an order
    pub async fn get_order(&self, id: u64) -> Result<Order> {
        let (tx, rx) = oneshot::channel();
        self.send_recv(LedgerMessage::GetOrder { id, response: tx }, rx)
            .await?
    }

    /// Deposit deliverer collateral
    pub async fn stake(&self, caller: Address, deposit: Amount) -> Result<()> {
        let (tx, rx) = oneshot::channel();
        self.send_recv(
            LedgerMessage::Stake {
                caller,
                deposit,
                response: tx,
            },
            rx,
        )
        .await?
    }

    /// Withdraw the caller's full stake
    pub async fn unstake(&self, caller: Address) -> Result<Amount> {
        let (tx, rx) = oneshot::channel();
        self.send_recv(LedgerMessage::Unstake { caller, response: tx }, rx)
            .await?
    }

    /// Platform slashes collateral; returns the amount removed
    pub async fn slash(&self, caller: Address, addr: Address, amount: Amount) -> Result<Amount> {
        let (tx, rx) = oneshot::channel();
        self.send_recv(
            LedgerMessage::Slash {
                caller,
                addr,
                amount,
                response: tx,
            },
            rx,
        )
        .await?
    }

    /// Platform drains the forfeiture reserve
    pub async fn collect_forfeited(&self, caller: Address) -> Result<Amount> {
        let (tx, rx) = oneshot::channel();
        self.send_recv(LedgerMessage::CollectForfeited { caller, response: tx }, rx)
            .await?
    }

    /// Qualification lookup
    pub async fn is_staked(&self, addr: Address) -> Result<bool> {
        let (tx, rx) = oneshot::channel();
        self.send_recv(LedgerMessage::IsStaked { addr, response: tx }, rx)
            .await
    }

    /// Stake lookup
    pub async fn staked_amount(&self, addr: Address) -> Result<Amount> {
        let (tx, rx) = oneshot::channel();
        self.send_recv(LedgerMessage::StakedAmount { addr, response: tx }, rx)
            .await
    }

    /// Withdraw the caller's pending balance
    pub async fn withdraw(&self, caller: Address) -> Result<Amount> {
        let (tx, rx) = oneshot::channel();
        self.send_recv(LedgerMessage::Withdraw { caller, response: tx }, rx)
            .await?
    }

    /// Pending balance lookup
    pub async fn splitter_balance(&self, addr: Address) -> Result<Amount> {
        let (tx, rx) = oneshot::channel();
        self.send_recv(LedgerMessage::SplitterBalance { addr, response: tx }, rx)
            .await
    }

    /// Burn reward tokens from the caller's balance
    pub async fn burn(&self, caller: Address, amount: Amount) -> Result<()> {
        let (tx, rx) = oneshot::channel();
        self.send_recv(
            LedgerMessage::Burn {
                caller,
                amount,
                response: tx,
            },
            rx,
        )
        .await?
    }

    /// Reward-token balance lookup
    pub async fn token_balance(&self, addr: Address) -> Result<Amount> {
        let (tx, rx) = oneshot::channel();
        self.send_recv(LedgerMessage::TokenBalance { addr, response: tx }, rx)
            .await
    }

    /// Grant a role (ADMIN-gated)
    pub async fn grant_role(&self, caller: Address, role: Role, addr: Address) -> Result<()> {
        let (tx, rx) = oneshot::channel();
        self.send_recv(
            LedgerMessage::GrantRole {
                caller,
                role,
                addr,
                response: tx,
            },
            rx,
        )
        .await?
    }

    /// Revoke a role (ADMIN-gated)
    pub async fn revoke_role(&self, caller: Address, role: Role, addr: Address) -> Result<()> {
        let (tx, rx) = oneshot::channel();
        self.send_recv(
            LedgerMessage::RevokeRole {
                caller,
                role,
                addr,
                response: tx,
            },
            rx,
        )
        .await?
    }

    /// Capability lookup
    pub async fn has_role(&self, role: Role, addr: Address) -> Result<bool> {
        let (tx, rx) = oneshot::channel();
        self.send_recv(LedgerMessage::HasRole { role, addr, response: tx }, rx)
            .await
    }

    /// Poll the event log from `seq`
    pub async fn events_since(&self, seq: u64) -> Result<Vec<EventRecord>> {
        let (tx, rx) = oneshot::channel();
        self.send_recv(LedgerMessage::EventsSince { seq, response: tx }, rx)
            .await
    }

    /// Subscribe to future events
    pub async fn subscribe_events(&self) -> Result<broadcast::Receiver<EventRecord>> {
        let (tx, rx) = oneshot::channel();
        self.send_recv(LedgerMessage::SubscribeEvents { response: tx }, rx)
            .await
    }

    /// Escrow currently held
    pub async fn escrow_held(&self) -> Result<Amount> {
        let (tx, rx) = oneshot::channel();
        self.send_recv(LedgerMessage::EscrowHeld { response: tx }, rx)
            .await
    }

    /// Shutdown ledger actor
    pub async fn shutdown(&self) -> Result<()> {
        self.sender
            .send(LedgerMessage::Shutdown)
            .await
            .map_err(|_| Error::Concurrency("Actor mailbox closed".to_string()))
    }
}
