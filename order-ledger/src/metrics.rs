//! Metrics collection for observability
//!
//! # Metrics
//!
//! - `escrow_orders_created_total` - Orders escrowed
//! - `escrow_orders_delivered_total` - Orders delivered and released
//! - `escrow_orders_cancelled_total` - Orders cancelled and refunded
//! - `escrow_slashes_total` - Collateral slashes applied
//! - `escrow_value_locked_units` - Escrow currently held (whole units)
//! - `escrow_total_staked_units` - Live deliverer collateral (whole units)

use escrow_core::{Amount, UNIT};
use prometheus::{IntCounter, IntGauge, Registry};
use std::sync::Arc;

/// Metrics collector
#[derive(Clone)]
pub struct Metrics {
    /// Orders escrowed
    pub orders_created: IntCounter,

    /// Orders delivered
    pub orders_delivered: IntCounter,

    /// Orders cancelled
    pub orders_cancelled: IntCounter,

    /// Slashes applied
    pub slashes: IntCounter,

    /// Escrow currently held, in whole units
    pub value_locked: IntGauge,

    /// Live collateral, in whole units
    pub total_staked: IntGauge,

    /// Prometheus registry
    pub registry: Arc<Registry>,
}

impl Metrics {
    /// Create new metrics collector with its own registry
    pub fn new() -> prometheus::Result<Self> {
        let registry = Arc::new(Registry::new());

        let orders_created =
            IntCounter::new("escrow_orders_created_total", "Orders escrowed")?;
        registry.register(Box::new(orders_created.clone()))?;

        let orders_delivered = IntCounter::new(
            "escrow_orders_delivered_total",
            "Orders delivered and released",
        )?;
        registry.register(Box::new(orders_delivered.clone()))?;

        let orders_cancelled = IntCounter::new(
            "escrow_orders_cancelled_total",
            "Orders cancelled and refunded",
        )?;
        registry.register(Box::new(orders_cancelled.clone()))?;

        let slashes = IntCounter::new("escrow_slashes_total", "Collateral slashes applied")?;
        registry.register(Box::new(slashes.clone()))?;

        let value_locked = IntGauge::new(
            "escrow_value_locked_units",
            "Escrow currently held (whole units)",
        )?;
        registry.register(Box::new(value_locked.clone()))?;

        let total_staked = IntGauge::new(
            "escrow_total_staked_units",
            "Live deliverer collateral (whole units)",
        )?;
        registry.register(Box::new(total_staked.clone()))?;

        Ok(Self {
            orders_created,
            orders_delivered,
            orders_cancelled,
            slashes,
            value_locked,
            total_staked,
            registry,
        })
    }

    /// Record order creation and the new locked value
    pub fn record_order_created(&self, escrow_held: Amount) {
        self.orders_created.inc();
        self.update_value_locked(escrow_held);
    }

    /// Record order delivery and the new locked value
    pub fn record_order_delivered(&self, escrow_held: Amount) {
        self.orders_delivered.inc();
        self.update_value_locked(escrow_held);
    }

    /// Record order cancellation and the new locked value
    pub fn record_order_cancelled(&self, escrow_held: Amount) {
        self.orders_cancelled.inc();
        self.update_value_locked(escrow_held);
    }

    /// Record a slash
    pub fn record_slash(&self) {
        self.slashes.inc();
    }

    /// Update the locked-value gauge (whole units, truncating)
    pub fn update_value_locked(&self, escrow_held: Amount) {
        self.value_locked.set((escrow_held / UNIT) as i64);
    }

    /// Update the staked-collateral gauge (whole units, truncating)
    pub fn update_total_staked(&self, total_staked: Amount) {
        self.total_staked.set((total_staked / UNIT) as i64);
    }

    /// Get metrics registry
    pub fn registry(&self) -> &Registry {
        &self.registry
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_creation() {
        let metrics = Metrics::new().unwrap();
        assert_eq!(metrics.orders_created.get(), 0);
        assert_eq!(metrics.orders_delivered.get(), 0);
    }

    #[test]
    fn test_record_order_created() {
        let metrics = Metrics::new().unwrap();
        metrics.record_order_created(3 * UNIT);
        assert_eq!(metrics.orders_created.get(), 1);
        assert_eq!(metrics.value_locked.get(), 3);
    }

    #[test]
    fn test_record_slash() {
        let metrics = Metrics::new().unwrap();
        metrics.record_slash();
        metrics.record_slash();
        assert_eq!(metrics.slashes.get(), 2);
    }

    #[test]
    fn test_gauges_truncate_to_whole_units() {
        let metrics = Metrics::new().unwrap();
        metrics.update_total_staked(UNIT / 2);
        assert_eq!(metrics.total_staked.get(), 0);
        metrics.update_total_staked(5 * UNIT + UNIT / 2);
        assert_eq!(metrics.total_staked.get(), 5);
    }
}
