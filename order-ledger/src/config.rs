//! Configuration for the order ledger service

use escrow_core::{Address, EscrowConfig};
use serde::{Deserialize, Serialize};

/// Order ledger configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Service name
    pub service_name: String,

    /// Address of the ledger service itself; holds MINTER
    pub service_address: Address,

    /// Actor mailbox depth (pending operations before senders block)
    pub mailbox_depth: usize,

    /// Escrow engine knobs
    pub escrow: EscrowConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            service_name: "order-ledger".to_string(),
            service_address: Address::new("order-ledger-service"),
            mailbox_depth: 256,
            escrow: EscrowConfig::default(),
        }
    }
}

impl Config {
    /// Load from file
    pub fn from_file(path: impl AsRef<std::path::Path>) -> escrow_core::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)
            .map_err(|e| escrow_core::Error::Config(format!("Failed to parse config: {}", e)))?;
        config.escrow.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.service_name, "order-ledger");
        assert!(config.mailbox_depth > 0);
        assert!(config.escrow.validate().is_ok());
    }
}
