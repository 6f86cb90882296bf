// src/config.rs

//! Run-level strategy: clock, economy parameters and population sizes.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::constants::{S_PER_DAY, S_PER_HOUR, S_PER_YEAR};
use crate::error::{SimError, SimResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WalletBackend {
    #[default]
    Local,
    Ledger,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimStrategy {
    /// Seconds per tick.
    pub time_step: u64,
    pub max_ticks: u64,
    pub seed: u64,
    pub wallet_backend: WalletBackend,

    // --- Economy ---
    pub percent_burn: f64,
    pub marketplace_percent_toll: f64,
    pub price_to_sales_ratio: f64,
    pub init_speculation_valuation: f64,
    pub speculation_growth_per_year: f64,

    // --- Marketplace growth ---
    pub init_n_marketplaces: f64,
    pub growth_rate_if_0_sales: f64,
    pub max_growth_rate: f64,
    /// At `ratio == tau` growth has covered half of its possible increase.
    pub tau: f64,

    // --- Data ecosystem population ---
    pub with_data_ecosystem: bool,
    pub n_publishers: usize,
    pub n_malicious_publishers: usize,
    pub n_speculators: usize,
    pub n_data_consumers: usize,
    pub publisher_token: f64,
    pub speculator_token: f64,
    pub data_consumer_token: f64,
}

impl Default for SimStrategy {
    fn default() -> Self {
        let time_step = S_PER_HOUR;
        Self {
            time_step,
            max_ticks: 10 * S_PER_DAY / time_step + 1,
            seed: 0,
            wallet_backend: WalletBackend::Local,
            percent_burn: 0.05,
            marketplace_percent_toll: 0.002,
            price_to_sales_ratio: 30.0,
            init_speculation_valuation: 150e6,
            speculation_growth_per_year: 0.10,
            init_n_marketplaces: 1.0,
            growth_rate_if_0_sales: -0.118,
            max_growth_rate: 0.415,
            tau: 0.6,
            with_data_ecosystem: false,
            n_publishers: 2,
            n_malicious_publishers: 1,
            n_speculators: 3,
            n_data_consumers: 3,
            publisher_token: 1000.0,
            speculator_token: 500.0,
            data_consumer_token: 500.0,
        }
    }
}

impl SimStrategy {
    pub fn from_json_file(path: impl AsRef<Path>) -> SimResult<Self> {
        let raw = fs::read_to_string(path)?;
        let strategy: SimStrategy = serde_json::from_str(&raw)?;
        strategy.validate()?;
        Ok(strategy)
    }

    pub fn validate(&self) -> SimResult<()> {
        if self.time_step == 0 {
            return Err(SimError::invalid("time_step must be positive"));
        }
        for (name, pct) in [
            ("percent_burn", self.percent_burn),
            ("marketplace_percent_toll", self.marketplace_percent_toll),
        ] {
            if !(0.0..=1.0).contains(&pct) {
                return Err(SimError::invalid(format!("{name} must lie in [0, 1], got {pct}")));
            }
        }
        if self.tau.is_nan() || self.tau <= 0.0 {
            return Err(SimError::invalid(format!("tau must be positive, got {}", self.tau)));
        }
        if self.max_growth_rate < self.growth_rate_if_0_sales {
            return Err(SimError::invalid("max_growth_rate is below growth_rate_if_0_sales"));
        }
        if self.init_n_marketplaces < 0.0 || self.price_to_sales_ratio < 0.0 {
            return Err(SimError::invalid("marketplace count and P/S ratio must be non-negative"));
        }
        if self.init_speculation_valuation <= 0.0 {
            return Err(SimError::invalid("speculation valuation must be positive"));
        }
        for (name, amt) in [
            ("publisher_token", self.publisher_token),
            ("speculator_token", self.speculator_token),
            ("data_consumer_token", self.data_consumer_token),
        ] {
            if !amt.is_finite() || amt < 0.0 {
                return Err(SimError::invalid(format!("{name} must be non-negative, got {amt}")));
            }
        }
        Ok(())
    }

    /// Annual growth of marketplace count and revenue, rising with diminishing
    /// returns as R&D spend grows relative to sales.
    pub fn annual_mkts_growth_rate(&self, ratio_rnd_to_sales: f64) -> f64 {
        let span = self.max_growth_rate - self.growth_rate_if_0_sales;
        self.growth_rate_if_0_sales + span * (1.0 - 0.5_f64.powf(ratio_rnd_to_sales / self.tau))
    }

    pub fn speculation_growth_per_s(&self) -> f64 {
        self.speculation_growth_per_year / S_PER_YEAR as f64
    }
}
