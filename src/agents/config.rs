// src/agents/config.rs

//! A centralized place for tuning agent behavior parameters.

use crate::constants::{S_PER_DAY, S_PER_HOUR, S_PER_MONTH};

// --- Publisher ---
// Publishers mint a datatoken, seed a pool with it, then slowly take profit.
pub const PUBLISHER_S_BETWEEN_CREATE: u64 = 7 * S_PER_DAY;
pub const PUBLISHER_S_BETWEEN_UNSTAKE: u64 = 3 * S_PER_DAY;
pub const PUBLISHER_S_BETWEEN_SELL: u64 = 15 * S_PER_DAY;
pub const PUBLISHER_MIN_TOKEN_TO_CREATE: f64 = 200.0;
pub const PUBLISHER_DT_INIT: f64 = 100.0;
pub const PUBLISHER_DT_STAKE: f64 = 20.0;
pub const PUBLISHER_DT_WEIGHT: f64 = 3.0;
pub const PUBLISHER_TOKEN_WEIGHT: f64 = 7.0;
pub const PUBLISHER_UNSTAKE_FRACTION: f64 = 0.10;
pub const PUBLISHER_SELL_FRACTION: f64 = 0.01;

// --- Malicious publisher ---
// Same machinery, but dumps everything on the newest pool right after the rug.
pub const MALICIOUS_RUG_FRACTION: f64 = 0.20;
/// Fraction of the create period to wait before rugging.
pub const MALICIOUS_WAIT_TO_RUG_FRACTION: f64 = 0.5;
/// Fraction of the wait spent inside the rug window.
pub const MALICIOUS_RUG_TIME_FRACTION: f64 = 0.2;

// --- Speculator / data consumer ---
pub const SPECULATOR_S_BETWEEN_SPECULATES: u64 = 8 * S_PER_HOUR;
pub const SPECULATOR_DT_PER_BUY: f64 = 1.0;
pub const DATA_CONSUMER_S_BETWEEN_BUYS: u64 = 3 * S_PER_DAY;
pub const DATA_CONSUMER_DT_PER_BUY: f64 = 1.0;

// --- Marketplaces ---
pub const MKTS_INIT_N: f64 = 1.0;
pub const MKTS_INIT_REVENUE_PER_MONTH: f64 = 20e3;
pub const MKTS_INIT_REVENUE_PER_S: f64 = MKTS_INIT_REVENUE_PER_MONTH / S_PER_MONTH as f64;

// --- Minter ---
pub const MINTER_S_BETWEEN_MINTS: u64 = S_PER_DAY;
/// Half-life, in years, of the standard loop's release curve.
pub const MINTER_HALF_LIFE_YEARS: f64 = 4.0;
/// Ramp of the standard loop's release: phase boundaries in years and the
/// clock rate inside each phase.
pub const MINTER_RAMP_T0: f64 = 0.5;
pub const MINTER_RAMP_T1: f64 = 1.0;
pub const MINTER_RAMP_T2: f64 = 1.4;
pub const MINTER_RAMP_T3: f64 = 3.0;
pub const MINTER_RAMP_M1: f64 = 0.10;
pub const MINTER_RAMP_M2: f64 = 0.25;
pub const MINTER_RAMP_M3: f64 = 0.50;

// --- Grant giver ---
pub const GRANT_S_BETWEEN_GRANTS: u64 = S_PER_MONTH;

// --- Grant givers in the standard netlist ---
pub const GRANT_N_ACTIONS_DAO: u32 = 12;
pub const GRANT_N_ACTIONS_MGMT: u32 = 60;
pub const GRANT_N_ACTIONS_STUDIO: u32 = 60;
