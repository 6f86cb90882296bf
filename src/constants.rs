// src/constants.rs

//! Time units and supply figures used across the simulation.

// --- Time ---
pub const S_PER_MIN: u64 = 60;
pub const S_PER_HOUR: u64 = S_PER_MIN * 60;
pub const S_PER_DAY: u64 = S_PER_HOUR * 24;
pub const S_PER_WEEK: u64 = S_PER_DAY * 7;
pub const S_PER_MONTH: u64 = S_PER_DAY * 30;
pub const S_PER_YEAR: u64 = S_PER_DAY * 365;

// --- Token supply ---
pub const TOTAL_TOKEN_SUPPLY: f64 = 1.41e9;
pub const INIT_TOKEN_SUPPLY: f64 = 0.49 * TOTAL_TOKEN_SUPPLY;
pub const UNMINTED_TOKEN_SUPPLY: f64 = TOTAL_TOKEN_SUPPLY - INIT_TOKEN_SUPPLY;

// --- Treasuries wired up by the standard netlist ---
pub const FOUNDATION_TREASURY_USD: f64 = 0.0;
pub const FOUNDATION_TREASURY_TOKEN_FOR_DAO: f64 = 1.0e6;
pub const FOUNDATION_TREASURY_TOKEN_FOR_MGMT: f64 = 20.0e6;
pub const STUDIO_TREASURY_USD: f64 = 2.0e6;
pub const STUDIO_TREASURY_TOKEN: f64 = 20.0e6;

/// Growth reported when the prior-period revenue is exactly zero.
pub const INFINITE_GROWTH: f64 = f64::INFINITY;

/// Relative tolerance under which a withdraw is treated as "withdraw all".
pub const WITHDRAW_ALL_TOLERANCE: f64 = 1e-12;
