// src/valuation.rs

//! Firm valuation and the token price derived from it.

use crate::error::{SimError, SimResult};

/// Valuation by price-to-sales ratio, over trailing (not run-rate) revenue.
pub fn firm_valuation_ps(annual_revenue: f64, p_s_ratio: f64) -> f64 {
    annual_revenue * p_s_ratio
}

/// Token price in USD.
pub fn token_price(firm_valuation: f64, token_supply: f64) -> SimResult<f64> {
    if token_supply.is_nan() || token_supply <= 0.0 {
        return Err(SimError::invariant(format!(
            "token supply must be positive, got {token_supply}"
        )));
    }
    let price = firm_valuation / token_supply;
    if price.is_nan() || price <= 0.0 {
        return Err(SimError::invariant(format!("token price must be positive, got {price}")));
    }
    Ok(price)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn price_is_valuation_over_supply() {
        assert_eq!(firm_valuation_ps(10e6, 30.0), 300e6);
        assert_eq!(token_price(300e6, 600e6).unwrap(), 0.5);
    }

    #[test]
    fn non_positive_inputs_are_fatal() {
        assert!(matches!(token_price(1.0, 0.0), Err(SimError::InvariantViolation(_))));
        assert!(matches!(token_price(0.0, 1.0), Err(SimError::InvariantViolation(_))));
        assert!(matches!(token_price(-5.0, 1.0), Err(SimError::InvariantViolation(_))));
    }
}
