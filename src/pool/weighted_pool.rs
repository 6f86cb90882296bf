// src/pool/weighted_pool.rs

use std::collections::BTreeMap;

use super::{MAX_IN_RATIO, MAX_OUT_RATIO, Pool, PoolError, TokenId, from_base18, to_base18};

pub const DEFAULT_SWAP_FEE: f64 = 0.001;
pub const INIT_POOL_SUPPLY: f64 = 100.0;
pub const MIN_WEIGHT: f64 = 1.0;
pub const MAX_WEIGHT: f64 = 50.0;

#[derive(Debug, Clone, Copy)]
struct Record {
    balance: u128,
    denorm: u128,
}

/// Reference constant-weight pool. Math runs in `f64` and is converted back to
/// base-18 at the interface.
#[derive(Debug, Clone)]
pub struct WeightedPool {
    records: BTreeMap<TokenId, Record>,
    swap_fee: u128,
    finalized: bool,
    controller: Option<String>,
    shares: BTreeMap<String, u128>,
    total_shares: u128,
}

impl Default for WeightedPool {
    fn default() -> Self {
        Self::new(DEFAULT_SWAP_FEE)
    }
}

impl WeightedPool {
    pub fn new(swap_fee: f64) -> Self {
        Self {
            records: BTreeMap::new(),
            swap_fee: to_base18(swap_fee),
            finalized: false,
            controller: None,
            shares: BTreeMap::new(),
            total_shares: 0,
        }
    }

    pub fn is_finalized(&self) -> bool {
        self.finalized
    }

    pub fn controller(&self) -> Option<&str> {
        self.controller.as_deref()
    }

    fn record(&self, token: &TokenId) -> Result<Record, PoolError> {
        self.records
            .get(token)
            .copied()
            .ok_or_else(|| PoolError::NotBound(token.clone()))
    }

    fn record_mut(&mut self, token: &TokenId) -> Result<&mut Record, PoolError> {
        self.records
            .get_mut(token)
            .ok_or_else(|| PoolError::NotBound(token.clone()))
    }

    fn total_weight(&self) -> f64 {
        self.records.values().map(|r| from_base18(r.denorm)).sum()
    }

    fn require_finalized(&self) -> Result<(), PoolError> {
        if self.finalized {
            Ok(())
        } else {
            Err(PoolError::NotFinalized)
        }
    }

    fn fee(&self) -> f64 {
        from_base18(self.swap_fee)
    }
}

// --- Pure pool math over whole units ---

fn checked(x: f64) -> Result<u128, PoolError> {
    if x.is_finite() && x >= 0.0 {
        Ok(to_base18(x))
    } else {
        Err(PoolError::Math)
    }
}

fn spot(bi: f64, wi: f64, bo: f64, wo: f64, fee: f64) -> f64 {
    (bi / wi) / (bo / wo) / (1.0 - fee)
}

fn out_given_in(bi: f64, wi: f64, bo: f64, wo: f64, ai: f64, fee: f64) -> f64 {
    let adjusted_in = ai * (1.0 - fee);
    bo * (1.0 - (bi / (bi + adjusted_in)).powf(wi / wo))
}

fn in_given_out(bi: f64, wi: f64, bo: f64, wo: f64, ao: f64, fee: f64) -> f64 {
    if ao >= bo {
        return f64::INFINITY;
    }
    bi * ((bo / (bo - ao)).powf(wo / wi) - 1.0) / (1.0 - fee)
}

fn pool_out_given_single_in(bi: f64, wi: f64, supply: f64, total_w: f64, ai: f64, fee: f64) -> f64 {
    let norm_w = wi / total_w;
    let in_after_fee = ai * (1.0 - (1.0 - norm_w) * fee);
    supply * ((1.0 + in_after_fee / bi).powf(norm_w) - 1.0)
}

fn single_out_given_pool_in(bo: f64, wo: f64, supply: f64, total_w: f64, pin: f64, fee: f64) -> f64 {
    let norm_w = wo / total_w;
    let remaining = (supply - pin) / supply;
    let out_before_fee = bo * (1.0 - remaining.powf(1.0 / norm_w));
    out_before_fee * (1.0 - (1.0 - norm_w) * fee)
}

impl Pool for WeightedPool {
    fn tokens(&self) -> Vec<TokenId> {
        self.records.keys().cloned().collect()
    }

    fn balance(&self, token: &TokenId) -> Result<u128, PoolError> {
        Ok(self.record(token)?.balance)
    }

    fn weight(&self, token: &TokenId) -> Result<u128, PoolError> {
        Ok(self.record(token)?.denorm)
    }

    fn swap_fee(&self) -> u128 {
        self.swap_fee
    }

    fn spot_price(&self, token_in: &TokenId, token_out: &TokenId) -> Result<u128, PoolError> {
        let i = self.record(token_in)?;
        let o = self.record(token_out)?;
        checked(spot(
            from_base18(i.balance),
            from_base18(i.denorm),
            from_base18(o.balance),
            from_base18(o.denorm),
            self.fee(),
        ))
    }

    fn calc_in_given_out(
        &self,
        balance_in: u128,
        weight_in: u128,
        balance_out: u128,
        weight_out: u128,
        amount_out: u128,
        swap_fee: u128,
    ) -> Result<u128, PoolError> {
        checked(in_given_out(
            from_base18(balance_in),
            from_base18(weight_in),
            from_base18(balance_out),
            from_base18(weight_out),
            from_base18(amount_out),
            from_base18(swap_fee),
        ))
    }

    fn calc_out_given_in(
        &self,
        balance_in: u128,
        weight_in: u128,
        balance_out: u128,
        weight_out: u128,
        amount_in: u128,
        swap_fee: u128,
    ) -> Result<u128, PoolError> {
        checked(out_given_in(
            from_base18(balance_in),
            from_base18(weight_in),
            from_base18(balance_out),
            from_base18(weight_out),
            from_base18(amount_in),
            from_base18(swap_fee),
        ))
    }

    fn bind(&mut self, token: &TokenId, amount: u128, weight: u128) -> Result<(), PoolError> {
        if self.finalized {
            return Err(PoolError::Finalized);
        }
        if self.records.contains_key(token) {
            return Err(PoolError::AlreadyBound(token.clone()));
        }
        let w = from_base18(weight);
        if !(MIN_WEIGHT..=MAX_WEIGHT).contains(&w) || self.total_weight() + w > MAX_WEIGHT {
            return Err(PoolError::InvalidWeight(w));
        }
        self.records.insert(
            token.clone(),
            Record {
                balance: amount,
                denorm: weight,
            },
        );
        Ok(())
    }

    fn finalize(&mut self, controller: &str) -> Result<(), PoolError> {
        if self.finalized {
            return Err(PoolError::Finalized);
        }
        if self.records.len() < 2 {
            return Err(PoolError::TooFewTokens);
        }
        let initial = to_base18(INIT_POOL_SUPPLY);
        self.finalized = true;
        self.controller = Some(controller.to_string());
        self.shares.insert(controller.to_string(), initial);
        self.total_shares = initial;
        Ok(())
    }

    fn swap_exact_amount_in(
        &mut self,
        token_in: &TokenId,
        amount_in: u128,
        token_out: &TokenId,
        min_amount_out: u128,
    ) -> Result<u128, PoolError> {
        self.require_finalized()?;
        let i = self.record(token_in)?;
        let o = self.record(token_out)?;
        if from_base18(amount_in) > from_base18(i.balance) * MAX_IN_RATIO {
            return Err(PoolError::MaxInRatio);
        }
        let out = self.calc_out_given_in(i.balance, i.denorm, o.balance, o.denorm, amount_in, self.swap_fee)?;
        if out < min_amount_out {
            return Err(PoolError::LimitOut {
                got: out,
                min: min_amount_out,
            });
        }
        let out = out.min(o.balance);
        self.record_mut(token_in)?.balance += amount_in;
        self.record_mut(token_out)?.balance -= out;
        Ok(out)
    }

    fn swap_exact_amount_out(
        &mut self,
        token_in: &TokenId,
        max_amount_in: u128,
        token_out: &TokenId,
        amount_out: u128,
    ) -> Result<u128, PoolError> {
        self.require_finalized()?;
        let i = self.record(token_in)?;
        let o = self.record(token_out)?;
        if from_base18(amount_out) > from_base18(o.balance) * MAX_OUT_RATIO {
            return Err(PoolError::MaxOutRatio);
        }
        let paid = self.calc_in_given_out(i.balance, i.denorm, o.balance, o.denorm, amount_out, self.swap_fee)?;
        if paid > max_amount_in {
            return Err(PoolError::LimitIn {
                required: paid,
                limit: max_amount_in,
            });
        }
        self.record_mut(token_in)?.balance += paid;
        self.record_mut(token_out)?.balance -= amount_out;
        Ok(paid)
    }

    fn join_swap_extern_amount_in(
        &mut self,
        holder: &str,
        token_in: &TokenId,
        amount_in: u128,
        min_pool_amount_out: u128,
    ) -> Result<u128, PoolError> {
        self.require_finalized()?;
        let i = self.record(token_in)?;
        if from_base18(amount_in) > from_base18(i.balance) * MAX_IN_RATIO {
            return Err(PoolError::MaxInRatio);
        }
        let minted = checked(pool_out_given_single_in(
            from_base18(i.balance),
            from_base18(i.denorm),
            from_base18(self.total_shares),
            self.total_weight(),
            from_base18(amount_in),
            self.fee(),
        ))?;
        if minted < min_pool_amount_out {
            return Err(PoolError::LimitOut {
                got: minted,
                min: min_pool_amount_out,
            });
        }
        self.record_mut(token_in)?.balance += amount_in;
        *self.shares.entry(holder.to_string()).or_insert(0) += minted;
        self.total_shares += minted;
        Ok(minted)
    }

    fn exit_swap_pool_amount_in(
        &mut self,
        holder: &str,
        token_out: &TokenId,
        pool_amount_in: u128,
        min_amount_out: u128,
    ) -> Result<u128, PoolError> {
        self.require_finalized()?;
        let held = self.shares_of(holder);
        if pool_amount_in > held {
            return Err(PoolError::InsufficientShares {
                holder: holder.to_string(),
                held,
                requested: pool_amount_in,
            });
        }
        let o = self.record(token_out)?;
        let out = checked(single_out_given_pool_in(
            from_base18(o.balance),
            from_base18(o.denorm),
            from_base18(self.total_shares),
            self.total_weight(),
            from_base18(pool_amount_in),
            self.fee(),
        ))?;
        if from_base18(out) > from_base18(o.balance) * MAX_OUT_RATIO {
            return Err(PoolError::MaxOutRatio);
        }
        if out < min_amount_out {
            return Err(PoolError::LimitOut {
                got: out,
                min: min_amount_out,
            });
        }
        self.record_mut(token_out)?.balance -= out;
        self.shares.insert(holder.to_string(), held - pool_amount_in);
        self.total_shares -= pool_amount_in;
        Ok(out)
    }

    fn shares_of(&self, holder: &str) -> u128 {
        self.shares.get(holder).copied().unwrap_or(0)
    }

    fn total_shares(&self) -> u128 {
        self.total_shares
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::quote_in_given_out;

    fn tkn() -> TokenId {
        TokenId::native()
    }

    fn dt() -> TokenId {
        TokenId::datatoken(0)
    }

    /// 1000 TOKEN at weight 7, 100 DT at weight 3, finalized by "alice".
    fn seeded_pool() -> WeightedPool {
        let mut p = WeightedPool::default();
        p.bind(&dt(), to_base18(100.0), to_base18(3.0)).unwrap();
        p.bind(&tkn(), to_base18(1000.0), to_base18(7.0)).unwrap();
        p.finalize("alice").unwrap();
        p
    }

    // ---------------------------------------------------------------------------------
    // Lifecycle
    // ---------------------------------------------------------------------------------

    #[test]
    fn finalize_issues_initial_shares_to_controller() {
        let p = seeded_pool();
        assert!(p.is_finalized());
        assert_eq!(p.controller(), Some("alice"));
        assert_eq!(p.shares_of("alice"), to_base18(100.0));
        assert_eq!(p.total_shares(), to_base18(100.0));
    }

    #[test]
    fn binding_rules() {
        let mut p = WeightedPool::default();
        p.bind(&dt(), 1, to_base18(3.0)).unwrap();
        assert_eq!(p.bind(&dt(), 1, to_base18(3.0)), Err(PoolError::AlreadyBound(dt())));
        assert_eq!(p.finalize("x"), Err(PoolError::TooFewTokens));
        assert!(matches!(
            p.bind(&tkn(), 1, to_base18(0.5)),
            Err(PoolError::InvalidWeight(_))
        ));
        assert_eq!(
            p.swap_exact_amount_in(&tkn(), 1, &dt(), 0),
            Err(PoolError::NotFinalized)
        );
    }

    // ---------------------------------------------------------------------------------
    // Swaps
    // ---------------------------------------------------------------------------------

    #[test]
    fn buying_exact_out_charges_the_quote() {
        // Arrange
        let mut p = seeded_pool();
        let quote = quote_in_given_out(&p, &tkn(), &dt(), 1.0).unwrap();
        let spot = from_base18(p.spot_price(&tkn(), &dt()).unwrap());

        // Act
        let paid = p
            .swap_exact_amount_out(&tkn(), to_base18(1e6), &dt(), to_base18(1.0))
            .unwrap();

        // Assert
        assert!((from_base18(paid) - quote).abs() < 1e-9);
        assert!(quote > spot, "slippage makes the quote exceed spot");
        assert!((from_base18(p.balance(&dt()).unwrap()) - 99.0).abs() < 1e-9);
    }

    #[test]
    fn swap_limits_are_enforced() {
        let mut p = seeded_pool();
        assert_eq!(
            p.swap_exact_amount_in(&dt(), to_base18(60.0), &tkn(), 0),
            Err(PoolError::MaxInRatio)
        );
        assert_eq!(
            p.swap_exact_amount_out(&tkn(), u128::MAX, &dt(), to_base18(40.0)),
            Err(PoolError::MaxOutRatio)
        );
        assert!(matches!(
            p.swap_exact_amount_out(&tkn(), to_base18(0.01), &dt(), to_base18(1.0)),
            Err(PoolError::LimitIn { .. })
        ));
    }

    #[test]
    fn selling_into_the_pool_pays_out_token() {
        let mut p = seeded_pool();
        let got = p.swap_exact_amount_in(&dt(), to_base18(1.0), &tkn(), 0).unwrap();
        assert!(from_base18(got) > 0.0);
        assert!((from_base18(p.balance(&tkn()).unwrap()) + from_base18(got) - 1000.0).abs() < 1e-9);
    }

    // ---------------------------------------------------------------------------------
    // Liquidity
    // ---------------------------------------------------------------------------------

    #[test]
    fn join_then_exit_moves_shares() {
        let mut p = seeded_pool();

        let minted = p
            .join_swap_extern_amount_in("bob", &tkn(), to_base18(100.0), 0)
            .unwrap();
        assert_eq!(p.shares_of("bob"), minted);
        assert_eq!(p.total_shares(), to_base18(100.0) + minted);

        let out = p.exit_swap_pool_amount_in("bob", &tkn(), minted, 0).unwrap();
        assert_eq!(p.shares_of("bob"), 0);
        assert!(from_base18(out) < 100.0, "round trip pays fees");
        assert!(from_base18(out) > 99.0);
    }

    #[test]
    fn exit_more_than_held_fails() {
        let mut p = seeded_pool();
        assert!(matches!(
            p.exit_swap_pool_amount_in("bob", &tkn(), 1, 0),
            Err(PoolError::InsufficientShares { .. })
        ));
    }
}
