// src/kpis.rs

//! Per-tick time series of economy-wide metrics plus windowed revenue queries.
//!
//! Every series is indexed by tick and all series have equal length after each
//! sample. Revenue queries integrate a per-second rate over a window of
//! seconds, weighting each tick by how much of the window it overlaps.

use serde::Serialize;
use statrs::statistics::Statistics;

use crate::constants::{INFINITE_GROWTH, S_PER_MONTH, S_PER_YEAR};
use crate::error::{SimError, SimResult};
use crate::valuation::firm_valuation_ps;

/// Everything sampled from the world at the end of one tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct KpiSample {
    pub granttakers_spent: f64,
    pub revenue_per_marketplace_per_s: f64,
    pub n_marketplaces: f64,
    pub marketplace_percent_toll: f64,
    pub total_minted: f64,
    pub total_burned: f64,
    pub total_minted_usd: f64,
    pub total_burned_usd: f64,
    pub token_price: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PriceSummary {
    pub mean: f64,
    pub std_dev: f64,
    pub min: f64,
    pub max: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct Kpis {
    time_step: u64,
    granttakers_spent: Vec<f64>,
    revenue_per_marketplace_per_s: Vec<f64>,
    n_marketplaces: Vec<f64>,
    marketplace_percent_toll: Vec<f64>,
    total_minted: Vec<f64>,
    total_burned: Vec<f64>,
    total_minted_usd: Vec<f64>,
    total_burned_usd: Vec<f64>,
    token_price: Vec<f64>,
}

pub fn growth_rate(prior: f64, now: f64) -> f64 {
    if prior == 0.0 {
        return INFINITE_GROWTH;
    }
    now / prior - 1.0
}

impl Kpis {
    pub fn new(time_step: u64) -> Self {
        Self {
            time_step,
            granttakers_spent: Vec::new(),
            revenue_per_marketplace_per_s: Vec::new(),
            n_marketplaces: Vec::new(),
            marketplace_percent_toll: Vec::new(),
            total_minted: Vec::new(),
            total_burned: Vec::new(),
            total_minted_usd: Vec::new(),
            total_burned_usd: Vec::new(),
            token_price: Vec::new(),
        }
    }

    pub fn record(&mut self, s: KpiSample) -> SimResult<()> {
        self.granttakers_spent.push(s.granttakers_spent);
        self.revenue_per_marketplace_per_s.push(s.revenue_per_marketplace_per_s);
        self.n_marketplaces.push(s.n_marketplaces);
        self.marketplace_percent_toll.push(s.marketplace_percent_toll);
        self.total_minted.push(s.total_minted);
        self.total_burned.push(s.total_burned);
        self.total_minted_usd.push(s.total_minted_usd);
        self.total_burned_usd.push(s.total_burned_usd);
        self.token_price.push(s.token_price);
        self.check_lengths()
    }

    /// Records `s` and then prices it with `price_of`, which already sees this
    /// tick's revenue. `s.token_price` and `s.total_minted_usd` are ignored.
    /// On error nothing is recorded.
    pub fn record_priced<F>(&mut self, s: KpiSample, price_of: F) -> SimResult<f64>
    where
        F: FnOnce(&Kpis) -> SimResult<f64>,
    {
        let n = self.tick();
        self.record(KpiSample {
            token_price: 0.0,
            total_minted_usd: 0.0,
            ..s
        })?;
        let price = match price_of(self) {
            Ok(p) => p,
            Err(e) => {
                self.truncate(n);
                return Err(e);
            }
        };
        if let Some(last) = self.token_price.last_mut() {
            *last = price;
        }
        if let Some(last) = self.total_minted_usd.last_mut() {
            *last = s.total_minted * price;
        }
        Ok(price)
    }

    fn truncate(&mut self, n: usize) {
        for series in [
            &mut self.granttakers_spent,
            &mut self.revenue_per_marketplace_per_s,
            &mut self.n_marketplaces,
            &mut self.marketplace_percent_toll,
            &mut self.total_minted,
            &mut self.total_burned,
            &mut self.total_minted_usd,
            &mut self.total_burned_usd,
            &mut self.token_price,
        ] {
            series.truncate(n);
        }
    }

    fn check_lengths(&self) -> SimResult<()> {
        let n = self.tick();
        let lens = [
            self.granttakers_spent.len(),
            self.n_marketplaces.len(),
            self.marketplace_percent_toll.len(),
            self.total_minted.len(),
            self.total_burned.len(),
            self.total_minted_usd.len(),
            self.total_burned_usd.len(),
            self.token_price.len(),
        ];
        if lens.iter().any(|&l| l != n) {
            return Err(SimError::invariant(format!(
                "KPI series lengths diverged: {n} vs {lens:?}"
            )));
        }
        Ok(())
    }

    /// Ticks sampled so far.
    pub fn tick(&self) -> usize {
        self.revenue_per_marketplace_per_s.len()
    }

    pub fn time_step(&self) -> u64 {
        self.time_step
    }

    pub fn elapsed_time(&self) -> f64 {
        (self.tick() as u64 * self.time_step) as f64
    }

    // -----------------------------------------------------------------------------
    //  Per-second rates at a tick
    // -----------------------------------------------------------------------------

    pub fn one_mkt_revenue_per_second(&self, tick: usize) -> f64 {
        self.revenue_per_marketplace_per_s[tick]
    }

    pub fn all_mkts_revenue_per_second(&self, tick: usize) -> f64 {
        self.revenue_per_marketplace_per_s[tick] * self.n_marketplaces[tick]
    }

    pub fn toll_revenue_per_second(&self, tick: usize) -> f64 {
        self.all_mkts_revenue_per_second(tick) * self.marketplace_percent_toll[tick]
    }

    // -----------------------------------------------------------------------------
    //  Windowed sums
    // -----------------------------------------------------------------------------

    /// Integral of `per_second(tick)` over `[t1, t2)` seconds since start.
    pub fn windowed_sum<F>(&self, t1: f64, t2: f64, per_second: F) -> SimResult<f64>
    where
        F: Fn(usize) -> f64,
    {
        if t1.is_nan() || t2.is_nan() || t2 <= t1 {
            return Err(SimError::invalid(format!(
                "window end {t2} must be after its start {t1}"
            )));
        }
        Ok(self.sum_over(t1, t2, per_second))
    }

    fn sum_over<F>(&self, t1: f64, t2: f64, per_second: F) -> f64
    where
        F: Fn(usize) -> f64,
    {
        let d = self.time_step as f64;
        let first = (t1 / d).floor().max(0.0) as usize;
        let last = ((t2 / d).ceil().max(0.0) as usize).min(self.tick());

        let mut total = 0.0;
        for i in first..last {
            let start = t1.max(i as f64 * d);
            let end = t2.min((i + 1) as f64 * d);
            if end > start {
                total += per_second(i) * (end - start);
            }
        }
        total
    }

    /// Window of `len` seconds ending `ago` seconds before now.
    fn trailing<F>(&self, len: u64, ago: u64, per_second: F) -> f64
    where
        F: Fn(usize) -> f64,
    {
        let t2 = self.elapsed_time() - ago as f64;
        let t1 = t2 - len as f64;
        self.sum_over(t1, t2, per_second)
    }

    // --- one marketplace ---
    pub fn one_mkt_monthly_revenue_now(&self) -> f64 {
        self.trailing(S_PER_MONTH, 0, |i| self.one_mkt_revenue_per_second(i))
    }

    pub fn one_mkt_annual_revenue_now(&self) -> f64 {
        self.trailing(S_PER_YEAR, 0, |i| self.one_mkt_revenue_per_second(i))
    }

    pub fn one_mkt_annual_revenue_one_year_ago(&self) -> f64 {
        self.trailing(S_PER_YEAR, S_PER_YEAR, |i| self.one_mkt_revenue_per_second(i))
    }

    // --- all marketplaces ---
    pub fn all_mkts_monthly_revenue_now(&self) -> f64 {
        self.trailing(S_PER_MONTH, 0, |i| self.all_mkts_revenue_per_second(i))
    }

    pub fn all_mkts_annual_revenue_now(&self) -> f64 {
        self.trailing(S_PER_YEAR, 0, |i| self.all_mkts_revenue_per_second(i))
    }

    pub fn all_mkts_annual_revenue_one_year_ago(&self) -> f64 {
        self.trailing(S_PER_YEAR, S_PER_YEAR, |i| self.all_mkts_revenue_per_second(i))
    }

    // --- toll (the community's take) ---
    pub fn toll_monthly_revenue_now(&self) -> f64 {
        self.trailing(S_PER_MONTH, 0, |i| self.toll_revenue_per_second(i))
    }

    pub fn toll_annual_revenue_now(&self) -> f64 {
        self.trailing(S_PER_YEAR, 0, |i| self.toll_revenue_per_second(i))
    }

    pub fn toll_monthly_revenue_one_month_ago(&self) -> f64 {
        self.trailing(S_PER_MONTH, S_PER_MONTH, |i| self.toll_revenue_per_second(i))
    }

    pub fn toll_annual_revenue_one_year_ago(&self) -> f64 {
        self.trailing(S_PER_YEAR, S_PER_YEAR, |i| self.toll_revenue_per_second(i))
    }

    pub fn toll_monthly_revenue_growth(&self) -> f64 {
        growth_rate(
            self.toll_monthly_revenue_one_month_ago(),
            self.toll_monthly_revenue_now(),
        )
    }

    pub fn toll_annual_revenue_growth(&self) -> f64 {
        growth_rate(
            self.toll_annual_revenue_one_year_ago(),
            self.toll_annual_revenue_now(),
        )
    }

    pub fn valuation_ps(&self, p_s_ratio: f64) -> f64 {
        firm_valuation_ps(self.toll_annual_revenue_now(), p_s_ratio)
    }

    // -----------------------------------------------------------------------------
    //  R&D vs sales
    // -----------------------------------------------------------------------------

    pub fn ticks_one_month(&self) -> usize {
        (S_PER_MONTH as f64 / self.time_step as f64).ceil() as usize
    }

    pub fn granttakers_monthly_revenue_now(&self) -> f64 {
        let n = self.ticks_one_month().min(self.granttakers_spent.len());
        self.granttakers_spent[self.granttakers_spent.len() - n..].iter().sum()
    }

    /// Monthly grant-taker spend over monthly toll revenue. Zero when nothing
    /// was spent; infinite when something was spent against zero sales.
    pub fn mkts_rnd_to_sales_ratio(&self) -> f64 {
        let rnd = self.granttakers_monthly_revenue_now();
        if rnd == 0.0 {
            return 0.0;
        }
        let sales = self.toll_monthly_revenue_now();
        if sales == 0.0 {
            return INFINITE_GROWTH;
        }
        rnd / sales
    }

    // -----------------------------------------------------------------------------
    //  Minted & burned over the previous month
    // -----------------------------------------------------------------------------

    fn change_prev_month(&self, series: &[f64]) -> f64 {
        let Some(&last) = series.last() else {
            return 0.0;
        };
        let n = self.ticks_one_month();
        if series.len() <= n {
            return last;
        }
        last - series[series.len() - 1 - n]
    }

    pub fn minted_prev_month(&self) -> f64 {
        self.change_prev_month(&self.total_minted)
    }

    pub fn burned_prev_month(&self) -> f64 {
        self.change_prev_month(&self.total_burned)
    }

    pub fn minted_usd_prev_month(&self) -> f64 {
        self.change_prev_month(&self.total_minted_usd)
    }

    pub fn burned_usd_prev_month(&self) -> f64 {
        self.change_prev_month(&self.total_burned_usd)
    }

    // -----------------------------------------------------------------------------
    //  Series access
    // -----------------------------------------------------------------------------

    pub fn token_price_series(&self) -> &[f64] {
        &self.token_price
    }

    pub fn total_minted_series(&self) -> &[f64] {
        &self.total_minted
    }

    pub fn total_minted_usd_series(&self) -> &[f64] {
        &self.total_minted_usd
    }

    pub fn n_marketplaces_series(&self) -> &[f64] {
        &self.n_marketplaces
    }

    pub fn granttakers_spent_series(&self) -> &[f64] {
        &self.granttakers_spent
    }

    /// Mean, std-dev and range of the token price. `None` before the first tick.
    pub fn summary(&self) -> Option<PriceSummary> {
        if self.token_price.is_empty() {
            return None;
        }
        let prices = &self.token_price;
        let std_dev = if prices.len() > 1 {
            Statistics::std_dev(prices.iter())
        } else {
            0.0
        };
        Some(PriceSummary {
            mean: Statistics::mean(prices.iter()),
            std_dev,
            min: Statistics::min(prices.iter()),
            max: Statistics::max(prices.iter()),
        })
    }
}
