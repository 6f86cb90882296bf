// src/agents/mint_schedule.rs

//! Cumulative release curves for the minter: the fraction of the total
//! allocation that should exist after `t` years.

use crate::error::{SimError, SimResult};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MintSchedule {
    /// Exponential decay with half-life `h` years: `1 - 0.5^(t/h)`.
    Exp { h: f64 },
    /// Exponential decay whose clock is throttled per phase. Before `t0` the
    /// clock is stopped, it runs at `m1` on `[t0, t1)`, `m2` on `[t1, t2)`,
    /// `m3` on `[t2, t3)`, and at full speed from `t3` on.
    RampedExp {
        h: f64,
        t0: f64,
        t1: f64,
        t2: f64,
        t3: f64,
        m1: f64,
        m2: f64,
        m3: f64,
    },
}

impl MintSchedule {
    pub fn exp(h: f64) -> SimResult<Self> {
        let s = MintSchedule::Exp { h };
        s.validate()?;
        Ok(s)
    }

    #[allow(clippy::too_many_arguments)]
    pub fn ramped_exp(h: f64, t0: f64, t1: f64, t2: f64, t3: f64, m1: f64, m2: f64, m3: f64) -> SimResult<Self> {
        let s = MintSchedule::RampedExp {
            h,
            t0,
            t1,
            t2,
            t3,
            m1,
            m2,
            m3,
        };
        s.validate()?;
        Ok(s)
    }

    pub fn validate(&self) -> SimResult<()> {
        match *self {
            MintSchedule::Exp { h } => check_half_life(h),
            MintSchedule::RampedExp {
                h,
                t0,
                t1,
                t2,
                t3,
                m1,
                m2,
                m3,
            } => {
                check_half_life(h)?;
                if !(0.0 <= t0 && t0 <= t1 && t1 <= t2 && t2 <= t3) {
                    return Err(SimError::invalid(format!(
                        "ramp breakpoints must be ordered, got {t0}, {t1}, {t2}, {t3}"
                    )));
                }
                if [m1, m2, m3].iter().any(|m| !m.is_finite() || *m < 0.0) {
                    return Err(SimError::invalid("ramp multipliers must be finite and non-negative"));
                }
                Ok(())
            }
        }
    }

    /// Released fraction in `[0, 1]`, non-decreasing in `t_years`.
    pub fn fraction(&self, t_years: f64) -> f64 {
        if t_years <= 0.0 {
            return 0.0;
        }
        match *self {
            MintSchedule::Exp { h } => exp_fraction(t_years, h),
            MintSchedule::RampedExp {
                h,
                t0,
                t1,
                t2,
                t3,
                m1,
                m2,
                m3,
            } => {
                let phase = |from: f64, to: f64, rate: f64| (t_years.min(to) - from).max(0.0) * rate;
                let clock = phase(t0, t1, m1)
                    + phase(t1, t2, m2)
                    + phase(t2, t3, m3)
                    + phase(t3, f64::INFINITY, 1.0);
                exp_fraction(clock, h)
            }
        }
    }
}

fn exp_fraction(t: f64, h: f64) -> f64 {
    (1.0 - 0.5_f64.powf(t / h)).clamp(0.0, 1.0)
}

fn check_half_life(h: f64) -> SimResult<()> {
    if h.is_finite() && h > 0.0 {
        Ok(())
    } else {
        Err(SimError::invalid(format!("half-life must be positive, got {h}")))
    }
}
