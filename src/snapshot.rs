// src/snapshot.rs

//! Serializable views of the world, written as one JSON object per tick.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use serde::Serialize;

use crate::agents::agent_type::AgentKind;
use crate::error::SimResult;
use crate::kpis::Kpis;
use crate::sim_state::SimState;
use crate::wallet::WalletSnapshot;

#[derive(Debug, Clone, Serialize)]
pub struct AgentSnapshot {
    pub name: String,
    pub kind: AgentKind,
    pub wallet: WalletSnapshot,
}

#[derive(Debug, Clone, Serialize)]
pub struct TickSnapshot {
    pub tick: u64,
    pub elapsed_s: u64,
    pub token_price: f64,
    pub token_supply: f64,
    pub total_minted: f64,
    pub total_burned: f64,
    pub speculation_valuation: f64,
    pub n_pools: usize,
    pub rugged_pools: Vec<String>,
    pub agents: Vec<AgentSnapshot>,
}

impl TickSnapshot {
    pub fn capture(state: &SimState) -> SimResult<Self> {
        let agents = state
            .agents()
            .map(|a| AgentSnapshot {
                name: a.name().to_string(),
                kind: a.kind(),
                wallet: a.wallet().snapshot(),
            })
            .collect();
        Ok(Self {
            tick: state.current_tick(),
            elapsed_s: state.elapsed_seconds(),
            token_price: state.token_price()?,
            token_supply: state.token_supply(),
            total_minted: state.total_minted(),
            total_burned: state.total_burned(),
            speculation_valuation: state.speculation_valuation(),
            n_pools: state.num_pools(),
            rugged_pools: state.rugged_pools().to_vec(),
            agents,
        })
    }
}

/// JSON-lines sink for [`TickSnapshot`]s.
pub struct SnapshotWriter<W: Write> {
    out: W,
    written: usize,
}

impl SnapshotWriter<BufWriter<File>> {
    pub fn create(path: impl AsRef<Path>) -> SimResult<Self> {
        Ok(Self::new(BufWriter::new(File::create(path)?)))
    }
}

impl<W: Write> SnapshotWriter<W> {
    pub fn new(out: W) -> Self {
        Self { out, written: 0 }
    }

    pub fn write(&mut self, snapshot: &TickSnapshot) -> SimResult<()> {
        serde_json::to_writer(&mut self.out, snapshot)?;
        self.out.write_all(b"\n")?;
        self.written += 1;
        Ok(())
    }

    pub fn written(&self) -> usize {
        self.written
    }

    pub fn finish(mut self) -> SimResult<W> {
        self.out.flush()?;
        Ok(self.out)
    }
}

/// Dumps every KPI series as one pretty-printed JSON document.
pub fn write_kpis_json(path: impl AsRef<Path>, kpis: &Kpis) -> SimResult<()> {
    let mut out = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut out, kpis)?;
    out.flush()?;
    Ok(())
}
