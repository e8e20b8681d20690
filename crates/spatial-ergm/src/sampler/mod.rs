//! Metropolis–Hastings chain over edge toggles.
//!
//! Model
//! - Term values are energies of an edge being present. For a proposed
//!   insertion the log-acceptance is `Δ = −E`, for a removal `Δ = +E`; the
//!   toggle is accepted with probability `min(1, exp(Δ))`.
//! - Each step is atomic: either the graph is toggled and the counters
//!   advance, or (on error) nothing changes.
//! - Stopping is the caller's business (`run`, `run_until`, or plain `step`).
//!
//! Independent chains share one `Ergm` read-only; `run_chains` drives them in
//! parallel with per-chain seeds derived from a `(seed, index)` token.

mod proposal;

pub use proposal::{ProposalPolicy, Schedule, UniformPairs};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{ErgmError, Result};
use crate::graph::SpatialGraph;
use crate::term::Ergm;

/// Sampler configuration.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SamplerCfg {
    pub seed: u64,
    /// Progress log interval in iterations; 0 disables.
    pub log_every: u64,
}

impl Default for SamplerCfg {
    fn default() -> Self {
        Self {
            seed: 42,
            log_every: 100_000,
        }
    }
}

impl SamplerCfg {
    pub fn chain_seed(&self, index: u64) -> ChainSeed {
        ChainSeed {
            seed: self.seed,
            index,
        }
    }
}

/// Seed token that makes a chain reproducible and indexable.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainSeed {
    pub seed: u64,
    pub index: u64,
}

impl ChainSeed {
    pub fn to_std_rng(self) -> StdRng {
        // SplitMix64-style mixing.
        fn mix(mut x: u64) -> u64 {
            x ^= x >> 30;
            x = x.wrapping_mul(0xbf58476d1ce4e5b9);
            x ^= x >> 27;
            x = x.wrapping_mul(0x94d049bb133111eb);
            x ^ (x >> 31)
        }
        let k = mix(self.seed ^ mix(self.index.wrapping_add(0x9e3779b97f4a7c15)));
        StdRng::seed_from_u64(k)
    }
}

/// Outcome of one proposal.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Step {
    pub i: usize,
    pub j: usize,
    /// Log-acceptance of the toggle.
    pub delta: f64,
    pub accepted: bool,
}

/// Counters after a run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunStats {
    pub iterations: u64,
    pub accepted: u64,
    pub edges: usize,
}

/// A single chain. Owns its graph; borrows the model.
pub struct ChainSampler<'m, P: ProposalPolicy = UniformPairs> {
    model: &'m Ergm,
    graph: SpatialGraph,
    proposals: P,
    rng: StdRng,
    chain: u64,
    iteration: u64,
    accepted: u64,
    log_every: u64,
}

impl<'m> ChainSampler<'m, UniformPairs> {
    /// Chain 0 of `cfg` with uniform pair proposals.
    pub fn new(model: &'m Ergm, graph: SpatialGraph, cfg: &SamplerCfg) -> Result<Self> {
        Self::with_proposals(model, graph, UniformPairs, cfg.chain_seed(0), cfg.log_every)
    }
}

impl<'m, P: ProposalPolicy> ChainSampler<'m, P> {
    pub fn with_proposals(
        model: &'m Ergm,
        graph: SpatialGraph,
        proposals: P,
        seed: ChainSeed,
        log_every: u64,
    ) -> Result<Self> {
        if graph.vertex_count() < 2 {
            return Err(ErgmError::config("sampling needs at least two vertices"));
        }
        Ok(Self {
            model,
            graph,
            proposals,
            rng: seed.to_std_rng(),
            chain: seed.index,
            iteration: 0,
            accepted: 0,
            log_every,
        })
    }

    /// Propose one toggle, accept or reject it, advance the counter.
    pub fn step(&mut self) -> Result<Step> {
        let (i, j) = self
            .proposals
            .propose(self.graph.vertex_count(), &mut self.rng);
        self.graph.check_pair(i, j)?;

        let insert = !self.graph.has_edge(i, j);
        let energy = self.model.change_statistic(&self.graph, i, j, insert)?;
        let delta = if insert { -energy } else { energy };
        let accepted = delta >= 0.0 || self.rng.gen::<f64>() < delta.exp();
        if accepted {
            self.graph.toggle_edge(i, j)?;
            self.accepted += 1;
        }
        self.iteration += 1;

        if self.log_every > 0 && self.iteration % self.log_every == 0 {
            info!(
                chain = self.chain,
                iteration = self.iteration,
                accepted = self.accepted,
                edges = self.graph.edge_count(),
                "sampling"
            );
        }
        Ok(Step {
            i,
            j,
            delta,
            accepted,
        })
    }

    /// Run exactly `n` more steps.
    pub fn run(&mut self, n: u64) -> Result<RunStats> {
        for _ in 0..n {
            self.step()?;
        }
        debug!(chain = self.chain, iterations = n, "run finished");
        Ok(self.stats())
    }

    /// Step until `stop` returns true; `stop` is checked before every step.
    pub fn run_until(&mut self, mut stop: impl FnMut(&Self) -> bool) -> Result<RunStats> {
        while !stop(self) {
            self.step()?;
        }
        Ok(self.stats())
    }

    pub fn stats(&self) -> RunStats {
        RunStats {
            iterations: self.iteration,
            accepted: self.accepted,
            edges: self.graph.edge_count(),
        }
    }

    #[inline]
    pub fn graph(&self) -> &SpatialGraph {
        &self.graph
    }

    #[inline]
    pub fn iteration(&self) -> u64 {
        self.iteration
    }

    #[inline]
    pub fn accepted(&self) -> u64 {
        self.accepted
    }

    pub fn acceptance_rate(&self) -> f64 {
        if self.iteration == 0 {
            0.0
        } else {
            self.accepted as f64 / self.iteration as f64
        }
    }

    pub fn into_graph(self) -> SpatialGraph {
        self.graph
    }
}

/// Run one uniform-proposal chain per graph in parallel, `iterations` steps each.
///
/// Chain `k` uses `cfg.chain_seed(k)`, so results match running the chains
/// one by one.
pub fn run_chains(
    model: &Ergm,
    graphs: Vec<SpatialGraph>,
    cfg: &SamplerCfg,
    iterations: u64,
) -> Result<Vec<(SpatialGraph, RunStats)>> {
    info!(chains = graphs.len(), iterations, "running independent chains");
    graphs
        .into_par_iter()
        .enumerate()
        .map(|(k, graph)| -> Result<(SpatialGraph, RunStats)> {
            let mut chain = ChainSampler::with_proposals(
                model,
                graph,
                UniformPairs,
                cfg.chain_seed(k as u64),
                cfg.log_every,
            )?;
            let stats = chain.run(iterations)?;
            Ok((chain.into_graph(), stats))
        })
        .collect()
}
