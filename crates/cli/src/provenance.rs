//! Run records written next to sampled edge lists.
//!
//! `edges.csv` gets an `edges.run.json` holding everything needed to rerun
//! the sample: where the vertices came from, the model and sampler config,
//! and per chain the derived seed and final counters.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use spatial_ergm::prelude::*;

/// Where the vertex coordinates came from.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VertexSource {
    Csv(PathBuf),
    Grid { nx: usize, ny: usize, spacing: f64 },
}

impl VertexSource {
    pub fn load(&self) -> Result<SpatialGraph> {
        match self {
            Self::Csv(path) => crate::load_coords(path),
            Self::Grid { nx, ny, spacing } => Ok(SpatialGraph::grid(*nx, *ny, *spacing)?),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChainRecord {
    pub seed: ChainSeed,
    pub stats: RunStats,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RunRecord {
    pub version: String,
    pub code_rev: String,
    pub source: VertexSource,
    pub vertices: usize,
    pub gravity: GravityCfg,
    pub sampler: SamplerCfg,
    pub iterations: u64,
    pub terms: Vec<String>,
    pub chains: Vec<ChainRecord>,
    pub edges: PathBuf,
}

impl RunRecord {
    /// Path of the record for `edges`: same stem, `.run.json` extension.
    pub fn path_for(edges: &Path) -> PathBuf {
        edges.with_extension("run.json")
    }

    pub fn write(&self) -> Result<PathBuf> {
        let path = Self::path_for(&self.edges);
        let raw = serde_json::to_vec_pretty(self)?;
        fs::write(&path, raw).with_context(|| format!("writing {}", path.display()))?;
        Ok(path)
    }

    pub fn read(path: &Path) -> Result<Self> {
        let raw = fs::read(path).with_context(|| format!("reading {}", path.display()))?;
        serde_json::from_slice(&raw).with_context(|| format!("parsing {}", path.display()))
    }
}

/// `GIT_COMMIT` (build time, then run time), else `git rev-parse`, else "unknown".
pub fn current_git_rev() -> String {
    let from_env = option_env!("GIT_COMMIT")
        .map(str::to_string)
        .or_else(|| std::env::var("GIT_COMMIT").ok())
        .filter(|rev| !rev.is_empty());
    if let Some(rev) = from_env {
        return rev;
    }
    Command::new("git")
        .args(["rev-parse", "--short", "HEAD"])
        .output()
        .ok()
        .filter(|out| out.status.success())
        .and_then(|out| String::from_utf8(out.stdout).ok())
        .map(|rev| rev.trim().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn record_sits_next_to_the_edge_list() {
        assert_eq!(
            RunRecord::path_for(Path::new("/tmp/runs/edges.csv")),
            Path::new("/tmp/runs/edges.run.json")
        );
        assert_eq!(
            RunRecord::path_for(Path::new("out")),
            Path::new("out.run.json")
        );
    }

    #[test]
    fn chains_keep_their_seeds_and_stats() {
        let dir = tempdir().unwrap();
        let sampler = SamplerCfg {
            seed: 9,
            log_every: 0,
        };
        let record = RunRecord {
            version: spatial_ergm::VERSION.to_string(),
            code_rev: "abc123".to_string(),
            source: VertexSource::Grid {
                nx: 4,
                ny: 3,
                spacing: 1.5,
            },
            vertices: 12,
            gravity: GravityCfg::default(),
            sampler,
            iterations: 500,
            terms: vec!["gravity".to_string()],
            chains: (0..2)
                .map(|k| ChainRecord {
                    seed: sampler.chain_seed(k),
                    stats: RunStats {
                        iterations: 500,
                        accepted: 40 + k,
                        edges: 7,
                    },
                })
                .collect(),
            edges: dir.path().join("edges.csv"),
        };
        let path = record.write().unwrap();
        assert_eq!(path, dir.path().join("edges.run.json"));

        let back = RunRecord::read(&path).unwrap();
        assert_eq!(back, record);
        assert_eq!(back.chains[1].seed, ChainSeed { seed: 9, index: 1 });
        assert_eq!(back.chains[1].stats.accepted, 41);
    }

    #[test]
    fn grid_source_builds_the_same_graph() {
        let source = VertexSource::Grid {
            nx: 3,
            ny: 2,
            spacing: 2.0,
        };
        let g = source.load().unwrap();
        assert_eq!(g.vertex_count(), 6);
        assert_eq!(g.bounds().max.x, 4.0);
    }
}
