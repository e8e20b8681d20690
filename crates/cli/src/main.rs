use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing_subscriber::fmt::SubscriberBuilder;

use spatial_ergm::prelude::*;

mod provenance;

use provenance::{ChainRecord, RunRecord, VertexSource};

#[derive(Parser)]
#[command(name = "cli")]
#[command(about = "Spatial ERGM sampler runner")]
struct Cmd {
    #[command(subcommand)]
    action: Action,
}

#[derive(Subcommand)]
enum Action {
    /// Sample graphs over a vertex set and write the edge list under `--out`
    Sample(SampleArgs),
    /// Print version, git revision, and default config as JSON
    Report,
}

#[derive(clap::Args)]
struct SampleArgs {
    /// CSV with `x` and `y` columns; mutually exclusive with `--grid`
    #[arg(long, conflicts_with = "grid")]
    input: Option<PathBuf>,
    /// Regular grid `NXxNY`, e.g. `10x10`
    #[arg(long)]
    grid: Option<String>,
    #[arg(long, default_value_t = 1.0)]
    spacing: f64,
    /// JSON model config (`{"gravity": {...}, "sampler": {...}}`); flags override it
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long)]
    bin_width: Option<f64>,
    #[arg(long)]
    reweight_boundaries: bool,
    #[arg(long)]
    reweight_density: bool,
    #[arg(long)]
    seed: Option<u64>,
    #[arg(long, default_value_t = 100_000)]
    iterations: u64,
    #[arg(long, default_value_t = 1)]
    chains: usize,
    /// Output edge list (CSV: chain,i,j)
    #[arg(long)]
    out: PathBuf,
}

/// Model configuration as stored on disk.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
struct ModelCfg {
    gravity: GravityCfg,
    sampler: SamplerCfg,
}

impl ModelCfg {
    fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let raw = std::fs::read(path).with_context(|| format!("reading {}", path.display()))?;
        serde_json::from_slice(&raw).with_context(|| format!("parsing {}", path.display()))
    }

    fn apply_flags(mut self, args: &SampleArgs) -> Self {
        if let Some(w) = args.bin_width {
            self.gravity.bin_width = w;
        }
        self.gravity.reweight_boundaries |= args.reweight_boundaries;
        self.gravity.reweight_density |= args.reweight_density;
        if let Some(seed) = args.seed {
            self.sampler.seed = seed;
        }
        self
    }
}

fn main() -> Result<()> {
    SubscriberBuilder::default().with_target(false).init();
    let cmd = Cmd::parse();
    match cmd.action {
        Action::Sample(args) => sample(args),
        Action::Report => report(),
    }
}

fn sample(args: SampleArgs) -> Result<()> {
    let cfg = ModelCfg::load(args.config.as_deref())?.apply_flags(&args);
    let source = vertex_source(&args)?;
    let graph = source.load()?;
    tracing::info!(
        vertices = graph.vertex_count(),
        chains = args.chains,
        iterations = args.iterations,
        "sample"
    );

    let term = GravityTerm::new(&graph, cfg.gravity)?;
    let model = Ergm::new().with_term(1.0, term);
    let graphs = vec![graph; args.chains.max(1)];
    let results = run_chains(&model, graphs, &cfg.sampler, args.iterations)?;
    for (k, (_, stats)) in results.iter().enumerate() {
        tracing::info!(
            chain = k,
            accepted = stats.accepted,
            edges = stats.edges,
            "chain finished"
        );
    }

    write_edges(&args.out, &results)?;
    let record = RunRecord {
        version: spatial_ergm::VERSION.to_string(),
        code_rev: provenance::current_git_rev(),
        vertices: results.first().map_or(0, |(g, _)| g.vertex_count()),
        source,
        gravity: cfg.gravity,
        sampler: cfg.sampler,
        iterations: args.iterations,
        terms: model.term_names().map(str::to_string).collect(),
        chains: results
            .iter()
            .enumerate()
            .map(|(k, (_, stats))| ChainRecord {
                seed: cfg.sampler.chain_seed(k as u64),
                stats: *stats,
            })
            .collect(),
        edges: args.out.clone(),
    };
    let path = record.write()?;
    tracing::info!(record = %path.display(), "run record written");
    Ok(())
}

fn vertex_source(args: &SampleArgs) -> Result<VertexSource> {
    match (&args.input, &args.grid) {
        (Some(input), _) => Ok(VertexSource::Csv(input.clone())),
        (None, Some(grid)) => {
            let (nx, ny) = parse_grid(grid)?;
            Ok(VertexSource::Grid {
                nx,
                ny,
                spacing: args.spacing,
            })
        }
        (None, None) => bail!("either --input or --grid is required"),
    }
}

fn parse_grid(spec: &str) -> Result<(usize, usize)> {
    let (nx, ny) = spec
        .split_once(['x', 'X'])
        .with_context(|| format!("grid must look like NXxNY, got {spec:?}"))?;
    Ok((nx.trim().parse()?, ny.trim().parse()?))
}

/// Read vertex coordinates from the `x` and `y` columns of a CSV file.
pub(crate) fn load_coords(path: &Path) -> Result<SpatialGraph> {
    let df = LazyCsvReader::new(path)
        .with_infer_schema_length(Some(100))
        .finish()?
        .collect()
        .with_context(|| format!("reading {}", path.display()))?;
    tracing::info!(rows = df.height(), cols = df.width(), "input_csv_shape");
    let column = |name: &str| -> Result<Vec<f64>> {
        let series = df.column(name)?.cast(&DataType::Float64)?;
        series
            .f64()?
            .into_iter()
            .enumerate()
            .map(|(row, v)| v.with_context(|| format!("missing {name} in row {row}")))
            .collect()
    };
    let xs = column("x")?;
    let ys = column("y")?;
    let points: Vec<(f64, f64)> = xs.into_iter().zip(ys).collect();
    Ok(SpatialGraph::from_xy(&points)?)
}

fn write_edges(out: &Path, results: &[(SpatialGraph, RunStats)]) -> Result<()> {
    if let Some(parent) = out.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let (mut chain, mut from, mut to) = (Vec::new(), Vec::new(), Vec::new());
    for (k, (graph, _)) in results.iter().enumerate() {
        for (i, j) in graph.edges() {
            chain.push(k as u32);
            from.push(i as u32);
            to.push(j as u32);
        }
    }
    let mut df = df!("chain" => chain, "i" => from, "j" => to)?;
    let mut file = File::create(out).with_context(|| format!("creating {}", out.display()))?;
    CsvWriter::new(&mut file).finish(&mut df)?;
    Ok(())
}

fn report() -> Result<()> {
    let obj = serde_json::json!({
        "code_rev": provenance::current_git_rev(),
        "version": spatial_ergm::VERSION,
        "defaults": ModelCfg::default(),
    });
    println!("{}", serde_json::to_string_pretty(&obj)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn parse_grid_accepts_both_separators() {
        assert_eq!(parse_grid("10x4").unwrap(), (10, 4));
        assert_eq!(parse_grid("3X3").unwrap(), (3, 3));
        assert!(parse_grid("ten").is_err());
    }

    #[test]
    fn model_cfg_partial_json_uses_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("model.json");
        std::fs::write(&path, r#"{"gravity": {"bin_width": 2.5}}"#).unwrap();
        let cfg = ModelCfg::load(Some(&path)).unwrap();
        assert_eq!(cfg.gravity.bin_width, 2.5);
        assert!(!cfg.gravity.reweight_density);
        assert_eq!(cfg.sampler, SamplerCfg::default());
    }

    #[test]
    fn coords_roundtrip_through_csv() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("coords.csv");
        std::fs::write(&path, "x,y\n0,0\n1.5,2\n3,4\n").unwrap();
        let g = load_coords(&path).unwrap();
        assert_eq!(g.vertex_count(), 3);
        assert!((g.distance(0, 2) - 5.0).abs() < 1e-12);
    }

    #[test]
    fn edges_written_as_csv() {
        let dir = tempdir().unwrap();
        let out = dir.path().join("run/edges.csv");
        let mut g = SpatialGraph::grid(2, 2, 1.0).unwrap();
        g.add_edge(0, 1).unwrap();
        g.add_edge(2, 3).unwrap();
        write_edges(&out, &[(g, RunStats::default())]).unwrap();
        let text = std::fs::read_to_string(&out).unwrap();
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines, vec!["chain,i,j", "0,0,1", "0,2,3"]);
    }

    #[test]
    fn sample_writes_edges_and_run_record() {
        let dir = tempdir().unwrap();
        let out = dir.path().join("edges.csv");
        let args = SampleArgs {
            input: None,
            grid: Some("4x4".to_string()),
            spacing: 1.0,
            config: None,
            bin_width: None,
            reweight_boundaries: true,
            reweight_density: false,
            seed: Some(17),
            iterations: 300,
            chains: 2,
            out: out.clone(),
        };
        sample(args).unwrap();
        assert!(out.exists());

        let record = RunRecord::read(&dir.path().join("edges.run.json")).unwrap();
        assert_eq!(
            record.source,
            VertexSource::Grid {
                nx: 4,
                ny: 4,
                spacing: 1.0
            }
        );
        assert_eq!(record.vertices, 16);
        assert!(record.gravity.reweight_boundaries);
        assert_eq!(record.terms, vec!["gravity"]);
        assert_eq!(record.chains.len(), 2);
        for (k, chain) in record.chains.iter().enumerate() {
            assert_eq!(chain.seed, ChainSeed { seed: 17, index: k as u64 });
            assert_eq!(chain.stats.iterations, 300);
        }
    }
}
