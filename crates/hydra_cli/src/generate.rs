//! The `hydra generate` command.
//!
//! Builds a [`HydraConfig`] from the `--config` file (if any) with
//! command-line overrides applied on top, generates the network and writes
//! it as a controller network configuration.

use std::fs;
use std::path::Path;

use clap::Parser;
use hydra_common::Coord;
use hydra_config::{
    load_config, resolve_run, ChipIdConfig, GridConfig, HydraConfig, NetworkMeta, SearchConfig,
};
use hydra_net::{generate_network, UartMaps};
use log::info;

use crate::network::{network_config, read_previous};
use crate::GlobalArgs;

/// Arguments for the `hydra generate` subcommand.
#[derive(Parser, Debug)]
pub struct GenerateArgs {
    /// Number of slots along x.
    #[arg(short = 'x', long)]
    pub x_slots: Option<u32>,

    /// Number of slots along y.
    #[arg(short = 'y', long)]
    pub y_slots: Option<u32>,

    /// Root chip position.
    #[arg(long, num_args = 2, value_names = ["X", "Y"], allow_negative_numbers = true)]
    pub root: Vec<i32>,

    /// External link position.
    #[arg(long, num_args = 2, value_names = ["X", "Y"], allow_negative_numbers = true)]
    pub ext: Vec<i32>,

    /// Slots without a chip, as `X Y` pairs. Replaces the configured list.
    #[arg(long, num_args = 2.., value_names = ["X", "Y"], allow_negative_numbers = true)]
    pub avoid: Vec<i32>,

    /// Random seed.
    #[arg(long)]
    pub seed: Option<u64>,

    /// Pruning strategy (`simple`, `simple2`, `beam_search`, `fifo_product`,
    /// `greedy_tree`).
    #[arg(long)]
    pub strategy: Option<String>,

    /// Beam width for `beam_search`.
    #[arg(long)]
    pub beam_width: Option<usize>,

    /// Run perturbation search after pruning.
    #[arg(long)]
    pub perturb: bool,

    /// Minimum fractional score improvement to keep perturbing.
    #[arg(long)]
    pub threshold: Option<f64>,

    /// Perturbation trials per round.
    #[arg(long)]
    pub trials: Option<usize>,

    /// Claims restored per perturbation trial.
    #[arg(long)]
    pub size: Option<usize>,

    /// Upper bound on perturbation rounds.
    #[arg(long)]
    pub max_rounds: Option<usize>,

    /// Chip id policy (`simple`, `position`, `head`).
    #[arg(long)]
    pub chip_id: Option<String>,

    /// Io group of the network.
    #[arg(long)]
    pub io_group: Option<u32>,

    /// Io channel of the network.
    #[arg(long)]
    pub io_channel: Option<u32>,

    /// Configuration name.
    #[arg(short, long)]
    pub name: Option<String>,

    /// Output file. An existing file is updated in place; without one the
    /// network is printed to stdout.
    #[arg(short, long)]
    pub outfile: Option<String>,
}

/// Runs the `hydra generate` command.
pub fn run(args: &GenerateArgs, global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let base = match &global.config {
        Some(path) => Some(load_config(Path::new(path))?),
        None => None,
    };
    let config = apply_overrides(base, args)?;
    let run = resolve_run(&config)?;

    let network = generate_network(&run.grid, &run.search)?;

    let previous = match &args.outfile {
        Some(path) => read_previous(Path::new(path))?,
        None => None,
    };
    let value = network_config(
        &network.topology,
        &run.name,
        run.io_group,
        run.io_channel,
        &UartMaps::default(),
        previous,
    );
    let text = serde_json::to_string_pretty(&value)?;

    match &args.outfile {
        Some(path) => {
            fs::write(path, text + "\n")
                .map_err(|e| format!("failed to write {path}: {e}"))?;
            info!("wrote {path}");
        }
        None => println!("{text}"),
    }

    if !global.quiet {
        eprintln!(
            "   Generated {}: {} chips, score {:.3} (max load {}, mean load {:.3})",
            run.name,
            network.topology.chip_count(),
            network.stats.score(),
            network.stats.max,
            network.stats.mean()
        );
    }
    Ok(0)
}

/// Merges command-line arguments over `base`.
///
/// Without a base configuration, the grid size, root, external link and
/// name must all be given on the command line.
fn apply_overrides(
    base: Option<HydraConfig>,
    args: &GenerateArgs,
) -> Result<HydraConfig, Box<dyn std::error::Error>> {
    let root = coord_arg("root", &args.root)?;
    let ext = coord_arg("ext", &args.ext)?;

    let mut config = match base {
        Some(config) => config,
        None => HydraConfig {
            network: NetworkMeta {
                name: required("name", args.name.clone())?,
                io_group: 1,
                io_channel: 1,
            },
            grid: GridConfig {
                width: required("x-slots", args.x_slots)?,
                height: required("y-slots", args.y_slots)?,
                root: required("root", root)?,
                ext: required("ext", ext)?,
                avoid: Vec::new(),
            },
            search: SearchConfig::default(),
            chip_id: ChipIdConfig::default(),
        },
    };

    if let Some(name) = &args.name {
        config.network.name = name.clone();
    }
    if let Some(io_group) = args.io_group {
        config.network.io_group = io_group;
    }
    if let Some(io_channel) = args.io_channel {
        config.network.io_channel = io_channel;
    }
    if let Some(width) = args.x_slots {
        config.grid.width = width;
    }
    if let Some(height) = args.y_slots {
        config.grid.height = height;
    }
    if let Some(root) = root {
        config.grid.root = root;
    }
    if let Some(ext) = ext {
        config.grid.ext = ext;
    }
    if !args.avoid.is_empty() {
        config.grid.avoid = coord_pairs(&args.avoid)?;
    }
    if let Some(seed) = args.seed {
        config.search.seed = seed;
    }
    if let Some(strategy) = &args.strategy {
        config.search.strategy = strategy.clone();
    }
    if let Some(beam_width) = args.beam_width {
        config.search.beam_width = beam_width;
    }
    if args.perturb {
        config.search.perturbation.enabled = true;
    }
    if let Some(threshold) = args.threshold {
        config.search.perturbation.threshold = threshold;
    }
    if let Some(trials) = args.trials {
        config.search.perturbation.trials = Some(trials);
    }
    if let Some(size) = args.size {
        config.search.perturbation.size = Some(size);
    }
    if let Some(max_rounds) = args.max_rounds {
        config.search.perturbation.max_rounds = Some(max_rounds);
    }
    if let Some(policy) = &args.chip_id {
        config.chip_id.policy = policy.clone();
    }
    Ok(config)
}

fn required<T>(flag: &str, value: Option<T>) -> Result<T, Box<dyn std::error::Error>> {
    value.ok_or_else(|| format!("missing --{flag} (give it or use --config)").into())
}

fn coord_arg(flag: &str, values: &[i32]) -> Result<Option<Coord>, Box<dyn std::error::Error>> {
    match values {
        [] => Ok(None),
        [x, y] => Ok(Some(Coord::new(*x, *y))),
        _ => Err(format!("--{flag} takes exactly two values, got {}", values.len()).into()),
    }
}

fn coord_pairs(values: &[i32]) -> Result<Vec<Coord>, Box<dyn std::error::Error>> {
    if values.len() % 2 != 0 {
        return Err(format!(
            "--avoid takes X Y pairs, got {} values",
            values.len()
        )
        .into());
    }
    Ok(values
        .chunks_exact(2)
        .map(|pair| Coord::new(pair[0], pair[1]))
        .collect())
}
