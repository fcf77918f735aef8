//! Daisy-chain network synthesis for Hydra chip grids.
//!
//! Chips on a grid relay their data, hop by hop, to a single root chip that
//! is wired to the external readout system. This crate chooses which
//! neighbor each chip forwards to so that the worst-case FIFO occupancy under
//! synchronized activity stays low, and emits the resulting networks with
//! chip ids and uart ports.
//!
//! # Pipeline
//!
//! 1. **Build** the bidirectional candidate graph from a [`GridSpec`]
//! 2. **Prune** it to a tree with one of the [`Strategy`] variants
//! 3. **Perturb** (optional): restore discarded claims and re-prune while the
//!    score keeps improving
//! 4. **Emit** the upstream, downstream and command networks as a [`Topology`]
//!
//! # Usage
//!
//! ```ignore
//! use hydra_common::Coord;
//! use hydra_net::{generate_network, GridSpec, SearchOptions};
//!
//! let grid = GridSpec::new(10, 10, Coord::new(0, 0), Coord::new(-1, 0));
//! let network = generate_network(&grid, &SearchOptions::default())?;
//! println!("score {}", network.stats.score());
//! ```

#![warn(missing_docs)]

pub mod builder;
pub mod chip_id;
pub mod emit;
pub mod error;
pub mod graph;
pub mod ids;
pub mod load;
pub mod perturb;
pub mod ports;
pub mod prune;

pub use builder::{build_candidate_graph, GridSpec};
pub use chip_id::{ChipIdAssigner, ChipIdPolicy};
pub use emit::{emit, EmittedNode, Link, Topology};
pub use error::NetworkError;
pub use graph::{Edge, NetworkGraph, Node, NodeKind};
pub use ids::NodeId;
pub use load::{fifo_load, LoadStats};
pub use perturb::{perturb, PerturbOptions, PerturbReport};
pub use ports::UartMaps;
pub use prune::Strategy;

use log::info;
use rand::rngs::StdRng;
use rand::SeedableRng;

/// Seed used when none is given.
pub const DEFAULT_SEED: u64 = 12345;

/// How to search for a tree.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchOptions {
    /// Seed for every random choice of the run.
    pub seed: u64,
    /// Pruning strategy.
    pub strategy: Strategy,
    /// Perturbation search after pruning, if enabled.
    pub perturbation: Option<PerturbOptions>,
    /// Chip id scheme used by [`generate_network`].
    pub chip_ids: ChipIdPolicy,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            seed: DEFAULT_SEED,
            strategy: Strategy::default(),
            perturbation: None,
            chip_ids: ChipIdPolicy::default(),
        }
    }
}

/// The result of a generation run.
#[derive(Debug, Clone)]
pub struct GeneratedNetwork {
    /// The emitted networks.
    pub topology: Topology,
    /// The final tree.
    pub tree: NetworkGraph,
    /// Load figures of the final tree.
    pub stats: LoadStats,
    /// Perturbation outcome, if perturbation ran.
    pub perturbation: Option<PerturbReport>,
}

/// Generates a network for `grid`, assigning chip ids with
/// `options.chip_ids`.
pub fn generate_network(
    grid: &GridSpec,
    options: &SearchOptions,
) -> Result<GeneratedNetwork, NetworkError> {
    generate_network_with(grid, options, &options.chip_ids)
}

/// Generates a network for `grid`, assigning chip ids with `assigner`.
///
/// The same `grid`, `options` and assigner always produce the same network.
pub fn generate_network_with(
    grid: &GridSpec,
    options: &SearchOptions,
    assigner: &dyn ChipIdAssigner,
) -> Result<GeneratedNetwork, NetworkError> {
    let mut candidate = build_candidate_graph(grid)?;
    prune::prepare(&mut candidate);
    let mut rng = StdRng::seed_from_u64(options.seed);

    info!(
        "pruning {} chips with {} (seed {})",
        candidate.chip_count(),
        options.strategy,
        options.seed
    );
    let mut tree = options.strategy.prune(candidate.clone(), &mut rng);
    info!("initial score {:.3}", tree.network_score());

    let (mut tree, perturbation) = match &options.perturbation {
        Some(perturb_options) => {
            let pool = candidate.edge_list();
            let (tree, report) = perturb(
                tree,
                &pool,
                options.strategy,
                perturb_options,
                &mut rng,
            );
            info!(
                "perturbation: {} rounds of {} trials restoring {} claims, score {:.3} -> {:.3}",
                report.rounds, report.trials, report.size, report.initial_score, report.final_score
            );
            (tree, Some(report))
        }
        None => (tree, None),
    };

    tree.validate_arborescence()?;
    let stats = tree.load_stats();
    info!(
        "final score {:.3} (max load {}, mean load {:.3})",
        stats.score(),
        stats.max,
        stats.mean()
    );
    let topology = emit(&tree, assigner)?;

    Ok(GeneratedNetwork {
        topology,
        tree,
        stats,
        perturbation,
    })
}
