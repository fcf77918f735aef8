//! Configuration types deserialized from `hydra.toml`.

use hydra_common::Coord;
use serde::Deserialize;

/// The top-level run configuration parsed from `hydra.toml`.
#[derive(Debug, Clone, Deserialize)]
pub struct HydraConfig {
    /// Name and controller addressing of the network.
    pub network: NetworkMeta,
    /// Grid layout.
    pub grid: GridConfig,
    /// Search settings.
    #[serde(default)]
    pub search: SearchConfig,
    /// Chip id assignment.
    #[serde(default)]
    pub chip_id: ChipIdConfig,
}

/// Identifies the generated network in the controller configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct NetworkMeta {
    /// Configuration name written to the output file.
    pub name: String,
    /// Io group the network hangs off.
    #[serde(default = "default_io_index")]
    pub io_group: u32,
    /// Io channel the root chip is wired to.
    #[serde(default = "default_io_index")]
    pub io_channel: u32,
}

fn default_io_index() -> u32 {
    1
}

/// Grid shape, root, external link and exclusions.
#[derive(Debug, Clone, Deserialize)]
pub struct GridConfig {
    /// Slots along x.
    pub width: u32,
    /// Slots along y.
    pub height: u32,
    /// Root chip position, as `[x, y]`.
    pub root: Coord,
    /// External link position, as `[x, y]`.
    pub ext: Coord,
    /// Slots without a chip.
    #[serde(default)]
    pub avoid: Vec<Coord>,
}

/// Tree search settings.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchConfig {
    /// Seed for every random choice.
    #[serde(default = "default_seed")]
    pub seed: u64,
    /// Pruning strategy name.
    #[serde(default = "default_strategy")]
    pub strategy: String,
    /// Beam width, used by `beam_search` only.
    #[serde(default = "default_beam_width")]
    pub beam_width: usize,
    /// Perturbation search after pruning.
    #[serde(default)]
    pub perturbation: PerturbationConfig,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            seed: default_seed(),
            strategy: default_strategy(),
            beam_width: default_beam_width(),
            perturbation: PerturbationConfig::default(),
        }
    }
}

fn default_seed() -> u64 {
    hydra_net::DEFAULT_SEED
}

fn default_strategy() -> String {
    hydra_net::Strategy::default().name().to_string()
}

fn default_beam_width() -> usize {
    hydra_net::prune::DEFAULT_BEAM_WIDTH
}

/// Perturbation search settings.
#[derive(Debug, Clone, Deserialize)]
pub struct PerturbationConfig {
    /// Whether to run perturbation at all.
    #[serde(default)]
    pub enabled: bool,
    /// Minimum fractional improvement to keep going.
    #[serde(default = "default_threshold")]
    pub threshold: f64,
    /// Trials per round.
    pub trials: Option<usize>,
    /// Edges restored per trial.
    pub size: Option<usize>,
    /// Hard cap on rounds.
    pub max_rounds: Option<usize>,
}

impl Default for PerturbationConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            threshold: default_threshold(),
            trials: None,
            size: None,
            max_rounds: None,
        }
    }
}

fn default_threshold() -> f64 {
    hydra_net::perturb::DEFAULT_THRESHOLD
}

/// Chip id assignment settings.
#[derive(Debug, Clone, Deserialize)]
pub struct ChipIdConfig {
    /// Policy name: `simple`, `position` or `head`.
    #[serde(default = "default_policy")]
    pub policy: String,
}

impl Default for ChipIdConfig {
    fn default() -> Self {
        Self {
            policy: default_policy(),
        }
    }
}

fn default_policy() -> String {
    hydra_net::ChipIdPolicy::default().name().to_string()
}
