//! Run resolution: turning a parsed configuration into generator inputs.

use crate::error::ConfigError;
use crate::types::{HydraConfig, PerturbationConfig, SearchConfig};
use hydra_net::{ChipIdPolicy, GridSpec, NetworkError, PerturbOptions, SearchOptions, Strategy};

/// A configuration resolved into the values the generator and the network
/// writer consume.
#[derive(Debug, Clone)]
pub struct ResolvedRun {
    /// Configuration name.
    pub name: String,
    /// Io group of the network.
    pub io_group: u32,
    /// Io channel of the network.
    pub io_channel: u32,
    /// Validated grid description.
    pub grid: GridSpec,
    /// Search settings.
    pub search: SearchOptions,
}

/// Resolves `config` into a [`ResolvedRun`].
///
/// Fails if the grid is not generatable, the strategy or chip id policy is
/// unknown, or a search parameter is out of range.
pub fn resolve_run(config: &HydraConfig) -> Result<ResolvedRun, ConfigError> {
    let grid = GridSpec::new(
        config.grid.width,
        config.grid.height,
        config.grid.root,
        config.grid.ext,
    )
    .with_avoid(config.grid.avoid.iter().copied());
    grid.validate()
        .map_err(|e| ConfigError::ValidationError(format!("grid: {e}")))?;

    let chip_ids: ChipIdPolicy = config
        .chip_id
        .policy
        .parse()
        .map_err(|e: NetworkError| ConfigError::ValidationError(format!("chip_id: {e}")))?;

    let search = SearchOptions {
        seed: config.search.seed,
        strategy: resolve_strategy(&config.search)?,
        perturbation: resolve_perturbation(&config.search.perturbation)?,
        chip_ids,
    };

    Ok(ResolvedRun {
        name: config.network.name.clone(),
        io_group: config.network.io_group,
        io_channel: config.network.io_channel,
        grid,
        search,
    })
}

/// Parses a strategy name, applying `beam_width` to beam search.
pub fn resolve_strategy(search: &SearchConfig) -> Result<Strategy, ConfigError> {
    let strategy: Strategy = search.strategy.parse().map_err(|e| match e {
        NetworkError::UnknownStrategy(name) => ConfigError::UnknownStrategy(name),
        other => ConfigError::ValidationError(other.to_string()),
    })?;
    match strategy {
        Strategy::BeamSearch { .. } => {
            if search.beam_width == 0 {
                return Err(ConfigError::ValidationError(
                    "search.beam_width must be at least 1".to_string(),
                ));
            }
            Ok(Strategy::BeamSearch {
                beam_width: search.beam_width,
            })
        }
        other => Ok(other),
    }
}

fn resolve_perturbation(
    config: &PerturbationConfig,
) -> Result<Option<PerturbOptions>, ConfigError> {
    if !config.enabled {
        return Ok(None);
    }
    if !(config.threshold >= 0.0 && config.threshold.is_finite()) {
        return Err(ConfigError::ValidationError(format!(
            "search.perturbation.threshold must be a non-negative number (got {})",
            config.threshold
        )));
    }
    for (field, value) in [("trials", config.trials), ("size", config.size)] {
        if value == Some(0) {
            return Err(ConfigError::ValidationError(format!(
                "search.perturbation.{field} must be at least 1"
            )));
        }
    }
    Ok(Some(PerturbOptions {
        threshold: config.threshold,
        trials: config.trials,
        size: config.size,
        max_rounds: config.max_rounds,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::load_config_from_str;
    use hydra_common::Coord;

    fn config(extra: &str) -> HydraConfig {
        let toml = format!(
            r#"
[network]
name = "tile-1"
io_channel = 3

[grid]
width = 5
height = 5
root = [2, 0]
ext = [2, -1]
avoid = [[1, 1]]
{extra}
"#
        );
        load_config_from_str(&toml).unwrap()
    }

    #[test]
    fn resolves_grid_and_defaults() {
        let run = resolve_run(&config("")).unwrap();
        assert_eq!(run.name, "tile-1");
        assert_eq!(run.io_group, 1);
        assert_eq!(run.io_channel, 3);
        assert_eq!(
            run.grid,
            GridSpec::new(5, 5, Coord::new(2, 0), Coord::new(2, -1)).with_avoid([Coord::new(1, 1)])
        );
        assert_eq!(run.search, SearchOptions::default());
    }

    #[test]
    fn beam_width_applies_to_beam_search() {
        let run = resolve_run(&config(
            "[search]\nstrategy = \"beam_search\"\nbeam_width = 9\nseed = 3",
        ))
        .unwrap();
        assert_eq!(run.search.strategy, Strategy::BeamSearch { beam_width: 9 });
        assert_eq!(run.search.seed, 3);
    }

    #[test]
    fn zero_beam_width_rejected() {
        let mut parsed = config("");
        parsed.search.strategy = "beam_search".to_string();
        parsed.search.beam_width = 0;
        assert!(matches!(
            resolve_run(&parsed),
            Err(ConfigError::ValidationError(_))
        ));
    }

    #[test]
    fn perturbation_resolved_when_enabled() {
        let run = resolve_run(&config(
            "[search.perturbation]\nenabled = true\ntrials = 4\nmax_rounds = 10",
        ))
        .unwrap();
        let options = run.search.perturbation.unwrap();
        assert_eq!(options.trials, Some(4));
        assert_eq!(options.size, None);
        assert_eq!(options.max_rounds, Some(10));
        assert_eq!(options.threshold, 0.01);
    }

    #[test]
    fn disabled_perturbation_is_none() {
        let run = resolve_run(&config("[search.perturbation]\ntrials = 4")).unwrap();
        assert!(run.search.perturbation.is_none());
    }

    #[test]
    fn bad_perturbation_values_rejected() {
        let mut parsed = config("");
        parsed.search.perturbation.enabled = true;
        parsed.search.perturbation.size = Some(0);
        assert!(matches!(
            resolve_run(&parsed),
            Err(ConfigError::ValidationError(ref m)) if m.contains("size")
        ));
        parsed.search.perturbation.size = None;
        parsed.search.perturbation.threshold = -1.0;
        assert!(resolve_run(&parsed).is_err());
    }

    #[test]
    fn unknown_chip_id_policy_rejected() {
        let mut parsed = config("");
        parsed.chip_id.policy = "random".to_string();
        let err = resolve_run(&parsed).unwrap_err();
        assert!(format!("{err}").contains("random"), "{err}");
    }

    #[test]
    fn excluded_root_rejected() {
        let mut parsed = config("");
        parsed.grid.avoid.push(Coord::new(2, 0));
        assert!(matches!(
            resolve_run(&parsed),
            Err(ConfigError::ValidationError(ref m)) if m.starts_with("grid:")
        ));
    }
}
