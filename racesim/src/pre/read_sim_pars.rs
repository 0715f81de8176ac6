use crate::core::race::{RacePars, SimConstants};
use crate::core::track::TrackPars;
use anyhow::Context;
use helpers::general::InputValueError;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::fs::OpenOptions;
use std::path::Path;

/// SimPars is used to store all other parameter structs.
///
/// * `race_pars` - Race setup
/// * `track_pars_all` - Additional tracks registered next to the built-in ones
/// * `sim_consts` - Simulation constants, the defaults are used if missing
#[derive(Debug, Deserialize, Clone)]
pub struct SimPars {
    pub race_pars: RacePars,
    #[serde(default)]
    pub track_pars_all: Vec<TrackPars>,
    #[serde(default)]
    pub sim_consts: SimConstants,
}

fn read_json<T: DeserializeOwned>(filepath: &Path, what: &str) -> anyhow::Result<T> {
    let fh = OpenOptions::new()
        .read(true)
        .open(filepath)
        .context(format!("Failed to open {} file {}!", what, filepath.display()))?;
    let pars = serde_json::from_reader(&fh)
        .context(format!("Failed to parse {} file {}!", what, filepath.display()))?;
    Ok(pars)
}

/// read_sim_pars reads the JSON file and decodes the JSON string into the simulation parameters
/// struct. Every contained track is checked against the track requirements.
pub fn read_sim_pars(filepath: &Path) -> anyhow::Result<SimPars> {
    let sim_pars: SimPars = read_json(filepath, "parameter")?;

    for track_pars in sim_pars.track_pars_all.iter() {
        check_track_pars(track_pars)
            .context(format!("Invalid track in parameter file {}!", filepath.display()))?;
    }
    check_sim_consts(&sim_pars.sim_consts)
        .context(format!("Invalid constants in parameter file {}!", filepath.display()))?;
    if sim_pars.race_pars.max_players == 0 {
        return Err(InputValueError::new("max_players must be at least 1"))
            .context(format!("Invalid race in parameter file {}!", filepath.display()));
    }

    Ok(sim_pars)
}

/// Read simulation constants (physics parameters) from a JSON file.
pub fn read_sim_constants(filepath: &Path) -> anyhow::Result<SimConstants> {
    let sim_consts: SimConstants = read_json(filepath, "simulation constants")?;
    check_sim_consts(&sim_consts)
        .context(format!("Invalid simulation constants file {}!", filepath.display()))?;
    Ok(sim_consts)
}

/// Read a single track definition from a JSON file.
pub fn read_track_pars(filepath: &Path) -> anyhow::Result<TrackPars> {
    let track_pars: TrackPars = read_json(filepath, "track config")?;
    check_track_pars(&track_pars)
        .context(format!("Invalid track config file {}!", filepath.display()))?;
    Ok(track_pars)
}

/// check_track_pars verifies the requirements a track must fulfill before it can be registered.
pub fn check_track_pars(track_pars: &TrackPars) -> Result<(), InputValueError> {
    track_pars
        .check()
        .map_err(|e| InputValueError::new(e.to_string()))
}

/// check_sim_consts verifies that the simulation constants allow a stable simulation.
pub fn check_sim_consts(sim_consts: &SimConstants) -> Result<(), InputValueError> {
    if !(sim_consts.timestep_size > 0.0 && sim_consts.timestep_size.is_finite()) {
        return Err(InputValueError::new(format!(
            "timestep_size must be positive and finite, got {}",
            sim_consts.timestep_size
        )));
    }
    if !(sim_consts.friction > 0.0 && sim_consts.friction < 1.0) {
        return Err(InputValueError::new(format!(
            "friction must be in (0, 1), got {}",
            sim_consts.friction
        )));
    }
    if !(sim_consts.max_speed > 0.0 && sim_consts.max_speed.is_finite()) {
        return Err(InputValueError::new(format!(
            "max_speed must be positive and finite, got {}",
            sim_consts.max_speed
        )));
    }
    if !(sim_consts.max_health > 0.0 && sim_consts.max_health.is_finite()) {
        return Err(InputValueError::new(format!(
            "max_health must be positive and finite, got {}",
            sim_consts.max_health
        )));
    }
    if !(sim_consts.max_boost >= 0.0 && sim_consts.max_boost.is_finite()) {
        return Err(InputValueError::new(format!(
            "max_boost must be non-negative and finite, got {}",
            sim_consts.max_boost
        )));
    }
    Ok(())
}
