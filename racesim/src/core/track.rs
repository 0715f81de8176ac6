use crate::core::error::SimError;
use helpers::general::dist;
use serde::{Deserialize, Serialize};

/// Surface of a track. It is carried as data for consumers (rendering, sound) and has no effect on
/// the vehicle model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TerrainType {
    Asphalt,
    Dirt,
    Ice,
    Grass,
}

/// * `x`, `y` - Center of the capture zone
/// * `radius` - Capture radius, a vehicle captures the checkpoint if it is strictly closer
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Checkpoint {
    pub x: f64,
    pub y: f64,
    pub radius: f64,
}

/// * `x`, `y` - Center of the obstacle
/// * `radius` - Radius of the obstacle
/// * `kind` - Free-form type tag, e.g. "barrier" or "oil"
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Obstacle {
    pub x: f64,
    pub y: f64,
    pub radius: f64,
    #[serde(rename = "type")]
    pub kind: String,
}

/// * `x`, `y` - Spawn position
/// * `rotation` - (rad) Spawn heading
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StartLine {
    pub x: f64,
    pub y: f64,
    pub rotation: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FinishLine {
    pub x: f64,
    pub y: f64,
}

/// * `id` - Unique track identifier, e.g. urban_circuit
/// * `name` - Display name
/// * `width`, `height` - Dimensions of the simulation space
/// * `terrain` - Surface type
/// * `difficulty` - Difficulty rating (small integer)
/// * `start_line` - Spawn pose of the vehicles
/// * `finish_line` - Position of the finish marker
/// * `checkpoints` - Capture zones, must be visited in index order
/// * `obstacles` - Obstacles damaging and slowing down vehicles on contact
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackPars {
    pub id: String,
    pub name: String,
    pub width: f64,
    pub height: f64,
    pub terrain: TerrainType,
    pub difficulty: u8,
    pub start_line: StartLine,
    pub finish_line: FinishLine,
    pub checkpoints: Vec<Checkpoint>,
    #[serde(default)]
    pub obstacles: Vec<Obstacle>,
}

/// Immutable track used by the simulation. Construction through `Track::new` guarantees a
/// non-empty checkpoint list and positive dimensions.
#[derive(Debug, Clone, Serialize)]
pub struct Track {
    pub id: String,
    pub name: String,
    pub width: f64,
    pub height: f64,
    pub terrain: TerrainType,
    pub difficulty: u8,
    pub start_line: StartLine,
    pub finish_line: FinishLine,
    pub checkpoints: Vec<Checkpoint>,
    pub obstacles: Vec<Obstacle>,
    pub racing_line_length: f64,
}

impl TrackPars {
    /// check verifies the requirements a track must fulfill before it can be registered.
    pub fn check(&self) -> Result<(), SimError> {
        let invalid = |reason: &str| SimError::InvalidTrack {
            track_id: self.id.to_owned(),
            reason: reason.to_owned(),
        };

        if self.checkpoints.is_empty() {
            return Err(invalid("checkpoint list is empty"));
        }
        if !(self.width > 0.0 && self.height > 0.0) {
            return Err(invalid("width and height must be positive"));
        }
        if self.checkpoints.iter().any(|cp| !(cp.radius > 0.0)) {
            return Err(invalid("checkpoint radius must be positive"));
        }
        Ok(())
    }
}

impl Track {
    pub fn new(track_pars: &TrackPars) -> Result<Track, SimError> {
        track_pars.check()?;

        // length of the polyline start line -> checkpoint 0 -> ... -> last checkpoint
        let mut racing_line_length = 0.0;
        let mut prev = (track_pars.start_line.x, track_pars.start_line.y);

        for checkpoint in track_pars.checkpoints.iter() {
            racing_line_length += dist(prev.0, prev.1, checkpoint.x, checkpoint.y);
            prev = (checkpoint.x, checkpoint.y);
        }

        Ok(Track {
            id: track_pars.id.to_owned(),
            name: track_pars.name.to_owned(),
            width: track_pars.width,
            height: track_pars.height,
            terrain: track_pars.terrain,
            difficulty: track_pars.difficulty,
            start_line: track_pars.start_line,
            finish_line: track_pars.finish_line,
            checkpoints: track_pars.checkpoints.to_owned(),
            obstacles: track_pars.obstacles.to_owned(),
            racing_line_length,
        })
    }

    pub fn no_checkpoints(&self) -> usize {
        self.checkpoints.len()
    }
}
