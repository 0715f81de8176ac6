use crate::core::error::SimError;
use crate::core::track::{
    Checkpoint, FinishLine, Obstacle, StartLine, TerrainType, Track, TrackPars,
};
use std::collections::HashMap;
use std::f64::consts::FRAC_PI_2;

/// Registry of the tracks known to the simulator. Tracks are immutable once registered and are
/// listed in registration order.
#[derive(Debug, Clone, Default)]
pub struct TrackCatalog {
    tracks: Vec<Track>,
    idx_by_id: HashMap<String, usize>,
}

impl TrackCatalog {
    pub fn new() -> TrackCatalog {
        TrackCatalog::default()
    }

    /// Catalog pre-filled with the built-in tracks.
    pub fn with_default_tracks() -> TrackCatalog {
        let mut catalog = TrackCatalog::new();

        for track_pars in default_track_pars().iter() {
            if let Err(e) = catalog.register_track_pars(track_pars) {
                tracing::error!("Skipping built-in track: {}", e);
            }
        }

        catalog
    }

    /// Stores the track keyed by its id. Registering an id again overwrites the stored track but
    /// keeps its original position in the listing.
    pub fn register_track(&mut self, track: Track) {
        match self.idx_by_id.get(&track.id) {
            Some(&idx) => {
                tracing::debug!(track_id = %track.id, "Overwriting registered track");
                self.tracks[idx] = track;
            }
            None => {
                tracing::debug!(track_id = %track.id, "Registering track");
                self.idx_by_id.insert(track.id.to_owned(), self.tracks.len());
                self.tracks.push(track);
            }
        }
    }

    /// Validates the parameters and registers the resulting track.
    pub fn register_track_pars(&mut self, track_pars: &TrackPars) -> Result<(), SimError> {
        let track = Track::new(track_pars)?;
        self.register_track(track);
        Ok(())
    }

    pub fn get_track(&self, track_id: &str) -> Option<&Track> {
        self.idx_by_id.get(track_id).map(|&idx| &self.tracks[idx])
    }

    /// Like `get_track`, but reports a missing track as `SimError::TrackNotFound`.
    pub fn try_get_track(&self, track_id: &str) -> Result<&Track, SimError> {
        self.get_track(track_id)
            .ok_or_else(|| SimError::TrackNotFound(track_id.to_owned()))
    }

    pub fn list_tracks(&self) -> &[Track] {
        &self.tracks
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }
}

fn cp(x: f64, y: f64, radius: f64) -> Checkpoint {
    Checkpoint { x, y, radius }
}

fn obstacle(x: f64, y: f64, radius: f64, kind: &str) -> Obstacle {
    Obstacle {
        x,
        y,
        radius,
        kind: kind.to_owned(),
    }
}

/// Parameters of the built-in tracks. The obstacles are placed off the direct lines between
/// consecutive checkpoints.
pub fn default_track_pars() -> Vec<TrackPars> {
    vec![
        TrackPars {
            id: "urban_circuit".to_owned(),
            name: "Urban Circuit".to_owned(),
            width: 1600.0,
            height: 1100.0,
            terrain: TerrainType::Asphalt,
            difficulty: 1,
            start_line: StartLine { x: 200.0, y: 800.0, rotation: 0.0 },
            finish_line: FinishLine { x: 200.0, y: 800.0 },
            checkpoints: vec![
                cp(700.0, 800.0, 80.0),
                cp(1300.0, 600.0, 80.0),
                cp(1300.0, 200.0, 80.0),
                cp(600.0, 150.0, 80.0),
                cp(200.0, 780.0, 80.0),
            ],
            obstacles: vec![
                obstacle(900.0, 420.0, 40.0, "barrier"),
                obstacle(1000.0, 1000.0, 40.0, "barrier"),
                obstacle(1500.0, 900.0, 50.0, "cones"),
                obstacle(1480.0, 80.0, 40.0, "barrier"),
            ],
        },
        TrackPars {
            id: "desert_canyon".to_owned(),
            name: "Desert Canyon".to_owned(),
            width: 1800.0,
            height: 1600.0,
            terrain: TerrainType::Dirt,
            difficulty: 2,
            start_line: StartLine { x: 150.0, y: 1200.0, rotation: -FRAC_PI_2 },
            finish_line: FinishLine { x: 600.0, y: 1350.0 },
            checkpoints: vec![
                cp(150.0, 700.0, 90.0),
                cp(500.0, 300.0, 90.0),
                cp(1100.0, 350.0, 90.0),
                cp(1600.0, 800.0, 90.0),
                cp(1200.0, 1250.0, 90.0),
                cp(600.0, 1350.0, 90.0),
            ],
            obstacles: vec![
                obstacle(500.0, 900.0, 60.0, "rock"),
                obstacle(1000.0, 800.0, 70.0, "rock"),
                obstacle(1000.0, 1050.0, 50.0, "cactus"),
                obstacle(900.0, 1500.0, 40.0, "rock"),
            ],
        },
        TrackPars {
            id: "frozen_lake".to_owned(),
            name: "Frozen Lake".to_owned(),
            width: 1600.0,
            height: 1400.0,
            terrain: TerrainType::Ice,
            difficulty: 3,
            start_line: StartLine { x: 400.0, y: 400.0, rotation: 0.0 },
            finish_line: FinishLine { x: 400.0, y: 420.0 },
            checkpoints: vec![
                cp(1000.0, 400.0, 70.0),
                cp(1400.0, 800.0, 70.0),
                cp(1000.0, 1200.0, 70.0),
                cp(400.0, 1200.0, 70.0),
                cp(100.0, 800.0, 70.0),
                cp(400.0, 420.0, 70.0),
            ],
            obstacles: vec![
                obstacle(700.0, 800.0, 80.0, "ice_hole"),
                obstacle(1350.0, 450.0, 30.0, "snowbank"),
                obstacle(100.0, 1200.0, 30.0, "snowbank"),
            ],
        },
        TrackPars {
            id: "countryside_loop".to_owned(),
            name: "Countryside Loop".to_owned(),
            width: 2000.0,
            height: 1600.0,
            terrain: TerrainType::Grass,
            difficulty: 2,
            start_line: StartLine { x: 300.0, y: 300.0, rotation: 0.0 },
            finish_line: FinishLine { x: 400.0, y: 1000.0 },
            checkpoints: vec![
                cp(900.0, 300.0, 80.0),
                cp(1500.0, 500.0, 80.0),
                cp(1700.0, 1100.0, 80.0),
                cp(1100.0, 1400.0, 80.0),
                cp(400.0, 1000.0, 80.0),
            ],
            obstacles: vec![
                obstacle(1200.0, 800.0, 90.0, "haystack"),
                obstacle(600.0, 650.0, 50.0, "tree"),
                obstacle(1900.0, 400.0, 40.0, "tree"),
            ],
        },
    ]
}
