use crate::core::vehicle::Vehicle;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Tunable constants of the simulation. Missing fields in a constants file fall back to the
/// defaults of the reference model.
///
/// * `timestep_size` - (s) Fixed time step of the physics integrator
/// * `max_speed` - Maximum forward speed
/// * `acceleration` - (1/s) Throttle rate
/// * `friction` - Per-tick decay factor of the speed without throttle or brake
/// * `drift_multiplier` - Speed amplification per tick while drifting
/// * `drift_threshold` - Fraction of `max_speed` above which drifting is possible
/// * `boost_max_speed` - Speed limit while boosting
/// * `boost_acceleration_factor` - Boost rate as multiple of `acceleration`
/// * `boost_drain` - (1/s) Boost fuel consumption
/// * `boost_regen` - (1/s) Boost fuel regeneration
/// * `max_rotation` - (rad) Steering target offset per tick
/// * `max_health`, `max_boost` - Upper bounds of vehicle health and boost fuel
/// * `obstacle_damage` - Health penalty per obstacle contact and tick
/// * `start_grace_ms` - (ms) Time between race creation and the transition to racing
/// * `spawn_jitter` - Maximum random offset of a spawn position in x and y
/// * `vehicle_wheelbase`, `vehicle_width` - Vehicle geometry
/// * `leaderboard_max_entries` - Capacity of the leaderboard
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConstants {
    pub timestep_size: f64,
    pub max_speed: f64,
    pub acceleration: f64,
    pub friction: f64,
    pub drift_multiplier: f64,
    pub drift_threshold: f64,
    pub boost_max_speed: f64,
    pub boost_acceleration_factor: f64,
    pub boost_drain: f64,
    pub boost_regen: f64,
    pub max_rotation: f64,
    pub max_health: f64,
    pub max_boost: f64,
    pub obstacle_damage: f64,
    pub start_grace_ms: u64,
    pub spawn_jitter: f64,
    pub vehicle_wheelbase: f64,
    pub vehicle_width: f64,
    pub leaderboard_max_entries: usize,
}

impl Default for SimConstants {
    fn default() -> Self {
        SimConstants {
            timestep_size: 1.0 / 60.0,
            max_speed: 400.0,
            acceleration: 600.0,
            friction: 0.85,
            drift_multiplier: 1.2,
            drift_threshold: 0.3,
            boost_max_speed: 500.0,
            boost_acceleration_factor: 2.0,
            boost_drain: 30.0,
            boost_regen: 10.0,
            max_rotation: 0.15,
            max_health: 100.0,
            max_boost: 100.0,
            obstacle_damage: 10.0,
            start_grace_ms: 3000,
            spawn_jitter: 10.0,
            vehicle_wheelbase: 40.0,
            vehicle_width: 20.0,
            leaderboard_max_entries: 100,
        }
    }
}

/// * `id` - Player identifier
/// * `name` - Display name used for the leaderboard
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerPars {
    pub id: String,
    pub name: String,
}

/// * `track_id` - Track to race on
/// * `max_players` - Capacity of the race
/// * `participants` - Players taking part
/// * `max_ticks` - Safety limit for offline simulation, the race is finished after this many
/// ticks even if not every player reached the last checkpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RacePars {
    pub track_id: String,
    pub max_players: u32,
    pub participants: Vec<PlayerPars>,
    #[serde(default = "default_max_ticks")]
    pub max_ticks: u64,
}

fn default_max_ticks() -> u64 {
    60 * 60 * 5
}

/// Race status. Transitions only go forward: starting -> racing -> finished. Paused is reserved
/// for external schedulers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RaceStatus {
    Starting,
    Racing,
    Finished,
    Paused,
}

/// Progress of a single player within a race.
///
/// * `time_ms` - (ms) Race time at which the player captured the last checkpoint, 0 until then
/// * `next_checkpoint` - Index of the checkpoint the player has to capture next
/// * `finished` - True once every checkpoint was captured
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerProgress {
    pub time_ms: u64,
    pub next_checkpoint: usize,
    pub finished: bool,
}

/// State of one race instance. The vehicle roster keeps insertion order, which is also the order
/// in which vehicles are simulated within a tick.
#[derive(Debug, Clone, Serialize)]
pub struct RaceState {
    pub id: String,
    pub track_id: String,
    pub vehicles: Vec<Vehicle>,
    pub start_time_ms: u64,
    pub elapsed_ms: u64,
    pub status: RaceStatus,
    pub player_progress: HashMap<String, PlayerProgress>,
    pub player_names: HashMap<String, String>,
    pub max_players: u32,
}

impl RaceState {
    pub fn new(id: String, track_id: String, max_players: u32, start_time_ms: u64) -> RaceState {
        RaceState {
            id,
            track_id,
            vehicles: Vec::new(),
            start_time_ms,
            elapsed_ms: 0,
            status: RaceStatus::Starting,
            player_progress: HashMap::new(),
            player_names: HashMap::new(),
            max_players,
        }
    }

    pub fn get_vehicle(&self, vehicle_id: &str) -> Option<&Vehicle> {
        self.vehicles.iter().find(|v| v.id == vehicle_id)
    }

    pub fn get_vehicle_of_player(&self, player_id: &str) -> Option<&Vehicle> {
        self.vehicles.iter().find(|v| v.player_id == player_id)
    }

    pub fn get_progress(&self, player_id: &str) -> Option<&PlayerProgress> {
        self.player_progress.get(player_id)
    }

    pub fn is_full(&self) -> bool {
        self.vehicles.len() >= self.max_players as usize
    }

    /// True if the roster is non-empty and every player captured all checkpoints.
    pub fn get_all_finished(&self) -> bool {
        !self.player_progress.is_empty() && self.player_progress.values().all(|p| p.finished)
    }

    /// Recorded race time per player, 0 for players that did not finish.
    pub fn get_player_times(&self) -> HashMap<String, u64> {
        self.player_progress
            .iter()
            .map(|(player_id, progress)| (player_id.to_owned(), progress.time_ms))
            .collect()
    }
}
