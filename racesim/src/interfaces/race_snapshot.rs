use crate::core::race::{RaceState, RaceStatus};
use crate::core::vehicle::Vehicle;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Maximum rate (in simulated time) at which the offline driver publishes snapshots.
pub const MAX_SNAPSHOT_FREQUENCY: f64 = 20.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VehicleSnapshot {
    pub id: String,
    pub player_id: String,
    pub x: f64,
    pub y: f64,
    pub vx: f64,
    pub vy: f64,
    pub heading: f64,
    pub drifting: bool,
    pub health: f64,
    pub boost: f64,
    pub next_checkpoint: usize,
    pub finished: bool,
}

/// Compact race state for network sync: the vehicles as an array and the player times as an
/// object keyed by player id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RaceSnapshot {
    pub race_id: String,
    pub track_id: String,
    pub status: RaceStatus,
    pub elapsed_ms: u64,
    pub vehicles: Vec<VehicleSnapshot>,
    pub player_times: BTreeMap<String, u64>,
}

impl VehicleSnapshot {
    fn new(vehicle: &Vehicle, race: &RaceState) -> VehicleSnapshot {
        let progress = race.get_progress(&vehicle.player_id).copied().unwrap_or_default();

        VehicleSnapshot {
            id: vehicle.id.to_owned(),
            player_id: vehicle.player_id.to_owned(),
            x: vehicle.x,
            y: vehicle.y,
            vx: vehicle.vx,
            vy: vehicle.vy,
            heading: vehicle.heading,
            drifting: vehicle.drifting,
            health: vehicle.health,
            boost: vehicle.boost,
            next_checkpoint: progress.next_checkpoint,
            finished: progress.finished,
        }
    }
}

impl From<&RaceState> for RaceSnapshot {
    fn from(race: &RaceState) -> Self {
        RaceSnapshot {
            race_id: race.id.to_owned(),
            track_id: race.track_id.to_owned(),
            status: race.status,
            elapsed_ms: race.elapsed_ms,
            vehicles: race
                .vehicles
                .iter()
                .map(|v| VehicleSnapshot::new(v, race))
                .collect(),
            player_times: race.get_player_times().into_iter().collect(),
        }
    }
}
