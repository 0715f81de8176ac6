use crate::core::autopilot::Autopilot;
use crate::core::clock::ManualClock;
use crate::core::race::RacePars;
use crate::core::race_manager::RaceManager;
use crate::core::vehicle::ControlInputs;
use crate::interfaces::race_snapshot::{RaceSnapshot, MAX_SNAPSHOT_FREQUENCY};
use crate::post::race_result::RaceResult;
use crate::pre::read_sim_pars::check_sim_consts;
use anyhow::Context;
use flume::Sender;
use std::collections::HashMap;
use std::thread::sleep;
use std::time::{Duration, Instant};

/// handle_race creates a race on the basis of the inserted parameters, lets the autopilot drive
/// every participant at the fixed tick cadence until all players finished (or wrecked their
/// vehicle, or the tick limit is reached), finishes the race and returns the results for
/// post-processing.
///
/// The race runs on the simulated time of the manager's clock. If a sender is inserted, the loop
/// is paced to real time (scaled by `realtime_factor`) and snapshots are sent to the receiver.
pub fn handle_race(
    manager: &mut RaceManager<ManualClock>,
    race_pars: &RacePars,
    print_debug: bool,
    tx: Option<&Sender<RaceSnapshot>>,
    realtime_factor: f64,
) -> anyhow::Result<RaceResult> {
    // PRE-PROCESSING ------------------------------------------------------------------------------
    check_sim_consts(manager.sim_consts()).context("Invalid simulation constants!")?;

    let race_id = manager
        .create_race(&race_pars.track_id, race_pars.max_players)
        .context("Failed to create race!")?;

    for player in race_pars.participants.iter() {
        manager
            .add_player_to_race(&race_id, &player.id, &player.name)
            .context(format!("Failed to add player {} to the race!", player.id))?;
    }

    let timestep_size = manager.sim_consts().timestep_size;
    let autopilot = Autopilot::new(manager.sim_consts());

    // EXECUTION -----------------------------------------------------------------------------------
    let mut no_ticks = 0;
    let mut t_race_update_print = 0.0;
    let mut t_race_update_snapshot = f64::NEG_INFINITY;

    while no_ticks < race_pars.max_ticks && !race_is_decided(manager, &race_id) {
        let t_start = Instant::now();

        let inputs = get_autopilot_inputs(manager, &race_id, &autopilot);
        manager.clock().advance_secs(timestep_size);
        manager.update_race(&race_id, &inputs);
        no_ticks += 1;

        let t_race = no_ticks as f64 * timestep_size;

        if print_debug && t_race > t_race_update_print + 0.9999 {
            if let Some(race) = manager.get_race(&race_id) {
                let max_checkpoint = race
                    .player_progress
                    .values()
                    .map(|p| p.next_checkpoint)
                    .max()
                    .unwrap_or(0);
                tracing::debug!(
                    race_id = %race_id,
                    elapsed_ms = race.elapsed_ms,
                    status = ?race.status,
                    max_checkpoint,
                    "Simulating..."
                );
            }
            t_race_update_print = t_race;
        }

        if let Some(tx) = tx {
            if t_race > t_race_update_snapshot + 1.0 / MAX_SNAPSHOT_FREQUENCY - 0.001 {
                if let Some(snapshot) = manager.snapshot(&race_id) {
                    tx.send(snapshot)
                        .context("Failed to send race snapshot!")?;
                }
                t_race_update_snapshot = t_race;
            }

            // sleep until time step is finished in real-time as well
            let t_step = Duration::from_secs_f64(timestep_size / realtime_factor);
            match t_step.checked_sub(t_start.elapsed()) {
                Some(t_sleep) => sleep(t_sleep),
                None => tracing::warn!("Could not keep up with real-time!"),
            }
        }
    }

    if no_ticks >= race_pars.max_ticks {
        tracing::warn!(
            race_id = %race_id,
            no_ticks,
            "Tick limit reached before every player finished"
        );
    }

    // POST-PROCESSING -----------------------------------------------------------------------------
    let player_times = manager.finish_race(&race_id);

    let race = manager
        .get_race(&race_id)
        .context("Race vanished during the simulation!")?;
    let track = manager.tracks().try_get_track(&race.track_id)?;

    if let Some(tx) = tx {
        tx.send(RaceSnapshot::from(race))
            .context("Failed to send final race snapshot!")?;
    }

    Ok(RaceResult::new(race, track, &player_times, no_ticks))
}

/// A race is decided once no player can make progress anymore: every player finished or drives
/// a wrecked vehicle.
fn race_is_decided(manager: &RaceManager<ManualClock>, race_id: &str) -> bool {
    match manager.get_race(race_id) {
        Some(race) => race.vehicles.iter().all(|v| {
            !v.is_alive() || race.get_progress(&v.player_id).map_or(true, |p| p.finished)
        }),
        None => true,
    }
}

fn get_autopilot_inputs(
    manager: &RaceManager<ManualClock>,
    race_id: &str,
    autopilot: &Autopilot,
) -> HashMap<String, ControlInputs> {
    let mut inputs = HashMap::new();

    let race = match manager.get_race(race_id) {
        Some(race) => race,
        None => return inputs,
    };
    let track = match manager.tracks().get_track(&race.track_id) {
        Some(track) => track,
        None => return inputs,
    };

    for vehicle in race.vehicles.iter().filter(|v| v.is_alive()) {
        if let Some(progress) = race.get_progress(&vehicle.player_id) {
            inputs.insert(
                vehicle.player_id.to_owned(),
                autopilot.get_inputs(vehicle, track, progress),
            );
        }
    }

    inputs
}
