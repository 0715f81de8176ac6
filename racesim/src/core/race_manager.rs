use crate::core::clock::{Clock, SystemClock};
use crate::core::collision::{check_checkpoint, check_obstacles, CheckpointEvent};
use crate::core::error::SimError;
use crate::core::leaderboard::{Leaderboard, LeaderboardEntry};
use crate::core::race::{PlayerProgress, RaceState, RaceStatus, SimConstants};
use crate::core::track_catalog::TrackCatalog;
use crate::core::vehicle::{ControlInputs, Vehicle};
use crate::interfaces::race_snapshot::RaceSnapshot;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::HashMap;

/// Owns the track catalog, the active races and the leaderboard, and drives the race lifecycle
/// starting -> racing -> finished.
///
/// A manager is not synchronized. It is meant to be owned by the single task that ticks its races;
/// hosting races on several threads means one manager (or at least one race) per thread.
#[derive(Debug)]
pub struct RaceManager<C: Clock = SystemClock> {
    tracks: TrackCatalog,
    races: HashMap<String, RaceState>,
    race_ids: Vec<String>,
    leaderboard: Leaderboard,
    sim_consts: SimConstants,
    clock: C,
    rng: StdRng,
    race_counter: u64,
}

impl RaceManager<SystemClock> {
    /// Manager on the wall clock with entropy-seeded spawn jitter.
    pub fn new(tracks: TrackCatalog, sim_consts: SimConstants) -> RaceManager<SystemClock> {
        RaceManager::with_clock(tracks, sim_consts, SystemClock, StdRng::from_entropy())
    }
}

impl<C: Clock> RaceManager<C> {
    pub fn with_clock(
        tracks: TrackCatalog,
        sim_consts: SimConstants,
        clock: C,
        rng: StdRng,
    ) -> RaceManager<C> {
        RaceManager {
            tracks,
            races: HashMap::new(),
            race_ids: Vec::new(),
            leaderboard: Leaderboard::new(sim_consts.leaderboard_max_entries),
            sim_consts,
            clock,
            rng,
            race_counter: 0,
        }
    }

    /// Manager with reproducible spawn jitter.
    pub fn with_seed(
        tracks: TrackCatalog,
        sim_consts: SimConstants,
        clock: C,
        seed: u64,
    ) -> RaceManager<C> {
        RaceManager::with_clock(tracks, sim_consts, clock, StdRng::seed_from_u64(seed))
    }

    // ---------------------------------------------------------------------------------------------
    // ACCESSORS -----------------------------------------------------------------------------------
    // ---------------------------------------------------------------------------------------------

    pub fn tracks(&self) -> &TrackCatalog {
        &self.tracks
    }

    pub fn tracks_mut(&mut self) -> &mut TrackCatalog {
        &mut self.tracks
    }

    pub fn sim_consts(&self) -> &SimConstants {
        &self.sim_consts
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn get_race(&self, race_id: &str) -> Option<&RaceState> {
        self.races.get(race_id)
    }

    /// Mutable access for external schedulers, e.g. to pause a race.
    pub fn get_race_mut(&mut self, race_id: &str) -> Option<&mut RaceState> {
        self.races.get_mut(race_id)
    }

    /// Ids of all races in creation order.
    pub fn list_races(&self) -> Vec<&str> {
        self.race_ids.iter().map(|id| id.as_str()).collect()
    }

    /// Drops a race, e.g. after its results were harvested.
    pub fn remove_race(&mut self, race_id: &str) -> Option<RaceState> {
        let race = self.races.remove(race_id);
        if race.is_some() {
            self.race_ids.retain(|id| id != race_id);
            tracing::debug!(race_id, "Race removed");
        }
        race
    }

    pub fn snapshot(&self, race_id: &str) -> Option<RaceSnapshot> {
        self.races.get(race_id).map(RaceSnapshot::from)
    }

    // ---------------------------------------------------------------------------------------------
    // LIFECYCLE -----------------------------------------------------------------------------------
    // ---------------------------------------------------------------------------------------------

    /// Creates a race in status starting on a registered track and returns its id.
    pub fn create_race(&mut self, track_id: &str, max_players: u32) -> Result<String, SimError> {
        self.tracks.try_get_track(track_id)?;

        self.race_counter += 1;
        let race_id = format!("race_{}", self.race_counter);
        let race = RaceState::new(
            race_id.to_owned(),
            track_id.to_owned(),
            max_players,
            self.clock.now_ms(),
        );

        tracing::info!(race_id = %race_id, track_id, max_players, "Race created");
        self.races.insert(race_id.to_owned(), race);
        self.race_ids.push(race_id.to_owned());

        Ok(race_id)
    }

    /// Spawns a vehicle for the player near the start line and initializes the player's
    /// progress. Returns a copy of the new vehicle.
    pub fn add_vehicle_to_race(
        &mut self,
        race_id: &str,
        player_id: &str,
    ) -> Result<Vehicle, SimError> {
        self.add_player_to_race(race_id, player_id, player_id)
    }

    /// Like `add_vehicle_to_race`, additionally storing the player's display name.
    pub fn add_player_to_race(
        &mut self,
        race_id: &str,
        player_id: &str,
        player_name: &str,
    ) -> Result<Vehicle, SimError> {
        let race = self
            .races
            .get_mut(race_id)
            .ok_or_else(|| SimError::RaceNotFound(race_id.to_owned()))?;
        let track = self.tracks.try_get_track(&race.track_id)?;

        if race.player_progress.contains_key(player_id) {
            return Err(SimError::PlayerAlreadyInRace {
                race_id: race_id.to_owned(),
                player_id: player_id.to_owned(),
            });
        }
        if race.is_full() {
            return Err(SimError::RaceFull {
                race_id: race_id.to_owned(),
                max_players: race.max_players,
            });
        }

        // jitter keeps simultaneous spawns from overlapping exactly
        let jitter = self.sim_consts.spawn_jitter;
        let offset = if jitter > 0.0 {
            (
                self.rng.gen_range(-jitter..=jitter),
                self.rng.gen_range(-jitter..=jitter),
            )
        } else {
            (0.0, 0.0)
        };

        let vehicle = Vehicle::new(
            format!("{}_vehicle_{}", race_id, race.vehicles.len() + 1),
            player_id.to_owned(),
            &track.start_line,
            offset,
            &self.sim_consts,
        );

        race.vehicles.push(vehicle.clone());
        race.player_progress
            .insert(player_id.to_owned(), PlayerProgress::default());
        race.player_names
            .insert(player_id.to_owned(), player_name.to_owned());

        tracing::info!(
            race_id,
            player_id,
            vehicle_id = %vehicle.id,
            x = vehicle.x,
            y = vehicle.y,
            "Vehicle spawned"
        );

        Ok(vehicle)
    }

    /// Advances a race by one tick. Returns false if the race or its track does not exist.
    ///
    /// Vehicles are processed in roster order. Each vehicle with health left runs the physics
    /// step, then the checkpoint test, then the obstacle test. Players without inputs are treated
    /// as giving no input. Finished races are not updated, paused races are left untouched.
    pub fn update_race(&mut self, race_id: &str, inputs: &HashMap<String, ControlInputs>) -> bool {
        self.try_update_race(race_id, inputs).is_ok()
    }

    /// `update_race` with the reason for a no-op.
    pub fn try_update_race(
        &mut self,
        race_id: &str,
        inputs: &HashMap<String, ControlInputs>,
    ) -> Result<(), SimError> {
        let race = self
            .races
            .get_mut(race_id)
            .ok_or_else(|| SimError::RaceNotFound(race_id.to_owned()))?;
        let track = self.tracks.try_get_track(&race.track_id)?;

        if matches!(race.status, RaceStatus::Finished | RaceStatus::Paused) {
            return Ok(());
        }

        let now_ms = self.clock.now_ms();
        race.elapsed_ms = now_ms.saturating_sub(race.start_time_ms);

        if race.status == RaceStatus::Starting
            && race.elapsed_ms >= self.sim_consts.start_grace_ms
        {
            race.status = RaceStatus::Racing;
            tracing::info!(race_id, elapsed_ms = race.elapsed_ms, "Race status changed to racing");
        }

        let no_input = ControlInputs::default();
        let sim_consts = &self.sim_consts;

        for vehicle in race.vehicles.iter_mut().filter(|v| v.is_alive()) {
            let player_inputs = inputs.get(&vehicle.player_id).unwrap_or(&no_input);
            vehicle.step(player_inputs, sim_consts.timestep_size, sim_consts);

            if let Some(progress) = race.player_progress.get_mut(&vehicle.player_id) {
                match check_checkpoint(vehicle, track, progress, race.elapsed_ms) {
                    CheckpointEvent::Captured(idx) => tracing::debug!(
                        race_id,
                        player_id = %vehicle.player_id,
                        checkpoint = idx,
                        "Checkpoint captured"
                    ),
                    CheckpointEvent::Finished => tracing::info!(
                        race_id,
                        player_id = %vehicle.player_id,
                        time_ms = progress.time_ms,
                        "Player finished"
                    ),
                    CheckpointEvent::None => {}
                }
            }

            let no_contacts = check_obstacles(vehicle, track, sim_consts.obstacle_damage);
            if no_contacts > 0 {
                tracing::debug!(
                    race_id,
                    player_id = %vehicle.player_id,
                    no_contacts,
                    health = vehicle.health,
                    "Obstacle contact"
                );
                if !vehicle.is_alive() {
                    tracing::info!(race_id, player_id = %vehicle.player_id, "Vehicle wrecked");
                }
            }
        }

        Ok(())
    }

    /// Sets the race to finished and returns the recorded time per player (0 for players that did
    /// not finish). A missing race yields an empty mapping.
    pub fn finish_race(&mut self, race_id: &str) -> HashMap<String, u64> {
        self.try_finish_race(race_id).unwrap_or_default()
    }

    /// `finish_race` that reports a missing race as `SimError::RaceNotFound`.
    pub fn try_finish_race(&mut self, race_id: &str) -> Result<HashMap<String, u64>, SimError> {
        let race = self
            .races
            .get_mut(race_id)
            .ok_or_else(|| SimError::RaceNotFound(race_id.to_owned()))?;

        if race.status != RaceStatus::Finished {
            race.status = RaceStatus::Finished;
            tracing::info!(race_id, elapsed_ms = race.elapsed_ms, "Race finished");
        }

        Ok(race.get_player_times())
    }

    // ---------------------------------------------------------------------------------------------
    // LEADERBOARD ---------------------------------------------------------------------------------
    // ---------------------------------------------------------------------------------------------

    pub fn leaderboard(&self) -> &Leaderboard {
        &self.leaderboard
    }

    pub fn add_leaderboard_entry(&mut self, entry: LeaderboardEntry) -> Option<u32> {
        self.leaderboard.add_entry(entry)
    }

    pub fn get_leaderboard(&self, track_id: Option<&str>, limit: usize) -> Vec<LeaderboardEntry> {
        self.leaderboard.get_leaderboard(track_id, limit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::clock::ManualClock;
    use crate::core::track::{Checkpoint, FinishLine, Obstacle, StartLine, TerrainType, TrackPars};
    use approx::assert_relative_eq;
    use std::time::Duration;

    fn manager_with_clock() -> (RaceManager<ManualClock>, ManualClock) {
        let clock = ManualClock::starting_at(1_000_000);
        let manager = RaceManager::with_seed(
            TrackCatalog::with_default_tracks(),
            SimConstants::default(),
            clock.clone(),
            7,
        );
        (manager, clock)
    }

    /// Track with an obstacle on the start line.
    fn hazard_pars() -> TrackPars {
        TrackPars {
            id: "hazard".to_owned(),
            name: "Hazard".to_owned(),
            width: 500.0,
            height: 500.0,
            terrain: TerrainType::Dirt,
            difficulty: 5,
            start_line: StartLine { x: 100.0, y: 100.0, rotation: 0.0 },
            finish_line: FinishLine { x: 400.0, y: 100.0 },
            checkpoints: vec![Checkpoint { x: 400.0, y: 100.0, radius: 20.0 }],
            obstacles: vec![Obstacle {
                x: 100.0,
                y: 100.0,
                radius: 30.0,
                kind: "oil".to_owned(),
            }],
        }
    }

    #[test]
    fn create_race_on_unknown_track_fails() {
        let (mut manager, _) = manager_with_clock();
        assert_eq!(
            manager.create_race("moon_base", 4),
            Err(SimError::TrackNotFound("moon_base".to_owned()))
        );
        assert!(manager.list_races().is_empty());
    }

    #[test]
    fn create_race_starts_in_status_starting() {
        let (mut manager, _) = manager_with_clock();
        let race_id = manager.create_race("urban_circuit", 4).unwrap();
        let race = manager.get_race(&race_id).unwrap();

        assert_eq!(race.status, RaceStatus::Starting);
        assert_eq!(race.start_time_ms, 1_000_000);
        assert!(race.vehicles.is_empty());
        assert!(race.player_progress.is_empty());
    }

    #[test]
    fn add_vehicle_spawns_near_start_line() {
        let (mut manager, _) = manager_with_clock();
        let race_id = manager.create_race("urban_circuit", 4).unwrap();
        let vehicle = manager.add_vehicle_to_race(&race_id, "alice").unwrap();

        assert!((vehicle.x - 200.0).abs() <= 10.0);
        assert!((vehicle.y - 800.0).abs() <= 10.0);
        assert_relative_eq!(vehicle.heading, 0.0);
        assert_relative_eq!(vehicle.speed(), 0.0);
        assert_relative_eq!(vehicle.health, vehicle.max_health);
        assert_relative_eq!(vehicle.boost, vehicle.max_boost);

        let race = manager.get_race(&race_id).unwrap();
        assert_eq!(race.get_progress("alice"), Some(&PlayerProgress::default()));
        assert_eq!(race.get_vehicle(&vehicle.id), Some(&vehicle));
    }

    #[test]
    fn add_vehicle_errors() {
        let (mut manager, _) = manager_with_clock();
        assert_eq!(
            manager.add_vehicle_to_race("race_42", "alice"),
            Err(SimError::RaceNotFound("race_42".to_owned()))
        );

        let race_id = manager.create_race("urban_circuit", 1).unwrap();
        manager.add_vehicle_to_race(&race_id, "alice").unwrap();
        assert!(matches!(
            manager.add_vehicle_to_race(&race_id, "alice"),
            Err(SimError::PlayerAlreadyInRace { .. })
        ));
        assert!(matches!(
            manager.add_vehicle_to_race(&race_id, "bob"),
            Err(SimError::RaceFull { max_players: 1, .. })
        ));
    }

    #[test]
    fn status_changes_to_racing_after_grace_period() {
        let (mut manager, clock) = manager_with_clock();
        let race_id = manager.create_race("urban_circuit", 4).unwrap();
        let inputs = HashMap::new();

        clock.advance(Duration::from_millis(2_999));
        assert!(manager.update_race(&race_id, &inputs));
        assert_eq!(manager.get_race(&race_id).unwrap().status, RaceStatus::Starting);

        clock.advance(Duration::from_millis(1));
        assert!(manager.update_race(&race_id, &inputs));
        let race = manager.get_race(&race_id).unwrap();
        assert_eq!(race.status, RaceStatus::Racing);
        assert_eq!(race.elapsed_ms, 3_000);

        clock.advance(Duration::from_millis(100));
        manager.update_race(&race_id, &inputs);
        assert_eq!(manager.get_race(&race_id).unwrap().status, RaceStatus::Racing);
    }

    #[test]
    fn update_of_unknown_race_is_a_no_op() {
        let (mut manager, _) = manager_with_clock();
        assert!(!manager.update_race("race_42", &HashMap::new()));
        assert_eq!(
            manager.try_update_race("race_42", &HashMap::new()),
            Err(SimError::RaceNotFound("race_42".to_owned()))
        );
    }

    #[test]
    fn vehicles_without_inputs_stay_put_and_others_move() {
        let (mut manager, clock) = manager_with_clock();
        let race_id = manager.create_race("urban_circuit", 4).unwrap();
        let alice = manager.add_vehicle_to_race(&race_id, "alice").unwrap();
        let bob = manager.add_vehicle_to_race(&race_id, "bob").unwrap();

        let mut inputs = HashMap::new();
        inputs.insert("alice".to_owned(), ControlInputs::forward());

        for _ in 0..30 {
            clock.advance_secs(1.0 / 60.0);
            manager.update_race(&race_id, &inputs);
        }

        let race = manager.get_race(&race_id).unwrap();
        assert!(race.get_vehicle(&alice.id).unwrap().x > alice.x + 50.0);
        assert_eq!(race.get_vehicle(&bob.id), Some(&bob));
    }

    #[test]
    fn stationary_vehicle_in_obstacle_loses_health_every_tick() {
        let (mut manager, clock) = manager_with_clock();
        manager.tracks_mut().register_track_pars(&hazard_pars()).unwrap();
        let race_id = manager.create_race("hazard", 1).unwrap();
        manager.add_vehicle_to_race(&race_id, "alice").unwrap();

        for _ in 0..3 {
            clock.advance_secs(1.0 / 60.0);
            manager.update_race(&race_id, &HashMap::new());
        }
        let vehicle = manager.get_race(&race_id).unwrap().get_vehicle_of_player("alice").unwrap();
        assert_relative_eq!(vehicle.health, 70.0);
    }

    #[test]
    fn wrecked_vehicles_are_kept_but_not_simulated() {
        let (mut manager, clock) = manager_with_clock();
        manager.tracks_mut().register_track_pars(&hazard_pars()).unwrap();
        let race_id = manager.create_race("hazard", 1).unwrap();
        manager.add_vehicle_to_race(&race_id, "alice").unwrap();

        let mut inputs = HashMap::new();
        inputs.insert("alice".to_owned(), ControlInputs::forward());

        for _ in 0..10 {
            clock.advance_secs(1.0 / 60.0);
            manager.update_race(&race_id, &HashMap::new());
        }
        let wrecked = manager
            .get_race(&race_id)
            .unwrap()
            .get_vehicle_of_player("alice")
            .unwrap()
            .clone();
        assert_relative_eq!(wrecked.health, 0.0);

        for _ in 0..10 {
            clock.advance_secs(1.0 / 60.0);
            manager.update_race(&race_id, &inputs);
        }
        let race = manager.get_race(&race_id).unwrap();
        assert_eq!(race.vehicles.len(), 1);
        assert_eq!(race.get_vehicle_of_player("alice"), Some(&wrecked));
    }

    #[test]
    fn finished_race_is_not_updated() {
        let (mut manager, clock) = manager_with_clock();
        let race_id = manager.create_race("urban_circuit", 4).unwrap();
        let vehicle = manager.add_vehicle_to_race(&race_id, "alice").unwrap();

        let times = manager.finish_race(&race_id);
        assert_eq!(times.get("alice"), Some(&0));

        let mut inputs = HashMap::new();
        inputs.insert("alice".to_owned(), ControlInputs::forward());
        clock.advance(Duration::from_millis(5_000));
        assert!(manager.update_race(&race_id, &inputs));

        let race = manager.get_race(&race_id).unwrap();
        assert_eq!(race.status, RaceStatus::Finished);
        assert_eq!(race.get_vehicle(&vehicle.id), Some(&vehicle));
    }

    #[test]
    fn paused_race_is_left_untouched() {
        let (mut manager, clock) = manager_with_clock();
        let race_id = manager.create_race("urban_circuit", 4).unwrap();
        let vehicle = manager.add_vehicle_to_race(&race_id, "alice").unwrap();
        manager.get_race_mut(&race_id).unwrap().status = RaceStatus::Paused;

        let mut inputs = HashMap::new();
        inputs.insert("alice".to_owned(), ControlInputs::forward());
        clock.advance(Duration::from_millis(5_000));
        assert!(manager.update_race(&race_id, &inputs));

        let race = manager.get_race(&race_id).unwrap();
        assert_eq!(race.status, RaceStatus::Paused);
        assert_eq!(race.elapsed_ms, 0);
        assert_eq!(race.get_vehicle(&vehicle.id), Some(&vehicle));
    }

    #[test]
    fn checkpoint_and_obstacle_apply_in_the_same_tick() {
        let (mut manager, clock) = manager_with_clock();
        let mut pars = hazard_pars();
        pars.id = "hazard_gate".to_owned();
        pars.checkpoints = vec![
            Checkpoint { x: 100.0, y: 100.0, radius: 50.0 },
            Checkpoint { x: 400.0, y: 100.0, radius: 20.0 },
        ];
        manager.tracks_mut().register_track_pars(&pars).unwrap();

        let race_id = manager.create_race("hazard_gate", 1).unwrap();
        manager.add_vehicle_to_race(&race_id, "alice").unwrap();

        clock.advance_secs(1.0 / 60.0);
        assert!(manager.update_race(&race_id, &HashMap::new()));

        let race = manager.get_race(&race_id).unwrap();
        assert_eq!(race.get_progress("alice").unwrap().next_checkpoint, 1);
        assert_relative_eq!(race.get_vehicle_of_player("alice").unwrap().health, 90.0);
    }

    #[test]
    fn finish_of_unknown_race_is_empty() {
        let (mut manager, _) = manager_with_clock();
        assert!(manager.finish_race("race_42").is_empty());
        assert_eq!(
            manager.try_finish_race("race_42"),
            Err(SimError::RaceNotFound("race_42".to_owned()))
        );
    }

    #[test]
    fn races_get_unique_ids_and_can_be_removed() {
        let (mut manager, _) = manager_with_clock();
        let first = manager.create_race("urban_circuit", 2).unwrap();
        let second = manager.create_race("frozen_lake", 2).unwrap();
        assert_ne!(first, second);
        assert_eq!(manager.list_races(), vec!["race_1", "race_2"]);

        assert!(manager.remove_race(&first).is_some());
        assert!(manager.remove_race(&first).is_none());
        assert_eq!(manager.list_races(), vec!["race_2"]);
    }

    #[test]
    fn races_are_listed_in_creation_order() {
        let (mut manager, _) = manager_with_clock();
        for _ in 0..11 {
            manager.create_race("urban_circuit", 2).unwrap();
        }
        manager.remove_race("race_3");

        let ids = manager.list_races();
        assert_eq!(ids.len(), 10);
        assert_eq!(&ids[..3], &["race_1", "race_2", "race_4"]);
        assert_eq!(ids[8], "race_10");
        assert_eq!(ids[9], "race_11");
    }
}
