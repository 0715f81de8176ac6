use racesim::core::autopilot::Autopilot;
use racesim::core::clock::ManualClock;
use racesim::core::leaderboard::LeaderboardEntry;
use racesim::core::race::{RaceStatus, SimConstants};
use racesim::core::race_manager::RaceManager;
use racesim::core::track_catalog::TrackCatalog;
use racesim::core::vehicle::ControlInputs;
use std::collections::HashMap;

fn new_manager() -> (RaceManager<ManualClock>, ManualClock) {
    let clock = ManualClock::starting_at(1_700_000_000_000);
    let manager = RaceManager::with_seed(
        TrackCatalog::with_default_tracks(),
        SimConstants::default(),
        clock.clone(),
        42,
    );
    (manager, clock)
}

#[test]
fn single_player_race_ends_up_on_the_leaderboard() {
    let (mut manager, clock) = new_manager();
    let autopilot = Autopilot::new(manager.sim_consts());

    let race_id = manager.create_race("urban_circuit", 1).unwrap();
    let vehicle = manager.add_vehicle_to_race(&race_id, "alice").unwrap();
    assert_eq!(manager.tracks().get_track("urban_circuit").unwrap().no_checkpoints(), 5);

    let mut captured = Vec::new();
    let mut no_ticks = 0;

    while no_ticks < 3_000 {
        let race = manager.get_race(&race_id).unwrap();
        let progress = *race.get_progress("alice").unwrap();
        if progress.finished {
            break;
        }
        if captured.last() != Some(&progress.next_checkpoint) {
            captured.push(progress.next_checkpoint);
        }

        // throttle with the autopilot's steering
        let track = manager.tracks().get_track(&race.track_id).unwrap();
        let current = race.get_vehicle(&vehicle.id).unwrap();
        let steering = autopilot.get_inputs(current, track, &progress);
        let mut inputs = HashMap::new();
        inputs.insert(
            "alice".to_owned(),
            ControlInputs {
                forward: steering.forward,
                left: steering.left,
                right: steering.right,
                ..ControlInputs::default()
            },
        );

        clock.advance_secs(1.0 / 60.0);
        assert!(manager.update_race(&race_id, &inputs));
        no_ticks += 1;
    }

    // checkpoints were captured one after the other
    assert_eq!(captured, vec![0, 1, 2, 3, 4]);

    let race = manager.get_race(&race_id).unwrap();
    let progress = race.get_progress("alice").unwrap();
    assert!(progress.finished);
    assert!(progress.time_ms > 0);
    assert_eq!(race.status, RaceStatus::Racing);
    let time_ms = progress.time_ms;

    let times = manager.finish_race(&race_id);
    assert_eq!(times.get("alice"), Some(&time_ms));
    assert_eq!(manager.get_race(&race_id).unwrap().status, RaceStatus::Finished);

    let rank = manager.add_leaderboard_entry(LeaderboardEntry::new(
        "alice",
        "Alice",
        "urban_circuit",
        time_ms,
        1,
    ));
    assert_eq!(rank, Some(1));

    let top = manager.get_leaderboard(Some("urban_circuit"), 1);
    assert_eq!(top.len(), 1);
    assert_eq!(top[0].rank, 1);
    assert_eq!(top[0].player_id, "alice");
    assert_eq!(top[0].time_ms, time_ms);
}

#[test]
fn players_progress_independently() {
    let (mut manager, clock) = new_manager();

    let race_id = manager.create_race("urban_circuit", 2).unwrap();
    manager.add_vehicle_to_race(&race_id, "driver").unwrap();
    manager.add_vehicle_to_race(&race_id, "idle").unwrap();

    // checkpoint 0 lies straight ahead of the start line
    let mut inputs = HashMap::new();
    inputs.insert("driver".to_owned(), ControlInputs::forward());

    for _ in 0..120 {
        clock.advance_secs(1.0 / 60.0);
        manager.update_race(&race_id, &inputs);
    }

    let race = manager.get_race(&race_id).unwrap();
    assert_eq!(race.get_progress("driver").unwrap().next_checkpoint, 1);
    assert_eq!(race.get_progress("idle").unwrap().next_checkpoint, 0);
    assert!(!race.get_all_finished());

    let times = manager.finish_race(&race_id);
    assert_eq!(times.len(), 2);
    assert!(times.values().all(|&t| t == 0));
}
