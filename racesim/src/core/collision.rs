use crate::core::race::PlayerProgress;
use crate::core::track::Track;
use crate::core::vehicle::Vehicle;
use helpers::general::dist;

/// Result of a checkpoint test.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckpointEvent {
    None,
    Captured(usize),
    Finished,
}

/// check_checkpoint tests the vehicle against the checkpoint the player has to capture next.
/// Checkpoints can only be captured in index order. Capturing the last checkpoint finishes the
/// player and records `race_time_ms`. Finished players are not tested anymore.
pub fn check_checkpoint(
    vehicle: &Vehicle,
    track: &Track,
    progress: &mut PlayerProgress,
    race_time_ms: u64,
) -> CheckpointEvent {
    if progress.finished {
        return CheckpointEvent::None;
    }

    let checkpoint = match track.checkpoints.get(progress.next_checkpoint) {
        Some(checkpoint) => checkpoint,
        None => return CheckpointEvent::None,
    };

    if dist(vehicle.x, vehicle.y, checkpoint.x, checkpoint.y) >= checkpoint.radius {
        return CheckpointEvent::None;
    }

    let captured = progress.next_checkpoint;
    progress.next_checkpoint += 1;

    if progress.next_checkpoint == track.no_checkpoints() {
        progress.finished = true;
        progress.time_ms = race_time_ms;
        CheckpointEvent::Finished
    } else {
        CheckpointEvent::Captured(captured)
    }
}

/// check_obstacles tests the vehicle against every obstacle of the track. Each overlapping
/// obstacle costs `damage` health and halves the speed, so overlapping two obstacles in one tick
/// is penalized twice and there is no cooldown between ticks. Returns the number of contacts.
pub fn check_obstacles(vehicle: &mut Vehicle, track: &Track, damage: f64) -> usize {
    let mut no_contacts = 0;

    for obstacle in track.obstacles.iter() {
        let d = dist(vehicle.x, vehicle.y, obstacle.x, obstacle.y);

        if d < obstacle.radius + vehicle.width / 2.0 {
            vehicle.apply_damage(damage);
            vehicle.acceleration *= 0.5;
            no_contacts += 1;
        }
    }

    no_contacts
}
