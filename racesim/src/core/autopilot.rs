use crate::core::race::{PlayerProgress, SimConstants};
use crate::core::track::Track;
use crate::core::vehicle::{ControlInputs, Vehicle};
use helpers::general::normalize_angle;

/// (rad) Heading error above which the autopilot releases the throttle and turns while coasting.
const MAX_THROTTLE_HEADING_ERROR: f64 = 0.5;

/// Scripted driver that steers towards the checkpoint the player has to capture next. It stands in
/// for a human player when races are simulated offline. With a large heading error it lets the
/// friction slow the vehicle down while turning, which keeps it from circling a checkpoint.
#[derive(Debug, Clone, Copy)]
pub struct Autopilot {
    heading_deadband: f64,
}

impl Autopilot {
    pub fn new(sim_consts: &SimConstants) -> Autopilot {
        Autopilot {
            // half of the heading change of one steering tick
            heading_deadband: 0.1 * sim_consts.max_rotation,
        }
    }

    pub fn get_inputs(
        &self,
        vehicle: &Vehicle,
        track: &Track,
        progress: &PlayerProgress,
    ) -> ControlInputs {
        // finished players head for the finish line marker
        let (target_x, target_y) = match track.checkpoints.get(progress.next_checkpoint) {
            Some(checkpoint) if !progress.finished => (checkpoint.x, checkpoint.y),
            _ => (track.finish_line.x, track.finish_line.y),
        };

        let heading_target = (target_y - vehicle.y).atan2(target_x - vehicle.x);
        let heading_error = normalize_angle(heading_target - vehicle.heading);

        ControlInputs {
            forward: !progress.finished && heading_error.abs() < MAX_THROTTLE_HEADING_ERROR,
            left: heading_error < -self.heading_deadband,
            right: heading_error > self.heading_deadband,
            ..ControlInputs::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::track::StartLine;
    use crate::core::track_catalog::TrackCatalog;

    fn vehicle_with_heading(x: f64, y: f64, heading: f64) -> Vehicle {
        Vehicle::new(
            "v1".to_owned(),
            "p1".to_owned(),
            &StartLine { x, y, rotation: heading },
            (0.0, 0.0),
            &SimConstants::default(),
        )
    }

    #[test]
    fn drives_straight_at_an_aligned_checkpoint() {
        let catalog = TrackCatalog::with_default_tracks();
        let track = catalog.get_track("urban_circuit").unwrap();
        let autopilot = Autopilot::new(&SimConstants::default());

        let inputs = autopilot.get_inputs(
            &vehicle_with_heading(200.0, 800.0, 0.0),
            track,
            &PlayerProgress::default(),
        );
        assert_eq!(inputs, ControlInputs::forward());
    }

    #[test]
    fn coasts_and_turns_towards_a_checkpoint_behind() {
        let catalog = TrackCatalog::with_default_tracks();
        let track = catalog.get_track("urban_circuit").unwrap();
        let autopilot = Autopilot::new(&SimConstants::default());

        // checkpoint 0 lies to the east and slightly south (+y), vehicle faces north (-y)
        let inputs = autopilot.get_inputs(
            &vehicle_with_heading(600.0, 790.0, -std::f64::consts::FRAC_PI_2),
            track,
            &PlayerProgress::default(),
        );
        assert!(!inputs.forward);
        assert!(inputs.right);
        assert!(!inputs.left);
    }
}
