use crate::core::race::SimConstants;
use crate::core::track::StartLine;
use serde::{Deserialize, Serialize};

/// Control inputs of a single player for one tick. Missing inputs are all false.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControlInputs {
    pub forward: bool,
    pub backward: bool,
    pub left: bool,
    pub right: bool,
    pub drift: bool,
    pub boost: bool,
}

impl ControlInputs {
    pub fn forward() -> ControlInputs {
        ControlInputs {
            forward: true,
            ..ControlInputs::default()
        }
    }
}

/// * `id` - Unique vehicle identifier within its race
/// * `player_id` - Owning player
/// * `x`, `y` - Position
/// * `vx`, `vy` - Velocity, always aligned with the heading
/// * `heading` - (rad) Orientation
/// * `acceleration` - Signed scalar that doubles as forward speed
/// * `braking`, `drifting` - State flags set by the last physics step
/// * `wheelbase`, `width` - Geometry, the width enters the obstacle collision test
/// * `health` - Remaining health in [0, max_health], vehicles at 0 are not simulated anymore
/// * `boost` - Boost fuel in [0, max_boost]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vehicle {
    pub id: String,
    pub player_id: String,
    pub x: f64,
    pub y: f64,
    pub vx: f64,
    pub vy: f64,
    pub heading: f64,
    pub acceleration: f64,
    pub braking: bool,
    pub drifting: bool,
    pub wheelbase: f64,
    pub width: f64,
    pub health: f64,
    pub max_health: f64,
    pub boost: f64,
    pub max_boost: f64,
}

impl Vehicle {
    /// Creates a vehicle at rest at the given position with the heading of the start line.
    pub fn new(
        id: String,
        player_id: String,
        start_line: &StartLine,
        offset: (f64, f64),
        sim_consts: &SimConstants,
    ) -> Vehicle {
        Vehicle {
            id,
            player_id,
            x: start_line.x + offset.0,
            y: start_line.y + offset.1,
            vx: 0.0,
            vy: 0.0,
            heading: start_line.rotation,
            acceleration: 0.0,
            braking: false,
            drifting: false,
            wheelbase: sim_consts.vehicle_wheelbase,
            width: sim_consts.vehicle_width,
            health: sim_consts.max_health,
            max_health: sim_consts.max_health,
            boost: sim_consts.max_boost,
            max_boost: sim_consts.max_boost,
        }
    }

    pub fn is_alive(&self) -> bool {
        self.health > 0.0
    }

    pub fn speed(&self) -> f64 {
        self.vx.hypot(self.vy)
    }

    /// Reduces the health by `amount` without dropping below zero.
    pub fn apply_damage(&mut self, amount: f64) {
        self.health = (self.health - amount).clamp(0.0, self.max_health);
    }

    /// step advances the vehicle by one time step of size `dt` (s) using the arcade model. The
    /// velocity is derived from heading and acceleration, there is no lateral slip. The caller is
    /// responsible for not stepping vehicles without health.
    pub fn step(&mut self, inputs: &ControlInputs, dt: f64, sim_consts: &SimConstants) {
        let max_speed = sim_consts.max_speed;

        // longitudinal control
        self.braking = inputs.backward && !inputs.forward;

        if inputs.forward {
            self.acceleration = (self.acceleration + sim_consts.acceleration * dt).min(max_speed);
        } else if inputs.backward {
            self.acceleration =
                (self.acceleration - sim_consts.acceleration * 0.5 * dt).max(-max_speed * 0.5);
        } else {
            self.acceleration *= sim_consts.friction;
        }

        // steering, left and right cancel each other out
        let mut target_heading = self.heading;

        if inputs.left {
            target_heading -= sim_consts.max_rotation;
        }
        if inputs.right {
            target_heading += sim_consts.max_rotation;
        }

        self.heading = self.heading * 0.8 + target_heading * 0.2;

        // drift
        if inputs.drift && self.acceleration.abs() > max_speed * sim_consts.drift_threshold {
            self.drifting = true;
            self.acceleration *= sim_consts.drift_multiplier;
        } else {
            self.drifting = false;
        }

        // boost
        if inputs.boost && self.boost > 0.0 {
            self.acceleration = (self.acceleration
                + sim_consts.acceleration * sim_consts.boost_acceleration_factor * dt)
                .min(sim_consts.boost_max_speed);
            self.boost -= sim_consts.boost_drain * dt;
        } else {
            self.boost += sim_consts.boost_regen * dt;
        }
        self.boost = self.boost.clamp(0.0, self.max_boost);
        self.health = self.health.clamp(0.0, self.max_health);

        // integration
        self.vx = self.heading.cos() * self.acceleration;
        self.vy = self.heading.sin() * self.acceleration;
        self.x += self.vx * dt;
        self.y += self.vy * dt;
    }
}
