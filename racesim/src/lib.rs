//! Fixed-step arcade race simulation: tracks, vehicle physics, checkpoint progression, obstacle
//! collisions, race lifecycle and a ranked leaderboard.

pub mod core;
pub mod interfaces;
pub mod post;
pub mod pre;
