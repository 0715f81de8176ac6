use thiserror::Error;

/// Errors surfaced by the race lifecycle and the track catalog.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SimError {
    #[error("track '{0}' is not registered")]
    TrackNotFound(String),

    #[error("race '{0}' does not exist")]
    RaceNotFound(String),

    #[error("track '{track_id}' is malformed: {reason}")]
    InvalidTrack { track_id: String, reason: String },

    #[error("race '{race_id}' is full ({max_players} players)")]
    RaceFull { race_id: String, max_players: u32 },

    #[error("player '{player_id}' already drives in race '{race_id}'")]
    PlayerAlreadyInRace { race_id: String, player_id: String },
}
