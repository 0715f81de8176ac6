use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// * `rank` - 1-based position in the whole table, recomputed on every insert
/// * `player_id`, `player_name` - Player that drove the time
/// * `track_id` - Track the time was driven on
/// * `time_ms` - (ms) Completion time
/// * `date` - Insertion date
/// * `difficulty` - Difficulty rating of the track at the time of the run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub rank: u32,
    pub player_id: String,
    pub player_name: String,
    pub track_id: String,
    pub time_ms: u64,
    pub date: DateTime<Utc>,
    pub difficulty: u8,
}

impl LeaderboardEntry {
    /// Creates an unranked entry dated now.
    pub fn new(
        player_id: &str,
        player_name: &str,
        track_id: &str,
        time_ms: u64,
        difficulty: u8,
    ) -> LeaderboardEntry {
        LeaderboardEntry {
            rank: 0,
            player_id: player_id.to_owned(),
            player_name: player_name.to_owned(),
            track_id: track_id.to_owned(),
            time_ms,
            date: Utc::now(),
            difficulty,
        }
    }
}

/// Ranked table of completion times, sorted ascending by time and capped at `max_entries`.
/// A player may hold several entries for the same track.
#[derive(Debug, Clone)]
pub struct Leaderboard {
    entries: Vec<LeaderboardEntry>,
    max_entries: usize,
}

impl Leaderboard {
    pub fn new(max_entries: usize) -> Leaderboard {
        Leaderboard {
            entries: Vec::with_capacity(max_entries.min(1024)),
            max_entries,
        }
    }

    /// Inserts the entry, re-ranks the table and drops the entries with the worst times beyond
    /// the capacity. Returns the rank of the new entry, None if it did not make the cut. Entries
    /// with equal times keep their insertion order.
    pub fn add_entry(&mut self, mut entry: LeaderboardEntry) -> Option<u32> {
        // stable sort puts a new entry behind existing entries with the same time
        let pos = self.entries.partition_point(|e| e.time_ms <= entry.time_ms);

        if pos >= self.max_entries {
            tracing::debug!(
                player_id = %entry.player_id,
                time_ms = entry.time_ms,
                "Time does not make the leaderboard"
            );
            return None;
        }

        entry.rank = pos as u32 + 1;
        self.entries.insert(pos, entry);
        self.entries.truncate(self.max_entries);

        for (i, e) in self.entries.iter_mut().enumerate().skip(pos) {
            e.rank = i as u32 + 1;
        }

        tracing::info!(
            player_id = %self.entries[pos].player_id,
            track_id = %self.entries[pos].track_id,
            time_ms = self.entries[pos].time_ms,
            rank = pos + 1,
            "Leaderboard entry added"
        );

        Some(pos as u32 + 1)
    }

    /// Returns the top `limit` entries, optionally restricted to one track. The ranks are the
    /// ranks within the whole table.
    pub fn get_leaderboard(&self, track_id: Option<&str>, limit: usize) -> Vec<LeaderboardEntry> {
        self.entries
            .iter()
            .filter(|e| track_id.map_or(true, |id| e.track_id == id))
            .take(limit)
            .cloned()
            .collect()
    }

    pub fn entries(&self) -> &[LeaderboardEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn max_entries(&self) -> usize {
        self.max_entries
    }
}
