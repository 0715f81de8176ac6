use crate::core::leaderboard::LeaderboardEntry;
use crate::core::race::RaceState;
use crate::core::track::Track;
use helpers::general::{argsort, SortOrder};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt::Write;
use std::io::Write as IoWrite;

/// * `position` - 1-based final position, finishers by time first, then the others in roster order
/// * `time_ms` - (ms) Race time, 0 if the player did not finish
/// * `checkpoints` - Number of captured checkpoints
/// * `health` - Remaining vehicle health
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Standing {
    pub position: u32,
    pub player_id: String,
    pub player_name: String,
    pub finished: bool,
    pub time_ms: u64,
    pub checkpoints: usize,
    pub health: f64,
}

/// RaceResult contains all race information that is required for post-processing the results.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RaceResult {
    pub race_id: String,
    pub track_id: String,
    pub track_name: String,
    pub difficulty: u8,
    pub tot_no_checkpoints: usize,
    pub no_ticks: u64,
    pub standings: Vec<Standing>,
}

impl RaceResult {
    /// Builds the result of a race from its final state and the player times returned when the
    /// race was finished.
    pub fn new(
        race: &RaceState,
        track: &Track,
        player_times: &HashMap<String, u64>,
        no_ticks: u64,
    ) -> RaceResult {
        let finished: Vec<bool> = race
            .vehicles
            .iter()
            .map(|v| race.get_progress(&v.player_id).map_or(false, |p| p.finished))
            .collect();

        // sort key: race time for finishers, infinity for everybody else
        let sort_keys: Vec<f64> = race
            .vehicles
            .iter()
            .zip(finished.iter())
            .map(|(v, &fin)| {
                if fin {
                    player_times.get(&v.player_id).copied().unwrap_or(0) as f64
                } else {
                    f64::INFINITY
                }
            })
            .collect();

        let standings = argsort(&sort_keys, SortOrder::Ascending)
            .into_iter()
            .enumerate()
            .map(|(i, idx)| {
                let vehicle = &race.vehicles[idx];
                let progress = race.get_progress(&vehicle.player_id).copied().unwrap_or_default();

                Standing {
                    position: i as u32 + 1,
                    player_id: vehicle.player_id.to_owned(),
                    player_name: race
                        .player_names
                        .get(&vehicle.player_id)
                        .cloned()
                        .unwrap_or_else(|| vehicle.player_id.to_owned()),
                    finished: finished[idx],
                    time_ms: player_times.get(&vehicle.player_id).copied().unwrap_or(0),
                    checkpoints: progress.next_checkpoint,
                    health: vehicle.health,
                }
            })
            .collect();

        RaceResult {
            race_id: race.id.to_owned(),
            track_id: track.id.to_owned(),
            track_name: track.name.to_owned(),
            difficulty: track.difficulty,
            tot_no_checkpoints: track.no_checkpoints(),
            no_ticks,
            standings,
        }
    }

    /// Leaderboard entries for every player that finished.
    pub fn to_leaderboard_entries(&self) -> Vec<LeaderboardEntry> {
        self.standings
            .iter()
            .filter(|s| s.finished)
            .map(|s| {
                LeaderboardEntry::new(
                    &s.player_id,
                    &s.player_name,
                    &self.track_id,
                    s.time_ms,
                    self.difficulty,
                )
            })
            .collect()
    }

    pub fn get_winner(&self) -> Option<&Standing> {
        self.standings.first().filter(|s| s.finished)
    }

    fn format_race_times(&self) -> Result<String, std::fmt::Error> {
        let mut content = String::new();

        writeln!(
            &mut content,
            "RESULT: {} ({}), {} checkpoints, {} ticks",
            self.track_name, self.race_id, self.tot_no_checkpoints, self.no_ticks
        )?;
        writeln!(&mut content, "pos, player, time, checkpoints, health")?;

        for s in self.standings.iter() {
            let time = if s.finished {
                format!("{:9.3}s", s.time_ms as f64 / 1000.0)
            } else {
                format!("{:>10}", "DNF")
            };
            writeln!(
                &mut content,
                "{:3}, {:>12}, {}, {:2}/{}, {:5.1}",
                s.position, s.player_name, time, s.checkpoints, self.tot_no_checkpoints, s.health
            )?;
        }

        Ok(content)
    }

    /// print_race_times prints the standings to the console output.
    pub fn print_race_times(&self) -> anyhow::Result<()> {
        print!("{}", self.format_race_times()?);
        Ok(())
    }

    /// write_race_times_to_file writes the standings to a text file (default output/last_run.txt).
    /// Returns the path to the written file.
    pub fn write_race_times_to_file(
        &self,
        path: Option<&std::path::Path>,
    ) -> anyhow::Result<String> {
        let content = self.format_race_times()?;

        let out_path = match path {
            Some(p) => p.to_path_buf(),
            None => {
                let out_dir = std::path::Path::new("output");
                std::fs::create_dir_all(out_dir)?;
                out_dir.join("last_run.txt")
            }
        };

        let mut file = std::fs::OpenOptions::new()
            .create(true)
            .truncate(true)
            .write(true)
            .open(&out_path)?;
        file.write_all(content.as_bytes())?;
        file.flush()?;

        Ok(out_path.to_string_lossy().into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::race::{PlayerProgress, SimConstants};
    use crate::core::track_catalog::TrackCatalog;
    use crate::core::vehicle::Vehicle;

    fn finished_race() -> (RaceState, Track) {
        let catalog = TrackCatalog::with_default_tracks();
        let track = catalog.get_track("urban_circuit").unwrap().clone();
        let mut race = RaceState::new("race_1".to_owned(), track.id.to_owned(), 3, 0);

        for (player_id, progress) in [
            ("slow", PlayerProgress { time_ms: 20_000, next_checkpoint: 5, finished: true }),
            ("dnf", PlayerProgress { time_ms: 0, next_checkpoint: 2, finished: false }),
            ("fast", PlayerProgress { time_ms: 10_000, next_checkpoint: 5, finished: true }),
        ] {
            race.vehicles.push(Vehicle::new(
                format!("v_{}", player_id),
                player_id.to_owned(),
                &track.start_line,
                (0.0, 0.0),
                &SimConstants::default(),
            ));
            race.player_progress.insert(player_id.to_owned(), progress);
            race.player_names.insert(player_id.to_owned(), player_id.to_uppercase());
        }

        (race, track)
    }

    #[test]
    fn standings_put_finishers_first_by_time() {
        let (race, track) = finished_race();
        let result = RaceResult::new(&race, &track, &race.get_player_times(), 1_200);

        let order: Vec<&str> = result.standings.iter().map(|s| s.player_id.as_str()).collect();
        assert_eq!(order, vec!["fast", "slow", "dnf"]);
        assert_eq!(result.get_winner().unwrap().player_name, "FAST");
        assert_eq!(result.standings[2].checkpoints, 2);
        assert!(!result.standings[2].finished);
    }

    #[test]
    fn only_finishers_become_leaderboard_entries() {
        let (race, track) = finished_race();
        let result = RaceResult::new(&race, &track, &race.get_player_times(), 1_200);
        let entries = result.to_leaderboard_entries();

        assert_eq!(entries.len(), 2);
        assert!(entries.iter().all(|e| e.track_id == "urban_circuit" && e.difficulty == 1));
        assert_eq!(entries[0].time_ms, 10_000);
    }

    #[test]
    fn race_times_are_written_to_file() {
        let (race, track) = finished_race();
        let result = RaceResult::new(&race, &track, &race.get_player_times(), 1_200);

        let path = std::env::temp_dir().join(format!("racesim_result_{}.txt", std::process::id()));
        let written = result.write_race_times_to_file(Some(&path)).unwrap();
        let content = std::fs::read_to_string(&written).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert!(content.starts_with("RESULT: Urban Circuit (race_1)"));
        assert!(content.contains("DNF"));
        assert!(content.contains("10.000s"));
    }
}
