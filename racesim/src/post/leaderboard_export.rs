use crate::core::leaderboard::{Leaderboard, LeaderboardEntry};
use anyhow::Context;
use std::path::Path;

/// write_leaderboard_csv writes the whole leaderboard (header row plus one row per entry in rank
/// order) to a CSV file.
pub fn write_leaderboard_csv(leaderboard: &Leaderboard, filepath: &Path) -> anyhow::Result<()> {
    if let Some(dir) = filepath.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir)
            .context(format!("Failed to create output directory {}!", dir.display()))?;
    }

    let mut writer = csv::Writer::from_path(filepath).context(format!(
        "Failed to open leaderboard file {}!",
        filepath.display()
    ))?;

    for entry in leaderboard.entries() {
        writer.serialize(entry)?;
    }
    writer.flush()?;

    Ok(())
}

/// read_leaderboard_csv reads entries written by `write_leaderboard_csv` and inserts them into a
/// new leaderboard of the given capacity, which recomputes the ranks.
pub fn read_leaderboard_csv(filepath: &Path, max_entries: usize) -> anyhow::Result<Leaderboard> {
    let mut reader = csv::Reader::from_path(filepath).context(format!(
        "Failed to open leaderboard file {}!",
        filepath.display()
    ))?;

    let mut leaderboard = Leaderboard::new(max_entries);

    for result in reader.deserialize() {
        let entry: LeaderboardEntry = result.context(format!(
            "Failed to parse leaderboard file {}!",
            filepath.display()
        ))?;
        leaderboard.add_entry(entry);
    }

    Ok(leaderboard)
}
