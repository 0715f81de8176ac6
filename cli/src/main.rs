use clap::Parser;
use racesim::core::clock::ManualClock;
use racesim::core::handle_race::handle_race;
use racesim::core::leaderboard::Leaderboard;
use racesim::core::race::{PlayerPars, RacePars};
use racesim::core::race_manager::RaceManager;
use racesim::core::track_catalog::TrackCatalog;
use racesim::interfaces::race_snapshot::RaceSnapshot;
use racesim::post::leaderboard_export::write_leaderboard_csv;
use racesim::post::race_result::RaceResult;
use racesim::pre::read_sim_pars::{read_sim_constants, read_sim_pars, SimPars};
use racesim::pre::sim_opts::SimOpts;
use rayon::prelude::*;
use std::sync::Mutex;
use std::thread;
use std::time::Instant;
use tracing_subscriber::EnvFilter;

/// Race used if no parameter file is given: two autopilot players on the urban circuit.
fn default_sim_pars() -> SimPars {
    SimPars {
        race_pars: RacePars {
            track_id: "urban_circuit".to_owned(),
            max_players: 2,
            participants: vec![
                PlayerPars {
                    id: "p1".to_owned(),
                    name: "Player 1".to_owned(),
                },
                PlayerPars {
                    id: "p2".to_owned(),
                    name: "Player 2".to_owned(),
                },
            ],
            max_ticks: 60 * 60 * 5,
        },
        track_pars_all: Vec::new(),
        sim_consts: Default::default(),
    }
}

fn init_logging(debug: bool) {
    let default_level = if debug { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn print_snapshot(snapshot: &RaceSnapshot) {
    let positions: Vec<String> = snapshot
        .vehicles
        .iter()
        .map(|v| {
            format!(
                "{} ({:7.1}, {:7.1}) cp {}{}",
                v.player_id,
                v.x,
                v.y,
                v.next_checkpoint,
                if v.finished { " FINISHED" } else { "" }
            )
        })
        .collect();
    println!(
        "{:8.3}s [{:?}] {}",
        snapshot.elapsed_ms as f64 / 1000.0,
        snapshot.status,
        positions.join(" | ")
    );
}

fn main() -> anyhow::Result<()> {
    // PRE-PROCESSING ------------------------------------------------------------------------------
    // get simulation options from the command line arguments
    let sim_opts: SimOpts = SimOpts::parse();
    init_logging(sim_opts.debug);

    if !(sim_opts.realtime_factor > 0.0) {
        anyhow::bail!("The real-time factor must be positive!");
    }
    if sim_opts.no_sim_runs == 0 {
        anyhow::bail!("The number of simulation runs must be at least 1!");
    }

    // get simulation parameters
    let mut sim_pars = if let Some(parfile_path) = &sim_opts.parfile_path {
        tracing::info!("Reading simulation parameters from {:?}", parfile_path);
        read_sim_pars(parfile_path)?
    } else {
        tracing::info!("No parameter file provided, simulating the default race");
        default_sim_pars()
    };

    if let Some(consts_path) = &sim_opts.consts_path {
        sim_pars.sim_consts = read_sim_constants(consts_path)?;
    }
    if let Some(track_id) = &sim_opts.track {
        sim_pars.race_pars.track_id = track_id.to_owned();
    }

    // set up the track catalog
    let mut tracks = TrackCatalog::with_default_tracks();
    for track_pars in sim_pars.track_pars_all.iter() {
        tracks.register_track_pars(track_pars)?;
    }
    let track = tracks.try_get_track(&sim_pars.race_pars.track_id)?;

    tracing::info!(
        "Simulating {} ({:?}, difficulty {}) with {} players and a time step size of {:.4}s",
        track.name,
        track.terrain,
        track.difficulty,
        sim_pars.race_pars.participants.len(),
        sim_pars.sim_consts.timestep_size
    );

    let leaderboard = Mutex::new(Leaderboard::new(sim_pars.sim_consts.leaderboard_max_entries));

    // EXECUTION -----------------------------------------------------------------------------------
    let race_results: Vec<RaceResult> = if !sim_opts.live {
        tracing::info!("Running {} simulation run(s)...", sim_opts.no_sim_runs);
        let t_start = Instant::now();

        // every run owns its manager, only the leaderboard is shared
        let race_results = (0..sim_opts.no_sim_runs)
            .into_par_iter()
            .map(|run| -> anyhow::Result<RaceResult> {
                let mut manager = RaceManager::with_seed(
                    tracks.clone(),
                    sim_pars.sim_consts.clone(),
                    ManualClock::new(),
                    sim_opts.seed + run as u64,
                );
                let race_result =
                    handle_race(&mut manager, &sim_pars.race_pars, sim_opts.debug, None, 1.0)?;

                let mut leaderboard = leaderboard
                    .lock()
                    .map_err(|_| anyhow::anyhow!("Leaderboard lock is poisoned!"))?;
                for entry in race_result.to_leaderboard_entries() {
                    leaderboard.add_entry(entry);
                }

                Ok(race_result)
            })
            .collect::<anyhow::Result<Vec<RaceResult>>>()?;

        tracing::info!("Execution time: {}ms", t_start.elapsed().as_millis());
        race_results
    } else {
        // LIVE CASE - simulation paced to real time, snapshots printed by the main thread
        tracing::info!("Running live simulation...");
        let (tx, rx) = flume::unbounded();

        let sim_pars_thread = sim_pars.clone();
        let tracks_thread = tracks.clone();
        let sim_opts_thread = sim_opts.clone();

        let sim_handle = thread::spawn(move || {
            let mut manager = RaceManager::with_seed(
                tracks_thread,
                sim_pars_thread.sim_consts.clone(),
                ManualClock::new(),
                sim_opts_thread.seed,
            );
            handle_race(
                &mut manager,
                &sim_pars_thread.race_pars,
                sim_opts_thread.debug,
                Some(&tx),
                sim_opts_thread.realtime_factor,
            )
        });

        // the channel closes when the simulation thread drops its sender
        for snapshot in rx.iter() {
            print_snapshot(&snapshot);
        }

        let race_result = sim_handle
            .join()
            .map_err(|_| anyhow::anyhow!("Simulation thread panicked!"))??;

        let mut leaderboard = leaderboard
            .lock()
            .map_err(|_| anyhow::anyhow!("Leaderboard lock is poisoned!"))?;
        for entry in race_result.to_leaderboard_entries() {
            leaderboard.add_entry(entry);
        }

        vec![race_result]
    };

    // POST-PROCESSING -----------------------------------------------------------------------------
    for race_result in race_results.iter() {
        race_result.print_race_times()?;
    }

    if let Some(race_result) = race_results.last() {
        let path = race_result.write_race_times_to_file(sim_opts.result_path.as_deref())?;
        tracing::info!("Race times written to {}", path);
    }

    let leaderboard = leaderboard
        .into_inner()
        .map_err(|_| anyhow::anyhow!("Leaderboard lock is poisoned!"))?;

    println!("LEADERBOARD: {}", track.name);
    for entry in leaderboard.get_leaderboard(Some(&track.id), 10) {
        println!(
            "{:3}. {:>12} {:9.3}s",
            entry.rank,
            entry.player_name,
            entry.time_ms as f64 / 1000.0
        );
    }

    if let Some(csv_path) = &sim_opts.leaderboard_csv {
        write_leaderboard_csv(&leaderboard, csv_path)?;
        tracing::info!("Leaderboard written to {:?}", csv_path);
    }

    Ok(())
}
