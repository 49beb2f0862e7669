mod bot_controller;
mod config;
mod placement;
mod simulation;

use bubble_common::games::SessionRng;
use bubble_common::games::bubbles::GameStatus;
use bubble_common::{log, log_error, logger};
use clap::Parser;

use config::{DEFAULT_CONFIG_FILE, RunnerConfig, get_config_manager};
use simulation::{GameSummary, Simulation};

#[derive(Parser)]
#[command(name = "bubble_runner")]
struct Args {
    #[arg(long, default_value = DEFAULT_CONFIG_FILE)]
    config: String,

    /// Seed of the first game; later games use the following seeds.
    #[arg(long)]
    seed: Option<u64>,

    #[arg(long, default_value_t = 1)]
    games: u32,

    #[arg(long)]
    use_log_prefix: bool,

    #[arg(long)]
    verbose: bool,

    /// Write the default config to `--config` and exit.
    #[arg(long)]
    write_default_config: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let prefix = if args.use_log_prefix {
        Some("Runner".to_string())
    } else {
        None
    };
    logger::init_logger(prefix, args.verbose);

    let config_manager = get_config_manager(&args.config);
    if args.write_default_config {
        config_manager.set_config(&RunnerConfig::default())?;
        log!("Default config written to {}", args.config);
        return Ok(());
    }

    let config = config_manager.get_config()?;
    let first_seed = args
        .seed
        .unwrap_or_else(|| SessionRng::from_random().seed());
    let simulation = Simulation::new(config.game, config.simulation);

    tokio::select! {
        result = run_games(&simulation, first_seed, args.games) => {
            if let Err(e) = result {
                log_error!("Simulation failed: {}", e);
                return Err(e.into());
            }
        }
        _ = tokio::signal::ctrl_c() => {
            log!("Interrupted, stopping");
        }
    }

    Ok(())
}

async fn run_games(simulation: &Simulation, first_seed: u64, games: u32) -> Result<(), String> {
    let mut summaries: Vec<GameSummary> = Vec::new();

    for index in 0..games {
        let seed = first_seed.wrapping_add(u64::from(index));
        let summary = simulation.run_game(seed).await?;
        log!("Game {}/{}: {}", index + 1, games, summary);
        summaries.push(summary);
    }

    let wins = summaries.iter().filter(|s| s.status == GameStatus::Won).count();
    let losses = summaries.iter().filter(|s| s.status == GameStatus::Lost).count();
    let best = summaries.iter().map(|s| s.score).max().unwrap_or(0);
    log!(
        "Played {} game(s): {} won, {} lost, {} unfinished, best score {}",
        summaries.len(),
        wins,
        losses,
        summaries.len() - wins - losses,
        best
    );

    Ok(())
}
