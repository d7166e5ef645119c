use clap::{Args, Parser, Subcommand};
use dnabot::{
    DEFAULT_BIND, DEFAULT_HEIGHT, DEFAULT_MUTATIONS, DEFAULT_REPAIR_REWARD, DEFAULT_SERVER_URL,
    DEFAULT_TICK_COST, DEFAULT_WIDTH, SimConfig,
};

mod episodes;
mod remote;
mod serve;

use episodes::run_episodes;
use remote::{RemoteAction, run_remote};
use serve::run_serve;

#[derive(Parser)]
#[command(
    name = "dnabot",
    version,
    about = "Grid-world DNA repair agent: simulation server, headless runs, and client",
    long_about = None
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Serve the simulation over HTTP (GET /state, GET /step, POST /restart)
    Serve {
        /// Address to listen on
        #[arg(long, default_value = DEFAULT_BIND)]
        bind: String,
        #[command(flatten)]
        sim: SimArgs,
    },
    /// Play episodes to completion without a server and report the results
    Run {
        /// Number of episodes to play
        #[arg(short = 'n', long, default_value_t = 1)]
        episodes: u64,
        /// Give up on an episode after this many ticks
        #[arg(long, default_value_t = 100_000)]
        max_ticks: u64,
        /// Print the run summary as JSON
        #[arg(long)]
        json: bool,
        #[command(flatten)]
        sim: SimArgs,
    },
    /// Fetch the current state from a running server
    State(RemoteArgs),
    /// Advance a running server by one or more ticks
    Step {
        /// Number of ticks to advance
        #[arg(short = 't', long, default_value_t = 1)]
        ticks: u64,
        #[command(flatten)]
        remote: RemoteArgs,
    },
    /// Reset a running server to a fresh world
    Restart(RemoteArgs),
}

/// World and reward parameters shared by `serve` and `run`.
#[derive(Args, Clone, Debug)]
pub struct SimArgs {
    /// Grid width
    #[arg(long, default_value_t = DEFAULT_WIDTH)]
    width: i32,
    /// Grid height
    #[arg(long, default_value_t = DEFAULT_HEIGHT)]
    height: i32,
    /// Mutation cells placed on every reset
    #[arg(short = 'm', long, default_value_t = DEFAULT_MUTATIONS)]
    mutations: usize,
    /// Reward charged per tick
    #[arg(long, default_value_t = DEFAULT_TICK_COST)]
    tick_cost: f64,
    /// Reward granted per repair
    #[arg(long, default_value_t = DEFAULT_REPAIR_REWARD)]
    repair_reward: f64,
    /// Optional RNG seed for reproducible worlds and exploration
    #[arg(long)]
    seed: Option<u64>,
}

impl SimArgs {
    fn into_config(self) -> Result<SimConfig, String> {
        let config = SimConfig {
            width: self.width,
            height: self.height,
            mutations: self.mutations,
            tick_cost: self.tick_cost,
            repair_reward: self.repair_reward,
            seed: self.seed,
        };
        config.validate().map_err(|e| e.to_string())?;
        Ok(config)
    }
}

#[derive(Args, Clone, Debug)]
pub struct RemoteArgs {
    /// Base URL of the simulation server
    #[arg(long, default_value = DEFAULT_SERVER_URL)]
    url: String,
    /// Request timeout in ms
    #[arg(long, default_value_t = 5_000)]
    timeout_ms: u64,
    /// Print the raw state document
    #[arg(long)]
    json: bool,
}

pub fn run() {
    let cli = Cli::parse();
    if let Err(err) = dispatch(cli.command) {
        eprintln!("error: {}", err);
        std::process::exit(1);
    }
}

fn dispatch(command: Command) -> Result<(), String> {
    match command {
        Command::Serve { bind, sim } => run_serve(&bind, sim.into_config()?),
        Command::Run {
            episodes,
            max_ticks,
            json,
            sim,
        } => run_episodes(sim.into_config()?, episodes, max_ticks, json),
        Command::State(remote) => run_remote(RemoteAction::State, remote),
        Command::Step { ticks, remote } => run_remote(RemoteAction::Step { ticks }, remote),
        Command::Restart(remote) => run_remote(RemoteAction::Restart, remote),
    }
}
