//! Qualsim CLI — run and validate qualification scenarios.
//!
//! Commands:
//! - `run`: load a competitor pool and a scenario file, run the Monte Carlo
//!   harness for each scenario, print fairness summaries (or JSON)
//! - `validate`: check a scenario file (and optionally a pool) without running

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use qualsim_core::domain::CompetitorPool;
use qualsim_runner::{
    load_pool, run_monte_carlo_seasons, MonteCarloConfig, MonteCarloSummary, ScenarioFile,
    SeasonConfig,
};

#[derive(Parser)]
#[command(
    name = "qualsim",
    about = "Qualsim CLI — Monte Carlo fairness of qualification formats"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run every scenario in a file (or one, with --scenario).
    Run {
        /// Competitor pool JSON: [{"id", "name", "rating"}].
        #[arg(long)]
        pool: PathBuf,

        /// Scenario TOML file.
        #[arg(long)]
        scenarios: PathBuf,

        /// Only run the scenario with this name.
        #[arg(long)]
        scenario: Option<String>,

        /// Override the number of seasons.
        #[arg(long)]
        seasons: Option<usize>,

        /// Override the master seed.
        #[arg(long)]
        seed: Option<u64>,

        /// Worker threads (0 = all cores, 1 = sequential).
        #[arg(long)]
        threads: Option<usize>,

        /// Competitors listed in the qualification table.
        #[arg(long, default_value_t = 15)]
        top: usize,

        /// Print summaries as JSON instead of tables.
        #[arg(long, default_value_t = false)]
        json: bool,

        /// Also write every season's qualifiers and slot trace as JSON here.
        #[arg(long)]
        seasons_out: Option<PathBuf>,
    },
    /// Validate a scenario file without running it.
    Validate {
        /// Scenario TOML file.
        #[arg(long)]
        scenarios: PathBuf,

        /// Also load this pool and check directives against it.
        #[arg(long)]
        pool: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    init_logging();
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            pool,
            scenarios,
            scenario,
            seasons,
            seed,
            threads,
            top,
            json,
            seasons_out,
        } => {
            let overrides = Overrides {
                seasons,
                seed,
                threads,
            };
            let output = Output {
                top,
                json,
                seasons_out,
            };
            run_cmd(&pool, &scenarios, scenario.as_deref(), &overrides, &output)
        }
        Commands::Validate { scenarios, pool } => validate_cmd(&scenarios, pool.as_deref()),
    }
}

/// `RUST_LOG` overrides the default `info` filter.
fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

struct Overrides {
    seasons: Option<usize>,
    seed: Option<u64>,
    threads: Option<usize>,
}

impl Overrides {
    fn apply(&self, mut mc: MonteCarloConfig) -> MonteCarloConfig {
        if let Some(seasons) = self.seasons {
            mc.seasons = seasons;
        }
        if let Some(seed) = self.seed {
            mc.master_seed = seed;
        }
        if let Some(threads) = self.threads {
            mc.threads = threads;
        }
        mc
    }
}

struct Output {
    top: usize,
    json: bool,
    seasons_out: Option<PathBuf>,
}

fn load_configs(path: &Path) -> Result<(ScenarioFile, Vec<SeasonConfig>)> {
    let file = ScenarioFile::load(path)?;
    let configs = file
        .validate()
        .with_context(|| format!("invalid scenario file {}", path.display()))?;
    Ok((file, configs))
}

fn run_cmd(
    pool_path: &Path,
    scenarios_path: &Path,
    only: Option<&str>,
    overrides: &Overrides,
    output: &Output,
) -> Result<()> {
    let (file, mut configs) = load_configs(scenarios_path)?;
    if let Some(name) = only {
        configs.retain(|c| c.name == name);
        if configs.is_empty() {
            bail!("no scenario named '{name}' in {}", scenarios_path.display());
        }
    }
    let pool = load_pool(pool_path)
        .with_context(|| format!("failed to load pool {}", pool_path.display()))?;
    info!(competitors = pool.len(), scenarios = configs.len(), "loaded inputs");

    let mc = overrides.apply(file.monte_carlo.clone());
    let mut runs = Vec::with_capacity(configs.len());
    for config in &configs {
        let run = run_monte_carlo_seasons(&pool, config, &mc)
            .with_context(|| format!("scenario '{}' failed", config.name))?;
        runs.push(run);
    }

    if let Some(path) = &output.seasons_out {
        std::fs::write(path, serde_json::to_string_pretty(&runs)?)
            .with_context(|| format!("failed to write {}", path.display()))?;
        info!(path = %path.display(), "wrote season results");
    }

    let summaries: Vec<&MonteCarloSummary> = runs.iter().map(|r| &r.summary).collect();
    if output.json {
        println!("{}", serde_json::to_string_pretty(&summaries)?);
    } else {
        for summary in summaries {
            print_summary(summary, &pool, output.top);
        }
    }
    Ok(())
}

fn validate_cmd(scenarios_path: &Path, pool_path: Option<&Path>) -> Result<()> {
    let (file, configs) = load_configs(scenarios_path)?;
    if let Some(path) = pool_path {
        let pool = load_pool(path).with_context(|| format!("failed to load pool {}", path.display()))?;
        for config in &configs {
            qualsim_runner::Season::new(&pool, config)
                .with_context(|| format!("scenario '{}'", config.name))?;
        }
    }
    let registry = file.registry();
    println!("{}: OK", scenarios_path.display());
    println!("Events: {}", registry.ids().collect::<Vec<_>>().join(", "));
    for config in &configs {
        let slots: Vec<String> = config
            .slots
            .iter()
            .map(|s| format!("{}({})", s.event_id, s.max_spots))
            .collect();
        println!(
            "  {:<28} target {:>2}  slots: {}",
            config.name,
            config.target_candidates,
            slots.join(" → ")
        );
    }
    Ok(())
}

fn print_summary(summary: &MonteCarloSummary, pool: &CompetitorPool, top: usize) {
    println!();
    println!("=== {} ===", summary.scenario);
    println!(
        "Seasons: {} ({} valid)",
        summary.total_seasons, summary.valid_seasons
    );
    println!("Mean baseline rating:   {:.1}", summary.mean_baseline);
    println!(
        "Mean live rating:       {:.1} (± {:.1})",
        summary.mean_live, summary.std_live
    );
    println!("Top-K exact hit rate:   {:.1}%", summary.top_k_hit_rate * 100.0);
    println!("Top-K coverage:         {:.1}%", summary.top_k_coverage * 100.0);
    println!("Lowest qualifier:       {:.0}", summary.min_qualifier_rating);
    for t in &summary.thresholds {
        println!(
            "Below {:.0}:             {:.2} per season ({:.1}% of seasons)",
            t.threshold,
            t.mean_per_season,
            t.season_rate * 100.0
        );
    }

    println!();
    println!("{:<4} {:<28} {:>8} {:>8}", "#", "Competitor", "Rating", "Qual%");
    println!("{}", "-".repeat(51));
    for (rank, odds) in summary.qualification.iter().take(top).enumerate() {
        println!(
            "{:<4} {:<28} {:>8.0} {:>7.1}%",
            rank + 1,
            odds.name,
            odds.baseline,
            odds.probability * 100.0
        );
    }
    let never = pool.len().saturating_sub(summary.qualification.len());
    if never > 0 {
        println!("({never} competitors never qualified)");
    }
}
