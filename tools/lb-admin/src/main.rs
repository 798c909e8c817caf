//! lb-admin: Leaderboard Admin CLI
//!
//! Operates directly on the shard databases. With `--redis-url` the ranked
//! index is the deployment's shared Redis index, so `rebuild` and `store`
//! update what every server reads. Without it the index is local to this
//! process, and `top` and `rank` rebuild the game before reading it.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{debug, info, warn};

use leaderboard_core::{
    connection_name, GameId, InMemoryRankedSet, LeaderboardApi, LeaderboardConfig,
    LeaderboardError, LeaderboardService, Metrics, PlayerId, RankedSetStore, RebuildReport,
    RedisRankedSet, Score, SqliteShard, DEFAULT_PAGE_LIMIT,
};
use leaderboard_telemetry::{init_tracing, TelemetryConfig};

type Service<R> = LeaderboardService<SqliteShard, R>;

/// Where the ranked index lives.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum IndexScope {
    /// Shared with the rest of the deployment.
    Shared,
    /// Private to this process; reads rebuild first.
    Process,
}

/// lb-admin: Leaderboard Admin CLI
#[derive(Parser, Debug)]
#[command(name = "lb-admin")]
#[command(about = "Rebuild and inspect per-game leaderboards")]
struct Args {
    /// Number of shards (must match the deployment)
    #[arg(long, env = "LB_SHARD_COUNT", global = true, allow_negative_numbers = true)]
    shards: Option<i64>,

    /// Directory holding one database file per shard
    #[arg(long, env = "LB_DATA_DIR", global = true)]
    data_dir: Option<PathBuf>,

    /// Shard connection name prefix
    #[arg(long, env = "LB_CONNECTION_PREFIX", global = true)]
    prefix: Option<String>,

    /// Redis holding the shared ranked index (unset: index local to this run)
    #[arg(long, env = "LB_REDIS_URL", global = true)]
    redis_url: Option<String>,

    /// Log at debug level
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Rebuild one game's leaderboard, or every game's
    Rebuild {
        /// Only rebuild this game
        #[arg(long)]
        game_id: Option<GameId>,
    },
    /// Store a score through the write path
    Store {
        #[arg(long)]
        player_id: PlayerId,
        #[arg(long)]
        game_id: GameId,
        #[arg(long)]
        score: Score,
    },
    /// Print a page of a game's leaderboard
    Top {
        #[arg(long)]
        game_id: GameId,
        #[arg(long, default_value_t = 0)]
        offset: usize,
        #[arg(long, default_value_t = DEFAULT_PAGE_LIMIT)]
        limit: usize,
    },
    /// Print a player's rank in a game
    Rank {
        #[arg(long)]
        game_id: GameId,
        #[arg(long)]
        player_id: PlayerId,
    },
    /// List every game id found across the shards
    Games,
    /// Ping every shard
    Health,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let args = Args::parse();

    let mut telemetry = TelemetryConfig::for_service("lb-admin");
    if args.verbose {
        telemetry = telemetry.with_log_level("debug");
    }
    init_tracing(&telemetry).context("failed to initialize logging")?;

    let config = build_config(&args)?;
    let metrics = Arc::new(Metrics::new());

    let ok = match &config.redis_url {
        Some(url) => {
            let ranked = RedisRankedSet::connect(url)
                .await
                .context("failed to connect to the ranked-set service")?;
            let service = open_service(&config, Arc::new(ranked))?.with_metrics(metrics.clone());
            run(&service, args.command, IndexScope::Shared).await?
        }
        None => {
            warn!("No ranked-set service configured; index changes end with this process");
            let ranked = Arc::new(InMemoryRankedSet::new());
            let service = open_service(&config, ranked)?.with_metrics(metrics.clone());
            run(&service, args.command, IndexScope::Process).await?
        }
    };
    debug!(metrics = ?metrics.snapshot(), "Done");
    Ok(if ok { ExitCode::SUCCESS } else { ExitCode::FAILURE })
}

fn build_config(args: &Args) -> Result<LeaderboardConfig> {
    let mut config = LeaderboardConfig::from_env();
    if let Some(shards) = args.shards {
        config.shard_count = shards;
    }
    if let Some(dir) = &args.data_dir {
        config.data_dir = dir.clone();
    }
    if let Some(prefix) = &args.prefix {
        config.connection_prefix = prefix.clone();
    }
    if let Some(url) = &args.redis_url {
        config.redis_url = Some(url.clone());
    }
    config.validate()?;
    Ok(config)
}

fn open_service<R: RankedSetStore>(
    config: &LeaderboardConfig,
    ranked: Arc<R>,
) -> Result<Service<R>> {
    let shard_count = config.shard_count()?;
    let shards = (0..shard_count)
        .map(|shard_id| {
            let name = connection_name(&config.connection_prefix, shard_id);
            SqliteShard::open_in_dir(&config.data_dir, name.as_str())
                .map(Arc::new)
                .with_context(|| format!("failed to open shard {}", name))
        })
        .collect::<Result<Vec<_>>>()?;

    info!(
        shards = shard_count,
        data_dir = %config.data_dir.display(),
        "Opened shard databases"
    );
    Ok(LeaderboardService::new(config, shards, ranked)?)
}

/// Execute one subcommand. `Ok(false)` means it ran but reported a failure.
async fn run<R: RankedSetStore + 'static>(
    service: &Service<R>,
    command: Command,
    scope: IndexScope,
) -> Result<bool> {
    match command {
        Command::Rebuild { game_id: Some(game_id) } => match service.rebuild_game(game_id).await {
            Ok(rebuild) => {
                println!(
                    "game {}: rebuilt ({} entries)",
                    rebuild.game_id, rebuild.entries_loaded
                );
                Ok(true)
            }
            Err(e) => {
                println!("game {}: FAILED ({})", game_id, e);
                Ok(false)
            }
        },
        Command::Rebuild { game_id: None } => {
            let report = service.rebuild_all().await?;
            print_report(&report);
            Ok(report.is_success())
        }
        Command::Store {
            player_id,
            game_id,
            score,
        } => match service.store_score(player_id, game_id, score).await {
            Ok(record) => {
                println!(
                    "stored player {} game {} score {}",
                    record.player_id, record.game_id, record.score
                );
                Ok(true)
            }
            Err(e @ LeaderboardError::IndexUpdateFailed { .. }) => {
                eprintln!("warning: {}", e);
                Ok(true)
            }
            Err(e) => Err(e.into()),
        },
        Command::Top {
            game_id,
            offset,
            limit,
        } => {
            if scope == IndexScope::Process {
                service.rebuild_game(game_id).await?;
            }
            let page = service.get_leaderboard(game_id, offset, limit).await?;
            if page.is_empty() {
                println!("game {}: no entries", game_id);
            }
            for entry in page {
                println!("{:>6}  player {:<12} {}", entry.rank, entry.player_id, entry.score);
            }
            Ok(true)
        }
        Command::Rank { game_id, player_id } => {
            if scope == IndexScope::Process {
                service.rebuild_game(game_id).await?;
            }
            let rank = service.get_player_rank(game_id, player_id).await?;
            match (rank.rank, rank.score) {
                (Some(position), Some(score)) => {
                    println!("player {} game {}: rank {} score {}", player_id, game_id, position, score)
                }
                _ => println!("player {} game {}: not ranked", player_id, game_id),
            }
            Ok(true)
        }
        Command::Games => {
            for game_id in service.store().scan_all_game_ids().await? {
                println!("{}", game_id);
            }
            Ok(true)
        }
        Command::Health => {
            let health = service.store().shard_health().await;
            let mut healthy = true;
            for shard in &health {
                match &shard.error {
                    None => println!("{} (shard {}): ok", shard.connection_name, shard.shard_id),
                    Some(error) => {
                        healthy = false;
                        println!(
                            "{} (shard {}): DOWN ({})",
                            shard.connection_name, shard.shard_id, error
                        );
                    }
                }
            }
            Ok(healthy)
        }
    }
}

fn print_report(report: &RebuildReport) {
    for rebuild in &report.rebuilt {
        println!(
            "game {}: rebuilt ({} entries)",
            rebuild.game_id, rebuild.entries_loaded
        );
    }
    for (game_id, error) in &report.failed {
        println!("game {}: FAILED ({})", game_id, error);
    }
    println!(
        "{} games, {} rebuilt, {} failed, {} entries",
        report.games_attempted,
        report.rebuilt.len(),
        report.failed.len(),
        report.total_entries()
    );
}
