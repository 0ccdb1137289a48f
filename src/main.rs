//! LogiTrack command-line front end.
//!
//! Usage: `logitrack [--data <path>] <command> [args...]`

use std::env;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use chrono::{Duration, Utc};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use logitrack::dispatch::{RouteCompletion, RouteCompletionService};
use logitrack::gamification::{RankingView, RuleTable, RuleUpdate};
use logitrack::reports;
use logitrack::routes::{ClientStatsAggregator, HistoryFilter, RouteLog};
use logitrack::storage::{self, config, AppConfig, CollectionStore, StorageBackend};

const USAGE: &str = "\
usage: logitrack [--data <path>] <command> [args...]

commands:
  rules                                 list scoring rules
  reset-rules                           restore the default rule set
  toggle <rule-id> <on|off>             enable or disable a rule
  ranking                               messenger leaderboard
  history [messenger-id]                completed stops, newest first
  stats <client-id>                     duration statistics of a client
  export-history <file>                 write route history as CSV
  complete <messenger-id> <vehicle-id> <minutes> <rating> <client-id>...
                                        close a route that just arrived";

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let mut args: Vec<String> = env::args().skip(1).collect();
    let data_path = take_option(&mut args, "--data")?;

    if args.is_empty() || args[0] == "help" || args[0] == "--help" {
        println!("{USAGE}");
        return Ok(());
    }

    let mut config = config::load_config().context("failed to load configuration")?;
    if let Some(path) = data_path {
        config.storage.backend = backend_for(&path);
        config.storage.path = Some(path);
    }

    let store = storage::open_store(&config).context("failed to open data store")?;
    run(&args[0], &args[1..], store, &config)
}

/// Remove `--name <value>` from the argument list.
fn take_option(args: &mut Vec<String>, name: &str) -> Result<Option<PathBuf>> {
    let Some(index) = args.iter().position(|a| a == name) else {
        return Ok(None);
    };
    if index + 1 >= args.len() {
        bail!("{name} requires a value");
    }
    let value = args.remove(index + 1);
    args.remove(index);
    Ok(Some(PathBuf::from(value)))
}

fn backend_for(path: &std::path::Path) -> StorageBackend {
    match path.extension().and_then(|e| e.to_str()) {
        Some("db") | Some("sqlite") | Some("sqlite3") => StorageBackend::Sqlite,
        _ => StorageBackend::Json,
    }
}

fn run(command: &str, args: &[String], store: Arc<dyn CollectionStore>, config: &AppConfig) -> Result<()> {
    match (command, args) {
        ("rules", []) => {
            for rule in RuleTable::new(store).get_rules()? {
                println!(
                    "{:<16} {:<24} {:<4} +{:<4} -{:<4} {}",
                    rule.id,
                    rule.kind.to_string(),
                    if rule.enabled { "on" } else { "off" },
                    rule.points_awarded,
                    rule.points_deducted,
                    rule.description
                );
            }
        }
        ("reset-rules", []) => {
            let rules = RuleTable::new(store).reset_rules()?;
            println!("Restored {} default rules", rules.len());
        }
        ("toggle", [rule_id, state]) => {
            let enabled = match state.as_str() {
                "on" => true,
                "off" => false,
                other => bail!("expected on or off, got {other}"),
            };
            let update = RuleUpdate {
                enabled: Some(enabled),
                ..Default::default()
            };
            let rule = RuleTable::new(store).update_rule(rule_id, update)?;
            println!("{} is now {}", rule.id, if rule.enabled { "on" } else { "off" });
        }
        ("ranking", []) => {
            for row in RankingView::new(store).messenger_ranking()? {
                println!("{:>3}. {:<30} {:>7}", row.rank, row.name, row.points);
            }
        }
        ("history", rest) if rest.len() <= 1 => {
            let filter = match rest.first() {
                Some(id) => HistoryFilter::for_messenger(id),
                None => HistoryFilter::default(),
            };
            for record in RouteLog::new(store).route_history(&filter)? {
                println!(
                    "{} {:<24} {:<24} {:>4} min {} stars {:+} pts",
                    record.completed_at.format("%Y-%m-%d %H:%M"),
                    record.messenger_name,
                    record.client_name,
                    record.duration,
                    record.star_rating,
                    record.points_earned
                );
            }
        }
        ("stats", [client_id]) => {
            match ClientStatsAggregator::new(store).client_route_stats(client_id)? {
                Some(stats) => println!(
                    "{}: {} routes, average {:.1} min, fastest {:.1}, slowest {:.1}",
                    stats.client_name,
                    stats.total_routes,
                    stats.average_duration,
                    stats.fastest_duration,
                    stats.slowest_duration
                ),
                None => println!("No routes recorded for client {client_id}"),
            }
        }
        ("export-history", [file]) => {
            let records = RouteLog::new(store).route_history(&HistoryFilter::default())?;
            reports::export_route_history_to_file(&records, std::path::Path::new(file))
                .with_context(|| format!("failed to export history to {file}"))?;
            println!("Exported {} records to {}", records.len(), file);
        }
        ("complete", [messenger_id, vehicle_id, minutes, rating, stops @ ..]) if !stops.is_empty() => {
            let minutes: i64 = minutes
                .parse()
                .with_context(|| format!("invalid minutes: {minutes}"))?;
            let rating: u8 = rating
                .parse()
                .with_context(|| format!("invalid rating: {rating}"))?;

            let arrival = Utc::now();
            let completion = RouteCompletion {
                messenger_id: messenger_id.clone(),
                vehicle_id: vehicle_id.clone(),
                stops: stops.to_vec(),
                departure: arrival - Duration::minutes(minutes),
                arrival,
                star_rating: rating,
                note: String::new(),
                completed_by: env::var("USER").unwrap_or_else(|_| "cli".to_string()),
            };

            let service = RouteCompletionService::new(store, &config.scoring)?;
            let outcome = service.complete_route(&completion)?;
            println!(
                "Recorded {} stops at {} min each ({} stars{}): {:+} points, streak bonus {}",
                outcome.history_ids.len(),
                outcome.per_stop_minutes,
                outcome.effective_rating,
                if outcome.defaulted_rating { ", default" } else { "" },
                outcome.route_points,
                outcome.streak_bonus
            );
        }
        _ => bail!("invalid command: {command}\n\n{USAGE}"),
    }

    Ok(())
}
