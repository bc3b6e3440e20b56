use std::io;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Result};
use serde_json::{json, Value};

use crate::attacks::dice::{Dice, RngDice};
use crate::attacks::selector::{AttackSelector, SelectionMode};
use crate::attacks::AttackType;
use crate::cli::flags::{Cli, Command};
use crate::config::{load_config, AppConfig};
use crate::core::engine::{Trainer, TrainerSettings};
use crate::core::remote_store::RemoteStore;
use crate::core::store::{Store, PROGRESS_KEY};
use crate::core::types::PhishResult;
use crate::core::url::{join, split};
use crate::progress::telemetry::{TelemetrySink, TracingTelemetry};
use crate::progress::{LoadOptions, ProgressMachine, StoreGateway};
use crate::sources::bundled::BundledList;
use crate::sources::remote::RemoteList;
use crate::sources::{FallbackSource, UrlSource};
use crate::ui::terminal::run_play;

pub async fn run(cli: Cli) -> Result<()> {
    let cfg = resolve_config(&cli)?;

    match cli.command {
        Command::Play => run_play_cmd(&cfg, cli.seed).await,
        Command::Stats { json } => run_stats(&cfg, json).await,
        Command::Drill { count, attack } => {
            run_drill(&cfg, cli.seed, count, attack.map(AttackType::from))
        }
        Command::Sync => run_sync(&cfg).await,
    }
}

/// Config file first, then command-line overrides.
pub fn resolve_config(cli: &Cli) -> Result<AppConfig> {
    let mut cfg = load_config(cli.config.as_deref())?;
    if let Some(path) = &cli.db_path {
        cfg.db_path = path.display().to_string();
    }
    if let Some(path) = &cli.remote {
        cfg.remote_store_path = Some(path.display().to_string());
    }
    if cli.offline {
        cfg.remote_store_path = None;
    }
    if let Some(url) = &cli.phish_list {
        cfg.phish_list_url = Some(url.clone());
    }
    if let Some(mode) = cli.mode {
        cfg.selection = mode.into();
    }
    cfg.validate()?;
    Ok(cfg)
}

fn make_dice(seed: Option<u64>) -> Box<dyn Dice> {
    match seed {
        Some(seed) => Box::new(RngDice::seeded(seed)),
        None => Box::new(RngDice::from_entropy()),
    }
}

pub fn build_gateway(cfg: &AppConfig) -> Result<Arc<StoreGateway>> {
    let store = Store::open(Path::new(&cfg.db_path))?;
    let remote = cfg
        .remote_store_path
        .as_deref()
        .map(|path| RemoteStore::file(Path::new(path)))
        .transpose()?;
    Ok(Arc::new(StoreGateway::new(store, remote)))
}

pub async fn open_progress(cfg: &AppConfig, gateway: Arc<StoreGateway>) -> ProgressMachine {
    let telemetry: Arc<dyn TelemetrySink> = Arc::new(TracingTelemetry);
    let options = LoadOptions {
        slot: cfg.remote_slot,
        remote_timeout: Duration::from_millis(cfg.remote_timeout_ms),
    };
    ProgressMachine::open(gateway, Some(telemetry), options).await
}

pub fn bundled_list(cfg: &AppConfig) -> Result<BundledList> {
    match &cfg.url_file {
        Some(path) => Ok(BundledList::from_file(Path::new(path))?),
        None => Ok(BundledList::new(cfg.bundled_urls.clone())),
    }
}

/// Bundled list, cycled; an HTTP feed goes in front of it when configured.
pub fn build_source(cfg: &AppConfig, dice: &mut dyn Dice) -> Result<Box<dyn UrlSource>> {
    let bundled = bundled_list(cfg)?.shuffled(dice).cycling();
    let Some(feed_url) = &cfg.phish_list_url else {
        return Ok(Box::new(bundled));
    };
    let client = reqwest::Client::builder()
        .user_agent(cfg.user_agent.clone())
        .timeout(Duration::from_millis(cfg.http_timeout_ms))
        .build()?;
    let remote = RemoteList::new(
        client,
        feed_url.clone(),
        Duration::from_millis(cfg.refetch_interval_ms),
    );
    Ok(Box::new(FallbackSource::new(
        Box::new(remote),
        Box::new(bundled),
    )))
}

async fn run_play_cmd(cfg: &AppConfig, seed: Option<u64>) -> Result<()> {
    let mut dice = make_dice(seed);
    let source = build_source(cfg, dice.as_mut())?;
    let gateway = build_gateway(cfg)?;
    let mut progress = open_progress(cfg, gateway).await;

    if !progress.state().app_started {
        println!("Welcome! Each round shows a URL. Some are genuine, some were tampered with.");
        progress.start_finished().await?;
    }

    let mut trainer = Trainer::new(
        source,
        AttackSelector::new(cfg.selection),
        dice,
        progress,
        TrainerSettings::from(cfg),
    )?;
    let stdin = io::stdin();
    let mut input = stdin.lock();
    let mut out = io::stdout();
    let session = run_play(&mut trainer, &mut input, &mut out).await?;
    tracing::info!(
        rounds = session.rounds,
        correct = session.correct,
        level = trainer.level(),
        "session finished"
    );
    Ok(())
}

async fn run_stats(cfg: &AppConfig, as_json: bool) -> Result<()> {
    let gateway = build_gateway(cfg)?;
    let saved_at = gateway.local().saved_at(PROGRESS_KEY)?;
    let progress = open_progress(cfg, gateway).await;
    let state = *progress.state();

    if as_json {
        let results: serde_json::Map<String, Value> = PhishResult::ALL
            .iter()
            .map(|r| (r.record_name().to_string(), json!(state.count(*r))))
            .collect();
        let doc = json!({
            "level": state.level,
            "results": results,
            "app_started": state.app_started,
            "phish_behind": state.phish_behind,
            "detection_rate": state.detection_rate(),
            "saved_at": saved_at,
        });
        println!("{}", serde_json::to_string_pretty(&doc)?);
        return Ok(());
    }

    println!("level            {}", state.level);
    for result in PhishResult::ALL {
        println!("{:<16} {}", result.record_name(), state.count(result));
    }
    println!(
        "detection rate   {:.1}%",
        state.detection_rate() * 100.0
    );
    match saved_at {
        Some(at) => println!("last saved       {}", at.to_rfc3339()),
        None => println!("last saved       never"),
    }
    Ok(())
}

fn run_drill(
    cfg: &AppConfig,
    seed: Option<u64>,
    count: usize,
    attack: Option<AttackType>,
) -> Result<()> {
    let mut dice = make_dice(seed);
    let urls: Vec<String> = bundled_list(cfg)?.urls().cloned().collect();
    let lines = drill(
        &urls,
        count,
        attack,
        cfg.max_resamples,
        dice.as_mut(),
    );
    if lines.is_empty() && count > 0 {
        return Err(anyhow!("no bundled url accepts the requested attack"));
    }
    for line in lines {
        println!("{line}");
    }
    Ok(())
}

/// Generates up to `count` attacked URLs from `urls`, cycling through them.
/// Gives up after `count * max_resamples` unusable candidates.
pub fn drill(
    urls: &[String],
    count: usize,
    attack: Option<AttackType>,
    max_resamples: usize,
    dice: &mut dyn Dice,
) -> Vec<Value> {
    let mut selector = AttackSelector::new(SelectionMode::Random);
    let mut lines = Vec::with_capacity(count);
    let budget = count.saturating_mul(max_resamples.max(1));

    for url in urls.iter().cycle().take(budget) {
        if lines.len() >= count {
            break;
        }
        let parts = match split(url) {
            Ok(parts) => parts,
            Err(err) => {
                tracing::debug!("skipping {}: {}", url, err);
                continue;
            }
        };
        let attack = attack.unwrap_or_else(|| selector.pick(0, dice));
        match attack.apply(&parts, dice) {
            Ok(shown) => {
                let shown_url = join(&shown);
                lines.push(json!({
                    "source": url,
                    "shown": shown_url,
                    "attack": attack.name(),
                    "parts": shown.to_vec(),
                    "attack_indices": attack.attack_indices(),
                    "edit_distance": strsim::levenshtein(url, &shown_url),
                }));
            }
            Err(err) => tracing::debug!("skipping {}: {}", url, err),
        }
    }
    lines
}

async fn run_sync(cfg: &AppConfig) -> Result<()> {
    let gateway = build_gateway(cfg)?;
    if gateway.remote().is_none() {
        return Err(anyhow!(
            "no remote store configured; set remote_store_path or pass --remote"
        ));
    }
    let mut progress = open_progress(cfg, gateway).await;
    progress.sync().await?;
    let state = progress.state();
    println!(
        "synced: level {}, {} rounds, detection rate {:.1}%",
        state.level,
        state.total_rounds(),
        state.detection_rate() * 100.0
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attacks::dice::ScriptedDice;
    use crate::cli::flags::Cli;
    use clap::Parser;

    #[test]
    fn drill_cycles_and_skips_malformed() {
        let urls = vec![
            "not a url".to_string(),
            "https://www.example.com/login".to_string(),
        ];
        let mut dice = ScriptedDice::default();
        let lines = drill(&urls, 3, Some(AttackType::TldSwap), 8, &mut dice);
        assert_eq!(lines.len(), 3);
        for line in &lines {
            assert_eq!(line["attack"], "tld-swap");
            assert_eq!(line["source"], "https://www.example.com/login");
            assert_eq!(line["shown"], "https://www.example.net/login");
            assert_eq!(line["attack_indices"], json!([4]));
        }
    }

    #[test]
    fn drill_gives_up_when_nothing_fits() {
        let urls = vec!["https://xyz.com".to_string()];
        let mut dice = ScriptedDice::default();
        let lines = drill(&urls, 2, Some(AttackType::Homoglyph), 3, &mut dice);
        assert!(lines.is_empty());
    }

    #[test]
    fn flags_override_config() {
        let dir = tempfile::tempdir().unwrap();
        let db = dir.path().join("p.db");
        let remote = dir.path().join("remote.json");
        let cli = Cli::try_parse_from([
            "phish-trainer",
            "--config",
            dir.path().join("missing.toml").to_str().unwrap(),
            "--db-path",
            db.to_str().unwrap(),
            "--remote",
            remote.to_str().unwrap(),
            "--mode",
            "sequential",
            "stats",
        ])
        .unwrap();
        let cfg = resolve_config(&cli).unwrap();
        assert_eq!(cfg.db_path, db.display().to_string());
        assert_eq!(cfg.remote_store_path, Some(remote.display().to_string()));
        assert_eq!(cfg.selection, SelectionMode::Sequential);
    }

    #[test]
    fn offline_drops_remote() {
        let cli = Cli::try_parse_from([
            "phish-trainer",
            "--config",
            "does/not/exist.toml",
            "--remote",
            "data/remote.json",
            "--offline",
            "sync",
        ])
        .unwrap();
        let cfg = resolve_config(&cli).unwrap();
        assert!(cfg.remote_store_path.is_none());
    }
}
