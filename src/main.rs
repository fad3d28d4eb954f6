use anyhow::{anyhow, Context};
use chrono::Utc;
use clap::{Arg, Command};
use log::LevelFilter;
use mailgate::handoff::{needs_ai_items, to_batch_prompt};
use mailgate::{
    EmailRecord, GatewayConfig, GatewayEngine, GatewayStats, RulesSnapshot, SnapshotCache,
};
use serde::de::DeserializeOwned;
use std::path::Path;
use std::process;

fn main() {
    let matches = Command::new("mailgate")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Deterministic email classification gateway")
        .long_about(
            "mailgate decides incoming emails from curated contact lists and learned\n\
             classification rules, and hands everything it cannot decide to an AI\n\
             classifier as a minimal batch item.",
        )
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("Configuration file path (.yaml, .toml or .json)")
                .default_value(GatewayConfig::default_path()),
        )
        .arg(
            Arg::new("generate-config")
                .long("generate-config")
                .value_name("FILE")
                .help("Generate a sample configuration file")
                .action(clap::ArgAction::Set),
        )
        .arg(
            Arg::new("test-config")
                .long("test-config")
                .help("Load configuration and tables, print counts and exit")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("email")
                .long("email")
                .value_name("FILE")
                .help("Evaluate one email record (JSON or YAML) and print the decision")
                .action(clap::ArgAction::Set),
        )
        .arg(
            Arg::new("raw")
                .long("raw")
                .help("Treat the --email file as a raw RFC 5322 message")
                .requires("email")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("batch")
                .long("batch")
                .value_name("FILE")
                .help("Evaluate an array of email records and print the decisions")
                .action(clap::ArgAction::Set),
        )
        .arg(
            Arg::new("handoff")
                .long("handoff")
                .help("With --batch, print AI batch items for undecided emails instead")
                .requires("batch")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("digest")
                .long("digest")
                .help("Print the rules snapshot version and digest")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Enable verbose logging with per-match traces")
                .action(clap::ArgAction::SetTrue),
        )
        .get_matches();

    let verbose = matches.get_flag("verbose");
    let log_level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    env_logger::Builder::from_default_env()
        .filter_level(log_level)
        .init();

    if let Some(generate_path) = matches.get_one::<String>("generate-config") {
        generate_default_config(generate_path);
        return;
    }

    let config_path = matches
        .get_one::<String>("config")
        .map(String::as_str)
        .unwrap_or(GatewayConfig::default_path());

    let config = match load_config(config_path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error loading configuration: {e:#}");
            process::exit(1);
        }
    };

    if !verbose {
        apply_config_log_level(&config);
    }

    if matches.get_flag("test-config") {
        test_config(&config);
        return;
    }

    let cache = SnapshotCache::new(config.snapshot.ttl_hours);

    if matches.get_flag("digest") {
        print_digest(&cache.get(&config, Utc::now()));
        return;
    }

    let engine = match build_engine(&config, &cache) {
        Ok(engine) => engine,
        Err(e) => {
            eprintln!("Error loading contact lists: {e:#}");
            process::exit(1);
        }
    };

    let result = if let Some(email_file) = matches.get_one::<String>("email") {
        evaluate_email_file(&engine, email_file, matches.get_flag("raw"))
    } else if let Some(batch_file) = matches.get_one::<String>("batch") {
        evaluate_batch_file(&engine, batch_file, matches.get_flag("handoff"))
    } else {
        Err(anyhow!(
            "nothing to do; use --email, --batch, --digest or --test-config"
        ))
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

fn load_config(path: &str) -> anyhow::Result<GatewayConfig> {
    if Path::new(path).exists() {
        GatewayConfig::from_file(path)
    } else {
        log::warn!("Configuration file '{path}' not found, using default configuration");
        Ok(GatewayConfig::default())
    }
}

fn generate_default_config(path: &str) {
    let config = GatewayConfig::sample();
    match config.to_file(path) {
        Ok(()) => {
            println!("Sample configuration written to: {path}");
            println!("Please edit the contact lists and rules to suit your mailbox.");
        }
        Err(e) => {
            eprintln!("Error writing configuration file: {e}");
            process::exit(1);
        }
    }
}

/// `logging.level` from the config can only quieten the logger; `--verbose`
/// or `RUST_LOG` are needed for debug output.
fn apply_config_log_level(config: &GatewayConfig) {
    let Some(logging) = &config.logging else {
        return;
    };
    match logging.level.parse::<LevelFilter>() {
        Ok(level) => log::set_max_level(level.min(LevelFilter::Info)),
        Err(_) => log::warn!("Ignoring unknown log level '{}'", logging.level),
    }
}

fn test_config(config: &GatewayConfig) {
    println!("🔍 Testing configuration...");
    println!();

    let contacts = match config.contact_lists() {
        Ok(contacts) => contacts,
        Err(e) => {
            println!("❌ Contact lists failed to load: {e:#}");
            process::exit(1);
        }
    };
    let rules = match config.classification_rules() {
        Ok(rules) => rules,
        Err(e) => {
            println!("❌ Classification rules failed to load: {e:#}");
            process::exit(1);
        }
    };

    println!("Number of contact list entries: {}", contacts.len());
    println!("Number of classification rules: {}", rules.len());
    if let Some(path) = config.rules_path() {
        println!("Rules file: {}", path.display());
    }
    println!("Snapshot TTL: {}h", config.snapshot.ttl_hours);
    println!("✅ Configuration is valid");
}

fn print_digest(snapshot: &RulesSnapshot) {
    println!("RULES VERSION: {}", snapshot.version);
    println!("RULES COUNT: {}", snapshot.rules_count);
    if snapshot.rules.is_empty() {
        println!("📭 No classification rules loaded");
        return;
    }
    println!("TOTAL SUPPORT: {}", snapshot.total_support);
    println!("AVG PRECISION: {:.1}%", snapshot.avg_precision);
    println!("{}", snapshot.digest);
}

fn build_engine(config: &GatewayConfig, cache: &SnapshotCache) -> anyhow::Result<GatewayEngine> {
    let snapshot = cache.get(config, Utc::now());
    Ok(GatewayEngine::new(config.contact_lists()?, snapshot.rules))
}

/// JSON for `.json` files, YAML for anything else.
fn read_records<T: DeserializeOwned>(path: &str) -> anyhow::Result<T> {
    let content =
        std::fs::read_to_string(path).with_context(|| format!("reading email file {path}"))?;
    let is_json = Path::new(path)
        .extension()
        .and_then(|s| s.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

    if is_json {
        serde_json::from_str(&content).with_context(|| format!("parsing {path} as JSON"))
    } else {
        serde_yaml::from_str(&content).with_context(|| format!("parsing {path} as YAML"))
    }
}

fn evaluate_email_file(engine: &GatewayEngine, path: &str, raw: bool) -> anyhow::Result<()> {
    let email = if raw {
        let content =
            std::fs::read_to_string(path).with_context(|| format!("reading email file {path}"))?;
        EmailRecord::from_raw_message(&content)
    } else {
        read_records::<EmailRecord>(path)?
    };

    let decision = engine.evaluate(&email);
    log::info!(
        "{} -> {}",
        decision.message_id,
        decision.classification_source
    );
    println!("{}", serde_json::to_string_pretty(&decision)?);
    Ok(())
}

fn evaluate_batch_file(engine: &GatewayEngine, path: &str, handoff: bool) -> anyhow::Result<()> {
    let emails: Vec<EmailRecord> = read_records(path)?;
    let decisions = engine.evaluate_batch(&emails);

    if handoff {
        let items = needs_ai_items(&emails, &decisions);
        log::info!(
            "{} of {} emails handed off to the AI classifier",
            items.len(),
            emails.len()
        );
        println!("{}", to_batch_prompt(&items)?);
        return Ok(());
    }

    println!("{}", serde_json::to_string_pretty(&decisions)?);

    let mut stats = GatewayStats::new();
    stats.record_all(&decisions);
    eprintln!("📊 Gateway Statistics");
    for line in stats.summary() {
        eprintln!("  {line}");
    }
    Ok(())
}
