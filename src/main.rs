mod cli;
mod output;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Command};
use tidysweep::config;
use tidysweep::{
    Category, Cleaner, Config, ConfigProvider, JsonConfigProvider, ProgressSink, TracingSink,
    TrashFailurePolicy,
};

fn init_logging(verbose: bool) {
    let default = if verbose { "tidysweep=debug" } else { "tidysweep=warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Restrict a config to one target key; `DEV_BLOAT` selects only the hunter.
fn only_category(mut cfg: Config, key: &str) -> Result<Config> {
    if key == "DEV_BLOAT" {
        cfg.targets.clear();
        cfg.dev_bloat_hunter = true;
        return Ok(cfg);
    }
    if Category::from_key(key).is_none() {
        anyhow::bail!("unknown category {key:?}");
    }
    cfg.targets = vec![key.to_string()];
    cfg.dev_bloat_hunter = false;
    Ok(cfg)
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config_path = match cli.config {
        Some(p) => p,
        None => config::default_config_path().context("could not determine config directory")?,
    };
    let provider = JsonConfigProvider::open(&config_path);
    let progress = |msg: &str| output::print_progress(msg);

    match cli.command {
        Command::Scan { category, json } => {
            let mut cfg = provider.config();
            if let Some(key) = category {
                cfg = only_category(cfg, &key)?;
            }
            let cleaner = Cleaner::system(cfg);
            // JSON runs report progress through the log only.
            let sink: &dyn ProgressSink = if json { &TracingSink } else { &progress };
            let snapshot = cleaner.scan(sink);

            if json {
                let text = serde_json::to_string_pretty(snapshot.as_ref())
                    .context("failed to serialize scan results")?;
                println!("{text}");
                return Ok(());
            }
            output::print_banner();
            output::print_snapshot(&snapshot);
            let disk = tidysweep::utils::home_dir()
                .and_then(|home| tidysweep::disk_info::get_disk_info(&home));
            output::print_summary(&snapshot, disk);
            output::print_dry_run_footer();
        }

        Command::Clean {
            confirm,
            category,
            permanent_fallback,
            no_empty_trash,
        } => {
            let mut cfg = provider.config();
            if let Some(key) = category {
                cfg = only_category(cfg, &key)?;
            }
            if permanent_fallback {
                cfg.trash_failure = TrashFailurePolicy::PermanentDelete;
            }
            if no_empty_trash {
                cfg.empty_recycle_bin = false;
            }

            output::print_banner();
            if !confirm {
                output::print_no_confirm_warning();
            }
            let cleaner = Cleaner::system(cfg);
            let snapshot = cleaner.scan(&progress);
            output::print_snapshot(&snapshot);

            if !confirm {
                output::print_summary(&snapshot, None);
                output::print_dry_run_footer();
                return Ok(());
            }
            if snapshot.is_empty() {
                output::print_info("Nothing to clean.");
                return Ok(());
            }
            let report = cleaner.clean(&snapshot.items, &progress);
            output::print_clean_report(&report);
        }

        Command::Config { init } => {
            let cfg = provider.config();
            if init {
                let path = provider.path();
                provider
                    .save()
                    .with_context(|| format!("failed to write {}", path.display()))?;
                output::print_info(&format!("wrote {}", path.display()));
            }
            println!(
                "{}",
                serde_json::to_string_pretty(&cfg).context("failed to serialize config")?
            );
        }
    }
    Ok(())
}
