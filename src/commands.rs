//! One-shot subcommands.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Subcommand;
use dbwatch_client::{ConfigService, MonitoringService};
use dbwatch_types::{Category, ConfigDocument, ConfigSet};
use tracing::{info, warn};

use crate::data::{snapshot_report, Thresholds};
use crate::settings::Settings;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Fetch one snapshot and print it as JSON with a derived summary
    Fetch {
        /// Category to fetch (kafka, redis, mysql, postgresql); all when omitted
        category: Option<Category>,

        /// Pretty-print the JSON
        #[arg(long)]
        pretty: bool,
    },

    /// Check that the backend is up; exits non-zero when it is not
    Health,

    /// Manage the backend's per-category YAML configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Download all four documents into a directory
    Pull {
        #[arg(long)]
        dir: Option<PathBuf>,
    },

    /// Upload all four documents from a directory
    Push {
        #[arg(long)]
        dir: Option<PathBuf>,

        /// Upload even if a document fails validation
        #[arg(long)]
        force: bool,
    },

    /// Check the documents in a directory without uploading
    Validate {
        #[arg(long)]
        dir: Option<PathBuf>,
    },

    /// Write the default templates into a directory
    Init {
        #[arg(long)]
        dir: Option<PathBuf>,

        /// Overwrite existing files
        #[arg(long)]
        force: bool,
    },

    /// Print the backend's document for one category
    Show { category: Category },
}

/// Run a subcommand. `Ok(false)` means it ran but the outcome was a failure.
pub async fn run(command: Command, settings: &Settings) -> Result<bool> {
    match command {
        Command::Fetch { category, pretty } => fetch(settings, category, pretty).await,
        Command::Health => health(settings).await,
        Command::Config(command) => config(settings, command).await,
    }
}

async fn fetch(settings: &Settings, category: Option<Category>, pretty: bool) -> Result<bool> {
    let service = MonitoringService::new(settings.api_client()?);
    let thresholds = Thresholds::default();

    let report = match category {
        Some(category) => {
            let snapshot = service
                .fetch(category)
                .await
                .with_context(|| format!("failed to fetch {category} metrics"))?;
            snapshot_report(&snapshot, &thresholds)
        }
        None => {
            let snapshots = service
                .fetch_all()
                .await
                .context("failed to fetch metrics")?;
            serde_json::Value::Array(
                snapshots
                    .iter()
                    .map(|s| snapshot_report(s, &thresholds))
                    .collect(),
            )
        }
    };

    let json = if pretty {
        serde_json::to_string_pretty(&report)?
    } else {
        serde_json::to_string(&report)?
    };
    println!("{json}");
    Ok(true)
}

async fn health(settings: &Settings) -> Result<bool> {
    let service = MonitoringService::new(settings.api_client()?);
    match service.health().await {
        Ok(health) => {
            println!("{}: {}", health.status, health.message);
            Ok(health.is_healthy())
        }
        Err(e) => {
            println!("unreachable: {e}");
            Ok(false)
        }
    }
}

async fn config(settings: &Settings, command: ConfigCommand) -> Result<bool> {
    let dir_or_default = |dir: Option<PathBuf>| dir.unwrap_or_else(|| settings.config_dir.clone());

    match command {
        ConfigCommand::Pull { dir } => {
            let dir = dir_or_default(dir);
            let set = ConfigService::new(settings.api_client()?)
                .get_all()
                .await
                .context("failed to download configuration")?;
            for path in write_config_dir(&dir, &set, true)? {
                println!("wrote {}", path.display());
            }
            Ok(true)
        }
        ConfigCommand::Push { dir, force } => {
            let dir = dir_or_default(dir);
            let set = read_config_dir(&dir)?;
            check_before_push(&set, force)?;
            ConfigService::new(settings.api_client()?)
                .save_all(&set)
                .await
                .context("failed to upload configuration")?;
            info!(dir = %dir.display(), "configuration pushed");
            println!("pushed {} documents from {}", Category::ALL.len(), dir.display());
            Ok(true)
        }
        ConfigCommand::Validate { dir } => {
            let set = read_config_dir(&dir_or_default(dir))?;
            for doc in set.iter() {
                match doc.validate() {
                    Ok(()) => println!("{:<12} valid", doc.category.slug()),
                    Err(e) => println!("{:<12} invalid: {e}", doc.category.slug()),
                }
            }
            Ok(set.all_valid())
        }
        ConfigCommand::Init { dir, force } => {
            let dir = dir_or_default(dir);
            for path in write_config_dir(&dir, &ConfigSet::templates(), force)? {
                println!("wrote {}", path.display());
            }
            Ok(true)
        }
        ConfigCommand::Show { category } => {
            let doc = ConfigService::new(settings.api_client()?)
                .get(category)
                .await
                .with_context(|| format!("failed to download {category} configuration"))?;
            print!("{}", doc.text);
            if !doc.text.ends_with('\n') {
                println!();
            }
            Ok(true)
        }
    }
}

/// Refuse an invalid set unless forced.
fn check_before_push(set: &ConfigSet, force: bool) -> Result<()> {
    let errors = set.errors();
    if errors.is_empty() {
        return Ok(());
    }
    if force {
        for e in &errors {
            warn!("pushing anyway: {e}");
        }
        return Ok(());
    }
    let messages: Vec<String> = errors.iter().map(ToString::to_string).collect();
    bail!(
        "refusing to push invalid configuration ({}); use --force to override",
        messages.join("; ")
    )
}

/// Write every document of `set` into `dir` as `<slug>.yaml`.
///
/// Without `overwrite`, fails before writing anything if a file exists.
pub fn write_config_dir(dir: &Path, set: &ConfigSet, overwrite: bool) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(dir).with_context(|| format!("failed to create {}", dir.display()))?;

    let paths: Vec<(PathBuf, &ConfigDocument)> = set
        .iter()
        .map(|doc| (dir.join(ConfigDocument::file_name(doc.category)), doc))
        .collect();

    if !overwrite {
        if let Some((existing, _)) = paths.iter().find(|(p, _)| p.exists()) {
            bail!("{} already exists; use --force to overwrite", existing.display());
        }
    }

    for (path, doc) in &paths {
        fs::write(path, &doc.text).with_context(|| format!("failed to write {}", path.display()))?;
    }
    Ok(paths.into_iter().map(|(p, _)| p).collect())
}

/// Read all four `<slug>.yaml` documents from `dir`.
pub fn read_config_dir(dir: &Path) -> Result<ConfigSet> {
    let mut set = ConfigSet::templates();
    for category in Category::ALL {
        let path = dir.join(ConfigDocument::file_name(category));
        let text = fs::read_to_string(&path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        set.set(category, text);
    }
    Ok(set)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::Overrides;

    #[test]
    fn test_init_then_read_back() {
        let dir = tempfile::tempdir().unwrap();
        let written = write_config_dir(dir.path(), &ConfigSet::templates(), false).unwrap();

        assert_eq!(written.len(), 4);
        assert!(dir.path().join("postgresql.yaml").exists());
        assert_eq!(read_config_dir(dir.path()).unwrap(), ConfigSet::templates());
    }

    #[test]
    fn test_init_refuses_to_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("redis.yaml"), "mine: true\n").unwrap();

        let err = write_config_dir(dir.path(), &ConfigSet::templates(), false).unwrap_err();
        assert!(err.to_string().contains("already exists"));
        // nothing else was written
        assert!(!dir.path().join("kafka.yaml").exists());
        assert_eq!(
            fs::read_to_string(dir.path().join("redis.yaml")).unwrap(),
            "mine: true\n"
        );

        write_config_dir(dir.path(), &ConfigSet::templates(), true).unwrap();
        assert_ne!(
            fs::read_to_string(dir.path().join("redis.yaml")).unwrap(),
            "mine: true\n"
        );
    }

    #[test]
    fn test_read_missing_file_names_it() {
        let dir = tempfile::tempdir().unwrap();
        write_config_dir(dir.path(), &ConfigSet::templates(), false).unwrap();
        fs::remove_file(dir.path().join("mysql.yaml")).unwrap();

        let err = read_config_dir(dir.path()).unwrap_err();
        assert!(format!("{err:#}").contains("mysql.yaml"));
    }

    #[test]
    fn test_check_before_push() {
        let mut set = ConfigSet::templates();
        assert!(check_before_push(&set, false).is_ok());

        set.set(Category::Kafka, "just words");
        let err = check_before_push(&set, false).unwrap_err();
        assert!(err.to_string().contains("kafka"));
        assert!(check_before_push(&set, true).is_ok());
    }

    #[tokio::test]
    async fn test_validate_reports_invalid_dir() {
        let dir = tempfile::tempdir().unwrap();
        let mut set = ConfigSet::templates();
        set.set(Category::Redis, "");
        write_config_dir(dir.path(), &set, false).unwrap();

        let settings = Settings::load_from(None, Some(Default::default()), &Overrides::default())
            .unwrap();
        let ok = config(
            &settings,
            ConfigCommand::Validate {
                dir: Some(dir.path().to_path_buf()),
            },
        )
        .await
        .unwrap();
        assert!(!ok);
    }

    #[tokio::test]
    async fn test_push_invalid_never_contacts_backend() {
        let dir = tempfile::tempdir().unwrap();
        let mut set = ConfigSet::templates();
        set.set(Category::Mysql, "no colon here");
        write_config_dir(dir.path(), &set, false).unwrap();

        // nothing listens here; an attempted request would fail differently
        let settings = Settings::load_from(
            None,
            Some(Default::default()),
            &Overrides {
                base_url: Some("http://127.0.0.1:9".to_string()),
                log_file: None,
            },
        )
        .unwrap();
        let err = config(
            &settings,
            ConfigCommand::Push {
                dir: Some(dir.path().to_path_buf()),
                force: false,
            },
        )
        .await
        .unwrap_err();
        assert!(err.to_string().contains("refusing to push"));
    }
}
