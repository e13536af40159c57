//! Initialize an actor as a Beyonder and persist it.

use std::path::PathBuf;

use anyhow::{Context, Result};
use beyonder_core::{ActorFlags, ActorId, PathwayId, Tier};
use beyonder_runtime::{Runtime, RuntimeConfig, RuntimeError};
use clap::Parser;
use console::style;

use super::{load_content, resolve_data_dir};
use crate::config::CliConfig;

/// Make an actor a Beyonder and write its save
#[derive(Parser)]
pub struct Init {
    /// Actor id
    #[arg(value_name = "ACTOR")]
    actor: u32,

    /// Pathway key (namespace:path)
    #[arg(short, long, default_value = "lotm:seer")]
    pathway: String,

    /// Tier, 9 (weakest) to 0 (strongest)
    #[arg(short, long, default_value_t = 9, value_parser = clap::value_parser!(u8).range(0..=9))]
    tier: u8,

    /// Save directory (defaults to platform-specific location)
    #[arg(short, long, value_name = "DIR")]
    data_dir: Option<PathBuf>,

    /// Content directory (defaults to embedded content)
    #[arg(long, value_name = "DIR")]
    content_dir: Option<PathBuf>,
}

impl Init {
    pub async fn execute(self, config: &CliConfig) -> Result<()> {
        let content = load_content(self.content_dir.as_deref(), config)?;
        let data_dir = resolve_data_dir(self.data_dir, config);
        let pathway = PathwayId::new(self.pathway.as_str()).context("Invalid pathway key")?;
        let tier = Tier::new(self.tier)?;
        let actor = ActorId(self.actor);

        let runtime = Runtime::builder()
            .config(RuntimeConfig {
                save_dir: Some(data_dir.clone()),
                ..RuntimeConfig::default()
            })
            .content(&content)
            .build()
            .await?;
        let handle = runtime.handle();

        // Keep presets and cooldowns of an existing save.
        match handle.load(actor).await {
            Ok(report) if !report.is_clean() => {
                tracing::warn!("Existing save had {} stale entries", report.total());
            }
            Ok(_) => tracing::info!("Re-initializing existing save of actor {}", actor),
            Err(RuntimeError::SaveNotFound(_)) => {
                handle.attach(actor, ActorFlags::empty()).await?;
            }
            Err(e) => return Err(e.into()),
        }

        handle.initialize(actor, pathway.clone(), tier).await?;
        handle.save(actor).await?;

        let state = handle
            .query_actor(actor)
            .await?
            .context("Actor vanished after initialization")?;

        println!(
            "{} actor {} is now {} at tier {}",
            style("Initialized:").bold().green(),
            actor,
            pathway,
            tier
        );
        println!("{} {}", style("Save directory:").bold().cyan(), data_dir.display());
        println!(
            "{} {:.1}",
            style("Spirituality:").bold().cyan(),
            state.resource.current()
        );
        println!("{}", style("Learned skills:").bold().yellow());
        for skill in state.ability.learned() {
            let marker = if state.ability.is_active(skill) {
                " (active)"
            } else {
                ""
            };
            println!("  {}{}", skill, marker);
        }

        drop(handle);
        runtime.shutdown().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use beyonder_runtime::{ActorRepository, FileActorRepo};

    fn init(dir: &std::path::Path, tier: u8) -> Init {
        Init {
            actor: 3,
            pathway: "lotm:seer".to_owned(),
            tier,
            data_dir: Some(dir.to_path_buf()),
            content_dir: None,
        }
    }

    #[tokio::test]
    async fn writes_and_upgrades_a_save() {
        let dir = tempfile::tempdir().unwrap();
        let config = CliConfig::default();

        init(dir.path(), 9).execute(&config).await.unwrap();
        let repo = FileActorRepo::new(dir.path()).unwrap();
        let first = repo.load(ActorId(3)).unwrap().unwrap();
        assert_eq!(first.tier, 9);
        assert_eq!(first.pathway.as_deref(), Some("lotm:seer"));

        // the second run starts from the existing save
        init(dir.path(), 7).execute(&config).await.unwrap();
        let second = repo.load(ActorId(3)).unwrap().unwrap();
        assert_eq!(second.tier, 7);
        assert!(second.learned.len() > first.learned.len());
        assert_eq!(repo.list_actors().unwrap(), vec![ActorId(3)]);
    }
}
