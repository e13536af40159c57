//! Read and inspect actor saves written by the file repository.
//!
//! Deserializes actor_{id}.bin files and checks them against the content.

use std::path::PathBuf;

use anyhow::{Context, Result};
use beyonder_core::{ActorId, LoadReport, PersistedActor};
use beyonder_runtime::FileActorRepo;
use clap::Parser;
use console::style;

use super::{OutputFormat, load_content, print_json, resolve_data_dir};
use crate::config::CliConfig;

/// Read and inspect an actor save
#[derive(Parser)]
pub struct InspectSave {
    /// Actor id of the save to read
    #[arg(value_name = "ACTOR", required_unless_present = "file")]
    actor: Option<u32>,

    /// Read this file instead of looking the actor up
    #[arg(short, long, value_name = "FILE", conflicts_with = "actor")]
    file: Option<PathBuf>,

    /// Save directory (defaults to platform-specific location)
    #[arg(short, long, value_name = "DIR")]
    data_dir: Option<PathBuf>,

    /// Content directory to validate against (defaults to embedded content)
    #[arg(long, value_name = "DIR")]
    content_dir: Option<PathBuf>,

    /// Output format
    #[arg(long, value_enum, default_value = "summary")]
    format: OutputFormat,
}

impl InspectSave {
    pub fn execute(self, config: &CliConfig) -> Result<()> {
        let path = match (self.file, self.actor) {
            (Some(file), _) => file,
            (None, Some(actor)) => resolve_data_dir(self.data_dir, config)
                .join(format!("actor_{}.bin", actor)),
            (None, None) => anyhow::bail!("Either an actor id or --file is required"),
        };

        if !path.exists() {
            anyhow::bail!("Save file not found: {}", path.display());
        }

        let save = FileActorRepo::read_file(&path)
            .with_context(|| format!("Failed to read save file: {}", path.display()))?;

        let content = load_content(self.content_dir.as_deref(), config)?;
        let report = match save.restore(&content.skills, &content.pathways) {
            Ok((_, report)) => Some(report),
            Err(e) => {
                tracing::warn!("Save cannot be restored: {}", e);
                None
            }
        };

        match self.format {
            OutputFormat::Summary => {
                println!("{} {}", style("Save File:").bold().cyan(), path.display());
                println!();
                print_summary(&save, report.as_ref());
            }
            OutputFormat::Json => print_json(&save)?,
            OutputFormat::Debug => println!("{:#?}", save),
        }

        Ok(())
    }
}

fn print_summary(save: &PersistedActor, report: Option<&LoadReport>) {
    println!("{}", style("=== Actor Save Summary ===").bold().green());
    println!();

    println!("{}", style("Actor:").bold().yellow());
    println!("  ID: {}", ActorId(save.actor));
    println!("  Schema version: {}", save.version);
    println!("  Flags: {:#04x}", save.flags);
    println!(
        "  Pathway: {} (tier {})",
        save.pathway.as_deref().unwrap_or("none"),
        save.tier
    );
    println!("  Spirituality: {:.1}", save.current);
    println!("  Mastery: {}", save.mastery);
    println!("  Combat timer: {}", save.combat_timer);
    println!();

    println!("{}", style("Skills:").bold().yellow());
    println!("  Learned: {}", save.learned.join(", "));
    println!("  Active: {}", save.active.join(", "));
    for (skill, ticks) in &save.cooldowns {
        println!("  Cooldown: {} ({} ticks)", skill, ticks);
    }
    for (page, slot, skill) in &save.presets {
        println!("  Preset {}/{}: {}", page, slot, skill);
    }
    println!("  Active page: {}", save.active_page);
    if let Some(query) = &save.query {
        println!("  Divination query: {:?}", query);
    }
    println!();

    println!("{}", style("Against current content:").bold().yellow());
    match report {
        Some(report) if report.is_clean() => println!("  Loads cleanly"),
        Some(report) => println!(
            "  Would drop {} entries (learned {}, cooldowns {}, active {}, presets {}, fields {})",
            report.total(),
            report.learned,
            report.cooldowns,
            report.active,
            report.presets,
            report.fields
        ),
        None => println!("  Unsupported schema version"),
    }
}
