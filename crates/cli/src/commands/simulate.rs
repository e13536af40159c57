//! Scripted scene: a Seer divines for ore while someone watches them.
//!
//! The scene exercises casting, danger sense, divination and state sync,
//! then reports every event the runtime published.

use std::collections::HashMap;
use std::path::PathBuf;

use anyhow::{Context, Result};
use beyonder_core::sync::{AbilityMirror, FlatState};
use beyonder_core::{
    ActorFlags, ActorId, ActorState, BlockPos, CastContext, DivinationQuery, GazeAlert, PathwayId,
    Pose, SearchMode, SkillId, Tier, Vec3,
};
use beyonder_runtime::{
    DivinationEvent, EffectEvent, Event, NoticeEvent, Runtime, RuntimeConfig, RuntimeHandle,
    SyncEvent, Topic,
};
use clap::Parser;
use console::style;
use serde::Serialize;
use tokio::sync::broadcast::{self, error::TryRecvError};

use super::{OutputFormat, load_content, print_json};
use crate::config::CliConfig;

const DIVINER: ActorId = ActorId(1);
const WATCHER: ActorId = ActorId(2);
const ORE: &str = "minecraft:iron_ore";

/// Run a scripted scene and report what happened
#[derive(Parser)]
pub struct Simulate {
    /// Number of ticks to simulate
    #[arg(short = 'n', long, default_value_t = 200)]
    ticks: u32,

    /// Simulation seed
    #[arg(short, long, default_value_t = 42)]
    seed: u64,

    /// Tier of the diviner, 9 (weakest) to 0 (strongest)
    #[arg(short, long, default_value_t = 7, value_parser = clap::value_parser!(u8).range(0..=9))]
    tier: u8,

    /// Keep divining every interval instead of once
    #[arg(long)]
    continuous: bool,

    /// Distance between the diviner and the watcher, in blocks
    #[arg(long, default_value_t = 10.0)]
    distance: f64,

    /// Content directory (defaults to embedded content)
    #[arg(long, value_name = "DIR")]
    content_dir: Option<PathBuf>,

    /// Output format
    #[arg(long, value_enum, default_value = "summary")]
    format: OutputFormat,
}

/// Everything the scene produced.
#[derive(Debug, Default, Serialize)]
struct SceneReport {
    seed: u64,
    ticks: u64,
    notices: Vec<NoticeEvent>,
    alerts: Vec<GazeAlert>,
    divinations: Vec<DivinationEvent>,
    effects: Vec<EffectEvent>,
    syncs: usize,
    /// Events lost because a receiver fell behind.
    lagged: u64,
    diviner: Option<ActorState>,
    /// The diviner's abilities as an observer rebuilt them from pushes.
    observed: Option<FlatState>,
    /// Pushed entries the observer could not decode.
    undecoded: usize,
}

/// Remote view of one actor, fed only by sync pushes.
struct Observer {
    actor: ActorId,
    mirror: AbilityMirror,
    tick: u64,
}

impl Observer {
    fn new(actor: ActorId) -> Self {
        Self {
            actor,
            mirror: AbilityMirror::new(),
            tick: 0,
        }
    }

    /// Predicts locally up to `tick`.
    fn advance_to(&mut self, tick: u64) {
        while self.tick < tick {
            self.mirror.tick();
            self.tick += 1;
        }
    }

    /// Applies a push through its wire form; returns the dropped entries.
    fn receive(&mut self, event: &SyncEvent) -> usize {
        if event.actor != self.actor {
            return 0;
        }
        self.advance_to(event.tick);
        self.mirror.apply_flat(&event.push.ability.to_flat())
    }
}

impl Simulate {
    pub async fn execute(self, config: &CliConfig) -> Result<()> {
        let content = load_content(self.content_dir.as_deref(), config)?;
        let tier = Tier::new(self.tier)?;

        let runtime = Runtime::builder()
            .config(RuntimeConfig {
                seed: Some(self.seed),
                event_buffer_size: 4096,
                ..RuntimeConfig::default()
            })
            .content(&content)
            .build()
            .await?;
        let handle = runtime.handle();
        let mut receivers = handle.subscribe_multiple(&Topic::ALL);

        self.stage(&handle, tier).await?;
        handle.step(self.ticks).await?;

        let mut report = SceneReport {
            seed: self.seed,
            ticks: handle.current_tick().await?,
            diviner: handle.query_actor(DIVINER).await?,
            ..SceneReport::default()
        };
        let mut observer = Observer::new(DIVINER);
        drain(&mut receivers, &mut report, &mut observer);
        observer.advance_to(report.ticks);
        report.observed = Some(observer.mirror.view().to_flat());

        drop(handle);
        runtime.shutdown().await?;

        match self.format {
            OutputFormat::Summary => print_summary(&report),
            OutputFormat::Json => print_json(&report)?,
            OutputFormat::Debug => println!("{:#?}", report),
        }
        Ok(())
    }

    /// Places the actors, an ore vein and starts the first casts.
    async fn stage(&self, handle: &RuntimeHandle, tier: Tier) -> Result<()> {
        let seer = PathwayId::new("lotm:seer").context("Invalid pathway key")?;

        handle.attach(DIVINER, ActorFlags::empty()).await?;
        handle.attach(WATCHER, ActorFlags::empty()).await?;
        handle.initialize(DIVINER, seer, tier).await?;

        handle
            .update_pose(DIVINER, Some(Pose::new(Vec3::ZERO, Vec3::new(0.0, 0.0, 1.0))))
            .await?;
        handle
            .update_pose(
                WATCHER,
                Some(Pose::new(
                    Vec3::new(0.0, 0.0, self.distance),
                    Vec3::new(0.0, 0.0, -1.0),
                )),
            )
            .await?;

        for x in 5..=6 {
            for z in -4..=-3 {
                handle
                    .set_block(BlockPos::new(x, -2, z), Some(ORE.to_owned()))
                    .await?;
            }
        }

        let spirit_vision = SkillId::new("seer:spirit_vision")?;
        if let Err(e) = handle
            .cast(DIVINER, spirit_vision, CastContext::default())
            .await
        {
            tracing::warn!("Spirit vision refused: {}", e);
        }

        handle
            .set_query(DIVINER, DivinationQuery::block(ORE))
            .await?;
        if self.continuous {
            handle.divine(DIVINER, SearchMode::Continuous).await?;
        } else {
            let divination = SkillId::new("seer:divination")?;
            if let Err(e) = handle
                .cast(DIVINER, divination, CastContext::default())
                .await
            {
                tracing::warn!("Divination refused: {}", e);
            }
        }
        Ok(())
    }
}

fn drain(
    receivers: &mut HashMap<Topic, broadcast::Receiver<Event>>,
    report: &mut SceneReport,
    observer: &mut Observer,
) {
    for rx in receivers.values_mut() {
        loop {
            match rx.try_recv() {
                Ok(Event::Sync(event)) => {
                    report.syncs += 1;
                    report.undecoded += observer.receive(&event);
                }
                Ok(Event::Notice(notice)) => report.notices.push(notice),
                Ok(Event::Alert(alert)) => report.alerts.push(alert),
                Ok(Event::Divination(divination)) => report.divinations.push(divination),
                Ok(Event::Effect(effect)) => report.effects.push(effect),
                Err(TryRecvError::Lagged(missed)) => report.lagged += missed,
                Err(TryRecvError::Empty | TryRecvError::Closed) => break,
            }
        }
    }
}

fn print_summary(report: &SceneReport) {
    println!("{}", style("=== Scene Summary ===").bold().green());
    println!("  Seed: {}", report.seed);
    println!("  Ticks: {}", report.ticks);
    println!("  Sync pushes: {}", report.syncs);
    if report.lagged > 0 {
        println!("  {} {} events", style("Lagged:").red(), report.lagged);
    }
    println!();

    if let Some(actor) = &report.diviner {
        println!("{}", style("Diviner:").bold().yellow());
        println!("  Tier: {}", actor.tier());
        println!("  Spirituality: {:.1}", actor.resource.current());
        println!("  Mastery: {}", actor.mastery());
        println!("  In combat: {}", actor.resource.in_combat());
        let active: Vec<String> = actor
            .ability
            .active_skills()
            .map(ToString::to_string)
            .collect();
        println!("  Active skills: {}", active.join(", "));
        println!();
    }

    if let Some(view) = &report.observed {
        println!("{}", style("Observer view:").bold().yellow());
        for (skill, ticks) in view.with_prefix("cooldown.") {
            println!("  {} cooling down for {} ticks", skill, ticks);
        }
        if report.undecoded > 0 {
            println!("  {} {} entries", style("Undecoded:").red(), report.undecoded);
        }
        println!();
    }

    println!("{}", style("Notices:").bold().yellow());
    for event in &report.notices {
        println!("  [{}] actor {}: {:?}", event.tick, event.actor, event.notice);
    }
    println!();

    println!("{}", style("Gaze alerts:").bold().yellow());
    for alert in &report.alerts {
        println!(
            "  [{}] actor {} noticed actor {} watching (after {} ticks)",
            alert.tick, alert.target, alert.observer, alert.required_ticks
        );
    }
    println!();

    println!("{}", style("Divination:").bold().yellow());
    for event in &report.divinations {
        match event {
            DivinationEvent::Report {
                actor,
                tick,
                report,
            } => println!(
                "  [{}] actor {}: {:?} (chance {:.2}, mastery +{})",
                tick, actor, report.result, report.chance, report.mastery_gain
            ),
            DivinationEvent::Interrupted {
                actor,
                tick,
                code,
                message,
            } => println!("  [{}] actor {} interrupted: {} ({})", tick, actor, message, code),
        }
    }
    println!();

    println!("{}", style("Effects:").bold().yellow());
    for effect in &report.effects {
        println!("  actor {} {} {:?}", effect.actor, effect.effect, effect.phase);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn scene_raises_an_alert_and_divines() {
        let content = beyonder_content::ContentFactory::embedded().load().unwrap();
        let runtime = Runtime::builder()
            .config(RuntimeConfig {
                seed: Some(1),
                event_buffer_size: 4096,
                ..RuntimeConfig::default()
            })
            .content(&content)
            .build()
            .await
            .unwrap();
        let handle = runtime.handle();
        let mut receivers = handle.subscribe_multiple(&Topic::ALL);

        let scene = Simulate {
            ticks: 120,
            seed: 1,
            tier: 7,
            continuous: false,
            distance: 10.0,
            content_dir: None,
            format: OutputFormat::Summary,
        };
        scene.stage(&handle, Tier::new(7).unwrap()).await.unwrap();
        handle.step(scene.ticks).await.unwrap();

        let mut report = SceneReport::default();
        let mut observer = Observer::new(DIVINER);
        drain(&mut receivers, &mut report, &mut observer);
        observer.advance_to(handle.current_tick().await.unwrap());

        assert_eq!(report.lagged, 0);
        assert!(report.syncs >= 3);
        assert_eq!(report.alerts.len(), 1);
        assert_eq!(report.alerts[0].observer, WATCHER);
        assert_eq!(report.divinations.len(), 1);
        assert!(report.effects.iter().any(|e| e.effect == "spirit_vision"));

        // the observer's prediction matches the authoritative abilities
        let diviner = handle.query_actor(DIVINER).await.unwrap().unwrap();
        let truth = beyonder_core::AbilityBlob::capture(&diviner);
        let view = observer.mirror.view();
        assert_eq!(report.undecoded, 0);
        assert_eq!(view.learned, truth.learned);
        assert_eq!(view.cooldowns, truth.cooldowns);
        assert!(view.active.keys().eq(truth.active.keys()));

        drop(handle);
        runtime.shutdown().await.unwrap();
    }
}
