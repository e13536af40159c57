//! High-level runtime orchestrator.
//!
//! The runtime owns the simulation worker, wires up command/event channels,
//! and exposes a builder-based API for clients to drive the simulation.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use beyonder_content::Content;
use beyonder_core::divination::strategy_for;
use beyonder_core::{GameConfig, SimulationState};

use crate::api::{Result, RuntimeError, RuntimeHandle};
use crate::events::EventBus;
use crate::hooks::{HookRegistry, SkillHook};
use crate::oracle::{AttributeTable, GridWorld, OracleBundle};
use crate::repository::{ActorRepository, FileActorRepo};
use crate::workers::{Command, SimulationWorker, WorkerParts};

/// Runtime configuration shared across the orchestrator and workers.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub game_config: GameConfig,
    pub event_buffer_size: usize,
    pub command_buffer_size: usize,
    /// Step the simulation on this period. `None` steps only on command.
    pub tick_interval: Option<Duration>,
    /// Simulation seed; drawn from the OS when not set.
    pub seed: Option<u64>,
    /// Directory for a file-backed actor repository.
    pub save_dir: Option<PathBuf>,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            game_config: GameConfig::default(),
            event_buffer_size: 100,
            command_buffer_size: 32,
            tick_interval: None,
            seed: None,
            save_dir: None,
        }
    }
}

/// Main runtime that orchestrates the simulation
///
/// Design: Runtime owns the worker task.
/// [`RuntimeHandle`] provides a cloneable façade for clients.
pub struct Runtime {
    handle: RuntimeHandle,
    sim_worker_handle: JoinHandle<()>,
}

impl Runtime {
    /// Create a new runtime builder
    pub fn builder() -> RuntimeBuilder {
        RuntimeBuilder::new()
    }

    /// Get a cloneable handle to this runtime
    ///
    /// The handle can be shared across clients and async tasks.
    pub fn handle(&self) -> RuntimeHandle {
        self.handle.clone()
    }

    /// Shutdown the runtime gracefully
    ///
    /// The worker stops once every handle clone has been dropped.
    pub async fn shutdown(self) -> Result<()> {
        drop(self.handle);

        self.sim_worker_handle
            .await
            .map_err(RuntimeError::WorkerJoin)?;

        Ok(())
    }
}

/// Builder for [`Runtime`] with flexible configuration.
pub struct RuntimeBuilder {
    config: RuntimeConfig,
    oracles: Option<OracleBundle>,
    world: GridWorld,
    attributes: AttributeTable,
    repository: Option<Arc<dyn ActorRepository>>,
    hooks: Option<HookRegistry>,
}

impl RuntimeBuilder {
    fn new() -> Self {
        Self {
            config: RuntimeConfig::default(),
            oracles: None,
            world: GridWorld::new(),
            attributes: AttributeTable::new(),
            repository: None,
            hooks: None,
        }
    }

    /// Override runtime configuration
    pub fn config(mut self, config: RuntimeConfig) -> Self {
        self.config = config;
        self
    }

    /// Use loaded content: its registries become the oracles and its game
    /// config replaces the one in [`RuntimeConfig`].
    pub fn content(mut self, content: &Content) -> Self {
        self.oracles = Some(OracleBundle::from_content(content));
        self.config.game_config = content.config.clone();
        self
    }

    /// Set the oracle bundle directly
    pub fn oracles(mut self, oracles: OracleBundle) -> Self {
        self.oracles = Some(oracles);
        self
    }

    /// Provide an initial world
    pub fn world(mut self, world: GridWorld) -> Self {
        self.world = world;
        self
    }

    /// Provide initial actor attributes
    pub fn attributes(mut self, attributes: AttributeTable) -> Self {
        self.attributes = attributes;
        self
    }

    /// Set the actor repository used by `save` and `load`.
    ///
    /// Takes precedence over [`RuntimeConfig::save_dir`].
    pub fn repository(mut self, repository: Arc<dyn ActorRepository>) -> Self {
        self.repository = Some(repository);
        self
    }

    /// Set custom skill hooks.
    ///
    /// If not provided, the default hooks (combat, divination, effect log)
    /// are used.
    pub fn with_hooks(mut self, hooks: HookRegistry) -> Self {
        self.hooks = Some(hooks);
        self
    }

    /// Adds hooks to the default hook set.
    ///
    /// Note: this discards hooks set earlier with `with_hooks()`.
    pub fn add_hooks(mut self, additional: Vec<Arc<dyn SkillHook>>) -> Self {
        self.hooks = Some(HookRegistry::with_additional(additional));
        self
    }

    /// Build the runtime
    pub async fn build(self) -> Result<Runtime> {
        let oracles = self.oracles.ok_or(RuntimeError::MissingContent)?;

        let repository = match (self.repository, &self.config.save_dir) {
            (Some(repository), _) => Some(repository),
            (None, Some(dir)) => {
                Some(Arc::new(FileActorRepo::new(dir)?) as Arc<dyn ActorRepository>)
            }
            (None, None) => None,
        };

        let seed = self.config.seed.unwrap_or_else(rand::random);
        let game_config = self.config.game_config;

        let (command_tx, command_rx) = mpsc::channel::<Command>(self.config.command_buffer_size);
        let event_bus = EventBus::with_capacity(self.config.event_buffer_size);

        let handle = RuntimeHandle::new(command_tx, event_bus.clone());

        let parts = WorkerParts {
            state: SimulationState::new(seed),
            scan: strategy_for(game_config.scan_strategy),
            oracles,
            world: self.world,
            attributes: self.attributes,
            config: game_config,
            hooks: self.hooks.unwrap_or_default(),
            repository,
            tick_interval: self.config.tick_interval,
        };
        let sim_worker = SimulationWorker::new(parts, command_rx, event_bus);

        let sim_worker_handle = tokio::spawn(async move {
            sim_worker.run().await;
        });

        Ok(Runtime {
            handle,
            sim_worker_handle,
        })
    }
}
