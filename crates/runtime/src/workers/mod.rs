//! Worker tasks that back the runtime orchestration.
//!
//! The simulation worker owns every actor and executes all commands; other
//! parts of the runtime only ever talk to it through channels.

mod simulation;

pub use simulation::{Command, SimulationWorker, WorkerParts};
