//! tileflip: collision core for a 2D tile platformer with two swappable solid groups

pub mod types;
pub mod error;
pub mod config;
pub mod api;
pub mod narrowphase;
pub mod collider;
pub mod contact;
pub mod desc;
pub mod diagnostics;
pub mod level;
pub mod resolver;
pub mod actor;
pub mod sim;

pub use crate::types::*;
pub use crate::api::*;
pub use crate::error::{ConfigurationError, GeometryError};
pub use crate::config::{ActorConfig, LevelConfig, ResolverConfig, SimConfig};
pub use crate::collider::BoxCollider;
pub use crate::desc::{LevelDesc, TileDesc};
pub use crate::diagnostics::{DiagnosticsSink, NoopSink, RecordingSink, TraceEvent};
pub use crate::level::{Level, LevelStats};
pub use crate::resolver::{ResolveReport, Resolver};
pub use crate::actor::{Actor, StepReport};
pub use crate::sim::Simulation;
