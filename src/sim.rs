//! Fixed-timestep driver tying the level, actor and resolver together.

use crate::actor::{Actor, StepReport};
use crate::api::LevelApi;
use crate::config::SimConfig;
use crate::desc::LevelDesc;
use crate::diagnostics::{DiagnosticsSink, TraceEvent};
use crate::error::ConfigurationError;
use crate::level::Level;
use crate::resolver::Resolver;
use crate::types::FrameInput;

pub struct Simulation {
    cfg: SimConfig,
    level: Level,
    actor: Actor,
    resolver: Resolver,
    accumulator: f32,
    ticks: u64,
}

impl Simulation {
    /// Validate `cfg`, register the level's tiles and place the actor at its spawn.
    pub fn new(cfg: SimConfig, desc: &LevelDesc) -> Result<Self, ConfigurationError> {
        cfg.validate()?;
        let level = Level::load(cfg.level.clone(), desc)?;
        let actor = Actor::new(desc.spawn, cfg.actor.clone());
        let resolver = Resolver::new(cfg.resolver.clone());
        Ok(Self { cfg, level, actor, resolver, accumulator: 0.0, ticks: 0 })
    }

    /// Feed one rendered frame: latch `input`, then run as many fixed steps
    /// as the accumulated time allows (at most `max_substeps`). Returns the
    /// number of steps run.
    pub fn frame(&mut self, input: &FrameInput, frame_dt: f32, sink: &mut dyn DiagnosticsSink) -> usize {
        self.actor.buffer_input(input);
        let dt = self.cfg.fixed_dt;
        // Time beyond one full burst of substeps is dropped
        let cap = self.cfg.max_substeps as f32 * dt;
        if frame_dt > cap {
            log::debug!("dropping {:.3}s of simulation time", frame_dt - cap);
        }
        self.accumulator += if frame_dt.is_nan() { 0.0 } else { frame_dt.clamp(0.0, cap) };

        let mut substeps = 0;
        while self.accumulator >= dt && substeps < self.cfg.max_substeps {
            self.step(sink);
            self.accumulator -= dt;
            substeps += 1;
        }
        substeps as usize
    }

    /// Run exactly one fixed step with whatever input is latched.
    pub fn step(&mut self, sink: &mut dyn DiagnosticsSink) -> StepReport {
        self.ticks += 1;
        self.actor.step(&mut self.level, &self.resolver, self.cfg.fixed_dt, sink)
    }

    pub fn flip(&mut self, sink: &mut dyn DiagnosticsSink) {
        self.level.flip();
        sink.emit(TraceEvent::Flipped { active: self.level.active_group() });
    }

    pub fn level(&self) -> &Level {
        &self.level
    }

    pub fn actor(&self) -> &Actor {
        &self.actor
    }

    /// Fixed steps run since construction.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }
}
