//! The player-controlled kinematic box and its fixed-step update.

use glam::Vec2;

use crate::api::LevelApi;
use crate::collider::BoxCollider;
use crate::config::ActorConfig;
use crate::diagnostics::DiagnosticsSink;
use crate::resolver::{ResolveReport, Resolver};
use crate::types::*;

/// What one fixed step did to the actor.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct StepReport {
    /// Ground state seen by this step's probe.
    pub state: MotionState,
    pub jumped: bool,
    /// The step only restored the spawn point.
    pub reset: bool,
    /// Broad-phase candidates handed to the resolver.
    pub candidates: usize,
    pub resolve: ResolveReport,
}

pub struct Actor {
    pub body: Body,
    spawn: Vec2,
    cfg: ActorConfig,
    shape: BoxCollider,
    state: MotionState,

    // Latched frame input, consumed by the next fixed step
    axis: f32,
    jump_pending: bool,
    reset_pending: bool,
}

impl Actor {
    pub fn new(spawn: Vec2, cfg: ActorConfig) -> Self {
        let shape = BoxCollider::from_size(cfg.size);
        Self {
            body: Body { position: spawn, velocity: Vec2::ZERO, half_extents: shape.half_extents },
            spawn,
            cfg,
            shape,
            state: MotionState::Airborne,
            axis: 0.0,
            jump_pending: false,
            reset_pending: false,
        }
    }

    /// Merge one frame's input. Held keys replace the previous frame's;
    /// jump and reset requests stay latched until a step consumes them.
    pub fn buffer_input(&mut self, input: &FrameInput) {
        self.axis = input.horizontal_axis();
        self.jump_pending |= input.jump_requested;
        self.reset_pending |= input.reset_requested;
    }

    /// Back to the spawn point at rest.
    pub fn reset(&mut self) {
        self.body.position = self.spawn;
        self.body.velocity = Vec2::ZERO;
        self.state = MotionState::Airborne;
        self.jump_pending = false;
        self.reset_pending = false;
        log::debug!("actor reset to {}", self.spawn);
    }

    /// Advance one fixed step of `dt` seconds.
    pub fn step<L: LevelApi>(
        &mut self,
        level: &mut L,
        resolver: &Resolver,
        dt: f32,
        sink: &mut dyn DiagnosticsSink,
    ) -> StepReport {
        if self.reset_pending {
            self.reset();
            return StepReport { reset: true, ..StepReport::default() };
        }

        let v = &mut self.body.velocity;
        if self.axis != 0.0 {
            v.x += self.axis * self.cfg.move_acceleration * dt;
        } else {
            v.x *= (-self.cfg.horizontal_damping * dt).exp();
        }
        v.y -= self.cfg.gravity * dt;

        self.state = self.probe_ground(level);
        // A jump request lives for exactly one step
        let jumped = self.state == MotionState::Grounded && self.jump_pending;
        if jumped {
            self.body.velocity.y = self.cfg.jump_impulse * dt;
            log::trace!("jump from {}", self.body.position);
        }
        self.jump_pending = false;

        let max = self.cfg.max_velocity;
        self.body.velocity = self.body.velocity.clamp(-max, max);

        let candidates = level
            .find_colliding_tiles(&self.shape, self.body.position, self.body.next_position())
            .to_vec();
        let resolve = resolver.resolve_step(&mut self.body, &candidates, sink);
        self.body.position += self.body.velocity;

        StepReport { state: self.state, jumped, reset: false, candidates: candidates.len(), resolve }
    }

    fn probe_ground<L: LevelApi>(&self, level: &L) -> MotionState {
        let reach = self.cfg.ground_probe_distance;
        let raw = level.cast_all(&self.shape, self.body.position, Vec2::NEG_Y, reach);
        let pos = self.body.position;
        let half = self.body.half_extents;
        let bottom = pos.y - half.y;
        let grounded = level
            .filter_collisions(&raw)
            .iter()
            .filter_map(|hit| level.tile(hit.tile).map(|t| (hit, t)))
            .any(|(hit, t)| {
                // Touching only at a corner is not standing on the tile
                let overlaps_x = (pos.x - t.aabb.center.x).abs() < half.x + t.half_extents().x;
                overlaps_x && (hit.normal.y > 0.0 || (bottom - t.aabb.max().y).abs() <= reach)
            });
        if grounded { MotionState::Grounded } else { MotionState::Airborne }
    }

    pub fn state(&self) -> MotionState {
        self.state
    }

    pub fn jump_pending(&self) -> bool {
        self.jump_pending
    }

    pub fn reset_pending(&self) -> bool {
        self.reset_pending
    }
}
