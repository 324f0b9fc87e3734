//! Optional trace output for debug drawing/overlays.
//!
//! Sinks only observe; no simulation decision reads anything back from them.

use glam::Vec2;

use crate::types::{ActiveGroup, CardinalNormal, TileId};

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum TraceEvent {
    /// A resolver re-cast struck a tile.
    CastHit { tile: TileId, point: Vec2, distance: f32 },
    /// Raw probe normal and the cardinal it snapped to.
    NormalSnapped { tile: TileId, raw: Vec2, snapped: CardinalNormal },
    /// Velocity correction applied along `normal`.
    Correction { tile: TileId, normal: CardinalNormal, overlap: f32 },
    /// Contact too far from the tile center to be trusted.
    GrazingSkipped { tile: TileId, point: Vec2 },
    /// Normal probe missed its tile; a neutral normal was used.
    DegenerateHit { tile: TileId, point: Vec2 },
    /// Candidates still penetrating after the allotted passes.
    Unresolved { count: usize },
    Flipped { active: ActiveGroup },
}

pub trait DiagnosticsSink {
    fn emit(&mut self, event: TraceEvent);
}

/// Discards everything.
#[derive(Copy, Clone, Debug, Default)]
pub struct NoopSink;

impl DiagnosticsSink for NoopSink {
    #[inline]
    fn emit(&mut self, _event: TraceEvent) {}
}

/// Keeps every event in order; handy for tests and debug overlays.
#[derive(Clone, Debug, Default)]
pub struct RecordingSink {
    pub events: Vec<TraceEvent>,
}

impl DiagnosticsSink for RecordingSink {
    fn emit(&mut self, event: TraceEvent) {
        self.events.push(event);
    }
}
