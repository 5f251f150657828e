use crate::utils::{profiler::ScopeTimer, vector::Vec2};

/// The part of a drag between two consecutive pointer samples.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StrokeSegment {
    pub from: Vec2,
    pub to: Vec2,
}

impl StrokeSegment {
    pub fn new(from: Vec2, to: Vec2) -> Self {
        Self { from, to }
    }

    /// Zero-length segment, as produced by a single pointer sample.
    pub fn point(at: Vec2) -> Self {
        Self { from: at, to: at }
    }
}

/// Tracks the last pointer position of the freehand stroke in progress.
#[derive(Default)]
pub struct StrokeState {
    last_pos: Option<Vec2>,
    stroke_timer: Option<ScopeTimer>,
}

impl StrokeState {
    /// Create an idle stroke state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a stroke at `pos`, discarding any unfinished one.
    pub fn begin(&mut self, pos: Vec2) {
        self.last_pos = Some(pos);
        self.stroke_timer = Some(ScopeTimer::new("stroke"));
    }

    /// Move the stroke to `pos` and return the segment just travelled, or
    /// `None` when no stroke is in progress.
    pub fn advance(&mut self, pos: Vec2) -> Option<StrokeSegment> {
        let prev = self.last_pos?;
        self.last_pos = Some(pos);
        Some(StrokeSegment::new(prev, pos))
    }

    pub fn is_active(&self) -> bool {
        self.last_pos.is_some()
    }

    pub fn last_pos(&self) -> Option<Vec2> {
        self.last_pos
    }

    /// Reset the stroke state and emit the profiling metric.
    pub fn end(&mut self) {
        self.last_pos = None;
        // Dropping the timer reports the stroke-level duration.
        self.stroke_timer.take();
    }
}
