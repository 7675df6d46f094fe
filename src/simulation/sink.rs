//! Render sinks: external consumers of body snapshots.
//!
//! A sink is invoked synchronously from the scheduler thread with a
//! read-only view of the bodies. It sits on the critical timing path, so it
//! must not block indefinitely. Provided implementations:
//! - `LogSink`     – logs body positions (per-iteration sink)
//! - `TrajectoryRecorder` – bounded history of movement segments (per-tick sink)

use crate::simulation::states::{Body, NVec2};
use anyhow::Result;
use std::collections::VecDeque;

/// Consumer of body snapshots.
///
/// A failing sink is fatal for the pacing loop: the error propagates out of
/// the scheduler and ends its thread. Sinks needing resilience must retry
/// internally.
pub trait RenderSink: Send {
    /// Process the current body snapshot.
    fn render(&mut self, bodies: &[Body]) -> Result<()>;

    /// Human-readable name, used in scheduler error context.
    fn name(&self) -> &str;
}

/// Logs every body's position and velocity at debug level.
pub struct LogSink;

impl RenderSink for LogSink {
    fn render(&mut self, bodies: &[Body]) -> Result<()> {
        for (i, b) in bodies.iter().enumerate() {
            log::debug!(
                "body {i}: x = ({:.3}, {:.3}), v = ({:.3}, {:.3})",
                b.x.x,
                b.x.y,
                b.v.x,
                b.v.y
            );
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "log_sink"
    }
}

/// One recorded movement segment for one body.
#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    pub body: usize, // index into the body list
    pub from: NVec2,
    pub to: NVec2,
}

/// Bounded trajectory history, one batch of segments per render call.
///
/// Keeps the positions it last saw and records a segment per body per call,
/// skipping segments too short to be visible (both endpoints round to the
/// same integer coordinates). Batches beyond `fade_out_count` are dropped
/// oldest-first, so memory stays bounded no matter how long the run.
pub struct TrajectoryRecorder {
    fade_out_count: usize,
    previous_positions: Vec<NVec2>,
    batches: VecDeque<Vec<Segment>>,
}

impl TrajectoryRecorder {
    pub fn new(fade_out_count: usize) -> Self {
        Self {
            fade_out_count,
            previous_positions: Vec::new(),
            batches: VecDeque::new(),
        }
    }

    /// Number of retained segment batches (at most `fade_out_count`).
    pub fn len(&self) -> usize {
        self.batches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.batches.is_empty()
    }

    /// Iterate over all retained segments, oldest batch first.
    pub fn segments(&self) -> impl Iterator<Item = &Segment> {
        self.batches.iter().flatten()
    }
}

impl RenderSink for TrajectoryRecorder {
    fn render(&mut self, bodies: &[Body]) -> Result<()> {
        if self.previous_positions.is_empty() {
            // First call: nothing to diff against yet
            self.previous_positions = bodies.iter().map(|b| b.x).collect();
            return Ok(());
        }

        let mut batch = Vec::new();
        for (i, b) in bodies.iter().enumerate() {
            let prev = self.previous_positions[i];

            // Skip segments shorter than one integer coordinate step
            let moved = prev.x.round() != b.x.x.round() || prev.y.round() != b.x.y.round();
            if moved {
                batch.push(Segment {
                    body: i,
                    from: prev,
                    to: b.x,
                });
            }

            self.previous_positions[i] = b.x;
        }
        self.batches.push_back(batch);

        while self.batches.len() > self.fade_out_count {
            self.batches.pop_front();
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "trajectory_recorder"
    }
}
