//! Jitter buffer for server snapshots.
//!
//! Every snapshot is scheduled at a render point slightly in the future. On
//! each frame the two oldest entries bracket the current time and the drawn
//! state is a blend of them. Playback never runs past the newest snapshot.

use crate::config::InterpolationConfig;
use crate::state::GameStateView;
use protocol::GameUpdate;
use std::collections::VecDeque;

#[derive(Debug, Clone)]
struct BufferEntry {
    state: GameStateView,
    /// Time in ms at which `state` should be fully reached.
    render_point: f64,
}

/// Per-viewer snapshot history.
#[derive(Debug)]
pub struct InterpolationBuffer {
    entries: VecDeque<BufferEntry>,
    tick_period: f64,
    slack: f64,
    flexibility: f64,
    current: Option<GameStateView>,
    progress: f32,
}

impl InterpolationBuffer {
    pub fn new(config: &InterpolationConfig) -> Self {
        Self {
            entries: VecDeque::new(),
            tick_period: config.tick_period_ms,
            slack: config.slack_ms,
            flexibility: config.flexibility,
            current: None,
            progress: 0.0,
        }
    }

    /// Store a snapshot that arrived at `now` (ms).
    pub fn push(&mut self, update: GameUpdate, now: f64) {
        let arrival_point = now + self.tick_period + self.slack;

        let render_point = match self.entries.back_mut() {
            Some(last) => {
                // Playback caught up with the data: restart from now
                if now > last.render_point {
                    last.render_point = now;
                }
                let scheduled = last.render_point + self.tick_period;
                scheduled + (arrival_point - scheduled) * self.flexibility
            }
            None => arrival_point,
        };

        self.entries.push_back(BufferEntry {
            state: GameStateView::from(update),
            render_point,
        });
    }

    /// Compute the frame for time `now` (ms).
    ///
    /// Returns `None` until two snapshots have arrived. With only one
    /// snapshot left the last frame is kept.
    pub fn update(&mut self, now: f64) -> Option<&GameStateView> {
        while self.entries.len() > 2 && self.entries[1].render_point <= now {
            self.entries.pop_front();
        }

        if let (Some(from), Some(to)) = (self.entries.front(), self.entries.get(1)) {
            let span = to.render_point - from.render_point;
            let progress = if span > 0.0 {
                ((now - from.render_point) / span).clamp(0.0, 1.0)
            } else {
                1.0
            };
            self.progress = progress as f32;
            self.current = Some(GameStateView::interpolate(&from.state, &to.state, self.progress));
        }

        self.current.as_ref()
    }

    /// The most recently computed frame.
    #[inline]
    pub fn current(&self) -> Option<&GameStateView> {
        self.current.as_ref()
    }

    /// Progress between the two oldest snapshots at the last frame.
    #[inline]
    pub fn progress(&self) -> f32 {
        self.progress
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
