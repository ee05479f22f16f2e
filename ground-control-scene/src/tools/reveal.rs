//! One-shot reveal of the satellite sub-components.
//!
//! ```text
//! Idle ──commit──> Playing { elapsed } ──elapsed >= duration──> Completed
//!  │                    │                                          │
//!  └ commit without clip: stays Idle      commit: no-op            └ commit: no-op
//! ```
//!
//! Completion writes the final pose, makes every revealed node visible and
//! opens the [`AnimationGate`] inside a single [`RevealAnimationController::advance`]
//! call. Pickers therefore never see "completed" without "revealed".

use bevy::prelude::*;

use crate::engine::scene::animation::{AnimationClip, LoopMode};
use crate::engine::scene::graph::{NodeId, SceneGraph};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RevealPhase {
    Idle,
    Playing { elapsed: f32 },
    Completed,
}

/// Opens once per mount and never closes again.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AnimationGate {
    open: bool,
}

impl AnimationGate {
    pub fn is_open(&self) -> bool {
        self.open
    }

    /// Returns `true` only for the call that actually opened the gate.
    fn open(&mut self) -> bool {
        !std::mem::replace(&mut self.open, true)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitOutcome {
    Started,
    AlreadyPlaying,
    AlreadyCompleted,
    /// No clip was bound, the controller is stuck in `Idle`.
    Unavailable,
}

#[derive(Debug)]
pub struct RevealAnimationController {
    clip: Option<AnimationClip>,
    /// Track index → node it drives. Tracks whose target is not in the scene are dropped.
    bindings: Vec<(usize, NodeId)>,
    revealed: Vec<NodeId>,
    phase: RevealPhase,
    gate: AnimationGate,
}

impl RevealAnimationController {
    /// Hides the revealed set and binds the clip tracks to scene nodes.
    /// A `None` clip yields a degraded controller that never leaves `Idle`.
    pub fn new(clip: Option<AnimationClip>, revealed: Vec<NodeId>, graph: &mut SceneGraph) -> Self {
        for &node in &revealed {
            graph.set_visible(node, false);
        }

        let clip = clip.map(|mut clip| {
            if clip.loop_mode == LoopMode::Repeat {
                debug!("Reveal clip '{}' is looping, playing it once", clip.name);
                clip.loop_mode = LoopMode::Once;
            }
            clip
        });

        let bindings = clip
            .as_ref()
            .map(|clip| bind_tracks(clip, graph))
            .unwrap_or_default();

        Self {
            clip,
            bindings,
            revealed,
            phase: RevealPhase::Idle,
            gate: AnimationGate::default(),
        }
    }

    pub fn phase(&self) -> RevealPhase {
        self.phase
    }

    pub fn gate(&self) -> AnimationGate {
        self.gate
    }

    pub fn is_completed(&self) -> bool {
        self.phase == RevealPhase::Completed
    }

    pub fn is_degraded(&self) -> bool {
        self.clip.is_none()
    }

    pub fn revealed(&self) -> &[NodeId] {
        &self.revealed
    }

    pub fn is_revealed_node(&self, node: NodeId) -> bool {
        self.revealed.contains(&node)
    }

    pub fn commit(&mut self) -> CommitOutcome {
        match self.phase {
            RevealPhase::Playing { .. } => CommitOutcome::AlreadyPlaying,
            RevealPhase::Completed => CommitOutcome::AlreadyCompleted,
            RevealPhase::Idle if self.clip.is_none() => CommitOutcome::Unavailable,
            RevealPhase::Idle => {
                self.phase = RevealPhase::Playing { elapsed: 0.0 };
                CommitOutcome::Started
            }
        }
    }

    /// Steps playback by `dt` seconds. Returns `true` on the frame the reveal completes.
    pub fn advance(&mut self, dt: f32, graph: &mut SceneGraph) -> bool {
        let RevealPhase::Playing { elapsed } = self.phase else {
            return false;
        };
        let Some(clip) = self.clip.as_ref() else {
            return false;
        };

        let elapsed = elapsed + dt.max(0.0);
        let time = elapsed.min(clip.duration);
        for &(track, node) in &self.bindings {
            if let Some(target) = graph.get_mut(node) {
                clip.tracks[track].apply(time, &mut target.transform);
            }
        }

        if elapsed < clip.duration {
            self.phase = RevealPhase::Playing { elapsed };
            return false;
        }

        for &node in &self.revealed {
            graph.set_visible(node, true);
        }
        self.phase = RevealPhase::Completed;
        self.gate.open()
    }
}

fn bind_tracks(clip: &AnimationClip, graph: &SceneGraph) -> Vec<(usize, NodeId)> {
    clip.tracks
        .iter()
        .enumerate()
        .filter_map(|(index, track)| match graph.find(&track.target) {
            Some(node) => Some((index, node)),
            None => {
                warn!(
                    "Clip '{}' targets unknown node '{}', track ignored",
                    clip.name, track.target
                );
                None
            }
        })
        .collect()
}
