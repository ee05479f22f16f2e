use bevy::prelude::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoopMode {
    #[default]
    Once,
    Repeat,
}

/// Keyframed transform channels for one target node. Each channel is sorted
/// by time; a channel without keys leaves that part of the pose untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransformTrack {
    pub target: String,
    pub translation: Vec<(f32, Vec3)>,
    pub rotation: Vec<(f32, Quat)>,
    pub scale: Vec<(f32, Vec3)>,
}

impl TransformTrack {
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            ..default()
        }
    }

    pub fn sort_keys(&mut self) {
        self.translation.sort_by(|a, b| a.0.total_cmp(&b.0));
        self.rotation.sort_by(|a, b| a.0.total_cmp(&b.0));
        self.scale.sort_by(|a, b| a.0.total_cmp(&b.0));
    }

    /// Writes the pose at `time` into `transform`. Times past the last key
    /// hold the last key.
    pub fn apply(&self, time: f32, transform: &mut Transform) {
        if let Some(translation) = sample(&self.translation, time, Vec3::lerp) {
            transform.translation = translation;
        }
        if let Some(rotation) = sample(&self.rotation, time, Quat::slerp) {
            transform.rotation = rotation;
        }
        if let Some(scale) = sample(&self.scale, time, Vec3::lerp) {
            transform.scale = scale;
        }
    }
}

fn sample<T: Copy>(keys: &[(f32, T)], time: f32, mix: impl Fn(T, T, f32) -> T) -> Option<T> {
    let (first, last) = (keys.first()?, keys.last()?);
    if time <= first.0 {
        return Some(first.1);
    }
    if time >= last.0 {
        return Some(last.1);
    }

    let next = keys.iter().position(|(t, _)| *t > time)?;
    let (t0, v0) = keys[next - 1];
    let (t1, v1) = keys[next];
    let span = t1 - t0;
    if span <= f32::EPSILON {
        return Some(v1);
    }
    Some(mix(v0, v1, (time - t0) / span))
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnimationClip {
    pub name: String,
    pub duration: f32,
    pub loop_mode: LoopMode,
    pub tracks: Vec<TransformTrack>,
}

impl AnimationClip {
    pub fn new(name: impl Into<String>, duration: f32) -> Self {
        Self {
            name: name.into(),
            duration: duration.max(0.0),
            loop_mode: LoopMode::Once,
            tracks: Vec::new(),
        }
    }

    pub fn with_track(mut self, mut track: TransformTrack) -> Self {
        track.sort_keys();
        self.tracks.push(track);
        self
    }

    pub fn targets(&self) -> impl Iterator<Item = &str> {
        self.tracks.iter().map(|track| track.target.as_str())
    }
}
