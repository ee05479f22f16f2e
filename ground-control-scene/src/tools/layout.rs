use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use constants::layout::{
    LAYOUT_BREAKPOINT, MODEL_POSITION, MODEL_ROTATION_EULER, NARROW_MODEL_SCALE, WIDE_MODEL_SCALE,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewportClass {
    Narrow,
    Wide,
}

/// Base placement of the model for a viewport width.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutTransform {
    pub scale: Vec3,
    pub position: Vec3,
    pub rotation: Quat,
}

impl From<LayoutTransform> for Transform {
    fn from(layout: LayoutTransform) -> Self {
        Transform {
            translation: layout.position,
            rotation: layout.rotation,
            scale: layout.scale,
        }
    }
}

/// Two scale presets split at a width breakpoint. Position and rotation do
/// not depend on the viewport.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutPolicy {
    pub breakpoint: f32,
    pub narrow_scale: Vec3,
    pub wide_scale: Vec3,
    pub position: Vec3,
    pub rotation: Quat,
}

impl Default for LayoutPolicy {
    fn default() -> Self {
        let [x, y, z] = MODEL_ROTATION_EULER;
        Self {
            breakpoint: LAYOUT_BREAKPOINT,
            narrow_scale: NARROW_MODEL_SCALE,
            wide_scale: WIDE_MODEL_SCALE,
            position: MODEL_POSITION,
            rotation: Quat::from_euler(EulerRot::XYZ, x, y, z),
        }
    }
}

impl LayoutPolicy {
    pub fn classify(&self, viewport_width: f32) -> ViewportClass {
        if viewport_width < self.breakpoint {
            ViewportClass::Narrow
        } else {
            ViewportClass::Wide
        }
    }

    pub fn compute_transform(&self, viewport_width: f32) -> LayoutTransform {
        let scale = match self.classify(viewport_width) {
            ViewportClass::Narrow => self.narrow_scale,
            ViewportClass::Wide => self.wide_scale,
        };
        LayoutTransform {
            scale,
            position: self.position,
            rotation: self.rotation,
        }
    }

    pub fn with_overrides(mut self, overrides: &LayoutOverride) -> Self {
        if let Some(breakpoint) = overrides.breakpoint {
            self.breakpoint = breakpoint;
        }
        if let Some(scale) = overrides.narrow_scale {
            self.narrow_scale = Vec3::splat(scale);
        }
        if let Some(scale) = overrides.wide_scale {
            self.wide_scale = Vec3::splat(scale);
        }
        if let Some(position) = overrides.position {
            self.position = Vec3::from_array(position);
        }
        if let Some([x, y, z]) = overrides.rotation {
            self.rotation = Quat::from_euler(EulerRot::XYZ, x, y, z);
        }
        self
    }
}

/// Optional layout fields of the dashboard manifest.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct LayoutOverride {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub breakpoint: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub narrow_scale: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wide_scale: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<[f32; 3]>,
    /// XYZ euler angles in radians.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rotation: Option<[f32; 3]>,
}
