//! Wireframe material model: uniform keys, per-uniform animation ranges and
//! the live value set the renderer samples each frame.

use foundation::math::interp::lerp;

/// Scalar uniforms of the wireframe shader.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum UniformKey {
    /// Spatial frequency of the vertex displacement noise.
    Frequency,
    /// Displacement magnitude.
    Amplitude,
    /// Noise domain offset along the vertex normal.
    Density,
    /// Overall displacement strength.
    Strength,
    /// Blend factor between the cool and deep fragment colors.
    ColorMix,
    /// Fragment alpha (the material is additive-blended).
    Opacity,
}

impl UniformKey {
    pub const ALL: [UniformKey; 6] = [
        UniformKey::Frequency,
        UniformKey::Amplitude,
        UniformKey::Density,
        UniformKey::Strength,
        UniformKey::ColorMix,
        UniformKey::Opacity,
    ];

    fn index(self) -> usize {
        match self {
            UniformKey::Frequency => 0,
            UniformKey::Amplitude => 1,
            UniformKey::Density => 2,
            UniformKey::Strength => 3,
            UniformKey::ColorMix => 4,
            UniformKey::Opacity => 5,
        }
    }
}

/// Start/end pair mapping scroll progress to a uniform target.
/// Immutable after construction.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct AnimationSetting {
    pub start: f64,
    pub end: f64,
}

impl AnimationSetting {
    pub fn new(start: f64, end: f64) -> Self {
        Self { start, end }
    }

    /// A setting that never moves; the stage skips tweens for these.
    pub fn fixed(value: f64) -> Self {
        Self {
            start: value,
            end: value,
        }
    }

    pub fn is_animated(&self) -> bool {
        self.start != self.end
    }

    /// Target value at scroll progress `normalized`.
    pub fn target(&self, normalized: f64) -> f64 {
        lerp(self.start, self.end, normalized)
    }
}

/// The full scroll-to-uniform mapping for the stage material.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct AnimationSettings {
    settings: [AnimationSetting; 6],
}

impl AnimationSettings {
    pub fn new(settings: [AnimationSetting; 6]) -> Self {
        Self { settings }
    }

    pub fn get(&self, key: UniformKey) -> AnimationSetting {
        self.settings[key.index()]
    }

    pub fn iter(&self) -> impl Iterator<Item = (UniformKey, AnimationSetting)> + '_ {
        UniformKey::ALL.iter().map(|&key| (key, self.get(key)))
    }
}

impl Default for AnimationSettings {
    /// The stage look: the wire sharpens and folds as the page scrolls while
    /// the color cools and the lines brighten.
    fn default() -> Self {
        Self::new([
            AnimationSetting::new(0.0, 4.0),   // frequency
            AnimationSetting::fixed(4.0),      // amplitude
            AnimationSetting::fixed(1.0),      // density
            AnimationSetting::new(0.0, 1.1),   // strength
            AnimationSetting::new(1.0, 0.0),   // color mix
            AnimationSetting::new(0.33, 0.66), // opacity
        ])
    }
}

/// Live uniform values, initialized from each setting's start and retargeted
/// over time by the tween engine.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct UniformSet {
    values: [f64; 6],
}

impl UniformSet {
    pub fn from_settings(settings: &AnimationSettings) -> Self {
        let mut values = [0.0; 6];
        for (key, setting) in settings.iter() {
            values[key.index()] = setting.start;
        }
        Self { values }
    }

    pub fn get(&self, key: UniformKey) -> f64 {
        self.values[key.index()]
    }

    pub fn set(&mut self, key: UniformKey, value: f64) {
        self.values[key.index()] = value;
    }

    /// Values in `UniformKey::ALL` order, narrowed for the GPU.
    pub fn to_f32_array(&self) -> [f32; 6] {
        let mut out = [0.0f32; 6];
        for (i, v) in self.values.iter().enumerate() {
            out[i] = *v as f32;
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::{AnimationSetting, AnimationSettings, UniformKey, UniformSet};

    #[test]
    fn target_interpolates_between_endpoints() {
        let setting = AnimationSetting::new(0.0, 4.0);
        assert_eq!(setting.target(0.5), 2.0);
        assert_eq!(setting.target(0.0), 0.0);
        assert_eq!(setting.target(1.0), 4.0);
    }

    #[test]
    fn fixed_settings_are_not_animated() {
        assert!(!AnimationSetting::fixed(4.0).is_animated());
        assert!(AnimationSetting::new(1.0, 0.0).is_animated());
    }

    #[test]
    fn default_mapping_animates_four_of_six_uniforms() {
        let settings = AnimationSettings::default();
        let animated: Vec<UniformKey> = settings
            .iter()
            .filter(|(_, s)| s.is_animated())
            .map(|(k, _)| k)
            .collect();
        assert_eq!(
            animated,
            vec![
                UniformKey::Frequency,
                UniformKey::Strength,
                UniformKey::ColorMix,
                UniformKey::Opacity,
            ]
        );
    }

    #[test]
    fn uniform_set_starts_at_setting_starts() {
        let settings = AnimationSettings::default();
        let uniforms = UniformSet::from_settings(&settings);
        assert_eq!(uniforms.get(UniformKey::Frequency), 0.0);
        assert_eq!(uniforms.get(UniformKey::Amplitude), 4.0);
        assert_eq!(uniforms.get(UniformKey::ColorMix), 1.0);
        assert_eq!(uniforms.get(UniformKey::Opacity), 0.33);
    }

    #[test]
    fn set_and_narrowing_preserve_order() {
        let mut uniforms = UniformSet::from_settings(&AnimationSettings::default());
        uniforms.set(UniformKey::Strength, 1.1);
        let arr = uniforms.to_f32_array();
        assert_eq!(arr[3], 1.1f32);
        assert_eq!(arr[1], 4.0f32);
    }
}
