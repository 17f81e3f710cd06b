//! Keyed tween engine with overwrite semantics.
//!
//! Each channel carries at most one in-flight tween; retargeting a channel
//! replaces whatever was running there, so concurrent animations can never
//! fight over one property. Completed tweens land exactly on their target.

use foundation::math::interp::{ease_out_cubic, lerp};

/// Shared default duration for stage tweens (seconds).
pub const DEFAULT_DURATION_S: f64 = 6.6;

/// Easing curve applied over a tween's normalized progress.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum Ease {
    Linear,
    #[default]
    OutCubic,
}

impl Ease {
    pub fn apply(self, t: f64) -> f64 {
        match self {
            Ease::Linear => t.clamp(0.0, 1.0),
            Ease::OutCubic => ease_out_cubic(t),
        }
    }
}

/// Defaults applied to every tween issued through [`Tweener::go`].
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct TweenDefaults {
    pub duration_s: f64,
    pub ease: Ease,
}

impl Default for TweenDefaults {
    fn default() -> Self {
        Self {
            duration_s: DEFAULT_DURATION_S,
            ease: Ease::OutCubic,
        }
    }
}

#[derive(Debug, Copy, Clone)]
struct Tween {
    from: f64,
    to: f64,
    elapsed: f64,
    duration: f64,
    ease: Ease,
}

impl Tween {
    fn sample(&self) -> f64 {
        if self.duration <= 0.0 {
            return self.to;
        }
        lerp(self.from, self.to, self.ease.apply(self.elapsed / self.duration))
    }

    fn finished(&self) -> bool {
        self.elapsed >= self.duration
    }
}

/// Set of active tweens keyed by channel.
#[derive(Debug)]
pub struct Tweener<K> {
    defaults: TweenDefaults,
    active: Vec<(K, Tween)>,
}

impl<K: Copy + PartialEq> Tweener<K> {
    pub fn new(defaults: TweenDefaults) -> Self {
        Self {
            defaults,
            active: Vec::new(),
        }
    }

    /// Start a tween from `from` toward `to` on `key`, replacing any
    /// in-flight tween on the same channel.
    pub fn go(&mut self, key: K, from: f64, to: f64) {
        self.active.retain(|(k, _)| *k != key);
        self.active.push((
            key,
            Tween {
                from,
                to,
                elapsed: 0.0,
                duration: self.defaults.duration_s,
                ease: self.defaults.ease,
            },
        ));
    }

    /// Advance all tweens by `dt` seconds and return the sampled value for
    /// every live channel. A tween that reaches its duration reports its
    /// exact target and is removed.
    pub fn step(&mut self, dt: f64) -> Vec<(K, f64)> {
        let mut samples = Vec::with_capacity(self.active.len());
        for (key, tween) in &mut self.active {
            tween.elapsed += dt.max(0.0);
            samples.push((*key, tween.sample()));
        }
        self.active.retain(|(_, tween)| !tween.finished());
        samples
    }

    /// Target of the in-flight tween on `key`, if any.
    pub fn target_of(&self, key: K) -> Option<f64> {
        self.active
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, t)| t.to)
    }

    pub fn is_idle(&self) -> bool {
        self.active.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::{Ease, TweenDefaults, Tweener};

    fn tweener() -> Tweener<&'static str> {
        Tweener::new(TweenDefaults {
            duration_s: 1.0,
            ease: Ease::Linear,
        })
    }

    #[test]
    fn reaches_exact_target_at_duration() {
        let mut tw = tweener();
        tw.go("a", 0.0, 4.0);

        let mid = tw.step(0.5);
        assert_eq!(mid, vec![("a", 2.0)]);

        let done = tw.step(0.5);
        assert_eq!(done, vec![("a", 4.0)]);
        assert!(tw.is_idle());
    }

    #[test]
    fn overwrite_replaces_in_flight_tween() {
        let mut tw = tweener();
        tw.go("a", 0.0, 10.0);
        tw.step(0.5);

        // Retarget mid-flight: the old tween is gone, only the new runs.
        tw.go("a", 5.0, 0.0);
        assert_eq!(tw.target_of("a"), Some(0.0));

        let samples = tw.step(0.5);
        assert_eq!(samples, vec![("a", 2.5)]);
    }

    #[test]
    fn channels_advance_independently() {
        let mut tw = tweener();
        tw.go("a", 0.0, 1.0);
        tw.go("b", 2.0, 4.0);

        let samples = tw.step(0.5);
        assert!(samples.contains(&("a", 0.5)));
        assert!(samples.contains(&("b", 3.0)));
    }

    #[test]
    fn ease_out_lands_on_target() {
        let mut tw = Tweener::new(TweenDefaults {
            duration_s: 6.6,
            ease: Ease::OutCubic,
        });
        tw.go("a", 1.0, 0.0);

        let mut last = 1.0;
        for _ in 0..700 {
            for (_, v) in tw.step(0.01) {
                // Ease-out keeps the motion monotone toward the target.
                assert!(v <= last + 1e-12);
                last = v;
            }
        }
        assert_eq!(last, 0.0);
        assert!(tw.is_idle());
    }

    #[test]
    fn overshoot_step_clamps_to_target() {
        let mut tw = tweener();
        tw.go("a", 0.0, 2.0);
        let samples = tw.step(100.0);
        assert_eq!(samples, vec![("a", 2.0)]);
    }

    #[test]
    fn zero_duration_completes_immediately() {
        let mut tw = Tweener::new(TweenDefaults {
            duration_s: 0.0,
            ease: Ease::Linear,
        });
        tw.go("a", 0.0, 7.0);
        assert_eq!(tw.step(0.0), vec![("a", 7.0)]);
        assert!(tw.is_idle());
    }
}
