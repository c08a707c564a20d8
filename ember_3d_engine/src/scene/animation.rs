/// Keyframe animation: splines, per-node samplers and playback
///
/// Sampling does not clamp: a query time before the first
/// keyframe or at/after the last one leaves the target value untouched.

use glam::{Quat, Vec3};

use crate::scene::{NodeId, NodeTree};

/// Keyframe interpolation mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Interpolation {
    #[default]
    Linear,
}

/// Value type a spline can interpolate
pub trait Keyframe: Copy {
    /// Value at `t` in `[0, 1]` between `from` and `to`
    fn interpolate(from: Self, to: Self, t: f32) -> Self;
}

impl Keyframe for Vec3 {
    fn interpolate(from: Self, to: Self, t: f32) -> Self {
        from.lerp(to, t)
    }
}

impl Keyframe for Quat {
    /// Shortest-path slerp, renormalized
    fn interpolate(from: Self, to: Self, t: f32) -> Self {
        from.slerp(to, t).normalize()
    }
}

/// Keyframed channel: parallel time and value arrays
#[derive(Debug, Clone, PartialEq)]
pub struct Spline<T> {
    pub times: Vec<f32>,
    pub values: Vec<T>,
    pub interpolation: Interpolation,
}

impl<T> Default for Spline<T> {
    fn default() -> Self {
        Self {
            times: Vec::new(),
            values: Vec::new(),
            interpolation: Interpolation::Linear,
        }
    }
}

impl<T: Keyframe> Spline<T> {
    pub fn new(times: Vec<f32>, values: Vec<T>, interpolation: Interpolation) -> Self {
        Self { times, values, interpolation }
    }

    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    /// Time of the last keyframe
    pub fn end_time(&self) -> Option<f32> {
        self.times.last().copied()
    }

    /// Evaluate the spline at `time` into `out`
    ///
    /// Searches the first interval `[times[i - 1], times[i])` containing
    /// `time`. When none does, `out` keeps its current value.
    ///
    /// # Returns
    ///
    /// `true` if `out` was written
    pub fn sample(&self, time: f32, out: &mut T) -> bool {
        let count = self.times.len().min(self.values.len());
        for i in 1..count {
            let (t0, t1) = (self.times[i - 1], self.times[i]);
            if t1 > time {
                if time < t0 {
                    return false;
                }
                let t = (time - t0) / (t1 - t0);
                *out = match self.interpolation {
                    Interpolation::Linear => T::interpolate(self.values[i - 1], self.values[i], t),
                };
                return true;
            }
        }
        false
    }
}

/// The three TRS channels driving one node
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnimationSampler {
    pub node: NodeId,
    pub translation: Spline<Vec3>,
    pub rotation: Spline<Quat>,
    pub scale: Spline<Vec3>,
}

impl AnimationSampler {
    pub fn new(node: NodeId) -> Self {
        Self { node, ..Self::default() }
    }

    /// Latest keyframe time across the three channels
    pub fn end_time(&self) -> f32 {
        [
            self.translation.end_time(),
            self.rotation.end_time(),
            self.scale.end_time(),
        ]
        .into_iter()
        .flatten()
        .fold(0.0, f32::max)
    }
}

/// Named set of samplers with a shared duration
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Animation {
    pub name: Option<String>,
    pub samplers: Vec<AnimationSampler>,
    /// Maximum keyframe time over all channels
    pub end_time: f32,
}

impl Animation {
    /// Build an animation, deriving `end_time` from its samplers
    pub fn new(name: Option<String>, samplers: Vec<AnimationSampler>) -> Self {
        let end_time = samplers.iter().map(AnimationSampler::end_time).fold(0.0, f32::max);
        Self { name, samplers, end_time }
    }

    /// Write the sampled TRS values at `time` into the target nodes
    pub fn apply(&self, time: f32, nodes: &mut NodeTree) {
        for sampler in &self.samplers {
            let Some(node) = nodes.get_mut(sampler.node) else {
                continue;
            };
            sampler.translation.sample(time, &mut node.translation);
            sampler.rotation.sample(time, &mut node.rotation);
            sampler.scale.sample(time, &mut node.scale);
        }
    }
}

/// Playback state of a model: which animation runs and where it is
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Playback {
    pub animation: Option<usize>,
    pub time: f32,
}

impl Playback {
    /// Advance by `dt`, wrapping once past `end_time`
    ///
    /// The wrap is a single subtraction; `dt` is expected to stay below one
    /// full cycle.
    pub fn advance(&mut self, dt: f32, end_time: f32) -> f32 {
        self.time += dt;
        if self.time > end_time {
            self.time -= end_time;
        }
        self.time
    }
}

#[cfg(test)]
#[path = "animation_tests.rs"]
mod tests;
