//! Scene module
//!
//! Node arena, keyframe animation, skinning and the device-backed model.

pub mod node;
pub mod animation;
pub mod skin;
pub mod model;

pub use node::{DepthFirst, Node, NodeId, NodeTree};
pub use animation::{Animation, AnimationSampler, Interpolation, Keyframe, Playback, Spline};
pub use skin::{compute_joint_matrices, Skin, SkinData, SkinFrame};
pub use model::{Material, Model, TEXTURE_FORMAT};
