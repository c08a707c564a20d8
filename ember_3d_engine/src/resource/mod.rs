//! Resource module
//!
//! GPU data layouts, the CPU model description and the glTF loader.

pub mod vertex;
pub mod model_asset;
pub mod gltf_loader;

pub use vertex::{DrawConstants, GlobalUniforms, MaterialUniforms, Mesh, Primitive, Vertex};
pub use model_asset::{MaterialAsset, ModelAsset, TextureAsset};
pub use gltf_loader::load_gltf;
