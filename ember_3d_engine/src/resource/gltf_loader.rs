/// glTF 2.0 loader
///
/// Reads a `.gltf` or `.glb` file into a [`ModelAsset`]: the node hierarchy of
/// the default scene, every mesh flattened into one vertex and one index
/// array, metallic-roughness materials with decoded base-color textures,
/// skins and linear TRS animations.
///
/// Buffers and images are resolved from the GLB binary chunk, base64 `data:`
/// URIs or files relative to the model.

use std::path::{Path, PathBuf};

use base64::Engine;
use glam::{Mat4, Quat, Vec3, Vec4};
use rustc_hash::FxHashMap;

use crate::error::{Error, Result};
use crate::resource::{MaterialAsset, Mesh, ModelAsset, Primitive, TextureAsset, Vertex};
use crate::scene::{Animation, AnimationSampler, Interpolation, Node, NodeId, NodeTree, SkinData, Spline};
use crate::{engine_info, engine_warn};

/// Material extension the loader refuses
pub const SPECULAR_GLOSSINESS_EXTENSION: &str = "KHR_materials_pbrSpecularGlossiness";

fn load_error(path: &Path, message: impl std::fmt::Display) -> Error {
    Error::LoadFailed(format!("{}: {}", path.display(), message))
}

/// Load a glTF model from disk
///
/// # Arguments
///
/// * `path` - `.gltf` or `.glb` file
///
/// # Returns
///
/// The CPU-side model, or `Error::LoadFailed` naming the file and the cause
pub fn load_gltf(path: impl AsRef<Path>) -> Result<ModelAsset> {
    let path = path.as_ref();
    let gltf = gltf::Gltf::open(path).map_err(|e| load_error(path, e))?;
    let base_dir = path.parent().map(Path::to_path_buf).unwrap_or_default();

    check_extensions(gltf.extensions_used()).map_err(|e| load_error(path, e))?;

    let buffers = load_buffers(&gltf, &base_dir).map_err(|e| load_error(path, e))?;
    let loader = GltfLoader {
        document: &gltf.document,
        buffers: &buffers,
        base_dir,
    };
    let asset = loader.load(model_name(path)).map_err(|e| load_error(path, e))?;

    engine_info!(
        "ember3d::GltfLoader",
        "Loaded '{}': {} nodes, {} meshes, {} materials, {} skins, {} animations",
        path.display(),
        asset.nodes.len(),
        asset.meshes.len(),
        asset.materials.len(),
        asset.skins.len(),
        asset.animations.len()
    );
    Ok(asset)
}

fn model_name(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "model".to_string())
}

/// Reject documents relying on an unsupported material workflow
pub fn check_extensions<'a>(mut extensions: impl Iterator<Item = &'a str>) -> std::result::Result<(), String> {
    if extensions.any(|name| name == SPECULAR_GLOSSINESS_EXTENSION) {
        return Err("unsupported material workflow (specular-glossiness)".to_string());
    }
    Ok(())
}

/// Map a glTF sampler interpolation to the engine's
pub fn map_interpolation(
    interpolation: gltf::animation::Interpolation,
) -> std::result::Result<Interpolation, String> {
    match interpolation {
        gltf::animation::Interpolation::Linear => Ok(Interpolation::Linear),
        other => Err(format!("unsupported animation interpolation {:?}", other)),
    }
}

/// Decode a base64 `data:` URI
pub fn decode_data_uri(uri: &str) -> std::result::Result<Vec<u8>, String> {
    let Some(rest) = uri.strip_prefix("data:") else {
        return Err(format!("not a data URI: {}", truncate(uri)));
    };
    let Some((media, payload)) = rest.split_once(',') else {
        return Err("malformed data URI".to_string());
    };
    if !media.ends_with(";base64") {
        return Err(format!("unsupported data URI encoding '{}'", media));
    }
    base64::engine::general_purpose::STANDARD
        .decode(payload)
        .map_err(|e| format!("invalid base64 in data URI: {}", e))
}

fn truncate(uri: &str) -> &str {
    match uri.char_indices().nth(48) {
        Some((index, _)) => &uri[..index],
        None => uri,
    }
}

fn read_uri(base_dir: &Path, uri: &str) -> std::result::Result<Vec<u8>, String> {
    if uri.starts_with("data:") {
        return decode_data_uri(uri);
    }
    let file: PathBuf = base_dir.join(uri);
    std::fs::read(&file).map_err(|e| format!("failed to read '{}': {}", file.display(), e))
}

fn load_buffers(gltf: &gltf::Gltf, base_dir: &Path) -> std::result::Result<Vec<Vec<u8>>, String> {
    let mut buffers = Vec::with_capacity(gltf.buffers().len());
    for buffer in gltf.buffers() {
        let mut data = match buffer.source() {
            gltf::buffer::Source::Bin => gltf
                .blob
                .clone()
                .ok_or_else(|| "GLB binary chunk referenced but missing".to_string())?,
            gltf::buffer::Source::Uri(uri) => read_uri(base_dir, uri)?,
        };
        if data.len() < buffer.length() {
            return Err(format!(
                "buffer {} holds {} bytes, {} declared",
                buffer.index(),
                data.len(),
                buffer.length()
            ));
        }
        // GLB chunks are padded to 4 bytes
        data.truncate(buffer.length());
        buffers.push(data);
    }
    Ok(buffers)
}

// ============================================================================
// Document traversal
// ============================================================================

type LoadResult<T> = std::result::Result<T, String>;

struct GltfLoader<'a> {
    document: &'a gltf::Document,
    buffers: &'a [Vec<u8>],
    base_dir: PathBuf,
}

impl<'a> GltfLoader<'a> {
    fn load(&self, name: String) -> LoadResult<ModelAsset> {
        let mut asset = ModelAsset {
            name,
            ..ModelAsset::default()
        };

        let node_ids = self.load_nodes(&mut asset.nodes)?;
        asset.materials = self.load_materials()?;
        self.load_meshes(&mut asset)?;
        asset.skins = self.load_skins(&node_ids)?;
        asset.animations = self.load_animations(&node_ids)?;

        Ok(asset)
    }

    /// Copy the default scene into the arena; returns glTF index to `NodeId`
    fn load_nodes(&self, tree: &mut NodeTree) -> LoadResult<FxHashMap<usize, NodeId>> {
        let mut node_ids = FxHashMap::default();
        let Some(scene) = self.document.default_scene().or_else(|| self.document.scenes().next()) else {
            engine_warn!("ember3d::GltfLoader", "Document has no scene, model will be empty");
            return Ok(node_ids);
        };

        let mut stack: Vec<(gltf::Node<'_>, Option<NodeId>)> =
            scene.nodes().map(|node| (node, None)).collect();
        stack.reverse();
        while let Some((node, parent)) = stack.pop() {
            if node_ids.contains_key(&node.index()) {
                return Err(format!("node {} appears twice in the hierarchy", node.index()));
            }
            let (translation, rotation, scale) = node.transform().decomposed();
            let id = tree.add_node(
                Node {
                    name: node.name().map(str::to_string),
                    translation: Vec3::from(translation),
                    rotation: Quat::from_array(rotation),
                    scale: Vec3::from(scale),
                    mesh: node.mesh().map(|mesh| mesh.index()),
                    skin: node.skin().map(|skin| skin.index()),
                    ..Node::default()
                },
                parent,
            );
            node_ids.insert(node.index(), id);
            // Reverse so children pop in document order
            let children: Vec<_> = node.children().collect();
            stack.extend(children.into_iter().rev().map(|child| (child, Some(id))));
        }
        Ok(node_ids)
    }

    fn load_materials(&self) -> LoadResult<Vec<MaterialAsset>> {
        self.document
            .materials()
            .map(|material| {
                let pbr = material.pbr_metallic_roughness();
                let base_color_texture = match pbr.base_color_texture() {
                    Some(info) => Some(self.load_texture(info.texture())?),
                    None => None,
                };
                Ok(MaterialAsset {
                    name: material.name().map(str::to_string),
                    base_color_factor: Vec4::from(pbr.base_color_factor()),
                    metallic: pbr.metallic_factor(),
                    roughness: pbr.roughness_factor(),
                    base_color_texture,
                })
            })
            .collect()
    }

    fn load_texture(&self, texture: gltf::Texture<'_>) -> LoadResult<TextureAsset> {
        let image = texture.source();
        let bytes: Vec<u8> = match image.source() {
            gltf::image::Source::View { view, .. } => {
                let buffer = self
                    .buffers
                    .get(view.buffer().index())
                    .ok_or_else(|| format!("image {} references a missing buffer", image.index()))?;
                let end = view.offset() + view.length();
                buffer
                    .get(view.offset()..end)
                    .ok_or_else(|| format!("image {} view out of range", image.index()))?
                    .to_vec()
            }
            gltf::image::Source::Uri { uri, .. } => read_uri(&self.base_dir, uri)?,
        };
        let decoded = ::image::load_from_memory(&bytes)
            .map_err(|e| format!("failed to decode image {}: {}", image.index(), e))?
            .to_rgba8();
        Ok(TextureAsset {
            width: decoded.width(),
            height: decoded.height(),
            pixels: decoded.into_raw(),
        })
    }

    /// Flatten every mesh into the shared vertex and index arrays
    ///
    /// Primitives without a material get a default one appended to the list.
    fn load_meshes(&self, asset: &mut ModelAsset) -> LoadResult<()> {
        let buffers = self.buffers;
        let mut default_material: Option<usize> = None;

        for mesh in self.document.meshes() {
            let first_primitive = asset.primitives.len();
            for primitive in mesh.primitives() {
                if primitive.mode() != gltf::mesh::Mode::Triangles {
                    engine_warn!(
                        "ember3d::GltfLoader",
                        "Skipping primitive {} of mesh {}: mode {:?} is not triangles",
                        primitive.index(),
                        mesh.index(),
                        primitive.mode()
                    );
                    continue;
                }

                let material = match primitive.material().index() {
                    Some(index) => index,
                    None => *default_material.get_or_insert_with(|| {
                        asset.materials.push(MaterialAsset::default());
                        asset.materials.len() - 1
                    }),
                };
                let textured = asset
                    .materials
                    .get(material)
                    .is_some_and(|m| m.base_color_texture.is_some());

                let reader = primitive.reader(|buffer| buffers.get(buffer.index()).map(Vec::as_slice));
                let positions: Vec<[f32; 3]> = reader
                    .read_positions()
                    .ok_or_else(|| {
                        format!("mesh {} primitive {} has no POSITION", mesh.index(), primitive.index())
                    })?
                    .collect();
                let count = positions.len();

                let normals: Vec<[f32; 3]> = reader
                    .read_normals()
                    .map(Iterator::collect)
                    .unwrap_or_else(|| vec![[0.0; 3]; count]);
                let tex_coords: Vec<[f32; 2]> = match reader.read_tex_coords(0) {
                    Some(coords) => coords.into_f32().collect(),
                    None if textured => {
                        return Err(format!(
                            "mesh {} primitive {} is textured but has no TEXCOORD_0",
                            mesh.index(),
                            primitive.index()
                        ))
                    }
                    None => vec![[0.0; 2]; count],
                };
                let joints: Vec<[u32; 4]> = reader
                    .read_joints(0)
                    .map(|joints| joints.into_u16().map(|j| j.map(u32::from)).collect())
                    .unwrap_or_else(|| vec![[0; 4]; count]);
                let weights: Vec<[f32; 4]> = reader
                    .read_weights(0)
                    .map(|weights| weights.into_f32().collect())
                    .unwrap_or_else(|| vec![[0.0; 4]; count]);

                if [normals.len(), tex_coords.len(), joints.len(), weights.len()]
                    .iter()
                    .any(|len| *len != count)
                {
                    return Err(format!(
                        "mesh {} primitive {} has attributes of different lengths",
                        mesh.index(),
                        primitive.index()
                    ));
                }

                let indices: Vec<u32> = reader
                    .read_indices()
                    .ok_or_else(|| {
                        format!("mesh {} primitive {} has no indices", mesh.index(), primitive.index())
                    })?
                    .into_u32()
                    .collect();
                if let Some(bad) = indices.iter().find(|i| **i as usize >= count) {
                    return Err(format!(
                        "mesh {} primitive {} index {} out of range ({} vertices)",
                        mesh.index(),
                        primitive.index(),
                        bad,
                        count
                    ));
                }

                let vertex_offset = asset.vertices.len() as u32;
                let first_index = asset.indices.len() as u32;
                asset.vertices.extend((0..count).map(|i| Vertex {
                    position: positions[i],
                    normal: normals[i],
                    tex_coord: tex_coords[i],
                    joints: joints[i],
                    weights: weights[i],
                }));
                asset.indices.extend(indices.iter().map(|i| i + vertex_offset));
                asset.primitives.push(Primitive {
                    first_index,
                    index_count: indices.len() as u32,
                    material: Some(material),
                });
            }
            asset.meshes.push(Mesh {
                first_primitive,
                primitive_count: asset.primitives.len() - first_primitive,
            });
        }
        Ok(())
    }

    fn load_skins(&self, node_ids: &FxHashMap<usize, NodeId>) -> LoadResult<Vec<SkinData>> {
        let buffers = self.buffers;
        self.document
            .skins()
            .map(|skin| {
                let joints = skin
                    .joints()
                    .map(|joint| {
                        node_ids.get(&joint.index()).copied().ok_or_else(|| {
                            format!(
                                "skin {} joint node {} is not part of the scene",
                                skin.index(),
                                joint.index()
                            )
                        })
                    })
                    .collect::<LoadResult<Vec<NodeId>>>()?;

                let reader = skin.reader(|buffer| buffers.get(buffer.index()).map(Vec::as_slice));
                let inverse_bind_matrices: Vec<Mat4> = match reader.read_inverse_bind_matrices() {
                    Some(matrices) => matrices.map(|m| Mat4::from_cols_array_2d(&m)).collect(),
                    None => vec![Mat4::IDENTITY; joints.len()],
                };
                if inverse_bind_matrices.len() < joints.len() {
                    return Err(format!(
                        "skin {} has {} inverse bind matrices for {} joints",
                        skin.index(),
                        inverse_bind_matrices.len(),
                        joints.len()
                    ));
                }

                Ok(SkinData {
                    name: skin.name().map(str::to_string),
                    inverse_bind_matrices,
                    joints,
                })
            })
            .collect()
    }

    fn load_animations(&self, node_ids: &FxHashMap<usize, NodeId>) -> LoadResult<Vec<Animation>> {
        let buffers = self.buffers;
        let mut animations = Vec::new();
        for animation in self.document.animations() {
            let mut samplers: FxHashMap<NodeId, AnimationSampler> = FxHashMap::default();
            let mut order: Vec<NodeId> = Vec::new();

            for channel in animation.channels() {
                let target = channel.target();
                let Some(&node) = node_ids.get(&target.node().index()) else {
                    engine_warn!(
                        "ember3d::GltfLoader",
                        "Animation {} targets node {} outside the scene, channel ignored",
                        animation.index(),
                        target.node().index()
                    );
                    continue;
                };
                let interpolation = map_interpolation(channel.sampler().interpolation())?;

                let reader = channel.reader(|buffer| buffers.get(buffer.index()).map(Vec::as_slice));
                let times: Vec<f32> = reader
                    .read_inputs()
                    .ok_or_else(|| format!("animation {} channel has no input", animation.index()))?
                    .collect();
                let outputs = reader
                    .read_outputs()
                    .ok_or_else(|| format!("animation {} channel has no output", animation.index()))?;

                let sampler = samplers.entry(node).or_insert_with(|| {
                    order.push(node);
                    AnimationSampler::new(node)
                });
                match outputs {
                    gltf::animation::util::ReadOutputs::Translations(values) => {
                        sampler.translation =
                            Spline::new(times, values.map(Vec3::from).collect(), interpolation);
                    }
                    gltf::animation::util::ReadOutputs::Rotations(values) => {
                        sampler.rotation = Spline::new(
                            times,
                            values.into_f32().map(Quat::from_array).collect(),
                            interpolation,
                        );
                    }
                    gltf::animation::util::ReadOutputs::Scales(values) => {
                        sampler.scale =
                            Spline::new(times, values.map(Vec3::from).collect(), interpolation);
                    }
                    gltf::animation::util::ReadOutputs::MorphTargetWeights(_) => {}
                }
            }

            let samplers = order
                .into_iter()
                .filter_map(|node| samplers.remove(&node))
                .collect();
            animations.push(Animation::new(animation.name().map(str::to_string), samplers));
        }
        Ok(animations)
    }
}

#[cfg(test)]
#[path = "gltf_loader_tests.rs"]
mod tests;
