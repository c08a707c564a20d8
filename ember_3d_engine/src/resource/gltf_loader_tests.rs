use std::path::PathBuf;

use glam::{Vec3, Vec4};

use super::*;

/// Positions of one triangle, u16 indices, two keyframe times and two translations
const TRIANGLE_BUFFER: &str = "data:application/octet-stream;base64,AAAAAAAAAAAAAAAAAACAPwAAAAAAAAAAAAAAAAAAgD8AAAAAAAABAAIAAAAAAAAAAACAPwAAAAAAAAAAAAAAAAAAgD8AAAAAAAAAAA==";

fn triangle_document(interpolation: &str, extensions_used: &str) -> String {
    format!(
        r#"{{
  "asset": {{ "version": "2.0" }},
  "extensionsUsed": [{extensions_used}],
  "scene": 0,
  "scenes": [{{ "nodes": [0] }}],
  "nodes": [
    {{ "name": "root", "mesh": 0, "children": [1] }},
    {{ "name": "tip", "translation": [0.0, 2.0, 0.0] }}
  ],
  "meshes": [{{ "primitives": [{{ "attributes": {{ "POSITION": 0 }}, "indices": 1 }}] }}],
  "animations": [{{
    "name": "slide",
    "channels": [{{ "sampler": 0, "target": {{ "node": 1, "path": "translation" }} }}],
    "samplers": [{{ "input": 2, "output": 3, "interpolation": "{interpolation}" }}]
  }}],
  "buffers": [{{ "byteLength": 76, "uri": "{TRIANGLE_BUFFER}" }}],
  "bufferViews": [
    {{ "buffer": 0, "byteOffset": 0, "byteLength": 36 }},
    {{ "buffer": 0, "byteOffset": 36, "byteLength": 6 }},
    {{ "buffer": 0, "byteOffset": 44, "byteLength": 8 }},
    {{ "buffer": 0, "byteOffset": 52, "byteLength": 24 }}
  ],
  "accessors": [
    {{ "bufferView": 0, "componentType": 5126, "count": 3, "type": "VEC3", "min": [0.0, 0.0, 0.0], "max": [1.0, 1.0, 0.0] }},
    {{ "bufferView": 1, "componentType": 5123, "count": 3, "type": "SCALAR" }},
    {{ "bufferView": 2, "componentType": 5126, "count": 2, "type": "SCALAR", "min": [0.0], "max": [1.0] }},
    {{ "bufferView": 3, "componentType": 5126, "count": 2, "type": "VEC3" }}
  ]
}}"#
    )
}

fn write_temp_gltf(name: &str, contents: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("ember3d_gltf_{}_{}", name, std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join(format!("{}.gltf", name));
    std::fs::write(&path, contents).unwrap();
    path
}

// ============================================================================
// Helpers
// ============================================================================

#[test]
fn test_map_interpolation() {
    assert_eq!(
        map_interpolation(gltf::animation::Interpolation::Linear),
        Ok(Interpolation::Linear)
    );
    assert!(map_interpolation(gltf::animation::Interpolation::Step).is_err());
    assert!(map_interpolation(gltf::animation::Interpolation::CubicSpline).is_err());
}

#[test]
fn test_check_extensions() {
    assert!(check_extensions(["KHR_texture_transform"].into_iter()).is_ok());
    assert!(check_extensions(std::iter::empty()).is_ok());
    let error = check_extensions(["KHR_texture_transform", SPECULAR_GLOSSINESS_EXTENSION].into_iter())
        .unwrap_err();
    assert!(error.contains("unsupported material workflow"));
}

#[test]
fn test_decode_data_uri() {
    assert_eq!(decode_data_uri("data:application/gltf-buffer;base64,AQID"), Ok(vec![1, 2, 3]));
    assert_eq!(decode_data_uri("data:image/png;base64,"), Ok(vec![]));
    assert!(decode_data_uri("data:text/plain,hello").is_err());
    assert!(decode_data_uri("data:application/octet-stream;base64").is_err());
    assert!(decode_data_uri("textures/albedo.png").is_err());
    assert!(decode_data_uri("data:application/octet-stream;base64,!!!").is_err());
}

// ============================================================================
// Whole-file loading
// ============================================================================

#[test]
fn test_load_triangle() {
    let path = write_temp_gltf("triangle", &triangle_document("LINEAR", ""));

    let asset = load_gltf(&path).unwrap();

    assert_eq!(asset.name, "triangle");
    assert_eq!(asset.nodes.len(), 2);
    assert_eq!(asset.nodes.roots(), &[NodeId(0)]);
    let root = asset.nodes.get(NodeId(0)).unwrap();
    assert_eq!(root.name.as_deref(), Some("root"));
    assert_eq!(root.mesh, Some(0));
    assert_eq!(root.children, vec![NodeId(1)]);
    assert_eq!(asset.nodes.get(NodeId(1)).unwrap().translation, Vec3::new(0.0, 2.0, 0.0));

    assert_eq!(asset.vertices.len(), 3);
    assert_eq!(asset.vertices[1].position, [1.0, 0.0, 0.0]);
    assert_eq!(asset.vertices[1].normal, [0.0; 3]);
    assert_eq!(asset.vertices[1].weights, [0.0; 4]);
    assert_eq!(asset.indices, vec![0, 1, 2]);
    assert_eq!(asset.meshes, vec![Mesh { first_primitive: 0, primitive_count: 1 }]);
    assert_eq!(
        asset.primitives,
        vec![Primitive { first_index: 0, index_count: 3, material: Some(0) }]
    );
}

#[test]
fn test_primitive_without_material_gets_default() {
    let path = write_temp_gltf("default_material", &triangle_document("LINEAR", ""));

    let asset = load_gltf(&path).unwrap();

    assert_eq!(asset.materials.len(), 1);
    assert_eq!(asset.materials[0].base_color_factor, Vec4::ONE);
    assert!(asset.materials[0].base_color_texture.is_none());
    assert!(asset.needs_default_texture());
}

#[test]
fn test_load_animation_channels() {
    let path = write_temp_gltf("animated", &triangle_document("LINEAR", ""));

    let asset = load_gltf(&path).unwrap();

    assert_eq!(asset.animations.len(), 1);
    let animation = &asset.animations[0];
    assert_eq!(animation.name.as_deref(), Some("slide"));
    assert_eq!(animation.end_time, 1.0);
    assert_eq!(animation.samplers.len(), 1);
    let sampler = &animation.samplers[0];
    assert_eq!(sampler.node, NodeId(1));
    assert!(sampler.rotation.is_empty());

    let mut out = Vec3::ZERO;
    assert!(sampler.translation.sample(0.5, &mut out));
    assert!(out.abs_diff_eq(Vec3::new(0.5, 0.0, 0.0), 1e-6));
}

#[test]
fn test_step_interpolation_fails_load() {
    let path = write_temp_gltf("step", &triangle_document("STEP", ""));

    let result = load_gltf(&path);

    assert!(matches!(result, Err(Error::LoadFailed(message)) if message.contains("interpolation")));
}

#[test]
fn test_specular_glossiness_fails_load() {
    let path = write_temp_gltf(
        "specgloss",
        &triangle_document("LINEAR", "\"KHR_materials_pbrSpecularGlossiness\""),
    );

    let result = load_gltf(&path);

    assert!(matches!(result, Err(Error::LoadFailed(message)) if message.contains("material workflow")));
}

#[test]
fn test_missing_file_fails_load() {
    let result = load_gltf("does/not/exist.gltf");
    assert!(matches!(result, Err(Error::LoadFailed(_))));
}
