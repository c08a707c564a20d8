//! Integration tests: glTF loading through animation playback
//!
//! No GPU required. Assets are written to the temp directory with embedded
//! base64 buffers.
//!
//! Run with: cargo test --test animation_integration_tests

use ember_3d_engine::ember3d::resource::load_gltf;
use ember_3d_engine::ember3d::scene::{Camera, NodeId, Playback};
use ember_3d_engine::glam::{Mat4, Vec3, Vec4};
use std::path::PathBuf;

/// Triangle positions, u16 indices, keyframe times [0, 1] and translations [(0,0,0), (1,0,0)]
const BUFFER_URI: &str = "data:application/octet-stream;base64,AAAAAAAAAAAAAAAAAACAPwAAAAAAAAAAAAAAAAAAgD8AAAAAAAABAAIAAAAAAAAAAACAPwAAAAAAAAAAAAAAAAAAgD8AAAAAAAAAAA==";

fn write_asset(name: &str) -> PathBuf {
    let document = format!(
        r#"{{
  "asset": {{ "version": "2.0" }},
  "scene": 0,
  "scenes": [{{ "nodes": [0] }}],
  "nodes": [
    {{ "name": "base", "mesh": 0, "translation": [0.0, 1.0, 0.0], "children": [1] }},
    {{ "name": "arm", "mesh": 0, "translation": [0.0, 2.0, 0.0] }}
  ],
  "meshes": [{{ "primitives": [{{ "attributes": {{ "POSITION": 0 }}, "indices": 1 }}] }}],
  "animations": [{{
    "name": "swing",
    "channels": [{{ "sampler": 0, "target": {{ "node": 1, "path": "translation" }} }}],
    "samplers": [{{ "input": 2, "output": 3, "interpolation": "LINEAR" }}]
  }}],
  "buffers": [{{ "byteLength": 76, "uri": "{BUFFER_URI}" }}],
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
    );
    let dir = std::env::temp_dir().join(format!("ember3d_it_{}_{}", name, std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join(format!("{}.gltf", name));
    std::fs::write(&path, document).unwrap();
    path
}

fn world_translation(matrix: Mat4) -> Vec3 {
    matrix.w_axis.truncate()
}

#[test]
fn test_integration_playback_moves_child_in_world_space() {
    let mut asset = load_gltf(write_asset("playback")).unwrap();
    let animation = asset.animations[0].clone();
    assert_eq!(animation.end_time, 1.0);

    let mut playback = Playback { animation: Some(0), time: 0.0 };
    let time = playback.advance(0.25, animation.end_time);
    animation.apply(time, &mut asset.nodes);
    asset.nodes.update_transforms();

    let base = asset.nodes.get(NodeId(0)).unwrap();
    let arm = asset.nodes.get(NodeId(1)).unwrap();
    assert!(world_translation(base.world_matrix).abs_diff_eq(Vec3::new(0.0, 1.0, 0.0), 1e-6));
    // Child world = parent world * animated local
    assert!(world_translation(arm.world_matrix).abs_diff_eq(Vec3::new(0.25, 1.0, 0.0), 1e-6));
}

#[test]
fn test_integration_playback_wraps_past_end() {
    let mut asset = load_gltf(write_asset("wrap")).unwrap();
    let animation = asset.animations[0].clone();

    let mut playback = Playback { animation: Some(0), time: 0.0 };
    playback.advance(0.5, animation.end_time);
    let time = playback.advance(0.75, animation.end_time);
    assert!((time - 0.25).abs() < 1e-6);

    animation.apply(time, &mut asset.nodes);
    asset.nodes.update_transforms();
    let arm = asset.nodes.get(NodeId(1)).unwrap();
    assert!(arm.translation.abs_diff_eq(Vec3::new(0.25, 0.0, 0.0), 1e-6));
}

#[test]
fn test_integration_sampling_outside_keyframes_keeps_pose() {
    let mut asset = load_gltf(write_asset("outside")).unwrap();
    let animation = asset.animations[0].clone();

    animation.apply(5.0, &mut asset.nodes);
    let arm = asset.nodes.get(NodeId(1)).unwrap();
    assert_eq!(arm.translation, Vec3::new(0.0, 2.0, 0.0));
}

#[test]
fn test_integration_camera_sees_loaded_model() {
    let mut asset = load_gltf(write_asset("camera")).unwrap();
    asset.nodes.update_transforms();

    let camera = Camera::default();
    let view_projection = camera.view_projection(16.0 / 9.0);
    let base = asset.nodes.get(NodeId(0)).unwrap();

    // The base origin lands inside the clip volume
    let clip = view_projection * base.world_matrix * Vec4::new(0.0, 0.0, 0.0, 1.0);
    let ndc = clip.truncate() / clip.w;
    assert!(clip.w > 0.0);
    assert!(ndc.x.abs() <= 1.0 && ndc.y.abs() <= 1.0);
    assert!((0.0..=1.0).contains(&ndc.z));
}
