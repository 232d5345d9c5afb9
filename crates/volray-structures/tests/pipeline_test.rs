//! End-to-end CPU pipeline tests: raw bytes in, draw calls out.

use std::sync::{Arc, RwLock};

use glam::{Mat4, UVec3, Vec4};
use winit::keyboard::KeyCode;

use volray_core::{
    PointUniforms, RenderContext, SampleFormat, Structure, TransferFunction, Volume,
};
use volray_render::OrbitCamera;
use volray_structures::RaycastVolume;

#[derive(Default)]
struct RecordingContext {
    uploads: Vec<PointUniforms>,
    draws: Vec<u32>,
}

impl RenderContext for RecordingContext {
    fn upload_point_uniforms(&mut self, uniforms: PointUniforms) {
        self.uploads.push(uniforms);
    }

    fn draw_points(&mut self, count: u32) {
        self.draws.push(count);
    }
}

fn shared_camera() -> Arc<RwLock<OrbitCamera>> {
    Arc::new(RwLock::new(OrbitCamera::new(16.0 / 9.0)))
}

/// An 8x8x8 volume where every voxel holds 128.
fn uniform_volume() -> Volume {
    Volume::from_bytes(vec![128; 512], UVec3::new(8, 8, 8), SampleFormat::U8).unwrap()
}

#[test]
fn test_uniform_volume_full_pipeline() {
    let _ = env_logger::builder().is_test(true).try_init();

    let camera = shared_camera();
    let mut entity = RaycastVolume::from_volume("head", uniform_volume(), &camera, 512);
    entity.set_transfer_function(Some(Arc::new(TransferFunction::opaque_grayscale())));

    // every voxel lands in bin 128
    assert_eq!(entity.histogram().bin_count(), 256);
    assert_eq!(entity.histogram().bins()[128], 512);
    assert_eq!(entity.histogram().total_count(), 512);

    entity.update();
    let cloud = entity.point_cloud();
    assert_eq!(cloud.len(), 512);

    // opaque grayscale at 128/255
    let expected = 128.0 / 255.0;
    for color in &cloud.colors {
        assert!((color.x - expected).abs() < 1e-5);
        assert!((color.y - expected).abs() < 1e-5);
        assert!((color.z - expected).abs() < 1e-5);
        assert!((color.w - 1.0).abs() < 1e-5);
    }

    let mut ctx = RecordingContext::default();
    entity.render(Mat4::IDENTITY, Mat4::IDENTITY, &mut ctx);
    assert_eq!(ctx.draws, vec![512]);
}

#[test]
fn test_load_from_raw_file() {
    let path = std::env::temp_dir().join("volray_pipeline_u16.raw");
    let data: Vec<u8> = (0..8u16)
        .flat_map(|v| (v * 4096).to_le_bytes())
        .collect();
    std::fs::write(&path, &data).unwrap();

    let camera = shared_camera();
    let entity = RaycastVolume::from_file(
        "strip",
        &path,
        UVec3::new(8, 1, 1),
        SampleFormat::U16,
        &camera,
        8,
    )
    .unwrap();
    assert_eq!(entity.volume().num_voxels(), 8);
    assert_eq!(entity.histogram().total_count(), 8);

    std::fs::remove_file(&path).ok();
}

#[test]
fn test_load_rejects_size_mismatch() {
    let path = std::env::temp_dir().join("volray_pipeline_short.raw");
    std::fs::write(&path, vec![0u8; 100]).unwrap();

    let camera = shared_camera();
    let result = RaycastVolume::from_file(
        "short",
        &path,
        UVec3::new(8, 8, 8),
        SampleFormat::U8,
        &camera,
        512,
    );
    assert!(result.is_err());

    std::fs::remove_file(&path).ok();
}

#[test]
fn test_resample_only_on_parameter_change() {
    let camera = shared_camera();
    let mut entity = RaycastVolume::from_volume("head", uniform_volume(), &camera, 512);
    entity.set_transfer_function(Some(Arc::new(TransferFunction::opaque_grayscale())));

    entity.update();
    entity.update();
    assert_eq!(entity.num_resamples(), 1);

    entity.handle_key(KeyCode::KeyP);
    entity.update();
    assert_eq!(entity.num_resamples(), 2);

    // hiding is a display toggle, not a sampling parameter
    entity.handle_key(KeyCode::KeyH);
    entity.update();
    assert_eq!(entity.num_resamples(), 2);
}

#[test]
fn test_hidden_and_orphaned_entities_skip_drawing() {
    let camera = shared_camera();
    let mut entity = RaycastVolume::from_volume("head", uniform_volume(), &camera, 512);
    entity.set_transfer_function(Some(Arc::new(TransferFunction::opaque_grayscale())));
    entity.update();

    entity.set_hide(true);
    let mut ctx = RecordingContext::default();
    entity.render(Mat4::IDENTITY, Mat4::IDENTITY, &mut ctx);
    assert!(ctx.draws.is_empty());

    entity.set_hide(false);
    drop(camera);
    let mut ctx = RecordingContext::default();
    entity.render(Mat4::IDENTITY, Mat4::IDENTITY, &mut ctx);
    assert!(ctx.draws.is_empty());
}

#[test]
fn test_fully_transparent_mapping_yields_empty_cloud() {
    let camera = shared_camera();
    let mut entity = RaycastVolume::from_volume("head", uniform_volume(), &camera, 512);
    entity.set_transfer_function(Some(Arc::new(TransferFunction::new(vec![
        Vec4::ZERO,
        Vec4::ZERO,
    ]))));

    entity.update();
    assert!(entity.point_cloud().is_empty());

    let mut ctx = RecordingContext::default();
    entity.render(Mat4::IDENTITY, Mat4::IDENTITY, &mut ctx);
    assert!(ctx.draws.is_empty());
}

#[test]
fn test_structure_trait_surface() {
    let camera = shared_camera();
    let mut entity = RaycastVolume::from_volume("head", uniform_volume(), &camera, 512);

    assert_eq!(entity.name(), "head");
    assert_eq!(entity.type_name(), "RaycastVolume");
    assert!(entity.is_enabled());

    entity.set_enabled(false);
    assert!(entity.hide());

    entity.set_transform(Mat4::from_scale(glam::Vec3::splat(2.0)));
    entity.reset_transform();
    assert_eq!(entity.transform(), Mat4::IDENTITY);
}
