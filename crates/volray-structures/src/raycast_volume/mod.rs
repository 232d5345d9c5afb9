//! The raycast volume entity.
//!
//! `RaycastVolume` orchestrates the pipeline: it owns the volume and its
//! histogram, derives a colored point cloud through the sampler whenever the
//! sampling parameters or transfer function change, mirrors that cloud into
//! grow-only GPU buffers, and draws it under the shared orbit camera.

mod keys;

pub use keys::{KeyBindings, Toggle};

use std::path::Path;
use std::sync::{Arc, RwLock, Weak};

use glam::{Mat4, UVec3, Vec3};
use winit::keyboard::KeyCode;

use volray_core::{
    sample_volume, Histogram, Options, PointCloud, PointUniforms, RenderContext, Result,
    SampleFormat, SamplerSettings, Structure, TransferFunction, Volume,
};
use volray_render::{
    GpuContext, HistogramTexture, OrbitCamera, PointBufferSet, TransferFunctionTexture,
};

/// A volume rendered as a point-sampled raycast under an orbiting camera.
pub struct RaycastVolume {
    name: String,
    volume: Volume,
    histogram: Histogram,
    settings: SamplerSettings,
    options: Options,
    transform: Mat4,
    hide: bool,

    /// Set when the cached point cloud no longer matches the parameters.
    dirty: bool,
    point_cloud: PointCloud,
    resamples: u64,

    camera: Weak<RwLock<OrbitCamera>>,
    transfer_function: Option<Arc<TransferFunction>>,
    bindings: KeyBindings,

    // GPU state, populated lazily by commit_gpu
    render_data: Option<PointBufferSet>,
    histogram_texture: Option<HistogramTexture>,
    transfer_texture: Option<TransferFunctionTexture>,
    buffers_stale: bool,
    histogram_stale: bool,
    transfer_stale: bool,
}

impl RaycastVolume {
    /// Creates a raycast volume from an already-loaded volume.
    #[must_use]
    pub fn from_volume(
        name: impl Into<String>,
        volume: Volume,
        camera: &Arc<RwLock<OrbitCamera>>,
        sample_count: usize,
    ) -> Self {
        let options = Options::default();
        let histogram = Histogram::compute(&volume, options.histogram_bins);
        let settings = SamplerSettings {
            sample_count,
            opacity_threshold: options.opacity_threshold,
            ..SamplerSettings::default()
        };
        Self {
            name: name.into(),
            volume,
            histogram,
            settings,
            options,
            transform: Mat4::IDENTITY,
            hide: false,
            dirty: true,
            point_cloud: PointCloud::default(),
            resamples: 0,
            camera: Arc::downgrade(camera),
            transfer_function: None,
            bindings: KeyBindings::default(),
            render_data: None,
            histogram_texture: None,
            transfer_texture: None,
            buffers_stale: true,
            histogram_stale: true,
            transfer_stale: true,
        }
    }

    /// Loads a raw volume file and wraps it as a raycast volume.
    ///
    /// Fails when the source is unreadable or its size disagrees with the
    /// declared dimensions; no entity is created in that case.
    pub fn from_file(
        name: impl Into<String>,
        path: impl AsRef<Path>,
        dims: UVec3,
        format: SampleFormat,
        camera: &Arc<RwLock<OrbitCamera>>,
        sample_count: usize,
    ) -> Result<Self> {
        let volume = Volume::from_file(path, dims, format)?;
        Ok(Self::from_volume(name, volume, camera, sample_count))
    }

    /// Returns the underlying volume.
    #[must_use]
    pub fn volume(&self) -> &Volume {
        &self.volume
    }

    /// Returns the current intensity histogram.
    #[must_use]
    pub fn histogram(&self) -> &Histogram {
        &self.histogram
    }

    /// Recomputes the histogram from the volume and marks its display
    /// texture for re-upload. Bin counts are deterministic, so this is only
    /// useful after changing `Options::histogram_bins`.
    pub fn recompute_histogram(&mut self) {
        self.histogram = Histogram::compute(&self.volume, self.options.histogram_bins);
        self.histogram_stale = true;
    }

    /// Returns the histogram display texture, if GPU state exists.
    #[must_use]
    pub fn histogram_texture(&self) -> Option<&HistogramTexture> {
        self.histogram_texture.as_ref()
    }

    /// Returns the transfer function display texture, if GPU state exists.
    #[must_use]
    pub fn transfer_function_texture(&self) -> Option<&TransferFunctionTexture> {
        self.transfer_texture.as_ref()
    }

    /// Sets or clears the shared transfer function.
    ///
    /// `None` is valid and selects the passthrough mapping. Invalidates the
    /// cached point cloud.
    pub fn set_transfer_function(&mut self, transfer: Option<Arc<TransferFunction>>) {
        self.transfer_function = transfer;
        self.dirty = true;
        self.transfer_stale = true;
    }

    /// Returns the current transfer function, if set.
    #[must_use]
    pub fn transfer_function(&self) -> Option<&Arc<TransferFunction>> {
        self.transfer_function.as_ref()
    }

    /// Returns the current sampler settings.
    #[must_use]
    pub fn settings(&self) -> &SamplerSettings {
        &self.settings
    }

    /// Sets the requested sample count.
    pub fn set_sample_count(&mut self, sample_count: usize) {
        if self.settings.sample_count != sample_count {
            self.settings.sample_count = sample_count;
            self.dirty = true;
        }
    }

    /// Returns whether trilinear interpolation is enabled.
    #[must_use]
    pub fn interpolate(&self) -> bool {
        self.settings.interpolate
    }

    /// Enables or disables trilinear interpolation.
    pub fn set_interpolate(&mut self, interpolate: bool) {
        if self.settings.interpolate != interpolate {
            self.settings.interpolate = interpolate;
            self.dirty = true;
        }
    }

    /// Returns whether sampling jitter is enabled.
    #[must_use]
    pub fn perturbation(&self) -> bool {
        self.settings.perturbation
    }

    /// Enables or disables sampling jitter.
    pub fn set_perturbation(&mut self, perturbation: bool) {
        if self.settings.perturbation != perturbation {
            self.settings.perturbation = perturbation;
            self.dirty = true;
        }
    }

    /// Returns whether the volume is hidden.
    #[must_use]
    pub fn hide(&self) -> bool {
        self.hide
    }

    /// Hides or shows the volume. Does not invalidate the point cloud.
    pub fn set_hide(&mut self, hide: bool) {
        self.hide = hide;
    }

    /// Returns the configured key bindings.
    #[must_use]
    pub fn bindings(&self) -> &KeyBindings {
        &self.bindings
    }

    /// Replaces the key bindings.
    pub fn set_bindings(&mut self, bindings: KeyBindings) {
        self.bindings = bindings;
    }

    /// Forwards one pressed key, applying any bound toggle.
    pub fn handle_key(&mut self, key: KeyCode) {
        match self.bindings.toggle_for(key) {
            Some(Toggle::Interpolate) => self.set_interpolate(!self.settings.interpolate),
            Some(Toggle::Perturbation) => self.set_perturbation(!self.settings.perturbation),
            Some(Toggle::Hide) => self.set_hide(!self.hide),
            None => {}
        }
    }

    /// Returns the cached point cloud.
    #[must_use]
    pub fn point_cloud(&self) -> &PointCloud {
        &self.point_cloud
    }

    /// Returns whether the next `update()` will resample.
    #[must_use]
    pub fn needs_resample(&self) -> bool {
        self.dirty
    }

    /// Returns how many times the point cloud has been regenerated.
    #[must_use]
    pub fn num_resamples(&self) -> u64 {
        self.resamples
    }

    /// Re-derives the point cloud if sampling parameters or the transfer
    /// function changed since the last call; otherwise a no-op.
    pub fn update(&mut self) {
        if !self.dirty {
            return;
        }
        self.point_cloud = sample_volume(
            &self.volume,
            self.transfer_function.as_deref(),
            &self.settings,
        );
        self.dirty = false;
        self.buffers_stale = true;
        self.resamples += 1;
        log::debug!(
            "'{}' resampled: {} points (resample #{})",
            self.name,
            self.point_cloud.len(),
            self.resamples
        );
    }

    /// Pushes pending CPU state (point cloud, histogram, transfer function)
    /// to the device, creating GPU resources on first use.
    pub fn commit_gpu(&mut self, ctx: &GpuContext) {
        if self.buffers_stale || self.render_data.is_none() {
            match &mut self.render_data {
                Some(buffers) => buffers.commit(
                    &ctx.device,
                    &ctx.queue,
                    &ctx.point_bind_group_layout,
                    &self.point_cloud,
                ),
                None => {
                    self.render_data = Some(PointBufferSet::new(
                        &ctx.device,
                        &ctx.point_bind_group_layout,
                        &self.point_cloud,
                    ));
                }
            }
            self.buffers_stale = false;
        }

        if self.histogram_stale || self.histogram_texture.is_none() {
            let texture = self
                .histogram_texture
                .get_or_insert_with(|| HistogramTexture::new(&ctx.device, self.histogram.bin_count()));
            texture.update(&ctx.queue, &self.histogram);
            self.histogram_stale = false;
        }

        if self.transfer_stale || self.transfer_texture.is_none() {
            let texture = self
                .transfer_texture
                .get_or_insert_with(|| TransferFunctionTexture::new(&ctx.device));
            texture.update(&ctx.queue, self.transfer_function.as_deref());
            self.transfer_stale = false;
        }
    }

    /// Returns the committed GPU buffers, if any.
    #[must_use]
    pub fn render_data(&self) -> Option<&PointBufferSet> {
        self.render_data.as_ref()
    }

    /// Draws the point cloud.
    ///
    /// Combines the parent transform with the entity's local transform and
    /// the shared camera's current view. A hidden entity, an empty cloud, or
    /// a dead/poisoned camera handle all degrade to a silent no-op.
    pub fn render(&self, parent: Mat4, projection: Mat4, ctx: &mut dyn RenderContext) {
        if self.hide || self.point_cloud.is_empty() {
            return;
        }

        let Some(camera) = self.camera.upgrade() else {
            log::warn!("'{}': camera dropped, skipping draw", self.name);
            return;
        };
        let Ok(camera) = camera.read() else {
            log::warn!("'{}': camera lock poisoned, skipping draw", self.name);
            return;
        };
        let view = camera.view_matrix();
        drop(camera);

        let uniforms = PointUniforms {
            view_proj: (projection * view).to_cols_array_2d(),
            model: (parent * self.transform).to_cols_array_2d(),
            point_radius: self.options.point_radius,
            _padding: [0.0; 3],
        };
        ctx.upload_point_uniforms(uniforms);
        ctx.draw_points(self.point_cloud.len() as u32);
    }
}

impl Structure for RaycastVolume {
    fn name(&self) -> &str {
        &self.name
    }

    fn type_name(&self) -> &'static str {
        "RaycastVolume"
    }

    fn bounding_box(&self) -> Option<(Vec3, Vec3)> {
        let extent = self.volume.dims().as_vec3();
        let half = extent / (2.0 * extent.max_element());
        Some((-half, half))
    }

    fn transform(&self) -> Mat4 {
        self.transform
    }

    fn set_transform(&mut self, transform: Mat4) {
        self.transform = transform;
    }

    fn is_enabled(&self) -> bool {
        !self.hide
    }

    fn set_enabled(&mut self, enabled: bool) {
        self.hide = !enabled;
    }

    fn refresh(&mut self) {
        self.dirty = true;
        self.histogram_stale = true;
        self.transfer_stale = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec4;

    struct RecordingContext {
        uploads: Vec<PointUniforms>,
        draws: Vec<u32>,
    }

    impl RecordingContext {
        fn new() -> Self {
            Self {
                uploads: Vec::new(),
                draws: Vec::new(),
            }
        }
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
        Arc::new(RwLock::new(OrbitCamera::new(1.0)))
    }

    fn uniform_entity(camera: &Arc<RwLock<OrbitCamera>>) -> RaycastVolume {
        let volume =
            Volume::from_bytes(vec![128; 512], UVec3::new(8, 8, 8), SampleFormat::U8).unwrap();
        let mut entity = RaycastVolume::from_volume("vol", volume, camera, 512);
        entity.set_transfer_function(Some(Arc::new(TransferFunction::new(vec![
            Vec4::new(0.0, 0.0, 0.0, 1.0),
            Vec4::new(1.0, 1.0, 1.0, 1.0),
        ]))));
        entity
    }

    #[test]
    fn test_update_is_memoized() {
        let camera = shared_camera();
        let mut entity = uniform_entity(&camera);

        entity.update();
        assert_eq!(entity.num_resamples(), 1);
        assert_eq!(entity.point_cloud().len(), 512);

        entity.update();
        entity.update();
        assert_eq!(entity.num_resamples(), 1);
    }

    #[test]
    fn test_toggle_invalidates_exactly_once() {
        let camera = shared_camera();
        let mut entity = uniform_entity(&camera);
        entity.update();

        entity.set_interpolate(!entity.interpolate());
        assert!(entity.needs_resample());
        entity.update();
        assert_eq!(entity.num_resamples(), 2);
        entity.update();
        assert_eq!(entity.num_resamples(), 2);

        // setting to the current value is not a change
        entity.set_interpolate(entity.interpolate());
        assert!(!entity.needs_resample());
    }

    #[test]
    fn test_transfer_function_change_invalidates() {
        let camera = shared_camera();
        let mut entity = uniform_entity(&camera);
        entity.update();

        entity.set_transfer_function(None);
        assert!(entity.needs_resample());
        entity.update();
        assert_eq!(entity.num_resamples(), 2);
    }

    #[test]
    fn test_render_draws_current_point_count() {
        let camera = shared_camera();
        let mut entity = uniform_entity(&camera);
        entity.update();

        let mut ctx = RecordingContext::new();
        entity.render(Mat4::IDENTITY, Mat4::IDENTITY, &mut ctx);
        assert_eq!(ctx.draws, vec![512]);
        assert_eq!(ctx.uploads.len(), 1);
    }

    #[test]
    fn test_hidden_entity_issues_no_draw() {
        let camera = shared_camera();
        let mut entity = uniform_entity(&camera);
        entity.update();
        entity.set_hide(true);

        let mut ctx = RecordingContext::new();
        entity.render(Mat4::IDENTITY, Mat4::IDENTITY, &mut ctx);
        assert!(ctx.draws.is_empty());
        assert!(ctx.uploads.is_empty());
    }

    #[test]
    fn test_dropped_camera_is_a_safe_noop() {
        let camera = shared_camera();
        let mut entity = uniform_entity(&camera);
        entity.update();
        drop(camera);

        let mut ctx = RecordingContext::new();
        entity.render(Mat4::IDENTITY, Mat4::IDENTITY, &mut ctx);
        assert!(ctx.draws.is_empty());
    }

    #[test]
    fn test_key_toggles() {
        let camera = shared_camera();
        let mut entity = uniform_entity(&camera);
        entity.update();

        let interpolate = entity.interpolate();
        entity.handle_key(KeyCode::KeyI);
        assert_eq!(entity.interpolate(), !interpolate);
        assert!(entity.needs_resample());

        entity.update();
        entity.handle_key(KeyCode::KeyH);
        assert!(entity.hide());
        // hide alone never forces a resample
        assert!(!entity.needs_resample());

        entity.handle_key(KeyCode::KeyQ);
        assert!(!entity.needs_resample());
    }

    #[test]
    fn test_render_uniforms_combine_transforms() {
        let camera = shared_camera();
        let mut entity = uniform_entity(&camera);
        entity.update();
        entity.set_transform(Mat4::from_translation(Vec3::new(1.0, 0.0, 0.0)));

        let parent = Mat4::from_translation(Vec3::new(0.0, 2.0, 0.0));
        let mut ctx = RecordingContext::new();
        entity.render(parent, Mat4::IDENTITY, &mut ctx);

        let expected = parent * entity.transform();
        assert_eq!(ctx.uploads[0].model, expected.to_cols_array_2d());
    }

    #[test]
    fn test_structure_bounds_are_normalized() {
        let camera = shared_camera();
        let entity = uniform_entity(&camera);
        let (min, max) = entity.bounding_box().unwrap();
        assert!((max - min - Vec3::ONE).length() < 1e-6);
        assert!((min + max).length() < 1e-6);
    }
}
