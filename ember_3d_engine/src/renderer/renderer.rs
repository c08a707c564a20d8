/// Renderer - the application's rendering context
///
/// A `Renderer<D>` owns the graphics device and everything created on it:
/// the skinned pipeline, the frame scheduler, the render targets and the
/// loaded models. It is constructed explicitly by the application; there is
/// no global renderer.
///
/// Dropping the renderer waits for the device to go idle, releases the frame
/// slots, and then drops models, targets and pipeline before the device.

use std::path::Path;

use crate::camera::Camera;
use crate::error::{Error, Result};
use crate::graphics_device::{
    BufferDesc, BufferUsage, DescriptorResource, DescriptorSetKind, Extent2D, GraphicsDevice,
    ImageLayout, ImageTarget, ImageTransition, PipelineDesc, Rect2D, RenderingInfo, Viewport,
    GLOBAL_SET, SWAPCHAIN_FORMAT,
};
use crate::renderer::{
    load_spirv, record_model, skinned_shader_paths, Config, DrawContext, FrameScheduler,
    FrameStats, RenderTargets, DEPTH_FORMAT,
};
use crate::resource::{load_gltf, DrawConstants, GlobalUniforms, ModelAsset, Vertex};
use crate::scene::Model;
use crate::{engine_error, engine_info};

/// Result of a `render` call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameStatus {
    /// A frame was recorded, submitted and presented
    Presented(FrameStats),
    /// The drawable extent is empty (minimized window), nothing was done
    Skipped,
}

pub struct Renderer<D: GraphicsDevice> {
    models: Vec<Model<D>>,
    pipeline: D::Pipeline,
    /// Bound as the joint set of meshes without a skin
    identity_joints: D::Buffer,
    identity_joint_set: D::DescriptorSet,
    targets: Option<RenderTargets<D>>,
    /// `None` only while dropping
    scheduler: Option<FrameScheduler<D>>,
    config: Config,
    device: D,
}

impl<D: GraphicsDevice> Renderer<D> {
    /// Create a renderer, loading the skinned shaders from `config.shader_dir`
    ///
    /// # Arguments
    ///
    /// * `device` - Graphics device, owned by the renderer from now on
    /// * `config` - Renderer configuration
    /// * `extent` - Current drawable size of the window
    pub fn new(device: D, config: Config, extent: Extent2D) -> Result<Self> {
        config.validate()?;
        let (vertex_path, fragment_path) = skinned_shader_paths(&config.shader_dir);
        let vertex_spirv = load_spirv(&vertex_path)?;
        let fragment_spirv = load_spirv(&fragment_path)?;
        Self::with_shaders(device, config, extent, &vertex_spirv, &fragment_spirv)
    }

    /// Create a renderer from already loaded SPIR-V
    pub fn with_shaders(
        mut device: D,
        config: Config,
        extent: Extent2D,
        vertex_spirv: &[u32],
        fragment_spirv: &[u32],
    ) -> Result<Self> {
        config.validate()?;

        let pipeline = device.create_pipeline(&PipelineDesc {
            vertex_spirv,
            fragment_spirv,
            vertex_layout: Vertex::layout(),
            color_format: SWAPCHAIN_FORMAT,
            depth_format: DEPTH_FORMAT,
            push_constant_size: std::mem::size_of::<DrawConstants>() as u32,
        })?;

        let identity_joints = device.create_buffer(&BufferDesc::host_visible(
            std::mem::size_of::<glam::Mat4>() as u64,
            BufferUsage::STORAGE,
        ))?;
        device.set_buffer_data(&identity_joints, 0, bytemuck::bytes_of(&glam::Mat4::IDENTITY))?;
        let identity_joint_set = device.allocate_descriptor_set(DescriptorSetKind::Joints)?;
        device.update_descriptor_set(
            identity_joint_set,
            0,
            DescriptorResource::StorageBuffer(&identity_joints),
        );

        let scheduler = FrameScheduler::new(&mut device, config.frames_in_flight)?;

        let mut renderer = Self {
            models: Vec::new(),
            pipeline,
            identity_joints,
            identity_joint_set,
            targets: None,
            scheduler: Some(scheduler),
            config,
            device,
        };
        if !extent.is_empty() {
            renderer.targets = Some(RenderTargets::create(&mut renderer.device, extent)?);
        }

        engine_info!(
            "ember3d::Renderer",
            "Renderer ready ({} frames in flight)",
            renderer.config.frames_in_flight
        );
        Ok(renderer)
    }

    pub fn device(&self) -> &D {
        &self.device
    }

    pub fn device_mut(&mut self) -> &mut D {
        &mut self.device
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn targets(&self) -> Option<&RenderTargets<D>> {
        self.targets.as_ref()
    }

    pub fn models(&self) -> &[Model<D>] {
        &self.models
    }

    pub fn model_mut(&mut self, index: usize) -> Option<&mut Model<D>> {
        self.models.get_mut(index)
    }

    /// Identity joint buffer bound for unskinned meshes
    pub fn identity_joints(&self) -> &D::Buffer {
        &self.identity_joints
    }

    fn scheduler(&self) -> Result<&FrameScheduler<D>> {
        self.scheduler
            .as_ref()
            .ok_or_else(|| Error::FrameFailed("renderer is shutting down".to_string()))
    }

    // ===== MODELS =====

    /// Load a glTF file and upload it
    ///
    /// # Returns
    ///
    /// Index of the new model. On failure the loaded models are untouched.
    pub fn load_model(&mut self, path: impl AsRef<Path>) -> Result<usize> {
        let asset = load_gltf(path)?;
        self.add_model(asset)
    }

    /// Upload an already loaded model
    pub fn add_model(&mut self, asset: ModelAsset) -> Result<usize> {
        let frames_in_flight = self.scheduler()?.frames_in_flight();
        let model = Model::upload(&mut self.device, asset, frames_in_flight)?;
        self.models.push(model);
        Ok(self.models.len() - 1)
    }

    // ===== FRAME =====

    /// Render one frame
    ///
    /// Drains pending transfers, rebuilds the render targets when `extent`
    /// changed, advances animations by `dt`, records every model and presents.
    ///
    /// # Arguments
    ///
    /// * `camera` - Viewpoint of the frame
    /// * `extent` - Current drawable size of the window
    /// * `dt` - Seconds since the previous frame
    pub fn render(&mut self, camera: &Camera, extent: Extent2D, dt: f32) -> Result<FrameStatus> {
        self.device.wait_for_transfers()?;

        if extent.is_empty() {
            return Ok(FrameStatus::Skipped);
        }
        self.ensure_targets(extent)?;

        let Self {
            models,
            pipeline,
            identity_joint_set,
            targets,
            scheduler,
            config,
            device,
            ..
        } = self;
        let scheduler = scheduler
            .as_mut()
            .ok_or_else(|| Error::FrameFailed("renderer is shutting down".to_string()))?;
        let targets = targets
            .as_ref()
            .ok_or_else(|| Error::FrameFailed("render targets missing".to_string()))?;

        let slot_index = scheduler.begin_frame(device)?;
        let slot = scheduler.slot(slot_index);

        let image_index = device
            .acquire_next_image(targets.swapchain(), slot.image_acquired)
            .map_err(|e| Error::FrameFailed(format!("acquire next image: {}", e)))?;

        for model in models.iter_mut() {
            model.update_animations(dt);
            model.update_transforms();
        }

        // ----- record -----
        let command_buffer = slot.command_buffer;
        device.begin_command_buffer(command_buffer)?;

        device.cmd_transition_image(
            command_buffer,
            ImageTransition {
                target: ImageTarget::Swapchain(targets.swapchain(), image_index),
                old_layout: ImageLayout::Undefined,
                new_layout: ImageLayout::ColorAttachment,
            },
        );
        device.cmd_transition_image(
            command_buffer,
            ImageTransition {
                target: ImageTarget::Image(targets.depth()),
                old_layout: ImageLayout::Undefined,
                new_layout: ImageLayout::DepthAttachment,
            },
        );

        let target_extent = targets.extent();
        device.cmd_begin_rendering(
            command_buffer,
            &RenderingInfo {
                swapchain: targets.swapchain(),
                image_index,
                depth: targets.depth(),
                render_area: Rect2D::from_extent(target_extent.width, target_extent.height),
                clear_color: config.clear_color,
                clear_depth: 1.0,
            },
        );
        device.cmd_bind_pipeline(command_buffer, pipeline);
        device.cmd_set_viewport(
            command_buffer,
            Viewport::from_extent(target_extent.width, target_extent.height),
        );
        device.cmd_set_scissor(
            command_buffer,
            Rect2D::from_extent(target_extent.width, target_extent.height),
        );

        let uniforms = GlobalUniforms {
            view_projection: camera.view_projection(target_extent.aspect_ratio()),
        };
        device.set_buffer_data(&slot.global_uniforms, 0, bytemuck::bytes_of(&uniforms))?;
        device.cmd_bind_descriptor_set(command_buffer, pipeline, GLOBAL_SET, slot.global_set);

        let context = DrawContext {
            command_buffer,
            pipeline: &*pipeline,
            slot: slot_index,
            identity_joints: *identity_joint_set,
        };
        let mut stats = FrameStats::default();
        for model in models.iter_mut() {
            stats += record_model(device, &context, model)?;
        }

        device.cmd_end_rendering(command_buffer);
        device.cmd_transition_image(
            command_buffer,
            ImageTransition {
                target: ImageTarget::Swapchain(targets.swapchain(), image_index),
                old_layout: ImageLayout::ColorAttachment,
                new_layout: ImageLayout::PresentSrc,
            },
        );
        device.end_command_buffer(command_buffer)?;

        // ----- submit & present -----
        scheduler.submit(device, slot_index)?;
        device
            .present(targets.swapchain(), image_index, slot.render_finished)
            .map_err(|e| Error::FrameFailed(format!("present: {}", e)))?;

        Ok(FrameStatus::Presented(stats))
    }

    /// Rebuild the render targets when missing or sized for another extent
    fn ensure_targets(&mut self, extent: Extent2D) -> Result<()> {
        if self.targets.as_ref().is_some_and(|targets| !targets.is_outdated(extent)) {
            return Ok(());
        }
        self.device.wait_idle()?;
        // Old depth image, views and swapchain go before anything new exists
        self.targets = None;
        self.targets = Some(RenderTargets::create(&mut self.device, extent)?);
        engine_info!(
            "ember3d::Renderer",
            "Render targets resized to {}x{}",
            extent.width,
            extent.height
        );
        Ok(())
    }
}

impl<D: GraphicsDevice> Drop for Renderer<D> {
    fn drop(&mut self) {
        if let Err(error) = self.device.wait_for_transfers() {
            engine_error!("ember3d::Renderer", "Failed to drain transfers at shutdown: {}", error);
        }
        if let Some(scheduler) = self.scheduler.take() {
            if let Err(error) = scheduler.destroy(&mut self.device) {
                engine_error!("ember3d::Renderer", "Failed to release frame slots: {}", error);
            }
        }
    }
}

#[cfg(test)]
#[path = "renderer_tests.rs"]
mod tests;
