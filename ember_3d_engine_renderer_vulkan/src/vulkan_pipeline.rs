/// VulkanPipeline - graphics pipeline for dynamic rendering

use ash::vk;
use ember_3d_engine::ember3d::device::PipelineDesc;
use ember_3d_engine::ember3d::Result;
use ember_3d_engine::engine_err;
use std::sync::Arc;

use crate::vulkan_context::GpuContext;
use crate::vulkan_format::{format_to_vk, vertex_format_to_vk};

/// Graphics pipeline and the layout it was created with
pub struct VulkanPipeline {
    ctx: Arc<GpuContext>,
    pub(crate) pipeline: vk::Pipeline,
    pub(crate) layout: vk::PipelineLayout,
}

impl VulkanPipeline {
    /// Create the pipeline
    ///
    /// # Arguments
    ///
    /// * `ctx` - Shared GPU context
    /// * `desc` - Shaders, vertex layout and attachment formats
    /// * `set_layouts` - Descriptor-set layouts in set-index order
    pub(crate) fn new(
        ctx: Arc<GpuContext>,
        desc: &PipelineDesc<'_>,
        set_layouts: &[vk::DescriptorSetLayout],
    ) -> Result<Self> {
        let device = &ctx.device;

        let push_constant_ranges = [vk::PushConstantRange {
            stage_flags: vk::ShaderStageFlags::VERTEX,
            offset: 0,
            size: desc.push_constant_size,
        }];
        let layout_info = vk::PipelineLayoutCreateInfo::default()
            .set_layouts(set_layouts)
            .push_constant_ranges(&push_constant_ranges);

        unsafe {
            let layout = device
                .create_pipeline_layout(&layout_info, None)
                .map_err(|e| engine_err!("ember3d::vulkan::Pipeline", "Failed to create pipeline layout: {:?}", e))?;

            // Modules are only needed until the pipeline exists
            let vertex_module = match create_shader_module(device, desc.vertex_spirv) {
                Ok(module) => module,
                Err(error) => {
                    device.destroy_pipeline_layout(layout, None);
                    return Err(error);
                }
            };
            let fragment_module = match create_shader_module(device, desc.fragment_spirv) {
                Ok(module) => module,
                Err(error) => {
                    device.destroy_shader_module(vertex_module, None);
                    device.destroy_pipeline_layout(layout, None);
                    return Err(error);
                }
            };

            let pipeline = create_graphics_pipeline(device, desc, layout, vertex_module, fragment_module);

            device.destroy_shader_module(vertex_module, None);
            device.destroy_shader_module(fragment_module, None);

            match pipeline {
                Ok(pipeline) => Ok(Self { ctx, pipeline, layout }),
                Err(error) => {
                    device.destroy_pipeline_layout(layout, None);
                    Err(error)
                }
            }
        }
    }
}

unsafe fn create_shader_module(device: &ash::Device, code: &[u32]) -> Result<vk::ShaderModule> {
    let create_info = vk::ShaderModuleCreateInfo::default().code(code);
    device
        .create_shader_module(&create_info, None)
        .map_err(|e| engine_err!("ember3d::vulkan::Pipeline", "Failed to create shader module: {:?}", e))
}

unsafe fn create_graphics_pipeline(
    device: &ash::Device,
    desc: &PipelineDesc<'_>,
    layout: vk::PipelineLayout,
    vertex_module: vk::ShaderModule,
    fragment_module: vk::ShaderModule,
) -> Result<vk::Pipeline> {
    let stages = [
        vk::PipelineShaderStageCreateInfo::default()
            .stage(vk::ShaderStageFlags::VERTEX)
            .module(vertex_module)
            .name(c"main"),
        vk::PipelineShaderStageCreateInfo::default()
            .stage(vk::ShaderStageFlags::FRAGMENT)
            .module(fragment_module)
            .name(c"main"),
    ];

    let bindings = [vk::VertexInputBindingDescription {
        binding: 0,
        stride: desc.vertex_layout.stride,
        input_rate: vk::VertexInputRate::VERTEX,
    }];
    let attributes: Vec<vk::VertexInputAttributeDescription> = desc
        .vertex_layout
        .attributes
        .iter()
        .map(|attribute| vk::VertexInputAttributeDescription {
            location: attribute.location,
            binding: 0,
            format: vertex_format_to_vk(attribute.format),
            offset: attribute.offset,
        })
        .collect();
    let vertex_input = vk::PipelineVertexInputStateCreateInfo::default()
        .vertex_binding_descriptions(&bindings)
        .vertex_attribute_descriptions(&attributes);

    let input_assembly = vk::PipelineInputAssemblyStateCreateInfo::default()
        .topology(vk::PrimitiveTopology::TRIANGLE_LIST);

    // Viewport and scissor are dynamic
    let viewport_state = vk::PipelineViewportStateCreateInfo::default()
        .viewport_count(1)
        .scissor_count(1);

    let rasterization = vk::PipelineRasterizationStateCreateInfo::default()
        .polygon_mode(vk::PolygonMode::FILL)
        .cull_mode(vk::CullModeFlags::NONE)
        .front_face(vk::FrontFace::COUNTER_CLOCKWISE)
        .line_width(1.0);

    let multisample = vk::PipelineMultisampleStateCreateInfo::default()
        .rasterization_samples(vk::SampleCountFlags::TYPE_1);

    let depth_stencil = vk::PipelineDepthStencilStateCreateInfo::default()
        .depth_test_enable(true)
        .depth_write_enable(true)
        .depth_compare_op(vk::CompareOp::LESS);

    let blend_attachments = [vk::PipelineColorBlendAttachmentState::default()
        .color_write_mask(vk::ColorComponentFlags::RGBA)
        .blend_enable(false)];
    let color_blend = vk::PipelineColorBlendStateCreateInfo::default().attachments(&blend_attachments);

    let dynamic_states = [vk::DynamicState::VIEWPORT, vk::DynamicState::SCISSOR];
    let dynamic_state = vk::PipelineDynamicStateCreateInfo::default().dynamic_states(&dynamic_states);

    let color_formats = [format_to_vk(desc.color_format)];
    let mut rendering_info = vk::PipelineRenderingCreateInfo::default()
        .color_attachment_formats(&color_formats)
        .depth_attachment_format(format_to_vk(desc.depth_format));

    let create_info = vk::GraphicsPipelineCreateInfo::default()
        .push_next(&mut rendering_info)
        .stages(&stages)
        .vertex_input_state(&vertex_input)
        .input_assembly_state(&input_assembly)
        .viewport_state(&viewport_state)
        .rasterization_state(&rasterization)
        .multisample_state(&multisample)
        .depth_stencil_state(&depth_stencil)
        .color_blend_state(&color_blend)
        .dynamic_state(&dynamic_state)
        .layout(layout);

    device
        .create_graphics_pipelines(vk::PipelineCache::null(), &[create_info], None)
        .map_err(|(_, e)| engine_err!("ember3d::vulkan::Pipeline", "Failed to create graphics pipeline: {:?}", e))?
        .into_iter()
        .next()
        .ok_or_else(|| engine_err!("ember3d::vulkan::Pipeline", "Driver returned no pipeline"))
}

impl Drop for VulkanPipeline {
    fn drop(&mut self) {
        unsafe {
            self.ctx.device.destroy_pipeline(self.pipeline, None);
            self.ctx.device.destroy_pipeline_layout(self.layout, None);
        }
    }
}
