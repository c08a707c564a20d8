/// VulkanDevice - Vulkan implementation of the GraphicsDevice trait
///
/// Owns the command pool, the descriptor pool, the descriptor-set layouts,
/// the default sampler and the pending-transfer mailbox. Native instance and
/// device handles live in the shared `GpuContext`.

use ash::vk;
use ember_3d_engine::ember3d::device::{
    check_write_range, select_physical_device, Buffer, BufferDesc, DescriptorResource,
    DescriptorSetKind, Extent2D, GraphicsDevice, ImageDesc, ImageTarget, ImageTransition,
    MemoryType, PendingTransfers, PhysicalDeviceInfo, PhysicalDeviceType, PipelineDesc,
    QueueFamilyInfo, Rect2D, RenderingInfo, Viewport,
};
use ember_3d_engine::ember3d::render::Config;
use ember_3d_engine::ember3d::{Error, Result};
use ember_3d_engine::{engine_bail, engine_err, engine_info, engine_trace, engine_warn};
use raw_window_handle::{HasDisplayHandle, HasWindowHandle};
use rustc_hash::FxHashMap;
use std::ffi::{c_char, CStr, CString};
use std::sync::Arc;

use crate::debug::DebugMessenger;
use crate::vulkan_buffer::VulkanBuffer;
use crate::vulkan_commands::{begin_rendering, rect_to_vk, transition_image, viewport_to_vk};
use crate::vulkan_context::GpuContext;
use crate::vulkan_image::VulkanImage;
use crate::vulkan_memory::memory_type_table;
use crate::vulkan_pipeline::VulkanPipeline;
use crate::vulkan_swapchain::VulkanSwapchain;
use crate::vulkan_transfer::TransferRecord;

const VALIDATION_LAYER: &CStr = c"VK_LAYER_KHRONOS_validation";

/// Upper bound of descriptor sets allocated from the device pool
const MAX_DESCRIPTOR_SETS: u32 = 1024;

/// Vulkan graphics device
pub struct VulkanDevice {
    pub(crate) command_pool: vk::CommandPool,
    descriptor_pool: vk::DescriptorPool,
    set_layouts: FxHashMap<DescriptorSetKind, vk::DescriptorSetLayout>,
    sampler: vk::Sampler,
    pub(crate) pending: PendingTransfers<TransferRecord>,
    /// Dropped last; native handles outlive every pool above
    pub(crate) ctx: Arc<GpuContext>,
}

/// Instance-level objects created before the logical device
///
/// Released on drop unless handed over to a `GpuContext`.
struct InstanceParts {
    entry: ash::Entry,
    instance: ash::Instance,
    surface_loader: ash::khr::surface::Instance,
    surface: vk::SurfaceKHR,
    debug_messenger: Option<DebugMessenger>,
    armed: bool,
}

impl Drop for InstanceParts {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        unsafe {
            self.surface_loader.destroy_surface(self.surface, None);
            if let Some(messenger) = self.debug_messenger.take() {
                messenger.destroy();
            }
            self.instance.destroy_instance(None);
        }
    }
}

fn init_error(message: String) -> Error {
    ember_3d_engine::engine_error!("ember3d::vulkan::Device", "{}", message);
    Error::InitializationFailed(message)
}

impl VulkanDevice {
    /// Create the device for a window
    ///
    /// Creates the instance (with the validation layer and messenger when
    /// `config.enable_validation` is set and the `vulkan-validation` feature
    /// is compiled in), the surface, picks a physical device supporting
    /// Vulkan 1.3 dynamic rendering and synchronization2, and creates the
    /// logical device, pools, set layouts and default sampler.
    ///
    /// # Errors
    ///
    /// `Error::InitializationFailed` when no Vulkan loader, instance, surface
    /// or suitable physical device is available.
    pub fn new<W: HasDisplayHandle + HasWindowHandle>(window: &W, config: &Config) -> Result<Self> {
        let parts = create_instance(window, config)?;
        let ctx = Arc::new(create_context(parts)?);

        let mut device = Self {
            command_pool: vk::CommandPool::null(),
            descriptor_pool: vk::DescriptorPool::null(),
            set_layouts: FxHashMap::default(),
            sampler: vk::Sampler::null(),
            pending: PendingTransfers::new(),
            ctx,
        };
        // From here on, drop releases whatever has been created
        device.create_pools()?;
        device.create_set_layouts()?;
        device.create_sampler()?;

        engine_info!("ember3d::vulkan::Device", "Vulkan device ready");
        Ok(device)
    }

    fn create_pools(&mut self) -> Result<()> {
        let device = &self.ctx.device;
        let pool_info = vk::CommandPoolCreateInfo::default()
            .flags(vk::CommandPoolCreateFlags::RESET_COMMAND_BUFFER)
            .queue_family_index(self.ctx.queue_families.graphics);

        let pool_sizes = [
            vk::DescriptorPoolSize {
                ty: vk::DescriptorType::UNIFORM_BUFFER,
                descriptor_count: MAX_DESCRIPTOR_SETS * 2,
            },
            vk::DescriptorPoolSize {
                ty: vk::DescriptorType::STORAGE_BUFFER,
                descriptor_count: MAX_DESCRIPTOR_SETS,
            },
            vk::DescriptorPoolSize {
                ty: vk::DescriptorType::COMBINED_IMAGE_SAMPLER,
                descriptor_count: MAX_DESCRIPTOR_SETS,
            },
        ];
        let descriptor_pool_info = vk::DescriptorPoolCreateInfo::default()
            .max_sets(MAX_DESCRIPTOR_SETS)
            .pool_sizes(&pool_sizes);

        unsafe {
            self.command_pool = device
                .create_command_pool(&pool_info, None)
                .map_err(|e| engine_err!("ember3d::vulkan::Device", "Failed to create command pool: {:?}", e))?;
            self.descriptor_pool = device
                .create_descriptor_pool(&descriptor_pool_info, None)
                .map_err(|e| engine_err!("ember3d::vulkan::Device", "Failed to create descriptor pool: {:?}", e))?;
        }
        Ok(())
    }

    fn create_set_layouts(&mut self) -> Result<()> {
        let layouts: [(DescriptorSetKind, Vec<vk::DescriptorSetLayoutBinding<'static>>); 3] = [
            (
                DescriptorSetKind::Global,
                vec![layout_binding(
                    0,
                    vk::DescriptorType::UNIFORM_BUFFER,
                    vk::ShaderStageFlags::VERTEX | vk::ShaderStageFlags::FRAGMENT,
                )],
            ),
            (
                DescriptorSetKind::Joints,
                vec![layout_binding(0, vk::DescriptorType::STORAGE_BUFFER, vk::ShaderStageFlags::VERTEX)],
            ),
            (
                DescriptorSetKind::Material,
                vec![
                    layout_binding(0, vk::DescriptorType::COMBINED_IMAGE_SAMPLER, vk::ShaderStageFlags::FRAGMENT),
                    layout_binding(1, vk::DescriptorType::UNIFORM_BUFFER, vk::ShaderStageFlags::FRAGMENT),
                ],
            ),
        ];

        for (kind, bindings) in layouts {
            let create_info = vk::DescriptorSetLayoutCreateInfo::default().bindings(&bindings);
            let layout = unsafe { self.ctx.device.create_descriptor_set_layout(&create_info, None) }
                .map_err(|e| {
                    engine_err!("ember3d::vulkan::Device", "Failed to create {:?} set layout: {:?}", kind, e)
                })?;
            self.set_layouts.insert(kind, layout);
        }
        Ok(())
    }

    fn create_sampler(&mut self) -> Result<()> {
        let create_info = vk::SamplerCreateInfo::default()
            .mag_filter(vk::Filter::LINEAR)
            .min_filter(vk::Filter::LINEAR)
            .mipmap_mode(vk::SamplerMipmapMode::LINEAR)
            .address_mode_u(vk::SamplerAddressMode::REPEAT)
            .address_mode_v(vk::SamplerAddressMode::REPEAT)
            .address_mode_w(vk::SamplerAddressMode::REPEAT)
            .max_lod(vk::LOD_CLAMP_NONE);
        self.sampler = unsafe { self.ctx.device.create_sampler(&create_info, None) }
            .map_err(|e| engine_err!("ember3d::vulkan::Device", "Failed to create sampler: {:?}", e))?;
        Ok(())
    }

    fn set_layout(&self, kind: DescriptorSetKind) -> Result<vk::DescriptorSetLayout> {
        self.set_layouts
            .get(&kind)
            .copied()
            .ok_or_else(|| engine_err!("ember3d::vulkan::Device", "No layout for {:?} descriptor sets", kind))
    }

    /// Name of the selected physical device
    pub fn device_name(&self) -> String {
        let properties = unsafe { self.ctx.instance.get_physical_device_properties(self.ctx.physical_device) };
        properties
            .device_name_as_c_str()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

fn layout_binding(
    binding: u32,
    descriptor_type: vk::DescriptorType,
    stages: vk::ShaderStageFlags,
) -> vk::DescriptorSetLayoutBinding<'static> {
    vk::DescriptorSetLayoutBinding::default()
        .binding(binding)
        .descriptor_type(descriptor_type)
        .descriptor_count(1)
        .stage_flags(stages)
}

/// Load Vulkan and create the instance, messenger and surface
fn create_instance<W: HasDisplayHandle + HasWindowHandle>(window: &W, config: &Config) -> Result<InstanceParts> {
    let entry = unsafe { ash::Entry::load() }
        .map_err(|e| init_error(format!("Failed to load Vulkan: {}", e)))?;

    let app_name = CString::new(config.app_name.as_str())
        .map_err(|e| init_error(format!("Invalid app name: {}", e)))?;
    let (major, minor, patch) = config.app_version;
    let app_info = vk::ApplicationInfo::default()
        .application_name(&app_name)
        .application_version(vk::make_api_version(0, major, minor, patch))
        .engine_name(c"Ember3D")
        .engine_version(vk::make_api_version(0, 0, 1, 0))
        .api_version(vk::API_VERSION_1_3);

    let display_handle = window
        .display_handle()
        .map_err(|e| init_error(format!("Failed to get display handle: {}", e)))?;
    let window_handle = window
        .window_handle()
        .map_err(|e| init_error(format!("Failed to get window handle: {}", e)))?;

    let mut extension_names: Vec<*const c_char> = ash_window::enumerate_required_extensions(display_handle.as_raw())
        .map_err(|e| init_error(format!("Failed to get required extensions: {:?}", e)))?
        .to_vec();

    let validation = validation_enabled(config);
    let mut layer_names: Vec<*const c_char> = Vec::new();
    if validation {
        layer_names.push(VALIDATION_LAYER.as_ptr());
        extension_names.push(ash::ext::debug_utils::NAME.as_ptr());
    }

    let mut flags = vk::InstanceCreateFlags::empty();
    if cfg!(target_os = "macos") {
        extension_names.push(ash::khr::portability_enumeration::NAME.as_ptr());
        extension_names.push(ash::khr::get_physical_device_properties2::NAME.as_ptr());
        flags |= vk::InstanceCreateFlags::ENUMERATE_PORTABILITY_KHR;
    }

    let create_info = vk::InstanceCreateInfo::default()
        .flags(flags)
        .application_info(&app_info)
        .enabled_layer_names(&layer_names)
        .enabled_extension_names(&extension_names);

    let instance = unsafe { entry.create_instance(&create_info, None) }
        .map_err(|e| init_error(format!("Failed to create instance: {:?}", e)))?;
    let surface_loader = ash::khr::surface::Instance::new(&entry, &instance);

    // From here on, drop releases the instance and anything attached to it
    let mut parts = InstanceParts {
        entry,
        instance,
        surface_loader,
        surface: vk::SurfaceKHR::null(),
        debug_messenger: None,
        armed: true,
    };

    if validation {
        parts.debug_messenger = create_messenger(&parts.entry, &parts.instance, config)?;
    }

    parts.surface = unsafe {
        ash_window::create_surface(
            &parts.entry,
            &parts.instance,
            display_handle.as_raw(),
            window_handle.as_raw(),
            None,
        )
    }
    .map_err(|e| init_error(format!("Failed to create surface: {:?}", e)))?;

    Ok(parts)
}

#[cfg(feature = "vulkan-validation")]
fn validation_enabled(config: &Config) -> bool {
    config.enable_validation
}

#[cfg(not(feature = "vulkan-validation"))]
fn validation_enabled(config: &Config) -> bool {
    if config.enable_validation {
        engine_warn!(
            "ember3d::vulkan::Device",
            "Validation requested but the vulkan-validation feature is disabled"
        );
    }
    false
}

#[cfg(feature = "vulkan-validation")]
fn create_messenger(
    entry: &ash::Entry,
    instance: &ash::Instance,
    config: &Config,
) -> Result<Option<DebugMessenger>> {
    DebugMessenger::new(entry, instance, config.validation_severity).map(Some)
}

#[cfg(not(feature = "vulkan-validation"))]
fn create_messenger(
    _entry: &ash::Entry,
    _instance: &ash::Instance,
    _config: &Config,
) -> Result<Option<DebugMessenger>> {
    Ok(None)
}

/// Describe one physical device for selection
unsafe fn describe_physical_device(
    parts: &InstanceParts,
    physical_device: vk::PhysicalDevice,
) -> PhysicalDeviceInfo {
    let instance = &parts.instance;
    let properties = instance.get_physical_device_properties(physical_device);
    let name = properties
        .device_name_as_c_str()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    let device_type = match properties.device_type {
        vk::PhysicalDeviceType::DISCRETE_GPU => PhysicalDeviceType::DiscreteGpu,
        vk::PhysicalDeviceType::INTEGRATED_GPU => PhysicalDeviceType::IntegratedGpu,
        vk::PhysicalDeviceType::VIRTUAL_GPU => PhysicalDeviceType::VirtualGpu,
        vk::PhysicalDeviceType::CPU => PhysicalDeviceType::Cpu,
        _ => PhysicalDeviceType::Other,
    };

    let queue_families = instance
        .get_physical_device_queue_family_properties(physical_device)
        .iter()
        .enumerate()
        .map(|(index, family)| QueueFamilyInfo {
            graphics: family.queue_flags.contains(vk::QueueFlags::GRAPHICS),
            present: parts
                .surface_loader
                .get_physical_device_surface_support(physical_device, index as u32, parts.surface)
                .unwrap_or(false),
        })
        .collect();

    let has_swapchain = instance
        .enumerate_device_extension_properties(physical_device)
        .map(|extensions| {
            extensions.iter().any(|extension| {
                extension.extension_name_as_c_str().ok() == Some(ash::khr::swapchain::NAME)
            })
        })
        .unwrap_or(false);

    let mut features13 = vk::PhysicalDeviceVulkan13Features::default();
    let mut features = vk::PhysicalDeviceFeatures2::default().push_next(&mut features13);
    instance.get_physical_device_features2(physical_device, &mut features);
    let supports_vulkan13 = vk::api_version_major(properties.api_version) > 1
        || vk::api_version_minor(properties.api_version) >= 3;

    PhysicalDeviceInfo {
        name,
        device_type,
        queue_families,
        supports_required_features: supports_vulkan13
            && has_swapchain
            && features13.dynamic_rendering == vk::TRUE
            && features13.synchronization2 == vk::TRUE,
    }
}

/// Pick the physical device and create the logical device and queues
fn create_context(mut parts: InstanceParts) -> Result<GpuContext> {
    unsafe {
        let physical_devices = parts
            .instance
            .enumerate_physical_devices()
            .map_err(|e| init_error(format!("Failed to enumerate physical devices: {:?}", e)))?;
        let infos: Vec<PhysicalDeviceInfo> = physical_devices
            .iter()
            .map(|&physical_device| describe_physical_device(&parts, physical_device))
            .collect();
        for info in &infos {
            engine_trace!(
                "ember3d::vulkan::Device",
                "Candidate '{}' ({:?}), required features: {}",
                info.name,
                info.device_type,
                info.supports_required_features
            );
        }

        let selection = select_physical_device(&infos)?;
        let physical_device = physical_devices[selection.device_index];
        let queue_families = selection.queue_families;
        engine_info!(
            "ember3d::vulkan::Device",
            "Using '{}' (graphics family {}, present family {})",
            infos[selection.device_index].name,
            queue_families.graphics,
            queue_families.present
        );

        let queue_priorities = [1.0];
        let mut queue_create_infos = vec![vk::DeviceQueueCreateInfo::default()
            .queue_family_index(queue_families.graphics)
            .queue_priorities(&queue_priorities)];
        if !queue_families.is_unified() {
            queue_create_infos.push(
                vk::DeviceQueueCreateInfo::default()
                    .queue_family_index(queue_families.present)
                    .queue_priorities(&queue_priorities),
            );
        }

        let mut device_extension_names = vec![ash::khr::swapchain::NAME.as_ptr()];
        if cfg!(target_os = "macos") {
            device_extension_names.push(ash::khr::portability_subset::NAME.as_ptr());
        }

        let mut features13 = vk::PhysicalDeviceVulkan13Features::default()
            .dynamic_rendering(true)
            .synchronization2(true);
        let device_create_info = vk::DeviceCreateInfo::default()
            .push_next(&mut features13)
            .queue_create_infos(&queue_create_infos)
            .enabled_extension_names(&device_extension_names);

        let device = parts
            .instance
            .create_device(physical_device, &device_create_info, None)
            .map_err(|e| init_error(format!("Failed to create device: {:?}", e)))?;

        let graphics_queue = device.get_device_queue(queue_families.graphics, 0);
        let present_queue = device.get_device_queue(queue_families.present, 0);
        let swapchain_loader = ash::khr::swapchain::Device::new(&parts.instance, &device);
        let memory_properties = parts.instance.get_physical_device_memory_properties(physical_device);

        // Ownership of the instance-level objects moves to the context
        parts.armed = false;
        Ok(GpuContext {
            entry: parts.entry.clone(),
            instance: parts.instance.clone(),
            physical_device,
            device,
            surface_loader: parts.surface_loader.clone(),
            surface: parts.surface,
            swapchain_loader,
            graphics_queue,
            present_queue,
            queue_families,
            memory_types: memory_type_table(&memory_properties),
            debug_messenger: parts.debug_messenger.take(),
        })
    }
}

impl GraphicsDevice for VulkanDevice {
    type Buffer = VulkanBuffer;
    type Image = VulkanImage;
    type Swapchain = VulkanSwapchain;
    type Pipeline = VulkanPipeline;
    type Fence = vk::Fence;
    type Semaphore = vk::Semaphore;
    type CommandBuffer = vk::CommandBuffer;
    type DescriptorSet = vk::DescriptorSet;

    fn memory_types(&self) -> &[MemoryType] {
        &self.ctx.memory_types
    }

    fn wait_idle(&mut self) -> Result<()> {
        unsafe { self.ctx.device.device_wait_idle() }
            .map_err(|e| engine_err!("ember3d::vulkan::Device", "Failed to wait idle: {:?}", e))
    }

    // ===== RESOURCE TRANSFER =====

    fn create_buffer(&mut self, desc: &BufferDesc) -> Result<VulkanBuffer> {
        VulkanBuffer::new(self.ctx.clone(), desc)
    }

    fn set_buffer_data(&mut self, buffer: &VulkanBuffer, offset: u64, data: &[u8]) -> Result<()> {
        check_write_range(buffer.size(), offset, data.len())?;
        if data.is_empty() {
            return Ok(());
        }
        if buffer.is_host_visible() {
            buffer.write(offset, data)
        } else {
            self.stage_buffer_copy(buffer, offset, data)
        }
    }

    fn create_image(&mut self, desc: &ImageDesc) -> Result<VulkanImage> {
        VulkanImage::new(self.ctx.clone(), desc)
    }

    fn set_image_data(&mut self, image: &VulkanImage, data: &[u8]) -> Result<()> {
        self.stage_image_copy(image, data)
    }

    fn wait_for_transfers(&mut self) -> Result<()> {
        self.drain_transfers()
    }

    fn pending_transfer_count(&self) -> usize {
        self.pending.len()
    }

    // ===== SWAPCHAIN =====

    fn create_swapchain(&mut self, extent: Extent2D) -> Result<VulkanSwapchain> {
        if extent.is_empty() {
            engine_bail!("ember3d::vulkan::Device", "Cannot create a swapchain with an empty extent");
        }
        VulkanSwapchain::new(self.ctx.clone(), extent)
    }

    fn acquire_next_image(&mut self, swapchain: &VulkanSwapchain, signal: vk::Semaphore) -> Result<u32> {
        let (image_index, suboptimal) = unsafe {
            self.ctx
                .swapchain_loader
                .acquire_next_image(swapchain.swapchain, u64::MAX, signal, vk::Fence::null())
        }
        .map_err(|e| engine_err!("ember3d::vulkan::Device", "Failed to acquire swapchain image: {:?}", e))?;
        if suboptimal {
            engine_trace!("ember3d::vulkan::Device", "Swapchain is suboptimal for the surface");
        }
        Ok(image_index)
    }

    fn present(&mut self, swapchain: &VulkanSwapchain, image_index: u32, wait: vk::Semaphore) -> Result<()> {
        let wait_semaphores = [wait];
        let swapchains = [swapchain.swapchain];
        let image_indices = [image_index];
        let present_info = vk::PresentInfoKHR::default()
            .wait_semaphores(&wait_semaphores)
            .swapchains(&swapchains)
            .image_indices(&image_indices);
        unsafe {
            self.ctx
                .swapchain_loader
                .queue_present(self.ctx.present_queue, &present_info)
        }
        .map(|_suboptimal| ())
        .map_err(|e| engine_err!("ember3d::vulkan::Device", "Failed to present: {:?}", e))
    }

    // ===== SYNCHRONIZATION =====

    fn create_fence(&mut self, signaled: bool) -> Result<vk::Fence> {
        let flags = if signaled {
            vk::FenceCreateFlags::SIGNALED
        } else {
            vk::FenceCreateFlags::empty()
        };
        unsafe { self.ctx.device.create_fence(&vk::FenceCreateInfo::default().flags(flags), None) }
            .map_err(|e| engine_err!("ember3d::vulkan::Device", "Failed to create fence: {:?}", e))
    }

    fn destroy_fence(&mut self, fence: vk::Fence) {
        unsafe { self.ctx.device.destroy_fence(fence, None) };
    }

    fn wait_for_fence(&mut self, fence: vk::Fence) -> Result<()> {
        unsafe { self.ctx.device.wait_for_fences(&[fence], true, u64::MAX) }
            .map_err(|e| engine_err!("ember3d::vulkan::Device", "Failed to wait for fence: {:?}", e))
    }

    fn reset_fence(&mut self, fence: vk::Fence) -> Result<()> {
        unsafe { self.ctx.device.reset_fences(&[fence]) }
            .map_err(|e| engine_err!("ember3d::vulkan::Device", "Failed to reset fence: {:?}", e))
    }

    fn create_semaphore(&mut self) -> Result<vk::Semaphore> {
        unsafe { self.ctx.device.create_semaphore(&vk::SemaphoreCreateInfo::default(), None) }
            .map_err(|e| engine_err!("ember3d::vulkan::Device", "Failed to create semaphore: {:?}", e))
    }

    fn destroy_semaphore(&mut self, semaphore: vk::Semaphore) {
        unsafe { self.ctx.device.destroy_semaphore(semaphore, None) };
    }

    // ===== COMMAND BUFFERS =====

    fn allocate_command_buffer(&mut self) -> Result<vk::CommandBuffer> {
        let allocate_info = vk::CommandBufferAllocateInfo::default()
            .command_pool(self.command_pool)
            .level(vk::CommandBufferLevel::PRIMARY)
            .command_buffer_count(1);
        unsafe { self.ctx.device.allocate_command_buffers(&allocate_info) }
            .map_err(|e| engine_err!("ember3d::vulkan::Device", "Failed to allocate command buffer: {:?}", e))?
            .into_iter()
            .next()
            .ok_or_else(|| engine_err!("ember3d::vulkan::Device", "Driver returned no command buffer"))
    }

    fn free_command_buffer(&mut self, command_buffer: vk::CommandBuffer) {
        unsafe { self.ctx.device.free_command_buffers(self.command_pool, &[command_buffer]) };
    }

    fn begin_command_buffer(&mut self, command_buffer: vk::CommandBuffer) -> Result<()> {
        let device = &self.ctx.device;
        unsafe {
            device
                .reset_command_buffer(command_buffer, vk::CommandBufferResetFlags::empty())
                .map_err(|e| engine_err!("ember3d::vulkan::Device", "Failed to reset command buffer: {:?}", e))?;
            let begin_info = vk::CommandBufferBeginInfo::default()
                .flags(vk::CommandBufferUsageFlags::ONE_TIME_SUBMIT);
            device
                .begin_command_buffer(command_buffer, &begin_info)
                .map_err(|e| engine_err!("ember3d::vulkan::Device", "Failed to begin command buffer: {:?}", e))
        }
    }

    fn end_command_buffer(&mut self, command_buffer: vk::CommandBuffer) -> Result<()> {
        unsafe { self.ctx.device.end_command_buffer(command_buffer) }
            .map_err(|e| engine_err!("ember3d::vulkan::Device", "Failed to end command buffer: {:?}", e))
    }

    fn submit(
        &mut self,
        command_buffer: vk::CommandBuffer,
        wait: vk::Semaphore,
        signal: vk::Semaphore,
        fence: vk::Fence,
    ) -> Result<()> {
        let wait_infos = [vk::SemaphoreSubmitInfo::default()
            .semaphore(wait)
            .stage_mask(vk::PipelineStageFlags2::COLOR_ATTACHMENT_OUTPUT)];
        let signal_infos = [vk::SemaphoreSubmitInfo::default()
            .semaphore(signal)
            .stage_mask(vk::PipelineStageFlags2::ALL_COMMANDS)];
        let command_buffer_infos = [vk::CommandBufferSubmitInfo::default().command_buffer(command_buffer)];
        let submit_info = vk::SubmitInfo2::default()
            .wait_semaphore_infos(&wait_infos)
            .command_buffer_infos(&command_buffer_infos)
            .signal_semaphore_infos(&signal_infos);
        unsafe {
            self.ctx
                .device
                .queue_submit2(self.ctx.graphics_queue, &[submit_info], fence)
        }
        .map_err(|e| engine_err!("ember3d::vulkan::Device", "Failed to submit command buffer: {:?}", e))
    }

    // ===== PIPELINE & DESCRIPTORS =====

    fn create_pipeline(&mut self, desc: &PipelineDesc<'_>) -> Result<VulkanPipeline> {
        let set_layouts = [
            self.set_layout(DescriptorSetKind::Global)?,
            self.set_layout(DescriptorSetKind::Joints)?,
            self.set_layout(DescriptorSetKind::Material)?,
        ];
        VulkanPipeline::new(self.ctx.clone(), desc, &set_layouts)
    }

    fn allocate_descriptor_set(&mut self, kind: DescriptorSetKind) -> Result<vk::DescriptorSet> {
        let set_layouts = [self.set_layout(kind)?];
        let allocate_info = vk::DescriptorSetAllocateInfo::default()
            .descriptor_pool(self.descriptor_pool)
            .set_layouts(&set_layouts);
        unsafe { self.ctx.device.allocate_descriptor_sets(&allocate_info) }
            .map_err(|e| {
                engine_err!("ember3d::vulkan::Device", "Failed to allocate {:?} descriptor set: {:?}", kind, e)
            })?
            .into_iter()
            .next()
            .ok_or_else(|| engine_err!("ember3d::vulkan::Device", "Driver returned no descriptor set"))
    }

    fn update_descriptor_set(&mut self, set: vk::DescriptorSet, binding: u32, resource: DescriptorResource<'_, Self>) {
        let write = vk::WriteDescriptorSet::default()
            .dst_set(set)
            .dst_binding(binding)
            .dst_array_element(0);
        let (descriptor_type, buffer) = match resource {
            DescriptorResource::UniformBuffer(buffer) => (vk::DescriptorType::UNIFORM_BUFFER, buffer),
            DescriptorResource::StorageBuffer(buffer) => (vk::DescriptorType::STORAGE_BUFFER, buffer),
            DescriptorResource::SampledImage(image) => {
                let image_info = [vk::DescriptorImageInfo {
                    sampler: self.sampler,
                    image_view: image.view,
                    image_layout: vk::ImageLayout::GENERAL,
                }];
                let writes = [write
                    .descriptor_type(vk::DescriptorType::COMBINED_IMAGE_SAMPLER)
                    .image_info(&image_info)];
                unsafe { self.ctx.device.update_descriptor_sets(&writes, &[]) };
                return;
            }
        };
        let buffer_info = [vk::DescriptorBufferInfo {
            buffer: buffer.buffer,
            offset: 0,
            range: vk::WHOLE_SIZE,
        }];
        let writes = [write.descriptor_type(descriptor_type).buffer_info(&buffer_info)];
        unsafe { self.ctx.device.update_descriptor_sets(&writes, &[]) };
    }

    // ===== RECORDING =====

    fn cmd_transition_image(&mut self, command_buffer: vk::CommandBuffer, transition: ImageTransition<'_, Self>) {
        let (image, aspect, acquired) = match transition.target {
            ImageTarget::Swapchain(swapchain, index) => match swapchain.images.get(index as usize) {
                Some(&image) => (image, vk::ImageAspectFlags::COLOR, true),
                None => {
                    ember_3d_engine::engine_error!(
                        "ember3d::vulkan::Device",
                        "Swapchain image {} out of range",
                        index
                    );
                    return;
                }
            },
            ImageTarget::Image(image) => (image.image, image.aspect(), false),
        };
        unsafe {
            transition_image(
                &self.ctx.device,
                command_buffer,
                image,
                aspect,
                transition.old_layout,
                transition.new_layout,
                acquired,
            );
        }
    }

    fn cmd_begin_rendering(&mut self, command_buffer: vk::CommandBuffer, info: &RenderingInfo<'_, Self>) {
        let Some(&color_view) = info.swapchain.views.get(info.image_index as usize) else {
            ember_3d_engine::engine_error!(
                "ember3d::vulkan::Device",
                "Swapchain image {} out of range",
                info.image_index
            );
            return;
        };
        unsafe {
            begin_rendering(
                &self.ctx.device,
                command_buffer,
                color_view,
                info.depth.view,
                info.render_area,
                info.clear_color,
                info.clear_depth,
            );
        }
    }

    fn cmd_end_rendering(&mut self, command_buffer: vk::CommandBuffer) {
        unsafe { self.ctx.device.cmd_end_rendering(command_buffer) };
    }

    fn cmd_bind_pipeline(&mut self, command_buffer: vk::CommandBuffer, pipeline: &VulkanPipeline) {
        unsafe {
            self.ctx
                .device
                .cmd_bind_pipeline(command_buffer, vk::PipelineBindPoint::GRAPHICS, pipeline.pipeline)
        };
    }

    fn cmd_set_viewport(&mut self, command_buffer: vk::CommandBuffer, viewport: Viewport) {
        unsafe {
            self.ctx
                .device
                .cmd_set_viewport(command_buffer, 0, &[viewport_to_vk(viewport)])
        };
    }

    fn cmd_set_scissor(&mut self, command_buffer: vk::CommandBuffer, scissor: Rect2D) {
        unsafe { self.ctx.device.cmd_set_scissor(command_buffer, 0, &[rect_to_vk(scissor)]) };
    }

    fn cmd_bind_descriptor_set(
        &mut self,
        command_buffer: vk::CommandBuffer,
        pipeline: &VulkanPipeline,
        set_index: u32,
        set: vk::DescriptorSet,
    ) {
        unsafe {
            self.ctx.device.cmd_bind_descriptor_sets(
                command_buffer,
                vk::PipelineBindPoint::GRAPHICS,
                pipeline.layout,
                set_index,
                &[set],
                &[],
            )
        };
    }

    fn cmd_push_constants(&mut self, command_buffer: vk::CommandBuffer, pipeline: &VulkanPipeline, data: &[u8]) {
        unsafe {
            self.ctx.device.cmd_push_constants(
                command_buffer,
                pipeline.layout,
                vk::ShaderStageFlags::VERTEX,
                0,
                data,
            )
        };
    }

    fn cmd_bind_vertex_buffer(&mut self, command_buffer: vk::CommandBuffer, buffer: &VulkanBuffer) {
        unsafe {
            self.ctx
                .device
                .cmd_bind_vertex_buffers(command_buffer, 0, &[buffer.buffer], &[0])
        };
    }

    fn cmd_bind_index_buffer(&mut self, command_buffer: vk::CommandBuffer, buffer: &VulkanBuffer) {
        unsafe {
            self.ctx
                .device
                .cmd_bind_index_buffer(command_buffer, buffer.buffer, 0, vk::IndexType::UINT32)
        };
    }

    fn cmd_draw_indexed(
        &mut self,
        command_buffer: vk::CommandBuffer,
        index_count: u32,
        first_index: u32,
        vertex_offset: i32,
    ) {
        unsafe {
            self.ctx
                .device
                .cmd_draw_indexed(command_buffer, index_count, 1, first_index, vertex_offset, 0)
        };
    }
}

impl Drop for VulkanDevice {
    fn drop(&mut self) {
        if let Err(error) = self.drain_transfers() {
            engine_warn!("ember3d::vulkan::Device", "Dropping device with undrained transfers: {}", error);
        }
        let device = &self.ctx.device;
        unsafe {
            device.device_wait_idle().ok();
            device.destroy_sampler(self.sampler, None);
            for (_, layout) in self.set_layouts.drain() {
                device.destroy_descriptor_set_layout(layout, None);
            }
            device.destroy_descriptor_pool(self.descriptor_pool, None);
            device.destroy_command_pool(self.command_pool, None);
        }
    }
}
