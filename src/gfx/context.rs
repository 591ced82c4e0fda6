//! wgpu 设备管理
//!
//! 本模块负责窗口和 wgpu 图形设备的初始化和管理，包括：
//! - 创建窗口
//! - 创建 wgpu 实例和窗口表面
//! - 选择图形适配器，创建逻辑设备和命令队列
//! - 配置交换链
//! - GPU 调用的错误作用域检查

use std::sync::Arc;
use tracing::{debug, error, info, warn};
use winit::event_loop::EventLoop;
use winit::window::{Window, WindowBuilder};

use crate::core::error::{GraphicsError, Result};
use crate::core::{Config, Diagnostics};
use crate::gfx::frame::Frame;

/// 图形上下文
///
/// 封装了窗口、wgpu 的核心设备和表面管理。
pub struct GpuContext {
    /// wgpu 实例（入口点）
    pub instance: wgpu::Instance,
    /// 窗口表面
    pub surface: wgpu::Surface<'static>,
    /// 图形适配器（GPU）
    pub adapter: wgpu::Adapter,
    /// 逻辑设备
    pub device: wgpu::Device,
    /// 命令队列
    pub queue: wgpu::Queue,
    /// 表面配置
    pub surface_config: wgpu::SurfaceConfiguration,
    /// 窗口引用
    window: Arc<Window>,
    diagnostics: Diagnostics,
}

impl GpuContext {
    /// 创建窗口和图形上下文
    ///
    /// 任何一步失败都是致命错误，调用方不应进入帧循环。
    pub fn new(event_loop: &EventLoop<()>, config: &Config) -> Result<Self> {
        info!("Initializing wgpu context");

        // 1. 创建 wgpu 实例
        debug!("Creating wgpu instance");
        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            dx12_shader_compiler: Default::default(),
            flags: wgpu::InstanceFlags::default(),
            gles_minor_version: wgpu::Gles3MinorVersion::Automatic,
        });

        // 2. 创建窗口
        debug!("Creating window");
        let window = WindowBuilder::new()
            .with_title(config.window.title.as_str())
            .with_inner_size(winit::dpi::PhysicalSize::new(
                config.window.width,
                config.window.height,
            ))
            .with_resizable(config.window.resizable)
            .build(event_loop)
            .map_err(|e| GraphicsError::DeviceCreation(format!("Failed to create window: {}", e)))?;

        let window = Arc::new(window);

        // 3. 创建表面
        debug!("Creating surface");
        let surface = instance
            .create_surface(window.clone())
            .map_err(|e| GraphicsError::DeviceCreation(format!("Failed to create surface: {}", e)))?;

        // 4. 请求适配器
        debug!("Requesting adapter");
        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::default(),
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        }))
        .ok_or_else(|| GraphicsError::DeviceCreation("Failed to find suitable adapter".to_string()))?;

        info!("Selected adapter: {:?}", adapter.get_info());

        // 5. 请求设备和队列
        debug!("Requesting device and queue");
        let (device, queue) = pollster::block_on(adapter.request_device(
            &wgpu::DeviceDescriptor {
                label: Some("Main Device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::downlevel_webgl2_defaults()
                    .using_resolution(adapter.limits()),
            },
            None,
        ))
        .map_err(|e| GraphicsError::DeviceCreation(format!("Failed to create device: {}", e)))?;

        // 错误作用域之外的设备错误只记录，不 panic
        device.on_uncaptured_error(Box::new(|e| {
            error!("Uncaptured GPU error: {}", e);
        }));

        // 6. 配置表面
        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .or_else(|| surface_caps.formats.first().copied())
            .ok_or_else(|| {
                GraphicsError::DeviceCreation("Surface reports no supported formats".to_string())
            })?;

        debug!("Surface format: {:?}", surface_format);

        let present_mode = if config.graphics.vsync {
            wgpu::PresentMode::AutoVsync
        } else {
            wgpu::PresentMode::AutoNoVsync
        };

        let size = window.inner_size();
        let surface_config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode,
            alpha_mode: surface_caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };

        surface.configure(&device, &surface_config);

        info!(
            width = surface_config.width,
            height = surface_config.height,
            "wgpu context initialized successfully"
        );

        Ok(Self {
            instance,
            surface,
            adapter,
            device,
            queue,
            surface_config,
            window,
            diagnostics: Diagnostics::new(
                config.diagnostics.policy,
                config.diagnostics.check_gpu_errors,
            ),
        })
    }

    /// 获取窗口引用
    pub fn window(&self) -> &Window {
        &self.window
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    /// 颜色目标格式
    pub fn surface_format(&self) -> wgpu::TextureFormat {
        self.surface_config.format
    }

    /// 重新配置表面（用于窗口调整）
    ///
    /// 窗口最小化时尺寸为 0，此时保持旧配置。
    pub fn reconfigure_surface(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.surface_config.width = width;
        self.surface_config.height = height;
        self.surface.configure(&self.device, &self.surface_config);
    }

    /// 在 GPU 验证错误作用域中执行一次调用
    ///
    /// 作用域捕获到的错误交给诊断策略处理。未开启检查时直接执行。
    pub fn checked<T>(&self, call: &str, f: impl FnOnce() -> T) -> Result<T> {
        if !self.diagnostics.check_gpu_errors() {
            return Ok(f());
        }

        self.device.push_error_scope(wgpu::ErrorFilter::Validation);
        let value = f();
        if let Some(err) = pollster::block_on(self.device.pop_error_scope()) {
            self.diagnostics.report(GraphicsError::Validation {
                call: call.to_string(),
                message: err.to_string(),
            })?;
        }
        Ok(value)
    }

    /// 获取下一帧的交换链纹理
    ///
    /// 表面丢失或过期时重新配置并跳过这一帧（返回 `None`）。
    pub fn acquire_frame(&mut self) -> Result<Option<Frame>> {
        match self.surface.get_current_texture() {
            Ok(texture) => Ok(Some(Frame::new(texture))),
            Err(wgpu::SurfaceError::Lost) | Err(wgpu::SurfaceError::Outdated) => {
                warn!("Surface lost or outdated, reconfiguring");
                let (width, height) = (self.surface_config.width, self.surface_config.height);
                self.reconfigure_surface(width, height);
                Ok(None)
            }
            Err(wgpu::SurfaceError::Timeout) => {
                warn!("Timed out acquiring the next frame");
                Ok(None)
            }
            Err(e @ wgpu::SurfaceError::OutOfMemory) => {
                Err(GraphicsError::SurfaceError(format!("Failed to acquire next image: {}", e)).into())
            }
        }
    }
}
