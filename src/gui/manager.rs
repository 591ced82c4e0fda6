//! GUI 管理器
//!
//! GuiManager 集成 egui、egui-winit 和 egui-wgpu：
//! 把窗口事件交给 egui，每帧构建控制面板，并把结果绘制到当前帧。

use egui_wgpu::Renderer as EguiRenderer;
use egui_winit::State as EguiState;
use tracing::debug;
use winit::window::Window;

use crate::core::error::Result;
use crate::gfx::{Frame, GpuContext};
use crate::gui::panels;
use crate::gui::state::GuiState;

/// GUI 管理器（egui + wgpu）
pub struct GuiManager {
    // egui 核心组件
    context: egui::Context,
    state: EguiState,
    renderer: EguiRenderer,

    gui_state: GuiState,
}

impl GuiManager {
    /// 创建 GUI 管理器
    pub fn new(ctx: &GpuContext, gui_state: GuiState) -> Result<Self> {
        let context = egui::Context::default();
        context.set_visuals(egui::Visuals::dark());

        let window = ctx.window();
        let state = EguiState::new(
            context.clone(),
            egui::ViewportId::ROOT,
            window,
            Some(window.scale_factor() as f32),
            Some(ctx.device.limits().max_texture_dimension_2d as usize),
        );

        let renderer = EguiRenderer::new(&ctx.device, ctx.surface_format(), None, 1);

        debug!("GUI manager created");

        Ok(Self {
            context,
            state,
            renderer,
            gui_state,
        })
    }

    /// 处理窗口事件
    /// 返回 true 如果事件被 GUI 消费
    pub fn handle_event(&mut self, window: &Window, event: &winit::event::WindowEvent) -> bool {
        self.state.on_window_event(window, event).consumed
    }

    /// 开始新的一帧并构建 UI
    pub fn update(&mut self, window: &Window) {
        let raw_input = self.state.take_egui_input(window);
        self.context.begin_frame(raw_input);

        panels::control::render(&self.context, &mut self.gui_state);
    }

    /// 结束这一帧并绘制到颜色目标之上
    pub fn render(&mut self, ctx: &GpuContext, frame: &Frame) -> Result<()> {
        let window = ctx.window();

        // 结束帧，获取输出
        let full_output = self.context.end_frame();

        // 处理平台输出（光标、复制粘贴等）
        self.state
            .handle_platform_output(window, full_output.platform_output);

        let paint_jobs = self
            .context
            .tessellate(full_output.shapes, full_output.pixels_per_point);
        let (width, height) = frame.size();
        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [width, height],
            pixels_per_point: full_output.pixels_per_point,
        };

        ctx.checked("render_gui", || {
            for (id, image_delta) in &full_output.textures_delta.set {
                self.renderer
                    .update_texture(&ctx.device, &ctx.queue, *id, image_delta);
            }

            let mut encoder = ctx
                .device
                .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                    label: Some("GUI Encoder"),
                });

            let user_buffers = self.renderer.update_buffers(
                &ctx.device,
                &ctx.queue,
                &mut encoder,
                &paint_jobs,
                &screen_descriptor,
            );

            {
                let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some("GUI Render Pass"),
                    color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                        view: frame.view(),
                        resolve_target: None,
                        ops: wgpu::Operations {
                            load: wgpu::LoadOp::Load, // 保留场景渲染结果
                            store: wgpu::StoreOp::Store,
                        },
                    })],
                    depth_stencil_attachment: None,
                    timestamp_writes: None,
                    occlusion_query_set: None,
                });

                self.renderer
                    .render(&mut render_pass, &paint_jobs, &screen_descriptor);
            }

            ctx.queue.submit(
                user_buffers
                    .into_iter()
                    .chain(std::iter::once(encoder.finish())),
            );

            // 清理释放的纹理
            for id in &full_output.textures_delta.free {
                self.renderer.free_texture(id);
            }
        })
    }

    /// 获取 GUI 状态引用
    pub fn state(&self) -> &GuiState {
        &self.gui_state
    }

    /// 获取 GUI 状态可变引用
    pub fn state_mut(&mut self) -> &mut GuiState {
        &mut self.gui_state
    }
}
