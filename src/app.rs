//! 应用程序
//!
//! 拥有图形上下文、绘制状态、罗盘场景和 GUI，按固定顺序执行每一帧：
//! 清屏 → 开始 UI 帧 → 画两层罗盘 → 绘制 UI → 呈现 → 把滑块的值写回航向。
//!
//! 绘制使用上一帧结束时的航向，滑块的改动在下一帧生效。

use tracing::{debug, info};
use winit::event::WindowEvent;
use winit::event_loop::EventLoop;
use winit::window::Window;

use crate::core::error::Result;
use crate::core::Config;
use crate::gfx::GpuContext;
use crate::gui::{GuiManager, GuiState};
use crate::renderer::Renderer;
use crate::scene::{CompassScene, FramePhase, Heading};

/// 一帧的结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameOutcome {
    /// 正常呈现
    Presented,
    /// 窗口最小化或交换链暂时不可用，跳过这一帧
    Skipped,
    /// 用户点击了 "Exit"
    ExitRequested,
}

/// 应用程序
pub struct Application {
    // 字段按 drop 顺序排列：先释放场景资源，最后释放设备
    scene: CompassScene,
    gui: GuiManager,
    renderer: Renderer,
    ctx: GpuContext,
    heading: Heading,
    clear_color: [f32; 4],
    phase: FramePhase,
}

impl Application {
    /// 创建窗口并加载所有资源，任何一步失败都是致命错误
    pub fn new(event_loop: &EventLoop<()>, config: &Config) -> Result<Self> {
        info!("Creating application");
        let mut phase = FramePhase::Uninitialized;
        config.validate()?;

        // 1. 窗口和图形上下文
        let ctx = GpuContext::new(event_loop, config)?;

        // 2. 绘制状态（视口）
        let size = ctx.window().inner_size();
        let renderer = Renderer::new(size.width, size.height);

        // 3. 场景资源
        let scene = CompassScene::new(&ctx, &config.assets)?;

        // 4. 航向和 GUI
        let heading = Heading::from_config(&config.heading);
        let gui = GuiManager::new(&ctx, GuiState::new(&heading))?;

        phase.advance(FramePhase::Ready)?;
        info!(heading = %heading, "Application ready");

        Ok(Self {
            scene,
            gui,
            renderer,
            ctx,
            heading,
            clear_color: config.graphics.clear_color,
            phase,
        })
    }

    pub fn window(&self) -> &Window {
        self.ctx.window()
    }

    pub fn heading(&self) -> &Heading {
        &self.heading
    }

    /// 把窗口事件交给 GUI
    /// 返回 true 如果事件被 GUI 消费
    pub fn handle_window_event(&mut self, event: &WindowEvent) -> bool {
        self.gui.handle_event(self.ctx.window(), event)
    }

    /// 窗口尺寸变化：重新配置表面，视口变为 `min(宽, 高)` 的正方形
    pub fn resize(&mut self, width: u32, height: u32) {
        debug!(width, height, "Window resized");
        self.ctx.reconfigure_surface(width, height);
        self.renderer.set_viewport(width, height);
    }

    /// 执行一帧
    pub fn render_frame(&mut self) -> Result<FrameOutcome> {
        let size = self.ctx.window().inner_size();
        if size.width == 0 || size.height == 0 {
            return Ok(FrameOutcome::Skipped);
        }

        let Some(frame) = self.ctx.acquire_frame()? else {
            return Ok(FrameOutcome::Skipped);
        };

        // 1. 清屏
        self.renderer.clear(&self.ctx, &frame, self.clear_color)?;
        self.phase.advance(FramePhase::Cleared)?;

        // 2. 开始 UI 帧，画罗盘
        self.gui.update(self.ctx.window());
        self.scene
            .draw(&self.ctx, &mut self.renderer, &frame, &self.heading)?;
        self.phase.advance(FramePhase::Drawn)?;

        // 3. 绘制 UI
        self.gui.render(&self.ctx, &frame)?;
        self.phase.advance(FramePhase::UiRendered)?;

        // 4. 呈现
        frame.present();
        self.phase.advance(FramePhase::Presented)?;

        // 5. 应用 GUI 状态到场景
        if self.gui.state_mut().apply_to(&mut self.heading) {
            debug!(heading = %self.heading, "Heading changed");
        }
        self.phase.advance(FramePhase::Ready)?;

        if self.gui.state().exit_requested {
            info!("Exit requested from control panel");
            return Ok(FrameOutcome::ExitRequested);
        }
        Ok(FrameOutcome::Presented)
    }
}
