//! FlightHeading - 罗盘航向演示
//!
//! # 使用方法
//!
//! ```bash
//! cargo run
//!
//! # 调整日志级别
//! RUST_LOG=debug cargo run
//! ```
//!
//! 当前目录下的 `config.toml` 是可选的，缺失时使用默认配置。
//!
//! # 事件处理
//!
//! - `WindowEvent::CloseRequested` / Escape：退出程序
//! - `WindowEvent::Resized`：重新配置表面，更新正方形视口
//! - `WindowEvent::RedrawRequested`：执行一帧
//! - `AboutToWait`：请求下一次重绘

use anyhow::Context;
use tracing::{debug, error, info};
use winit::event::{ElementState, Event, KeyEvent, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop};
use winit::keyboard::{Key, NamedKey};

use flight_heading::app::{Application, FrameOutcome};
use flight_heading::core::{log, Config, FlightHeadingError};

/// 应用程序入口点
///
/// # 初始化流程
///
/// 1. 加载并验证配置文件（config.toml）
/// 2. 初始化日志系统
/// 3. 创建事件循环和应用程序
/// 4. 启动主循环
fn main() -> anyhow::Result<()> {
    // 1. 加载配置（在初始化日志之前）
    let config = Config::load("config.toml").context("Failed to load config.toml")?;
    config.validate().context("Invalid configuration")?;

    // 2. 初始化日志系统（使用配置中的设置）
    let log_file = if config.logging.file_output {
        Some(config.logging.log_file.as_str())
    } else {
        None
    };
    log::init_logger(config.logging.level, config.logging.file_output, log_file);
    info!(version = env!("CARGO_PKG_VERSION"), "FlightHeading starting...");

    info!(
        width = config.window.width,
        height = config.window.height,
        vsync = config.graphics.vsync,
        policy = ?config.diagnostics.policy,
        "Graphics configuration"
    );

    // 3. 创建事件循环和应用程序
    let event_loop = EventLoop::new().context("Failed to create event loop")?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = Application::new(&event_loop, &config).map_err(|e| {
        error!("Failed to initialize application: {}", e);
        e
    })?;

    info!("Entering main loop...");

    // 4. 启动事件循环，致命错误在循环结束后返回
    let mut fatal: Option<FlightHeadingError> = None;
    event_loop.run(|event, elwt| match event {
        Event::WindowEvent { window_id, event } if window_id == app.window().id() => {
            let consumed = app.handle_window_event(&event);

            match event {
                // 窗口关闭事件
                WindowEvent::CloseRequested => {
                    info!("Close requested, shutting down...");
                    elwt.exit();
                }
                WindowEvent::KeyboardInput {
                    event:
                        KeyEvent {
                            logical_key: Key::Named(NamedKey::Escape),
                            state: ElementState::Pressed,
                            ..
                        },
                    ..
                } if !consumed => {
                    info!("Escape pressed, shutting down...");
                    elwt.exit();
                }
                // 窗口大小调整事件
                WindowEvent::Resized(new_size) => {
                    app.resize(new_size.width, new_size.height);
                }
                WindowEvent::RedrawRequested => match app.render_frame() {
                    Ok(FrameOutcome::ExitRequested) => elwt.exit(),
                    Ok(FrameOutcome::Skipped) => debug!("Frame skipped"),
                    Ok(FrameOutcome::Presented) => {}
                    Err(e) => {
                        error!("Frame failed: {}", e);
                        fatal = Some(e);
                        elwt.exit();
                    }
                },
                _ => (),
            }
        }
        // 准备绘制下一帧
        Event::AboutToWait => app.window().request_redraw(),
        // 忽略其他事件
        _ => (),
    })?;

    drop(app);

    match fatal {
        Some(e) => Err(e.into()),
        None => {
            info!("FlightHeading exited cleanly");
            Ok(())
        }
    }
}
