//! FlightHeading - 罗盘航向演示
//!
//! 一个正方形视口中的两层罗盘：背景表盘随航向旋转，前景固定在上层；
//! 航向由 egui 控制面板中的滑块调节。
//!
//! # 模块结构
//!
//! - `core`: 核心功能模块（配置、日志、错误处理、诊断策略、数学）
//! - `gfx`: wgpu 设备、交换链帧和绑定状态
//! - `renderer`: 缓冲、顶点数组、纹理、着色器程序和绘制
//! - `scene`: 航向、帧阶段和罗盘场景
//! - `gui`: egui 控制面板
//! - `app`: 把以上部分组合成每帧的执行顺序
//!
//! # 使用示例
//!
//! ```no_run
//! use flight_heading::core::math::rotation_z_degrees;
//! use flight_heading::scene::Heading;
//!
//! let mut heading = Heading::default();
//! heading.set(90.0);
//! let model = rotation_z_degrees(heading.degrees());
//! ```

pub mod app;
pub mod core;
pub mod gfx;
pub mod gui;
pub mod renderer;
pub mod scene;
