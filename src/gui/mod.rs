//! GUI 系统模块
//!
//! 基于 egui 的即时模式界面，通过 egui-winit 接收输入，
//! 通过 egui-wgpu 绘制到当前帧之上。

mod manager;
mod state;
pub mod panels;

pub use manager::GuiManager;
pub use state::GuiState;
