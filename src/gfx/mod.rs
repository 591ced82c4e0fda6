//! 图形后端模块
//!
//! 封装 wgpu 设备、交换链帧和绑定状态：
//! - `context`：窗口、设备、队列、表面配置、错误作用域
//! - `frame`：一帧的颜色目标
//! - `state`：当前绑定对象的跟踪表

pub mod context;
pub mod frame;
pub mod state;

pub use context::GpuContext;
pub use frame::Frame;
pub use state::{BindingState, MAX_TEXTURE_UNITS};
