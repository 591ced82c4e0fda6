//! 核心功能模块
//!
//! 本模块提供与图形 API 无关的基础功能。
//!
//! # 模块组织
//!
//! - `math`：数学类型别名与航向旋转
//! - `log`：日志系统，提供结构化的日志记录功能
//! - `config`：配置管理，支持从配置文件加载设置
//! - `error`：错误处理，定义统一的错误类型
//! - `diagnostics`：软错误处理策略（fail-fast / log-and-continue）

pub mod config;
pub mod diagnostics;
pub mod error;
pub mod log;
pub mod math;

// 重新导出常用类型，方便使用
pub use config::Config;
pub use diagnostics::{DiagnosticPolicy, Diagnostics};
pub use error::{FlightHeadingError, Result};
pub use math::{Matrix4, Vector3, Vector4};
