//! 配置管理模块
//!
//! 提供程序配置的加载、解析和管理功能。
//! 启动时构造一次，随后传入场景的构造函数，不使用全局常量。
//!
//! # 配置文件格式 (config.toml)
//!
//! ```toml
//! [window]
//! width = 600
//! height = 600
//! title = "Heading"
//! resizable = true
//!
//! [graphics]
//! vsync = true
//! clear_color = [0.25, 0.3, 0.3, 1.0]
//!
//! [assets]
//! vertex_shader = "res/shaders/DrawRect.vert"
//! fragment_shader = "res/shaders/DrawRect.frag"
//! background_texture = "res/textures/CompassBackground.png"
//! foreground_texture = "res/textures/CompassForeground.png"
//!
//! [heading]
//! min = 0.0
//! max = 359.0
//! initial = 0.0
//!
//! [diagnostics]
//! policy = "fail_fast"   # 或 "log_and_continue"
//! check_gpu_errors = true
//!
//! [logging]
//! level = "info"         # trace, debug, info, warn, error
//! file_output = false
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::diagnostics::DiagnosticPolicy;
use super::error::{ConfigError, Result};

/// 程序配置
///
/// 每个分区都有默认值，配置文件中缺失的字段使用默认值补齐。
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// 窗口配置
    #[serde(default)]
    pub window: WindowConfig,

    /// 图形配置
    #[serde(default)]
    pub graphics: GraphicsConfig,

    /// 资源路径
    #[serde(default)]
    pub assets: AssetsConfig,

    /// 航向滑块范围
    #[serde(default)]
    pub heading: HeadingConfig,

    /// 诊断策略
    #[serde(default)]
    pub diagnostics: DiagnosticsConfig,

    /// 日志配置
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// 窗口配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WindowConfig {
    /// 窗口宽度
    #[serde(default = "default_width")]
    pub width: u32,

    /// 窗口高度
    #[serde(default = "default_height")]
    pub height: u32,

    /// 窗口标题
    #[serde(default = "default_title")]
    pub title: String,

    /// 是否可调整大小
    #[serde(default = "default_resizable")]
    pub resizable: bool,
}

/// 图形配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphicsConfig {
    /// 垂直同步
    #[serde(default = "default_vsync")]
    pub vsync: bool,

    /// 清屏颜色（RGBA，范围 0.0-1.0）
    #[serde(default = "default_clear_color")]
    pub clear_color: [f32; 4],
}

/// 资源文件路径（相对于工作目录）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssetsConfig {
    #[serde(default = "default_vertex_shader")]
    pub vertex_shader: PathBuf,

    #[serde(default = "default_fragment_shader")]
    pub fragment_shader: PathBuf,

    #[serde(default = "default_background_texture")]
    pub background_texture: PathBuf,

    #[serde(default = "default_foreground_texture")]
    pub foreground_texture: PathBuf,
}

/// 航向范围（度）
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct HeadingConfig {
    #[serde(default = "default_heading_min")]
    pub min: f32,

    #[serde(default = "default_heading_max")]
    pub max: f32,

    #[serde(default = "default_heading_min")]
    pub initial: f32,
}

/// 诊断配置
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct DiagnosticsConfig {
    /// 软错误（uniform 找不到、GPU 验证错误）的处理策略
    #[serde(default)]
    pub policy: DiagnosticPolicy,

    /// 是否在每个 GPU 调用外包一层验证错误作用域
    #[serde(default = "default_check_gpu_errors")]
    pub check_gpu_errors: bool,
}

/// 日志配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// 日志级别
    #[serde(default = "default_log_level")]
    pub level: LogLevel,

    /// 是否输出到文件
    #[serde(default = "default_file_output")]
    pub file_output: bool,

    /// 日志文件路径
    #[serde(default = "default_log_file")]
    pub log_file: String,
}

/// 日志级别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

// 默认值函数
fn default_width() -> u32 { 600 }
fn default_height() -> u32 { 600 }
fn default_title() -> String { "Heading".to_string() }
fn default_resizable() -> bool { true }
fn default_vsync() -> bool { true }
fn default_clear_color() -> [f32; 4] { [0.25, 0.3, 0.3, 1.0] }
fn default_vertex_shader() -> PathBuf { PathBuf::from("res/shaders/DrawRect.vert") }
fn default_fragment_shader() -> PathBuf { PathBuf::from("res/shaders/DrawRect.frag") }
fn default_background_texture() -> PathBuf { PathBuf::from("res/textures/CompassBackground.png") }
fn default_foreground_texture() -> PathBuf { PathBuf::from("res/textures/CompassForeground.png") }
fn default_heading_min() -> f32 { 0.0 }
fn default_heading_max() -> f32 { 359.0 }
fn default_check_gpu_errors() -> bool { cfg!(debug_assertions) }
fn default_log_level() -> LogLevel { LogLevel::Info }
fn default_file_output() -> bool { false }
fn default_log_file() -> String { "flight_heading.log".to_string() }

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: default_width(),
            height: default_height(),
            title: default_title(),
            resizable: default_resizable(),
        }
    }
}

impl Default for GraphicsConfig {
    fn default() -> Self {
        Self {
            vsync: default_vsync(),
            clear_color: default_clear_color(),
        }
    }
}

impl Default for AssetsConfig {
    fn default() -> Self {
        Self {
            vertex_shader: default_vertex_shader(),
            fragment_shader: default_fragment_shader(),
            background_texture: default_background_texture(),
            foreground_texture: default_foreground_texture(),
        }
    }
}

impl Default for HeadingConfig {
    fn default() -> Self {
        Self {
            min: default_heading_min(),
            max: default_heading_max(),
            initial: default_heading_min(),
        }
    }
}

impl Default for DiagnosticsConfig {
    fn default() -> Self {
        Self {
            policy: DiagnosticPolicy::default(),
            check_gpu_errors: default_check_gpu_errors(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file_output: default_file_output(),
            log_file: default_log_file(),
        }
    }
}

impl Config {
    /// 从 TOML 文本解析配置
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        toml::from_str(contents).map_err(|e| ConfigError::ParseError(e.to_string()).into())
    }

    /// 从配置文件加载
    ///
    /// 文件不存在时返回默认配置；文件存在但无法解析时返回错误，
    /// 避免拼写错误被静默忽略。
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        match std::fs::read_to_string(path.as_ref()) {
            Ok(contents) => Self::from_toml_str(&contents),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(e.into()),
        }
    }

    /// 验证配置的有效性
    pub fn validate(&self) -> Result<()> {
        if self.window.width == 0 || self.window.height == 0 {
            return Err(invalid(
                "window.width/height",
                "Window dimensions must be greater than 0",
            ));
        }

        let heading = &self.heading;
        if !(heading.min < heading.max) {
            return Err(invalid("heading.min/max", "heading.min must be less than heading.max"));
        }
        if heading.initial < heading.min || heading.initial > heading.max {
            return Err(invalid(
                "heading.initial",
                "initial heading must lie within [heading.min, heading.max]",
            ));
        }

        if self.graphics.clear_color.iter().any(|c| !(0.0..=1.0).contains(c)) {
            return Err(invalid(
                "graphics.clear_color",
                "color components must lie within [0.0, 1.0]",
            ));
        }

        Ok(())
    }
}

fn invalid(field: &str, reason: &str) -> super::error::FlightHeadingError {
    ConfigError::InvalidValue {
        field: field.to_string(),
        reason: reason.to_string(),
    }
    .into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.window.width, 600);
        assert_eq!(config.window.height, 600);
        assert_eq!(config.window.title, "Heading");
        assert_eq!(config.graphics.clear_color, [0.25, 0.3, 0.3, 1.0]);
        assert_eq!(config.heading.max, 359.0);
        assert_eq!(
            config.assets.vertex_shader,
            PathBuf::from("res/shaders/DrawRect.vert")
        );
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let config = Config::from_toml_str(
            r#"
            [window]
            width = 800

            [diagnostics]
            policy = "log_and_continue"
            "#,
        )
        .unwrap();

        assert_eq!(config.window.width, 800);
        assert_eq!(config.window.height, 600);
        assert_eq!(config.diagnostics.policy, DiagnosticPolicy::LogAndContinue);
        assert_eq!(config.logging.level, LogLevel::Info);
    }

    #[test]
    fn test_parse_error_is_reported() {
        assert!(Config::from_toml_str("[window]\nwidth = \"wide\"").is_err());
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let config = Config::load("definitely/not/here/config.toml").unwrap();
        assert_eq!(config.window.width, 600);
    }

    #[test]
    fn test_config_validation() {
        let mut config = Config::default();
        assert!(config.validate().is_ok());

        config.window.width = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.heading.initial = 400.0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.heading.min = 359.0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.graphics.clear_color = [1.5, 0.0, 0.0, 1.0];
        assert!(config.validate().is_err());
    }
}
