//! 错误处理模块
//!
//! 定义了程序中使用的统一错误类型。
//!
//! # 设计原则
//!
//! - 为每种错误类型提供清晰的上下文信息
//! - 支持错误链（error source）
//! - 易于模式匹配和错误处理

use std::fmt;
use std::path::PathBuf;

/// 统一的 Result 类型
pub type Result<T> = std::result::Result<T, FlightHeadingError>;

/// FlightHeading 的错误类型
#[derive(Debug)]
pub enum FlightHeadingError {
    /// 配置错误
    Config(ConfigError),

    /// 图形 API 错误
    Graphics(GraphicsError),

    /// 资源文件（纹理、着色器源码）错误
    Asset(AssetError),

    /// Uniform 设置错误（仅在 fail-fast 策略下向上传播）
    Uniform(UniformError),

    /// IO 错误
    Io(std::io::Error),

    /// 运行时错误
    Runtime(String),
}

/// 配置相关的错误
#[derive(Debug)]
pub enum ConfigError {
    /// 配置文件解析失败
    ParseError(String),

    /// 配置值无效
    InvalidValue { field: String, reason: String },
}

/// 图形 API 相关的错误
#[derive(Debug)]
pub enum GraphicsError {
    /// 设备创建失败
    DeviceCreation(String),

    /// 表面（交换链）错误
    SurfaceError(String),

    /// 着色器编译失败
    ShaderCompilation { stage: &'static str, message: String },

    /// 着色器链接失败（两个阶段的资源声明不一致）
    ShaderLink(String),

    /// GPU 验证错误（错误作用域捕获）
    Validation { call: String, message: String },

    /// 绘制时缺少绑定的资源
    NothingBound(&'static str),

    /// 纹理单元超出范围
    InvalidTextureUnit(u32),

    /// 顶点属性描述无效
    InvalidVertexLayout(String),
}

/// 资源文件相关的错误
#[derive(Debug)]
pub enum AssetError {
    /// 文件读取失败
    Read { path: PathBuf, source: std::io::Error },

    /// 图像解码失败
    Decode { path: PathBuf, message: String },

    /// 不支持的通道数（只支持 1/3/4）
    UnsupportedChannels { path: PathBuf, channels: u8 },
}

/// Uniform 相关的错误
#[derive(Debug)]
pub enum UniformError {
    /// 着色器中找不到该名字
    NotFound(String),

    /// 值类型与着色器声明不一致
    TypeMismatch { name: String, expected: String, found: String },
}

impl fmt::Display for FlightHeadingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FlightHeadingError::Config(e) => write!(f, "Configuration error: {}", e),
            FlightHeadingError::Graphics(e) => write!(f, "Graphics error: {}", e),
            FlightHeadingError::Asset(e) => write!(f, "Asset error: {}", e),
            FlightHeadingError::Uniform(e) => write!(f, "Uniform error: {}", e),
            FlightHeadingError::Io(e) => write!(f, "IO error: {}", e),
            FlightHeadingError::Runtime(msg) => write!(f, "Runtime error: {}", msg),
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::ParseError(msg) => write!(f, "Failed to parse config: {}", msg),
            ConfigError::InvalidValue { field, reason } => {
                write!(f, "Invalid value for '{}': {}", field, reason)
            }
        }
    }
}

impl fmt::Display for GraphicsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GraphicsError::DeviceCreation(msg) => write!(f, "Device creation failed: {}", msg),
            GraphicsError::SurfaceError(msg) => write!(f, "Surface error: {}", msg),
            GraphicsError::ShaderCompilation { stage, message } => {
                write!(f, "Failed to compile {} shader: {}", stage, message)
            }
            GraphicsError::ShaderLink(msg) => write!(f, "Shader link failed: {}", msg),
            GraphicsError::Validation { call, message } => {
                write!(f, "GPU call '{}' failed: {}", call, message)
            }
            GraphicsError::NothingBound(what) => write!(f, "No {} bound for draw call", what),
            GraphicsError::InvalidTextureUnit(unit) => write!(f, "Texture unit {} is out of range", unit),
            GraphicsError::InvalidVertexLayout(msg) => write!(f, "Invalid vertex layout: {}", msg),
        }
    }
}

impl fmt::Display for AssetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssetError::Read { path, source } => {
                write!(f, "Could not open file {}: {}", path.display(), source)
            }
            AssetError::Decode { path, message } => {
                write!(f, "Failed to decode image {}: {}", path.display(), message)
            }
            AssetError::UnsupportedChannels { path, channels } => write!(
                f,
                "Image {} has {} channels, only 1, 3 or 4 are supported",
                path.display(),
                channels
            ),
        }
    }
}

impl fmt::Display for UniformError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UniformError::NotFound(name) => write!(f, "Uniform '{}' not found in the shader", name),
            UniformError::TypeMismatch { name, expected, found } => write!(
                f,
                "Uniform '{}' is declared as {} but was set with {}",
                name, expected, found
            ),
        }
    }
}

impl std::error::Error for FlightHeadingError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            FlightHeadingError::Io(e) => Some(e),
            FlightHeadingError::Asset(AssetError::Read { source, .. }) => Some(source),
            _ => None,
        }
    }
}

impl std::error::Error for ConfigError {}
impl std::error::Error for GraphicsError {}
impl std::error::Error for AssetError {}
impl std::error::Error for UniformError {}

// 实现 From trait 以便于错误转换
impl From<std::io::Error> for FlightHeadingError {
    fn from(err: std::io::Error) -> Self {
        FlightHeadingError::Io(err)
    }
}

impl From<ConfigError> for FlightHeadingError {
    fn from(err: ConfigError) -> Self {
        FlightHeadingError::Config(err)
    }
}

impl From<GraphicsError> for FlightHeadingError {
    fn from(err: GraphicsError) -> Self {
        FlightHeadingError::Graphics(err)
    }
}

impl From<AssetError> for FlightHeadingError {
    fn from(err: AssetError) -> Self {
        FlightHeadingError::Asset(err)
    }
}

impl From<UniformError> for FlightHeadingError {
    fn from(err: UniformError) -> Self {
        FlightHeadingError::Uniform(err)
    }
}
