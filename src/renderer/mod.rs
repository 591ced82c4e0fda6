//! 渲染资源层
//!
//! 在 wgpu 之上提供一组"绑定后使用"风格的资源对象：
//!
//! - `VertexBuffer` / `IndexBuffer`：创建时上传、不可修改的 GPU 缓冲
//! - `BufferLayout`：顶点数据到着色器属性的映射（纯元数据）
//! - `VertexArray`：顶点缓冲 + 布局 + 索引缓冲
//! - `Texture`：解码后上传的二维图像，带 mip 链和采样器
//! - `ShaderProgram`：两个阶段链接成的程序，按名字设置 uniform
//! - `Renderer`：清屏和索引绘制，管线缓存，视口
//!
//! 所有资源都只能移动、不能复制，drop 时释放 GPU 内存。当前绑定的对象
//! 记录在 [`crate::gfx::BindingState`] 中。

pub mod buffer;
pub mod draw;
pub mod layout;
pub mod resource;
pub mod shader;
pub mod texture;
pub mod uniform;
pub mod vertex_array;
pub mod viewport;

pub use buffer::{IndexBuffer, VertexBuffer};
pub use draw::Renderer;
pub use layout::{BufferElement, BufferLayout};
pub use resource::{GpuResource, ResourceId};
pub use shader::ShaderProgram;
pub use texture::{Texture, TextureOptions, WrapMode};
pub use vertex_array::VertexArray;
pub use viewport::Viewport;
