//! 绑定状态跟踪
//!
//! wgpu 没有"当前绑定对象"的概念，这里保留一份显式的绑定表：
//! 顶点数组、顶点缓冲、索引缓冲、着色器程序，以及固定数量的纹理单元。
//! 绘制调用从这张表中读取要使用的资源。
//!
//! 绑定保存的是借用，借用检查保证被绑定的资源在绘制前不会被释放。
//! 重复绑定同一个资源是无操作，`bind` 返回 `false`。

use crate::core::error::{GraphicsError, Result};
use crate::renderer::buffer::{IndexBuffer, VertexBuffer};
use crate::renderer::resource::{GpuResource, ResourceId};
use crate::renderer::shader::ShaderProgram;
use crate::renderer::texture::Texture;
use crate::renderer::vertex_array::VertexArray;

/// 纹理单元数量
pub const MAX_TEXTURE_UNITS: usize = 16;

/// 单个绑定点
pub struct BindSlot<'a, T> {
    bound: Option<&'a T>,
}

impl<'a, T> Default for BindSlot<'a, T> {
    fn default() -> Self {
        Self { bound: None }
    }
}

impl<'a, T: GpuResource> BindSlot<'a, T> {
    /// 绑定资源，已经是当前资源时返回 `false`
    pub fn bind(&mut self, resource: &'a T) -> bool {
        if self.id() == Some(resource.id()) {
            return false;
        }
        self.bound = Some(resource);
        true
    }

    /// 解除绑定，原本就为空时返回 `false`
    pub fn unbind(&mut self) -> bool {
        self.bound.take().is_some()
    }

    pub fn get(&self) -> Option<&'a T> {
        self.bound
    }

    pub fn id(&self) -> Option<ResourceId> {
        self.bound.map(GpuResource::id)
    }
}

/// 一帧内的绑定表
#[derive(Default)]
pub struct BindingState<'a> {
    pub vertex_array: BindSlot<'a, VertexArray>,
    pub vertex_buffer: BindSlot<'a, VertexBuffer>,
    pub index_buffer: BindSlot<'a, IndexBuffer>,
    pub program: BindSlot<'a, ShaderProgram>,
    texture_units: TextureUnits<'a, Texture>,
}

impl<'a> BindingState<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    /// 把纹理绑定到指定单元
    pub fn bind_texture(&mut self, unit: u32, texture: &'a Texture) -> Result<bool> {
        self.texture_units.bind(unit, texture)
    }

    pub fn unbind_texture(&mut self, unit: u32) -> Result<bool> {
        self.texture_units.unbind(unit)
    }

    /// 指定单元上的纹理
    pub fn texture(&self, unit: u32) -> Option<&'a Texture> {
        self.texture_units.get(unit)
    }
}

/// 纹理单元数组
struct TextureUnits<'a, T> {
    units: [BindSlot<'a, T>; MAX_TEXTURE_UNITS],
}

impl<'a, T> Default for TextureUnits<'a, T> {
    fn default() -> Self {
        Self {
            units: std::array::from_fn(|_| BindSlot::default()),
        }
    }
}

impl<'a, T: GpuResource> TextureUnits<'a, T> {
    fn slot_mut(&mut self, unit: u32) -> Result<&mut BindSlot<'a, T>> {
        self.units
            .get_mut(unit as usize)
            .ok_or_else(|| GraphicsError::InvalidTextureUnit(unit).into())
    }

    fn bind(&mut self, unit: u32, resource: &'a T) -> Result<bool> {
        Ok(self.slot_mut(unit)?.bind(resource))
    }

    fn unbind(&mut self, unit: u32) -> Result<bool> {
        Ok(self.slot_mut(unit)?.unbind())
    }

    fn get(&self, unit: u32) -> Option<&'a T> {
        self.units.get(unit as usize).and_then(BindSlot::get)
    }
}
