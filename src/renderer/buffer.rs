//! 顶点缓冲与索引缓冲
//!
//! 两者都在创建时一次性上传数据，之后不可修改；对象被 drop 时释放 GPU 内存。

use bytemuck::Pod;
use tracing::debug;
use wgpu::util::DeviceExt;

use crate::core::error::Result;
use crate::gfx::{BindingState, GpuContext};
use crate::renderer::resource::{GpuResource, ResourceId};

/// 顶点缓冲
pub struct VertexBuffer {
    id: ResourceId,
    buffer: wgpu::Buffer,
    size: u64,
}

impl VertexBuffer {
    /// 创建并上传顶点数据
    pub fn new<T: Pod>(ctx: &GpuContext, data: &[T]) -> Result<Self> {
        let id = ResourceId::allocate();
        let contents: &[u8] = bytemuck::cast_slice(data);
        let buffer = ctx.checked("create_vertex_buffer", || {
            ctx.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(&format!("Vertex Buffer {}", id)),
                contents,
                usage: wgpu::BufferUsages::VERTEX,
            })
        })?;

        debug!(id = id.raw(), bytes = contents.len(), "Vertex buffer created");

        Ok(Self {
            id,
            buffer,
            size: contents.len() as u64,
        })
    }

    /// 数据大小（字节）
    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn bind<'a>(&'a self, state: &mut BindingState<'a>) -> bool {
        state.vertex_buffer.bind(self)
    }

    pub fn unbind(state: &mut BindingState<'_>) -> bool {
        state.vertex_buffer.unbind()
    }

    pub(crate) fn raw(&self) -> &wgpu::Buffer {
        &self.buffer
    }
}

impl GpuResource for VertexBuffer {
    fn id(&self) -> ResourceId {
        self.id
    }
}

impl Drop for VertexBuffer {
    fn drop(&mut self) {
        self.buffer.destroy();
        debug!(id = self.id.raw(), "Vertex buffer released");
    }
}

/// 索引缓冲（u32 索引）
pub struct IndexBuffer {
    id: ResourceId,
    buffer: wgpu::Buffer,
    count: u32,
}

impl IndexBuffer {
    /// 从显式索引数据创建
    pub fn new(ctx: &GpuContext, indices: &[u32]) -> Result<Self> {
        let id = ResourceId::allocate();
        let buffer = ctx.checked("create_index_buffer", || {
            ctx.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(&format!("Index Buffer {}", id)),
                contents: bytemuck::cast_slice(indices),
                usage: wgpu::BufferUsages::INDEX,
            })
        })?;

        debug!(id = id.raw(), count = indices.len(), "Index buffer created");

        Ok(Self {
            id,
            buffer,
            count: indices.len() as u32,
        })
    }

    /// 创建 `0..count` 的顺序索引
    ///
    /// 索引先在主机内存中生成，上传后立即释放。
    pub fn sequential(ctx: &GpuContext, count: u32) -> Result<Self> {
        let indices = sequential_indices(count);
        Self::new(ctx, &indices)
    }

    /// 索引个数
    pub fn count(&self) -> u32 {
        self.count
    }

    pub fn bind<'a>(&'a self, state: &mut BindingState<'a>) -> bool {
        state.index_buffer.bind(self)
    }

    pub fn unbind(state: &mut BindingState<'_>) -> bool {
        state.index_buffer.unbind()
    }

    pub(crate) fn raw(&self) -> &wgpu::Buffer {
        &self.buffer
    }
}

impl GpuResource for IndexBuffer {
    fn id(&self) -> ResourceId {
        self.id
    }
}

impl Drop for IndexBuffer {
    fn drop(&mut self) {
        self.buffer.destroy();
        debug!(id = self.id.raw(), "Index buffer released");
    }
}

fn sequential_indices(count: u32) -> Vec<u32> {
    (0..count).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequential_indices() {
        assert_eq!(sequential_indices(6), vec![0, 1, 2, 3, 4, 5]);
        assert!(sequential_indices(0).is_empty());
    }
}
