//! 顶点数组
//!
//! 把一个顶点缓冲、它的布局以及可选的索引缓冲组合成绘制调用可以直接使用的
//! 属性配置。顶点数组拥有加入其中的缓冲。

use tracing::debug;

use crate::core::error::{GraphicsError, Result};
use crate::gfx::BindingState;
use crate::renderer::buffer::{IndexBuffer, VertexBuffer};
use crate::renderer::layout::BufferLayout;
use crate::renderer::resource::{GpuResource, ResourceId};

/// 顶点数组
pub struct VertexArray {
    id: ResourceId,
    vertex_buffer: Option<VertexBuffer>,
    index_buffer: Option<IndexBuffer>,
    attributes: Vec<wgpu::VertexAttribute>,
    stride: u64,
}

impl VertexArray {
    /// 创建一个空的顶点数组
    pub fn new() -> Self {
        Self {
            id: ResourceId::allocate(),
            vertex_buffer: None,
            index_buffer: None,
            attributes: Vec::new(),
            stride: 0,
        }
    }

    /// 加入顶点缓冲，并按布局注册每个属性
    ///
    /// 第 i 个布局元素对应属性索引 i：(分量个数, f32, 不归一化, 步长, 偏移)。
    pub fn add_buffer(&mut self, buffer: VertexBuffer, layout: &BufferLayout) -> Result<()> {
        let attributes = vertex_attributes(layout)?;

        for (attribute, element) in attributes.iter().zip(layout.elements()) {
            debug!(
                array = self.id.raw(),
                index = attribute.shader_location,
                count = element.count,
                stride = layout.stride(),
                offset = element.offset,
                "Vertex attribute registered"
            );
        }

        self.attributes = attributes;
        self.stride = layout.stride() as u64;
        self.vertex_buffer = Some(buffer);
        Ok(())
    }

    /// 设置索引缓冲
    pub fn set_index_buffer(&mut self, buffer: IndexBuffer) {
        self.index_buffer = Some(buffer);
    }

    pub fn vertex_buffer(&self) -> Option<&VertexBuffer> {
        self.vertex_buffer.as_ref()
    }

    pub fn index_buffer(&self) -> Option<&IndexBuffer> {
        self.index_buffer.as_ref()
    }

    /// 设为当前的属性来源，连同它拥有的缓冲一起绑定
    pub fn bind<'a>(&'a self, state: &mut BindingState<'a>) -> bool {
        if let Some(buffer) = &self.vertex_buffer {
            buffer.bind(state);
        }
        if let Some(buffer) = &self.index_buffer {
            buffer.bind(state);
        }
        state.vertex_array.bind(self)
    }

    pub fn unbind(state: &mut BindingState<'_>) -> bool {
        state.vertex_array.unbind()
    }

    /// 管线创建所需的顶点缓冲布局
    pub(crate) fn buffer_layout(&self) -> wgpu::VertexBufferLayout<'_> {
        wgpu::VertexBufferLayout {
            array_stride: self.stride,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &self.attributes,
        }
    }
}

impl Default for VertexArray {
    fn default() -> Self {
        Self::new()
    }
}

impl GpuResource for VertexArray {
    fn id(&self) -> ResourceId {
        self.id
    }
}

/// 把布局转换为 wgpu 顶点属性
fn vertex_attributes(layout: &BufferLayout) -> Result<Vec<wgpu::VertexAttribute>> {
    layout
        .elements()
        .iter()
        .enumerate()
        .map(|(index, element)| {
            let format = match element.count {
                1 => wgpu::VertexFormat::Float32,
                2 => wgpu::VertexFormat::Float32x2,
                3 => wgpu::VertexFormat::Float32x3,
                4 => wgpu::VertexFormat::Float32x4,
                n => {
                    return Err(GraphicsError::InvalidVertexLayout(format!(
                        "attribute {} has {} components, expected 1 to 4",
                        index, n
                    ))
                    .into())
                }
            };
            Ok(wgpu::VertexAttribute {
                format,
                offset: element.offset as wgpu::BufferAddress,
                shader_location: index as u32,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attributes_follow_layout() {
        let mut layout = BufferLayout::new();
        layout.push(2).push(2);

        let attributes = vertex_attributes(&layout).unwrap();
        assert_eq!(attributes.len(), 2);
        assert_eq!(attributes[0].shader_location, 0);
        assert_eq!(attributes[0].offset, 0);
        assert_eq!(attributes[0].format, wgpu::VertexFormat::Float32x2);
        assert_eq!(attributes[1].shader_location, 1);
        assert_eq!(attributes[1].offset, 8);
    }

    #[test]
    fn test_component_count_out_of_range() {
        let mut layout = BufferLayout::new();
        layout.push(5);
        assert!(vertex_attributes(&layout).is_err());

        let mut layout = BufferLayout::new();
        layout.push(0);
        assert!(vertex_attributes(&layout).is_err());
    }

    #[test]
    fn test_new_array_is_empty() {
        let array = VertexArray::new();
        assert!(array.vertex_buffer().is_none());
        assert!(array.index_buffer().is_none());
        assert_eq!(array.buffer_layout().array_stride, 0);
    }

    #[test]
    fn test_bind_twice_keeps_handle() {
        let array = VertexArray::new();
        let mut state = BindingState::new();

        assert!(array.bind(&mut state));
        assert!(!array.bind(&mut state));
        assert_eq!(state.vertex_array.id(), Some(array.id()));

        assert!(VertexArray::unbind(&mut state));
        assert!(state.vertex_array.id().is_none());
    }
}
