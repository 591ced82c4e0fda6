//! 绘制
//!
//! `Renderer` 从绑定状态中读取当前的着色器程序、顶点数组和纹理单元，
//! 发出一次索引绘制。wgpu 把顶点布局、着色器和目标格式固化在管线里，
//! 管线在第一次绘制时按 (程序, 顶点数组, 目标格式) 创建并缓存。
//!
//! 每次清屏和绘制都单独提交一个命令缓冲，两次绘制之间写入的 uniform
//! 因此只影响后一次绘制。

use std::collections::HashMap;

use tracing::debug;

use crate::core::error::{GraphicsError, Result};
use crate::gfx::{BindingState, Frame, GpuContext};
use crate::renderer::buffer::{IndexBuffer, VertexBuffer};
use crate::renderer::resource::{GpuResource, ResourceId};
use crate::renderer::shader::ShaderProgram;
use crate::renderer::vertex_array::VertexArray;
use crate::renderer::viewport::Viewport;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct PipelineKey {
    program: ResourceId,
    vertex_array: ResourceId,
    format: wgpu::TextureFormat,
}

/// 绘制状态：管线缓存和视口
pub struct Renderer {
    pipelines: HashMap<PipelineKey, wgpu::RenderPipeline>,
    viewport: Viewport,
}

impl Renderer {
    pub fn new(window_width: u32, window_height: u32) -> Self {
        Self {
            pipelines: HashMap::new(),
            viewport: Viewport::new(window_width, window_height),
        }
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    /// 窗口尺寸变化时更新视口
    pub fn set_viewport(&mut self, window_width: u32, window_height: u32) {
        self.viewport.resize(window_width, window_height);
        debug!(
            width = window_width,
            height = window_height,
            side = self.viewport.side(),
            "Viewport updated"
        );
    }

    /// 已缓存的管线数量
    pub fn pipeline_count(&self) -> usize {
        self.pipelines.len()
    }

    /// 用清屏色清空整个颜色目标
    pub fn clear(&self, ctx: &GpuContext, frame: &Frame, color: [f32; 4]) -> Result<()> {
        let color = clear_color(color, ctx.surface_format());

        ctx.checked("clear", || {
            let mut encoder = ctx
                .device
                .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                    label: Some("Clear Encoder"),
                });
            {
                let _pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some("Clear Pass"),
                    color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                        view: frame.view(),
                        resolve_target: None,
                        ops: wgpu::Operations {
                            load: wgpu::LoadOp::Clear(color),
                            store: wgpu::StoreOp::Store,
                        },
                    })],
                    depth_stencil_attachment: None,
                    timestamp_writes: None,
                    occlusion_query_set: None,
                });
            }
            ctx.queue.submit(std::iter::once(encoder.finish()));
        })
    }

    /// 用当前绑定的资源绘制索引三角形
    pub fn draw_indexed(
        &mut self,
        ctx: &GpuContext,
        frame: &Frame,
        state: &BindingState<'_>,
    ) -> Result<()> {
        // 1. 从绑定状态中取出资源
        let bound = BoundResources::from_state(state)?;
        let (program, vertex_array) = (bound.program, bound.vertex_array);

        // 视口以帧的实际尺寸为准
        let viewport = if self.viewport.window_size() == frame.size() {
            self.viewport
        } else {
            let (width, height) = frame.size();
            Viewport::new(width, height)
        };
        if viewport.is_empty() {
            return Ok(());
        }

        // 2. 取缓存的管线，没有则创建
        let key = PipelineKey {
            program: program.id(),
            vertex_array: vertex_array.id(),
            format: ctx.surface_format(),
        };
        if !self.pipelines.contains_key(&key) {
            let pipeline = ctx.checked("create_render_pipeline", || {
                program.create_pipeline(&ctx.device, vertex_array.buffer_layout(), key.format)
            })?;
            debug!(
                program = key.program.raw(),
                vertex_array = key.vertex_array.raw(),
                "Render pipeline created"
            );
            self.pipelines.insert(key, pipeline);
        }
        let Some(pipeline) = self.pipelines.get(&key) else {
            return Ok(());
        };

        // 3. 创建这次绘制的 bind group
        let bind_groups = ctx.checked("create_bind_group", || {
            program.create_bind_groups(&ctx.device, state)
        })??;

        // 4. 录制并提交
        ctx.checked("draw_indexed", || {
            let mut encoder = ctx
                .device
                .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                    label: Some("Draw Encoder"),
                });
            {
                let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some("Draw Pass"),
                    color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                        view: frame.view(),
                        resolve_target: None,
                        ops: wgpu::Operations {
                            load: wgpu::LoadOp::Load,
                            store: wgpu::StoreOp::Store,
                        },
                    })],
                    depth_stencil_attachment: None,
                    timestamp_writes: None,
                    occlusion_query_set: None,
                });

                pass.set_pipeline(pipeline);
                for (index, bind_group) in (0u32..).zip(&bind_groups) {
                    pass.set_bind_group(index, bind_group, &[]);
                }
                pass.set_vertex_buffer(0, bound.vertex_buffer.raw().slice(..));
                pass.set_index_buffer(bound.index_buffer.raw().slice(..), wgpu::IndexFormat::Uint32);
                viewport.apply(&mut pass);
                pass.draw_indexed(0..bound.index_buffer.count(), 0, 0..1);
            }
            ctx.queue.submit(std::iter::once(encoder.finish()));
        })
    }
}

/// 把清屏色转换到颜色目标的编码
///
/// 配置中的颜色是直接写入帧缓冲的值。sRGB 目标会在写入时编码，
/// 所以先解码为线性值。
/// 一次绘制需要的全部绑定资源
struct BoundResources<'a> {
    program: &'a ShaderProgram,
    vertex_array: &'a VertexArray,
    vertex_buffer: &'a VertexBuffer,
    index_buffer: &'a IndexBuffer,
}

impl<'a> BoundResources<'a> {
    /// 缺少任何一项都返回 `NothingBound`
    ///
    /// 索引缓冲优先取顶点数组上的，其次取单独绑定的。
    fn from_state(state: &BindingState<'a>) -> Result<Self> {
        let program = state
            .program
            .get()
            .ok_or(GraphicsError::NothingBound("shader program"))?;
        let vertex_array = state
            .vertex_array
            .get()
            .ok_or(GraphicsError::NothingBound("vertex array"))?;
        let vertex_buffer = vertex_array
            .vertex_buffer()
            .ok_or(GraphicsError::NothingBound("vertex buffer"))?;
        let index_buffer = vertex_array
            .index_buffer()
            .or_else(|| state.index_buffer.get())
            .ok_or(GraphicsError::NothingBound("index buffer"))?;

        Ok(Self {
            program,
            vertex_array,
            vertex_buffer,
            index_buffer,
        })
    }
}

fn clear_color(color: [f32; 4], format: wgpu::TextureFormat) -> wgpu::Color {
    let [r, g, b, a] = color.map(f64::from);
    if format.is_srgb() {
        wgpu::Color {
            r: srgb_to_linear(r),
            g: srgb_to_linear(g),
            b: srgb_to_linear(b),
            a,
        }
    } else {
        wgpu::Color { r, g, b, a }
    }
}

fn srgb_to_linear(value: f64) -> f64 {
    if value <= 0.04045 {
        value / 12.92
    } else {
        ((value + 0.055) / 1.055).powf(2.4)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::FlightHeadingError;

    #[test]
    fn test_clear_color_linear_target() {
        let color = clear_color([0.25, 0.3, 0.3, 1.0], wgpu::TextureFormat::Bgra8Unorm);
        assert!((color.r - 0.25).abs() < 1e-6);
        assert!((color.g - 0.3).abs() < 1e-6);
        assert_eq!(color.a, 1.0);
    }

    #[test]
    fn test_clear_color_srgb_target() {
        let color = clear_color([0.25, 0.3, 0.3, 1.0], wgpu::TextureFormat::Bgra8UnormSrgb);
        assert!((color.r - 0.0508).abs() < 1e-3);
        assert!((color.g - 0.0732).abs() < 1e-3);
        // alpha 不做转换
        assert_eq!(color.a, 1.0);
    }

    #[test]
    fn test_srgb_endpoints() {
        assert_eq!(srgb_to_linear(0.0), 0.0);
        assert!((srgb_to_linear(1.0) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_new_renderer_has_no_pipelines() {
        let renderer = Renderer::new(800, 600);
        assert_eq!(renderer.pipeline_count(), 0);
        assert_eq!(renderer.viewport().side(), 600);
    }

    #[test]
    fn test_draw_without_bindings_is_rejected() {
        let state = BindingState::new();
        let result = BoundResources::from_state(&state);
        assert!(matches!(
            result,
            Err(FlightHeadingError::Graphics(GraphicsError::NothingBound("shader program")))
        ));
    }
}
