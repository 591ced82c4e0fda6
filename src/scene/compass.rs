//! 罗盘场景
//!
//! 一个覆盖整个视口的四边形，画两次：
//! 1. 背景表盘，按航向绕 +Z 旋转
//! 2. 前景指针/外框，不旋转，alpha 混合在背景之上
//!
//! 两次绘制共享同一份顶点数组和着色器程序，只切换纹理和 `modelMat`。

use tracing::info;

use crate::core::config::AssetsConfig;
use crate::core::error::Result;
use crate::core::math::{to_column_major, Matrix4};
use crate::gfx::{BindingState, Frame, GpuContext};
use crate::renderer::{
    BufferLayout, IndexBuffer, Renderer, ShaderProgram, Texture, TextureOptions, VertexArray,
    VertexBuffer,
};
use crate::scene::heading::Heading;

/// 纹理采样器 uniform
pub const TEXTURE_UNIFORM: &str = "rectTexture";
/// 模型矩阵 uniform
pub const MODEL_UNIFORM: &str = "modelMat";

/// 四边形顶点：位置 (x, y) + 纹理坐标 (u, v)
#[rustfmt::skip]
pub const QUAD_VERTICES: [f32; 16] = [
    -1.0,  1.0,  0.0, 1.0, // 左上
    -1.0, -1.0,  0.0, 0.0, // 左下
     1.0, -1.0,  1.0, 0.0, // 右下
     1.0,  1.0,  1.0, 1.0, // 右上
];

pub const QUAD_INDICES: [u32; 6] = [0, 1, 2, 0, 2, 3];

/// 顶点布局：位置 2 个分量，纹理坐标 2 个分量
pub fn quad_layout() -> BufferLayout {
    let mut layout = BufferLayout::new();
    layout.push(2).push(2);
    layout
}

/// 背景和前景各自的模型矩阵
pub fn layer_transforms(heading: &Heading) -> [Matrix4; 2] {
    [heading.rotation(), Matrix4::identity()]
}

/// 场景资源
pub struct CompassScene {
    quad: VertexArray,
    program: ShaderProgram,
    background: Texture,
    foreground: Texture,
}

impl CompassScene {
    /// 加载几何、着色器和两张纹理，任何一步失败都返回错误
    pub fn new(ctx: &GpuContext, assets: &AssetsConfig) -> Result<Self> {
        let mut quad = VertexArray::new();
        quad.add_buffer(VertexBuffer::new(ctx, &QUAD_VERTICES)?, &quad_layout())?;
        quad.set_index_buffer(IndexBuffer::new(ctx, &QUAD_INDICES)?);

        let program = ShaderProgram::new(ctx, &assets.vertex_shader, &assets.fragment_shader)?;
        let background =
            Texture::new(ctx, &assets.background_texture, TextureOptions::default())?;
        let foreground =
            Texture::new(ctx, &assets.foreground_texture, TextureOptions::default())?;

        info!("Compass scene loaded");

        Ok(Self {
            quad,
            program,
            background,
            foreground,
        })
    }

    /// 画背景和前景两层
    pub fn draw(
        &self,
        ctx: &GpuContext,
        renderer: &mut Renderer,
        frame: &Frame,
        heading: &Heading,
    ) -> Result<()> {
        let mut state = BindingState::new();
        self.program.bind(&mut state);
        self.quad.bind(&mut state);

        let layers = [&self.background, &self.foreground];
        for (texture, transform) in layers.into_iter().zip(layer_transforms(heading)) {
            texture.bind(&mut state, 0)?;
            self.program
                .set_uniform_1i(ctx, &mut state, TEXTURE_UNIFORM, 0)?;
            self.program.set_uniform_matrix4f(
                ctx,
                &mut state,
                MODEL_UNIFORM,
                to_column_major(&transform),
            )?;
            renderer.draw_indexed(ctx, frame, &state)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::math::Vector4;

    #[test]
    fn test_quad_covers_clip_space() {
        let layout = quad_layout();
        let floats_per_vertex = layout.stride() as usize / 4;
        assert_eq!(QUAD_VERTICES.len() / floats_per_vertex, 4);

        for vertex in QUAD_VERTICES.chunks(floats_per_vertex) {
            let (x, y, u, v) = (vertex[0], vertex[1], vertex[2], vertex[3]);
            assert_eq!(x.abs(), 1.0);
            assert_eq!(y.abs(), 1.0);
            // 纹理坐标和位置同向
            assert_eq!(u, (x + 1.0) / 2.0);
            assert_eq!(v, (y + 1.0) / 2.0);
        }
        assert!(QUAD_INDICES.iter().all(|&i| i < 4));
    }

    #[test]
    fn test_background_rotates_foreground_fixed() {
        let heading = Heading::new(0.0, 359.0, 90.0);
        let [background, foreground] = layer_transforms(&heading);

        let x = Vector4::new(1.0, 0.0, 0.0, 1.0);
        assert!((background * x - Vector4::new(0.0, 1.0, 0.0, 1.0)).abs().max() < 1e-6);
        assert_eq!(foreground, Matrix4::identity());
    }

    #[test]
    fn test_zero_heading_is_identity() {
        let [background, _] = layer_transforms(&Heading::default());
        assert!((background - Matrix4::identity()).abs().max() < 1e-6);
    }
}
