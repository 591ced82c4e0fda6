//! 一帧的颜色目标
//!
//! 持有当前获取到的交换链纹理。`present` 消耗自身，
//! 保证一帧只被呈现一次。

/// 当前帧
pub struct Frame {
    surface_texture: wgpu::SurfaceTexture,
    view: wgpu::TextureView,
}

impl Frame {
    pub(crate) fn new(surface_texture: wgpu::SurfaceTexture) -> Self {
        let view = surface_texture
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        Self { surface_texture, view }
    }

    /// 颜色目标视图
    pub fn view(&self) -> &wgpu::TextureView {
        &self.view
    }

    /// 颜色目标尺寸（像素）
    pub fn size(&self) -> (u32, u32) {
        let texture = &self.surface_texture.texture;
        (texture.width(), texture.height())
    }

    /// 呈现到窗口
    pub fn present(self) {
        self.surface_texture.present();
    }
}
