//! 视口
//!
//! 绘制区域是边长为 `min(宽, 高)` 的正方形，贴在窗口左下角。
//! wgpu 的视口原点在左上角，所以 y 坐标是 `窗口高 - 边长`。

/// 正方形视口
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    window_width: u32,
    window_height: u32,
    side: u32,
}

impl Viewport {
    pub fn new(window_width: u32, window_height: u32) -> Self {
        Self {
            window_width,
            window_height,
            side: window_width.min(window_height),
        }
    }

    /// 窗口尺寸变化后重新计算
    pub fn resize(&mut self, window_width: u32, window_height: u32) {
        *self = Self::new(window_width, window_height);
    }

    pub fn window_size(&self) -> (u32, u32) {
        (self.window_width, self.window_height)
    }

    /// 正方形边长（像素）
    pub fn side(&self) -> u32 {
        self.side
    }

    /// 左上角坐标（wgpu 帧缓冲坐标）
    pub fn origin(&self) -> (u32, u32) {
        (0, self.window_height - self.side)
    }

    /// 窗口最小化时没有可绘制区域
    pub fn is_empty(&self) -> bool {
        self.side == 0
    }

    /// 设置到渲染通道
    pub(crate) fn apply(&self, pass: &mut wgpu::RenderPass<'_>) {
        let (x, y) = self.origin();
        pass.set_viewport(x as f32, y as f32, self.side as f32, self.side as f32, 0.0, 1.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_square_window() {
        let viewport = Viewport::new(600, 600);
        assert_eq!(viewport.side(), 600);
        assert_eq!(viewport.origin(), (0, 0));
    }

    #[test]
    fn test_wide_window() {
        let mut viewport = Viewport::new(600, 600);
        viewport.resize(800, 600);
        assert_eq!(viewport.side(), 600);
        assert_eq!(viewport.window_size(), (800, 600));
        assert_eq!(viewport.origin(), (0, 0));
    }

    #[test]
    fn test_tall_window_anchors_bottom() {
        let viewport = Viewport::new(400, 700);
        assert_eq!(viewport.side(), 400);
        assert_eq!(viewport.origin(), (0, 300));
    }

    #[test]
    fn test_minimised() {
        let viewport = Viewport::new(0, 0);
        assert!(viewport.is_empty());
        assert_eq!(viewport.origin(), (0, 0));
    }
}
