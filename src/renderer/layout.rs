//! 顶点缓冲布局
//!
//! 描述顶点缓冲中的 f32 数据如何映射到着色器属性。纯元数据，不涉及 GPU。
//!
//! `push(n)` 在当前偏移处追加一个由 `n` 个 f32 组成的属性，然后把步长增加
//! `n × 4` 字节。`push` 的顺序就是属性索引的顺序（0, 1, 2, ...）。

/// f32 分量的字节大小
pub const FLOAT_SIZE: u32 = std::mem::size_of::<f32>() as u32;

/// 布局中的一个属性
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BufferElement {
    /// 分量个数
    pub count: u32,
    /// 相对顶点起始处的字节偏移
    pub offset: u32,
    /// 是否归一化（f32 属性总是 false）
    pub normalized: bool,
}

impl BufferElement {
    /// 属性占用的字节数
    pub fn size(&self) -> u32 {
        self.count * FLOAT_SIZE
    }
}

/// 顶点缓冲布局
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BufferLayout {
    elements: Vec<BufferElement>,
    stride: u32,
}

impl BufferLayout {
    pub fn new() -> Self {
        Self::default()
    }

    /// 追加一个 `count` 个 f32 分量的属性
    pub fn push(&mut self, count: u32) -> &mut Self {
        self.elements.push(BufferElement {
            count,
            offset: self.stride,
            normalized: false,
        });
        self.stride += count * FLOAT_SIZE;
        self
    }

    pub fn elements(&self) -> &[BufferElement] {
        &self.elements
    }

    /// 一个顶点的字节跨度
    pub fn stride(&self) -> u32 {
        self.stride
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_and_tex_coord() {
        let mut layout = BufferLayout::new();
        layout.push(2).push(2);

        assert_eq!(layout.stride(), 16);
        assert_eq!(layout.elements()[0].offset, 0);
        assert_eq!(layout.elements()[1].offset, 8);
        assert!(layout.elements().iter().all(|e| !e.normalized));
    }

    #[test]
    fn test_offsets_are_running_sums() {
        let counts = [3, 1, 4, 2];
        let mut layout = BufferLayout::new();
        for count in counts {
            layout.push(count);
        }

        let mut expected_offset = 0;
        for (element, count) in layout.elements().iter().zip(counts) {
            assert_eq!(element.count, count);
            assert_eq!(element.offset, expected_offset);
            assert_eq!(element.size(), 4 * count);
            expected_offset += 4 * count;
        }
        assert_eq!(layout.stride(), 4 * counts.iter().sum::<u32>());
    }

    #[test]
    fn test_empty_layout() {
        let layout = BufferLayout::new();
        assert_eq!(layout.stride(), 0);
        assert!(layout.elements().is_empty());
    }
}
