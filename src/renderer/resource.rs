//! 资源句柄
//!
//! 每个 GPU 资源（缓冲、顶点数组、纹理、着色器程序）在创建时分配一个
//! 进程内唯一的 `ResourceId`。0 永远不会被分配，代表"未绑定"。
//!
//! 资源类型都不实现 `Clone`：复制一个对象就等于复制了一个仍然存活的句柄，
//! 而 GPU 端的状态并没有被复制。

use std::num::NonZeroU32;
use std::sync::atomic::{AtomicU32, Ordering};

/// GPU 资源的唯一标识
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResourceId(NonZeroU32);

static NEXT_RESOURCE_ID: AtomicU32 = AtomicU32::new(1);

impl ResourceId {
    /// 分配一个新的标识
    pub fn allocate() -> Self {
        let raw = NEXT_RESOURCE_ID.fetch_add(1, Ordering::Relaxed);
        // 计数器从 1 开始，溢出回绕到 0 之前早已耗尽了 40 亿个资源
        Self(NonZeroU32::new(raw).unwrap_or(NonZeroU32::MIN))
    }

    /// 原始数值（用于日志和调试标签）
    pub fn raw(self) -> u32 {
        self.0.get()
    }
}

impl std::fmt::Display for ResourceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// 拥有一个 GPU 句柄的资源
pub trait GpuResource {
    fn id(&self) -> ResourceId;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_unique_and_non_zero() {
        let a = ResourceId::allocate();
        let b = ResourceId::allocate();
        assert_ne!(a, b);
        assert!(a.raw() > 0);
        assert!(b.raw() > 0);
    }

    #[test]
    fn test_display() {
        let id = ResourceId::allocate();
        assert_eq!(id.to_string(), format!("#{}", id.raw()));
    }
}
