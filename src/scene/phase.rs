//! 帧阶段
//!
//! ```text
//! Uninitialized → Ready → Cleared → Drawn → UiRendered → Presented → Ready ...
//! ```
//!
//! 获取交换链纹理失败时整帧被跳过，阶段停留在 `Ready`。

use std::fmt;

use crate::core::error::{FlightHeadingError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FramePhase {
    #[default]
    Uninitialized,
    Ready,
    Cleared,
    Drawn,
    UiRendered,
    Presented,
}

impl FramePhase {
    /// 合法的下一个阶段
    pub fn next(self) -> FramePhase {
        match self {
            FramePhase::Uninitialized => FramePhase::Ready,
            FramePhase::Ready => FramePhase::Cleared,
            FramePhase::Cleared => FramePhase::Drawn,
            FramePhase::Drawn => FramePhase::UiRendered,
            FramePhase::UiRendered => FramePhase::Presented,
            FramePhase::Presented => FramePhase::Ready,
        }
    }

    /// 进入 `to`，不是合法的下一阶段时返回错误
    pub fn advance(&mut self, to: FramePhase) -> Result<()> {
        if self.next() != to {
            return Err(FlightHeadingError::Runtime(format!(
                "invalid frame phase transition {} -> {}",
                self, to
            )));
        }
        *self = to;
        Ok(())
    }
}

impl fmt::Display for FramePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_cycle() {
        let mut phase = FramePhase::default();
        for to in [
            FramePhase::Ready,
            FramePhase::Cleared,
            FramePhase::Drawn,
            FramePhase::UiRendered,
            FramePhase::Presented,
            FramePhase::Ready,
        ] {
            phase.advance(to).unwrap();
        }
        assert_eq!(phase, FramePhase::Ready);
    }

    #[test]
    fn test_cannot_draw_before_clear() {
        let mut phase = FramePhase::Ready;
        let err = phase.advance(FramePhase::Drawn).unwrap_err();
        assert!(err.to_string().contains("Ready -> Drawn"));
        assert_eq!(phase, FramePhase::Ready);
    }

    #[test]
    fn test_cannot_present_twice() {
        let mut phase = FramePhase::UiRendered;
        phase.advance(FramePhase::Presented).unwrap();
        assert!(phase.advance(FramePhase::Presented).is_err());
    }
}
