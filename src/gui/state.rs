//! GUI 状态
//!
//! 控制面板读写的数据。每帧构建完 UI 后由应用把它同步到场景。

use std::ops::RangeInclusive;

use crate::scene::Heading;

/// GUI 状态
#[derive(Debug, Clone, PartialEq)]
pub struct GuiState {
    /// 滑块上的航向（度）
    pub heading: f32,
    pub heading_range: RangeInclusive<f32>,
    /// 点击了 "Exit"
    pub exit_requested: bool,
}

impl GuiState {
    pub fn new(heading: &Heading) -> Self {
        Self {
            heading: heading.degrees(),
            heading_range: heading.range(),
            exit_requested: false,
        }
    }

    /// 把滑块的值写入场景航向，并回写截断后的值
    ///
    /// 返回航向是否变化。
    pub fn apply_to(&mut self, heading: &mut Heading) -> bool {
        let changed = heading.set(self.heading);
        self.heading = heading.degrees();
        changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_state_follows_heading() {
        let state = GuiState::new(&Heading::new(0.0, 359.0, 42.0));
        assert_eq!(state.heading, 42.0);
        assert_eq!(state.heading_range, 0.0..=359.0);
        assert!(!state.exit_requested);
    }

    #[test]
    fn test_apply_clamps_and_writes_back() {
        let mut heading = Heading::default();
        let mut state = GuiState::new(&heading);

        state.heading = 90.5;
        assert!(state.apply_to(&mut heading));
        assert_eq!(heading.degrees(), 90.5);

        state.heading = 500.0;
        assert!(state.apply_to(&mut heading));
        assert_eq!(heading.degrees(), 359.0);
        assert_eq!(state.heading, 359.0);

        assert!(!state.apply_to(&mut heading));
    }
}
