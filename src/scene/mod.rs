//! 场景
//!
//! - `heading`：航向角（受限区间）
//! - `phase`：帧阶段状态机
//! - `compass`：罗盘的资源和两层绘制

pub mod compass;
pub mod heading;
pub mod phase;

pub use compass::CompassScene;
pub use heading::Heading;
pub use phase::FramePhase;
