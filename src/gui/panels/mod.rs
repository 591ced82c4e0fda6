//! GUI 面板

pub mod control;
