//! 控制面板
//!
//! 一个 "Control Panel" 窗口：航向滑块（0–359，一位小数）和退出按钮。

use egui;

use crate::gui::state::GuiState;

pub const WINDOW_TITLE: &str = "Control Panel";
pub const EXIT_BUTTON_SIZE: egui::Vec2 = egui::vec2(100.0, 30.0);

/// 渲染控制面板
pub fn render(ctx: &egui::Context, state: &mut GuiState) {
    egui::Window::new(WINDOW_TITLE)
        .resizable(false)
        .show(ctx, |ui| {
            ui.label("Heading (degree):");
            ui.add(
                egui::Slider::new(&mut state.heading, state.heading_range.clone())
                    .fixed_decimals(1),
            );
            ui.add_space(ui.spacing().item_spacing.y);

            if ui
                .add(egui::Button::new("Exit").min_size(EXIT_BUTTON_SIZE))
                .clicked()
            {
                state.exit_requested = true;
            }
        });
}
