//! Dismissable banners for errors and confirmations

use crate::state::{NoticeLevel, Notices};

pub fn show(ctx: &egui::Context, notices: &mut Notices) {
    if notices.is_empty() {
        return;
    }
    let mut dismissed = Vec::new();
    egui::Area::new(egui::Id::new("notices"))
        .anchor(egui::Align2::CENTER_TOP, egui::vec2(0.0, 72.0))
        .order(egui::Order::Foreground)
        .show(ctx, |ui| {
            for notice in notices.iter() {
                let fill = match notice.level {
                    NoticeLevel::Info => egui::Color32::from_rgb(0x15, 0x65, 0xC0),
                    NoticeLevel::Error => egui::Color32::from_rgb(0xB0, 0x2A, 0x2C),
                };
                egui::Frame::popup(ui.style())
                    .fill(fill)
                    .inner_margin(egui::Margin::symmetric(10, 6))
                    .show(ui, |ui| {
                        ui.horizontal(|ui| {
                            ui.colored_label(egui::Color32::WHITE, &notice.message);
                            if ui.small_button("✕").clicked() {
                                dismissed.push(notice.id);
                            }
                        });
                    });
                ui.add_space(4.0);
            }
        });
    for id in dismissed {
        notices.dismiss(id);
    }
}
