use core_types::ProductId;
use egui::{Button, CentralPanel, Context, Frame, Id, Label, RichText, ScrollArea, Ui};

pub const TITLE: &str = "Example Mac App";
pub const TITLE_ID: &str = "Title";
pub const RESPONSE_TEXT_ID: &str = "ResponseText";
const OUTPUT_MAX_HEIGHT: f32 = 200.0;

/// Draws the whole window from `text` alone and reports which button, if
/// any, was activated this frame.
pub fn content(ctx: &Context, text: &str) -> Option<ProductId> {
    let mut clicked = None;

    CentralPanel::default().show(ctx, |ui| {
        ui.vertical_centered(|ui| {
            ui.spacing_mut().item_spacing.y = 20.0;

            ui.push_id(TITLE_ID, |ui| {
                ui.add_space(10.0);
                let title = ui.label(RichText::new(TITLE).heading().strong());
                expose(ui, title.id, TITLE_ID);
            });

            for product in ProductId::ALL {
                let response = ui
                    .push_id(product.accessibility_id(), |ui| {
                        ui.add(Button::new(product.button_label()))
                    })
                    .inner;
                expose(ui, response.id, product.accessibility_id());
                if response.clicked() {
                    clicked = Some(product);
                }
            }
        });

        ui.separator();

        Frame::group(ui.style()).show(ui, |ui| {
            ScrollArea::vertical()
                .id_salt(Id::new(RESPONSE_TEXT_ID))
                .max_height(OUTPUT_MAX_HEIGHT)
                .auto_shrink([false, true])
                .show(ui, |ui| {
                    let output = ui.add(Label::new(RichText::new(text).monospace()).selectable(true));
                    expose(ui, output.id, RESPONSE_TEXT_ID);
                });
        });
    });

    clicked
}

/// Publishes `author_id` as the widget's accessibility identifier so UI
/// automation can find it by a name that survives layout and label changes.
/// No-op until an accessibility client activates the tree.
fn expose(ui: &Ui, id: Id, author_id: &'static str) {
    ui.ctx()
        .accesskit_node_builder(id, |node| node.set_author_id(author_id));
}
