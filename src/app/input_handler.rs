use crate::PainterApp;
use eframe::egui;

/// Forward this frame's pointer and keyboard events to the session.
///
/// Space + drag pans the view, the scroll wheel zooms, Escape drops an armed
/// shape and `C` clears the active layer.
pub fn handle_input(
    app: &mut PainterApp,
    ctx: &egui::Context,
    response: &egui::Response,
    origin: egui::Pos2,
) {
    let events = ctx.input(|i| i.events.clone());

    for event in events {
        match event {
            egui::Event::PointerButton {
                pos,
                button: egui::PointerButton::Primary,
                pressed,
                ..
            } => {
                let (canvas_pos, inside) = app.screen_to_canvas(pos, origin);
                app.is_primary_down = pressed;

                if pressed && ctx.input(|i| i.key_down(egui::Key::Space)) {
                    app.is_panning = true;
                    continue;
                }
                if !pressed && app.is_panning {
                    app.is_panning = false;
                    continue;
                }

                if pressed {
                    if !response.hovered() || !inside {
                        continue;
                    }
                    if app.session.is_previewing_shape() {
                        app.session.pointer_click(canvas_pos);
                    } else {
                        app.session.pointer_down(canvas_pos);
                    }
                } else {
                    app.session.pointer_up(canvas_pos);
                }
            }

            egui::Event::PointerMoved(pos) => {
                if app.is_panning {
                    let delta = ctx.input(|i| i.pointer.delta());
                    app.offset.x += delta.x;
                    app.offset.y += delta.y;
                    continue;
                }
                let (canvas_pos, inside) = app.screen_to_canvas(pos, origin);
                if app.session.is_previewing_shape() && !inside {
                    continue;
                }
                app.session.pointer_move(canvas_pos);
            }

            egui::Event::MouseWheel { delta, .. } if response.hovered() => {
                let zoom_change = delta.y * 0.05;
                app.zoom = (app.zoom * (1.0 + zoom_change)).clamp(0.1, 20.0);
            }

            egui::Event::Key {
                key, pressed: true, ..
            } => match key {
                egui::Key::Escape => app.session.cancel_shape(),
                egui::Key::C if !ctx.wants_keyboard_input() => {
                    app.session.clear_active_layer();
                }
                _ => {}
            },

            _ => {}
        }
    }
}
