use egui::epaint::Shadow;

/// Navigation state shown at the bottom of the screen.
pub struct NavigationStatus {
    /// Island the camera rests at, if any.
    pub current: Option<String>,
    /// Island the camera is flying to, with linear progress in [0, 1].
    pub travelling_to: Option<(String, f32)>,
}

impl NavigationStatus {
    pub fn headline(&self) -> String {
        match (&self.travelling_to, &self.current) {
            (Some((name, p)), _) => format!("Flying to {name}... {:.0}%", p * 100.0),
            (None, Some(name)) => format!("Welcome to the {name} island"),
            (None, None) => "Click an island to visit it".to_string(),
        }
    }
}

/// Frame statistics for the F3 panel.
pub struct FrameStats {
    pub fps: u32,
    pub frame_time_avg_ms: f32,
    pub triangle_count: usize,
    pub resolution: (u32, u32),
    pub camera_eye: (f32, f32, f32),
    pub camera_distance: f32,
}

/// One island name label, already projected to egui screen points.
pub struct IslandLabel {
    pub pos: egui::Pos2,
    pub name: String,
    pub highlighted: bool,
}

pub struct Hud {
    pub stats_visible: bool,
    egui_ctx: egui::Context,
    egui_state: egui_winit::State,
    egui_renderer: egui_wgpu::Renderer,
}

impl Hud {
    pub fn new(
        window: &winit::window::Window,
        device: &wgpu::Device,
        surface_format: wgpu::TextureFormat,
    ) -> Self {
        let egui_ctx = egui::Context::default();

        let mut visuals = egui::Visuals::dark();
        visuals.window_fill = egui::Color32::from_rgba_premultiplied(0, 0, 0, 160);
        visuals.window_stroke = egui::Stroke::NONE;
        visuals.window_shadow = Shadow::NONE;
        visuals.override_text_color = Some(egui::Color32::WHITE);
        egui_ctx.set_visuals(visuals);

        let egui_state = egui_winit::State::new(
            egui_ctx.clone(),
            egui::ViewportId::ROOT,
            window,
            Some(window.scale_factor() as f32),
            None,
            None,
        );

        let egui_renderer = egui_wgpu::Renderer::new(
            device,
            surface_format,
            None,  // no depth
            1,     // msaa samples
            false, // no dithering
        );

        Self {
            stats_visible: false,
            egui_ctx,
            egui_state,
            egui_renderer,
        }
    }

    pub fn toggle_stats(&mut self) {
        self.stats_visible = !self.stats_visible;
    }

    pub fn handle_window_event(
        &mut self,
        window: &winit::window::Window,
        event: &winit::event::WindowEvent,
    ) -> egui_winit::EventResponse {
        self.egui_state.on_window_event(window, event)
    }

    /// Render one egui frame: island labels, the navigation banner and, if
    /// enabled, the stats panel.
    pub fn render(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        encoder: &mut wgpu::CommandEncoder,
        window: &winit::window::Window,
        view: &wgpu::TextureView,
        screen_descriptor: &egui_wgpu::ScreenDescriptor,
        status: &NavigationStatus,
        labels: &[IslandLabel],
        stats: Option<&FrameStats>,
    ) {
        let raw_input = self.egui_state.take_egui_input(window);
        let stats = stats.filter(|_| self.stats_visible);

        let full_output = self.egui_ctx.run(raw_input, |ctx| {
            let painter = ctx.layer_painter(egui::LayerId::new(
                egui::Order::Background,
                egui::Id::new("island_labels"),
            ));
            for label in labels {
                let color = if label.highlighted {
                    egui::Color32::from_rgb(255, 220, 120)
                } else {
                    egui::Color32::WHITE
                };
                painter.text(
                    label.pos,
                    egui::Align2::CENTER_BOTTOM,
                    label.name.to_uppercase(),
                    egui::FontId::proportional(16.0),
                    color,
                );
            }

            egui::Area::new(egui::Id::new("navigation_banner"))
                .anchor(egui::Align2::CENTER_BOTTOM, egui::vec2(0.0, -24.0))
                .show(ctx, |ui| {
                    egui::Frame::none()
                        .fill(egui::Color32::from_rgba_premultiplied(0, 0, 0, 160))
                        .inner_margin(egui::Margin::same(10.0))
                        .rounding(6.0)
                        .show(ui, |ui: &mut egui::Ui| {
                            ui.label(egui::RichText::new(status.headline()).size(18.0));
                        });
                });

            if let Some(stats) = stats {
                egui::Area::new(egui::Id::new("frame_stats"))
                    .fixed_pos(egui::pos2(10.0, 10.0))
                    .show(ctx, |ui| {
                        egui::Frame::none()
                            .fill(egui::Color32::from_rgba_premultiplied(0, 0, 0, 180))
                            .inner_margin(egui::Margin::same(8.0))
                            .rounding(4.0)
                            .show(ui, |ui: &mut egui::Ui| {
                                ui.style_mut().override_font_id = Some(egui::FontId::monospace(13.0));
                                ui.label(format!("FPS: {}", stats.fps));
                                ui.label(format!("Frame: {:.2} ms", stats.frame_time_avg_ms));
                                ui.label(format!("Triangles: {}", stats.triangle_count));
                                ui.label(format!(
                                    "Resolution: {} x {}",
                                    stats.resolution.0, stats.resolution.1
                                ));
                                ui.label(format!(
                                    "Eye: ({:.1}, {:.1}, {:.1})  dist {:.1}",
                                    stats.camera_eye.0, stats.camera_eye.1, stats.camera_eye.2,
                                    stats.camera_distance
                                ));
                            });
                    });
            }
        });

        self.egui_state
            .handle_platform_output(window, full_output.platform_output);

        let tris = self
            .egui_ctx
            .tessellate(full_output.shapes, full_output.pixels_per_point);

        for (id, image_delta) in &full_output.textures_delta.set {
            self.egui_renderer
                .update_texture(device, queue, *id, image_delta);
        }

        self.egui_renderer
            .update_buffers(device, queue, encoder, &tris, screen_descriptor);

        {
            let render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("HUD Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Load,
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                occlusion_query_set: None,
                timestamp_writes: None,
            });

            self.egui_renderer
                .render(&mut render_pass.forget_lifetime(), &tris, screen_descriptor);
        }

        for id in &full_output.textures_delta.free {
            self.egui_renderer.free_texture(id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn headline_reflects_navigation_state() {
        let idle = NavigationStatus { current: None, travelling_to: None };
        assert_eq!(idle.headline(), "Click an island to visit it");

        let resting = NavigationStatus { current: Some("venue".into()), travelling_to: None };
        assert_eq!(resting.headline(), "Welcome to the venue island");

        let flying = NavigationStatus {
            current: None,
            travelling_to: Some(("food".into(), 0.42)),
        };
        assert_eq!(flying.headline(), "Flying to food... 42%");
    }
}
