pub mod theme;

use eframe::egui;
use std::sync::Arc;

use crate::audio::{ControlEvent, Player, PlayerControls};
use crate::spectrum::scheduler::SchedulerHandle;
use crate::spectrum::{FrameHandle, SCOPE_SIZE};
use theme::Theme;

/// Top-level application: a transport row plus the spectrum view.
///
/// This is the render adapter: it owns no analysis state and only turns the
/// latest published frame plus the selected theme into drawable primitives.
pub struct PlayerApp {
    frames: FrameHandle,
    controls: Arc<PlayerControls>,
    theme: Theme,
    gain: f32,
    now_playing: String,

    //
    // The trippy theme re-rolls its palette entry every few repaints.
    //
    rand_counter: u32,
    rand_bucket: usize,

    //
    // Playback and the analysis thread live and die with the window.
    //
    _player: Option<Player>,
    _scheduler: SchedulerHandle,
}

impl PlayerApp {
    pub fn new(
        _cc: &eframe::CreationContext,
        frames: FrameHandle,
        controls: Arc<PlayerControls>,
        now_playing: String,
        player: Option<Player>,
        scheduler: SchedulerHandle,
    ) -> Self {
        let gain = controls.gain();
        Self {
            frames,
            controls,
            theme: Theme::Default,
            gain,
            now_playing,
            rand_counter: 0,
            rand_bucket: 0,
            _player: player,
            _scheduler: scheduler,
        }
    }

    /// Picks the stroke color for this repaint from the theme palette.
    fn line_color(&mut self, levels: &[f32; SCOPE_SIZE]) -> egui::Color32 {
        match self.theme {
            Theme::Trippy => {
                if self.rand_counter == 3 {
                    self.rand_bucket = theme::intensity_bucket(rand::random::<f32>());
                    self.rand_counter = 0;
                } else {
                    self.rand_counter += 1;
                }
                self.theme.palette()[self.rand_bucket]
            }
            // Color tracks the low-end intensity of the current frame.
            _ => self.theme.palette()[theme::intensity_bucket(levels[10])],
        }
    }

    fn draw_spectrum(&mut self, ui: &mut egui::Ui) {
        let rect = ui.available_rect_before_wrap();
        let levels = *self.frames.frame().levels();
        let color = self.line_color(&levels);

        let points: Vec<egui::Pos2> = levels
            .iter()
            .enumerate()
            .map(|(i, &level)| {
                let x = rect.min.x + (i as f32 / (SCOPE_SIZE - 1) as f32) * rect.width();
                let y = rect.max.y - level * rect.height();
                egui::Pos2::new(x, y)
            })
            .collect();

        ui.painter()
            .add(egui::Shape::line(points, egui::Stroke::new(1.0, color)));
    }
}

impl eframe::App for PlayerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let mut events: Vec<ControlEvent> = Vec::new();

        //
        // Transport row: play/stop, visualizer gain, skin picker, file name.
        //
        egui::TopBottomPanel::top("transport").show(ctx, |ui| {
            ui.horizontal(|ui| {
                let label = if self.controls.is_playing() { "Stop" } else { "Play" };
                if ui.button(label).clicked() {
                    events.push(ControlEvent::TogglePlayback);
                }

                ui.separator();

                ui.label("Visualizer Gain:");
                if ui
                    .add(egui::Slider::new(&mut self.gain, 0.0..=2.0).show_value(false))
                    .changed()
                {
                    events.push(ControlEvent::SetGain(self.gain));
                }

                ui.separator();

                egui::ComboBox::from_id_salt("skin")
                    .selected_text(self.theme.label())
                    .show_ui(ui, |ui| {
                        for t in theme::ALL {
                            ui.selectable_value(&mut self.theme, t, t.label());
                        }
                    });

                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    ui.label(format!("Now Playing: {}", self.now_playing));
                });
            });
        });

        //
        // UI events funnel through the single dispatch point.
        //
        for event in events {
            self.controls.dispatch(event);
        }

        let background = self.theme.background();
        egui::CentralPanel::default()
            .frame(egui::Frame::none().fill(background))
            .show(ctx, |ui| {
                self.draw_spectrum(ui);
            });
    }
}
