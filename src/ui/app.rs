// Main UI - chord metronome window

use crate::audio::engine::AudioEngine;
use crate::audio::status::OutputStatus;
use crate::messaging::channels::NotificationConsumer;
use crate::messaging::notification::{Notification, NotificationCategory, NotificationLevel};
use crate::practice::{Practice, PracticeError};
use crate::sequencer::PlaybackState;
use crate::settings::{BPM_RANGE, INTERVAL_RANGE};
use eframe::egui;
use std::collections::VecDeque;
use std::time::Instant;

const CURRENT_CHORD_COLOR: egui::Color32 = egui::Color32::from_rgb(37, 99, 235);
const NEXT_CHORD_COLOR: egui::Color32 = egui::Color32::from_rgb(202, 138, 4);
const IDLE_CHORD_COLOR: egui::Color32 = egui::Color32::from_gray(60);

pub struct ChordMetronomeApp {
    practice: Practice,
    // Kept alive for the lifetime of the window; dropping it closes the output
    audio_engine: Option<AudioEngine>,
    new_chord: String,
    // Modal alert for rejected actions
    alert: Option<String>,
    storage_warned: bool,
    // Notification system
    notification_rx: NotificationConsumer,
    notification_queue: VecDeque<Notification>,
    max_notifications: usize,
}

impl ChordMetronomeApp {
    pub fn new(
        practice: Practice,
        audio_engine: Option<AudioEngine>,
        notification_rx: NotificationConsumer,
    ) -> Self {
        Self {
            practice,
            audio_engine,
            new_chord: String::new(),
            alert: None,
            storage_warned: false,
            notification_rx,
            notification_queue: VecDeque::new(),
            max_notifications: 10,
        }
    }

    /// Drain new notifications from the ringbuffer into the queue
    fn update_notifications(&mut self) {
        while let Some(notification) =
            ringbuf::traits::Consumer::try_pop(&mut self.notification_rx)
        {
            self.push_notification(notification);
        }
    }

    fn push_notification(&mut self, notification: Notification) {
        self.notification_queue.push_back(notification);
        if self.notification_queue.len() > self.max_notifications {
            self.notification_queue.pop_front();
        }
    }

    /// Up to three notifications from the last five seconds, newest first
    fn get_recent_notifications(&self) -> Vec<&Notification> {
        self.notification_queue
            .iter()
            .rev()
            .filter(|n| n.is_recent(5000))
            .take(3)
            .collect()
    }

    /// Warn once when settings stop reaching the disk
    fn check_storage(&mut self) {
        let persisted = self.practice.settings().is_persisted();
        if !persisted && !self.storage_warned {
            self.push_notification(Notification::error(
                NotificationCategory::Storage,
                "Settings could not be saved; changes last until the app closes".to_string(),
            ));
        }
        self.storage_warned = !persisted;
    }

    /// Show a rejected action to the user
    fn report(&mut self, result: Result<(), PracticeError>) {
        if let Err(e) = result {
            log::debug!("Rejected action: {}", e);
            let message = e.to_string();
            self.push_notification(Notification::warning(
                NotificationCategory::Practice,
                message.clone(),
            ));
            self.alert = Some(message);
        }
    }

    fn handle_shortcuts(&mut self, ctx: &egui::Context) {
        // Keys belong to the chord name field while it has focus
        if ctx.memory(|m| m.focused().is_some()) || self.alert.is_some() {
            return;
        }

        if ctx.input(|i| i.key_pressed(egui::Key::Space)) {
            let result = self.practice.toggle(Instant::now());
            self.report(result);
        }
        if ctx.input(|i| i.key_pressed(egui::Key::Escape)) {
            self.practice.stop();
        }
    }

    fn draw_tempo(&mut self, ui: &mut egui::Ui) {
        let locked = self.practice.is_active();
        let mut bpm = self.practice.settings().bpm();

        ui.heading(format!("BPM: {}", bpm));
        ui.horizontal(|ui| {
            if ui
                .add_enabled(!locked, egui::Slider::new(&mut bpm, BPM_RANGE))
                .changed()
            {
                let result = self.practice.set_bpm(bpm).map(|_| ());
                self.report(result);
            }
            if ui.button("−").clicked() {
                self.practice.step_bpm(-1, Instant::now());
            }
            if ui.button("+").clicked() {
                self.practice.step_bpm(1, Instant::now());
            }
        });
    }

    fn draw_interval(&mut self, ui: &mut egui::Ui) {
        let locked = self.practice.is_active();
        let mut interval = self.practice.settings().interval();

        ui.heading(format!("Chord change every {} beats", interval));
        ui.horizontal(|ui| {
            if ui
                .add_enabled(!locked, egui::Slider::new(&mut interval, INTERVAL_RANGE))
                .changed()
            {
                let result = self.practice.set_interval(interval).map(|_| ());
                self.report(result);
            }
            if ui.button("−").clicked() {
                self.practice.step_interval(-1);
            }
            if ui.button("+").clicked() {
                self.practice.step_interval(1);
            }
        });
    }

    fn draw_chord_list(&mut self, ui: &mut egui::Ui) {
        let locked = self.practice.is_active();

        ui.heading("Chords");

        ui.horizontal(|ui| {
            let response = ui.add_enabled(
                !locked,
                egui::TextEdit::singleline(&mut self.new_chord)
                    .hint_text("Chord name")
                    .desired_width(120.0),
            );
            let submitted =
                response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));

            if ui.add_enabled(!locked, egui::Button::new("+ Add")).clicked() || submitted {
                let result = self.practice.add_chord(&self.new_chord);
                if result.is_ok() {
                    self.new_chord.clear();
                }
                self.report(result);
            }
        });

        let mut random = self.practice.settings().random_mode();
        if ui
            .add_enabled(
                !locked,
                egui::Checkbox::new(&mut random, "Play chords in random order"),
            )
            .changed()
        {
            let result = self.practice.set_random_mode(random);
            self.report(result);
        }

        ui.add_space(5.0);

        let chords = self.practice.settings().chords().to_vec();
        let mut remove_request = None;

        ui.horizontal_wrapped(|ui| {
            for (index, chord) in chords.iter().enumerate() {
                let session = self.practice.session();
                let is_current = locked && session.current_chord() == Some(chord.as_str());
                let is_next =
                    locked && !is_current && session.next_chord() == Some(chord.as_str());

                let fill = if is_current {
                    CURRENT_CHORD_COLOR
                } else if is_next {
                    NEXT_CHORD_COLOR
                } else {
                    IDLE_CHORD_COLOR
                };

                egui::Frame::none()
                    .fill(fill)
                    .rounding(6.0)
                    .inner_margin(egui::Margin::symmetric(8.0, 4.0))
                    .show(ui, |ui| {
                        ui.horizontal(|ui| {
                            ui.label(egui::RichText::new(chord).strong());
                            if session.is_in_use(chord) {
                                ui.label("🎵").on_hover_text("Chord in use");
                            } else if ui
                                .small_button("×")
                                .on_hover_text("Remove chord")
                                .clicked()
                            {
                                remove_request = Some(index);
                            }
                        });
                    });
            }
        });

        if let Some(index) = remove_request {
            let result = self.practice.remove_chord(index).map(|_| ());
            self.report(result);
        }
    }

    fn draw_display(&mut self, ui: &mut egui::Ui) {
        let session = self.practice.session();

        ui.vertical_centered(|ui| {
            ui.label(egui::RichText::new("Current chord").size(20.0));
            ui.label(
                egui::RichText::new(session.current_chord().unwrap_or("-"))
                    .size(72.0)
                    .strong()
                    .color(egui::Color32::WHITE),
            );
            ui.label(format!("Beat: {}", session.beat()));
        });

        if self.practice.is_active() {
            if let Some(next) = session.next_chord() {
                ui.add_space(15.0);
                ui.vertical_centered(|ui| {
                    ui.label("Next chord");
                    ui.label(
                        egui::RichText::new(next)
                            .size(36.0)
                            .strong()
                            .color(egui::Color32::from_rgb(250, 204, 21)),
                    );
                    ui.label(format!(
                        "Changes in {} beats",
                        self.practice.beats_until_change()
                    ));
                });
            }
        }
    }

    fn draw_transport(&mut self, ui: &mut egui::Ui) {
        let now = Instant::now();

        ui.horizontal(|ui| match self.practice.state() {
            PlaybackState::Idle => {
                if ui.button("▶ Start").clicked() {
                    let result = self.practice.start(now);
                    self.report(result);
                }
            }
            state => {
                if state == PlaybackState::Paused {
                    if ui.button("▶ Resume").clicked() {
                        let result = self.practice.resume(now);
                        self.report(result);
                    }
                } else if ui.button("⏸ Pause").clicked() {
                    let result = self.practice.pause();
                    self.report(result);
                }
                if ui.button("⏹ Stop").clicked() {
                    self.practice.stop();
                }
            }
        });
    }

    fn draw_alert(&mut self, ctx: &egui::Context) {
        let Some(message) = self.alert.clone() else {
            return;
        };

        let mut dismissed = false;
        egui::Window::new("Notice")
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
            .show(ctx, |ui| {
                ui.label(message);
                ui.add_space(8.0);
                if ui.button("OK").clicked() || ui.input(|i| i.key_pressed(egui::Key::Enter)) {
                    dismissed = true;
                }
            });

        if dismissed {
            self.alert = None;
        }
    }

    /// Status bar at the bottom of the window
    fn draw_status_bar(&self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            let output = self
                .audio_engine
                .as_ref()
                .map(|engine| engine.status.get())
                .unwrap_or(OutputStatus::Closed);
            let hover = match &self.audio_engine {
                Some(engine) => format!("Audio output: {:?} ({})", output, engine.format()),
                None => format!("Audio output: {:?}", output),
            };
            let (status_text, status_color) = match output {
                OutputStatus::Running => ("●", egui::Color32::GREEN),
                OutputStatus::Opening => ("●", egui::Color32::YELLOW),
                OutputStatus::Closed => ("○", egui::Color32::GRAY),
                OutputStatus::Failed => ("●", egui::Color32::RED),
            };
            ui.colored_label(status_color, status_text)
                .on_hover_text(hover);

            let recent_notifications = self.get_recent_notifications();
            if recent_notifications.is_empty() {
                ui.label("Ready");
            } else {
                for notification in recent_notifications {
                    let (icon, color) = match notification.level {
                        NotificationLevel::Info => ("ℹ", egui::Color32::from_rgb(100, 150, 255)),
                        NotificationLevel::Warning => ("⚠", egui::Color32::from_rgb(255, 165, 0)),
                        NotificationLevel::Error => ("✖", egui::Color32::RED),
                    };

                    ui.colored_label(color, icon);
                    ui.colored_label(color, &notification.message);
                    ui.add_space(10.0);
                }
            }
        });
    }
}

impl eframe::App for ChordMetronomeApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.update_notifications();
        self.handle_shortcuts(ctx);

        // Play the beats that fell due since the last frame
        let now = Instant::now();
        self.practice.poll(now);
        self.check_storage();

        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            self.draw_status_bar(ui);
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.heading("Chord Metronome");
            ui.separator();

            ui.columns(2, |columns| {
                self.draw_tempo(&mut columns[0]);
                columns[0].add_space(10.0);
                columns[0].separator();
                self.draw_interval(&mut columns[0]);
                columns[0].add_space(10.0);
                columns[0].separator();
                self.draw_chord_list(&mut columns[0]);

                self.draw_display(&mut columns[1]);
                columns[1].add_space(20.0);
                columns[1].separator();
                self.draw_transport(&mut columns[1]);
                columns[1].add_space(10.0);
                columns[1].label("Space: start / pause / resume · Esc: stop");
            });
        });

        self.draw_alert(ctx);

        // Wake up for the next beat, or for notifications to fade
        match self.practice.time_until_next_tick(Instant::now()) {
            Some(wait) => ctx.request_repaint_after(wait),
            None if !self.get_recent_notifications().is_empty() => {
                ctx.request_repaint_after(std::time::Duration::from_millis(500))
            }
            None => {}
        }
    }
}
