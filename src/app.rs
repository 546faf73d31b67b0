use std::path::{Path, PathBuf};

use bigganbondhu_sim::{
    challenge::{Challenge, Verdict},
    editor::EditorConfig,
    model::{MAX_SCALE, MIN_SCALE},
    palette::{self, Language, PALETTE},
    topology::summarize,
    CircuitEditor, CircuitState, ComponentKind, EditorKey, LedColor, Mode, Modifiers,
};
use egui::{Color32, DragValue, Key, Layout, RichText, ScrollArea, Sense, ViewportCommand};

use crate::{
    camera::CircuitCamera,
    circuit_widget::{draw_circuit, VisualizationOptions},
    error::FileError,
    to_metric_prefix,
};

#[derive(serde::Deserialize, serde::Serialize)]
#[serde(default)]
pub struct CircuitApp {
    editor: CircuitEditor,
    camera: CircuitCamera,
    vis_opt: VisualizationOptions,
    language: Language,
    challenge: Option<usize>,
    current_path: Option<PathBuf>,

    #[serde(skip)]
    error: Option<String>,
}

/// On-disk format of a saved circuit.
#[derive(serde::Deserialize, serde::Serialize, Debug, Default)]
struct CircuitFile {
    circuit: CircuitState,
    mode: Mode,
    config: EditorConfig,
}

impl Default for CircuitApp {
    fn default() -> Self {
        let mut editor = CircuitEditor::new();
        let example: CircuitFile = ron::from_str(include_str!("example.bbc")).unwrap_or_default();
        editor.config = example.config;
        editor.load_state(example.circuit, example.mode);

        Self {
            editor,
            camera: CircuitCamera::default(),
            vis_opt: VisualizationOptions::default(),
            language: Language::default(),
            challenge: None,
            current_path: None,
            error: None,
        }
    }
}

impl CircuitApp {
    pub fn new(cc: &eframe::CreationContext<'_>) -> Self {
        let inst: Self = cc
            .storage
            .and_then(|storage| eframe::get_value(storage, eframe::APP_KEY))
            .unwrap_or_default();
        inst.update_title(&cc.egui_ctx);

        inst
    }

    fn t<'a>(&self, bn: &'a str, en: &'a str) -> &'a str {
        self.language.pick(bn, en)
    }

    fn current_file(&self) -> CircuitFile {
        CircuitFile {
            circuit: self.editor.state().clone(),
            mode: self.editor.mode(),
            config: self.editor.config,
        }
    }

    fn load_file(&mut self, file: CircuitFile) {
        self.editor.config = file.config;
        self.editor.load_state(file.circuit, file.mode);
    }

    fn report(&mut self, result: Result<(), FileError>) {
        match result {
            Ok(()) => self.error = None,
            Err(e) => {
                log::error!("{e}");
                self.error = Some(e.to_string());
            }
        }
    }

    fn save_file(&mut self, ctx: &egui::Context) {
        #[cfg(not(target_arch = "wasm32"))]
        {
            let maybe_path = match &self.current_path {
                Some(current) => Some(current.clone()),
                None => rfd::FileDialog::new()
                    .add_filter("BigganBondhu circuit", &["bbc"])
                    .save_file(),
            };

            if let Some(mut path) = maybe_path {
                if path.extension() != Some(std::ffi::OsStr::new("bbc")) {
                    path.set_extension("bbc");
                }

                let result = write_file(&self.current_file(), &path);
                if result.is_ok() {
                    self.current_path = Some(path);
                }
                self.report(result);
            }

            self.update_title(ctx);
        }
    }

    fn open_file(&mut self, ctx: &egui::Context) {
        #[cfg(not(target_arch = "wasm32"))]
        {
            let maybe_path = rfd::FileDialog::new()
                .add_filter("BigganBondhu circuit", &["bbc"])
                .pick_file();

            if let Some(path) = maybe_path {
                let result = read_file(&path).map(|data| {
                    self.load_file(data);
                    self.current_path = Some(path);
                });
                self.report(result);
            }

            self.update_title(ctx);
        }
    }

    fn window_title(&self) -> Option<String> {
        let path = self.current_path.as_ref()?.to_str()?;
        Some(format!("বিজ্ঞানবন্ধু {path}"))
    }

    fn update_title(&self, ctx: &egui::Context) {
        if let Some(title) = self.window_title() {
            ctx.send_viewport_cmd(ViewportCommand::Title(title));
        }
    }

    fn top_panel(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("top_panel").show(ctx, |ui| {
            egui::containers::menu::MenuBar::new().ui(ui, |ui| {
                ui.menu_button(self.t("ফাইল", "File"), |ui| {
                    if ui.button(self.t("নতুন", "New")).clicked() {
                        self.editor.clear();
                        self.current_path = None;
                    }
                    ui.separator();
                    #[cfg(not(target_arch = "wasm32"))]
                    {
                        if ui.button(self.t("খুলুন", "Open")).clicked() {
                            self.open_file(ui.ctx());
                        }
                        if ui.button(self.t("সংরক্ষণ", "Save")).clicked() {
                            self.save_file(ui.ctx());
                        }
                        ui.separator();
                    }

                    if ui.button(self.t("উদাহরণ বর্তনী", "Load example circuit")).clicked() {
                        let example = Self::default();
                        self.editor = example.editor;
                        self.current_path = None;
                    }
                    egui::widgets::global_theme_preference_buttons(ui);
                });

                if ui.button(self.t("দৃশ্য রিসেট", "Reset view")).clicked() {
                    self.camera = CircuitCamera::default();
                }

                let other = match self.language {
                    Language::Bengali => "English",
                    Language::English => "বাংলা",
                };
                if ui.button(other).clicked() {
                    self.language = self.language.toggled();
                }

                ui.with_layout(Layout::right_to_left(egui::Align::Center), |ui| {
                    ui.strong("বিজ্ঞানবন্ধু");
                });
            });
        });
    }

    fn side_panel(&mut self, ctx: &egui::Context) {
        egui::SidePanel::left("cfg").show(ctx, |ui| {
            ScrollArea::vertical().show(ui, |ui| {
                ui.strong(self.t("সংযোগের ধরন", "Mode"));
                ui.horizontal_wrapped(|ui| {
                    for mode in Mode::ALL {
                        let label = match self.language {
                            Language::Bengali => mode.name_bn(),
                            Language::English => mode.name(),
                        };
                        if ui.selectable_label(self.editor.mode() == mode, label).clicked() {
                            self.editor.set_mode(mode);
                        }
                    }
                });

                let snap_label = self.t("গ্রিডে বসাও", "Snap to grid");
                ui.checkbox(&mut self.editor.config.snap_to_grid, snap_label);
                let grid_prefix = self.t("গ্রিড: ", "Grid: ");
                ui.add(
                    DragValue::new(&mut self.editor.config.grid_size)
                        .range(10.0..=200.0)
                        .prefix(grid_prefix),
                );
                if ui.button(self.t("সিমুলেট", "Simulate")).clicked() {
                    self.editor.simulate();
                }

                if let Some(error) = &self.error {
                    ui.label(RichText::new(error).color(Color32::RED));
                }

                ui.separator();
                self.component_editor(ui);

                ui.separator();
                self.readings(ui);

                ui.separator();
                self.challenge_panel(ui);

                ui.separator();
                ui.strong(self.t("প্রদর্শন", "Visualization"));
                ui.add(
                    DragValue::new(&mut self.vis_opt.voltage_scale)
                        .prefix("Voltage scale: ")
                        .speed(1e-2),
                );
                ui.add(
                    DragValue::new(&mut self.vis_opt.current_scale)
                        .prefix("Current scale: ")
                        .speed(1e-2),
                );
                let points_label = self.t("সংযোগ বিন্দু", "Connection points");
                ui.checkbox(&mut self.vis_opt.show_connection_points, points_label);
                if ui.button("Auto scale").clicked() {
                    let connections = &self.editor.state().connections;
                    let defaults = VisualizationOptions::default();
                    self.vis_opt.voltage_scale = max_abs(connections.iter().map(|conn| conn.voltage))
                        .unwrap_or(defaults.voltage_scale);
                    self.vis_opt.current_scale = max_abs(connections.iter().map(|conn| conn.current))
                        .unwrap_or(defaults.current_scale);
                }
            });
        });
    }

    fn component_editor(&mut self, ui: &mut egui::Ui) {
        let Some(component) = self.editor.selected_component().cloned() else {
            ui.weak(self.t(
                "সম্পাদনা করতে একটি উপাদানে ক্লিক করো",
                "Click on a component to edit",
            ));
            return;
        };
        let id = component.id.clone();

        ui.strong(palette::entry(component.ty()).label(self.language));
        ui.weak(id.to_string());

        if let (Some(mut value), Some(unit)) = (component.kind.value(), component.kind.unit()) {
            let resp = ui.add(
                DragValue::new(&mut value)
                    .speed(1e-2)
                    .range(0.0..=f64::MAX)
                    .suffix(format!(" {unit}")),
            );
            if resp.changed() {
                self.editor.set_component_value(&id, value);
            }
        }

        match component.kind {
            ComponentKind::Switch { on } => {
                let label = if on {
                    self.t("চালু (বন্ধ করো)", "On (turn off)")
                } else {
                    self.t("বন্ধ (চালু করো)", "Off (turn on)")
                };
                if ui.button(label).clicked() {
                    self.editor.toggle_switch(&id);
                }
            }
            ComponentKind::Led { color } => {
                egui::ComboBox::from_label(self.t("রং", "Color"))
                    .selected_text(color.name())
                    .show_ui(ui, |ui| {
                        for choice in LedColor::ALL {
                            if ui.selectable_label(choice == color, choice.name()).clicked() {
                                self.editor.set_led_color(&id, choice);
                            }
                        }
                    });
            }
            _ => {}
        }

        let mut scale = component.scale;
        if ui
            .add(egui::Slider::new(&mut scale, MIN_SCALE..=MAX_SCALE).text(self.t("আকার", "Scale")))
            .changed()
        {
            self.editor.set_component_scale(&id, scale);
        }

        ui.horizontal(|ui| {
            if ui.button(self.t("ঘোরাও (R)", "Rotate (R)")).clicked() {
                self.editor.rotate_component(&id);
            }
            if ui.button(self.t("মুছে ফেলো", "Delete")).clicked() {
                self.editor.remove_component(&id);
            }
        });
    }

    fn readings(&self, ui: &mut egui::Ui) {
        let state = self.editor.state();
        let summary = summarize(&state.components, self.editor.mode());

        ui.strong(self.t("পরিমাপ", "Readings"));
        ui.label(format!(
            "{}: {}",
            self.t("ভোল্টেজ", "Voltage"),
            to_metric_prefix(state.total_voltage, 'V')
        ));
        ui.label(format!(
            "{}: {}",
            self.t("রোধ", "Resistance"),
            to_metric_prefix(state.total_resistance, 'Ω')
        ));
        ui.label(format!(
            "{}: {}",
            self.t("তড়িৎপ্রবাহ", "Current"),
            to_metric_prefix(state.flowing_current(), 'A')
        ));
        ui.weak(format!(
            "{}: {}",
            self.t("ধারকত্ব", "Capacitance"),
            to_metric_prefix(summary.capacitance, 'F')
        ));
        ui.weak(format!(
            "{}: {}",
            self.t("আবেশাঙ্ক", "Inductance"),
            to_metric_prefix(summary.inductance, 'H')
        ));

        if summary.complete {
            ui.label(RichText::new(self.t("বর্তনী সম্পূর্ণ", "Circuit complete")).color(Color32::GREEN));
        } else {
            ui.label(RichText::new(self.t("বর্তনী খোলা", "Circuit open")).color(Color32::YELLOW));
        }

        if !state.connections.is_empty() {
            ui.collapsing(self.t("সংযোগসমূহ", "Connections"), |ui| {
                for conn in &state.connections {
                    ui.monospace(format!(
                        "{} → {}  {}  {}",
                        conn.from,
                        conn.to,
                        to_metric_prefix(conn.voltage, 'V'),
                        to_metric_prefix(conn.current, 'A')
                    ));
                }
            });
        }
    }

    fn challenge_panel(&mut self, ui: &mut egui::Ui) {
        let presets = Challenge::presets();
        let title = |c: &Challenge| self.language.pick(&c.title_bn, &c.title_en).to_string();

        ui.strong(self.t("চ্যালেঞ্জ", "Challenge"));
        let selected_text = self
            .challenge
            .and_then(|idx| presets.get(idx))
            .map(title)
            .unwrap_or_else(|| self.t("কোনোটি নয়", "None").to_string());

        let mut choice = self.challenge;
        egui::ComboBox::from_id_salt("challenge")
            .selected_text(selected_text)
            .show_ui(ui, |ui| {
                ui.selectable_value(&mut choice, None, self.t("কোনোটি নয়", "None"));
                for (idx, challenge) in presets.iter().enumerate() {
                    ui.selectable_value(&mut choice, Some(idx), title(challenge));
                }
            });
        self.challenge = choice;

        if let Some(challenge) = self.challenge.and_then(|idx| presets.get(idx)) {
            let verdict = challenge.evaluate(self.editor.state(), self.editor.mode());
            let color = match verdict {
                Verdict::Pass => Color32::GREEN,
                Verdict::Fail => Color32::RED,
                Verdict::Warning => Color32::YELLOW,
            };
            let message = self.t(verdict.message_bn(), verdict.message_en());
            ui.label(RichText::new(message).color(color));
        }
    }

    fn palette_panel(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::bottom("buttons").show(ctx, |ui| {
            ScrollArea::horizontal().show(ui, |ui| {
                ui.horizontal(|ui| {
                    ui.label(self.t("উপাদান যোগ করো: ", "Add component: "));
                    for entry in PALETTE {
                        let text = format!("{} {}", entry.icon, entry.label(self.language));
                        if ui.button(text).clicked() {
                            self.editor.begin_placement(entry.ty);
                        }
                    }
                    ui.separator();
                    ui.weak(self.t(
                        "Shift+ক্লিক: সংযোগ · R: ঘোরাও · Delete: মুছুন · Esc: বাতিল",
                        "Shift+click: connect · R: rotate · Delete: remove · Esc: cancel",
                    ));
                });
            });
        });
    }

    fn canvas(&mut self, ctx: &egui::Context) {
        egui::CentralPanel::default().show(ctx, |ui| {
            egui::Frame::canvas(ui.style()).show(ui, |ui| {
                let (resp, painter) = ui.allocate_painter(ui.available_size(), Sense::click_and_drag());
                let view = self.camera.drive(&resp);
                self.editor.config.viewport = Some(view.visible_world());

                let (pressed, released, latest, modifiers) = ui.input(|i| {
                    (
                        i.pointer.primary_pressed(),
                        i.pointer.primary_released(),
                        i.pointer.latest_pos(),
                        i.modifiers,
                    )
                });

                if let Some(pos) = latest {
                    let world = view.to_world(pos);
                    if resp.rect.contains(pos) || resp.dragged() {
                        self.editor.pointer_move(world);
                    }
                    if pressed && resp.hovered() {
                        self.editor.pointer_down(
                            world,
                            Modifiers {
                                connect: modifiers.shift,
                            },
                        );
                    }
                    // Released outside the canvas still ends a drag
                    if released {
                        self.editor.pointer_up(world);
                    }
                }

                let typing = ui.memory(|m| m.focused().is_some());
                if !typing {
                    let keys = ui.input(|i| {
                        (
                            i.key_pressed(Key::Delete) || i.key_pressed(Key::Backspace),
                            i.key_pressed(Key::R),
                            i.key_pressed(Key::Escape),
                        )
                    });
                    if keys.0 {
                        self.editor.key(EditorKey::Delete);
                    }
                    if keys.1 {
                        self.editor.key(EditorKey::Rotate);
                    }
                    if keys.2 {
                        self.editor.key(EditorKey::Escape);
                    }
                }

                draw_circuit(&painter, &view, &self.editor, &self.vis_opt);
            });
        });
    }
}

impl eframe::App for CircuitApp {
    fn save(&mut self, storage: &mut dyn eframe::Storage) {
        eframe::set_value(storage, eframe::APP_KEY, self);
    }

    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Current-flow animation
        ctx.request_repaint();

        self.top_panel(ctx);
        self.side_panel(ctx);
        self.palette_panel(ctx);
        self.canvas(ctx);
    }
}

fn max_abs(values: impl Iterator<Item = f64>) -> Option<f64> {
    values
        .map(f64::abs)
        .max_by(|a, b| a.total_cmp(b))
        .filter(|v| *v > 0.0)
}

fn read_file(path: &Path) -> Result<CircuitFile, FileError> {
    let text = std::fs::read_to_string(path).map_err(|e| FileError::io(path, e))?;
    let file = ron::from_str(&text).map_err(|source| FileError::Deserialize {
        path: path.display().to_string(),
        source,
    })?;
    log::info!("Loaded circuit from {}", path.display());
    Ok(file)
}

fn write_file(file: &CircuitFile, path: &Path) -> Result<(), FileError> {
    let text = ron::ser::to_string_pretty(file, ron::ser::PrettyConfig::default())?;
    std::fs::write(path, text).map_err(|e| FileError::io(path, e))?;
    log::info!("Saved circuit to {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bundled_example_loads() {
        let file: CircuitFile = ron::from_str(include_str!("example.bbc")).unwrap();
        assert_eq!(file.mode, Mode::Series);
        assert_eq!(file.circuit.components.len(), 4);
        assert_eq!(file.circuit.connections.len(), 4);

        let mut editor = CircuitEditor::new();
        editor.load_state(file.circuit, file.mode);
        // The switch ships open
        assert_eq!(editor.state().flowing_current(), 0.0);
        assert_eq!(editor.state().total_voltage, 6.0);
    }

    #[test]
    fn circuit_file_round_trip() {
        let app = CircuitApp::default();
        let text = ron::ser::to_string_pretty(&app.current_file(), ron::ser::PrettyConfig::default())
            .unwrap();
        let back: CircuitFile = ron::from_str(&text).unwrap();
        assert_eq!(&back.circuit, app.editor.state());
        assert_eq!(back.config, app.editor.config);
    }

    #[test]
    fn restored_app_keeps_file_title() {
        let mut app = CircuitApp::default();
        assert_eq!(app.window_title(), None);

        app.current_path = Some(PathBuf::from("lab/series.bbc"));
        let stored = ron::to_string(&app).unwrap();
        let restored: CircuitApp = ron::from_str(&stored).unwrap();
        assert_eq!(
            restored.window_title().as_deref(),
            Some("বিজ্ঞানবন্ধু lab/series.bbc")
        );
    }
}
