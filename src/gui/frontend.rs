use std::time::{Duration, Instant};

use eframe::egui::{self, Color32, Pos2, Rect, Sense, Stroke, Vec2};
use log::warn;

use crate::catalog::entry::Catalog;
use crate::catalog::registry::NodeTypeRegistry;
use crate::graph_utils::graph::{GraphDocument, GridPos, NodeHandle};
use crate::menu::session::{PaletteSession, Selection};
use crate::persistence::persist::{self, AppStateFile};
use crate::persistence::settings::AppSettings;

// Style for toast notifications
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[allow(dead_code)]
enum NoticeStyle {
    Subtle,
    Prominent,
}

// Node box sizing in grid units (scaled by zoom when drawn)
const NODE_WIDTH: f32 = 130.0;
const NODE_HEADER: f32 = 24.0;
const PORT_SPACING: f32 = 14.0;

pub struct WeaveApp {
    doc: GraphDocument,
    registry: NodeTypeRegistry,
    // Create-node palette: session state plus the screen anchor of the
    // open popup (None = closed)
    palette: PaletteSession,
    palette_pos: Option<Pos2>,
    palette_wants_focus: bool,
    palette_error: Option<String>,
    // Canvas interaction
    selected: Option<NodeHandle>,
    dragging: Option<NodeHandle>,
    pan: Vec2,
    zoom: f32,
    last_canvas_rect: Option<Rect>,
    // persistence
    dirty: bool,
    last_change: Instant,
    last_save: Instant,
    save_error: Option<String>,
    last_save_info: Option<String>,
    // Timestamp for transient info banner (e.g., "Saved" toast)
    last_info_time: Option<Instant>,
    last_info_style: NoticeStyle,
    show_load_versions: bool,
    // App settings
    app_settings: AppSettings,
}

impl WeaveApp {
    pub fn new(doc: GraphDocument) -> Self {
        let settings = persist::effective_settings();
        let registry = NodeTypeRegistry::builtin();
        let catalog = Catalog::from_registry(&registry);
        Self {
            doc,
            registry,
            palette: PaletteSession::new(catalog),
            palette_pos: None,
            palette_wants_focus: false,
            palette_error: None,
            selected: None,
            dragging: None,
            pan: Vec2::ZERO,
            zoom: 1.0,
            last_canvas_rect: None,
            dirty: false,
            last_change: Instant::now(),
            last_save: Instant::now(),
            save_error: None,
            last_save_info: None,
            last_info_time: None,
            last_info_style: NoticeStyle::Prominent,
            show_load_versions: false,
            app_settings: settings,
        }
    }

    pub fn from_state(state: AppStateFile) -> Self {
        let (doc, pan, zoom) = state.to_runtime();
        let mut s = Self::new(doc);
        s.pan = pan;
        s.zoom = zoom;
        s
    }

    fn mark_dirty(&mut self) {
        self.dirty = true;
        self.last_change = Instant::now();
    }

    fn save_now_with(&mut self, style: NoticeStyle) {
        let state = AppStateFile::from_runtime(&self.doc, self.pan, self.zoom);
        match persist::save_active(&state) {
            Ok(path) => {
                self.dirty = false;
                self.last_save = Instant::now();
                self.save_error = None;
                self.last_save_info = Some(format!("Saved to {}", path.display()));
                self.last_info_time = Some(Instant::now());
                self.last_info_style = style;
            }
            Err(e) => {
                self.save_error = Some(format!("Save failed: {}", e));
            }
        }
    }

    fn save_now(&mut self) {
        self.save_now_with(NoticeStyle::Prominent);
    }

    fn save_versioned_now(&mut self) {
        let state = AppStateFile::from_runtime(&self.doc, self.pan, self.zoom);
        match persist::save_versioned(&state) {
            Ok(path) => {
                self.last_save = Instant::now();
                self.save_error = None;
                self.last_save_info = Some(format!("Saved version {}", path.display()));
                self.last_info_time = Some(Instant::now());
                self.last_info_style = NoticeStyle::Prominent;
            }
            Err(e) => self.save_error = Some(format!("Save version failed: {}", e)),
        }
    }

    pub fn menu_save(&mut self) {
        self.save_now();
    }

    pub fn menu_save_version(&mut self) {
        self.save_versioned_now();
    }

    pub fn menu_load_latest(&mut self) {
        match persist::load_active() {
            Ok(Some(state)) => {
                let (doc, pan, zoom) = state.to_runtime();
                self.doc = doc;
                self.pan = pan;
                self.zoom = zoom;
                self.selected = None;
                self.dragging = None;
                self.dirty = false;
                self.last_change = Instant::now();
                self.last_save_info = Some("Loaded latest state".into());
                self.last_info_time = Some(Instant::now());
                self.last_info_style = NoticeStyle::Prominent;
                self.save_error = None;
            }
            Ok(None) => {
                self.save_error = Some("No active state file found".into());
            }
            Err(e) => {
                self.save_error = Some(format!("Load failed: {}", e));
            }
        }
    }

    pub fn menu_new_graph(&mut self) {
        // Back up the existing graph if it's non-empty
        let had_content = !self.doc.nodes.is_empty();
        if had_content {
            self.save_versioned_now();
        }
        self.doc = GraphDocument::new();
        self.selected = None;
        self.dragging = None;
        self.palette_pos = None;
        self.pan = Vec2::ZERO;
        self.zoom = 1.0;
        self.dirty = true;
        self.last_change = Instant::now();
        self.save_error = None;
        self.last_info_time = Some(Instant::now());
        self.last_info_style = NoticeStyle::Prominent;
        self.last_save_info = Some(
            if had_content { "Created new empty graph (backup saved)" } else { "Created new empty graph" }
                .to_string(),
        );
    }

    pub fn menu_reset_view(&mut self) {
        self.pan = Vec2::ZERO;
        self.zoom = 1.0;
        self.mark_dirty();
    }

    fn open_palette_at(&mut self, pos: Pos2) {
        self.palette.reset();
        self.palette_pos = Some(pos);
        self.palette_wants_focus = true;
        self.palette_error = None;
    }

    fn close_palette(&mut self) {
        self.palette_pos = None;
    }

    /// Rect of a node in grid space; height grows with its port count.
    fn node_grid_rect(node: &crate::graph_utils::graph::GraphNode) -> Rect {
        let rows = node.inputs.len().max(node.outputs.len()) as f32;
        let size = Vec2::new(NODE_WIDTH, NODE_HEADER + rows * PORT_SPACING + 6.0);
        Rect::from_min_size(Pos2::new(node.position.x, node.position.y), size)
    }

    fn input_port_grid_pos(node: &crate::graph_utils::graph::GraphNode, port: &str) -> Option<Pos2> {
        let idx = node.inputs.iter().position(|p| p == port)?;
        let rect = Self::node_grid_rect(node);
        Some(Pos2::new(rect.left(), rect.top() + NODE_HEADER + (idx as f32 + 0.5) * PORT_SPACING))
    }

    fn output_port_grid_pos(node: &crate::graph_utils::graph::GraphNode, port: &str) -> Option<Pos2> {
        let idx = node.outputs.iter().position(|p| p == port)?;
        let rect = Self::node_grid_rect(node);
        Some(Pos2::new(rect.right(), rect.top() + NODE_HEADER + (idx as f32 + 0.5) * PORT_SPACING))
    }

    /// Instantiate a catalog pick at the grid position under the popup anchor.
    fn create_picked_node(&mut self, type_id: &crate::catalog::registry::NodeTypeId, grid_pos: GridPos) {
        match self.registry.get(type_id) {
            Some(ty) => {
                let handle = self.doc.create_node(ty, grid_pos);
                self.selected = Some(handle);
                self.mark_dirty();
            }
            None => {
                // Catalog and registry disagree; surfaces as a banner, not a panic
                warn!("palette picked unknown node type {type_id}");
                self.save_error = Some(format!("Unknown node type: {}", type_id));
            }
        }
        self.close_palette();
    }
}

impl eframe::App for WeaveApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            // Check for keyboard shortcuts
            if ctx.input_mut(|i| i.consume_shortcut(&egui::KeyboardShortcut::new(egui::Modifiers::COMMAND, egui::Key::S))) {
                self.menu_save();
            }
            if ctx.input_mut(|i| i.consume_shortcut(&egui::KeyboardShortcut::new(egui::Modifiers::COMMAND | egui::Modifiers::SHIFT, egui::Key::S))) {
                self.menu_save_version();
            }
            if ctx.input_mut(|i| i.consume_shortcut(&egui::KeyboardShortcut::new(egui::Modifiers::COMMAND, egui::Key::N))) {
                self.menu_new_graph();
            }
            if ctx.input_mut(|i| i.consume_shortcut(&egui::KeyboardShortcut::new(egui::Modifiers::COMMAND, egui::Key::O))) {
                self.menu_load_latest();
            }

            ui.horizontal(|ui| {
                ui.label("Node-Weave");

                ui.menu_button("File", |ui| {
                    if ui.add(egui::Button::new("Save").shortcut_text(ctx.format_shortcut(&egui::KeyboardShortcut::new(egui::Modifiers::COMMAND, egui::Key::S)))).clicked() {
                        self.menu_save();
                        ui.close();
                    }
                    if ui.add(egui::Button::new("Save Version").shortcut_text(ctx.format_shortcut(&egui::KeyboardShortcut::new(egui::Modifiers::COMMAND | egui::Modifiers::SHIFT, egui::Key::S)))).clicked() {
                        self.menu_save_version();
                        ui.close();
                    }
                    if ui.add(egui::Button::new("Load Latest").shortcut_text(ctx.format_shortcut(&egui::KeyboardShortcut::new(egui::Modifiers::COMMAND, egui::Key::O)))).clicked() {
                        self.menu_load_latest();
                        ui.close();
                    }
                    if ui.button("Load Version…").clicked() {
                        self.show_load_versions = true;
                        ui.close();
                    }
                    ui.separator();
                    if ui.add(egui::Button::new("New Graph").shortcut_text(ctx.format_shortcut(&egui::KeyboardShortcut::new(egui::Modifiers::COMMAND, egui::Key::N)))).clicked() {
                        self.menu_new_graph();
                        ui.close();
                    }
                    ui.separator();
                    if ui.add(egui::Button::new("Quit").shortcut_text(ctx.format_shortcut(&egui::KeyboardShortcut::new(egui::Modifiers::COMMAND, egui::Key::Q)))).clicked() {
                        ctx.send_viewport_cmd(egui::ViewportCommand::Close);
                        ui.close();
                    }
                });

                ui.menu_button("View", |ui| {
                    if ui.button("Reset View").clicked() {
                        self.menu_reset_view();
                        ui.close();
                    }
                    ui.separator();
                    ui.label("Zoom");
                    ui.add(egui::Slider::new(&mut self.zoom, 0.25..=2.0).clamping(egui::SliderClamping::Always));
                });

                // Tiny status label; avoid long texts on small widths
                ui.small(format!("N:{} C:{}", self.doc.node_count(), self.doc.connection_count()));
                if let Some(err) = &self.save_error {
                    ui.separator();
                    ui.colored_label(Color32::RED, err);
                }
            });
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            // Detect canvas size/position changes and adjust pan to keep view stable
            let prev_rect = self.last_canvas_rect;
            let available = ui.available_rect_before_wrap();
            if let Some(prev) = prev_rect
                && prev != available
            {
                let dc = available.center() - prev.center();
                self.pan += dc * (self.zoom - 1.0);
            }
            self.last_canvas_rect = Some(available);

            // Background gets clicks/drags the nodes don't claim
            let bg_resp = ui.allocate_rect(available, Sense::click_and_drag());

            // Helpers to transform between grid and screen space
            let center = available.center();
            let zoom = self.zoom;
            let pan = self.pan;
            let to_screen = move |p: Pos2| -> Pos2 {
                Pos2::new(
                    (p.x - center.x) * zoom + center.x + pan.x,
                    (p.y - center.y) * zoom + center.y + pan.y,
                )
            };
            let from_screen = move |p: Pos2| -> Pos2 {
                Pos2::new(
                    ((p.x - pan.x) - center.x) / zoom + center.x,
                    ((p.y - pan.y) - center.y) / zoom + center.y,
                )
            };

            // Zoom with scroll only when pointer is over the canvas area
            if bg_resp.hovered() {
                let scroll = ui.input(|i| i.raw_scroll_delta.y);
                if scroll != 0.0 {
                    let factor = (1.0 + scroll * 0.001).clamp(0.9, 1.1);
                    self.zoom = (self.zoom * factor).clamp(0.25, 2.0);
                    ui.ctx().request_repaint_after(Duration::from_millis(16));
                }
            }

            let painter = ui.painter_at(available);

            // Connections first, under the node boxes
            let conn_stroke = Stroke { width: 1.5 * self.zoom, color: Color32::from_gray(180) };
            for conn in self.doc.connections.values() {
                let (Some(from), Some(to)) = (
                    self.doc.nodes.get(&conn.from_node),
                    self.doc.nodes.get(&conn.to_node),
                ) else {
                    continue;
                };
                let (Some(a), Some(b)) = (
                    Self::output_port_grid_pos(from, &conn.from_port),
                    Self::input_port_grid_pos(to, &conn.to_port),
                ) else {
                    continue;
                };
                let a = to_screen(a);
                let b = to_screen(b);
                // simple horizontal-tangent elbow through two midpoints
                let dx = ((b.x - a.x).abs() * 0.5).max(12.0 * self.zoom);
                let m1 = Pos2::new(a.x + dx, a.y);
                let m2 = Pos2::new(b.x - dx, b.y);
                painter.line_segment([a, m1], conn_stroke);
                painter.line_segment([m1, m2], conn_stroke);
                painter.line_segment([m2, b], conn_stroke);
            }

            // Nodes: draw and interact. Collect moves first to avoid borrowing
            // the document while iterating it.
            let mut moved: Option<(NodeHandle, GridPos)> = None;
            let mut clicked: Option<NodeHandle> = None;
            let handles: Vec<NodeHandle> = self.doc.nodes.keys().copied().collect();
            for handle in handles {
                let node = &self.doc.nodes[&handle];
                let grid_rect = Self::node_grid_rect(node);
                let screen_rect = Rect::from_min_max(
                    to_screen(grid_rect.min),
                    to_screen(grid_rect.max),
                );
                let resp = ui.interact(
                    screen_rect,
                    egui::Id::new(("weave_node", handle)),
                    Sense::click_and_drag(),
                );
                if resp.drag_started() {
                    self.dragging = Some(handle);
                }
                if resp.dragged() && self.dragging == Some(handle) {
                    let delta = resp.drag_delta() / self.zoom;
                    moved = Some((
                        handle,
                        GridPos::new(node.position.x + delta.x, node.position.y + delta.y),
                    ));
                }
                if resp.drag_stopped() {
                    self.dragging = None;
                }
                if resp.clicked() {
                    clicked = Some(handle);
                }

                let is_selected = self.selected == Some(handle);
                let fill = if is_selected {
                    Color32::from_rgb(60, 70, 95)
                } else {
                    Color32::from_rgb(45, 48, 58)
                };
                let outline = if is_selected {
                    Stroke { width: 2.0, color: Color32::from_rgb(255, 200, 80) }
                } else {
                    Stroke { width: 1.0, color: Color32::from_gray(90) }
                };
                painter.rect(
                    screen_rect,
                    egui::CornerRadius::same(4),
                    fill,
                    outline,
                    egui::StrokeKind::Inside,
                );
                // Title, hidden at low zoom per settings
                if self.zoom >= self.app_settings.label_min_zoom {
                    painter.text(
                        Pos2::new(screen_rect.center().x, screen_rect.top() + NODE_HEADER * 0.5 * self.zoom),
                        egui::Align2::CENTER_CENTER,
                        &node.title,
                        egui::FontId::proportional((13.0 * self.zoom).clamp(8.0, 18.0)),
                        Color32::from_gray(230),
                    );
                }
                // Port dots
                let port_r = (3.0 * self.zoom).clamp(1.5, 5.0);
                for port in &node.inputs {
                    if let Some(p) = Self::input_port_grid_pos(node, port) {
                        painter.circle_filled(to_screen(p), port_r, Color32::from_rgb(120, 200, 160));
                    }
                }
                for port in &node.outputs {
                    if let Some(p) = Self::output_port_grid_pos(node, port) {
                        painter.circle_filled(to_screen(p), port_r, Color32::from_rgb(200, 160, 120));
                    }
                }
            }
            if let Some((handle, pos)) = moved {
                self.doc.set_node_position(handle, pos);
                self.mark_dirty();
            }
            if let Some(handle) = clicked {
                self.selected = Some(handle);
            }

            // Background: pan on drag, deselect on click, palette on right-click
            if bg_resp.dragged() && self.dragging.is_none() {
                self.pan += bg_resp.drag_delta();
            }
            if bg_resp.clicked() {
                self.selected = None;
            }
            if bg_resp.secondary_clicked()
                && let Some(pos) = bg_resp.interact_pointer_pos()
            {
                self.open_palette_at(pos);
            }

            // Delete removes the selected node and its connections
            if let Some(sel) = self.selected
                && self.palette_pos.is_none()
                && ui.input(|i| i.key_pressed(egui::Key::Delete) || i.key_pressed(egui::Key::Backspace))
            {
                if self.doc.remove_node(sel) {
                    self.mark_dirty();
                }
                self.selected = None;
            }

            // Create-node palette popup
            if let Some(anchor) = self.palette_pos {
                if ui.input(|i| i.key_pressed(egui::Key::Escape)) {
                    self.close_palette();
                } else {
                    self.show_palette(ctx, anchor, from_screen(anchor));
                }
            }
        });

        // Autosave logic: only after edits (5 seconds after the last change)
        let now = Instant::now();
        if self.dirty && now.duration_since(self.last_change) >= Duration::from_secs(5) {
            self.save_now_with(NoticeStyle::Subtle);
        }

        // Load Versions modal
        if self.show_load_versions {
            let mut open = true;
            let mut to_load: Option<std::path::PathBuf> = None;
            let mut loaded_label: Option<String> = None;
            egui::Window::new("Load Version")
                .collapsible(false)
                .resizable(true)
                .open(&mut open)
                .show(ctx, |ui| {
                    match persist::list_versions() {
                        Ok(list) => {
                            if list.is_empty() {
                                ui.label("No versioned state files found");
                            }
                            for p in list.iter() {
                                let label = p.file_name().and_then(|s| s.to_str()).unwrap_or("<unknown>");
                                if ui.button(label).clicked() {
                                    to_load = Some(p.clone());
                                    loaded_label = Some(label.to_string());
                                }
                            }
                        }
                        Err(e) => {
                            ui.colored_label(Color32::RED, format!("List failed: {}", e));
                        }
                    }
                });
            if let Some(p) = to_load {
                match persist::load_from_path(&p) {
                    Ok(state) => {
                        let (doc, pan, zoom) = state.to_runtime();
                        self.doc = doc;
                        self.pan = pan;
                        self.zoom = zoom;
                        self.selected = None;
                        self.dirty = false;
                        self.last_change = Instant::now();
                        if let Some(lbl) = loaded_label {
                            self.last_save_info = Some(format!("Loaded {}", lbl));
                            self.last_info_time = Some(Instant::now());
                            self.last_info_style = NoticeStyle::Prominent;
                        }
                        self.save_error = None;
                        open = false;
                    }
                    Err(e) => {
                        self.save_error = Some(format!("Failed to load {}: {}", p.display(), e));
                    }
                }
            }
            self.show_load_versions = open;
        }

        // Bottom-right transient "saved"/info toast (visible for 3 seconds)
        if let (Some(msg), Some(when)) = (&self.last_save_info, self.last_info_time)
            && Instant::now().duration_since(when) <= Duration::from_secs(3)
        {
            let margin = egui::vec2(12.0, 12.0);
            egui::Area::new("bottom_right_toast".into())
                .anchor(egui::Align2::RIGHT_BOTTOM, egui::vec2(-margin.x, -margin.y))
                .interactable(false)
                .show(ctx, |ui| {
                    let (fill, stroke_col, stroke_w, text_col) = match self.last_info_style {
                        NoticeStyle::Subtle => (
                            Color32::from_rgba_premultiplied(20, 20, 20, 170),
                            Color32::from_gray(60),
                            0.5,
                            Color32::from_gray(200),
                        ),
                        NoticeStyle::Prominent => (
                            Color32::from_rgba_premultiplied(30, 30, 30, 230),
                            Color32::from_gray(100),
                            1.5,
                            Color32::LIGHT_GREEN,
                        ),
                    };
                    egui::Frame::popup(ui.style())
                        .corner_radius(egui::CornerRadius::same(8))
                        .stroke(Stroke { width: stroke_w, color: stroke_col })
                        .fill(fill)
                        .show(ui, |ui| match self.last_info_style {
                            NoticeStyle::Subtle => {
                                ui.small(egui::RichText::new(msg).color(text_col));
                            }
                            NoticeStyle::Prominent => {
                                ui.colored_label(text_col, msg);
                            }
                        });
                });
        }
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        if self.dirty {
            self.save_now_with(NoticeStyle::Subtle);
        }
    }
}

impl WeaveApp {
    /// The create-node popup: a search field on top, then either search
    /// matches or the current menu folder with back navigation.
    fn show_palette(&mut self, ctx: &egui::Context, anchor: Pos2, grid_anchor: Pos2) {
        let mut picked: Option<crate::catalog::registry::NodeTypeId> = None;
        let mut go_back = false;
        let mut close = false;

        let win_resp = egui::Window::new("Add Node")
            .fixed_pos(anchor)
            .collapsible(false)
            .resizable(false)
            .title_bar(false)
            .default_width(self.app_settings.palette_width)
            .show(ctx, |ui| {
                ui.set_min_width(self.app_settings.palette_width);

                let search = ui.add(
                    egui::TextEdit::singleline(self.palette.query_mut())
                        .hint_text("Search nodes…")
                        .desired_width(f32::INFINITY),
                );
                if self.palette_wants_focus {
                    search.request_focus();
                    self.palette_wants_focus = false;
                }
                ui.separator();

                if !self.palette.is_searching() && !self.palette.at_root() {
                    ui.horizontal(|ui| {
                        if ui.button("< Back").clicked() {
                            go_back = true;
                        }
                        ui.weak(self.palette.current_path());
                    });
                    ui.add_space(4.0);
                }

                let items = match self.palette.items() {
                    Ok(items) => items,
                    Err(e) => {
                        // Conflicting catalog paths surface here rather than on startup
                        self.palette_error = Some(e.to_string());
                        Vec::new()
                    }
                };
                if let Some(err) = &self.palette_error {
                    ui.colored_label(Color32::RED, err);
                }

                egui::ScrollArea::vertical()
                    .max_height(self.app_settings.palette_height)
                    .show(ui, |ui| {
                        if items.is_empty() && self.palette.is_searching() {
                            ui.weak("No matching nodes");
                        }
                        for item in &items {
                            let label = if item.is_folder() {
                                format!("{}  >", item.label())
                            } else {
                                item.label().to_string()
                            };
                            let resp = ui.add(
                                egui::Button::new(label)
                                    .min_size(egui::vec2(ui.available_width(), 24.0)),
                            );
                            if resp.clicked() {
                                match self.palette.select(item) {
                                    Selection::Descend => {}
                                    Selection::Create(type_id) => {
                                        picked = Some(type_id);
                                    }
                                }
                            }
                        }
                    });
            });

        // a press anywhere outside the popup closes it
        if let Some(win) = &win_resp {
            let popup_rect = win.response.rect;
            let pressed_outside = ctx.input(|i| {
                i.pointer.any_pressed()
                    && i.pointer
                        .interact_pos()
                        .is_some_and(|p| !popup_rect.contains(p))
            });
            if pressed_outside {
                close = true;
            }
        }

        if go_back {
            self.palette.back();
        }
        if let Some(type_id) = picked {
            self.create_picked_node(&type_id, GridPos::new(grid_anchor.x, grid_anchor.y));
        } else if close {
            self.close_palette();
        }
    }
}
