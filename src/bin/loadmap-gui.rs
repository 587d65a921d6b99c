/*!
 * Desktop dashboard for loadmap-rs
 *
 * A cross-platform window providing:
 * - A choropleth map of regional electricity-load metrics with hover, pan and zoom
 * - Region popups with an "Analyze Region" action
 * - A side panel charting the per-minute load profile of the selected region
 * - Place search, base-map switching and map/series export
 *
 * Platform support: Windows, macOS, Linux
 */

use eframe::egui;
use egui_plot::{Line, Plot, PlotPoints};
use loadmap_rs::api::{Client, FetchError, Geocoder, LayerSource, SeriesSource};
use loadmap_rs::dashboard::LOCATION_NOT_FOUND;
use loadmap_rs::interaction::ANALYZE_LABEL;
use loadmap_rs::map::{ATTRIBUTION, BaseMap};
use loadmap_rs::panel::{PanelState, PendingRequest, RequestToken, minute_label};
use loadmap_rs::viz::chart::{X_AXIS_TITLE, Y_AXIS_TITLE};
use loadmap_rs::{Dashboard, DashboardConfig, FeatureCollection, GeoPoint, SearchOutcome};
use loadmap_rs::{storage, viz};
use std::path::PathBuf;
use std::sync::mpsc;
use std::thread;

fn main() -> Result<(), eframe::Error> {
    env_logger::init();

    let config = DashboardConfig::load(None).unwrap_or_else(|e| {
        log::error!("ignoring config: {e:#}");
        DashboardConfig::default()
    });

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1400.0, 850.0])
            .with_min_inner_size([900.0, 500.0])
            .with_title("Load Map - loadmap-rs"),
        ..Default::default()
    };

    eframe::run_native(
        "Load Map",
        options,
        Box::new(|_cc| Ok(Box::new(LoadMapApp::new(config)))),
    )
}

/// Results delivered by worker threads.
enum WorkResult {
    Layers(Result<FeatureCollection, FetchError>),
    Series {
        token: RequestToken,
        result: Result<Vec<f64>, FetchError>,
    },
    Search(SearchOutcome),
}

/// Main application state
struct LoadMapApp {
    config: DashboardConfig,
    dashboard: Dashboard,
    client: Option<Client>,

    // Sidebar input
    search_query: String,

    // Map texture, re-rasterized only when something visible changed
    map_texture: Option<egui::TextureHandle>,
    map_size: [usize; 2],
    map_dirty: bool,

    // UI state
    loading_layers: bool,
    searching: bool,
    status_message: String,
    error_message: String,

    // Background operations
    sender: mpsc::Sender<WorkResult>,
    receiver: mpsc::Receiver<WorkResult>,
}

impl LoadMapApp {
    fn new(config: DashboardConfig) -> Self {
        let (sender, receiver) = mpsc::channel();
        let client = match config.client() {
            Ok(c) => Some(c),
            Err(e) => {
                log::error!("cannot build HTTP client: {e}");
                None
            }
        };
        let mut app = Self {
            dashboard: Dashboard::new(FeatureCollection::default(), &config),
            config,
            client,
            search_query: String::new(),
            map_texture: None,
            map_size: [0, 0],
            map_dirty: true,
            loading_layers: false,
            searching: false,
            status_message: String::new(),
            error_message: String::new(),
            sender,
            receiver,
        };
        let source = app.config.layer_source();
        app.load_layers(source);
        app
    }

    fn load_layers(&mut self, source: LayerSource) {
        let client = self.client.clone();
        if client.is_none() && !matches!(source, LayerSource::File(_)) {
            self.error_message = "No HTTP client available".to_string();
            return;
        }
        let sender = self.sender.clone();
        self.loading_layers = true;
        self.status_message = "Loading regions...".to_string();
        thread::spawn(move || {
            let result = match (client, &source) {
                (Some(client), _) => client.load_layers(&source),
                (None, LayerSource::File(path)) => {
                    FeatureCollection::from_path(path).map_err(FetchError::from)
                }
                (None, _) => Err(FetchError::Unavailable("no HTTP client".to_string())),
            };
            let _ = sender.send(WorkResult::Layers(result));
        });
    }

    fn start_series(&mut self, request: PendingRequest) {
        let Some(client) = self.client.clone() else {
            self.error_message = "No HTTP client available".to_string();
            let unavailable = FetchError::Unavailable("no HTTP client".to_string());
            self.dashboard.apply_series(request.token, Err(unavailable));
            return;
        };
        let sender = self.sender.clone();
        thread::spawn(move || {
            let result = client.fetch_series(&request.selector);
            let _ = sender.send(WorkResult::Series {
                token: request.token,
                result,
            });
        });
    }

    fn start_search(&mut self) {
        let query = self.search_query.trim().to_string();
        if query.is_empty() {
            return;
        }
        let Some(client) = self.client.clone() else {
            self.error_message = "No HTTP client available".to_string();
            return;
        };
        self.searching = true;
        self.error_message.clear();
        let sender = self.sender.clone();
        thread::spawn(move || {
            let outcome = SearchOutcome::from_lookup(&query, client.geocode(&query));
            let _ = sender.send(WorkResult::Search(outcome));
        });
    }

    fn check_work_results(&mut self) {
        while let Ok(result) = self.receiver.try_recv() {
            match result {
                WorkResult::Layers(Ok(regions)) => {
                    self.loading_layers = false;
                    let n = regions.len();
                    match self.dashboard.replace_regions(regions) {
                        Ok(()) => {
                            self.status_message = format!("Loaded {n} regions");
                            self.error_message.clear();
                        }
                        Err(e) => self.error_message = format!("Cannot render regions: {e}"),
                    }
                    self.map_dirty = true;
                }
                WorkResult::Layers(Err(e)) => {
                    self.loading_layers = false;
                    self.status_message.clear();
                    self.error_message = format!("Cannot load regions: {e}");
                }
                WorkResult::Series { token, result } => {
                    self.dashboard.apply_series(token, result);
                }
                WorkResult::Search(outcome) => {
                    self.searching = false;
                    match &outcome {
                        SearchOutcome::Recentered(hit) => {
                            self.status_message = hit
                                .display_name
                                .clone()
                                .unwrap_or_else(|| self.search_query.clone());
                        }
                        SearchOutcome::NotFound => {
                            self.error_message = LOCATION_NOT_FOUND.to_string();
                        }
                        // logged by the worker; the map stays where it is
                        SearchOutcome::Failed(_) | SearchOutcome::Skipped => {}
                    }
                    self.dashboard.apply_search(&outcome);
                    self.map_dirty = true;
                }
            }
        }
    }

    fn export_map(&mut self) {
        let Some(path) = rfd::FileDialog::new()
            .add_filter("PNG", &["png"])
            .add_filter("SVG", &["svg"])
            .set_file_name("loadmap.png")
            .save_file()
        else {
            return;
        };
        let (w, h) = (self.config.width, self.config.height);
        match viz::render_map(&self.dashboard.scene(w, h), &path) {
            Ok(()) => self.status_message = format!("Wrote map to {}", path.display()),
            Err(e) => self.error_message = format!("Export failed: {e}"),
        }
    }

    fn export_regions(&mut self) {
        let Some(path) = rfd::FileDialog::new()
            .add_filter("CSV", &["csv"])
            .set_file_name("regions.csv")
            .save_file()
        else {
            return;
        };
        match storage::save_regions_csv(self.dashboard.regions(), self.dashboard.layer(), &path) {
            Ok(()) => self.status_message = format!("Saved regions to {}", path.display()),
            Err(e) => self.error_message = format!("Export failed: {e}"),
        }
    }

    fn export_series(&mut self) {
        let Some(chart) = self.dashboard.panel().chart() else {
            return;
        };
        let series = chart.series.clone();
        let default_dir = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
        let Some(path) = rfd::FileDialog::new()
            .set_directory(default_dir)
            .add_filter("CSV", &["csv"])
            .add_filter("JSON", &["json"])
            .set_file_name("load_profile.csv")
            .save_file()
        else {
            return;
        };
        match storage::save_series(&series, self.config.reference_day, &path) {
            Ok(()) => self.status_message = format!("Saved {} samples", series.len()),
            Err(e) => self.error_message = format!("Export failed: {e}"),
        }
    }

    fn sidebar(&mut self, ui: &mut egui::Ui) {
        ui.heading("Load Map");
        ui.add_space(8.0);

        ui.group(|ui| {
            ui.label("Search location");
            let resp = ui.text_edit_singleline(&mut self.search_query);
            if resp.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter)) {
                self.start_search();
            }
            if self.searching {
                ui.spinner();
            }
        });

        ui.add_space(8.0);
        ui.group(|ui| {
            ui.label("Data layer");
            egui::Grid::new("metric_buttons").num_columns(2).show(ui, |ui| {
                let metrics = self.dashboard.selection().metrics().options().to_vec();
                for (i, metric) in metrics.into_iter().enumerate() {
                    let selected = self.dashboard.selection().metrics().is_selected(metric);
                    if ui.selectable_label(selected, metric.label()).clicked() {
                        if let Err(e) = self.dashboard.select_metric(metric) {
                            self.error_message = format!("Cannot show {}: {e}", metric.label());
                        } else {
                            self.error_message.clear();
                        }
                        self.map_dirty = true;
                    }
                    if i % 2 == 1 {
                        ui.end_row();
                    }
                }
            });
        });

        ui.add_space(8.0);
        ui.group(|ui| {
            ui.label("Time range");
            ui.horizontal(|ui| {
                let ranges = self.dashboard.selection().time_range().options().to_vec();
                for range in ranges {
                    let selected = self.dashboard.selection().time_range().is_selected(range);
                    if ui.selectable_label(selected, range.to_string()).clicked() {
                        self.dashboard.select_time_range(range);
                    }
                }
            });
            ui.label("Load type");
            ui.horizontal(|ui| {
                let loads = self.dashboard.selection().load_type().options().to_vec();
                for load in loads {
                    let selected = self.dashboard.selection().load_type().is_selected(load);
                    if ui.selectable_label(selected, load.to_string()).clicked() {
                        self.dashboard.select_load_type(load);
                    }
                }
            });
        });

        ui.add_space(8.0);
        ui.horizontal(|ui| {
            ui.label("Base map:");
            let mut base = self.dashboard.map().base_map;
            egui::ComboBox::from_id_salt("base_map")
                .selected_text(base.label())
                .show_ui(ui, |ui| {
                    for b in BaseMap::ALL {
                        ui.selectable_value(&mut base, b, b.label())
                            .on_hover_text(b.tile_url());
                    }
                });
            if base != self.dashboard.map().base_map {
                self.dashboard.select_base_map(base);
                self.map_dirty = true;
            }
        });

        ui.add_space(8.0);
        ui.horizontal_wrapped(|ui| {
            if ui
                .add_enabled(!self.loading_layers, egui::Button::new("Open GeoJSON"))
                .clicked()
                && let Some(path) = rfd::FileDialog::new()
                    .add_filter("GeoJSON", &["geojson", "json"])
                    .pick_file()
            {
                self.load_layers(LayerSource::File(path.to_string_lossy().into_owned()));
            }
            if ui.button("Fit").clicked() {
                let [w, h] = self.map_size;
                self.dashboard.fit_to_regions(w as u32, h as u32);
                self.map_dirty = true;
            }
        });
        ui.horizontal_wrapped(|ui| {
            if ui.button("Export map").clicked() {
                self.export_map();
            }
            if ui.button("Export regions").clicked() {
                self.export_regions();
            }
        });

        if self.loading_layers {
            ui.horizontal(|ui| {
                ui.spinner();
                ui.label("Loading...");
            });
        }

        ui.add_space(10.0);
        if !self.status_message.is_empty() {
            ui.colored_label(egui::Color32::DARK_GREEN, &self.status_message);
        }
        if !self.error_message.is_empty() {
            ui.colored_label(egui::Color32::RED, &self.error_message);
        }
        ui.with_layout(egui::Layout::bottom_up(egui::Align::LEFT), |ui| {
            ui.small(ATTRIBUTION);
        });
    }

    fn detail_panel(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            ui.heading("Region analysis");
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if ui.button("✕").clicked() {
                    self.dashboard.close_panel();
                }
            });
        });
        if let Some(header) = self.dashboard.panel().header() {
            ui.label(header);
        }
        ui.separator();

        let mut export = false;
        match self.dashboard.panel().state() {
            PanelState::Closed => {}
            PanelState::Loading { .. } => {
                ui.horizontal(|ui| {
                    ui.spinner();
                    ui.label("Fetching load profile...");
                });
            }
            PanelState::Empty { reason, .. } => {
                ui.colored_label(egui::Color32::GRAY, format!("No data available ({reason})"));
            }
            PanelState::Ready(chart) => {
                let points: PlotPoints = chart
                    .series
                    .values
                    .iter()
                    .enumerate()
                    .map(|(i, v)| [i as f64, *v])
                    .collect();
                let line = Line::new(points)
                    .color(egui::Color32::from_rgb(5, 150, 105))
                    .fill(0.0)
                    .name("Load");
                // a fresh plot id per chart drops the previous chart's zoom state
                Plot::new(("load_chart", chart.id.to_string()))
                    .height(360.0)
                    .include_y(0.0)
                    .x_axis_label(X_AXIS_TITLE)
                    .y_axis_label(Y_AXIS_TITLE)
                    .x_axis_formatter(|mark, _range| minute_label(mark.value.max(0.0).round() as usize))
                    .label_formatter(|_name, p| {
                        format!("{}  {:.2}", minute_label(p.x.max(0.0).round() as usize), p.y)
                    })
                    .show(ui, |plot_ui| plot_ui.line(line));
                ui.add_space(6.0);
                export = ui.button("Export series").clicked();
            }
        }
        if export {
            self.export_series();
        }
    }

    fn popup_window(&mut self, ctx: &egui::Context) {
        let Some(popup) = self.dashboard.popup().cloned() else {
            return;
        };
        let mut open = true;
        let mut analyze = false;
        egui::Window::new(popup.title.as_str())
            .id(egui::Id::new("region_popup"))
            .open(&mut open)
            .collapsible(false)
            .resizable(false)
            .show(ctx, |ui| {
                egui::Grid::new("popup_rows").num_columns(2).show(ui, |ui| {
                    for row in &popup.rows {
                        ui.strong(row.label);
                        ui.label(row.value_text());
                        ui.end_row();
                    }
                });
                ui.add_space(6.0);
                analyze = ui.button(ANALYZE_LABEL).clicked();
            });
        if analyze
            && let Some(request) = self.dashboard.activate_popup_button(&popup.button_id)
        {
            self.start_series(request);
        }
        if !open {
            self.dashboard.close_popup();
        }
    }

    fn map_view(&mut self, ui: &mut egui::Ui) {
        let size = ui.available_size();
        let (rect, response) = ui.allocate_exact_size(size, egui::Sense::click_and_drag());
        let (w, h) = (rect.width().max(1.0) as u32, rect.height().max(1.0) as u32);
        if self.map_size != [w as usize, h as usize] {
            self.map_size = [w as usize, h as usize];
            self.map_dirty = true;
        }
        let to_geo = |dashboard: &Dashboard, pos: egui::Pos2| -> GeoPoint {
            let local = pos - rect.min;
            dashboard
                .map()
                .viewport(w, h)
                .unproject(f64::from(local.x), f64::from(local.y))
        };

        if response.dragged() {
            let d = response.drag_delta();
            if d.length_sq() > 0.0 {
                self.dashboard
                    .map_mut()
                    .pan_pixels(f64::from(d.x), f64::from(d.y), w, h);
                self.map_dirty = true;
            }
        }
        if response.hovered() {
            let scroll = ui.input(|i| i.raw_scroll_delta.y);
            if scroll.abs() > 0.1
                && let Some(pos) = response.hover_pos()
            {
                let local = pos - rect.min;
                self.dashboard.map_mut().zoom_at(
                    f64::from(scroll) * 0.002,
                    (f64::from(local.x), f64::from(local.y)),
                    w,
                    h,
                );
                self.map_dirty = true;
            }
        }
        match response.hover_pos() {
            Some(pos) if !response.dragged() => {
                let before = self.dashboard.hovered();
                let point = to_geo(&self.dashboard, pos);
                if self.dashboard.hover_at(point) != before {
                    self.map_dirty = true;
                }
            }
            None if self.dashboard.hovered().is_some() => {
                self.dashboard.unhover();
                self.map_dirty = true;
            }
            _ => {}
        }
        if response.clicked()
            && let Some(pos) = response.interact_pointer_pos()
        {
            let point = to_geo(&self.dashboard, pos);
            self.dashboard.click_at(point);
            self.map_dirty = true;
        }

        if self.map_dirty || self.map_texture.is_none() {
            match viz::render_map_rgb(&self.dashboard.scene(w, h)) {
                Ok(rgb) => {
                    let image = egui::ColorImage::from_rgb([w as usize, h as usize], &rgb);
                    match &mut self.map_texture {
                        Some(tex) => tex.set(image, egui::TextureOptions::LINEAR),
                        None => {
                            self.map_texture = Some(ui.ctx().load_texture(
                                "choropleth",
                                image,
                                egui::TextureOptions::LINEAR,
                            ))
                        }
                    }
                }
                Err(e) => self.error_message = format!("Map rendering failed: {e}"),
            }
            self.map_dirty = false;
        }
        if let Some(tex) = &self.map_texture {
            ui.painter().image(
                tex.id(),
                rect,
                egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0)),
                egui::Color32::WHITE,
            );
        }
    }
}

impl eframe::App for LoadMapApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Check for completed background operations
        self.check_work_results();

        // Request repaint while waiting (for spinner animation)
        if self.loading_layers || self.searching || self.dashboard.panel().pending().is_some() {
            ctx.request_repaint();
        }

        egui::SidePanel::left("sidebar")
            .resizable(false)
            .exact_width(260.0)
            .show(ctx, |ui| {
                egui::ScrollArea::vertical().show(ui, |ui| self.sidebar(ui));
            });

        if self.dashboard.panel().is_open() {
            egui::SidePanel::right("detail_panel")
                .resizable(true)
                .default_width(500.0)
                .show(ctx, |ui| self.detail_panel(ui));
        }

        egui::CentralPanel::default()
            .frame(egui::Frame::none())
            .show(ctx, |ui| self.map_view(ui));

        self.popup_window(ctx);
    }
}
