//! The single owned state object behind every front-end.
//!
//! [`Dashboard`] holds the region collection, the choropleth renderer, pointer interaction,
//! the detail panel, the sidebar selection and the map camera. Every state change goes
//! through `&mut Dashboard`; network calls are injected through [`SeriesSource`] and
//! [`Geocoder`] so the whole flow can be driven without a window or a network.

use crate::api::{FetchError, GeocodeHit, Geocoder, SeriesSource};
use crate::choropleth::{ChoroplethRenderer, Legend, RegionLayer, RegionStyle};
use crate::classify::ClassifyError;
use crate::config::DashboardConfig;
use crate::interaction::{Popup, RegionInteractionHandler};
use crate::map::{BaseMap, MapView};
use crate::metrics::Metric;
use crate::models::{FeatureCollection, GeoPoint};
use crate::panel::{Applied, DetailPanelController, PendingRequest, RequestToken};
use crate::selection::{LayerSelectionController, LoadType, TimeRange};
use crate::viz::{MapScene, SceneRegion};

/// Result of a place search.
#[derive(Debug, Clone, PartialEq)]
pub enum SearchOutcome {
    Recentered(GeocodeHit),
    /// Zero results: shown to the user as "Location not found".
    NotFound,
    /// Lookup failed; logged, map unchanged.
    Failed(String),
    /// Blank query: nothing was sent.
    Skipped,
}

pub const LOCATION_NOT_FOUND: &str = "Location not found";

impl SearchOutcome {
    /// Interpret a geocoder reply for `query`. Failures are logged here.
    pub fn from_lookup(query: &str, lookup: Result<Option<GeocodeHit>, FetchError>) -> Self {
        match lookup {
            Ok(Some(hit)) => SearchOutcome::Recentered(hit),
            Ok(None) => SearchOutcome::NotFound,
            Err(e) => {
                log::error!("geocoding `{query}` failed: {e}");
                SearchOutcome::Failed(e.to_string())
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct Dashboard {
    regions: FeatureCollection,
    renderer: ChoroplethRenderer,
    interaction: RegionInteractionHandler,
    panel: DetailPanelController,
    selection: LayerSelectionController,
    map: MapView,
    geocode_zoom: f64,
    initial_metric: Metric,
}

impl Dashboard {
    /// Build a dashboard over `regions` and render the configured initial metric.
    ///
    /// A failed initial render is logged; the map then shows no layer until a metric renders.
    /// An empty collection is not rendered at all (regions may still be loading).
    pub fn new(regions: FeatureCollection, config: &DashboardConfig) -> Self {
        let renderer = ChoroplethRenderer::with_classes(
            config.palette.clone(),
            config.fallback_color,
            config.num_classes,
        );
        let mut dashboard = Self {
            regions,
            renderer,
            interaction: RegionInteractionHandler::new(),
            panel: DetailPanelController::new(config.source_schema()),
            selection: LayerSelectionController::new(),
            map: MapView::new(config.center, config.zoom, config.base_map),
            geocode_zoom: config.geocode_zoom,
            initial_metric: config.initial_metric,
        };
        if !dashboard.regions.is_empty() {
            // error already logged by the selection controller
            let _ = dashboard.select_metric(config.initial_metric);
        }
        dashboard
    }

    /// Default configuration, initial metric `max`.
    pub fn with_defaults(regions: FeatureCollection) -> Self {
        Self::new(regions, &DashboardConfig::default())
    }

    /// Swap in a new collection and re-render the active metric (or the initial one).
    pub fn replace_regions(&mut self, regions: FeatureCollection) -> Result<(), ClassifyError> {
        self.regions = regions;
        self.interaction.reset();
        let metric = self.selection.active_metric().unwrap_or(self.initial_metric);
        self.select_metric(metric)
    }

    // ---- sidebar ----

    /// Make `metric` active and re-render. On error the previous layer stays.
    pub fn select_metric(&mut self, metric: Metric) -> Result<(), ClassifyError> {
        self.selection
            .select_metric(metric, &mut self.renderer, &self.regions)?;
        // hover state referred to the replaced layer
        self.interaction.reset();
        Ok(())
    }

    pub fn select_time_range(&mut self, range: TimeRange) {
        self.selection.select_time_range(range);
    }

    pub fn select_load_type(&mut self, load: LoadType) {
        self.selection.select_load_type(load);
    }

    pub fn select_base_map(&mut self, base_map: BaseMap) {
        self.map.set_base_map(base_map);
    }

    // ---- pointer ----

    pub fn hover(&mut self, feature: usize) {
        if feature < self.regions.len() {
            self.interaction.hover(feature);
        }
    }

    pub fn unhover(&mut self) {
        self.interaction.unhover();
    }

    /// Topmost region under `point`, respecting the current draw order.
    pub fn region_at(&self, point: GeoPoint) -> Option<usize> {
        let order = self.interaction.draw_order(self.regions.len());
        self.regions.hit_test(point, &order)
    }

    /// Hover whatever lies under `point`; leaves hover when nothing does.
    pub fn hover_at(&mut self, point: GeoPoint) -> Option<usize> {
        match self.region_at(point) {
            Some(idx) => {
                if self.interaction.hovered() != Some(idx) {
                    self.interaction.hover(idx);
                }
                Some(idx)
            }
            None => {
                self.interaction.unhover();
                None
            }
        }
    }

    /// Click a region: clears the geocoder marker and opens its popup.
    pub fn click(&mut self, feature: usize) -> Option<&Popup> {
        self.map.clear_markers();
        let f = self.regions.get(feature)?;
        Some(self.interaction.open_popup(feature, f))
    }

    pub fn click_at(&mut self, point: GeoPoint) -> Option<&Popup> {
        match self.region_at(point) {
            Some(idx) => self.click(idx),
            None => {
                self.map.clear_markers();
                None
            }
        }
    }

    pub fn close_popup(&mut self) {
        self.interaction.close_popup();
    }

    /// Press the popup's "Analyze Region" button. Returns the request to perform.
    pub fn activate_popup_button(&mut self, button_id: &str) -> Option<PendingRequest> {
        let props = self.interaction.activate(button_id)?.clone();
        self.panel.open(&props)
    }

    /// Open the detail panel for a region directly.
    pub fn analyze(&mut self, feature: usize) -> Option<PendingRequest> {
        let props = self.regions.get(feature)?.properties.clone();
        self.panel.open(&props)
    }

    /// Report the outcome of a series request.
    pub fn apply_series(
        &mut self,
        token: RequestToken,
        result: Result<Vec<f64>, FetchError>,
    ) -> Applied {
        self.panel.complete(token, result)
    }

    /// Perform `request` synchronously with `source` and apply the outcome.
    pub fn fetch_series_with(
        &mut self,
        request: &PendingRequest,
        source: &dyn SeriesSource,
    ) -> Applied {
        let result = source.fetch_series(&request.selector);
        self.apply_series(request.token, result)
    }

    pub fn close_panel(&mut self) {
        self.panel.close();
    }

    // ---- search ----

    /// Geocode `query` and recenter on the first match. Blank queries are skipped.
    pub fn search(&mut self, query: &str, geocoder: &dyn Geocoder) -> SearchOutcome {
        let query = query.trim();
        if query.is_empty() {
            return SearchOutcome::Skipped;
        }
        let outcome = SearchOutcome::from_lookup(query, geocoder.geocode(query));
        self.apply_search(&outcome);
        outcome
    }

    /// Apply a search outcome computed elsewhere (e.g. on a worker thread).
    pub fn apply_search(&mut self, outcome: &SearchOutcome) {
        if let SearchOutcome::Recentered(hit) = outcome {
            self.map.set_view(hit.point, self.geocode_zoom);
            self.map.add_temporary_marker(hit.point);
        }
    }

    // ---- view ----

    /// Frame every region with a geometry. No-op when there is none.
    pub fn fit_to_regions(&mut self, width: u32, height: u32) {
        if let Some(bounds) = self.regions.bounds() {
            self.map.fit(bounds, width, height);
        }
    }

    /// Current style of every region (hover applied), index-aligned with the collection.
    pub fn region_styles(&self) -> Vec<Option<RegionStyle>> {
        (0..self.regions.len())
            .map(|i| {
                self.renderer
                    .layer()
                    .and_then(|layer| self.interaction.style_for(layer, i))
            })
            .collect()
    }

    /// Snapshot of what the map surface shows at `width`×`height`.
    pub fn scene(&self, width: u32, height: u32) -> MapScene<'_> {
        let regions = match self.renderer.layer() {
            Some(layer) => self
                .interaction
                .draw_order(self.regions.len())
                .into_iter()
                .filter_map(|idx| {
                    let geometry = self.regions.get(idx)?.geometry.as_ref()?;
                    let style = self.interaction.style_for(layer, idx)?;
                    Some(SceneRegion { geometry, style })
                })
                .collect(),
            None => Vec::new(),
        };
        MapScene {
            viewport: self.map.viewport(width, height),
            base_map: self.map.base_map,
            regions,
            legend: self.renderer.legend(),
            marker: self.map.marker(),
        }
    }

    // ---- accessors ----

    pub fn regions(&self) -> &FeatureCollection {
        &self.regions
    }

    pub fn active_metric(&self) -> Option<Metric> {
        self.selection.active_metric()
    }

    pub fn layer(&self) -> Option<&RegionLayer> {
        self.renderer.layer()
    }

    pub fn legend(&self) -> Option<&Legend> {
        self.renderer.legend()
    }

    pub fn renderer(&self) -> &ChoroplethRenderer {
        &self.renderer
    }

    pub fn popup(&self) -> Option<&Popup> {
        self.interaction.popup()
    }

    pub fn hovered(&self) -> Option<usize> {
        self.interaction.hovered()
    }

    pub fn panel(&self) -> &DetailPanelController {
        &self.panel
    }

    pub fn selection(&self) -> &LayerSelectionController {
        &self.selection
    }

    pub fn map(&self) -> &MapView {
        &self.map
    }

    pub fn map_mut(&mut self) -> &mut MapView {
        &mut self.map
    }
}
