//! Detail panel: region selector construction, request sequencing and chart state.
//!
//! A request is identified by a [`RequestToken`]. Only the response to the most recently
//! issued token is applied; anything older is dropped. Closing the panel invalidates
//! every outstanding token.

use crate::api::{FetchError, encode_component};
use crate::models::Properties;
use ahash::AHashMap;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;
use thiserror::Error;

/// Backend lookup key of a region, e.g. `('Lagos', 'Ikeja')`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Selector(String);

fn selector_re() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\('(.*)', '(.*)'\)$").ok())
        .as_ref()
}

impl Selector {
    /// `('{first}', '{second}')`.
    pub fn new(first: &str, second: &str) -> Self {
        Self(format!("('{first}', '{second}')"))
    }

    /// Wrap an already formatted selector string verbatim.
    pub fn raw(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// URL path component form.
    pub fn encoded(&self) -> String {
        encode_component(&self.0)
    }

    /// The two quoted parts, if the selector has the tuple shape.
    pub fn parts(&self) -> Option<(String, String)> {
        let caps = selector_re()?.captures(&self.0)?;
        Some((caps[1].to_string(), caps[2].to_string()))
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldOrder {
    #[default]
    Level0First,
    Level1First,
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("region has no `{0}` property")]
pub struct MissingField(pub String);

/// How the selector is assembled from a region's properties, per data source.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceSchema {
    pub country_field: String,
    pub level0_field: String,
    pub level1_field: String,
    pub default_order: FieldOrder,
    overrides: AHashMap<String, FieldOrder>,
}

impl Default for SourceSchema {
    fn default() -> Self {
        Self::new("ISO3", "level_0", "level_1", FieldOrder::Level0First)
            .with_override("NGA", FieldOrder::Level1First)
    }
}

impl SourceSchema {
    /// Schema without per-country overrides.
    pub fn new(country: &str, level0: &str, level1: &str, default_order: FieldOrder) -> Self {
        Self {
            country_field: country.to_string(),
            level0_field: level0.to_string(),
            level1_field: level1.to_string(),
            default_order,
            overrides: AHashMap::new(),
        }
    }

    pub fn with_override(mut self, country: &str, order: FieldOrder) -> Self {
        self.overrides.insert(country.to_string(), order);
        self
    }

    pub fn order_for(&self, country: Option<&str>) -> FieldOrder {
        country
            .and_then(|c| self.overrides.get(c).copied())
            .unwrap_or(self.default_order)
    }

    pub fn country<'a>(&self, props: &'a Properties) -> Option<&'a str> {
        props.text(&self.country_field)
    }

    pub fn selector_for(&self, props: &Properties) -> Result<Selector, MissingField> {
        let field = |name: &str| props.display(name).ok_or_else(|| MissingField(name.to_string()));
        let level0 = field(&self.level0_field)?;
        let level1 = field(&self.level1_field)?;
        Ok(match self.order_for(self.country(props)) {
            FieldOrder::Level0First => Selector::new(&level0, &level1),
            FieldOrder::Level1First => Selector::new(&level1, &level0),
        })
    }
}

/// `HH:MM` label of the `i`-th minute sample.
pub fn minute_label(i: usize) -> String {
    format!("{:02}:{:02}", i / 60, i % 60)
}

pub fn minute_labels(n: usize) -> Vec<String> {
    (0..n).map(minute_label).collect()
}

/// One day of per-minute load samples starting at 00:00.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimeSeries {
    pub selector: Selector,
    pub values: Vec<f64>,
}

impl TimeSeries {
    pub fn new(selector: Selector, values: Vec<f64>) -> Self {
        Self { selector, values }
    }

    pub fn labels(&self) -> Vec<String> {
        minute_labels(self.values.len())
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct RequestToken(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct ChartId(u64);

impl fmt::Display for ChartId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "chart-{}", self.0)
    }
}

/// A fetch the caller must perform and report back through [`DetailPanelController::complete`].
#[derive(Debug, Clone, PartialEq)]
pub struct PendingRequest {
    pub token: RequestToken,
    pub selector: Selector,
}

/// Why the panel has nothing to chart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum NoDataReason {
    NotFound,
    ServerError(u16),
    Network(String),
    Malformed(String),
    MissingField(String),
}

impl From<&FetchError> for NoDataReason {
    fn from(e: &FetchError) -> Self {
        match e {
            FetchError::NotFound(_) => NoDataReason::NotFound,
            FetchError::Status { status } => NoDataReason::ServerError(*status),
            FetchError::Network(e) => NoDataReason::Network(e.to_string()),
            FetchError::Unavailable(msg) => NoDataReason::Network(msg.clone()),
            other => NoDataReason::Malformed(other.to_string()),
        }
    }
}

impl fmt::Display for NoDataReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NoDataReason::NotFound => f.write_str("data not found"),
            NoDataReason::ServerError(status) => write!(f, "server error: {status}"),
            NoDataReason::Network(msg) => write!(f, "network error: {msg}"),
            NoDataReason::Malformed(msg) => write!(f, "unreadable response: {msg}"),
            NoDataReason::MissingField(field) => write!(f, "region has no `{field}`"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Chart {
    pub id: ChartId,
    pub series: TimeSeries,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub enum PanelState {
    #[default]
    Closed,
    Loading {
        token: RequestToken,
        selector: Selector,
    },
    Ready(Chart),
    Empty {
        selector: Option<Selector>,
        reason: NoDataReason,
    },
}

/// Effect of a completed request on the panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    Rendered(ChartId),
    Empty,
    Stale,
}

#[derive(Debug, Clone, Default)]
pub struct DetailPanelController {
    schema: SourceSchema,
    state: PanelState,
    country: Option<String>,
    next_token: u64,
    next_chart: u64,
}

impl DetailPanelController {
    pub fn new(schema: SourceSchema) -> Self {
        Self {
            schema,
            ..Self::default()
        }
    }

    /// Open the panel for a region and issue a new request.
    ///
    /// Returns `None` when the selector cannot be built; the panel then shows
    /// the missing field as its "no data" reason.
    pub fn open(&mut self, props: &Properties) -> Option<PendingRequest> {
        self.country = self.schema.country(props).map(str::to_string);
        match self.schema.selector_for(props) {
            Ok(selector) => Some(self.request(selector)),
            Err(MissingField(field)) => {
                log::warn!("cannot analyze region: missing `{field}`");
                self.state = PanelState::Empty {
                    selector: None,
                    reason: NoDataReason::MissingField(field),
                };
                None
            }
        }
    }

    /// Open the panel for an explicit selector.
    pub fn request(&mut self, selector: Selector) -> PendingRequest {
        self.next_token += 1;
        let token = RequestToken(self.next_token);
        self.state = PanelState::Loading {
            token,
            selector: selector.clone(),
        };
        PendingRequest { token, selector }
    }

    /// Apply the outcome of request `token`. Responses to superseded requests are ignored.
    pub fn complete(&mut self, token: RequestToken, result: Result<Vec<f64>, FetchError>) -> Applied {
        let selector = match &self.state {
            PanelState::Loading { token: current, selector } if *current == token => selector.clone(),
            _ => {
                log::debug!("dropping stale response for {token:?}");
                return Applied::Stale;
            }
        };
        match result {
            Ok(values) => {
                // a new chart replaces the previous one entirely
                self.next_chart += 1;
                let id = ChartId(self.next_chart);
                log::info!("charting {} samples for {selector} as {id}", values.len());
                self.state = PanelState::Ready(Chart {
                    id,
                    series: TimeSeries::new(selector, values),
                });
                Applied::Rendered(id)
            }
            Err(e) => {
                log::warn!("no series for {selector}: {e}");
                self.state = PanelState::Empty {
                    selector: Some(selector),
                    reason: NoDataReason::from(&e),
                };
                Applied::Empty
            }
        }
    }

    pub fn close(&mut self) {
        self.state = PanelState::Closed;
        self.country = None;
    }

    pub fn is_open(&self) -> bool {
        !matches!(self.state, PanelState::Closed)
    }

    pub fn state(&self) -> &PanelState {
        &self.state
    }

    pub fn chart(&self) -> Option<&Chart> {
        match &self.state {
            PanelState::Ready(chart) => Some(chart),
            _ => None,
        }
    }

    pub fn pending(&self) -> Option<RequestToken> {
        match &self.state {
            PanelState::Loading { token, .. } => Some(*token),
            _ => None,
        }
    }

    /// `"Analyzing: NGA ('Ikeja', 'Lagos')"`.
    pub fn header(&self) -> Option<String> {
        let selector = match &self.state {
            PanelState::Closed => return None,
            PanelState::Loading { selector, .. } => Some(selector),
            PanelState::Ready(chart) => Some(&chart.series.selector),
            PanelState::Empty { selector, .. } => selector.as_ref(),
        };
        let parts: Vec<&str> = [self.country.as_deref(), selector.map(Selector::as_str)]
            .into_iter()
            .flatten()
            .collect();
        Some(format!("Analyzing: {}", parts.join(" ")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selector_parts() {
        let s = Selector::new("Lagos", "Ikeja");
        assert_eq!(s.as_str(), "('Lagos', 'Ikeja')");
        assert_eq!(s.parts(), Some(("Lagos".into(), "Ikeja".into())));
        assert_eq!(Selector::raw("Lagos").parts(), None);
    }

    #[test]
    fn minute_labels_wrap_hours() {
        assert_eq!(minute_label(0), "00:00");
        assert_eq!(minute_label(61), "01:01");
        assert_eq!(minute_label(1439), "23:59");
    }
}
