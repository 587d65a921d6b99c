/// Blocking HTTP client for the dashboard's three remote collaborators:
/// the backend time-series endpoint, the static layer asset and the Nominatim geocoder.
///
/// The response interpretation (`check_status`, `parse_series`, `parse_geocode`) is kept in
/// plain functions so it can be exercised without a network.
///
/// Typical usage:
/// ```no_run
/// # use loadmap_rs::api::{Client, SeriesSource};
/// # use loadmap_rs::panel::Selector;
/// let client = Client::new("http://127.0.0.1:8000", "https://nominatim.openstreetmap.org")?;
/// let series = client.fetch_series(&Selector::new("Lagos", "Ikeja"))?;
/// # Ok::<(), anyhow::Error>(())
/// ```
use crate::models::{FeatureCollection, GeoPoint, LoadError};
use crate::panel::Selector;
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use reqwest::StatusCode;
use reqwest::blocking::Client as HttpClient;
use reqwest::redirect::Policy;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_BACKEND_URL: &str = "http://127.0.0.1:8000";
pub const DEFAULT_GEOCODER_URL: &str = "https://nominatim.openstreetmap.org";
pub const DEFAULT_LAYERS_PATH: &str = "/static/data/webmap_layers.geojson";

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("no data for `{0}`")]
    NotFound(String),
    #[error("server responded with HTTP {status}")]
    Status { status: u16 },
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("malformed response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("backend unavailable: {0}")]
    Unavailable(String),
    #[error("geocoder returned an unparsable coordinate `{0}`")]
    InvalidCoordinate(String),
    #[error(transparent)]
    Load(#[from] LoadError),
}

/// Anything that can produce the per-minute load series of a region.
pub trait SeriesSource {
    fn fetch_series(&self, selector: &Selector) -> Result<Vec<f64>, FetchError>;
}

/// Free-text place lookup. `Ok(None)` means the query matched nothing.
pub trait Geocoder {
    fn geocode(&self, query: &str) -> Result<Option<GeocodeHit>, FetchError>;
}

/// First match of a geocoding query.
#[derive(Debug, Clone, PartialEq)]
pub struct GeocodeHit {
    pub point: GeoPoint,
    pub display_name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct NominatimPlace {
    lat: String,
    lon: String,
    #[serde(default)]
    display_name: Option<String>,
}

// Same unreserved set as JavaScript's encodeURIComponent.
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Percent-encode one URL path or query component.
pub fn encode_component(s: &str) -> String {
    utf8_percent_encode(s, COMPONENT).to_string()
}

/// Map a status code to an error. 404 becomes `NotFound(what)`, any other non-2xx a `Status`.
pub fn check_status(status: StatusCode, what: &str) -> Result<(), FetchError> {
    if status.is_success() {
        Ok(())
    } else if status == StatusCode::NOT_FOUND {
        Err(FetchError::NotFound(what.to_string()))
    } else {
        Err(FetchError::Status {
            status: status.as_u16(),
        })
    }
}

/// Decode a time-series body: a JSON array of numbers.
pub fn parse_series(body: &str) -> Result<Vec<f64>, FetchError> {
    Ok(serde_json::from_str(body)?)
}

/// Decode a Nominatim search body and keep the first result.
pub fn parse_geocode(body: &str) -> Result<Option<GeocodeHit>, FetchError> {
    let places: Vec<NominatimPlace> = serde_json::from_str(body)?;
    let Some(first) = places.into_iter().next() else {
        return Ok(None);
    };
    let coord = |s: &str| {
        s.trim()
            .parse::<f64>()
            .map_err(|_| FetchError::InvalidCoordinate(s.to_string()))
    };
    Ok(Some(GeocodeHit {
        point: GeoPoint::new(coord(&first.lat)?, coord(&first.lon)?),
        display_name: first.display_name,
    }))
}

/// Where the region layer comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LayerSource {
    /// Absolute `http(s)://` URL.
    Url(String),
    /// Path served by the backend, e.g. `/static/data/webmap_layers.geojson`.
    Backend(String),
    /// Local GeoJSON file.
    File(String),
}

impl LayerSource {
    /// URLs stay URLs, existing files are read locally, other absolute paths go to the backend.
    pub fn parse(s: &str) -> Self {
        let s = s.trim();
        if s.starts_with("http://") || s.starts_with("https://") {
            LayerSource::Url(s.to_string())
        } else if Path::new(s).exists() || !s.starts_with('/') {
            LayerSource::File(s.to_string())
        } else {
            LayerSource::Backend(s.to_string())
        }
    }
}

#[derive(Debug, Clone)]
pub struct Client {
    pub base_url: String,
    pub geocoder_url: String,
    http: HttpClient,
}

impl Client {
    pub fn new(
        base_url: impl Into<String>,
        geocoder_url: impl Into<String>,
    ) -> Result<Self, FetchError> {
        let http = HttpClient::builder()
            .timeout(Duration::from_secs(30)) // total request timeout
            .connect_timeout(Duration::from_secs(10))
            .redirect(Policy::limited(5))
            // Nominatim rejects anonymous clients
            .user_agent(concat!("loadmap_rs/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            geocoder_url: geocoder_url.into().trim_end_matches('/').to_string(),
            http,
        })
    }

    pub fn with_defaults() -> Result<Self, FetchError> {
        Self::new(DEFAULT_BACKEND_URL, DEFAULT_GEOCODER_URL)
    }

    /// `GET {backend}/get_data/{encoded selector}`.
    pub fn series_url(&self, selector: &Selector) -> String {
        format!("{}/get_data/{}", self.base_url, selector.encoded())
    }

    pub fn geocode_url(&self, query: &str) -> String {
        format!(
            "{}/search?format=json&q={}",
            self.geocoder_url,
            encode_component(query.trim())
        )
    }

    fn get_text(&self, url: &str, what: &str) -> Result<String, FetchError> {
        log::debug!("GET {url}");
        let resp = self.http.get(url).send()?;
        check_status(resp.status(), what)?;
        Ok(resp.text()?)
    }

    /// Load the region layer once at startup.
    pub fn load_layers(&self, source: &LayerSource) -> Result<FeatureCollection, FetchError> {
        let fc = match source {
            LayerSource::File(path) => FeatureCollection::from_path(path)?,
            LayerSource::Url(url) => {
                FeatureCollection::from_geojson_str(&self.get_text(url, url)?)?
            }
            LayerSource::Backend(path) => {
                let url = format!("{}{}", self.base_url, path);
                FeatureCollection::from_geojson_str(&self.get_text(&url, path)?)?
            }
        };
        log::info!("loaded {} regions from {:?}", fc.len(), source);
        Ok(fc)
    }
}

impl SeriesSource for Client {
    fn fetch_series(&self, selector: &Selector) -> Result<Vec<f64>, FetchError> {
        let body = self.get_text(&self.series_url(selector), selector.as_str())?;
        parse_series(&body)
    }
}

impl Geocoder for Client {
    fn geocode(&self, query: &str) -> Result<Option<GeocodeHit>, FetchError> {
        let body = self.get_text(&self.geocode_url(query), query)?;
        parse_geocode(&body)
    }
}
