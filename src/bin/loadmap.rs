use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand, ValueEnum};
use loadmap_rs::api::{Geocoder, LayerSource, SeriesSource};
use loadmap_rs::dashboard::LOCATION_NOT_FOUND;
use loadmap_rs::interaction::region_name;
use loadmap_rs::map::BaseMap;
use loadmap_rs::panel::{NoDataReason, PanelState, Selector, TimeSeries};
use loadmap_rs::viz::types::DEFAULT_CHART_SIZE;
use loadmap_rs::viz::util::{format_grouped, map_locale};
use loadmap_rs::{Dashboard, DashboardConfig, FeatureCollection, Metric};
use loadmap_rs::{stats, storage, viz};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "loadmap",
    version,
    about = "Classify, map & explore regional electricity-load statistics"
)]
struct Cli {
    /// JSON settings file (defaults to the per-user config if present).
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Region layer: local GeoJSON file, URL, or backend path.
    #[arg(long, global = true)]
    layers: Option<String>,
    /// Backend base URL serving /get_data and the static layer.
    #[arg(long, global = true)]
    backend: Option<String>,
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render the choropleth for one metric (and optionally print legend/stats, export regions).
    Render(RenderArgs),
    /// Print the popup of one region.
    Popup(PopupArgs),
    /// Fetch the per-minute load series of a region (and optionally plot/export it).
    Series(SeriesArgs),
    /// Look up a place and print its coordinates.
    Geocode(GeocodeArgs),
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum BaseMapArg {
    Standard,
    Dark,
    Satellite,
}

impl From<BaseMapArg> for BaseMap {
    fn from(b: BaseMapArg) -> Self {
        match b {
            BaseMapArg::Standard => BaseMap::Standard,
            BaseMapArg::Dark => BaseMap::Dark,
            BaseMapArg::Satellite => BaseMap::Satellite,
        }
    }
}

#[derive(Args, Debug)]
struct RenderArgs {
    /// Metric key: max, mean, sum, hh_max, hh_mean, hh_sum, hh_num, cluster.
    #[arg(short, long)]
    metric: Option<Metric>,
    /// Output image (.svg or .png).
    #[arg(short, long)]
    out: Option<PathBuf>,
    /// Image width in pixels (defaults to the config value).
    #[arg(long)]
    width: Option<u32>,
    /// Image height in pixels (defaults to the config value).
    #[arg(long)]
    height: Option<u32>,
    /// Frame the data extent instead of the configured center/zoom.
    #[arg(long, default_value_t = false)]
    fit: bool,
    #[arg(long, value_enum)]
    base_map: Option<BaseMapArg>,
    /// Print the legend to stdout.
    #[arg(long, default_value_t = false)]
    legend: bool,
    /// Print summary statistics of the metric to stdout.
    #[arg(long, default_value_t = false)]
    stats: bool,
    /// Export one row per region (name, class, popup quantities) as CSV.
    #[arg(long)]
    regions_csv: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct RegionArgs {
    /// Region display name or adm2 name (case-insensitive).
    #[arg(short, long, conflicts_with = "index")]
    name: Option<String>,
    /// Region position in the layer file.
    #[arg(short, long)]
    index: Option<usize>,
}

#[derive(Args, Debug)]
struct PopupArgs {
    #[command(flatten)]
    region: RegionArgs,
    /// Print the HTML fragment instead of plain text.
    #[arg(long, default_value_t = false)]
    html: bool,
}

#[derive(Args, Debug)]
struct SeriesArgs {
    #[command(flatten)]
    region: RegionArgs,
    /// Raw selector, either `('a', 'b')` or `a,b`; skips the region lookup.
    #[arg(long, conflicts_with_all = ["name", "index"])]
    selector: Option<String>,
    /// Create a chart at the given path (.svg or .png).
    #[arg(long)]
    plot: Option<PathBuf>,
    /// Save the samples (.csv or .json).
    #[arg(long)]
    out: Option<PathBuf>,
    #[arg(long, default_value_t = DEFAULT_CHART_SIZE.0)]
    width: u32,
    #[arg(long, default_value_t = DEFAULT_CHART_SIZE.1)]
    height: u32,
}

#[derive(Args, Debug)]
struct GeocodeArgs {
    /// Free-text place name.
    query: String,
}

fn fmt_opt(v: Option<f64>) -> String {
    match v {
        Some(x) if x.is_finite() => {
            // Format up to 4 decimals, then trim trailing zeros and trailing dot.
            let s = format!("{:.4}", x);
            s.trim_end_matches('0').trim_end_matches('.').to_string()
        }
        _ => "NA".to_string(),
    }
}

fn parse_list(s: &str) -> Vec<String> {
    s.split([',', ';'])
        .map(|x| x.trim().to_string())
        .filter(|x| !x.is_empty())
        .collect()
}

fn parse_selector(s: &str) -> Result<Selector> {
    let s = s.trim();
    if s.starts_with('(') {
        return Ok(Selector::raw(s));
    }
    match parse_list(s).as_slice() {
        [a, b] => Ok(Selector::new(a, b)),
        _ => bail!("invalid --selector, expected ('a', 'b') or a,b"),
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    let mut config = DashboardConfig::load(cli.config.as_deref())?;
    if let Some(layers) = &cli.layers {
        config.layers = layers.clone();
    }
    if let Some(backend) = &cli.backend {
        config.backend_url = backend.clone();
    }
    match cli.cmd {
        Command::Render(args) => cmd_render(&config, args),
        Command::Popup(args) => cmd_popup(&config, args),
        Command::Series(args) => cmd_series(&config, args),
        Command::Geocode(args) => cmd_geocode(&config, args),
    }
}

fn load_regions(config: &DashboardConfig) -> Result<FeatureCollection> {
    let source = config.layer_source();
    let fc = match &source {
        LayerSource::File(path) => FeatureCollection::from_path(path)?,
        remote => config.client()?.load_layers(remote)?,
    };
    if fc.is_empty() {
        bail!("layer `{}` contains no regions", config.layers);
    }
    Ok(fc)
}

fn find_region(fc: &FeatureCollection, args: &RegionArgs) -> Result<usize> {
    if let Some(idx) = args.index {
        if idx >= fc.len() {
            bail!("--index {idx} out of range (layer has {} regions)", fc.len());
        }
        return Ok(idx);
    }
    let Some(name) = args.name.as_deref() else {
        bail!("select a region with --name or --index");
    };
    let wanted = name.trim().to_lowercase();
    fc.iter()
        .position(|f| {
            region_name(&f.properties).to_lowercase() == wanted
                || f.properties
                    .display("adm2")
                    .is_some_and(|a| a.to_lowercase() == wanted)
        })
        .ok_or_else(|| anyhow::anyhow!("no region named `{name}`"))
}

fn cmd_render(config: &DashboardConfig, args: RenderArgs) -> Result<()> {
    let regions = load_regions(config)?;
    let metric = args.metric.unwrap_or(config.initial_metric);
    let mut dashboard = Dashboard::new(regions, config);
    if dashboard.active_metric() != Some(metric) {
        dashboard
            .select_metric(metric)
            .with_context(|| format!("render metric `{metric}`"))?;
    }
    if let Some(base) = args.base_map {
        dashboard.select_base_map(base.into());
    }
    let width = args.width.unwrap_or(config.width);
    let height = args.height.unwrap_or(config.height);
    if args.fit {
        dashboard.fit_to_regions(width, height);
    }

    if let Some(out) = args.out.as_ref() {
        viz::render_map(&dashboard.scene(width, height), out)?;
        eprintln!("Wrote map of `{metric}` to {}", out.display());
    }

    if args.legend
        && let Some(legend) = dashboard.legend()
    {
        println!("{}", legend.title);
        for row in &legend.rows {
            println!("  {}  {}", row.color, row.label());
        }
    }

    if args.stats {
        let (locale, sep) = map_locale(&config.locale);
        let s = stats::metric_summary(dashboard.regions(), metric).in_display_units();
        let show = |v: Option<f64>| match v {
            Some(x) => format_grouped(x, 2, locale, sep),
            None => fmt_opt(None),
        };
        println!(
            "{}  count={} missing={}  min={} max={} mean={} median={}",
            metric.legend_title(),
            s.count,
            s.missing,
            show(s.min),
            show(s.max),
            show(s.mean),
            show(s.median)
        );
    }

    if let Some(path) = args.regions_csv.as_ref() {
        storage::save_regions_csv(dashboard.regions(), dashboard.layer(), path)?;
        eprintln!("Saved {} regions to {}", dashboard.regions().len(), path.display());
    }
    Ok(())
}

fn cmd_popup(config: &DashboardConfig, args: PopupArgs) -> Result<()> {
    let regions = load_regions(config)?;
    let idx = find_region(&regions, &args.region)?;
    let mut dashboard = Dashboard::new(regions, config);
    let popup = dashboard
        .click(idx)
        .ok_or_else(|| anyhow::anyhow!("region {idx} not found"))?;
    if args.html {
        print!("{}", popup.to_html());
    } else {
        println!("{}", popup.to_text());
    }
    Ok(())
}

fn cmd_series(config: &DashboardConfig, args: SeriesArgs) -> Result<()> {
    let client = config.client()?;
    let selector = match args.selector.as_deref() {
        Some(raw) => parse_selector(raw)?,
        None => {
            let regions = load_regions(config)?;
            let idx = find_region(&regions, &args.region)?;
            let mut dashboard = Dashboard::new(regions, config);
            let Some(request) = dashboard.analyze(idx) else {
                if let PanelState::Empty { reason, .. } = dashboard.panel().state() {
                    bail!("cannot analyze region: {reason}");
                }
                bail!("cannot analyze region {idx}");
            };
            request.selector
        }
    };

    eprintln!("Fetching {}", client.series_url(&selector));
    let values = match client.fetch_series(&selector) {
        Ok(v) => v,
        Err(e) => bail!("no data for {selector}: {}", NoDataReason::from(&e)),
    };
    let series = TimeSeries::new(selector, values);
    let (count, min, max, mean) = stats::series_summary(&series.values);
    println!(
        "{}  samples={} min={} max={} mean={}",
        series.selector,
        count,
        fmt_opt(min),
        fmt_opt(max),
        fmt_opt(mean)
    );

    if let Some(path) = args.out.as_ref() {
        storage::save_series(&series, config.reference_day, path)?;
        eprintln!("Saved {} samples to {}", series.len(), path.display());
    }
    if let Some(plot_path) = args.plot.as_ref() {
        viz::plot_series(&series, plot_path, args.width, args.height)?;
        eprintln!("Wrote plot to {}", plot_path.display());
    }
    Ok(())
}

fn cmd_geocode(config: &DashboardConfig, args: GeocodeArgs) -> Result<()> {
    let query = args.query.trim();
    if query.is_empty() {
        bail!("empty search query");
    }
    let client = config.client()?;
    match client.geocode(query)? {
        Some(hit) => {
            println!(
                "{:.6} {:.6}  {}",
                hit.point.lat,
                hit.point.lon,
                hit.display_name.unwrap_or_default()
            );
            Ok(())
        }
        None => bail!("{LOCATION_NOT_FOUND}"),
    }
}
