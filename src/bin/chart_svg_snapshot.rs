use std::fs;
use std::path::{Path, PathBuf};

use candleview::api::{ChartView, LayoutConfig};
use candleview::core::{AnalysisOverlay, CandleSeries, Viewport};
use candleview::protocol::{ServerMessage, decode_message};
use candleview::render::SvgRenderer;
use candleview::session::ConnectionStatus;

const DEFAULT_WIDTH: u32 = 1280;
const DEFAULT_HEIGHT: u32 = 720;

#[derive(Debug)]
struct CliArgs {
    chart_path: PathBuf,
    output_path: PathBuf,
    analysis_path: Option<PathBuf>,
    config_path: Option<PathBuf>,
    png_path: Option<PathBuf>,
    viewport: Viewport,
}

fn main() {
    let _ = candleview::telemetry::init_default_tracing("warn");
    if let Err(err) = run() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), String> {
    let args = parse_args()?;

    let config = match &args.config_path {
        Some(path) => LayoutConfig::from_json_str(&read(path)?).map_err(|e| e.to_string())?,
        None => LayoutConfig::default(),
    };

    let snapshot = match decode_message(&read(&args.chart_path)?).map_err(|e| e.to_string())? {
        ServerMessage::Full(snapshot) => snapshot,
        other => {
            return Err(format!(
                "`{}` is not a full chart payload (decoded {:?})",
                args.chart_path.display(),
                other.kind()
            ));
        }
    };
    let precision = snapshot.precision;
    let series = CandleSeries::from_candles(snapshot.candles).map_err(|e| e.to_string())?;

    let overlay = match &args.analysis_path {
        Some(path) => Some(load_analysis(path)?),
        None => None,
    };

    let mut view =
        ChartView::new(SvgRenderer::new(), config).map_err(|e| e.to_string())?;
    let layout = view
        .render_frame(
            &series,
            overlay.as_ref(),
            args.viewport,
            precision,
            ConnectionStatus::Live,
        )
        .map_err(|e| format!("render failed: {e}"))?;
    let visible = layout.window.count;

    fs::write(&args.output_path, view.renderer().document()).map_err(|err| {
        format!(
            "failed to write `{}`: {err}",
            args.output_path.display()
        )
    })?;
    println!(
        "wrote {} ({} of {} candles visible)",
        args.output_path.display(),
        visible,
        series.len()
    );

    if let Some(png_path) = &args.png_path {
        write_png(png_path, &view, &series, overlay.as_ref(), args.viewport, precision)?;
    }
    Ok(())
}

fn load_analysis(path: &Path) -> Result<AnalysisOverlay, String> {
    match decode_message(&read(path)?).map_err(|e| e.to_string())? {
        ServerMessage::Analysis(overlay) => Ok(overlay),
        other => Err(format!(
            "`{}` is not an analysis payload (decoded {:?})",
            path.display(),
            other.kind()
        )),
    }
}

#[cfg(feature = "cairo-backend")]
fn write_png(
    path: &Path,
    view: &ChartView<SvgRenderer>,
    series: &CandleSeries,
    overlay: Option<&AnalysisOverlay>,
    viewport: Viewport,
    precision: Option<i64>,
) -> Result<(), String> {
    use candleview::render::{CairoRenderer, Renderer};

    let frame = view
        .build_frame(series, overlay, viewport, precision, ConnectionStatus::Live)
        .map_err(|e| e.to_string())?;
    let width = i32::try_from(viewport.width).map_err(|_| "viewport width overflows i32")?;
    let height = i32::try_from(viewport.height).map_err(|_| "viewport height overflows i32")?;
    let mut renderer = CairoRenderer::new(width, height).map_err(|e| e.to_string())?;
    renderer.render(&frame).map_err(|e| e.to_string())?;
    let mut file = fs::File::create(path)
        .map_err(|err| format!("failed to create `{}`: {err}", path.display()))?;
    renderer.write_png(&mut file).map_err(|e| e.to_string())?;
    println!("wrote {}", path.display());
    Ok(())
}

#[cfg(not(feature = "cairo-backend"))]
fn write_png(
    _path: &Path,
    _view: &ChartView<SvgRenderer>,
    _series: &CandleSeries,
    _overlay: Option<&AnalysisOverlay>,
    _viewport: Viewport,
    _precision: Option<i64>,
) -> Result<(), String> {
    Err("--png requires feature `cairo-backend`".to_owned())
}

fn read(path: &Path) -> Result<String, String> {
    fs::read_to_string(path).map_err(|err| format!("failed to read `{}`: {err}", path.display()))
}

fn parse_args() -> Result<CliArgs, String> {
    let mut positional = Vec::new();
    let mut analysis_path = None;
    let mut config_path = None;
    let mut png_path = None;
    let mut width = DEFAULT_WIDTH;
    let mut height = DEFAULT_HEIGHT;

    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--analysis" => {
                let value = args
                    .next()
                    .ok_or_else(|| "missing value for --analysis".to_owned())?;
                analysis_path = Some(PathBuf::from(value));
            }
            "--config" => {
                let value = args
                    .next()
                    .ok_or_else(|| "missing value for --config".to_owned())?;
                config_path = Some(PathBuf::from(value));
            }
            "--png" => {
                let value = args
                    .next()
                    .ok_or_else(|| "missing value for --png".to_owned())?;
                png_path = Some(PathBuf::from(value));
            }
            "--width" => width = parse_dimension(args.next(), "--width")?,
            "--height" => height = parse_dimension(args.next(), "--height")?,
            "--help" | "-h" => {
                println!("{}", usage_message());
                std::process::exit(0);
            }
            other if other.starts_with("--") => {
                return Err(format!("unknown argument `{other}`\n\n{}", usage_message()));
            }
            _ => positional.push(PathBuf::from(&arg)),
        }
    }

    let [chart_path, output_path]: [PathBuf; 2] = positional
        .try_into()
        .map_err(|_| format!("expected <chart.json> <out.svg>\n\n{}", usage_message()))?;

    Ok(CliArgs {
        chart_path,
        output_path,
        analysis_path,
        config_path,
        png_path,
        viewport: Viewport::new(width, height),
    })
}

fn parse_dimension(value: Option<String>, flag: &str) -> Result<u32, String> {
    let value = value.ok_or_else(|| format!("missing value for {flag}"))?;
    match value.parse::<u32>() {
        Ok(parsed) if parsed > 0 => Ok(parsed),
        _ => Err(format!("{flag} expects a positive integer, got `{value}`")),
    }
}

fn usage_message() -> &'static str {
    "usage: chart_svg_snapshot <chart.json> <out.svg> [--analysis <analysis.json>] \
[--config <layout.json>] [--width <px>] [--height <px>] [--png <out.png>]"
}
