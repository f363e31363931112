use std::fs;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::{Duration, Instant};

use candleview::client::{ChartClient, ClientConfig};
use candleview::render::SvgRenderer;
use candleview::transport::WsTransport;

const POLL_WAIT: Duration = Duration::from_millis(250);

#[derive(Debug)]
struct CliArgs {
    config: ClientConfig,
    output_path: PathBuf,
    max_frames: Option<usize>,
}

fn main() {
    let _ = candleview::telemetry::init_default_tracing("info");
    if let Err(err) = run() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), String> {
    let args = parse_args()?;
    let transport = WsTransport::new(args.config.server_url.clone());
    let mut client =
        ChartClient::new(transport, SvgRenderer::new(), &args.config).map_err(|e| e.to_string())?;

    let mut frames_written = 0usize;
    loop {
        let now = Instant::now();
        let report = client.step(now, POLL_WAIT).map_err(|e| e.to_string())?;

        if report.rendered {
            write_document(&args.output_path, client.view().renderer().document())?;
            frames_written += 1;
            if args.max_frames.is_some_and(|max| frames_written >= max) {
                return Ok(());
            }
        }

        if let Some(at) = report.reconnect_at {
            thread::sleep(at.saturating_duration_since(Instant::now()).min(POLL_WAIT));
        }
    }
}

fn write_document(path: &Path, document: &str) -> Result<(), String> {
    // Write-then-rename so viewers never see a half-written file.
    let tmp = path.with_extension("svg.tmp");
    fs::write(&tmp, document)
        .map_err(|err| format!("failed to write `{}`: {err}", tmp.display()))?;
    fs::rename(&tmp, path).map_err(|err| format!("failed to replace `{}`: {err}", path.display()))
}

fn parse_args() -> Result<CliArgs, String> {
    let mut positional = Vec::new();
    let mut config_path = None;
    let mut max_frames = None;

    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" => {
                let value = args
                    .next()
                    .ok_or_else(|| "missing value for --config".to_owned())?;
                config_path = Some(PathBuf::from(value));
            }
            "--frames" => {
                let value = args
                    .next()
                    .ok_or_else(|| "missing value for --frames".to_owned())?;
                max_frames = Some(
                    value
                        .parse::<usize>()
                        .map_err(|_| format!("--frames expects an integer, got `{value}`"))?,
                );
            }
            "--help" | "-h" => {
                println!("{}", usage_message());
                std::process::exit(0);
            }
            other if other.starts_with("--") => {
                return Err(format!("unknown argument `{other}`\n\n{}", usage_message()));
            }
            _ => positional.push(arg.clone()),
        }
    }

    let [server_url, symbol, output]: [String; 3] = positional.try_into().map_err(|_| {
        format!(
            "expected <ws-url> <EXCHANGE:SECURITY> <out.svg>\n\n{}",
            usage_message()
        )
    })?;

    let config = match config_path {
        Some(path) => {
            let raw = fs::read_to_string(&path)
                .map_err(|err| format!("failed to read `{}`: {err}", path.display()))?;
            let mut config = ClientConfig::from_json_str(&raw).map_err(|e| e.to_string())?;
            config.server_url = server_url;
            config.symbol = symbol;
            config
        }
        None => ClientConfig::new(server_url, symbol),
    };
    config.validate().map_err(|e| e.to_string())?;

    Ok(CliArgs {
        config,
        output_path: PathBuf::from(output),
        max_frames,
    })
}

fn usage_message() -> &'static str {
    "usage: live_svg_client <ws-url> <EXCHANGE:SECURITY> <out.svg> [--config <client.json>] \
[--frames <n>]"
}
