//! Analyse one recording from the command line and print the report.
//!
//! Usage: `engagelens-analyze <video> [--json] [--stride N] [--policy P]`
//!
//! `--stride` and `--policy` override `ANALYSIS_FRAME_STRIDE` and
//! `ANALYSIS_NOD_MATCH_POLICY`.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context};
use engagelens_api::{build_analyzer, logging};
use engagelens_media::{
    check_ffmpeg, check_ffprobe, render_text_report, AnalysisConfig, NodMatchPolicy,
};
use engagelens_ml_client::MlClient;
use tracing::info;

const USAGE: &str = "usage: engagelens-analyze <video> [--json] [--stride N] [--policy first-match|last-match|max-boost]";

struct Args {
    video: PathBuf,
    json: bool,
    stride: Option<u32>,
    policy: Option<NodMatchPolicy>,
}

fn parse_args() -> anyhow::Result<Args> {
    let mut video = None;
    let mut json = false;
    let mut stride = None;
    let mut policy = None;

    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--json" => json = true,
            "--stride" => {
                let value = args.next().context("--stride needs a value")?;
                stride = Some(
                    value
                        .parse()
                        .with_context(|| format!("invalid stride: {}", value))?,
                );
            }
            "--policy" => {
                let value = args.next().context("--policy needs a value")?;
                policy = Some(value.parse().map_err(anyhow::Error::msg)?);
            }
            "-h" | "--help" => bail!(USAGE),
            _ if video.is_none() => video = Some(PathBuf::from(arg)),
            _ => bail!("unexpected argument: {}", arg),
        }
    }

    let video = video.context(USAGE)?;
    Ok(Args {
        video,
        json,
        stride,
        policy,
    })
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    logging::init_tracing();

    let args = parse_args()?;
    check_ffmpeg()?;
    check_ffprobe()?;

    let ml = Arc::new(MlClient::from_env().context("Failed to create inference client")?);
    let mut config = AnalysisConfig::from_env();
    if let Some(stride) = args.stride {
        config = config.with_frame_stride(stride);
    }
    if let Some(policy) = args.policy {
        config = config.with_nod_match_policy(policy);
    }

    let analyzer = build_analyzer(ml, config);
    info!(
        video = %args.video.display(),
        stride = analyzer.config().frame_stride,
        policy = %analyzer.config().nod_match_policy,
        "Analysing recording"
    );

    let report = analyzer
        .analyze(&args.video)
        .await
        .with_context(|| format!("Error processing {}", args.video.display()))?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", render_text_report(&report)?);
    }

    Ok(())
}
