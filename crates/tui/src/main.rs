mod renderer;

use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use pose_overlay_core::{
    CommandLog, ManualClock, MediaSnapshot, OverlayConfig, PoseOverlay, Trigger, parse_pose_data,
    svg::render_svg,
};
use pose_overlay_protocol::{PoseFrame, Size};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

const USAGE: &str =
    "Usage: pose-overlay <pose.json> [--config <file>] [--video <W>x<H>] [--svg <seconds>]";

/// Portrait phone capture, the common case for uploaded clips.
const DEFAULT_VIDEO: Size = Size {
    width: 1080.0,
    height: 1920.0,
};

struct Args {
    pose_path: PathBuf,
    config_path: Option<PathBuf>,
    video: Size,
    svg_at: Option<f64>,
}

fn parse_args(mut args: impl Iterator<Item = String>) -> Result<Args> {
    let mut pose_path = None;
    let mut config_path = None;
    let mut video = DEFAULT_VIDEO;
    let mut svg_at = None;

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" => {
                let value = args.next().context("--config needs a file")?;
                config_path = Some(PathBuf::from(value));
            }
            "--video" => {
                let value = args.next().context("--video needs <W>x<H>")?;
                video = parse_video_size(&value)?;
            }
            "--svg" => {
                let value = args.next().context("--svg needs a time in seconds")?;
                let t: f64 = value
                    .parse()
                    .with_context(|| format!("invalid --svg time: {value}"))?;
                svg_at = Some(t);
            }
            flag if flag.starts_with("--") => bail!("unknown option {flag}\n{USAGE}"),
            path if pose_path.is_none() => pose_path = Some(PathBuf::from(path)),
            extra => bail!("unexpected argument {extra}\n{USAGE}"),
        }
    }

    Ok(Args {
        pose_path: pose_path.context(USAGE)?,
        config_path,
        video,
        svg_at,
    })
}

fn parse_video_size(value: &str) -> Result<Size> {
    let (w, h) = value
        .split_once('x')
        .with_context(|| format!("video size must look like 1080x1920, got {value}"))?;
    let size = Size::new(w.trim().parse()?, h.trim().parse()?);
    if !size.is_drawable() {
        bail!("video size must be positive, got {value}");
    }
    Ok(size)
}

/// Clip length as seen by the selector: the last sample's timestamp.
fn clip_duration(frames: &[PoseFrame]) -> Option<f64> {
    frames
        .last()
        .map(|f| f.timestamp)
        .filter(|t| t.is_finite() && *t > 0.0)
}

fn export_svg(frames: Vec<PoseFrame>, config: &OverlayConfig, video: Size, t: f64) -> Result<()> {
    let duration = clip_duration(&frames);
    let mut overlay = PoseOverlay::with_config(frames, config, ManualClock::new())?;
    let media = MediaSnapshot {
        current_time: t,
        duration,
        intrinsic_size: Some(video),
    };

    let mut log = CommandLog::default();
    if let Some(ticket) = overlay.notify(Trigger::MetadataReady) {
        overlay.on_frame(ticket, &media, video, &mut log);
    }
    let commands = log.last().unwrap_or_default();
    let svg = render_svg(commands, video, &config.style.palette);

    let mut out = std::io::stdout().lock();
    out.write_all(svg.as_bytes())?;
    out.write_all(b"\n")?;
    Ok(())
}

fn main() -> Result<()> {
    // Logs go to stderr so they never mix with SVG output or the TUI.
    if std::env::var_os("RUST_LOG").is_some() {
        tracing_subscriber::registry()
            .with(EnvFilter::from_default_env())
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }

    let args = parse_args(std::env::args().skip(1))?;
    let data = std::fs::read(&args.pose_path)
        .with_context(|| format!("reading {}", args.pose_path.display()))?;
    let frames = parse_pose_data(&data)?;
    tracing::info!(path = %args.pose_path.display(), frames = frames.len(), "loaded pose data");
    let config = match &args.config_path {
        Some(path) => OverlayConfig::load(path)?,
        None => OverlayConfig::default(),
    };

    match args.svg_at {
        Some(t) => export_svg(frames, &config, args.video, t),
        None => {
            let duration = clip_duration(&frames).unwrap_or(0.0);
            renderer::play(frames, &config, args.video, duration)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pose_overlay_protocol::Landmarks;

    fn args(list: &[&str]) -> Result<Args> {
        parse_args(list.iter().map(ToString::to_string))
    }

    #[test]
    fn parses_all_options() {
        let parsed = args(&["pose.json", "--video", "1920x1080", "--svg", "1.5"]).unwrap();
        assert_eq!(parsed.pose_path, PathBuf::from("pose.json"));
        assert_eq!(parsed.video, Size::new(1920.0, 1080.0));
        assert_eq!(parsed.svg_at, Some(1.5));
        assert!(parsed.config_path.is_none());
    }

    #[test]
    fn requires_a_pose_file() {
        assert!(args(&["--svg", "1"]).is_err());
    }

    #[test]
    fn rejects_degenerate_video_size() {
        assert!(args(&["pose.json", "--video", "0x1080"]).is_err());
        assert!(args(&["pose.json", "--video", "wide"]).is_err());
    }

    #[test]
    fn duration_comes_from_last_sample() {
        let frames = vec![
            PoseFrame::new(0, 0.0, Landmarks::default()),
            PoseFrame::new(30, 2.5, Landmarks::default()),
        ];
        assert_eq!(clip_duration(&frames), Some(2.5));
        assert_eq!(clip_duration(&frames[..1]), None);
    }
}
