// Example runner for the `perimetry_vision` library: decodes one chart
// (unilateral) or two charts (bilateral, right eye first), writes the heatmaps
// and prints the incapacity report.

use anyhow::{Context, bail};
use perimetry_vision::core_modules::utils::image_helper::image_helper;
use perimetry_vision::parallel_pipeline::evaluate_bilateral;
use perimetry_vision::pipeline::{AnalysisResult, Eye};
use perimetry_vision::{PipelineConfig, VisionError, VisualFieldPipeline};
use std::path::{Path, PathBuf};
use std::sync::Arc;

struct Args {
    charts: Vec<PathBuf>,
    out_dir: PathBuf,
    config: Option<PathBuf>,
}

fn parse_args() -> anyhow::Result<Args> {
    let mut charts = Vec::new();
    let mut out_dir = PathBuf::from(".");
    let mut config = None;

    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--out" => out_dir = args.next().context("--out needs a directory")?.into(),
            "--config" => config = Some(args.next().context("--config needs a file")?.into()),
            _ => charts.push(PathBuf::from(arg)),
        }
    }

    if charts.is_empty() || charts.len() > 2 {
        bail!("Usage: perimetry_vision <right_eye_chart> [left_eye_chart] [--out DIR] [--config FILE]");
    }
    Ok(Args {
        charts,
        out_dir,
        config,
    })
}

fn write_heatmap(out_dir: &Path, eye: Eye, result: &AnalysisResult) -> anyhow::Result<()> {
    if let Some(annotated) = &result.annotated_image {
        let path = out_dir.join(format!("heatmap_{}.png", eye.abbreviation().to_lowercase()));
        image_helper::save_png(&path, annotated)?;
        println!("Heatmap saved to {}", path.display());
    }
    Ok(())
}

fn print_eye(eye: Eye, result: &AnalysisResult) {
    println!("Eye {}", eye.abbreviation());
    println!("  Degrees not seen: {}° / 320°", result.total_degrees_lost());
    println!("  Incapacity {}: {:.2}%", eye.abbreviation(), result.incapacity_pct());
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    run().await.inspect_err(|e| {
        if let Some(vision) = e.downcast_ref::<VisionError>() {
            eprintln!("{}", vision.user_message());
        }
    })
}

async fn run() -> anyhow::Result<()> {
    let args = parse_args()?;
    let config = match &args.config {
        Some(path) => PipelineConfig::from_json_file(path)?,
        None => PipelineConfig::default(),
    };
    let pipeline = Arc::new(VisualFieldPipeline::new(config)?);

    let mut rasters = Vec::with_capacity(args.charts.len());
    for path in &args.charts {
        let raster = image_helper::load_raster(path)
            .with_context(|| format!("reading {}", path.display()))?;
        rasters.push(raster);
    }

    if rasters.len() == 1 {
        let raster = rasters.remove(0);
        let result = pipeline.analyze(&raster)?;
        write_heatmap(&args.out_dir, Eye::Right, &result)?;

        print_eye(Eye::Right, &result);
        println!("Total work incapacity (OD): {:.2}%", result.incapacity_pct());
        return Ok(());
    }

    let left = rasters.remove(1);
    let right = rasters.remove(0);
    let report = evaluate_bilateral(pipeline, right, left).await?;

    for eye_report in [&report.right, &report.left] {
        write_heatmap(&args.out_dir, eye_report.eye, &eye_report.result)?;
        print_eye(eye_report.eye, &eye_report.result);
    }
    println!("Arithmetic sum: {:.2}%", report.score.arithmetic_sum);
    println!("Bilaterality index applied: x {}", report.score.bilaterality_index);
    println!("Total work incapacity (bilateral): {:.2}%", report.score.combined);
    Ok(())
}
