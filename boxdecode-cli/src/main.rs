use boxdecode::{Anchor, Decoder, DecoderConfig, FeatureView, Prediction};
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

const SCHEMA_JSON: &str = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/config.schema.json"));
const EXAMPLE_JSON: &str =
    include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/config.example.json"));

#[derive(Parser, Debug)]
#[command(author, version, about = "boxdecode CLI (JSON config driven)")]
struct Cli {
    /// Path to the JSON configuration file.
    #[arg(short, long, value_name = "FILE", default_value = "config.json")]
    config: PathBuf,
    /// Print the JSON schema and exit.
    #[arg(long)]
    print_schema: bool,
    /// Print an example config and exit.
    #[arg(long)]
    print_example: bool,
    /// Enable tracing output for pipeline profiling.
    #[arg(long)]
    trace: bool,
}

#[derive(Debug, Deserialize)]
struct LayerJson {
    /// Raw little-endian f32 tensor dump for one detection scale.
    path: String,
    /// Tensor shape as [anchors, height, width, channels].
    shape: [usize; 4],
    /// Element strides for the same dimensions; row-major when omitted.
    strides: Option<[usize; 4]>,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct DecoderConfigJson {
    anchors: Vec<Vec<[f32; 2]>>,
    grid_scales: Vec<f32>,
    labels: Vec<String>,
    confidence_threshold: f32,
    iou_threshold: f32,
    max_boxes: usize,
    parallel: bool,
}

impl Default for DecoderConfigJson {
    fn default() -> Self {
        let cfg = DecoderConfig::default();
        Self {
            anchors: cfg
                .anchors
                .iter()
                .map(|scale| scale.iter().map(|a| [a.width, a.height]).collect())
                .collect(),
            grid_scales: cfg.grid_scales,
            labels: cfg.labels,
            confidence_threshold: cfg.confidence_threshold,
            iou_threshold: cfg.iou_threshold,
            max_boxes: cfg.max_boxes,
            parallel: cfg.parallel,
        }
    }
}

impl From<DecoderConfigJson> for DecoderConfig {
    fn from(value: DecoderConfigJson) -> Self {
        DecoderConfig {
            anchors: value
                .anchors
                .iter()
                .map(|scale| scale.iter().map(|&[w, h]| Anchor::new(w, h)).collect())
                .collect(),
            grid_scales: value.grid_scales,
            labels: value.labels,
            confidence_threshold: value.confidence_threshold,
            iou_threshold: value.iou_threshold,
            max_boxes: value.max_boxes,
            parallel: value.parallel,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct Config {
    layers: Vec<LayerJson>,
    output_path: Option<String>,
    decoder: DecoderConfigJson,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            layers: Vec::new(),
            output_path: None,
            decoder: DecoderConfigJson::default(),
        }
    }
}

#[derive(Debug, Serialize)]
struct PredictionRecord {
    label: Option<String>,
    class_index: usize,
    score: f32,
    x: f32,
    y: f32,
    width: f32,
    height: f32,
}

impl PredictionRecord {
    fn new(labels: &[String], p: Prediction) -> Self {
        Self {
            label: labels.get(p.class_index).cloned(),
            class_index: p.class_index,
            score: p.score,
            x: p.rect.x,
            y: p.rect.y,
            width: p.rect.width,
            height: p.rect.height,
        }
    }
}

fn read_f32_le(path: &str) -> Result<Vec<f32>, Box<dyn std::error::Error>> {
    let bytes = fs::read(path)?;
    if bytes.len() % 4 != 0 {
        return Err(format!("{path}: byte length {} is not a multiple of 4", bytes.len()).into());
    }
    Ok(bytes
        .chunks_exact(4)
        .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
        .collect())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    if cli.trace {
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::from_default_env().add_directive("boxdecode=info".parse()?),
            )
            .with_target(false)
            .init();
    }

    if cli.print_schema {
        println!("{SCHEMA_JSON}");
        return Ok(());
    }
    if cli.print_example {
        println!("{EXAMPLE_JSON}");
        return Ok(());
    }

    let config_text = fs::read_to_string(&cli.config)?;
    let config: Config = serde_json::from_str(&config_text)?;
    if config.layers.is_empty() {
        return Err("layers must name at least one tensor file".into());
    }

    let decoder = Decoder::new(config.decoder.into())?;

    let mut buffers = Vec::with_capacity(config.layers.len());
    for layer in &config.layers {
        buffers.push(read_f32_le(&layer.path)?);
    }

    let mut views = Vec::with_capacity(config.layers.len());
    for (layer, buffer) in config.layers.iter().zip(&buffers) {
        let view = match layer.strides {
            Some(strides) => FeatureView::new(buffer, layer.shape, strides)?,
            None => FeatureView::from_contiguous(buffer, layer.shape)?,
        };
        views.push(view);
    }

    let predictions = decoder.decode(&views)?;
    tracing::info!(count = predictions.len(), "pipeline finished");

    let labels = &decoder.config().labels;
    let records: Vec<PredictionRecord> = predictions
        .into_iter()
        .map(|p| PredictionRecord::new(labels, p))
        .collect();
    let json = serde_json::to_string_pretty(&records)?;

    match config.output_path {
        Some(path) => fs::write(path, json)?,
        None => println!("{json}"),
    }

    Ok(())
}
