//! platescan CLI: command-line interface for microwell plate quantification.

mod fs_sink;

use clap::{Args, Parser, Subcommand};
use platescan::{
    guess_grid_from_filename, try_export, AnalysisConfig, Analyzer, CalibrationCatalog,
    CalibrationCurve, ConcentrationEstimator, ExportWarning, PlateReport,
};
use std::path::{Path, PathBuf};

use crate::fs_sink::FsSink;

type CliError = Box<dyn std::error::Error>;
type CliResult<T> = Result<T, CliError>;

#[derive(Parser)]
#[command(name = "platescan")]
#[command(about = "Estimate analyte concentrations from a photographed microwell plate")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze a plate image and write the report artifacts.
    Analyze(CliAnalyzeArgs),

    /// List built-in calibration curves with their fitted polynomials.
    Curves,

    /// Evaluate one calibration curve at a gray difference.
    Eval {
        /// Calibration curve name.
        #[arg(long)]
        curve: String,

        /// Gray difference relative to the reference well.
        #[arg(long)]
        gray_diff: f64,

        /// Significant digits for the display form.
        #[arg(long, default_value = "4")]
        precision: usize,
    },
}

#[derive(Debug, Clone, Default, Args)]
struct CliAnalyzeArgs {
    /// Path to the plate image.
    #[arg(long)]
    image: PathBuf,

    /// Output directory (default: outputs/<YYYYmmdd-HHMMSS>).
    #[arg(long)]
    out_dir: Option<PathBuf>,

    /// Analysis configuration JSON; flags below override it.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Number of well rows.
    #[arg(long)]
    rows: Option<usize>,

    /// Number of well columns.
    #[arg(long)]
    cols: Option<usize>,

    /// Sampling radius as a fraction of the cell size, in (0, 1].
    #[arg(long)]
    radius: Option<f64>,

    /// Significant digits kept for gray values.
    #[arg(long)]
    precision: Option<usize>,

    /// Calibration curve name.
    #[arg(long)]
    curve: Option<String>,

    /// Take rows and columns from an `<rows>x<cols>` token in the image file name.
    #[arg(long)]
    guess_grid: bool,
}

impl CliAnalyzeArgs {
    /// Config file (or defaults), then file-name guess, then explicit flags.
    fn to_config(&self) -> CliResult<AnalysisConfig> {
        let mut config = match &self.config {
            Some(path) => AnalysisConfig::from_json_file(path)?,
            None => AnalysisConfig::default(),
        };

        if self.guess_grid {
            match guess_grid_from_filename(&self.image) {
                Some((rows, cols)) => {
                    tracing::info!("Grid guessed from file name: {}x{}", rows, cols);
                    config.plate.rows = rows;
                    config.plate.cols = cols;
                }
                None => tracing::warn!(
                    "--guess-grid: no <rows>x<cols> token in {}",
                    self.image.display()
                ),
            }
        }

        if let Some(rows) = self.rows {
            config.plate.rows = rows;
        }
        if let Some(cols) = self.cols {
            config.plate.cols = cols;
        }
        if let Some(radius) = self.radius {
            config.plate.radius_fraction = radius;
        }
        if let Some(precision) = self.precision {
            config.plate.precision = precision;
        }
        if let Some(curve) = &self.curve {
            config.calibration = curve.clone();
        }
        Ok(config)
    }
}

fn main() -> CliResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Analyze(args) => run_analyze(&args),

        Commands::Curves => run_curves(),

        Commands::Eval {
            curve,
            gray_diff,
            precision,
        } => run_eval(&curve, gray_diff, precision),
    }
}

// ── curves ─────────────────────────────────────────────────────────────

fn run_curves() -> CliResult<()> {
    let catalog = CalibrationCatalog::builtin();
    for name in catalog.names() {
        let curve = catalog.select(name)?;
        println!("{name}");
        println!("  points: {:?}", curve.x_points());
        println!("  {}", curve.expression());
    }
    Ok(())
}

// ── eval ───────────────────────────────────────────────────────────────

fn run_eval(curve_name: &str, gray_diff: f64, precision: usize) -> CliResult<()> {
    if precision == 0 {
        return Err("--precision must be >= 1".into());
    }
    let curve = CalibrationCatalog::builtin().select(curve_name)?;
    for line in eval_report(&curve, gray_diff, precision) {
        println!("{line}");
    }
    Ok(())
}

fn eval_report(curve: &CalibrationCurve, gray_diff: f64, precision: usize) -> Vec<String> {
    let c = ConcentrationEstimator::new(curve, precision).estimate(gray_diff);
    vec![
        format!("curve:          {}", curve.name()),
        format!("gray diff:      {gray_diff}"),
        format!("log10(P(x)):    {}", c.log10),
        format!("concentration:  {}", c.value),
        format!("display:        {}", c.display),
    ]
}

// ── analyze ────────────────────────────────────────────────────────────

fn default_out_dir() -> PathBuf {
    let stamp = chrono::Local::now().format("%Y%m%d-%H%M%S").to_string();
    Path::new("outputs").join(stamp)
}

fn run_analyze(args: &CliAnalyzeArgs) -> CliResult<()> {
    tracing::info!("Loading image: {}", args.image.display());

    let img = image::open(&args.image).map_err(|e| -> CliError {
        format!("Failed to open image {}: {}", args.image.display(), e).into()
    })?;
    let rgb = img.to_rgb8();
    let (w, h) = rgb.dimensions();
    tracing::info!("Image size: {}x{}", w, h);

    let config = args.to_config()?;
    let analyzer = Analyzer::new(config)?;
    tracing::info!("Calibration {}: {}", analyzer.curve().name(), analyzer.curve().expression());

    let report = analyzer.analyze(&rgb)?;

    let out_dir = args.out_dir.clone().unwrap_or_else(default_out_dir);
    let mut sink = FsSink::new(out_dir);
    let warnings = export_all(&report, &rgb, &mut sink);

    for w in &warnings {
        eprintln!("warning: {w}");
    }
    tracing::info!(
        "Wrote {} files to {} ({} warnings)",
        sink.written().len(),
        sink.dir().display(),
        warnings.len()
    );
    Ok(())
}

/// Export the report plus the untouched input image.
fn export_all(
    report: &PlateReport,
    original: &image::RgbImage,
    sink: &mut FsSink,
) -> Vec<ExportWarning> {
    let mut warnings = Vec::new();
    warnings.extend(try_export("origin_img", || sink.save_png("origin_img", original)));
    warnings.extend(platescan::export_report(report, sink));
    warnings
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    fn plate_image() -> RgbImage {
        let mut img = RgbImage::from_pixel(600, 400, Rgb([200, 200, 200]));
        for y in 130..170 {
            for x in 30..70 {
                img.put_pixel(x, y, Rgb([170, 170, 170]));
            }
        }
        img
    }

    #[test]
    fn eval_report_matches_library_estimate() {
        let curve = CalibrationCatalog::builtin().select("miR-223").unwrap();
        let expected = ConcentrationEstimator::new(&curve, 3).estimate(30.0);
        let lines = eval_report(&curve, 30.0, 3);
        assert_eq!(lines[0], "curve:          miR-223");
        assert_eq!(lines[2], format!("log10(P(x)):    {}", expected.log10));
        assert_eq!(lines[3], format!("concentration:  {}", expected.value));
        assert_eq!(lines[4], "display:        4.8*10^2");

        let zero = eval_report(&curve, 0.0, 3);
        assert_eq!(zero[2], "log10(P(x)):    0");
        assert_eq!(zero[4], "display:        0");
    }

    #[test]
    fn flags_override_config_file_and_guess() {
        let dir = tempfile::tempdir().unwrap();
        let cfg_path = dir.path().join("cfg.json");
        std::fs::write(
            &cfg_path,
            r#"{ "plate": { "rows": 2, "cols": 3, "radius_fraction": 0.3, "precision": 3 }, "calibration": "miR-935" }"#,
        )
        .unwrap();

        let args = CliAnalyzeArgs {
            image: PathBuf::from("plate_8x12.png"),
            config: Some(cfg_path),
            cols: Some(10),
            guess_grid: true,
            ..Default::default()
        };
        let config = args.to_config().unwrap();
        assert_eq!(config.plate.rows, 8);
        assert_eq!(config.plate.cols, 10);
        assert_eq!(config.plate.radius_fraction, 0.3);
        assert_eq!(config.plate.precision, 3);
        assert_eq!(config.calibration, "miR-935");
    }

    #[test]
    fn export_writes_every_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let img = plate_image();
        let report = Analyzer::new(AnalysisConfig::default())
            .unwrap()
            .analyze(&img)
            .unwrap();

        let mut sink = FsSink::new(dir.path().join("run"));
        let warnings = export_all(&report, &img, &mut sink);
        assert!(warnings.is_empty(), "{warnings:?}");

        let out = dir.path().join("run");
        for name in [
            "origin_img.png",
            "result_img.png",
            "annotated.png",
            "matrix_gray.csv",
            "matrix_concentration.csv",
            "records.csv",
            "records.json",
            "parameters.json",
            "wells/r2_c1.png",
        ] {
            assert!(out.join(name).is_file(), "missing {name}");
        }

        let gray = std::fs::read_to_string(out.join("matrix_gray.csv")).unwrap();
        assert_eq!(gray.lines().count(), 4);
        assert!(gray.lines().nth(1).unwrap().starts_with("170,200,"));

        let records = std::fs::read_to_string(out.join("records.csv")).unwrap();
        assert_eq!(records.lines().count(), 25);
        assert!(records.lines().nth(7).unwrap().starts_with("2,1,170,30,"));

        let mosaic = image::open(out.join("result_img.png")).unwrap();
        assert_eq!((mosaic.width(), mosaic.height()), (240, 160));
    }

    #[test]
    fn unwritable_directory_yields_warnings_not_errors() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("blocked");
        std::fs::write(&blocker, b"not a directory").unwrap();

        let img = plate_image();
        let report = Analyzer::new(AnalysisConfig::default())
            .unwrap()
            .analyze(&img)
            .unwrap();
        let mut sink = FsSink::new(&blocker);
        let warnings = export_all(&report, &img, &mut sink);
        assert!(!warnings.is_empty());
        assert!(sink.written().is_empty());
        assert_eq!(report.records.len(), 24);
    }
}
