use image::ImageReader;
use platescan::{guess_grid_from_filename, AnalysisConfig, Analyzer, MatrixKind};
use std::error::Error;
use std::path::Path;

fn main() -> Result<(), Box<dyn Error>> {
    let args: Vec<String> = std::env::args().collect();
    if args.len() < 2 {
        eprintln!("Usage: {} <plate.png> [curve] [out.json]", args[0]);
        std::process::exit(2);
    }

    let path = Path::new(&args[1]);
    let mut config = AnalysisConfig::default();
    if let Some((rows, cols)) = guess_grid_from_filename(path) {
        config.plate.rows = rows;
        config.plate.cols = cols;
    }
    if let Some(curve) = args.get(2) {
        config.calibration = curve.clone();
    }

    let image = ImageReader::open(path)?.decode()?.to_rgb8();
    let analyzer = Analyzer::new(config)?;
    let report = analyzer.analyze(&image)?;

    println!("{}", analyzer.curve().expression());
    for row in report.matrix(MatrixKind::Concentration) {
        let cells: Vec<String> = row.iter().map(|c| format!("{c:>10.3e}")).collect();
        println!("{}", cells.join(" "));
    }

    if let Some(out_path) = args.get(3) {
        let json = serde_json::to_string_pretty(&report.summaries())?;
        std::fs::write(out_path, json)?;
        println!("Wrote {out_path}");
    }
    Ok(())
}
