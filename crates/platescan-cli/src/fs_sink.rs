//! Filesystem [`ReportSink`]: CSV matrices, PNG images, JSON records.

use std::path::{Path, PathBuf};

use image::RgbImage;
use platescan::{
    MatrixKind, ReportSink, RunParameters, SinkError, WellRecord, ANNOTATED_ARTIFACT,
    MOSAIC_ARTIFACT,
};

/// Writes report artifacts below one output directory, creating it on demand.
#[derive(Debug)]
pub struct FsSink {
    dir: PathBuf,
    written: Vec<PathBuf>,
}

impl FsSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            written: Vec::new(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Files written so far, in order.
    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }

    fn path_for(&mut self, file_name: &str) -> Result<PathBuf, SinkError> {
        std::fs::create_dir_all(&self.dir)?;
        Ok(self.dir.join(file_name))
    }

    fn write_text(&mut self, file_name: &str, text: &str) -> Result<(), SinkError> {
        let path = self.path_for(file_name)?;
        std::fs::write(&path, text)?;
        self.written.push(path);
        Ok(())
    }

    /// Save an arbitrary image artifact as `<file_stem>.png`.
    pub fn save_png(&mut self, file_stem: &str, image: &RgbImage) -> Result<(), SinkError> {
        let path = self.path_for(&format!("{file_stem}.png"))?;
        image.save(&path)?;
        self.written.push(path);
        Ok(())
    }
}

/// Image artifact name to output file stem.
fn image_file_stem(artifact: &str) -> &str {
    match artifact {
        MOSAIC_ARTIFACT => "result_img",
        ANNOTATED_ARTIFACT => "annotated",
        other => other,
    }
}

pub fn matrix_csv(matrix: &[Vec<f64>]) -> String {
    let mut out = String::new();
    for row in matrix {
        let cells: Vec<String> = row.iter().map(|v| v.to_string()).collect();
        out.push_str(&cells.join(","));
        out.push('\n');
    }
    out
}

/// Per-well table; row and column numbers are 1-based.
pub fn records_csv(records: &[WellRecord]) -> String {
    let mut out = String::from(
        "row,col,raw_gray,gray_diff,concentration,log10_concentration,concentration_display\n",
    );
    for r in records {
        out.push_str(&format!(
            "{},{},{},{},{},{},{}\n",
            r.row + 1,
            r.col + 1,
            r.raw_gray,
            r.gray_diff,
            r.concentration,
            r.log10_concentration,
            r.concentration_display
        ));
    }
    out
}

impl ReportSink for FsSink {
    fn write_parameters(&mut self, params: &RunParameters) -> Result<(), SinkError> {
        let json = serde_json::to_string_pretty(params)?;
        self.write_text("parameters.json", &json)
    }

    fn write_matrix(&mut self, kind: MatrixKind, matrix: &[Vec<f64>]) -> Result<(), SinkError> {
        self.write_text(&format!("matrix_{}.csv", kind.name()), &matrix_csv(matrix))
    }

    fn write_image(&mut self, artifact: &str, image: &RgbImage) -> Result<(), SinkError> {
        self.save_png(image_file_stem(artifact), image)
    }

    fn write_records(&mut self, records: &[WellRecord]) -> Result<(), SinkError> {
        self.write_text("records.csv", &records_csv(records))?;

        let summaries: Vec<_> = records.iter().map(WellRecord::summary).collect();
        let json = serde_json::to_string_pretty(&summaries)?;
        self.write_text("records.json", &json)?;

        for r in records {
            let stem = format!("wells/r{}_c{}", r.row + 1, r.col + 1);
            let path = self.path_for(&format!("{stem}.png"))?;
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            r.sub_image.save(&path)?;
            self.written.push(path);
        }
        Ok(())
    }
}
