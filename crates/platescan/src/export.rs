//! Export collaborator interface.
//!
//! The library never writes files itself. A [`ReportSink`] receives each
//! artifact in turn; its failures are downgraded to [`ExportWarning`]s so the
//! in-memory report stays usable.

use image::RgbImage;

use crate::error::ExportWarning;
use crate::report::{MatrixKind, PlateReport, RunParameters, WellRecord};

/// Error type returned by sink implementations.
pub type SinkError = Box<dyn std::error::Error + Send + Sync>;

/// Artifact names passed to [`ReportSink::write_image`].
pub const MOSAIC_ARTIFACT: &str = "mosaic";
pub const ANNOTATED_ARTIFACT: &str = "annotated";

/// Matrices written by [`export_report`], in order.
pub const EXPORTED_MATRICES: [MatrixKind; 2] = [MatrixKind::RawGray, MatrixKind::Concentration];

/// Destination for report artifacts (files, spreadsheets, network, ...).
pub trait ReportSink {
    fn write_parameters(&mut self, params: &RunParameters) -> Result<(), SinkError>;

    fn write_matrix(&mut self, kind: MatrixKind, matrix: &[Vec<f64>]) -> Result<(), SinkError>;

    fn write_image(&mut self, artifact: &str, image: &RgbImage) -> Result<(), SinkError>;

    fn write_records(&mut self, records: &[WellRecord]) -> Result<(), SinkError>;
}

/// Run `write` and turn a failure into a logged warning.
pub fn try_export(
    artifact: &str,
    write: impl FnOnce() -> Result<(), SinkError>,
) -> Option<ExportWarning> {
    match write() {
        Ok(()) => None,
        Err(e) => {
            tracing::warn!("failed to export {}: {}", artifact, e);
            Some(ExportWarning {
                artifact: artifact.to_string(),
                message: e.to_string(),
            })
        }
    }
}

/// Hand every artifact of `report` to `sink`.
///
/// Each artifact is attempted even if an earlier one failed. Returns the
/// collected warnings; an empty list means everything was written.
pub fn export_report(report: &PlateReport, sink: &mut dyn ReportSink) -> Vec<ExportWarning> {
    let mut warnings = Vec::new();

    let params = report.run_parameters();
    warnings.extend(try_export("parameters", || sink.write_parameters(&params)));

    for kind in EXPORTED_MATRICES {
        let matrix = report.matrix(kind);
        let artifact = format!("matrix_{}", kind.name());
        warnings.extend(try_export(&artifact, || sink.write_matrix(kind, &matrix)));
    }

    warnings.extend(try_export(MOSAIC_ARTIFACT, || {
        sink.write_image(MOSAIC_ARTIFACT, &report.mosaic)
    }));
    warnings.extend(try_export(ANNOTATED_ARTIFACT, || {
        sink.write_image(ANNOTATED_ARTIFACT, &report.annotated)
    }));
    warnings.extend(try_export("records", || sink.write_records(&report.records)));

    if warnings.is_empty() {
        tracing::debug!("exported report for {} wells", report.records.len());
    } else {
        tracing::warn!("{} artifacts failed to export", warnings.len());
    }
    warnings
}
