//! Plate grid partitioning.
//!
//! The image is split into `rows x cols` equal cells using floor division.
//! Remainder pixels on the bottom and right edges belong to no cell and are
//! never sampled.

use crate::config::PlateConfig;
use crate::error::{AnalysisError, Result};

/// Axis-aligned pixel rectangle with exclusive `bottom`/`right` edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct SampleRect {
    pub top: u32,
    pub left: u32,
    pub bottom: u32,
    pub right: u32,
}

impl SampleRect {
    pub fn width(&self) -> u32 {
        self.right.saturating_sub(self.left)
    }

    pub fn height(&self) -> u32 {
        self.bottom.saturating_sub(self.top)
    }

    pub fn is_empty(&self) -> bool {
        self.width() == 0 || self.height() == 0
    }
}

/// Signed rectangle in image coordinates; may extend past the image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct BoxRect {
    pub x0: i32,
    pub y0: i32,
    pub x1: i32,
    pub y1: i32,
}

impl BoxRect {
    pub fn width(&self) -> i32 {
        self.x1 - self.x0
    }

    pub fn height(&self) -> i32 {
        self.y1 - self.y0
    }
}

/// Geometry of one well.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct WellBox {
    pub row: usize,
    pub col: usize,
    pub center_x: u32,
    pub center_y: u32,
    pub radius_px: u32,
    /// Region cropped for sampling, clamped to the image.
    pub sample_rect: SampleRect,
    /// `sub_w x sub_h` box centered on the well, used for the overlay.
    pub annotation_rect: BoxRect,
}

/// Result of partitioning one image.
#[derive(Debug, Clone, PartialEq)]
pub struct PlateGrid {
    /// Image dimensions `[width, height]`.
    pub image_size: [u32; 2],
    pub rows: usize,
    pub cols: usize,
    pub row_height: u32,
    pub col_width: u32,
    /// Uniform sub-image size `[sub_w, sub_h]` shared by every well.
    pub sub_size: [u32; 2],
    /// Wells in row-major order.
    pub wells: Vec<WellBox>,
}

impl PlateGrid {
    /// Partition a `width x height` image according to `config`.
    pub fn partition(width: u32, height: u32, config: &PlateConfig) -> Result<Self> {
        config.validate()?;

        let rows = u32::try_from(config.rows)
            .map_err(|_| AnalysisError::config("rows", "does not fit the image coordinate range"))?;
        let cols = u32::try_from(config.cols)
            .map_err(|_| AnalysisError::config("cols", "does not fit the image coordinate range"))?;

        let row_height = height / rows;
        let col_width = width / cols;
        let r = config.radius_fraction;

        let sub_w = (col_width as f64 * 2.0 * r).floor() as u32;
        let sub_h = (row_height as f64 * 2.0 * r).floor() as u32;
        if sub_w == 0 || sub_h == 0 {
            return Err(AnalysisError::config(
                "radius_fraction",
                format!(
                    "yields an empty {sub_w}x{sub_h} sub-image for {width}x{height} px and {}x{} wells",
                    config.rows, config.cols
                ),
            ));
        }

        let radius_px = (row_height.min(col_width) as f64 * r).floor() as u32;

        let mut wells = Vec::with_capacity(config.n_wells());
        for i in 0..rows {
            for j in 0..cols {
                let center_x = j * col_width + col_width / 2;
                let center_y = i * row_height + row_height / 2;
                let sample_rect = SampleRect {
                    top: center_y.saturating_sub(radius_px),
                    left: center_x.saturating_sub(radius_px),
                    bottom: (center_y + radius_px).min(height),
                    right: (center_x + radius_px).min(width),
                };
                wells.push(WellBox {
                    row: i as usize,
                    col: j as usize,
                    center_x,
                    center_y,
                    radius_px,
                    sample_rect,
                    annotation_rect: annotation_rect(center_x, center_y, sub_w, sub_h),
                });
            }
        }

        tracing::debug!(
            "partitioned {}x{} px into {}x{} wells: cell {}x{} px, radius {} px, sub-image {}x{} px",
            width,
            height,
            config.rows,
            config.cols,
            col_width,
            row_height,
            radius_px,
            sub_w,
            sub_h,
        );

        Ok(Self {
            image_size: [width, height],
            rows: config.rows,
            cols: config.cols,
            row_height,
            col_width,
            sub_size: [sub_w, sub_h],
            wells,
        })
    }

    pub fn n_wells(&self) -> usize {
        self.wells.len()
    }

    /// Well at `(row, col)`, if inside the grid.
    pub fn well(&self, row: usize, col: usize) -> Option<&WellBox> {
        if row >= self.rows || col >= self.cols {
            return None;
        }
        self.wells.get(row * self.cols + col)
    }

    /// Y coordinates of the interior horizontal grid lines.
    pub fn horizontal_lines(&self) -> impl Iterator<Item = u32> + '_ {
        (1..self.rows as u32).map(move |i| i * self.row_height)
    }

    /// X coordinates of the interior vertical grid lines.
    pub fn vertical_lines(&self) -> impl Iterator<Item = u32> + '_ {
        (1..self.cols as u32).map(move |j| j * self.col_width)
    }

    /// Mosaic dimensions `[width, height]`.
    pub fn mosaic_size(&self) -> [u32; 2] {
        [
            self.sub_size[0] * self.cols as u32,
            self.sub_size[1] * self.rows as u32,
        ]
    }
}

fn annotation_rect(center_x: u32, center_y: u32, sub_w: u32, sub_h: u32) -> BoxRect {
    // `as i32` truncates toward zero, matching integer conversion of the
    // half-size offsets on either side.
    let cx = center_x as f64;
    let cy = center_y as f64;
    let half_w = sub_w as f64 / 2.0;
    let half_h = sub_h as f64 / 2.0;
    BoxRect {
        x0: (cx - half_w) as i32,
        y0: (cy - half_h) as i32,
        x1: (cx + half_w) as i32,
        y1: (cy + half_h) as i32,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partition_4x6_on_600x400() {
        let grid = PlateGrid::partition(600, 400, &PlateConfig::new(4, 6, 0.2, 4)).unwrap();
        assert_eq!(grid.n_wells(), 24);
        assert_eq!(grid.row_height, 100);
        assert_eq!(grid.col_width, 100);
        assert_eq!(grid.sub_size, [40, 40]);

        let w = grid.well(1, 2).unwrap();
        assert_eq!((w.row, w.col), (1, 2));
        assert_eq!((w.center_x, w.center_y), (250, 150));
        assert_eq!(w.radius_px, 20);
        assert_eq!(
            w.sample_rect,
            SampleRect {
                top: 130,
                left: 230,
                bottom: 170,
                right: 270
            }
        );
        assert_eq!(
            w.annotation_rect,
            BoxRect {
                x0: 230,
                y0: 130,
                x1: 270,
                y1: 170
            }
        );
    }

    #[test]
    fn wells_are_row_major() {
        let grid = PlateGrid::partition(300, 200, &PlateConfig::new(2, 3, 0.3, 3)).unwrap();
        let order: Vec<(usize, usize)> = grid.wells.iter().map(|w| (w.row, w.col)).collect();
        assert_eq!(order, vec![(0, 0), (0, 1), (0, 2), (1, 0), (1, 1), (1, 2)]);
    }

    #[test]
    fn remainder_pixels_are_excluded() {
        let grid = PlateGrid::partition(605, 403, &PlateConfig::new(4, 6, 0.2, 4)).unwrap();
        assert_eq!(grid.row_height, 100);
        assert_eq!(grid.col_width, 100);
        let last = grid.wells.last().unwrap();
        assert!(last.sample_rect.bottom <= 400);
        assert!(last.sample_rect.right <= 600);
    }

    #[test]
    fn sample_rects_stay_in_bounds_for_many_configs() {
        for &(w, h) in &[(600u32, 400u32), (97, 61), (1024, 768), (31, 17)] {
            for rows in 1..=8usize {
                for cols in 1..=12usize {
                    for &r in &[0.05, 0.2, 0.5, 0.75, 1.0] {
                        let cfg = PlateConfig::new(rows, cols, r, 3);
                        let Ok(grid) = PlateGrid::partition(w, h, &cfg) else {
                            continue;
                        };
                        assert_eq!(grid.n_wells(), rows * cols);
                        for well in &grid.wells {
                            let rect = well.sample_rect;
                            assert!(rect.top <= rect.bottom && rect.bottom <= h);
                            assert!(rect.left <= rect.right && rect.right <= w);
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn full_radius_is_clamped_at_image_edges() {
        let grid = PlateGrid::partition(100, 100, &PlateConfig::new(1, 1, 1.0, 3)).unwrap();
        let w = &grid.wells[0];
        assert_eq!(w.radius_px, 100);
        assert_eq!(
            w.sample_rect,
            SampleRect {
                top: 0,
                left: 0,
                bottom: 100,
                right: 100
            }
        );
        assert_eq!(grid.sub_size, [200, 200]);
        assert_eq!(w.annotation_rect.x0, -50);
    }

    #[test]
    fn empty_sub_image_is_config_error() {
        let err = PlateGrid::partition(10, 10, &PlateConfig::new(4, 6, 0.1, 3)).unwrap_err();
        assert!(matches!(err, AnalysisError::Config { .. }));
    }

    #[test]
    fn more_rows_than_pixels_is_config_error() {
        let err = PlateGrid::partition(100, 3, &PlateConfig::new(4, 1, 0.5, 3)).unwrap_err();
        assert!(matches!(err, AnalysisError::Config { .. }));
    }

    #[test]
    fn grid_lines_and_mosaic_size() {
        let grid = PlateGrid::partition(600, 400, &PlateConfig::new(4, 6, 0.2, 4)).unwrap();
        assert_eq!(grid.horizontal_lines().collect::<Vec<_>>(), vec![100, 200, 300]);
        assert_eq!(
            grid.vertical_lines().collect::<Vec<_>>(),
            vec![100, 200, 300, 400, 500]
        );
        assert_eq!(grid.mosaic_size(), [240, 160]);
    }

    #[test]
    fn well_lookup_out_of_range() {
        let grid = PlateGrid::partition(600, 400, &PlateConfig::default()).unwrap();
        assert!(grid.well(4, 0).is_none());
        assert!(grid.well(0, 6).is_none());
    }
}
