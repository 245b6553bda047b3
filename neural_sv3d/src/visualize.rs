//! Prediction vs ground-truth plots.
//!
//! Each plot has two square panels, the prediction on the left in red and
//! the ground truth on the right in blue, both seen through the same
//! orthographic camera. Voxel grids are drawn as shaded cubes in painter's
//! order, point clouds as dots.

use std::path::{Path, PathBuf};

use image::{Rgb, RgbImage};
use sv3d_core::{bounds, OrthoView, Point3, VoxelGrid, OCCUPANCY_THRESHOLD};

use crate::error::{EvalError, Result};
use crate::reconstruction::Geometry;

/// Prediction color.
pub const PREDICTION_COLOR: Rgb<u8> = Rgb([255, 0, 0]);

/// Ground-truth color.
pub const GROUND_TRUTH_COLOR: Rgb<u8> = Rgb([0, 0, 255]);

const BACKGROUND: Rgb<u8> = Rgb([255, 255, 255]);
const FRAME_COLOR: Rgb<u8> = Rgb([200, 200, 200]);

/// Renders one prediction/ground-truth pair per call.
pub trait Visualizer {
    /// Render the pair for an evaluation step.
    fn visualize(&mut self, step: usize, prediction: &Geometry, ground_truth: &Geometry)
        -> Result<()>;
}

/// Writes `{out_dir}/{step}.png`.
///
/// The output directory must already exist.
#[derive(Debug, Clone)]
pub struct PngVisualizer {
    out_dir: PathBuf,
    view: OrthoView,
    panel_size: u32,
    threshold: f32,
}

impl PngVisualizer {
    /// Create a visualizer writing into `out_dir`.
    pub fn new<P: AsRef<Path>>(out_dir: P) -> Self {
        Self {
            out_dir: out_dir.as_ref().to_path_buf(),
            view: OrthoView::default(),
            panel_size: 480,
            threshold: OCCUPANCY_THRESHOLD,
        }
    }

    /// Set the side length of each panel in pixels.
    pub fn with_panel_size(mut self, panel_size: u32) -> Self {
        self.panel_size = panel_size.max(8);
        self
    }

    /// Set the camera.
    pub fn with_view(mut self, view: OrthoView) -> Self {
        self.view = view;
        self
    }

    /// Path written for `step`.
    pub fn output_path(&self, step: usize) -> PathBuf {
        self.out_dir.join(format!("{}.png", step))
    }

    /// Render the pair into an image without writing it.
    pub fn render(&self, prediction: &Geometry, ground_truth: &Geometry) -> Result<RgbImage> {
        if prediction.representation() != ground_truth.representation() {
            return Err(EvalError::RepresentationMismatch {
                expected: ground_truth.representation(),
                got: prediction.representation(),
            });
        }

        let size = self.panel_size;
        let mut canvas = RgbImage::from_pixel(size * 2, size, BACKGROUND);

        match (prediction, ground_truth) {
            (Geometry::Voxel(pred), Geometry::Voxel(gt)) => {
                // Predictions are probabilities; ground truth is any non-zero cell.
                let pred = pred.binarize(self.threshold);
                let gt = gt.binarize(0.0);
                self.draw_voxels(&mut canvas, 0, &pred, PREDICTION_COLOR);
                self.draw_voxels(&mut canvas, size, &gt, GROUND_TRUTH_COLOR);
            }
            (Geometry::Point(pred), Geometry::Point(gt)) => {
                self.draw_points(&mut canvas, 0, pred, PREDICTION_COLOR);
                self.draw_points(&mut canvas, size, gt, GROUND_TRUTH_COLOR);
            }
            _ => unreachable!("representations checked above"),
        }
        Ok(canvas)
    }

    /// Draw the filled cells of a binary grid.
    fn draw_voxels(&self, canvas: &mut RgbImage, origin_x: u32, grid: &VoxelGrid, color: Rgb<u8>) {
        let [dx, dy, dz] = grid.dims();
        let hi = Point3::new(dx as f32, dy as f32, dz as f32);
        let panel = Panel::fit(origin_x, self.panel_size, self.view, Point3::splat(0.0), hi);
        panel.draw_frame(canvas, Point3::splat(0.0), hi);

        let occupied = grid.occupied(0.5);
        let is_occupied = |i: isize, j: isize, k: isize| -> bool {
            if i < 0 || j < 0 || k < 0 {
                return false;
            }
            grid.get(i as usize, j as usize, k as usize)
                .map(|v| v > 0.5)
                .unwrap_or(false)
        };

        let toward = self.view.toward_viewer();
        let mut cells: Vec<([usize; 3], f32)> = occupied
            .into_iter()
            .map(|c| {
                let center = Point3::new(c[0] as f32 + 0.5, c[1] as f32 + 0.5, c[2] as f32 + 0.5);
                (c, center.dot(toward))
            })
            .collect();
        cells.sort_by(|a, b| a.1.total_cmp(&b.1));

        for ([i, j, k], _) in cells {
            let base = Point3::new(i as f32, j as f32, k as f32);
            for face in &CUBE_FACES {
                let facing = face.normal.dot(toward);
                if facing <= 0.0 {
                    continue;
                }
                let (ni, nj, nk) = face.neighbour;
                if is_occupied(i as isize + ni, j as isize + nj, k as isize + nk) {
                    continue;
                }
                let corners: Vec<(f32, f32)> = face
                    .corners
                    .iter()
                    .map(|c| panel.to_screen(base + Point3::from(*c)))
                    .collect();
                panel.fill_convex(canvas, &corners, shade(color, 0.45 + 0.55 * facing));
            }
        }
    }

    fn draw_points(&self, canvas: &mut RgbImage, origin_x: u32, points: &[Point3], color: Rgb<u8>) {
        let Some((lo, hi)) = bounds(points) else {
            return;
        };
        let panel = Panel::fit(origin_x, self.panel_size, self.view, lo, hi);
        panel.draw_frame(canvas, lo, hi);

        let toward = self.view.toward_viewer();
        let mut sorted: Vec<&Point3> = points.iter().filter(|p| p.is_finite()).collect();
        sorted.sort_by(|a, b| a.dot(toward).total_cmp(&b.dot(toward)));

        for p in sorted {
            let (x, y) = panel.to_screen(*p);
            panel.fill_disk(canvas, x, y, 1.6, color);
        }
    }
}

impl Visualizer for PngVisualizer {
    fn visualize(
        &mut self,
        step: usize,
        prediction: &Geometry,
        ground_truth: &Geometry,
    ) -> Result<()> {
        let path = self.output_path(step);
        self.render(prediction, ground_truth)?.save(&path)?;
        log::debug!("Saved visualization to {}", path.display());
        Ok(())
    }
}

/// Records the steps it was called for and renders nothing.
#[derive(Debug, Clone, Default)]
pub struct RecordingVisualizer {
    /// Steps visualized so far.
    pub steps: Vec<usize>,
}

impl Visualizer for RecordingVisualizer {
    fn visualize(
        &mut self,
        step: usize,
        prediction: &Geometry,
        ground_truth: &Geometry,
    ) -> Result<()> {
        if prediction.representation() != ground_truth.representation() {
            return Err(EvalError::RepresentationMismatch {
                expected: ground_truth.representation(),
                got: prediction.representation(),
            });
        }
        self.steps.push(step);
        Ok(())
    }
}

struct CubeFace {
    normal: Point3,
    neighbour: (isize, isize, isize),
    corners: [[f32; 3]; 4],
}

const CUBE_FACES: [CubeFace; 6] = [
    CubeFace {
        normal: Point3 { x: -1.0, y: 0.0, z: 0.0 },
        neighbour: (-1, 0, 0),
        corners: [[0.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 1.0, 1.0], [0.0, 0.0, 1.0]],
    },
    CubeFace {
        normal: Point3 { x: 1.0, y: 0.0, z: 0.0 },
        neighbour: (1, 0, 0),
        corners: [[1.0, 0.0, 0.0], [1.0, 1.0, 0.0], [1.0, 1.0, 1.0], [1.0, 0.0, 1.0]],
    },
    CubeFace {
        normal: Point3 { x: 0.0, y: -1.0, z: 0.0 },
        neighbour: (0, -1, 0),
        corners: [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [1.0, 0.0, 1.0], [0.0, 0.0, 1.0]],
    },
    CubeFace {
        normal: Point3 { x: 0.0, y: 1.0, z: 0.0 },
        neighbour: (0, 1, 0),
        corners: [[0.0, 1.0, 0.0], [1.0, 1.0, 0.0], [1.0, 1.0, 1.0], [0.0, 1.0, 1.0]],
    },
    CubeFace {
        normal: Point3 { x: 0.0, y: 0.0, z: -1.0 },
        neighbour: (0, 0, -1),
        corners: [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [1.0, 1.0, 0.0], [0.0, 1.0, 0.0]],
    },
    CubeFace {
        normal: Point3 { x: 0.0, y: 0.0, z: 1.0 },
        neighbour: (0, 0, 1),
        corners: [[0.0, 0.0, 1.0], [1.0, 0.0, 1.0], [1.0, 1.0, 1.0], [0.0, 1.0, 1.0]],
    },
];

fn shade(color: Rgb<u8>, factor: f32) -> Rgb<u8> {
    let f = factor.clamp(0.0, 1.0);
    Rgb([
        (color[0] as f32 * f) as u8,
        (color[1] as f32 * f) as u8,
        (color[2] as f32 * f) as u8,
    ])
}

/// A square region of the canvas with a world-to-pixel mapping.
struct Panel {
    origin_x: u32,
    size: u32,
    view: OrthoView,
    center: (f32, f32),
    scale: f32,
}

impl Panel {
    /// Fit the box `[lo, hi]` into the panel with a margin.
    fn fit(origin_x: u32, size: u32, view: OrthoView, lo: Point3, hi: Point3) -> Self {
        let mut min = (f32::INFINITY, f32::INFINITY);
        let mut max = (f32::NEG_INFINITY, f32::NEG_INFINITY);
        for corner in box_corners(lo, hi) {
            let p = view.project(corner);
            min = (min.0.min(p.x), min.1.min(p.y));
            max = (max.0.max(p.x), max.1.max(p.y));
        }
        let extent = (max.0 - min.0).max(max.1 - min.1).max(1e-6);

        Self {
            origin_x,
            size,
            view,
            center: ((min.0 + max.0) * 0.5, (min.1 + max.1) * 0.5),
            scale: size as f32 * 0.85 / extent,
        }
    }

    fn to_screen(&self, p: Point3) -> (f32, f32) {
        let q = self.view.project(p);
        let half = self.size as f32 * 0.5;
        (
            self.origin_x as f32 + half + (q.x - self.center.0) * self.scale,
            half - (q.y - self.center.1) * self.scale,
        )
    }

    fn put(&self, canvas: &mut RgbImage, x: i64, y: i64, color: Rgb<u8>) {
        let x_min = self.origin_x as i64;
        let x_max = x_min + self.size as i64;
        if x < x_min || x >= x_max || y < 0 || y >= self.size as i64 {
            return;
        }
        canvas.put_pixel(x as u32, y as u32, color);
    }

    fn draw_line(&self, canvas: &mut RgbImage, a: (f32, f32), b: (f32, f32), color: Rgb<u8>) {
        let steps = (b.0 - a.0).abs().max((b.1 - a.1).abs()).ceil().max(1.0) as usize;
        for s in 0..=steps {
            let t = s as f32 / steps as f32;
            let x = a.0 + (b.0 - a.0) * t;
            let y = a.1 + (b.1 - a.1) * t;
            self.put(canvas, x.floor() as i64, y.floor() as i64, color);
        }
    }

    /// Draw the edges of the box `[lo, hi]`.
    fn draw_frame(&self, canvas: &mut RgbImage, lo: Point3, hi: Point3) {
        let corners = box_corners(lo, hi);
        for (a, b) in BOX_EDGES {
            let pa = self.to_screen(corners[a]);
            let pb = self.to_screen(corners[b]);
            self.draw_line(canvas, pa, pb, FRAME_COLOR);
        }
    }

    fn fill_convex(&self, canvas: &mut RgbImage, polygon: &[(f32, f32)], color: Rgb<u8>) {
        if polygon.len() < 3 {
            return;
        }
        let (mut x0, mut y0) = (f32::INFINITY, f32::INFINITY);
        let (mut x1, mut y1) = (f32::NEG_INFINITY, f32::NEG_INFINITY);
        for &(x, y) in polygon {
            x0 = x0.min(x);
            y0 = y0.min(y);
            x1 = x1.max(x);
            y1 = y1.max(y);
        }

        for py in y0.floor() as i64..=y1.ceil() as i64 {
            for px in x0.floor() as i64..=x1.ceil() as i64 {
                let (cx, cy) = (px as f32 + 0.5, py as f32 + 0.5);
                if inside_convex(polygon, cx, cy) {
                    self.put(canvas, px, py, color);
                }
            }
        }
    }

    fn fill_disk(&self, canvas: &mut RgbImage, x: f32, y: f32, radius: f32, color: Rgb<u8>) {
        let r = radius.ceil() as i64;
        let (cx, cy) = (x.floor() as i64, y.floor() as i64);
        for dy in -r..=r {
            for dx in -r..=r {
                if ((dx * dx + dy * dy) as f32) <= radius * radius {
                    self.put(canvas, cx + dx, cy + dy, color);
                }
            }
        }
    }
}

const BOX_EDGES: [(usize, usize); 12] = [
    (0, 1),
    (1, 3),
    (3, 2),
    (2, 0),
    (4, 5),
    (5, 7),
    (7, 6),
    (6, 4),
    (0, 4),
    (1, 5),
    (2, 6),
    (3, 7),
];

fn box_corners(lo: Point3, hi: Point3) -> [Point3; 8] {
    let mut corners = [lo; 8];
    for (idx, corner) in corners.iter_mut().enumerate() {
        *corner = Point3::new(
            if idx & 1 == 0 { lo.x } else { hi.x },
            if idx & 2 == 0 { lo.y } else { hi.y },
            if idx & 4 == 0 { lo.z } else { hi.z },
        );
    }
    corners
}

fn inside_convex(polygon: &[(f32, f32)], x: f32, y: f32) -> bool {
    let mut sign = 0.0f32;
    for idx in 0..polygon.len() {
        let (ax, ay) = polygon[idx];
        let (bx, by) = polygon[(idx + 1) % polygon.len()];
        let cross = (bx - ax) * (y - ay) - (by - ay) * (x - ax);
        if cross == 0.0 {
            continue;
        }
        if sign == 0.0 {
            sign = cross.signum();
        } else if cross.signum() != sign {
            return false;
        }
    }
    true
}
