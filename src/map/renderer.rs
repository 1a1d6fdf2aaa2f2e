use crate::braille::BrailleCanvas;
use crate::map::geometry::{draw_line, fill_rings};
use crate::map::projection::Viewport;
use crate::ranking::AccumulationResult;
use crate::region::{Ring, RegionSet};

/// Display settings for map layers
#[derive(Clone)]
pub struct DisplaySettings {
    pub show_outlines: bool,
    pub show_selection: bool,
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self {
            show_outlines: true,
            show_selection: true,
        }
    }
}

/// Rasterized layers, drawn back to front by the UI
pub struct MapLayers {
    /// Borders of every visible region
    pub outlines: BrailleCanvas,
    /// Filled interiors of the selected regions
    pub selected: BrailleCanvas,
    /// Border of the region under the pointer
    pub hovered: BrailleCanvas,
}

/// Draws region polygons for the current selection
pub struct RegionRenderer {
    /// Per-region bounding boxes, indexed like `RegionSet::as_slice`. None skips drawing.
    bboxes: Vec<Option<(f64, f64, f64, f64)>>,
    pub settings: DisplaySettings,
}

impl RegionRenderer {
    pub fn new(regions: &RegionSet) -> Self {
        Self {
            bboxes: regions.iter().map(|r| r.shape().geographic_bbox()).collect(),
            settings: DisplaySettings::default(),
        }
    }

    /// Render all layers for a canvas of `cols` x `rows` characters
    pub fn render(
        &self,
        regions: &RegionSet,
        selection: &AccumulationResult,
        cols: usize,
        rows: usize,
        viewport: &Viewport,
    ) -> MapLayers {
        let mut layers = MapLayers {
            outlines: BrailleCanvas::new(cols, rows),
            selected: BrailleCanvas::new(cols, rows),
            hovered: BrailleCanvas::new(cols, rows),
        };

        let hovered_id = selection.query_id.as_deref();

        for (region, bbox) in regions.iter().zip(&self.bboxes) {
            let Some(bbox) = *bbox else { continue };
            if !viewport.bbox_visible(bbox) {
                continue;
            }

            if self.settings.show_selection && selection.contains(region.id()) {
                for part in region.shape().parts() {
                    let projected: Vec<Vec<(f64, f64)>> = part
                        .iter()
                        .map(|ring| ring.iter().map(|&(lon, lat)| viewport.project_f64(lon, lat)).collect())
                        .collect();
                    fill_rings(&mut layers.selected, &projected);
                }
            }

            if hovered_id == Some(region.id()) {
                for ring in region.shape().rings() {
                    draw_ring(&mut layers.hovered, ring, viewport);
                }
            } else if self.settings.show_outlines {
                for ring in region.shape().rings() {
                    draw_ring(&mut layers.outlines, ring, viewport);
                }
            }
        }

        layers
    }

    pub fn toggle_outlines(&mut self) {
        self.settings.show_outlines = !self.settings.show_outlines;
    }

    pub fn toggle_selection(&mut self) {
        self.settings.show_selection = !self.settings.show_selection;
    }
}

/// Draw a closed ring, skipping segments that jump across the canvas
fn draw_ring(canvas: &mut BrailleCanvas, ring: &Ring, viewport: &Viewport) {
    if ring.len() < 2 {
        return;
    }

    let mut prev = ring.last().map(|&(lon, lat)| viewport.project(lon, lat));
    for &(lon, lat) in ring {
        let (px, py) = viewport.project(lon, lat);
        if let Some((prev_x, prev_y)) = prev {
            let dist = ((px - prev_x).abs() + (py - prev_y).abs()) as usize;
            if dist < viewport.width && segment_might_be_visible(viewport, (prev_x, prev_y), (px, py)) {
                draw_line(canvas, prev_x, prev_y, px, py);
            }
        }
        prev = Some((px, py));
    }
}

fn segment_might_be_visible(viewport: &Viewport, p1: (i32, i32), p2: (i32, i32)) -> bool {
    p1.0.max(p2.0) >= 0
        && p1.0.min(p2.0) < viewport.width as i32
        && p1.1.max(p2.1) >= 0
        && p1.1.min(p2.1) < viewport.height as i32
}
