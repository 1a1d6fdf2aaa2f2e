use std::sync::Arc;

use crate::config::AppConfig;
use crate::map::{RegionIndex, RegionRenderer, Viewport};
use crate::ranking::{AccumulationResult, RegionRanker};
use crate::region::{Region, RegionSet};

/// Rows above the map block (title and summary sentence)
pub const HEADER_ROWS: u16 = 2;
/// Rows below the map block
pub const STATUS_ROWS: u16 = 1;

/// Hit-test grid cell size in degrees
const INDEX_CELL_DEGREES: f64 = 1.0;

/// Application state
pub struct App {
    pub viewport: Viewport,
    pub renderer: RegionRenderer,
    pub ranker: RegionRanker,
    pub config: AppConfig,
    pub should_quit: bool,
    /// Last mouse position for drag tracking
    pub last_mouse: Option<(u16, u16)>,
    /// Current mouse position for cursor marker
    pub mouse_pos: Option<(u16, u16)>,
    /// Result for the region under the pointer; empty when there is none
    pub selection: AccumulationResult,
    index: RegionIndex,
    /// Set once the user pans or zooms; until then resizes refit the bounds
    view_adjusted: bool,
}

/// Braille pixel size of the map area for a terminal of `width` x `height` cells.
/// Accounts for the map border, header and status bar.
fn map_pixel_size(width: usize, height: usize) -> (usize, usize) {
    let inner_width = width.saturating_sub(2);
    let inner_height = height.saturating_sub(2 + (HEADER_ROWS + STATUS_ROWS) as usize);
    (inner_width * 2, inner_height * 4)
}

impl App {
    pub fn new(regions: Arc<RegionSet>, config: AppConfig, width: usize, height: usize) -> Self {
        let (pixel_width, pixel_height) = map_pixel_size(width, height);
        let viewport = Viewport::fit_bounds(
            config.map.initial_bounds,
            config.map.fit_padding,
            pixel_width,
            pixel_height,
        );

        Self {
            viewport,
            renderer: RegionRenderer::new(&regions),
            index: RegionIndex::build(&regions, INDEX_CELL_DEGREES),
            ranker: RegionRanker::new(regions, config.target.population, config.target.unit),
            config,
            should_quit: false,
            last_mouse: None,
            mouse_pos: None,
            selection: AccumulationResult::empty(),
            view_adjusted: false,
        }
    }

    /// Update viewport size when terminal resizes. An untouched view is refitted.
    pub fn resize(&mut self, width: usize, height: usize) {
        let (pixel_width, pixel_height) = map_pixel_size(width, height);
        self.viewport.width = pixel_width;
        self.viewport.height = pixel_height;
        if !self.view_adjusted {
            self.reset_view();
        }
    }

    /// Refit the view to the configured bounds
    pub fn reset_view(&mut self) {
        self.viewport.fit(self.config.map.initial_bounds, self.config.map.fit_padding);
        self.view_adjusted = false;
    }

    pub fn pan(&mut self, dx: i32, dy: i32) {
        self.viewport.pan(dx, dy);
        self.view_adjusted = true;
    }

    pub fn zoom_in(&mut self) {
        self.viewport.zoom_in();
        self.view_adjusted = true;
    }

    pub fn zoom_out(&mut self) {
        self.viewport.zoom_out();
        self.view_adjusted = true;
    }

    /// Zoom in towards a screen position (terminal column/row)
    pub fn zoom_in_at(&mut self, col: u16, row: u16) {
        let (px, py) = cell_to_pixel(col, row);
        self.viewport.zoom_in_at(px, py);
        self.view_adjusted = true;
    }

    /// Zoom out from a screen position (terminal column/row)
    pub fn zoom_out_at(&mut self, col: u16, row: u16) {
        let (px, py) = cell_to_pixel(col, row);
        self.viewport.zoom_out_at(px, py);
        self.view_adjusted = true;
    }

    pub fn quit(&mut self) {
        self.should_quit = true;
    }

    /// Select whatever region is under the terminal cell, or clear the
    /// selection when the pointer is off the map or over no region
    pub fn hover_at(&mut self, col: u16, row: u16) {
        let (px, py) = cell_to_pixel(col, row);
        if px < 0 || py < 0 || px >= self.viewport.width as i32 || py >= self.viewport.height as i32 {
            self.clear_selection();
            return;
        }

        let (lon, lat) = self.viewport.unproject(px, py);
        let hovered = self.index.region_at(self.ranker.regions(), lon, lat);

        // Same region as before: the stored result is still current
        if hovered.map(|r| r.id()) == self.selection.query_id.as_deref() {
            return;
        }
        self.selection = self.ranker.select(hovered);
    }

    pub fn clear_selection(&mut self) {
        self.selection = AccumulationResult::empty();
    }

    /// Region the current selection started from
    pub fn hovered_region(&self) -> Option<&Region> {
        self.selection
            .query_id
            .as_deref()
            .and_then(|id| self.ranker.regions().get(id))
    }

    /// Handle mouse drag by panning the opposite way
    pub fn handle_drag(&mut self, x: u16, y: u16) {
        if let Some((last_x, last_y)) = self.last_mouse {
            let dx = (last_x as i32 - x as i32) * 2;
            let dy = (last_y as i32 - y as i32) * 4;
            self.pan(dx, dy);
        }
        self.last_mouse = Some((x, y));
    }

    /// Reset drag state when mouse button released
    pub fn end_drag(&mut self) {
        self.last_mouse = None;
    }

    pub fn set_mouse_pos(&mut self, col: u16, row: u16) {
        self.mouse_pos = Some((col, row));
    }

    /// Mouse position in braille pixel coordinates (for rendering marker)
    pub fn mouse_pixel_pos(&self) -> Option<(i32, i32)> {
        self.mouse_pos.map(|(col, row)| cell_to_pixel(col, row))
    }

    /// Get current zoom level as a string
    pub fn zoom_level(&self) -> String {
        format!("{:.1}x", self.viewport.zoom)
    }

    /// Get current center coordinates as a string
    pub fn center_coords(&self) -> String {
        format!(
            "{:.1}°{}, {:.1}°{}",
            self.viewport.center_lat.abs(),
            if self.viewport.center_lat >= 0.0 { "N" } else { "S" },
            self.viewport.center_lon.abs(),
            if self.viewport.center_lon >= 0.0 { "E" } else { "W" }
        )
    }
}

/// Terminal cell to braille pixel at the cell's center, relative to the map's
/// inner area (one border cell in, below the header)
fn cell_to_pixel(col: u16, row: u16) -> (i32, i32) {
    let px = (col as i32 - 1) * 2 + 1;
    let py = (row as i32 - HEADER_ROWS as i32 - 1) * 4 + 2;
    (px, py)
}
