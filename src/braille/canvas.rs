/// Pixel layer drawn with braille glyphs (U+2800..U+28FF), one 2x4 dot block
/// per terminal cell. One canvas per map layer so each can take its own color.
pub struct BrailleCanvas {
    cols: usize,
    rows: usize,
    /// Dot bits per cell, row-major
    cells: Vec<u8>,
}

/// Dot bit for (x % 2, y % 4) inside a cell
const DOT_BITS: [[u8; 4]; 2] = [[0x01, 0x02, 0x04, 0x40], [0x08, 0x10, 0x20, 0x80]];

impl BrailleCanvas {
    /// Blank canvas of `cols` x `rows` terminal cells
    pub fn new(cols: usize, rows: usize) -> Self {
        Self {
            cols,
            rows,
            cells: vec![0; cols * rows],
        }
    }

    pub fn pixel_width(&self) -> usize {
        self.cols * 2
    }

    pub fn pixel_height(&self) -> usize {
        self.rows * 4
    }

    /// Set a pixel; anything off-canvas (including negative coordinates) is ignored
    pub fn set_pixel(&mut self, x: i32, y: i32) {
        if x < 0 || y < 0 {
            return;
        }
        let (x, y) = (x as usize, y as usize);
        let (cx, cy) = (x / 2, y / 4);
        if cx < self.cols && cy < self.rows {
            self.cells[cy * self.cols + cx] |= DOT_BITS[x % 2][y % 4];
        }
    }

    /// Set every pixel of row `y` from `x0` to `x1` inclusive, clipped to the canvas
    pub fn fill_span(&mut self, y: i32, x0: i32, x1: i32) {
        if y < 0 || y as usize >= self.pixel_height() {
            return;
        }
        let start = x0.max(0);
        let end = x1.min(self.pixel_width() as i32 - 1);
        for x in start..=end {
            self.set_pixel(x, y);
        }
    }

    /// Character at a cell, or None if no dot is set there
    pub fn glyph(&self, col: usize, row: usize) -> Option<char> {
        if col >= self.cols || row >= self.rows {
            return None;
        }
        match self.cells[row * self.cols + col] {
            0 => None,
            bits => char::from_u32(0x2800 + u32::from(bits)),
        }
    }

    pub fn is_blank(&self) -> bool {
        self.cells.iter().all(|&b| b == 0)
    }

    /// Text rows, blank cells as U+2800
    pub fn rows(&self) -> impl Iterator<Item = String> + '_ {
        self.cells.chunks(self.cols.max(1)).take(self.rows).map(|row| {
            row.iter()
                .filter_map(|&bits| char::from_u32(0x2800 + u32::from(bits)))
                .collect()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(canvas: &BrailleCanvas) -> String {
        canvas.rows().collect::<Vec<_>>().join("\n")
    }

    #[test]
    fn test_top_left_dot() {
        let mut canvas = BrailleCanvas::new(1, 2);
        canvas.set_pixel(0, 0);
        assert_eq!(render(&canvas), "⠁\n⠀");
        assert_eq!(canvas.glyph(0, 1), None);
    }

    #[test]
    fn test_full_cell_from_spans() {
        let mut canvas = BrailleCanvas::new(1, 1);
        for y in 0..4 {
            canvas.fill_span(y, 0, 1);
        }
        assert_eq!(canvas.glyph(0, 0), Some('⣿'));
    }

    #[test]
    fn test_dot_bit_layout() {
        let mut canvas = BrailleCanvas::new(2, 1);
        canvas.set_pixel(0, 3);
        canvas.set_pixel(1, 0);
        canvas.set_pixel(3, 2);
        // 0x40 | 0x08, then 0x20
        assert_eq!(render(&canvas), "⡈⠠");
    }

    #[test]
    fn test_out_of_bounds_ignored() {
        let mut canvas = BrailleCanvas::new(2, 2);
        canvas.set_pixel(-1, 0);
        canvas.set_pixel(4, 0);
        canvas.set_pixel(0, 8);
        canvas.fill_span(-3, 0, 3);
        assert!(canvas.is_blank());
        assert_eq!(canvas.glyph(5, 5), None);
    }

    #[test]
    fn test_fill_span_clips() {
        let mut canvas = BrailleCanvas::new(2, 1);
        canvas.fill_span(0, -10, 10);
        assert_eq!(render(&canvas), "⠉⠉");
        assert_eq!(canvas.glyph(1, 0), Some('⠉'));
    }
}
