use crate::braille::BrailleCanvas;

/// Draw a line using Bresenham's algorithm
pub fn draw_line(canvas: &mut BrailleCanvas, x0: i32, y0: i32, x1: i32, y1: i32) {
    let dx = (x1 - x0).abs();
    let dy = -(y1 - y0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;
    let (mut x, mut y) = (x0, y0);

    loop {
        canvas.set_pixel(x, y);
        if x == x1 && y == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x += sx;
        }
        if e2 <= dx {
            err += dx;
            y += sy;
        }
    }
}

/// Fill polygon rings given in pixel space with the even-odd rule.
/// Holes cancel out because every ring contributes crossings.
pub fn fill_rings(canvas: &mut BrailleCanvas, rings: &[Vec<(f64, f64)>]) {
    let (min_y, max_y) = rings
        .iter()
        .flatten()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &(_, y)| (lo.min(y), hi.max(y)));
    if !min_y.is_finite() || !max_y.is_finite() {
        return;
    }

    let first_row = (min_y.floor() as i32).max(0);
    let last_row = (max_y.ceil() as i32).min(canvas.pixel_height() as i32 - 1);
    let mut crossings = Vec::new();

    for row in first_row..=last_row {
        // Sample through the pixel center
        let sy = row as f64 + 0.5;
        crossings.clear();
        for ring in rings {
            for (i, &(x0, y0)) in ring.iter().enumerate() {
                let (x1, y1) = ring[(i + 1) % ring.len()];
                if (y0 > sy) != (y1 > sy) {
                    crossings.push(x0 + (sy - y0) * (x1 - x0) / (y1 - y0));
                }
            }
        }
        crossings.sort_by(|a, b| a.total_cmp(b));
        for pair in crossings.chunks_exact(2) {
            let start = (pair[0] - 0.5).ceil() as i32;
            let end = (pair[1] - 0.5).floor() as i32;
            if start <= end {
                canvas.fill_span(row, start, end);
            }
        }
    }
}
