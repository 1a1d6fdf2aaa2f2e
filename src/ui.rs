use crate::app::{App, HEADER_ROWS, STATUS_ROWS};
use crate::braille::BrailleCanvas;
use crate::map::MapLayers;
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget},
    Frame,
};

const TARGET_COLOR: Color = Color::Rgb(43, 140, 190);
const SECONDARY_COLOR: Color = Color::Rgb(166, 189, 219);
const HOVER_COLOR: Color = Color::Rgb(236, 231, 242);

/// Render the UI
pub fn render(frame: &mut Frame, app: &App) {
    let area = frame.area();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(HEADER_ROWS),
            Constraint::Min(3),
            Constraint::Length(STATUS_ROWS),
        ])
        .split(area);

    render_header(frame, app, chunks[0]);
    render_map(frame, app, chunks[1]);
    render_status_bar(frame, app, chunks[2]);
}

fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let title = Line::from(Span::styled(
        format!(" Distributed {} ", app.config.target.name),
        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
    ));
    let message = Line::from(Span::styled(
        format!(" {}", summary_message(app)),
        Style::default().fg(Color::White),
    ));
    frame.render_widget(Paragraph::new(vec![title, message]), area);
}

/// The sentence shown above the map for the current selection
pub fn summary_message(app: &App) -> String {
    let target = &app.config.target;
    let target_pop = format_with_commas(target.population);
    let selection = &app.selection;

    let Some(region) = app.hovered_region() else {
        return format!(
            "Point at a region to find the area roughly equivalent to the population of {} ({}).",
            target.name, target_pop
        );
    };

    if selection.count == 1 && selection.reached {
        return format!(
            "{} is home to {} people and exceeds the population of {}.",
            region.display_name(),
            format_with_commas(selection.accumulated_population),
            target.name
        );
    }

    let mut msg = format!(
        "Area represents {} people in {} {}, compared to {} in {}.",
        format_with_commas(selection.accumulated_population),
        selection.count,
        app.config.data.region_noun,
        target_pop,
        target.name
    );
    if !selection.reached {
        msg.push_str(" Every mappable region is included.");
    }
    msg
}

/// Round to a whole number and group thousands: 8336817 -> "8,336,817"
pub fn format_with_commas(value: f64) -> String {
    let rounded = value.round();
    let digits = format!("{}", rounded.abs() as u64);
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if rounded < 0.0 {
        out.push('-');
    }
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

fn render_map(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(Span::styled(
            format!(" {} ", app.config.data.region_noun),
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    // Braille gives 2x4 resolution per character
    let mut viewport = app.viewport.clone();
    viewport.width = inner.width as usize * 2;
    viewport.height = inner.height as usize * 4;

    let layers = app.renderer.render(
        app.ranker.regions(),
        &app.selection,
        inner.width as usize,
        inner.height as usize,
        &viewport,
    );

    let cursor_pos = app.mouse_pixel_pos().and_then(|(px, py)| {
        if px < 0 || py < 0 {
            return None;
        }
        let cx = (px / 2) as u16;
        let cy = (py / 4) as u16;
        (cx < inner.width && cy < inner.height).then_some((cx, cy))
    });

    frame.render_widget(MapWidget { layers, cursor_pos }, inner);
}

/// Braille map layers plus the pointer marker
struct MapWidget {
    layers: MapLayers,
    cursor_pos: Option<(u16, u16)>,
}

/// Paint every non-blank cell of a canvas in one color
fn render_layer(canvas: &BrailleCanvas, color: Color, area: Rect, buf: &mut Buffer) {
    for row in 0..area.height {
        for col in 0..area.width {
            if let Some(ch) = canvas.glyph(col as usize, row as usize) {
                buf[(area.x + col, area.y + row)].set_char(ch).set_fg(color);
            }
        }
    }
}

impl Widget for MapWidget {
    fn render(self, area: Rect, buf: &mut Buffer) {
        // Back to front: outlines, selection fill, hovered border
        render_layer(&self.layers.outlines, SECONDARY_COLOR, area, buf);
        render_layer(&self.layers.selected, TARGET_COLOR, area, buf);
        render_layer(&self.layers.hovered, HOVER_COLOR, area, buf);

        if let Some((cx, cy)) = self.cursor_pos {
            buf[(area.x + cx, area.y + cy)].set_char('╋').set_fg(Color::Red);
        }
    }
}

fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let settings = &app.renderer.settings;
    let unit = app.ranker.unit().suffix();
    let radius = if app.selection.is_empty() {
        "-".to_string()
    } else {
        format!("{:.0} {}", app.selection.farthest_distance, unit)
    };

    let status = Line::from(vec![
        Span::styled(" Zoom: ", Style::default().fg(Color::DarkGray)),
        Span::styled(app.zoom_level(), Style::default().fg(Color::Yellow)),
        Span::styled(" Radius: ", Style::default().fg(Color::DarkGray)),
        Span::styled(radius, Style::default().fg(Color::Magenta)),
        Span::raw(" "),
        Span::styled(
            if settings.show_outlines { "[B]orders " } else { "[b]orders " },
            Style::default().fg(if settings.show_outlines { Color::Green } else { Color::DarkGray }),
        ),
        Span::styled(
            if settings.show_selection { "[F]ill " } else { "[f]ill " },
            Style::default().fg(if settings.show_selection { Color::Green } else { Color::DarkGray }),
        ),
        Span::styled("| ", Style::default().fg(Color::DarkGray)),
        Span::styled(app.center_coords(), Style::default().fg(Color::Cyan)),
        Span::styled(
            " | hjkl:pan +/-:zoom r:reset q:quit",
            Style::default().fg(Color::DarkGray),
        ),
    ]);

    frame.render_widget(Paragraph::new(status), area);
}
