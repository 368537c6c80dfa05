use crate::plans::{Plan, HIGHLIGHTS};
use crate::state::{AppState, BannerKind, Field, Palette};
use crate::widget::CardWidget;
use chrono::{Datelike, Utc};
use crossterm::cursor::MoveTo;
use crossterm::style::{Attribute, Color, Print, SetAttribute, SetBackgroundColor, SetForegroundColor};
use crossterm::terminal::{Clear, ClearType};
use crossterm::queue;
use std::io::{self, Write};

/// Rectangle of terminal cells
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub x: u16,
    pub y: u16,
    pub width: u16,
    pub height: u16,
}

impl Rect {
    pub fn contains(&self, column: u16, row: u16) -> bool {
        column >= self.x
            && row >= self.y
            && u32::from(column) < u32::from(self.x) + u32::from(self.width)
            && u32::from(row) < u32::from(self.y) + u32::from(self.height)
    }
}

/// Narrowest terminal that still shows the card next to the hero text
pub const MIN_CARD_COLUMNS: u16 = 60;
/// Fewest body rows the card is drawn in
pub const MIN_CARD_ROWS: u16 = 8;
const FORM_HEIGHT: u16 = 9;

/// Where each section of the page goes for a given terminal size
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Layout {
    pub width: u16,
    pub height: u16,
    pub header: Rect,
    pub hero: Rect,
    /// `None` when the terminal is too small to show the card
    pub card: Option<Rect>,
    pub form: Rect,
    pub footer: Rect,
}

impl Layout {
    /// Lays the page out for the terminal's current size, if it can be read.
    pub fn measure() -> Option<Layout> {
        termsize::get().map(|size| Layout::for_size(size.cols, size.rows))
    }

    pub fn for_size(width: u16, height: u16) -> Layout {
        let header = Rect {
            x: 0,
            y: 0,
            width,
            height: height.min(1),
        };
        let footer_y = height.saturating_sub(1);
        let footer = Rect {
            x: 0,
            y: footer_y,
            width,
            height: u16::from(height > 1),
        };
        let form_height = FORM_HEIGHT.min(height.saturating_sub(3));
        let form = Rect {
            x: 1,
            y: footer_y.saturating_sub(form_height),
            width: width.saturating_sub(2),
            height: form_height,
        };
        let body_top = height.min(2);
        let body_height = form.y.saturating_sub(body_top);

        let card_fits = width >= MIN_CARD_COLUMNS && body_height >= MIN_CARD_ROWS;
        let left_width = if card_fits { width / 2 } else { width };
        let hero = Rect {
            x: 1,
            y: body_top,
            width: left_width.saturating_sub(2),
            height: body_height,
        };
        let card = card_fits.then(|| Rect {
            x: width / 2 + 2,
            y: body_top,
            width: (width - width / 2).saturating_sub(4),
            height: body_height,
        });

        Layout {
            width,
            height,
            header,
            hero,
            card,
            form,
            footer,
        }
    }
}

/// Truncates `text` to `width` characters
fn fit(text: &str, width: u16) -> String {
    text.chars().take(usize::from(width)).collect()
}

/// Greedy word wrap to lines of at most `width` characters
pub fn wrap(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut lines = Vec::new();
    let mut current = String::new();
    for word in text.split_whitespace() {
        let needed = if current.is_empty() {
            word.chars().count()
        } else {
            current.chars().count() + 1 + word.chars().count()
        };
        if needed > width && !current.is_empty() {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
        .into_iter()
        .flat_map(|line| {
            let chars: Vec<char> = line.chars().collect();
            chars
                .chunks(width)
                .map(|chunk| chunk.iter().collect::<String>())
                .collect::<Vec<_>>()
        })
        .collect()
}

fn text_at<W: Write>(out: &mut W, x: u16, y: u16, color: Color, text: &str, width: u16) -> io::Result<()> {
    queue!(out, MoveTo(x, y), SetForegroundColor(color), Print(fit(text, width)))
}

/// Paints the whole page.
pub fn render<W: Write>(
    out: &mut W,
    layout: &Layout,
    state: &AppState,
    card: &mut CardWidget,
    destination: &str,
) -> io::Result<()> {
    let palette = state.theme.palette();
    queue!(
        out,
        SetBackgroundColor(palette.background),
        SetForegroundColor(palette.foreground),
        Clear(ClearType::All)
    )?;

    render_header(out, layout, state, &palette)?;
    render_hero(out, layout.hero, &palette)?;
    if let Some(area) = layout.card {
        render_card(out, area, state, card, &palette, destination)?;
    }
    render_form(out, layout.form, state, &palette)?;
    if layout.footer.height > 0 {
        let year = Utc::now().year();
        let footer = format!(" © {year} Shred Studio — All rights reserved.");
        text_at(out, 0, layout.footer.y, palette.muted, &footer, layout.width)?;
    }
    render_banner(out, layout, state, &palette)?;

    queue!(out, SetAttribute(Attribute::Reset))?;
    out.flush()
}

fn render_header<W: Write>(out: &mut W, layout: &Layout, state: &AppState, palette: &Palette) -> io::Result<()> {
    if layout.header.height == 0 {
        return Ok(());
    }
    queue!(out, SetAttribute(Attribute::Bold))?;
    text_at(out, 1, 0, palette.accent, "FIT  Shred Studio", layout.width)?;
    queue!(out, SetAttribute(Attribute::NormalIntensity))?;

    let hints = format!(
        "Tab next field  Enter Copy & Continue  Ctrl-T {}  Esc quit ",
        state.theme.toggle_label()
    );
    let hints_len = hints.chars().count() as u16;
    if layout.width > hints_len + 20 {
        text_at(out, layout.width - hints_len, 0, palette.muted, &hints, hints_len)?;
    }
    Ok(())
}

fn render_hero<W: Write>(out: &mut W, area: Rect, palette: &Palette) -> io::Result<()> {
    let mut lines: Vec<(Color, String)> = vec![
        (palette.accent, "Reduce fat. Build habits. Feel amazing.".into()),
        (palette.foreground, "The modern way to get lean.".into()),
        (palette.background, String::new()),
    ];
    for line in wrap(
        "Choose a plan and start today: daily workouts, personalized nutrition, and weekly one-on-one coaching.",
        usize::from(area.width),
    ) {
        lines.push((palette.muted, line));
    }
    lines.push((palette.background, String::new()));
    lines.push((palette.accent, "Choose your plan".into()));
    for plan in Plan::ALL {
        let details = plan.details();
        let badge = if details.highlight { "  POPULAR" } else { "" };
        lines.push((
            palette.foreground,
            format!("{}  {}  {}{}", details.name, details.price, details.tag, badge),
        ));
        lines.push((palette.muted, format!("  {}", details.features.join(" · "))));
    }
    lines.push((palette.background, String::new()));
    for (title, description) in HIGHLIGHTS {
        lines.push((palette.foreground, format!("{title}: {description}")));
    }

    for (offset, (color, text)) in lines.iter().take(usize::from(area.height)).enumerate() {
        text_at(out, area.x, area.y + offset as u16, *color, text, area.width)?;
    }
    Ok(())
}

fn render_card<W: Write>(
    out: &mut W,
    area: Rect,
    state: &AppState,
    card: &mut CardWidget,
    palette: &Palette,
    destination: &str,
) -> io::Result<()> {
    let canvas = card.rasterize(area, palette);
    for y in 0..canvas.height() {
        for x in 0..canvas.width() {
            if let Some(color) = canvas.get(x, y) {
                queue!(
                    out,
                    MoveTo(area.x + x as u16, area.y + y as u16),
                    SetBackgroundColor(color),
                    Print(' ')
                )?;
            }
        }
    }
    queue!(out, SetBackgroundColor(palette.background))?;

    if state.debug {
        let tilt = card.tilt();
        let controller = card.controller();
        let (x, y) = controller.working_values();
        let (vx, vy) = controller.velocity();
        let lines = [
            format!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION")),
            format!("Rotate X: {:.2}, Rotate Y: {:.2}", tilt.rotate_x, tilt.rotate_y),
            format!("Working: ({x:.2}, {y:.2}), Velocity: ({vx:.2}, {vy:.2})"),
            format!("Max tilt: {:.1}°", controller.config().max_angle),
            format!(
                "Hovered: {}, Relaxing: {}",
                card.is_hovered(),
                controller.is_relaxing()
            ),
            format!("FPS: {:.2}", card.fps()),
            format!("Sheet: {destination}"),
        ];
        for (offset, line) in lines.iter().take(usize::from(area.height)).enumerate() {
            text_at(out, area.x, area.y + offset as u16, palette.accent, line, area.width)?;
        }
    }
    Ok(())
}

fn render_form<W: Write>(out: &mut W, area: Rect, state: &AppState, palette: &Palette) -> io::Result<()> {
    let mut lines: Vec<(Color, String)> = vec![
        (palette.accent, "Ready to transform?".into()),
        (
            palette.muted,
            "Fill this quick form. Your details will be copied to clipboard; then paste them into our Google Sheet."
                .into(),
        ),
        (palette.background, String::new()),
    ];
    for field in Field::ALL {
        let focused = state.focus == field;
        let marker = if focused { '›' } else { ' ' };
        let value = state.draft.value(field);
        let text = match field {
            Field::Plan => format!("{marker} {:<6} ◂ {value} ▸", field.placeholder()),
            _ if value.is_empty() && !focused => format!("{marker} {:<6} …", field.placeholder()),
            _ => format!(
                "{marker} {:<6} {value}{}",
                field.placeholder(),
                if focused { "▏" } else { "" }
            ),
        };
        let color = if focused { palette.accent } else { palette.foreground };
        lines.push((color, text));
    }
    lines.push((
        palette.foreground,
        "[Enter] Copy & Continue   [Ctrl-O] Open Interest Sheet   [Ctrl-R] Reset".into(),
    ));
    lines.push((
        palette.muted,
        "We keep it simple: no spam, no pressure, just expert guidance.".into(),
    ));

    for (offset, (color, text)) in lines.iter().take(usize::from(area.height)).enumerate() {
        text_at(out, area.x, area.y + offset as u16, *color, text, area.width)?;
    }
    Ok(())
}

fn render_banner<W: Write>(out: &mut W, layout: &Layout, state: &AppState, palette: &Palette) -> io::Result<()> {
    let Some(banner) = state.banner() else {
        return Ok(());
    };
    let box_width = layout.width.saturating_sub(8).min(64);
    if box_width < 12 {
        return Ok(());
    }
    let inner = usize::from(box_width - 4);
    let mut lines = wrap(&banner.text, inner);
    lines.push(String::new());
    lines.push("(press any key)".into());

    let box_height = lines.len() as u16 + 2;
    let x = (layout.width - box_width) / 2;
    let y = layout.height.saturating_sub(box_height) / 2;
    let (fill, text_color) = match banner.kind {
        BannerKind::Notice => (palette.foreground, palette.background),
        BannerKind::Error => (palette.error, palette.background),
    };

    queue!(out, SetBackgroundColor(fill))?;
    let blank = " ".repeat(usize::from(box_width));
    for row in 0..box_height {
        queue!(out, MoveTo(x, y + row), Print(&blank))?;
    }
    for (offset, line) in lines.iter().enumerate() {
        text_at(out, x + 2, y + 1 + offset as u16, text_color, line, box_width - 4)?;
    }
    queue!(out, SetBackgroundColor(palette.background))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::Theme;
    use crate::tilt::TiltConfig;
    use crate::widget::CellMetrics;

    #[test]
    fn wide_terminal_gets_a_card_beside_the_hero() {
        let layout = Layout::for_size(120, 40);
        let card = layout.card.expect("card fits");
        assert_eq!(card.x, 62);
        assert_eq!(card.width, 56);
        assert!(card.y + card.height <= layout.form.y);
        assert!(layout.hero.x + layout.hero.width < card.x);
        assert_eq!(layout.footer.y, 39);
        assert_eq!(layout.form.y + layout.form.height, layout.footer.y);
    }

    #[test]
    fn small_terminal_has_no_card() {
        assert_eq!(Layout::for_size(50, 40).card, None);
        assert_eq!(Layout::for_size(120, 12).card, None);
        let tiny = Layout::for_size(0, 0);
        assert_eq!(tiny.card, None);
        assert_eq!(tiny.form.height, 0);
    }

    #[test]
    fn rect_contains_is_half_open() {
        let rect = Rect {
            x: 2,
            y: 3,
            width: 4,
            height: 2,
        };
        assert!(rect.contains(2, 3));
        assert!(rect.contains(5, 4));
        assert!(!rect.contains(6, 4));
        assert!(!rect.contains(5, 5));
        assert!(!rect.contains(1, 3));
    }

    #[test]
    fn wrap_breaks_on_words_and_splits_long_ones() {
        assert_eq!(wrap("copy and continue", 8), vec!["copy and", "continue"]);
        assert_eq!(wrap("abcdefghij", 4), vec!["abcd", "efgh", "ij"]);
        assert!(wrap("", 10).is_empty());
    }

    #[test]
    fn render_paints_every_section() {
        let layout = Layout::for_size(120, 40);
        let mut state = AppState::new(Theme::Dark, true);
        state.draft.name = "Asha".into();
        state.show_banner(BannerKind::Notice, "Copied");
        let mut card = CardWidget::new(TiltConfig::default(), CellMetrics::default());
        let mut out = Vec::new();
        render(&mut out, &layout, &state, &mut card, "https://example.com/sheet").unwrap();
        let painted = String::from_utf8(out).unwrap();
        for needle in [
            "Shred Studio",
            "Plan Two  ₹2000/mo  Exercise + Diet Plan  POPULAR",
            "Ready to transform?",
            "Asha▏",
            "Plan One: ₹1500/mo",
            "Rotate X: 0.00, Rotate Y: 0.00",
            "Copied",
            "All rights reserved.",
        ] {
            assert!(painted.contains(needle), "missing {needle:?}");
        }
    }
}
