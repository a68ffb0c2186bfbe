use crate::ui::theme::Theme;
use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

pub fn render(f: &mut Frame, theme: &Theme) {
    let area = centered_rect(64, 28, f.area());
    f.render_widget(Clear, area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme.border_focused)
        .title(Span::styled(" fragmap — Keybindings (? or Esc to close) ", theme.title));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let lines = vec![
        key_line(theme, "Global", ""),
        key_line(theme, "  q / Ctrl-C",  "Quit"),
        key_line(theme, "  Tab",         "Switch focus map / table"),
        key_line(theme, "  e",           "Most fragmented files"),
        key_line(theme, "  s",           "Largest files"),
        key_line(theme, "  r",           "Rescan the same root"),
        key_line(theme, "  t",           "Cycle color theme"),
        key_line(theme, "  Esc",         "Clear selected file"),
        Line::from(""),
        key_line(theme, "Block map", ""),
        key_line(theme, "  ←↑↓→ / hjkl", "Move cursor"),
        key_line(theme, "  PgUp / PgDn", "Page up / down"),
        key_line(theme, "  g / G",       "First / last cell"),
        key_line(theme, "  + / -",       "Zoom in / out (blocks per cell)"),
        key_line(theme, "  Enter / click", "List files in cell"),
        key_line(theme, "  Ctrl+wheel",  "Zoom"),
        Line::from(""),
        key_line(theme, "File table", ""),
        key_line(theme, "  ↑↓ / jk",     "Select row"),
        key_line(theme, "  Enter / click", "Highlight file extents on map"),
        Line::from(""),
        key_line(theme, "Legend", ""),
        key_line(theme, "  · ░ ▒ █",     "0 / 1 / 2-3 / 4+ extents in cell"),
        Line::from(""),
        key_line(theme, "Config  ~/.config/fragmap/fragmap.toml", ""),
        key_line(theme, "  Log   ~/.local/share/fragmap/fragmap.log", ""),
    ];

    f.render_widget(Paragraph::new(lines), inner);
}

fn key_line<'a>(theme: &Theme, key: &'a str, desc: &'a str) -> Line<'a> {
    if desc.is_empty() {
        Line::from(vec![Span::styled(key, theme.title)])
    } else {
        Line::from(vec![
            Span::styled(format!("{:<18}", key), theme.footer_key),
            Span::styled(desc, theme.text_dim),
        ])
    }
}

/// A `width` x `height` rect centered in `r`, capped at its size.
fn centered_rect(width: u16, height: u16, r: Rect) -> Rect {
    let w = width.min(r.width);
    let h = height.min(r.height);
    let x = r.x + (r.width.saturating_sub(w)) / 2;
    let y = r.y + (r.height.saturating_sub(h)) / 2;
    Rect::new(x, y, w, h)
}
