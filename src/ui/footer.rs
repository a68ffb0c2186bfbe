use crate::app::Focus;
use crate::ui::theme::Theme;
use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

pub fn render_footer(f: &mut Frame, area: Rect, focus: &Focus, has_selection: bool, theme: &Theme) {
    let base: &[(&str, &str)] = match focus {
        Focus::Map => &[
            ("q", "Quit"), ("Tab", "Table"), ("←↑↓→", "Move"), ("Enter", "Inspect"),
            ("+/-", "Zoom"), ("e", "Most frag"), ("s", "Largest"), ("r", "Rescan"),
        ],
        Focus::Table => &[
            ("q", "Quit"), ("Tab", "Map"), ("↑↓/jk", "Select"), ("Enter", "Show on map"),
            ("e", "Most frag"), ("s", "Largest"),
        ],
    };

    let mut spans: Vec<Span> = vec![Span::styled(" ", theme.footer_bg)];
    for (key, desc) in base {
        spans.push(Span::styled(format!(" {} ", key), theme.footer_key));
        spans.push(Span::styled(format!("{}  ", desc), theme.footer_text));
    }
    if has_selection {
        spans.push(Span::styled(" Esc ", theme.footer_key));
        spans.push(Span::styled("Clear selection  ", theme.footer_text));
    }
    spans.push(Span::styled(" t ", theme.footer_key));
    spans.push(Span::styled("Theme  ", theme.footer_text));
    spans.push(Span::styled(" ? ", theme.footer_key));
    spans.push(Span::styled("Help  ", theme.footer_text));

    let para = Paragraph::new(Line::from(spans)).style(theme.footer_bg);
    f.render_widget(para, area);
}
