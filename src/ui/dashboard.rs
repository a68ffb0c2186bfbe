use crate::app::{App, Focus};
use crate::ui::{block_map::render_block_map, file_table::render_file_table, footer::render_footer};
use crate::util::human::{fmt_bytes, fmt_count};
use ratatui::{
    layout::{Constraint, Direction, Layout},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

// header | map + table | status | footer
pub fn render(f: &mut Frame, app: &mut App) {
    let area = f.area();

    let root = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(0),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(area);

    // ── Header ─────────────────────────────────────────────────────
    let sum   = &app.summary;
    let root_label = app.analyzer.root().map(|p| p.display().to_string()).unwrap_or_default();
    let left  = match &app.mount {
        Some((dev, _, fstype)) => format!(" fragmap — {}  on {} ({}) ", root_label, dev, fstype),
        None                   => format!(" fragmap — {} ", root_label),
    };
    let right = format!(
        " {} files  {} extents  {} fragmented ({:.1}%)  {}  [{}] ",
        fmt_count(sum.files as u64),
        fmt_count(sum.extents as u64),
        fmt_count(sum.fragmented_files as u64),
        sum.fragmented_pct(),
        fmt_bytes(sum.total_bytes),
        app.theme_variant.name(),
    );
    let pad = (area.width as usize).saturating_sub(left.chars().count() + right.chars().count());
    let header = Line::from(vec![
        Span::styled(left, app.theme.title),
        Span::styled(" ".repeat(pad), app.theme.header),
        Span::styled(right, app.theme.text_dim),
    ]);
    f.render_widget(Paragraph::new(header).style(app.theme.header), root[0]);

    // ── Body: map | table ──────────────────────────────────────────
    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(root[1]);

    app.map_area   = Some(body[0]);
    app.table_area = Some(body[1]);

    render_block_map(
        f,
        body[0],
        &mut app.map,
        &app.analyzer,
        app.selected.as_ref(),
        app.focus == Focus::Map,
        &app.theme,
    );
    render_file_table(
        f,
        body[1],
        &app.table_title,
        &app.table,
        app.selected.as_ref().map(|r| r.path.as_str()),
        &mut app.table_state,
        app.focus == Focus::Table,
        &app.theme,
    );

    // ── Status line ────────────────────────────────────────────────
    let status_style = if app.status_is_error { app.theme.warn } else { app.theme.ok };
    f.render_widget(
        Paragraph::new(Line::from(Span::styled(format!(" {}", app.status), status_style))),
        root[2],
    );

    render_footer(f, root[3], &app.focus, app.selected.is_some(), &app.theme);
}
