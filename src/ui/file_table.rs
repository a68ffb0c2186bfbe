use crate::models::file_record::FileRecord;
use crate::ui::theme::Theme;
use crate::util::human::fmt_bytes;
use ratatui::{
    layout::{Constraint, Rect},
    style::{Modifier, Style},
    text::Span,
    widgets::{Block, Borders, Cell, Row, Table, TableState},
    Frame,
};

pub fn render_file_table(
    f: &mut Frame,
    area: Rect,
    title: &str,
    files: &[FileRecord],
    selected_path: Option<&str>,
    state: &mut TableState,
    focused: bool,
    theme: &Theme,
) {
    let border_style = if focused { theme.border_focused } else { theme.border };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style)
        .title(Span::styled(format!("{}  ({})", title, files.len()), theme.title));

    let header_cells = ["Extents", "Size", "Path"]
        .iter()
        .map(|h| Cell::from(*h).style(theme.text_dim));
    let header = Row::new(header_cells)
        .style(Style::default().add_modifier(Modifier::BOLD))
        .height(1);

    let rows: Vec<Row> = files.iter().map(|rec| {
        let marked = selected_path == Some(rec.path.as_str());
        let path_style = if marked { theme.cell_selected_file } else { theme.text };
        let count_style = if rec.is_fragmented() { theme.warn } else { theme.text_dim };
        Row::new(vec![
            Cell::from(format!("{:>7}", rec.extent_count)).style(count_style),
            Cell::from(format!("{:>10}", fmt_bytes(rec.size))).style(theme.text_dim),
            Cell::from(rec.path.clone()).style(path_style),
        ])
    }).collect();

    let widths = [
        Constraint::Length(7),
        Constraint::Length(10),
        Constraint::Min(20),
    ];

    let table = Table::new(rows, widths)
        .header(header)
        .block(block)
        .column_spacing(1)
        .row_highlight_style(if focused { theme.selected } else { Style::default() })
        .highlight_symbol("▶ ");

    f.render_stateful_widget(table, area, state);
}
