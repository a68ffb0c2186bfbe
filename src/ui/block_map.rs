use crate::analyzer::Analyzer;
use crate::models::file_record::FileRecord;
use crate::ui::theme::Theme;
use crate::util::human::fmt_count;
use ratatui::{
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

/// Geometry of the block grid: which block range each cell covers and
/// which rows are on screen. Cell `i` covers `[i * scale, (i + 1) * scale)`.
#[derive(Debug, Clone, PartialEq)]
pub struct MapView {
    pub scale:      u64,
    pub blocks:     u64,
    pub cursor:     u64,
    pub row_offset: u64,
    pub cols:       u64,
    pub rows:       u64,
}

impl MapView {
    pub fn new(blocks: u64, scale: u64) -> Self {
        Self { scale: scale.max(1), blocks, cursor: 0, row_offset: 0, cols: 1, rows: 1 }
    }

    pub fn cells(&self) -> u64 {
        self.blocks.div_ceil(self.scale)
    }

    pub fn total_rows(&self) -> u64 {
        self.cells().div_ceil(self.cols)
    }

    pub fn cell_range(&self, cell: u64) -> (u64, u64) {
        let start = cell.saturating_mul(self.scale);
        (start, start.saturating_add(self.scale))
    }

    pub fn cursor_range(&self) -> (u64, u64) {
        self.cell_range(self.cursor)
    }

    /// Called with the inner map area on every draw.
    pub fn set_viewport(&mut self, cols: u16, rows: u16) {
        self.cols = (cols as u64).max(1);
        self.rows = (rows as u64).max(1);
        self.clamp();
    }

    pub fn set_blocks(&mut self, blocks: u64) {
        self.blocks = blocks;
        self.clamp();
    }

    pub fn move_by(&mut self, delta: i64) {
        let last = self.cells().saturating_sub(1);
        self.cursor = if delta < 0 {
            self.cursor.saturating_sub(delta.unsigned_abs())
        } else {
            self.cursor.saturating_add(delta as u64).min(last)
        };
        self.ensure_visible();
    }

    pub fn move_rows(&mut self, delta: i64) {
        self.move_by(delta.saturating_mul(self.cols as i64));
    }

    pub fn page(&mut self, dir: i64) {
        self.move_rows(dir.saturating_mul(self.rows as i64));
    }

    pub fn jump_top(&mut self) {
        self.cursor = 0;
        self.ensure_visible();
    }

    pub fn jump_bottom(&mut self) {
        self.cursor = self.cells().saturating_sub(1);
        self.ensure_visible();
    }

    /// Scrolls the viewport without moving the cursor.
    pub fn scroll(&mut self, delta: i64) {
        let max = self.total_rows().saturating_sub(self.rows);
        self.row_offset = if delta < 0 {
            self.row_offset.saturating_sub(delta.unsigned_abs())
        } else {
            self.row_offset.saturating_add(delta as u64).min(max)
        };
    }

    /// Halves blocks per cell (floor 1), keeping the cursor's block in view.
    pub fn zoom_in(&mut self) {
        self.rescale((self.scale / 2).max(1));
    }

    /// Doubles blocks per cell.
    pub fn zoom_out(&mut self) {
        self.rescale(self.scale.saturating_mul(2));
    }

    fn rescale(&mut self, scale: u64) {
        let block = self.cursor_range().0;
        self.scale  = scale;
        self.cursor = block / scale;
        self.clamp();
        self.ensure_visible();
    }

    /// Cell under a point inside the map's inner area.
    pub fn cell_at(&self, col: u16, row: u16) -> Option<u64> {
        let (col, row) = (col as u64, row as u64);
        if col >= self.cols || row >= self.rows {
            return None;
        }
        let cell = (self.row_offset + row) * self.cols + col;
        (cell < self.cells()).then_some(cell)
    }

    fn ensure_visible(&mut self) {
        let row = self.cursor / self.cols;
        if row < self.row_offset {
            self.row_offset = row;
        } else if row >= self.row_offset + self.rows {
            self.row_offset = row + 1 - self.rows;
        }
    }

    fn clamp(&mut self) {
        self.cursor = self.cursor.min(self.cells().saturating_sub(1));
        let max_offset = self.total_rows().saturating_sub(self.rows);
        self.row_offset = self.row_offset.min(max_offset);
    }
}

// ── Rendering ─────────────────────────────────────────────────────────

const SHADES: [char; 4] = ['·', '░', '▒', '█'];

fn cell_glyph(count: usize, theme: &Theme) -> (char, Style) {
    match count {
        0     => (SHADES[0], theme.cell_free),
        1     => (SHADES[1], theme.cell_low),
        2..=3 => (SHADES[2], theme.cell_mid),
        _     => (SHADES[3], theme.cell_high),
    }
}

pub fn render_block_map(
    f: &mut Frame,
    area: Rect,
    view: &mut MapView,
    analyzer: &Analyzer,
    selected: Option<&FileRecord>,
    focused: bool,
    theme: &Theme,
) {
    let border_style = if focused { theme.border_focused } else { theme.border };
    let title = format!(
        "Block map  (1 cell = {} blocks, {} cells)",
        fmt_count(view.scale),
        fmt_count(view.cells()),
    );
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style)
        .title(Span::styled(title, theme.title));
    let inner = block.inner(area);
    f.render_widget(block, area);

    view.set_viewport(inner.width, inner.height);
    let cells = view.cells();

    let mut lines = Vec::with_capacity(inner.height as usize);
    for row in 0..view.rows {
        let mut spans = Vec::with_capacity(view.cols as usize);
        for col in 0..view.cols {
            let cell = (view.row_offset + row) * view.cols + col;
            if cell >= cells {
                break;
            }
            let (start, end) = view.cell_range(cell);
            let (mut glyph, mut style) = cell_glyph(analyzer.count_overlapping(start, end), theme);
            if selected.is_some_and(|rec| rec.touches(start, end)) {
                glyph = SHADES[3];
                style = theme.cell_selected_file;
            }
            if focused && cell == view.cursor {
                style = theme.cell_cursor;
            }
            spans.push(Span::styled(glyph.to_string(), style));
        }
        lines.push(Line::from(spans));
    }

    if cells == 0 {
        lines.push(Line::from(Span::styled("  no extents indexed", theme.text_dim)));
    }
    f.render_widget(Paragraph::new(lines), inner);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn view() -> MapView {
        let mut v = MapView::new(10_000, 10);
        v.set_viewport(10, 5);
        v
    }

    #[test]
    fn cells_round_up() {
        assert_eq!(MapView::new(10_001, 10).cells(), 1001);
        assert_eq!(MapView::new(0, 10).cells(), 0);
        assert_eq!(MapView::new(5, 0).scale, 1);
    }

    #[test]
    fn cursor_moves_and_scrolls_into_view() {
        let mut v = view();
        v.move_rows(7);
        assert_eq!(v.cursor, 70);
        assert_eq!(v.row_offset, 3);
        v.move_by(-1000);
        assert_eq!(v.cursor, 0);
        assert_eq!(v.row_offset, 0);
        v.jump_bottom();
        assert_eq!(v.cursor, 999);
        assert_eq!(v.row_offset, 95);
    }

    #[test]
    fn zoom_keeps_the_cursor_block() {
        let mut v = view();
        v.move_by(25); // blocks [250, 260)
        v.zoom_in();
        assert_eq!(v.scale, 5);
        assert_eq!(v.cursor, 50);
        v.zoom_out();
        v.zoom_out();
        assert_eq!(v.scale, 20);
        assert_eq!(v.cursor_range(), (240, 260));
    }

    #[test]
    fn zoom_in_floors_at_one_block() {
        let mut v = MapView::new(100, 1);
        v.zoom_in();
        assert_eq!(v.scale, 1);
    }

    #[test]
    fn click_maps_to_cell() {
        let mut v = view();
        v.scroll(2);
        assert_eq!(v.cell_at(3, 1), Some(33));
        assert_eq!(v.cell_at(10, 0), None);
        v.jump_bottom();
        assert_eq!(v.cell_at(9, 4), Some(999));
    }

    #[test]
    fn scroll_is_bounded() {
        let mut v = view();
        v.scroll(1_000_000);
        assert_eq!(v.row_offset, 95);
        v.scroll(-1_000_000);
        assert_eq!(v.row_offset, 0);
    }
}
