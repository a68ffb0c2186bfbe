use crate::analyzer::Analyzer;
use crate::collectors::filesystem;
use crate::collectors::walk::WalkOptions;
use crate::config::Config;
use crate::input::{handle_key, Action};
use crate::models::file_record::{FileRecord, FragmentationSummary};
use crate::ui::block_map::MapView;
use crate::ui::theme::{Theme, ThemeVariant};
use crate::ui::{dashboard, help};
use crate::util::human::{fmt_block_range, fmt_bytes, fmt_count};
use anyhow::Result;
use crossterm::event::{self, Event, KeyModifiers, MouseButton, MouseEventKind};
use ratatui::layout::Rect;
use ratatui::widgets::TableState;
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Focus {
    Map,
    Table,
}

const POLL_TIMEOUT: Duration = Duration::from_millis(250);

pub struct App {
    // Theme
    pub theme:         Theme,
    pub theme_variant: ThemeVariant,

    pub analyzer: Analyzer,
    /// (device, mount point, fstype) of the scanned root.
    pub mount:    Option<(String, String, String)>,
    /// Totals for the header, refreshed after every scan.
    pub summary:  FragmentationSummary,

    // Block map
    pub map:      MapView,
    pub map_area: Option<Rect>,

    // File table
    pub focus:       Focus,
    pub table:       Vec<FileRecord>,
    pub table_title: String,
    pub table_state: TableState,
    pub table_area:  Option<Rect>,

    /// Snapshot of the file whose extents are highlighted. Owned, so a
    /// rescan that drops the file from the store leaves it intact.
    pub selected: Option<FileRecord>,

    pub status:          String,
    pub status_is_error: bool,
    pub top_k:           usize,

    pub show_help:   bool,
    pub should_quit: bool,
    pending_rescan:  bool,
}

impl App {
    pub fn new(config: &Config, root: &Path, theme: ThemeVariant, scale: Option<u64>, top_k: usize) -> Self {
        let walk = WalkOptions { one_file_system: config.scan.one_file_system };
        let analyzer = Analyzer::new(config.block_size(), config.scan.sync_before_map, walk);
        let scale = scale.unwrap_or(config.view.initial_scale);
        Self::with_analyzer(analyzer, root, theme, scale, top_k)
    }

    pub fn with_analyzer(
        analyzer: Analyzer,
        root:     &Path,
        theme:    ThemeVariant,
        scale:    u64,
        top_k:    usize,
    ) -> Self {
        let mut app = Self {
            theme:         Theme::for_variant(theme),
            theme_variant: theme,
            analyzer,
            mount:         None,
            summary:       FragmentationSummary::default(),
            map:           MapView::new(0, scale),
            map_area:      None,
            focus:         Focus::Map,
            table:         Vec::new(),
            table_title:   String::new(),
            table_state:   TableState::default(),
            table_area:    None,
            selected:      None,
            status:        String::new(),
            status_is_error: false,
            top_k:         top_k.max(1),
            show_help:     false,
            should_quit:   false,
            pending_rescan: false,
        };
        let stats = app.analyzer.scan(root).clone();
        app.after_scan();
        app.set_status(format!(
            "scanned {} files, {} extents ({} skipped) in {} ms",
            fmt_count(stats.files_mapped as u64),
            fmt_count(app.analyzer.total_extents() as u64),
            fmt_count(stats.files_skipped as u64),
            stats.elapsed.as_millis(),
        ));
        app.show_top(TopList::Extents);
        app
    }

    // ── Main event loop ───────────────────────────────────────────────

    pub fn run<B: ratatui::backend::Backend>(
        &mut self,
        terminal: &mut ratatui::Terminal<B>,
    ) -> Result<()> {
        loop {
            let show_help  = self.show_help;
            let theme_snap = self.theme.clone();

            terminal.draw(|f| {
                dashboard::render(f, self);
                if show_help {
                    help::render(f, &theme_snap);
                }
            })?;

            if self.pending_rescan {
                self.pending_rescan = false;
                self.rescan();
                continue;
            }

            if event::poll(POLL_TIMEOUT)? {
                match event::read()? {
                    Event::Key(key) => {
                        let action = handle_key(key);
                        self.handle_action(action);
                    }
                    Event::Mouse(me) => {
                        let zoom = me.modifiers.contains(KeyModifiers::CONTROL);
                        match me.kind {
                            MouseEventKind::ScrollDown if zoom => self.handle_action(Action::ZoomOut),
                            MouseEventKind::ScrollUp   if zoom => self.handle_action(Action::ZoomIn),
                            MouseEventKind::ScrollDown => self.scroll(me.column, me.row, 1),
                            MouseEventKind::ScrollUp   => self.scroll(me.column, me.row, -1),
                            MouseEventKind::Down(MouseButton::Left) => {
                                self.handle_mouse_click(me.column, me.row);
                            }
                            _ => {}
                        }
                    }
                    _ => {}
                }
            }

            if self.should_quit { break; }
        }
        Ok(())
    }

    // ── Input dispatch ────────────────────────────────────────────────

    pub fn handle_action(&mut self, action: Action) {
        if self.show_help {
            match action {
                Action::Quit => self.should_quit = true,
                Action::ShowHelp | Action::Back => { self.show_help = false; }
                _ => {}
            }
            return;
        }

        match action {
            Action::Quit     => self.should_quit = true,
            Action::ShowHelp => { self.show_help = true; }

            Action::CycleTheme => {
                self.theme_variant = self.theme_variant.next();
                self.theme = Theme::for_variant(self.theme_variant);
            }

            Action::FocusNext => {
                self.focus = match self.focus {
                    Focus::Map   => Focus::Table,
                    Focus::Table => Focus::Map,
                };
            }

            Action::Back => {
                if self.selected.take().is_some() {
                    self.set_status("selection cleared".into());
                }
            }

            Action::TopByExtents => self.show_top(TopList::Extents),
            Action::TopBySize    => self.show_top(TopList::Size),

            Action::Rescan => {
                self.selected = None;
                self.set_status("scanning…".into());
                self.pending_rescan = true;
            }

            Action::ZoomIn  => { self.map.zoom_in();  self.report_cursor(); }
            Action::ZoomOut => { self.map.zoom_out(); self.report_cursor(); }

            Action::Confirm => match self.focus {
                Focus::Map   => self.inspect_cell(self.map.cursor),
                Focus::Table => self.select_row(),
            },

            Action::Up       => self.navigate(-1, Axis::Row),
            Action::Down     => self.navigate(1, Axis::Row),
            Action::Left     => self.navigate(-1, Axis::Cell),
            Action::Right    => self.navigate(1, Axis::Cell),
            Action::PageUp   => self.navigate(-1, Axis::Page),
            Action::PageDown => self.navigate(1, Axis::Page),

            Action::JumpTop => match self.focus {
                Focus::Map   => self.map.jump_top(),
                Focus::Table => self.table_select(0),
            },
            Action::JumpBottom => match self.focus {
                Focus::Map   => self.map.jump_bottom(),
                Focus::Table => self.table_select(self.table.len().saturating_sub(1)),
            },

            Action::None => {}
        }
    }

    fn navigate(&mut self, dir: i64, axis: Axis) {
        match self.focus {
            Focus::Map => match axis {
                Axis::Cell => self.map.move_by(dir),
                Axis::Row  => self.map.move_rows(dir),
                Axis::Page => self.map.page(dir),
            },
            Focus::Table => {
                let step = match axis {
                    Axis::Page => 10,
                    _          => 1,
                };
                let cur  = self.table_state.selected().unwrap_or(0) as i64;
                let next = (cur + dir * step).max(0) as usize;
                self.table_select(next);
            }
        }
    }

    fn table_select(&mut self, idx: usize) {
        if self.table.is_empty() {
            self.table_state.select(None);
        } else {
            self.table_state.select(Some(idx.min(self.table.len() - 1)));
        }
    }

    // ── Mouse ─────────────────────────────────────────────────────────

    fn scroll(&mut self, col: u16, row: u16, delta: i64) {
        if hit(self.table_area, col, row) {
            self.focus = Focus::Table;
            self.navigate(delta, Axis::Row);
        } else {
            self.map.scroll(delta);
        }
    }

    fn handle_mouse_click(&mut self, col: u16, row: u16) {
        let in_map   = hit(self.map_area, col, row);
        let in_table = hit(self.table_area, col, row);
        if let (true, Some(area)) = (in_map, self.map_area) {
            self.focus = Focus::Map;
            // Inside the border.
            let (x, y) = (col.saturating_sub(area.x + 1), row.saturating_sub(area.y + 1));
            if col > area.x && row > area.y {
                if let Some(cell) = self.map.cell_at(x, y) {
                    self.map.cursor = cell;
                    self.inspect_cell(cell);
                }
            }
        } else if let (true, Some(area)) = (in_table, self.table_area) {
            self.focus = Focus::Table;
            // Border plus header row.
            let top = area.y + 2;
            if row >= top {
                let idx = (row - top) as usize + self.table_state.offset();
                if idx < self.table.len() {
                    self.table_state.select(Some(idx));
                    self.select_row();
                }
            }
        }
    }

    // ── Queries ───────────────────────────────────────────────────────

    fn inspect_cell(&mut self, cell: u64) {
        let (start, end) = self.map.cell_range(cell);
        let files = self.analyzer.distinct_overlapping(start, end);
        let found = files.len();
        if !files.is_empty() {
            self.table_title = format!("Blocks {}", fmt_block_range(start, end));
            self.table = files;
            self.table_state = TableState::default();
            self.table_select(0);
        }
        self.selected = None;
        self.set_status(format!(
            "index[{}] scale[{}] block[{}-->{}] files[{}]",
            cell, self.map.scale, start, end.saturating_sub(1), found,
        ));
    }

    fn report_cursor(&mut self) {
        let (start, end) = self.map.cursor_range();
        self.set_status(format!(
            "index[{}] scale[{}] block[{}-->{}]",
            self.map.cursor, self.map.scale, start, end.saturating_sub(1),
        ));
    }

    fn select_row(&mut self) {
        let Some(path) = self
            .table_state
            .selected()
            .and_then(|i| self.table.get(i))
            .map(|r| r.path.clone())
        else {
            return;
        };
        match self.analyzer.lookup_by_path(&path) {
            Ok(rec) => {
                let first = rec.extents.first().map_or(0, |e| e.start);
                let last  = rec.extents.last().map_or(0, |e| e.last_block());
                self.set_status(format!(
                    "selected {}  extents {}  size {}  blocks {} in [{}-{}]",
                    rec.path,
                    rec.extent_count,
                    fmt_bytes(rec.size),
                    fmt_count(rec.allocated_blocks()),
                    first,
                    last,
                ));
                self.selected = Some(rec);
            }
            Err(e) => {
                tracing::warn!(error = %e, "selection failed");
                self.set_error(e.to_string());
            }
        }
    }

    fn show_top(&mut self, list: TopList) {
        let k = self.top_k;
        let (title, files) = match list {
            TopList::Extents => (format!("Most fragmented (top {k})"), self.analyzer.top_by_extent_count(k)),
            TopList::Size    => (format!("Largest (top {k})"), self.analyzer.top_by_size(k)),
        };
        self.table_title = title;
        self.table = files;
        self.table_state = TableState::default();
        self.table_select(0);
    }

    // ── Scan ──────────────────────────────────────────────────────────

    fn rescan(&mut self) {
        let Some(stats) = self.analyzer.rescan().cloned() else {
            self.set_error("nothing to rescan".into());
            return;
        };
        self.after_scan();
        self.show_top(TopList::Extents);
        self.set_status(format!(
            "rescanned {} files, {} extents ({} skipped) in {} ms",
            fmt_count(stats.files_mapped as u64),
            fmt_count(self.analyzer.total_extents() as u64),
            fmt_count(stats.files_skipped as u64),
            stats.elapsed.as_millis(),
        ));
    }

    fn after_scan(&mut self) {
        self.map.set_blocks(self.analyzer.map_extent());
        self.mount = self.analyzer.root().and_then(filesystem::mount_of);
        self.summary = self.analyzer.summary();
    }

    fn set_status(&mut self, msg: String) {
        self.status = msg;
        self.status_is_error = false;
    }

    fn set_error(&mut self, msg: String) {
        self.status = msg;
        self.status_is_error = true;
    }
}

#[derive(Clone, Copy)]
enum TopList {
    Extents,
    Size,
}

#[derive(Clone, Copy)]
enum Axis {
    Cell,
    Row,
    Page,
}

fn hit(area: Option<Rect>, col: u16, row: u16) -> bool {
    area.is_some_and(|a| col >= a.x && col < a.x + a.width && row >= a.y && row < a.y + a.height)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collectors::walk::tests::three_file_tree;
    use crate::models::extent::BlockSize;

    fn app() -> (tempfile::TempDir, App) {
        let (dir, source) = three_file_tree();
        let analyzer = Analyzer::with_source(Box::new(source), BlockSize::DEFAULT, WalkOptions::default());
        let app = App::with_analyzer(analyzer, dir.path(), ThemeVariant::Default, 10, 5);
        (dir, app)
    }

    #[test]
    fn starts_with_most_fragmented_list() {
        let (_dir, app) = app();
        assert_eq!(app.table.len(), 2);
        assert_eq!(app.table[0].extent_count, 1);
        assert_eq!(app.table_state.selected(), Some(0));
        assert!(app.map.blocks >= 61);
    }

    #[test]
    fn inspecting_a_cell_fills_table_and_clears_selection() {
        let (_dir, mut app) = app();
        app.focus = Focus::Table;
        app.handle_action(Action::Confirm);
        assert!(app.selected.is_some());

        // Cell 5 covers blocks [50, 60).
        app.inspect_cell(5);
        assert!(app.selected.is_none());
        assert_eq!(app.table.len(), 1);
        assert!(app.table[0].path.ends_with("sub/b"));
        assert_eq!(app.status, "index[5] scale[10] block[50-->59] files[1]");
    }

    #[test]
    fn empty_cell_keeps_previous_table() {
        let (_dir, mut app) = app();
        app.handle_action(Action::TopBySize);
        let before = app.table.clone();
        app.inspect_cell(4); // [40, 50) is free
        assert_eq!(app.table, before);
        assert!(app.status.ends_with("files[0]"));
    }

    #[test]
    fn esc_clears_selection() {
        let (_dir, mut app) = app();
        app.handle_action(Action::FocusNext);
        app.handle_action(Action::Confirm);
        assert!(app.selected.is_some());
        app.handle_action(Action::Back);
        assert!(app.selected.is_none());
    }

    #[test]
    fn rescan_clears_selection() {
        let (_dir, mut app) = app();
        app.handle_action(Action::FocusNext);
        app.handle_action(Action::Confirm);
        app.handle_action(Action::Rescan);
        assert!(app.selected.is_none());
        app.rescan();
        assert_eq!(app.analyzer.file_count(), 2);
        assert!(!app.status_is_error);
    }

    #[test]
    fn header_totals_follow_rescans() {
        let (dir, mut app) = app();
        assert_eq!(app.summary, app.analyzer.summary());
        assert_eq!(app.summary.files, 2);
        assert!(app.status.starts_with("scanned 2 files, 2 extents (1 skipped)"));

        std::fs::remove_file(dir.path().join("sub").join("b")).unwrap();
        app.rescan();
        assert_eq!(app.summary.files, 1);
        assert_eq!(app.summary.extents, 1);
        assert_eq!(app.summary, app.analyzer.summary());
        assert!(app.status.starts_with("rescanned 1 files, 1 extents"));
    }

    #[test]
    fn help_swallows_other_actions() {
        let (_dir, mut app) = app();
        app.handle_action(Action::ShowHelp);
        app.handle_action(Action::TopBySize);
        assert_eq!(app.table_title, "Most fragmented (top 5)");
        app.handle_action(Action::Back);
        assert!(!app.show_help);
    }

    #[test]
    fn zoom_reports_cursor() {
        let (_dir, mut app) = app();
        app.handle_action(Action::ZoomIn);
        assert_eq!(app.map.scale, 5);
        assert_eq!(app.status, "index[0] scale[5] block[0-->4]");
    }
}
