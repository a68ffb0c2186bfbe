use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Quit,
    FocusNext,
    Up,
    Down,
    Left,
    Right,
    PageUp,
    PageDown,
    JumpTop,
    JumpBottom,
    ZoomIn,        // +: halve blocks per cell
    ZoomOut,       // -: double blocks per cell
    Confirm,       // Enter: inspect cell / select file row
    Back,
    TopByExtents,  // e: most fragmented files
    TopBySize,     // s: largest files
    Rescan,        // r: rebuild the index from the same root
    CycleTheme,
    ShowHelp,
    None,
}

pub fn handle_key(key: KeyEvent) -> Action {
    match (key.code, key.modifiers) {
        (KeyCode::Char('q'), _)
        | (KeyCode::Char('c'), KeyModifiers::CONTROL) => Action::Quit,

        (KeyCode::Tab, _) | (KeyCode::BackTab, _) => Action::FocusNext,

        // Navigation: arrow keys and vim hjkl
        (KeyCode::Up,    _) | (KeyCode::Char('k'), _) => Action::Up,
        (KeyCode::Down,  _) | (KeyCode::Char('j'), _) => Action::Down,
        (KeyCode::Left,  _) | (KeyCode::Char('h'), _) => Action::Left,
        (KeyCode::Right, _) | (KeyCode::Char('l'), _) => Action::Right,

        (KeyCode::PageUp,   _) => Action::PageUp,
        (KeyCode::PageDown, _) => Action::PageDown,

        (KeyCode::Char('g'), _) | (KeyCode::Home, _) => Action::JumpTop,
        (KeyCode::Char('G'), _) | (KeyCode::End,  _) => Action::JumpBottom,

        (KeyCode::Char('+'), _) | (KeyCode::Char('='), _) => Action::ZoomIn,
        (KeyCode::Char('-'), _)                           => Action::ZoomOut,

        (KeyCode::Enter, _) => Action::Confirm,
        (KeyCode::Esc,   _) => Action::Back,

        (KeyCode::Char('e'), _) => Action::TopByExtents,
        (KeyCode::Char('s'), _) => Action::TopBySize,
        (KeyCode::Char('r'), _) => Action::Rescan,
        (KeyCode::Char('t'), _) => Action::CycleTheme,
        (KeyCode::Char('?'), _)
        | (KeyCode::F(1), _)   => Action::ShowHelp,

        _ => Action::None,
    }
}
