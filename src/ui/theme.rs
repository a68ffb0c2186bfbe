use ratatui::style::{Color, Modifier, Style};

// ── Helper: build an Rgb Color from a hex literal ──────────────────────

const fn rgb(hex: u32) -> Color {
    Color::Rgb(
        ((hex >> 16) & 0xFF) as u8,
        ((hex >>  8) & 0xFF) as u8,
        ( hex        & 0xFF) as u8,
    )
}

// ── Theme variant selector ──────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ThemeVariant {
    Default,
    Dracula,
    Gruvbox,
    Nord,
}

impl ThemeVariant {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Default => "Default",
            Self::Dracula => "Dracula",
            Self::Gruvbox => "Gruvbox",
            Self::Nord    => "Nord",
        }
    }

    pub fn next(&self) -> Self {
        match self {
            Self::Default => Self::Dracula,
            Self::Dracula => Self::Gruvbox,
            Self::Gruvbox => Self::Nord,
            Self::Nord    => Self::Default,
        }
    }

    pub fn from_name(name: &str) -> Self {
        match name.to_lowercase().as_str() {
            "dracula" => Self::Dracula,
            "gruvbox" => Self::Gruvbox,
            "nord"    => Self::Nord,
            _         => Self::Default,
        }
    }
}

// ── Palettes ────────────────────────────────────────────────────────────

/// The handful of colors a theme is derived from.
struct Palette {
    fg:     Color,
    dim:    Color,
    accent: Color,
    bar:    Color,
    // Block map shading, lightest to densest.
    low:    Color,
    mid:    Color,
    high:   Color,
    hot:    Color,
    good:   Color,
    warn:   Color,
}

const DEFAULT: Palette = Palette {
    fg: Color::White, dim: Color::DarkGray, accent: Color::Cyan, bar: Color::DarkGray,
    low: Color::Green, mid: Color::LightGreen, high: Color::Yellow, hot: Color::Red,
    good: Color::Green, warn: Color::Yellow,
};

// https://draculatheme.com/
const DRACULA: Palette = Palette {
    fg: rgb(0xf8f8f2), dim: rgb(0x6272a4), accent: rgb(0xbd93f9), bar: rgb(0x44475a),
    low: rgb(0x50fa7b), mid: rgb(0x8be9fd), high: rgb(0xf1fa8c), hot: rgb(0xff5555),
    good: rgb(0x50fa7b), warn: rgb(0xffb86c),
};

// https://github.com/morhetz/gruvbox
const GRUVBOX: Palette = Palette {
    fg: rgb(0xebdbb2), dim: rgb(0xa89984), accent: rgb(0x83a598), bar: rgb(0x3c3836),
    low: rgb(0xb8bb26), mid: rgb(0x8ec07c), high: rgb(0xfabd2f), hot: rgb(0xfb4934),
    good: rgb(0xb8bb26), warn: rgb(0xfe8019),
};

// https://www.nordtheme.com/
const NORD: Palette = Palette {
    fg: rgb(0xe5e9f0), dim: rgb(0x4c566a), accent: rgb(0x88c0d0), bar: rgb(0x3b4252),
    low: rgb(0xa3be8c), mid: rgb(0x8fbcbb), high: rgb(0xebcb8b), hot: rgb(0xbf616a),
    good: rgb(0xa3be8c), warn: rgb(0xd08770),
};

// ── Theme struct ────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct Theme {
    pub border:             Style,
    pub border_focused:     Style,
    pub title:              Style,
    pub text:               Style,
    pub text_dim:           Style,
    pub selected:           Style,
    pub header:             Style,
    pub ok:                 Style,
    pub warn:               Style,
    pub cell_free:          Style,
    pub cell_low:           Style,
    pub cell_mid:           Style,
    pub cell_high:          Style,
    pub cell_selected_file: Style,
    pub cell_cursor:        Style,
    pub footer_bg:          Style,
    pub footer_key:         Style,
    pub footer_text:        Style,
}

impl Theme {
    pub fn for_variant(v: ThemeVariant) -> Self {
        let p = match v {
            ThemeVariant::Default => &DEFAULT,
            ThemeVariant::Dracula => &DRACULA,
            ThemeVariant::Gruvbox => &GRUVBOX,
            ThemeVariant::Nord    => &NORD,
        };
        Self::from_palette(p)
    }

    fn from_palette(p: &Palette) -> Self {
        let bold = Modifier::BOLD;
        Self {
            border:             Style::default().fg(p.dim),
            border_focused:     Style::default().fg(p.accent),
            title:              Style::default().fg(p.fg).add_modifier(bold),
            text:               Style::default().fg(p.fg),
            text_dim:           Style::default().fg(p.dim),
            selected:           Style::default().fg(Color::Black).bg(p.accent),
            header:             Style::default().fg(p.fg).bg(p.bar).add_modifier(bold),
            ok:                 Style::default().fg(p.good),
            warn:               Style::default().fg(p.warn),
            cell_free:          Style::default().fg(p.dim),
            cell_low:           Style::default().fg(p.low),
            cell_mid:           Style::default().fg(p.mid),
            cell_high:          Style::default().fg(p.high),
            cell_selected_file: Style::default().fg(p.hot).add_modifier(bold),
            cell_cursor:        Style::default().fg(Color::Black).bg(p.accent),
            footer_bg:          Style::default().bg(p.bar).fg(p.fg),
            footer_key:         Style::default().bg(p.bar).fg(p.accent).add_modifier(bold),
            footer_text:        Style::default().bg(p.bar).fg(p.dim),
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::for_variant(ThemeVariant::Default)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn variant_names_round_trip() {
        let mut v = ThemeVariant::Default;
        for _ in 0..4 {
            assert_eq!(ThemeVariant::from_name(v.name()), v);
            v = v.next();
        }
        assert_eq!(v, ThemeVariant::Default);
        assert_eq!(ThemeVariant::from_name("bogus"), ThemeVariant::Default);
    }
}
