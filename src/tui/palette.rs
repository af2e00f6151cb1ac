//! Terminal colors for each `Theme`.

use ratatui::style::{Color, Modifier, Style};

use crate::core::notice::BannerKind;
use crate::core::theme::Theme;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub fg: Color,
    pub muted: Color,
    pub accent: Color,
    pub user: Color,
    pub assistant: Color,
    pub study: Color,
    pub selected: Color,
    pub success: Color,
    pub error: Color,
    pub info: Color,
    pub code_fg: Color,
    pub code_bg: Color,
    /// Name of a theme bundled with syntect's defaults.
    pub syntax_theme: &'static str,
}

impl Palette {
    pub fn for_theme(theme: Theme) -> Self {
        match theme {
            Theme::Dark => Self {
                fg: Color::White,
                muted: Color::DarkGray,
                accent: Color::Cyan,
                user: Color::Green,
                assistant: Color::Blue,
                study: Color::Magenta,
                selected: Color::Cyan,
                success: Color::Green,
                error: Color::Red,
                info: Color::Yellow,
                code_fg: Color::White,
                code_bg: Color::DarkGray,
                syntax_theme: "base16-ocean.dark",
            },
            Theme::Light => Self {
                fg: Color::Black,
                muted: Color::Gray,
                accent: Color::Blue,
                user: Color::Rgb(0, 120, 60),
                assistant: Color::Rgb(20, 60, 160),
                study: Color::Rgb(130, 40, 140),
                selected: Color::Rgb(0, 110, 150),
                success: Color::Rgb(0, 120, 60),
                error: Color::Rgb(180, 20, 20),
                info: Color::Rgb(150, 100, 0),
                code_fg: Color::Black,
                code_bg: Color::Rgb(230, 230, 230),
                syntax_theme: "InspiredGitHub",
            },
        }
    }

    pub fn banner_style(&self, kind: BannerKind) -> Style {
        let color = match kind {
            BannerKind::Info => self.info,
            BannerKind::Success => self.success,
            BannerKind::Error => self.error,
        };
        Style::default().fg(color).add_modifier(Modifier::BOLD)
    }

    pub fn muted_style(&self) -> Style {
        Style::default().fg(self.muted)
    }
}
