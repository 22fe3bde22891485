use ratatui::style::{Color, Modifier, Style};

pub struct Theme {
    pub bg: Color,
    pub surface: Color,
    pub surface_bright: Color,
    pub text: Color,
    pub text_muted: Color,
    pub text_accent: Color,
    pub brand: Color,
    pub success: Color,
    pub error: Color,
    pub warning: Color,
    pub info: Color,
    pub selected_bg: Color,
    pub selected_fg: Color,
    pub border: Color,
    pub border_focused: Color,
    pub eth_value: Color,
    pub address_color: Color,
    pub hash_color: Color,
}

// slate-950 background, purple brand accent
pub const THEME: Theme = Theme {
    bg: Color::Rgb(2, 6, 23),
    surface: Color::Rgb(15, 23, 42),
    surface_bright: Color::Rgb(30, 41, 59),
    text: Color::Rgb(226, 232, 240),
    text_muted: Color::Rgb(100, 116, 139),
    text_accent: Color::Cyan,
    brand: Color::Rgb(168, 85, 247),
    success: Color::Green,
    error: Color::Red,
    warning: Color::Yellow,
    info: Color::Rgb(96, 165, 250),
    selected_bg: Color::Rgb(51, 65, 85),
    selected_fg: Color::White,
    border: Color::Rgb(51, 65, 85),
    border_focused: Color::Rgb(168, 85, 247),
    eth_value: Color::Rgb(98, 126, 234),
    address_color: Color::Rgb(255, 179, 71),
    hash_color: Color::Rgb(150, 150, 180),
};

impl Theme {
    pub const fn header_style(&self) -> Style {
        Style::new().fg(self.text).bg(self.surface)
    }

    pub const fn selected_style(&self) -> Style {
        Style::new().fg(self.selected_fg).bg(self.selected_bg).add_modifier(Modifier::BOLD)
    }

    pub const fn border_style(&self) -> Style {
        Style::new().fg(self.border)
    }

    pub const fn border_focused_style(&self) -> Style {
        Style::new().fg(self.border_focused)
    }

    pub const fn muted_style(&self) -> Style {
        Style::new().fg(self.text_muted)
    }

    pub const fn accent_style(&self) -> Style {
        Style::new().fg(self.text_accent)
    }

    pub const fn brand_style(&self) -> Style {
        Style::new().fg(self.brand).add_modifier(Modifier::BOLD)
    }

    pub const fn success_style(&self) -> Style {
        Style::new().fg(self.success)
    }

    pub const fn error_style(&self) -> Style {
        Style::new().fg(self.error)
    }

    pub const fn warning_style(&self) -> Style {
        Style::new().fg(self.warning)
    }

    pub const fn info_style(&self) -> Style {
        Style::new().fg(self.info)
    }

    pub const fn button_style(&self) -> Style {
        Style::new().fg(Color::Black).bg(self.text).add_modifier(Modifier::BOLD)
    }

    pub const fn eth_style(&self) -> Style {
        Style::new().fg(self.eth_value)
    }

    pub const fn address_style(&self) -> Style {
        Style::new().fg(self.address_color)
    }

    pub const fn hash_style(&self) -> Style {
        Style::new().fg(self.hash_color)
    }

    pub const fn table_header_style(&self) -> Style {
        Style::new().fg(self.text).bg(self.surface_bright).add_modifier(Modifier::BOLD)
    }
}
