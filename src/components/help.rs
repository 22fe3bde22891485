use crossterm::event::KeyEvent;
use ratatui::prelude::*;
use ratatui::widgets::*;

use crate::theme::THEME;

pub struct HelpOverlay {
    pub visible: bool,
}

const SECTIONS: &[(&str, &[(&str, &str)])] = &[
    (
        "Pages",
        &[
            ("1", "Home"),
            ("2", "Events"),
            ("3", "My Tickets"),
            ("4", "Create Event"),
            ("Esc", "Go back"),
        ],
    ),
    (
        "Events",
        &[
            ("\u{2191}/k \u{2193}/j", "Move selection"),
            ("Enter / b", "Buy ticket"),
            ("n / p", "Next / previous page"),
        ],
    ),
    (
        "My Tickets",
        &[
            ("t", "Transfer ticket"),
            ("v", "Validate ticket (y to confirm)"),
        ],
    ),
    (
        "Create Event",
        &[
            ("Tab / S-Tab", "Next / previous field"),
            ("\u{2190} \u{2192}", "Choose max transfers"),
            ("Enter", "Create (on the transfers field)"),
        ],
    ),
    (
        "Other",
        &[
            ("r", "Refresh current page"),
            ("e", "Export current page"),
            ("?", "Toggle this help"),
            ("q", "Quit"),
        ],
    ),
];

impl HelpOverlay {
    pub fn new() -> Self {
        Self { visible: false }
    }

    pub fn toggle(&mut self) {
        self.visible = !self.visible;
    }

    /// Returns true if it consumed the event
    pub fn handle_key(&mut self, _key: KeyEvent) -> bool {
        if self.visible {
            self.visible = false;
            true
        } else {
            false
        }
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        if !self.visible {
            return;
        }

        let popup_width = area.width * 60 / 100;
        let popup_height = area.height * 80 / 100;
        let x = area.x + (area.width - popup_width) / 2;
        let y = area.y + (area.height - popup_height) / 2;
        let popup_area = Rect::new(x, y, popup_width, popup_height);

        frame.render_widget(Clear, popup_area);

        let block = Block::default()
            .title(" Keyboard Shortcuts ")
            .borders(Borders::ALL)
            .border_style(THEME.border_focused_style())
            .style(Style::default().bg(THEME.surface));

        let mut lines = Vec::new();
        for (title, keys) in SECTIONS {
            if !lines.is_empty() {
                lines.push(Line::from(""));
            }
            lines.push(Line::from(Span::styled(*title, THEME.brand_style())));
            for (key, what) in keys.iter() {
                lines.push(Line::from(vec![
                    Span::styled(format!("  {key:<12}"), THEME.accent_style()),
                    Span::styled(*what, Style::default().fg(THEME.text)),
                ]));
            }
        }

        let paragraph = Paragraph::new(lines)
            .block(block)
            .wrap(Wrap { trim: false });
        frame.render_widget(paragraph, popup_area);
    }
}
