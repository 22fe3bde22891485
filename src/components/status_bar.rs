use ratatui::prelude::*;
use ratatui::widgets::*;

use crate::theme::THEME;
use crate::utils;

pub struct StatusBar {
    pub connected: bool,
    pub latest_block: u64,
    pub error_message: Option<String>,
    pub status_message: Option<String>,
    pub loading: bool,
}

impl StatusBar {
    pub fn new() -> Self {
        Self {
            connected: false,
            latest_block: 0,
            error_message: None,
            status_message: None,
            loading: false,
        }
    }

    pub fn set_error(&mut self, msg: String) {
        self.status_message = None;
        self.error_message = Some(msg);
    }

    pub fn set_status(&mut self, msg: String) {
        self.error_message = None;
        self.status_message = Some(msg);
    }

    pub fn clear(&mut self) {
        self.error_message = None;
        self.status_message = None;
    }

    fn hints() -> Line<'static> {
        let pairs = [
            ("1-4", ":Pages  "),
            ("\u{2191}\u{2193}", ":Navigate  "),
            ("r", ":Refresh  "),
            ("e", ":Export  "),
            ("?", ":Help  "),
            ("q", ":Quit"),
        ];
        let mut spans = vec![Span::raw(" ")];
        for (key, label) in pairs {
            spans.push(Span::styled(key, THEME.accent_style()));
            spans.push(Span::styled(label, THEME.muted_style()));
        }
        Line::from(spans)
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        frame.render_widget(Block::default().style(THEME.header_style()), area);

        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Min(0), Constraint::Length(28)])
            .split(area);

        let left = if let Some(ref err) = self.error_message {
            Line::from(vec![
                Span::styled(" ! ", THEME.error_style().add_modifier(Modifier::BOLD)),
                Span::styled(err.clone(), THEME.warning_style()),
            ])
        } else if let Some(ref msg) = self.status_message {
            Line::from(Span::styled(format!(" {msg}"), THEME.info_style()))
        } else if self.loading {
            Line::from(Span::styled(" Loading...", THEME.accent_style()))
        } else {
            Self::hints()
        };
        frame.render_widget(Paragraph::new(left).style(THEME.header_style()), chunks[0]);

        let (dot_color, status_text) = if self.connected {
            (THEME.success, "Connected")
        } else {
            (THEME.error, "Disconnected")
        };
        let right = Line::from(vec![
            Span::styled("\u{25cf} ", Style::default().fg(dot_color)),
            Span::styled(status_text, Style::default().fg(dot_color)),
            Span::styled(" | ", THEME.muted_style()),
            Span::styled(
                format!("#{} ", utils::format_number(self.latest_block)),
                THEME.accent_style(),
            ),
        ]);
        frame.render_widget(
            Paragraph::new(right)
                .alignment(Alignment::Right)
                .style(THEME.header_style()),
            chunks[1],
        );
    }
}
