use ratatui::prelude::*;
use ratatui::widgets::*;

use crate::theme::THEME;

/// What the attached wallet allows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Access {
    #[default]
    Disconnected,
    WatchOnly,
    Signer,
}

impl Access {
    pub fn new(connected: bool, can_sign: bool) -> Self {
        match (connected, can_sign) {
            (false, _) => Access::Disconnected,
            (true, false) => Access::WatchOnly,
            (true, true) => Access::Signer,
        }
    }
}

fn centered(area: Rect, height: u16) -> Rect {
    let width = area.width.min(70);
    Rect::new(
        area.x + area.width.saturating_sub(width) / 2,
        area.y + area.height.saturating_sub(height) / 2,
        width,
        height.min(area.height),
    )
}

/// Shown in place of a page that needs an account.
pub fn render_connect_prompt(frame: &mut Frame, area: Rect, purpose: &str) {
    let block = Block::default()
        .title(" Connect Wallet ")
        .borders(Borders::ALL)
        .border_style(THEME.border_focused_style());
    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            format!("Please connect your wallet to {purpose}"),
            Style::default().fg(THEME.text).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(vec![
            Span::styled("Sign:        ", THEME.muted_style()),
            Span::styled("--private-key <hex>", THEME.accent_style()),
            Span::styled(" or ", THEME.muted_style()),
            Span::styled("TICKET_PRIVATE_KEY", THEME.accent_style()),
        ]),
        Line::from(vec![
            Span::styled("Watch only:  ", THEME.muted_style()),
            Span::styled("--account <0x...>", THEME.accent_style()),
        ]),
    ];
    frame.render_widget(
        Paragraph::new(lines).alignment(Alignment::Center).block(block),
        centered(area, 8),
    );
}

pub fn render_watch_only(frame: &mut Frame, area: Rect, purpose: &str) {
    let block = Block::default()
        .title(" Watch-only account ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(THEME.warning));
    let lines = vec![
        Line::from(""),
        Line::from(format!("A signing key is needed to {purpose}.")),
        Line::from(Span::styled(
            "Restart with --private-key or TICKET_PRIVATE_KEY",
            THEME.muted_style(),
        )),
    ];
    frame.render_widget(
        Paragraph::new(lines).alignment(Alignment::Center).block(block),
        centered(area, 6),
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_access_from_connection() {
        assert_eq!(Access::new(false, true), Access::Disconnected);
        assert_eq!(Access::new(true, false), Access::WatchOnly);
        assert_eq!(Access::new(true, true), Access::Signer);
    }

    #[test]
    fn test_centered_fits() {
        let area = Rect::new(0, 0, 100, 30);
        let popup = centered(area, 8);
        assert_eq!(popup.width, 70);
        assert_eq!(popup.x, 15);
        assert_eq!(popup.y, 11);
    }
}
