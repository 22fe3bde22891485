use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::*;

use crate::components::Component;
use crate::data::contract::ContractDescriptor;
use crate::events::{AppEvent, View};
use crate::theme::THEME;

const FEATURES: [(&str, &str); 3] = [
    ("Tickets", "Each ticket is an ERC-721 token minted straight from the event contract."),
    ("Controls", "Organizers cap how many times a ticket may change hands."),
    ("Monitoring", "Tickets are validated on-chain at the door, once."),
];

pub struct Home {
    contract: ContractDescriptor,
}

impl Home {
    pub fn new(contract: ContractDescriptor) -> Self {
        Self { contract }
    }
}

impl Component for Home {
    fn handle_key(&mut self, key: KeyEvent) -> Option<AppEvent> {
        match key.code {
            KeyCode::Enter => Some(AppEvent::Navigate(View::Events)),
            KeyCode::Char('c') => Some(AppEvent::Navigate(View::CreateEvent)),
            _ => None,
        }
    }

    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(7),
                Constraint::Min(6),
                Constraint::Length(3),
            ])
            .split(area);

        let hero = vec![
            Line::from(""),
            Line::from(Span::styled(
                "The minimalist ticketing stack",
                Style::default().fg(THEME.text).add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(
                "Create events, sell NFT tickets and check guests in on Ethereum.",
                THEME.muted_style(),
            )),
            Line::from(""),
            Line::from(vec![
                Span::styled(" Enter ", THEME.button_style()),
                Span::raw(" Browse events   "),
                Span::styled(" c ", THEME.button_style()),
                Span::raw(" Create event"),
            ]),
        ];
        frame.render_widget(
            Paragraph::new(hero).alignment(Alignment::Center),
            chunks[0],
        );

        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Ratio(1, 3); 3])
            .split(chunks[1]);
        for (i, (title, body)) in FEATURES.iter().enumerate() {
            let card = Paragraph::new(*body)
                .style(Style::default().fg(THEME.text))
                .wrap(Wrap { trim: true })
                .block(
                    Block::default()
                        .title(Span::styled(format!(" {title} "), THEME.brand_style()))
                        .borders(Borders::ALL)
                        .border_style(THEME.border_style()),
                );
            frame.render_widget(card, columns[i]);
        }

        let footer = match self.contract.explorer_link() {
            Some(link) => Line::from(vec![
                Span::styled("Contract ", THEME.muted_style()),
                Span::styled(link, THEME.address_style()),
            ]),
            None => Line::from(vec![
                Span::styled("Contract ", THEME.muted_style()),
                Span::styled(format!("{:#x}", self.contract.address), THEME.address_style()),
            ]),
        };
        frame.render_widget(
            Paragraph::new(footer)
                .alignment(Alignment::Center)
                .block(Block::default().borders(Borders::TOP).border_style(THEME.border_style())),
            chunks[2],
        );
    }
}
