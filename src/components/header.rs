use alloy::primitives::{Address, U256};
use ratatui::prelude::*;
use ratatui::widgets::*;

use crate::theme::THEME;
use crate::utils;

pub struct Header {
    pub current_tab: usize,
    pub chain_name: String,
    pub symbol: String,
    pub account: Option<Address>,
    pub balance: Option<U256>,
    pub can_sign: bool,
}

const TABS: &[&str] = &["Home [1]", "Events [2]", "My Tickets [3]", "Create [4]"];

impl Header {
    pub fn new(chain_name: &str, symbol: &str) -> Self {
        Self {
            current_tab: 0,
            chain_name: chain_name.to_string(),
            symbol: symbol.to_string(),
            account: None,
            balance: None,
            can_sign: false,
        }
    }

    fn account_spans(&self) -> Vec<Span<'static>> {
        let Some(account) = self.account else {
            return vec![Span::styled("Not connected ", THEME.muted_style())];
        };
        let mut spans = vec![Span::styled(
            utils::truncate_address(&account),
            THEME.address_style(),
        )];
        if !self.can_sign {
            spans.push(Span::styled(" (watch)", THEME.warning_style()));
        }
        if let Some(balance) = self.balance {
            spans.push(Span::styled(" | ", THEME.muted_style()));
            spans.push(Span::styled(
                format!("{} {}", utils::format_ether(balance), self.symbol),
                THEME.eth_style(),
            ));
        }
        spans.push(Span::raw(" "));
        spans
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        frame.render_widget(Block::default().style(THEME.header_style()), area);

        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Length(8),
                Constraint::Min(0),
                Constraint::Length(46),
            ])
            .split(area);

        let title = Paragraph::new(Span::styled(" a10d", THEME.brand_style()))
            .style(THEME.header_style());
        frame.render_widget(title, chunks[0]);

        let tab_titles: Vec<Line> = TABS.iter().map(|t| Line::from(*t)).collect();
        let tabs = Tabs::new(tab_titles)
            .select(self.current_tab)
            .style(THEME.muted_style())
            .highlight_style(THEME.brand_style())
            .divider(Span::raw(" | "));
        frame.render_widget(tabs, chunks[1]);

        let mut spans = vec![
            Span::styled(self.chain_name.clone(), Style::default().fg(THEME.text)),
            Span::styled(" | ", THEME.muted_style()),
        ];
        spans.extend(self.account_spans());
        let wallet = Paragraph::new(Line::from(spans))
            .alignment(Alignment::Right)
            .style(THEME.header_style());
        frame.render_widget(wallet, chunks[2]);
    }
}
