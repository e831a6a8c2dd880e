//! # StatusBar Component
//!
//! Bottom row: the latest notice on the left (coloured by level), key help
//! on the right. Stateless, like `TitleBar`.

use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Color, Style};
use ratatui::text::Line;
use ratatui::widgets::Paragraph;

use crate::core::state::{Level, Notice};
use crate::tui::component::Component;

const KEY_HELP: &str = "Enter add · Del remove · ^R run · Tab platform · Esc quit";

pub struct StatusBar<'a> {
    pub notice: &'a Notice,
}

impl<'a> StatusBar<'a> {
    pub fn new(notice: &'a Notice) -> Self {
        Self { notice }
    }
}

fn level_style(level: Level) -> Style {
    match level {
        Level::Info => Style::default().fg(Color::Gray),
        Level::Warning => Style::default().fg(Color::Yellow),
        Level::Error => Style::default().fg(Color::Red),
    }
}

impl Component for StatusBar<'_> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let help_width = u16::try_from(KEY_HELP.chars().count()).unwrap_or(u16::MAX);
        let [notice_area, help_area] =
            Layout::horizontal([Constraint::Min(0), Constraint::Length(help_width)]).areas(area);

        frame.render_widget(
            Paragraph::new(Line::styled(
                self.notice.text.as_str(),
                level_style(self.notice.level),
            )),
            notice_area,
        );
        frame.render_widget(
            Paragraph::new(Line::from(KEY_HELP).right_aligned())
                .style(Style::default().fg(Color::DarkGray)),
            help_area,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    #[test]
    fn test_error_notice_is_red() {
        let backend = TestBackend::new(120, 1);
        let mut terminal = Terminal::new(backend).unwrap();
        let notice = Notice::error("Save failed");

        terminal
            .draw(|f| StatusBar::new(&notice).render(f, f.area()))
            .unwrap();

        let buffer = terminal.backend().buffer();
        let text = buffer.content().iter().map(|c| c.symbol()).collect::<String>();
        assert!(text.starts_with("Save failed"));
        assert!(text.contains("^R run"));
        assert_eq!(buffer.content()[0].fg, Color::Red);
    }

    #[test]
    fn test_info_notice_is_plain() {
        let backend = TestBackend::new(120, 1);
        let mut terminal = Terminal::new(backend).unwrap();
        let notice = Notice::info("Added a");

        terminal
            .draw(|f| StatusBar::new(&notice).render(f, f.area()))
            .unwrap();

        assert_eq!(terminal.backend().buffer().content()[0].fg, Color::Gray);
    }
}
