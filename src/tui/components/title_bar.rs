//! # TitleBar Component
//!
//! Top row showing one tab per platform, the selected one highlighted.
//!
//! ## Design Decisions
//!
//! ### Stateless Component
//!
//! TitleBar is purely presentational. It receives the tab labels and the
//! selected index as props and keeps nothing between frames:
//!
//! ```rust,ignore
//! let mut title_bar = TitleBar::new(labels, app.current, running);
//! title_bar.render(frame, area);
//! ```
//!
//! Labels carry the function key that selects them (`F1 Xiaohongshu`), so
//! the row doubles as a key legend. A `●` marker is appended while a crawl
//! is running.

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Line;
use ratatui::widgets::Tabs;

use crate::tui::component::Component;

pub struct TitleBar {
    /// Display names in registry order.
    pub labels: Vec<String>,
    pub selected: usize,
    pub running: bool,
}

impl TitleBar {
    pub fn new(labels: Vec<String>, selected: usize, running: bool) -> Self {
        Self {
            labels,
            selected,
            running,
        }
    }
}

impl Component for TitleBar {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let mut titles: Vec<Line> = self
            .labels
            .iter()
            .enumerate()
            .map(|(i, label)| {
                if i < 9 {
                    Line::from(format!("F{} {}", i + 1, label))
                } else {
                    Line::from(label.clone())
                }
            })
            .collect();
        if self.running {
            titles.push(Line::styled("● running", Style::default().fg(Color::Yellow)));
        }

        let tabs = Tabs::new(titles)
            .select(self.selected)
            .style(Style::default().fg(Color::Gray))
            .highlight_style(
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD | Modifier::REVERSED),
            )
            .divider("|");
        frame.render_widget(tabs, area);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    fn rendered(title_bar: &mut TitleBar) -> String {
        let backend = TestBackend::new(80, 1);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal.draw(|f| title_bar.render(f, f.area())).unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect::<String>()
    }

    #[test]
    fn test_tabs_show_function_keys() {
        let mut title_bar = TitleBar::new(vec!["Foo".into(), "Bar".into()], 1, false);
        let text = rendered(&mut title_bar);
        assert!(text.contains("F1 Foo"));
        assert!(text.contains("F2 Bar"));
        assert!(!text.contains("running"));
    }

    #[test]
    fn test_selected_tab_is_highlighted() {
        let backend = TestBackend::new(40, 1);
        let mut terminal = Terminal::new(backend).unwrap();
        let mut title_bar = TitleBar::new(vec!["Foo".into(), "Bar".into()], 1, false);
        terminal.draw(|f| title_bar.render(f, f.area())).unwrap();

        let buffer = terminal.backend().buffer();
        let highlighted: String = buffer
            .content()
            .iter()
            .filter(|c| c.modifier.contains(Modifier::REVERSED))
            .map(|c| c.symbol())
            .collect();
        assert!(highlighted.contains("F2 Bar"));
        assert!(!highlighted.contains("Foo"));
    }

    #[test]
    fn test_running_marker() {
        let mut title_bar = TitleBar::new(vec!["Foo".into()], 0, true);
        assert!(rendered(&mut title_bar).contains("● running"));
    }
}
