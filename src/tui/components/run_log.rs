//! # Run Log Component
//!
//! Tail of the crawler's output. Follows the newest line unless the user has
//! scrolled up; scrolling back to the bottom resumes following.

use std::collections::VecDeque;

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Style};
use ratatui::text::Line;
use ratatui::widgets::{Block, BorderType, Paragraph};

use crate::tui::event::TuiEvent;

/// Lines moved per scroll step.
const SCROLL_STEP: usize = 3;

#[derive(Debug, Default)]
pub struct RunLogState {
    /// Lines between the bottom of the view and the newest line. 0 = following.
    pub offset: usize,
}

impl RunLogState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_following(&self) -> bool {
        self.offset == 0
    }

    pub fn handle_event(&mut self, event: &TuiEvent, total: usize) -> bool {
        match event {
            TuiEvent::ScrollLogUp => {
                self.offset = (self.offset + SCROLL_STEP).min(total.saturating_sub(1));
                true
            }
            TuiEvent::ScrollLogDown => {
                self.offset = self.offset.saturating_sub(SCROLL_STEP);
                true
            }
            _ => false,
        }
    }
}

/// Transient render wrapper for the run log.
pub struct RunLog<'a> {
    state: &'a mut RunLogState,
    lines: &'a VecDeque<String>,
    title: String,
}

impl<'a> RunLog<'a> {
    pub fn new(state: &'a mut RunLogState, lines: &'a VecDeque<String>, title: String) -> Self {
        Self {
            state,
            lines,
            title,
        }
    }

    pub fn render(&mut self, frame: &mut Frame, area: Rect) {
        let height = usize::from(area.height.saturating_sub(2));
        let total = self.lines.len();
        self.state.offset = self.state.offset.min(total.saturating_sub(height));

        let end = total - self.state.offset;
        let start = end.saturating_sub(height);
        let visible: Vec<Line> = self
            .lines
            .range(start..end)
            .map(|line| Line::from(line.as_str()))
            .collect();

        let mut title = format!(" {} ", self.title);
        if !self.state.is_following() {
            title.push_str(&format!("(+{} below) ", self.state.offset));
        }

        let block = Block::bordered()
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(Color::DarkGray))
            .title(title);
        let paragraph = Paragraph::new(visible)
            .block(block)
            .style(Style::default().fg(Color::Gray));
        frame.render_widget(paragraph, area);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    fn log_of(n: usize) -> VecDeque<String> {
        (1..=n).map(|i| format!("line {i}")).collect()
    }

    fn rendered(state: &mut RunLogState, lines: &VecDeque<String>) -> String {
        let backend = TestBackend::new(30, 5);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal
            .draw(|f| RunLog::new(state, lines, "Output".into()).render(f, f.area()))
            .unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect::<String>()
    }

    #[test]
    fn test_follows_newest_lines() {
        let lines = log_of(10);
        let mut state = RunLogState::new();
        let text = rendered(&mut state, &lines);
        assert!(text.contains("line 10"));
        assert!(text.contains("line 8"));
        assert!(!text.contains("line 7 "));
    }

    #[test]
    fn test_scrolled_view_shows_older_lines() {
        let lines = log_of(10);
        let mut state = RunLogState::new();
        state.handle_event(&TuiEvent::ScrollLogUp, lines.len());
        assert!(!state.is_following());

        let text = rendered(&mut state, &lines);
        assert!(text.contains("line 7"));
        assert!(!text.contains("line 10"));
        assert!(text.contains("(+3 below)"));
    }

    #[test]
    fn test_offset_is_clamped_on_render() {
        let lines = log_of(2);
        let mut state = RunLogState { offset: 50 };
        rendered(&mut state, &lines);
        assert!(state.is_following());
    }

    #[test]
    fn test_scroll_down_resumes_following() {
        let mut state = RunLogState { offset: 2 };
        state.handle_event(&TuiEvent::ScrollLogDown, 10);
        assert!(state.is_following());
    }
}
