//! # Creator List Component
//!
//! Numbered view of the selected platform's creator IDs.
//!
//! Follows the persistent state + transient wrapper pattern:
//! - `CreatorListState` lives in `TuiState` (selection survives redraws)
//! - `CreatorList` is created each frame with borrowed state and entries

use ratatui::Frame;
use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, List, ListItem, ListState, Paragraph};

use crate::tui::event::TuiEvent;

/// Persistent selection state for the creator list.
#[derive(Debug, Default)]
pub struct CreatorListState {
    pub selected: usize,
    pub list_state: ListState,
}

impl CreatorListState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep the selection inside `0..len` after the list changed underneath.
    pub fn clamp(&mut self, len: usize) {
        if len == 0 {
            self.selected = 0;
            self.list_state.select(None);
        } else {
            self.selected = self.selected.min(len - 1);
            self.list_state.select(Some(self.selected));
        }
    }

    /// Index to remove, if the list has any entries.
    pub fn selection(&self, len: usize) -> Option<usize> {
        (self.selected < len).then_some(self.selected)
    }

    /// Up/Down move the selection; returns true if the event was consumed.
    pub fn handle_event(&mut self, event: &TuiEvent, len: usize) -> bool {
        match event {
            TuiEvent::CursorUp => {
                self.selected = self.selected.saturating_sub(1);
                self.clamp(len);
                true
            }
            TuiEvent::CursorDown => {
                self.selected = self.selected.saturating_add(1);
                self.clamp(len);
                true
            }
            _ => false,
        }
    }
}

/// Transient render wrapper for the creator list.
pub struct CreatorList<'a> {
    state: &'a mut CreatorListState,
    entries: &'a [String],
    title: String,
}

impl<'a> CreatorList<'a> {
    pub fn new(state: &'a mut CreatorListState, entries: &'a [String], title: String) -> Self {
        Self {
            state,
            entries,
            title,
        }
    }

    pub fn render(&mut self, frame: &mut Frame, area: Rect) {
        self.state.clamp(self.entries.len());

        let block = Block::bordered()
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(Color::DarkGray))
            .title(format!(" {} ({}) ", self.title, self.entries.len()));

        if self.entries.is_empty() {
            let empty = Paragraph::new("No creators yet. Type an ID below and press Enter.")
                .style(Style::default().fg(Color::DarkGray))
                .alignment(Alignment::Center)
                .block(block);
            frame.render_widget(empty, area);
            return;
        }

        let width = self.entries.len().to_string().len();
        let items: Vec<ListItem> = self
            .entries
            .iter()
            .enumerate()
            .map(|(i, entry)| {
                ListItem::new(Line::from(vec![
                    Span::styled(
                        format!("{:>width$}. ", i + 1),
                        Style::default().fg(Color::DarkGray),
                    ),
                    Span::raw(entry.as_str()),
                ]))
            })
            .collect();

        let list = List::new(items).block(block).highlight_style(
            Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD | Modifier::REVERSED),
        );
        frame.render_stateful_widget(list, area, &mut self.state.list_state);
    }
}
