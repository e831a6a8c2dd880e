//! # InputBox Component
//!
//! Single-line entry for new creator IDs or URLs.
//!
//! ## Responsibilities
//!
//! - Capture text input and paste (newlines in pastes become spaces)
//! - Handle editing (backspace, delete, cursor movement)
//! - Emit `Submit` on Enter with the trimmed text
//! - Scroll horizontally so the cursor stays visible
//!
//! Delete on an empty buffer is not consumed so the parent can treat it as
//! "remove the selected entry".

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Style};
use ratatui::widgets::{Block, BorderType, Paragraph};
use unicode_width::UnicodeWidthStr;

use crate::tui::component::{Component, EventHandler};
use crate::tui::event::TuiEvent;

/// High-level events emitted by the InputBox
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputEvent {
    /// User submitted non-blank text (Enter pressed)
    Submit(String),
    /// Text or cursor changed
    ContentChanged,
}

pub struct InputBox {
    pub buffer: String,
    /// Cursor position as byte offset in buffer (0..=buffer.len())
    cursor: usize,
    /// Label shown in the border, e.g. the target attribute.
    pub title: String,
}

impl InputBox {
    pub fn new() -> Self {
        Self {
            buffer: String::new(),
            cursor: 0,
            title: String::from("Add creator"),
        }
    }

    pub fn clear(&mut self) {
        self.buffer.clear();
        self.cursor = 0;
    }

    /// Display columns before the cursor.
    fn cursor_column(&self) -> usize {
        self.buffer[..self.cursor].width()
    }

    /// Byte offset where the visible window starts so that the cursor fits in `width` columns.
    fn visible_start(&self, width: usize) -> usize {
        if width == 0 {
            return self.cursor;
        }
        let mut start = 0;
        while self.buffer[start..self.cursor].width() >= width {
            start = next_char_boundary(&self.buffer, start);
        }
        start
    }
}

impl Default for InputBox {
    fn default() -> Self {
        Self::new()
    }
}

/// Find the byte offset of the previous character boundary before `pos` in `text`.
fn prev_char_boundary(text: &str, pos: usize) -> usize {
    text[..pos]
        .char_indices()
        .next_back()
        .map(|(i, _)| i)
        .unwrap_or(0)
}

/// Find the byte offset of the next character boundary after `pos` in `text`.
fn next_char_boundary(text: &str, pos: usize) -> usize {
    text[pos..]
        .char_indices()
        .nth(1)
        .map(|(i, _)| pos + i)
        .unwrap_or(text.len())
}

impl Component for InputBox {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let inner_width = usize::from(area.width.saturating_sub(2));
        let start = self.visible_start(inner_width);
        let visible = &self.buffer[start..];

        let block = Block::bordered()
            .border_type(BorderType::Rounded)
            .title(format!(" {} ", self.title));
        let input = Paragraph::new(visible)
            .block(block)
            .style(Style::default().fg(Color::Green));
        frame.render_widget(input, area);

        let column = self.cursor_column() - self.buffer[..start].width();
        let column = u16::try_from(column).unwrap_or(u16::MAX);
        let x = area.x + 1 + column.min(area.width.saturating_sub(2));
        frame.set_cursor_position((x, area.y + 1));
    }
}

impl EventHandler for InputBox {
    type Event = InputEvent;

    fn handle_event(&mut self, event: &TuiEvent) -> Option<Self::Event> {
        match event {
            TuiEvent::InputChar(c) => {
                self.buffer.insert(self.cursor, *c);
                self.cursor += c.len_utf8();
                Some(InputEvent::ContentChanged)
            }
            TuiEvent::Paste(text) => {
                let flattened: String = text
                    .chars()
                    .map(|c| if c == '\n' || c == '\r' { ' ' } else { c })
                    .collect();
                self.buffer.insert_str(self.cursor, &flattened);
                self.cursor += flattened.len();
                Some(InputEvent::ContentChanged)
            }
            TuiEvent::Backspace => (self.cursor > 0).then(|| {
                let prev = prev_char_boundary(&self.buffer, self.cursor);
                self.buffer.drain(prev..self.cursor);
                self.cursor = prev;
                InputEvent::ContentChanged
            }),
            TuiEvent::Delete => (self.cursor < self.buffer.len()).then(|| {
                let next = next_char_boundary(&self.buffer, self.cursor);
                self.buffer.drain(self.cursor..next);
                InputEvent::ContentChanged
            }),
            TuiEvent::CursorLeft => (self.cursor > 0).then(|| {
                self.cursor = prev_char_boundary(&self.buffer, self.cursor);
                InputEvent::ContentChanged
            }),
            TuiEvent::CursorRight => (self.cursor < self.buffer.len()).then(|| {
                self.cursor = next_char_boundary(&self.buffer, self.cursor);
                InputEvent::ContentChanged
            }),
            TuiEvent::CursorHome => (self.cursor != 0).then(|| {
                self.cursor = 0;
                InputEvent::ContentChanged
            }),
            TuiEvent::CursorEnd => (self.cursor != self.buffer.len()).then(|| {
                self.cursor = self.buffer.len();
                InputEvent::ContentChanged
            }),
            TuiEvent::Submit => {
                let text = self.buffer.trim().to_string();
                if text.is_empty() {
                    return None;
                }
                self.clear();
                Some(InputEvent::Submit(text))
            }
            _ => None,
        }
    }
}
