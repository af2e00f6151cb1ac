//! # MessageList Component
//!
//! Scrollable view of the session transcript.
//!
//! ## Responsibilities
//!
//! - Display the transcript plus a typing indicator while a reply is outstanding
//! - Manage scrolling, selection and widget focus
//! - Perform efficient layout caching (message heights)
//!
//! ## Architecture
//!
//! `MessageList` is a transient component (created each frame) that wraps
//! `&'a mut MessageListState` (persistent state) and the `Transcript` (props).
//!
//! Scroll requests made while handling events are recorded as a pending
//! [`ScrollTarget`] and applied by the next render pass, once the layout for
//! the new content has been measured.

use ratatui::Frame;
use ratatui::layout::{Position, Rect, Size};
use tui_scrollview::{ScrollView, ScrollViewState, ScrollbarVisibility};

use crate::core::transcript::Transcript;
use crate::tui::component::{Component, EventHandler};
use crate::tui::components::message::{MessageView, TYPING_HEIGHT, TypingIndicator};
use crate::tui::event::TuiEvent;
use crate::tui::palette::Palette;

/// Where the next render pass should scroll to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollTarget {
    /// Pin to the newest content.
    Bottom,
    /// Bring the selected message fully into view.
    Selected,
}

/// Layout and scroll state for the message list.
/// Must be persisted in the parent TuiState.
pub struct MessageListState {
    pub scroll_state: ScrollViewState,
    pub layout: LayoutCache,
    /// When true, auto-scroll to bottom on new content
    pub stick_to_bottom: bool,
    /// Currently selected message index (hover or keyboard navigation)
    pub selected_index: Option<usize>,
    /// Focused quiz question / flashcard inside the selected message
    pub focus: usize,
    /// Last known viewport height (for scroll clamping between frames)
    pub viewport_height: u16,
    pending_scroll: Option<ScrollTarget>,
}

impl Default for MessageListState {
    fn default() -> Self {
        Self::new()
    }
}

impl MessageListState {
    pub fn new() -> Self {
        Self {
            scroll_state: ScrollViewState::default(),
            layout: LayoutCache::new(),
            stick_to_bottom: true, // Start attached to bottom
            selected_index: None,
            focus: 0,
            viewport_height: 0,
            pending_scroll: None,
        }
    }

    /// Select a message (or clear the selection). Focus restarts at the first item.
    pub fn select(&mut self, index: Option<usize>) {
        if self.selected_index != index {
            self.focus = 0;
        }
        self.selected_index = index;
    }

    /// Move widget focus by `delta`, clamped to `0..count`.
    pub fn move_focus(&mut self, delta: isize, count: usize) {
        if count == 0 {
            self.focus = 0;
            return;
        }
        let next = self.focus.saturating_add_signed(delta);
        self.focus = next.min(count - 1);
    }

    /// Defer a scroll until the next render has measured the layout.
    pub fn request_scroll(&mut self, target: ScrollTarget) {
        self.pending_scroll = Some(target);
    }

    pub fn pending_scroll(&self) -> Option<ScrollTarget> {
        self.pending_scroll
    }

    fn max_scroll(&self) -> u16 {
        self.layout
            .canvas_height()
            .saturating_sub(self.viewport_height)
    }

    /// True when newer content sits below the viewport.
    pub fn has_unseen_content(&self) -> bool {
        !self.stick_to_bottom && self.scroll_state.offset().y < self.max_scroll()
    }

    /// Clamp scroll offset so it never exceeds the content bounds.
    pub fn clamp_scroll(&mut self) {
        let max_y = self.max_scroll();
        let current = self.scroll_state.offset();
        if current.y > max_y {
            self.scroll_state.set_offset(Position {
                x: current.x,
                y: max_y,
            });
        }
    }

    /// Scroll the viewport so the selected message is fully visible.
    /// If the message is taller than the viewport, align its top edge.
    pub fn scroll_to_selected(&mut self) {
        let Some(idx) = self.selected_index else {
            return;
        };
        if idx >= self.layout.prefix_heights.len() {
            return;
        }

        let item_top = if idx == 0 {
            0
        } else {
            self.layout.prefix_heights[idx - 1]
        };
        let item_bottom = self.layout.prefix_heights[idx];
        let offset_y = self.scroll_state.offset().y;

        if item_top < offset_y || item_bottom - item_top > self.viewport_height {
            self.scroll_state.set_offset(Position { x: 0, y: item_top });
            self.stick_to_bottom = false;
        } else if item_bottom > offset_y + self.viewport_height {
            let new_y = item_bottom.saturating_sub(self.viewport_height);
            self.scroll_state.set_offset(Position { x: 0, y: new_y });
            // Re-pin if we've landed at the absolute bottom
            self.stick_to_bottom = new_y >= self.max_scroll();
        }
    }

    /// Clamp scroll and re-engage auto-scroll if the user has reached the bottom.
    pub fn repin_if_at_bottom(&mut self) {
        let max_y = self.max_scroll();
        let current = self.scroll_state.offset();
        if current.y >= max_y {
            self.stick_to_bottom = true;
            self.scroll_state.set_offset(Position {
                x: current.x,
                y: max_y,
            });
        }
    }

    fn apply_pending_scroll(&mut self) {
        match self.pending_scroll.take() {
            Some(ScrollTarget::Bottom) => self.stick_to_bottom = true,
            Some(ScrollTarget::Selected) => self.scroll_to_selected(),
            None => {}
        }
    }
}

/// Scrollable conversation view component.
/// Created fresh each frame with references to state and data.
pub struct MessageList<'a> {
    pub state: &'a mut MessageListState,
    pub transcript: &'a Transcript,
    pub palette: &'a Palette,
    /// A chat reply is outstanding
    pub busy: bool,
    pub spinner_frame: usize,
}

impl<'a> MessageList<'a> {
    pub fn new(
        state: &'a mut MessageListState,
        transcript: &'a Transcript,
        palette: &'a Palette,
        busy: bool,
        spinner_frame: usize,
    ) -> Self {
        Self {
            state,
            transcript,
            palette,
            busy,
            spinner_frame,
        }
    }
}

impl<'a> Component for MessageList<'a> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let content_width = area.width.saturating_sub(1); // -1 for scrollbar safe area
        let messages = self.transcript.messages();

        // 1. Update layout cache
        let layout = &mut self.state.layout;
        let reusable =
            layout.reusable_count(messages.len(), content_width, self.transcript.revision());
        layout.heights.truncate(reusable.min(layout.heights.len()));
        for message in messages.iter().skip(layout.heights.len()) {
            layout
                .heights
                .push(MessageView::calculate_height(message, self.palette, content_width));
        }
        layout.rebuild_prefix_heights();
        layout.trailing = if self.busy { TYPING_HEIGHT } else { 0 };
        layout.update_metadata(messages.len(), content_width, self.transcript.revision());

        let messages_height = layout.messages_height();
        let canvas_height = layout.canvas_height();

        // 2. Layout is settled: apply deferred scrolls, then clamp.
        self.state.viewport_height = area.height;
        self.state.apply_pending_scroll();
        if self.state.stick_to_bottom {
            let bottom = self.state.max_scroll();
            self.state.scroll_state.set_offset(Position { x: 0, y: bottom });
        } else {
            self.state.clamp_scroll();
        }

        let scroll_offset = self.state.scroll_state.offset().y;
        let visible_range = self.state.layout.visible_range(scroll_offset, area.height);

        // 3. Render visible messages into a ScrollView
        let mut scroll_view = ScrollView::new(Size::new(content_width, canvas_height))
            .vertical_scrollbar_visibility(ScrollbarVisibility::Always)
            .horizontal_scrollbar_visibility(ScrollbarVisibility::Never);

        let mut y_offset: u16 = if visible_range.start > 0 {
            self.state.layout.prefix_heights[visible_range.start - 1]
        } else {
            0
        };

        for i in visible_range {
            let height = self.state.layout.heights[i];
            let is_selected = self.state.selected_index == Some(i);
            let view = MessageView::new(
                &messages[i],
                self.palette,
                is_selected,
                is_selected.then_some(self.state.focus),
            );
            scroll_view.render_widget(view, Rect::new(0, y_offset, content_width, height));
            y_offset += height;
        }

        if self.busy {
            let indicator = TypingIndicator {
                palette: self.palette,
                frame: self.spinner_frame,
            };
            let rect = Rect::new(0, messages_height, content_width, TYPING_HEIGHT);
            scroll_view.render_widget(indicator, rect);
        }

        frame.render_stateful_widget(scroll_view, area, &mut self.state.scroll_state);
    }
}

/// EventHandler is implemented on `MessageListState` rather than `MessageList`
/// because `MessageList` is recreated each frame and cannot hold scroll state.
impl EventHandler for MessageListState {
    type Event = ();

    fn handle_event(&mut self, event: &TuiEvent) -> Option<Self::Event> {
        match event {
            TuiEvent::ScrollUp => {
                self.scroll_state.scroll_up();
                self.stick_to_bottom = false;
            }
            TuiEvent::ScrollDown => {
                self.scroll_state.scroll_down();
                self.repin_if_at_bottom();
            }
            TuiEvent::ScrollPageUp => {
                self.scroll_state.scroll_page_up();
                self.stick_to_bottom = false;
            }
            TuiEvent::ScrollPageDown => {
                self.scroll_state.scroll_page_down();
                self.repin_if_at_bottom();
            }
            TuiEvent::ScrollToBottom => self.request_scroll(ScrollTarget::Bottom),
            _ => {}
        }
        None
    }
}

/// Cached layout measurements
pub struct LayoutCache {
    pub heights: Vec<u16>,
    pub prefix_heights: Vec<u16>,
    /// Rows below the last message (typing indicator)
    pub trailing: u16,
    message_count: usize,
    content_width: u16,
    revision: u64,
}

impl Default for LayoutCache {
    fn default() -> Self {
        Self::new()
    }
}

impl LayoutCache {
    pub fn new() -> Self {
        Self {
            heights: Vec::new(),
            prefix_heights: Vec::new(),
            trailing: 0,
            message_count: 0,
            content_width: 0,
            revision: 0,
        }
    }

    /// How many cached heights are still valid.
    ///
    /// Every transcript mutation bumps the revision by one, and appends also
    /// grow the message count by one. When the revision moved further than the
    /// count, something was edited in place (a quiz answer, a flipped card) and
    /// every height is remeasured.
    pub fn reusable_count(&self, message_count: usize, content_width: u16, revision: u64) -> usize {
        if self.content_width != content_width || self.heights.is_empty() {
            return 0;
        }
        if message_count < self.message_count {
            return 0;
        }
        let appended = (message_count - self.message_count) as u64;
        if revision.saturating_sub(self.revision) > appended {
            return 0;
        }
        self.message_count
    }

    pub fn update_metadata(&mut self, message_count: usize, content_width: u16, revision: u64) {
        self.message_count = message_count;
        self.content_width = content_width;
        self.revision = revision;
    }

    pub fn rebuild_prefix_heights(&mut self) {
        self.prefix_heights = self
            .heights
            .iter()
            .scan(0u16, |acc, &h| {
                *acc = acc.saturating_add(h);
                Some(*acc)
            })
            .collect();
    }

    pub fn messages_height(&self) -> u16 {
        self.prefix_heights.last().copied().unwrap_or(0)
    }

    pub fn canvas_height(&self) -> u16 {
        self.messages_height().saturating_add(self.trailing)
    }

    pub fn visible_range(&self, scroll_offset: u16, viewport_height: u16) -> std::ops::Range<usize> {
        let buffer = viewport_height / 2;
        let buffered_start = scroll_offset.saturating_sub(buffer);
        let buffered_end = scroll_offset
            .saturating_add(viewport_height)
            .saturating_add(buffer);

        let start = self
            .prefix_heights
            .partition_point(|&end| end <= buffered_start);
        let end = self
            .prefix_heights
            .partition_point(|&end| end < buffered_end)
            .saturating_add(1)
            .min(self.prefix_heights.len());

        start..end
    }
}
