//! Cursor arbitration
//!
//! Interactive elements request a cursor under their own id with a priority.
//! The highest priority wins; among equal priorities the most recent request
//! wins. Repeating an identical request does not change its recency.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Pointer icon hint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum CursorKind {
    /// Platform default arrow
    #[default]
    Default,
    /// Hand over something clickable
    Pointer,
    /// Open hand, something can be dragged
    Grab,
    /// Closed hand, dragging in progress
    Grabbing,
    /// Move arrows
    Move,
    /// Precise placement
    Crosshair,
    /// Text insertion
    Text,
    /// Action not permitted
    NotAllowed,
}

impl CursorKind {
    /// CSS cursor keyword
    pub fn css_name(self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::Pointer => "pointer",
            Self::Grab => "grab",
            Self::Grabbing => "grabbing",
            Self::Move => "move",
            Self::Crosshair => "crosshair",
            Self::Text => "text",
            Self::NotAllowed => "not-allowed",
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct CursorRequest {
    cursor: CursorKind,
    priority: i32,
    sequence: u64,
}

/// Priority-ordered cursor requests
#[derive(Debug, Default)]
pub struct CursorRegistry {
    requests: HashMap<String, CursorRequest>,
    next_sequence: u64,
    last_reported: CursorKind,
}

impl CursorRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace the request owned by `id`
    pub fn request(&mut self, id: &str, cursor: CursorKind, priority: i32) {
        if let Some(existing) = self.requests.get(id) {
            if existing.cursor == cursor && existing.priority == priority {
                return;
            }
        }
        let sequence = self.next_sequence;
        self.next_sequence += 1;
        self.requests.insert(id.to_string(), CursorRequest { cursor, priority, sequence });
    }

    /// Drop the request owned by `id`
    pub fn cancel(&mut self, id: &str) {
        self.requests.remove(id);
    }

    /// Whether `id` currently holds a request
    pub fn has_request(&self, id: &str) -> bool {
        self.requests.contains_key(id)
    }

    /// Winning cursor, `Default` with no requests
    pub fn current(&self) -> CursorKind {
        self.requests
            .values()
            .max_by_key(|request| (request.priority, request.sequence))
            .map_or(CursorKind::Default, |request| request.cursor)
    }

    /// The winning cursor if it changed since the last call
    pub fn take_change(&mut self) -> Option<CursorKind> {
        let current = self.current();
        if current == self.last_reported {
            None
        } else {
            self.last_reported = current;
            Some(current)
        }
    }

    /// Drop every request
    pub fn clear(&mut self) {
        self.requests.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_highest_priority_wins() {
        let mut registry = CursorRegistry::new();
        assert_eq!(registry.current(), CursorKind::Default);
        registry.request("tile", CursorKind::Pointer, 1);
        registry.request("camera", CursorKind::Grabbing, 10);
        registry.request("hover", CursorKind::Crosshair, 5);
        assert_eq!(registry.current(), CursorKind::Grabbing);
        registry.cancel("camera");
        assert_eq!(registry.current(), CursorKind::Crosshair);
    }

    #[test]
    fn test_ties_go_to_latest_request() {
        let mut registry = CursorRegistry::new();
        registry.request("a", CursorKind::Pointer, 3);
        registry.request("b", CursorKind::Move, 3);
        assert_eq!(registry.current(), CursorKind::Move);
        // repeating an identical request keeps its place
        registry.request("a", CursorKind::Pointer, 3);
        assert_eq!(registry.current(), CursorKind::Move);
        registry.request("a", CursorKind::Text, 3);
        assert_eq!(registry.current(), CursorKind::Text);
    }

    #[test]
    fn test_take_change_reports_once() {
        let mut registry = CursorRegistry::new();
        assert_eq!(registry.take_change(), None);
        registry.request("a", CursorKind::Grab, 0);
        assert_eq!(registry.take_change(), Some(CursorKind::Grab));
        assert_eq!(registry.take_change(), None);
        registry.cancel("a");
        assert_eq!(registry.take_change(), Some(CursorKind::Default));
        assert_eq!(CursorKind::NotAllowed.css_name(), "not-allowed");
    }
}
