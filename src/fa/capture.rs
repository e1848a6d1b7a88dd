// src/fa/capture.rs
//! Capture-group identity and per-match capture bookkeeping.

use hashbrown::{HashMap, HashSet};

/// Identity of a capture group. Group number 0 is reserved for a
/// grouped-but-non-capturing boundary; it never reaches the match context.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CaptureGroupInfo {
    pub group_number: u32,
    pub capture_name: Option<String>,
}

impl CaptureGroupInfo {
    pub fn numbered(group_number: u32) -> Self {
        Self {
            group_number,
            capture_name: None,
        }
    }

    pub fn named(group_number: u32, capture_name: impl Into<String>) -> Self {
        Self {
            group_number,
            capture_name: Some(capture_name.into()),
        }
    }
}

/// Mutable capture state for one match attempt.
///
/// Capture lifetime is tied to automaton-state visitation: a group is
/// started when its entry marker becomes live and completed when its exit
/// marker does. Because several NFA paths can be live at once, starting an
/// already-active group and completing a never-started one are silent
/// no-ops.
#[derive(Clone, Debug, Default)]
pub struct CaptureGroupContext {
    active: HashSet<u32>,
    start_positions: HashMap<u32, usize>,
    names: HashMap<u32, String>,
    captures: HashMap<u32, String>,
}

impl CaptureGroupContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens a group at the given capture-buffer offset. No-op while the
    /// group is already active.
    pub fn start_capture(&mut self, info: &CaptureGroupInfo, buffer_len: usize) {
        let group = info.group_number;
        if !self.active.insert(group) {
            return;
        }
        self.start_positions.insert(group, buffer_len);
        if let Some(name) = &info.capture_name {
            self.names.entry(group).or_insert_with(|| name.clone());
        }
    }

    /// Closes a group, recording the buffer span from its start offset to
    /// the current end. No-op if the group was never started.
    pub fn complete_capture(&mut self, info: &CaptureGroupInfo, buffer: &str) {
        let group = info.group_number;
        if !self.active.remove(&group) {
            return;
        }
        let Some(start) = self.start_positions.remove(&group) else {
            return;
        };
        self.captures.insert(group, buffer[start..].to_string());
    }

    /// Drops all capture state. Reuses the allocations, so clearing between
    /// search attempts stays cheap.
    pub fn clear(&mut self) {
        self.active.clear();
        self.start_positions.clear();
        self.names.clear();
        self.captures.clear();
    }

    pub fn captures(&self) -> &HashMap<u32, String> {
        &self.captures
    }

    pub fn names(&self) -> &HashMap<u32, String> {
        &self.names
    }

    pub fn is_active(&self, group_number: u32) -> bool {
        self.active.contains(&group_number)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn start_complete_records_span() {
        let info = CaptureGroupInfo::named(1, "word");
        let mut ctx = CaptureGroupContext::new();
        ctx.start_capture(&info, 2);
        assert!(ctx.is_active(1));
        ctx.complete_capture(&info, "xxabc");
        assert!(!ctx.is_active(1));
        assert_eq!(ctx.captures().get(&1).map(String::as_str), Some("abc"));
        assert_eq!(ctx.names().get(&1).map(String::as_str), Some("word"));
    }

    #[test]
    fn restart_while_active_keeps_first_offset() {
        let info = CaptureGroupInfo::numbered(3);
        let mut ctx = CaptureGroupContext::new();
        ctx.start_capture(&info, 0);
        ctx.start_capture(&info, 4);
        ctx.complete_capture(&info, "abcdef");
        assert_eq!(ctx.captures().get(&3).map(String::as_str), Some("abcdef"));
    }

    #[test]
    fn complete_without_start_is_a_no_op() {
        let info = CaptureGroupInfo::numbered(2);
        let mut ctx = CaptureGroupContext::new();
        ctx.complete_capture(&info, "abc");
        assert!(ctx.captures().is_empty());
    }

    #[test]
    fn restart_after_complete_takes_new_offset() {
        let info = CaptureGroupInfo::numbered(1);
        let mut ctx = CaptureGroupContext::new();
        ctx.start_capture(&info, 0);
        ctx.complete_capture(&info, "a");
        ctx.start_capture(&info, 1);
        ctx.complete_capture(&info, "ab");
        assert_eq!(ctx.captures().get(&1).map(String::as_str), Some("b"));
    }

    #[test]
    fn clear_leaves_nothing_behind() {
        let info = CaptureGroupInfo::named(1, "n");
        let mut ctx = CaptureGroupContext::new();
        ctx.start_capture(&info, 0);
        ctx.complete_capture(&info, "zz");
        ctx.start_capture(&CaptureGroupInfo::numbered(2), 1);
        ctx.clear();
        assert!(ctx.captures().is_empty());
        assert!(ctx.names().is_empty());
        assert!(!ctx.is_active(1));
        assert!(!ctx.is_active(2));
    }
}
