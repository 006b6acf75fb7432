use super::page::PageRef;
use std::sync::Arc;

/// A LIFO stack of pages.
///
/// Every operation returns a new stack and leaves `self` untouched, so a
/// snapshot handed out earlier never observes later navigation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HistoryStack {
    entries: Arc<Vec<PageRef>>,
}

impl HistoryStack {
    pub fn new() -> Self {
        Self {
            entries: Arc::new(Vec::new()),
        }
    }

    pub fn push(&self, page: PageRef) -> Self {
        let mut entries = Vec::with_capacity(self.entries.len() + 1);
        entries.extend(self.entries.iter().cloned());
        entries.push(page);
        Self {
            entries: Arc::new(entries),
        }
    }

    /// Remove the top page. Popping an empty stack yields `None` and another
    /// empty stack.
    pub fn pop(&self) -> (Option<PageRef>, Self) {
        match self.entries.split_last() {
            Some((top, rest)) => (
                Some(top.clone()),
                Self {
                    entries: Arc::new(rest.to_vec()),
                },
            ),
            None => (None, self.clone()),
        }
    }

    pub fn peek_top(&self) -> Option<&PageRef> {
        self.entries.last()
    }

    pub fn contains(&self, page: &PageRef) -> bool {
        self.entries.iter().any(|entry| entry == page)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Bottom to top
    pub fn iter(&self) -> std::slice::Iter<'_, PageRef> {
        self.entries.iter()
    }

    /// Bottom to top
    pub fn to_ordered_sequence(&self) -> Vec<PageRef> {
        self.entries.to_vec()
    }
}
