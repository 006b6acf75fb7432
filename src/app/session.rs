use super::history::HistoryStack;
use super::page::PageRef;
use std::sync::Arc;

/// Snapshot of the navigation state.
///
/// Transitions build a new session rather than editing this one, so clones
/// held by observers stay valid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationSession {
    current_page: PageRef,
    back_stack: HistoryStack,
    forward_stack: HistoryStack,
    visit_log: Arc<Vec<PageRef>>,
}

impl NavigationSession {
    pub fn new() -> Self {
        let home = PageRef::home();
        Self {
            visit_log: Arc::new(vec![home.clone()]),
            current_page: home,
            back_stack: HistoryStack::new(),
            forward_stack: HistoryStack::new(),
        }
    }

    pub fn current_page(&self) -> &PageRef {
        &self.current_page
    }

    pub fn back_stack(&self) -> &HistoryStack {
        &self.back_stack
    }

    pub fn forward_stack(&self) -> &HistoryStack {
        &self.forward_stack
    }

    /// Every page shown, in order, including history traversal
    pub fn visit_log(&self) -> &[PageRef] {
        &self.visit_log
    }

    pub fn can_go_back(&self) -> bool {
        !self.back_stack.is_empty()
    }

    pub fn can_go_forward(&self) -> bool {
        !self.forward_stack.is_empty()
    }

    /// A new branch of history: the current page moves to the back stack and
    /// the forward stack is dropped.
    pub(crate) fn advance(&self, target: PageRef) -> Self {
        let next = Self {
            back_stack: self.back_stack.push(self.current_page.clone()),
            forward_stack: HistoryStack::new(),
            visit_log: self.logged(&target),
            current_page: target,
        };
        next.debug_check();
        next
    }

    pub(crate) fn step_back(&self) -> Option<Self> {
        let (previous, back_stack) = self.back_stack.pop();
        let previous = previous?;
        let next = Self {
            back_stack,
            forward_stack: self.forward_stack.push(self.current_page.clone()),
            visit_log: self.logged(&previous),
            current_page: previous,
        };
        next.debug_check();
        Some(next)
    }

    pub(crate) fn step_forward(&self) -> Option<Self> {
        let (upcoming, forward_stack) = self.forward_stack.pop();
        let upcoming = upcoming?;
        let next = Self {
            back_stack: self.back_stack.push(self.current_page.clone()),
            forward_stack,
            visit_log: self.logged(&upcoming),
            current_page: upcoming,
        };
        next.debug_check();
        Some(next)
    }

    fn logged(&self, page: &PageRef) -> Arc<Vec<PageRef>> {
        let mut log = Vec::with_capacity(self.visit_log.len() + 1);
        log.extend(self.visit_log.iter().cloned());
        log.push(page.clone());
        Arc::new(log)
    }

    fn debug_check(&self) {
        debug_assert!(
            self.back_stack.peek_top() != Some(&self.current_page),
            "current page {} is also on top of the back stack",
            self.current_page
        );
    }
}

impl Default for NavigationSession {
    fn default() -> Self {
        Self::new()
    }
}
