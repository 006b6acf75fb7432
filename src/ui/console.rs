use crate::app::{HistoryStack, NavigationSession, PageRef};

pub const HELP: &str = "\
Commands:
  go <page|url>     navigate (bare text works too)
  back, b           go back
  forward, f        go forward
  clear             reset history to Home
  show              print the current state
  help, ?           this message
  quit, q           exit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleAction {
    Back,
    Forward,
    Navigate(String),
    Clear,
    Show,
    Help,
    Quit,
}

impl ConsoleAction {
    /// Parse one line of console input. Blank lines yield `None`.
    pub fn parse(line: &str) -> Option<Self> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }

        let (command, argument) = match line.split_once(char::is_whitespace) {
            Some((command, argument)) => (command, Some(argument.trim())),
            None => (line, None),
        };

        let action = match (command.to_ascii_lowercase().as_str(), argument) {
            ("go" | "navigate", Some(target)) => ConsoleAction::Navigate(target.to_string()),
            ("go" | "navigate", None) => ConsoleAction::Navigate(String::new()),
            ("back" | "b", None) => ConsoleAction::Back,
            ("forward" | "f", None) => ConsoleAction::Forward,
            ("clear", None) => ConsoleAction::Clear,
            ("show", None) => ConsoleAction::Show,
            ("help" | "?", None) => ConsoleAction::Help,
            ("quit" | "exit" | "q", None) => ConsoleAction::Quit,
            _ => ConsoleAction::Navigate(line.to_string()),
        };
        Some(action)
    }
}

/// Plain-text view of a session: current page, both stacks with the top
/// marked, and the number of pages visited.
pub fn render_session(session: &NavigationSession, pending: Option<&PageRef>) -> String {
    let mut out = String::new();

    out.push_str(&format!("Current :- {}\n", session.current_page()));
    if let Some(target) = pending {
        out.push_str(&format!("Checking {}...\n", target));
    }
    render_stack(&mut out, "Back Stack", session.back_stack());
    render_stack(&mut out, "Forward Stack", session.forward_stack());
    out.push_str(&format!("Pages visited: {}", session.visit_log().len()));
    out
}

fn render_stack(out: &mut String, title: &str, stack: &HistoryStack) {
    out.push_str(&format!("{} (items: {})\n", title, stack.len()));
    if stack.is_empty() {
        out.push_str("  (empty)\n");
        return;
    }

    // Top of the stack first
    let len = stack.len();
    for (index, page) in stack.iter().enumerate().rev() {
        let marker = if index == len - 1 { "  <- TOP" } else { "" };
        out.push_str(&format!("  {}. {}{}\n", len - index, page, marker));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::canonicalize;

    #[test]
    fn test_parse_commands() {
        assert_eq!(ConsoleAction::parse("back"), Some(ConsoleAction::Back));
        assert_eq!(ConsoleAction::parse(" F "), Some(ConsoleAction::Forward));
        assert_eq!(ConsoleAction::parse("clear"), Some(ConsoleAction::Clear));
        assert_eq!(ConsoleAction::parse("q"), Some(ConsoleAction::Quit));
        assert_eq!(ConsoleAction::parse("?"), Some(ConsoleAction::Help));
        assert_eq!(ConsoleAction::parse(""), None);
        assert_eq!(ConsoleAction::parse("   "), None);
    }

    #[test]
    fn test_parse_navigation() {
        assert_eq!(
            ConsoleAction::parse("go example.com"),
            Some(ConsoleAction::Navigate("example.com".to_string()))
        );
        assert_eq!(
            ConsoleAction::parse("navigate   About  "),
            Some(ConsoleAction::Navigate("About".to_string()))
        );
        assert_eq!(
            ConsoleAction::parse("products"),
            Some(ConsoleAction::Navigate("products".to_string()))
        );
        // A command word with an argument it does not take is a target
        assert_eq!(
            ConsoleAction::parse("back office"),
            Some(ConsoleAction::Navigate("back office".to_string()))
        );
        assert_eq!(
            ConsoleAction::parse("go"),
            Some(ConsoleAction::Navigate(String::new()))
        );
    }

    #[test]
    fn test_render_session() {
        let about = canonicalize("About").unwrap();
        let session = NavigationSession::new()
            .advance(about.clone())
            .advance(canonicalize("example.com").unwrap());
        let session = session.step_back().unwrap();

        let text = render_session(&session, None);
        assert!(text.starts_with("Current :- About\n"));
        assert!(text.contains("Back Stack (items: 1)\n  1. Home  <- TOP\n"));
        assert!(text.contains("Forward Stack (items: 1)\n  1. https://example.com  <- TOP\n"));
        assert!(text.ends_with("Pages visited: 4"));

        let pending = render_session(&NavigationSession::new(), Some(&about));
        assert!(pending.contains("Checking About...\n"));
        assert!(pending.contains("Back Stack (items: 0)\n  (empty)\n"));
    }
}
