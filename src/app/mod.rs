pub mod history;
pub mod navigator;
pub mod page;
pub mod session;
pub mod settings;

pub use history::HistoryStack;
pub use navigator::{Direction, NavigationController, NavigationError, NavigationResult};
pub use page::{canonicalize, PageError, PageKind, PageRef};
pub use session::NavigationSession;
pub use settings::{NavigatorSettings, TransportFailurePolicy};
