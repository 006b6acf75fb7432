pub mod console;

pub use console::{render_session, ConsoleAction};
