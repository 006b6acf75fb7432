pub mod app;
pub mod net;
pub mod ui;

pub use app::NavigationController;
