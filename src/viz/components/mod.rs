pub mod grid;
pub mod help;
pub mod log;
pub mod plot;

use crossterm::event::Event;
pub use grid::GridView;
pub use log::Logs;
pub use plot::Plots;
use ratatui::widgets::WidgetRef;

pub trait Component: WidgetRef {
    /// Offer a UI event to the component, returning whether it was consumed
    fn handle_ui_event(&mut self, event: &Event) -> bool;
}
