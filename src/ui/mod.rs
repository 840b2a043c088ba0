mod app;
mod widgets;

pub use app::*;
pub use widgets::{graph_model, ui, GraphModel, GraphRow};
