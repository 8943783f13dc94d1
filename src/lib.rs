pub mod app;
pub mod canvas;
#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod diagram;
pub mod dialog;
pub mod editor;
pub mod error;
pub mod footprint;
pub mod layout;
pub mod layout_dump;
pub mod logging;
pub mod model;
pub mod render;
pub mod store;
pub mod sync;
pub mod text_metrics;
pub mod theme;

pub use app::{Planner, ProjectSummary, Route};
pub use canvas::{Canvas, Connection, EdgeChange, NodeChange, Viewport};
#[cfg(feature = "cli")]
pub use cli::run;
pub use config::{Config, load_config};
pub use editor::ProjectEditor;
pub use error::{PlannerError, Result};
pub use layout::{LayoutDirection, layout_nodes};
pub use model::{ExpertiseArea, ExpertiseAreas, Project, ProjectLink, ProjectNode, User};
pub use store::{FileStorage, MemoryStorage, Storage};
