//! Prediction of likely next routes from interaction history.

mod engine;
mod events;

pub use engine::{PredictionAnalytics, PredictionConfig, PredictionEngine, PredictionSnapshot};
pub use events::{ClickEvent, HoverEvent, Interaction, RouteVisit, ScrollDirection, ScrollSample};
