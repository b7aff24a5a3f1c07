mod bounding_box;
mod correlation;
mod kalman_filter;
mod template;
mod track_state;

pub use bounding_box::BoundingBox;
pub use correlation::CorrelationTracker;
pub use template::TemplateTracker;
pub use track_state::{TrackPhase, TrackState};
