pub mod export;
pub mod feedback;
pub mod targets;
pub mod transition;
