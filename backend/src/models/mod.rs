// Core models
pub mod tournament;
pub mod team;
pub mod player;
pub mod match_model;

// Re-export commonly used types
pub use tournament::*;
pub use team::*;
pub use player::*;
pub use match_model::*;
