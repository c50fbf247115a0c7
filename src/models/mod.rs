// Models module - exports all model types

mod member;
mod selection;
mod trail;

// Re-export model types
pub use self::member::{GroupMember, ValidationError, WEIGHT_SUM_TOLERANCE};
pub use self::selection::{AlgorithmKind, Selection};
pub use self::trail::{Difficulty, Trail, TrailType};

// Common type aliases for improved code readability
pub type TrailId = String;
pub type Utility = f64;
pub type Kilometers = f64;
pub type Hours = f64;
pub type Meters = u32;
