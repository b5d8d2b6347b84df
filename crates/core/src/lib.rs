#![forbid(unsafe_code)]

pub mod challenge;
pub mod error;
pub mod grader;
pub mod leaderboard;
pub mod level;
pub mod model;
pub mod review;
pub mod stats;
pub mod time;

pub use error::{AlreadyExists, Error, NotFound, ProtectedEntityError, ValidationError};
pub use time::Clock;
