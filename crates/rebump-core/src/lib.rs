pub mod capability;
pub mod duration;
pub mod engine;
pub mod error;
pub mod io;
pub mod message;
pub mod paths;
pub mod schedule;
pub mod types;
pub mod workflow;

pub use error::{RebumpError, Result};
