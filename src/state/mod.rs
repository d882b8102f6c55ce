//! State module for tracking scheduler progress
//!
//! # Components
//!
//! - `Lifecycle`: whether the dispatch task is idle, running, or permanently stopped

mod lifecycle;

pub use lifecycle::{InvalidTransition, Lifecycle};
