//! Topic handling module
//!
//! Parsing and validation of dot-delimited topics such as `some.topic` or
//! `some.*`.

pub mod error;
pub mod topic_path;


pub use error::{TopicError, TopicResult, limits};
pub use topic_path::{SEPARATOR, TopicPath, TopicSegment, WILDCARD};
