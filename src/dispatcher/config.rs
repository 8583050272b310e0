//! Configuration for dispatcher initialization

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::topic::limits::TopicLimits;

/// Invalid configuration parameter values
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SettingsError {
	/// A limit that must be positive was zero
	#[error("Invalid configuration value: {name} must be greater than 0")]
	ZeroLimit {
		/// Name of the offending setting
		name: &'static str,
	},
}

/// Dispatcher-level behavior settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DispatcherSettings {
	/// Size limits applied to every topic and channel name, unbounded
	/// unless configured
	pub limits: TopicLimits,
	/// Drop tree nodes left without handlers or children on unsubscribe.
	/// Off by default, in which case every node ever created is kept.
	pub prune_empty_nodes: bool,
}

impl DispatcherSettings {
	/// Checks that every limit can admit at least one topic.
	pub fn validate(&self) -> Result<(), SettingsError> {
		let limits = [
			("limits.max_depth", self.limits.max_depth),
			("limits.max_segment_length", self.limits.max_segment_length),
			("limits.max_topic_length", self.limits.max_topic_length),
		];
		match limits.into_iter().find(|(_, value)| *value == 0) {
			| Some((name, _)) => Err(SettingsError::ZeroLimit { name }),
			| None => Ok(()),
		}
	}
}
