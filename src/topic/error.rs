//! Error types and limits for the topic module
//!
//! Every variant of [`TopicError`] means the same thing to a caller: the
//! topic string was rejected as invalid topic syntax. The variants only
//! narrow down which rule was broken.

use thiserror::Error;

/// Invalid topic syntax
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TopicError {
	/// Topic is empty or consists only of whitespace
	#[error("Topic cannot be empty")]
	EmptyTopic,

	/// Two separators in a row, or a leading/trailing separator
	#[error("Invalid topic '{topic}': empty segment at position {position}")]
	EmptySegment {
		/// The rejected topic
		topic: String,
		/// Zero-based index of the empty segment
		position: usize,
	},

	/// Segment contains characters outside `[A-Za-z0-9_]`
	#[error("Invalid topic segment '{segment}' at position {position}")]
	InvalidSegment {
		/// The offending segment
		segment: String,
		/// Zero-based index of the segment
		position: usize,
	},

	/// `*` used anywhere but as the final segment
	#[error(
		"Invalid topic '{topic}': * wildcard can only be the last segment"
	)]
	WildcardPosition {
		/// The rejected topic
		topic: String,
	},

	/// Channel names address a single prefix and cannot end in `*`
	#[error("Invalid channel name '{name}': * wildcard is not allowed")]
	WildcardChannel {
		/// The rejected channel prefix
		name: String,
	},

	/// More segments than the configured maximum depth
	#[error("Topic too deep: {depth} segments > {max}")]
	TooDeep {
		/// Number of segments in the topic
		depth: usize,
		/// Configured maximum
		max: usize,
	},

	/// A single segment is longer than allowed
	#[error("Topic segment at position {position} too long: {len} > {max}")]
	SegmentTooLong {
		/// Zero-based index of the segment
		position: usize,
		/// Segment length in bytes
		len: usize,
		/// Configured maximum
		max: usize,
	},

	/// The whole topic string is longer than allowed
	#[error("Topic too long: {len} > {max}")]
	TopicTooLong {
		/// Topic length in bytes
		len: usize,
		/// Configured maximum
		max: usize,
	},
}

impl TopicError {
	/// Creates a new EmptySegment error
	pub fn empty_segment(topic: impl Into<String>, position: usize) -> Self {
		Self::EmptySegment {
			topic: topic.into(),
			position,
		}
	}

	/// Creates a new InvalidSegment error
	pub fn invalid_segment(
		segment: impl Into<String>,
		position: usize,
	) -> Self {
		Self::InvalidSegment {
			segment: segment.into(),
			position,
		}
	}

	/// Creates a new WildcardPosition error
	pub fn wildcard_position(topic: impl Into<String>) -> Self {
		Self::WildcardPosition {
			topic: topic.into(),
		}
	}

	/// Creates a new WildcardChannel error
	pub fn wildcard_channel(name: impl Into<String>) -> Self {
		Self::WildcardChannel { name: name.into() }
	}
}

/// Convenient Result type for topic operations
pub type TopicResult<T> = Result<T, TopicError>;

/// Topic processing limits and constants
pub mod limits {
	use serde::{Deserialize, Serialize};

	/// Maximum topic nesting depth allowed
	pub const MAX_TOPIC_DEPTH: usize = 32;

	/// Maximum length of a single topic segment
	pub const MAX_SEGMENT_LENGTH: usize = 256;

	/// Maximum total topic path length
	pub const MAX_TOPIC_LENGTH: usize = 1024;

	/// Size limits applied while parsing a topic
	///
	/// The default is unbounded, so only the segment grammar can reject a
	/// topic. [`TopicLimits::STRICT`] applies the `MAX_*` constants above.
	#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
	#[serde(default)]
	pub struct TopicLimits {
		/// Maximum number of segments
		pub max_depth: usize,
		/// Maximum length of one segment in bytes
		pub max_segment_length: usize,
		/// Maximum length of the whole topic in bytes
		pub max_topic_length: usize,
	}

	impl TopicLimits {
		/// No size limits
		pub const UNBOUNDED: Self = Self {
			max_depth: usize::MAX,
			max_segment_length: usize::MAX,
			max_topic_length: usize::MAX,
		};

		/// Limits for dispatchers fed by untrusted topic strings
		pub const STRICT: Self = Self {
			max_depth: MAX_TOPIC_DEPTH,
			max_segment_length: MAX_SEGMENT_LENGTH,
			max_topic_length: MAX_TOPIC_LENGTH,
		};
	}

	impl Default for TopicLimits {
		fn default() -> Self {
			Self::UNBOUNDED
		}
	}
}
