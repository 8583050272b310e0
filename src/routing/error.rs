use thiserror::Error;

use crate::topic::TopicError;

/// Error returned by a handler. Any error type can be boxed into it with `?`.
pub type HandlerError = Box<dyn std::error::Error + Send + Sync>;

/// Errors raised while publishing a topic
#[derive(Debug, Error)]
pub enum PublishError {
	/// Published topic failed validation
	#[error("Invalid topic: {0}")]
	Topic(#[from] TopicError),

	/// A handler failed; handlers after it were not run
	#[error("Handler subscribed to '{pattern}' failed while handling '{topic}'")]
	Handler {
		/// Topic as published
		topic: String,
		/// Pattern the failing handler was registered under
		pattern: String,
		/// Error returned by the handler
		#[source]
		source: HandlerError,
	},
}

impl PublishError {
	/// Creates a new Handler error
	pub fn handler(
		topic: impl Into<String>,
		pattern: impl Into<String>,
		source: HandlerError,
	) -> Self {
		Self::Handler {
			topic: topic.into(),
			pattern: pattern.into(),
			source,
		}
	}

	/// Returns true if the publish was rejected because of the topic itself.
	pub fn is_topic_error(&self) -> bool {
		matches!(self, Self::Topic(_))
	}
}

/// Convenient Result type for publish operations
pub type PublishResult<T> = Result<T, PublishError>;
