//! # PingPong
//!
//! An in-process publish/subscribe dispatcher for dot-delimited topics with
//! hierarchical wildcard subscriptions and namespacing channels.
//!
//! ## Features
//!
//! - **Hierarchical topics**: `some.topic.name`, segments matching `[A-Za-z0-9_]+`
//! - **Wildcards**: `some.*` receives every topic below `some`; `*` receives everything
//! - **Channels**: `channel("chat")` prefixes every topic with `chat.`, nestable
//! - **Synchronous dispatch**: handlers run on the publisher's thread, shallowest
//!   wildcard first, in registration order
//! - **Fail-fast**: a handler error aborts the rest of the publish and is returned
//!   to the publisher
//!
//! ## Quick Start
//!
//! ```rust
//! use pingpong::prelude::*;
//!
//! let dispatcher = Dispatcher::<i32>::new();
//!
//! let callback = Callback::new(|delivery: &Delivery<'_, i32>| {
//!     println!(
//!         "{:?} sent to {} via {}",
//!         delivery.data(),
//!         delivery.topic_sent(),
//!         delivery.topic_received()
//!     );
//!     Ok(())
//! });
//! dispatcher.subscribe("one.*", callback.clone())?;
//!
//! // Prints `[10, 20] sent to one.two.three via one.*`
//! assert_eq!(dispatcher.publish("one.two.three", &[10, 20])?, 1);
//!
//! // `one.*` does not match `one` itself
//! assert_eq!(dispatcher.publish("one", &[])?, 0);
//!
//! let chat = dispatcher.channel("chat")?;
//! chat.subscribe("message", callback.clone())?;
//! assert_eq!(dispatcher.publish("chat.message", &[1])?, 1);
//!
//! dispatcher.unsubscribe("one.*", &callback)?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Topic grammar
//!
//! A topic is one or more segments separated by `.`. Empty segments,
//! characters outside `[A-Za-z0-9_]` and `*` anywhere but the last segment
//! are rejected with [`TopicError`].

#![warn(missing_docs)]

pub mod dispatcher;
pub mod routing;
pub mod topic;

// === Core Public API ===
pub use dispatcher::{
	Channel, Dispatcher, DispatcherSettings, Payload, Publish, SettingsError,
	global,
};
pub use routing::{
	Callback, Context, Delivery, HandlerError, HandlerResult, PublishError,
	PublishResult, SubscriptionId,
};
pub use topic::{TopicError, TopicPath, TopicResult};

// === Advanced API ===
// Standalone tree for callers that manage their own locking:
// `SubscriptionTree::dispatch`, `HandlerSet::run_all`, `invoke_all`
pub use routing::{Handler, HandlerSet, SubscriptionTree};
pub use topic::limits::TopicLimits;

/// Prelude module for convenient imports
///
/// ```rust
/// use pingpong::prelude::*;
/// ```
pub mod prelude {
	pub use crate::{
		Callback, Channel, Context, Delivery, Dispatcher, Publish,
		PublishError, SubscriptionId, TopicError,
	};
}

/// Error types used throughout the library
///
/// ```rust
/// use pingpong::errors::*;
/// ```
pub mod errors {
	pub use crate::{HandlerError, PublishError, SettingsError, TopicError};
}
