//! Subscription storage and dispatch
//!
//! This module holds registered handlers in a trie keyed by topic segment and
//! finds every handler a published topic reaches.

/// Routing error types
pub mod error;
/// Callbacks, handlers and handler sets
pub mod handler;
pub mod subscription_tree;


pub use error::{HandlerError, PublishError, PublishResult};
pub use handler::{
	Callback, Context, Delivery, Handler, HandlerResult, HandlerSet,
	SubscriptionId, invoke_all,
};
pub use subscription_tree::SubscriptionTree;
