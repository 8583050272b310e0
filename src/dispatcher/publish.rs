use std::sync::Arc;

use super::channel::Channel;
use crate::routing::{Callback, Context, PublishResult, SubscriptionId};
use crate::topic::TopicResult;

/// Subscribe/publish/unsubscribe surface shared by [`Dispatcher`] and
/// [`Channel`].
///
/// Implemented once by the dispatcher; a channel implements it by prefixing
/// the topic and delegating.
///
/// [`Dispatcher`]: super::Dispatcher
pub trait Publish<T> {
	/// Registers `callback` under `topic`, optionally with a context the
	/// handler can read back from its [`Delivery`](crate::Delivery).
	fn subscribe_with(
		&self,
		topic: &str,
		callback: Callback<T>,
		context: Option<Context>,
	) -> TopicResult<SubscriptionId>;

	/// Runs every handler matching `topic` on the calling thread and returns
	/// how many ran. A failing handler stops the publish.
	fn publish(&self, topic: &str, data: &[T]) -> PublishResult<usize>;

	/// Removes the first registration of `callback` under exactly `topic`.
	/// Returns false, without error, when there was none.
	fn unsubscribe(
		&self,
		topic: &str,
		callback: &Callback<T>,
	) -> TopicResult<bool>;

	/// Removes the registration `id` under exactly `topic`.
	fn unsubscribe_id(
		&self,
		topic: &str,
		id: SubscriptionId,
	) -> TopicResult<bool>;

	/// Returns the channel nested under this one (or at the top level).
	fn channel(&self, name: &str) -> TopicResult<Arc<Channel<T>>>;

	/// Registers `callback` under `topic` without a context.
	fn subscribe(
		&self,
		topic: &str,
		callback: Callback<T>,
	) -> TopicResult<SubscriptionId> {
		self.subscribe_with(topic, callback, None)
	}

	/// Registers `callback` under `topic` with `context`.
	fn subscribe_with_context(
		&self,
		topic: &str,
		callback: Callback<T>,
		context: Context,
	) -> TopicResult<SubscriptionId> {
		self.subscribe_with(topic, callback, Some(context))
	}
}
