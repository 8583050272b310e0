use std::fmt;
use std::sync::{Arc, Weak};

use arcstr::ArcStr;

use super::publish::Publish;
use super::sync_dispatcher::{ChannelCache, Core};
use crate::routing::{Callback, Context, PublishResult, SubscriptionId};
use crate::topic::{SEPARATOR, TopicResult};

/// Namespacing handle that prefixes every topic with a fixed path.
///
/// Obtained from [`Publish::channel`]. A dispatcher creates one channel per
/// full prefix and keeps it until the dispatcher is reset or dropped, so
/// repeated requests always return the same instance.
/// `channel("some").publish("one", ..)` is equivalent to
/// `publish("some.one", ..)` on the dispatcher.
pub struct Channel<T> {
	prefix: ArcStr,
	core: Arc<Core<T>>,
	/// Weak so the dispatcher's cache does not keep itself alive.
	cache: Weak<ChannelCache<T>>,
}

impl<T> Channel<T> {
	pub(super) fn new(
		prefix: ArcStr,
		core: Arc<Core<T>>,
		cache: Weak<ChannelCache<T>>,
	) -> Self {
		Self {
			prefix,
			core,
			cache,
		}
	}

	/// Full prefix, e.g. `ping.pong` for `channel("ping")?.channel("pong")`.
	pub fn prefix(&self) -> &str {
		&self.prefix
	}

	fn qualify(&self, topic: &str) -> String {
		format!("{}{SEPARATOR}{topic}", self.prefix)
	}
}

impl<T> fmt::Debug for Channel<T> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Channel")
			.field("prefix", &self.prefix)
			.finish()
	}
}

impl<T> Publish<T> for Channel<T> {
	fn subscribe_with(
		&self,
		topic: &str,
		callback: Callback<T>,
		context: Option<Context>,
	) -> TopicResult<SubscriptionId> {
		self.core
			.subscribe_with(&self.qualify(topic), callback, context)
	}

	fn publish(&self, topic: &str, data: &[T]) -> PublishResult<usize> {
		self.core.publish(&self.qualify(topic), data)
	}

	fn unsubscribe(
		&self,
		topic: &str,
		callback: &Callback<T>,
	) -> TopicResult<bool> {
		self.core.unsubscribe(&self.qualify(topic), callback)
	}

	fn unsubscribe_id(
		&self,
		topic: &str,
		id: SubscriptionId,
	) -> TopicResult<bool> {
		self.core.unsubscribe_id(&self.qualify(topic), id)
	}

	fn channel(&self, name: &str) -> TopicResult<Arc<Channel<T>>> {
		let name = self.qualify(name);
		match self.cache.upgrade() {
			| Some(cache) => self.core.open_channel(&cache, &name),
			// Every dispatcher handle is gone, nothing left to share with
			| None => {
				let prefix = self.core.channel_prefix(&name)?;
				Ok(Arc::new(Channel::new(
					prefix,
					Arc::clone(&self.core),
					Weak::new(),
				)))
			}
		}
	}
}
