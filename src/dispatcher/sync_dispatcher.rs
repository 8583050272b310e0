use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use arcstr::ArcStr;
use parking_lot::Mutex;
use tracing::{debug, trace, warn};

use super::channel::Channel;
use super::config::{DispatcherSettings, SettingsError};
use super::publish::Publish;
use crate::routing::{
	Callback, Context, PublishResult, SubscriptionId,
	SubscriptionTree, invoke_all,
};
use crate::topic::{TopicError, TopicPath, TopicResult};

/// Subscription state shared by every dispatcher clone and every channel.
pub(super) struct Core<T> {
	settings: DispatcherSettings,
	tree: Mutex<SubscriptionTree<T>>,
}

/// Channels by full prefix. Entries stay until the dispatcher is reset or
/// dropped.
pub(super) type ChannelCache<T> = Mutex<HashMap<ArcStr, Arc<Channel<T>>>>;

impl<T> Core<T> {
	fn parse(&self, topic: &str) -> TopicResult<TopicPath> {
		TopicPath::parse_with_limits(topic, &self.settings.limits)
	}

	pub(super) fn subscribe_with(
		&self,
		topic: &str,
		callback: Callback<T>,
		context: Option<Context>,
	) -> TopicResult<SubscriptionId> {
		let topic = self.parse(topic)?;
		Ok(self.tree.lock().register(&topic, callback, context))
	}

	pub(super) fn publish(
		&self,
		topic: &str,
		data: &[T],
	) -> PublishResult<usize> {
		let topic = self.parse(topic)?;
		// Guard is dropped before any handler runs
		let handlers = self.tree.lock().snapshot(&topic);
		trace!(topic = %topic, handlers = handlers.len(), "Dispatching");
		invoke_all(&handlers, data, topic.as_str()).inspect_err(|err| {
			warn!(topic = %topic, error = %err, "Publish aborted by handler");
		})
	}

	pub(super) fn unsubscribe(
		&self,
		topic: &str,
		callback: &Callback<T>,
	) -> TopicResult<bool> {
		let topic = self.parse(topic)?;
		Ok(self.tree.lock().unregister(&topic, callback).is_some())
	}

	pub(super) fn unsubscribe_id(
		&self,
		topic: &str,
		id: SubscriptionId,
	) -> TopicResult<bool> {
		let topic = self.parse(topic)?;
		Ok(self.tree.lock().unregister_id(&topic, id).is_some())
	}

	/// Validates a full channel prefix. Channels never contain `*`.
	pub(super) fn channel_prefix(&self, name: &str) -> TopicResult<ArcStr> {
		let prefix = self.parse(name)?;
		if prefix.is_wildcard() {
			return Err(TopicError::wildcard_channel(name));
		}
		Ok(prefix.path())
	}

	/// Returns the cached channel for `name`, creating it on first use.
	pub(super) fn open_channel(
		self: &Arc<Self>,
		cache: &Arc<ChannelCache<T>>,
		name: &str,
	) -> TopicResult<Arc<Channel<T>>> {
		let key = self.channel_prefix(name)?;
		let mut channels = cache.lock();
		if let Some(channel) = channels.get(&key) {
			return Ok(Arc::clone(channel));
		}
		let channel = Arc::new(Channel::new(
			key.clone(),
			Arc::clone(self),
			Arc::downgrade(cache),
		));
		channels.insert(key, Arc::clone(&channel));
		debug!(prefix = %channel.prefix(), "Channel created");
		Ok(channel)
	}
}

/// In-process topic dispatcher.
///
/// Cloning is cheap and every clone shares the same subscriptions and
/// channels. Publishing runs matching handlers synchronously on the calling
/// thread. The set of handlers is captured under a single lock before any of
/// them runs, so handlers may subscribe, unsubscribe or publish themselves;
/// such changes take effect from the next publish.
pub struct Dispatcher<T> {
	core: Arc<Core<T>>,
	channels: Arc<ChannelCache<T>>,
}

impl<T> Clone for Dispatcher<T> {
	fn clone(&self) -> Self {
		Self {
			core: Arc::clone(&self.core),
			channels: Arc::clone(&self.channels),
		}
	}
}

impl<T> Default for Dispatcher<T> {
	fn default() -> Self {
		Self::new()
	}
}

impl<T> fmt::Debug for Dispatcher<T> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Dispatcher")
			.field("settings", &self.core.settings)
			.field("handlers", &self.handler_count())
			.finish()
	}
}

impl<T> Dispatcher<T> {
	/// Creates a dispatcher with an empty tree and default settings.
	pub fn new() -> Self {
		Self::from_valid_settings(DispatcherSettings::default())
	}

	/// Creates a dispatcher with custom settings.
	pub fn with_settings(
		settings: DispatcherSettings,
	) -> Result<Self, SettingsError> {
		settings.validate()?;
		Ok(Self::from_valid_settings(settings))
	}

	fn from_valid_settings(settings: DispatcherSettings) -> Self {
		let tree = SubscriptionTree::with_pruning(settings.prune_empty_nodes);
		Self {
			core: Arc::new(Core {
				settings,
				tree: Mutex::new(tree),
			}),
			channels: Arc::new(Mutex::new(HashMap::new())),
		}
	}

	/// Settings the dispatcher was created with.
	pub fn settings(&self) -> &DispatcherSettings {
		&self.core.settings
	}

	/// Returns true if `id` is registered under exactly `topic`.
	pub fn has_subscription(
		&self,
		topic: &str,
		id: SubscriptionId,
	) -> TopicResult<bool> {
		let topic = self.core.parse(topic)?;
		Ok(self.core.tree.lock().contains(&topic, id))
	}

	/// Every registration pattern with its handler count, sorted by pattern.
	pub fn subscriptions(&self) -> Vec<(ArcStr, usize)> {
		self.core.tree.lock().subscriptions()
	}

	/// Total number of live registrations.
	pub fn handler_count(&self) -> usize {
		self.core.tree.lock().handler_count()
	}

	/// Clears every subscription and forgets every channel.
	///
	/// Intended for test isolation. Channel handles obtained before the reset
	/// keep working, but `channel()` hands out new instances afterwards.
	pub fn reset(&self) {
		self.core.tree.lock().reset();
		self.channels.lock().clear();
		debug!("Dispatcher reset");
	}
}

impl<T> Publish<T> for Dispatcher<T> {
	fn subscribe_with(
		&self,
		topic: &str,
		callback: Callback<T>,
		context: Option<Context>,
	) -> TopicResult<SubscriptionId> {
		self.core.subscribe_with(topic, callback, context)
	}

	fn publish(&self, topic: &str, data: &[T]) -> PublishResult<usize> {
		self.core.publish(topic, data)
	}

	fn unsubscribe(
		&self,
		topic: &str,
		callback: &Callback<T>,
	) -> TopicResult<bool> {
		self.core.unsubscribe(topic, callback)
	}

	fn unsubscribe_id(
		&self,
		topic: &str,
		id: SubscriptionId,
	) -> TopicResult<bool> {
		self.core.unsubscribe_id(topic, id)
	}

	fn channel(&self, name: &str) -> TopicResult<Arc<Channel<T>>> {
		self.core.open_channel(&self.channels, name)
	}
}
