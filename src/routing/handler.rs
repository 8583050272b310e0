#![allow(missing_docs)]
//! Handlers and ordered handler sets

use std::any::Any;
use std::fmt::{self, Display};
use std::sync::Arc;

use arcstr::ArcStr;

use super::error::{HandlerError, PublishError, PublishResult};

/// Optional value a handler is invoked with, set at subscription time.
pub type Context = Arc<dyn Any + Send + Sync>;

/// Result a handler returns. An `Err` aborts the publish in progress.
pub type HandlerResult = Result<(), HandlerError>;

type CallbackFn<T> = dyn Fn(&Delivery<'_, T>) -> HandlerResult + Send + Sync;

/// A subscription identifier.
///
/// Returned by `subscribe`; unique per dispatcher for its whole lifetime.
#[derive(Debug, Eq, PartialEq, Hash, Copy, Clone, PartialOrd, Ord)]
pub struct SubscriptionId(usize);

impl SubscriptionId {
	pub(crate) fn new(id: usize) -> Self {
		Self(id)
	}
}

impl Display for SubscriptionId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "SubscriptionId({})", self.0)
	}
}

/// Shared handle to a handler function.
///
/// Clones share the same function, and `unsubscribe` matches on that
/// identity: keep a clone of the callback you subscribed to remove it later.
pub struct Callback<T>(Arc<CallbackFn<T>>);

impl<T> Callback<T> {
	/// Wraps a function as a callback.
	pub fn new<F>(f: F) -> Self
	where F: Fn(&Delivery<'_, T>) -> HandlerResult + Send + Sync + 'static {
		Self(Arc::new(f))
	}

	/// Returns true if both handles wrap the same function instance.
	pub fn same(&self, other: &Self) -> bool {
		Arc::ptr_eq(&self.0, &other.0)
	}

	fn call(&self, delivery: &Delivery<'_, T>) -> HandlerResult {
		(self.0)(delivery)
	}
}

impl<T> Clone for Callback<T> {
	fn clone(&self) -> Self {
		Self(Arc::clone(&self.0))
	}
}

impl<T> fmt::Debug for Callback<T> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "Callback({:p})", Arc::as_ptr(&self.0).cast::<()>())
	}
}

/// Everything a handler receives for one published topic.
pub struct Delivery<'a, T> {
	data: &'a [T],
	topic_sent: &'a str,
	topic_received: &'a str,
	context: Option<&'a (dyn Any + Send + Sync)>,
}

impl<'a, T> Delivery<'a, T> {
	/// Data passed to `publish`, in order.
	pub fn data(&self) -> &'a [T] {
		self.data
	}

	/// Topic as it was published, e.g. `one.two.three`.
	pub fn topic_sent(&self) -> &'a str {
		self.topic_sent
	}

	/// Pattern the handler was subscribed under, e.g. `one.*`.
	pub fn topic_received(&self) -> &'a str {
		self.topic_received
	}

	/// Context given at subscription time, if it has type `C`.
	pub fn context<C: Any>(&self) -> Option<&'a C> {
		self.context.and_then(|ctx| ctx.downcast_ref::<C>())
	}
}

/// A registered callback, its context, and the pattern it was registered
/// under.
pub struct Handler<T> {
	id: SubscriptionId,
	callback: Callback<T>,
	context: Option<Context>,
	pattern: ArcStr,
}

impl<T> Handler<T> {
	pub(crate) fn new(
		id: SubscriptionId,
		callback: Callback<T>,
		context: Option<Context>,
		pattern: ArcStr,
	) -> Self {
		Self {
			id,
			callback,
			context,
			pattern,
		}
	}

	pub fn id(&self) -> SubscriptionId {
		self.id
	}

	pub fn callback(&self) -> &Callback<T> {
		&self.callback
	}

	/// Pattern the handler was registered under.
	pub fn pattern(&self) -> &str {
		&self.pattern
	}

	/// Runs the callback. Trailing topic arguments are `topic_sent` and this
	/// handler's pattern.
	pub fn invoke(&self, data: &[T], topic_sent: &str) -> HandlerResult {
		let delivery = Delivery {
			data,
			topic_sent,
			topic_received: &self.pattern,
			context: self.context.as_deref(),
		};
		self.callback.call(&delivery)
	}
}

impl<T> Clone for Handler<T> {
	fn clone(&self) -> Self {
		Self {
			id: self.id,
			callback: self.callback.clone(),
			context: self.context.clone(),
			pattern: self.pattern.clone(),
		}
	}
}

impl<T> fmt::Debug for Handler<T> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Handler")
			.field("id", &self.id)
			.field("callback", &self.callback)
			.field("has_context", &self.context.is_some())
			.field("pattern", &self.pattern)
			.finish()
	}
}

/// Runs handlers in order, stopping at the first failure.
///
/// Returns how many handlers ran.
pub fn invoke_all<'h, T: 'h>(
	handlers: impl IntoIterator<Item = &'h Handler<T>>,
	data: &[T],
	topic_sent: &str,
) -> PublishResult<usize> {
	let mut invoked = 0;
	for handler in handlers {
		handler.invoke(data, topic_sent).map_err(|source| {
			PublishError::handler(topic_sent, handler.pattern(), source)
		})?;
		invoked += 1;
	}
	Ok(invoked)
}

/// Handlers registered for one topic node, in registration order.
///
/// The same callback may appear more than once.
pub struct HandlerSet<T> {
	handlers: Vec<Handler<T>>,
}

impl<T> Default for HandlerSet<T> {
	fn default() -> Self {
		Self::new()
	}
}

impl<T> HandlerSet<T> {
	pub fn new() -> Self {
		Self {
			handlers: Vec::new(),
		}
	}

	pub fn push(&mut self, handler: Handler<T>) {
		self.handlers.push(handler);
	}

	/// Removes the first handler whose callback is `callback`. The context is
	/// not compared.
	pub fn remove_callback(
		&mut self,
		callback: &Callback<T>,
	) -> Option<Handler<T>> {
		let pos = self
			.handlers
			.iter()
			.position(|h| h.callback.same(callback))?;
		Some(self.handlers.remove(pos))
	}

	/// Removes the handler registered with `id`.
	pub fn remove_id(&mut self, id: SubscriptionId) -> Option<Handler<T>> {
		let pos = self.handlers.iter().position(|h| h.id == id)?;
		Some(self.handlers.remove(pos))
	}

	pub fn contains_id(&self, id: SubscriptionId) -> bool {
		self.handlers.iter().any(|h| h.id == id)
	}

	pub fn iter(&self) -> std::slice::Iter<'_, Handler<T>> {
		self.handlers.iter()
	}

	pub fn len(&self) -> usize {
		self.handlers.len()
	}

	pub fn is_empty(&self) -> bool {
		self.handlers.is_empty()
	}

	pub fn clear(&mut self) {
		self.handlers.clear();
	}

	/// Runs every handler in registration order; see [`invoke_all`].
	pub fn run_all(&self, data: &[T], topic_sent: &str) -> PublishResult<usize> {
		invoke_all(&self.handlers, data, topic_sent)
	}
}

impl<T> fmt::Debug for HandlerSet<T> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_list().entries(&self.handlers).finish()
	}
}

impl<'a, T> IntoIterator for &'a HandlerSet<T> {
	type IntoIter = std::slice::Iter<'a, Handler<T>>;
	type Item = &'a Handler<T>;

	fn into_iter(self) -> Self::IntoIter {
		self.handlers.iter()
	}
}
