#![allow(missing_docs)]
//! Subscription trie keyed by topic segment

use std::collections::HashMap;
use std::ops::ControlFlow;

use arcstr::{ArcStr, Substr};
use tracing::debug;

use super::error::PublishResult;
use super::handler::{
	Callback, Context, Handler, HandlerSet, SubscriptionId, invoke_all,
};
use crate::topic::{TopicPath, TopicSegment};

/// One topic segment level of the tree.
#[derive(Debug)]
struct TreeNode<T> {
	/// Handlers whose topic ends exactly at this node
	exact: HandlerSet<T>,

	/// Handlers subscribed to `<this node>.*`
	wildcard: HandlerSet<T>,

	/// Children nodes for the next segment
	children: HashMap<Substr, TreeNode<T>>,
}

impl<T> Default for TreeNode<T> {
	fn default() -> Self {
		Self {
			exact: HandlerSet::new(),
			wildcard: HandlerSet::new(),
			children: HashMap::new(),
		}
	}
}

impl<T> TreeNode<T> {
	fn is_empty(&self) -> bool {
		self.exact.is_empty()
			&& self.wildcard.is_empty()
			&& self.children.is_empty()
	}

	/// Applies `f` to the handler set `segments` resolves to, if the path
	/// exists. With `prune` set, children left empty are dropped on the way
	/// back up.
	fn update<R, F>(
		&mut self,
		segments: &[TopicSegment],
		prune: bool,
		f: F,
	) -> Option<R>
	where
		F: FnOnce(&mut HandlerSet<T>) -> R,
	{
		match segments {
			| [] => Some(f(&mut self.exact)),
			| [TopicSegment::Wildcard, ..] => Some(f(&mut self.wildcard)),
			| [TopicSegment::Name(segment), rest @ ..] => {
				let child = self.children.get_mut(segment)?;
				let result = child.update(rest, prune, f);
				if prune && child.is_empty() {
					self.children.remove(segment);
				}
				result
			}
		}
	}

	fn count_nodes(&self) -> usize {
		1 + self
			.children
			.values()
			.map(TreeNode::count_nodes)
			.sum::<usize>()
	}

	fn collect_sets<'a>(&'a self, result: &mut Vec<&'a HandlerSet<T>>) {
		result.push(&self.exact);
		result.push(&self.wildcard);
		for child in self.children.values() {
			child.collect_sets(result);
		}
	}
}

/// Trie of subscriptions indexed by topic segment.
///
/// Nodes are created on first subscribe along a path. Unless pruning is
/// enabled they are never removed, so a dispatcher that sees an unbounded
/// vocabulary of topics grows without bound.
///
/// The tree does no locking of its own. [`Dispatcher`](crate::Dispatcher)
/// keeps one behind a mutex and runs a [`snapshot`](Self::snapshot) after
/// unlocking; single-threaded callers can use [`dispatch`](Self::dispatch)
/// directly.
///
/// ```rust
/// use pingpong::{Callback, Delivery, SubscriptionTree, TopicPath};
///
/// let mut tree = SubscriptionTree::<u8>::new();
/// let callback = Callback::new(|_: &Delivery<'_, u8>| Ok(()));
/// tree.register(&TopicPath::parse("some.*")?, callback, None);
///
/// assert_eq!(tree.dispatch(&TopicPath::parse("some.one")?, &[1])?, 1);
/// assert_eq!(tree.dispatch(&TopicPath::parse("some")?, &[1])?, 0);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug)]
pub struct SubscriptionTree<T> {
	root: TreeNode<T>,
	/// Handlers subscribed to bare `*`; run on every publish
	root_wildcard: HandlerSet<T>,
	prune_empty_nodes: bool,
	next_id: usize,
}

impl<T> Default for SubscriptionTree<T> {
	fn default() -> Self {
		Self::new()
	}
}

impl<T> SubscriptionTree<T> {
	pub fn new() -> Self {
		Self::with_pruning(false)
	}

	/// Creates a tree that drops empty nodes on unregister when
	/// `prune_empty_nodes` is set.
	pub fn with_pruning(prune_empty_nodes: bool) -> Self {
		Self {
			root: TreeNode::default(),
			root_wildcard: HandlerSet::new(),
			prune_empty_nodes,
			next_id: 0,
		}
	}

	/// Registers `callback` under `topic`, creating any missing nodes.
	pub fn register(
		&mut self,
		topic: &TopicPath,
		callback: Callback<T>,
		context: Option<Context>,
	) -> SubscriptionId {
		let id = SubscriptionId::new(self.next_id);
		self.next_id = self.next_id.wrapping_add(1);

		let handler = Handler::new(id, callback, context, topic.path());
		self.get_or_create_set(topic).push(handler);
		debug!(topic = %topic, subscription_id = %id, "Handler registered");
		id
	}

	fn get_or_create_set(&mut self, topic: &TopicPath) -> &mut HandlerSet<T> {
		if topic.is_root_wildcard() {
			return &mut self.root_wildcard;
		}
		let mut current_node = &mut self.root;
		for segment in topic.segments() {
			match segment {
				| TopicSegment::Name(s) => {
					current_node =
						current_node.children.entry(s.clone()).or_default()
				}
				| TopicSegment::Wildcard => {
					// Wildcard is always last; it belongs to the parent node
					return &mut current_node.wildcard;
				}
			}
		}
		&mut current_node.exact
	}

	fn find_set(&self, topic: &TopicPath) -> Option<&HandlerSet<T>> {
		if topic.is_root_wildcard() {
			return Some(&self.root_wildcard);
		}
		let mut current_node = &self.root;
		for segment in topic.segments() {
			match segment {
				| TopicSegment::Name(s) => {
					current_node = current_node.children.get(s)?
				}
				| TopicSegment::Wildcard => return Some(&current_node.wildcard),
			}
		}
		Some(&current_node.exact)
	}

	fn update_set<R, F>(&mut self, topic: &TopicPath, f: F) -> Option<R>
	where F: FnOnce(&mut HandlerSet<T>) -> R {
		if topic.is_root_wildcard() {
			return Some(f(&mut self.root_wildcard));
		}
		self.root
			.update(topic.segments(), self.prune_empty_nodes, f)
	}

	/// Removes the first handler registered under exactly `topic` whose
	/// callback is `callback`. Returns `None` when nothing matched.
	pub fn unregister(
		&mut self,
		topic: &TopicPath,
		callback: &Callback<T>,
	) -> Option<Handler<T>> {
		let removed = self
			.update_set(topic, |set| set.remove_callback(callback))
			.flatten();
		match &removed {
			| Some(handler) => debug!(
				topic = %topic,
				subscription_id = %handler.id(),
				"Handler unregistered"
			),
			| None => debug!(topic = %topic, "No matching handler to unregister"),
		}
		removed
	}

	/// Removes the handler registered under `topic` with `id`.
	pub fn unregister_id(
		&mut self,
		topic: &TopicPath,
		id: SubscriptionId,
	) -> Option<Handler<T>> {
		let removed = self.update_set(topic, |set| set.remove_id(id)).flatten();
		debug!(
			topic = %topic,
			subscription_id = %id,
			removed = removed.is_some(),
			"Unregister by id"
		);
		removed
	}

	/// Returns true if `id` is registered under exactly `topic`.
	pub fn contains(&self, topic: &TopicPath, id: SubscriptionId) -> bool {
		self.find_set(topic).is_some_and(|set| set.contains_id(id))
	}

	/// Collects, in invocation order, every handler `topic` reaches.
	///
	/// Bare `*` handlers come first. Then for each segment the cursor node's
	/// wildcard handlers run before descending, and the exact handlers of the
	/// final node run last. A missing child ends the walk, so `some.*` never
	/// matches `some` itself.
	pub fn matching_handlers(&self, topic: &TopicPath) -> Vec<&Handler<T>> {
		let mut matched: Vec<&Handler<T>> = self.root_wildcard.iter().collect();
		let mut cursor = &self.root;
		let _ = topic.for_each_segment(|segment, is_last| {
			let current = cursor;
			matched.extend(current.wildcard.iter());
			let TopicSegment::Name(name) = segment else {
				return ControlFlow::Break(());
			};
			let Some(child) = current.children.get(name) else {
				return ControlFlow::Break(());
			};
			if is_last {
				matched.extend(child.exact.iter());
			}
			cursor = child;
			ControlFlow::Continue(())
		});
		matched
	}

	/// Owned copy of [`matching_handlers`](Self::matching_handlers), for
	/// running the handlers once the tree is no longer borrowed.
	pub fn snapshot(&self, topic: &TopicPath) -> Vec<Handler<T>> {
		self.matching_handlers(topic).into_iter().cloned().collect()
	}

	/// Runs every handler matching `topic`, stopping at the first failure.
	pub fn dispatch(&self, topic: &TopicPath, data: &[T]) -> PublishResult<usize> {
		invoke_all(self.matching_handlers(topic), data, topic.as_str())
	}

	/// Every non-empty registration pattern with its handler count, sorted
	/// by pattern.
	pub fn subscriptions(&self) -> Vec<(ArcStr, usize)> {
		let mut sets = vec![&self.root_wildcard];
		self.root.collect_sets(&mut sets);
		let mut result: Vec<(ArcStr, usize)> = sets
			.into_iter()
			.filter_map(|set| {
				let first = set.iter().next()?;
				Some((ArcStr::from(first.pattern()), set.len()))
			})
			.collect();
		result.sort_by(|a, b| a.0.as_str().cmp(b.0.as_str()));
		result
	}

	/// Total number of live registrations.
	pub fn handler_count(&self) -> usize {
		let mut sets = vec![&self.root_wildcard];
		self.root.collect_sets(&mut sets);
		sets.iter().map(|set| set.len()).sum()
	}

	/// Number of nodes including the root.
	pub fn node_count(&self) -> usize {
		self.root.count_nodes()
	}

	/// Drops every node and handler. Subscription ids keep counting up so an
	/// id from before the reset never names a new registration.
	pub fn reset(&mut self) {
		self.root = TreeNode::default();
		self.root_wildcard.clear();
		debug!("Subscription tree reset");
	}
}
