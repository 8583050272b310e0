//! Integration tests for the public dispatcher API

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;

use pingpong::prelude::*;
use pingpong::DispatcherSettings;

/// Callback that counts its invocations.
fn mock_function<T: 'static>() -> (Callback<T>, Arc<AtomicUsize>) {
	let called = Arc::new(AtomicUsize::new(0));
	let counter = Arc::clone(&called);
	let callback = Callback::new(move |_: &Delivery<'_, T>| {
		counter.fetch_add(1, Ordering::SeqCst);
		Ok(())
	});
	(callback, called)
}

fn called(counter: &Arc<AtomicUsize>) -> usize {
	counter.load(Ordering::SeqCst)
}

mod subscribe_publish_tests {
	use super::*;

	#[test]
	fn test_publish_exact_topic() {
		let dispatcher = Dispatcher::<()>::new();
		let (callback, count) = mock_function();
		dispatcher.subscribe("some.one", callback).unwrap();

		assert_eq!(dispatcher.publish("some.one", &[]).unwrap(), 1);
		assert_eq!(called(&count), 1);
	}

	#[test]
	fn test_subscribe_with_wildcard() {
		let dispatcher = Dispatcher::<()>::new();
		let (callback, count) = mock_function();
		dispatcher.subscribe("some.*", callback).unwrap();

		dispatcher.publish("some", &[]).unwrap();
		dispatcher.publish("some.one", &[]).unwrap();
		dispatcher.publish("some.two", &[]).unwrap();
		dispatcher.publish("some.two.three", &[]).unwrap();

		assert_eq!(called(&count), 3);
	}

	#[test]
	fn test_subscribe_all_messages() {
		let dispatcher = Dispatcher::<()>::new();
		let (callback, count) = mock_function();
		dispatcher.subscribe("*", callback).unwrap();

		dispatcher.publish("one", &[]).unwrap();
		dispatcher.publish("two", &[]).unwrap();
		dispatcher.publish("one.two.three", &[]).unwrap();

		assert_eq!(called(&count), 3);
	}

	#[test]
	fn test_arguments_delivered_in_order() {
		let dispatcher = Dispatcher::<i32>::new();
		let received = Arc::new(Mutex::new(None));
		let received_clone = Arc::clone(&received);
		dispatcher
			.subscribe(
				"one.*",
				Callback::new(move |d: &Delivery<'_, i32>| {
					*received_clone.lock().unwrap() = Some((
						d.data().to_vec(),
						d.topic_sent().to_string(),
						d.topic_received().to_string(),
					));
					Ok(())
				}),
			)
			.unwrap();

		dispatcher.publish("one.two.three", &[10, 20]).unwrap();
		assert_eq!(
			received.lock().unwrap().clone(),
			Some((
				vec![10, 20],
				"one.two.three".to_string(),
				"one.*".to_string()
			))
		);
	}

	#[test]
	fn test_duplicate_registrations_each_run() {
		let dispatcher = Dispatcher::<()>::new();
		let (callback, count) = mock_function();
		dispatcher.subscribe("dup", callback.clone()).unwrap();
		dispatcher.subscribe("dup", callback).unwrap();

		assert_eq!(dispatcher.publish("dup", &[]).unwrap(), 2);
		assert_eq!(called(&count), 2);
	}

	#[test]
	fn test_context_is_delivered() {
		let dispatcher = Dispatcher::<()>::new();
		let seen = Arc::new(Mutex::new(Vec::new()));
		let seen_clone = Arc::clone(&seen);
		let callback = Callback::new(move |d: &Delivery<'_, ()>| {
			let name = d.context::<&'static str>().copied().unwrap_or("none");
			seen_clone.lock().unwrap().push(name);
			Ok(())
		});
		dispatcher
			.subscribe_with_context("ctx", callback.clone(), Arc::new("first"))
			.unwrap();
		dispatcher.subscribe("ctx", callback).unwrap();

		dispatcher.publish("ctx", &[]).unwrap();
		assert_eq!(*seen.lock().unwrap(), vec!["first", "none"]);
	}
}

mod unsubscribe_tests {
	use super::*;

	#[test]
	fn test_unsubscribe() {
		let dispatcher = Dispatcher::<()>::new();
		let (callback, count) = mock_function();
		dispatcher.subscribe("some.one", callback.clone()).unwrap();

		assert!(dispatcher.unsubscribe("some.one", &callback).unwrap());
		dispatcher.publish("some.one", &[]).unwrap();
		assert_eq!(called(&count), 0);

		// Second unsubscribe is a silent no-op
		assert!(!dispatcher.unsubscribe("some.one", &callback).unwrap());
	}

	#[test]
	fn test_unsubscribe_unknown_topic_is_noop() {
		let dispatcher = Dispatcher::<()>::new();
		let (callback, _) = mock_function();
		assert!(!dispatcher.unsubscribe("never.seen", &callback).unwrap());
	}

	#[test]
	fn test_unsubscribe_invalid_topic_fails() {
		let dispatcher = Dispatcher::<()>::new();
		let (callback, _) = mock_function();
		assert!(dispatcher.unsubscribe("bad..topic", &callback).is_err());
	}

	#[test]
	fn test_unsubscribe_same_callback_different_context_removes_first() {
		let dispatcher = Dispatcher::<()>::new();
		let seen = Arc::new(Mutex::new(Vec::new()));
		let seen_clone = Arc::clone(&seen);
		let callback = Callback::new(move |d: &Delivery<'_, ()>| {
			seen_clone
				.lock()
				.unwrap()
				.push(*d.context::<u32>().unwrap_or(&0));
			Ok(())
		});
		dispatcher
			.subscribe_with_context("x", callback.clone(), Arc::new(1u32))
			.unwrap();
		dispatcher
			.subscribe_with_context("x", callback.clone(), Arc::new(2u32))
			.unwrap();

		dispatcher.unsubscribe("x", &callback).unwrap();
		dispatcher.publish("x", &[]).unwrap();
		assert_eq!(*seen.lock().unwrap(), vec![2]);
	}

	#[test]
	fn test_unsubscribe_by_id() {
		let dispatcher = Dispatcher::<()>::new();
		let (callback, count) = mock_function();
		let first = dispatcher.subscribe("x", callback.clone()).unwrap();
		let second = dispatcher.subscribe("x", callback).unwrap();

		assert!(dispatcher.unsubscribe_id("x", second).unwrap());
		assert!(dispatcher.has_subscription("x", first).unwrap());
		assert!(!dispatcher.has_subscription("x", second).unwrap());

		dispatcher.publish("x", &[]).unwrap();
		assert_eq!(called(&count), 1);
	}
}

mod topic_validation_tests {
	use super::*;

	#[test]
	fn test_invalid_topics_fail_on_publish() {
		let dispatcher = Dispatcher::<()>::new();
		for topic in ["", ".", "some-some", " ", "some..", "***"] {
			let err = dispatcher.publish(topic, &[]).unwrap_err();
			assert!(err.is_topic_error(), "'{topic}' should be a topic error");
		}
	}

	#[test]
	fn test_valid_topics_publish() {
		let dispatcher = Dispatcher::<()>::new();
		for topic in ["some", "someSome", "123some", "some_1234", "abc.*"] {
			assert!(
				dispatcher.publish(topic, &[]).is_ok(),
				"'{topic}' should publish"
			);
		}
	}

	#[test]
	fn test_invalid_topics_fail_on_subscribe() {
		let dispatcher = Dispatcher::<()>::new();
		let (callback, _) = mock_function();
		assert_eq!(
			dispatcher.subscribe("a.*.b", callback.clone()).unwrap_err(),
			TopicError::wildcard_position("a.*.b")
		);
		assert!(dispatcher.subscribe("", callback).is_err());
		assert_eq!(dispatcher.handler_count(), 0);
	}

	#[test]
	fn test_default_dispatcher_has_no_size_limits() {
		let dispatcher = Dispatcher::<()>::new();
		let (callback, count) = mock_function();
		let deep = vec!["a"; 33].join(".");
		let long = "a".repeat(300);
		dispatcher.subscribe(&deep, callback.clone()).unwrap();
		dispatcher.subscribe(&long, callback).unwrap();

		assert_eq!(dispatcher.publish(&deep, &[]).unwrap(), 1);
		assert_eq!(dispatcher.publish(&long, &[]).unwrap(), 1);
		assert_eq!(called(&count), 2);
	}

	#[test]
	fn test_configured_limits_apply() {
		let mut settings = DispatcherSettings::default();
		settings.limits.max_depth = 2;
		let dispatcher = Dispatcher::<()>::with_settings(settings).unwrap();
		let (callback, _) = mock_function();

		assert!(dispatcher.subscribe("a.b", callback.clone()).is_ok());
		assert_eq!(
			dispatcher.subscribe("a.b.c", callback).unwrap_err(),
			TopicError::TooDeep { depth: 3, max: 2 }
		);
	}
}

mod failure_tests {
	use super::*;

	#[test]
	fn test_handler_error_aborts_remaining_handlers() {
		let dispatcher = Dispatcher::<()>::new();
		let (before, before_count) = mock_function();
		let (after, after_count) = mock_function();
		dispatcher.subscribe("*", before).unwrap();
		dispatcher
			.subscribe(
				"job.*",
				Callback::new(|_: &Delivery<'_, ()>| Err("job failed".into())),
			)
			.unwrap();
		dispatcher.subscribe("job.run", after).unwrap();

		let err = dispatcher.publish("job.run", &[]).unwrap_err();
		assert!(matches!(
			&err,
			PublishError::Handler { topic, pattern, .. }
				if topic == "job.run" && pattern == "job.*"
		));
		assert_eq!(called(&before_count), 1);
		assert_eq!(called(&after_count), 0);
	}

	#[test]
	fn test_handler_panic_propagates_to_publisher() {
		let dispatcher = Dispatcher::<()>::new();
		dispatcher
			.subscribe(
				"boom",
				Callback::new(|_: &Delivery<'_, ()>| panic!("handler panicked")),
			)
			.unwrap();

		let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
			dispatcher.publish("boom", &[])
		}));
		assert!(result.is_err());

		// The dispatcher is still usable afterwards
		let (callback, count) = mock_function();
		dispatcher.subscribe("after", callback).unwrap();
		dispatcher.publish("after", &[]).unwrap();
		assert_eq!(called(&count), 1);
	}
}

mod reentrancy_tests {
	use super::*;

	#[test]
	fn test_handler_can_publish_and_subscribe() {
		let dispatcher = Dispatcher::<u32>::new();
		let (late, late_count) = mock_function();
		let inner = dispatcher.clone();
		dispatcher
			.subscribe(
				"ping",
				Callback::new(move |d: &Delivery<'_, u32>| {
					inner.subscribe("late", late.clone())?;
					inner.publish("pong", d.data())?;
					Ok(())
				}),
			)
			.unwrap();
		let (pong, pong_count) = mock_function();
		dispatcher.subscribe("pong", pong).unwrap();

		dispatcher.publish("ping", &[1]).unwrap();
		assert_eq!(called(&pong_count), 1);

		dispatcher.publish("late", &[]).unwrap();
		assert_eq!(called(&late_count), 1);
	}

	#[test]
	fn test_subscriptions_made_during_publish_apply_next_time() {
		let dispatcher = Dispatcher::<()>::new();
		let (extra, extra_count) = mock_function();
		let inner = dispatcher.clone();
		dispatcher
			.subscribe(
				"grow",
				Callback::new(move |_: &Delivery<'_, ()>| {
					inner.subscribe("grow", extra.clone())?;
					Ok(())
				}),
			)
			.unwrap();

		assert_eq!(dispatcher.publish("grow", &[]).unwrap(), 1);
		assert_eq!(called(&extra_count), 0);
		assert_eq!(dispatcher.publish("grow", &[]).unwrap(), 2);
		assert_eq!(called(&extra_count), 1);
	}
}

#[test]
fn test_publish_from_many_threads() {
	let dispatcher = Dispatcher::<usize>::new();
	let (callback, count) = mock_function();
	dispatcher.subscribe("work.*", callback).unwrap();

	let workers: Vec<_> = (0 .. 4)
		.map(|i| {
			let dispatcher = dispatcher.clone();
			thread::spawn(move || {
				for _ in 0 .. 25 {
					dispatcher.publish("work.item", &[i]).unwrap();
				}
			})
		})
		.collect();
	for worker in workers {
		worker.join().unwrap();
	}

	assert_eq!(called(&count), 100);
}

#[test]
fn test_subscriptions_and_reset() {
	let dispatcher = Dispatcher::<()>::new();
	let (callback, count) = mock_function();
	dispatcher.subscribe("a", callback.clone()).unwrap();
	dispatcher.subscribe("a.*", callback.clone()).unwrap();
	let channel = dispatcher.channel("chat").unwrap();
	channel.subscribe("room", callback).unwrap();

	let patterns: Vec<String> = dispatcher
		.subscriptions()
		.into_iter()
		.map(|(pattern, _)| pattern.to_string())
		.collect();
	assert_eq!(patterns, vec!["a", "a.*", "chat.room"]);

	dispatcher.reset();
	assert_eq!(dispatcher.handler_count(), 0);
	dispatcher.publish("a.b", &[]).unwrap();
	assert_eq!(called(&count), 0);

	// Channels are forgotten by reset
	let fresh = dispatcher.channel("chat").unwrap();
	assert!(!Arc::ptr_eq(&channel, &fresh));
}

#[test]
fn test_pruning_setting() {
	let settings = DispatcherSettings {
		prune_empty_nodes: true,
		..DispatcherSettings::default()
	};
	let dispatcher = Dispatcher::<()>::with_settings(settings).unwrap();
	let (callback, _) = mock_function();
	dispatcher.subscribe("a.b.c", callback.clone()).unwrap();
	dispatcher.unsubscribe("a.b.c", &callback).unwrap();
	assert!(dispatcher.subscriptions().is_empty());
}
