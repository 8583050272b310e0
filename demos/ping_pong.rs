//! Two channels bouncing a counter back and forth.
//!
//! ```bash
//! RUST_LOG=pingpong=debug cargo run --example ping_pong
//! ```

use std::sync::Arc;

use pingpong::prelude::*;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

const MAX_VOLLEYS: u32 = 6;

fn setup_tracing() {
	// Silent unless RUST_LOG is set
	let Ok(filter) = EnvFilter::try_from_default_env() else {
		return;
	};
	tracing_subscriber::registry()
		.with(filter)
		.with(
			tracing_subscriber::fmt::layer()
				.with_target(true)
				.compact(),
		)
		.init();
}

/// Handler that answers a hit on its own channel by serving to `target`.
fn player(name: &'static str, target: Arc<Channel<u32>>) -> Callback<u32> {
	Callback::new(move |delivery: &Delivery<'_, u32>| {
		let volley = delivery.data().first().copied().unwrap_or(0);
		println!("{name:>4} <- {volley} ({})", delivery.topic_sent());
		if volley < MAX_VOLLEYS {
			target.publish("hit", &[volley + 1])?;
		}
		Ok(())
	})
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
	setup_tracing();

	let dispatcher = Dispatcher::<u32>::new();
	let game = dispatcher.channel("game")?;
	let ping = game.channel("ping")?;
	let pong = game.channel("pong")?;

	ping.subscribe("hit", player("ping", Arc::clone(&pong)))?;
	pong.subscribe("hit", player("pong", Arc::clone(&ping)))?;

	// Spectator sees every event inside the game channel
	game.subscribe(
		"*",
		Callback::new(|delivery: &Delivery<'_, u32>| {
			println!("     [{}] via {}", delivery.topic_sent(), delivery.topic_received());
			Ok(())
		}),
	)?;

	ping.publish("hit", &[0])?;

	for (pattern, handlers) in dispatcher.subscriptions() {
		println!("{pattern}: {handlers} handler(s)");
	}
	Ok(())
}
