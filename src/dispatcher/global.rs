use std::any::Any;
use std::sync::Arc;

use once_cell::sync::Lazy;

use super::sync_dispatcher::Dispatcher;

/// Payload type of the process-wide dispatcher.
pub type Payload = Arc<dyn Any + Send + Sync>;

static GLOBAL: Lazy<Dispatcher<Payload>> = Lazy::new(Dispatcher::new);

/// Process-wide dispatcher, created with default settings on first use.
///
/// Prefer an explicit [`Dispatcher`] where one can be passed around; this
/// accessor exists for code that needs a single shared bus.
pub fn global() -> &'static Dispatcher<Payload> {
	&GLOBAL
}
