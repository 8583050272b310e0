//! Dispatcher facade
//!
//! This module provides the public [`Dispatcher`], its [`Channel`]
//! namespacing handles and the [`Publish`] trait both implement.

/// Topic-scoped sub-dispatchers
pub mod channel;
pub mod config;
/// Process-wide dispatcher
pub mod global;
/// Shared subscribe/publish/unsubscribe surface
pub mod publish;
/// Synchronous dispatcher implementation
pub mod sync_dispatcher;

pub use channel::Channel;
pub use config::{DispatcherSettings, SettingsError};
pub use global::{Payload, global};
pub use publish::Publish;
pub use sync_dispatcher::Dispatcher;
