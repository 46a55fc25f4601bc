/// Command and message handlers
pub mod handlers;
/// Static command registry
pub mod registry;
/// User-facing reply rendering
pub mod replies;
