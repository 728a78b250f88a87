//! Hook lifecycle management: location resolution, dispatcher generation,
//! activation state machine, entry CRUD, and bulk init/destroy/status.

pub mod dispatch;
pub mod engine;
pub mod entries;
pub mod lifecycle;
pub mod resolve;
