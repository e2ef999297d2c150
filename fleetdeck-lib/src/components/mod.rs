//! Editing dialogs.
//!
//! Each dialog takes [`Message`](vehicle_editor::Message)s from its caller and answers with an
//! `Action` describing what the caller should do next. Persistence stays with the caller, which
//! reports the outcome back through a `Settled` message.

pub mod profile_editor;
pub mod vehicle_editor;

pub use profile_editor::ProfileEditor;
pub use vehicle_editor::VehicleEditor;
