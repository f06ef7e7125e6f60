//! User intents and the commands they launch.
//!
//! * `Intent` is the vocabulary shared by key translation, mouse handling and
//!   operations: every user-level request becomes one before it reaches the
//!   revision engine.
//! * `CommandTask` is a mutating backend command plus the follow-ups that run
//!   strictly in order once it succeeds.
//! * `translate` maps keys to intents using a `KeyMap`; precedence between
//!   overlapping bindings is decided here and nowhere else.

mod intent;
mod task;
pub mod translate;

pub use intent::{Intent, Navigate, NavigateTarget};
pub use task::{CommandTask, FollowUp};
pub use translate::{translate_default_key, translate_navigation_key};
