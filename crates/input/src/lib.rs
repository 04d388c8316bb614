//! Input sampling for the ring train.
//!
//! Platform key events are mapped to [`Action`]s by [`KeyBindings`]; once per
//! frame the held set is frozen into an [`ActionSnapshot`] and handed to the
//! [`InputSampler`], which applies it to the scene state.
//!
//! # Invariants
//! - Toggles fire on press edges only: holding a key toggles once.
//! - Edge detection compares two snapshots; no per-key static flags.
//! - The sampler never touches the GPU; callers react to [`SampleOutcome`].

pub mod action;
pub mod bindings;
pub mod sampler;

pub use action::{Action, ActionSnapshot, UnknownAction, pressed_edge};
pub use bindings::KeyBindings;
pub use sampler::{InputSampler, InputTuning, SampleOutcome, ScrollDelta};
