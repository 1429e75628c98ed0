mod category_bar;
mod input;
mod prompt;

pub use category_bar::{CategoryBar, CategoryChanged};
pub use prompt::{Prompt, PromptEvent};

/// Outcome of offering a key to a component.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyResult<T> {
  /// Key was consumed, nothing for the parent to do
  Handled,
  /// Key was consumed and produced an event for the parent
  Event(T),
  /// Key was not consumed, parent should try the next handler
  NotHandled,
}
