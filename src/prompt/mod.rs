//! Prompt System - Template loading and rendering
//!
//! Role instructions are Handlebars templates. The built-in set can be
//! overridden per template by `<name>.md` files in a prompts directory.

mod library;
mod loader;
mod render;

pub use library::{
    PRODUCER_SYSTEM, PRODUCER_USER, PromptLibrary, ProducerPrompt, REVIEWER_SYSTEM, REVIEWER_USER, RenderedPrompt,
    ReviewerPrompt, TEMPLATE_NAMES,
};
pub use loader::PromptLoader;
pub use render::PromptRenderer;
