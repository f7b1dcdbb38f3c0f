//! Template rendering and template lookup.

mod engine;
mod fs;
mod registry;

pub use engine::{JinjaEngine, RenderContext, TemplateEngine, TemplateError};
pub use fs::FsTemplates;
pub use registry::{
    MemoryTemplates, TemplateChain, TemplateLocation, TemplateRef, TemplateRegistry,
    language_candidates,
};
