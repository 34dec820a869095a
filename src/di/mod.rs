mod extractor;
mod registry;

pub use extractor::{HasCollaborators, Inject};
pub use registry::CollaboratorRegistry;
