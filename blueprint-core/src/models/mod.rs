mod document;
mod feature;
mod roadmap;
mod workspace;

pub use document::*;
pub use feature::*;
pub use roadmap::*;
pub use workspace::*;
