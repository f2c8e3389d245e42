//! Parameter files: parsing, fallback lookup, and site construction.

pub mod builder;
pub mod fallback;
pub mod loader;

pub use builder::{build_site, site_from_text};
pub use fallback::{FallbackProvider, ValueAssignments};
pub use loader::{parse, ParamBlock, RawParams, RawStratum};
