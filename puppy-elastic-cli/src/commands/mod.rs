pub mod probe;
pub mod query;

pub use probe::{alias_exists, get, index_exists};
pub use query::{build_search, scroll, search};
