pub mod wiki;

pub use wiki::{category_links, load_exclusions, WikiImporter};
