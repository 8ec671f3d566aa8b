pub mod refresh;
pub mod switcheo;
pub mod util;

pub use refresh::{CatalogFeed, load_catalog};
pub use switcheo::SwitcheoPriceFeed;
