mod category;
mod region;

pub use category::{Catalog, CategoryNode, CategoryPath};
pub use region::RegionTable;
