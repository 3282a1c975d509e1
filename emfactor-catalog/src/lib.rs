pub mod catalog;
pub mod dataset;
pub mod library;
pub mod query;

pub use catalog::FactorCatalog;
pub use dataset::{Dataset, DatasetStore};
pub use library::{import_pack, sync, LibraryIndex, LibraryStatus};
pub use query::{search, FactorFilter};
