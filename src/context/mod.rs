//! Context domain: the action data context, its memo cache, anchor and user data.
//! Owns resolution behavior; hosts consume it through `ActionDataContext` and `DataContext`.

pub mod anchor;
pub mod cache;
pub mod resolver;
pub mod types;
pub mod user_data;

pub use anchor::AnchorRef;
pub use cache::DataCache;
pub use resolver::{ActionDataContext, ActionDataContextBuilder};
pub use types::{Collaborators, DataContext, MapDataContext};
pub use user_data::{UserDataKey, UserDataStore};
