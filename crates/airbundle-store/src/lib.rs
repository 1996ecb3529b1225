mod fs_utils;
mod layout;
mod prefs;
mod store;

pub use layout::StoreLayout;
pub use prefs::PreferenceStore;
pub use store::{BundleStore, ACTIVE_BUNDLE_KEY, CHANNEL_KEY};
