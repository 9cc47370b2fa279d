//! Controllers of the bundled demo site (`site/`).

pub mod index;
pub mod user_profile;

pub use index::IndexController;
pub use user_profile::UserProfileController;
