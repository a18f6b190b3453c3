mod store;

pub use store::{JsonStore, INSTALLER_DIR_NAME};
