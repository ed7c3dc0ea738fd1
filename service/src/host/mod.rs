//! Content host implementations
//!
//! - [`InMemoryHost`]: keeps everything in maps; used by tests and dry runs
//! - [`ConfigDirectoryHost`]: reads and writes a directory of exported YAML
//!   configuration files

pub mod config_dir;
pub mod memory;

pub use config_dir::ConfigDirectoryHost;
pub use memory::InMemoryHost;

use uuid::Uuid;

/// Assign a fresh uuid to a record that has never been saved
pub(crate) fn ensure_uuid(uuid: &mut Option<Uuid>) {
    if uuid.is_none() {
        *uuid = Some(Uuid::new_v4());
    }
}
