mod schema;
mod settings;
mod storage;

pub use schema::SchemaManager;
pub use settings::{AdminSeed, Auth, Database, Historique, Iot, Logger, Server, Settings};
pub use storage::Storage;

use std::path::PathBuf;
use std::{env, io};

pub fn normalize_path(path: &str) -> io::Result<PathBuf> {
    let path_buf = PathBuf::from(path);

    Ok(if path_buf.is_absolute() {
        path_buf
    } else {
        env::current_dir()?.join(path_buf)
    })
}
