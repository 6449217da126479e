//! Floor Editor - restaurant floor plans over the Onslip 360 POS
//!
//! # Module layout
//!
//! ```text
//! floor-editor/src/
//! ├── core/          # configuration, service errors
//! ├── editor/        # in-memory canvas: tables, walls, selection, snapping
//! ├── services/      # POS-backed table states, chairs, menu and payment
//! ├── session.rs     # editor + services, confirm-then-apply
//! ├── cli.rs         # `floor` command line
//! └── utils/         # logging
//! ```

pub mod cli;
pub mod core;
pub mod editor;
pub mod services;
pub mod session;
pub mod utils;

// Re-exports
pub use core::{Config, ErrorKind, ServiceError, ServiceResult};
pub use editor::{Editor, TableCreationConfig, Transform};
pub use session::{FloorSession, SyncStatus};

// Re-export logger functions
pub use utils::logger::{LogOutput, init_logger, init_logger_with_file};

/// Load the environment, read the configuration and start logging
///
/// `env_file` overrides the default `.env` lookup. A missing default file
/// is not an error.
pub fn setup_environment(env_file: Option<&std::path::Path>) -> anyhow::Result<Config> {
    match env_file {
        Some(path) => {
            dotenvy::from_path(path)?;
        }
        None => {
            dotenvy::dotenv().ok();
        }
    }

    let config = Config::from_env();
    init_logger_with_file(&config.log_level, config.log_dir.as_deref().map(std::path::Path::new));
    Ok(config)
}
