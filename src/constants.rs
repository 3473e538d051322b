//! Internal constants: config file locations and the sentinel target symbol.
//!
//! This module is `pub(crate)` and not part of the public API.

/// Environment variable name for overriding the kreachdist config file path.
pub const DEFAULT_KREACHDIST_CONF_FILEPATH_ENV_NAME: &str = "KREACHDIST_CONFIG";

/// Environment variable name for the user's home directory.
pub const HOME_ENV_NAME: &str = "HOME";

/// The default filepath of the configuration file under `$HOME`.
pub const DEFAULT_CONF_FILEPATH_UNDER_HOME: &str = ".kreachdist/config.toml";

/// The LLVM symbol whose call marks the target instruction.
pub const TARGET_SYMBOL: &str = "@klee_reach()";

/// The extension stripped from the input path (and replaced with `.dist`).
pub const LLVM_IR_EXTENSION: &str = "ll";

/// The extension appended to the output distance file.
pub const DIST_EXTENSION: &str = "dist";
