//! Centralized constants for the multiconf resolver.
//!
//! File names, directory names and limits used across modules live here to
//! avoid magic string duplication.

// =============================================================================
// Env files
// =============================================================================

/// Primary env file name, relative to the env root.
pub const ENV_FILE: &str = ".env";

/// Default (baseline) env file name, relative to the env root.
pub const ENV_DEFAULT_FILE: &str = ".env.default";

/// Env key consulted by the environment predicates (`is_dev()` etc.).
pub const DEFAULT_ENV_KEY: &str = "ENV";

// =============================================================================
// Config fragments
// =============================================================================

/// Name of the config directory under the config root.
pub const CONFIG_DIR_NAME: &str = "config";

/// Infix marking the default layer of a fragment: `{name}.default.{ext}`.
pub const DEFAULT_LAYER_INFIX: &str = "default";

/// Dependency name that refers to the env files rather than another config.
pub const ENV_DEPENDENCY: &str = "env";

// =============================================================================
// Limits
// =============================================================================

/// Default maximum nesting level for dependency retries and nested loads.
pub const DEFAULT_NESTING_THRESHOLD: usize = 10;

/// Default maximum number of segments in a dot path.
pub const DEFAULT_MAX_PATH_DEPTH: usize = 64;

// =============================================================================
// Process environment overrides
// =============================================================================

/// Overrides the config root directory.
pub const CONFIG_ROOT_VAR: &str = "MULTICONF_CONFIG_ROOT";

/// Overrides the env root directory.
pub const ENV_ROOT_VAR: &str = "MULTICONF_ENV_ROOT";

/// Overrides the nesting threshold.
pub const NESTING_THRESHOLD_VAR: &str = "MULTICONF_NESTING_THRESHOLD";
