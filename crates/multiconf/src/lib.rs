//! Layered env and config resolution.
//!
//! This crate provides one shared read path for application settings:
//! - `env(key)` reads `<env_root>/.env` layered over the required
//!   `<env_root>/.env.default`, with smart JSON/boolean transformation.
//! - `config("name.key.sub")` reads the fragments of `name` from
//!   `<config_root>/config/` (`name.default.{ext}` underneath `name.{ext}`),
//!   deep-merges them and walks the dot path.
//! - Code fragments may declare that they wait for env or other configs; the
//!   resolver loads those first and retries, bounded by a nesting threshold.
//!
//! Everything is loaded lazily on first access and cached until
//! `init(true)` forces a reload.
//!
//! ```no_run
//! use multiconf::MultiConf;
//!
//! # fn main() -> Result<(), multiconf::ConfigError> {
//! let conf = MultiConf::builder().with_root("/srv/app").build()?;
//! let host = conf.env("DB_HOST")?;
//! let pool = conf.config_or("database.pool.size", 10)?;
//! # Ok(())
//! # }
//! ```

mod builder;
pub mod constants;
pub mod env;
mod environment;
mod error;
pub mod fragment;
mod multiconf;
pub mod path;
mod resolver;
pub mod store;

pub use builder::{ResolverBuilder, Settings, env_var_or_none};
pub use env::EnvStore;
pub use environment::{AppEnvironment, EnvironmentSets};
pub use error::ConfigError;
pub use fragment::{CodeLoader, Fragment, FragmentLoader, JsonLoader, Layer};
pub use multiconf::MultiConf;
pub use resolver::{FragmentContext, LoadState, Resolver, WaitList};
