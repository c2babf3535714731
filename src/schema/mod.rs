//! Declarative per-guild configuration.
//!
//! A schema is a namespace name plus a static table of [`FieldSpec`]s. The
//! table decides everything else: where each field is stored, what it
//! defaults to, how it resolves and how the config command parses it.
//!
//! ```rust,ignore
//! pub struct LogSchema;
//!
//! static LOG_FIELDS: Lazy<Vec<FieldSpec>> = Lazy::new(|| vec![
//!     FieldSpec::scalar("enabled", ScalarKind::Bool).with_default(false),
//!     FieldSpec::scalar("broadcast_channel", ScalarKind::Channel),
//! ]);
//!
//! impl Schema for LogSchema {
//!     const NAME: &'static str = "log";
//!     const TITLE: &'static str = "LogConfig";
//!
//!     fn fields() -> &'static [FieldSpec] { &LOG_FIELDS }
//!
//!     fn check(config: &CogConfig<Self>) -> bool {
//!         config.flag("enabled") && config.channel("broadcast_channel").is_some()
//!     }
//! }
//! ```

mod config;
mod field;
mod value;

pub use config::CogConfig;
pub use field::{FieldSpec, ScalarKind};
pub use value::{Resolved, Value};

/// A per-feature config record stored under `NAME` in the guild document.
pub trait Schema: Send + Sync + Sized + 'static {
    /// Namespace key inside the guild document.
    const NAME: &'static str;

    /// Heading used when the config is shown to users.
    const TITLE: &'static str;

    /// Declared fields, built once and shared by every instance.
    fn fields() -> &'static [FieldSpec];

    /// Whether the feature is enabled and fully configured.
    fn check(config: &CogConfig<Self>) -> bool;

    fn field(name: &str) -> Option<&'static FieldSpec> {
        Self::fields().iter().find(|spec| spec.name == name)
    }
}
