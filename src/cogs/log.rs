//! Server event log broadcast to a single channel.

use once_cell::sync::Lazy;

use crate::schema::{CogConfig, FieldSpec, ScalarKind, Schema};

static FIELDS: Lazy<Vec<FieldSpec>> = Lazy::new(|| {
    vec![
        FieldSpec::scalar("enabled", ScalarKind::Bool).with_default(false),
        FieldSpec::scalar("broadcast_channel", ScalarKind::Channel),
    ]
});

pub struct LogSchema;

impl Schema for LogSchema {
    const NAME: &'static str = "log";
    const TITLE: &'static str = "LogConfig";

    fn fields() -> &'static [FieldSpec] {
        &FIELDS
    }

    fn check(config: &CogConfig<Self>) -> bool {
        config.flag("enabled") && config.channel("broadcast_channel").is_some()
    }
}
