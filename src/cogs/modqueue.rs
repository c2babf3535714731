//! Moderation queue: flagged members land in one channel, decisions in another.

use once_cell::sync::Lazy;

use crate::schema::{CogConfig, FieldSpec, ScalarKind, Schema};

static FIELDS: Lazy<Vec<FieldSpec>> = Lazy::new(|| {
    vec![
        FieldSpec::scalar("enabled", ScalarKind::Bool).with_default(false),
        FieldSpec::scalar("queue_channel", ScalarKind::Channel),
        FieldSpec::scalar("log_channel", ScalarKind::Channel),
    ]
});

pub struct ModQueueSchema;

impl Schema for ModQueueSchema {
    const NAME: &'static str = "modqueue";
    const TITLE: &'static str = "ModQueueConfig";

    fn fields() -> &'static [FieldSpec] {
        &FIELDS
    }

    fn check(config: &CogConfig<Self>) -> bool {
        config.flag("enabled")
            && config.channel("queue_channel").is_some()
            && config.channel("log_channel").is_some()
    }
}
