//! Reddit account verification granting a role.

use once_cell::sync::Lazy;

use crate::schema::{CogConfig, FieldSpec, ScalarKind, Schema};

static FIELDS: Lazy<Vec<FieldSpec>> = Lazy::new(|| {
    vec![
        FieldSpec::scalar("enabled", ScalarKind::Bool).with_default(false),
        FieldSpec::scalar("verified_role", ScalarKind::Role),
    ]
});

pub struct ReddiscordSchema;

impl Schema for ReddiscordSchema {
    const NAME: &'static str = "reddiscord";
    const TITLE: &'static str = "ReddiscordConfig";

    fn fields() -> &'static [FieldSpec] {
        &FIELDS
    }

    fn check(config: &CogConfig<Self>) -> bool {
        config.flag("enabled") && config.role("verified_role").is_some()
    }
}
