//! YouTube upload feed. Never reports itself as configured.

use once_cell::sync::Lazy;

use crate::schema::{CogConfig, FieldSpec, ScalarKind, Schema};

static FIELDS: Lazy<Vec<FieldSpec>> =
    Lazy::new(|| vec![FieldSpec::scalar("videos_channel", ScalarKind::Channel)]);

pub struct DewSchema;

impl Schema for DewSchema {
    const NAME: &'static str = "dew";
    const TITLE: &'static str = "DewConfig";

    fn fields() -> &'static [FieldSpec] {
        &FIELDS
    }

    fn check(_config: &CogConfig<Self>) -> bool {
        false
    }
}
