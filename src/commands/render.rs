//! Text shown to users for config listings and confirmations.

use std::fmt::Write;

use crate::error::Result;
use crate::schema::{CogConfig, Schema};

fn title<S: Schema>(config: &CogConfig<S>) -> String {
    let mark = if config.check() { '\u{2705}' } else { '\u{274C}' };
    format!("__**{}**__ {}", S::TITLE, mark)
}

/// Every declared field with its resolved value.
pub async fn listing<S: Schema>(config: &CogConfig<S>) -> Result<String> {
    let mut text = title(config);

    for spec in S::fields() {
        let value = config.resolve(spec.name).await?;
        let _ = write!(text, "\n**{}** ({}) = {}", spec.name, spec.kind, value);
    }

    Ok(text)
}

/// Confirmation for a single updated field.
pub async fn assignment<S: Schema>(config: &CogConfig<S>, field: &str) -> Result<String> {
    let value = config.resolve(field).await?;
    Ok(format!("{}\nSet **{}** = {}", title(config), field, value))
}
