//! Generic `config` command for any cog schema.
//!
//! `config` lists every field, `config <field> <value...>` sets a scalar,
//! `config <field> add|remove <value...>` edits a list field.

use std::sync::Arc;

use tracing::debug;

use super::parse::{self, ArgumentParser};
use super::render;
use crate::cogs::Cog;
use crate::error::{Error, Result, ValidationError};
use crate::schema::{FieldSpec, ScalarKind, Schema, Value};

const LIST_VERBS: &[&str] = &["add", "remove"];

pub struct ConfigCommand<'a, S: Schema> {
    cog: &'a Cog<S>,
    parser: &'a dyn ArgumentParser,
}

impl<'a, S: Schema> ConfigCommand<'a, S> {
    pub fn new(cog: &'a Cog<S>, parser: &'a dyn ArgumentParser) -> Self {
        Self { cog, parser }
    }

    /// Run the command and produce the reply. Validation errors become the
    /// reply; any other error is returned.
    pub async fn handle(&self, guild_id: u64, tokens: &[&str]) -> Result<String> {
        match self.execute(guild_id, tokens).await {
            Err(Error::Validation(e)) => {
                debug!("{} - Rejected config command: {}", S::TITLE, e);
                Ok(e.to_string())
            }
            other => other,
        }
    }

    /// Run the command, reporting bad input as [`Error::Validation`].
    pub async fn execute(&self, guild_id: u64, tokens: &[&str]) -> Result<String> {
        let Some((field, rest)) = tokens.split_first() else {
            let config = self.cog.get_config(guild_id).await?;
            return render::listing(&*config).await;
        };

        let spec = S::field(field).ok_or_else(|| ValidationError::UnknownField(field.to_string()))?;

        // One writer per guild and cog; reads are never blocked.
        let _guard = self.cog.lock(guild_id).await;
        let config = self.cog.get_config(guild_id).await?;

        let value = if spec.kind.is_list() {
            let current = match config.raw(spec.name) {
                Some(Value::List(items)) => items.clone(),
                _ => Vec::new(),
            };
            match self.edit_list(guild_id, spec, current, rest).await? {
                Some(items) => Value::List(items),
                None => return render::assignment(&*config, spec.name).await,
            }
        } else {
            let element = spec.kind.element();
            let raw = join(element, rest).ok_or_else(|| ValidationError::MissingArgument(spec.name.to_string()))?;
            self.parser.parse(guild_id, &raw, element).await?
        };

        // The store has the new value from here on; the cache must follow
        // before anything else can fail.
        let updated = Arc::new(config.update_config(spec.name, value).await?);
        self.cog.replace(guild_id, Arc::clone(&updated)).await;

        render::assignment(&*updated, spec.name).await
    }

    /// Apply `add`/`remove` to `items`. `None` when nothing changes.
    async fn edit_list(
        &self,
        guild_id: u64,
        spec: &FieldSpec,
        mut items: Vec<Value>,
        tokens: &[&str],
    ) -> Result<Option<Vec<Value>>> {
        let Some((verb, rest)) = tokens.split_first() else {
            return Err(ValidationError::MissingArgument(spec.name.to_string()).into());
        };

        let verb = verb.to_lowercase();
        if !LIST_VERBS.contains(&verb.as_str()) {
            return Err(ValidationError::UnknownVerb {
                field: spec.name.to_string(),
                verb,
                allowed: LIST_VERBS,
            }
            .into());
        }

        let element = spec.kind.element();
        let raw = join(element, rest).ok_or_else(|| ValidationError::MissingArgument(spec.name.to_string()))?;
        let item = match self.parser.parse(guild_id, &raw, element).await {
            Ok(item) => item,
            // A deleted entity no longer parses, but its stored id can still
            // be removed.
            Err(err) => match parse::reference(&raw, element) {
                Some(stale) if verb == "remove" && err.as_validation().is_some() && items.contains(&stale) => stale,
                _ => return Err(err),
            },
        };

        if verb == "add" {
            if items.contains(&item) {
                return Ok(None);
            }
            items.push(item);
        } else {
            let Some(position) = items.iter().position(|existing| *existing == item) else {
                return Err(ValidationError::NotPresent {
                    field: spec.name.to_string(),
                    value: raw,
                }
                .into());
            };
            items.remove(position);
        }

        Ok(Some(items))
    }
}

/// Free text takes every remaining token, other kinds the first one.
fn join(kind: ScalarKind, tokens: &[&str]) -> Option<String> {
    let raw = match kind {
        ScalarKind::Str => tokens.join(" "),
        _ => tokens.first()?.to_string(),
    };
    (!raw.trim().is_empty()).then_some(raw)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use mongodb::bson::{bson, doc, Document};

    use super::*;
    use crate::cache::CacheRegistry;
    use crate::commands::MentionParser;
    use crate::platform::MessageRef;
    use crate::testing::{FakeResolver, MemoryStore, TestSchema};

    struct Fixture {
        store: Arc<MemoryStore>,
        cog: Cog<TestSchema>,
        parser: MentionParser,
    }

    impl Fixture {
        fn new(document: Document) -> Self {
            Self::with_resolver(document, FakeResolver::discord())
        }

        fn with_resolver(document: Document, resolver: FakeResolver) -> Self {
            let store = Arc::new(MemoryStore::with_document(1, document));
            let resolver = Arc::new(resolver);
            let cog = Cog::new(&CacheRegistry::new(), store.clone(), resolver.clone());
            Self {
                store,
                cog,
                parser: MentionParser::new(resolver),
            }
        }

        fn command(&self) -> ConfigCommand<'_, TestSchema> {
            ConfigCommand::new(&self.cog, &self.parser)
        }

        async fn run(&self, tokens: &[&str]) -> Result<String> {
            self.command().execute(1, tokens).await
        }

        fn stored(&self, key: &str) -> Option<mongodb::bson::Bson> {
            self.store
                .document(1)
                .get_document("cfg")
                .ok()
                .and_then(|cfg| cfg.get(key).cloned())
        }
    }

    #[tokio::test]
    async fn test_listing() {
        let fixture = Fixture::new(doc! { "cfg": { "enabled": true, "channel_id": 42_i64, "servers": ["mc.example.org"] } });

        let text = fixture.run(&[]).await.unwrap();

        assert!(text.starts_with("__**TestConfig**__ \u{2705}"));
        assert!(text.contains("**enabled** (bool) = true"));
        assert!(text.contains("**channel** (TextChannel) = <#42>"));
        assert!(text.contains("**servers** (List[str]) = \n• mc.example.org"));
        assert!(text.contains("**limit** (int) = 10"));
        assert_eq!(fixture.store.writes(), 0);
    }

    #[tokio::test]
    async fn test_set_bool_is_merged() {
        let fixture = Fixture::new(doc! { "cfg": { "channel_id": 42_i64 } });
        assert!(!fixture.cog.get_config(1).await.unwrap().check());

        let reply = fixture.run(&["enabled", "true"]).await.unwrap();

        assert!(reply.contains("Set **enabled** = true"));
        assert_eq!(fixture.stored("enabled"), Some(bson!(true)));
        assert_eq!(fixture.stored("channel_id"), Some(bson!(42_i64)));

        // The cache entry was replaced with the persisted state.
        let reads = fixture.store.reads();
        let config = fixture.cog.get_config(1).await.unwrap();
        assert!(config.flag("enabled"));
        assert!(config.check());
        assert_eq!(fixture.store.reads(), reads);

        // And a fresh load sees it too.
        fixture.cog.invalidate(1).await;
        assert!(fixture.cog.get_config(1).await.unwrap().flag("enabled"));
    }

    #[tokio::test]
    async fn test_set_free_text_joins_tokens() {
        let fixture = Fixture::new(Document::new());

        fixture.run(&["motd", "hello", "there"]).await.unwrap();

        assert_eq!(fixture.stored("motd"), Some(bson!("hello there")));
    }

    #[tokio::test]
    async fn test_set_reference_stores_id() {
        let fixture = Fixture::new(Document::new());

        let reply = fixture.run(&["channel", "<#42>"]).await.unwrap();
        fixture.run(&["message", "https://discord.com/channels/1/42/100"]).await.unwrap();

        assert!(reply.contains("Set **channel** = <#42>"));
        assert_eq!(fixture.stored("channel_id"), Some(bson!(42_i64)));
        assert_eq!(fixture.stored("message_id"), Some(bson!("42:100")));
    }

    #[tokio::test]
    async fn test_list_add_dedup_remove() {
        let fixture = Fixture::new(doc! { "cfg": { "servers": [] } });

        fixture.run(&["servers", "add", "1.2.3.4"]).await.unwrap();
        assert_eq!(fixture.stored("servers"), Some(bson!(["1.2.3.4"])));

        let writes = fixture.store.writes();
        fixture.run(&["servers", "add", "1.2.3.4"]).await.unwrap();
        assert_eq!(fixture.stored("servers"), Some(bson!(["1.2.3.4"])));
        assert_eq!(fixture.store.writes(), writes);

        fixture.run(&["servers", "remove", "1.2.3.4"]).await.unwrap();
        assert_eq!(fixture.stored("servers"), Some(bson!([])));
    }

    #[tokio::test]
    async fn test_list_keeps_order() {
        let fixture = Fixture::new(doc! { "cfg": { "servers": ["a", "b", "c"] } });

        fixture.run(&["servers", "add", "a"]).await.unwrap();
        fixture.run(&["servers", "remove", "b"]).await.unwrap();
        fixture.run(&["servers", "add", "d"]).await.unwrap();

        assert_eq!(fixture.stored("servers"), Some(bson!(["a", "c", "d"])));
    }

    #[tokio::test]
    async fn test_remove_absent_is_rejected() {
        let fixture = Fixture::new(doc! { "cfg": { "servers": ["a"] } });

        let err = fixture.run(&["servers", "remove", "b"]).await.unwrap_err();

        assert!(matches!(err.as_validation(), Some(ValidationError::NotPresent { .. })));
        assert_eq!(fixture.stored("servers"), Some(bson!(["a"])));
        assert_eq!(fixture.store.writes(), 0);
    }

    #[tokio::test]
    async fn test_cache_follows_write_when_reply_fails() {
        // The first fetch validates the argument, the one for the reply fails.
        let resolver = FakeResolver { fetch_limit: Some(1), ..FakeResolver::discord() };
        let fixture = Fixture::with_resolver(Document::new(), resolver);
        fixture.cog.get_config(1).await.unwrap();

        let err = fixture.run(&["message", "42:100"]).await.unwrap_err();

        assert!(err.to_string().contains("gateway timeout"));
        assert_eq!(fixture.stored("message_id"), Some(bson!("42:100")));

        let reads = fixture.store.reads();
        let config = fixture.cog.get_config(1).await.unwrap();
        assert_eq!(
            config.raw("message"),
            Some(&Value::Message(MessageRef { channel_id: 42, message_id: 100 }))
        );
        assert_eq!(fixture.store.reads(), reads);
    }

    #[tokio::test]
    async fn test_remove_deleted_entity_by_id() {
        let fixture = Fixture::new(doc! { "cfg": { "mod_role_ids": [5_i64, 6_i64] } });

        fixture.run(&["mod_roles", "remove", "<@&6>"]).await.unwrap();
        assert_eq!(fixture.stored("mod_role_ids"), Some(bson!([5_i64])));

        // Unknown ids that were never stored are still rejected.
        let err = fixture.run(&["mod_roles", "remove", "<@&6>"]).await.unwrap_err();
        assert!(matches!(err.as_validation(), Some(ValidationError::BadArgument(_))));
        let err = fixture.run(&["mod_roles", "add", "<@&6>"]).await.unwrap_err();
        assert!(matches!(err.as_validation(), Some(ValidationError::BadArgument(_))));
        assert_eq!(fixture.stored("mod_role_ids"), Some(bson!([5_i64])));
    }

    #[tokio::test]
    async fn test_list_of_roles() {
        let fixture = Fixture::new(Document::new());

        fixture.run(&["mod_roles", "add", "<@&5>"]).await.unwrap();

        assert_eq!(fixture.stored("mod_role_ids"), Some(bson!([5_i64])));
        let err = fixture.run(&["mod_roles", "add", "<@&6>"]).await.unwrap_err();
        assert!(matches!(err.as_validation(), Some(ValidationError::BadArgument(_))));
    }

    #[tokio::test]
    async fn test_unknown_verb() {
        let fixture = Fixture::new(Document::new());

        let err = fixture.run(&["servers", "toggle", "x"]).await.unwrap_err();

        match err.as_validation() {
            Some(ValidationError::UnknownVerb { verb, allowed, .. }) => {
                assert_eq!(verb, "toggle");
                assert_eq!(*allowed, LIST_VERBS);
            }
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(fixture.store.writes(), 0);
    }

    #[tokio::test]
    async fn test_unknown_field() {
        let fixture = Fixture::new(Document::new());

        let err = fixture.run(&["bogus", "x"]).await.unwrap_err();

        assert_eq!(
            err.as_validation(),
            Some(&ValidationError::UnknownField("bogus".into()))
        );
        assert_eq!(fixture.store.writes(), 0);
    }

    #[tokio::test]
    async fn test_missing_and_bad_values() {
        let fixture = Fixture::new(Document::new());

        let missing = fixture.run(&["enabled"]).await.unwrap_err();
        assert!(matches!(missing.as_validation(), Some(ValidationError::MissingArgument(_))));

        let bad = fixture.run(&["limit", "lots"]).await.unwrap_err();
        assert!(matches!(bad.as_validation(), Some(ValidationError::BadArgument(_))));

        assert_eq!(fixture.store.writes(), 0);
    }

    #[tokio::test]
    async fn test_handle_turns_validation_into_reply() {
        let fixture = Fixture::new(Document::new());

        let reply = fixture.command().handle(1, &["bogus", "x"]).await.unwrap();

        assert!(reply.contains("`bogus` is not a valid config option"));
    }
}
