//! In-memory collaborators for unit tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use mongodb::bson::{Bson, Document};
use once_cell::sync::Lazy;
use parking_lot::Mutex;

use crate::database::DocumentStore;
use crate::error::Result;
use crate::platform::{Channel, EntityResolver, Guild, Message, Role, User};
use crate::schema::{CogConfig, FieldSpec, ScalarKind, Schema};

/// Document store with `$set` semantics on dotted paths, counting calls.
#[derive(Default)]
pub struct MemoryStore {
    documents: Mutex<HashMap<u64, Document>>,
    reads: AtomicUsize,
    writes: AtomicUsize,
}

impl MemoryStore {
    pub fn with_document(owner_id: u64, document: Document) -> Self {
        let store = Self::default();
        store.documents.lock().insert(owner_id, document);
        store
    }

    pub fn document(&self, owner_id: u64) -> Document {
        self.documents.lock().get(&owner_id).cloned().unwrap_or_default()
    }

    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

fn set_path(document: &mut Document, path: &str, value: Bson) {
    match path.split_once('.') {
        None => {
            document.insert(path, value);
        }
        Some((head, rest)) => {
            if !matches!(document.get(head), Some(Bson::Document(_))) {
                document.insert(head, Document::new());
            }
            if let Some(Bson::Document(child)) = document.get_mut(head) {
                set_path(child, rest, value);
            }
        }
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn get_document(&self, owner_id: u64) -> Result<Document> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        Ok(self.document(owner_id))
    }

    async fn merge_update(&self, owner_id: u64, partial: Document) -> Result<Document> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        let mut documents = self.documents.lock();
        let document = documents.entry(owner_id).or_insert_with(|| {
            let mut fresh = Document::new();
            fresh.insert("id", owner_id as i64);
            fresh
        });
        for (path, value) in partial {
            set_path(document, &path, value);
        }
        Ok(document.clone())
    }
}

/// Resolver over fixed sets of entities.
#[derive(Default)]
pub struct FakeResolver {
    pub guilds: Vec<Guild>,
    pub channels: Vec<Channel>,
    pub users: Vec<User>,
    pub roles: Vec<Role>,
    pub messages: Vec<Message>,
    pub fetches: AtomicUsize,
    /// Message fetches past this many fail.
    pub fetch_limit: Option<usize>,
}

impl FakeResolver {
    /// Guild 1 with channel 42, user 7, role 5 and message 42:100.
    pub fn discord() -> Self {
        Self {
            guilds: vec![Guild { id: 1, name: "penelope".into() }],
            channels: vec![Channel { id: 42, guild_id: Some(1), name: "general".into() }],
            users: vec![User { id: 7, name: "derw".into() }],
            roles: vec![Role { id: 5, guild_id: 1, name: "verified".into() }],
            messages: vec![Message {
                id: 100,
                channel_id: 42,
                guild_id: Some(1),
                content: "status".into(),
            }],
            fetches: AtomicUsize::new(0),
            fetch_limit: None,
        }
    }
}

#[async_trait]
impl EntityResolver for FakeResolver {
    fn guild(&self, guild_id: u64) -> Option<Guild> {
        self.guilds.iter().find(|g| g.id == guild_id).cloned()
    }

    fn channel(&self, channel_id: u64) -> Option<Channel> {
        self.channels.iter().find(|c| c.id == channel_id).cloned()
    }

    fn user(&self, user_id: u64) -> Option<User> {
        self.users.iter().find(|u| u.id == user_id).cloned()
    }

    fn role(&self, guild_id: u64, role_id: u64) -> Option<Role> {
        self.roles
            .iter()
            .find(|r| r.guild_id == guild_id && r.id == role_id)
            .cloned()
    }

    async fn fetch_message(
        &self,
        channel_id: u64,
        message_id: u64,
    ) -> anyhow::Result<Option<Message>> {
        let fetched = self.fetches.fetch_add(1, Ordering::SeqCst) + 1;
        if self.fetch_limit.is_some_and(|limit| fetched > limit) {
            anyhow::bail!("gateway timeout");
        }
        Ok(self
            .messages
            .iter()
            .find(|m| m.channel_id == channel_id && m.id == message_id)
            .cloned())
    }
}

static TEST_FIELDS: Lazy<Vec<FieldSpec>> = Lazy::new(|| {
    vec![
        FieldSpec::scalar("enabled", ScalarKind::Bool).with_default(false),
        FieldSpec::scalar("channel", ScalarKind::Channel),
        FieldSpec::scalar("message", ScalarKind::Message),
        FieldSpec::list("servers", ScalarKind::Str),
        FieldSpec::list("mod_roles", ScalarKind::Role),
        FieldSpec::scalar("motd", ScalarKind::Str),
        FieldSpec::scalar("limit", ScalarKind::Int).with_default(10_i64),
        FieldSpec::scalar("admin", ScalarKind::User),
        FieldSpec::list("log_channels", ScalarKind::Channel),
        FieldSpec::list("staff", ScalarKind::User),
    ]
});

/// Schema stored under `cfg`, enabled when `enabled` is set and `channel`
/// resolves.
pub struct TestSchema;

impl Schema for TestSchema {
    const NAME: &'static str = "cfg";
    const TITLE: &'static str = "TestConfig";

    fn fields() -> &'static [FieldSpec] {
        &TEST_FIELDS
    }

    fn check(config: &CogConfig<Self>) -> bool {
        config.flag("enabled") && config.channel("channel").is_some()
    }
}
