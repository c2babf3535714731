//! Document-backed config instances.

use std::collections::HashMap;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use mongodb::bson::{Bson, Document};
use tracing::{debug, warn};

use super::{FieldSpec, Resolved, ScalarKind, Schema, Value};
use crate::database::DocumentStore;
use crate::error::{Result, ValidationError};
use crate::platform::{Channel, EntityResolver, Guild, Message, Role, User};

/// One guild's configuration for schema `S`.
///
/// Holds only stored values (primitives and snowflakes). Entity fields are
/// resolved on every access and never cached here. Instances are immutable:
/// [`CogConfig::update_config`] returns a fresh instance built from the
/// document the store returned.
pub struct CogConfig<S: Schema> {
    owner_id: u64,
    slots: HashMap<&'static str, Value>,
    store: Arc<dyn DocumentStore>,
    resolver: Arc<dyn EntityResolver>,
    _schema: PhantomData<fn() -> S>,
}

impl<S: Schema> CogConfig<S> {
    /// Load the config for `owner_id` from the store.
    pub async fn from_db(
        owner_id: u64,
        store: Arc<dyn DocumentStore>,
        resolver: Arc<dyn EntityResolver>,
    ) -> Result<Self> {
        let document = store.get_document(owner_id).await?;
        let config = Self::from_document(owner_id, &document, store, resolver);
        debug!("{} - Loaded guild {} config from db", S::TITLE, owner_id);
        Ok(config)
    }

    fn from_document(
        owner_id: u64,
        document: &Document,
        store: Arc<dyn DocumentStore>,
        resolver: Arc<dyn EntityResolver>,
    ) -> Self {
        Self {
            owner_id,
            slots: Self::populate(document),
            store,
            resolver,
            _schema: PhantomData,
        }
    }

    /// Read every declared field's storage slot from the schema namespace,
    /// falling back to the declared default, `[]` for lists, or nothing.
    fn populate(document: &Document) -> HashMap<&'static str, Value> {
        let namespace = document.get_document(S::NAME).ok();
        let mut slots = HashMap::with_capacity(S::fields().len());

        for spec in S::fields() {
            let stored = namespace
                .and_then(|ns| ns.get(spec.storage_key()))
                .filter(|bson| !matches!(bson, Bson::Null));

            let value = match stored {
                Some(bson) => Value::from_field(spec.kind, bson).or_else(|| {
                    warn!(
                        "{} - Ignoring undecodable {}.{}: {}",
                        S::TITLE,
                        S::NAME,
                        spec.storage_key(),
                        bson
                    );
                    Value::from_field(spec.kind, &spec.fallback())
                }),
                None => Value::from_field(spec.kind, &spec.fallback()),
            };

            if let Some(value) = value {
                slots.insert(spec.name, value);
            }
        }

        slots
    }

    pub fn owner_id(&self) -> u64 {
        self.owner_id
    }

    /// The guild this config belongs to.
    pub fn guild(&self) -> Option<Guild> {
        self.resolver.guild(self.owner_id)
    }

    pub fn check(&self) -> bool {
        S::check(self)
    }

    /// Declared field by name.
    pub fn spec(&self, name: &str) -> Result<&'static FieldSpec, ValidationError> {
        S::field(name).ok_or_else(|| ValidationError::UnknownField(name.to_string()))
    }

    /// Stored value of a field, before resolution.
    pub fn raw(&self, name: &str) -> Option<&Value> {
        self.slots.get(name)
    }

    pub fn is_set(&self, name: &str) -> bool {
        self.slots.contains_key(name)
    }

    /// Resolve a declared field against the platform.
    pub async fn resolve(&self, name: &str) -> Result<Resolved> {
        let spec = self.spec(name)?;
        let stored = self.raw(name);

        if !spec.kind.is_list() {
            return self.resolve_element(spec.kind.element(), stored).await;
        }

        let mut resolved = Vec::new();
        if let Some(Value::List(items)) = stored {
            for item in items {
                let element = self.resolve_element(spec.kind.element(), Some(item)).await?;
                if !element.is_none() {
                    resolved.push(element);
                }
            }
        }
        Ok(Resolved::List(resolved))
    }

    async fn resolve_element(&self, kind: ScalarKind, stored: Option<&Value>) -> Result<Resolved> {
        Ok(match (kind, stored) {
            (_, Some(Value::Bool(b))) => Resolved::Bool(*b),
            (_, Some(Value::Str(s))) => Resolved::Str(s.clone()),
            (_, Some(Value::Int(i))) => Resolved::Int(*i),
            (_, Some(Value::Channel(id))) => Resolved::Channel(self.resolver.channel(*id)),
            (_, Some(Value::User(id))) => Resolved::User(self.resolver.user(*id)),
            (_, Some(Value::Role(id))) => Resolved::Role(self.resolver.role(self.owner_id, *id)),
            (_, Some(Value::Message(reference))) => Resolved::Message(
                self.resolver
                    .fetch_message(reference.channel_id, reference.message_id)
                    .await?,
            ),
            (ScalarKind::Channel, _) => Resolved::Channel(None),
            (ScalarKind::User, _) => Resolved::User(None),
            (ScalarKind::Role, _) => Resolved::Role(None),
            (ScalarKind::Message, _) => Resolved::Message(None),
            _ => Resolved::Unset,
        })
    }

    pub fn flag(&self, name: &str) -> bool {
        matches!(self.raw(name), Some(Value::Bool(true)))
    }

    pub fn text(&self, name: &str) -> Option<&str> {
        match self.raw(name) {
            Some(Value::Str(s)) => Some(s),
            _ => None,
        }
    }

    pub fn integer(&self, name: &str) -> Option<i64> {
        match self.raw(name) {
            Some(Value::Int(i)) => Some(*i),
            _ => None,
        }
    }

    pub fn channel(&self, name: &str) -> Option<Channel> {
        match self.raw(name) {
            Some(Value::Channel(id)) => self.resolver.channel(*id),
            _ => None,
        }
    }

    pub fn user(&self, name: &str) -> Option<User> {
        match self.raw(name) {
            Some(Value::User(id)) => self.resolver.user(*id),
            _ => None,
        }
    }

    pub fn role(&self, name: &str) -> Option<Role> {
        match self.raw(name) {
            Some(Value::Role(id)) => self.resolver.role(self.owner_id, *id),
            _ => None,
        }
    }

    /// Fetch the message behind a message field. Needs a network round trip.
    pub async fn message(&self, name: &str) -> Result<Option<Message>> {
        match self.raw(name) {
            Some(Value::Message(reference)) => Ok(self
                .resolver
                .fetch_message(reference.channel_id, reference.message_id)
                .await?),
            _ => Ok(None),
        }
    }

    fn items(&self, name: &str) -> &[Value] {
        match self.raw(name) {
            Some(Value::List(items)) => items,
            _ => &[],
        }
    }

    pub fn strings(&self, name: &str) -> Vec<&str> {
        self.items(name)
            .iter()
            .filter_map(|item| match item {
                Value::Str(s) => Some(s.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn channels(&self, name: &str) -> Vec<Channel> {
        self.items(name)
            .iter()
            .filter_map(|item| match item {
                Value::Channel(id) => self.resolver.channel(*id),
                _ => None,
            })
            .collect()
    }

    pub fn users(&self, name: &str) -> Vec<User> {
        self.items(name)
            .iter()
            .filter_map(|item| match item {
                Value::User(id) => self.resolver.user(*id),
                _ => None,
            })
            .collect()
    }

    pub fn roles(&self, name: &str) -> Vec<Role> {
        self.items(name)
            .iter()
            .filter_map(|item| match item {
                Value::Role(id) => self.resolver.role(self.owner_id, *id),
                _ => None,
            })
            .collect()
    }

    /// Persist `value` into `field` as a merge on `<namespace>.<storage key>`
    /// and return the config rebuilt from the document the store returned.
    pub async fn update_config(&self, field: &str, value: Value) -> Result<Self> {
        let spec = self.spec(field)?;
        if !value.fits(spec.kind) {
            return Err(ValidationError::BadArgument(format!(
                "`{value}` is not a valid {} for `{field}`",
                spec.kind
            ))
            .into());
        }

        let mut partial = Document::new();
        partial.insert(format!("{}.{}", S::NAME, spec.storage_key()), value.to_bson()?);

        let document = self.store.merge_update(self.owner_id, partial).await?;
        debug!("{} - Set {} = {} for guild {}", S::TITLE, field, value, self.owner_id);

        Ok(Self::from_document(
            self.owner_id,
            &document,
            Arc::clone(&self.store),
            Arc::clone(&self.resolver),
        ))
    }
}

impl<S: Schema> fmt::Debug for CogConfig<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}", S::TITLE)?;
        for spec in S::fields() {
            match self.raw(spec.name) {
                Some(value) => write!(f, " {}={}", spec.name, value)?,
                None => write!(f, " {}=None", spec.name)?,
            }
        }
        f.write_str(">")
    }
}
