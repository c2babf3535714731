//! Field descriptors: what a config field holds and where it is stored.

use std::fmt;

use mongodb::bson::Bson;

/// Element type of a config field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarKind {
    Bool,
    Str,
    Int,
    Channel,
    User,
    Role,
    Message,
}

impl ScalarKind {
    /// Whether the stored value is a snowflake reference to a platform entity.
    pub fn is_reference(self) -> bool {
        !matches!(self, Self::Bool | Self::Str | Self::Int)
    }

    pub fn describe(self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::Str => "str",
            Self::Int => "int",
            Self::Channel => "TextChannel",
            Self::User => "User",
            Self::Role => "Role",
            Self::Message => "Message",
        }
    }
}

impl fmt::Display for ScalarKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.describe())
    }
}

/// Declared type of a config field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Scalar(ScalarKind),
    List(ScalarKind),
}

impl FieldKind {
    pub fn element(self) -> ScalarKind {
        match self {
            Self::Scalar(kind) | Self::List(kind) => kind,
        }
    }

    pub fn is_list(self) -> bool {
        matches!(self, Self::List(_))
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scalar(kind) => write!(f, "{kind}"),
            Self::List(kind) => write!(f, "List[{kind}]"),
        }
    }
}

/// One declared field of a schema.
#[derive(Debug, Clone)]
pub struct FieldSpec {
    pub name: &'static str,
    pub kind: FieldKind,
    pub default: Option<Bson>,
    storage_key: String,
}

impl FieldSpec {
    pub fn new(name: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            kind,
            default: None,
            storage_key: storage_key(name, kind),
        }
    }

    pub fn scalar(name: &'static str, kind: ScalarKind) -> Self {
        Self::new(name, FieldKind::Scalar(kind))
    }

    pub fn list(name: &'static str, kind: ScalarKind) -> Self {
        Self::new(name, FieldKind::List(kind))
    }

    /// Declared default used when the document has no value.
    #[must_use]
    pub fn with_default(mut self, value: impl Into<Bson>) -> Self {
        self.default = Some(value.into());
        self
    }

    /// Key of this field inside the schema's namespace sub-document.
    pub fn storage_key(&self) -> &str {
        &self.storage_key
    }

    /// Value used when the document holds nothing for this field.
    pub fn fallback(&self) -> Bson {
        match (&self.default, self.kind) {
            (Some(value), _) => value.clone(),
            (None, FieldKind::List(_)) => Bson::Array(Vec::new()),
            (None, FieldKind::Scalar(_)) => Bson::Null,
        }
    }
}

/// `channel` -> `channel_id`, `mod_roles` -> `mod_role_ids`; primitives keep
/// their name.
fn storage_key(name: &str, kind: FieldKind) -> String {
    match kind {
        FieldKind::Scalar(element) if element.is_reference() => format!("{name}_id"),
        FieldKind::List(element) if element.is_reference() => {
            format!("{}_ids", name.strip_suffix('s').unwrap_or(name))
        }
        _ => name.to_string(),
    }
}
