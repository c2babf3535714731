//! Stored and resolved config values.

use std::fmt;

use mongodb::bson::Bson;

use super::field::{FieldKind, ScalarKind};
use crate::error::ValidationError;
use crate::platform::{Channel, Message, MessageRef, Role, User};

/// A field value in its stored shape: primitives as-is, entities by id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Bool(bool),
    Str(String),
    Int(i64),
    Channel(u64),
    User(u64),
    Role(u64),
    Message(MessageRef),
    List(Vec<Value>),
}

impl Value {
    /// Decode one stored element of the given kind.
    ///
    /// Snowflakes are accepted as any BSON integer or a numeric string, so
    /// documents written by other tools still load.
    pub fn from_bson(kind: ScalarKind, bson: &Bson) -> Option<Self> {
        match kind {
            ScalarKind::Bool => bson.as_bool().map(Self::Bool),
            ScalarKind::Str => bson.as_str().map(|s| Self::Str(s.to_string())),
            ScalarKind::Int => integer(bson).map(Self::Int),
            ScalarKind::Channel => snowflake(bson).map(Self::Channel),
            ScalarKind::User => snowflake(bson).map(Self::User),
            ScalarKind::Role => snowflake(bson).map(Self::Role),
            ScalarKind::Message => bson
                .as_str()
                .and_then(|s| s.parse().ok())
                .map(Self::Message),
        }
    }

    /// Decode a stored field. `None` for null or undecodable data; list
    /// elements that don't decode are skipped.
    pub fn from_field(kind: FieldKind, bson: &Bson) -> Option<Self> {
        match (kind, bson) {
            (_, Bson::Null) => None,
            (FieldKind::Scalar(element), bson) => Self::from_bson(element, bson),
            (FieldKind::List(element), Bson::Array(items)) => Some(Self::List(
                items
                    .iter()
                    .filter_map(|item| Self::from_bson(element, item))
                    .collect(),
            )),
            (FieldKind::List(_), _) => None,
        }
    }

    /// Encode into the stored shape. Ids are stored as `i64`, so an id past
    /// `i64::MAX` is rejected.
    pub fn to_bson(&self) -> Result<Bson, ValidationError> {
        Ok(match self {
            Self::Bool(b) => Bson::Boolean(*b),
            Self::Str(s) => Bson::String(s.clone()),
            Self::Int(i) => Bson::Int64(*i),
            Self::Channel(id) | Self::User(id) | Self::Role(id) => i64::try_from(*id)
                .map(Bson::Int64)
                .map_err(|_| ValidationError::BadArgument(format!("`{id}` is not a valid id")))?,
            Self::Message(reference) => Bson::String(reference.to_string()),
            Self::List(items) => Bson::Array(items.iter().map(Value::to_bson).collect::<Result<_, _>>()?),
        })
    }

    /// Whether this value can be stored in a field of `kind`.
    pub fn fits(&self, kind: FieldKind) -> bool {
        match (self, kind) {
            (Self::List(items), FieldKind::List(element)) => {
                items.iter().all(|item| item.fits(FieldKind::Scalar(element)))
            }
            (Self::List(_), FieldKind::Scalar(_)) | (_, FieldKind::List(_)) => false,
            (value, FieldKind::Scalar(element)) => value.kind() == Some(element),
        }
    }

    fn kind(&self) -> Option<ScalarKind> {
        Some(match self {
            Self::Bool(_) => ScalarKind::Bool,
            Self::Str(_) => ScalarKind::Str,
            Self::Int(_) => ScalarKind::Int,
            Self::Channel(_) => ScalarKind::Channel,
            Self::User(_) => ScalarKind::User,
            Self::Role(_) => ScalarKind::Role,
            Self::Message(_) => ScalarKind::Message,
            Self::List(_) => return None,
        })
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{b}"),
            Self::Str(s) => write!(f, "{s:?}"),
            Self::Int(i) => write!(f, "{i}"),
            Self::Channel(id) | Self::User(id) | Self::Role(id) => write!(f, "{id}"),
            Self::Message(reference) => write!(f, "{reference}"),
            Self::List(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
        }
    }
}

fn integer(bson: &Bson) -> Option<i64> {
    match bson {
        Bson::Int32(i) => Some(i64::from(*i)),
        Bson::Int64(i) => Some(*i),
        Bson::Double(d) if d.fract() == 0.0 => Some(*d as i64),
        _ => None,
    }
}

fn snowflake(bson: &Bson) -> Option<u64> {
    match bson {
        Bson::String(s) => s.trim().parse().ok(),
        other => integer(other).and_then(|i| u64::try_from(i).ok()),
    }
}

/// A field value after resolution against the platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolved {
    /// Primitive field with no stored value and no default.
    Unset,
    Bool(bool),
    Str(String),
    Int(i64),
    Channel(Option<Channel>),
    User(Option<User>),
    Role(Option<Role>),
    Message(Option<Message>),
    List(Vec<Resolved>),
}

impl Resolved {
    /// `true` when nothing usable is behind the field.
    pub fn is_none(&self) -> bool {
        matches!(
            self,
            Self::Unset | Self::Channel(None) | Self::User(None) | Self::Role(None) | Self::Message(None)
        )
    }
}

/// Human rendering: mentions for entities, links for messages, bullets for
/// lists.
impl fmt::Display for Resolved {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unset
            | Self::Channel(None)
            | Self::User(None)
            | Self::Role(None)
            | Self::Message(None) => f.write_str("None"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Str(s) => f.write_str(s),
            Self::Int(i) => write!(f, "{i}"),
            Self::Channel(Some(channel)) => f.write_str(&channel.mention()),
            Self::User(Some(user)) => f.write_str(&user.mention()),
            Self::Role(Some(role)) => f.write_str(&role.mention()),
            Self::Message(Some(message)) => f.write_str(&message.link()),
            Self::List(items) if items.is_empty() => f.write_str("[]"),
            Self::List(items) => {
                for item in items {
                    write!(f, "\n• {item}")?;
                }
                Ok(())
            }
        }
    }
}
