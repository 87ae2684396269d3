use std::collections::HashMap;

use serde::{Deserialize, Serialize};

macro_rules! id_type {
    ($(#[$attr:meta])* $name:ident) => {
        $(#[$attr])*
        #[derive(
            Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub u64);

        impl $name {
            pub fn get(self) -> u64 {
                self.0
            }
        }

        impl From<u64> for $name {
            fn from(value: u64) -> Self {
                Self(value)
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                self.0.fmt(f)
            }
        }
    };
}

id_type!(
    /// A user's snowflake identifier
    UserId
);
id_type!(
    /// A guild's snowflake identifier
    GuildId
);
id_type!(
    /// A channel's snowflake identifier
    ChannelId
);
id_type!(
    /// A message's snowflake identifier
    MessageId
);

/// Discriminant carried on every inbound interaction notification. Only
/// `Command` interactions are routed; the other kinds are carried so the
/// dispatcher can recognize and skip them.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InteractionKind {
    Command,
    Component,
    Modal,
}

/// One inbound user-triggered invocation as delivered by the gateway
/// collaborator.
#[derive(Clone, Debug)]
pub struct Interaction {
    pub kind: InteractionKind,
    /// The name of the command that was invoked
    pub command: String,
    /// The user who invoked the command
    pub user: UserId,
    /// The channel where the command was invoked
    pub channel: ChannelId,
    /// The guild where the command was invoked (None for DMs)
    pub guild: Option<GuildId>,
    /// The options passed to the command (name -> value)
    pub options: HashMap<String, OptionValue>,
}

impl Interaction {
    pub fn option(&self, name: &str) -> Option<&OptionValue> {
        self.options.get(name)
    }
}

/// A command option value
#[derive(Clone, Debug, PartialEq)]
pub enum OptionValue {
    String(String),
    Integer(i64),
    Number(f64),
    Boolean(bool),
}

impl OptionValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            OptionValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            OptionValue::Integer(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            OptionValue::Number(n) => Some(*n),
            OptionValue::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            OptionValue::Boolean(b) => Some(*b),
            _ => None,
        }
    }
}
