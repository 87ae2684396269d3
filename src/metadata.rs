use std::{any::TypeId, collections::HashMap, time::Duration};

use crate::error::DefinitionError;

/// One parameter descriptor of a command, carried verbatim into the
/// command's gateway declaration.
#[derive(Clone, Debug, PartialEq)]
pub struct CommandOption {
    pub name: String,
    pub description: String,
    pub kind: CommandOptionKind,
    pub required: bool,
    pub min_value: Option<f64>,
    pub max_value: Option<f64>,
    pub min_length: Option<u16>,
    pub max_length: Option<u16>,
    /// (name, value) for string choices
    pub choices: Vec<(String, String)>,
}

impl CommandOption {
    pub fn new(name: &str, description: &str, kind: CommandOptionKind) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            kind,
            required: false,
            min_value: None,
            max_value: None,
            min_length: None,
            max_length: None,
            choices: Vec::new(),
        }
    }

    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CommandOptionKind {
    String,
    Integer,
    Number,
    Boolean,
    User,
    Channel,
    Role,
    Attachment,
}

/// Guard settings accumulated across attach calls before a command is
/// bound. Boolean flags combine by logical OR, so independent call
/// sites may set them in any order; permission lists concatenate in
/// call order and keep duplicates.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GuardOptions {
    pub owner_only: bool,
    pub guild_only: bool,
    pub dm_only: bool,
    pub nsfw: bool,
    /// Required-capability names, in the order they were attached. The
    /// platform derives its permission mask from these; this crate only
    /// carries them.
    pub permissions: Vec<String>,
}

impl GuardOptions {
    fn merge_from(&mut self, other: GuardOptions) {
        self.owner_only |= other.owner_only;
        self.guild_only |= other.guild_only;
        self.dm_only |= other.dm_only;
        self.nsfw |= other.nsfw;
        self.permissions.extend(other.permissions);
    }

    /// The permission list with duplicates removed, first occurrence
    /// winning. Only for user-facing display; declarations carry the
    /// raw list.
    pub fn display_permissions(&self) -> Vec<&str> {
        let mut seen = Vec::new();
        for permission in &self.permissions {
            if !seen.contains(&permission.as_str()) {
                seen.push(permission.as_str());
            }
        }
        seen
    }
}

/// Where a command can be invoked and how the application carrying it
/// can be installed. Enforced by the platform, carried by this crate.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ContextFlags {
    pub guild: bool,
    pub bot_dm: bool,
    pub private_channel: bool,
    pub user_install: bool,
}

impl Default for ContextFlags {
    fn default() -> Self {
        Self {
            guild: true,
            bot_dm: true,
            private_channel: true,
            user_install: false,
        }
    }
}

/// The fully merged registration record for one command handler type.
#[derive(Clone, Debug)]
pub struct CommandMetadata {
    pub name: String,
    pub description: String,
    pub options: Vec<CommandOption>,
    pub guards: GuardOptions,
    /// Per-user minimum interval between allowed invocations. Zero
    /// disables the cooldown.
    pub cooldown: Duration,
    pub contexts: ContextFlags,
}

/// The gateway's event taxonomy. Event handlers bind to exactly one of
/// these kinds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EventKind {
    Ready,
    InteractionCreate,
    MessageCreate,
    MessageDelete,
    GuildMemberAdd,
    GuildMemberRemove,
}

#[derive(Clone, Debug)]
pub struct EventMetadata {
    pub kind: EventKind,
    /// Run the handler at most once, on the first matching event
    pub once: bool,
}

#[derive(Default)]
struct PendingCommand {
    identity: Option<(String, String)>,
    options: Vec<CommandOption>,
    guards: GuardOptions,
    cooldown: Option<Duration>,
    contexts: Option<ContextFlags>,
}

/// Side table associating handler types with their accumulated
/// registration metadata. Attach calls are made once at startup, before
/// any instance is bound; binding reads the merged record and snapshots
/// it.
///
/// Merge-vs-overwrite is a per-call contract: identity, cooldown,
/// contexts, and event bindings overwrite (the last call wins), guards
/// merge, options append.
#[derive(Default)]
pub struct MetadataStore {
    commands: HashMap<TypeId, PendingCommand>,
    events: HashMap<TypeId, EventMetadata>,
}

impl MetadataStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a command's name and description, overwriting any earlier
    /// call for the same type. Both are validated eagerly so a broken
    /// definition fails at startup, not on first invocation.
    pub fn attach_command<T: 'static>(
        &mut self,
        name: &str,
        description: &str,
    ) -> Result<(), DefinitionError> {
        validate_name(name)?;
        validate_description(name, description)?;
        self.pending::<T>().identity = Some((name.to_string(), description.to_string()));
        Ok(())
    }

    /// Appends one parameter descriptor. Order across calls is the
    /// order the platform shows the parameters in.
    pub fn attach_option<T: 'static>(&mut self, option: CommandOption) -> Result<(), DefinitionError> {
        validate_name(&option.name)?;
        validate_description(&option.name, &option.description)?;
        self.pending::<T>().options.push(option);
        Ok(())
    }

    /// Merges guard settings into the type's record: boolean flags are
    /// OR'd, permission lists are concatenated in call order.
    pub fn attach_guard<T: 'static>(&mut self, guards: GuardOptions) {
        self.pending::<T>().guards.merge_from(guards);
    }

    /// Sets the per-user cooldown window. Overwrites: a command has one
    /// cooldown, not an accumulated set.
    pub fn attach_cooldown<T: 'static>(&mut self, window: Duration) {
        self.pending::<T>().cooldown = Some(window);
    }

    /// Sets the installability/context flags. Overwrites.
    pub fn attach_contexts<T: 'static>(&mut self, contexts: ContextFlags) {
        self.pending::<T>().contexts = Some(contexts);
    }

    /// Binds an event handler type to a gateway event. Overwrites.
    pub fn attach_event<T: 'static>(&mut self, kind: EventKind, once: bool) {
        self.events.insert(TypeId::of::<T>(), EventMetadata { kind, once });
    }

    /// The fully merged record for `T`, or `None` if `attach_command`
    /// was never called for it.
    pub fn command_metadata<T: 'static>(&self) -> Option<CommandMetadata> {
        let pending = self.commands.get(&TypeId::of::<T>())?;
        let (name, description) = pending.identity.clone()?;
        Some(CommandMetadata {
            name,
            description,
            options: pending.options.clone(),
            guards: pending.guards.clone(),
            cooldown: pending.cooldown.unwrap_or(Duration::ZERO),
            contexts: pending.contexts.unwrap_or_default(),
        })
    }

    pub fn event_metadata<T: 'static>(&self) -> Option<EventMetadata> {
        self.events.get(&TypeId::of::<T>()).cloned()
    }

    fn pending<T: 'static>(&mut self) -> &mut PendingCommand {
        self.commands.entry(TypeId::of::<T>()).or_default()
    }
}

fn validate_name(name: &str) -> Result<(), DefinitionError> {
    if name.is_empty() || name.len() > 32 {
        return Err(DefinitionError::InvalidName {
            name: name.to_string(),
            reason: "must be 1-32 characters",
        });
    }
    if !name
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '_')
    {
        return Err(DefinitionError::InvalidName {
            name: name.to_string(),
            reason: "must be a lowercase token ([a-z0-9_-])",
        });
    }
    Ok(())
}

fn validate_description(name: &str, description: &str) -> Result<(), DefinitionError> {
    if description.is_empty() || description.chars().count() > 100 {
        return Err(DefinitionError::InvalidDescription {
            name: name.to_string(),
            reason: "must be 1-100 characters",
        });
    }
    Ok(())
}
