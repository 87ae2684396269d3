use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;

use crate::{
    error::DefinitionError,
    interaction::{ChannelId, GuildId, Interaction, MessageId, UserId},
    metadata::{EventKind, EventMetadata, MetadataStore},
};

/// One notification from the gateway's event stream, with the payload
/// for its kind.
#[derive(Clone, Debug)]
pub enum GatewayEvent {
    /// The gateway session is up; commands may be declared
    Ready { user_name: String },
    InteractionCreate(Interaction),
    MessageCreate(MessageNotification),
    MessageDelete {
        channel: ChannelId,
        message: MessageId,
    },
    GuildMemberAdd {
        guild: GuildId,
        user: UserId,
    },
    GuildMemberRemove {
        guild: GuildId,
        user: UserId,
    },
}

impl GatewayEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            GatewayEvent::Ready { .. } => EventKind::Ready,
            GatewayEvent::InteractionCreate(_) => EventKind::InteractionCreate,
            GatewayEvent::MessageCreate(_) => EventKind::MessageCreate,
            GatewayEvent::MessageDelete { .. } => EventKind::MessageDelete,
            GatewayEvent::GuildMemberAdd { .. } => EventKind::GuildMemberAdd,
            GatewayEvent::GuildMemberRemove { .. } => EventKind::GuildMemberRemove,
        }
    }
}

/// A message as carried in a `MessageCreate` event.
#[derive(Clone, Debug)]
pub struct MessageNotification {
    pub id: MessageId,
    pub channel: ChannelId,
    /// The guild the message was sent in (None for DMs)
    pub guild: Option<GuildId>,
    pub author: UserId,
    /// Whether the author is a bot
    pub author_is_bot: bool,
    pub content: String,
}

/// An event listener. Like commands, the registration metadata lives in
/// the [`MetadataStore`].
#[async_trait]
pub trait Event: Send + Sync {
    async fn execute(&self, event: &GatewayEvent) -> anyhow::Result<()>;
}

/// An event listener bound to its registered metadata. Stateless apart
/// from the `once` latch.
pub struct EventInstance {
    metadata: EventMetadata,
    fired: AtomicBool,
    handler: Box<dyn Event>,
}

impl EventInstance {
    pub fn bind<T>(handler: T, store: &MetadataStore) -> Result<Self, DefinitionError>
    where
        T: Event + 'static,
    {
        let metadata = store
            .event_metadata::<T>()
            .ok_or(DefinitionError::MissingEventMetadata {
                type_name: std::any::type_name::<T>(),
            })?;

        Ok(Self {
            metadata,
            fired: AtomicBool::new(false),
            handler: Box::new(handler),
        })
    }

    pub fn kind(&self) -> EventKind {
        self.metadata.kind
    }

    pub fn metadata(&self) -> &EventMetadata {
        &self.metadata
    }

    /// Runs the handler if this instance listens for the event's kind.
    /// `once` instances latch on their first run and ignore everything
    /// after.
    pub(crate) async fn handle(&self, event: &GatewayEvent) -> anyhow::Result<()> {
        if self.metadata.kind != event.kind() {
            return Ok(());
        }
        if self.metadata.once && self.fired.swap(true, Ordering::AcqRel) {
            return Ok(());
        }
        self.handler.execute(event).await
    }
}
