//! Declarative command/event registration and dispatch for chat bots.
//!
//! Handler types attach their registration metadata (identity, guards,
//! cooldowns, parameters) to a [`MetadataStore`] through composable
//! attach calls, bind into instances that snapshot that metadata, and
//! collect into a [`ModuleRegistry`] whose [`Dispatcher`] routes
//! inbound gateway interactions through guard evaluation into the
//! handlers, containing every failure at that boundary. The gateway
//! itself is only ever reached through the traits in [`gateway`].

pub mod command;
pub mod config;
pub mod context;
pub mod cooldown;
pub mod dispatch;
pub mod error;
pub mod event;
pub mod gateway;
pub mod interaction;
pub mod metadata;
pub mod module;
#[cfg(test)]
pub(crate) mod test_support;

pub use command::{Command, CommandInstance};
pub use config::Configuration;
pub use context::InvocationContext;
pub use cooldown::CooldownTracker;
pub use dispatch::{Dispatcher, InboundNotification};
pub use error::DefinitionError;
pub use event::{Event, EventInstance, GatewayEvent, MessageNotification};
pub use gateway::{CommandDeclaration, Gateway, Responder};
pub use interaction::{
    ChannelId, GuildId, Interaction, InteractionKind, MessageId, OptionValue, UserId,
};
pub use metadata::{
    CommandMetadata, CommandOption, CommandOptionKind, ContextFlags, EventKind, EventMetadata,
    GuardOptions, MetadataStore,
};
pub use module::ModuleRegistry;
