use async_trait::async_trait;
use tracing::warn;

use crate::{
    context::InvocationContext,
    cooldown::CooldownTracker,
    error::DefinitionError,
    gateway::CommandDeclaration,
    metadata::{CommandMetadata, MetadataStore},
};

/// A command implementation. Implementors hold whatever state they
/// need; registration metadata lives in the [`MetadataStore`], not on
/// the type.
#[async_trait]
pub trait Command: Send + Sync {
    /// Runs the command. Failures are contained at the dispatch
    /// boundary, logged, and turned into one generic user-facing
    /// notice; do not retry here.
    async fn execute(&self, ctx: &InvocationContext) -> anyhow::Result<()>;
}

/// A command handler bound to its registered metadata.
///
/// Binding snapshots the merged metadata record; the snapshot is
/// immutable for the life of the instance. Binding a type that never
/// attached metadata fails, so a missing registration aborts startup
/// instead of surfacing on first invocation.
pub struct CommandInstance {
    metadata: CommandMetadata,
    cooldowns: CooldownTracker,
    handler: Box<dyn Command>,
}

impl CommandInstance {
    pub fn bind<T>(handler: T, store: &MetadataStore) -> Result<Self, DefinitionError>
    where
        T: Command + 'static,
    {
        let metadata =
            store
                .command_metadata::<T>()
                .ok_or(DefinitionError::MissingCommandMetadata {
                    type_name: std::any::type_name::<T>(),
                })?;
        let cooldowns = CooldownTracker::new(metadata.cooldown);

        Ok(Self {
            metadata,
            cooldowns,
            handler: Box::new(handler),
        })
    }

    pub fn name(&self) -> &str {
        &self.metadata.name
    }

    pub fn metadata(&self) -> &CommandMetadata {
        &self.metadata
    }

    /// This command's entry in the bulk gateway declaration.
    pub fn declaration(&self) -> CommandDeclaration {
        CommandDeclaration {
            name: self.metadata.name.clone(),
            description: self.metadata.description.clone(),
            options: self.metadata.options.clone(),
            permissions: self.metadata.guards.permissions.clone(),
            nsfw: self.metadata.guards.nsfw,
            contexts: self.metadata.contexts,
        }
    }

    /// Evaluates the guard chain. The first failing guard wins: its
    /// denial reply is sent to the invoker and `false` comes back
    /// without evaluating anything further. `true` means the handler
    /// may run; a cooldown-gated command has its window armed as a side
    /// effect.
    pub async fn can_execute(&self, ctx: &InvocationContext) -> bool {
        let guards = &self.metadata.guards;

        if guards.owner_only && ctx.owner() != Some(ctx.user()) {
            self.deny(ctx, "Only the bot owner can use this command.")
                .await;
            return false;
        }

        if guards.guild_only && ctx.guild().is_none() {
            self.deny(ctx, "This command can only be used in a server.")
                .await;
            return false;
        }

        if guards.dm_only && ctx.guild().is_some() {
            self.deny(ctx, "This command can only be used in a DM.")
                .await;
            return false;
        }

        if let Some(remaining) = self.cooldowns.try_acquire(ctx.user()) {
            let seconds = remaining.as_millis().div_ceil(1000);
            self.deny(
                ctx,
                &format!(
                    "Please wait {seconds}s before using /{} again.",
                    self.metadata.name
                ),
            )
            .await;
            return false;
        }

        true
    }

    pub async fn execute(&self, ctx: &InvocationContext) -> anyhow::Result<()> {
        self.handler.execute(ctx).await
    }

    // The invocation is denied whether or not the reply arrives, so a
    // failed send is logged and dropped.
    async fn deny(&self, ctx: &InvocationContext, text: &str) {
        if let Err(err) = ctx.reply_private(text).await {
            warn!(
                command = %self.metadata.name,
                user = %ctx.user(),
                %err,
                "failed to deliver denial reply"
            );
        }
    }
}
