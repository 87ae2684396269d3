use std::{
    collections::HashMap,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
};

use crate::{
    gateway::Responder,
    interaction::{ChannelId, GuildId, Interaction, OptionValue, UserId},
};

/// Everything a command handler gets for one invocation: the inbound
/// payload, the reply channel back to the invoker, and the configured
/// owner identity for the owner-only guard.
///
/// The context tracks whether a reply has been created so that the
/// failure path can decide between editing the pending reply and
/// sending a fresh one.
pub struct InvocationContext {
    interaction: Interaction,
    responder: Arc<dyn Responder>,
    owner: Option<UserId>,
    replied: AtomicBool,
}

impl InvocationContext {
    pub fn new(
        interaction: Interaction,
        responder: Arc<dyn Responder>,
        owner: Option<UserId>,
    ) -> Self {
        Self {
            interaction,
            responder,
            owner,
            replied: AtomicBool::new(false),
        }
    }

    pub fn command(&self) -> &str {
        &self.interaction.command
    }

    pub fn user(&self) -> UserId {
        self.interaction.user
    }

    pub fn channel(&self) -> ChannelId {
        self.interaction.channel
    }

    /// The guild the command was invoked in; `None` in DMs.
    pub fn guild(&self) -> Option<GuildId> {
        self.interaction.guild
    }

    pub fn owner(&self) -> Option<UserId> {
        self.owner
    }

    pub fn option(&self, name: &str) -> Option<&OptionValue> {
        self.interaction.option(name)
    }

    pub fn options(&self) -> &HashMap<String, OptionValue> {
        &self.interaction.options
    }

    /// Sends the interaction's reply, visible to everyone.
    pub async fn reply(&self, text: &str) -> anyhow::Result<()> {
        self.send(text, false).await
    }

    /// Sends a reply only the invoker can see.
    pub async fn reply_private(&self, text: &str) -> anyhow::Result<()> {
        self.send(text, true).await
    }

    /// Edits the pending reply in place.
    pub async fn edit_reply(&self, text: &str) -> anyhow::Result<()> {
        self.responder.edit(text).await
    }

    /// Edits the pending reply if this invocation already created one,
    /// otherwise sends a new reply.
    pub async fn create_or_edit(&self, text: &str, ephemeral: bool) -> anyhow::Result<()> {
        if self.has_replied() {
            self.edit_reply(text).await
        } else {
            self.send(text, ephemeral).await
        }
    }

    /// Whether this invocation has successfully created its reply.
    pub fn has_replied(&self) -> bool {
        self.replied.load(Ordering::Acquire)
    }

    async fn send(&self, text: &str, ephemeral: bool) -> anyhow::Result<()> {
        self.responder.create(text, ephemeral).await?;
        self.replied.store(true, Ordering::Release);
        Ok(())
    }
}
