use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use async_trait::async_trait;

use crate::{
    gateway::{CommandDeclaration, Gateway, Responder},
    interaction::{ChannelId, GuildId, Interaction, InteractionKind, UserId},
};

/// A responder that records every reply it is asked to deliver, or
/// fails every delivery when built with [`RecordingResponder::failing`].
#[derive(Default)]
pub struct RecordingResponder {
    creates: Mutex<Vec<(String, bool)>>,
    edits: Mutex<Vec<String>>,
    fail: bool,
}

impl RecordingResponder {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            fail: true,
            ..Default::default()
        })
    }

    /// Every (text, ephemeral) reply created so far.
    pub fn creates(&self) -> Vec<(String, bool)> {
        self.creates.lock().unwrap().clone()
    }

    pub fn edits(&self) -> Vec<String> {
        self.edits.lock().unwrap().clone()
    }
}

#[async_trait]
impl Responder for RecordingResponder {
    async fn create(&self, text: &str, ephemeral: bool) -> anyhow::Result<()> {
        if self.fail {
            anyhow::bail!("stale interaction token");
        }
        self.creates
            .lock()
            .unwrap()
            .push((text.to_string(), ephemeral));
        Ok(())
    }

    async fn edit(&self, text: &str) -> anyhow::Result<()> {
        if self.fail {
            anyhow::bail!("stale interaction token");
        }
        self.edits.lock().unwrap().push(text.to_string());
        Ok(())
    }
}

/// A gateway that records each bulk declaration it receives.
#[derive(Default)]
pub struct RecordingGateway {
    declared: Mutex<Vec<Vec<CommandDeclaration>>>,
}

impl RecordingGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn declared(&self) -> Vec<Vec<CommandDeclaration>> {
        self.declared.lock().unwrap().clone()
    }
}

#[async_trait]
impl Gateway for RecordingGateway {
    async fn declare_commands(
        &self,
        declarations: Vec<CommandDeclaration>,
    ) -> anyhow::Result<()> {
        self.declared.lock().unwrap().push(declarations);
        Ok(())
    }
}

pub fn command_interaction(name: &str, user: UserId, guild: Option<GuildId>) -> Interaction {
    Interaction {
        kind: InteractionKind::Command,
        command: name.to_string(),
        user,
        channel: ChannelId(100),
        guild,
        options: HashMap::new(),
    }
}
