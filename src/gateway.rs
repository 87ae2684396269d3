use async_trait::async_trait;

use crate::metadata::{CommandOption, ContextFlags};

/// The outbound half of a single interaction: create the pending reply,
/// then edit it in place. The payload is opaque to this crate beyond
/// the text and the ephemeral (invoker-only) flag; delivery can fail,
/// e.g. when the platform has expired the interaction token.
#[async_trait]
pub trait Responder: Send + Sync {
    async fn create(&self, text: &str, ephemeral: bool) -> anyhow::Result<()>;
    async fn edit(&self, text: &str) -> anyhow::Result<()>;
}

/// The startup-time half of the gateway collaborator.
#[async_trait]
pub trait Gateway: Send + Sync {
    /// Declares the full command set in one call, replacing whatever
    /// set was declared before. Idempotent; called once at startup.
    async fn declare_commands(&self, declarations: Vec<CommandDeclaration>)
    -> anyhow::Result<()>;
}

/// One entry of the bulk command declaration. `permissions` is the raw
/// ordered capability list; deriving the platform's permission bitmask
/// from it is the gateway's job, as is enforcing `nsfw` and the context
/// flags.
#[derive(Clone, Debug, PartialEq)]
pub struct CommandDeclaration {
    pub name: String,
    pub description: String,
    pub options: Vec<CommandOption>,
    pub permissions: Vec<String>,
    pub nsfw: bool,
    pub contexts: ContextFlags,
}
