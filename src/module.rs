use std::sync::Arc;

use crate::{
    command::CommandInstance,
    dispatch::Dispatcher,
    error::DefinitionError,
    event::EventInstance,
    gateway::{CommandDeclaration, Gateway},
    interaction::UserId,
};

/// Owns every bound instance for the lifetime of the process, declares
/// the command set to the gateway, and hands the instances to the
/// dispatcher.
#[derive(Default)]
pub struct ModuleRegistry {
    commands: Vec<Arc<CommandInstance>>,
    events: Vec<Arc<EventInstance>>,
}

impl ModuleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registration order is preserved; it is the order commands are
    /// declared to the gateway in. Two commands with the same name are
    /// a startup defect.
    pub fn register_command(&mut self, instance: CommandInstance) -> Result<(), DefinitionError> {
        if self.commands.iter().any(|c| c.name() == instance.name()) {
            return Err(DefinitionError::DuplicateName {
                name: instance.name().to_string(),
            });
        }
        self.commands.push(Arc::new(instance));
        Ok(())
    }

    pub fn register_event(&mut self, instance: EventInstance) {
        self.events.push(Arc::new(instance));
    }

    pub fn commands(&self) -> &[Arc<CommandInstance>] {
        &self.commands
    }

    /// The ordered bulk declaration payload.
    pub fn declarations(&self) -> Vec<CommandDeclaration> {
        self.commands.iter().map(|c| c.declaration()).collect()
    }

    /// Submits the full command set through the gateway's single
    /// replace-everything declare call.
    pub async fn declare_commands(&self, gateway: &dyn Gateway) -> anyhow::Result<()> {
        gateway.declare_commands(self.declarations()).await
    }

    /// Consumes the registry into a dispatcher, building the name-keyed
    /// command table.
    pub fn into_dispatcher(self, owner: Option<UserId>) -> Dispatcher {
        Dispatcher::new(self.commands, self.events, owner)
    }
}
