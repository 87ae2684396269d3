use thiserror::Error;

/// A defect in a handler's registration, surfaced while the bot is
/// starting up. Not recoverable at runtime: the process should refuse
/// to come up rather than fail on first use of the broken command.
#[derive(Debug, Error)]
pub enum DefinitionError {
    #[error("no command metadata attached for `{type_name}`")]
    MissingCommandMetadata { type_name: &'static str },

    #[error("no event metadata attached for `{type_name}`")]
    MissingEventMetadata { type_name: &'static str },

    #[error("invalid command name `{name}`: {reason}")]
    InvalidName { name: String, reason: &'static str },

    #[error("invalid description for `{name}`: {reason}")]
    InvalidDescription { name: String, reason: &'static str },

    #[error("duplicate command name `{name}`")]
    DuplicateName { name: String },
}
