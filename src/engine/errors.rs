use thiserror::Error;

/// Errors that can arise while building or reloading the command registry.
///
/// Dispatch outcomes (not found, ambiguous, unauthorized, gated) are not errors;
/// they travel back as [`crate::engine::dispatch::CommandStatus`] values.
#[derive(Debug, Error)]
pub enum EngineError {
    /// A second entry with the same name was registered in one namespace while the
    /// registry runs with the `reject` duplicate policy.
    #[error("duplicate command '{name}' in {namespace} namespace")]
    DuplicateCommand {
        namespace: &'static str,
        name: String,
    },

    /// Entry names must contain at least one character.
    #[error("command names may not be empty ({0} namespace)")]
    EmptyName(&'static str),

    /// Unknown value in a configuration field the engine interprets.
    #[error("invalid engine configuration: {0}")]
    Config(String),
}
