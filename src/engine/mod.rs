//! Command resolution and delayed actions.
//!
//! The engine knows nothing about rooms, objects or sockets. It sees actors
//! through the [`actor::Actor`] trait and hands command bodies an opaque context
//! type chosen by the embedding application (see [`crate::world`]).
pub mod actor;
pub mod delayed;
pub mod dispatch;
pub mod errors;
pub mod matcher;
pub mod method;
pub mod namespace;
pub mod parser;
pub mod registry;
pub mod roles;

pub use actor::{Actor, ActorId, ActorKind, ResourceType};
pub use delayed::{ActionKey, ActionKind, ActionPayload, ActionRequest, DelayedAction, DelayedActionQueue};
pub use dispatch::{CommandStatus, DispatchOutcome, Dispatcher};
pub use errors::EngineError;
pub use method::{codes, CommandCode, CommandEntry, MethodEntry, MysticMethod, ScriptHost};
pub use namespace::{DuplicatePolicy, NamespaceKind};
pub use parser::{parse, ParsedCommand};
pub use registry::{CommandTable, Registry};
