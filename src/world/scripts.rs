use log::info;
use std::sync::{Arc, Mutex};

use crate::engine::actor::{Actor, ActorId};
use crate::engine::method::ScriptHost;
use crate::logutil::escape_log;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptRun {
    pub script: String,
    pub args: String,
    pub actor: ActorId,
}

/// Script host that runs nothing: it logs each request and remembers it.
/// Clones share the same history, so a test can keep one and install another.
#[derive(Debug, Clone, Default)]
pub struct LoggingScriptHost {
    runs: Arc<Mutex<Vec<ScriptRun>>>,
}

impl LoggingScriptHost {
    pub fn runs(&self) -> Vec<ScriptRun> {
        match self.runs.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl ScriptHost for LoggingScriptHost {
    fn run(&mut self, script: &str, args: &str, actor: &mut dyn Actor) -> bool {
        info!(
            "script '{}' requested by {} ({}) args='{}'",
            script,
            actor.name(),
            actor.id(),
            escape_log(args)
        );
        let run = ScriptRun {
            script: script.to_string(),
            args: args.to_string(),
            actor: actor.id(),
        };
        match self.runs.lock() {
            Ok(mut guard) => guard.push(run),
            Err(poisoned) => poisoned.into_inner().push(run),
        }
        true
    }
}
