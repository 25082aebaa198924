use serde_json::Value;

use crate::config::config_model::{EventConfig, NavigationIntent};
use crate::data::transport::{ApiResponse, Transport};
use crate::render::context::{resolve_binding, DataContext};
use crate::trace::logger::TraceLogger;
use crate::trace::trace::EngineEvent;

// ============================================================================
// Event action execution
// ============================================================================

/// The result of executing one declarative event action.
///
/// Nothing here aborts a page: API failures carry their error as data and
/// run the `onError` chain, scripts are blocked by default, `emit` and
/// `navigate` are intents for the host to act on.
#[derive(Debug, Clone, PartialEq)]
pub enum ActionOutcome {
    ApiSuccess {
        url: String,
        response: ApiResponse,
        chained: Vec<ActionOutcome>,
    },
    ApiFailure {
        url: String,
        error: String,
        chained: Vec<ActionOutcome>,
    },
    Navigation {
        target: String,
        intent: NavigationIntent,
        query: Vec<(String, String)>,
    },
    Emitted {
        event: String,
        payload: Option<Value>,
    },
    /// A `script` action was declared but script execution is gated off.
    ScriptBlocked,
    /// Scripts were opted in: the code is reported to the host, never
    /// evaluated by the engine itself.
    ScriptRequested { code: String },
}

/// Executes event actions against a data context.
pub struct ActionRunner<'a> {
    transport: &'a dyn Transport,
    logger: &'a TraceLogger,
    allow_scripts: bool,
}

impl<'a> ActionRunner<'a> {
    pub fn new(transport: &'a dyn Transport, logger: &'a TraceLogger) -> Self {
        Self {
            transport,
            logger,
            allow_scripts: false,
        }
    }

    /// Opt in to surfacing `script` actions to the host. Even then the
    /// engine only reports the code; it ships no interpreter.
    pub fn allow_scripts(mut self, allow: bool) -> Self {
        self.allow_scripts = allow;
        self
    }

    pub fn execute(&self, event: &EventConfig, context: &DataContext) -> ActionOutcome {
        match event {
            EventConfig::Api {
                url,
                method,
                params,
                on_success,
                on_error,
            } => self.execute_api(url, method, params.as_ref(), on_success.as_deref(), on_error.as_deref(), context),

            EventConfig::Navigate {
                target,
                intent,
                query,
            } => {
                let query = query
                    .iter()
                    .flatten()
                    .map(|(k, v)| (k.clone(), resolve_query_value(v, context)))
                    .collect();

                ActionOutcome::Navigation {
                    target: target.clone(),
                    intent: *intent,
                    query,
                }
            }

            EventConfig::Script { code } => {
                if self.allow_scripts {
                    ActionOutcome::ScriptRequested { code: code.clone() }
                } else {
                    self.logger
                        .log(&EngineEvent::now("action").with_detail("script action blocked"));
                    ActionOutcome::ScriptBlocked
                }
            }

            EventConfig::Emit { event, payload } => ActionOutcome::Emitted {
                event: event.clone(),
                payload: payload.as_ref().map(|p| resolve_params(p, context)),
            },
        }
    }

    fn execute_api(
        &self,
        url: &str,
        method: &str,
        params: Option<&Value>,
        on_success: Option<&EventConfig>,
        on_error: Option<&EventConfig>,
        context: &DataContext,
    ) -> ActionOutcome {
        let body = params.map(|p| resolve_params(p, context));

        match self.transport.request(url, method, body.as_ref()) {
            Ok(response) => {
                let chained = on_success
                    .map(|next| vec![self.execute(next, context)])
                    .unwrap_or_default();

                ActionOutcome::ApiSuccess {
                    url: url.to_string(),
                    response,
                    chained,
                }
            }
            Err(e) => {
                self.logger.log(
                    &EngineEvent::now("action")
                        .with_detail(format!("api action {}", url))
                        .with_error(&e),
                );

                let chained = on_error
                    .map(|next| vec![self.execute(next, context)])
                    .unwrap_or_default();

                ActionOutcome::ApiFailure {
                    url: url.to_string(),
                    error: e.to_string(),
                    chained,
                }
            }
        }
    }
}

/// Resolve binding references inside an action's params/payload.
///
/// String values starting with `$` are binding expressions (e.g.
/// `$formData.name`); an unresolvable expression becomes `null`. Everything
/// else passes through verbatim, recursing into objects and arrays.
pub fn resolve_params(params: &Value, context: &DataContext) -> Value {
    match params {
        Value::String(s) => match s.strip_prefix('$') {
            Some(expression) => resolve_binding(expression, context)
                .cloned()
                .unwrap_or(Value::Null),
            None => params.clone(),
        },
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(k, v)| (k.clone(), resolve_params(v, context)))
                .collect(),
        ),
        Value::Array(items) => Value::Array(
            items.iter().map(|v| resolve_params(v, context)).collect(),
        ),
        _ => params.clone(),
    }
}

fn resolve_query_value(value: &str, context: &DataContext) -> String {
    match value.strip_prefix('$') {
        Some(expression) => match resolve_binding(expression, context) {
            Some(Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
            None => String::new(),
        },
        None => value.to_string(),
    }
}
