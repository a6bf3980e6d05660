use std::env;
use std::time::Duration;
use tracing::warn;

/// Role instructions sent as the system message on every completion call.
pub const DEFAULT_ROLE_INSTRUCTIONS: &str = "\
You are the security operations analyst for a protected facility with patrol dogs, \
human guards, CCTV cameras and a security event log.\n\
- Ground every answer strictly in the security data provided with the question; \
never invent dogs, guards, cameras or events that are not listed there.\n\
- Be clear and concise. Lead with the direct answer, then the supporting data.\n\
- Suggest concrete actions when they follow from the data: dispatch a patrol, \
review camera footage, reassign a guard, alert the authorities.\n\
- If the provided data cannot answer the question, say so plainly.";

pub const DEFAULT_APOLOGY_TEXT: &str = "\
I'm sorry — the analysis service is temporarily unavailable, so I can't answer \
that right now. Your question has been recorded; please try again shortly.";

const DEFAULT_MAX_CONTEXT_CHARS: usize = 6_000;
const DEFAULT_COMPLETION_TIMEOUT_SECS: u64 = 30;
const DEFAULT_SELECTION_CAP: usize = 5;

/// Tunables for the query pipeline, resolved once at startup. Everything
/// the prompt/limit behavior depends on lives here instead of being spread
/// across call sites.
#[derive(Debug, Clone)]
pub struct QueryPipelineConfig {
    pub role_instructions: String,
    pub max_context_chars: usize,
    pub completion_timeout: Duration,
    pub apology_text: String,
    pub selection_cap: usize,
}

impl Default for QueryPipelineConfig {
    fn default() -> Self {
        Self {
            role_instructions: DEFAULT_ROLE_INSTRUCTIONS.to_string(),
            max_context_chars: DEFAULT_MAX_CONTEXT_CHARS,
            completion_timeout: Duration::from_secs(DEFAULT_COMPLETION_TIMEOUT_SECS),
            apology_text: DEFAULT_APOLOGY_TEXT.to_string(),
            selection_cap: DEFAULT_SELECTION_CAP,
        }
    }
}

impl QueryPipelineConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let max_context_chars = env_usize("SENTINEL_MAX_CONTEXT_CHARS", defaults.max_context_chars);
        let completion_timeout_secs = env_u64(
            "SENTINEL_COMPLETION_TIMEOUT_SECS",
            DEFAULT_COMPLETION_TIMEOUT_SECS,
        );
        let selection_cap = env_usize("SENTINEL_SELECTION_CAP", defaults.selection_cap).max(1);

        Self {
            role_instructions: env::var("SENTINEL_ROLE_INSTRUCTIONS")
                .ok()
                .filter(|v| !v.trim().is_empty())
                .unwrap_or(defaults.role_instructions),
            max_context_chars,
            completion_timeout: Duration::from_secs(completion_timeout_secs),
            apology_text: env::var("SENTINEL_APOLOGY_TEXT")
                .ok()
                .filter(|v| !v.trim().is_empty())
                .unwrap_or(defaults.apology_text),
            selection_cap,
        }
    }
}

fn env_usize(key: &str, default: usize) -> usize {
    match env::var(key) {
        Ok(raw) => raw.trim().parse::<usize>().unwrap_or_else(|e| {
            warn!(key = key, value = %raw, error = %e, "Invalid numeric env value; using default");
            default
        }),
        Err(_) => default,
    }
}

fn env_u64(key: &str, default: u64) -> u64 {
    match env::var(key) {
        Ok(raw) => raw.trim().parse::<u64>().unwrap_or_else(|e| {
            warn!(key = key, value = %raw, error = %e, "Invalid numeric env value; using default");
            default
        }),
        Err(_) => default,
    }
}
