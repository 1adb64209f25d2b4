//! Client constants
//!
//! Protocol strings and default timings shared by every layer.

// Session lifecycle
pub const DEFAULT_SESSION_IDLE_THRESHOLD_SECS: u64 = 599;
pub const DEFAULT_OUTAGE_RECOVERY_DELAY_MS: u64 = 2000;
pub const DEFAULT_SINGLE_HOST_RETRY_DELAY_MS: u64 = 1000;

// Session login endpoint
pub const SESSION_API_PATH: &str = "/api/session";
pub const REALM_QUERY_PARAM: &str = "realmName";
/// Marker the service puts in a 401 body when the login itself raced an idle
/// timeout.
pub const IDLE_TIMEOUT_MARKER: &str = "session-idle-timeout";

// Pipeline submission
pub const PIPELINE_DOC_CONTENT_TYPE: &str = "application/vnd.lucidworks-document";
pub const PIPELINE_CHARSET: &str = "UTF-8";
pub const ECHO_DISABLED_PARAM: &str = "echo=false";

// Transport defaults
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_MAX_IDLE_PER_HOST: usize = 1000;

// Metric names
pub const METRIC_DOCS_SENT: &str = "ingestlink_docs_sent_total";
pub const METRIC_SESSION_RESETS: &str = "ingestlink_session_resets_total";
pub const METRIC_LIVE_HOSTS: &str = "ingestlink_live_hosts";
pub const METRIC_POST_DURATION: &str = "ingestlink_batch_post_duration_ms";
