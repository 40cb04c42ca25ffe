//! Canonical schema constants for structured logging and events
//!
//! These constants ensure consistency across all logging and error reporting.

// Canonical field keys for structured logging
pub const FIELD_COMPONENT: &str = "component";
pub const FIELD_OP: &str = "op";
pub const FIELD_EVENT: &str = "event";
pub const FIELD_DURATION_MS: &str = "duration_ms";

// Entity identifiers
pub const FIELD_NAMESPACE: &str = "namespace";
pub const FIELD_NAMESPACE_ID: &str = "namespace_id";
pub const FIELD_VARIANT: &str = "variant";

// Collection sizes
pub const FIELD_SNAPSHOT_LEN: &str = "snapshot_len";
pub const FIELD_VARIANT_COUNT: &str = "variant_count";
pub const FIELD_EVICTED: &str = "evicted";

// Cache
pub const FIELD_CACHE_OP: &str = "cache_op";

// Error fields
pub const FIELD_ERR_KIND: &str = "err.kind";
pub const FIELD_ERR_CODE: &str = "err.code";

// Canonical event names
pub const EVENT_START: &str = "start";
pub const EVENT_END: &str = "end";
pub const EVENT_END_ERROR: &str = "end_error";
