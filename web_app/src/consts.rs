pub const ANALYTICS_COLLECTION: &str = "site_analytics";
pub const VISITS_DOC_ID: &str = "visits";
pub const EVENTS_DOC_ID: &str = "events";

/// Navigation hash that identifies the Admin console.
pub const ADMIN_LOCATION_HASH: &str = "#admin";
pub const ADMIN_PIN_HEADER: &str = "X-Admin-Pin";

/// Format used for the date suffix of daily counters.
pub const COUNTER_DATE_FORMAT: &str = "%Y-%m-%d";

pub const DEFAULT_DAILY_SERIES_DAYS: usize = 7;
pub const DEFAULT_TOP_EVENTS: usize = 6;
/// Lower bound of the daily chart scale.
pub const MIN_CHART_SCALE: i64 = 10;

pub const EXCEPTION_EVENT_NAME: &str = "exception";
pub const PLATFORM_TAG: &str = "web";

/// Placeholder id the Admin console sends for documents not stored yet.
pub const NEW_DOCUMENT_ID: &str = "new";
/// Content field that must never reach the public site.
pub const ADMIN_PIN_FIELD: &str = "adminPin";
pub const ORDER_FIELD: &str = "order";
