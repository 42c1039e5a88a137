/// Sentinel and label constants shared by the normalization stages and adapters.

// Sentinels substituted for missing or invalid values
pub const MISSING: &str = "Missing";
pub const UNKNOWN: &str = "Unknown";
pub const INVALID_NUMBER: &str = "Invalid Number";

// Designation labels, ordered from the lowest experience band upward
pub const SYSTEM_ENGINEER: &str = "System Engineer";
pub const SENIOR_DATA_ENGINEER: &str = "Senior Data Engineer";
pub const LEAD_ENGINEER: &str = "Lead Engineer";
pub const PRINCIPAL_ENGINEER: &str = "Principal Engineer";

/// All designation labels the experience bucketing can produce
pub const DESIGNATION_LABELS: [&str; 4] = [
    SYSTEM_ENGINEER,
    SENIOR_DATA_ENGINEER,
    LEAD_ENGINEER,
    PRINCIPAL_ENGINEER,
];

// Hire date rendering used by every output adapter
pub const OUTPUT_DATE_FORMAT: &str = "%Y-%m-%d";

/// Date formats tried, in order, when parsing hire dates
pub const DEFAULT_DATE_FORMATS: [&str; 8] = [
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%d.%m.%Y",
    "%B %d, %Y",
    "%b %d, %Y",
    "%d %B %Y",
    "%d %b %Y",
];

// Wrapper keys accepted around a record array in source payloads
pub const PAYLOAD_ARRAY_KEYS: [&str; 4] = ["data", "employees", "records", "results"];

// Environment overrides
pub const API_URL_ENV: &str = "EMPLOYEE_API_URL";

pub const DEFAULT_CONFIG_PATH: &str = "config.toml";
pub const DEFAULT_OUTPUT_PATH: &str = "normalized_data.csv";
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 30;
