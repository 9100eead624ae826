/// Route component constants shared across crates
pub const API_ROUTE_COMPONENT: &str = "api";
pub const API_ROUTE_PREFIX: &str = const_str::concat!("/", API_ROUTE_COMPONENT);

pub const AVAILABILITY_ROUTE_COMPONENT: &str = "availability-events";
pub const AVAILABILITY_ROUTE_PREFIX: &str =
    const_str::concat!(API_ROUTE_PREFIX, "/", AVAILABILITY_ROUTE_COMPONENT);

pub const SELECTION_ROUTE_COMPONENT: &str = "icloud-selection";
pub const SELECTION_ROUTE_PREFIX: &str =
    const_str::concat!(API_ROUTE_PREFIX, "/", SELECTION_ROUTE_COMPONENT);

pub const CALENDARS_ROUTE_COMPONENT: &str = "icloud";
pub const CALENDARS_ROUTE_PREFIX: &str =
    const_str::concat!(API_ROUTE_PREFIX, "/", CALENDARS_ROUTE_COMPONENT, "/calendars");

/// Key-value store keys
pub const SELECTION_STORAGE_KEY: &str = "icloud:selectedCalendars";
pub const AVAILABILITY_CACHE_PREFIX: &str = "availability:events:";

/// Defaults applied when no selection has been stored yet
pub const DEFAULT_CALDAV_URL: &str = "https://caldav.icloud.com";
pub const DEFAULT_WORK_START: &str = "06:00";
pub const DEFAULT_WORK_END: &str = "15:00";
pub const DEFAULT_BOOKED_TITLE: &str = "Booked";
pub const DEFAULT_CACHE_TTL_SECONDS: u32 = 600;
pub const DEFAULT_LOOKAHEAD_WEEKS: u32 = 4;

/// Window used when checking which calendars have upcoming events
pub const CALENDAR_PROBE_DAYS: i64 = 28;
