use std::time::Duration;

/// Quiet period between the last edit and the draft write it triggers.
pub const DRAFT_QUIET_PERIOD: Duration = Duration::from_secs(2);

pub const EVENT_CHANNEL_CAPACITY: usize = 128;

pub const STATE_LOCK_ERR: &str = "Execution state lock poisoned";
pub const CTX_LOCK_ERR: &str = "Workbench context lock poisoned";
pub const CASES_LOCK_ERR: &str = "Test case store lock poisoned";
pub const TABS_LOCK_ERR: &str = "Result tabs lock poisoned";
pub const TIMER_LOCK_ERR: &str = "Timer state lock poisoned";
pub const DEBOUNCE_LOCK_ERR: &str = "Debounce handle lock poisoned";

pub const WARN_EMPTY_CODE: &str = "Write some code before running it";
pub const WARN_NO_PROBLEM: &str = "No problem is loaded";
