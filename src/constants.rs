pub mod defaults {
    pub const DEBOUNCE_DELAY_MS: u64 = 800;
    pub const THROTTLE_LIMIT_MS: u64 = 800;
    pub const SUGGEST_AFTER: usize = 3;
    pub const MAX_SELECTED: usize = 5;
}

pub mod network {
    pub const TIMEOUT_SUGGEST_REQUEST_MS: u64 = 30_000;
    pub const MAX_REDIRECTS: usize = 10;
}

pub mod template {
    pub const TERM_PLACEHOLDER: &str = "{{term}}";
}

pub mod markup {
    pub const HILIGHT_OPEN: &str = "<span>";
    pub const HILIGHT_CLOSE: &str = "</span>";
}
