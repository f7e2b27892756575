pub const HOME: &str = "/";

pub const LOGIN: &str = "/login";
pub const SIGN_UP: &str = "/sign-up";

pub const PROFILE: &str = "/profile";
pub const DASHBOARD: &str = "/dashboard";

pub const API_GENERATE: &str = "/api/generate";
pub const API_PROFILE: &str = "/api/profile";
pub const API_IDEAS: &str = "/api/ideas";
pub const API_IDEA_STATUS: &str = "/api/ideas/:idea_id/status";
pub const API_WAITLIST: &str = "/api/waitlist";
pub const API_CHECKOUT: &str = "/api/checkout";

pub const CRON_DAILY: &str = "/api/cron/daily";

pub const STRIPE_EVENTS: &str = "/events/stripe";
