pub const COUNTERS: &str = "counters";
pub const USERS: &str = "users";
pub const PROJECTS: &str = "projects";
