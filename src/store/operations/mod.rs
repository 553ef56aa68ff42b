pub mod projects;
pub mod users;
