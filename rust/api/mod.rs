pub mod announcements;
pub mod auth;
pub mod dashboard;
pub mod files;
pub mod homework;
pub mod recycle_bin;
pub mod students;
pub mod test_papers;
