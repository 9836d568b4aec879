// Handlers module - API endpoint handlers

pub mod assets;
pub mod csrf;
pub mod toggl;
