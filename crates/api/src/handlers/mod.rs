pub mod feedback;
pub mod messages;
pub mod settings;
pub mod spaces;
pub mod stream;
pub mod webhooks;
pub mod webs;
