pub mod health;
pub mod logging;
pub mod mailer;
pub mod mailjet;
pub mod provider;
pub mod shared;
pub mod smtp;
pub mod template;
