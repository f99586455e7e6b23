pub mod dispatch;
pub mod health;
pub mod message;
pub mod notification;
pub mod response;
pub mod retry;
pub mod status;
pub mod template;
pub mod validation;
