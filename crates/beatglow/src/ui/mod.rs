pub mod bindings;
pub mod notification;

pub use notification::Notification;
