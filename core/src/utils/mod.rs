pub mod cmd;
pub mod error;
pub mod logger;
pub mod path;
pub mod progress;
pub mod style_message;

pub use style_message::StyleMessage;
