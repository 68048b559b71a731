use log::{debug, error, info, warn};

use crate::utils::StyleMessage;

pub fn info(message: impl Into<StyleMessage>) {
    info!("{}", message.into());
}

pub fn warn(message: impl Into<StyleMessage>) {
    warn!("{}", message.into());
}

pub fn error(message: impl Into<StyleMessage>) {
    error!("{}", message.into());
}

pub fn debug(message: impl Into<StyleMessage>) {
    debug!("{}", message.into());
}
