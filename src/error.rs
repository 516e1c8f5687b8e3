use std::path::PathBuf;

use serde::Serialize;

/// Fatal errors. Any of these stops the run before output is written.
#[derive(thiserror::Error, Debug)]
pub enum RenderError {
    #[error("cannot read {what} at {}: {source}", path.display())]
    MissingAsset {
        what: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid {what}: {message}")]
    Parse { what: &'static str, message: String },

    #[cfg(feature = "raster")]
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("raster error: {0}")]
    Raster(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl RenderError {
    pub fn parse(what: &'static str, message: impl Into<String>) -> Self {
        Self::Parse {
            what,
            message: message.into(),
        }
    }

    pub fn raster(message: impl Into<String>) -> Self {
        Self::Raster(message.into())
    }
}

pub type RenderResult<T> = Result<T, RenderError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HoldRole {
    Move,
    Foot,
}

impl std::fmt::Display for HoldRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HoldRole::Move => f.write_str("move"),
            HoldRole::Foot => f.write_str("foot"),
        }
    }
}

/// Recoverable conditions. Rendering continues; the warning is logged and kept
/// on the layout so callers can report it.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Warning {
    #[error("route '{route}': {role} hold '{hold_id}' is not in the hold map")]
    MissingHoldReference {
        route: String,
        hold_id: String,
        role: HoldRole,
    },

    #[error("{role} font {} is unavailable, using the fallback font", path.display())]
    FontUnavailable { role: String, path: PathBuf },

    #[error("no installed font matches '{requested}', drawing text with the bundled font")]
    BuiltinFont { requested: String },

    #[error("route '{route}': no free corner for the beta block, placing it top-left")]
    LayoutOverflow { route: String },
}
