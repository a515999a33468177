use thiserror::Error;

pub type StudioResult<T> = Result<T, StudioError>;

/// User-facing failures raised by project mutations and codecs.
///
/// The preview pipeline (resolver, CSS inliner, assembler) never returns
/// errors — unresolvable references degrade to "leave as-is" or "drop
/// silently". Only genuinely invalid user actions surface here.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StudioError {
    #[error("Name cannot be empty")]
    EmptyName,

    #[error("An item named \"{name}\" already exists")]
    ItemExists { name: String },

    #[error("Cannot create image files directly. Use an upload instead")]
    DirectImageCreate { name: String },

    #[error("Only image files can be uploaded")]
    NonImageUpload { mime: String },

    #[error("Cannot move \"{file}\" into \"{folder}\"")]
    MoveNotAllowed { file: String, folder: String },

    #[error("No item named \"{name}\" in the project")]
    UnknownFile { name: String },

    #[error("Archive error: {0}")]
    Archive(String),
}
