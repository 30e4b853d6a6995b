use thiserror::Error;

use unbrew_class_file::ClassFileError;

#[derive(Error, Debug)]
pub enum EntityError {
    #[error(transparent)]
    ClassFile(#[from] ClassFileError),
    #[error("Malformed signature {signature:?} at offset {offset}: {reason}")]
    InvalidSignature {
        signature: String,
        offset: usize,
        reason: &'static str,
    },
    #[error("Bad local class type {0}")]
    InvalidLocalClass(String),
    #[error("No code in method {0} to analyse")]
    NoCode(String),
    #[error("Code of method {0} has already been released")]
    CodeReleased(String),
    #[error("Code analysis failed: {0}")]
    Analysis(String),
    #[error("While processing {member}: {source}")]
    InMember {
        member: String,
        source: Box<EntityError>,
    },
}

impl EntityError {
    /// Attach the name of the member being processed, once.
    pub fn in_member(self, member: impl Into<String>) -> Self {
        match self {
            e @ EntityError::InMember { .. } => e,
            e => EntityError::InMember {
                member: member.into(),
                source: Box::new(e),
            },
        }
    }

    /// The error with any member context stripped.
    pub fn root(&self) -> &EntityError {
        match self {
            EntityError::InMember { source, .. } => source.root(),
            e => e,
        }
    }
}
