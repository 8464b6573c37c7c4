//! Error types surfaced by the mascot controller.
use std::fmt;

/// Page collaborators the controller can run without.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collaborator {
    HidingAnchors,
    SummonControl,
}

impl fmt::Display for Collaborator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::HidingAnchors => "hiding anchors",
            Self::SummonControl => "summon control",
        };
        write!(f, "{}", label)
    }
}

/// Errors reported by the controller. None of them are fatal: callers log
/// the error and the character stays in its current state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MascotError {
    UnknownAnimation { name: String },
    MissingCollaborator { collaborator: Collaborator },
}

impl MascotError {
    pub fn unknown_animation(name: impl Into<String>) -> Self {
        Self::UnknownAnimation { name: name.into() }
    }

    pub fn missing(collaborator: Collaborator) -> Self {
        Self::MissingCollaborator { collaborator }
    }
}

impl fmt::Display for MascotError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownAnimation { name } => write!(f, "Unknown animation: {:?}", name),
            Self::MissingCollaborator { collaborator } => {
                write!(f, "Missing collaborator: {} (feature disabled)", collaborator)
            }
        }
    }
}

impl std::error::Error for MascotError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn displays_error_variants() {
        let unknown = MascotError::unknown_animation("DANCE");
        assert!(unknown.to_string().contains("DANCE"));

        let missing = MascotError::missing(Collaborator::SummonControl);
        match &missing {
            MascotError::MissingCollaborator { collaborator } => {
                assert_eq!(*collaborator, Collaborator::SummonControl)
            }
            _ => panic!("expected missing collaborator variant"),
        }
        assert!(missing.to_string().contains("summon control"));
    }
}
