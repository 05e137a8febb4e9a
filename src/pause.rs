use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PauseError {
    #[error("Contract is paused")]
    Paused,
    #[error("Contract is already paused")]
    AlreadyPaused,
    #[error("Contract is not paused")]
    NotPaused,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PauseState {
    #[default]
    Active,
    Paused,
}

/// Operational mode consulted by every value-moving entry point.
///
/// Authorization of `pause`/`unpause` is the caller's responsibility.
#[derive(Debug, Default, Clone)]
pub struct PauseGate {
    state: PauseState,
}

impl PauseGate {
    pub fn state(&self) -> PauseState {
        self.state
    }

    pub fn is_paused(&self) -> bool {
        self.state == PauseState::Paused
    }

    pub fn ensure_active(&self) -> Result<(), PauseError> {
        match self.state {
            PauseState::Active => Ok(()),
            PauseState::Paused => Err(PauseError::Paused),
        }
    }

    pub fn pause(&mut self) -> Result<(), PauseError> {
        match self.state {
            PauseState::Active => {
                self.state = PauseState::Paused;
                Ok(())
            }
            PauseState::Paused => Err(PauseError::AlreadyPaused),
        }
    }

    pub fn unpause(&mut self) -> Result<(), PauseError> {
        match self.state {
            PauseState::Paused => {
                self.state = PauseState::Active;
                Ok(())
            }
            PauseState::Active => Err(PauseError::NotPaused),
        }
    }
}
