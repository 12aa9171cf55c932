use thiserror::Error;

pub mod lists;
pub mod owner;
pub mod public;

#[cfg(test)]
pub(crate) mod test_util;

/// Failure reported by a driven port which has to distinguish "not there" from "broken"
#[derive(Error, Debug)]
pub enum DrivenPortError {
    #[error("a communication failure occurred: {0}")]
    CommsFailure(#[from] anyhow::Error),
    #[error("the requested data does not exist")]
    DoesNotExist,
}

#[cfg(test)]
impl Clone for DrivenPortError {
    fn clone(&self) -> Self {
        match self {
            Self::CommsFailure(err) => Self::CommsFailure(anyhow::anyhow!(format!("{err:#}"))),
            Self::DoesNotExist => Self::DoesNotExist,
        }
    }
}
