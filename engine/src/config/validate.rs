use crate::GameError;

pub trait Validate {
    fn validate(&self) -> Result<(), GameError>;
}
