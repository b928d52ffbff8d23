use thiserror::Error;

#[derive(Debug, Error, Eq, PartialEq)]
pub enum CalcError {
    #[error("monthly withdrawal must be greater than zero")]
    ZeroWithdrawal,
}
