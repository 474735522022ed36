use thiserror::Error;

use crate::decimal::Money;
use crate::types::{EmiId, LoanId, LoanStatus, LoanTypeId, Role, UserId};

#[derive(Error, Debug)]
pub enum ServicingError {
    #[error("loan not found: {id}")]
    LoanNotFound { id: LoanId },

    #[error("loan type not found: {id}")]
    LoanTypeNotFound { id: LoanTypeId },

    #[error("installment not found: {id}")]
    InstallmentNotFound { id: EmiId },

    #[error("user not found: {id}")]
    UserNotFound { id: UserId },

    #[error("loan must be {required} to {requested}: current status is {current}")]
    InvalidStateTransition {
        requested: &'static str,
        current: LoanStatus,
        required: &'static str,
    },

    #[error("segregation of duties violation: officer {officer_id} verified this loan and cannot make the final decision")]
    SegregationOfDuties { officer_id: UserId },

    #[error("unauthorized action: user {actor_id} does not hold the {required} role")]
    UnauthorizedRole { actor_id: UserId, required: Role },

    #[error("loan type is not active: {name}")]
    InactiveLoanType { name: String },

    #[error("moratorium months are required for this loan type")]
    MoratoriumRequired,

    #[error("moratorium is not allowed for this loan type")]
    MoratoriumNotAllowed,

    #[error("loan amount {amount} is outside allowed limits [{min}, {max}]")]
    AmountOutOfRange {
        amount: Money,
        min: Money,
        max: Money,
    },

    #[error("tenure of {requested} months exceeds the maximum of {maximum}")]
    TenureExceeded { requested: u32, maximum: u32 },

    #[error("tenure must be greater than zero")]
    ZeroTenure,

    #[error("installment already paid: {id}")]
    InstallmentAlreadyPaid { id: EmiId },

    #[error("no outstanding installments: loan is already fully repaid")]
    NothingOutstanding,

    #[error("invalid loan type configuration: {message}")]
    InvalidLoanTypeConfig { message: String },

    #[error("cannot deactivate loan type while active loans reference it")]
    ActiveLoansExist,

    #[error("invalid date: {message}")]
    InvalidDate { message: String },

    #[error("storage error: {message}")]
    Storage { message: String },

    #[error("notification dispatch failed: {message}")]
    NotificationFailed { message: String },
}

pub type Result<T> = std::result::Result<T, ServicingError>;
