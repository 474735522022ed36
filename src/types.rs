use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// unique identifier for a loan application
pub type LoanId = Uuid;

/// unique identifier for a loan type
pub type LoanTypeId = Uuid;

/// unique identifier for an installment
pub type EmiId = Uuid;

/// unique identifier for a payment record
pub type PaymentId = Uuid;

/// unique identifier for a user (customer, officer or admin)
pub type UserId = Uuid;

/// loan application status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LoanStatus {
    /// submitted by the customer, awaiting verification
    Applied,
    /// verified by a first officer, awaiting the final decision
    UnderReview,
    /// approved by a second officer; schedule generation pending
    Approved,
    /// rejected; terminal
    Rejected,
    /// schedule generated, repayment in progress
    Active,
    /// fully repaid or foreclosed; terminal
    Closed,
}

impl LoanStatus {
    /// terminal statuses admit no further transition
    pub fn is_terminal(&self) -> bool {
        matches!(self, LoanStatus::Rejected | LoanStatus::Closed)
    }
}

impl fmt::Display for LoanStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            LoanStatus::Applied => "Applied",
            LoanStatus::UnderReview => "Under Review",
            LoanStatus::Approved => "Approved",
            LoanStatus::Rejected => "Rejected",
            LoanStatus::Active => "Active",
            LoanStatus::Closed => "Closed",
        };
        write!(f, "{}", label)
    }
}

/// user role, checked by the directory before privileged transitions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    Customer,
    LoanOfficer,
    Admin,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Role::Customer => "Customer",
            Role::LoanOfficer => "Loan Officer",
            Role::Admin => "Admin",
        };
        write!(f, "{}", label)
    }
}

/// notification severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Severity {
    Info,
    Success,
    Warning,
    Error,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_statuses() {
        assert!(LoanStatus::Rejected.is_terminal());
        assert!(LoanStatus::Closed.is_terminal());
        assert!(!LoanStatus::Applied.is_terminal());
        assert!(!LoanStatus::UnderReview.is_terminal());
        assert!(!LoanStatus::Approved.is_terminal());
        assert!(!LoanStatus::Active.is_terminal());
    }

    #[test]
    fn test_status_display() {
        assert_eq!(LoanStatus::UnderReview.to_string(), "Under Review");
        assert_eq!(LoanStatus::Active.to_string(), "Active");
    }

    #[test]
    fn test_status_serializes_as_string() {
        let json = serde_json::to_string(&LoanStatus::UnderReview).unwrap();
        assert_eq!(json, "\"UnderReview\"");
    }
}
