use std::cell::RefCell;
use std::collections::HashMap;

use crate::decimal::Money;
use crate::errors::{Result, ServicingError};
use crate::loan::{Emi, LoanApplication, LoanType, Payment, User};
use crate::types::{EmiId, LoanId, LoanStatus, LoanTypeId, Role, Severity, UserId};

/// persistence gateway for loan, installment and payment records.
///
/// All writes issued during one top-level lifecycle or ledger operation
/// are expected to participate in a single transaction: either every
/// write commits or none do. The core keeps its side of the bargain by
/// finishing every fallible read and computation before its first write.
/// Implementations must also serialize concurrent operations on the same
/// loan (row lock, optimistic token, or exclusive ownership as in the
/// in-memory gateway below).
pub trait LoanStore {
    fn load_loan(&self, id: LoanId) -> Result<LoanApplication>;
    fn save_loan(&mut self, loan: &LoanApplication) -> Result<()>;

    fn load_loan_type(&self, id: LoanTypeId) -> Result<LoanType>;
    fn save_loan_type(&mut self, loan_type: &LoanType) -> Result<()>;
    fn any_active_loans_for_type(&self, id: LoanTypeId) -> Result<bool>;

    fn load_installment(&self, id: EmiId) -> Result<Emi>;
    /// all installments of a loan, ordered by installment number
    fn load_installments(&self, loan_id: LoanId) -> Result<Vec<Emi>>;
    fn save_installments(&mut self, installments: &[Emi]) -> Result<()>;
    fn delete_installments(&mut self, ids: &[EmiId]) -> Result<()>;

    fn save_payment(&mut self, payment: &Payment) -> Result<()>;
}

/// user and role lookup
pub trait Directory {
    fn get_user(&self, id: UserId) -> Result<User>;
    fn users_by_role(&self, role: Role) -> Result<Vec<User>>;
}

/// fire-and-forget message dispatch on lifecycle events.
///
/// Failures are logged by the caller and never roll back the transition
/// that triggered them.
pub trait Notifier {
    fn notify(&self, user_id: UserId, message: &str, severity: Severity) -> Result<()>;
    fn notify_role(&self, role: Role, message: &str, severity: Severity) -> Result<()>;
}

/// in-memory gateway backing the crate's tests.
///
/// `&mut` exclusivity serializes operations per loan, and the map writes
/// within one operation are atomic because nothing can fail after the
/// first insert.
#[derive(Debug, Default)]
pub struct InMemoryGateway {
    loans: HashMap<LoanId, LoanApplication>,
    loan_types: HashMap<LoanTypeId, LoanType>,
    installments: HashMap<EmiId, Emi>,
    payments: HashMap<EmiId, Payment>,
}

impl InMemoryGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_loan_type(&mut self, loan_type: LoanType) -> LoanTypeId {
        let id = loan_type.loan_type_id;
        self.loan_types.insert(id, loan_type);
        id
    }

    /// the payment attached to an installment, if any
    pub fn payment_for(&self, emi_id: EmiId) -> Option<&Payment> {
        self.payments.get(&emi_id)
    }

    pub fn total_paid(&self, loan_id: LoanId) -> Money {
        self.payments
            .values()
            .filter(|p| {
                self.installments
                    .get(&p.emi_id)
                    .map(|e| e.loan_id == loan_id)
                    .unwrap_or(false)
            })
            .fold(Money::ZERO, |acc, p| acc + p.paid_amount)
    }
}

impl LoanStore for InMemoryGateway {
    fn load_loan(&self, id: LoanId) -> Result<LoanApplication> {
        self.loans
            .get(&id)
            .cloned()
            .ok_or(ServicingError::LoanNotFound { id })
    }

    fn save_loan(&mut self, loan: &LoanApplication) -> Result<()> {
        self.loans.insert(loan.loan_id, loan.clone());
        Ok(())
    }

    fn load_loan_type(&self, id: LoanTypeId) -> Result<LoanType> {
        self.loan_types
            .get(&id)
            .cloned()
            .ok_or(ServicingError::LoanTypeNotFound { id })
    }

    fn save_loan_type(&mut self, loan_type: &LoanType) -> Result<()> {
        self.loan_types.insert(loan_type.loan_type_id, loan_type.clone());
        Ok(())
    }

    fn any_active_loans_for_type(&self, id: LoanTypeId) -> Result<bool> {
        Ok(self
            .loans
            .values()
            .any(|l| l.loan_type_id == id && l.status == LoanStatus::Active))
    }

    fn load_installment(&self, id: EmiId) -> Result<Emi> {
        self.installments
            .get(&id)
            .cloned()
            .ok_or(ServicingError::InstallmentNotFound { id })
    }

    fn load_installments(&self, loan_id: LoanId) -> Result<Vec<Emi>> {
        let mut installments: Vec<Emi> = self
            .installments
            .values()
            .filter(|e| e.loan_id == loan_id)
            .cloned()
            .collect();
        installments.sort_by_key(|e| e.installment_number);
        Ok(installments)
    }

    fn save_installments(&mut self, installments: &[Emi]) -> Result<()> {
        for emi in installments {
            self.installments.insert(emi.emi_id, emi.clone());
        }
        Ok(())
    }

    fn delete_installments(&mut self, ids: &[EmiId]) -> Result<()> {
        for id in ids {
            self.installments.remove(id);
        }
        Ok(())
    }

    fn save_payment(&mut self, payment: &Payment) -> Result<()> {
        self.payments.insert(payment.emi_id, payment.clone());
        Ok(())
    }
}

/// in-memory user directory
#[derive(Debug, Default)]
pub struct InMemoryDirectory {
    users: HashMap<UserId, User>,
}

impl InMemoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_user(&mut self, user: User) -> UserId {
        let id = user.user_id;
        self.users.insert(id, user);
        id
    }
}

impl Directory for InMemoryDirectory {
    fn get_user(&self, id: UserId) -> Result<User> {
        self.users
            .get(&id)
            .cloned()
            .ok_or(ServicingError::UserNotFound { id })
    }

    fn users_by_role(&self, role: Role) -> Result<Vec<User>> {
        Ok(self
            .users
            .values()
            .filter(|u| u.role == role)
            .cloned()
            .collect())
    }
}

/// notification target
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotifyTarget {
    User(UserId),
    Role(Role),
}

/// a dispatched notification, as recorded by `RecordingNotifier`
#[derive(Debug, Clone)]
pub struct SentNotification {
    pub target: NotifyTarget,
    pub message: String,
    pub severity: Severity,
}

/// notifier that records every dispatch; used by tests
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    sent: RefCell<Vec<SentNotification>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sent(&self) -> Vec<SentNotification> {
        self.sent.borrow().clone()
    }

    pub fn sent_to(&self, user_id: UserId) -> Vec<SentNotification> {
        self.sent
            .borrow()
            .iter()
            .filter(|n| n.target == NotifyTarget::User(user_id))
            .cloned()
            .collect()
    }

    pub fn sent_to_role(&self, role: Role) -> Vec<SentNotification> {
        self.sent
            .borrow()
            .iter()
            .filter(|n| n.target == NotifyTarget::Role(role))
            .cloned()
            .collect()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, user_id: UserId, message: &str, severity: Severity) -> Result<()> {
        self.sent.borrow_mut().push(SentNotification {
            target: NotifyTarget::User(user_id),
            message: message.to_string(),
            severity,
        });
        Ok(())
    }

    fn notify_role(&self, role: Role, message: &str, severity: Severity) -> Result<()> {
        self.sent.borrow_mut().push(SentNotification {
            target: NotifyTarget::Role(role),
            message: message.to_string(),
            severity,
        });
        Ok(())
    }
}

/// notifier whose every dispatch fails; used to test fire-and-forget
#[derive(Debug, Default)]
pub struct FailingNotifier;

impl Notifier for FailingNotifier {
    fn notify(&self, _user_id: UserId, _message: &str, _severity: Severity) -> Result<()> {
        Err(ServicingError::NotificationFailed {
            message: "downstream unavailable".to_string(),
        })
    }

    fn notify_role(&self, _role: Role, _message: &str, _severity: Severity) -> Result<()> {
        Err(ServicingError::NotificationFailed {
            message: "downstream unavailable".to_string(),
        })
    }
}
