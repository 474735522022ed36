use chrono::NaiveDate;
use hourglass_rs::SafeTimeProvider;
use tracing::warn;

use crate::amortization::add_months;
use crate::decimal::Money;
use crate::errors::{Result, ServicingError};
use crate::gateway::{Directory, LoanStore, Notifier};
use crate::ledger::EmiLedger;
use crate::loan::{LoanApplication, User};
use crate::types::{LoanId, LoanStatus, LoanTypeId, Role, Severity, UserId};
use crate::validation;

/// a customer's loan request, as submitted
#[derive(Debug, Clone)]
pub struct ApplyRequest {
    pub loan_type_id: LoanTypeId,
    pub amount: Money,
    pub tenure_months: u32,
    pub moratorium_months: Option<u32>,
}

/// the loan lifecycle state machine.
///
/// `Applied -> UnderReview -> {Approved -> Active, Rejected}`;
/// `Active -> Closed`. Rejected and Closed are terminal. Officer identity
/// and role are validated before any state mutation, and the officer who
/// verified a loan can never make the final decision on it. Notifications
/// are dispatched after the mutation is durably applied; their failure
/// never rolls back a transition.
pub struct LoanLifecycle<'a, S, D, N> {
    store: &'a mut S,
    directory: &'a D,
    notifier: &'a N,
}

impl<'a, S, D, N> LoanLifecycle<'a, S, D, N>
where
    S: LoanStore,
    D: Directory,
    N: Notifier,
{
    pub fn new(store: &'a mut S, directory: &'a D, notifier: &'a N) -> Self {
        Self {
            store,
            directory,
            notifier,
        }
    }

    /// submit a new loan application for a customer.
    ///
    /// Validates the request against the loan type's bounds and fixes the
    /// EMI start date: one moratorium period out when the type requires a
    /// moratorium, otherwise the month after application.
    pub fn apply(
        &mut self,
        customer_id: UserId,
        request: ApplyRequest,
        time: &SafeTimeProvider,
    ) -> Result<LoanApplication> {
        let customer = self.directory.get_user(customer_id)?;
        if customer.role != Role::Customer {
            return Err(ServicingError::UnauthorizedRole {
                actor_id: customer_id,
                required: Role::Customer,
            });
        }

        let loan_type = self.store.load_loan_type(request.loan_type_id)?;
        validation::validate_request(
            &loan_type,
            request.amount,
            request.tenure_months,
            request.moratorium_months,
        )?;

        let today = time.now().date_naive();
        let emi_start_date = first_due_date(
            today,
            loan_type.has_moratorium,
            request.moratorium_months,
        )?;

        let loan = LoanApplication::new(
            customer_id,
            request.loan_type_id,
            request.amount,
            request.tenure_months,
            request.moratorium_months,
            emi_start_date,
            today,
        );
        self.store.save_loan(&loan)?;

        self.dispatch(
            customer_id,
            format!(
                "Your application for {} of {} has been submitted successfully.",
                loan_type.name, request.amount
            ),
            Severity::Info,
        );
        self.dispatch_role(
            Role::LoanOfficer,
            format!(
                "New loan application: {} applied for {} ({}).",
                customer.full_name, loan_type.name, request.amount
            ),
            Severity::Info,
        );

        Ok(loan)
    }

    /// move an applied loan under review, recording the verifying officer
    pub fn mark_under_review(
        &mut self,
        loan_id: LoanId,
        officer_id: UserId,
        time: &SafeTimeProvider,
    ) -> Result<LoanApplication> {
        self.ensure_officer(officer_id)?;

        let mut loan = self.store.load_loan(loan_id)?;
        if loan.status != LoanStatus::Applied {
            return Err(ServicingError::InvalidStateTransition {
                requested: "move to Under Review",
                current: loan.status,
                required: "Applied",
            });
        }
        let loan_type = self.store.load_loan_type(loan.loan_type_id)?;

        loan.status = LoanStatus::UnderReview;
        loan.verified_by = Some(officer_id);
        loan.verified_date = Some(time.now().date_naive());
        self.store.save_loan(&loan)?;

        self.dispatch(
            loan.customer_id,
            format!(
                "Your application for {} has been verified and is currently under review by the final approval team.",
                loan_type.name
            ),
            Severity::Info,
        );

        Ok(loan)
    }

    /// reject a loan from Applied or UnderReview.
    ///
    /// Once a loan is under review the verifying officer is recused: only
    /// a second officer may make the final decision.
    pub fn reject(
        &mut self,
        loan_id: LoanId,
        officer_id: UserId,
        remarks: Option<String>,
        time: &SafeTimeProvider,
    ) -> Result<LoanApplication> {
        let officer = self.ensure_officer(officer_id)?;

        let mut loan = self.store.load_loan(loan_id)?;
        if loan.status != LoanStatus::Applied && loan.status != LoanStatus::UnderReview {
            return Err(ServicingError::InvalidStateTransition {
                requested: "reject",
                current: loan.status,
                required: "Applied or Under Review",
            });
        }
        if loan.status == LoanStatus::UnderReview && loan.verified_by == Some(officer_id) {
            return Err(ServicingError::SegregationOfDuties { officer_id });
        }

        let loan_type = self.store.load_loan_type(loan.loan_type_id)?;
        let customer = self.directory.get_user(loan.customer_id)?;

        loan.status = LoanStatus::Rejected;
        loan.approved_by = Some(officer_id);
        loan.remarks = remarks;
        self.store.save_loan(&loan)?;

        let reason = loan.remarks.as_deref().unwrap_or("Criteria not met");
        self.dispatch(
            loan.customer_id,
            format!(
                "Your {} for {} has been REJECTED. Remarks: {}",
                loan_type.name, loan.principal, reason
            ),
            Severity::Error,
        );
        self.dispatch_role(
            Role::Admin,
            format!(
                "Loan rejected: officer {} rejected {} for customer {}.",
                officer.full_name, loan_type.name, customer.full_name
            ),
            Severity::Warning,
        );

        Ok(loan)
    }

    /// approve a loan under review and activate it.
    ///
    /// The approving officer must differ from the verifying officer. The
    /// loan is durably saved as Approved, the EMI schedule is generated
    /// from its start date, and the loan then flips to Active: one
    /// logical transition with two observable statuses.
    pub fn approve(
        &mut self,
        loan_id: LoanId,
        officer_id: UserId,
        time: &SafeTimeProvider,
    ) -> Result<LoanApplication> {
        let officer = self.ensure_officer(officer_id)?;

        let mut loan = self.store.load_loan(loan_id)?;
        if loan.status != LoanStatus::UnderReview {
            return Err(ServicingError::InvalidStateTransition {
                requested: "approve",
                current: loan.status,
                required: "Under Review",
            });
        }
        if loan.verified_by == Some(officer_id) {
            return Err(ServicingError::SegregationOfDuties { officer_id });
        }

        let loan_type = self.store.load_loan_type(loan.loan_type_id)?;
        let customer = self.directory.get_user(loan.customer_id)?;

        loan.status = LoanStatus::Approved;
        loan.approved_by = Some(officer_id);
        loan.approved_date = Some(time.now().date_naive());
        self.store.save_loan(&loan)?;

        EmiLedger::new(&mut *self.store, self.notifier).generate_schedule(loan_id)?;

        loan.status = LoanStatus::Active;
        self.store.save_loan(&loan)?;

        self.dispatch(
            loan.customer_id,
            format!(
                "Congratulations! Your {} for {} has been APPROVED and is now ACTIVE.",
                loan_type.name, loan.principal
            ),
            Severity::Success,
        );
        self.dispatch_role(
            Role::Admin,
            format!(
                "Loan approved: officer {} approved {} for customer {}.",
                officer.full_name, loan_type.name, customer.full_name
            ),
            Severity::Success,
        );

        Ok(loan)
    }

    fn ensure_officer(&self, officer_id: UserId) -> Result<User> {
        let officer = self.directory.get_user(officer_id)?;
        if officer.role != Role::LoanOfficer {
            return Err(ServicingError::UnauthorizedRole {
                actor_id: officer_id,
                required: Role::LoanOfficer,
            });
        }
        Ok(officer)
    }

    fn dispatch(&self, user_id: UserId, message: String, severity: Severity) {
        if let Err(err) = self.notifier.notify(user_id, &message, severity) {
            warn!(user_id = %user_id, error = %err, "notification dispatch failed");
        }
    }

    fn dispatch_role(&self, role: Role, message: String, severity: Severity) {
        if let Err(err) = self.notifier.notify_role(role, &message, severity) {
            warn!(%role, error = %err, "notification dispatch failed");
        }
    }
}

/// first installment due date: one moratorium period out when the loan
/// type carries a moratorium, else the month after application
fn first_due_date(
    today: NaiveDate,
    has_moratorium: bool,
    moratorium_months: Option<u32>,
) -> Result<NaiveDate> {
    if has_moratorium {
        add_months(today, moratorium_months.unwrap_or(0))
    } else {
        add_months(today, 1)
    }
}
