use hourglass_rs::SafeTimeProvider;
use tracing::warn;

use crate::amortization;
use crate::decimal::Money;
use crate::errors::{Result, ServicingError};
use crate::foreclosure;
use crate::gateway::{LoanStore, Notifier};
use crate::loan::{Emi, Payment};
use crate::types::{EmiId, LoanId, LoanStatus, Severity, UserId};

/// owns the installment records of a loan: schedule creation, single
/// installment payment and full-foreclosure settlement.
///
/// Every operation finishes its reads and computation before the first
/// write, so the store's per-operation transaction is the only atomicity
/// boundary. Notifications go out after the final write and are
/// fire-and-forget.
pub struct EmiLedger<'a, S, N> {
    store: &'a mut S,
    notifier: &'a N,
}

impl<'a, S: LoanStore, N: Notifier> EmiLedger<'a, S, N> {
    pub fn new(store: &'a mut S, notifier: &'a N) -> Self {
        Self { store, notifier }
    }

    /// materialize the full installment schedule for an approved loan.
    ///
    /// The loan's EMI start date already carries the moratorium offset
    /// computed at application time.
    pub fn generate_schedule(&mut self, loan_id: LoanId) -> Result<Vec<Emi>> {
        let loan = self.store.load_loan(loan_id)?;
        if loan.status != LoanStatus::Approved {
            return Err(ServicingError::InvalidStateTransition {
                requested: "generate the EMI schedule",
                current: loan.status,
                required: "Approved",
            });
        }

        let loan_type = self.store.load_loan_type(loan.loan_type_id)?;
        let schedule = amortization::build_schedule(
            loan.loan_id,
            loan.principal,
            loan_type.annual_rate,
            loan.tenure_months,
            loan.emi_start_date,
        )?;

        self.store.save_installments(&schedule)?;
        Ok(schedule)
    }

    /// mark a single installment as paid and record the payment.
    ///
    /// Paying an already-paid installment is an error, not a no-op, to
    /// surface client bugs. When the last installment is settled the loan
    /// closes; that check runs against the freshly persisted sibling set,
    /// not a cached view.
    pub fn pay_installment(
        &mut self,
        emi_id: EmiId,
        payment_mode: &str,
        time: &SafeTimeProvider,
    ) -> Result<Payment> {
        let mut emi = self.store.load_installment(emi_id)?;
        if emi.is_paid {
            return Err(ServicingError::InstallmentAlreadyPaid { id: emi_id });
        }

        let mut loan = self.store.load_loan(emi.loan_id)?;
        let loan_type = self.store.load_loan_type(loan.loan_type_id)?;

        let now = time.now();
        emi.is_paid = true;
        emi.paid_date = Some(now.date_naive());
        self.store.save_installments(std::slice::from_ref(&emi))?;

        let payment = Payment::new(emi.emi_id, emi.amount, now, payment_mode);
        self.store.save_payment(&payment)?;

        self.dispatch(
            loan.customer_id,
            format!(
                "Payment received for installment #{} ({}).",
                emi.installment_number, emi.amount
            ),
            Severity::Success,
        );

        let siblings = self.store.load_installments(emi.loan_id)?;
        if siblings.iter().all(|e| e.is_paid) {
            loan.status = LoanStatus::Closed;
            self.store.save_loan(&loan)?;

            self.dispatch(
                loan.customer_id,
                format!(
                    "Congratulations! Your {} has been fully repaid and is now CLOSED.",
                    loan_type.name
                ),
                Severity::Success,
            );
        }

        Ok(payment)
    }

    /// the amount required to pay off an active loan today.
    ///
    /// Zero when no unpaid installments remain (nothing to foreclose).
    pub fn foreclosure_amount(&self, loan_id: LoanId) -> Result<Money> {
        let loan = self.store.load_loan(loan_id)?;
        if loan.status != LoanStatus::Active {
            return Err(ServicingError::InvalidStateTransition {
                requested: "compute the foreclosure amount",
                current: loan.status,
                required: "Active",
            });
        }

        let installments = self.store.load_installments(loan_id)?;
        if installments.iter().all(|e| e.is_paid) {
            return Ok(Money::ZERO);
        }

        let loan_type = self.store.load_loan_type(loan.loan_type_id)?;
        let paid: Vec<Emi> = installments.into_iter().filter(|e| e.is_paid).collect();

        Ok(foreclosure::outstanding_principal(
            loan.principal,
            loan_type.annual_rate,
            &paid,
        ))
    }

    /// settle an active loan early.
    ///
    /// The payoff amount is computed from the pre-deletion installment
    /// set. The earliest unpaid installment becomes the closing
    /// installment: marked paid with its scheduled amount untouched,
    /// while its payment record carries the true payoff value. Remaining
    /// unpaid installments are deleted and the loan closes.
    pub fn foreclose(
        &mut self,
        loan_id: LoanId,
        payment_mode: &str,
        time: &SafeTimeProvider,
    ) -> Result<Payment> {
        let mut loan = self.store.load_loan(loan_id)?;
        if loan.status != LoanStatus::Active {
            return Err(ServicingError::InvalidStateTransition {
                requested: "foreclose",
                current: loan.status,
                required: "Active",
            });
        }

        let loan_type = self.store.load_loan_type(loan.loan_type_id)?;
        let installments = self.store.load_installments(loan_id)?;
        let (paid, unpaid): (Vec<Emi>, Vec<Emi>) =
            installments.into_iter().partition(|e| e.is_paid);

        let mut unpaid = unpaid.into_iter();
        let mut closing = match unpaid.next() {
            Some(emi) => emi,
            None => return Err(ServicingError::NothingOutstanding),
        };

        let payoff =
            foreclosure::outstanding_principal(loan.principal, loan_type.annual_rate, &paid);

        let now = time.now();
        closing.is_paid = true;
        closing.paid_date = Some(now.date_naive());
        self.store.save_installments(std::slice::from_ref(&closing))?;

        let payment = Payment::new(closing.emi_id, payoff, now, payment_mode);
        self.store.save_payment(&payment)?;

        let trailing: Vec<EmiId> = unpaid.map(|e| e.emi_id).collect();
        if !trailing.is_empty() {
            self.store.delete_installments(&trailing)?;
        }

        loan.status = LoanStatus::Closed;
        self.store.save_loan(&loan)?;

        self.dispatch(
            loan.customer_id,
            format!(
                "Foreclosure successful! Your {} has been fully repaid and is now CLOSED.",
                loan_type.name
            ),
            Severity::Success,
        );

        Ok(payment)
    }

    fn dispatch(&self, user_id: UserId, message: String, severity: Severity) {
        if let Err(err) = self.notifier.notify(user_id, &message, severity) {
            warn!(user_id = %user_id, error = %err, "notification dispatch failed");
        }
    }
}
