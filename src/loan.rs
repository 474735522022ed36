use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::decimal::{Money, Rate};
use crate::types::{EmiId, LoanId, LoanStatus, LoanTypeId, PaymentId, Role, UserId};

/// a loan application and its lifecycle bookkeeping.
///
/// Mutated only through `LoanLifecycle` and `EmiLedger` operations and never
/// deleted: rejected and closed loans stay on record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoanApplication {
    pub loan_id: LoanId,
    pub customer_id: UserId,
    pub loan_type_id: LoanTypeId,
    pub principal: Money,
    pub tenure_months: u32,
    pub moratorium_months: Option<u32>,
    pub emi_start_date: NaiveDate,
    pub status: LoanStatus,
    pub applied_date: NaiveDate,
    pub verified_by: Option<UserId>,
    pub verified_date: Option<NaiveDate>,
    pub approved_by: Option<UserId>,
    pub approved_date: Option<NaiveDate>,
    pub remarks: Option<String>,
}

impl LoanApplication {
    pub fn new(
        customer_id: UserId,
        loan_type_id: LoanTypeId,
        principal: Money,
        tenure_months: u32,
        moratorium_months: Option<u32>,
        emi_start_date: NaiveDate,
        applied_date: NaiveDate,
    ) -> Self {
        Self {
            loan_id: Uuid::new_v4(),
            customer_id,
            loan_type_id,
            principal,
            tenure_months,
            moratorium_months,
            emi_start_date,
            status: LoanStatus::Applied,
            applied_date,
            verified_by: None,
            verified_date: None,
            approved_by: None,
            approved_date: None,
            remarks: None,
        }
    }
}

/// a loan product definition with its lending bounds
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoanType {
    pub loan_type_id: LoanTypeId,
    pub name: String,
    pub annual_rate: Rate,
    pub min_amount: Money,
    pub max_amount: Money,
    pub max_tenure_months: u32,
    pub is_active: bool,
    pub has_moratorium: bool,
}

/// one scheduled installment (EMI) of a loan.
///
/// Installment numbers are contiguous from 1 for a freshly generated
/// schedule. Once paid, an installment never reverts to unpaid; unpaid
/// trailing installments are removed only by the foreclosure settlement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Emi {
    pub emi_id: EmiId,
    pub loan_id: LoanId,
    pub installment_number: u32,
    pub due_date: NaiveDate,
    pub amount: Money,
    pub is_paid: bool,
    pub paid_date: Option<NaiveDate>,
}

/// a payment applied to exactly one installment.
///
/// `paid_amount` equals the installment's scheduled amount except for the
/// foreclosure settlement, where it carries the true payoff value. Created
/// once, never mutated or deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Payment {
    pub payment_id: PaymentId,
    pub emi_id: EmiId,
    pub paid_amount: Money,
    pub payment_date: DateTime<Utc>,
    pub payment_mode: String,
}

impl Payment {
    pub fn new(emi_id: EmiId, paid_amount: Money, payment_date: DateTime<Utc>, payment_mode: &str) -> Self {
        Self {
            payment_id: Uuid::new_v4(),
            emi_id,
            paid_amount,
            payment_date,
            payment_mode: payment_mode.to_string(),
        }
    }
}

/// directory record for an actor
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub user_id: UserId,
    pub full_name: String,
    pub role: Role,
}

impl User {
    pub fn new(full_name: &str, role: Role) -> Self {
        Self {
            user_id: Uuid::new_v4(),
            full_name: full_name.to_string(),
            role,
        }
    }
}
