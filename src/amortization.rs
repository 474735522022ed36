use chrono::{Months, NaiveDate};
use rust_decimal::{Decimal, MathematicalOps};
use uuid::Uuid;

use crate::decimal::{Money, Rate};
use crate::errors::{Result, ServicingError};
use crate::loan::Emi;
use crate::types::LoanId;

/// calculate the fixed installment amount for a reducing-balance loan.
///
/// EMI = P * r * (1 + r)^n / ((1 + r)^n - 1), with r the monthly rate.
/// `(1 + r)^n` is computed with a single decimal exponentiation; an
/// iterated product compounds representation error across the tenure.
/// A zero rate degenerates to straight division. The result is unrounded.
pub fn compute_installment(principal: Money, annual_rate: Rate, tenure_months: u32) -> Result<Money> {
    if tenure_months == 0 {
        return Err(ServicingError::ZeroTenure);
    }

    let monthly_rate = annual_rate.monthly();
    if monthly_rate.is_zero() {
        return Ok(principal / Decimal::from(tenure_months));
    }

    let compound = (Decimal::ONE + monthly_rate).powi(tenure_months as i64);
    let numerator = principal.as_decimal() * monthly_rate * compound;
    let denominator = compound - Decimal::ONE;

    Ok(Money::from_decimal(numerator / denominator))
}

/// build the full installment schedule for a loan.
///
/// Produces exactly `tenure_months` installments numbered 1..=n, each
/// carrying the same whole-unit amount, due one month apart starting at
/// `start_date`. The start date already accounts for any moratorium;
/// the calculator is moratorium-agnostic.
pub fn build_schedule(
    loan_id: LoanId,
    principal: Money,
    annual_rate: Rate,
    tenure_months: u32,
    start_date: NaiveDate,
) -> Result<Vec<Emi>> {
    let amount = compute_installment(principal, annual_rate, tenure_months)?.round_whole();

    let mut schedule = Vec::with_capacity(tenure_months as usize);
    for n in 1..=tenure_months {
        let due_date = add_months(start_date, n - 1)?;
        schedule.push(Emi {
            emi_id: Uuid::new_v4(),
            loan_id,
            installment_number: n,
            due_date,
            amount,
            is_paid: false,
            paid_date: None,
        });
    }

    Ok(schedule)
}

/// add calendar months to a date, clamping to month end
pub fn add_months(date: NaiveDate, months: u32) -> Result<NaiveDate> {
    date.checked_add_months(Months::new(months))
        .ok_or_else(|| ServicingError::InvalidDate {
            message: format!("{} + {} months overflows the calendar", date, months),
        })
}
