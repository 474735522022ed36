use rust_decimal_macros::dec;

use crate::decimal::{Money, Rate};
use crate::errors::{Result, ServicingError};
use crate::gateway::LoanStore;
use crate::loan::LoanType;

/// validate a requested loan against its loan type's configured bounds.
///
/// Rules run in a fixed order and each carries a distinct rejection
/// reason: active type, moratorium agreement, amount range, tenure cap.
/// Pure validation; no side effects.
pub fn validate_request(
    loan_type: &LoanType,
    requested_amount: Money,
    requested_tenure: u32,
    moratorium_months: Option<u32>,
) -> Result<()> {
    if !loan_type.is_active {
        return Err(ServicingError::InactiveLoanType {
            name: loan_type.name.clone(),
        });
    }

    if loan_type.has_moratorium {
        if moratorium_months.map_or(true, |m| m == 0) {
            return Err(ServicingError::MoratoriumRequired);
        }
    } else if moratorium_months.map_or(false, |m| m > 0) {
        return Err(ServicingError::MoratoriumNotAllowed);
    }

    if requested_amount < loan_type.min_amount || requested_amount > loan_type.max_amount {
        return Err(ServicingError::AmountOutOfRange {
            amount: requested_amount,
            min: loan_type.min_amount,
            max: loan_type.max_amount,
        });
    }

    if requested_tenure == 0 {
        return Err(ServicingError::ZeroTenure);
    }
    if requested_tenure > loan_type.max_tenure_months {
        return Err(ServicingError::TenureExceeded {
            requested: requested_tenure,
            maximum: loan_type.max_tenure_months,
        });
    }

    Ok(())
}

/// validate a loan type definition: rate in (0, 30], min <= max, positive
/// amounts, positive tenure cap
pub fn validate_definition(loan_type: &LoanType) -> Result<()> {
    let rate = loan_type.annual_rate.as_percentage();
    if rate <= dec!(0) || rate > dec!(30) {
        return Err(ServicingError::InvalidLoanTypeConfig {
            message: "interest rate must be between 0 and 30%".to_string(),
        });
    }

    if !loan_type.min_amount.is_positive()
        || !loan_type.max_amount.is_positive()
        || loan_type.min_amount > loan_type.max_amount
    {
        return Err(ServicingError::InvalidLoanTypeConfig {
            message: "invalid loan amount limits".to_string(),
        });
    }

    if loan_type.max_tenure_months == 0 {
        return Err(ServicingError::InvalidLoanTypeConfig {
            message: "max tenure must be greater than zero".to_string(),
        });
    }

    Ok(())
}

/// maintenance operations over the loan type catalog
pub struct LoanTypeCatalog<'a, S> {
    store: &'a mut S,
}

impl<'a, S: LoanStore> LoanTypeCatalog<'a, S> {
    pub fn new(store: &'a mut S) -> Self {
        Self { store }
    }

    pub fn create(&mut self, loan_type: LoanType) -> Result<LoanType> {
        validate_definition(&loan_type)?;
        self.store.save_loan_type(&loan_type)?;
        Ok(loan_type)
    }

    /// update rate, bounds and flags. Deactivation is refused while
    /// active loans still reference the type.
    pub fn update(&mut self, updated: LoanType) -> Result<()> {
        let existing = self.store.load_loan_type(updated.loan_type_id)?;
        validate_definition(&updated)?;

        if existing.is_active
            && !updated.is_active
            && self.store.any_active_loans_for_type(updated.loan_type_id)?
        {
            return Err(ServicingError::ActiveLoansExist);
        }

        self.store.save_loan_type(&updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use uuid::Uuid;

    use crate::gateway::InMemoryGateway;
    use crate::loan::LoanApplication;
    use crate::types::LoanStatus;

    fn personal_loan_type() -> LoanType {
        LoanType {
            loan_type_id: Uuid::new_v4(),
            name: "Personal Loan".to_string(),
            annual_rate: Rate::from_percentage(dec!(12)),
            min_amount: Money::from_major(50_000),
            max_amount: Money::from_major(500_000),
            max_tenure_months: 60,
            is_active: true,
            has_moratorium: false,
        }
    }

    fn education_loan_type() -> LoanType {
        LoanType {
            loan_type_id: Uuid::new_v4(),
            name: "Education Loan".to_string(),
            annual_rate: Rate::from_percentage(dec!(9)),
            min_amount: Money::from_major(100_000),
            max_amount: Money::from_major(1_000_000),
            max_tenure_months: 84,
            is_active: true,
            has_moratorium: true,
        }
    }

    #[test]
    fn test_inactive_type_rejected_first() {
        let mut loan_type = personal_loan_type();
        loan_type.is_active = false;

        // inactive trumps every other violation
        let result = validate_request(&loan_type, Money::from_major(1), 999, Some(3));
        assert!(matches!(result, Err(ServicingError::InactiveLoanType { .. })));
    }

    #[test]
    fn test_moratorium_required_and_forbidden() {
        let education = education_loan_type();
        assert!(matches!(
            validate_request(&education, Money::from_major(200_000), 48, None),
            Err(ServicingError::MoratoriumRequired)
        ));
        assert!(matches!(
            validate_request(&education, Money::from_major(200_000), 48, Some(0)),
            Err(ServicingError::MoratoriumRequired)
        ));
        assert!(validate_request(&education, Money::from_major(200_000), 48, Some(6)).is_ok());

        let personal = personal_loan_type();
        assert!(matches!(
            validate_request(&personal, Money::from_major(200_000), 24, Some(3)),
            Err(ServicingError::MoratoriumNotAllowed)
        ));
        // an explicit zero is treated as absent
        assert!(validate_request(&personal, Money::from_major(200_000), 24, Some(0)).is_ok());
    }

    #[test]
    fn test_amount_bounds_inclusive() {
        let loan_type = personal_loan_type();

        assert!(validate_request(&loan_type, Money::from_major(50_000), 24, None).is_ok());
        assert!(validate_request(&loan_type, Money::from_major(500_000), 24, None).is_ok());
        assert!(matches!(
            validate_request(&loan_type, Money::from_major(49_999), 24, None),
            Err(ServicingError::AmountOutOfRange { .. })
        ));
        assert!(matches!(
            validate_request(&loan_type, Money::from_major(500_001), 24, None),
            Err(ServicingError::AmountOutOfRange { .. })
        ));
    }

    #[test]
    fn test_tenure_cap() {
        let loan_type = personal_loan_type();

        assert!(validate_request(&loan_type, Money::from_major(100_000), 60, None).is_ok());
        assert!(matches!(
            validate_request(&loan_type, Money::from_major(100_000), 61, None),
            Err(ServicingError::TenureExceeded { requested: 61, maximum: 60 })
        ));
        assert!(matches!(
            validate_request(&loan_type, Money::from_major(100_000), 0, None),
            Err(ServicingError::ZeroTenure)
        ));
    }

    #[test]
    fn test_definition_bounds() {
        let mut loan_type = personal_loan_type();
        assert!(validate_definition(&loan_type).is_ok());

        loan_type.annual_rate = Rate::from_percentage(dec!(30));
        assert!(validate_definition(&loan_type).is_ok());

        loan_type.annual_rate = Rate::from_percentage(dec!(30.5));
        assert!(validate_definition(&loan_type).is_err());

        loan_type.annual_rate = Rate::ZERO;
        assert!(validate_definition(&loan_type).is_err());

        loan_type.annual_rate = Rate::from_percentage(dec!(12));
        loan_type.min_amount = Money::from_major(600_000);
        assert!(validate_definition(&loan_type).is_err());

        loan_type.min_amount = Money::from_major(50_000);
        loan_type.max_tenure_months = 0;
        assert!(validate_definition(&loan_type).is_err());
    }

    #[test]
    fn test_deactivation_blocked_by_active_loans() {
        let mut gateway = InMemoryGateway::new();
        let loan_type = personal_loan_type();
        let type_id = loan_type.loan_type_id;
        LoanTypeCatalog::new(&mut gateway).create(loan_type.clone()).unwrap();

        let mut loan = LoanApplication::new(
            Uuid::new_v4(),
            type_id,
            Money::from_major(100_000),
            24,
            None,
            NaiveDate::from_ymd_opt(2025, 2, 1).unwrap(),
            NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
        );
        loan.status = LoanStatus::Active;
        gateway.save_loan(&loan).unwrap();

        let mut deactivated = loan_type.clone();
        deactivated.is_active = false;
        let result = LoanTypeCatalog::new(&mut gateway).update(deactivated.clone());
        assert!(matches!(result, Err(ServicingError::ActiveLoansExist)));

        // closing the loan unblocks the deactivation
        loan.status = LoanStatus::Closed;
        gateway.save_loan(&loan).unwrap();
        LoanTypeCatalog::new(&mut gateway).update(deactivated).unwrap();
        assert!(!gateway.load_loan_type(type_id).unwrap().is_active);
    }
}
