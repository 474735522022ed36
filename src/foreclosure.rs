use crate::decimal::{Money, Rate};
use crate::loan::Emi;

/// replay amortization over the paid installments to derive the true
/// outstanding principal.
///
/// For each paid installment, in ascending installment-number order, the
/// interest component is the monthly rate applied to the running balance
/// and the rest of that installment retires principal. The split shifts
/// toward principal as the balance falls, so no fixed ratio is assumed.
/// Accumulation stays on unrounded decimals; only the final balance is
/// rounded to the whole currency unit and floored at zero.
pub fn outstanding_principal(principal: Money, annual_rate: Rate, paid_installments: &[Emi]) -> Money {
    let monthly_rate = annual_rate.monthly();
    let mut balance = principal;

    for emi in paid_installments {
        let interest_component = balance * monthly_rate;
        let principal_component = emi.amount - interest_component;
        balance -= principal_component;
    }

    balance.round_whole().max(Money::ZERO)
}
