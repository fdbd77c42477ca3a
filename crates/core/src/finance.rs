//! Derived money figures for fees and salaries.
//!
//! `Balance` and `NetSalary` are computed here, once, on the write path and
//! stored with the row. Readers never recompute them.

use rust_decimal::Decimal;

use crate::validation::{Limits, ValidationError};

/// Validated monetary inputs of a fee.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeeFigures {
    /// Amount charged.
    pub amount: Decimal,
    /// Amount paid so far.
    pub submitted: Decimal,
    /// Late fine added to the charge.
    pub fine: Decimal,
}

impl FeeFigures {
    /// Validates raw fee inputs. Absent `submitted` and `fine` count as zero.
    ///
    /// # Errors
    ///
    /// Returns a `ValidationError` for out-of-range amounts or when
    /// `submitted` exceeds `amount`.
    pub fn new(
        limits: &Limits,
        amount: Decimal,
        submitted: Option<Decimal>,
        fine: Option<Decimal>,
    ) -> Result<Self, ValidationError> {
        let amount = limits.money("Amount", amount)?;
        let submitted = limits.money_or_zero("Submitted", submitted)?;
        let fine = limits.money_or_zero("Fine", fine)?;

        if submitted > amount {
            return Err(ValidationError::SubmittedExceedsAmount);
        }

        Ok(Self {
            amount,
            submitted,
            fine,
        })
    }

    /// Outstanding balance: `amount + fine - submitted`.
    #[must_use]
    pub fn balance(&self) -> Decimal {
        self.amount + self.fine - self.submitted
    }
}

/// Validated monetary inputs of a salary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SalaryFigures {
    /// Gross amount.
    pub amount: Decimal,
    /// Tax withheld.
    pub tax: Decimal,
    /// Provident fund contribution.
    pub pf: Decimal,
    /// Bonus paid on top.
    pub bonus: Decimal,
}

impl SalaryFigures {
    /// Validates raw salary inputs. Absent deductions and bonus count as zero.
    ///
    /// # Errors
    ///
    /// Returns a `ValidationError` for out-of-range amounts.
    pub fn new(
        limits: &Limits,
        amount: Decimal,
        tax: Option<Decimal>,
        pf: Option<Decimal>,
        bonus: Option<Decimal>,
    ) -> Result<Self, ValidationError> {
        Ok(Self {
            amount: limits.money("Amount", amount)?,
            tax: limits.money_or_zero("Tax", tax)?,
            pf: limits.money_or_zero("PF", pf)?,
            bonus: limits.money_or_zero("Bonus", bonus)?,
        })
    }

    /// Net pay: `amount - tax - pf + bonus`. May be negative when deductions
    /// exceed the gross.
    #[must_use]
    pub fn net(&self) -> Decimal {
        self.amount - self.tax - self.pf + self.bonus
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_fee_balance_includes_fine() {
        let fee = FeeFigures::new(&Limits::default(), dec!(500), Some(dec!(200)), Some(dec!(25)))
            .unwrap();
        assert_eq!(fee.balance(), dec!(325));
    }

    #[test]
    fn test_fee_defaults_to_unpaid() {
        let fee = FeeFigures::new(&Limits::default(), dec!(120.50), None, None).unwrap();
        assert_eq!(fee.submitted, Decimal::ZERO);
        assert_eq!(fee.balance(), dec!(120.50));
    }

    #[test]
    fn test_fee_fully_paid_is_accepted() {
        let fee = FeeFigures::new(&Limits::default(), dec!(300), Some(dec!(300)), None).unwrap();
        assert_eq!(fee.balance(), Decimal::ZERO);
    }

    #[test]
    fn test_fee_with_sub_cent_fine_is_rejected() {
        let err = FeeFigures::new(&Limits::default(), dec!(10.00), None, Some(dec!(10.004)))
            .unwrap_err();
        assert_eq!(err.to_string(), "Fine must have at most 2 decimal places.");
    }

    #[test]
    fn test_fee_overpaid_is_rejected() {
        let err = FeeFigures::new(&Limits::default(), dec!(300), Some(dec!(300.01)), None)
            .unwrap_err();
        assert_eq!(err, ValidationError::SubmittedExceedsAmount);
    }

    #[test]
    fn test_salary_net() {
        let salary = SalaryFigures::new(
            &Limits::default(),
            dec!(4000),
            Some(dec!(400)),
            Some(dec!(240)),
            Some(dec!(150)),
        )
        .unwrap();
        assert_eq!(salary.net(), dec!(3510));
    }

    #[test]
    fn test_salary_deductions_may_exceed_gross() {
        let salary =
            SalaryFigures::new(&Limits::default(), dec!(100), Some(dec!(80)), Some(dec!(40)), None)
                .unwrap();
        assert_eq!(salary.net(), dec!(-20));
    }

    #[test]
    fn test_salary_rejects_negative_bonus() {
        let err =
            SalaryFigures::new(&Limits::default(), dec!(100), None, None, Some(dec!(-1))).unwrap_err();
        assert_eq!(err, ValidationError::NegativeAmount("Bonus"));
    }
}
