//! Property tests for exclusive references and money rules.

use proptest::prelude::*;
use rust_decimal::Decimal;

use crate::finance::{FeeFigures, SalaryFigures};
use crate::validation::{Either, ExclusivePair, Limits, ValidationError, exactly_one};

/// Amounts from 0.00 to 1,000,000.00.
fn amount() -> impl Strategy<Value = Decimal> {
    (0i64..=100_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

/// Amounts from -1,000,000.00 to -0.01.
fn negative_amount() -> impl Strategy<Value = Decimal> {
    (1i64..=100_000_000i64).prop_map(|cents| Decimal::new(-cents, 2))
}

fn pair() -> impl Strategy<Value = ExclusivePair> {
    prop_oneof![
        Just(ExclusivePair::StudentOrTeacher),
        Just(ExclusivePair::TeacherOrStaff),
    ]
}

proptest! {
    /// Exactly one of the pair is accepted; both or neither never are.
    #[test]
    fn prop_exclusive_references(
        pair in pair(),
        first in proptest::option::of(1..10_000i32),
        second in proptest::option::of(1..10_000i32),
    ) {
        let result = exactly_one(pair, first, second);

        match (first, second) {
            (Some(a), None) => prop_assert_eq!(result, Ok(Either::First(a))),
            (None, Some(b)) => prop_assert_eq!(result, Ok(Either::Second(b))),
            (Some(_), Some(_)) => prop_assert_eq!(result, Err(ValidationError::BothReferences(pair))),
            (None, None) => prop_assert_eq!(result, Err(ValidationError::MissingReference(pair))),
        }
    }

    /// `submitted <= amount` is the exact acceptance boundary for fees.
    #[test]
    fn prop_fee_submitted_bound(amount in amount(), submitted in amount()) {
        let result = FeeFigures::new(&Limits::default(), amount, Some(submitted), None);

        if submitted <= amount {
            let fee = result.unwrap();
            prop_assert!(fee.balance() >= Decimal::ZERO);
        } else {
            prop_assert_eq!(result, Err(ValidationError::SubmittedExceedsAmount));
        }
    }

    /// A fully paid fee is always accepted with no balance left.
    #[test]
    fn prop_fee_paid_in_full(amount in amount()) {
        let fee = FeeFigures::new(&Limits::default(), amount, Some(amount), None).unwrap();
        prop_assert_eq!(fee.balance(), Decimal::ZERO);
    }

    /// Every negative salary component is rejected.
    #[test]
    fn prop_salary_rejects_negatives(
        gross in amount(),
        negative in negative_amount(),
        slot in 0usize..4,
    ) {
        let mut parts = [gross, Decimal::ZERO, Decimal::ZERO, Decimal::ZERO];
        parts[slot] = negative;

        let result = SalaryFigures::new(
            &Limits::default(),
            parts[0],
            Some(parts[1]),
            Some(parts[2]),
            Some(parts[3]),
        );
        prop_assert!(matches!(result, Err(ValidationError::NegativeAmount(_))));
    }

    /// Net pay always follows `amount - tax - pf + bonus`.
    #[test]
    fn prop_salary_net(
        gross in amount(),
        tax in amount(),
        pf in amount(),
        bonus in amount(),
    ) {
        let salary = SalaryFigures::new(&Limits::default(), gross, Some(tax), Some(pf), Some(bonus))
            .unwrap();
        prop_assert_eq!(salary.net(), gross - tax - pf + bonus);
    }
}
