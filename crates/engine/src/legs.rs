//! Transaction legs.
//!
//! A [`Leg`] is a single signed balance change applied to one account as part
//! of a [`Transaction`](crate::Transaction):
//! - positive values increase the account balance
//! - negative values decrease the account balance
//!
//! Every balance change made by the ledger goes through [`delta`]. Undoing a
//! transaction applies the same legs negated ([`Leg::reversed`]), so the
//! forward and backward paths can never disagree.

use uuid::Uuid;

use crate::{Amount, EngineError, ResultEngine, Transaction, TransactionKind};

/// Signed change of the source account and, for transfers, of the
/// destination account.
///
/// | kind     | source | destination |
/// |----------|--------|-------------|
/// | income   | +A     | —           |
/// | expense  | −A     | —           |
/// | transfer | −A     | +A          |
#[must_use]
pub fn delta(kind: TransactionKind, amount: Amount) -> (Amount, Option<Amount>) {
    match kind {
        TransactionKind::Income => (amount, None),
        TransactionKind::Expense => (-amount, None),
        TransactionKind::Transfer => (-amount, Some(amount)),
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Leg {
    pub account_id: Uuid,
    pub delta: Amount,
}

impl Leg {
    #[must_use]
    pub fn reversed(self) -> Self {
        Self {
            account_id: self.account_id,
            delta: -self.delta,
        }
    }
}

/// Builds the legs of a transaction shape.
///
/// Fails with [`EngineError::TransferMissingDestination`] for a transfer
/// without destination. A destination on a non-transfer is ignored here; the
/// ledger rejects it before anything is written.
pub fn legs(
    kind: TransactionKind,
    amount: Amount,
    account_id: Uuid,
    destination_account_id: Option<Uuid>,
) -> ResultEngine<Vec<Leg>> {
    let (source_delta, destination_delta) = delta(kind, amount);
    let mut out = vec![Leg {
        account_id,
        delta: source_delta,
    }];
    if let Some(destination_delta) = destination_delta {
        let destination = destination_account_id.ok_or(EngineError::TransferMissingDestination)?;
        out.push(Leg {
            account_id: destination,
            delta: destination_delta,
        });
    }
    Ok(out)
}

/// Legs that apply `tx` to balances.
pub fn legs_of(tx: &Transaction) -> ResultEngine<Vec<Leg>> {
    legs(tx.kind, tx.amount, tx.account_id, tx.destination_account_id)
}

/// Legs that undo `tx`.
pub fn reversal_of(tx: &Transaction) -> ResultEngine<Vec<Leg>> {
    Ok(legs_of(tx)?.into_iter().map(Leg::reversed).collect())
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;

    fn amount(raw: &str) -> Amount {
        raw.parse().unwrap()
    }

    #[test]
    fn delta_table() {
        let a = amount("40");
        assert_eq!(delta(TransactionKind::Income, a), (a, None));
        assert_eq!(delta(TransactionKind::Expense, a), (-a, None));
        assert_eq!(delta(TransactionKind::Transfer, a), (-a, Some(a)));
    }

    #[test]
    fn transfer_legs_move_value_between_accounts() {
        let (from, to) = (Uuid::new_v4(), Uuid::new_v4());
        let legs = legs(TransactionKind::Transfer, amount("40"), from, Some(to)).unwrap();
        assert_eq!(legs.len(), 2);
        assert_eq!(legs[0].account_id, from);
        assert_eq!(legs[0].delta.value(), dec!(-40));
        assert_eq!(legs[1].account_id, to);
        assert_eq!(legs[1].delta.value(), dec!(40));
        let net = legs.iter().fold(Amount::ZERO, |acc, leg| acc + leg.delta);
        assert!(net.is_zero());
    }

    #[test]
    fn transfer_without_destination_is_rejected() {
        let err = legs(TransactionKind::Transfer, amount("1"), Uuid::new_v4(), None).unwrap_err();
        assert_eq!(err, EngineError::TransferMissingDestination);
    }

    #[test]
    fn reversal_cancels_every_leg() {
        for kind in [
            TransactionKind::Income,
            TransactionKind::Expense,
            TransactionKind::Transfer,
        ] {
            let forward = legs(kind, amount("12.3456"), Uuid::new_v4(), Some(Uuid::new_v4()))
                .unwrap();
            for leg in &forward {
                let back = leg.reversed();
                assert_eq!(back.account_id, leg.account_id);
                assert!((leg.delta + back.delta).is_zero());
            }
        }
    }
}
