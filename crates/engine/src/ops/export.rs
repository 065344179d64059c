//! CSV export in the format Buxfer imports.

use std::{collections::HashMap, io::Write};

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{
    Account, EngineError, ResultEngine, Transaction, TransactionKind, store::TransactionFilter,
};

use super::Engine;

pub const EXPORT_HEADER: [&str; 8] = [
    "Date",
    "Description",
    "Amount",
    "Account",
    "Tags",
    "Type",
    "Status",
    "Currency",
];

const STATUS: &str = "cleared";

/// One CSV line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExportRow {
    pub date: String,
    pub description: String,
    pub amount: String,
    pub account: String,
    pub tags: String,
    pub kind: String,
    pub status: String,
    pub currency: String,
}

impl ExportRow {
    fn record(&self) -> [&str; 8] {
        [
            self.date.as_str(),
            self.description.as_str(),
            self.amount.as_str(),
            self.account.as_str(),
            self.tags.as_str(),
            self.kind.as_str(),
            self.status.as_str(),
            self.currency.as_str(),
        ]
    }
}

/// Renders a transaction as export rows.
///
/// Income and expense give one row (expense negative). A transfer gives an
/// outgoing row on the source account followed by an incoming row on the
/// destination; both carry the source account currency.
pub fn export_rows(tx: &Transaction, accounts: &HashMap<Uuid, Account>) -> Vec<ExportRow> {
    let source = accounts.get(&tx.account_id);
    let name_of = |account: Option<&Account>| account.map(|a| a.name.clone()).unwrap_or_default();
    let currency = source
        .map(|account| account.currency.code().to_string())
        .unwrap_or_default();
    let row = |amount: String, account: String| ExportRow {
        date: tx.transacted_at.format("%Y-%m-%d").to_string(),
        description: tx.description.clone(),
        amount,
        account,
        tags: tx.tags.join(", "),
        kind: tx.kind.as_str().to_string(),
        status: STATUS.to_string(),
        currency: currency.clone(),
    };

    match tx.kind {
        TransactionKind::Income => vec![row(tx.amount.to_fixed(2), name_of(source))],
        TransactionKind::Expense => vec![row((-tx.amount).to_fixed(2), name_of(source))],
        TransactionKind::Transfer => {
            let destination = tx
                .destination_account_id
                .and_then(|id| accounts.get(&id));
            vec![
                row((-tx.amount).to_fixed(2), name_of(source)),
                row(tx.amount.to_fixed(2), name_of(destination)),
            ]
        }
    }
}

impl Engine {
    /// Writes the household's transactions as CSV, newest first.
    ///
    /// `from` and `to` bound `transacted_at` inclusively. Returns the number
    /// of data rows written.
    pub async fn export_csv<W: Write>(
        &self,
        household_id: Uuid,
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
        writer: W,
    ) -> ResultEngine<usize> {
        let stores = self.stores();
        let accounts: HashMap<Uuid, Account> = stores
            .accounts
            .list(household_id)
            .await?
            .into_iter()
            .map(|account| (account.id, account))
            .collect();
        let filter = TransactionFilter {
            from,
            to,
            ..TransactionFilter::default()
        };
        let transactions = stores.transactions.list_all(household_id, &filter).await?;

        let mut csv = csv::Writer::from_writer(writer);
        csv.write_record(EXPORT_HEADER)
            .map_err(|err| EngineError::Export(err.to_string()))?;
        let mut written = 0;
        for tx in &transactions {
            for row in export_rows(tx, &accounts) {
                csv.write_record(row.record())
                    .map_err(|err| EngineError::Export(err.to_string()))?;
                written += 1;
            }
        }
        csv.flush()
            .map_err(|err| EngineError::Export(err.to_string()))?;
        tracing::info!(household_id = %household_id, rows = written, "csv export written");
        Ok(written)
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;
    use crate::{AccountKind, Amount, Currency};

    fn account(name: &str, currency: &str) -> Account {
        Account {
            id: Uuid::new_v4(),
            household_id: Uuid::nil(),
            name: name.to_string(),
            kind: AccountKind::Card,
            balance: Amount::ZERO,
            currency: Currency::try_from(currency).unwrap(),
            created_by: Uuid::nil(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn transaction(kind: TransactionKind, source: &Account, dest: Option<&Account>) -> Transaction {
        Transaction {
            id: Uuid::new_v4(),
            household_id: Uuid::nil(),
            kind,
            description: "Move".to_string(),
            amount: "40".parse().unwrap(),
            account_id: source.id,
            destination_account_id: dest.map(|a| a.id),
            tags: vec!["home".to_string(), "monthly".to_string()],
            note: None,
            transacted_at: Utc.with_ymd_and_hms(2024, 3, 9, 23, 30, 0).unwrap(),
            created_by: Uuid::nil(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn expense_is_one_negative_row() {
        let cash = account("Cash", "UAH");
        let tx = transaction(TransactionKind::Expense, &cash, None);
        let rows = export_rows(&tx, &HashMap::from([(cash.id, cash.clone())]));
        assert_eq!(rows.len(), 1);
        assert_eq!(
            rows[0].record(),
            ["2024-03-09", "Move", "-40.00", "Cash", "home, monthly", "expense", "cleared", "UAH"]
        );
    }

    #[test]
    fn transfer_is_outgoing_then_incoming_in_source_currency() {
        let card = account("Card", "USD");
        let savings = account("Savings", "EUR");
        let tx = transaction(TransactionKind::Transfer, &card, Some(&savings));
        let accounts = HashMap::from([(card.id, card.clone()), (savings.id, savings.clone())]);
        let rows = export_rows(&tx, &accounts);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].amount, "-40.00");
        assert_eq!(rows[0].account, "Card");
        assert_eq!(rows[1].amount, "40.00");
        assert_eq!(rows[1].account, "Savings");
        assert!(rows.iter().all(|row| row.currency == "USD"));
        assert!(rows.iter().all(|row| row.kind == "transfer"));
    }
}
