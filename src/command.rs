use crate::{
    compute::{self, Totals},
    data::{normalize_amount, Category, Error, ExpenseRecord, Position, RecordSet},
    store::RecordStore,
};
use chrono::NaiveDate;
use rust_decimal::Decimal;

/// One user action. Each one is a full cycle against the store: load everything,
/// apply at most one change, save everything back if something changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Command {
    Add(ExpenseRecord),
    Update { position: Position, patch: RecordPatch },
    Delete { position: Position },
    Show { position: Position },
    List,
    Summary,
}

/// Fields to change on an existing record; `None` keeps the current value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct RecordPatch {
    pub date: Option<NaiveDate>,
    pub category: Option<Category>,
    pub amount: Option<Decimal>,
    pub description: Option<String>,
}

impl RecordPatch {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    fn apply(self, record: &ExpenseRecord) -> Result<ExpenseRecord, Error> {
        Ok(ExpenseRecord {
            date: self.date.unwrap_or(record.date),
            category: self.category.unwrap_or_else(|| record.category.clone()),
            amount: match self.amount {
                Some(amount) => normalize_amount(amount)?,
                None => record.amount,
            },
            description: self
                .description
                .unwrap_or_else(|| record.description.clone()),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Outcome {
    Added { position: Position },
    Updated { position: Position, record: ExpenseRecord },
    Deleted { position: Position, record: ExpenseRecord },
    Shown { position: Position, record: ExpenseRecord },
    Listed(RecordSet),
    Summarized { totals: Totals, total: Decimal },
}

/// Runs one command. On error nothing is saved, so the store keeps what it had.
pub(crate) fn execute<S: RecordStore>(store: &mut S, command: Command) -> Result<Outcome, Error> {
    let mut records = store.load()?;
    let outcome = match command {
        Command::Add(record) => {
            let position = compute::add(&mut records, record);
            store.save(&records)?;
            tracing::info!("added expense #{position}");
            Outcome::Added { position }
        }
        Command::Update { position, patch } => {
            let current = records.get(position).ok_or(Error::OutOfRange {
                position,
                len: records.len(),
            })?;
            if patch.is_empty() {
                tracing::warn!("no field to change given, expense #{position} rewritten as is");
            }
            let record = patch.apply(current)?;
            compute::update(&mut records, position, record.clone())?;
            store.save(&records)?;
            tracing::info!("updated expense #{position}");
            Outcome::Updated { position, record }
        }
        Command::Delete { position } => {
            let record = compute::delete(&mut records, position)?;
            store.save(&records)?;
            tracing::info!("deleted expense #{position}, later expenses moved down by one");
            Outcome::Deleted { position, record }
        }
        Command::Show { position } => {
            let len = records.len();
            if position >= len {
                return Err(Error::OutOfRange { position, len });
            }
            Outcome::Shown {
                position,
                record: records.swap_remove(position),
            }
        }
        Command::List => Outcome::Listed(records),
        Command::Summary => {
            let totals = compute::totals_by_category(&records)?;
            let total = compute::grand_total(&totals)?;
            Outcome::Summarized { totals, total }
        }
    };
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::{execute, Command, Outcome, RecordPatch};
    use crate::{
        data::{Category, Error, ExpenseRecord, RecordSet},
        store::MemoryStore,
    };
    use chrono::NaiveDate;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn expense(day: u32, category: Category, amount: Decimal) -> ExpenseRecord {
        ExpenseRecord::new(
            NaiveDate::from_ymd_opt(2024, 6, day).unwrap(),
            category,
            amount,
            format!("day {day}"),
        )
        .unwrap()
    }

    fn store() -> MemoryStore {
        MemoryStore::with(vec![
            expense(1, Category::Food, dec!(100)),
            expense(2, Category::Food, dec!(50)),
            expense(3, Category::Transport, dec!(20)),
        ])
    }

    #[test]
    fn add_on_first_run() {
        let mut store = MemoryStore::default();
        let outcome = execute(&mut store, Command::Add(expense(9, Category::Bills, dec!(60))));
        assert_eq!(outcome, Ok(Outcome::Added { position: 0 }));
        assert_eq!(store.records, [expense(9, Category::Bills, dec!(60))]);
        assert_eq!(store.saves, 1);
    }

    #[test]
    fn add_appends() {
        let mut store = store();
        execute(&mut store, Command::Add(expense(9, Category::Bills, dec!(60)))).unwrap();
        assert_eq!(store.records.len(), 4);
        assert_eq!(store.records[..3], store_records()[..]);
    }

    fn store_records() -> RecordSet {
        store().records
    }

    #[test]
    fn update_keeps_unpatched_fields() {
        let mut store = store();
        let patch = RecordPatch {
            amount: Some(dec!(75.555)),
            ..RecordPatch::default()
        };
        let outcome = execute(&mut store, Command::Update { position: 1, patch }).unwrap();
        let expected = ExpenseRecord {
            amount: dec!(75.56),
            ..expense(2, Category::Food, dec!(50))
        };
        assert_eq!(
            outcome,
            Outcome::Updated {
                position: 1,
                record: expected.clone()
            }
        );
        assert_eq!(store.records[1], expected);
        assert_eq!(store.saves, 1);
    }

    #[test]
    fn update_keeps_unlisted_category() {
        let mut store = MemoryStore::with(vec![expense(
            1,
            Category::Unlisted(String::from("Pets")),
            dec!(3),
        )]);
        let patch = RecordPatch {
            description: Some(String::from("kibble")),
            ..RecordPatch::default()
        };
        execute(&mut store, Command::Update { position: 0, patch }).unwrap();
        assert_eq!(
            store.records[0].category,
            Category::Unlisted(String::from("Pets"))
        );
        assert_eq!(store.records[0].description, "kibble");
    }

    #[test]
    fn failed_commands_save_nothing() {
        let mut store = store();
        assert_eq!(
            execute(
                &mut store,
                Command::Update {
                    position: 3,
                    patch: RecordPatch::default()
                }
            ),
            Err(Error::OutOfRange {
                position: 3,
                len: 3
            })
        );
        assert_eq!(
            execute(&mut store, Command::Delete { position: 10 }),
            Err(Error::OutOfRange {
                position: 10,
                len: 3
            })
        );
        let patch = RecordPatch {
            amount: Some(dec!(-1)),
            ..RecordPatch::default()
        };
        assert_eq!(
            execute(&mut store, Command::Update { position: 0, patch }),
            Err(Error::NegativeAmount)
        );
        assert_eq!(store.saves, 0);
        assert_eq!(store.records, store_records());
    }

    #[test]
    fn delete_shifts_positions() {
        let mut store = store();
        let outcome = execute(&mut store, Command::Delete { position: 0 }).unwrap();
        assert_eq!(
            outcome,
            Outcome::Deleted {
                position: 0,
                record: expense(1, Category::Food, dec!(100))
            }
        );
        // what was at position 1 is now at position 0
        assert_eq!(store.records[0], expense(2, Category::Food, dec!(50)));
        assert_eq!(store.records.len(), 2);
    }

    #[test]
    fn show_and_list_are_read_only() {
        let mut store = store();
        assert_eq!(
            execute(&mut store, Command::Show { position: 2 }),
            Ok(Outcome::Shown {
                position: 2,
                record: expense(3, Category::Transport, dec!(20))
            })
        );
        assert_eq!(
            execute(&mut store, Command::List),
            Ok(Outcome::Listed(store_records()))
        );
        assert!(matches!(
            execute(&mut store, Command::Show { position: 3 }),
            Err(Error::OutOfRange { .. })
        ));
        assert_eq!(store.saves, 0);
    }

    #[test]
    fn summary() {
        let mut store = store();
        let Outcome::Summarized { totals, total } = execute(&mut store, Command::Summary).unwrap()
        else {
            panic!("expected a summary");
        };
        assert_eq!(
            totals.into_iter().collect::<Vec<_>>(),
            [(Category::Food, dec!(150)), (Category::Transport, dec!(20))]
        );
        assert_eq!(total, dec!(170));
        assert_eq!(store.saves, 0);
    }

    #[test]
    fn summary_of_huge_amounts() {
        let huge = ExpenseRecord {
            amount: Decimal::MAX,
            ..expense(1, Category::Food, dec!(1))
        };
        let mut store = MemoryStore::with(vec![huge, expense(2, Category::Food, dec!(1))]);
        assert_eq!(
            execute(&mut store, Command::Summary),
            Err(Error::Overflow(String::from("Food")))
        );
    }

    #[test]
    fn empty_patch() {
        assert!(RecordPatch::default().is_empty());
        assert!(!RecordPatch {
            date: NaiveDate::from_ymd_opt(2024, 1, 1),
            ..RecordPatch::default()
        }
        .is_empty());
    }
}
