//! Core aggregate trait.

use crate::event::Event;

/// Trait for aggregates in an event-sourced system.
///
/// An aggregate's state is derived entirely from its history: a repository
/// starts from `Default::default()` and folds every stored event, oldest
/// first, through [`on`](Aggregate::on).
///
/// Folding must be deterministic. Given the same state and event it must
/// always produce the same new state.
pub trait Aggregate: Default + Send + Sync + 'static {
    /// Folds one event into the aggregate.
    ///
    /// Returns false when the aggregate does not recognize the event. A
    /// repository treats that as a corrupt or unsupported history and aborts
    /// the load.
    fn on(&mut self, event: &dyn Event) -> bool;

    /// Folds events in sequence, stopping at the first unrecognized one.
    ///
    /// Returns the index of the rejected event, if any.
    fn on_all<'a, I>(&mut self, events: I) -> Result<(), usize>
    where
        I: IntoIterator<Item = &'a dyn Event>,
    {
        for (index, event) in events.into_iter().enumerate() {
            if !self.on(event) {
                return Err(index);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, Utc};
    use event_store::Version;
    use serde::{Deserialize, Serialize};

    use super::*;
    use crate::Model;

    #[derive(Debug, Clone, Serialize, Deserialize)]
    struct Deposited {
        model: Model,
        amount: i64,
    }

    #[derive(Debug, Clone, Serialize, Deserialize)]
    struct Frozen {
        model: Model,
    }

    macro_rules! impl_event {
        ($ty:ty) => {
            impl Event for $ty {
                fn aggregate_id(&self) -> &str {
                    self.model.id.as_str()
                }

                fn event_version(&self) -> Version {
                    self.model.version
                }

                fn event_at(&self) -> DateTime<Utc> {
                    self.model.at
                }
            }
        };
    }

    impl_event!(Deposited);
    impl_event!(Frozen);

    #[derive(Debug, Default, PartialEq)]
    struct Account {
        balance: i64,
        version: Version,
    }

    impl Aggregate for Account {
        fn on(&mut self, event: &dyn Event) -> bool {
            match event.downcast_ref::<Deposited>() {
                Some(deposit) => {
                    self.balance += deposit.amount;
                    self.version = deposit.model.version;
                    true
                }
                None => false,
            }
        }
    }

    fn deposit(version: i64, amount: i64) -> Deposited {
        Deposited {
            model: Model::now("acc-1", Version::new(version)),
            amount,
        }
    }

    #[test]
    fn on_all_folds_in_order() {
        let first = deposit(1, 10);
        let second = deposit(2, 32);
        let events: Vec<&dyn Event> = vec![&first, &second];

        let mut account = Account::default();
        assert_eq!(account.on_all(events), Ok(()));
        assert_eq!(account.balance, 42);
        assert_eq!(account.version, Version::new(2));
    }

    #[test]
    fn on_all_reports_rejected_index() {
        let first = deposit(1, 10);
        let frozen = Frozen {
            model: Model::now("acc-1", Version::new(2)),
        };
        let third = deposit(3, 5);
        let events: Vec<&dyn Event> = vec![&first, &frozen, &third];

        let mut account = Account::default();
        assert_eq!(account.on_all(events), Err(1));
        assert_eq!(account.balance, 10);
    }

    #[test]
    fn folding_is_deterministic() {
        let events = [deposit(1, 10), deposit(2, -3)];

        let mut a = Account::default();
        let mut b = Account::default();
        for event in &events {
            assert!(a.on(event));
            assert!(b.on(event));
        }
        assert_eq!(a, b);
    }
}
