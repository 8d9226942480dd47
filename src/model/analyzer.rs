use crate::model::{Dataset, Series, UahAmount};
use chrono::{NaiveDate, Timelike as _};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Group key for [`Analyzer::sum_by_source`]: the transaction description, plus the owner name
/// for tagged datasets so that two members spending at the same place stay separate.
#[derive(Clone, Debug, Eq, Ord, PartialEq, PartialOrd)]
pub struct SourceKey {
    pub source: String,
    pub name: Option<Arc<str>>,
}

impl fmt::Display for SourceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.name {
            Some(name) => write!(f, "{} ({name})", self.source),
            None => f.write_str(&self.source),
        }
    }
}

/// Hour of day in UTC, `0..=23`.
#[derive(Clone, Copy, Debug, Eq, Ord, PartialEq, PartialOrd)]
pub struct Hour(pub u32);

impl fmt::Display for Hour {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:00", self.0)
    }
}

/// Group key for [`Analyzer::sum_by_user_and_date`]. Field order makes the derived ordering
/// day-major, then name.
#[derive(Clone, Debug, Eq, Ord, PartialEq, PartialOrd)]
pub struct UserDay {
    pub day: NaiveDate,
    pub name: Arc<str>,
}

impl fmt::Display for UserDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.day, self.name)
    }
}

/// Aggregated spending views over a dataset.
///
/// Every view is an exact decimal sum. The single-key views each conserve the dataset's amount
/// total: summing any view's points reproduces [`Dataset::total_amount`].
pub struct Analyzer<'a> {
    dataset: &'a Dataset,
}

impl<'a> Analyzer<'a> {
    pub fn new(dataset: &'a Dataset) -> Self {
        Self { dataset }
    }

    /// Sum amounts per source, and per owner for tagged datasets.
    ///
    /// Points are ordered by absolute total, descending, so the heaviest categories come first.
    /// Ties break lexicographically on the key.
    pub fn sum_by_source(&self) -> Series<SourceKey> {
        let mut groups: BTreeMap<SourceKey, UahAmount> = BTreeMap::new();
        for row in self.dataset {
            let key = SourceKey {
                source: row.source.clone(),
                name: row.name.clone(),
            };
            *groups.entry(key).or_default() += row.amount;
        }

        let mut points: Vec<_> = groups.into_iter().collect();
        points.sort_by(|(key_a, total_a), (key_b, total_b)| {
            total_b
                .abs()
                .cmp(&total_a.abs())
                .then_with(|| key_a.cmp(key_b))
        });

        Series::new(points)
    }

    /// Sum amounts per UTC calendar day, ascending by day.
    ///
    /// Each transaction time truncates to its UTC midnight; a transaction at `00:00:00` belongs
    /// to the day it starts.
    pub fn spending_by_day(&self) -> Series<NaiveDate> {
        let mut groups: BTreeMap<NaiveDate, UahAmount> = BTreeMap::new();
        for row in self.dataset {
            *groups.entry(row.time.date_naive()).or_default() += row.amount;
        }

        Series::new(groups.into_iter().collect())
    }

    /// Sum amounts per hour of day in UTC, ascending by hour.
    pub fn sum_by_hour(&self) -> Series<Hour> {
        let mut groups: BTreeMap<Hour, UahAmount> = BTreeMap::new();
        for row in self.dataset {
            *groups.entry(Hour(row.time.hour())).or_default() += row.amount;
        }

        Series::new(groups.into_iter().collect())
    }

    /// Sum amounts per family member per UTC calendar day, ascending by day and then by name.
    ///
    /// # Panics
    ///
    /// The dataset must be tagged; calling this view on untagged rows is a programmer error.
    pub fn sum_by_user_and_date(&self) -> Series<UserDay> {
        let mut groups: BTreeMap<UserDay, UahAmount> = BTreeMap::new();
        for row in self.dataset {
            let name = row.name.clone().expect("dataset must be tagged");
            let key = UserDay {
                day: row.time.date_naive(),
                name,
            };
            *groups.entry(key).or_default() += row.amount;
        }

        Series::new(groups.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Transaction;
    use chrono::DateTime;
    use monoda::personal::Statement;

    fn row(source: &str, minor: i64, secs: i64, name: Option<&str>) -> Transaction {
        Transaction {
            source: source.to_string(),
            amount: UahAmount::from_minor(minor),
            time: DateTime::from_timestamp(secs, 0).unwrap(),
            balance: UahAmount::ZERO,
            name: name.map(Arc::from),
        }
    }

    fn source_key(source: &str, name: Option<&str>) -> SourceKey {
        SourceKey {
            source: source.to_string(),
            name: name.map(Arc::from),
        }
    }

    fn day(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    fn statement(json: &str) -> Statement {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_sum_by_source_single_purchase() {
        let dataset = Dataset::from_raw(vec![row("Coffee", -4500, 1_700_000_000, None)], false);
        let series = Analyzer::new(&dataset).sum_by_source();

        assert_eq!(
            series.points(),
            [(source_key("Coffee", None), UahAmount::from_minor(-4500))]
        );
        assert_eq!(series.points()[0].1.to_string(), "-45.00");
    }

    #[test]
    fn test_sum_by_source_groups_repeat_purchases() {
        let dataset = Dataset::from_raw(
            vec![
                row("Coffee", -4500, 1_700_000_000, None),
                row("Grocery", -30000, 1_700_001_000, None),
                row("Coffee", -4500, 1_700_002_000, None),
            ],
            false,
        );
        let series = Analyzer::new(&dataset).sum_by_source();

        assert_eq!(
            series.points(),
            [
                (source_key("Grocery", None), UahAmount::from_minor(-30000)),
                (source_key("Coffee", None), UahAmount::from_minor(-9000)),
            ]
        );
    }

    #[test]
    fn test_sum_by_source_splits_owners() {
        // Both family members buy "Food"; the bigger spender sorts first.
        let dataset = Dataset::from_raw(
            vec![
                row("Food", -3000, 1_700_000_000, Some("alice")),
                row("Food", -4500, 1_700_001_000, Some("bob")),
            ],
            true,
        );
        let series = Analyzer::new(&dataset).sum_by_source();

        assert_eq!(
            series.points(),
            [
                (source_key("Food", Some("bob")), UahAmount::from_minor(-4500)),
                (source_key("Food", Some("alice")), UahAmount::from_minor(-3000)),
            ]
        );
        assert_eq!(series.points()[0].0.to_string(), "Food (bob)");
        assert_eq!(series.points()[1].0.to_string(), "Food (alice)");
    }

    #[test]
    fn test_sum_by_source_over_combined_statements() {
        // The full pipeline path: normalize each member's statement, tag it, combine, analyze.
        let alice = Dataset::from_statement(&statement(
            r#"[{"description": "Food", "amount": -1000, "time": 1700000000, "balance": 50000}]"#,
        ))
        .tag("alice");
        let bob = Dataset::from_statement(&statement(
            r#"[{"description": "Food", "amount": -2000, "time": 1700000100, "balance": 70000}]"#,
        ))
        .tag("bob");

        let joint = Dataset::concat([alice, bob]).unwrap();
        let series = Analyzer::new(&joint).sum_by_source();

        assert_eq!(
            series.points(),
            [
                (source_key("Food", Some("bob")), UahAmount::from_minor(-2000)),
                (source_key("Food", Some("alice")), UahAmount::from_minor(-1000)),
            ]
        );
        assert_eq!(series.points()[0].1.to_string(), "-20.00");
        assert_eq!(series.points()[1].1.to_string(), "-10.00");
    }

    #[test]
    fn test_concat_adds_per_key_sums() {
        let first = Dataset::from_statement(&statement(
            r#"[
                {"description": "Coffee", "amount": -1000, "time": 1700000000, "balance": 90000},
                {"description": "Grocery", "amount": -5000, "time": 1700000100, "balance": 85000}
            ]"#,
        ));
        let second = Dataset::from_statement(&statement(
            r#"[{"description": "Coffee", "amount": -2500, "time": 1700000200, "balance": 82500}]"#,
        ));

        let first_series = Analyzer::new(&first).sum_by_source();
        let second_series = Analyzer::new(&second).sum_by_source();

        let joint = Dataset::concat([first.clone(), second.clone()]).unwrap();
        let combined = Analyzer::new(&joint).sum_by_source();

        assert_eq!(joint.len(), first.len() + second.len());
        assert_eq!(
            combined.points(),
            [
                (source_key("Grocery", None), UahAmount::from_minor(-5000)),
                (source_key("Coffee", None), UahAmount::from_minor(-3500)),
            ]
        );

        // Every combined key's total is the sum of that key's totals across the parts.
        for (key, total) in combined.points() {
            let expected: UahAmount = [&first_series, &second_series]
                .iter()
                .flat_map(|part| part.points())
                .filter(|(k, _)| k == key)
                .map(|(_, amount)| *amount)
                .sum();

            assert_eq!(*total, expected);
        }
    }

    #[test]
    fn test_sum_by_source_tie_breaks_lexicographically() {
        let dataset = Dataset::from_raw(
            vec![
                row("Bakery", -2000, 1_700_000_000, None),
                row("Apples", -2000, 1_700_001_000, None),
            ],
            false,
        );
        let series = Analyzer::new(&dataset).sum_by_source();

        assert_eq!(
            series.points(),
            [
                (source_key("Apples", None), UahAmount::from_minor(-2000)),
                (source_key("Bakery", None), UahAmount::from_minor(-2000)),
            ]
        );
    }

    #[test]
    fn test_sum_by_source_orders_by_magnitude_not_sign() {
        let dataset = Dataset::from_raw(
            vec![
                row("Coffee", -4500, 1_700_000_000, None),
                row("Salary", 5000, 1_700_001_000, None),
            ],
            false,
        );
        let series = Analyzer::new(&dataset).sum_by_source();

        assert_eq!(series.points()[0].0, source_key("Salary", None));
        assert_eq!(series.points()[1].0, source_key("Coffee", None));
    }

    #[test]
    fn test_spending_by_day_groups_same_day() {
        let dataset = Dataset::from_raw(
            vec![
                row("Coffee", -1000, 1_700_000_000, None),
                row("Grocery", -2500, 1_700_001_000, None),
            ],
            false,
        );
        let series = Analyzer::new(&dataset).spending_by_day();

        assert_eq!(
            series.points(),
            [(day(2023, 11, 14), UahAmount::from_minor(-3500))]
        );
        assert_eq!(series.points()[0].1.to_string(), "-35.00");
    }

    #[test]
    fn test_spending_by_day_splits_across_midnight() {
        // 1700000000 is 2023-11-14T22:13:20Z and 1700006400 is 2023-11-15T00:00:00Z exactly;
        // a midnight transaction belongs to the day it starts.
        let dataset = Dataset::from_raw(
            vec![
                row("Coffee", -4500, 1_700_000_000, None),
                row("Taxi", -12000, 1_700_006_400, None),
            ],
            false,
        );
        let series = Analyzer::new(&dataset).spending_by_day();

        assert_eq!(
            series.points(),
            [
                (day(2023, 11, 14), UahAmount::from_minor(-4500)),
                (day(2023, 11, 15), UahAmount::from_minor(-12000)),
            ]
        );
    }

    #[test]
    fn test_sum_by_hour() {
        let dataset = Dataset::from_raw(
            vec![
                row("Coffee", -4500, 1_700_000_000, None),
                row("Taxi", -12000, 1_700_006_400, None),
                row("Lunch", -8000, 1_700_000_060, None),
            ],
            false,
        );
        let series = Analyzer::new(&dataset).sum_by_hour();

        assert_eq!(
            series.points(),
            [
                (Hour(0), UahAmount::from_minor(-12000)),
                (Hour(22), UahAmount::from_minor(-12500)),
            ]
        );
        assert_eq!(series.points()[0].0.to_string(), "00:00");
        assert_eq!(series.points()[1].0.to_string(), "22:00");
    }

    #[test]
    fn test_sum_by_user_and_date() {
        let dataset = Dataset::from_raw(
            vec![
                row("Taxi", -12000, 1_700_006_400, Some("roman")),
                row("Coffee", -4500, 1_700_000_000, Some("roman")),
                row("Grocery", -30000, 1_700_000_100, Some("olena")),
            ],
            true,
        );
        let series = Analyzer::new(&dataset).sum_by_user_and_date();

        // Day-major ordering, then name within a day.
        assert_eq!(
            series.points(),
            [
                (
                    UserDay {
                        day: day(2023, 11, 14),
                        name: Arc::from("olena"),
                    },
                    UahAmount::from_minor(-30000),
                ),
                (
                    UserDay {
                        day: day(2023, 11, 14),
                        name: Arc::from("roman"),
                    },
                    UahAmount::from_minor(-4500),
                ),
                (
                    UserDay {
                        day: day(2023, 11, 15),
                        name: Arc::from("roman"),
                    },
                    UahAmount::from_minor(-12000),
                ),
            ]
        );
        assert_eq!(series.points()[0].0.to_string(), "2023-11-14 olena");
    }

    #[test]
    #[should_panic(expected = "dataset must be tagged")]
    fn test_sum_by_user_and_date_requires_tags() {
        let dataset = Dataset::from_raw(vec![row("Coffee", -4500, 1_700_000_000, None)], false);

        let _ = Analyzer::new(&dataset).sum_by_user_and_date();
    }

    #[test]
    fn test_empty_dataset_views() {
        let dataset = Dataset::from_raw(Vec::new(), false);
        let analyzer = Analyzer::new(&dataset);

        assert!(analyzer.sum_by_source().is_empty());
        assert!(analyzer.spending_by_day().is_empty());
        assert!(analyzer.sum_by_hour().is_empty());
    }

    #[test]
    fn test_views_conserve_total() {
        let dataset = Dataset::from_raw(
            vec![
                row("Coffee", -4500, 1_700_000_000, Some("roman")),
                row("Taxi", -12000, 1_700_006_400, Some("roman")),
                row("Salary", 1_000_000, 1_700_050_000, Some("olena")),
                row("Coffee", -4500, 1_700_100_000, Some("olena")),
            ],
            true,
        );
        let analyzer = Analyzer::new(&dataset);
        let total = dataset.total_amount();

        assert_eq!(analyzer.sum_by_source().total(), total);
        assert_eq!(analyzer.spending_by_day().total(), total);
        assert_eq!(analyzer.sum_by_hour().total(), total);
        assert_eq!(analyzer.sum_by_user_and_date().total(), total);
    }

    #[test]
    fn prop_views_conserve_total() {
        arbtest::arbtest(|u| {
            let spends: Vec<(i16, u32, u8)> = u.arbitrary()?;
            let rows = spends
                .into_iter()
                .map(|(minor, offset, pick)| {
                    let name = ["roman", "olena", "dracula"][usize::from(pick) % 3];
                    let secs = 1_700_000_000 + i64::from(offset % 2_592_000);

                    row("Shop", i64::from(minor), secs, Some(name))
                })
                .collect();
            let dataset = Dataset::from_raw(rows, true);
            let analyzer = Analyzer::new(&dataset);
            let total = dataset.total_amount();

            assert_eq!(analyzer.sum_by_source().total(), total);
            assert_eq!(analyzer.spending_by_day().total(), total);
            assert_eq!(analyzer.sum_by_hour().total(), total);
            assert_eq!(analyzer.sum_by_user_and_date().total(), total);

            // Ordering invariants.
            let by_magnitude = analyzer.sum_by_source();
            for pair in by_magnitude.points().windows(2) {
                assert!(pair[0].1.abs() >= pair[1].1.abs());
            }
            for pair in analyzer.spending_by_day().points().windows(2) {
                assert!(pair[0].0 < pair[1].0);
            }
            for pair in analyzer.sum_by_hour().points().windows(2) {
                assert!(pair[0].0 < pair[1].0);
            }
            for pair in analyzer.sum_by_user_and_date().points().windows(2) {
                assert!(pair[0].0 < pair[1].0);
            }

            Ok(())
        });
    }
}
