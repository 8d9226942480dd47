#[derive(Debug, Default)]
pub struct Stats {
    n_roster_members: i32,
    n_statement_rows: i32,
    n_failed_fetches: i32,
}

impl Stats {
    pub fn inc_members(&mut self) {
        self.n_roster_members += 1;
    }

    pub fn add_statement_rows(&mut self, rows: usize) {
        let rows = i32::try_from(rows).unwrap_or(i32::MAX);
        self.n_statement_rows = self.n_statement_rows.saturating_add(rows);
    }

    pub fn inc_failed_fetches(&mut self) {
        self.n_failed_fetches += 1;
    }

    pub fn pretty_print(&self) {
        println!("{self:#?}");
        println!();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_counter_saturates() {
        let mut stats = Stats::default();
        stats.inc_members();
        stats.add_statement_rows(3);
        stats.add_statement_rows(usize::MAX);

        assert_eq!(stats.n_roster_members, 1);
        assert_eq!(stats.n_statement_rows, i32::MAX);
    }
}
