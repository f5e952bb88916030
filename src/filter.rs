use crate::sequence_record::SequenceRecord;
use std::ops::RangeInclusive;

/// Inclusive sequence length window.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LengthWindow {
    pub min: usize,
    pub max: usize,
}

impl LengthWindow {
    pub fn new(min: usize, max: usize) -> Self {
        Self { min, max }
    }

    #[inline(always)]
    pub fn contains(&self, length: usize) -> bool {
        self.min <= length && length <= self.max
    }

    pub fn as_range(&self) -> RangeInclusive<usize> {
        self.min..=self.max
    }
}

/// Records that passed the length window, in fetch order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ResultTable {
    rows: Vec<SequenceRecord>,
}

impl ResultTable {
    pub fn rows(&self) -> &[SequenceRecord] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Copy ordered by length, longest first. Ties keep fetch order.
    pub fn sorted_by_length_desc(&self) -> Vec<SequenceRecord> {
        let mut rows = self.rows.clone();
        rows.sort_by(|a, b| b.length.cmp(&a.length));
        rows
    }
}

impl From<Vec<SequenceRecord>> for ResultTable {
    fn from(rows: Vec<SequenceRecord>) -> Self {
        Self { rows }
    }
}

pub fn filter_records(records: &[SequenceRecord], window: LengthWindow) -> ResultTable {
    records
        .iter()
        .filter(|record| window.contains(record.length))
        .cloned()
        .collect::<Vec<_>>()
        .into()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn records(lengths: &[usize]) -> Vec<SequenceRecord> {
        lengths
            .iter()
            .enumerate()
            .map(|(idx, len)| SequenceRecord::new(&format!("ACC{idx}.1"), *len, "test"))
            .collect()
    }

    #[test]
    fn keeps_in_window_records_in_order() {
        let table = filter_records(&records(&[200, 1500, 800]), LengthWindow::new(100, 1000));
        let accessions: Vec<&str> = table.rows().iter().map(|r| r.accession.as_str()).collect();
        assert_eq!(accessions, vec!["ACC0.1", "ACC2.1"]);
    }

    #[test]
    fn bounds_are_inclusive() {
        let table = filter_records(&records(&[99, 100, 1000, 1001]), LengthWindow::new(100, 1000));
        let lengths: Vec<usize> = table.rows().iter().map(|r| r.length).collect();
        assert_eq!(lengths, vec![100, 1000]);
    }

    #[test]
    fn filtering_is_idempotent() {
        let window = LengthWindow::new(10, 500);
        let once = filter_records(&records(&[5, 10, 250, 500, 501, 42]), window);
        let twice = filter_records(once.rows(), window);
        assert_eq!(once, twice);
    }

    #[test]
    fn matches_exactly_window_members() {
        let input = records(&[0, 1, 7, 13, 64, 65, 300, 4096]);
        for (lo, hi) in [(0, 0), (1, 64), (13, 13), (65, 4096), (300, 7)] {
            let window = LengthWindow::new(lo, hi);
            let table = filter_records(&input, window);
            let expected: Vec<SequenceRecord> = input
                .iter()
                .filter(|r| window.as_range().contains(&r.length))
                .cloned()
                .collect();
            assert_eq!(table.rows(), expected.as_slice(), "window {lo}..={hi}");
        }
    }

    #[test]
    fn inverted_window_matches_nothing() {
        let table = filter_records(&records(&[50, 100]), LengthWindow::new(100, 50));
        assert!(table.is_empty());
    }

    #[test]
    fn sorted_copy_leaves_table_untouched() {
        let table = ResultTable::from(records(&[200, 800, 800, 50]));
        let sorted = table.sorted_by_length_desc();
        let order: Vec<&str> = sorted.iter().map(|r| r.accession.as_str()).collect();
        assert_eq!(order, vec!["ACC1.1", "ACC2.1", "ACC0.1", "ACC3.1"]);
        assert_eq!(table.rows()[0].length, 200);
    }
}
