use super::ExtentStore;
use crate::models::file_record::FileRecord;
use std::cmp::Ordering;

/// Extent count descending, then size descending, then path.
fn by_extent_count(a: &FileRecord, b: &FileRecord) -> Ordering {
    b.extent_count.cmp(&a.extent_count)
        .then(b.size.cmp(&a.size))
        .then_with(|| a.path.cmp(&b.path))
}

/// Size descending, then extent count descending, then path.
fn by_size(a: &FileRecord, b: &FileRecord) -> Ordering {
    b.size.cmp(&a.size)
        .then(b.extent_count.cmp(&a.extent_count))
        .then_with(|| a.path.cmp(&b.path))
}

impl ExtentStore {
    /// The `k` most fragmented files, most fragmented first.
    pub fn top_by_extent_count(&self, k: usize) -> Vec<FileRecord> {
        self.top_by(k, by_extent_count)
    }

    /// The `k` largest files, largest first.
    pub fn top_by_size(&self, k: usize) -> Vec<FileRecord> {
        self.top_by(k, by_size)
    }

    // Partition a scratch id list so the k best come first, then sort only
    // those: O(n + k log k). The record arena keeps its insertion order.
    fn top_by(&self, k: usize, cmp: fn(&FileRecord, &FileRecord) -> Ordering) -> Vec<FileRecord> {
        let k = k.min(self.records.len());
        if k == 0 {
            return Vec::new();
        }

        let records = &self.records;
        let mut ids: Vec<usize> = (0..records.len()).collect();
        if k < ids.len() {
            ids.select_nth_unstable_by(k - 1, |&a, &b| cmp(&records[a], &records[b]));
            ids.truncate(k);
        }
        ids.sort_unstable_by(|&a, &b| cmp(&records[a], &records[b]));

        ids.into_iter().map(|id| records[id].clone()).collect()
    }
}

#[cfg(test)]
mod tests {
    use crate::store::tests::{record, store_of};

    #[test]
    fn most_fragmented_wins() {
        let store = store_of(vec![
            record("/a", 1000, &[(0, 1)]),
            record("/b", 500, &[(2, 3), (5, 6), (8, 9)]),
        ]);
        let top = store.top_by_extent_count(1);
        assert_eq!(top.len(), 1);
        assert_eq!(top[0].path, "/b");
    }

    #[test]
    fn extent_count_ties_break_on_size() {
        let store = store_of(vec![
            record("/small", 10, &[(0, 1), (3, 4)]),
            record("/big", 90, &[(6, 7), (9, 10)]),
            record("/single", 5000, &[(20, 30)]),
        ]);
        let top: Vec<_> = store.top_by_extent_count(3).into_iter().map(|r| r.path).collect();
        assert_eq!(top, ["/big", "/small", "/single"]);
    }

    #[test]
    fn size_ties_break_on_extent_count() {
        let store = store_of(vec![
            record("/one", 100, &[(0, 1)]),
            record("/two", 100, &[(3, 4), (6, 7)]),
            record("/huge", 1 << 30, &[(10, 20)]),
        ]);
        let top: Vec<_> = store.top_by_size(3).into_iter().map(|r| r.path).collect();
        assert_eq!(top, ["/huge", "/two", "/one"]);
    }

    #[test]
    fn k_is_clamped() {
        let store = store_of(vec![record("/a", 1, &[(0, 1)]), record("/b", 2, &[(2, 3)])]);
        assert_eq!(store.top_by_size(20).len(), 2);
        assert!(store.top_by_size(0).is_empty());
        assert!(store_of(Vec::new()).top_by_extent_count(5).is_empty());
    }

    #[test]
    fn partial_selection_matches_full_sort() {
        let records: Vec<_> = (0..200u64)
            .map(|i| {
                let n = (i * 37 % 11) as usize + 1;
                let extents: Vec<(u64, u64)> =
                    (0..n as u64).map(|j| (i * 1000 + j * 3, i * 1000 + j * 3 + 1)).collect();
                record(&format!("/f{i:03}"), i * 7919 % 503, &extents)
            })
            .collect();
        let store = store_of(records.clone());

        let mut expected = records;
        expected.sort_by(|a, b| {
            b.extent_count.cmp(&a.extent_count)
                .then(b.size.cmp(&a.size))
                .then_with(|| a.path.cmp(&b.path))
        });
        expected.truncate(20);

        assert_eq!(store.top_by_extent_count(20), expected);
        // Canonical order untouched.
        assert_eq!(store.lookup_by_id(0).unwrap().path, "/f000");
    }
}
