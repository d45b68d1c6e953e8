//! Reciprocal Rank Fusion — merging multiple ranked result lists.

use std::collections::HashMap;
use std::hash::Hash;

/// Merge ranked lists with Reciprocal Rank Fusion.
///
/// Each list contributes `1 / (k + rank)` per item, with ranks 1-indexed;
/// contributions are summed per item across lists. The merged order sorts
/// by summed score descending, breaking ties by first-seen order (a stable
/// sort over the accumulation order). The constant k (standard value 60)
/// controls how much low-ranked items still count.
pub fn reciprocal_rank_fusion<T>(lists: &[Vec<T>], k: u32) -> Vec<(T, f32)>
where
    T: Eq + Hash + Clone,
{
    let k = k as f32;

    // Accumulate in first-seen order so the later sort is a stable tie-break
    let mut order: Vec<T> = Vec::new();
    let mut scores: HashMap<T, f32> = HashMap::new();

    for list in lists {
        for (rank, item) in list.iter().enumerate() {
            let contribution = 1.0 / (k + rank as f32 + 1.0);
            match scores.get_mut(item) {
                Some(score) => *score += contribution,
                None => {
                    scores.insert(item.clone(), contribution);
                    order.push(item.clone());
                }
            }
        }
    }

    let mut merged: Vec<(T, f32)> = order
        .into_iter()
        .map(|item| {
            let score = scores[&item];
            (item, score)
        })
        .collect();
    merged.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
    merged
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_lists_keep_order_with_known_scores() {
        // Two lists [A, C, B] at k=60:
        //   A: 2/61 ≈ 0.03279, C: 2/62 ≈ 0.03226, B: 2/63 ≈ 0.03175
        let lists = vec![
            vec!["docA", "docC", "docB"],
            vec!["docA", "docC", "docB"],
        ];
        let merged = reciprocal_rank_fusion(&lists, 60);

        assert_eq!(merged[0].0, "docA");
        assert_eq!(merged[1].0, "docC");
        assert_eq!(merged[2].0, "docB");
        assert!((merged[0].1 - 0.03279).abs() < 1e-4, "{}", merged[0].1);
        assert!((merged[1].1 - 0.03226).abs() < 1e-4, "{}", merged[1].1);
        assert!((merged[2].1 - 0.03175).abs() < 1e-4, "{}", merged[2].1);
    }

    #[test]
    fn first_in_both_beats_second_in_both() {
        let lists = vec![vec![1usize, 2], vec![1usize, 2]];
        let merged = reciprocal_rank_fusion(&lists, 60);
        assert_eq!(merged[0].0, 1);
        assert!(merged[0].1 > merged[1].1);
    }

    #[test]
    fn agreement_across_lists_sums() {
        let lists = vec![vec!["a", "b", "c"], vec!["b", "d", "a"]];
        let merged = reciprocal_rank_fusion(&lists, 60);
        // b: rank 2 + rank 1, a: rank 1 + rank 3 → b wins
        assert_eq!(merged[0].0, "b");
        assert_eq!(merged[1].0, "a");
    }

    #[test]
    fn items_deduplicate() {
        let list = vec!["x", "y"];
        let merged = reciprocal_rank_fusion(&[list.clone(), list], 60);
        assert_eq!(merged.len(), 2);
    }

    #[test]
    fn empty_lists_merge_empty() {
        let merged: Vec<(u32, f32)> = reciprocal_rank_fusion(&[vec![], vec![]], 60);
        assert!(merged.is_empty());
        let merged: Vec<(u32, f32)> = reciprocal_rank_fusion(&[], 60);
        assert!(merged.is_empty());
    }

    #[test]
    fn single_list_preserves_its_order() {
        let merged = reciprocal_rank_fusion(&[vec!["a", "b", "c"]], 60);
        let items: Vec<_> = merged.iter().map(|(i, _)| *i).collect();
        assert_eq!(items, vec!["a", "b", "c"]);
    }

    #[test]
    fn ties_break_by_first_seen_order() {
        // a appears only in list 1 at rank 1; b appears only in list 2 at
        // rank 1 — identical scores, a was seen first.
        let lists = vec![vec!["a"], vec!["b"]];
        let merged = reciprocal_rank_fusion(&lists, 60);
        assert_eq!(merged[0].0, "a");
        assert_eq!(merged[1].0, "b");
        assert!((merged[0].1 - merged[1].1).abs() < f32::EPSILON);
    }
}
