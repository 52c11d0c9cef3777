//! Weighted reciprocal rank fusion.

use std::collections::HashMap;

/// One ranked list and its weight.
#[derive(Debug, Clone, Copy)]
pub struct RankedList<'a> {
    pub positions: &'a [usize],
    pub weight: f32,
}

/// Fuse ranked lists of store positions.
///
/// Each list adds `weight / (k + rank + 1)` to every position it contains,
/// `rank` being 0-based. Result is best first; ties go to the earlier store
/// position.
#[must_use]
pub fn reciprocal_rank_fusion(lists: &[RankedList<'_>], k: f32, limit: usize) -> Vec<(usize, f32)> {
    let mut totals: HashMap<usize, f32> = HashMap::new();
    for list in lists {
        for (rank, position) in list.positions.iter().enumerate() {
            #[allow(clippy::cast_precision_loss)]
            let contribution = list.weight / (k + rank as f32 + 1.0);
            *totals.entry(*position).or_insert(0.0) += contribution;
        }
    }

    let mut fused: Vec<(usize, f32)> = totals.into_iter().collect();
    fused.sort_by(|a, b| {
        b.1.partial_cmp(&a.1)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.0.cmp(&b.0))
    });
    fused.truncate(limit);
    fused
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn document_in_both_lists_accumulates() {
        let dense = [4, 1];
        let lexical = [1, 9];
        let fused = reciprocal_rank_fusion(
            &[
                RankedList {
                    positions: &dense,
                    weight: 1.0,
                },
                RankedList {
                    positions: &lexical,
                    weight: 0.3,
                },
            ],
            60.0,
            10,
        );
        assert_eq!(fused[0].0, 1);
        let expected = 1.0 / 62.0 + 0.3 / 61.0;
        assert!((fused[0].1 - expected).abs() < 1e-6);
    }

    #[test]
    fn dense_rank_zero_beats_lexical_rank_zero() {
        let dense = [2];
        let lexical = [7];
        let fused = reciprocal_rank_fusion(
            &[
                RankedList {
                    positions: &dense,
                    weight: 1.0,
                },
                RankedList {
                    positions: &lexical,
                    weight: 0.3,
                },
            ],
            60.0,
            10,
        );
        assert_eq!(fused[0].0, 2);
        assert_eq!(fused[1].0, 7);
    }

    #[test]
    fn ties_go_to_earlier_position() {
        let a = [8];
        let b = [3];
        let fused = reciprocal_rank_fusion(
            &[
                RankedList {
                    positions: &a,
                    weight: 1.0,
                },
                RankedList {
                    positions: &b,
                    weight: 1.0,
                },
            ],
            60.0,
            10,
        );
        assert_eq!(fused[0].0, 3);
    }

    #[test]
    fn limit_truncates() {
        let a = [0, 1, 2, 3];
        let fused = reciprocal_rank_fusion(
            &[RankedList {
                positions: &a,
                weight: 1.0,
            }],
            60.0,
            2,
        );
        assert_eq!(fused.len(), 2);
    }

    proptest! {
        #[test]
        fn presence_in_both_lists_never_lowers_score(
            dense_rank in 0usize..20,
            lexical_rank in 0usize..20,
        ) {
            let target = 1000;
            let mut dense: Vec<usize> = (0..20).collect();
            dense.insert(dense_rank, target);
            let mut lexical: Vec<usize> = (100..120).collect();
            lexical.insert(lexical_rank, target);

            let only_dense = reciprocal_rank_fusion(
                &[RankedList { positions: &dense, weight: 1.0 }],
                60.0,
                usize::MAX,
            );
            let both = reciprocal_rank_fusion(
                &[
                    RankedList { positions: &dense, weight: 1.0 },
                    RankedList { positions: &lexical, weight: 0.3 },
                ],
                60.0,
                usize::MAX,
            );
            let score = |list: &[(usize, f32)]| {
                list.iter().find(|(p, _)| *p == target).map(|(_, s)| *s).unwrap()
            };
            prop_assert!(score(&both) >= score(&only_dense));
        }
    }
}
