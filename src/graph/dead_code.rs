//! Reachability sweep for unused-function detection.

/// Mark every node reachable from `seeds` along `adj`.
pub fn reachable(adj: &[Vec<usize>], seeds: impl IntoIterator<Item = usize>) -> Vec<bool> {
    let mut seen = vec![false; adj.len()];
    let mut pending: Vec<usize> = Vec::new();

    for seed in seeds {
        if !seen[seed] {
            seen[seed] = true;
            pending.push(seed);
        }
    }

    while let Some(v) = pending.pop() {
        for &w in &adj[v] {
            if !seen[w] {
                seen[w] = true;
                pending.push(w);
            }
        }
    }
    seen
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reachability_from_seed() {
        // 0 -> 1 -> 2, 3 isolated
        let adj = vec![vec![1], vec![2], vec![], vec![]];
        assert_eq!(reachable(&adj, [0]), vec![true, true, true, false]);
    }

    #[test]
    fn test_cycles_terminate() {
        let adj = vec![vec![1], vec![0], vec![2]];
        assert_eq!(reachable(&adj, [1]), vec![true, true, false]);
    }

    #[test]
    fn test_no_seeds() {
        let adj = vec![vec![1], vec![]];
        assert_eq!(reachable(&adj, []), vec![false, false]);
    }
}
