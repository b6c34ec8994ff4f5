//! Prim's MST over a net's pins (§4.5.1, step 2).
//!
//! The distance matrix is the A* path *cost* between every pair of pins
//! (not Manhattan distance), so the tree picked already accounts for
//! obstacles and via cost. Ties are broken by lower pin index, matching a
//! conventional Prim implementation over a dense adjacency matrix.

/// Builds a minimum spanning tree over `n` nodes given a dense,
/// symmetric `n x n` cost matrix (`f64::INFINITY` for unreachable pairs).
/// Returns the tree's edges as `(from, to)` index pairs, `n - 1` of them
/// for a connected graph.
pub fn prim_mst(n: usize, dist: &[Vec<f64>]) -> Vec<(usize, usize)> {
    if n < 2 {
        return Vec::new();
    }

    let mut in_tree = vec![false; n];
    let mut best_cost = vec![f64::INFINITY; n];
    let mut best_from = vec![0usize; n];

    in_tree[0] = true;
    for j in 1..n {
        best_cost[j] = dist[0][j];
        best_from[j] = 0;
    }

    let mut edges = Vec::with_capacity(n - 1);

    for _ in 1..n {
        // Lowest-cost outside node, ties broken by lower index.
        let mut pick: Option<usize> = None;
        for j in 0..n {
            if in_tree[j] {
                continue;
            }
            if pick.is_none() || best_cost[j] < best_cost[pick.unwrap()] {
                pick = Some(j);
            }
        }
        let Some(next) = pick else { break };
        in_tree[next] = true;
        edges.push((best_from[next], next));

        for j in 0..n {
            if !in_tree[j] && dist[next][j] < best_cost[j] {
                best_cost[j] = dist[next][j];
                best_from[j] = next;
            }
        }
    }

    edges
}
