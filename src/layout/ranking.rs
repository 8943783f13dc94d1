use std::cmp::{Ordering, Reverse};
use std::collections::{BinaryHeap, HashMap, HashSet};

/// Longest-path ranks over `node_ids`; cycles are broken at the earliest
/// declared remaining node.
pub(super) fn compute_ranks(node_ids: &[String], edges: &[(String, String)]) -> HashMap<String, usize> {
    let order_key: HashMap<&str, usize> = node_ids
        .iter()
        .enumerate()
        .map(|(idx, id)| (id.as_str(), idx))
        .collect();
    let key = |id: &str| order_key.get(id).copied().unwrap_or(usize::MAX);

    let mut adj: HashMap<&str, Vec<&str>> = HashMap::new();
    let mut indeg: HashMap<&str, usize> = node_ids.iter().map(|id| (id.as_str(), 0)).collect();
    for (from, to) in edges {
        if !order_key.contains_key(from.as_str()) || !order_key.contains_key(to.as_str()) {
            continue;
        }
        adj.entry(from.as_str()).or_default().push(to.as_str());
        if let Some(deg) = indeg.get_mut(to.as_str()) {
            *deg += 1;
        }
    }

    let mut ready: BinaryHeap<Reverse<(usize, &str)>> = indeg
        .iter()
        .filter(|(_, deg)| **deg == 0)
        .map(|(id, _)| Reverse((key(*id), *id)))
        .collect();

    let mut order: Vec<&str> = Vec::with_capacity(node_ids.len());
    let mut processed: HashSet<&str> = HashSet::new();
    loop {
        while let Some(Reverse((_, id))) = ready.pop() {
            if !processed.insert(id) {
                continue;
            }
            order.push(id);
            for next in adj.get(id).into_iter().flatten() {
                if processed.contains(next) {
                    continue;
                }
                if let Some(deg) = indeg.get_mut(next) {
                    *deg = deg.saturating_sub(1);
                    if *deg == 0 {
                        ready.push(Reverse((key(*next), *next)));
                    }
                }
            }
        }
        if processed.len() >= node_ids.len() {
            break;
        }
        let next = node_ids
            .iter()
            .map(String::as_str)
            .find(|id| !processed.contains(id));
        match next {
            Some(id) => ready.push(Reverse((key(id), id))),
            None => break,
        }
    }

    let position: HashMap<&str, usize> = order.iter().enumerate().map(|(idx, id)| (*id, idx)).collect();
    let mut ranks: HashMap<String, usize> = HashMap::new();
    for id in &order {
        let rank = *ranks.entry(id.to_string()).or_insert(0);
        let from_idx = position[id];
        for next in adj.get(id).into_iter().flatten() {
            // Edges pointing back in topological order are cycle back-edges.
            if position.get(next).copied().unwrap_or(from_idx) <= from_idx {
                continue;
            }
            let entry = ranks.entry(next.to_string()).or_insert(0);
            *entry = (*entry).max(rank + 1);
        }
    }
    ranks
}

/// Reorders each rank by the median position of its neighbours in the
/// adjacent rank, sweeping down then up `passes` times.
pub(super) fn order_ranks(rank_nodes: &mut [Vec<String>], edges: &[(String, String)], passes: usize) {
    if rank_nodes.len() <= 1 {
        return;
    }
    let mut incoming: HashMap<String, Vec<String>> = HashMap::new();
    let mut outgoing: HashMap<String, Vec<String>> = HashMap::new();
    for (from, to) in edges {
        outgoing.entry(from.clone()).or_default().push(to.clone());
        incoming.entry(to.clone()).or_default().push(from.clone());
    }

    let mut positions = bucket_positions(rank_nodes);
    for _ in 0..passes.max(1) {
        for rank in 1..rank_nodes.len() {
            if rank_nodes[rank].len() > 1 {
                sort_bucket(&mut rank_nodes[rank], &incoming, &positions);
                positions = bucket_positions(rank_nodes);
            }
        }
        for rank in (0..rank_nodes.len() - 1).rev() {
            if rank_nodes[rank].len() > 1 {
                sort_bucket(&mut rank_nodes[rank], &outgoing, &positions);
                positions = bucket_positions(rank_nodes);
            }
        }
    }
}

fn bucket_positions(rank_nodes: &[Vec<String>]) -> HashMap<String, usize> {
    rank_nodes
        .iter()
        .flat_map(|bucket| bucket.iter().enumerate().map(|(idx, id)| (id.clone(), idx)))
        .collect()
}

fn sort_bucket(
    bucket: &mut [String],
    neighbors: &HashMap<String, Vec<String>>,
    positions: &HashMap<String, usize>,
) {
    let current: HashMap<String, usize> = bucket
        .iter()
        .enumerate()
        .map(|(idx, id)| (id.clone(), idx))
        .collect();
    bucket.sort_by(|a, b| {
        let a_score = median_position(a, neighbors, positions, &current);
        let b_score = median_position(b, neighbors, positions, &current);
        match a_score.partial_cmp(&b_score) {
            Some(Ordering::Equal) | None => current[a].cmp(&current[b]),
            Some(ordering) => ordering,
        }
    });
}

pub(super) fn median_position(
    node_id: &str,
    neighbors: &HashMap<String, Vec<String>>,
    positions: &HashMap<String, usize>,
    current: &HashMap<String, usize>,
) -> f32 {
    let own = current.get(node_id).copied().unwrap_or(0) as f32;
    let Some(list) = neighbors.get(node_id) else {
        return own;
    };
    let mut values: Vec<f32> = list
        .iter()
        .filter_map(|neighbor| positions.get(neighbor).map(|pos| *pos as f32))
        .collect();
    if values.is_empty() {
        return own;
    }
    values.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
    let mid = values.len() / 2;
    if values.len() % 2 == 1 {
        values[mid]
    } else {
        (values[mid - 1] + values[mid]) * 0.5
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn edges(list: &[(&str, &str)]) -> Vec<(String, String)> {
        list.iter().map(|(a, b)| (a.to_string(), b.to_string())).collect()
    }

    #[test]
    fn ranks_follow_longest_path() {
        let ranks = compute_ranks(
            &ids(&["a", "b", "c", "d"]),
            &edges(&[("a", "b"), ("b", "c"), ("a", "c"), ("d", "c")]),
        );
        assert_eq!(ranks["a"], 0);
        assert_eq!(ranks["b"], 1);
        assert_eq!(ranks["c"], 2);
        assert_eq!(ranks["d"], 0);
    }

    #[test]
    fn cycles_still_rank_every_node() {
        let ranks = compute_ranks(&ids(&["a", "b", "c"]), &edges(&[("a", "b"), ("b", "c"), ("c", "a")]));
        assert_eq!(ranks.len(), 3);
        assert_eq!(ranks["a"], 0);
        assert_eq!(ranks["c"], 2);
    }

    #[test]
    fn ordering_reduces_crossings() {
        // a->y, b->x: swapping the lower rank uncrosses the edges.
        let mut ranks = vec![ids(&["a", "b"]), ids(&["x", "y"])];
        order_ranks(&mut ranks, &edges(&[("a", "y"), ("b", "x")]), 2);
        let top_a = ranks[0].iter().position(|id| id == "a").unwrap();
        let bottom_y = ranks[1].iter().position(|id| id == "y").unwrap();
        assert_eq!(top_a, bottom_y);
    }
}
