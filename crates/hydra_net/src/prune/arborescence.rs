//! Maximum-weight spanning arborescence (Chu–Liu/Edmonds).
//!
//! Works on plain `usize` node indices so it can be tested independently of
//! [`NetworkGraph`](crate::graph::NetworkGraph).

/// A directed, weighted edge `from -> to`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) struct WeightedEdge {
    pub from: usize,
    pub to: usize,
    pub weight: i128,
}

/// Finds a maximum-weight arborescence rooted at `root`.
///
/// Returns, per node, the index into `edges` of the edge entering it
/// (`None` for the root), or `None` if some node cannot be reached. Among
/// equally heavy entering edges the one listed first is preferred.
pub(super) fn maximum_arborescence(
    node_count: usize,
    root: usize,
    edges: &[WeightedEdge],
) -> Option<Vec<Option<usize>>> {
    let mut best_in: Vec<Option<usize>> = vec![None; node_count];
    for (i, edge) in edges.iter().enumerate() {
        if edge.to == root || edge.from == edge.to {
            continue;
        }
        match best_in[edge.to] {
            Some(j) if edges[j].weight >= edge.weight => {}
            _ => best_in[edge.to] = Some(i),
        }
    }
    let mut entering = Vec::with_capacity(node_count);
    for (node, best) in best_in.iter().enumerate() {
        match best {
            Some(i) => entering.push(*i),
            None if node == root => entering.push(usize::MAX),
            None => return None,
        }
    }

    // Follow best entering edges backwards from every node; a walk that runs
    // into itself has found a cycle.
    let mut cycle_of: Vec<Option<usize>> = vec![None; node_count];
    let mut walk_of = vec![usize::MAX; node_count];
    let mut cycles = 0usize;
    for start in 0..node_count {
        let mut node = start;
        while node != root && walk_of[node] == usize::MAX {
            walk_of[node] = start;
            node = edges[entering[node]].from;
        }
        if node != root && walk_of[node] == start && cycle_of[node].is_none() {
            let mut member = node;
            loop {
                cycle_of[member] = Some(cycles);
                member = edges[entering[member]].from;
                if member == node {
                    break;
                }
            }
            cycles += 1;
        }
    }
    if cycles == 0 {
        return Some(best_in);
    }

    // Contract each cycle into one node and reweight the edges entering it
    // by what they would displace.
    let mut component = vec![0usize; node_count];
    let mut next_id = cycles;
    for node in 0..node_count {
        component[node] = match cycle_of[node] {
            Some(cycle) => cycle,
            None => {
                next_id += 1;
                next_id - 1
            }
        };
    }
    let mut contracted = Vec::new();
    let mut origin = Vec::new();
    for (i, edge) in edges.iter().enumerate() {
        let (from, to) = (component[edge.from], component[edge.to]);
        if from == to {
            continue;
        }
        let weight = match cycle_of[edge.to] {
            Some(_) => edge.weight - edges[entering[edge.to]].weight,
            None => edge.weight,
        };
        contracted.push(WeightedEdge { from, to, weight });
        origin.push(i);
    }

    let inner = maximum_arborescence(next_id, component[root], &contracted)?;

    let mut chosen: Vec<Option<usize>> = vec![None; node_count];
    for picked in inner.into_iter().flatten() {
        let original = origin[picked];
        chosen[edges[original].to] = Some(original);
    }
    for node in 0..node_count {
        if cycle_of[node].is_some() && chosen[node].is_none() {
            chosen[node] = best_in[node];
        }
    }
    Some(chosen)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn edge(from: usize, to: usize, weight: i128) -> WeightedEdge {
        WeightedEdge { from, to, weight }
    }

    fn total(edges: &[WeightedEdge], chosen: &[Option<usize>]) -> i128 {
        chosen.iter().flatten().map(|&i| edges[i].weight).sum()
    }

    #[test]
    fn picks_heaviest_parent_without_cycles() {
        let edges = [edge(0, 1, 5), edge(0, 2, 1), edge(1, 2, 7)];
        let chosen = maximum_arborescence(3, 0, &edges).unwrap();
        assert_eq!(chosen, vec![None, Some(0), Some(2)]);
    }

    #[test]
    fn breaks_cycle_at_cheapest_point() {
        // 1 and 2 prefer each other; the cycle must be entered from the root.
        let edges = [
            edge(0, 1, 3),
            edge(0, 2, 1),
            edge(1, 2, 10),
            edge(2, 1, 10),
        ];
        let chosen = maximum_arborescence(3, 0, &edges).unwrap();
        assert_eq!(chosen, vec![None, Some(0), Some(2)]);
        assert_eq!(total(&edges, &chosen), 13);
    }

    #[test]
    fn nested_cycles_resolve() {
        let edges = [
            edge(0, 1, 1),
            edge(1, 2, 8),
            edge(2, 3, 8),
            edge(3, 1, 8),
            edge(0, 3, 2),
            edge(3, 4, 5),
            edge(4, 3, 9),
        ];
        let chosen = maximum_arborescence(5, 0, &edges).unwrap();
        for (node, entry) in chosen.iter().enumerate() {
            assert_eq!(entry.is_none(), node == 0);
        }
        // best: 0->3 (2), 3->1 (8), 1->2 (8), 3->4 (5)
        assert_eq!(total(&edges, &chosen), 23);
    }

    #[test]
    fn ties_prefer_first_listed() {
        let edges = [edge(0, 1, 4), edge(0, 2, 4), edge(1, 3, 2), edge(2, 3, 2)];
        let chosen = maximum_arborescence(4, 0, &edges).unwrap();
        assert_eq!(chosen[3], Some(2));
    }

    #[test]
    fn unreachable_node_yields_none() {
        let edges = [edge(0, 1, 1)];
        assert!(maximum_arborescence(3, 0, &edges).is_none());
    }

    #[test]
    fn root_alone() {
        assert_eq!(maximum_arborescence(1, 0, &[]), Some(vec![None]));
    }
}
