//! Recursion detection with an iterative Tarjan SCC.

/// Strongly connected components of `adj`, in the order their roots finish.
///
/// Uses an explicit call stack instead of recursion so deep call chains
/// cannot overflow the thread stack.
pub fn strongly_connected_components(adj: &[Vec<usize>]) -> Vec<Vec<usize>> {
    let n = adj.len();
    let mut index: Vec<Option<usize>> = vec![None; n];
    let mut lowlink = vec![0usize; n];
    let mut on_stack = vec![false; n];
    let mut stack: Vec<usize> = Vec::new();
    let mut next_index = 0usize;
    let mut components = Vec::new();

    // (node, position of the next edge to explore)
    let mut frames: Vec<(usize, usize)> = Vec::new();

    for root in 0..n {
        if index[root].is_some() {
            continue;
        }

        index[root] = Some(next_index);
        lowlink[root] = next_index;
        next_index += 1;
        stack.push(root);
        on_stack[root] = true;
        frames.push((root, 0));

        while let Some(frame) = frames.last_mut() {
            let v = frame.0;
            if frame.1 < adj[v].len() {
                let w = adj[v][frame.1];
                frame.1 += 1;
                match index[w] {
                    None => {
                        index[w] = Some(next_index);
                        lowlink[w] = next_index;
                        next_index += 1;
                        stack.push(w);
                        on_stack[w] = true;
                        frames.push((w, 0));
                    }
                    Some(w_index) if on_stack[w] => {
                        lowlink[v] = lowlink[v].min(w_index);
                    }
                    Some(_) => {}
                }
                continue;
            }

            frames.pop();
            if let Some(&(parent, _)) = frames.last() {
                lowlink[parent] = lowlink[parent].min(lowlink[v]);
            }

            if index[v] == Some(lowlink[v]) {
                let mut component = Vec::new();
                while let Some(w) = stack.pop() {
                    on_stack[w] = false;
                    component.push(w);
                    if w == v {
                        break;
                    }
                }
                components.push(component);
            }
        }
    }

    components
}

/// Per-node recursion flags: members of multi-node SCCs and self-loops.
pub fn recursive_nodes(adj: &[Vec<usize>]) -> Vec<bool> {
    let mut recursive: Vec<bool> = adj
        .iter()
        .enumerate()
        .map(|(v, edges)| edges.contains(&v))
        .collect();

    for component in strongly_connected_components(adj) {
        if component.len() > 1 {
            for v in component {
                recursive[v] = true;
            }
        }
    }
    recursive
}
