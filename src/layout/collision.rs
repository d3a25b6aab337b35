use super::graph::Node;

/// Removes vertical overlap within one column.
///
/// `column` is re-sorted by `y` in place. Nodes are pushed down to keep
/// `padding` between neighbours; if the last node then overflows `height`
/// it is pulled back up and the sweep runs upwards. Relative order is kept.
pub fn resolve_collisions(nodes: &mut [Node], column: &mut [usize], height: f64, padding: f64) {
    column.sort_by(|&a, &b| nodes[a].y.total_cmp(&nodes[b].y));

    let mut y0 = 0.0;
    for &idx in column.iter() {
        let node = &mut nodes[idx];
        let dy = y0 - node.y;
        if dy > 0.0 {
            node.y += dy;
        }
        y0 = node.y + node.dy + padding;
    }

    let Some(&last) = column.last() else {
        return;
    };
    let overflow = y0 - padding - height;
    if overflow <= 0.0 {
        return;
    }
    nodes[last].y -= overflow;
    let mut y0 = nodes[last].y;
    for &idx in column.iter().rev().skip(1) {
        let node = &mut nodes[idx];
        let dy = node.y + node.dy + padding - y0;
        if dy > 0.0 {
            node.y -= dy;
        }
        y0 = node.y;
    }
}
