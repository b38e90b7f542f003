use super::Point2;

/// Even-odd containment test of `point` against an unordered set of edges.
///
/// The edges may come from several closed loops (outer boundary plus holes);
/// only their union matters. A ray is cast in the `+u` direction and the
/// number of edges it crosses is counted, with the half-open rule on edge
/// end points so shared vertices are counted once.
#[must_use]
pub fn point_in_edges(point: &Point2, edges: &[(Point2, Point2)]) -> bool {
    let mut inside = false;
    for (a, b) in edges {
        if (a.y > point.y) == (b.y > point.y) {
            continue;
        }
        let x_cross = a.x + (point.y - a.y) / (b.y - a.y) * (b.x - a.x);
        if point.x < x_cross {
            inside = !inside;
        }
    }
    inside
}
