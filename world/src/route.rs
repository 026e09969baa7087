//! Rasterised monster route derived from the configured waypoints.

use lane_defence_core::GridCell;

/// Dense, ordered sequence of grid cells that monsters walk along.
///
/// Each waypoint pair is expanded with an integer line walk, and the segments
/// are concatenated without removing the shared corner cells. Monsters consume
/// the route by index, so the duplicated corners only cost a zero-length step.
#[derive(Clone, Debug, Default)]
pub(crate) struct Route {
    cells: Vec<GridCell>,
}

impl Route {
    /// Rasterises the provided waypoints. Fewer than two waypoints produce an
    /// empty route.
    pub(crate) fn from_waypoints(waypoints: &[GridCell]) -> Self {
        let mut cells = Vec::new();
        for pair in waypoints.windows(2) {
            rasterize_segment(pair[0], pair[1], &mut cells);
        }
        Self { cells }
    }

    /// Every cell of the route in traversal order.
    pub(crate) fn cells(&self) -> &[GridCell] {
        &self.cells
    }

    /// Cell stored at the provided index, if the route is that long.
    pub(crate) fn get(&self, index: usize) -> Option<GridCell> {
        self.cells.get(index).copied()
    }

    /// First cell of the route.
    pub(crate) fn first(&self) -> Option<GridCell> {
        self.cells.first().copied()
    }

    /// Reports whether the cell lies on the route.
    pub(crate) fn contains(&self, cell: GridCell) -> bool {
        self.cells.iter().any(|candidate| *candidate == cell)
    }
}

fn rasterize_segment(start: GridCell, end: GridCell, out: &mut Vec<GridCell>) {
    let dx = (end.column() - start.column()).abs();
    let dy = (end.row() - start.row()).abs();
    let step_x = if start.column() < end.column() { 1 } else { -1 };
    let step_y = if start.row() < end.row() { 1 } else { -1 };
    let mut error = dx - dy;

    let mut column = start.column();
    let mut row = start.row();

    loop {
        out.push(GridCell::new(column, row));

        if column == end.column() && row == end.row() {
            break;
        }

        let doubled = error * 2;
        if doubled > -dy {
            error -= dy;
            column += step_x;
        }
        if doubled < dx {
            error += dx;
            row += step_y;
        }
    }
}
