/// Axis-aligned collision resolution against the static tile grid.
///
/// ## Order
///
///   1. Horizontal sweep: move along x as far as solid cells allow.
///   2. Vertical sweep from the new x.
///   3. World confinement (entities with `stay_in_world`).
///
/// Each sweep scans only the cells crossed by the leading edge of the
/// bounding box in the direction of travel. Cells the box already overlaps
/// are ignored so a body is never trapped by terrain it started inside;
/// `settle` lifts spawned bodies clear of terrain before the first frame.
///
/// ## Contact
///
/// Contact is reported per side and only when movement toward that side was
/// cut short. A body sitting flush against a wall reports nothing until it
/// next tries to move into the wall; then it reports contact and stays put.
///
/// ## Support
///
/// A body is grounded when its lower edge lies exactly on the upper edge of a
/// solid cell under its footprint. The world's floor is queried separately
/// through `WorldBounds::on_floor`.

use super::entity::Entity;
use super::grid::TileGrid;

/// Tolerance for "exactly flush" comparisons in world pixels.
pub const EPSILON: f64 = 1e-6;

/// The playable rectangle, anchored at the origin.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct WorldBounds {
    pub width: f64,
    pub height: f64,
}

impl WorldBounds {
    /// Lower edge at or below the world's bottom boundary.
    pub fn on_floor(&self, body: &Entity) -> bool {
        body.bottom() >= self.height - EPSILON
    }

    /// Bounding box has reached or passed the left or right world edge.
    pub fn at_side_edge(&self, body: &Entity) -> bool {
        body.left() <= EPSILON || body.right() >= self.width - EPSILON
    }
}

/// Which sides of the body were blocked during one resolution.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct Contact {
    pub left: bool,
    pub right: bool,
    pub top: bool,
    pub bottom: bool,
}

impl Contact {
    /// The "hit a wall" signal.
    pub fn horizontal(&self) -> bool {
        self.left || self.right
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum Axis {
    X,
    Y,
}

// ══════════════════════════════════════════════════════════════
// Resolution
// ══════════════════════════════════════════════════════════════

/// Move `body` by its velocity over `dt` seconds without entering solid
/// cells. Velocity components are zeroed on the blocked sides.
pub fn resolve(body: &mut Entity, grid: &TileGrid, bounds: &WorldBounds, dt: f64) -> Contact {
    let mut contact = Contact::default();

    let step_x = body.dx * dt;
    if step_x != 0.0 {
        let moved = sweep(body, grid, Axis::X, step_x);
        body.x += moved;
        if moved != step_x {
            if step_x > 0.0 { contact.right = true; } else { contact.left = true; }
            body.dx = 0.0;
        }
    }

    let step_y = body.dy * dt;
    if step_y != 0.0 {
        let moved = sweep(body, grid, Axis::Y, step_y);
        body.y += moved;
        if moved != step_y {
            if step_y > 0.0 { contact.bottom = true; } else { contact.top = true; }
            body.dy = 0.0;
        }
    }

    if body.behavior.stay_in_world {
        confine(body, bounds, &mut contact);
    }

    contact
}

/// Clamp into the world rectangle. A clamped axis counts as contact.
fn confine(body: &mut Entity, bounds: &WorldBounds, contact: &mut Contact) {
    if body.x < 0.0 {
        body.x = 0.0;
        body.dx = body.dx.max(0.0);
        contact.left = true;
    } else if body.right() > bounds.width {
        body.x = bounds.width - body.width;
        body.dx = body.dx.min(0.0);
        contact.right = true;
    }

    if body.y < 0.0 {
        body.y = 0.0;
        body.dy = body.dy.max(0.0);
        contact.top = true;
    } else if body.bottom() > bounds.height {
        body.y = bounds.height - body.height;
        body.dy = body.dy.min(0.0);
        contact.bottom = true;
    }
}

/// Furthest signed distance the body may travel along `axis`, up to `step`.
fn sweep(body: &Entity, grid: &TileGrid, axis: Axis, step: f64) -> f64 {
    let cell = grid.cell_size();
    let (lo, hi, size, count, cross) = match axis {
        Axis::X => (
            body.left(), body.right(), cell.width, grid.cols(),
            span(body.top(), body.bottom(), cell.height, grid.rows()),
        ),
        Axis::Y => (
            body.top(), body.bottom(), cell.height, grid.rows(),
            span(body.left(), body.right(), cell.width, grid.cols()),
        ),
    };
    let Some((c0, c1)) = cross else { return step; };

    let solid_line = |i: i64| {
        (c0..=c1).any(|j| match axis {
            Axis::X => grid.is_solid(j, i as usize),
            Axis::Y => grid.is_solid(i as usize, j),
        })
    };
    let count = count as i64;

    if step > 0.0 {
        // First line whose near edge is at or ahead of the leading edge.
        let target = hi + step;
        let mut i = (((hi - EPSILON) / size).ceil() as i64).max(0);
        while i < count && (i as f64) * size < target {
            if solid_line(i) {
                return ((i as f64) * size - hi).max(0.0);
            }
            i += 1;
        }
    } else if step < 0.0 {
        let target = lo + step;
        let mut i = (((lo + EPSILON) / size).floor() as i64 - 1).min(count - 1);
        while i >= 0 && ((i + 1) as f64) * size > target {
            if solid_line(i) {
                return (((i + 1) as f64) * size - lo).min(0.0);
            }
            i -= 1;
        }
    }

    step
}

/// Inclusive index range of cells overlapped by the open interval `(lo, hi)`.
/// Cells that only touch an end point are excluded.
fn span(lo: f64, hi: f64, size: f64, count: usize) -> Option<(usize, usize)> {
    if count == 0 { return None; }
    let first = ((lo + EPSILON) / size).floor().max(0.0);
    let last = (((hi - EPSILON) / size).ceil() - 1.0).min(count as f64 - 1.0);
    if last < first { return None; }
    Some((first as usize, last as usize))
}

// ══════════════════════════════════════════════════════════════
// Queries
// ══════════════════════════════════════════════════════════════

/// Lower edge rests exactly on a solid cell's upper edge.
pub fn is_grounded(body: &Entity, grid: &TileGrid) -> bool {
    let cell = grid.cell_size();
    let row = (body.bottom() / cell.height).round();
    if row < 0.0 || (row * cell.height - body.bottom()).abs() > EPSILON {
        return false;
    }
    let Some((c0, c1)) = span(body.left(), body.right(), cell.width, grid.cols()) else {
        return false;
    };
    (c0..=c1).any(|c| grid.is_solid(row as usize, c))
}

/// Place a body that may start inside terrain: clamp it into the world (when
/// confined) and lift it until it overlaps no solid cell. The sweeps ignore
/// cells a body already overlaps, so bodies must be settled before the first
/// frame. Returns false when there is no room above the terrain.
pub fn settle(body: &mut Entity, grid: &TileGrid, bounds: &WorldBounds) -> bool {
    if body.behavior.stay_in_world {
        let mut ignored = Contact::default();
        confine(body, bounds, &mut ignored);
    }

    let cell = grid.cell_size();
    loop {
        let rows = span(body.top(), body.bottom(), cell.height, grid.rows());
        let cols = span(body.left(), body.right(), cell.width, grid.cols());
        let (Some((r0, r1)), Some((c0, c1))) = (rows, cols) else {
            return true;
        };
        let Some(row) = (r0..=r1).find(|&r| (c0..=c1).any(|c| grid.is_solid(r, c))) else {
            return true;
        };
        let lifted = row as f64 * cell.height - body.height;
        if lifted < -EPSILON {
            return false;
        }
        body.y = lifted.max(0.0);
    }
}

/// Does the bounding box overlap any solid cell?
pub fn overlaps_solid(body: &Entity, grid: &TileGrid) -> bool {
    let cell = grid.cell_size();
    let rows = span(body.top(), body.bottom(), cell.height, grid.rows());
    let cols = span(body.left(), body.right(), cell.width, grid.cols());
    match (rows, cols) {
        (Some((r0, r1)), Some((c0, c1))) => {
            (r0..=r1).any(|r| (c0..=c1).any(|c| grid.is_solid(r, c)))
        }
        _ => false,
    }
}

// ══════════════════════════════════════════════════════════════
// Unit tests
// ══════════════════════════════════════════════════════════════
