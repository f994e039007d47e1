//! Offset-row grids, the layout of hexagonal and brick tilings.

use nalgebra::Point2;

use super::{wrap_axis, Indexer2D};
use crate::error::{Result, TopologyError};

/// Rows of cells where every odd row is shifted half a cell to the right.
///
/// When X wraps, the shifted half cell wraps around and every row holds
/// `width` cells. Otherwise odd rows hold one cell less, so the grid keeps a
/// straight outline. Cells are numbered row by row.
///
/// ```
/// use tessera::grid::{Indexer2D, OffsetRowIndexer};
/// use tessera::nalgebra::Point2;
///
/// let grid = OffsetRowIndexer::new(4, 3);
/// // Rows of 4, 3 and 4 cells
/// assert_eq!(grid.len(), 11);
/// assert_eq!(grid.index_1d(Point2::new(0, 1)), 4);
/// assert_eq!(grid.index_2d(7), Point2::new(0, 2));
/// assert!(!grid.contains(Point2::new(3, 1)));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OffsetRowIndexer {
    width: usize,
    height: usize,
    wrap_x: bool,
    wrap_y: bool,
}

impl OffsetRowIndexer {
    /// A grid of `height` rows, even rows holding `width` cells, without
    /// wrapping.
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            wrap_x: false,
            wrap_y: false,
        }
    }

    /// Set which axes wrap around.
    ///
    /// # Errors
    /// `InvalidParameter` when Y wraps over an odd number of rows, since the
    /// row shift would not line up across the seam.
    pub fn with_wrap(mut self, wrap_x: bool, wrap_y: bool) -> Result<Self> {
        if wrap_y && self.height % 2 != 0 {
            return Err(TopologyError::invalid_param(
                "height",
                self.height,
                "a wrapped offset-row grid needs an even number of rows",
            ));
        }
        self.wrap_x = wrap_x;
        self.wrap_y = wrap_y;
        Ok(self)
    }

    /// Whether row `y` is shifted.
    #[inline]
    pub fn is_shifted(&self, y: usize) -> bool {
        y % 2 == 1
    }

    /// Number of cells in row `y`.
    pub fn row_width(&self, y: usize) -> usize {
        if self.is_shifted(y) && !self.wrap_x {
            self.width.saturating_sub(1)
        } else {
            self.width
        }
    }

    /// Cells in an even row followed by an odd one.
    fn pair_len(&self) -> usize {
        self.row_width(0) + self.row_width(1)
    }

    fn row_start(&self, y: usize) -> usize {
        (y / 2) * self.pair_len() + (y % 2) * self.row_width(0)
    }
}

impl Indexer2D for OffsetRowIndexer {
    fn width(&self) -> usize {
        self.width
    }

    fn height(&self) -> usize {
        self.height
    }

    fn len(&self) -> usize {
        self.row_start(self.height)
    }

    fn contains(&self, p: Point2<i32>) -> bool {
        let q = self.wrap(p);
        match (usize::try_from(q.x), usize::try_from(q.y)) {
            (Ok(x), Ok(y)) => y < self.height && x < self.row_width(y),
            _ => false,
        }
    }

    #[inline]
    fn index_1d(&self, p: Point2<i32>) -> usize {
        debug_assert!(self.contains(p) && p == self.wrap(p), "{:?} is outside the grid", p);
        self.row_start(p.y as usize) + p.x as usize
    }

    fn index_2d(&self, index: usize) -> Point2<i32> {
        let pair = self.pair_len();
        let (Some(pairs), Some(rest)) = (index.checked_div(pair), index.checked_rem(pair)) else {
            return Point2::new(index as i32, 0);
        };
        let first = self.row_width(0);
        if rest < first {
            Point2::new(rest as i32, (2 * pairs) as i32)
        } else {
            Point2::new((rest - first) as i32, (2 * pairs + 1) as i32)
        }
    }

    #[inline]
    fn wrap_x(&self, x: i32) -> i32 {
        wrap_axis(x, self.width, self.wrap_x)
    }

    #[inline]
    fn wrap_y(&self, y: i32) -> i32 {
        wrap_axis(y, self.height, self.wrap_y)
    }
}
