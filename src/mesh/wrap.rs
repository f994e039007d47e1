//! Per-edge wrap metadata.
//!
//! On a toroidal or cylindrical tiling some edges cross the seam where the
//! logical grid wraps around. An [`EdgeWrap`] records, per axis, whether the
//! traversal from the near vertex to the far vertex of a half-edge crosses that
//! seam and in which direction. Composing the wraps of consecutive half-edges
//! gives the seam crossings of the whole path, which is what lets geometry
//! layers reconstruct continuous coordinates across the seam.

use bitflags::bitflags;

bitflags! {
    /// Seam crossings of a half-edge traversal, one direction pair per axis.
    ///
    /// At most one flag of each pair may be set.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct EdgeWrap: u8 {
        /// Crosses the X seam in the positive direction.
        const POS_X = 0b0001;
        /// Crosses the X seam in the negative direction.
        const NEG_X = 0b0010;
        /// Crosses the Y seam in the positive direction.
        const POS_Y = 0b0100;
        /// Crosses the Y seam in the negative direction.
        const NEG_Y = 0b1000;
    }
}

impl EdgeWrap {
    /// Build a wrap from signed seam crossings per axis.
    ///
    /// Returns `None` if a component lies outside `-1..=1`, since a single edge
    /// can cross each seam at most once.
    pub fn from_offset(dx: i32, dy: i32) -> Option<Self> {
        let x = match dx {
            -1 => EdgeWrap::NEG_X,
            0 => EdgeWrap::empty(),
            1 => EdgeWrap::POS_X,
            _ => return None,
        };
        let y = match dy {
            -1 => EdgeWrap::NEG_Y,
            0 => EdgeWrap::empty(),
            1 => EdgeWrap::POS_Y,
            _ => return None,
        };
        Some(x | y)
    }

    /// Signed seam crossing along X.
    #[inline]
    pub fn dx(self) -> i32 {
        axis_offset(self, EdgeWrap::POS_X, EdgeWrap::NEG_X)
    }

    /// Signed seam crossing along Y.
    #[inline]
    pub fn dy(self) -> i32 {
        axis_offset(self, EdgeWrap::POS_Y, EdgeWrap::NEG_Y)
    }

    /// Signed seam crossings as `(dx, dy)`.
    #[inline]
    pub fn offset(self) -> (i32, i32) {
        (self.dx(), self.dy())
    }

    /// The wrap of the same edge traversed the other way.
    ///
    /// A twin half-edge always carries the inverse of its partner's wrap.
    pub fn inverse(self) -> Self {
        let mut inv = EdgeWrap::empty();
        inv.set(EdgeWrap::NEG_X, self.contains(EdgeWrap::POS_X));
        inv.set(EdgeWrap::POS_X, self.contains(EdgeWrap::NEG_X));
        inv.set(EdgeWrap::NEG_Y, self.contains(EdgeWrap::POS_Y));
        inv.set(EdgeWrap::POS_Y, self.contains(EdgeWrap::NEG_Y));
        inv
    }

    /// Wrap of the path "traverse `self`, then `other`".
    ///
    /// Returns `None` when the path would cross a seam twice in the same
    /// direction, which a single edge cannot represent.
    pub fn compose(self, other: Self) -> Option<Self> {
        let (ax, ay) = self.offset();
        let (bx, by) = other.offset();
        EdgeWrap::from_offset(ax + bx, ay + by)
    }

    /// Whether the pair of flags of every axis is consistent.
    pub fn is_well_formed(self) -> bool {
        !(self.contains(EdgeWrap::POS_X | EdgeWrap::NEG_X)
            || self.contains(EdgeWrap::POS_Y | EdgeWrap::NEG_Y))
    }
}

#[inline]
fn axis_offset(wrap: EdgeWrap, pos: EdgeWrap, neg: EdgeWrap) -> i32 {
    wrap.contains(pos) as i32 - wrap.contains(neg) as i32
}
