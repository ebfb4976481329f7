//! 体数据滤波与邻域工具.

mod median;

pub use median::median_filter;

use crate::Idx2d;

/// 二维邻域连通方式.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub enum Connectivity {
    /// 4-邻域 (上下左右).
    #[default]
    Four,

    /// 8-邻域 (含对角).
    Eight,
}

impl Connectivity {
    /// `fully_connected` 为真时使用 8-邻域.
    #[inline]
    pub const fn from_fully_connected(fully_connected: bool) -> Self {
        if fully_connected {
            Self::Eight
        } else {
            Self::Four
        }
    }

    /// 获得 `pos` 在形状为 `shape` 的图像内的所有邻居.
    pub(crate) fn neighbours(self, pos: Idx2d, shape: Idx2d) -> impl Iterator<Item = Idx2d> {
        // 未使用的槽位填越界值, 之后被过滤掉.
        let mut buf = [(usize::MAX, usize::MAX); 8];
        match self {
            Self::Four => buf[..4].copy_from_slice(&neighbour4(pos)),
            Self::Eight => buf.copy_from_slice(&neighbour8(pos)),
        }
        let (h, w) = shape;
        buf.into_iter().filter(move |&(y, x)| y < h && x < w)
    }
}

/// 获得 `(h, w)` 的 4-邻居索引. 不检查越界.
#[inline]
pub(crate) fn neighbour4((h, w): Idx2d) -> [Idx2d; 4] {
    [
        (h.wrapping_sub(1), w),
        (h.saturating_add(1), w),
        (h, w.wrapping_sub(1)),
        (h, w.saturating_add(1)),
    ]
}

/// 获得 `(h, w)` 的 8-邻居索引. 不检查越界.
#[inline]
pub(crate) fn neighbour8((h, w): Idx2d) -> [Idx2d; 8] {
    [
        (h.wrapping_sub(1), w.wrapping_sub(1)),
        (h.wrapping_sub(1), w),
        (h.wrapping_sub(1), w.saturating_add(1)),
        (h, w.wrapping_sub(1)),
        (h, w.saturating_add(1)),
        (h.saturating_add(1), w.wrapping_sub(1)),
        (h.saturating_add(1), w),
        (h.saturating_add(1), w.saturating_add(1)),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collect(c: Connectivity, pos: Idx2d, shape: Idx2d) -> Vec<Idx2d> {
        let mut v: Vec<_> = c.neighbours(pos, shape).collect();
        v.sort_unstable();
        v
    }

    #[test]
    fn test_neighbours_in_bounds() {
        assert_eq!(
            collect(Connectivity::Four, (0, 0), (3, 3)),
            vec![(0, 1), (1, 0)]
        );
        assert_eq!(collect(Connectivity::Eight, (0, 0), (3, 3)).len(), 3);
        assert_eq!(collect(Connectivity::Four, (1, 1), (3, 3)).len(), 4);
        assert_eq!(collect(Connectivity::Eight, (1, 1), (3, 3)).len(), 8);
        assert_eq!(collect(Connectivity::Eight, (2, 2), (3, 3)).len(), 3);
    }

    #[test]
    fn test_single_pixel_has_no_neighbour() {
        assert!(collect(Connectivity::Eight, (0, 0), (1, 1)).is_empty());
    }

    #[test]
    fn test_from_fully_connected() {
        assert_eq!(Connectivity::from_fully_connected(false), Connectivity::Four);
        assert_eq!(Connectivity::from_fully_connected(true), Connectivity::Eight);
        assert_eq!(Connectivity::default(), Connectivity::Four);
    }
}
