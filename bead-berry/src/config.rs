//! 测量参数.

use crate::consts::{DEFAULT_MEDIAN_RADIUS, LOW_VOLUME_VOXELS};
use crate::filter::Connectivity;

/// 一次测量所用的参数. 默认值即标准流程的参数.
///
/// 该结构是只读的. 若要修改参数, 使用 `with_*` 方法得到新实例.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct MeasureConfig {
    median_radius: [usize; 3],
    fully_connected: bool,
    low_volume_voxels: usize,
}

impl Default for MeasureConfig {
    #[inline]
    fn default() -> Self {
        Self {
            median_radius: DEFAULT_MEDIAN_RADIUS,
            fully_connected: false,
            low_volume_voxels: LOW_VOLUME_VOXELS,
        }
    }
}

impl MeasureConfig {
    /// 构建测量参数.
    ///
    /// `low_volume_voxels` 为 0 时任何测量都不会被标记, 视为无意义, 返回 `None`.
    pub fn new(
        median_radius: [usize; 3],
        fully_connected: bool,
        low_volume_voxels: usize,
    ) -> Option<Self> {
        if low_volume_voxels == 0 {
            None
        } else {
            Some(Self {
                median_radius,
                fully_connected,
                low_volume_voxels,
            })
        }
    }

    /// 替换中值滤波半径 \[z, y, x\]. 全 0 表示不滤波.
    #[inline]
    pub const fn with_median_radius(mut self, radius: [usize; 3]) -> Self {
        self.median_radius = radius;
        self
    }

    /// 分水岭是否使用 8-邻域.
    #[inline]
    pub const fn with_fully_connected(mut self, fully_connected: bool) -> Self {
        self.fully_connected = fully_connected;
        self
    }

    /// 中值滤波半径 \[z, y, x\].
    #[inline]
    pub const fn median_radius(&self) -> [usize; 3] {
        self.median_radius
    }

    /// 分水岭是否使用 8-邻域.
    #[inline]
    pub const fn fully_connected(&self) -> bool {
        self.fully_connected
    }

    /// 分水岭的邻域连通方式.
    #[inline]
    pub const fn connectivity(&self) -> Connectivity {
        Connectivity::from_fully_connected(self.fully_connected)
    }

    /// 低于该体素数的主导前景段被标记为 `low_volume`.
    #[inline]
    pub const fn low_volume_voxels(&self) -> usize {
        self.low_volume_voxels
    }
}
