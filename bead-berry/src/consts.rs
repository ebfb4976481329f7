//! 通用常量.

/// 标签图中的取值.
pub mod label {
    /// 背景标签. 有效荧光珠标签从 1 开始.
    pub const BACKGROUND: u32 = 0;

    /// 标签是否是背景?
    #[inline]
    pub const fn is_background(l: u32) -> bool {
        l == BACKGROUND
    }
}

/// 体素强度相关常量.
pub mod intensity {
    /// 体素强度类型 (无符号 16 位) 的最大可能值. 反色时以此为上界.
    pub const MAX_POSSIBLE: u16 = u16::MAX;

    /// 二值化后前景的取值.
    pub const INSIDE: u8 = 1;

    /// 二值化后背景的取值.
    pub const OUTSIDE: u8 = 0;
}

/// 主导前景段体素个数低于该值时, 认为信号不足以给出可信的分辨率.
pub const LOW_VOLUME_VOXELS: usize = 10;

/// 默认中值滤波半径, 按 \[z, y, x\] 排列. 即 3x3x3 邻域.
pub const DEFAULT_MEDIAN_RADIUS: [usize; 3] = [1, 1, 1];

/// 输出中标记 "分辨率不可信" 的后缀.
pub const RESO_TAG: &str = "!reso!";

/// 输出中标记 "前景段个数不为 1" 的后缀.
pub const NB_OBJECTS_TAG: &str = "!nb of objects!";
