#![warn(missing_docs)]

//! 核心库. 从荧光珠 3D 显微图像测量成像系统的轴向 (z) 分辨率.
//!
//! 每个荧光珠近似一个点光源, 其在 z 方向上的强度分布宽度即点扩散函数的轴向宽度.
//! 该 crate 负责定位每个荧光珠, 把它从体数据中隔离出来, 并测量其轴向宽度.
//!
//! 该 crate 目前仅提供 `safe` 接口.
//!
//! # 注意
//!
//! 1. 体数据统一以 (z, y, x) 排列存储, 体素间距也按 \[z, y, x\] 排列.
//! 2. 同一文件内的所有荧光珠共用一个分水岭水位, 但每个荧光珠的二值化阈值由它自己的
//!   轴向强度曲线决定. 两者的不对称是有意为之.
//! 3. 在非期望情况下 (如调用方违反了构造约束), 程序会直接 panic, 而不会导致内存错误.
//!
//! # 开发计划
//!
//! ### 体数据读取 ✅
//!
//! nifti (`.nii`, `.nii.gz`), NumPy (`.npy`, `.npy.gz`) 和 Zeiss LSM / 多页 tiff
//! (`.lsm`, `.tif`, `.tiff`) 格式, 以及迭代器风格的加载器.
//!
//! 实现位于 `bead-berry/src/source`.
//!
//! ### 三维中值滤波 ✅
//!
//! 边缘复制, 按 z 切片并行.
//!
//! 实现位于 `bead-berry/src/filter`.
//!
//! ### 分水岭分割 ✅
//!
//! h-minima + 区域极小值标记 + 优先级泛洪, 以及按面积降序重标记.
//!
//! 实现位于 `bead-berry/src/segment`.
//!
//! ### 轴向分辨率测量与汇总统计 ✅
//!
//! 实现位于 `bead-berry/src/measure` 和 `bead-berry/src/stats.rs`.
//!
//! ### 命令行工具 ✅
//!
//! 实现位于 `tools/reso-z`.

/// 二维索引, 同时也可一定程度上用作非负整数向量.
pub type Idx2d = (usize, usize);

/// 三维索引, 同时也可一定程度上用作非负整数向量.
pub type Idx3d = (usize, usize, usize);

/// 3D 体数据, 投影和标签图基础数据结构.
mod data;

pub use data::{
    ImgWrite, LabelMap2d, LabelMap3d, OpenVolumeError, Profile1d, Projection2d, Volume,
    VolumeError, VolumeResult, VoxelGeometry, AXIS_X, AXIS_Y, AXIS_Z,
};

pub mod config;
pub mod consts;
pub mod filter;
pub mod measure;
pub mod pipeline;
pub mod prelude;
pub mod segment;
pub mod source;
pub mod stats;
