//! 一个文件内各荧光珠分辨率的汇总统计.

use std::fmt;

use ordered_float::NotNan;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// 统计计算错误.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatsError {
    /// 没有任何数据.
    Empty,

    /// 数据中出现 NaN.
    NotANumber,
}

impl fmt::Display for StatsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "no value to summarize"),
            Self::NotANumber => write!(f, "NaN in values"),
        }
    }
}

impl std::error::Error for StatsError {}

/// 算术平均值.
pub fn mean(values: &[f64]) -> Result<f64, StatsError> {
    if values.is_empty() {
        return Err(StatsError::Empty);
    }
    if values.iter().any(|v| v.is_nan()) {
        return Err(StatsError::NotANumber);
    }
    Ok(values.iter().sum::<f64>() / values.len() as f64)
}

/// 中位数. 长度为偶数时取中间两个数的平均值.
pub fn median(values: &[f64]) -> Result<f64, StatsError> {
    if values.is_empty() {
        return Err(StatsError::Empty);
    }
    let mut sorted = values
        .iter()
        .map(|&v| NotNan::new(v).map_err(|_| StatsError::NotANumber))
        .collect::<Result<Vec<_>, _>>()?;
    sorted.sort_unstable();

    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 1 {
        Ok(sorted[mid].into_inner())
    } else {
        Ok((sorted[mid - 1].into_inner() + sorted[mid].into_inner()) / 2.0)
    }
}

/// 一组分辨率的平均值和中位数.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Summary {
    /// 平均值.
    pub mean: f64,

    /// 中位数.
    pub median: f64,
}

impl Summary {
    /// 计算 `values` 的汇总统计. 为空时返回 [`StatsError::Empty`].
    pub fn of(values: &[f64]) -> Result<Self, StatsError> {
        Ok(Self {
            mean: mean(values)?,
            median: median(values)?,
        })
    }
}
