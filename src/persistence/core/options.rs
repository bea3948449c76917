/*!
 * 归约选项
 *
 * 所有优化都是可观测等价的：任意选项组合得到的 pair 集合相同，
 * 只影响时间和内存。
 *
 * ```ignore
 * let opts = ReductionOptions::new()
 *     .with_optimization(Optimization::Clearing)
 *     .with_apparent_pairs(true);
 * let opts = ReductionOptions::from_json(r#"{"reduction": "extra"}"#)?;
 * ```
 */

use serde::{Deserialize, Serialize};

use super::super::error::PersistenceResult;

/// 跨维度的优化策略
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Optimization {
    /// 各维度独立归约
    #[default]
    None,
    /// 自顶向下：R_{k+1} 的 pivot 行对应的 k 维列直接置零
    Clearing,
    /// 自底向上：k 维 negative cell 的行从 ∂_{k+1} 中删除，
    /// 零持久性 pair 的归约列在该维结束后丢弃
    Compression,
}

/// 单列的归约方式
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReductionKind {
    /// 只消去 pivot 冲突
    #[default]
    Standard,
    /// pivot 确定后继续消去被其他列占有的非 pivot 项
    Extra,
}

/// 归约选项
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReductionOptions {
    pub optimization: Optimization,
    pub reduction: ReductionKind,
    /// 先识别 apparent pair，这些列跳过归约
    pub apparent_pairs: bool,
    /// 在 rayon 线程池上并行归约各维度（仅 `Optimization::None`）
    pub parallel: bool,
    /// 只报告 0..=max_dim 维的 pairs
    pub max_dim: Option<usize>,
}

impl ReductionOptions {
    /// 不做任何优化的基准配置
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_optimization(mut self, optimization: Optimization) -> Self {
        self.optimization = optimization;
        self
    }

    pub fn with_reduction(mut self, reduction: ReductionKind) -> Self {
        self.reduction = reduction;
        self
    }

    pub fn with_apparent_pairs(mut self, enabled: bool) -> Self {
        self.apparent_pairs = enabled;
        self
    }

    pub fn with_parallel(mut self, enabled: bool) -> Self {
        self.parallel = enabled;
        self
    }

    pub fn with_max_dim(mut self, max_dim: usize) -> Self {
        self.max_dim = Some(max_dim);
        self
    }

    /// 从 JSON 读取，缺失字段取默认值
    pub fn from_json(s: &str) -> PersistenceResult<Self> {
        Ok(serde_json::from_str(s)?)
    }

    pub fn to_json(&self) -> PersistenceResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// 所有 optimization × reduction × apparent × parallel 组合
    pub fn all_combinations() -> Vec<Self> {
        let mut out = Vec::new();
        for optimization in [Optimization::None, Optimization::Clearing, Optimization::Compression] {
            for reduction in [ReductionKind::Standard, ReductionKind::Extra] {
                for apparent_pairs in [false, true] {
                    for parallel in [false, true] {
                        out.push(Self {
                            optimization,
                            reduction,
                            apparent_pairs,
                            parallel,
                            max_dim: None,
                        });
                    }
                }
            }
        }
        out
    }
}
