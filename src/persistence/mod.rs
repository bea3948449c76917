/*!
 * Persistence - 持久同调归约引擎
 *
 * 给定带 filtration 的胞腔复形，计算各维度的 barcode。
 *
 * # 核心特性
 *
 * - **系数域泛型**: 归约对 `Field` 泛型，GF(p) 由 `ModP<P>` 提供
 * - **稀疏归约**: 列稀疏矩阵上的标准/extra 列归约
 * - **优化**: apparent pairs、clearing、compression，结果与基准归约完全一致
 * - **并行计算**: 各维度独立归约、多个 filtration 批量计算（Rayon）
 * - **Zigzag**: 区间 filtration（cell 可删除、重新加入）的 zigzag barcode
 *
 * # 模块结构
 *
 * - `types`: 核心数据类型（`PersistencePair`、`Barcode`、`ZigzagPair` 等）
 * - `error`: 错误类型
 * - `core`: 核心算法实现
 * - `ffi`: Python 绑定（`python` feature）
 *
 * # 使用示例
 *
 * ```ignore
 * use rust_persistence::persistence::*;
 *
 * let mut f = Filtration::new();
 * f.add_recursive(0.0, &[0, 1])?;
 * f.add_recursive(0.0, &[1, 2])?;
 * f.add_recursive(1.0, &[0, 2])?;
 * f.add(2.0, &[0, 1, 2])?;
 * let bc = barcode::<F2, _>(&f, &ReductionOptions::new())?;
 * ```
 */

// 子模块声明
pub mod types;
pub mod error;
pub mod core;
#[cfg(feature = "python")]
pub mod ffi;

// 重导出核心类型（便于使用）
pub use self::core::*;
pub use error::*;
pub use types::*;

// 版本信息
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
