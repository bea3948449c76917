/*!
 * 核心算法模块
 *
 * # 子模块
 *
 * - `field`: 系数域 trait 与 GF(p)
 * - `sparse_vector` / `set_vector`: 稀疏向量
 * - `column_matrix`: 列稀疏矩阵
 * - `complex`: 胞腔复形接口与单纯复形
 * - `filtration`: 单调 filtration
 * - `right_filtration`: 区间 filtration 与 zigzag 事件
 * - `levelset`: 由顶点采样构造 level-set zigzag filtration
 * - `chain_complex`: 链复形、filtered 链复形、各维独立归约
 * - `options`: 归约选项
 * - `reduction`: 单个边界矩阵的列归约
 * - `filtered`: 跨维优化与 barcode 读出
 * - `zigzag`: zigzag 归约状态机
 *
 * # 依赖关系
 *
 * ```text
 * field → sparse_vector → column_matrix → reduction
 *                                             ↓
 * complex → filtration → chain_complex → filtered
 *              ↓
 *       right_filtration → zigzag
 *              ↑
 *          levelset
 * ```
 */

pub mod field;
pub mod sparse_vector;
pub mod set_vector;
pub mod column_matrix;
pub mod complex;
pub mod filtration;
pub mod right_filtration;
pub mod levelset;
pub mod chain_complex;
pub mod options;
pub mod reduction;
pub mod filtered;
pub mod zigzag;

// 重导出（便于外部使用）
pub use field::*;
pub use sparse_vector::*;
pub use set_vector::*;
pub use column_matrix::*;
pub use complex::*;
pub use filtration::*;
pub use right_filtration::*;
pub use levelset::*;
pub use chain_complex::*;
pub use options::*;
pub use reduction::*;
pub use filtered::*;
pub use zigzag::*;
