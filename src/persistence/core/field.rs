/*!
 * 系数域
 *
 * 归约引擎对系数域泛型：调用者选择 `ModP<P>`（GF(p)）。
 * `Field` trait 只要求加法、取负、乘法、可失败的求逆和零/一判定。
 *
 * # 使用示例
 *
 * ```ignore
 * type F = ModP<3>;
 * let a = F::new(2);
 * assert_eq!(a * a.inv()?, F::one());
 * ```
 */

use std::fmt;
use std::ops::{Add, Mul, Neg, Sub};

use num_traits::{One, Zero};

use super::super::error::{PersistenceError, PersistenceResult};

/// 有限域元素
pub trait Field:
    Copy
    + fmt::Debug
    + fmt::Display
    + PartialEq
    + Send
    + Sync
    + Zero
    + One
    + Sub<Output = Self>
    + Neg<Output = Self>
    + 'static
{
    /// 乘法逆元；零或不可逆元素返回错误
    fn inv(self) -> PersistenceResult<Self>;

    /// 整数到域元素的规范映射（边界系数 ±1 由此转换）
    fn from_i64(value: i64) -> Self;

    /// self / other
    #[inline]
    fn try_div(self, other: Self) -> PersistenceResult<Self> {
        Ok(self * other.inv()?)
    }
}

// ============================================================================
// ModP - 素数域 GF(p)
// ============================================================================

/// GF(p) 元素，以 [0, P) 中的规范代表元存储
///
/// P 不是素数时，与 P 不互素的元素求逆会返回 `NotInvertible`。
/// P < 2 在编译期被拒绝：
///
/// ```compile_fail
/// use rust_persistence::persistence::ModP;
///
/// let _ = ModP::<0>::new(1);
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ModP<const P: u32>(u32);

/// GF(2)
pub type F2 = ModP<2>;
/// GF(3)
pub type F3 = ModP<3>;

impl<const P: u32> ModP<P> {
    pub const MODULUS: u32 = P;

    /// 所有构造函数都引用它，P < 2 的实例化无法编译
    const VALID_MODULUS: () = assert!(P >= 2, "ModP requires a modulus of at least 2");

    #[inline]
    pub fn new(value: u32) -> Self {
        let () = Self::VALID_MODULUS;
        Self(value % P)
    }

    /// 规范代表元
    #[inline]
    pub fn value(self) -> u32 {
        self.0
    }
}

impl<const P: u32> Add for ModP<P> {
    type Output = Self;

    #[inline]
    fn add(self, rhs: Self) -> Self {
        Self(((self.0 as u64 + rhs.0 as u64) % P as u64) as u32)
    }
}

impl<const P: u32> Sub for ModP<P> {
    type Output = Self;

    #[inline]
    fn sub(self, rhs: Self) -> Self {
        Self(((self.0 as u64 + P as u64 - rhs.0 as u64) % P as u64) as u32)
    }
}

impl<const P: u32> Mul for ModP<P> {
    type Output = Self;

    #[inline]
    fn mul(self, rhs: Self) -> Self {
        Self(((self.0 as u64 * rhs.0 as u64) % P as u64) as u32)
    }
}

impl<const P: u32> Neg for ModP<P> {
    type Output = Self;

    #[inline]
    fn neg(self) -> Self {
        if self.0 == 0 {
            self
        } else {
            Self(P - self.0)
        }
    }
}

impl<const P: u32> Zero for ModP<P> {
    #[inline]
    fn zero() -> Self {
        let () = Self::VALID_MODULUS;
        Self(0)
    }

    #[inline]
    fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

impl<const P: u32> One for ModP<P> {
    #[inline]
    fn one() -> Self {
        let () = Self::VALID_MODULUS;
        Self(1)
    }
}

impl<const P: u32> Default for ModP<P> {
    #[inline]
    fn default() -> Self {
        Self::zero()
    }
}

impl<const P: u32> Field for ModP<P> {
    fn inv(self) -> PersistenceResult<Self> {
        if self.0 == 0 {
            return Err(PersistenceError::InverseOfZero);
        }
        // 扩展欧几里得：求 x 使得 self * x ≡ 1 (mod P)
        let (mut r0, mut r1) = (P as i64, self.0 as i64);
        let (mut t0, mut t1) = (0i64, 1i64);
        while r1 != 0 {
            let q = r0 / r1;
            (r0, r1) = (r1, r0 - q * r1);
            (t0, t1) = (t1, t0 - q * t1);
        }
        if r0 != 1 {
            return Err(PersistenceError::NotInvertible {
                value: self.0,
                modulus: P,
            });
        }
        Ok(Self(t0.rem_euclid(P as i64) as u32))
    }

    #[inline]
    fn from_i64(value: i64) -> Self {
        let () = Self::VALID_MODULUS;
        Self(value.rem_euclid(P as i64) as u32)
    }
}

impl<const P: u32> fmt::Debug for ModP<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl<const P: u32> fmt::Display for ModP<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// 单元测试
// ============================================================================
