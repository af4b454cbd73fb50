//! 有理数类型, 用于帧率、时间基等场景.

use std::fmt;

/// 有理数, 由分子和分母组成
///
/// 例如: 帧率 30000/1001 表示 29.97fps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rational {
    /// 分子
    pub num: i32,
    /// 分母
    pub den: i32,
}

impl Rational {
    /// 创建新的有理数
    pub const fn new(num: i32, den: i32) -> Self {
        Self { num, den }
    }

    /// 零值
    pub const ZERO: Self = Self { num: 0, den: 1 };

    /// 未定义 (分母为 0)
    pub const UNDEFINED: Self = Self { num: 0, den: 0 };

    /// 判断是否有效 (分母不为 0)
    pub const fn is_valid(&self) -> bool {
        self.den != 0
    }

    /// 转换为 f64 浮点数
    ///
    /// 如果分母为 0, 返回 `f64::NAN`.
    pub fn to_f64(self) -> f64 {
        if self.den == 0 {
            return f64::NAN;
        }
        f64::from(self.num) / f64::from(self.den)
    }

    /// 四舍五入为整数帧率
    ///
    /// 无效或非正值返回 0.
    pub fn to_rounded_u32(self) -> u32 {
        let v = self.to_f64();
        if !v.is_finite() || v <= 0.0 {
            return 0;
        }
        v.round() as u32
    }
}

impl fmt::Display for Rational {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.num, self.den)
    }
}

impl From<(i32, i32)> for Rational {
    fn from((num, den): (i32, i32)) -> Self {
        Self { num, den }
    }
}

impl From<i32> for Rational {
    fn from(num: i32) -> Self {
        Self { num, den: 1 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ntsc_帧率取整() {
        assert_eq!(Rational::new(30000, 1001).to_rounded_u32(), 30);
        assert_eq!(Rational::new(25, 1).to_rounded_u32(), 25);
    }

    #[test]
    fn test_无效帧率取整为零() {
        assert_eq!(Rational::UNDEFINED.to_rounded_u32(), 0);
        assert_eq!(Rational::new(-5, 1).to_rounded_u32(), 0);
        assert_eq!(Rational::new(1, 3).to_rounded_u32(), 0);
    }
}
