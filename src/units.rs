//! Length units used throughout layout. Everything is converted to [Pt] before it
//! reaches the layout engine or the PDF writer.

use derive_more::{Add, AddAssign, Deref, Display, From, Into, Sub, SubAssign, Sum};
use std::ops::{Div, Mul, Neg};

/// Typographic points (1/72 inch), the native unit of PDF user space
#[derive(
    Debug,
    Default,
    Copy,
    Clone,
    PartialEq,
    PartialOrd,
    Add,
    AddAssign,
    Sub,
    SubAssign,
    Sum,
    Deref,
    Display,
    From,
    Into,
)]
pub struct Pt(pub f32);

/// Millimetres
#[derive(Debug, Default, Copy, Clone, PartialEq, PartialOrd, Display, From, Into)]
pub struct Mm(pub f32);

/// Inches
#[derive(Debug, Default, Copy, Clone, PartialEq, PartialOrd, Display, From, Into)]
pub struct In(pub f32);

impl Pt {
    /// The larger of two lengths
    pub fn max(self, other: Pt) -> Pt {
        Pt(self.0.max(other.0))
    }

    /// The smaller of two lengths
    pub fn min(self, other: Pt) -> Pt {
        Pt(self.0.min(other.0))
    }
}

impl From<Mm> for Pt {
    fn from(mm: Mm) -> Pt {
        Pt(mm.0 * 72.0 / 25.4)
    }
}

impl From<In> for Pt {
    fn from(inches: In) -> Pt {
        Pt(inches.0 * 72.0)
    }
}

impl Mul<f32> for Pt {
    type Output = Pt;

    fn mul(self, rhs: f32) -> Pt {
        Pt(self.0 * rhs)
    }
}

impl Div<f32> for Pt {
    type Output = Pt;

    fn div(self, rhs: f32) -> Pt {
        Pt(self.0 / rhs)
    }
}

/// The ratio between two lengths
impl Div<Pt> for Pt {
    type Output = f32;

    fn div(self, rhs: Pt) -> f32 {
        self.0 / rhs.0
    }
}

impl Neg for Pt {
    type Output = Pt;

    fn neg(self) -> Pt {
        Pt(-self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inches_convert_to_points() {
        assert_eq!(Pt::from(In(0.5)), Pt(36.0));
    }

    #[test]
    fn millimetres_convert_to_points() {
        let pt: Pt = Mm(25.4).into();
        assert!((pt.0 - 72.0).abs() < 1e-4);
    }

    #[test]
    fn arithmetic_stays_in_points() {
        let mut x = Pt(10.0) + Pt(4.0) * 2.0;
        x -= Pt(3.0);
        assert_eq!(x, Pt(15.0));
        assert_eq!(Pt(30.0) / Pt(15.0), 2.0);
        assert_eq!([Pt(1.0), Pt(2.0)].into_iter().sum::<Pt>(), Pt(3.0));
    }
}
