use crate::pagesize::PageSize;
use crate::rect::Rect;
use crate::units::Pt;

/// Page margins. Layout treats them as the edges of the printable area; the
/// PDF writer also records the resulting box as each page's `ArtBox`.
#[derive(Debug, Default, Copy, Clone, PartialEq)]
pub struct Margins {
    pub top: Pt,
    pub right: Pt,
    pub bottom: Pt,
    pub left: Pt,
}

impl Margins {
    /// Create margins where all values are equal
    pub fn all<D: Into<Pt>>(value: D) -> Margins {
        let value: Pt = value.into();
        Margins::symmetric(value, value)
    }

    /// Different margins for the vertical (top and bottom) and horizontal
    /// (left and right) edges
    pub fn symmetric<V: Into<Pt>, H: Into<Pt>>(vertical: V, horizontal: H) -> Margins {
        let (vertical, horizontal) = (vertical.into(), horizontal.into());
        Margins {
            top: vertical,
            right: horizontal,
            bottom: vertical,
            left: horizontal,
        }
    }

    /// The area inside the margins for a page of the given size
    pub fn content_box(&self, page_size: PageSize) -> Rect {
        Rect {
            x1: self.left,
            y1: self.bottom,
            x2: page_size.0 - self.right,
            y2: page_size.1 - self.top,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_box_is_inset_by_margins() {
        let margins = Margins::symmetric(Pt(20.0), Pt(10.0));
        let content = margins.content_box((Pt(200.0), Pt(300.0)));
        assert_eq!(content.x1, Pt(10.0));
        assert_eq!(content.y1, Pt(20.0));
        assert_eq!(content.width(), Pt(180.0));
        assert_eq!(content.height(), Pt(260.0));
    }
}
