use crate::error::Result;
use crate::path_collection::PathCollection;
use crate::shape::{Shape, WindingRule};
use crate::store::ArtHandle;

/// Presentation attributes the geometry core reads.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Style {
    /// `None` when the style does not say, which reads as non-zero.
    pub even_odd: Option<bool>,
}

impl Style {
    pub fn even_odd() -> Style {
        Style { even_odd: Some(true) }
    }

    pub fn winding_rule(&self) -> WindingRule {
        if self.even_odd == Some(true) {
            WindingRule::EvenOdd
        } else {
            WindingRule::NonZero
        }
    }
}

/// Shared behaviour of paths and compound paths.
///
/// Reads go through the segment data held locally; callers that need the backing store to
/// agree have to commit first (the accessors on `Document` do this).
pub trait PathItem {
    fn style(&self) -> &Style;
    fn style_mut(&mut self) -> &mut Style;
    fn handle(&self) -> ArtHandle;

    fn winding_rule(&self) -> WindingRule {
        self.style().winding_rule()
    }

    /// Appends the contours of this item to `shape`. `items` resolves child ids.
    fn build_shape(&self, items: &PathCollection, shape: &mut Shape) -> Result<()>;

    /// Fill rule of the exported shape.
    fn fill_winding(&self, _items: &PathCollection) -> Result<WindingRule> {
        Ok(self.winding_rule())
    }

    fn to_shape(&self, items: &PathCollection) -> Result<Shape> {
        let mut shape = Shape::new(self.fill_winding(items)?);
        self.build_shape(items, &mut shape)?;
        Ok(shape)
    }
}
