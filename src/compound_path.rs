use crate::error::{PathError, Result};
use crate::path_collection::{ItemId, PathCollection};
use crate::path_item::{PathItem, Style};
use crate::shape::{Shape, WindingRule};
use crate::store::ArtHandle;

/// Several contours filled together. Holes come from the winding rule and the direction of
/// the children.
#[derive(Debug)]
pub struct CompoundPath {
    children: Vec<ItemId>,
    style: Style,
    handle: ArtHandle,
    attached: bool,
}

impl CompoundPath {
    pub(crate) fn new(handle: ArtHandle, style: Style) -> CompoundPath {
        CompoundPath {
            children: Vec::new(),
            style,
            handle,
            attached: true,
        }
    }

    pub fn children(&self) -> &[ItemId] {
        &self.children
    }

    pub(crate) fn children_mut(&mut self) -> &mut Vec<ItemId> {
        &mut self.children
    }

    /// The contour drawing calls go to: the one started last.
    pub fn current(&self) -> Option<ItemId> {
        self.children.last().copied()
    }

    pub fn is_attached(&self) -> bool {
        self.attached
    }

    pub(crate) fn detach(&mut self) {
        self.attached = false;
    }
}

impl PathItem for CompoundPath {
    fn style(&self) -> &Style {
        &self.style
    }

    fn style_mut(&mut self) -> &mut Style {
        &mut self.style
    }

    fn handle(&self) -> ArtHandle {
        self.handle
    }

    /// All contours fill with the style of the backmost child. Without children the
    /// compound's own style applies.
    fn fill_winding(&self, items: &PathCollection) -> Result<WindingRule> {
        match self.children.first() {
            Some(&first) => Ok(items.path(first)?.winding_rule()),
            None => Ok(self.winding_rule()),
        }
    }

    /// The children's contours in order.
    fn build_shape(&self, items: &PathCollection, shape: &mut Shape) -> Result<()> {
        if !self.attached {
            return Err(PathError::Detached);
        }
        for &child in &self.children {
            items.path(child)?.build_shape(items, shape)?;
        }
        Ok(())
    }
}
