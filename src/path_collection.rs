use crate::compound_path::CompoundPath;
use crate::error::{PathError, Result};
use crate::path::Path;
use crate::path_item::{PathItem, Style};
use crate::shape::{Shape, WindingRule};
use crate::store::ArtHandle;

/// Generational reference to an item in a [`PathCollection`].
/// Ids of removed items never resolve again, even when their slot is reused.
#[derive(Copy, Clone, Debug, Hash, Eq, PartialEq, Ord, PartialOrd)]
pub struct ItemId {
    index: u32,
    generation: u32,
}

impl ItemId {
    pub(crate) fn new(index: u32, generation: u32) -> ItemId {
        ItemId { index, generation }
    }
}

#[derive(Debug)]
pub enum Item {
    Path(Path),
    Compound(CompoundPath),
}

impl Item {
    pub fn as_path(&self) -> Option<&Path> {
        match self {
            Item::Path(path) => Some(path),
            Item::Compound(_) => None,
        }
    }

    pub fn as_compound(&self) -> Option<&CompoundPath> {
        match self {
            Item::Compound(compound) => Some(compound),
            Item::Path(_) => None,
        }
    }

    pub fn into_path(self) -> Result<Path> {
        match self {
            Item::Path(path) => Ok(path),
            Item::Compound(_) => Err(PathError::WrongItemKind { expected: "path" }),
        }
    }

    pub fn into_compound(self) -> Result<CompoundPath> {
        match self {
            Item::Compound(compound) => Ok(compound),
            Item::Path(_) => Err(PathError::WrongItemKind { expected: "compound path" }),
        }
    }

    fn detach(&mut self) {
        match self {
            Item::Path(path) => path.detach(),
            Item::Compound(compound) => compound.detach(),
        }
    }
}

impl PathItem for Item {
    fn style(&self) -> &Style {
        match self {
            Item::Path(path) => path.style(),
            Item::Compound(compound) => compound.style(),
        }
    }

    fn style_mut(&mut self) -> &mut Style {
        match self {
            Item::Path(path) => path.style_mut(),
            Item::Compound(compound) => compound.style_mut(),
        }
    }

    fn handle(&self) -> ArtHandle {
        match self {
            Item::Path(path) => path.handle(),
            Item::Compound(compound) => compound.handle(),
        }
    }

    fn fill_winding(&self, items: &PathCollection) -> Result<WindingRule> {
        match self {
            Item::Path(path) => path.fill_winding(items),
            Item::Compound(compound) => compound.fill_winding(items),
        }
    }

    fn build_shape(&self, items: &PathCollection, shape: &mut Shape) -> Result<()> {
        match self {
            Item::Path(path) => path.build_shape(items, shape),
            Item::Compound(compound) => compound.build_shape(items, shape),
        }
    }
}

#[derive(Debug)]
struct Node {
    item: Item,
    parent: Option<ItemId>,
}

#[derive(Debug, Default)]
struct Slot {
    generation: u32,
    node: Option<Node>,
}

/// Arena owning every item of a document.
///
/// Top level items are kept in paint order in `roots`; children of compound paths are listed
/// by their parent.
#[derive(Debug, Default)]
pub struct PathCollection {
    slots: Vec<Slot>,
    free: Vec<u32>,
    roots: Vec<ItemId>,
}

impl PathCollection {
    pub fn new() -> PathCollection {
        PathCollection::default()
    }

    /// Number of live items, children included.
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|slot| slot.node.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn roots(&self) -> &[ItemId] {
        &self.roots
    }

    pub fn contains(&self, id: ItemId) -> bool {
        self.node(id).is_ok()
    }

    /// Creates an item. `build` receives the id the item will be stored under.
    pub(crate) fn insert_with<F>(&mut self, build: F) -> ItemId
    where
        F: FnOnce(ItemId) -> Item,
    {
        let index = match self.free.pop() {
            Some(index) => index,
            None => {
                self.slots.push(Slot::default());
                (self.slots.len() - 1) as u32
            }
        };
        let slot = &mut self.slots[index as usize];
        let id = ItemId::new(index, slot.generation);
        slot.node = Some(Node {
            item: build(id),
            parent: None,
        });
        id
    }

    fn node(&self, id: ItemId) -> Result<&Node> {
        self.slots
            .get(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.node.as_ref())
            .ok_or(PathError::Detached)
    }

    fn node_mut(&mut self, id: ItemId) -> Result<&mut Node> {
        self.slots
            .get_mut(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.node.as_mut())
            .ok_or(PathError::Detached)
    }

    pub fn get(&self, id: ItemId) -> Result<&Item> {
        Ok(&self.node(id)?.item)
    }

    pub(crate) fn get_mut(&mut self, id: ItemId) -> Result<&mut Item> {
        Ok(&mut self.node_mut(id)?.item)
    }

    pub fn path(&self, id: ItemId) -> Result<&Path> {
        self.get(id)?.as_path().ok_or(PathError::WrongItemKind { expected: "path" })
    }

    pub(crate) fn path_mut(&mut self, id: ItemId) -> Result<&mut Path> {
        match self.get_mut(id)? {
            Item::Path(path) => Ok(path),
            Item::Compound(_) => Err(PathError::WrongItemKind { expected: "path" }),
        }
    }

    pub fn compound(&self, id: ItemId) -> Result<&CompoundPath> {
        self.get(id)?
            .as_compound()
            .ok_or(PathError::WrongItemKind { expected: "compound path" })
    }

    pub(crate) fn compound_mut(&mut self, id: ItemId) -> Result<&mut CompoundPath> {
        match self.get_mut(id)? {
            Item::Compound(compound) => Ok(compound),
            Item::Path(_) => Err(PathError::WrongItemKind { expected: "compound path" }),
        }
    }

    pub fn parent(&self, id: ItemId) -> Result<Option<ItemId>> {
        Ok(self.node(id)?.parent)
    }

    /// The list `id` is a member of: the top level or its parent's children.
    fn siblings_mut(&mut self, id: ItemId) -> Result<&mut Vec<ItemId>> {
        match self.parent(id)? {
            Some(parent) => Ok(self.compound_mut(parent)?.children_mut()),
            None => Ok(&mut self.roots),
        }
    }

    fn unlink(&mut self, id: ItemId) -> Result<()> {
        let siblings = self.siblings_mut(id)?;
        if let Some(position) = siblings.iter().position(|&sibling| sibling == id) {
            siblings.remove(position);
        }
        self.node_mut(id)?.parent = None;
        Ok(())
    }

    pub(crate) fn push_root(&mut self, id: ItemId) -> Result<()> {
        self.node(id)?;
        self.roots.push(id);
        Ok(())
    }

    /// Makes `child` the last child of the compound `parent`.
    pub(crate) fn append_child(&mut self, parent: ItemId, child: ItemId) -> Result<()> {
        self.compound(parent)?;
        self.path(child)?;
        self.unlink(child)?;
        self.compound_mut(parent)?.children_mut().push(child);
        self.node_mut(child)?.parent = Some(parent);
        Ok(())
    }

    /// Moves `id` directly after `anchor`, into the same parent.
    pub(crate) fn insert_after(&mut self, anchor: ItemId, id: ItemId) -> Result<()> {
        self.unlink(id)?;
        let parent = self.parent(anchor)?;
        let siblings = self.siblings_mut(anchor)?;
        let position = siblings.iter().position(|&sibling| sibling == anchor).map_or(siblings.len(), |p| p + 1);
        siblings.insert(position, id);
        self.node_mut(id)?.parent = parent;
        Ok(())
    }

    /// Moves `id` to the position of `anchor`, which is unlinked.
    pub(crate) fn replace(&mut self, anchor: ItemId, id: ItemId) -> Result<()> {
        self.insert_after(anchor, id)?;
        self.unlink(anchor)
    }

    /// Takes `id` and its descendants out of the collection. The returned item is detached:
    /// its ids no longer resolve and its segment data can not be read.
    pub(crate) fn remove(&mut self, id: ItemId) -> Result<Item> {
        self.unlink(id)?;
        let slot = &mut self.slots[id.index as usize];
        let mut node = slot.node.take().ok_or(PathError::Detached)?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(id.index);

        if let Item::Compound(compound) = &mut node.item {
            for child in std::mem::take(compound.children_mut()) {
                if let Ok(node) = self.node_mut(child) {
                    node.parent = None;
                }
                self.remove(child)?;
            }
        }
        node.item.detach();
        Ok(node.item)
    }

    pub fn iter(&self) -> impl Iterator<Item = (ItemId, &Item)> {
        self.slots.iter().enumerate().filter_map(|(index, slot)| {
            slot.node
                .as_ref()
                .map(|node| (ItemId::new(index as u32, slot.generation), &node.item))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry_utilities::types::*;
    use crate::segment::Segment;

    fn add_path(items: &mut PathCollection) -> ItemId {
        let id = items.insert_with(|id| {
            Item::Path(Path::new(id, ArtHandle(0), vec![Segment::corner(point(0.0, 0.0))], false, Style::default()))
        });
        items.push_root(id).unwrap();
        id
    }

    fn add_compound(items: &mut PathCollection) -> ItemId {
        let id = items.insert_with(|_| Item::Compound(CompoundPath::new(ArtHandle(1), Style::default())));
        items.push_root(id).unwrap();
        id
    }

    #[test]
    fn stale_ids_do_not_resolve_after_slot_reuse() {
        let mut items = PathCollection::new();
        let first = add_path(&mut items);
        let removed = items.remove(first).unwrap().into_path().unwrap();
        assert!(matches!(removed.segments().get(0), Err(PathError::Detached)));

        let second = add_path(&mut items);
        assert_ne!(first, second);
        assert!(matches!(items.get(first), Err(PathError::Detached)));
        assert!(items.get(second).is_ok());
        assert_eq!(items.roots(), &[second]);
    }

    #[test]
    fn children_link_to_their_parent() {
        let mut items = PathCollection::new();
        let compound = add_compound(&mut items);
        let a = add_path(&mut items);
        let b = add_path(&mut items);
        items.append_child(compound, a).unwrap();
        items.append_child(compound, b).unwrap();

        assert_eq!(items.roots(), &[compound]);
        assert_eq!(items.compound(compound).unwrap().children(), &[a, b]);
        assert_eq!(items.parent(a).unwrap(), Some(compound));
        assert!(matches!(items.append_child(a, b), Err(PathError::WrongItemKind { .. })));
        assert!(matches!(items.append_child(compound, compound), Err(PathError::WrongItemKind { .. })));
    }

    #[test]
    fn insert_after_and_replace_keep_order() {
        let mut items = PathCollection::new();
        let a = add_path(&mut items);
        let b = add_path(&mut items);
        let c = add_path(&mut items);
        items.insert_after(a, c).unwrap();
        assert_eq!(items.roots(), &[a, c, b]);
        items.replace(b, a).unwrap();
        assert_eq!(items.roots(), &[c, a]);
    }

    #[test]
    fn removing_a_compound_removes_its_children() {
        let mut items = PathCollection::new();
        let compound = add_compound(&mut items);
        let child = add_path(&mut items);
        items.append_child(compound, child).unwrap();

        let removed = items.remove(compound).unwrap();
        assert!(!removed.into_compound().unwrap().is_attached());
        assert!(!items.contains(child));
        assert!(items.is_empty());
    }
}
