use crate::commit_manager::CommitManager;
use crate::compound_path::CompoundPath;
use crate::config::{FitOptions, FlattenOptions, Settings};
use crate::error::{PathError, Result};
use crate::geometry_utilities::types::*;
use crate::hit_test::HitTest;
use crate::path::Path;
use crate::path_collection::{Item, ItemId, PathCollection};
use crate::path_item::{PathItem, Style};
use crate::segment::Segment;
use crate::segment_list::SegmentList;
use crate::shape::{PathOp, Shape};
use crate::shapes;
use crate::store::{ArtHandle, ArtStore, StoreError};

/// Owns the items, their backing store and the buffer of edits not yet committed to it.
///
/// Edits through [`PathMut`] and [`CompoundMut`] only touch the local segment data and mark the
/// item as pending. Every operation that reads geometry commits the item first.
pub struct Document<S: ArtStore> {
    store: S,
    items: PathCollection,
    commits: CommitManager,
    settings: Settings,
}

impl<S: ArtStore> Document<S> {
    pub fn new(store: S) -> Document<S> {
        Document::with_settings(store, Settings::default())
    }

    pub fn with_settings(store: S, settings: Settings) -> Document<S> {
        Document {
            store,
            items: PathCollection::new(),
            commits: CommitManager::new(),
            settings,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn settings_mut(&mut self) -> &mut Settings {
        &mut self.settings
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    /// Top level items in paint order.
    pub fn roots(&self) -> &[ItemId] {
        self.items.roots()
    }

    pub fn contains(&self, id: ItemId) -> bool {
        self.items.contains(id)
    }

    pub fn parent(&self, id: ItemId) -> Result<Option<ItemId>> {
        self.items.parent(id)
    }

    pub fn children(&self, id: ItemId) -> Result<&[ItemId]> {
        Ok(self.items.compound(id)?.children())
    }

    fn insert_path(&mut self, segments: Vec<Segment>, closed: bool, style: Style) -> ItemId {
        let handle = self.store.create();
        let id = self
            .items
            .insert_with(|id| Item::Path(Path::new(id, handle, segments, closed, style)));
        self.commits.mark(id);
        id
    }

    pub fn create_path(&mut self) -> ItemId {
        self.create_path_from(Vec::new(), false)
    }

    pub fn create_path_from(&mut self, segments: Vec<Segment>, closed: bool) -> ItemId {
        let id = self.insert_path(segments, closed, Style::default());
        self.roots_push(id);
        log::debug!("created path {:?}", id);
        id
    }

    fn roots_push(&mut self, id: ItemId) {
        if let Err(err) = self.items.push_root(id) {
            log::warn!("could not add {:?} to the document: {}", id, err);
        }
    }

    pub fn create_compound_path(&mut self) -> ItemId {
        let handle = self.store.create();
        let id = self
            .items
            .insert_with(|_| Item::Compound(CompoundPath::new(handle, Style::default())));
        self.roots_push(id);
        log::debug!("created compound path {:?}", id);
        id
    }

    /// Groups existing paths into a new compound path, in the given order.
    pub fn create_compound_from(&mut self, children: &[ItemId]) -> Result<ItemId> {
        for &child in children {
            self.items.path(child)?;
        }
        let id = self.create_compound_path();
        for &child in children {
            self.items.append_child(id, child)?;
        }
        Ok(id)
    }

    pub fn create_rectangle(&mut self, rect: &ArtRect) -> ItemId {
        self.create_path_from(shapes::rectangle(rect), true)
    }

    pub fn create_rounded_rectangle(&mut self, rect: &ArtRect, radius: ArtVector) -> ItemId {
        self.create_path_from(shapes::rounded_rectangle(rect, radius), true)
    }

    pub fn create_oval(&mut self, rect: &ArtRect) -> ItemId {
        self.create_path_from(shapes::oval(rect), true)
    }

    pub fn create_regular_polygon(&mut self, center: ArtPoint, sides: usize, radius: f64) -> Result<ItemId> {
        Ok(self.create_path_from(shapes::regular_polygon(center, sides, radius)?, true))
    }

    pub fn create_star(&mut self, center: ArtPoint, points: usize, radius1: f64, radius2: f64) -> Result<ItemId> {
        Ok(self.create_path_from(shapes::star(center, points, radius1, radius2)?, true))
    }

    pub fn path(&mut self, id: ItemId) -> Result<PathMut<'_, S>> {
        self.items.path(id)?;
        Ok(PathMut { doc: self, id })
    }

    pub fn compound(&mut self, id: ItemId) -> Result<CompoundMut<'_, S>> {
        self.items.compound(id)?;
        Ok(CompoundMut { doc: self, id })
    }

    /// The item after committing its pending edits.
    pub fn item(&mut self, id: ItemId) -> Result<&Item> {
        self.commit(id)?;
        self.items.get(id)
    }

    pub fn is_pending(&self, id: ItemId) -> bool {
        self.commits.is_pending(id)
    }

    pub fn pending_count(&self) -> usize {
        self.commits.pending_count()
    }

    /// Writes the pending edits of `id`, or of all children of a compound path, to the store.
    pub fn commit(&mut self, id: ItemId) -> Result<()> {
        match self.items.get(id)? {
            Item::Path(path) => {
                let handle = path.handle();
                let segments = path.segments().as_slice()?;
                let closed = path.is_closed();
                let store = &mut self.store;
                self.commits.commit(id, || {
                    store
                        .commit(handle, segments, closed)
                        .map_err(PathError::sync(handle))
                })
            }
            Item::Compound(compound) => {
                let children = compound.children().to_vec();
                for child in children {
                    self.commit(child)?;
                }
                Ok(())
            }
        }
    }

    /// Commits every pending item, stopping at the first failure.
    pub fn commit_all(&mut self) -> Result<()> {
        let pending: Vec<ItemId> = self.commits.pending().collect();
        for id in pending {
            self.commit(id)?;
        }
        Ok(())
    }

    fn collect_handles(&self, id: ItemId, out: &mut Vec<(ItemId, ArtHandle)>) -> Result<()> {
        let item = self.items.get(id)?;
        out.push((id, item.handle()));
        if let Item::Compound(compound) = item {
            for &child in compound.children() {
                self.collect_handles(child, out)?;
            }
        }
        Ok(())
    }

    /// Takes an item out of the document and releases its art. The returned item is detached,
    /// reading its segments fails, and `id` no longer resolves.
    pub fn remove(&mut self, id: ItemId) -> Result<Item> {
        let mut removed = Vec::new();
        self.collect_handles(id, &mut removed)?;
        let item = self.items.remove(id)?;
        for (id, handle) in removed {
            self.commits.forget(id);
            self.store.release(handle);
        }
        log::debug!("removed {:?}", id);
        Ok(item)
    }

    /// Copies an item, and for compound paths its children, placing the copy directly above it.
    pub fn clone_item(&mut self, id: ItemId) -> Result<ItemId> {
        self.commit(id)?;
        let copy = match self.items.get(id)? {
            Item::Path(path) => {
                let segments = path.segments().as_slice()?.to_vec();
                let (closed, style) = (path.is_closed(), *path.style());
                self.insert_path(segments, closed, style)
            }
            Item::Compound(compound) => {
                let children = compound.children().to_vec();
                let style = *compound.style();
                let handle = self.store.create();
                let copy = self.items.insert_with(|_| Item::Compound(CompoundPath::new(handle, style)));
                self.items.push_root(copy)?;
                for child in children {
                    let child_copy = self.clone_item(child)?;
                    self.items.append_child(copy, child_copy)?;
                }
                copy
            }
        };
        self.items.insert_after(id, copy)?;
        log::debug!("cloned {:?} into {:?}", id, copy);
        Ok(copy)
    }

    pub fn to_shape(&mut self, id: ItemId) -> Result<Shape> {
        self.commit(id)?;
        self.items.get(id)?.to_shape(&self.items)
    }

    /// Length of a path, or the summed length of the children of a compound path.
    pub fn length(&mut self, id: ItemId, flatness: f64) -> Result<f64> {
        self.commit(id)?;
        match self.items.get(id)? {
            Item::Path(path) => path.length(flatness),
            Item::Compound(compound) => compound
                .children()
                .iter()
                .map(|&child| self.items.path(child)?.length(flatness))
                .sum(),
        }
    }

    pub fn transform(&mut self, id: ItemId, transform: &ArtTransform) -> Result<()> {
        let targets = match self.items.get(id)? {
            Item::Path(_) => vec![id],
            Item::Compound(compound) => compound.children().to_vec(),
        };
        for target in targets {
            self.path(target)?.transform(transform)?;
        }
        Ok(())
    }

    pub fn style(&self, id: ItemId) -> Result<Style> {
        Ok(*self.items.get(id)?.style())
    }

    pub fn set_style(&mut self, id: ItemId, style: Style) -> Result<()> {
        *self.items.get_mut(id)?.style_mut() = style;
        Ok(())
    }
}

/// Editing access to one path of a [`Document`].
pub struct PathMut<'a, S: ArtStore> {
    doc: &'a mut Document<S>,
    id: ItemId,
}

impl<'a, S: ArtStore> PathMut<'a, S> {
    pub fn id(&self) -> ItemId {
        self.id
    }

    fn get(&self) -> Result<&Path> {
        self.doc.items.path(self.id)
    }

    pub fn handle(&self) -> Result<ArtHandle> {
        Ok(self.get()?.handle())
    }

    /// Runs a local edit and marks the path pending if it changed anything.
    fn edit<R, F>(&mut self, f: F) -> Result<R>
    where
        F: FnOnce(&mut Path) -> Result<R>,
    {
        let path = self.doc.items.path_mut(self.id)?;
        let version = path.version();
        let result = f(path);
        if path.version() != version {
            self.doc.commits.mark(self.id);
        }
        result
    }

    /// Commits, then reads.
    fn read<R, F>(&mut self, f: F) -> Result<R>
    where
        F: FnOnce(&Path) -> Result<R>,
    {
        self.doc.commit(self.id)?;
        f(self.doc.items.path(self.id)?)
    }

    /// Commits, lets the store rewrite the path and pulls the result back.
    fn store_operation<F>(&mut self, name: &str, operation: F) -> Result<usize>
    where
        F: FnOnce(&mut S, ArtHandle) -> Result<usize, StoreError>,
    {
        self.doc.commit(self.id)?;
        let handle = self.get()?.handle();
        let count = operation(&mut self.doc.store, handle).map_err(PathError::sync(handle))?;
        let fetched = self.doc.store.fetch(handle).map_err(PathError::sync(handle))?;
        self.doc.items.path_mut(self.id)?.segments_mut().resync(count, fetched);
        log::debug!("{} on {:?} left {} segments", name, self.id, count);
        Ok(count)
    }

    pub fn segments(&self) -> Result<&SegmentList> {
        Ok(self.get()?.segments())
    }

    pub fn is_closed(&self) -> Result<bool> {
        Ok(self.get()?.is_closed())
    }

    pub fn curve_count(&self) -> Result<usize> {
        self.get()?.curve_count()
    }

    pub fn style(&self) -> Result<Style> {
        Ok(*self.get()?.style())
    }

    pub fn set_style(&mut self, style: Style) -> Result<()> {
        *self.doc.items.path_mut(self.id)?.style_mut() = style;
        Ok(())
    }

    pub fn move_to(&mut self, to: ArtPoint) -> Result<()> {
        self.edit(|path| path.segments_mut().move_to(to))
    }

    pub fn line_to(&mut self, to: ArtPoint) -> Result<()> {
        self.edit(|path| path.segments_mut().line_to(to))
    }

    pub fn curve_to(&mut self, ctrl1: ArtPoint, ctrl2: ArtPoint, to: ArtPoint) -> Result<()> {
        self.edit(|path| path.segments_mut().curve_to(ctrl1, ctrl2, to))
    }

    pub fn quad_to(&mut self, ctrl: ArtPoint, to: ArtPoint) -> Result<()> {
        self.edit(|path| path.segments_mut().quad_to(ctrl, to))
    }

    pub fn arc_to(&mut self, center: ArtPoint, end: ArtPoint, ccw: bool) -> Result<()> {
        self.edit(|path| path.segments_mut().arc_to(center, end, ccw))
    }

    pub fn close_path(&mut self) -> Result<()> {
        self.set_closed(true)
    }

    pub fn set_closed(&mut self, closed: bool) -> Result<()> {
        self.edit(|path| path.set_closed(closed))
    }

    pub fn push(&mut self, segment: Segment) -> Result<()> {
        self.edit(|path| path.segments_mut().push(segment))
    }

    pub fn insert(&mut self, index: usize, segment: Segment) -> Result<()> {
        self.edit(|path| path.segments_mut().insert(index, segment))
    }

    pub fn remove_range(&mut self, start: usize, end: usize) -> Result<Vec<Segment>> {
        self.edit(|path| path.segments_mut().remove_range(start, end))
    }

    pub fn set_segments(&mut self, segments: Vec<Segment>) -> Result<()> {
        self.edit(|path| path.segments_mut().set_all(segments))
    }

    pub fn transform(&mut self, transform: &ArtTransform) -> Result<()> {
        self.edit(|path| path.transform(transform))
    }

    /// Draws a path stream onto this contour, see [`Path::append`] for how moves and closes
    /// are treated. Returns the number of ops consumed.
    pub fn append(&mut self, shape: &Shape, connect: bool) -> Result<usize> {
        self.append_ops(&shape.ops, connect)
    }

    pub fn append_ops(&mut self, ops: &[PathOp], connect: bool) -> Result<usize> {
        self.edit(|path| path.append(ops, connect))
    }

    pub fn length(&mut self, flatness: f64) -> Result<f64> {
        self.read(|path| path.length(flatness))
    }

    pub fn length_default(&mut self) -> Result<f64> {
        let flatness = self.doc.settings.flatness;
        self.length(flatness)
    }

    pub fn area(&mut self) -> Result<f64> {
        self.read(|path| path.area())
    }

    pub fn bounds(&mut self) -> Result<Option<ArtBox>> {
        self.read(|path| path.bounds())
    }

    pub fn hit_test(&mut self, point: ArtPoint, epsilon: f64) -> Result<Option<HitTest>> {
        self.read(|path| path.hit_test(point, epsilon))
    }

    pub fn hit_test_default(&mut self, point: ArtPoint) -> Result<Option<HitTest>> {
        let epsilon = self.doc.settings.hit_epsilon;
        self.hit_test(point, epsilon)
    }

    pub fn position_with_length(&mut self, length: f64, flatness: f64) -> Result<Option<HitTest>> {
        self.read(|path| path.position_with_length(length, flatness))
    }

    pub fn position_with_length_default(&mut self, length: f64) -> Result<Option<HitTest>> {
        let flatness = self.doc.settings.flatness;
        self.position_with_length(length, flatness)
    }

    pub fn to_shape(&mut self) -> Result<Shape> {
        self.doc.to_shape(self.id)
    }

    /// Reverses the direction of the path. The drawn shape stays the same, the winding flips.
    pub fn reverse(&mut self) -> Result<()> {
        self.store_operation("reverse", |store, handle| {
            store.reverse(handle)?;
            store.segment_count(handle)
        })?;
        Ok(())
    }

    /// Replaces runs of points with smooth curves. Returns the new segment count.
    pub fn points_to_curves(&mut self, options: &FitOptions) -> Result<usize> {
        self.store_operation("points_to_curves", |store, handle| store.points_to_curves(handle, options))
    }

    pub fn points_to_curves_default(&mut self) -> Result<usize> {
        let options = self.doc.settings.fit.clone();
        self.points_to_curves(&options)
    }

    /// Replaces curves with evenly spaced points. Returns the new segment count.
    pub fn curves_to_points(&mut self, options: &FlattenOptions) -> Result<usize> {
        self.store_operation("curves_to_points", |store, handle| store.curves_to_points(handle, options))
    }

    pub fn curves_to_points_default(&mut self) -> Result<usize> {
        let options = self.doc.settings.flatten.clone();
        self.curves_to_points(&options)
    }

    /// Drops anchors that do not change the path by more than `flatness`.
    pub fn reduce_segments(&mut self, flatness: f64) -> Result<usize> {
        self.store_operation("reduce_segments", |store, handle| store.reduce_segments(handle, flatness))
    }

    pub fn reduce_segments_default(&mut self) -> Result<usize> {
        let flatness = self.doc.settings.flatness;
        self.reduce_segments(flatness)
    }

    /// Splits the path at `parameter` on curve `index`. The receiver keeps the head, the tail
    /// becomes a new open path placed directly above it with the same style.
    ///
    /// A parameter of 1 or more continues on the next curve. Returns `None` when the position
    /// does not lie strictly inside the path.
    pub fn split(&mut self, index: usize, parameter: f64) -> Result<Option<ItemId>> {
        self.doc.commit(self.id)?;
        let tail = match self.edit(|path| path.split_off(index, parameter))? {
            Some(tail) => tail,
            None => return Ok(None),
        };

        let style = self.style()?;
        let new_id = self.doc.insert_path(tail, false, style);
        self.doc.items.insert_after(self.id, new_id)?;
        log::debug!("split {:?} at {}+{} into {:?}", self.id, index, parameter, new_id);
        Ok(Some(new_id))
    }

    /// Splits at a position given as curve index plus parameter, e.g. `2.5`.
    pub fn split_at(&mut self, position: f64) -> Result<Option<ItemId>> {
        if !position.is_finite() || position < 0.0 {
            return Ok(None);
        }
        let index = position.floor();
        self.split(index as usize, position - index)
    }

    pub fn clone_item(&mut self) -> Result<ItemId> {
        self.doc.clone_item(self.id)
    }
}

/// Editing access to one compound path of a [`Document`].
pub struct CompoundMut<'a, S: ArtStore> {
    doc: &'a mut Document<S>,
    id: ItemId,
}

impl<'a, S: ArtStore> CompoundMut<'a, S> {
    pub fn id(&self) -> ItemId {
        self.id
    }

    fn get(&self) -> Result<&CompoundPath> {
        self.doc.items.compound(self.id)
    }

    pub fn children(&self) -> Result<&[ItemId]> {
        Ok(self.get()?.children())
    }

    fn current(&self) -> Result<ItemId> {
        self.get()?
            .current()
            .ok_or(PathError::InvalidState("use move_to before drawing on a compound path"))
    }

    fn current_path(&mut self) -> Result<PathMut<'_, S>> {
        let current = self.current()?;
        self.doc.path(current)
    }

    /// Starts a new contour as a new child path.
    pub fn move_to(&mut self, to: ArtPoint) -> Result<ItemId> {
        let style = *self.get()?.style();
        let child = self.doc.insert_path(Vec::new(), false, style);
        self.doc.items.append_child(self.id, child)?;
        self.doc.path(child)?.move_to(to)?;
        Ok(child)
    }

    pub fn line_to(&mut self, to: ArtPoint) -> Result<()> {
        self.current_path()?.line_to(to)
    }

    pub fn curve_to(&mut self, ctrl1: ArtPoint, ctrl2: ArtPoint, to: ArtPoint) -> Result<()> {
        self.current_path()?.curve_to(ctrl1, ctrl2, to)
    }

    pub fn quad_to(&mut self, ctrl: ArtPoint, to: ArtPoint) -> Result<()> {
        self.current_path()?.quad_to(ctrl, to)
    }

    pub fn arc_to(&mut self, center: ArtPoint, end: ArtPoint, ccw: bool) -> Result<()> {
        self.current_path()?.arc_to(center, end, ccw)
    }

    pub fn close_path(&mut self) -> Result<()> {
        self.current_path()?.close_path()
    }

    /// Draws a multi-contour stream, starting a new child at every move. With `connect` set, a
    /// leading move continues the current child instead, as in [`PathMut::append`].
    pub fn append(&mut self, shape: &Shape, connect: bool) -> Result<()> {
        self.append_ops(&shape.ops, connect)
    }

    pub fn append_ops(&mut self, ops: &[PathOp], connect: bool) -> Result<()> {
        let mut connect = connect;
        for op in ops {
            match *op {
                PathOp::MoveTo(to) => {
                    let last = match self.current() {
                        Ok(current) => self.doc.items.path(current)?.segments().last()?.map(|s| s.point),
                        Err(_) => None,
                    };
                    match last {
                        Some(last) if connect => {
                            if last != to {
                                self.line_to(to)?;
                            }
                        }
                        _ => {
                            self.move_to(to)?;
                        }
                    }
                }
                PathOp::LineTo(to) => self.line_to(to)?,
                PathOp::QuadTo(ctrl, to) => self.quad_to(ctrl, to)?,
                PathOp::CubicTo(ctrl1, ctrl2, to) => self.curve_to(ctrl1, ctrl2, to)?,
                PathOp::Close => self.close_path()?,
            }
            connect = false;
        }
        Ok(())
    }

    /// With exactly one child, puts the child in the compound's place and removes the compound.
    /// Returns the id of whatever now stands in that place.
    pub fn simplify(self) -> Result<ItemId> {
        let children = self.get()?.children().to_vec();
        if children.len() != 1 {
            return Ok(self.id);
        }

        let child = children[0];
        self.doc.items.replace(self.id, child)?;
        self.doc.remove(self.id)?;
        log::debug!("simplified {:?} into {:?}", self.id, child);
        Ok(child)
    }

    pub fn length(&mut self, flatness: f64) -> Result<f64> {
        self.doc.length(self.id, flatness)
    }

    pub fn length_default(&mut self) -> Result<f64> {
        let flatness = self.doc.settings.flatness;
        self.length(flatness)
    }

    pub fn transform(&mut self, transform: &ArtTransform) -> Result<()> {
        self.doc.transform(self.id, transform)
    }

    pub fn to_shape(&mut self) -> Result<Shape> {
        self.doc.to_shape(self.id)
    }

    pub fn clone_item(&mut self) -> Result<ItemId> {
        self.doc.clone_item(self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hit_test::HitKind;
    use crate::store::MemoryStore;
    use approx::assert_relative_eq;
    use std::f64::consts::TAU;

    fn init() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn document() -> Document<MemoryStore> {
        init();
        Document::new(MemoryStore::new())
    }

    fn rect(x: f64, y: f64, w: f64, h: f64) -> ArtRect {
        ArtRect::new(point(x, y), euclid::Size2D::new(w, h))
    }

    fn polyline(doc: &mut Document<MemoryStore>, count: usize) -> ItemId {
        let segments = (0..count)
            .map(|i| Segment::corner(point(i as f64 * 10.0, (i % 2) as f64)))
            .collect();
        doc.create_path_from(segments, false)
    }

    #[test]
    fn reads_commit_pending_edits_once() {
        let mut doc = document();
        let id = doc.create_path();
        let handle = {
            let mut path = doc.path(id).unwrap();
            path.move_to(point(0.0, 0.0)).unwrap();
            path.line_to(point(10.0, 0.0)).unwrap();
            path.line_to(point(10.0, 10.0)).unwrap();
            path.handle().unwrap()
        };
        assert!(doc.is_pending(id));
        assert_eq!(doc.store().commit_count(), 0);

        assert_eq!(doc.path(id).unwrap().length(0.1).unwrap(), 20.0);
        assert!(!doc.is_pending(id));
        assert_eq!(doc.store().commit_count(), 1);
        assert_eq!(doc.store().segments(handle).unwrap().len(), 3);

        doc.path(id).unwrap().area().unwrap();
        assert_eq!(doc.store().commit_count(), 1);

        // Closing is an edit even though no segment changed.
        doc.path(id).unwrap().close_path().unwrap();
        assert!(doc.is_pending(id));
        doc.commit(id).unwrap();
        assert_eq!(doc.store().is_closed(handle), Some(true));
    }

    #[test]
    fn failed_commit_keeps_the_item_pending() {
        let mut doc = document();
        let id = doc.create_rectangle(&rect(0.0, 0.0, 10.0, 10.0));
        let handle = doc.path(id).unwrap().handle().unwrap();
        doc.store_mut().lock(handle).unwrap();

        let result = doc.path(id).unwrap().length(0.1);
        assert!(matches!(
            result,
            Err(PathError::SyncFailure { source: StoreError::Locked(_), .. })
        ));
        assert!(doc.is_pending(id));

        doc.store_mut().unlock(handle).unwrap();
        assert_eq!(doc.path(id).unwrap().length(0.1).unwrap(), 40.0);
        assert!(!doc.is_pending(id));
    }

    #[test]
    fn commit_all_flushes_every_pending_item() {
        let mut doc = document();
        doc.create_rectangle(&rect(0.0, 0.0, 10.0, 10.0));
        doc.create_oval(&rect(0.0, 0.0, 10.0, 10.0));
        assert_eq!(doc.pending_count(), 2);
        doc.commit_all().unwrap();
        assert_eq!(doc.pending_count(), 0);
        assert_eq!(doc.store().commit_count(), 2);
    }

    #[test]
    fn reverse_flips_the_area() {
        let mut doc = document();
        let id = doc.create_rectangle(&rect(0.0, 0.0, 10.0, 10.0));
        let mut path = doc.path(id).unwrap();
        assert_relative_eq!(path.area().unwrap(), 100.0, epsilon = 1e-9);
        let version = path.segments().unwrap().version();

        path.reverse().unwrap();
        assert_eq!(path.segments().unwrap().version(), version + 1);
        assert_relative_eq!(path.area().unwrap(), -100.0, epsilon = 1e-9);
        assert_eq!(path.length(0.1).unwrap(), 40.0);
    }

    #[test]
    fn reversing_twice_restores_the_segments() {
        let mut doc = document();
        let id = doc.create_rounded_rectangle(&rect(0.0, 0.0, 20.0, 10.0), vector(3.0, 2.0));
        let mut path = doc.path(id).unwrap();
        let original = path.segments().unwrap().as_slice().unwrap().to_vec();
        let shape = path.to_shape().unwrap();

        path.reverse().unwrap();
        assert_ne!(path.segments().unwrap().as_slice().unwrap(), &original[..]);
        path.reverse().unwrap();
        assert_eq!(path.segments().unwrap().as_slice().unwrap(), &original[..]);
        assert_eq!(path.to_shape().unwrap(), shape);
    }

    #[test]
    fn square_built_with_the_builder() {
        let mut doc = document();
        let id = doc.create_path();
        let mut path = doc.path(id).unwrap();
        path.move_to(point(0.0, 0.0)).unwrap();
        path.line_to(point(10.0, 0.0)).unwrap();
        path.line_to(point(10.0, 10.0)).unwrap();
        path.line_to(point(0.0, 10.0)).unwrap();
        path.close_path().unwrap();

        assert_eq!(path.curve_count().unwrap(), 4);
        assert_eq!(path.length_default().unwrap(), 40.0);
        let hit = path.hit_test(point(5.0, 0.0), 0.1).unwrap().unwrap();
        assert_eq!(hit.curve, 0);
        assert_relative_eq!(hit.parameter, 0.5, epsilon = 1e-6);
    }

    #[test]
    fn oval_length_matches_the_circle() {
        let mut doc = document();
        let id = doc.create_oval(&rect(-10.0, -10.0, 20.0, 20.0));
        let length = doc.path(id).unwrap().length(0.001).unwrap();
        assert!((length - TAU * 10.0).abs() < TAU * 10.0 * 0.001, "{}", length);
    }

    #[test]
    fn flattening_pulls_the_store_result_back() {
        let mut doc = document();
        let id = doc.create_oval(&rect(-10.0, -10.0, 20.0, 20.0));
        let mut path = doc.path(id).unwrap();
        let before = path.length(0.001).unwrap();

        let count = path.curves_to_points_default().unwrap();
        assert!(count > 4);
        assert_eq!(path.segments().unwrap().len().unwrap(), count);
        assert!(path.segments().unwrap().iter().unwrap().all(|s| !s.has_handles()));
        let after = path.length(0.001).unwrap();
        assert!((before - after).abs() < before * 0.02);

        let rejected = path.curves_to_points(&FlattenOptions::with_max_point_distance(0.0));
        assert!(matches!(
            rejected,
            Err(PathError::SyncFailure { source: StoreError::Rejected(_), .. })
        ));
        assert_eq!(path.segments().unwrap().len().unwrap(), count);
    }

    #[test]
    fn reduce_drops_collinear_points() {
        let mut doc = document();
        let segments = (0..5).map(|i| Segment::corner(point(i as f64, 0.0))).collect();
        let id = doc.create_path_from(segments, false);
        assert_eq!(doc.path(id).unwrap().reduce_segments_default().unwrap(), 2);
    }

    #[test]
    fn hit_test_reports_anchors_and_curves() {
        let mut doc = document();
        let id = doc.create_rectangle(&rect(0.0, 0.0, 10.0, 10.0));
        let mut path = doc.path(id).unwrap();
        let hit = path.hit_test_default(point(10.0, 0.0)).unwrap().unwrap();
        assert_eq!(hit.kind, HitKind::Anchor);
        let hit = path.hit_test(point(10.05, 5.0), 0.1).unwrap().unwrap();
        assert_eq!(hit.curve, 1);
        assert_eq!(hit.kind, HitKind::Curve);
        assert!(path.hit_test_default(point(5.0, 5.0)).unwrap().is_none());
    }

    #[test]
    fn split_places_the_tail_above_the_receiver() {
        let mut doc = document();
        let id = polyline(&mut doc, 5);
        let other = polyline(&mut doc, 2);
        doc.path(id).unwrap().set_style(Style::even_odd()).unwrap();
        doc.commit_all().unwrap();

        let tail = doc.path(id).unwrap().split(2, 0.0).unwrap().unwrap();
        assert_eq!(doc.roots(), &[id, tail, other]);
        assert!(doc.is_pending(id));
        assert!(doc.is_pending(tail));

        let tail_path = doc.path(tail).unwrap();
        assert!(!tail_path.is_closed().unwrap());
        assert_eq!(tail_path.style().unwrap(), Style::even_odd());
        assert_eq!(tail_path.segments().unwrap().len().unwrap(), 3);
        assert_eq!(tail_path.segments().unwrap().get(0).unwrap().point, point(20.0, 0.0));
        assert_eq!(doc.path(id).unwrap().segments().unwrap().len().unwrap(), 3);

        assert!(doc.path(id).unwrap().split_at(-1.0).unwrap().is_none());
        assert!(doc.path(id).unwrap().split_at(f64::NAN).unwrap().is_none());
        assert!(doc.path(id).unwrap().split_at(0.5).unwrap().is_some());
    }

    #[test]
    fn removed_items_are_detached() {
        let mut doc = document();
        let id = doc.create_rectangle(&rect(0.0, 0.0, 10.0, 10.0));
        let handle = doc.path(id).unwrap().handle().unwrap();

        let removed = doc.remove(id).unwrap().into_path().unwrap();
        assert!(matches!(removed.segments().get(0), Err(PathError::Detached)));
        assert!(matches!(doc.path(id), Err(PathError::Detached)));
        assert!(!doc.store().contains(handle));
        assert!(!doc.is_pending(id));
        assert!(doc.roots().is_empty());
    }

    #[test]
    fn clone_copies_geometry_and_style() {
        let mut doc = document();
        let id = doc.create_star(point(0.0, 0.0), 5, 10.0, 4.0).unwrap();
        doc.set_style(id, Style::even_odd()).unwrap();
        let copy = doc.path(id).unwrap().clone_item().unwrap();

        assert_eq!(doc.roots(), &[id, copy]);
        assert!(doc.is_pending(copy));
        assert_eq!(doc.style(copy).unwrap(), Style::even_odd());
        let original = doc.to_shape(id).unwrap();
        assert_eq!(doc.to_shape(copy).unwrap(), original);
    }

    #[test]
    fn compound_drawing_needs_a_contour() {
        let mut doc = document();
        let id = doc.create_compound_path();
        let mut compound = doc.compound(id).unwrap();
        assert!(matches!(compound.line_to(point(1.0, 0.0)), Err(PathError::InvalidState(_))));

        let first = compound.move_to(point(0.0, 0.0)).unwrap();
        compound.line_to(point(10.0, 0.0)).unwrap();
        compound.line_to(point(10.0, 10.0)).unwrap();
        compound.close_path().unwrap();
        let second = compound.move_to(point(20.0, 0.0)).unwrap();
        compound.line_to(point(30.0, 0.0)).unwrap();

        assert_eq!(compound.children().unwrap(), &[first, second]);
        let shape = compound.to_shape().unwrap();
        assert_eq!(shape.contour_count(), 2);
        assert_relative_eq!(compound.length(0.1).unwrap(), 30.0 + 200f64.sqrt(), epsilon = 1e-9);
        assert_eq!(doc.parent(second).unwrap(), Some(id));
        assert!(doc.path(first).unwrap().is_closed().unwrap());
    }

    #[test]
    fn compound_append_starts_a_child_per_move() {
        let mut doc = document();
        let id = doc.create_compound_path();
        let ops = [
            PathOp::MoveTo(point(0.0, 0.0)),
            PathOp::LineTo(point(10.0, 0.0)),
            PathOp::LineTo(point(10.0, 10.0)),
            PathOp::Close,
            PathOp::MoveTo(point(20.0, 0.0)),
            PathOp::LineTo(point(30.0, 0.0)),
        ];
        let mut compound = doc.compound(id).unwrap();
        compound.append_ops(&ops, false).unwrap();
        assert_eq!(compound.children().unwrap().len(), 2);

        // Only the leading move may connect to the current child.
        let more = [
            PathOp::MoveTo(point(30.0, 0.0)),
            PathOp::LineTo(point(30.0, 10.0)),
            PathOp::MoveTo(point(40.0, 0.0)),
        ];
        compound.append_ops(&more, true).unwrap();
        let children = compound.children().unwrap().to_vec();
        assert_eq!(children.len(), 3);
        assert_eq!(doc.path(children[1]).unwrap().segments().unwrap().len().unwrap(), 3);
        assert_eq!(doc.path(children[2]).unwrap().segments().unwrap().len().unwrap(), 1);
    }

    #[test]
    fn compound_shape_takes_the_backmost_winding() {
        let mut doc = document();
        let empty = doc.create_compound_path();
        doc.set_style(empty, Style::even_odd()).unwrap();
        assert_eq!(doc.to_shape(empty).unwrap().winding, crate::shape::WindingRule::EvenOdd);

        let outer = doc.create_rectangle(&rect(0.0, 0.0, 10.0, 10.0));
        let inner = doc.create_rectangle(&rect(2.0, 2.0, 6.0, 6.0));
        doc.set_style(outer, Style::even_odd()).unwrap();
        let id = doc.create_compound_from(&[outer, inner]).unwrap();

        assert_eq!(doc.roots(), &[empty, id]);
        let shape = doc.to_shape(id).unwrap();
        assert_eq!(shape.winding, crate::shape::WindingRule::EvenOdd);
        assert_eq!(shape.contour_count(), 2);
        assert!(!doc.is_pending(outer));
        assert!(!doc.is_pending(inner));
    }

    #[test]
    fn simplify_unwraps_a_single_child() {
        let mut doc = document();
        let before = doc.create_rectangle(&rect(0.0, 0.0, 1.0, 1.0));
        let id = doc.create_compound_path();
        let after = doc.create_rectangle(&rect(0.0, 0.0, 1.0, 1.0));
        let child = doc.compound(id).unwrap().move_to(point(0.0, 0.0)).unwrap();

        doc.path(child).unwrap().line_to(point(1.0, 1.0)).unwrap();
        let segments = doc.path(child).unwrap().segments().unwrap().as_slice().unwrap().to_vec();

        assert_eq!(doc.compound(id).unwrap().simplify().unwrap(), child);
        assert_eq!(doc.path(child).unwrap().segments().unwrap().as_slice().unwrap(), &segments[..]);
        assert_eq!(doc.roots(), &[before, child, after]);
        assert_eq!(doc.parent(child).unwrap(), None);
        assert!(!doc.contains(id));
    }

    #[test]
    fn transform_moves_every_child() {
        let mut doc = document();
        let a = doc.create_rectangle(&rect(0.0, 0.0, 10.0, 10.0));
        let id = doc.create_compound_from(&[a]).unwrap();
        doc.compound(id)
            .unwrap()
            .transform(&ArtTransform::translation(5.0, 0.0))
            .unwrap();

        assert!(doc.is_pending(a));
        let bounds = doc.path(a).unwrap().bounds().unwrap().unwrap();
        assert_eq!(bounds.min, point(5.0, 0.0));
        assert_eq!(bounds.max, point(15.0, 10.0));
    }

    #[test]
    fn wrong_item_kinds_are_rejected() {
        let mut doc = document();
        let path = doc.create_path();
        let compound = doc.create_compound_path();
        assert!(matches!(doc.compound(path), Err(PathError::WrongItemKind { .. })));
        assert!(matches!(doc.path(compound), Err(PathError::WrongItemKind { .. })));
        assert!(matches!(doc.create_compound_from(&[compound]), Err(PathError::WrongItemKind { .. })));
    }
}
