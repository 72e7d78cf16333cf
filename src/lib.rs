pub mod commit_manager;
pub mod compound_path;
pub mod config;
pub mod curve;
pub mod document;
pub mod error;
pub mod geometry_utilities;
pub mod hit_test;
pub mod path;
pub mod path_collection;
pub mod path_item;
pub mod segment;
pub mod segment_list;
pub mod shape;
pub mod shapes;
pub mod store;

pub use compound_path::CompoundPath;
pub use config::{FitOptions, FlattenOptions, Settings};
pub use curve::{Curve, CurveList};
pub use document::{CompoundMut, Document, PathMut};
pub use error::{PathError, Result};
pub use geometry_utilities::types::{ArtBox, ArtPoint, ArtRect, ArtSpace, ArtTransform, ArtVector};
pub use hit_test::{HitKind, HitTest};
pub use path::Path;
pub use path_collection::{Item, ItemId};
pub use path_item::{PathItem, Style};
pub use segment::Segment;
pub use segment_list::SegmentList;
pub use shape::{PathOp, Shape, WindingRule};
pub use store::{ArtHandle, ArtStore, MemoryStore, StoreError};
