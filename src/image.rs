//! Collaborator traits for the image-shaped data this crate reads from and
//! writes to, plus a minimal in-memory implementation ([`MaskImage`] /
//! [`LabelImage`]) used by this crate's own tests and available to callers
//! who don't already have their own image type.
//!
//! The pipeline never owns voxel storage: every stage that touches a grid
//! does so through these traits, so a caller backed by a real image library
//! (ITK bindings, ndarray, a memory-mapped format) can implement them
//! directly over its own buffer instead of copying into ours.

use std::collections::{HashMap, HashSet};

/// An integer voxel index, `(i, j, k)`.
pub type Voxel = (i64, i64, i64);

/// A foreground/background voxel mask over an integer index domain.
pub trait ImageDomain {
    /// All voxels considered foreground, in unspecified order.
    fn foreground_voxels(&self) -> Box<dyn Iterator<Item = Voxel> + '_>;

    /// Whether `v` is foreground. Callers that only need membership testing
    /// (the extra-edge remover, the voxelizer) should prefer this to
    /// collecting [`ImageDomain::foreground_voxels`] into a set themselves.
    fn is_foreground(&self, v: Voxel) -> bool;
}

/// A grid that can be read and written voxel-by-voxel, used by the
/// [voxelizer][crate::voxelize] to rasterize a labeled graph back into an
/// image's grid.
pub trait LabelGrid {
    fn dimensions(&self) -> (usize, usize, usize);
    fn get_label(&self, v: Voxel) -> i64;
    fn set_label(&mut self, v: Voxel, label: i64);
}

/// A scalar field sampled at integer voxel indices, e.g. a distance map used
/// to recover per-vertex/per-edge radius estimates. Out-of-domain samples
/// return `None` rather than panicking.
pub trait ScalarField {
    fn sample(&self, v: Voxel) -> Option<f64>;
}

/// A simple in-memory foreground mask backed by a [`HashSet`]. Sufficient
/// for tests and for callers without a richer image type of their own.
#[derive(Debug, Clone, Default)]
pub struct MaskImage {
    voxels: HashSet<Voxel>,
}

impl MaskImage {
    pub fn from_voxels<I: IntoIterator<Item = Voxel>>(voxels: I) -> Self {
        MaskImage { voxels: voxels.into_iter().collect() }
    }
}

impl ImageDomain for MaskImage {
    fn foreground_voxels(&self) -> Box<dyn Iterator<Item = Voxel> + '_> {
        Box::new(self.voxels.iter().copied())
    }

    fn is_foreground(&self, v: Voxel) -> bool {
        self.voxels.contains(&v)
    }
}

/// A simple in-memory label grid backed by a [`HashMap`], with a fixed
/// `dimensions` reported for [`LabelGrid::dimensions`]. Voxels absent from
/// the map read as label `0` (background).
#[derive(Debug, Clone)]
pub struct LabelImage {
    dims: (usize, usize, usize),
    labels: HashMap<Voxel, i64>,
}

impl LabelImage {
    pub fn new(dims: (usize, usize, usize)) -> Self {
        LabelImage { dims, labels: HashMap::new() }
    }
}

impl LabelGrid for LabelImage {
    fn dimensions(&self) -> (usize, usize, usize) {
        self.dims
    }

    fn get_label(&self, v: Voxel) -> i64 {
        self.labels.get(&v).copied().unwrap_or(0)
    }

    fn set_label(&mut self, v: Voxel, label: i64) {
        self.labels.insert(v, label);
    }
}
