//! Fixed-length per-joint vectors and joint metadata.
//!
//! Every per-joint quantity in the controller is a [`JointVector`]
//! of the same length N, index-aligned across quantities. N is fixed
//! once at configuration time; storage is fixed-capacity so the
//! control tick never touches the heap.

use heapless::Vec;
use serde::{Deserialize, Serialize};

/// Maximum number of joints a single controller can drive.
pub const MAX_JOINTS: usize = 16;

/// Joint kinematic type, validated against the hardware-reported
/// types at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JointType {
    /// Rotational joint, positions in radians.
    Revolute,
    /// Linear joint, positions in meters.
    Prismatic,
}

/// Fixed-length ordered sequence of per-joint values.
///
/// Length is set when the vector is built and never changes. An
/// update with a different length is rejected at the command
/// boundary ([`crate::error::CommandError::SizeMismatch`]), never by
/// resizing here.
#[derive(Debug, Clone, PartialEq)]
pub struct JointVector<T>(Vec<T, MAX_JOINTS>);

impl<T: Clone> JointVector<T> {
    /// Create a vector of `len` copies of `value`.
    ///
    /// # Panics
    /// Panics if `len > MAX_JOINTS`. Joint counts are checked against
    /// [`MAX_JOINTS`] during configuration validation, so internal
    /// callers always pass an already-validated length.
    pub fn filled(len: usize, value: T) -> Self {
        assert!(len <= MAX_JOINTS, "joint count {len} exceeds MAX_JOINTS");
        let mut v = Vec::new();
        for _ in 0..len {
            // Capacity checked above.
            let _ = v.push(value.clone());
        }
        Self(v)
    }

    /// Build from a slice. `None` if the slice exceeds capacity.
    pub fn from_slice(values: &[T]) -> Option<Self> {
        Vec::from_slice(values).ok().map(Self)
    }

    /// Overwrite every element with `value`, keeping the length.
    pub fn fill(&mut self, value: T) {
        for v in self.0.iter_mut() {
            *v = value.clone();
        }
    }

    /// Copy the contents of `other` into `self`.
    ///
    /// Lengths must already match; vector-taking commands verify the
    /// length before reaching this point.
    pub fn copy_from(&mut self, other: &Self) {
        debug_assert_eq!(self.len(), other.len());
        for (dst, src) in self.0.iter_mut().zip(other.0.iter()) {
            *dst = src.clone();
        }
    }
}

impl<T> JointVector<T> {
    /// Number of joints.
    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[inline]
    pub fn iter(&self) -> core::slice::Iter<'_, T> {
        self.0.iter()
    }

    #[inline]
    pub fn iter_mut(&mut self) -> core::slice::IterMut<'_, T> {
        self.0.iter_mut()
    }

    #[inline]
    pub fn as_slice(&self) -> &[T] {
        &self.0
    }
}

impl JointVector<bool> {
    /// True if any element is set.
    #[inline]
    pub fn any(&self) -> bool {
        self.iter().any(|&v| v)
    }
}

impl<T> core::ops::Index<usize> for JointVector<T> {
    type Output = T;

    #[inline]
    fn index(&self, index: usize) -> &T {
        &self.0[index]
    }
}

impl<T> core::ops::IndexMut<usize> for JointVector<T> {
    #[inline]
    fn index_mut(&mut self, index: usize) -> &mut T {
        &mut self.0[index]
    }
}

impl<'a, T> IntoIterator for &'a JointVector<T> {
    type Item = &'a T;
    type IntoIter = core::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
