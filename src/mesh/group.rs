//! Enumerable sets of faces.

use super::halfedge::HalfEdgeMesh;
use super::index::{FaceId, MeshIndex};

/// An ordered list of face handles.
///
/// Groups are snapshots: they hold handles, not borrows, so a group taken
/// before a spin stays usable afterwards (face ids never change).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FaceGroup<I: MeshIndex = u32> {
    faces: Vec<FaceId<I>>,
}

impl<I: MeshIndex> FaceGroup<I> {
    /// All internal faces of a mesh, in id order.
    pub fn internal(mesh: &HalfEdgeMesh<I>) -> Self {
        Self::from_faces(mesh.internal_face_ids())
    }

    /// All external faces of a mesh, in id order.
    pub fn external(mesh: &HalfEdgeMesh<I>) -> Self {
        Self::from_faces(mesh.external_face_ids())
    }

    /// Every face of a mesh, in id order.
    pub fn all(mesh: &HalfEdgeMesh<I>) -> Self {
        Self::from_faces(mesh.face_ids())
    }

    /// A group of arbitrary faces, kept in the given order.
    pub fn from_faces(faces: impl IntoIterator<Item = FaceId<I>>) -> Self {
        Self {
            faces: faces.into_iter().collect(),
        }
    }

    /// Iterate over the faces of the group.
    pub fn iter(&self) -> impl Iterator<Item = FaceId<I>> + '_ {
        self.faces.iter().copied()
    }

    /// Number of faces in the group.
    #[inline]
    pub fn len(&self) -> usize {
        self.faces.len()
    }

    /// Whether the group has no faces.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.faces.is_empty()
    }

    /// Whether `face` belongs to the group.
    pub fn contains(&self, face: FaceId<I>) -> bool {
        self.faces.contains(&face)
    }
}

impl<'a, I: MeshIndex> IntoIterator for &'a FaceGroup<I> {
    type Item = FaceId<I>;
    type IntoIter = std::iter::Copied<std::slice::Iter<'a, FaceId<I>>>;

    fn into_iter(self) -> Self::IntoIter {
        self.faces.iter().copied()
    }
}
