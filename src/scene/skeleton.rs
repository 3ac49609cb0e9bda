use std::collections::VecDeque;

use glam::Mat4;
use rustc_hash::FxHashMap;

use super::transform::Transform;
use crate::errors::{Result, StrataError};
use crate::invariant;

/// Per-bone pose overrides consulted by [`Skeleton::update`].
pub trait BoneQuery {
    /// Local transform to use for `bone` instead of its stored pose.
    fn transform(&self, bone: &str) -> Option<Transform>;
}

/// A single bone of a [`Skeleton`].
#[derive(Debug, Clone)]
pub struct Bone {
    name: String,
    parent: String,
    /// Bind-pose inverse: model space to bone space.
    offset: Mat4,
    pose: Transform,
    manual: bool,
}

impl Bone {
    /// A bone attached to `parent`. An empty parent name marks the root.
    #[must_use]
    pub fn new(name: impl Into<String>, parent: impl Into<String>, offset: Mat4, pose: Transform) -> Self {
        Self {
            name: name.into(),
            parent: parent.into(),
            offset,
            pose,
            manual: false,
        }
    }

    #[must_use]
    pub fn root(name: impl Into<String>, offset: Mat4, pose: Transform) -> Self {
        Self::new(name, String::new(), offset, pose)
    }

    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    #[must_use]
    pub fn parent(&self) -> &str {
        &self.parent
    }

    #[inline]
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.parent.is_empty()
    }

    #[inline]
    #[must_use]
    pub fn offset(&self) -> Mat4 {
        self.offset
    }

    #[inline]
    #[must_use]
    pub fn pose(&self) -> &Transform {
        &self.pose
    }

    pub fn set_pose(&mut self, pose: Transform) {
        self.pose = pose;
    }

    #[inline]
    #[must_use]
    pub fn local_transform(&self) -> Mat4 {
        self.pose.matrix()
    }

    /// Manual bones use their pose as an absolute, skeleton-space transform
    /// and ignore both their parent and any [`BoneQuery`] override.
    #[inline]
    #[must_use]
    pub fn is_manual(&self) -> bool {
        self.manual
    }

    pub fn set_manual(&mut self, manual: bool) {
        self.manual = manual;
    }
}

/// A bone hierarchy with GPU-ready skinning matrices.
///
/// Bones are stored breadth-first from the single root, so a parent always
/// precedes its children. [`transforms`](Self::transforms) is only meaningful
/// after the first [`update`](Self::update).
#[derive(Debug, Clone)]
pub struct Skeleton {
    bones: Vec<Bone>,
    parents: Vec<Option<usize>>,
    lookup: FxHashMap<String, usize>,
    world_cache: Vec<Mat4>,
    transforms: Vec<Mat4>,
}

impl Skeleton {
    /// Builds a skeleton from bones in any order.
    ///
    /// Exactly one bone must have an empty parent name, and every other
    /// parent name must resolve to a bone in the list.
    pub fn new(bones: Vec<Bone>) -> Result<Self> {
        invariant!(!bones.is_empty(), "skeleton bone hierarchy is empty");

        let roots: Vec<usize> = bones
            .iter()
            .enumerate()
            .filter(|(_, bone)| bone.is_root())
            .map(|(i, _)| i)
            .collect();
        match roots.len() {
            0 => return Err(StrataError::NoRootBone),
            1 => {}
            count => return Err(StrataError::MultipleRootBones { count }),
        }

        let mut by_name: FxHashMap<&str, usize> = FxHashMap::default();
        let mut children: Vec<Vec<usize>> = vec![Vec::new(); bones.len()];
        for (i, bone) in bones.iter().enumerate() {
            if by_name.insert(bone.name(), i).is_some() {
                return Err(StrataError::precondition(format!(
                    "duplicate bone name '{}'",
                    bone.name()
                )));
            }
        }
        for (i, bone) in bones.iter().enumerate() {
            if bone.is_root() {
                continue;
            }
            let Some(&parent) = by_name.get(bone.parent()) else {
                return Err(StrataError::UnknownParentBone {
                    bone: bone.name().to_string(),
                    parent: bone.parent().to_string(),
                });
            };
            children[parent].push(i);
        }

        // Breadth-first flatten from the root
        let mut order = Vec::with_capacity(bones.len());
        let mut parent_of_source: Vec<Option<usize>> = vec![None; bones.len()];
        let mut queue = VecDeque::from([roots[0]]);
        while let Some(source) = queue.pop_front() {
            order.push(source);
            for &child in &children[source] {
                parent_of_source[child] = Some(source);
                queue.push_back(child);
            }
        }
        if order.len() != bones.len() {
            // Bones unreachable from the root form a parent cycle
            let stray = (0..bones.len())
                .find(|i| !order.contains(i))
                .unwrap_or_default();
            return Err(StrataError::UnknownParentBone {
                bone: bones[stray].name().to_string(),
                parent: bones[stray].parent().to_string(),
            });
        }

        let mut new_index = vec![0; bones.len()];
        for (new, &source) in order.iter().enumerate() {
            new_index[source] = new;
        }
        let parents = order
            .iter()
            .map(|&source| parent_of_source[source].map(|p| new_index[p]))
            .collect();

        let mut slots: Vec<Option<Bone>> = bones.into_iter().map(Some).collect();
        let bones: Vec<Bone> = order.iter().filter_map(|&source| slots[source].take()).collect();
        let lookup = bones
            .iter()
            .enumerate()
            .map(|(i, bone)| (bone.name().to_string(), i))
            .collect();
        let count = bones.len();

        Ok(Self {
            bones,
            parents,
            lookup,
            world_cache: vec![Mat4::IDENTITY; count],
            transforms: vec![Mat4::IDENTITY; count],
        })
    }

    /// Recomputes every bone's skinning matrix.
    ///
    /// Non-manual bones compose their parent's world transform with the
    /// override from `query` when present, otherwise with their own pose.
    /// Results are re-based on the inverse of the root's local transform.
    pub fn update(&mut self, query: Option<&dyn BoneQuery>) {
        let root_local = self.bones[0].local_transform();
        self.world_cache[0] = root_local;

        for i in 1..self.bones.len() {
            let bone = &self.bones[i];
            self.world_cache[i] = if bone.is_manual() {
                bone.local_transform()
            } else {
                let parent_world = self.parents[i].map_or(Mat4::IDENTITY, |p| self.world_cache[p]);
                let local = query
                    .and_then(|q| q.transform(bone.name()))
                    .map_or_else(|| bone.local_transform(), |t| t.matrix());
                parent_world * local
            };
        }

        let root_inverse = root_local.inverse();
        for (i, bone) in self.bones.iter().enumerate() {
            self.transforms[i] = root_inverse * self.world_cache[i] * bone.offset();
        }
    }

    /// Skinning matrices in bone order.
    #[inline]
    #[must_use]
    pub fn transforms(&self) -> &[Mat4] {
        &self.transforms
    }

    /// Skeleton-space transform of `name` as of the last update.
    #[must_use]
    pub fn world_transform(&self, name: &str) -> Option<Mat4> {
        self.bone_index(name).map(|i| self.world_cache[i])
    }

    #[inline]
    #[must_use]
    pub fn bones(&self) -> &[Bone] {
        &self.bones
    }

    /// Parent index of each bone; `None` only for the root at index 0.
    #[inline]
    #[must_use]
    pub fn parents(&self) -> &[Option<usize>] {
        &self.parents
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.bones.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bones.is_empty()
    }

    #[must_use]
    pub fn bone_index(&self, name: &str) -> Option<usize> {
        self.lookup.get(name).copied()
    }

    #[must_use]
    pub fn bone(&self, name: &str) -> Option<&Bone> {
        self.bone_index(name).map(|i| &self.bones[i])
    }

    pub fn bone_mut(&mut self, name: &str) -> Option<&mut Bone> {
        self.bone_index(name).map(|i| &mut self.bones[i])
    }

    pub fn set_manual(&mut self, name: &str, manual: bool) -> Result<()> {
        let bone = self
            .bone_mut(name)
            .ok_or_else(|| StrataError::UnknownBone(name.to_string()))?;
        bone.set_manual(manual);
        Ok(())
    }

    pub fn bone_names(&self) -> impl Iterator<Item = &str> {
        self.bones.iter().map(Bone::name)
    }
}
