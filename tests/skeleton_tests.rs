//! Skeleton Tests
//!
//! Tests for:
//! - Hierarchy validation (root count, unknown parents, cycles, duplicates)
//! - Breadth-first bone ordering
//! - Skinning matrix computation, query overrides and manual bones

use glam::{Mat4, Quat, Vec3};

use strata::scene::{Bone, BoneQuery};
use strata::{Skeleton, StrataError, Transform};

const EPSILON: f32 = 1e-5;

fn mat4_approx(a: Mat4, b: Mat4) -> bool {
    a.abs_diff_eq(b, EPSILON)
}

fn up(y: f32) -> Transform {
    Transform::from_translation(Vec3::new(0.0, y, 0.0))
}

/// hips -> spine -> head, each one unit above its parent, listed leaf first.
fn spine() -> Skeleton {
    Skeleton::new(vec![
        Bone::new("head", "spine", Mat4::IDENTITY, up(1.0)),
        Bone::new("spine", "hips", Mat4::IDENTITY, up(1.0)),
        Bone::root("hips", Mat4::IDENTITY, up(1.0)),
    ])
    .unwrap()
}

struct Override(&'static str, Transform);

impl BoneQuery for Override {
    fn transform(&self, bone: &str) -> Option<Transform> {
        (bone == self.0).then_some(self.1)
    }
}

// ============================================================================
// Construction
// ============================================================================

#[test]
fn bones_are_ordered_breadth_first() {
    let skeleton = spine();
    let names: Vec<_> = skeleton.bone_names().collect();
    assert_eq!(names, vec!["hips", "spine", "head"]);
    assert_eq!(skeleton.parents(), &[None, Some(0), Some(1)]);
    assert_eq!(skeleton.bone_index("head"), Some(2));
    assert!(skeleton.bone("hips").unwrap().is_root());
}

#[test]
fn missing_root_is_rejected() {
    let result = Skeleton::new(vec![
        Bone::new("a", "b", Mat4::IDENTITY, Transform::IDENTITY),
        Bone::new("b", "a", Mat4::IDENTITY, Transform::IDENTITY),
    ]);
    assert!(matches!(result, Err(StrataError::NoRootBone)));
}

#[test]
fn multiple_roots_are_rejected() {
    let result = Skeleton::new(vec![
        Bone::root("a", Mat4::IDENTITY, Transform::IDENTITY),
        Bone::root("b", Mat4::IDENTITY, Transform::IDENTITY),
    ]);
    assert!(matches!(result, Err(StrataError::MultipleRootBones { count: 2 })));
}

#[test]
fn unknown_parent_is_rejected() {
    let result = Skeleton::new(vec![
        Bone::root("hips", Mat4::IDENTITY, Transform::IDENTITY),
        Bone::new("hand", "arm", Mat4::IDENTITY, Transform::IDENTITY),
    ]);
    assert!(matches!(
        result,
        Err(StrataError::UnknownParentBone { bone, parent }) if bone == "hand" && parent == "arm"
    ));
}

#[test]
fn cycle_detached_from_root_is_rejected() {
    let result = Skeleton::new(vec![
        Bone::root("hips", Mat4::IDENTITY, Transform::IDENTITY),
        Bone::new("a", "b", Mat4::IDENTITY, Transform::IDENTITY),
        Bone::new("b", "a", Mat4::IDENTITY, Transform::IDENTITY),
    ]);
    assert!(matches!(result, Err(StrataError::UnknownParentBone { .. })));
}

#[test]
fn duplicate_names_are_rejected() {
    let result = Skeleton::new(vec![
        Bone::root("hips", Mat4::IDENTITY, Transform::IDENTITY),
        Bone::new("arm", "hips", Mat4::IDENTITY, Transform::IDENTITY),
        Bone::new("arm", "hips", Mat4::IDENTITY, Transform::IDENTITY),
    ]);
    assert!(matches!(result, Err(StrataError::Precondition { .. })));
}

#[test]
#[should_panic(expected = "invariant violated")]
fn empty_hierarchy_panics() {
    let _ = Skeleton::new(Vec::new());
}

// ============================================================================
// Update
// ============================================================================

#[test]
fn transforms_are_relative_to_root() {
    let mut skeleton = spine();
    skeleton.update(None);

    let transforms = skeleton.transforms();
    assert!(mat4_approx(transforms[0], Mat4::IDENTITY));
    assert!(mat4_approx(transforms[1], Mat4::from_translation(Vec3::Y)));
    assert!(mat4_approx(transforms[2], Mat4::from_translation(Vec3::Y * 2.0)));

    let head = skeleton.world_transform("head").unwrap();
    assert!(mat4_approx(head, Mat4::from_translation(Vec3::Y * 3.0)));
}

#[test]
fn update_is_idempotent() {
    let mut skeleton = spine();
    skeleton.update(None);
    let first = skeleton.transforms().to_vec();
    skeleton.update(None);
    assert_eq!(skeleton.transforms(), first.as_slice());
}

#[test]
fn offsets_apply_bind_pose_inverse() {
    let mut skeleton = Skeleton::new(vec![
        Bone::root("hips", Mat4::IDENTITY, Transform::IDENTITY),
        Bone::new("arm", "hips", Mat4::from_translation(-Vec3::X), Transform::from_translation(Vec3::X)),
    ])
    .unwrap();
    skeleton.update(None);
    // In bind pose the skinning matrix is the identity
    assert!(mat4_approx(skeleton.transforms()[1], Mat4::IDENTITY));
}

#[test]
fn query_overrides_local_pose() {
    let mut skeleton = spine();
    let bend = Transform::new(Vec3::Y, Quat::from_rotation_z(std::f32::consts::FRAC_PI_2), Vec3::ONE);
    skeleton.update(Some(&Override("spine", bend)));

    // The head now sits one unit along the spine's rotated Y axis (-X)
    let head = skeleton.world_transform("head").unwrap();
    let position = head.w_axis.truncate();
    assert!(position.abs_diff_eq(Vec3::new(-1.0, 2.0, 0.0), EPSILON), "{position}");
}

#[test]
fn manual_bone_ignores_parent_and_query() {
    let mut skeleton = spine();
    skeleton
        .bone_mut("head")
        .unwrap()
        .set_pose(Transform::from_translation(Vec3::new(5.0, 0.0, 0.0)));
    skeleton.set_manual("head", true).unwrap();
    skeleton.update(Some(&Override("head", up(100.0))));

    let head = skeleton.world_transform("head").unwrap();
    assert!(mat4_approx(head, Mat4::from_translation(Vec3::new(5.0, 0.0, 0.0))));
    // Still re-based on the root
    assert!(mat4_approx(
        skeleton.transforms()[2],
        Mat4::from_translation(Vec3::new(5.0, -1.0, 0.0))
    ));
}

#[test]
fn set_manual_on_unknown_bone_fails() {
    let mut skeleton = spine();
    assert!(matches!(
        skeleton.set_manual("tail", true),
        Err(StrataError::UnknownBone(name)) if name == "tail"
    ));
}
