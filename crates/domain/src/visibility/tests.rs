use proptest::prelude::*;

use super::{build_view_filter, can_mutate, can_view};
use crate::{Actor, ContentClass, ContentScope, PostVisibility, Role, UserId, ViewFilter};

fn actor(role: Role, department: Option<&str>, branch: Option<&str>) -> Actor {
    Actor::new(
        UserId::new(),
        role,
        department.map(str::to_owned),
        branch.map(str::to_owned),
    )
}

fn scope(
    department: Option<&str>,
    branch: Option<&str>,
    audience: Option<&[Role]>,
) -> ContentScope {
    ContentScope {
        department: department.map(str::to_owned),
        branch: branch.map(str::to_owned),
        target_audience: audience.map(<[Role]>::to_vec),
        visibility: None,
        created_by: Some(UserId::new()),
    }
}

fn student() -> Actor {
    actor(Role::Student, Some("cmpica"), Some("mca"))
}

#[test]
fn scenario_a_matching_student_sees_event() {
    let entity = scope(Some("cmpica"), Some("mca"), Some(&[Role::Student]));
    assert!(can_view(&student(), &entity, ContentClass::Event));
}

#[test]
fn scenario_b_branch_mismatch_hides_event() {
    let entity = scope(Some("cmpica"), Some("bca"), Some(&[Role::Student]));
    assert!(!can_view(&student(), &entity, ContentClass::Event));
}

#[test]
fn scenario_c_audience_exclusion_beats_legacy_wildcard() {
    let entity = scope(None, None, Some(&[Role::Alumni]));
    assert!(!can_view(&student(), &entity, ContentClass::Event));
    assert!(!can_view(&student(), &entity, ContentClass::Job));
}

#[test]
fn admin_sees_everything() {
    let admin = actor(Role::Admin, None, None);
    assert_eq!(
        build_view_filter(&admin, ContentClass::Job).ok(),
        Some(ViewFilter::Unrestricted)
    );
    let entity = scope(Some("cspit"), Some("ce"), Some(&[Role::Alumni]));
    assert!(can_view(&admin, &entity, ContentClass::Event));
}

#[test]
fn professor_sees_whole_department_across_branches() {
    let professor = actor(Role::Professor, Some("CMPICA"), Some("mca"));
    let entity = scope(Some("cmpica"), Some("bca"), Some(&[Role::Student]));
    assert!(can_view(&professor, &entity, ContentClass::Event));
    assert!(can_view(&professor, &entity, ContentClass::Job));
}

#[test]
fn collegeadmin_is_limited_to_department() {
    let college_admin = actor(Role::CollegeAdmin, Some("cmpica"), None);
    assert!(can_view(&college_admin, &scope(None, None, None), ContentClass::Event));
    assert!(!can_view(
        &college_admin,
        &scope(Some("cspit"), None, None),
        ContentClass::Event
    ));
}

#[test]
fn missing_department_is_refused_not_widened() {
    let orphan = actor(Role::Student, None, Some("mca"));
    assert!(build_view_filter(&orphan, ContentClass::Event).is_err());
    assert!(!can_view(&orphan, &scope(None, None, None), ContentClass::Event));
    assert!(!can_mutate(&orphan, &scope(None, None, None), ContentClass::Post));
}

#[test]
fn public_post_bypasses_department() {
    let mut entity = scope(Some("cspit"), Some("ce"), Some(&[Role::Alumni]));
    entity.visibility = Some(PostVisibility::Public);
    assert!(can_view(&student(), &entity, ContentClass::Post));
}

#[test]
fn branchless_student_sees_public_posts_and_unbranched_records() {
    let viewer = actor(Role::Student, Some("cmpica"), None);

    let mut public_post = scope(Some("cspit"), Some("ce"), None);
    public_post.visibility = Some(PostVisibility::Public);
    assert!(can_view(&viewer, &public_post, ContentClass::Post));

    let mut branch_post = scope(Some("cmpica"), Some("mca"), None);
    branch_post.visibility = Some(PostVisibility::Branch);
    assert!(!can_view(&viewer, &branch_post, ContentClass::Post));

    let unbranched_event = scope(Some("cmpica"), None, None);
    let branched_event = scope(Some("cmpica"), Some("mca"), None);
    assert!(can_view(&viewer, &unbranched_event, ContentClass::Event));
    assert!(can_view(&viewer, &unbranched_event, ContentClass::Job));
    assert!(!can_view(&viewer, &branched_event, ContentClass::Event));

    assert!(build_view_filter(&viewer, ContentClass::UserListing).is_ok());
    let mut own_post = scope(Some("cmpica"), None, None);
    own_post.created_by = Some(viewer.id());
    assert!(can_mutate(&viewer, &own_post, ContentClass::Post));
}

#[test]
fn department_post_ignores_branch() {
    let mut entity = scope(Some("CMPICA"), Some("bca"), None);
    entity.visibility = Some(PostVisibility::Department);
    assert!(can_view(&student(), &entity, ContentClass::Post));

    entity.visibility = Some(PostVisibility::Branch);
    assert!(!can_view(&student(), &entity, ContentClass::Post));

    entity.visibility = None;
    assert!(!can_view(&student(), &entity, ContentClass::Post));
}

#[test]
fn user_listing_scopes_students_to_branch() {
    let peer = scope(Some("cmpica"), Some("mca"), None);
    let other_branch = scope(Some("cmpica"), Some("bca"), None);
    assert!(can_view(&student(), &peer, ContentClass::UserListing));
    assert!(!can_view(&student(), &other_branch, ContentClass::UserListing));

    let professor = actor(Role::Professor, Some("cmpica"), None);
    assert!(can_view(&professor, &other_branch, ContentClass::UserListing));
}

#[test]
fn owners_mutate_their_own_records() {
    let author = student();
    let mut entity = scope(Some("cmpica"), Some("mca"), None);
    assert!(!can_mutate(&author, &entity, ContentClass::Post));

    entity.created_by = Some(author.id());
    assert!(can_mutate(&author, &entity, ContentClass::Post));
}

#[test]
fn collegeadmin_overrides_events_and_jobs_only() {
    let college_admin = actor(Role::CollegeAdmin, Some("CMPICA"), None);
    let entity = scope(Some("cmpica"), None, None);

    assert!(can_mutate(&college_admin, &entity, ContentClass::Event));
    assert!(can_mutate(&college_admin, &entity, ContentClass::Job));
    assert!(!can_mutate(&college_admin, &entity, ContentClass::Post));
    assert!(!can_mutate(&college_admin, &entity, ContentClass::Meeting));

    let legacy = scope(None, None, None);
    assert!(!can_mutate(&college_admin, &legacy, ContentClass::Event));

    let foreign = scope(Some("cspit"), None, None);
    assert!(!can_mutate(&college_admin, &foreign, ContentClass::Job));
}

#[test]
fn admin_mutates_anything_including_users() {
    let admin = actor(Role::Admin, None, None);
    assert!(can_mutate(&admin, &scope(None, None, None), ContentClass::Meeting));
    assert!(can_mutate(&admin, &scope(None, None, None), ContentClass::UserListing));
    assert!(!can_mutate(&student(), &scope(None, None, None), ContentClass::UserListing));
}

fn role_strategy() -> impl Strategy<Value = Role> {
    prop::sample::select(Role::all().to_vec())
}

fn scoped_role_strategy() -> impl Strategy<Value = Role> {
    prop::sample::select(vec![
        Role::CollegeAdmin,
        Role::Professor,
        Role::Student,
        Role::Alumni,
    ])
}

fn class_strategy() -> impl Strategy<Value = ContentClass> {
    prop::sample::select(vec![
        ContentClass::Event,
        ContentClass::Job,
        ContentClass::Post,
        ContentClass::Meeting,
        ContentClass::UserListing,
    ])
}

fn name_strategy() -> impl Strategy<Value = String> {
    "[a-z]{2,6}"
}

fn optional_name_strategy() -> impl Strategy<Value = Option<String>> {
    prop::option::of(name_strategy())
}

fn audience_strategy() -> impl Strategy<Value = Option<Vec<Role>>> {
    prop::option::of(prop::collection::vec(role_strategy(), 0..3))
}

fn visibility_strategy() -> impl Strategy<Value = Option<PostVisibility>> {
    prop::option::of(prop::sample::select(vec![
        PostVisibility::Department,
        PostVisibility::Branch,
        PostVisibility::Public,
    ]))
}

fn scope_strategy() -> impl Strategy<Value = ContentScope> {
    (
        optional_name_strategy(),
        optional_name_strategy(),
        audience_strategy(),
        visibility_strategy(),
    )
        .prop_map(|(department, branch, target_audience, visibility)| ContentScope {
            department,
            branch,
            target_audience,
            visibility,
            created_by: None,
        })
}

fn valid_actor_strategy() -> impl Strategy<Value = Actor> {
    (role_strategy(), name_strategy(), name_strategy())
        .prop_map(|(role, department, branch)| {
            Actor::new(UserId::new(), role, Some(department), Some(branch))
        })
}

fn flip_case(value: &str, mask: &[bool]) -> String {
    value
        .chars()
        .zip(mask.iter().cycle())
        .map(|(character, upper)| {
            if *upper {
                character.to_ascii_uppercase()
            } else {
                character
            }
        })
        .collect()
}

proptest! {
    #[test]
    fn fully_unscoped_records_are_visible_to_valid_actors(
        actor in valid_actor_strategy(),
        class in class_strategy(),
    ) {
        prop_assert!(can_view(&actor, &ContentScope::default(), class));
    }

    #[test]
    fn removing_a_scoping_field_never_hides_a_record(
        actor in valid_actor_strategy(),
        entity in scope_strategy(),
        class in class_strategy(),
    ) {
        if can_view(&actor, &entity, class) {
            let without_department = ContentScope { department: None, ..entity.clone() };
            let without_branch = ContentScope { branch: None, ..entity.clone() };
            let without_audience = ContentScope { target_audience: None, ..entity.clone() };
            prop_assert!(can_view(&actor, &without_department, class));
            prop_assert!(can_view(&actor, &without_branch, class));
            prop_assert!(can_view(&actor, &without_audience, class));
        }
    }

    #[test]
    fn departments_are_isolated(
        role in scoped_role_strategy(),
        owner_department in name_strategy(),
        viewer_department in name_strategy(),
        branch in name_strategy(),
        mut entity in scope_strategy(),
        class in class_strategy(),
    ) {
        prop_assume!(owner_department != viewer_department);
        entity.department = Some(owner_department);
        if entity.visibility == Some(PostVisibility::Public) {
            entity.visibility = None;
        }

        let viewer = Actor::new(UserId::new(), role, Some(viewer_department), Some(branch));
        prop_assert!(!can_view(&viewer, &entity, class));
    }

    #[test]
    fn department_casing_does_not_change_visibility(
        actor in valid_actor_strategy(),
        entity in scope_strategy(),
        class in class_strategy(),
        mask in prop::collection::vec(any::<bool>(), 1..6),
    ) {
        let recased_actor = Actor::new(
            actor.id(),
            actor.role(),
            actor.department().map(|department| flip_case(department, &mask)),
            actor.branch().map(str::to_owned),
        );
        let recased_entity = ContentScope {
            department: entity
                .department
                .as_deref()
                .map(|department| department.to_ascii_uppercase()),
            ..entity.clone()
        };

        let expected = can_view(&actor, &entity, class);
        prop_assert_eq!(can_view(&recased_actor, &entity, class), expected);
        prop_assert_eq!(can_view(&actor, &recased_entity, class), expected);
    }

    #[test]
    fn view_filter_agrees_with_can_view(
        actor in valid_actor_strategy(),
        entity in scope_strategy(),
        class in class_strategy(),
    ) {
        let filter = build_view_filter(&actor, class);
        prop_assert!(filter.is_ok());
        let matches = filter.map(|filter| filter.matches(&entity)).unwrap_or(false);
        prop_assert_eq!(matches, can_view(&actor, &entity, class));
    }
}
