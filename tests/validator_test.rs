//! Tests for step gates and field-level issues

use rstest::rstest;

use onboard::domain::{
    AmenityCatalog, BranchField, BusinessType, CompanyField, Field, FlowVariant, IssueKind,
    LocationField, NodePath, RoomField, Step, StepValidator, Tree, ValidationContext,
};

fn onboarding(tree: &Tree) -> ValidationContext<'_> {
    ValidationContext::new(tree, Some(BusinessType::Franchise), FlowVariant::Onboarding)
}

/// Franchise company "Acme" with branches named as given, each with one
/// location "Main" holding one fully valid room "101".
fn franchise(branch_names: &[&str]) -> Tree {
    let catalog = AmenityCatalog::default();
    let mut tree = Tree::seeded(BusinessType::Franchise)
        .update_company(0, CompanyField::Name("Acme".into()))
        .tree;
    for (bi, name) in branch_names.iter().enumerate() {
        tree = tree.add_branch(0).tree;
        tree = tree.update_branch(0, bi, BranchField::Name(name.to_string())).tree;
        tree = tree.update_branch(0, bi, BranchField::Address("1 Main St".into())).tree;
        tree = tree.add_location(0, bi).tree;
        tree = tree.update_location(0, bi, 0, LocationField::Name("Main".into())).tree;
        tree = tree.add_room(0, bi, 0).tree;
        tree = tree
            .update_room(0, bi, 0, 0, RoomField::RoomNumber("101".into()), FlowVariant::Onboarding)
            .tree;
        tree = tree.toggle_amenity(0, bi, 0, 0, "Wi-Fi", &catalog).tree;
    }
    tree
}

#[test]
fn given_complete_tree_when_validating_then_every_step_passes() {
    let tree = franchise(&["North", "South"]);
    let ctx = onboarding(&tree);

    for step in Step::ALL {
        assert!(StepValidator::passes(step, &ctx), "step {} should pass", step);
    }
    assert!(StepValidator::field_issues(&ctx).is_empty());
}

#[test]
fn given_no_business_type_when_validating_step_one_then_blocked() {
    let tree = Tree::new();
    let ctx = ValidationContext::new(&tree, None, FlowVariant::Onboarding);

    let issues = StepValidator::issues(Step::BusinessType, &ctx);

    assert_eq!(issues.len(), 1);
    assert_eq!(issues[0].kind, IssueKind::BusinessTypeMissing);
    assert_eq!(issues[0].path, None);
}

#[rstest]
#[case(String::new(), Some(IssueKind::Required))]
#[case("   ".to_string(), Some(IssueKind::Required))]
#[case("Acme".to_string(), None)]
#[case("x".repeat(50), None)]
#[case("x".repeat(51), Some(IssueKind::TooLong { max: 50 }))]
fn given_company_name_when_validating_company_step_then_length_rules_apply(
    #[case] name: String,
    #[case] expected: Option<IssueKind>,
) {
    let tree = Tree::seeded(BusinessType::Multiple)
        .update_company(0, CompanyField::Name(name))
        .tree;
    let ctx = onboarding(&tree);

    let issues = StepValidator::issues(Step::Company, &ctx);

    assert_eq!(issues.first().map(|i| i.kind), expected);
}

#[test]
fn given_multibyte_name_at_limit_when_validating_then_counted_in_chars() {
    let name = "ü".repeat(50);
    let tree = Tree::seeded(BusinessType::Multiple)
        .update_company(0, CompanyField::Name(name))
        .tree;

    assert!(StepValidator::passes(Step::Company, &onboarding(&tree)));
}

#[test]
fn given_franchise_without_branches_when_validating_branch_step_then_missing_children() {
    let tree = Tree::seeded(BusinessType::Franchise)
        .update_company(0, CompanyField::Name("Acme".into()))
        .tree;

    let issues = StepValidator::issues(Step::Branch, &onboarding(&tree));

    assert_eq!(issues.len(), 1);
    assert_eq!(issues[0].field, Field::Branches);
    assert_eq!(issues[0].kind, IssueKind::MissingChildren);
}

#[rstest]
#[case("North", "north ")]
#[case("North", "NORTH")]
#[case(" north", "North")]
fn given_branch_names_equal_ignoring_case_and_space_when_validating_then_both_flagged(
    #[case] first: &str,
    #[case] second: &str,
) {
    let tree = franchise(&[first, second]);
    let ctx = onboarding(&tree);

    let duplicates: Vec<_> = StepValidator::issues(Step::Branch, &ctx)
        .into_iter()
        .filter(|i| i.kind == IssueKind::Duplicate)
        .collect();

    assert_eq!(duplicates.len(), 2);
    assert_eq!(duplicates[0].path, Some(NodePath::branch(0, 0)));
    assert_eq!(duplicates[1].path, Some(NodePath::branch(0, 1)));
    assert!(!StepValidator::passes(Step::Branch, &ctx));
}

#[test]
fn given_two_blank_branch_names_when_validating_then_required_not_duplicate() {
    let tree = franchise(&["", ""]);

    let issues = StepValidator::issues(Step::Branch, &onboarding(&tree));

    let kinds: Vec<_> = issues
        .iter()
        .filter(|i| i.field == Field::BranchName)
        .map(|i| i.kind)
        .collect();
    assert_eq!(kinds, vec![IssueKind::Required, IssueKind::Required]);
}

#[test]
fn given_same_room_number_in_different_locations_when_validating_then_allowed() {
    // "101" exists once in each branch's location
    let tree = franchise(&["North", "South"]);

    assert!(StepValidator::passes(Step::Room, &onboarding(&tree)));
}

#[test]
fn given_same_room_number_twice_in_one_location_when_validating_then_flagged() {
    let tree = franchise(&["North"]).add_room(0, 0, 0).tree;
    let tree = tree
        .update_room(0, 0, 0, 1, RoomField::RoomNumber(" 101 ".into()), FlowVariant::Onboarding)
        .tree;
    let tree = tree
        .toggle_amenity(0, 0, 0, 1, "Safe", &AmenityCatalog::default())
        .tree;

    let issues = StepValidator::issues(Step::Room, &onboarding(&tree));

    assert_eq!(issues.len(), 2);
    assert!(issues
        .iter()
        .all(|i| i.field == Field::RoomNumber && i.kind == IssueKind::Duplicate));
}

#[test]
fn given_room_without_amenities_when_validating_onboarding_then_blocked() {
    let tree = franchise(&["North"]);
    let tree = tree
        .toggle_amenity(0, 0, 0, 0, "Wi-Fi", &AmenityCatalog::default())
        .tree;

    let onboarding_issues = StepValidator::issues(Step::Room, &onboarding(&tree));
    let standalone = ValidationContext::new(&tree, None, FlowVariant::StandaloneBranch);

    assert_eq!(onboarding_issues.len(), 1);
    assert_eq!(onboarding_issues[0].kind, IssueKind::NoAmenities);
    assert!(StepValidator::passes(Step::Room, &standalone));
}

#[test]
fn given_zero_capacity_in_standalone_flow_when_validating_then_blocked() {
    let tree = franchise(&["North"])
        .update_room(0, 0, 0, 0, RoomField::Capacity(0), FlowVariant::StandaloneBranch)
        .tree;
    let ctx = ValidationContext::new(&tree, None, FlowVariant::StandaloneBranch);

    let issues = StepValidator::issues(Step::Room, &ctx);

    assert_eq!(issues.len(), 1);
    assert_eq!(issues[0].kind, IssueKind::NonPositiveCapacity);
}

#[test]
fn given_location_without_rooms_when_validating_room_step_then_blocked() {
    let tree = franchise(&["North"]).add_location(0, 0).tree;
    let tree = tree
        .update_location(0, 0, 1, LocationField::Name("Annex".into()))
        .tree;
    let ctx = onboarding(&tree);

    assert!(StepValidator::passes(Step::Location, &ctx));
    let issues = StepValidator::issues(Step::Room, &ctx);
    assert_eq!(issues.len(), 1);
    assert_eq!(issues[0].path, Some(NodePath::location(0, 0, 1)));
    assert_eq!(issues[0].kind, IssueKind::MissingChildren);
}

#[test]
fn given_invalid_room_when_location_removed_then_room_step_passes_again() {
    let tree = franchise(&["North"]).add_location(0, 0).tree;
    let tree = tree
        .update_location(0, 0, 1, LocationField::Name("Annex".into()))
        .tree
        .add_room(0, 0, 1)
        .tree;
    assert!(!StepValidator::passes(Step::Room, &onboarding(&tree)));

    let next = tree.remove_location(0, 0, 1).tree;

    assert!(StepValidator::passes(Step::Room, &onboarding(&next)));
}

#[test]
fn given_duplicate_branches_when_asking_field_issues_then_reported_before_any_gate() {
    let tree = franchise(&["North", "north "]);
    let ctx = onboarding(&tree);

    let at_first = StepValidator::issues_at(NodePath::branch(0, 0), &ctx);
    let at_company = StepValidator::issues_at(NodePath::company(0), &ctx);

    assert_eq!(at_first.len(), 1);
    assert_eq!(at_first[0].kind, IssueKind::Duplicate);
    assert!(at_company.is_empty());
}

#[test]
fn given_issues_through_room_when_company_blank_then_includes_earlier_steps() {
    let tree = franchise(&["North"])
        .update_company(0, CompanyField::Name(String::new()))
        .tree;

    let issues = StepValidator::issues_through(Step::Room, &onboarding(&tree));
    let through_first = StepValidator::issues_through(Step::BusinessType, &onboarding(&tree));

    assert_eq!(issues.len(), 1);
    assert_eq!(issues[0].field, Field::CompanyName);
    assert!(through_first.is_empty());
}
