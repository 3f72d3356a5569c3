//! Integration tests for the scheduling wizard against sample plans

use study_planner::core::models::{Offering, Semester, StudyPlan, UnitInPlan};
use study_planner::core::planner::{parse_plan_file, parse_plan_str, PlanFile};
use study_planner::core::wizard::{last_semester, PlanViolation, SchedulingWizard};

const S2_2019: Semester = Semester::new(2019, Offering::Semester2);
const S1_2020: Semester = Semester::new(2020, Offering::Semester1);
const S2_2020: Semester = Semester::new(2020, Offering::Semester2);
const S1_2021: Semester = Semester::new(2021, Offering::Semester1);
const S2_2021: Semester = Semester::new(2021, Offering::Semester2);
const S1_2022: Semester = Semester::new(2022, Offering::Semester1);

fn load(name: &str) -> PlanFile {
    parse_plan_file(format!("samples/plans/{name}")).expect("Failed to parse sample plan")
}

fn wizard_for(file: &PlanFile) -> SchedulingWizard<'_> {
    let wizard = SchedulingWizard::new(&file.catalog);
    match file.current_semester {
        Some(current) => wizard.with_current_semester(current),
        None => wizard,
    }
}

fn codes(plan: &StudyPlan) -> Vec<String> {
    let mut codes: Vec<String> = plan.iter().map(|u| u.code.clone()).collect();
    codes.sort();
    codes
}

#[test]
fn test_sample_plan_is_legal() {
    let file = load("bit_cs.csv");
    let wizard = wizard_for(&file);

    assert!(wizard.check(&file.plan).is_empty());
    assert_eq!(last_semester(&file.plan), Some(S1_2022));
}

#[test]
fn test_complete_by_current_finish_returns_plan_unchanged() {
    let file = load("bit_cs.csv");
    let wizard = wizard_for(&file);

    assert_eq!(
        wizard.try_to_complete_by(S1_2022, &file.plan),
        Some(file.plan.clone())
    );
}

#[test]
fn test_complete_by_earlier_semester() {
    let file = load("bit_cs.csv");
    let wizard = wizard_for(&file);

    let plan = wizard
        .try_to_complete_by(S2_2021, &file.plan)
        .expect("A plan finishing by 2021/S2 exists");

    assert!(plan.last_semester().unwrap() <= S2_2021);
    assert!(wizard.is_legal(&plan), "{:?}", wizard.check(&plan));
    assert_eq!(codes(&plan), codes(&file.plan));

    // Completed units stay where they were
    assert_eq!(plan.semester_of("IFB102"), Some(S2_2019));
    assert_eq!(plan.semester_of("IFB104"), Some(S2_2019));

    // Study areas travel with their units
    let capstone = plan.iter().find(|u| u.code == "IFB399").unwrap();
    assert_eq!(capstone.study_area, "IT Core");

    // Result is sorted by semester
    let semesters: Vec<Semester> = plan.iter().map(|u| u.semester).collect();
    let mut sorted = semesters.clone();
    sorted.sort();
    assert_eq!(semesters, sorted);
}

#[test]
fn test_complete_by_infeasible_semester() {
    let file = load("bit_cs.csv");
    let wizard = wizard_for(&file);

    // CAB401 is only offered in semester 2 and comes after two programming units
    assert_eq!(wizard.try_to_complete_by(S1_2021, &file.plan), None);
}

#[test]
fn test_complete_by_before_current_semester() {
    let file = load("bit_cs.csv");
    let wizard = wizard_for(&file);

    assert_eq!(wizard.try_to_complete_by(S2_2019, &file.plan), None);
}

#[test]
fn test_complete_by_respects_unit_limit() {
    let file = load("bit_cs.csv");
    let wizard = wizard_for(&file)
        .with_max_units_per_semester(2)
        .with_search_step_limit(20_000);

    // Twelve remaining units cannot fit into four semesters of two
    assert_eq!(wizard.try_to_complete_by(S2_2021, &file.plan), None);
}

#[test]
fn test_improve_schedule_sequence() {
    let file = load("bit_cs.csv");
    let wizard = wizard_for(&file);

    let improved: Vec<StudyPlan> = wizard.try_to_improve_schedule(&file.plan).collect();

    assert_eq!(improved.len(), 1);
    assert_eq!(last_semester(&improved[0]), Some(S2_2021));

    let mut previous_end = file.plan.last_semester().unwrap();
    for plan in &improved {
        let end = plan.last_semester().unwrap();
        assert!(end < previous_end);
        assert!(wizard.is_legal(plan));
        assert_eq!(codes(plan), codes(&file.plan));
        previous_end = end;
    }
}

#[test]
fn test_improve_schedule_takes_several_steps() {
    // One unit per semester. SPRING is only taught in semester 1, and with a
    // loose target ANY (sorted first) claims 2020/S1 before it.
    let content = "\
Plan,Two Steps
Current Semester,2020/S1
Units
Code,Offered
ANY,S1;S2
SPRING,S1
Study Plan
Code,Semester
SPRING,2022/S1
ANY,2022/S2
";
    let file = parse_plan_str(content).unwrap();
    let wizard = wizard_for(&file).with_max_units_per_semester(1);
    assert!(wizard.is_legal(&file.plan));

    let improved: Vec<StudyPlan> = wizard.try_to_improve_schedule(&file.plan).collect();
    let ends: Vec<_> = improved.iter().map(last_semester).collect();
    assert_eq!(ends, vec![Some(S1_2021), Some(S2_2020)]);

    assert_eq!(improved[0].semester_of("ANY"), Some(S1_2020));
    assert_eq!(improved[0].semester_of("SPRING"), Some(S1_2021));
    assert_eq!(improved[1].semester_of("SPRING"), Some(S1_2020));
    assert_eq!(improved[1].semester_of("ANY"), Some(S2_2020));
    assert!(improved.iter().all(|plan| wizard.is_legal(plan)));

    // Both units in 2020/S1 would break the limit
    assert_eq!(wizard.try_to_complete_by(S1_2020, &improved[1]), None);
}

#[test]
fn test_improve_schedule_is_fused() {
    let file = load("bit_cs.csv");
    let wizard = wizard_for(&file);

    let mut schedules = wizard.try_to_improve_schedule(&file.plan);
    assert!(schedules.next().is_some());
    assert!(schedules.next().is_none());
    assert!(schedules.next().is_none());
}

#[test]
fn test_out_of_order_plan_is_illegal() {
    let file = load("out_of_order.csv");
    let wizard = wizard_for(&file);

    let violations = wizard.check(&file.plan);
    assert_eq!(violations.len(), 1);
    assert!(matches!(
        &violations[0],
        PlanViolation::PrerequisitesNotMet { code, semester, .. }
            if code == "CAB202" && *semester == S1_2021
    ));
    assert_eq!(
        violations[0].to_string(),
        "CAB202 in 2021/S1 does not meet its prerequisites (CAB201)"
    );
}

#[test]
fn test_complete_by_repairs_illegal_plan() {
    let file = load("out_of_order.csv");
    let wizard = wizard_for(&file);

    // The chain IFB104 -> CAB201 -> CAB202 needs three teaching semesters
    assert_eq!(wizard.try_to_complete_by(S2_2021, &file.plan), None);

    let repaired = wizard
        .try_to_complete_by(S1_2022, &file.plan)
        .expect("The chain fits by 2022/S1");

    let expected: StudyPlan = vec![
        UnitInPlan::new("IFB104".to_string(), "IT Core".to_string(), S1_2021),
        UnitInPlan::new("CAB201".to_string(), "IT Core".to_string(), S2_2021),
        UnitInPlan::new("CAB202".to_string(), "IT Core".to_string(), S1_2022),
    ]
    .into();
    assert_eq!(repaired, expected);
    assert!(wizard.is_legal(&repaired));

    // Nothing finishes before 2021/S2, so there is nothing to improve
    assert_eq!(wizard.try_to_improve_schedule(&file.plan).count(), 0);
}

#[test]
fn test_empty_plan() {
    let file = load("bit_cs.csv");
    let wizard = wizard_for(&file);
    let empty = StudyPlan::new();

    assert_eq!(last_semester(&empty), None);
    assert!(wizard.is_legal(&empty));
    assert_eq!(wizard.try_to_complete_by(S1_2020, &empty), Some(StudyPlan::new()));
    assert_eq!(wizard.try_to_improve_schedule(&empty).next(), None);
}

#[test]
fn test_default_current_semester() {
    let file = load("bit_cs.csv");
    let wizard = SchedulingWizard::new(&file.catalog);

    assert_eq!(wizard.current_semester(), S1_2020);
}
