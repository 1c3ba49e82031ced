//! End-to-end: construct, optimize, accept, analyze.

use std::sync::Arc;

use u_timetable::conflict::{
    completion_percentage, ConflictAnalyzer, ConflictSeverity, ConflictType,
};
use u_timetable::models::{
    Course, CourseId, Day, ProblemFacts, Room, RoomId, RoomRequirement, Session, Solution,
    Teacher, TeacherId, TimeSlot, TimeSlotId,
};
use u_timetable::scheduler::{InitialAssigner, TimetableKpi};
use u_timetable::search::island::IslandStatus;
use u_timetable::search::{AnnealingConfig, IslandConfig, IslandCoordinator, SimulatedAnnealing};
use u_timetable::{
    AcceptanceMode, Algorithm, Evaluator, OptimizeError, Optimizer, OptimizerConfig, Strategy,
};

/// Three departments over a two-day, four-period week.
fn school() -> ProblemFacts {
    let mut f = ProblemFacts::new();
    let kim = f.add_teacher(Teacher::new("Kim").with_department("Math"));
    let lee = f.add_teacher(Teacher::new("Lee").with_department("English"));
    let park = f.add_teacher(Teacher::new("Park").with_department("Science").with_max_sessions(6));
    f.add_room(Room::classroom("101").with_capacity(30));
    f.add_room(Room::classroom("102").with_capacity(30));
    f.add_room(Room::lab("Lab A").with_capacity(24));
    for slot in TimeSlot::weekly_grid(&Day::WEEKDAYS[..2], 4, 480, 45, 5) {
        f.add_time_slot(slot);
    }
    f.add_course(Course::new("MATH1").with_subject("Math").with_teacher(kim).with_teacher(lee));
    f.add_course(
        Course::new("CHEM1")
            .with_subject("Chemistry")
            .with_teacher(park)
            .with_room_requirement(RoomRequirement::Lab),
    );
    f.add_course(Course::new("ENG1").with_subject("English").with_teacher(lee));
    f
}

fn school_sessions() -> Vec<Session> {
    let mut sessions = Vec::new();
    for i in 0..4 {
        sessions.push(Session::new(format!("MATH1-{i}"), CourseId(0)).with_roster(28));
    }
    for i in 0..2 {
        sessions.push(Session::new(format!("CHEM1-{i}"), CourseId(1)).with_roster(20));
    }
    for i in 0..3 {
        sessions.push(Session::new(format!("ENG1-{i}"), CourseId(2)).with_roster(25));
    }
    sessions
}

/// `n` sessions crammed into the first slot; a clash-free timetable exists.
fn stacked(n: usize) -> Solution {
    let mut f = ProblemFacts::new();
    f.add_teacher(Teacher::new("T0"));
    f.add_teacher(Teacher::new("T1"));
    f.add_room(Room::classroom("R0").with_capacity(30));
    f.add_room(Room::classroom("R1").with_capacity(30));
    for slot in TimeSlot::weekly_grid(&Day::WEEKDAYS[..2], 4, 480, 45, 5) {
        f.add_time_slot(slot);
    }
    f.add_course(Course::new("GEN").with_teacher(TeacherId(0)).with_teacher(TeacherId(1)));
    let sessions = (0..n)
        .map(|i| {
            Session::new(format!("S{i}"), CourseId(0)).with_roster(20).assigned(
                TeacherId(i % 2),
                RoomId(i % 2),
                TimeSlotId(0),
            )
        })
        .collect();
    Solution::new(Arc::new(f), sessions)
}

#[test]
fn test_full_pipeline_greedy_then_tabu() {
    let draft =
        InitialAssigner::new().greedy(&Solution::new(Arc::new(school()), school_sessions()));
    assert_eq!(completion_percentage(&draft), 100.0);

    let config = OptimizerConfig::from_json_str(
        r#"{ "tabu": { "max_iterations": 400, "seed": 11 }, "acceptance": "Strict" }"#,
    )
    .unwrap();
    let optimizer = Optimizer::new(Some(config));
    let accepted = optimizer.optimize(Algorithm::Tabu, &draft).unwrap();

    assert_eq!(accepted.result.final_score.hard_penalty, 0);
    assert!(accepted.result.final_energy() <= Evaluator::new().energy(&draft));
    assert_eq!(accepted.completion, 100.0);
    assert_eq!(accepted.blocking_conflicts().count(), 0);

    let kpi = TimetableKpi::calculate(&accepted.result.solution);
    assert!(kpi.is_publishable());
    assert_eq!(kpi.teacher_loads.values().sum::<u32>(), 9);
}

#[test]
fn test_round_robin_draft_is_repaired() {
    let draft = InitialAssigner::new().round_robin(&stacked(8));
    let before = Evaluator::new().energy(&draft);

    let optimizer = Optimizer::new(Some(
        OptimizerConfig::default().with_annealing(AnnealingConfig::default().with_seed(3)),
    ));
    let result = optimizer.run(Algorithm::Annealing, &draft).unwrap();
    assert!(result.final_energy() <= before);
    assert_eq!(result.history.len(), result.iterations);
}

#[test]
fn test_teacher_double_booking_is_reported_once() {
    let mut f = ProblemFacts::new();
    let t0 = f.add_teacher(Teacher::new("Kim"));
    let t1 = f.add_teacher(Teacher::new("Lee"));
    f.add_room(Room::classroom("101"));
    f.add_room(Room::classroom("102"));
    for slot in TimeSlot::weekly_grid(&[Day::Monday], 5, 480, 45, 5) {
        f.add_time_slot(slot);
    }
    let c = f.add_course(Course::new("MATH1").with_teacher(t0).with_teacher(t1));
    let sessions = vec![
        Session::new("S1", c).assigned(t0, RoomId(0), TimeSlotId(0)),
        Session::new("S2", c).assigned(t0, RoomId(1), TimeSlotId(0)),
        Session::new("S3", c).assigned(t1, RoomId(0), TimeSlotId(1)),
    ];
    let solution = Solution::new(Arc::new(f), sessions);

    assert!(Evaluator::new().evaluate(&solution).hard_penalty > 0);

    let conflicts = ConflictAnalyzer::new().analyze(&solution);
    let blocking: Vec<_> = conflicts.iter().filter(|c| c.blocking).collect();
    assert_eq!(blocking.len(), 1);
    assert_eq!(blocking[0].conflict_type, ConflictType::TeacherDoubleBooking);
    assert_eq!(blocking[0].session_ids, vec!["S1", "S2"]);
}

#[test]
fn test_only_teacher_at_capacity_is_critical_overload() {
    let mut f = ProblemFacts::new();
    let t = f.add_teacher(Teacher::new("Kim").with_max_sessions(1));
    f.add_room(Room::classroom("101"));
    for slot in TimeSlot::weekly_grid(&[Day::Monday], 3, 480, 45, 5) {
        f.add_time_slot(slot);
    }
    let c = f.add_course(Course::new("MATH1").with_teacher(t));
    let draft = InitialAssigner::new().greedy(&Solution::new(
        Arc::new(f),
        vec![Session::new("A", c), Session::new("B", c)],
    ));

    let conflicts = ConflictAnalyzer::new().analyze(&draft);
    assert_eq!(conflicts.len(), 1);
    assert_eq!(conflicts[0].conflict_type, ConflictType::TeacherOverload);
    assert_eq!(conflicts[0].severity, ConflictSeverity::Critical);
    assert_eq!(conflicts[0].session_ids, vec!["B"]);
    assert_eq!(completion_percentage(&draft), 50.0);
}

#[test]
fn test_single_session_with_saturated_teacher_is_critical_overload() {
    let mut f = ProblemFacts::new();
    let t = f.add_teacher(Teacher::new("Kim").with_max_sessions(0));
    f.add_room(Room::classroom("101"));
    for slot in TimeSlot::weekly_grid(&[Day::Monday], 3, 480, 45, 5) {
        f.add_time_slot(slot);
    }
    let c = f.add_course(Course::new("MATH1").with_teacher(t));
    let solution = Solution::new(Arc::new(f), vec![Session::new("S1", c)]);

    let conflicts = ConflictAnalyzer::new().analyze(&solution);
    assert_eq!(conflicts.len(), 1);
    assert_eq!(conflicts[0].conflict_type, ConflictType::TeacherOverload);
    assert_eq!(conflicts[0].severity, ConflictSeverity::Critical);
    assert!(conflicts[0].blocking);
    assert_eq!(conflicts[0].session_ids, vec!["S1"]);
    assert_eq!(completion_percentage(&solution), 0.0);
}

#[test]
fn test_annealing_finds_feasible_timetable_for_most_seeds() {
    let initial = stacked(8);
    assert_eq!(Evaluator::new().energy(&initial), 1200.0);

    let feasible = (0..10u64)
        .filter(|&seed| {
            let sa = SimulatedAnnealing::new(AnnealingConfig::default().with_seed(seed));
            sa.optimize(&initial)
                .map(|r| r.final_score.hard_penalty == 0)
                .unwrap_or(false)
        })
        .count();
    assert!(feasible >= 8, "only {feasible}/10 seeds reached zero hard violations");
}

#[test]
fn test_coordinator_best_is_no_worse_than_any_survivor() {
    let config = IslandConfig::default()
        .with_seed(17)
        .with_num_islands(4)
        .with_iterations_per_island(600);
    let report = IslandCoordinator::new(config).run(&stacked(8)).unwrap();

    let best = report.best.as_ref().map(|r| r.final_energy()).unwrap();
    assert_eq!(report.survivors(), 4);
    for island in &report.islands {
        if let IslandStatus::Completed { energy } = &island.status {
            assert!(best <= *energy);
        }
    }
}

#[test]
fn test_strict_and_partial_acceptance() {
    let infeasible = stacked(4);
    let strict = Optimizer::new(Some(
        OptimizerConfig::default().with_acceptance(AcceptanceMode::Strict),
    ));
    let partial = Optimizer::new(None);

    let result = u_timetable::OptimizationResult {
        algorithm: "manual".into(),
        initial_score: Evaluator::new().evaluate(&infeasible),
        final_score: Evaluator::new().evaluate(&infeasible),
        improvement_percentage: 0.0,
        iterations: 0,
        duration: std::time::Duration::ZERO,
        solution: infeasible.clone(),
        history: Vec::new(),
        best_history: Vec::new(),
        stop_reason: u_timetable::StopReason::Completed,
    };

    assert!(matches!(
        strict.accept(result.clone()),
        Err(OptimizeError::Infeasible { hard_violations: 4 })
    ));
    let accepted = partial.accept(result).unwrap();
    assert_eq!(accepted.completion, 100.0);
    assert_eq!(
        accepted
            .conflicts
            .iter()
            .filter(|c| c.conflict_type == ConflictType::TeacherDoubleBooking)
            .count(),
        2
    );
}

#[test]
fn test_completion_percentage_edges() {
    let facts = Arc::new(school());
    assert_eq!(completion_percentage(&Solution::new(facts.clone(), Vec::new())), 0.0);

    let mut sessions = school_sessions();
    sessions[0] = sessions[0]
        .clone()
        .assigned(TeacherId(0), RoomId(0), TimeSlotId(0));
    let solution = Solution::new(facts, sessions);
    let expected = 100.0 / solution.len() as f64;
    assert!((completion_percentage(&solution) - expected).abs() < 1e-10);
}
