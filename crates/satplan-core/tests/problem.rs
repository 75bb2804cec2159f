use satplan_core::{
    ActionId, FactId, Goal, GroundAction, GroundProblem, GroundProblemBuilder, Plan, PlanStep,
    ProblemError, SimulationError, State,
};

/// Gripper-like toy: move between rooms, pick up a ball, drop it.
fn toy_problem() -> GroundProblem {
    let mut b = GroundProblemBuilder::new();
    let at_a = b.fact("at-a").unwrap();
    let at_b = b.fact("at-b").unwrap();
    let ball_a = b.fact("ball-a").unwrap();
    let ball_b = b.fact("ball-b").unwrap();
    let holding = b.fact("holding").unwrap();

    b.action(
        GroundAction::new("move-a-b")
            .with_pre([at_a])
            .with_add([at_b])
            .with_del([at_a]),
    );
    b.action(
        GroundAction::new("move-b-a")
            .with_pre([at_b])
            .with_add([at_a])
            .with_del([at_b]),
    );
    b.action(
        GroundAction::new("pick-a")
            .with_pre([at_a, ball_a])
            .with_pre_neg([holding])
            .with_add([holding])
            .with_del([ball_a]),
    );
    b.action(
        GroundAction::new("drop-b")
            .with_pre([at_b, holding])
            .with_add([ball_b])
            .with_del([holding]),
    );

    b.init_true(at_a).init_true(ball_a);
    b.goal_true(ball_b).goal_false(holding);
    b.build().unwrap()
}

fn sequential(ids: &[u32]) -> Plan {
    Plan::new(
        ids.iter()
            .enumerate()
            .map(|(t, &id)| PlanStep {
                time: t as u32,
                actions: vec![ActionId(id)],
            })
            .collect(),
    )
}

#[test]
fn builder_assigns_dense_ids_in_declaration_order() {
    let problem = toy_problem();
    assert_eq!(problem.fact_count(), 5);
    assert_eq!(problem.action_count(), 4);
    assert_eq!(problem.fact_name(FactId(2)), Some("ball-a"));
    assert_eq!(problem.action(ActionId(3)).map(|a| a.name.as_str()), Some("drop-b"));
    assert!(problem.init().holds(FactId(0)));
    assert!(!problem.init().holds(FactId(1)));
    assert!(!problem.init_satisfies_goal());
}

#[test]
fn duplicate_fact_names_are_rejected() {
    let mut b = GroundProblemBuilder::new();
    b.fact("p").unwrap();
    assert_eq!(b.fact("p"), Err(ProblemError::DuplicateFact("p".into())));
}

#[test]
fn out_of_range_action_facts_are_rejected() {
    let err = GroundProblem::new(
        vec!["p".into()],
        vec![GroundAction::new("bad").with_add([FactId(4)])],
        State::empty(1),
        Goal::default(),
    )
    .unwrap_err();
    assert!(matches!(err, ProblemError::FactOutOfRange { fact: FactId(4), .. }));
}

#[test]
fn contradictory_goal_is_rejected() {
    let err = GroundProblem::new(
        vec!["p".into()],
        vec![],
        State::empty(1),
        Goal::new([FactId(0)], [FactId(0)]),
    )
    .unwrap_err();
    assert_eq!(err, ProblemError::InconsistentGoal(FactId(0)));
}

#[test]
fn valid_plan_reaches_goal() {
    let problem = toy_problem();
    let plan = sequential(&[2, 0, 3]);
    let state = plan.simulate(&problem).unwrap();
    assert!(state.holds(FactId(3)));
    assert!(plan.achieves_goal(&problem));
    assert_eq!(plan.action_names(&problem), vec!["pick-a", "move-a-b", "drop-b"]);
}

#[test]
fn simulation_reports_first_violated_step() {
    let problem = toy_problem();
    let plan = sequential(&[0, 3]);
    assert_eq!(
        plan.simulate(&problem),
        Err(SimulationError::PreconditionViolated {
            step: 1,
            action: "drop-b".into()
        })
    );
    assert!(!plan.achieves_goal(&problem));
}

#[test]
fn parallel_step_checks_against_pre_step_state() {
    let problem = toy_problem();
    // pick-a and move-a-b both read at-a before the step.
    let plan = Plan::new(vec![
        PlanStep {
            time: 0,
            actions: vec![ActionId(0), ActionId(2)],
        },
        PlanStep {
            time: 1,
            actions: vec![ActionId(3)],
        },
    ]);
    assert!(plan.achieves_goal(&problem));
    assert_eq!(plan.len(), 2);
    assert_eq!(plan.action_count(), 3);
}

#[test]
fn unknown_actions_fail_simulation() {
    let problem = toy_problem();
    assert_eq!(
        sequential(&[9]).simulate(&problem),
        Err(SimulationError::UnknownAction(ActionId(9)))
    );
}

#[test]
fn relaxed_reachability_detects_unreachable_goal() {
    let mut b = GroundProblemBuilder::new();
    let p = b.fact("p").unwrap();
    let q = b.fact("q").unwrap();
    let r = b.fact("r").unwrap();
    b.action(GroundAction::new("p->q").with_pre([p]).with_add([q]));
    b.action(GroundAction::new("r->p").with_pre([r]).with_add([p]));
    b.goal_true(q);
    let problem = b.build().unwrap();

    let reached = problem.relaxed_reachable();
    assert!(!reached.holds(q));
    assert!(!problem.goal_possibly_reachable());
}

#[test]
fn negative_goal_needs_a_deleter() {
    let mut b = GroundProblemBuilder::new();
    let p = b.fact("p").unwrap();
    b.init_true(p);
    b.goal_false(p);
    let problem = b.build().unwrap();
    assert!(!problem.goal_possibly_reachable());

    let mut b = GroundProblemBuilder::new();
    let p = b.fact("p").unwrap();
    b.action(GroundAction::new("clear").with_del([p]));
    b.init_true(p);
    b.goal_false(p);
    assert!(b.build().unwrap().goal_possibly_reachable());
}

#[test]
fn toy_goal_is_possibly_reachable() {
    assert!(toy_problem().goal_possibly_reachable());
}
