use good_lp::variable;
use good_lp::{
    Expression, ProblemVariables, ResolutionError, Solution, SolverModel, Variable, constraint,
    default_solver,
};
use itertools::Itertools;
use log::{debug, info, trace, warn};
use std::collections::BTreeMap;
use std::time::Instant;

use crate::availability::AvailabilityIndex;
use crate::data::{
    ExactOptions, GlobalSlot, SchedulerConfig, Student, SupervisorId, TimeslotInstance,
    UnassignedReason, UnassignedRecord,
};
use crate::error::ScheduleError;
use crate::greedy;
use crate::schedule::Schedule;

/// Solves the placement exactly with the HiGHS MIP solver.
///
/// Places as many students as possible first, then maximises
/// `same_category_weight * (same-category pairs)` minus
/// `unused_slot_weight * (used global slots)`, subject to the same hard
/// rules as the greedy engine. Students left out are reported with the
/// rules that block them in the returned schedule.
pub fn solve(
    students: &[Student],
    instances: &[TimeslotInstance],
    availability: &AvailabilityIndex,
    config: &SchedulerConfig,
    options: &ExactOptions,
) -> Result<(Schedule, Vec<UnassignedRecord>), ScheduleError> {
    let start_time = Instant::now();
    let mut schedule = Schedule::new(instances.to_vec());
    let mut unassigned = Vec::new();

    // keep the first occurrence of every id
    let students: Vec<&Student> = students.iter().unique_by(|s| s.id).collect();

    let mut problem = ProblemVariables::new();

    // x_ij = 1 if student j sits in instance i; only created where the
    // supervisor is free, which enforces availability implicitly.
    let mut by_instance: Vec<Vec<(usize, Variable)>> = vec![Vec::new(); instances.len()];
    let mut by_student: Vec<Vec<Variable>> = vec![Vec::new(); students.len()];
    for (j, student) in students.iter().enumerate() {
        for (i, instance) in instances.iter().enumerate() {
            if availability.is_available(student.supervisor_id, instance.slot) {
                let x = problem.add(variable().binary());
                by_instance[i].push((j, x));
                by_student[j].push(x);
            }
        }
    }

    let mut modelled = Vec::new();
    for (j, student) in students.iter().enumerate() {
        if by_student[j].is_empty() {
            unassigned.push(UnassignedRecord {
                student: (*student).clone(),
                reasons: vec![UnassignedReason::SupervisorUnavailable],
                supervisor_availability: availability.snapshot(student.supervisor_id),
            });
        } else {
            modelled.push(j);
        }
    }
    if modelled.is_empty() {
        return Ok((schedule, unassigned));
    }
    info!(
        "Setting up MIP model with {} students, {} instances and {} slots...",
        modelled.len(),
        instances.len(),
        config.total_slots()
    );

    // y_ia = 1 if supervisor a attends instance i
    let mut presence: BTreeMap<(usize, SupervisorId), Variable> = BTreeMap::new();
    for (i, vars) in by_instance.iter().enumerate() {
        for (j, _) in vars {
            presence
                .entry((i, students[*j].supervisor_id))
                .or_insert_with(|| problem.add(variable().binary()));
        }
    }

    // u_g = 1 if any room at global slot g is used
    let mut slot_used: BTreeMap<GlobalSlot, Variable> = BTreeMap::new();
    for (i, vars) in by_instance.iter().enumerate() {
        if !vars.is_empty() {
            slot_used
                .entry(instances[i].slot)
                .or_insert_with(|| problem.add(variable().binary()));
        }
    }

    // w_ijk = 1 only if same-category students j and k share instance i
    let mut pair_links: Vec<(Variable, Variable, Variable)> = Vec::new();
    for vars in &by_instance {
        for ((j, xj), (k, xk)) in vars.iter().tuple_combinations() {
            if students[*j].category == students[*k].category {
                let w = problem.add(variable().binary());
                pair_links.push((w, *xj, *xk));
            }
        }
    }
    trace!(
        "Generated {} placement, {} presence, {} slot and {} pair variables.",
        by_student.iter().map(Vec::len).sum::<usize>(),
        presence.len(),
        slot_used.len(),
        pair_links.len()
    );

    // one more placement outweighs any change in pairs or slot usage
    let assign_weight = options.same_category_weight.abs() * pair_links.len() as f64
        + options.unused_slot_weight.abs() * slot_used.len() as f64
        + 1.0;
    let seated: Expression = by_student.iter().flatten().copied().sum();
    let pair_score: Expression = pair_links.iter().map(|(w, _, _)| *w).sum();
    let used_slots: Expression = slot_used.values().copied().sum();
    let objective = assign_weight * seated + options.same_category_weight * pair_score
        - options.unused_slot_weight * used_slots;

    let mut model = problem
        .maximise(objective)
        .using(default_solver)
        .set_option("threads", 1) // limit to 1 thread for reproducibility
        .set_option("random_seed", 1234)
        .set_option("log_to_console", "false");
    if let Some(secs) = options.time_limit_secs {
        model = model.set_option("time_limit", secs);
    }

    let capacity = config.capacity_per_slot as f64;

    // every student placed at most once
    for &j in &modelled {
        let placed: Expression = by_student[j].iter().copied().sum();
        model.add_constraint(constraint!(placed <= 1));
    }

    // room capacity
    for vars in &by_instance {
        if vars.len() > config.capacity_per_slot as usize {
            let seated: Expression = vars.iter().map(|(_, x)| *x).sum();
            model.add_constraint(constraint!(seated <= capacity));
        }
    }

    // a supervisor attends exactly the instances holding their students
    let mut members: BTreeMap<(usize, SupervisorId), Vec<Variable>> = BTreeMap::new();
    for (i, vars) in by_instance.iter().enumerate() {
        for (j, x) in vars {
            members
                .entry((i, students[*j].supervisor_id))
                .or_default()
                .push(*x);
        }
    }
    for (key, y) in &presence {
        let own: Expression = members[key].iter().copied().sum();
        model.add_constraint(constraint!(own.clone() <= capacity * Expression::from(*y)));
        model.add_constraint(constraint!(own >= *y));
    }

    // no supervisor in two rooms at the same global slot
    let mut parallel: BTreeMap<(GlobalSlot, SupervisorId), Vec<Variable>> = BTreeMap::new();
    for (&(i, a), y) in &presence {
        parallel.entry((instances[i].slot, a)).or_default().push(*y);
    }
    for ys in parallel.values().filter(|ys| ys.len() > 1) {
        let booked: Expression = ys.iter().copied().sum();
        model.add_constraint(constraint!(booked <= 1));
    }

    // slot usage indicator
    let slot_cap = capacity * config.rooms as f64;
    let mut per_slot: BTreeMap<GlobalSlot, Vec<Variable>> = BTreeMap::new();
    for (i, vars) in by_instance.iter().enumerate() {
        per_slot
            .entry(instances[i].slot)
            .or_default()
            .extend(vars.iter().map(|(_, x)| *x));
    }
    for (slot, xs) in per_slot.iter().filter(|(_, xs)| !xs.is_empty()) {
        let seated: Expression = xs.iter().copied().sum();
        model.add_constraint(constraint!(seated <= slot_cap * Expression::from(slot_used[slot])));
    }

    // pair indicators
    for (w, xj, xk) in &pair_links {
        model.add_constraint(constraint!(*w <= *xj));
        model.add_constraint(constraint!(*w <= *xk));
    }

    info!("Starting MIP solver...");
    let solution = match model.solve() {
        Ok(s) => s,
        Err(ResolutionError::Infeasible) => return Err(ScheduleError::Infeasible),
        Err(e) => return Err(ScheduleError::Solver(e.to_string())),
    };
    info!("Solution found in {:.2?}", start_time.elapsed());

    let mut placed = vec![false; students.len()];
    for (i, vars) in by_instance.iter().enumerate() {
        for (j, x) in vars {
            if solution.value(*x) > 0.9 && !placed[*j] {
                placed[*j] = true;
                schedule.push_student(i, (*students[*j]).clone());
                schedule.add_supervisor(i, students[*j].supervisor_id);
            }
        }
    }
    for &j in &modelled {
        if placed[j] {
            continue;
        }
        let supervisor = students[j].supervisor_id;
        let reasons =
            greedy::blocking_reasons(&schedule, supervisor, availability, config.capacity_per_slot);
        if reasons.is_empty() {
            warn!(
                "Solver left student {} out although a session could take them.",
                students[j].id
            );
        } else {
            debug!("Student {} left unassigned: {:?}", students[j].id, reasons);
        }
        unassigned.push(UnassignedRecord {
            student: students[j].clone(),
            reasons,
            supervisor_availability: availability.snapshot(supervisor),
        });
    }

    Ok((schedule, unassigned))
}
