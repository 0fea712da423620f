/*
Linear program assembly. One variable per (hour, task) pair; the solver is
only asked for sparse <= / == rows and a maximized objective, so any
backend with that interface would do.
*/

use good_lp::{
    constraint, default_solver, variable, variables, Expression, Solution, SolverModel, Variable,
};

use crate::error::ScheduleError;
use crate::schedule::TaskParams;

// Geometric per-hour decay applied to every reward coefficient. Strictly
// positive gradient toward earlier hours, so optimal schedules front-load.
pub const DECAY_RATE: f64 = 0.95;

// Solve for the optimal (hour, task) assignment and return the variable
// values in column order hour * task_count + task_num.
pub fn solve(params: &TaskParams) -> Result<Vec<f64>, ScheduleError> {
    let task_count = params.tasks.len();
    let hour_count = params.task_hours.len();

    let mut vars = variables!();
    let mut cols: Vec<Variable> = Vec::with_capacity(hour_count * task_count);
    for hour in 0..hour_count {
        for task_num in 0..task_count {
            cols.push(vars.add(
                variable()
                    .min(0.0)
                    .max(1.0)
                    .name(format!("h{hour}_t{task_num}")),
            ));
        }
    }
    let col = |hour: usize, task_num: usize| cols[hour * task_count + task_num];

    // Decayed per-hour reward, normalized by task length so short tasks
    // stay competitive with long ones of equal total reward.
    let mut objective = Expression::from(0.0);
    let mut hour_value = 1.0;
    for hour in 0..hour_count {
        for (task_num, task) in params.tasks.iter().enumerate() {
            objective =
                objective + hour_value * task.reward / task.estimated_hours * col(hour, task_num);
        }
        hour_value *= DECAY_RATE;
    }

    let mut model = vars.maximise(objective).using(default_solver);

    // At most one hour of total work per hour.
    for hour in 0..hour_count {
        let spent = (0..task_count).fold(Expression::from(0.0), |sum, t| sum + col(hour, t));
        model = model.with(constraint!(spent <= 1.0));
    }

    // No task receives more than its estimate.
    for (task_num, task) in params.tasks.iter().enumerate() {
        let spent = (0..hour_count).fold(Expression::from(0.0), |sum, h| sum + col(h, task_num));
        model = model.with(constraint!(spent <= task.estimated_hours));
    }

    // A task with a reachable deadline must be fully done by it. This row
    // subsumes the ceiling above for such tasks.
    for (task_num, task) in params.tasks.iter().enumerate() {
        if task.deadline_hour_index >= 0 && (task.deadline_hour_index as usize) < hour_count {
            let until_deadline = (0..=task.deadline_hour_index as usize)
                .fold(Expression::from(0.0), |sum, h| sum + col(h, task_num));
            model = model.with(constraint!(until_deadline == task.estimated_hours));
        }
    }

    // No work before a task's earliest start.
    for (task_num, task) in params.tasks.iter().enumerate() {
        if task.start_hour_index > 0 {
            let before_start = (0..task.start_hour_index as usize)
                .fold(Expression::from(0.0), |sum, h| sum + col(h, task_num));
            model = model.with(constraint!(before_start == 0.0));
        }
    }

    let solution = model
        .solve()
        .map_err(|e| ScheduleError::Solver(e.to_string()))?;

    Ok(cols.iter().map(|&v| solution.value(v)).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule::Task;
    use chrono::{DateTime, TimeZone};
    use chrono_tz::{America::New_York, Tz};

    fn hours(count: u32) -> Vec<DateTime<Tz>> {
        (0..count)
            .map(|h| {
                New_York
                    .with_ymd_and_hms(2015, 2, 16, 10 + h, 0, 0)
                    .unwrap()
            })
            .collect()
    }

    fn task(title: &str, estimated_hours: f64, reward: f64) -> Task {
        Task {
            title: title.into(),
            estimated_hours,
            reward,
            deadline: None,
            start_on_or_after: None,
            // Past any grid, i.e. no deadline row; tests override as needed.
            deadline_hour_index: isize::MAX,
            start_hour_index: 0,
        }
    }

    fn params(tasks: Vec<Task>, hour_count: u32) -> TaskParams {
        let task_hours = hours(hour_count);
        TaskParams {
            tz: New_York,
            weekly_task_blocks: vec![Vec::new(); 7],
            appointments: Vec::new(),
            tasks,
            start_task_schedule: task_hours[0],
            end_task_schedule: task_hours[task_hours.len() - 1],
            task_hours,
        }
    }

    fn assert_near(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-6,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn higher_hourly_reward_wins_the_earlier_hour() {
        let p = params(vec![task("A", 1.0, 10.0), task("B", 1.0, 1.0)], 2);
        let values = solve(&p).unwrap();
        // A at hour 0, B at hour 1.
        assert_near(values[0], 1.0);
        assert_near(values[1], 0.0);
        assert_near(values[2], 0.0);
        assert_near(values[3], 1.0);
    }

    #[test]
    fn earliest_start_pushes_work_later() {
        let mut urgent = task("B", 1.0, 100.0);
        urgent.start_hour_index = 1;
        let p = params(vec![task("A", 1.0, 1.0), urgent], 2);
        let values = solve(&p).unwrap();
        // B is worth far more but cannot take hour 0, so A does.
        assert_near(values[0], 1.0);
        assert_near(values[1], 0.0);
        assert_near(values[2], 0.0);
        assert_near(values[3], 1.0);
    }

    #[test]
    fn deadline_constraint_forces_completion_early() {
        let mut due_first = task("B", 1.0, 1.0);
        due_first.deadline_hour_index = 0;
        let p = params(vec![task("A", 2.0, 100.0), due_first], 2);
        let values = solve(&p).unwrap();
        // B must occupy hour 0 despite A's larger reward.
        assert_near(values[1], 1.0);
        assert_near(values[0], 0.0);
        assert_near(values[2], 1.0);
        assert_near(values[3], 0.0);
    }

    #[test]
    fn unreachable_deadline_demand_is_a_solver_failure() {
        let mut impossible = task("A", 2.0, 1.0);
        impossible.deadline_hour_index = 0;
        let p = params(vec![impossible], 2);
        match solve(&p) {
            Err(ScheduleError::Solver(_)) => {}
            other => panic!("expected Solver error, got {other:?}"),
        }
    }
}
