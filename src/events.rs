/*
Turns the solved variable vector back into per-hour assignments and merges
runs of hours into the events returned to the caller.
*/

use chrono::{DateTime, Duration};
use chrono_tz::Tz;

use crate::error::ScheduleError;
use crate::schedule::TaskParams;

// Solver output within this distance of 0 or 1 counts as exact.
pub const SOLUTION_TOLERANCE: f64 = 1e-3;

// One maximal run of consecutive grid hours spent on the same task.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskEvent {
    pub title: String,
    pub start: DateTime<Tz>,
    pub end: DateTime<Tz>,
    pub finish: bool,
}

// Map each grid hour to the task assigned there, if any.
//
// Values that are neither ~0 nor ~1 mean the relaxation produced a
// genuinely fractional optimum, which callers must see as an error rather
// than a schedule.
pub fn interpret_task_schedule(
    values: &[f64],
    task_count: usize,
) -> Result<Vec<Option<usize>>, ScheduleError> {
    let hour_count = if task_count == 0 {
        0
    } else {
        values.len() / task_count
    };

    let mut task_schedule = vec![None; hour_count];
    for hour in 0..hour_count {
        for task_num in 0..task_count {
            let value = values[hour * task_count + task_num];
            if (value - 1.0).abs() < SOLUTION_TOLERANCE {
                task_schedule[hour] = Some(task_num);
            } else if value.abs() > SOLUTION_TOLERANCE {
                return Err(ScheduleError::NonIntegralSolution {
                    hour,
                    task: task_num,
                    value,
                });
            }
        }
    }
    Ok(task_schedule)
}

// Merge consecutive hours of the same task into events.
//
// A new event starts whenever the assigned task changes, or when the next
// hour is not flush with the end of the previous one (an overnight gap or
// a displaced hour between two assignments to the same task).
pub fn merge_task_events(task_schedule: &[Option<usize>], params: &TaskParams) -> Vec<TaskEvent> {
    let mut events: Vec<TaskEvent> = Vec::new();
    let mut hours_scheduled = vec![0.0_f64; params.tasks.len()];
    let mut prev_task: Option<usize> = None;
    let mut last_hour_end: Option<DateTime<Tz>> = None;

    for (i, assigned) in task_schedule.iter().enumerate() {
        if let Some(task_num) = *assigned {
            let start = params.task_hours[i];
            let end = start + Duration::hours(1);
            let task = &params.tasks[task_num];

            if prev_task != Some(task_num) || last_hour_end.map_or(true, |t| start > t) {
                events.push(TaskEvent {
                    title: task.title.clone(),
                    start,
                    end,
                    finish: false,
                });
            }
            if let Some(event) = events.last_mut() {
                event.end = end;
                hours_scheduled[task_num] += 1.0;
                if hours_scheduled[task_num] >= task.estimated_hours {
                    event.finish = true;
                }
            }
            last_hour_end = Some(end);
        }
        prev_task = *assigned;
    }

    events
}
