/*
Time grid construction, hour-index mapping, and the scheduling pipeline.
Kept independent of HTTP / Axum so the whole engine is testable without a
server.
*/

use chrono::{DateTime, Datelike, Duration, NaiveDate, TimeZone, Timelike};
use chrono_tz::Tz;

use crate::error::ScheduleError;
use crate::events::{self, TaskEvent};
use crate::models::{ScheduleRequest, TimeBlock, TimeOfDay};
use crate::solver;

// A task localized into the request timezone, with its derived grid indices.
#[derive(Debug, Clone)]
pub struct Task {
    pub title: String,
    pub estimated_hours: f64,
    pub reward: f64,
    pub deadline: Option<DateTime<Tz>>,
    pub start_on_or_after: Option<DateTime<Tz>>,
    // Largest grid index whose hour still finishes by the deadline.
    // len(task_hours) when open-ended, -1 when even the first hour is late.
    pub deadline_hour_index: isize,
    // Smallest grid index at or after the earliest-start instant.
    // 0 when unconstrained, -1 when the whole grid lies before it.
    pub start_hour_index: isize,
}

// A booked appointment localized into the request timezone.
#[derive(Debug, Clone)]
pub struct Appointment {
    pub start: DateTime<Tz>,
    pub end: DateTime<Tz>,
}

// Everything one compute call owns: the localized request plus the hour
// grid derived from it.
#[derive(Debug, Clone)]
pub struct TaskParams {
    pub tz: Tz,
    pub weekly_task_blocks: Vec<Vec<TimeBlock>>,
    pub appointments: Vec<Appointment>,
    pub tasks: Vec<Task>,
    pub start_task_schedule: DateTime<Tz>,
    pub end_task_schedule: DateTime<Tz>,
    // Start instants of every schedulable unit hour, strictly increasing.
    pub task_hours: Vec<DateTime<Tz>>,
}

// Full pipeline from a parsed request to the ordered list of task events.
pub fn compute_schedule(request: ScheduleRequest) -> Result<Vec<TaskEvent>, ScheduleError> {
    let params = TaskParams::from_request(request)?;
    params.check_task_windows()?;

    // Nothing to place, or nowhere to place it; the solver has no columns.
    if params.tasks.is_empty() || params.task_hours.is_empty() {
        return Ok(Vec::new());
    }

    let values = solver::solve(&params)?;
    let task_schedule = events::interpret_task_schedule(&values, params.tasks.len())?;
    Ok(events::merge_task_events(&task_schedule, &params))
}

impl TaskParams {
    // Resolve the timezone, localize every instant into it, build the hour
    // grid, and fill in each task's grid indices.
    pub fn from_request(request: ScheduleRequest) -> Result<Self, ScheduleError> {
        let tz: Tz = request
            .time_zone
            .parse()
            .map_err(|_| ScheduleError::UnknownTimeZone(request.time_zone.clone()))?;

        if request.weekly_task_blocks.len() != 7 {
            return Err(ScheduleError::MalformedWeeklyBlocks(
                request.weekly_task_blocks.len(),
            ));
        }

        let tasks = request
            .tasks
            .into_iter()
            .map(|t| Task {
                title: t.title,
                estimated_hours: t.estimated_hours,
                reward: t.reward,
                // A zero-value instant is another way of leaving these unset.
                deadline: t
                    .deadline
                    .filter(|d| d.year() > 1)
                    .map(|d| d.with_timezone(&tz)),
                start_on_or_after: t
                    .start_on_or_after
                    .filter(|d| d.year() > 1)
                    .map(|d| d.with_timezone(&tz)),
                deadline_hour_index: 0,
                start_hour_index: 0,
            })
            .collect();

        let appointments = request
            .appointments
            .iter()
            .map(|a| Appointment {
                start: a.start.with_timezone(&tz),
                end: a.end.with_timezone(&tz),
            })
            .collect();

        let mut params = TaskParams {
            tz,
            weekly_task_blocks: request.weekly_task_blocks,
            appointments,
            tasks,
            start_task_schedule: request.start_task_schedule.with_timezone(&tz),
            end_task_schedule: request.end_task_schedule.with_timezone(&tz),
            task_hours: Vec::new(),
        };
        params.calculate_task_hours();

        for i in 0..params.tasks.len() {
            let deadline = params.tasks[i].deadline;
            let earliest = params.tasks[i].start_on_or_after;
            params.tasks[i].deadline_hour_index = params.deadline_hour_index(deadline);
            params.tasks[i].start_hour_index = params.start_hour_index(earliest);
        }

        Ok(params)
    }

    // Reject tasks whose timing window cannot contain any grid hour, and
    // estimates the objective cannot divide by.
    pub fn check_task_windows(&self) -> Result<(), ScheduleError> {
        for task in &self.tasks {
            if !(task.estimated_hours > 0.0) {
                return Err(ScheduleError::InvalidEstimatedHours(task.title.clone()));
            }
            if task.deadline_hour_index < 0 {
                return Err(ScheduleError::DeadlineInPast(task.title.clone()));
            }
            if task.start_hour_index < 0 {
                return Err(ScheduleError::StartBeyondHorizon(task.title.clone()));
            }
        }
        Ok(())
    }

    // Place a clock time on a calendar date in this timezone. An ambiguous
    // local time resolves to its earlier occurrence; a time inside a DST
    // gap is pushed one hour past the jump.
    fn local_datetime(&self, date: NaiveDate, tod: TimeOfDay) -> Option<DateTime<Tz>> {
        let naive = date.and_hms_opt(tod.hour, tod.minute, 0)?;
        match self.tz.from_local_datetime(&naive).earliest() {
            Some(t) => Some(t),
            None => self
                .tz
                .from_local_datetime(&(naive + Duration::hours(1)))
                .earliest(),
        }
    }

    // Advance the cursor to the next position inside an availability block
    // with at least one full hour remaining, looking at most seven weekdays
    // ahead. Returns the end of that block, or None if the scan found no
    // room (the cursor has still moved forward, so callers make progress).
    fn move_time_to_next_block(&self, t: &mut DateTime<Tz>) -> Option<DateTime<Tz>> {
        for _ in 0..7 {
            let weekday = t.weekday().num_days_from_sunday() as usize;
            for block in &self.weekly_task_blocks[weekday] {
                let date = t.date_naive();
                let (Some(block_start), Some(block_end)) = (
                    self.local_datetime(date, block.start),
                    self.local_datetime(date, block.end),
                ) else {
                    continue;
                };

                if *t < block_start {
                    *t = block_start;
                }
                if *t + Duration::hours(1) <= block_end {
                    return Some(block_end);
                }
            }
            // Hop to midnight of the next calendar day.
            *t = *t + Duration::hours(24 - i64::from(t.hour()));
        }
        None
    }

    // Walk the horizon one hour at a time, emitting each full hour that
    // sits inside an availability block and clear of appointments.
    fn calculate_task_hours(&mut self) {
        let mut task_hours = Vec::new();
        let mut t = self.start_task_schedule;
        let mut block_end = self.move_time_to_next_block(&mut t);
        let mut hour_ahead = t + Duration::hours(1);

        while hour_ahead <= self.end_task_schedule {
            if block_end.is_some_and(|end| hour_ahead <= end) {
                if !self.appointment_in_range(t, hour_ahead) {
                    task_hours.push(t);
                }
                t = hour_ahead;
            } else {
                // Current block is exhausted; find the next one. The cursor
                // always moves, so the walk terminates past the horizon
                // even when whole weeks are empty.
                block_end = self.move_time_to_next_block(&mut t);
            }
            hour_ahead = t + Duration::hours(1);
        }

        self.task_hours = task_hours;
    }

    fn appointment_in_range(&self, start: DateTime<Tz>, end: DateTime<Tz>) -> bool {
        self.appointments
            .iter()
            .any(|a| a.start < end && a.end > start)
    }

    fn deadline_hour_index(&self, deadline: Option<DateTime<Tz>>) -> isize {
        let Some(deadline) = deadline else {
            return self.task_hours.len() as isize;
        };
        for (i, hour) in self.task_hours.iter().enumerate().rev() {
            if *hour + Duration::hours(1) <= deadline {
                return i as isize;
            }
        }
        -1
    }

    fn start_hour_index(&self, start_on_or_after: Option<DateTime<Tz>>) -> isize {
        let Some(earliest) = start_on_or_after else {
            return 0;
        };
        self.task_hours
            .iter()
            .position(|hour| *hour >= earliest)
            .map_or(-1, |i| i as isize)
    }
}
