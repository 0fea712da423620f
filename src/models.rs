use chrono::{DateTime, FixedOffset};
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

// Clock time within a day, with no date attached.
//
// Weekly block boundaries are plain "HH:MM" wall-clock values; they only
// become instants once combined with a calendar date in the request's
// timezone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeOfDay {
    pub hour: u32,   // 0..=23
    pub minute: u32, // 0..=59
}

impl TimeOfDay {
    // Accepts one- or two-digit hours, so "9:00" and "09:00" both parse.
    pub fn parse(s: &str) -> Option<Self> {
        let (hour, minute) = s.split_once(':')?;
        let hour: u32 = hour.parse().ok()?;
        let minute: u32 = minute.parse().ok()?;
        if hour > 23 || minute > 59 {
            return None;
        }
        Some(TimeOfDay { hour, minute })
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

impl Serialize for TimeOfDay {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for TimeOfDay {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        TimeOfDay::parse(&s).ok_or_else(|| {
            de::Error::custom(format!(
                r#"should be a string formatted as "HH:MM", got "{s}""#
            ))
        })
    }
}

// One recurring window of available working time on a given weekday.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeBlock {
    pub start: TimeOfDay,
    pub end: TimeOfDay,
}

// Already-booked calendar entry; grid hours it overlaps are dropped.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Appointment {
    pub title: String,
    pub start: DateTime<FixedOffset>,
    pub end: DateTime<FixedOffset>,
}

// A unit of work to place on the schedule.
//
// Optional instants may be absent from the JSON or sent as the zero
// instant; both mean "unset" (normalized when the request is localized).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub title: String,
    pub estimated_hours: f64,
    pub reward: f64,
    #[serde(default)]
    pub deadline: Option<DateTime<FixedOffset>>,
    #[serde(default)]
    pub start_on_or_after: Option<DateTime<FixedOffset>>,
}

// Full scheduling request body.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleRequest {
    pub time_zone: String, // IANA name, e.g. "America/New_York"
    pub weekly_task_blocks: Vec<Vec<TimeBlock>>, // 7 entries, Sunday first
    #[serde(default)]
    pub appointments: Vec<Appointment>,
    pub tasks: Vec<Task>,
    pub start_task_schedule: DateTime<FixedOffset>,
    pub end_task_schedule: DateTime<FixedOffset>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_two_digit_and_one_digit_hours() {
        assert_eq!(
            TimeOfDay::parse("10:00"),
            Some(TimeOfDay { hour: 10, minute: 0 })
        );
        assert_eq!(
            TimeOfDay::parse("9:30"),
            Some(TimeOfDay { hour: 9, minute: 30 })
        );
    }

    #[test]
    fn rejects_malformed_clock_times() {
        assert_eq!(TimeOfDay::parse("24:00"), None);
        assert_eq!(TimeOfDay::parse("10:60"), None);
        assert_eq!(TimeOfDay::parse("1000"), None);
        assert_eq!(TimeOfDay::parse("ab:cd"), None);
        assert_eq!(TimeOfDay::parse(""), None);
    }

    #[test]
    fn clock_time_round_trips_through_json() {
        let parsed: TimeOfDay = serde_json::from_str(r#""9:05""#).unwrap();
        assert_eq!(parsed, TimeOfDay { hour: 9, minute: 5 });
        assert_eq!(serde_json::to_string(&parsed).unwrap(), r#""09:05""#);
    }

    #[test]
    fn clock_time_rejects_bad_json_string() {
        let result: Result<TimeOfDay, _> = serde_json::from_str(r#""later""#);
        assert!(result.is_err());
    }

    #[test]
    fn deserializes_request_with_camel_case_fields() {
        let json = r#"{
            "timeZone": "America/New_York",
            "weeklyTaskBlocks": [
                [],
                [{"start": "10:00", "end": "16:00"}],
                [], [], [], [], []
            ],
            "tasks": [
                {"title": "Newsletter", "estimatedHours": 6, "reward": 6,
                 "deadline": "2015-02-16T22:00:00Z"},
                {"title": "Reimbursements", "estimatedHours": 1, "reward": 3}
            ],
            "startTaskSchedule": "2015-02-16T14:00:00Z",
            "endTaskSchedule": "2015-02-20T22:00:00Z"
        }"#;

        let request: ScheduleRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.time_zone, "America/New_York");
        assert_eq!(request.weekly_task_blocks.len(), 7);
        assert_eq!(request.weekly_task_blocks[1].len(), 1);
        assert_eq!(
            request.weekly_task_blocks[1][0].start,
            TimeOfDay { hour: 10, minute: 0 }
        );
        // appointments may be omitted entirely
        assert!(request.appointments.is_empty());
        assert_eq!(request.tasks.len(), 2);
        assert_eq!(request.tasks[0].title, "Newsletter");
        assert_eq!(request.tasks[0].estimated_hours, 6.0);
        assert!(request.tasks[0].deadline.is_some());
        assert!(request.tasks[0].start_on_or_after.is_none());
        assert!(request.tasks[1].deadline.is_none());
    }

    #[test]
    fn request_instants_survive_a_round_trip() {
        let json = r#"{
            "timeZone": "America/New_York",
            "weeklyTaskBlocks": [[], [], [], [], [], [], []],
            "appointments": [
                {"title": "Mtg", "start": "2015-02-16T15:00:00Z", "end": "2015-02-16T16:00:00Z"}
            ],
            "tasks": [],
            "startTaskSchedule": "2015-02-16T14:00:00Z",
            "endTaskSchedule": "2015-02-20T22:00:00Z"
        }"#;

        let request: ScheduleRequest = serde_json::from_str(json).unwrap();
        let reparsed: ScheduleRequest =
            serde_json::from_str(&serde_json::to_string(&request).unwrap()).unwrap();
        assert_eq!(reparsed.start_task_schedule, request.start_task_schedule);
        assert_eq!(reparsed.appointments[0].start, request.appointments[0].start);
        assert_eq!(reparsed.appointments[0].end, request.appointments[0].end);
    }
}
