//! Built-in trip templates
//!
//! Each load produces a fresh trip with new ids, so a template can be loaded
//! several times into the same session.

use crate::ids::IdSource;
use crate::models::{DateGroup, Task, Trip};
use std::sync::Arc;

struct TemplateTask {
    name: &'static str,
    description: &'static str,
    time: &'static str,
}

struct TemplateDay {
    date: &'static str,
    tasks: &'static [TemplateTask],
}

/// A named sample trip
pub struct TripTemplate {
    pub id: &'static str,
    pub name: &'static str,
    pub date: &'static str,
    pub discussion: &'static str,
    days: &'static [TemplateDay],
}

impl TripTemplate {
    /// Build a trip from the template with fresh ids
    #[must_use]
    pub fn load(&self, ids: &dyn IdSource) -> Trip {
        let groups = self
            .days
            .iter()
            .map(|day| {
                let group_id = ids.next_id();
                let tasks = day
                    .tasks
                    .iter()
                    .map(|task| {
                        Arc::new(Task {
                            description: Some(task.description.to_string()),
                            ..Task::named(ids.next_id(), task.name, task.time)
                        })
                    })
                    .collect();
                Arc::new(DateGroup {
                    id: group_id,
                    date: day.date.to_string(),
                    tasks,
                })
            })
            .collect();

        Trip {
            name: self.name.to_string(),
            date: self.date.to_string(),
            discussion: Some(self.discussion.to_string()),
            coordinator_id: None,
            duration: None,
            groups,
        }
    }

    #[must_use]
    pub fn day_count(&self) -> usize {
        self.days.len()
    }
}

pub const TEMPLATES: &[TripTemplate] = &[
    TripTemplate {
        id: "goa",
        name: "Goa getaway",
        date: "2026-03-01",
        discussion: "This is a two-day sample trip to Goa.",
        days: &[
            TemplateDay {
                date: "2026-03-01",
                tasks: &[
                    TemplateTask {
                        name: "Arrive at hotel",
                        description: "Check-in and rest",
                        time: "14:00",
                    },
                    TemplateTask {
                        name: "Beach walk",
                        description: "Evening stroll",
                        time: "18:00",
                    },
                ],
            },
            TemplateDay {
                date: "2026-03-02",
                tasks: &[
                    TemplateTask {
                        name: "Morning yoga",
                        description: "On the beach",
                        time: "07:00",
                    },
                    TemplateTask {
                        name: "City tour",
                        description: "Local sights",
                        time: "10:00",
                    },
                ],
            },
        ],
    },
    TripTemplate {
        id: "jaipur",
        name: "Jaipur excursion",
        date: "2026-04-10",
        discussion: "A three-day cultural tour in Jaipur.",
        days: &[
            TemplateDay {
                date: "2026-04-10",
                tasks: &[TemplateTask {
                    name: "Visit Amber Fort",
                    description: "Morning visit",
                    time: "09:00",
                }],
            },
            TemplateDay {
                date: "2026-04-11",
                tasks: &[TemplateTask {
                    name: "City Palace",
                    description: "Explore palace",
                    time: "11:00",
                }],
            },
        ],
    },
];

/// Look up a template by id
#[must_use]
pub fn template(id: &str) -> Option<&'static TripTemplate> {
    TEMPLATES.iter().find(|template| template.id == id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::{RandomIds, SequentialIds};
    use crate::validator::is_submittable;
    use chrono::NaiveTime;
    use std::collections::HashSet;
    use tripcheck_common::parse_date;

    #[test]
    fn test_templates_are_submittable() {
        for template in TEMPLATES {
            assert!(
                is_submittable(&template.load(&RandomIds)),
                "{}",
                template.id
            );
        }
    }

    #[test]
    fn test_goa_template() {
        let trip = template("goa").unwrap().load(&SequentialIds::default());
        assert_eq!(trip.name, "Goa getaway");
        assert_eq!(trip.groups.len(), 2);
        assert_eq!(trip.task_count(), 4);
        assert_eq!(trip.groups[0].tasks[1].name, "Beach walk");
        assert_eq!(trip.groups[1].tasks[0].time, "07:00");
    }

    #[test]
    fn test_template_dates_and_times_parse() {
        for template in TEMPLATES {
            let trip = template.load(&RandomIds);
            assert!(parse_date(&trip.date).is_ok(), "{}", template.id);
            for group in &trip.groups {
                assert!(parse_date(&group.date).is_ok(), "{}", template.id);
                for task in &group.tasks {
                    assert!(
                        NaiveTime::parse_from_str(&task.time, "%H:%M").is_ok(),
                        "{}: {}",
                        template.id,
                        task.time
                    );
                }
            }
        }
    }

    #[test]
    fn test_unknown_template() {
        assert!(template("paris").is_none());
    }

    #[test]
    fn test_each_load_gets_fresh_ids() {
        let ids = SequentialIds::default();
        let jaipur = template("jaipur").unwrap();
        let first = jaipur.load(&ids);
        let second = jaipur.load(&ids);

        let collect = |trip: &Trip| -> HashSet<String> {
            trip.groups
                .iter()
                .map(|g| g.id.clone())
                .chain(trip.tasks().map(|t| t.id.clone()))
                .collect()
        };
        assert!(collect(&first).is_disjoint(&collect(&second)));
        assert_eq!(jaipur.day_count(), 2);
    }
}
