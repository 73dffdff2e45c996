//! Property tests for snapshot edits and the submission gate

use proptest::prelude::*;
use std::sync::Arc;
use tripcheck_core::{
    add_group, add_task, is_submittable, remove_group, remove_task, update_task_field,
    validation_issues, DateGroup, IdSource, SequentialIds, Task, TaskField, Trip,
};

/// Strings that are present, blank, or whitespace only
fn field() -> impl Strategy<Value = String> {
    prop_oneof![
        Just(String::new()),
        Just("   ".to_string()),
        Just("\t\n".to_string()),
        "[a-zA-Z][a-zA-Z ]{0,12}",
    ]
}

fn present(s: &str) -> bool {
    !s.trim().is_empty()
}

#[derive(Debug, Clone)]
struct TaskShape {
    name: String,
    time: String,
}

#[derive(Debug, Clone)]
struct GroupShape {
    date: String,
    tasks: Vec<TaskShape>,
}

fn task_shape() -> impl Strategy<Value = TaskShape> {
    (field(), field()).prop_map(|(name, time)| TaskShape { name, time })
}

fn group_shape() -> impl Strategy<Value = GroupShape> {
    (field(), prop::collection::vec(task_shape(), 1..4))
        .prop_map(|(date, tasks)| GroupShape { date, tasks })
}

fn build(name: &str, date: &str, groups: &[GroupShape]) -> Trip {
    let ids = SequentialIds::new("p");
    Trip {
        name: name.to_string(),
        date: date.to_string(),
        discussion: None,
        coordinator_id: None,
        duration: None,
        groups: groups
            .iter()
            .map(|group| {
                let id = ids.next_id();
                Arc::new(DateGroup {
                    id,
                    date: group.date.clone(),
                    tasks: group
                        .tasks
                        .iter()
                        .map(|t| {
                            Arc::new(Task::named(ids.next_id(), t.name.clone(), t.time.clone()))
                        })
                        .collect(),
                })
            })
            .collect(),
    }
}

/// A trip with `groups` groups of `tasks` tasks each, all fields filled
fn filled(groups: usize, tasks: usize) -> (Trip, SequentialIds) {
    let shapes: Vec<GroupShape> = (0..groups)
        .map(|g| GroupShape {
            date: format!("2026-03-{:02}", g + 1),
            tasks: (0..tasks)
                .map(|t| TaskShape {
                    name: format!("task {t}"),
                    time: "09:00".to_string(),
                })
                .collect(),
        })
        .collect();
    (
        build("Goa getaway", "2026-03-01", &shapes),
        SequentialIds::new("n"),
    )
}

proptest! {
    #[test]
    fn submittable_iff_required_fields_present(
        name in field(),
        date in field(),
        groups in prop::collection::vec(group_shape(), 1..4),
    ) {
        let trip = build(&name, &date, &groups);
        let expected = present(&name)
            && present(&date)
            && groups.iter().all(|g| {
                present(&g.date) && g.tasks.iter().all(|t| present(&t.name) && present(&t.time))
            });

        prop_assert_eq!(is_submittable(&trip), expected);
        prop_assert_eq!(validation_issues(&trip).is_empty(), expected);
    }

    #[test]
    fn task_removal_never_empties_a_group(
        tasks in 1usize..5,
        removals in prop::collection::vec(0usize..8, 0..12),
    ) {
        let (mut trip, _) = filled(1, tasks);
        let group_id = trip.groups[0].id.clone();

        for pick in removals {
            let ids: Vec<String> = trip.groups[0].tasks.iter().map(|t| t.id.clone()).collect();
            let target = ids[pick % ids.len()].clone();
            trip = remove_task(&trip, &group_id, &target);
            prop_assert!(!trip.groups[0].tasks.is_empty());
        }
    }

    #[test]
    fn group_removal_never_empties_a_trip(
        groups in 1usize..5,
        removals in prop::collection::vec(0usize..8, 0..12),
    ) {
        let (mut trip, _) = filled(groups, 1);

        for pick in removals {
            let ids: Vec<String> = trip.groups.iter().map(|g| g.id.clone()).collect();
            trip = remove_group(&trip, &ids[pick % ids.len()]);
            prop_assert!(!trip.groups.is_empty());
        }
    }

    #[test]
    fn add_then_remove_task_restores_trip(groups in 1usize..4, tasks in 1usize..4, pick in 0usize..4) {
        let (trip, ids) = filled(groups, tasks);
        let group_id = trip.groups[pick % groups].id.clone();

        let grown = add_task(&trip, &group_id, &ids);
        let gi = pick % groups;
        let added = grown.groups[gi].tasks.last().map(|t| t.id.clone()).unwrap_or_default();
        prop_assert_eq!(grown.groups[gi].tasks.len(), tasks + 1);

        let restored = remove_task(&grown, &group_id, &added);
        prop_assert_eq!(restored, trip);
    }

    #[test]
    fn add_then_remove_group_restores_trip(groups in 1usize..4) {
        let (trip, ids) = filled(groups, 2);
        let grown = add_group(&trip, &ids);
        let added = grown.groups.last().map(|g| g.id.clone()).unwrap_or_default();

        prop_assert_eq!(remove_group(&grown, &added), trip);
    }

    #[test]
    fn update_changes_only_the_target(
        groups in 1usize..4,
        tasks in 1usize..4,
        pick_group in 0usize..4,
        pick_task in 0usize..4,
        new_name in "[a-z]{1,10}",
    ) {
        let (trip, _) = filled(groups, tasks);
        let (gi, ti) = (pick_group % groups, pick_task % tasks);
        let target = trip.groups[gi].tasks[ti].id.clone();

        let next = update_task_field(&trip, &target, TaskField::Name(new_name.clone()));

        for (g, (before, after)) in trip.groups.iter().zip(&next.groups).enumerate() {
            if g != gi {
                prop_assert!(Arc::ptr_eq(before, after));
                continue;
            }
            for (t, (old, new)) in before.tasks.iter().zip(&after.tasks).enumerate() {
                if t == ti {
                    prop_assert_eq!(&new.name, &new_name);
                    let mut expected = (**old).clone();
                    expected.name = new_name.clone();
                    prop_assert_eq!(&**new, &expected);
                } else {
                    prop_assert!(Arc::ptr_eq(old, new));
                }
            }
        }
        // The previous snapshot is untouched
        prop_assert_eq!(trip.groups[gi].tasks[ti].name.clone(), format!("task {ti}"));
    }
}

#[test]
fn removing_only_group_is_noop() {
    let (trip, _) = filled(1, 3);
    let next = remove_group(&trip, &trip.groups[0].id);
    assert_eq!(next, trip);
}

#[test]
fn whitespace_name_blocks_submission() {
    let (trip, _) = filled(2, 2);
    assert!(is_submittable(&trip));

    let target = trip.groups[1].tasks[0].id.clone();
    let blanked = update_task_field(&trip, &target, TaskField::Name("  ".to_string()));
    assert!(!is_submittable(&blanked));
}
