//! Basic usage example for tripcheck-core
//!
//! Loads a template, edits it, runs the submission gate and stores the
//! result in a temporary SQLite database.

use tripcheck_core::{
    add_task, check, from_stored, template, to_stored, update_task_field, update_trip_field,
    RandomIds, TaskField, TripDatabase, TripError, TripField,
};

#[tokio::main]
async fn main() -> Result<(), TripError> {
    let ids = RandomIds;
    let goa = template("goa").ok_or_else(|| TripError::validation("missing template"))?;
    let trip = goa.load(&ids);
    println!("Loaded \"{}\" with {} tasks", trip.name, trip.task_count());

    // A freshly added task blocks submission until it has a name
    let first_day = trip.groups[0].id.clone();
    let trip = add_task(&trip, &first_day, &ids);
    let new_task = trip.groups[0]
        .tasks
        .last()
        .map(|t| t.id.clone())
        .unwrap_or_default();
    if let Err(issues) = check(trip.clone()) {
        println!("\n=== Not ready ===");
        for issue in &issues {
            println!("  - {issue}");
        }
    }

    let trip = update_task_field(&trip, &new_task, TaskField::Name("Headcount".to_string()));
    let trip = update_task_field(
        &trip,
        &new_task,
        TaskField::Description(Some("Before leaving the hotel".to_string())),
    );
    let trip = update_trip_field(&trip, TripField::CoordinatorId(Some("coord-1".to_string())));
    let trip = update_trip_field(&trip, TripField::Duration(Some("2 days".to_string())));
    let validated = check(trip).map_err(|issues| {
        TripError::validation(format!("{} issues remain", issues.len()))
    })?;
    println!("\nTrip is ready to submit");

    let dir = tempfile::tempdir()?;
    let db = TripDatabase::new(&dir.path().join("trips.db")).await?;
    let uuid = db.save_trip(&to_stored(validated.trip())).await?;
    println!("Stored trip {uuid}");

    let stored = db.require_trip(&uuid).await?;
    let reloaded = from_stored(&stored, &ids);
    println!("\n=== Reloaded ===");
    for (index, group) in reloaded.groups.iter().enumerate() {
        println!("Day {} - {}", index + 1, group.date);
        for task in &group.tasks {
            println!("  {} {}", task.time, task.name);
        }
    }

    Ok(())
}
