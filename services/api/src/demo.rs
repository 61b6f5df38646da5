use crate::cli::OverlapPolicyArg;
use chrono::{Duration, Local, NaiveDate, NaiveTime};
use clap::Args;
use shiftwise::error::AppError;
use shiftwise::scheduling::{
    EmployeeId, InMemorySchedulingRepository, PersonDetails, RecordingNotifier, SchedulingError,
    SchedulingService, SentNotification, Shift, ShiftDraft, StaffMember, StaffRole,
    VacationOverlapPolicy,
};
use std::sync::Arc;

type DemoService = SchedulingService<InMemorySchedulingRepository, RecordingNotifier>;

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Date to schedule the sample shifts on (YYYY-MM-DD). Defaults to today.
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) date: Option<NaiveDate>,
    /// How approvals treat overlapping approved vacations.
    #[arg(long, value_enum)]
    pub(crate) overlap_policy: Option<OverlapPolicyArg>,
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let date = args.date.unwrap_or_else(|| Local::now().date_naive());
    let policy = args
        .overlap_policy
        .map(VacationOverlapPolicy::from)
        .unwrap_or_default();

    let notifier = Arc::new(RecordingNotifier::default());
    let service = SchedulingService::new(
        Arc::new(InMemorySchedulingRepository::default()),
        notifier.clone(),
        policy,
    );

    let manager = EmployeeId("mgr-morgan".to_string());
    let other_manager = EmployeeId("mgr-sasha".to_string());
    let employee = EmployeeId("emp-eli".to_string());
    seed_team(&service, &manager, &other_manager, &employee)?;

    println!("Shiftwise demo (schedule date {date}, overlap policy {})", policy.label());

    let team = service.team(&manager)?;
    println!("\nTeam of {manager}");
    for member in &team {
        println!("- {} ({}, {})", member.person.full_name(), member.id, member.department);
    }

    let day = create_shift(&service, &manager, date, 9, 17)?;
    let early = create_shift(&service, &manager, date + Duration::days(1), 8, 12)?;
    let late = create_shift(&service, &manager, date + Duration::days(1), 11, 19)?;

    println!("\nShift assignments");
    report(
        "assign 09:00-17:00 by direct manager",
        service.assign_shift(&day.id, &employee, &manager).map(|_| ()),
    );
    report(
        "assign the same shift again",
        service.assign_shift(&day.id, &employee, &manager).map(|_| ()),
    );
    report(
        "assign 08:00-12:00 next day",
        service.assign_shift(&early.id, &employee, &manager).map(|_| ()),
    );
    report(
        "assign overlapping 11:00-19:00 next day",
        service.assign_shift(&late.id, &employee, &manager).map(|_| ()),
    );
    report(
        "assign by a manager from another team",
        service
            .assign_shift(&late.id, &employee, &other_manager)
            .map(|_| ()),
    );

    println!("\nVacation requests");
    let start = date + Duration::days(10);
    let first = service.submit_vacation(
        &employee,
        start,
        start + Duration::days(4),
        Some("Family visit".to_string()),
    )?;
    let second = service.submit_vacation(
        &employee,
        start + Duration::days(3),
        start + Duration::days(6),
        Some("Extend trip".to_string()),
    )?;

    report(
        &format!("approve {} ({} day(s))", first.id, first.days()),
        service
            .approve_vacation(&first.id, &manager, Some("Approved".to_string()))
            .map(|_| ()),
    );
    match service.approve_vacation(&second.id, &manager, None) {
        Ok(outcome) if outcome.overlapping_approved.is_empty() => {
            println!("- approve {}: ok", second.id);
        }
        Ok(outcome) => println!(
            "- approve {}: ok, overlaps {}",
            second.id,
            outcome
                .overlapping_approved
                .iter()
                .map(|id| id.0.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        ),
        Err(err) => println!("- approve {}: refused ({err})", second.id),
    }

    println!("\nSchedule for {employee}");
    for entry in service.employee_schedule(&employee, None, None)? {
        println!(
            "- {} {}-{} [{}]",
            entry.shift.date,
            entry.shift.start_time.format("%H:%M"),
            entry.shift.end_time.format("%H:%M"),
            entry.assignment.status.label()
        );
    }

    println!("\nNotifications sent");
    for event in notifier.events() {
        match event {
            SentNotification::ShiftAssigned {
                employee_id,
                shift_id,
            } => println!("- {employee_id}: assigned to {shift_id}"),
            SentNotification::VacationStatusChanged {
                employee_id,
                request_id,
                approved,
            } => println!(
                "- {employee_id}: {request_id} {}",
                if approved { "approved" } else { "rejected" }
            ),
        }
    }

    Ok(())
}

fn report(label: &str, result: Result<(), SchedulingError>) {
    match result {
        Ok(()) => println!("- {label}: ok"),
        Err(err) => println!("- {label}: refused ({err})"),
    }
}

fn seed_team(
    service: &DemoService,
    manager: &EmployeeId,
    other_manager: &EmployeeId,
    employee: &EmployeeId,
) -> Result<(), AppError> {
    let members = [
        staff(manager, "Morgan", "Lee", None, StaffRole::Manager),
        staff(other_manager, "Sasha", "Ivers", None, StaffRole::Manager),
        staff(employee, "Eli", "Novak", Some(manager), StaffRole::Employee),
    ];
    for member in members {
        service.register_staff(member)?;
    }
    Ok(())
}

fn staff(
    id: &EmployeeId,
    first_name: &str,
    last_name: &str,
    manager: Option<&EmployeeId>,
    role: StaffRole,
) -> StaffMember {
    StaffMember {
        id: id.clone(),
        person: PersonDetails {
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            email: format!("{}@shiftwise.example", id.0),
        },
        department: "Fulfilment".to_string(),
        manager_id: manager.cloned(),
        role,
    }
}

fn create_shift(
    service: &DemoService,
    manager: &EmployeeId,
    date: NaiveDate,
    start_hour: u32,
    end_hour: u32,
) -> Result<Shift, AppError> {
    let draft = ShiftDraft {
        date,
        start_time: hour(start_hour),
        end_time: hour(end_hour),
        location_id: Some("loc-main".to_string()),
        shift_type_id: None,
    };
    Ok(service.create_shift(draft, manager)?)
}

fn hour(value: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(value, 0, 0).unwrap_or(NaiveTime::MIN)
}
