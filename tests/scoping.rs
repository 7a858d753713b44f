mod support;

use std::collections::BTreeSet;

use orgtask::error::Error;
use orgtask::model::{NewTask, OwnedTask, Role, TaskChanges};
use support::TestRoot;

fn new_task(title: &str) -> NewTask {
    NewTask {
        title: title.to_string(),
        ..NewTask::default()
    }
}

fn titles(tasks: &[OwnedTask]) -> BTreeSet<String> {
    tasks.iter().map(|t| t.task.title.clone()).collect()
}

fn set(items: &[&str]) -> BTreeSet<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// SpaceX > SpaceX Engineering > Propulsion, plus an unrelated root.
fn org_tree() -> TestRoot {
    let root = TestRoot::init();
    root.register("elon", Role::Owner, "SpaceX", None);
    root.register("gwynne", Role::Admin, "SpaceX Engineering", Some("SpaceX"));
    root.register("tom", Role::Viewer, "SpaceX Engineering", None);
    root.register("kiko", Role::Viewer, "SpaceX Engineering", None);
    root.register("grace", Role::Admin, "SpaceX", None);
    root.register("raptor", Role::Admin, "Propulsion", Some("SpaceX Engineering"));
    root.register("jeff", Role::Owner, "Blue Origin", None);
    root
}

#[test]
fn spacex_scenario() {
    let root = TestRoot::init();
    root.register("elon", Role::Owner, "SpaceX", None);
    root.register("gwynne", Role::Admin, "SpaceX Engineering", Some("SpaceX"));
    root.register("tom", Role::Viewer, "SpaceX Engineering", None);
    let service = root.service();

    let elon = root.actor("elon");
    let gwynne = root.actor("gwynne");
    let tom = root.actor("tom");

    service.create_task(&elon, new_task("T1")).unwrap();
    service.create_task(&gwynne, new_task("T2")).unwrap();
    service.create_task(&tom, new_task("T3")).unwrap();

    // The owner also sees T3 because tom is in a direct child organization.
    assert_eq!(titles(&service.list_tasks(&elon).unwrap()), set(&["T1", "T2", "T3"]));
    assert_eq!(titles(&service.list_tasks(&gwynne).unwrap()), set(&["T2", "T3"]));
    assert_eq!(titles(&service.list_tasks(&tom).unwrap()), set(&["T3"]));
}

#[test]
fn viewer_sees_only_own_tasks() {
    let root = org_tree();
    let service = root.service();
    for user in ["elon", "gwynne", "tom", "kiko", "raptor"] {
        let actor = root.actor(user);
        service.create_task(&actor, new_task(&format!("{user}-task"))).unwrap();
    }

    for viewer in ["tom", "kiko"] {
        let actor = root.actor(viewer);
        let visible = service.list_tasks(&actor).unwrap();
        assert!(visible.iter().all(|task| task.owner_id() == actor.id));
        let own = format!("{viewer}-task");
        assert_eq!(titles(&visible), set(&[own.as_str()]));
    }
}

#[test]
fn admin_sees_only_own_organization() {
    let root = org_tree();
    let service = root.service();
    for user in ["elon", "grace", "gwynne", "tom", "raptor", "jeff"] {
        let actor = root.actor(user);
        service.create_task(&actor, new_task(&format!("{user}-task"))).unwrap();
    }

    // Parent, child and unrelated organizations are all excluded.
    let gwynne = root.actor("gwynne");
    assert_eq!(
        titles(&service.list_tasks(&gwynne).unwrap()),
        set(&["gwynne-task", "tom-task"])
    );

    let grace = root.actor("grace");
    assert_eq!(
        titles(&service.list_tasks(&grace).unwrap()),
        set(&["elon-task", "grace-task"])
    );
}

#[test]
fn owner_sees_own_and_direct_children_only() {
    let root = org_tree();
    let service = root.service();
    for user in ["elon", "grace", "gwynne", "tom", "raptor", "jeff"] {
        let actor = root.actor(user);
        service.create_task(&actor, new_task(&format!("{user}-task"))).unwrap();
    }

    // Propulsion is a grandchild of SpaceX, Blue Origin is unrelated.
    let elon = root.actor("elon");
    assert_eq!(
        titles(&service.list_tasks(&elon).unwrap()),
        set(&["elon-task", "grace-task", "gwynne-task", "tom-task"])
    );

    let jeff = root.actor("jeff");
    assert_eq!(titles(&service.list_tasks(&jeff).unwrap()), set(&["jeff-task"]));
}

#[test]
fn list_is_ordered_by_rank_then_status_then_newest() {
    let root = TestRoot::init();
    root.register("elon", Role::Owner, "SpaceX", None);
    let elon = root.actor("elon");
    let service = root.service();

    let a = service.create_task(&elon, new_task("a")).unwrap();
    let b = service.create_task(&elon, new_task("b")).unwrap();
    let c = service.create_task(&elon, new_task("c")).unwrap();

    service
        .reorder(&elon, &[c.id().to_string(), a.id().to_string(), b.id().to_string()])
        .unwrap();
    let listed: Vec<String> = service
        .list_tasks(&elon)
        .unwrap()
        .into_iter()
        .map(|task| task.task.title)
        .collect();
    assert_eq!(listed, vec!["c", "a", "b"]);
}

#[test]
fn viewer_cannot_touch_colleague_task_but_can_edit_own() {
    let root = org_tree();
    let service = root.service();
    let tom = root.actor("tom");
    let kiko = root.actor("kiko");

    let kikos = service.create_task(&kiko, new_task("kiko-task")).unwrap();
    let err = service
        .update_task(
            &tom,
            kikos.id(),
            &TaskChanges {
                title: Some("hijacked".to_string()),
                ..TaskChanges::default()
            },
        )
        .unwrap_err();
    assert!(matches!(err, Error::PermissionDenied(_)));
    assert_eq!(err.status_code(), 403);

    let toms = service.create_task(&tom, new_task("tom-task")).unwrap();
    let updated = service
        .update_task(
            &tom,
            toms.id(),
            &TaskChanges {
                title: Some("tom-task v2".to_string()),
                ..TaskChanges::default()
            },
        )
        .unwrap();
    assert_eq!(updated.task.title, "tom-task v2");
}

#[test]
fn guard_covers_own_and_child_organizations() {
    let root = org_tree();
    let service = root.service();
    let elon = root.actor("elon");
    let gwynne = root.actor("gwynne");
    let raptor = root.actor("raptor");
    let jeff = root.actor("jeff");

    let toms = service.create_task(&root.actor("tom"), new_task("tom-task")).unwrap();
    let raptors = service.create_task(&raptor, new_task("raptor-task")).unwrap();
    let elons = service.create_task(&elon, new_task("elon-task")).unwrap();

    // Same organization, and parent-of-task organization.
    service.delete_task(&gwynne, toms.id()).unwrap();
    service.delete_task(&gwynne, raptors.id()).unwrap();

    // Task in the parent organization is out of reach for an admin below it.
    assert!(matches!(
        service.delete_task(&gwynne, elons.id()),
        Err(Error::PermissionDenied(_))
    ));
    assert!(matches!(
        service.delete_task(&jeff, elons.id()),
        Err(Error::PermissionDenied(_))
    ));
}

#[test]
fn missing_task_is_not_found() {
    let root = org_tree();
    let service = root.service();
    let elon = root.actor("elon");

    let err = service.delete_task(&elon, "does-not-exist").unwrap_err();
    assert!(matches!(err, Error::NotFound(_)));
    assert_eq!(err.status_code(), 404);

    let err = service
        .update_task(&elon, "does-not-exist", &TaskChanges::default())
        .unwrap_err();
    assert!(matches!(err, Error::NotFound(_)));
}

#[test]
fn actor_without_organization() {
    let root = org_tree();
    let service = root.service();
    root.orphan("drifter", Role::Admin);
    let drifter = root.actor("drifter");

    let err = service.create_task(&drifter, new_task("nope")).unwrap_err();
    assert!(matches!(err, Error::InvalidState(_)));
    assert_eq!(err.status_code(), 400);

    assert!(service.list_tasks(&drifter).unwrap().is_empty());
    assert!(matches!(
        service.list_audit_logs(&drifter),
        Err(Error::InvalidState(_))
    ));
}

#[test]
fn create_applies_default_category_and_rejects_blank_title() {
    let root = org_tree();
    let service = root.service();
    let elon = root.actor("elon");

    let task = service.create_task(&elon, new_task("  Launch  ")).unwrap();
    assert_eq!(task.task.title, "Launch");
    assert_eq!(task.task.category, "Work");
    assert_eq!(task.task.order, 0);
    assert_eq!(task.owner.username, "elon");

    let err = service.create_task(&elon, new_task("   ")).unwrap_err();
    assert!(matches!(err, Error::InvalidArgument(_)));
}
