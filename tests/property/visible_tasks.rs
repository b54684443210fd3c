//! Property-based tests for the task list controller.
//!
//! Uses proptest to verify:
//! 1. The list stays sorted by name after any sequence of adds.
//! 2. Visible tasks are exactly the case-insensitive matches, in list order.
//! 3. Filtering never changes the underlying list.
//! 4. Deleting a task removes exactly one entry.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use proptest::prelude::*;
use tasklist::gateway::memory::InMemoryGateway;
use tasklist::tasks::TaskListController;

/// Runs an async block on a fresh single-threaded runtime.
fn block_on<F: std::future::Future>(future: F) -> F::Output {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap()
        .block_on(future)
}

/// Strategy for non-empty task names, including mixed case and non-ASCII.
fn arb_name() -> impl Strategy<Value = String> {
    "[a-zA-Zäö ]{1,12}"
}

/// Builds a loaded controller by adding each name through the form.
async fn controller_with(names: &[String]) -> TaskListController<InMemoryGateway> {
    let mut controller = TaskListController::new(InMemoryGateway::new());
    controller.load().await.unwrap();
    for name in names {
        controller.set_draft(name.as_str());
        controller.add().await.unwrap();
    }
    controller
}

proptest! {
    #[test]
    fn list_is_sorted_after_adds(names in prop::collection::vec(arb_name(), 0..16)) {
        let controller = block_on(controller_with(&names));
        let listed: Vec<&str> = controller.tasks().iter().map(|t| t.name.as_str()).collect();

        let mut expected: Vec<&str> = names.iter().map(String::as_str).collect();
        expected.sort_unstable();
        prop_assert_eq!(listed, expected);
    }

    #[test]
    fn visible_matches_filter(
        names in prop::collection::vec(arb_name(), 0..16),
        term in "[a-zA-Zä]{0,3}",
    ) {
        let mut controller = block_on(controller_with(&names));
        let before = controller.tasks().to_vec();
        controller.set_search_term(term.as_str());

        let needle = term.to_lowercase();
        let expected: Vec<&str> = controller
            .tasks()
            .iter()
            .filter(|t| t.name.to_lowercase().contains(&needle))
            .map(|t| t.name.as_str())
            .collect();
        let visible: Vec<&str> = controller.visible_tasks().map(|t| t.name.as_str()).collect();

        prop_assert_eq!(visible, expected);
        prop_assert_eq!(controller.tasks(), before.as_slice());
    }

    #[test]
    fn delete_removes_exactly_one(
        names in prop::collection::vec(arb_name(), 1..12),
        pick in any::<prop::sample::Index>(),
    ) {
        let (before, after, removed) = block_on(async {
            let mut controller = controller_with(&names).await;
            let before = controller.tasks().len();
            let target = pick.get(controller.tasks()).id.clone();
            controller.delete(&target).await.unwrap();
            let removed = controller.tasks().iter().all(|t| t.id != target);
            (before, controller.tasks().len(), removed)
        });
        prop_assert_eq!(after, before - 1);
        prop_assert!(removed);
    }
}
