//! Interactive search-and-assign loop

use anyhow::Result;
use dialoguer::{Input, Select};
use subscribe_client::SubscribeApi;
use subscribe_flow::{
    DialogView, MembershipView, SearchState, SubmitOutcome, SubscribeController,
};

use crate::context::AppContext;
use crate::render::{
    format_dialog_header, format_group_row, format_result, format_result_links, sort_choices,
    sort_key_label,
};

/// What a dialog menu entry does when picked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DialogAction {
    Toggle(i64),
    NextPage,
    PrevPage,
    Sort,
    Confirm,
    Cancel,
}

/// Menu entries for the open dialog: one per visible group, then the controls.
fn dialog_actions(dialog: &DialogView) -> Vec<(String, DialogAction)> {
    let mut actions: Vec<(String, DialogAction)> = dialog
        .rows
        .iter()
        .map(|row| (format_group_row(row), DialogAction::Toggle(row.group.group_id)))
        .collect();

    if dialog.page + 1 < dialog.page_count {
        actions.push(("→ Next page".to_string(), DialogAction::NextPage));
    }
    if dialog.page > 0 {
        actions.push(("← Previous page".to_string(), DialogAction::PrevPage));
    }
    actions.push(("⇅ Sort".to_string(), DialogAction::Sort));
    // A dialog with a submit outstanding cannot be confirmed again or closed
    if !dialog.busy {
        actions.push(("✓ Confirm".to_string(), DialogAction::Confirm));
        actions.push(("✗ Cancel".to_string(), DialogAction::Cancel));
    }
    actions
}

/// Run until the operator exits.
pub async fn run<A: SubscribeApi>(
    ctx: &AppContext,
    controller: &SubscribeController<A>,
    initial_query: Option<String>,
) -> Result<()> {
    let mut next_query = initial_query;

    loop {
        let query = match next_query.take() {
            Some(query) => query,
            None => {
                let query: String = Input::with_theme(&ctx.theme())
                    .with_prompt("Creator name (empty to exit)")
                    .allow_empty(true)
                    .interact_text()?;
                if query.trim().is_empty() {
                    return Ok(());
                }
                query
            }
        };

        if let Err(err) = controller.search(&query).await {
            ctx.print_warning(&err.to_string());
            continue;
        }

        if !browse_results(ctx, controller).await? {
            return Ok(());
        }
    }
}

/// Show the result list until the operator asks for a new search (`true`) or exits (`false`).
async fn browse_results<A: SubscribeApi>(
    ctx: &AppContext,
    controller: &SubscribeController<A>,
) -> Result<bool> {
    loop {
        let view = controller.view();
        match &view.state {
            SearchState::Found => {}
            SearchState::Empty => {
                ctx.print_warning("No creators match that name.");
                return Ok(true);
            }
            SearchState::Failed(err) => {
                ctx.print_error(&format!("Search failed: {}", err));
                return Ok(true);
            }
            SearchState::Idle | SearchState::Searching => return Ok(true),
        }

        ctx.print_header(&format!("Found {} creator(s)", view.result_count()));
        let proxy = ctx.config.avatar_proxy_url.as_deref();
        for record in &view.results {
            println!("  {}", format_result(record));
            println!("    {}", format_result_links(record, proxy));
        }

        let mut labels: Vec<String> = view
            .results
            .iter()
            .map(|r| format!("+ Assign groups for {}", r.display_name))
            .collect();
        labels.push("New search".to_string());
        labels.push("Exit".to_string());

        let choice = Select::with_theme(&ctx.theme())
            .with_prompt("Pick a creator")
            .items(&labels)
            .default(0)
            .interact()?;

        match choice {
            idx if idx < view.results.len() => {
                membership_dialog(ctx, controller, view.results[idx].entity_id).await?;
            }
            idx if idx == view.results.len() => return Ok(true),
            _ => return Ok(false),
        }
    }
}

async fn membership_dialog<A: SubscribeApi>(
    ctx: &AppContext,
    controller: &SubscribeController<A>,
    entity_id: i64,
) -> Result<()> {
    println!("Loading groups...");
    controller.open_membership(entity_id).await?;

    loop {
        let dialog = match controller.view().membership {
            MembershipView::Open(dialog) => dialog,
            MembershipView::Failed { message, .. } => {
                ctx.print_error(&format!("Could not load groups: {}", message));
                controller.cancel();
                return Ok(());
            }
            MembershipView::Closed | MembershipView::Loading { .. } => return Ok(()),
        };

        ctx.print_header(&format_dialog_header(&dialog));
        if let Some(err) = &dialog.error {
            ctx.print_warning(&format!("Last submit failed: {}", err));
        }

        let actions = dialog_actions(&dialog);
        let labels: Vec<&str> = actions.iter().map(|(label, _)| label.as_str()).collect();
        let choice = Select::with_theme(&ctx.theme())
            .with_prompt("Toggle a group or confirm")
            .items(&labels)
            .default(0)
            .interact()?;

        match actions[choice].1 {
            DialogAction::Toggle(group_id) => {
                controller.toggle_group(group_id);
            }
            DialogAction::NextPage => controller.next_page(),
            DialogAction::PrevPage => controller.prev_page(),
            DialogAction::Sort => {
                let choices = sort_choices();
                let labels: Vec<String> = choices
                    .iter()
                    .map(|(key, order)| format!("{} {}", sort_key_label(*key), order.label()))
                    .collect();
                let pick = Select::with_theme(&ctx.theme())
                    .with_prompt("Sort groups by")
                    .items(&labels)
                    .default(0)
                    .interact()?;
                let (key, order) = choices[pick];
                controller.set_sort(key, order);
            }
            DialogAction::Confirm => match controller.confirm().await {
                Some(SubmitOutcome::Accepted { message }) => {
                    ctx.print_success(&message);
                    controller.dismiss_notice();
                    return Ok(());
                }
                Some(SubmitOutcome::Rejected(err)) => {
                    ctx.print_error(&format!("Submit failed: {}", err));
                }
                None => {}
            },
            DialogAction::Cancel => {
                controller.cancel();
                return Ok(());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use subscribe_client::testing::MockSubscribeApi;
    use subscribe_client::{GroupRecord, SearchResultRecord};
    use subscribe_flow::SearchWorkflow;

    async fn open_dialog(page_size: usize, groups: usize) -> DialogView {
        let api = MockSubscribeApi::new()
            .with_search(
                "alice",
                vec![SearchResultRecord {
                    entity_id: 42,
                    display_name: "alice".to_string(),
                    avatar_ref: String::new(),
                    follower_count: 0,
                }],
            )
            .with_groups(
                42,
                (1..=groups as i64)
                    .map(|id| GroupRecord {
                        group_id: id,
                        group_name: format!("g{id}"),
                        member_count: 0,
                        is_member: false,
                    })
                    .collect(),
            );
        let controller =
            SubscribeController::with_workflow(api, SearchWorkflow::with_page_size(page_size));
        controller.search("alice").await.unwrap();
        controller.open_membership(42).await.unwrap();

        match controller.view().membership {
            MembershipView::Open(dialog) => dialog,
            other => panic!("expected open dialog, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn first_page_offers_next_but_not_previous() {
        let dialog = open_dialog(2, 3).await;

        let actions: Vec<_> = dialog_actions(&dialog).into_iter().map(|(_, a)| a).collect();

        assert_eq!(
            actions,
            vec![
                DialogAction::Toggle(1),
                DialogAction::Toggle(2),
                DialogAction::NextPage,
                DialogAction::Sort,
                DialogAction::Confirm,
                DialogAction::Cancel,
            ]
        );
    }

    #[tokio::test]
    async fn busy_dialog_hides_confirm_and_cancel() {
        let mut dialog = open_dialog(10, 1).await;
        dialog.busy = true;

        let actions: Vec<_> = dialog_actions(&dialog).into_iter().map(|(_, a)| a).collect();

        assert!(!actions.contains(&DialogAction::Confirm));
        assert!(!actions.contains(&DialogAction::Cancel));
    }
}
