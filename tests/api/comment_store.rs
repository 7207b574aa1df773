use crate::helpers;
use claims::{assert_err, assert_none, assert_ok, assert_some};
use commentary::threads::CommentError;

#[tokio::test]
async fn refresh_loads_the_thread() {
    let app = helpers::spawn_app();
    app.backend.seed(app.post_id, app.user_a.actor, None, "hello", 0);
    let mut store = app.store();
    assert_none!(store.thread());

    assert_ok!(store.refresh().await);

    assert_eq!(store.comments().len(), 1);
    assert!(!store.is_loading());
    assert_none!(store.error());
}

#[tokio::test]
async fn begin_refresh_marks_the_store_loading() {
    let app = helpers::spawn_app();
    let mut store = app.store();

    let ticket = store.begin_refresh();
    assert!(store.is_loading());
    assert_eq!(ticket.post_id(), app.post_id);

    let result = app.service.thread(ticket.post_id()).await;
    assert!(assert_ok!(store.apply(ticket, result)));
    assert!(!store.is_loading());
}

#[tokio::test]
async fn rebuild_finishing_after_a_post_switch_is_discarded() {
    let app = helpers::spawn_app();
    app.backend.seed(app.post_id, app.user_a.actor, None, "first post", 0);
    let second_post = app.other_post();
    let mut store = app.store();

    let stale = store.begin_refresh();
    store.open(second_post);
    let result = app.service.thread(stale.post_id()).await;

    assert!(!assert_ok!(store.apply(stale, result)));
    assert_none!(store.thread());
    assert_eq!(store.post_id(), second_post);

    assert_ok!(store.refresh().await);
    assert_eq!(assert_some!(store.thread()).post_id, second_post);
    assert!(store.comments().is_empty());
}

#[tokio::test]
async fn thread_of_another_post_is_not_applied() {
    let app = helpers::spawn_app();
    let other_post = app.other_post();
    app.backend.seed(other_post, app.user_a.actor, None, "elsewhere", 0);
    let mut store = app.store();

    let ticket = store.begin_refresh();
    let result = app.service.thread(other_post).await;

    assert!(!assert_ok!(store.apply(ticket, result)));
    assert_none!(store.thread());
}

#[tokio::test]
async fn last_applied_rebuild_of_the_current_post_wins() {
    let app = helpers::spawn_app();
    let mut store = app.store();

    let early = store.begin_refresh();
    let early_result = app.service.thread(app.post_id).await;
    app.backend.seed(app.post_id, app.user_a.actor, None, "late arrival", 0);
    let late = store.begin_refresh();
    let late_result = app.service.thread(app.post_id).await;

    assert!(assert_ok!(store.apply(early, early_result)));
    assert!(assert_ok!(store.apply(late, late_result)));

    assert_eq!(store.comments().len(), 1);
}

#[tokio::test]
async fn mutations_through_the_store_replace_the_thread() {
    let app = helpers::spawn_app();
    let mut store = app.store();

    assert_ok!(store.add_comment(app.user_a.id(), "first".into(), None).await);
    let parent_id = store.comments()[0].comment.id;
    assert_ok!(
        store
            .add_comment(app.user_b.id(), "reply".into(), Some(parent_id))
            .await
    );
    assert_eq!(store.comments()[0].replies.len(), 1);

    assert_ok!(store.pin_comment(app.post_owner.id(), parent_id, true).await);
    assert!(store.comments()[0].comment.pinned);

    assert_ok!(store.delete_comment(app.post_owner.id(), parent_id).await);
    assert!(store.comments().is_empty());
    assert_none!(store.error());
}

#[tokio::test]
async fn failed_mutation_keeps_the_last_good_thread() {
    let app = helpers::spawn_app();
    let comment = app.backend.seed(app.post_id, app.user_b.actor, None, "keep me", 0);
    let mut store = app.store();
    assert_ok!(store.refresh().await);
    let before = store.thread().cloned();

    let result = store.add_comment(app.user_a.id(), "   ".into(), None).await;
    assert!(matches!(result, Err(CommentError::ValidationFailed(_))));

    let result = store.delete_comment(app.user_a.id(), comment.id).await;
    assert!(matches!(result, Err(CommentError::Forbidden)));

    assert_eq!(store.thread().cloned(), before);
    assert!(!store.is_loading());
    assert_none!(store.error());
}

#[tokio::test]
async fn failed_refresh_is_recorded_and_cleared_by_the_next_success() {
    let app = helpers::spawn_app();
    app.backend.fail_top_level(true);
    let mut store = app.store();

    let error = assert_err!(store.refresh().await);
    assert!(matches!(error, CommentError::BackendUnavailable(_)));
    assert_some!(store.error());
    assert!(!store.is_loading());

    app.backend.fail_top_level(false);
    assert_ok!(store.refresh().await);
    assert_none!(store.error());
    assert_some!(store.thread());
}

#[tokio::test]
async fn permissions_reflect_moderation_rights() {
    let app = helpers::spawn_app();
    let own = app.backend.seed(app.post_id, app.user_a.actor, None, "mine", 0);
    let theirs = app.backend.seed(app.post_id, app.user_b.actor, None, "theirs", 1);
    let store = app.store();

    let user = store.permissions(app.user_a.actor).await.unwrap();
    assert!(!user.may_pin());
    assert!(user.may_delete(&own));
    assert!(!user.may_delete(&theirs));

    for moderator in [app.post_owner, app.admin] {
        let permissions = store.permissions(moderator.actor).await.unwrap();
        assert!(permissions.may_pin());
        assert!(permissions.may_delete(&own));
        assert!(permissions.may_delete(&theirs));
    }
}

#[tokio::test]
async fn closing_the_store_drops_in_flight_rebuilds() {
    let app = helpers::spawn_app();
    app.backend.seed(app.post_id, app.user_a.actor, None, "hello", 0);
    let mut store = app.store();
    assert_ok!(store.refresh().await);

    let in_flight = store.begin_refresh();
    store.close();
    let result = app.service.thread(in_flight.post_id()).await;

    assert!(!assert_ok!(store.apply(in_flight, result)));
    assert_none!(store.thread());
    assert!(!store.is_loading());
}
