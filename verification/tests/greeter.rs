//! Welcome DMs for new members.

use peerlink_nullables::{Failure, NullMembers};
use peerlink_types::PlatformUserId;
use peerlink_verification::{on_new_member, NewMember, WELCOME_MESSAGE};

fn member() -> NewMember {
    NewMember {
        user: PlatformUserId::new(42),
        username: "newbie".into(),
    }
}

#[tokio::test]
async fn new_member_receives_instructions() {
    let messenger = NullMembers::new();

    on_new_member(&messenger, &member()).await;

    let sent = messenger.messages();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].0, PlatformUserId::new(42));
    assert!(sent[0].1.contains("`/verify`"));
    assert_eq!(sent[0].1, WELCOME_MESSAGE);
}

#[tokio::test]
async fn closed_dms_are_ignored() {
    let messenger = NullMembers::new();
    messenger.fail_messages(Failure::Forbidden);
    on_new_member(&messenger, &member()).await;

    messenger.fail_messages(Failure::Error);
    on_new_member(&messenger, &member()).await;

    assert!(messenger.messages().is_empty());
}
