//! Two users chatting through the service: send, push, reconcile.
//!
//! Run with: cargo run -p parley-chat --example two_user_chat

use parley_chat::{ChatService, ConversationView, SessionGate, TokenSessionGate};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let service = ChatService::in_memory()?;
    let alice = service.register_user("alice").await?;
    let bob = service.register_user("bob").await?;

    // The transport edge hands out session tokens; the service only ever
    // sees the resolved user ids.
    let gate = TokenSessionGate::new();
    gate.issue("alice-token", alice.id);
    gate.issue("bob-token", bob.id);

    // Bob's device comes online and subscribes to his push channel.
    let mut bob_device = service.subscribe(bob.id);

    let caller = gate.authenticate("alice-token")?;
    let sent = service.send_message(caller, bob.id, "hi bob").await?;
    println!("alice sent message {} ({:?})", sent.id, sent.text);

    // Bob's device receives the push without re-querying.
    let pushed = bob_device.recv().await?;
    println!("bob's device got a push: {:?}", pushed.text);

    let caller = gate.authenticate("bob-token")?;
    let reply = service.send_message(caller, alice.id, "hi alice").await?;
    println!("bob replied with message {}", reply.id);

    // Bob reloads history and reconciles the earlier push against it:
    // the pushed message is already there, so applying it is a no-op.
    let mut view = ConversationView::new();
    view.seed(service.history(bob.id, alice.id).await?);
    let fresh = view.apply(pushed);
    println!("push after history reload was new: {}", fresh);

    println!("conversation as bob sees it:");
    for message in view.messages() {
        let who = if message.sender_id == bob.id { "bob" } else { "alice" };
        println!("  [{}] {}: {}", message.id, who, message.text);
    }

    Ok(())
}
