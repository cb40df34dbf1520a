//! Hands a transaction from a root coordinator to a leaf and back, printing
//! the sequence numbers each batch is stamped with.

use proven_coordinator::{MockLockedSender, SendContext, TxnCoordinator};
use proven_protocol::{BatchRequest, Request};

fn print_batch(label: &str, mock: &MockLockedSender) {
    if let Some(ba) = mock.last_batch() {
        let stamps: Vec<String> = ba
            .requests
            .iter()
            .map(|r| format!("{}@{}", r.method(), r.header().sequence))
            .collect();
        println!("{label}: {}", stamps.join(", "));
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let ctx = SendContext::new();

    let root_sender = MockLockedSender::new();
    let root = TxnCoordinator::new_root("handoff", root_sender.clone(), Default::default());

    let ba = BatchRequest::new(None)
        .with(Request::begin_transaction("user:1"))
        .with(Request::put("user:1", "alice"))
        .with(Request::get("user:1"));
    root.send(&ctx, ba).await?;
    print_batch("root", &root_sender);

    // Ship the root's state to a leaf, as distributed execution would
    let bytes = root.meta_bytes().await?;
    let leaf_sender = MockLockedSender::new();
    let leaf = TxnCoordinator::leaf_from_bytes(&bytes, leaf_sender.clone(), Default::default())?;

    let ba = BatchRequest::new(None)
        .with(Request::put("user:2", "bob"))
        .with(Request::scan("user:", "user;"))
        .with(Request::put("user:3", "carol"));
    leaf.send(&ctx, ba).await?;
    print_batch("leaf", &leaf_sender);

    // Fold the leaf's final state back into the root before committing
    root.augment_meta(&leaf.get_meta().await).await?;
    leaf.close().await;

    let ba = BatchRequest::new(None).with(Request::end_transaction("user:1", true));
    root.send(&ctx, ba).await?;
    print_batch("root", &root_sender);

    println!("final: {}", root.txn().await);
    root.close().await;
    Ok(())
}
