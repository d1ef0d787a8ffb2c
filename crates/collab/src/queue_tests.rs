use super::*;

#[test]
fn noop_queue_drains_empty() {
    let queue = NoOpHaltQueue;
    queue.push(HaltSignal::Halt);
    assert!(queue.drain().is_empty());
}

#[test]
fn channel_queue_drains_pushed_signals_in_order() {
    let (queue, _tx) = ChannelHaltQueue::new();
    queue.push(HaltSignal::Interjection("also check tests".to_string()));
    queue.push(HaltSignal::Halt);

    let drained = queue.drain();
    assert_eq!(
        drained,
        vec![HaltSignal::Interjection("also check tests".to_string()), HaltSignal::Halt]
    );
    assert!(queue.drain().is_empty(), "drain must consume the queue");
}

#[test]
fn channel_queue_receives_from_its_paired_sender() {
    let (queue, tx) = ChannelHaltQueue::new();
    tx.send(HaltSignal::Halt).unwrap();

    assert_eq!(queue.drain(), vec![HaltSignal::Halt]);
}
