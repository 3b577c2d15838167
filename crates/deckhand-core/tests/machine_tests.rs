//! Driving composed machines over a shared log.

use deckhand_core::{
    Connection, ErrorKind, Fork, MemoryTransport, Outbox, ProtocolError, Queue, Sequence,
    StateMachine, local, repeat, run, sequence, transition,
};
use proptest::prelude::*;

#[derive(Debug, Default)]
struct Tally {
    sum: u32,
    seen: Vec<u32>,
}

fn add(a: &u32, tally: &mut Tally) -> Result<(), ProtocolError> {
    tally.sum += a;
    tally.seen.push(*a);
    Ok(())
}

fn post(value: u32) -> deckhand_core::Step<u32, Tally> {
    local(move |out: &mut Outbox<u32>, _: &mut Tally| {
        out.post(value);
        Ok(())
    })
}

#[tokio::test]
async fn run_posts_locals_and_consumes_own_actions() {
    let transport = MemoryTransport::<u32>::new();
    let queue = Queue::new(transport.clone());

    let mut machine: Sequence<u32, Tally> =
        sequence([vec![post(2), post(3)], repeat(transition(add), 2)]);
    let mut tally = Tally::default();

    run(&mut machine, &queue, &mut tally).await.expect("run");

    assert_eq!(tally.sum, 5);
    assert_eq!(transport.entries(), [2, 3]);
    // Reset after a successful run.
    assert_eq!(machine.cursor(), 0);
}

#[tokio::test]
async fn two_participants_agree_on_log_order() {
    let transport = MemoryTransport::<u32>::new();
    let alice_queue = Queue::new(transport.clone());
    let bob_queue = Queue::new(transport.clone());

    let mut alice: Sequence<u32, Tally> = sequence([vec![post(10)], repeat(transition(add), 2)]);
    let mut bob: Sequence<u32, Tally> = sequence([vec![post(20)], repeat(transition(add), 2)]);
    let (mut alice_tally, mut bob_tally) = (Tally::default(), Tally::default());

    let (a, b) = tokio::join!(
        run(&mut alice, &alice_queue, &mut alice_tally),
        run(&mut bob, &bob_queue, &mut bob_tally),
    );
    a.expect("alice");
    b.expect("bob");

    assert_eq!(alice_tally.seen, bob_tally.seen);
    assert_eq!(alice_tally.sum, 30);
}

#[tokio::test]
async fn rejection_aborts_run() {
    let transport = MemoryTransport::<u32>::new();
    let queue = Queue::new(transport.clone());
    transport.append(0u32);

    let mut machine: Sequence<u32, Tally> = sequence([transition(|a: &u32, _: &mut Tally| {
        if *a == 0 { Err(ProtocolError::invalid_state("zero is not a move")) } else { Ok(()) }
    })]);

    let err = run(&mut machine, &queue, &mut Tally::default()).await.expect_err("rejected");
    assert_eq!(err.kind(), ErrorKind::ProtocolViolation);
}

#[tokio::test]
async fn fork_then_connection() {
    let transport = MemoryTransport::<u32>::new();
    let queue = Queue::new(transport.clone());
    for n in [7u32, 1, 100] {
        transport.append(n);
    }

    let only = |value: u32| {
        transition(move |a: &u32, tally: &mut Tally| {
            if *a == value { add(a, tally) } else { Err(ProtocolError::invalid_state("no match")) }
        })
    };

    let fork: Fork<u32, Tally> = Fork::new(vec![
        Box::new(sequence([only(6), only(1)])),
        Box::new(sequence([only(7), only(1)])),
    ]);
    let mut machine = Connection::new(fork, sequence([transition(add)]));
    let mut tally = Tally::default();

    run(&mut machine, &queue, &mut tally).await.expect("run");
    assert_eq!(tally.seen, [7, 1, 100]);
}

proptest! {
    #[test]
    fn sequence_is_done_after_exactly_n_accepts(
        values in proptest::collection::vec(0u32..1000, 0..24),
    ) {
        let mut machine: Sequence<u32, Tally> = sequence([repeat(transition(add), values.len())]);
        let mut tally = Tally::default();

        for value in &values {
            prop_assert!(!machine.done());
            machine.accept(value, &mut tally).expect("accept");
        }

        prop_assert!(machine.done());
        prop_assert_eq!(&tally.seen, &values);
        prop_assert!(matches!(
            machine.accept(&0, &mut tally),
            Err(ProtocolError::SequenceComplete)
        ));
    }
}
