//! Linear step lists.

use super::{Outbox, StateMachine, Step};
use crate::error::ProtocolError;

/// Runs its steps in order, one cursor position at a time.
#[derive(Debug, Clone)]
pub struct Sequence<A, C> {
    steps: Vec<Step<A, C>>,
    cursor: usize,
}

impl<A, C> Sequence<A, C> {
    /// Creates a sequence positioned at its first step.
    pub fn new(steps: Vec<Step<A, C>>) -> Self {
        Self { steps, cursor: 0 }
    }

    /// Index of the next step to run.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Total number of steps.
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Whether the sequence has no steps at all.
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

impl<A, C> StateMachine<A, C> for Sequence<A, C> {
    fn advance(&mut self, outbox: &mut Outbox<A>, context: &mut C) -> Result<(), ProtocolError> {
        while let Some(Step::Local(f)) = self.steps.get(self.cursor) {
            f(outbox, context)?;
            self.cursor += 1;
        }
        Ok(())
    }

    fn accept(&mut self, action: &A, context: &mut C) -> Result<(), ProtocolError> {
        match self.steps.get(self.cursor) {
            None => Err(ProtocolError::SequenceComplete),
            Some(Step::Local(_)) => Err(ProtocolError::AwaitingLocalStep),
            Some(Step::Transition(f)) => {
                f(action, context)?;
                self.cursor += 1;
                Ok(())
            },
        }
    }

    fn done(&self) -> bool {
        self.cursor >= self.steps.len()
    }

    fn reset(&mut self) {
        self.cursor = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::machine::{local, repeat, sequence, transition};

    fn summing() -> Sequence<u32, u32> {
        sequence([
            transition(|a: &u32, sum: &mut u32| {
                *sum += a;
                Ok(())
            })
            .into(),
            repeat(
                transition(|a: &u32, sum: &mut u32| {
                    *sum += a;
                    Ok(())
                }),
                2,
            ),
        ])
    }

    #[test]
    fn three_transitions_sum_three_actions() {
        let mut machine = summing();
        let mut sum = 0;

        for a in [1, 2, 3] {
            assert!(!machine.done());
            machine.accept(&a, &mut sum).expect("accept");
        }

        assert!(machine.done());
        assert_eq!(sum, 6);
    }

    #[test]
    fn fourth_action_is_rejected() {
        let mut machine = summing();
        let mut sum = 0;
        for a in [1, 2, 3] {
            machine.accept(&a, &mut sum).expect("accept");
        }

        assert!(matches!(machine.accept(&4, &mut sum), Err(ProtocolError::SequenceComplete)));
        assert_eq!(sum, 6);
    }

    #[test]
    fn advance_runs_locals_up_to_transition() {
        let mut machine: Sequence<u32, Vec<&'static str>> = sequence([
            local(|out: &mut Outbox<u32>, log: &mut Vec<&'static str>| {
                log.push("first");
                out.post(7);
                Ok(())
            }),
            local(|_: &mut Outbox<u32>, log: &mut Vec<&'static str>| {
                log.push("second");
                Ok(())
            }),
            transition(|_: &u32, log: &mut Vec<&'static str>| {
                log.push("input");
                Ok(())
            }),
        ]);
        let mut outbox = Outbox::new();
        let mut log = Vec::new();

        assert!(matches!(machine.accept(&0, &mut log), Err(ProtocolError::AwaitingLocalStep)));

        machine.advance(&mut outbox, &mut log).expect("advance");
        assert_eq!(log, ["first", "second"]);
        assert_eq!(outbox.drain().collect::<Vec<_>>(), [7]);
        assert_eq!(machine.cursor(), 2);

        // Nothing more to run until input arrives.
        machine.advance(&mut outbox, &mut log).expect("advance");
        assert_eq!(log.len(), 2);

        machine.accept(&1, &mut log).expect("accept");
        assert!(machine.done());
    }

    #[test]
    fn rejected_action_keeps_cursor() {
        let mut machine: Sequence<u32, ()> = sequence([transition(|a: &u32, _: &mut ()| {
            if *a == 0 { Err(ProtocolError::invalid_state("zero")) } else { Ok(()) }
        })]);

        assert!(machine.accept(&0, &mut ()).is_err());
        assert_eq!(machine.cursor(), 0);
        machine.accept(&1, &mut ()).expect("accept");
        assert!(machine.done());
    }

    #[test]
    fn reset_rewinds() {
        let mut machine = summing();
        let mut sum = 0;
        machine.accept(&5, &mut sum).expect("accept");
        machine.reset();

        assert_eq!(machine.cursor(), 0);
        assert!(!machine.done());
    }
}
