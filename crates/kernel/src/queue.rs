use std::collections::VecDeque;
use std::time::{Duration, Instant};

use blockworld_common::{BlockPos, TextureDescriptor};

/// A unit of deferred visibility work.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PendingCommand {
    /// Draw the block at `pos` with `texture`.
    Create {
        pos: BlockPos,
        texture: TextureDescriptor,
    },
    /// Stop drawing the block at `pos`.
    Destroy { pos: BlockPos },
}

impl PendingCommand {
    pub fn pos(&self) -> BlockPos {
        match self {
            Self::Create { pos, .. } | Self::Destroy { pos } => *pos,
        }
    }
}

/// Strict FIFO of pending commands.
///
/// No priorities and no cancellation: every command runs exactly once, in
/// submission order. A later command is the only way to counteract an
/// earlier one.
#[derive(Debug, Clone, Default)]
pub struct CommandQueue {
    pending: VecDeque<PendingCommand>,
}

impl CommandQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enqueue(&mut self, command: PendingCommand) {
        self.pending.push_back(command);
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Pending commands in execution order.
    pub fn iter(&self) -> impl Iterator<Item = &PendingCommand> {
        self.pending.iter()
    }

    /// Execute commands in order until the queue is empty or `budget` of
    /// wall-clock time has elapsed. The clock is checked between commands,
    /// never during one. Returns how many ran.
    pub fn drain_budgeted(
        &mut self,
        budget: Duration,
        mut execute: impl FnMut(PendingCommand),
    ) -> usize {
        let start = Instant::now();
        let mut executed = 0;
        while start.elapsed() < budget {
            let Some(command) = self.pending.pop_front() else {
                break;
            };
            execute(command);
            executed += 1;
        }
        tracing::trace!(
            executed,
            remaining = self.pending.len(),
            "budgeted drain complete"
        );
        executed
    }

    /// Execute every pending command with no time limit.
    pub fn drain_all(&mut self, mut execute: impl FnMut(PendingCommand)) -> usize {
        let executed = self.pending.len();
        while let Some(command) = self.pending.pop_front() {
            execute(command);
        }
        executed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use blockworld_common::blocks::GRASS;

    fn create(x: i32) -> PendingCommand {
        PendingCommand::Create {
            pos: BlockPos::new(x, 0, 0),
            texture: GRASS,
        }
    }

    #[test]
    fn drain_all_runs_in_submission_order() {
        let mut queue = CommandQueue::new();
        queue.enqueue(create(0));
        queue.enqueue(PendingCommand::Destroy {
            pos: BlockPos::new(0, 0, 0),
        });
        queue.enqueue(create(1));

        let mut seen = Vec::new();
        assert_eq!(queue.drain_all(|c| seen.push(c)), 3);
        assert!(queue.is_empty());
        assert!(matches!(seen[0], PendingCommand::Create { .. }));
        assert!(matches!(seen[1], PendingCommand::Destroy { .. }));
        assert_eq!(seen[2].pos(), BlockPos::new(1, 0, 0));
    }

    #[test]
    fn zero_budget_runs_nothing() {
        let mut queue = CommandQueue::new();
        queue.enqueue(create(0));
        assert_eq!(queue.drain_budgeted(Duration::ZERO, |_| {}), 0);
        assert_eq!(queue.len(), 1);
    }

    #[test]
    fn generous_budget_runs_everything() {
        let mut queue = CommandQueue::new();
        for x in 0..100 {
            queue.enqueue(create(x));
        }
        let mut order = Vec::new();
        let ran = queue.drain_budgeted(Duration::from_secs(10), |c| order.push(c.pos().x));
        assert_eq!(ran, 100);
        assert_eq!(order, (0..100).collect::<Vec<_>>());
    }

    #[test]
    fn budget_is_checked_between_commands() {
        let mut queue = CommandQueue::new();
        for x in 0..3 {
            queue.enqueue(create(x));
        }
        // The first command overruns the budget, so the rest wait for the next drain.
        let ran = queue.drain_budgeted(Duration::from_millis(1), |_| {
            std::thread::sleep(Duration::from_millis(5));
        });
        assert_eq!(ran, 1);
        assert_eq!(queue.len(), 2);
        assert_eq!(queue.iter().next().map(|c| c.pos().x), Some(1));
    }
}
