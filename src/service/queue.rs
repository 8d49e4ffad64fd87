use std::cmp::{self, Reverse};
use std::collections::BinaryHeap;
use std::time::Instant;

use crate::deadline::Deadline;
use crate::service::command::Command;

/// サービススレッドが保持する実行待ちコマンドのキュー.
///
/// コマンドは`(絶対デッドライン, 到着順)`の昇順で取り出される.
/// 停止コマンドも他のコマンドと同じ規則で並べられるため、
/// `Deadline::Immediate`付きの停止は実行待ちのコマンド群を追い越し、
/// `Deadline::Infinity`付きの停止は既に到着しているコマンド群の完了を待つことになる.
///
/// 停止時に取り残されたコマンド群は[`drain`](#method.drain)で回収される.
#[derive(Debug, Default)]
pub struct DeadlineQueue {
    arrivals: u64,
    heap: BinaryHeap<Entry>,
}
impl DeadlineQueue {
    /// 空のキューを生成する.
    pub fn new() -> Self {
        DeadlineQueue::default()
    }

    /// コマンドを追加する.
    pub fn push(&mut self, command: Command) {
        let key = (AbsoluteDeadline::new(command.deadline()), self.arrivals);
        self.arrivals += 1;
        self.heap.push(Entry {
            key: Reverse(key),
            command,
        });
    }

    /// 次に実行すべきコマンドを取り出す.
    pub fn pop(&mut self) -> Option<Command> {
        self.heap.pop().map(|e| e.command)
    }

    /// 実行待ちのコマンドを、実行されるはずだった順に全て取り出す.
    pub fn drain(&mut self) -> Vec<Command> {
        let mut commands = Vec::with_capacity(self.heap.len());
        while let Some(command) = self.pop() {
            commands.push(command);
        }
        commands
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }
}

#[derive(Debug)]
struct Entry {
    key: Reverse<(AbsoluteDeadline, u64)>, // `BinaryHeap`は最大ヒープなので反転させる
    command: Command,
}
impl PartialEq for Entry {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}
impl Eq for Entry {}
impl PartialOrd for Entry {
    fn partial_cmp(&self, other: &Self) -> Option<cmp::Ordering> {
        Some(self.cmp(other))
    }
}
impl Ord for Entry {
    fn cmp(&self, other: &Self) -> cmp::Ordering {
        self.key.cmp(&other.key)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum AbsoluteDeadline {
    Immediate,
    Until(Instant),
    Infinity,
}
impl AbsoluteDeadline {
    fn new(deadline: Deadline) -> Self {
        match deadline {
            Deadline::Immediate => AbsoluteDeadline::Immediate,
            Deadline::Within(d) => AbsoluteDeadline::Until(Instant::now() + d),
            Deadline::Infinity => AbsoluteDeadline::Infinity,
        }
    }
}
