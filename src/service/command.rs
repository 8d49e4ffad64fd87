//! サービスに発行されるコマンド群の定義.
use fibers::sync::oneshot;
use futures::{Future, Poll};
use std::sync::mpsc::{Receiver, Sender};
use trackable::error::ErrorKindExt;

use crate::deadline::Deadline;
use crate::extent::Extent;
use crate::ledger::LedgerUsage;
use crate::{Error, ErrorKind, Result};

pub type CommandSender = Sender<Command>;
pub type CommandReceiver = Receiver<Command>;

#[derive(Debug)]
pub enum Command {
    Create(CreateExtent),
    Delete(DeleteExtent),
    Get(GetExtent),
    List(ListExtents),
    Usage(GetUsage),
    Stop(StopService),
}
impl Command {
    pub fn deadline(&self) -> Deadline {
        match *self {
            Command::Create(ref c) => c.deadline,
            Command::Delete(ref c) => c.deadline,
            Command::Get(ref c) => c.deadline,
            Command::List(ref c) => c.deadline,
            Command::Usage(ref c) => c.deadline,
            Command::Stop(ref c) => c.deadline,
        }
    }
    pub fn failed(self, error: Error) {
        match self {
            Command::Create(c) => c.reply.send(Err(error)),
            Command::Delete(c) => c.reply.send(Err(error)),
            Command::Get(c) => c.reply.send(Err(error)),
            Command::List(c) => c.reply.send(Err(error)),
            Command::Usage(c) => c.reply.send(Err(error)),
            Command::Stop(_) => {}
        }
    }
}

/// `Result`の非同期版.
#[derive(Debug)]
pub struct AsyncResult<T>(oneshot::Monitor<T, Error>);
impl<T> AsyncResult<T> {
    fn new() -> (AsyncReply<T>, Self) {
        let (tx, rx) = oneshot::monitor();
        (AsyncReply(tx), AsyncResult(rx))
    }
}
impl<T> Future for AsyncResult<T> {
    type Item = T;
    type Error = Error;
    fn poll(&mut self) -> Poll<Self::Item, Self::Error> {
        track!(self.0.poll().map_err(|e| e.unwrap_or_else(|| {
            ErrorKind::ServiceTerminated
                .cause("monitoring channel disconnected")
                .into()
        })))
    }
}

#[derive(Debug)]
struct AsyncReply<T>(oneshot::Monitored<T, Error>);
impl<T> AsyncReply<T> {
    fn send(self, result: Result<T>) {
        self.0.exit(result);
    }
}

#[derive(Debug)]
pub struct CreateExtent {
    name: String,
    size: u64,
    deadline: Deadline,
    reply: AsyncReply<()>,
}
impl CreateExtent {
    pub fn new(name: String, size: u64, deadline: Deadline) -> (Self, AsyncResult<()>) {
        let (reply, result) = AsyncResult::new();
        let command = CreateExtent {
            name,
            size,
            deadline,
            reply,
        };
        (command, result)
    }
    pub fn name(&self) -> &str {
        &self.name
    }
    pub fn size(&self) -> u64 {
        self.size
    }
    pub fn reply(self, result: Result<()>) {
        self.reply.send(result);
    }
}

#[derive(Debug)]
pub struct DeleteExtent {
    name: String,
    deadline: Deadline,
    reply: AsyncReply<Extent>,
}
impl DeleteExtent {
    pub fn new(name: String, deadline: Deadline) -> (Self, AsyncResult<Extent>) {
        let (reply, result) = AsyncResult::new();
        let command = DeleteExtent {
            name,
            deadline,
            reply,
        };
        (command, result)
    }
    pub fn name(&self) -> &str {
        &self.name
    }
    pub fn reply(self, result: Result<Extent>) {
        self.reply.send(result);
    }
}

#[derive(Debug)]
pub struct GetExtent {
    name: String,
    deadline: Deadline,
    reply: AsyncReply<Extent>,
}
impl GetExtent {
    pub fn new(name: String, deadline: Deadline) -> (Self, AsyncResult<Extent>) {
        let (reply, result) = AsyncResult::new();
        let command = GetExtent {
            name,
            deadline,
            reply,
        };
        (command, result)
    }
    pub fn name(&self) -> &str {
        &self.name
    }
    pub fn reply(self, result: Result<Extent>) {
        self.reply.send(result);
    }
}

#[derive(Debug)]
pub struct ListExtents {
    deadline: Deadline,
    reply: AsyncReply<Vec<Extent>>,
}
impl ListExtents {
    pub fn new(deadline: Deadline) -> (Self, AsyncResult<Vec<Extent>>) {
        let (reply, result) = AsyncResult::new();
        let command = ListExtents { deadline, reply };
        (command, result)
    }
    pub fn reply(self, result: Result<Vec<Extent>>) {
        self.reply.send(result);
    }
}

#[derive(Debug)]
pub struct GetUsage {
    deadline: Deadline,
    reply: AsyncReply<LedgerUsage>,
}
impl GetUsage {
    pub fn new(deadline: Deadline) -> (Self, AsyncResult<LedgerUsage>) {
        let (reply, result) = AsyncResult::new();
        let command = GetUsage { deadline, reply };
        (command, result)
    }
    pub fn reply(self, result: Result<LedgerUsage>) {
        self.reply.send(result);
    }
}

#[derive(Debug)]
pub struct StopService {
    deadline: Deadline,
}
impl StopService {
    pub fn new(deadline: Deadline) -> Self {
        StopService { deadline }
    }
}
