use fibers::sync::oneshot;
use futures::{Future, Poll};
use slog::Logger;
use std::sync::mpsc as std_mpsc;
use std::sync::mpsc::SendError;
use std::sync::Arc;
use std::thread;
use trackable::error::ErrorKindExt;

use crate::ledger::AllocationLedger;
use crate::metrics::ServiceMetrics;
use crate::service::command::{Command, CommandReceiver, CommandSender};
use crate::service::queue::DeadlineQueue;
use crate::service::{ServiceBuilder, ServiceStatus};
use crate::{Error, ErrorKind, Result};

/// サービスの実行スレッド.
///
/// レジャーはこのスレッドに専有され、全ての操作はこのスレッド上で直列化されて実行される.
#[derive(Debug)]
pub struct ServiceThread {
    metrics: ServiceMetrics,
    queue: DeadlineQueue,
    ledger: AllocationLedger,
    max_queue_len: usize,
    logger: Logger,
    command_rx: CommandReceiver,
}
impl ServiceThread {
    /// サービスの実行スレッドを起動する.
    pub fn spawn<F>(
        builder: ServiceBuilder,
        init_ledger: F,
    ) -> (ServiceThreadHandle, ServiceThreadMonitor)
    where
        F: FnOnce() -> Result<AllocationLedger> + Send + 'static,
    {
        let metrics = ServiceMetrics::new(&builder.metrics);
        metrics.status.set(f64::from(ServiceStatus::Starting as u8));

        let (command_tx, command_rx) = std_mpsc::channel();
        let (monitored, monitor) = oneshot::monitor();
        let handle = ServiceThreadHandle {
            command_tx,
            metrics: Arc::new(metrics.clone()),
        };

        let max_queue_len = builder.max_queue_len;
        let logger = builder.logger;
        thread::spawn(move || {
            let result = track!(init_ledger()).map(|ledger| {
                info!(logger, "Ledger service started";
                      "ledger" => ledger.name(),
                      "instance_uuid" => %ledger.instance_uuid(),
                      "total_capacity" => ledger.total_capacity());
                metrics.status.set(f64::from(ServiceStatus::Running as u8));

                let mut service = ServiceThread {
                    metrics: metrics.clone(),
                    queue: DeadlineQueue::new(),
                    ledger,
                    max_queue_len,
                    logger: logger.clone(),
                    command_rx,
                };
                while service.run_once() {}
                service.terminate_pending();
            });
            if let Err(ref e) = result {
                error!(logger, "Cannot initialize the ledger"; "error" => %e);
            }
            info!(logger, "Ledger service stopped");
            metrics.status.set(f64::from(ServiceStatus::Stopped as u8));
            monitored.exit(result);
        });

        (handle, ServiceThreadMonitor(monitor))
    }

    fn run_once(&mut self) -> bool {
        if let Ok(command) = self.command_rx.try_recv() {
            self.enqueue(command);
            true
        } else if let Some(command) = self.queue.pop() {
            self.metrics.dequeued_commands.increment(&command);
            self.handle_command(command)
        } else if let Ok(command) = self.command_rx.recv() {
            self.enqueue(command);
            true
        } else {
            // 全てのハンドルが破棄された
            false
        }
    }

    fn terminate_pending(&mut self) {
        while let Ok(command) = self.command_rx.try_recv() {
            self.queue.push(command);
        }
        if self.queue.is_empty() {
            return;
        }

        info!(self.logger, "Terminating pending commands"; "count" => self.queue.len());
        for command in self.queue.drain() {
            self.metrics.dequeued_commands.increment(&command);
            self.metrics.failed_commands.increment(&command);
            let e = track!(ErrorKind::ServiceTerminated.cause("The service has been stopped"));
            command.failed(e.into());
        }
    }

    fn enqueue(&mut self, command: Command) {
        let is_stop = if let Command::Stop(_) = command {
            true
        } else {
            false
        };
        if is_stop || self.queue.len() < self.max_queue_len {
            self.queue.push(command);
        } else {
            warn!(self.logger, "Service queue is full";
                  "queue_len" => self.queue.len(),
                  "max_queue_len" => self.max_queue_len);
            let e = track!(ErrorKind::ServiceBusy.cause(format!(
                "queue_len={}, max_queue_len={}",
                self.queue.len(),
                self.max_queue_len
            )));
            self.metrics.dequeued_commands.increment(&command);
            self.metrics.busy_commands.increment(&command);
            command.failed(e.into());
        }
    }

    fn handle_command(&mut self, command: Command) -> bool {
        match command {
            Command::Create(c) => {
                let result = track!(self.ledger.create_extent(c.name(), c.size()));
                if let Err(ref e) = result {
                    self.metrics.failed_commands.create.increment();
                    debug!(self.logger, "Cannot create extent";
                           "extent" => c.name(), "size" => c.size(), "error" => %e);
                }
                c.reply(result);
                true
            }
            Command::Delete(c) => {
                let result = track!(self.ledger.delete_extent(c.name()));
                if let Err(ref e) = result {
                    self.metrics.failed_commands.delete.increment();
                    debug!(self.logger, "Cannot delete extent";
                           "extent" => c.name(), "error" => %e);
                }
                c.reply(result);
                true
            }
            Command::Get(c) => {
                let result = track!(self.ledger.get_extent(c.name()).map(Clone::clone));
                if result.is_err() {
                    self.metrics.failed_commands.get.increment();
                }
                c.reply(result);
                true
            }
            Command::List(c) => {
                let value = self.ledger.list_extents();
                c.reply(Ok(value));
                true
            }
            Command::Usage(c) => {
                let value = self.ledger.usage();
                c.reply(Ok(value));
                true
            }
            Command::Stop(_) => false,
        }
    }
}

/// サービスの実行スレッドの死活監視用オブジェクト.
#[derive(Debug)]
pub struct ServiceThreadMonitor(oneshot::Monitor<(), Error>);
impl Future for ServiceThreadMonitor {
    type Item = ();
    type Error = Error;
    fn poll(&mut self) -> Poll<Self::Item, Self::Error> {
        track!(self
            .0
            .poll()
            .map_err(|e| e.unwrap_or_else(|| ErrorKind::ServiceTerminated
                .cause("`ServiceThread` terminated unintentionally")
                .into())))
    }
}

/// サービススレッドを操作するためのハンドル.
#[derive(Debug, Clone)]
pub struct ServiceThreadHandle {
    command_tx: CommandSender,
    metrics: Arc<ServiceMetrics>, // 必須では無いが`Clone`時の効率を上げるために`Arc`で囲む.
}
impl ServiceThreadHandle {
    pub fn send_command(&self, command: Command) {
        self.metrics.enqueued_commands.increment(&command);
        if let Err(SendError(command)) = self.command_tx.send(command) {
            // 返信用チャンネルの破棄により、呼び出し元には`ServiceTerminated`が通知される
            self.metrics.dequeued_commands.increment(&command);
            self.metrics.failed_commands.increment(&command);
        }
    }
    pub fn metrics(&self) -> &Arc<ServiceMetrics> {
        &self.metrics
    }
}
