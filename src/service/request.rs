use futures::Future;
use trackable::error::ErrorKindExt;

use super::thread::ServiceThreadHandle;
use crate::deadline::Deadline;
use crate::extent::Extent;
use crate::ledger::LedgerUsage;
use crate::service::command::{self, Command};
use crate::service::ServiceStatus;
use crate::{Error, ErrorKind, Result};

/// サービスに対してリクエストを発行するためのビルダ.
///
/// # 注意
///
/// リクエストを発行した結果返される`Future`を効率的にポーリングするためには
/// [`fibers`]を使用する必要がある。
///
/// [`fibers`]: https://github.com/dwango/fibers-rs
#[derive(Debug)]
pub struct ServiceRequest<'a> {
    service: &'a ServiceThreadHandle,
    deadline: Option<Deadline>,
    max_queue_len: Option<usize>,
    wait_for_running: bool,
}
impl<'a> ServiceRequest<'a> {
    pub(crate) fn new(service: &'a ServiceThreadHandle) -> Self {
        ServiceRequest {
            service,
            deadline: None,
            max_queue_len: None,
            wait_for_running: false,
        }
    }

    /// エクステントを作成する.
    ///
    /// エラーの条件は[`AllocationLedger::create_extent`]と同様.
    ///
    /// [`AllocationLedger::create_extent`]: ../ledger/struct.AllocationLedger.html#method.create_extent
    pub fn create_extent<S: Into<String>>(
        &self,
        name: S,
        size: u64,
    ) -> impl Future<Item = (), Error = Error> {
        let deadline = self.deadline.unwrap_or_default();
        let (command, response) = command::CreateExtent::new(name.into(), size, deadline);
        self.send_command(Command::Create(command));
        response
    }

    /// エクステントを削除する.
    ///
    /// 削除されたエクステントが結果として返される.
    pub fn delete_extent<S: Into<String>>(
        &self,
        name: S,
    ) -> impl Future<Item = Extent, Error = Error> {
        let deadline = self.deadline.unwrap_or_default();
        let (command, response) = command::DeleteExtent::new(name.into(), deadline);
        self.send_command(Command::Delete(command));
        response
    }

    /// エクステントを取得する.
    pub fn get_extent<S: Into<String>>(
        &self,
        name: S,
    ) -> impl Future<Item = Extent, Error = Error> {
        let deadline = self.deadline.unwrap_or_default();
        let (command, response) = command::GetExtent::new(name.into(), deadline);
        self.send_command(Command::Get(command));
        response
    }

    /// エクステントの一覧を作成順に取得する.
    pub fn list_extents(&self) -> impl Future<Item = Vec<Extent>, Error = Error> {
        let deadline = self.deadline.unwrap_or_default();
        let (command, response) = command::ListExtents::new(deadline);
        self.send_command(Command::List(command));
        response
    }

    /// レジャーの使用状況を取得する.
    ///
    /// 空き容量とエクステント数は、同一時点の値であることが保証されている.
    pub fn usage(&self) -> impl Future<Item = LedgerUsage, Error = Error> {
        let deadline = self.deadline.unwrap_or_default();
        let (command, response) = command::GetUsage::new(deadline);
        self.send_command(Command::Usage(command));
        response
    }

    /// サービスを停止する.
    ///
    /// 停止は重要な操作であり、実行は`LedgerService`インスタンスの保持者に制限したいので、
    /// このメソッドは`crate`のみを公開範囲とする.
    pub(crate) fn stop(&self) {
        let deadline = self.deadline.unwrap_or_default();
        let command = command::StopService::new(deadline);
        self.send_command(Command::Stop(command));
    }

    /// 要求のデッドラインを設定する.
    ///
    /// デフォルト値は`Deadline::Infinity`.
    pub fn deadline(&mut self, deadline: Deadline) -> &mut Self {
        self.deadline = Some(deadline);
        self
    }

    /// サービスのキューの最大長を指定する.
    ///
    /// もし要求発行時に、サービスのキューの長さがこの値を超えている場合には、
    /// `ErrorKind::ServiceBusy`エラーが返される.
    ///
    /// デフォルトは無制限.
    pub fn max_queue_len(&mut self, max: usize) -> &mut Self {
        self.max_queue_len = Some(max);
        self
    }

    /// サービスが起動処理中の場合には、その完了を待つように指示する.
    ///
    /// デフォルトでは、起動処理中にリクエストが発行された場合には、
    /// 即座に`ErrorKind::ServiceBusy`エラーが返される.
    ///
    /// `wait_for_running()`が呼び出された場合には、
    /// リクエストはキューに追加され、サービス起動後に順次処理される.
    pub fn wait_for_running(&mut self) -> &mut Self {
        self.wait_for_running = true;
        self
    }

    fn send_command(&self, command: Command) {
        if !self.wait_for_running && self.service.metrics().status() == ServiceStatus::Starting {
            let e = track!(ErrorKind::ServiceBusy.cause("The service is starting up"));
            self.service.metrics().busy_commands.increment(&command);
            command.failed(e.into());
            return;
        }
        if let Err(e) = track!(self.check_limit()) {
            self.service.metrics().busy_commands.increment(&command);
            command.failed(e)
        } else {
            self.service.send_command(command);
        }
    }

    fn check_limit(&self) -> Result<()> {
        let metrics = self.service.metrics();
        if let Some(max) = self.max_queue_len {
            track_assert!(
                metrics.queue_len() <= max,
                ErrorKind::ServiceBusy,
                "value={}, max={}",
                metrics.queue_len(),
                max
            );
        }
        Ok(())
    }
}
