use prometrics::metrics::MetricBuilder;
use slog::{Discard, Logger};

use super::thread::ServiceThread;
use super::{LedgerService, LedgerServiceHandle};
use crate::ledger::AllocationLedger;
use crate::Result;

/// `LedgerService`のビルダ.
#[derive(Debug, Clone)]
pub struct ServiceBuilder {
    pub(crate) metrics: MetricBuilder,
    pub(crate) max_queue_len: usize,
    pub(crate) logger: Logger,
}
impl ServiceBuilder {
    /// デフォルト設定で`ServiceBuilder`インスタンスを生成する.
    pub fn new() -> Self {
        ServiceBuilder {
            metrics: MetricBuilder::new(),
            max_queue_len: 100_000,
            logger: Logger::root(Discard, o!()),
        }
    }

    /// メトリクス用の共通設定を登録する.
    ///
    /// デフォルト値は`MetricBuilder::new()`.
    pub fn metrics(&mut self, metrics: MetricBuilder) -> &mut Self {
        self.metrics = metrics;
        self
    }

    /// サービスの最大キュー長.
    ///
    /// これを超えた数のコマンドがサービスのキューに溜まっている場合には、
    /// 新たに受信したコマンドは`ErrorKind::ServiceBusy`で拒否される.
    ///
    /// デフォルト値は`100_000`.
    pub fn max_queue_len(&mut self, n: usize) -> &mut Self {
        self.max_queue_len = n;
        self
    }

    /// サービススレッド用の logger を登録する.
    ///
    /// デフォルトでは、ログは全て捨てられる.
    pub fn logger(&mut self, logger: Logger) -> &mut Self {
        self.logger = logger;
        self
    }

    /// 指定されたレジャーを扱う`LedgerService`を起動する.
    ///
    /// 起動したサービス用に、一つの専用OSスレッドが割り当てられる.
    ///
    /// なお、スレッド起動後には、まず`init_ledger()`が呼び出されて、
    /// レジャーインスタンスが生成される.
    ///
    /// # 注意
    ///
    /// 返り値の`LedgerService`インスタンスが破棄されると、
    /// 起動したサービススレッドも停止させられるので注意が必要.
    pub fn spawn<F>(&self, init_ledger: F) -> LedgerService
    where
        F: FnOnce() -> Result<AllocationLedger> + Send + 'static,
    {
        let (thread_handle, thread_monitor) = ServiceThread::spawn(self.clone(), init_ledger);
        LedgerService::new(thread_monitor, LedgerServiceHandle(thread_handle))
    }
}
impl Default for ServiceBuilder {
    fn default() -> Self {
        Self::new()
    }
}
