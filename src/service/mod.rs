//! レジャーを並行操作するためのサービス.
//!
//! 一つの[レジャー]には一つの管理スレッドが割り当てられ、
//! そのレジャーに対するリクエストは全て直列化されて処理される.
//! そのため、並行する利用者から不変条件が崩れた状態のレジャーが観測されることはない.
//!
//! 並行するリクエスト群が存在する場合には、指定された優先順位(デッドライン)に基づいて
//! スケジューリングが行われる.
//!
//! [レジャー]: ../ledger/index.html
use futures::{Async, Future, Poll};
use std::sync::Arc;

pub use self::builder::ServiceBuilder;
pub use self::request::ServiceRequest;

pub(crate) use self::command::Command; // `metrics`モジュール用に公開されている

use self::thread::{ServiceThreadHandle, ServiceThreadMonitor};
use crate::deadline::Deadline;
use crate::ledger::AllocationLedger;
use crate::metrics::ServiceMetrics;
use crate::{Error, Result};

mod builder;
mod command;
mod queue;
mod request;
mod thread;

/// レジャーを専有し、それに対するリクエストを直列化して処理するサービス.
///
/// [モジュールドキュメント](index.html)も参照のこと.
///
/// # Future実装
///
/// `LedgerService`は[Future]を実装している.
///
/// 実際の処理は、別スレッドで実行されるため`Future::poll`を呼び出さなくても進行上は支障はないが、
/// このメソッドによりサービス(スレッド)の終了(正常ないし異常)を検知することが可能となる.
///
/// なお`LedgerService`インスタンスが破棄されると、裏で動いているサービス用のOSスレッドも停止させられるので、
/// `Future::poll`を呼び出さない場合でも、インスタンス自体は保持しておく必要がある.
///
/// [Future]: https://docs.rs/futures/0.1/futures/future/trait.Future.html
#[must_use]
#[derive(Debug)]
pub struct LedgerService {
    monitor: ServiceThreadMonitor,
    handle: LedgerServiceHandle,
    is_stopped: bool,
}
impl LedgerService {
    /// デフォルト設定でサービスを起動する.
    ///
    /// 設定を変更したい場合には`ServiceBuilder`を使用すること.
    pub fn spawn<F>(init_ledger: F) -> LedgerService
    where
        F: FnOnce() -> Result<AllocationLedger> + Send + 'static,
    {
        ServiceBuilder::new().spawn(init_ledger)
    }

    /// サービスを操作するためのハンドルを返す.
    pub fn handle(&self) -> LedgerServiceHandle {
        self.handle.clone()
    }

    /// サービスに停止リクエストを発行する.
    ///
    /// このメソッドが返った時点でサービスが停止している保証はないので、
    /// 確実に終了を検知したい場合には`Future::poll`メソッド経由で知る必要がある.
    ///
    /// 停止リクエストよりも後に処理される予定だったリクエストには、
    /// `ErrorKind::ServiceTerminated`エラーが返される.
    ///
    /// なお`LedgerService`インスタンスのドロップ時点で、そのサービスがまだ稼働中の場合には
    /// `stop(Deadline::Immediate)`が自動で呼び出される.
    pub fn stop(&self, deadline: Deadline) {
        self.handle()
            .request()
            .deadline(deadline)
            .wait_for_running()
            .stop();
    }

    /// サービスの起動を待機するための`Future`を返す.
    pub fn wait_for_running(self) -> impl Future<Item = Self, Error = Error> {
        let handle = self.handle();
        let future = handle.request().wait_for_running().usage();
        track_err!(future.map(move |_| self))
    }

    pub(crate) fn new(monitor: ServiceThreadMonitor, handle: LedgerServiceHandle) -> Self {
        LedgerService {
            monitor,
            handle,
            is_stopped: false,
        }
    }
}
impl Future for LedgerService {
    type Item = ();
    type Error = Error;
    fn poll(&mut self) -> Poll<Self::Item, Self::Error> {
        let result = track!(self.monitor.poll());
        if let Ok(Async::NotReady) = result {
        } else {
            self.is_stopped = true;
        }
        result
    }
}
impl Drop for LedgerService {
    fn drop(&mut self) {
        if !self.is_stopped {
            self.stop(Deadline::Immediate);
        }
    }
}

/// サービスを操作するためのハンドル.
///
/// 複製して複数のスレッドに配ることができる.
#[derive(Debug, Clone)]
pub struct LedgerServiceHandle(ServiceThreadHandle);
impl LedgerServiceHandle {
    /// サービスに発行するリクエストのビルダを返す.
    pub fn request(&self) -> ServiceRequest {
        ServiceRequest::new(&self.0)
    }

    /// サービスのメトリクスを返す.
    pub fn metrics(&self) -> &Arc<ServiceMetrics> {
        self.0.metrics()
    }
}

/// サービスの稼働状態.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ServiceStatus {
    /// サービスは起動中.
    ///
    /// 具体的には、サービスの管理スレッドがレジャーの初期化(生成)関数を呼び出しているところ.
    Starting = 1,

    /// サービスは稼働中.
    ///
    /// サービスに対して発行された各種要求を処理可能な状態.
    Running = 2,

    /// サービスは停止済.
    ///
    /// サービスが正常ないし異常に終了し、管理スレッドも回収されている.
    Stopped = 0,
}

#[cfg(test)]
mod tests {
    use fibers_global::execute;
    use std::thread;
    use std::time::Duration;
    use trackable::result::TestResult;

    use super::*;
    use crate::ledger::LedgerUsage;
    use crate::ErrorKind;

    #[test]
    fn service_works() -> TestResult {
        let service = LedgerService::spawn(|| track!(AllocationLedger::create("VG1", 1000)));
        let s = service.handle();
        let _ = execute(s.request().wait_for_running().list_extents()); // サービスの起動を待機

        track!(execute(s.request().create_extent("LV1", 200)))?;
        track!(execute(s.request().create_extent("LV2", 300)))?;
        assert_eq!(track!(execute(s.request().usage()))?.free_capacity, 500);

        let extents = track!(execute(s.request().list_extents()))?;
        assert_eq!(
            extents.iter().map(|e| e.to_string()).collect::<Vec<_>>(),
            [
                "Name: LV1, Size: 200, Status: Allocated",
                "Name: LV2, Size: 300, Status: Allocated"
            ]
        );

        let deleted = track!(execute(s.request().delete_extent("LV1")))?;
        assert_eq!(deleted.size(), 200);
        assert_eq!(track!(execute(s.request().usage()))?.free_capacity, 700);

        assert_eq!(
            execute(s.request().delete_extent("LV1"))
                .err()
                .map(|e| *e.kind()),
            Some(ErrorKind::NotFound)
        );
        assert_eq!(
            execute(s.request().create_extent("LV3", 900))
                .err()
                .map(|e| *e.kind()),
            Some(ErrorKind::InsufficientSpace)
        );
        assert_eq!(
            track!(execute(s.request().usage()))?,
            LedgerUsage {
                total_capacity: 1000,
                free_capacity: 700,
                extents: 1,
            }
        );

        let extent = track!(execute(s.request().get_extent("LV2")))?;
        assert_eq!(extent.size(), 300);

        let m = s.metrics();
        assert_eq!(m.status(), ServiceStatus::Running);
        assert_eq!(m.failed_commands().delete(), 1);
        assert_eq!(m.failed_commands().create(), 1);
        assert_eq!(m.queue_len(), 0);
        Ok(())
    }

    #[test]
    fn concurrent_requests_are_serialized() -> TestResult {
        let service = LedgerService::spawn(|| track!(AllocationLedger::create("VG1", 1000)));
        let s = service.handle();
        let _ = execute(s.request().wait_for_running().usage());

        let threads = (0..4)
            .map(|i| {
                let s = s.clone();
                thread::spawn(move || {
                    let mut created = 0usize;
                    for j in 0..50 {
                        let name = format!("LV{}-{}", i, j);
                        match execute(s.request().create_extent(name, 10)) {
                            Ok(()) => created += 1,
                            Err(e) => assert_eq!(*e.kind(), ErrorKind::InsufficientSpace),
                        }
                    }
                    created
                })
            })
            .collect::<Vec<_>>();
        let created: usize = threads.into_iter().map(|t| t.join().unwrap()).sum();
        assert_eq!(created, 100);

        let usage = track!(execute(s.request().usage()))?;
        assert_eq!(usage.free_capacity, 0);
        assert_eq!(usage.extents, 100);

        let extents = track!(execute(s.request().list_extents()))?;
        let used: u64 = extents.iter().map(|e| e.size()).sum();
        assert_eq!(used + usage.free_capacity, usage.total_capacity);
        Ok(())
    }

    #[test]
    fn starting_service_is_busy() -> TestResult {
        let service = LedgerService::spawn(|| {
            thread::sleep(Duration::from_millis(100));
            track!(AllocationLedger::create("VG1", 1000))
        });
        let s = service.handle();
        assert_eq!(s.metrics().status(), ServiceStatus::Starting);

        assert_eq!(
            execute(s.request().create_extent("LV1", 100))
                .err()
                .map(|e| *e.kind()),
            Some(ErrorKind::ServiceBusy)
        );
        assert_eq!(s.metrics().busy_commands().create(), 1);

        track!(execute(
            s.request().wait_for_running().create_extent("LV1", 100)
        ))?;
        assert_eq!(s.metrics().status(), ServiceStatus::Running);
        Ok(())
    }

    #[test]
    fn stopped_service_is_terminated() -> TestResult {
        let service = LedgerService::spawn(|| track!(AllocationLedger::create("VG1", 1000)));
        let service = track!(execute(service.wait_for_running()))?;
        let s = service.handle();

        service.stop(Deadline::Immediate);
        track!(execute(service))?;
        assert_eq!(s.metrics().status(), ServiceStatus::Stopped);

        assert_eq!(
            execute(s.request().list_extents())
                .err()
                .map(|e| *e.kind()),
            Some(ErrorKind::ServiceTerminated)
        );
        Ok(())
    }

    #[test]
    fn initialization_failure_is_reported() {
        let service = LedgerService::spawn(|| track!(AllocationLedger::create("VG0", 0)));
        assert_eq!(
            execute(service).err().map(|e| *e.kind()),
            Some(ErrorKind::InvalidCapacity)
        );
    }

    #[test]
    fn queue_limit_works() {
        let service = ServiceBuilder::new()
            .max_queue_len(0)
            .spawn(|| track!(AllocationLedger::create("VG1", 1000)));
        let s = service.handle();

        assert_eq!(
            execute(s.request().wait_for_running().usage())
                .err()
                .map(|e| *e.kind()),
            Some(ErrorKind::ServiceBusy)
        );
        assert_eq!(s.metrics().busy_commands().usage(), 1);
    }

    #[test]
    fn request_queue_limit_works() -> TestResult {
        let service = LedgerService::spawn(|| {
            thread::sleep(Duration::from_millis(300));
            track!(AllocationLedger::create("VG1", 1000))
        });
        let s = service.handle();

        // 起動中のため、以下のリクエストはキューに溜まったままとなる
        let pending = (0..3)
            .map(|_| s.request().wait_for_running().usage())
            .collect::<Vec<_>>();
        assert_eq!(s.metrics().queue_len(), 3);

        assert_eq!(
            execute(s.request().wait_for_running().max_queue_len(0).usage())
                .err()
                .map(|e| *e.kind()),
            Some(ErrorKind::ServiceBusy)
        );
        assert_eq!(s.metrics().busy_commands().usage(), 1);
        assert_eq!(s.metrics().queue_len(), 3);

        let within_limit = s.request().wait_for_running().max_queue_len(3).list_extents();
        let unlimited = s.request().wait_for_running().usage();
        for usage in pending {
            assert_eq!(track!(execute(usage))?.free_capacity, 1000);
        }
        assert!(track!(execute(within_limit))?.is_empty());
        assert_eq!(track!(execute(unlimited))?.extents, 0);
        assert_eq!(s.metrics().busy_commands().list(), 0);
        Ok(())
    }

    #[test]
    fn deadline_changes_execution_order() -> TestResult {
        let service = LedgerService::spawn(|| {
            thread::sleep(Duration::from_millis(200));
            track!(AllocationLedger::create("VG1", 1000))
        });
        let s = service.handle();

        // 全て起動中に発行されるので、起動完了時点でまとめてキューに入る
        let list = s.request().wait_for_running().list_extents();
        let lv2 = s
            .request()
            .wait_for_running()
            .deadline(Deadline::Within(Duration::from_secs(10)))
            .create_extent("LV2", 200);
        let lv1 = s
            .request()
            .wait_for_running()
            .deadline(Deadline::Immediate)
            .create_extent("LV1", 100);

        let extents = track!(execute(list))?;
        let names = extents.iter().map(|e| e.name()).collect::<Vec<_>>();
        assert_eq!(names, ["LV1", "LV2"]);
        track!(execute(lv1))?;
        track!(execute(lv2))?;
        Ok(())
    }

    #[test]
    fn immediate_stop_terminates_pending_requests() -> TestResult {
        let service = LedgerService::spawn(|| {
            thread::sleep(Duration::from_millis(200));
            track!(AllocationLedger::create("VG1", 1000))
        });
        let s = service.handle();

        let pending = s.request().wait_for_running().create_extent("LV1", 100);
        service.stop(Deadline::Immediate);

        assert_eq!(
            execute(pending).err().map(|e| *e.kind()),
            Some(ErrorKind::ServiceTerminated)
        );
        track!(execute(service))?;

        let m = s.metrics();
        assert_eq!(m.status(), ServiceStatus::Stopped);
        assert_eq!(m.failed_commands().create(), 1);
        assert_eq!(m.dequeued_commands().stop(), 1);
        assert_eq!(m.queue_len(), 0);
        Ok(())
    }
}
