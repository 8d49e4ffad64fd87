//! [Prometheus][prometheus]用のメトリクス.
//!
//! [prometheus]: https://prometheus.io/
use prometrics::metrics::{Counter, MetricBuilder};
#[cfg(feature = "service")]
use prometrics::metrics::Gauge;

#[cfg(feature = "service")]
use crate::service::{Command, ServiceStatus};

/// レジャーの容量計算を担当するアロケータのメトリクス.
#[derive(Debug, Clone)]
pub struct SpaceAllocatorMetrics {
    pub(crate) allocated_extents: Counter,
    pub(crate) allocated_units: Counter,
    pub(crate) released_extents: Counter,
    pub(crate) released_units: Counter,
    pub(crate) nospace_failures: Counter,
    pub(crate) capacity_units: u64,
}
impl SpaceAllocatorMetrics {
    /// アロケータが管理する容量.
    pub fn capacity_units(&self) -> u64 {
        self.capacity_units
    }

    /// これまでに割り当てた領域の数.
    ///
    /// # Prometheus
    ///
    /// ```prometheus
    /// cannyvg_allocator_allocated_extents_total <COUNTER>
    /// ```
    pub fn allocated_extents(&self) -> u64 {
        self.allocated_extents.value() as u64
    }

    /// これまでに割り当てた領域のサイズの合計.
    ///
    /// # Prometheus
    ///
    /// ```prometheus
    /// cannyvg_allocator_allocated_units_total <COUNTER>
    /// ```
    pub fn allocated_units(&self) -> u64 {
        self.allocated_units.value() as u64
    }

    /// これまでに解放した領域の数.
    ///
    /// # Prometheus
    ///
    /// ```prometheus
    /// cannyvg_allocator_released_extents_total <COUNTER>
    /// ```
    pub fn released_extents(&self) -> u64 {
        self.released_extents.value() as u64
    }

    /// これまでに解放した領域のサイズの合計.
    ///
    /// # Prometheus
    ///
    /// ```prometheus
    /// cannyvg_allocator_released_units_total <COUNTER>
    /// ```
    pub fn released_units(&self) -> u64 {
        self.released_units.value() as u64
    }

    /// 空き容量不足による割当失敗回数.
    ///
    /// # Prometheus
    ///
    /// ```prometheus
    /// cannyvg_allocator_nospace_failures_total <COUNTER>
    /// ```
    pub fn nospace_failures(&self) -> u64 {
        self.nospace_failures.value() as u64
    }

    /// 現在の使用量.
    ///
    /// # Prometheus
    ///
    /// ```prometheus
    /// cannyvg_allocator_allocated_units_total - cannyvg_allocator_released_units_total
    /// ```
    pub fn usage_units(&self) -> u64 {
        // NOTE: 以下の順番で値を取得しないとアンダーフローする可能性がある
        let dec = self.released_units();
        let inc = self.allocated_units();
        inc - dec
    }

    pub(crate) fn new(builder: &MetricBuilder, capacity_units: u64) -> Self {
        let mut builder = builder.clone();
        builder.namespace("cannyvg").subsystem("allocator");
        SpaceAllocatorMetrics {
            allocated_extents: builder
                .counter("allocated_extents_total")
                .help("Number of allocated extents")
                .finish()
                .expect("Never fails"),
            allocated_units: builder
                .counter("allocated_units_total")
                .help("Number of allocated capacity units")
                .finish()
                .expect("Never fails"),
            released_extents: builder
                .counter("released_extents_total")
                .help("Number of released extents")
                .finish()
                .expect("Never fails"),
            released_units: builder
                .counter("released_units_total")
                .help("Number of released capacity units")
                .finish()
                .expect("Never fails"),
            nospace_failures: builder
                .counter("nospace_failures_total")
                .help("Number of allocation failures caused by no available space")
                .finish()
                .expect("Never fails"),
            capacity_units,
        }
    }

    pub(crate) fn count_allocation(&self, size: u64) {
        self.allocated_extents.increment();
        self.allocated_units.add_u64(size);
    }

    pub(crate) fn count_releasion(&self, size: u64) {
        self.released_extents.increment();
        self.released_units.add_u64(size);
    }
}

/// [`AllocationLedger`]のメトリクス.
///
/// [`AllocationLedger`]: ../ledger/struct.AllocationLedger.html
#[derive(Debug, Clone)]
pub struct LedgerMetrics {
    pub(crate) created_extents: Counter,
    pub(crate) deleted_extents: Counter,
    pub(crate) rejected_requests: LedgerRejectionCounter,
    allocator: SpaceAllocatorMetrics,
}
impl LedgerMetrics {
    /// 作成されたエクステントの数.
    ///
    /// # Prometheus
    ///
    /// ```prometheus
    /// cannyvg_ledger_created_extents_total <COUNTER>
    /// ```
    pub fn created_extents(&self) -> u64 {
        self.created_extents.value() as u64
    }

    /// 削除されたエクステントの数.
    ///
    /// # Prometheus
    ///
    /// ```prometheus
    /// cannyvg_ledger_deleted_extents_total <COUNTER>
    /// ```
    pub fn deleted_extents(&self) -> u64 {
        self.deleted_extents.value() as u64
    }

    /// 現在レジャーに登録されているエクステントの数.
    ///
    /// # Prometheus
    ///
    /// ```prometheus
    /// cannyvg_ledger_created_extents_total - cannyvg_ledger_deleted_extents_total
    /// ```
    pub fn extents(&self) -> usize {
        // NOTE: 以下の順番で値を取得しないとアンダーフローする可能性がある
        let dec = self.deleted_extents();
        let inc = self.created_extents();
        (inc - dec) as usize
    }

    /// 事前条件違反で拒否されたリクエストの数.
    pub fn rejected_requests(&self) -> &LedgerRejectionCounter {
        &self.rejected_requests
    }

    /// アロケータのメトリクスを返す.
    pub fn allocator(&self) -> &SpaceAllocatorMetrics {
        &self.allocator
    }

    pub(crate) fn new(builder: &MetricBuilder, allocator: SpaceAllocatorMetrics) -> Self {
        let mut builder = builder.clone();
        builder.namespace("cannyvg").subsystem("ledger");
        LedgerMetrics {
            created_extents: builder
                .counter("created_extents_total")
                .help("Number of created extents")
                .finish()
                .expect("Never fails"),
            deleted_extents: builder
                .counter("deleted_extents_total")
                .help("Number of deleted extents")
                .finish()
                .expect("Never fails"),
            rejected_requests: LedgerRejectionCounter::new(&builder),
            allocator,
        }
    }
}

/// 拒否理由毎のカウンタ.
///
/// 空き容量不足による拒否は[`SpaceAllocatorMetrics::nospace_failures`]で数えられる.
///
/// [`SpaceAllocatorMetrics::nospace_failures`]: struct.SpaceAllocatorMetrics.html#method.nospace_failures
///
/// # Prometheus
///
/// ```prometheus
/// cannyvg_ledger_rejected_requests_total { reason="invalid_size|duplicate_name|not_found" } <COUNTER>
/// ```
#[derive(Debug, Clone)]
pub struct LedgerRejectionCounter {
    pub(crate) invalid_size: Counter,
    pub(crate) duplicate_name: Counter,
    pub(crate) not_found: Counter,
}
impl LedgerRejectionCounter {
    /// サイズ不正による拒否回数.
    pub fn invalid_size(&self) -> u64 {
        self.invalid_size.value() as u64
    }

    /// 名前の重複による拒否回数.
    pub fn duplicate_name(&self) -> u64 {
        self.duplicate_name.value() as u64
    }

    /// 存在しないエクステントが指定されたことによる拒否回数.
    pub fn not_found(&self) -> u64 {
        self.not_found.value() as u64
    }

    fn new(builder: &MetricBuilder) -> Self {
        let counter = |reason| {
            builder
                .counter("rejected_requests_total")
                .help("Number of requests rejected by precondition violations")
                .label("reason", reason)
                .finish()
                .expect("Never fails")
        };
        LedgerRejectionCounter {
            invalid_size: counter("invalid_size"),
            duplicate_name: counter("duplicate_name"),
            not_found: counter("not_found"),
        }
    }
}

/// [`LedgerService`]のメトリクス.
///
/// [`LedgerService`]: ../service/struct.LedgerService.html
#[cfg(feature = "service")]
#[derive(Debug, Clone)]
pub struct ServiceMetrics {
    pub(crate) status: Gauge,
    pub(crate) enqueued_commands: ServiceCommandCounter,
    pub(crate) dequeued_commands: ServiceCommandCounter,
    pub(crate) failed_commands: ServiceCommandCounter,
    pub(crate) busy_commands: ServiceCommandCounter,
}
#[cfg(feature = "service")]
impl ServiceMetrics {
    /// サービスの稼働状態.
    ///
    /// # Prometheus
    ///
    /// ```prometheus
    /// # 0=stopped
    /// # 1=starting
    /// # 2=running
    /// cannyvg_service_status = 0|1|2
    /// ```
    pub fn status(&self) -> ServiceStatus {
        match self.status.value() as u8 {
            0 => ServiceStatus::Stopped,
            1 => ServiceStatus::Starting,
            2 => ServiceStatus::Running,
            _ => unreachable!(),
        }
    }

    /// サービスのキューに挿入されたコマンドの数.
    ///
    /// # Prometheus
    ///
    /// ```prometheus
    /// cannyvg_service_enqueued_commands_total { command="create|delete|get|list|usage|stop" } <COUNTER>
    /// ```
    pub fn enqueued_commands(&self) -> &ServiceCommandCounter {
        &self.enqueued_commands
    }

    /// サービスのキューから取り出されたコマンドの数.
    ///
    /// # Prometheus
    ///
    /// ```prometheus
    /// cannyvg_service_dequeued_commands_total { command="create|delete|get|list|usage|stop" } <COUNTER>
    /// ```
    pub fn dequeued_commands(&self) -> &ServiceCommandCounter {
        &self.dequeued_commands
    }

    /// 実行に失敗したコマンドの数.
    ///
    /// # Prometheus
    ///
    /// ```prometheus
    /// cannyvg_service_failed_commands_total { command="create|delete|get|list|usage|stop" } <COUNTER>
    /// ```
    pub fn failed_commands(&self) -> &ServiceCommandCounter {
        &self.failed_commands
    }

    /// サービスが忙しくて実行を諦めたコマンドの数.
    ///
    /// # Prometheus
    ///
    /// ```prometheus
    /// cannyvg_service_busy_commands_total { command="create|delete|get|list|usage|stop" } <COUNTER>
    /// ```
    pub fn busy_commands(&self) -> &ServiceCommandCounter {
        &self.busy_commands
    }

    /// サービスキューの長さ(i.e., 実行待ちのコマンド数).
    ///
    /// # Prometheus
    ///
    /// ```prometheus
    /// sum(cannyvg_service_enqueued_commands_total - cannyvg_service_dequeued_commands_total)
    /// ```
    pub fn queue_len(&self) -> usize {
        // NOTE: 以下の順番で値を取得しないとアンダーフローする可能性がある
        let dec = self.dequeued_commands.sum();
        let inc = self.enqueued_commands.sum();
        (inc - dec) as usize
    }

    pub(crate) fn new(builder: &MetricBuilder) -> Self {
        let mut builder = builder.clone();
        builder.namespace("cannyvg").subsystem("service");
        ServiceMetrics {
            status: builder
                .gauge("status")
                .help("Status of the service (0=stopped, 1=starting, 2=running)")
                .finish()
                .expect("Never fails"),
            enqueued_commands: ServiceCommandCounter::new(
                &builder,
                "enqueued_commands_total",
                "Number of enqueued commands",
            ),
            dequeued_commands: ServiceCommandCounter::new(
                &builder,
                "dequeued_commands_total",
                "Number of dequeued commands",
            ),
            failed_commands: ServiceCommandCounter::new(
                &builder,
                "failed_commands_total",
                "Number of commands failed to execute",
            ),
            busy_commands: ServiceCommandCounter::new(
                &builder,
                "busy_commands_total",
                "Number of commands gave up to execute due to the service is busy",
            ),
        }
    }
}

/// サービスのコマンド毎のカウンタ.
#[cfg(feature = "service")]
#[derive(Debug, Clone)]
pub struct ServiceCommandCounter {
    pub(crate) create: Counter,
    pub(crate) delete: Counter,
    pub(crate) get: Counter,
    pub(crate) list: Counter,
    pub(crate) usage: Counter,
    pub(crate) stop: Counter,
}
#[cfg(feature = "service")]
impl ServiceCommandCounter {
    /// CREATEコマンド用のカウンタの値を返す.
    pub fn create(&self) -> u64 {
        self.create.value() as u64
    }

    /// DELETEコマンド用のカウンタの値を返す.
    pub fn delete(&self) -> u64 {
        self.delete.value() as u64
    }

    /// GETコマンド用のカウンタの値を返す.
    pub fn get(&self) -> u64 {
        self.get.value() as u64
    }

    /// LISTコマンド用のカウンタの値を返す.
    pub fn list(&self) -> u64 {
        self.list.value() as u64
    }

    /// USAGEコマンド用のカウンタの値を返す.
    pub fn usage(&self) -> u64 {
        self.usage.value() as u64
    }

    /// STOPコマンド用のカウンタの値を返す.
    pub fn stop(&self) -> u64 {
        self.stop.value() as u64
    }

    pub(crate) fn new(builder: &MetricBuilder, name: &str, help: &str) -> Self {
        let counter = |command| {
            builder
                .counter(name)
                .help(help)
                .label("command", command)
                .finish()
                .expect("Never fails")
        };
        ServiceCommandCounter {
            create: counter("create"),
            delete: counter("delete"),
            get: counter("get"),
            list: counter("list"),
            usage: counter("usage"),
            stop: counter("stop"),
        }
    }

    pub(crate) fn increment(&self, command: &Command) {
        match *command {
            Command::Create(_) => self.create.increment(),
            Command::Delete(_) => self.delete.increment(),
            Command::Get(_) => self.get.increment(),
            Command::List(_) => self.list.increment(),
            Command::Usage(_) => self.usage.increment(),
            Command::Stop(_) => self.stop.increment(),
        }
    }

    fn sum(&self) -> u64 {
        self.create() + self.delete() + self.get() + self.list() + self.usage() + self.stop()
    }
}
