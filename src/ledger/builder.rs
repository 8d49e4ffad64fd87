use prometrics::metrics::MetricBuilder;
use uuid::Uuid;

use crate::ledger::allocator::SpaceAllocator;
use crate::ledger::index::ExtentIndex;
use crate::ledger::AllocationLedger;
use crate::metrics::{LedgerMetrics, SpaceAllocatorMetrics};
use crate::{ErrorKind, Result};

/// `AllocationLedger`のビルダ.
#[derive(Debug, Clone)]
pub struct LedgerBuilder {
    instance_uuid: Option<Uuid>,
    metrics: MetricBuilder,
}
impl LedgerBuilder {
    /// 新しい`LedgerBuilder`インスタンスを生成する.
    pub fn new() -> Self {
        LedgerBuilder {
            instance_uuid: None,
            metrics: MetricBuilder::new(),
        }
    }

    /// レジャーインスタンスを識別するためのUUIDを設定する.
    ///
    /// 本メソッドが呼ばれていない場合は、ランダムなUUIDが割り当てられる.
    pub fn instance_uuid(&mut self, uuid: Uuid) -> &mut Self {
        self.instance_uuid = Some(uuid);
        self
    }

    /// メトリクス用の共通設定を登録する.
    ///
    /// デフォルト値は`MetricBuilder::new()`.
    pub fn metrics(&mut self, metrics: MetricBuilder) -> &mut Self {
        self.metrics = metrics;
        self
    }

    /// 新規にレジャーを生成する.
    ///
    /// 生成直後のレジャーの空き容量は`total_capacity`に等しく、エクステントは一つも存在しない.
    ///
    /// # Errors
    ///
    /// `total_capacity`が`0`の場合には、種類が`ErrorKind::InvalidCapacity`のエラーが返される.
    pub fn create<S: Into<String>>(
        &self,
        name: S,
        total_capacity: u64,
    ) -> Result<AllocationLedger> {
        let name = name.into();
        track_assert!(
            total_capacity > 0,
            ErrorKind::InvalidCapacity,
            "ledger={:?}",
            name
        );

        let allocator =
            SpaceAllocator::new(SpaceAllocatorMetrics::new(&self.metrics, total_capacity));
        let metrics = LedgerMetrics::new(&self.metrics, allocator.metrics().clone());
        Ok(AllocationLedger::new(
            name,
            self.instance_uuid.unwrap_or_else(Uuid::new_v4),
            allocator,
            ExtentIndex::new(),
            metrics,
        ))
    }
}
impl Default for LedgerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use trackable::result::TestResult;

    use super::*;

    #[test]
    fn create_works() -> TestResult {
        let uuid = Uuid::new_v4();
        let ledger = track!(LedgerBuilder::new().instance_uuid(uuid).create("VG1", 1000))?;
        assert_eq!(ledger.name(), "VG1");
        assert_eq!(ledger.instance_uuid(), uuid);
        assert_eq!(ledger.total_capacity(), 1000);
        assert_eq!(ledger.free_capacity(), 1000);
        assert!(ledger.is_empty());
        Ok(())
    }

    #[test]
    fn random_uuid_is_assigned() -> TestResult {
        let builder = LedgerBuilder::new();
        let a = track!(builder.create("a", 1))?;
        let b = track!(builder.create("b", 1))?;
        assert_ne!(a.instance_uuid(), b.instance_uuid());
        Ok(())
    }

    #[test]
    fn zero_capacity_is_rejected() {
        assert_eq!(
            LedgerBuilder::new()
                .create("VG0", 0)
                .err()
                .map(|e| *e.kind()),
            Some(ErrorKind::InvalidCapacity)
        );
    }
}
