//! レジャー用の容量アロケータ.
//!
//! アロケータが担当するのは容量の計算処理のみで、エクステントの名前や順序の管理は行わない.
use crate::metrics::SpaceAllocatorMetrics;

/// レジャーの容量計算を担当するアロケータ.
///
/// 固定の容量を持ち、割当要求の度にその中から要求サイズ分を差し引く.
///
/// この実装自体は、完全にメモリ上のデータ構造であり、状態は永続化されない.
///
/// # 割当戦略
///
/// 要求は到着順に処理され、空き容量が要求サイズ以上であれば割当が成功する.
/// 配置位置の概念は持たないため、断片化は発生しない.
#[derive(Debug)]
pub struct SpaceAllocator {
    free: u64,
    metrics: SpaceAllocatorMetrics,
}
impl SpaceAllocator {
    /// アロケータを構築する.
    ///
    /// アロケータが利用可能な容量の情報は、`metrics`から取得される.
    pub fn new(metrics: SpaceAllocatorMetrics) -> Self {
        SpaceAllocator {
            free: metrics.capacity_units,
            metrics,
        }
    }

    /// `size`分の容量の割当を行う.
    ///
    /// 十分な空き容量が存在しない場合には`false`が返され、状態は変更されない.
    pub fn allocate(&mut self, size: u64) -> bool {
        if size <= self.free {
            self.free -= size;
            self.metrics.count_allocation(size);
            true
        } else {
            self.metrics.nospace_failures.increment();
            false
        }
    }

    /// 割当済みの容量の解放を行う.
    ///
    /// # 事前条件
    ///
    /// - `size`は「以前に割当済み」かつ「未解放」の容量である
    pub fn release(&mut self, size: u64) {
        assert!(size <= self.used(), "size={}, used={}", size, self.used());
        self.free += size;
        self.metrics.count_releasion(size);
    }

    /// 空き容量を返す.
    pub fn free(&self) -> u64 {
        self.free
    }

    /// 使用中の容量を返す.
    pub fn used(&self) -> u64 {
        self.capacity() - self.free
    }

    /// 容量の総量を返す.
    pub fn capacity(&self) -> u64 {
        self.metrics.capacity_units
    }

    /// アロケータ用のメトリクスを返す.
    pub fn metrics(&self) -> &SpaceAllocatorMetrics {
        &self.metrics
    }
}

#[cfg(test)]
mod tests {
    use prometrics::metrics::MetricBuilder;

    use super::*;

    #[test]
    fn it_works() {
        let mut allocator = SpaceAllocator::new(metrics(24));
        assert!(allocator.allocate(10));
        assert!(allocator.allocate(10));
        assert!(!allocator.allocate(10));
        assert!(allocator.allocate(4));
        assert_eq!(allocator.free(), 0);

        allocator.release(10);
        assert!(allocator.allocate(5));
        assert!(allocator.allocate(2));
        assert!(!allocator.allocate(4));
        assert_eq!(allocator.free(), 3);
        assert_eq!(allocator.used(), 21);

        let m = allocator.metrics();
        assert_eq!(m.allocated_extents(), 5);
        assert_eq!(m.released_extents(), 1);
        assert_eq!(m.nospace_failures(), 2);
        assert_eq!(m.usage_units(), 21);
        assert_eq!(m.capacity_units(), 24);
    }

    #[test]
    fn exact_fit() {
        let mut allocator = SpaceAllocator::new(metrics(100));
        assert!(allocator.allocate(100));
        assert_eq!(allocator.free(), 0);
        assert!(!allocator.allocate(1));
        assert_eq!(allocator.free(), 0);
    }

    #[test]
    #[should_panic]
    fn it_panics() {
        let mut allocator = SpaceAllocator::new(metrics(24));

        // Try releasing an unallocated size
        allocator.release(10);
    }

    fn metrics(capacity: u64) -> SpaceAllocatorMetrics {
        SpaceAllocatorMetrics::new(&MetricBuilder::new(), capacity)
    }
}
